//! File upload handling for listing images.
//!
//! Each form field has a rule: an allowed MIME-type list, a size cap, and a
//! destination folder under the upload root. Stored names combine the
//! original base name with a microsecond timestamp so concurrent uploads of
//! the same file do not collide.

use std::path::{Path, PathBuf};

use axum::body::Bytes;
use chrono::Utc;

use crate::{
    config::UploadsConfig,
    error::{AppError, AppResult},
};

/// Upload rule for one form field
pub struct UploadRule {
    pub folder: &'static str,
    pub allowed_types: &'static [&'static str],
    pub max_size: usize,
}

const MAX_IMAGE_SIZE: usize = 20 * 1024 * 1024;

const RULES: &[(&str, UploadRule)] = &[(
    "image",
    UploadRule {
        folder: "books",
        allowed_types: &["image/jpeg", "image/png", "image/webp", "image/jpg"],
        max_size: MAX_IMAGE_SIZE,
    },
)];

fn rule_for(field: &str) -> Option<&'static UploadRule> {
    RULES.iter().find(|(name, _)| *name == field).map(|(_, r)| r)
}

/// A file extracted from a multipart request
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub file_name: String,
    pub content_type: String,
    pub data: Bytes,
}

/// Validate a file against a field rule
fn check_rule(field: &str, rule: &UploadRule, file: &UploadedFile) -> AppResult<()> {
    if !rule.allowed_types.contains(&file.content_type.as_str()) {
        return Err(AppError::validation(
            field,
            &format!("Invalid file type for {}", field),
        ));
    }
    if file.data.len() > rule.max_size {
        return Err(AppError::validation(
            field,
            &format!("File exceeds maximum size of {} bytes", rule.max_size),
        ));
    }
    Ok(())
}

/// Build the stored filename: sanitized base name + timestamp + original extension
fn storage_name(original: &str, timestamp_micros: i64) -> String {
    let path = Path::new(original);
    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("upload");
    let sanitized: String = stem
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();

    match path.extension().and_then(|e| e.to_str()) {
        Some(ext) => format!("{}_{}.{}", sanitized, timestamp_micros, ext),
        None => format!("{}_{}", sanitized, timestamp_micros),
    }
}

#[derive(Clone)]
pub struct UploadService {
    config: UploadsConfig,
}

impl UploadService {
    pub fn new(config: UploadsConfig) -> Self {
        Self { config }
    }

    /// Create the per-field destination folders. Idempotent; called at startup.
    pub async fn ensure_dirs(&self) -> AppResult<()> {
        for (_, rule) in RULES {
            let dir = PathBuf::from(&self.config.root).join(rule.folder);
            tokio::fs::create_dir_all(&dir).await?;
        }
        Ok(())
    }

    /// Validate and persist an uploaded file, returning its public path
    pub async fn store(&self, field: &str, file: &UploadedFile) -> AppResult<String> {
        let rule = rule_for(field).ok_or_else(|| {
            AppError::BadRequest(format!("No upload rules defined for field '{}'", field))
        })?;
        check_rule(field, rule, file)?;

        let name = storage_name(&file.file_name, Utc::now().timestamp_micros());
        let dest = PathBuf::from(&self.config.root).join(rule.folder).join(&name);
        tokio::fs::write(&dest, &file.data).await?;

        tracing::debug!("Stored upload {} ({} bytes)", dest.display(), file.data.len());

        Ok(format!(
            "{}/{}/{}",
            self.config.public_prefix, rule.folder, name
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn png_file(size: usize) -> UploadedFile {
        UploadedFile {
            file_name: "cover.png".to_string(),
            content_type: "image/png".to_string(),
            data: Bytes::from(vec![0u8; size]),
        }
    }

    #[test]
    fn test_storage_name_keeps_extension() {
        assert_eq!(storage_name("cover.png", 42), "cover_42.png");
        assert_eq!(storage_name("my photo.jpeg", 42), "my_photo_42.jpeg");
        assert_eq!(storage_name("noext", 42), "noext_42");
    }

    #[test]
    fn test_storage_name_distinct_timestamps() {
        assert_ne!(storage_name("cover.png", 1), storage_name("cover.png", 2));
    }

    #[test]
    fn test_check_rule_accepts_small_png() {
        let rule = rule_for("image").unwrap();
        assert!(check_rule("image", rule, &png_file(2 * 1024 * 1024)).is_ok());
    }

    #[test]
    fn test_check_rule_rejects_pdf() {
        let rule = rule_for("image").unwrap();
        let file = UploadedFile {
            file_name: "doc.pdf".to_string(),
            content_type: "application/pdf".to_string(),
            data: Bytes::from_static(b"%PDF-1.4"),
        };
        assert!(check_rule("image", rule, &file).is_err());
    }

    #[test]
    fn test_check_rule_rejects_oversized() {
        let rule = rule_for("image").unwrap();
        assert!(check_rule("image", rule, &png_file(25 * 1024 * 1024)).is_err());
    }

    #[test]
    fn test_unknown_field_has_no_rule() {
        assert!(rule_for("avatar").is_none());
    }

    #[tokio::test]
    async fn test_store_writes_file_and_returns_public_path() {
        let root = std::env::temp_dir().join(format!("bookswap-test-{}", std::process::id()));
        let service = UploadService::new(UploadsConfig {
            root: root.to_string_lossy().to_string(),
            public_prefix: "/uploads".to_string(),
        });
        service.ensure_dirs().await.unwrap();

        let path = service.store("image", &png_file(16)).await.unwrap();
        assert!(path.starts_with("/uploads/books/cover_"));
        assert!(path.ends_with(".png"));

        let on_disk = root.join("books").join(path.rsplit('/').next().unwrap());
        assert_eq!(tokio::fs::read(&on_disk).await.unwrap().len(), 16);

        tokio::fs::remove_dir_all(&root).await.ok();
    }
}
