//! Data models for books, exchange requests, and users

pub mod book;
pub mod request;
pub mod user;

/// Rejects empty and whitespace-only values
pub fn non_blank(value: &str) -> Result<(), validator::ValidationError> {
    if value.trim().is_empty() {
        return Err(validator::ValidationError::new("non_blank"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_non_blank_rejects_whitespace() {
        assert!(non_blank("The Hobbit").is_ok());
        assert!(non_blank("").is_err());
        assert!(non_blank("   ").is_err());
        assert!(non_blank("\t\n").is_err());
    }
}
