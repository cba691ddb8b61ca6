//! Business logic services

pub mod books;
pub mod requests;
pub mod uploads;
pub mod users;

use crate::{
    config::{AuthConfig, UploadsConfig},
    repository::Repository,
};

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub books: books::BooksService,
    pub requests: requests::RequestsService,
    pub users: users::UsersService,
    pub uploads: uploads::UploadService,
}

impl Services {
    /// Create all services with the given repository
    pub fn new(
        repository: Repository,
        auth_config: AuthConfig,
        uploads_config: UploadsConfig,
    ) -> Self {
        let uploads = uploads::UploadService::new(uploads_config);
        Self {
            books: books::BooksService::new(repository.clone(), uploads.clone()),
            requests: requests::RequestsService::new(repository.clone()),
            users: users::UsersService::new(repository, auth_config),
            uploads,
        }
    }
}
