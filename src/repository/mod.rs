//! Category repository: the network-facing façade over the remote category
//! store.

pub mod http;

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use crate::models::{CategoryKind, NewCategory, UserCategory};

pub use http::HttpCategoryRepository;

/// Result of a create request. A duplicate is not an error: batch callers
/// treat it as "already materialized" and move on.
#[derive(Debug, Clone, PartialEq)]
pub enum CreateOutcome {
    Created(UserCategory),
    AlreadyExists,
}

#[derive(Error, Debug)]
pub enum RepositoryError {
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("server returned {status}: {message}")]
    Status { status: u16, message: String },

    #[error("request rejected: {0}")]
    Rejected(String),

    #[error("malformed response: {0}")]
    Decode(String),
}

#[async_trait]
pub trait CategoryRepository: Send + Sync {
    async fn list(&self, kind: Option<CategoryKind>) -> Result<Vec<UserCategory>, RepositoryError>;

    async fn create(&self, category: &NewCategory) -> Result<CreateOutcome, RepositoryError>;

    async fn update(
        &self,
        id: &str,
        category: &NewCategory,
    ) -> Result<UserCategory, RepositoryError>;

    async fn delete(&self, id: &str) -> Result<(), RepositoryError>;
}

#[async_trait]
impl<R: CategoryRepository + ?Sized> CategoryRepository for Arc<R> {
    async fn list(&self, kind: Option<CategoryKind>) -> Result<Vec<UserCategory>, RepositoryError> {
        (**self).list(kind).await
    }

    async fn create(&self, category: &NewCategory) -> Result<CreateOutcome, RepositoryError> {
        (**self).create(category).await
    }

    async fn update(
        &self,
        id: &str,
        category: &NewCategory,
    ) -> Result<UserCategory, RepositoryError> {
        (**self).update(id, category).await
    }

    async fn delete(&self, id: &str) -> Result<(), RepositoryError> {
        (**self).delete(id).await
    }
}

/// Whether a failed create means the category is already there.
pub fn is_duplicate_response(status: u16, message: &str) -> bool {
    if status == 409 {
        return true;
    }
    let message = message.to_lowercase();
    ["already exists", "duplicate", "já existe", "ja existe"]
        .iter()
        .any(|marker| message.contains(marker))
}
