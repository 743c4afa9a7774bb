//! Category reads that never fail.
//!
//! When the remote list call errors, the catalog (filtered by kind) stands in
//! so pickers are never empty during an outage. Fallback rows carry synthetic
//! ids and are not written back; the sync manager takes care of the server
//! side on its next successful pass.

use serde::Serialize;
use tracing::warn;

use crate::catalog;
use crate::models::{CategoryKind, UserCategory};
use crate::repository::CategoryRepository;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ListingSource {
    Remote,
    Fallback,
}

#[derive(Debug, Clone, Serialize)]
pub struct CategoryListing {
    pub categories: Vec<UserCategory>,
    pub source: ListingSource,
}

impl CategoryListing {
    pub fn is_fallback(&self) -> bool {
        self.source == ListingSource::Fallback
    }
}

/// Catalog entries shaped as user categories, optionally of one kind.
pub fn fallback_categories(kind: Option<CategoryKind>) -> Vec<UserCategory> {
    catalog::all_definitions()
        .iter()
        .filter(|def| kind.is_none_or(|k| def.kind == k))
        .map(|def| def.to_fallback())
        .collect()
}

pub async fn list_categories<R>(repo: &R, kind: Option<CategoryKind>) -> CategoryListing
where
    R: CategoryRepository + ?Sized,
{
    match repo.list(kind).await {
        Ok(categories) => CategoryListing {
            categories,
            source: ListingSource::Remote,
        },
        Err(e) => {
            warn!(error = %e, kind = ?kind, "Category list failed, serving built-in catalog");
            CategoryListing {
                categories: fallback_categories(kind),
                source: ListingSource::Fallback,
            }
        }
    }
}
