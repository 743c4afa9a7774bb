//! Additive reconciliation between the catalog and a user's remote set.
//!
//! Both the bootstrap controller and the sync manager materialize catalog
//! entries through [`create_batch`]; the sync manager narrows the batch to
//! [`missing_definitions`] first. Nothing here ever updates or deletes a
//! remote category.

use std::collections::HashSet;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::cancel::CancellationFlag;
use crate::catalog::CanonicalCategory;
use crate::models::{CategoryKey, UserCategory};
use crate::repository::{CategoryRepository, CreateOutcome};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FailedCreation {
    pub name: String,
    pub kind: String,
    pub reason: String,
}

/// What a batch did. Failures are collected, never raised.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BatchReport {
    pub attempted: usize,
    pub created: usize,
    pub already_existed: usize,
    pub failed: Vec<FailedCreation>,
    pub cancelled: bool,
}

impl BatchReport {
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty() && !self.cancelled
    }
}

/// Catalog definitions with no existing category of the same
/// case-insensitive `(kind, name)`. Inactive or renamed rows still count as
/// present when their key matches.
pub fn missing_definitions<'a>(
    existing: &[UserCategory],
    catalog: &'a [CanonicalCategory],
) -> Vec<&'a CanonicalCategory> {
    let present: HashSet<CategoryKey> = existing.iter().map(UserCategory::key).collect();
    catalog
        .iter()
        .filter(|def| !present.contains(&def.key()))
        .collect()
}

/// Creates each definition in order, continuing past individual failures.
/// The cancellation flag is checked before every item; once raised the rest
/// of the batch is skipped and the report is marked cancelled.
pub async fn create_batch<R>(
    repo: &R,
    definitions: &[&CanonicalCategory],
    cancel: &CancellationFlag,
) -> BatchReport
where
    R: CategoryRepository + ?Sized,
{
    let mut report = BatchReport::default();

    for def in definitions {
        if cancel.is_cancelled() {
            warn!(
                remaining = definitions.len() - report.attempted,
                "Category batch cancelled"
            );
            report.cancelled = true;
            break;
        }

        report.attempted += 1;
        match repo.create(&def.to_new_category()).await {
            Ok(CreateOutcome::Created(created)) => {
                debug!(category_id = %created.id, name = %def.name, "Materialized default category");
                report.created += 1;
            }
            Ok(CreateOutcome::AlreadyExists) => {
                report.already_existed += 1;
            }
            Err(e) => {
                warn!(name = %def.name, kind = %def.kind, error = %e, "Failed to create default category");
                report.failed.push(FailedCreation {
                    name: def.name.to_string(),
                    kind: def.kind.to_string(),
                    reason: e.to_string(),
                });
            }
        }
    }

    info!(
        attempted = report.attempted,
        created = report.created,
        already_existed = report.already_existed,
        failed = report.failed.len(),
        cancelled = report.cancelled,
        "Category batch finished"
    );
    report
}
