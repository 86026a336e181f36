//! Core business logic - framework-agnostic ledger, report and entry operations.
//!
//! Everything in here takes a SeaORM connection and returns crate [`Result`]s;
//! the HTTP layer in [`crate::api`] only parses requests and formats responses.

/// FRK stock ledger with its materialized running balance
pub mod frk;
/// Godown name lists
pub mod godown;
/// Lenient deserializers for form-style request bodies
pub mod input;
/// Outturn report aggregation
pub mod outturn;
/// Paddy entry operations
pub mod paddy;
/// Rice entry operations and dispatch-linked FRK debits
pub mod rice;

use crate::errors::{Error, Result};
use sea_orm::{DatabaseTransaction, TransactionTrait};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// The (company, fiscal year) key every ledger and report is scoped by.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Scope {
    /// Company name
    pub company: String,
    /// Fiscal year (the year the season starts in)
    pub year: i32,
}

impl Scope {
    /// Builds a scope, rejecting a blank company name.
    pub fn new(company: impl Into<String>, year: i32) -> Result<Self> {
        let company = company.into();
        if company.trim().is_empty() {
            return Err(Error::validation("Company and year are required."));
        }
        Ok(Self {
            company: company.trim().to_string(),
            year,
        })
    }
}

impl std::fmt::Display for Scope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.company, self.year)
    }
}

/// Commits `txn` if `outcome` is `Ok`, otherwise rolls it back explicitly.
///
/// Database failures from any step are reported as [`Error::Transaction`];
/// client errors (validation, conflict, not found) are passed through unchanged.
pub(crate) async fn finish_transaction<T>(txn: DatabaseTransaction, outcome: Result<T>) -> Result<T> {
    match outcome {
        Ok(value) => {
            txn.commit()
                .await
                .map_err(|source| Error::Transaction { source })?;
            Ok(value)
        }
        Err(err) => {
            warn!("Rolling back transaction: {}", err);
            txn.rollback()
                .await
                .map_err(|source| Error::Transaction { source })?;
            match err {
                Error::Database(source) => Err(Error::Transaction { source }),
                other => Err(other),
            }
        }
    }
}

/// Begins a transaction on `db`, reporting a failure to start as [`Error::Transaction`].
pub(crate) async fn begin_transaction<C>(db: &C) -> Result<DatabaseTransaction>
where
    C: TransactionTrait,
{
    db.begin()
        .await
        .map_err(|source| Error::Transaction { source })
}

/// Rejects blank required text fields with a validation error naming the field.
pub(crate) fn require_text(value: &str, field: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(Error::validation(format!("{field} is required")));
    }
    Ok(())
}

/// Rejects negative or non-finite quantities.
pub(crate) fn require_non_negative(value: f64, field: &str) -> Result<()> {
    if !value.is_finite() || value < 0.0 {
        return Err(Error::validation(format!(
            "{field} must be a non-negative number, got {value}"
        )));
    }
    Ok(())
}
