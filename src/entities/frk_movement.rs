//! FRK movement entity - One row per fortified-rice-kernel stock event.
//!
//! A movement either credits received KGs or debits consumed KGs, never both.
//! `remaining_kgs` is the materialized running balance for the (`company`, `year`)
//! scope. Two orderings exist side by side: `date` is the business date, while
//! `id` is the insertion sequence number. Deletion shifts balances by `id`
//! order, so the two must agree for the stored balance to match the replayed one.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// FRK movement database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "frk_movements")]
pub struct Model {
    /// Insertion sequence number, assigned monotonically by the database
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Business date of the stock event
    pub date: Date,
    /// Company this ledger belongs to
    pub company: String,
    /// Fiscal year this ledger belongs to
    pub year: i32,
    /// KGs received (zero for a debit)
    pub credited_kgs: f64,
    /// KGs consumed (zero for a credit)
    pub debited_kgs: f64,
    /// Running balance after this movement
    pub remaining_kgs: f64,
    /// Progressive total; carried for compatibility, always zero
    pub progressive_kgs: f64,
    /// Rice entry whose dispatch produced this debit, if any
    pub rice_entry_id: Option<i64>,
}

impl Model {
    /// Net effect of this movement on the running balance.
    #[must_use]
    pub fn net_kgs(&self) -> f64 {
        self.credited_kgs - self.debited_kgs
    }
}

/// `FrkMovement` has no relationships with other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
