//! Paddy entry entity - One row per lorry receipt of paddy into a godown.
//!
//! The `issue_memo_id` is the business key and is unique within a
//! (`company`, `year`) scope. No derived state is stored on this table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Paddy grade received at the mill.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(3))")]
pub enum Grade {
    /// Grade A paddy, milled into `BRA` rice
    #[sea_orm(string_value = "RPA")]
    #[serde(rename = "RPA")]
    Rpa,
    /// Common grade paddy, milled into `BRC` rice
    #[sea_orm(string_value = "RPC")]
    #[serde(rename = "RPC")]
    Rpc,
}

/// Paddy entry database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "paddy_entries")]
pub struct Model {
    /// Unique identifier
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Date the paddy was received
    pub date: Date,
    /// Receiving godown
    pub godown: String,
    /// Issue memo number, unique per company and year
    pub issue_memo_id: String,
    /// Lorry registration number
    pub lorry_number: String,
    /// Paddy grade
    pub grade: Grade,
    /// Moisture percentage
    pub moisture: f64,
    /// Bags in ONB condition
    pub onb_bags: i32,
    /// Bags in SS condition
    pub ss_bags: i32,
    /// Bags in SWP condition
    pub swp_bags: i32,
    /// Bags in NB condition
    pub nb_bags: i32,
    /// Net weight in tons/KGs
    pub net_weight: f64,
    /// Company the entry belongs to
    pub company: String,
    /// Fiscal year the entry belongs to
    pub year: i32,
}

impl Model {
    /// Sum of all bag subtotals.
    #[must_use]
    pub fn total_bags(&self) -> i64 {
        i64::from(self.onb_bags)
            + i64::from(self.ss_bags)
            + i64::from(self.swp_bags)
            + i64::from(self.nb_bags)
    }
}

/// `PaddyEntry` has no relationships with other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
