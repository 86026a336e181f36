//! Rice entry entity - One row per dispatch of milled rice out of a godown.
//!
//! The `challan_number` is the business key, unique within a (`company`, `year`)
//! scope. When `advice_date` is present the entry's `frk_kgs` is debited from
//! the FRK ledger of the same scope.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Rice variety dispatched.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(3))")]
pub enum Variety {
    /// Milled from `RPA` paddy
    #[sea_orm(string_value = "BRA")]
    #[serde(rename = "BRA")]
    Bra,
    /// Milled from `RPC` paddy
    #[sea_orm(string_value = "BRC")]
    #[serde(rename = "BRC")]
    Brc,
}

/// Rice entry database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "rice_entries")]
pub struct Model {
    /// Unique identifier
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Truck memo date
    pub date: Date,
    /// Dispatching godown
    pub godown: String,
    /// Dispatch voucher (challan) number, unique per company and year
    pub challan_number: String,
    /// Lorry registration number
    pub lorry_number: String,
    /// Rice variety
    pub variety: Variety,
    /// Bags in ONB condition
    pub onb_bags: i32,
    /// Bags in SS condition
    pub ss_bags: i32,
    /// Bags in SWP condition
    pub swp_bags: i32,
    /// Net weight in tons/KGs
    pub net_weight: f64,
    /// Moisture percentage
    pub moisture: f64,
    /// External acceptance advice number
    pub advice_number: Option<String>,
    /// External acceptance advice date; triggers an FRK debit when present
    pub advice_date: Option<Date>,
    /// FRK KGs blended into this dispatch
    pub frk_kgs: f64,
    /// Company the entry belongs to
    pub company: String,
    /// Fiscal year the entry belongs to
    pub year: i32,
}

impl Model {
    /// Sum of all bag subtotals.
    #[must_use]
    pub fn total_bags(&self) -> i64 {
        i64::from(self.onb_bags) + i64::from(self.ss_bags) + i64::from(self.swp_bags)
    }
}

/// `RiceEntry` has no relationships with other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
