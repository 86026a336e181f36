//! Godown entity - Named storage locations, kept in separate paddy and rice namespaces.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Which name list a godown belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(8))")]
#[serde(rename_all = "lowercase")]
pub enum GodownKind {
    /// Godowns paddy is received into
    #[sea_orm(string_value = "paddy")]
    Paddy,
    /// Godowns rice is dispatched from
    #[sea_orm(string_value = "rice")]
    Rice,
}

/// Godown database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "godowns")]
pub struct Model {
    /// Unique identifier
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Namespace of the name
    pub kind: GodownKind,
    /// Godown name, unique within its namespace
    pub name: String,
}

/// `Godown` has no relationships with other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
