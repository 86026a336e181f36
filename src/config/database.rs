//! Database configuration module.
//!
//! This module handles the `SQLite` connection and table creation using `SeaORM`.
//! Tables are generated from the entity definitions with
//! `Schema::create_table_from_entity`, so the database schema always matches the
//! Rust structs. Composite unique keys that the entity attributes cannot express
//! are added as explicit indexes.

use crate::entities::{
    FrkMovement, FrkMovementColumn, Godown, GodownColumn, PaddyEntry, PaddyEntryColumn, RiceEntry,
    RiceEntryColumn,
};
use crate::errors::Result;
use sea_orm::sea_query::{Index, IndexCreateStatement};
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, Schema};
use std::path::Path;
use tracing::{debug, info};

/// Establishes a connection to the database at `database_url`.
///
/// For file-backed `SQLite` URLs the parent directory is created first so that
/// `?mode=rwc` can create the database file on first start.
pub async fn create_connection(database_url: &str) -> Result<DatabaseConnection> {
    if let Some(parent) = sqlite_file_parent(database_url) {
        std::fs::create_dir_all(parent)?;
    }

    let mut options = ConnectOptions::new(database_url.to_string());
    options.sqlx_logging(false);

    debug!("Connecting to database at {}", database_url);
    Database::connect(options).await.map_err(Into::into)
}

fn sqlite_file_parent(database_url: &str) -> Option<&Path> {
    let path = database_url.strip_prefix("sqlite://")?;
    let path = path.split('?').next()?;
    if path.is_empty() || path.contains(":memory:") {
        return None;
    }
    Path::new(path)
        .parent()
        .filter(|parent| !parent.as_os_str().is_empty())
}

/// Creates all tables and indexes if they do not exist yet.
///
/// Safe to call on every start-up.
pub async fn create_tables<C>(db: &C) -> Result<()>
where
    C: ConnectionTrait,
{
    let builder = db.get_database_backend();
    let schema = Schema::new(builder);

    let mut frk_table = schema.create_table_from_entity(FrkMovement);
    let mut paddy_table = schema.create_table_from_entity(PaddyEntry);
    let mut rice_table = schema.create_table_from_entity(RiceEntry);
    let mut godown_table = schema.create_table_from_entity(Godown);

    for table in [&mut frk_table, &mut paddy_table, &mut rice_table, &mut godown_table] {
        table.if_not_exists();
        db.execute(builder.build(&*table)).await?;
    }

    for index in indexes() {
        db.execute(builder.build(&index)).await?;
    }

    info!("Database tables ensured");
    Ok(())
}

fn indexes() -> Vec<IndexCreateStatement> {
    vec![
        Index::create()
            .name("idx_paddy_entries_scope_memo")
            .table(PaddyEntry)
            .col(PaddyEntryColumn::Company)
            .col(PaddyEntryColumn::Year)
            .col(PaddyEntryColumn::IssueMemoId)
            .unique()
            .if_not_exists()
            .to_owned(),
        Index::create()
            .name("idx_rice_entries_scope_challan")
            .table(RiceEntry)
            .col(RiceEntryColumn::Company)
            .col(RiceEntryColumn::Year)
            .col(RiceEntryColumn::ChallanNumber)
            .unique()
            .if_not_exists()
            .to_owned(),
        Index::create()
            .name("idx_godowns_kind_name")
            .table(Godown)
            .col(GodownColumn::Kind)
            .col(GodownColumn::Name)
            .unique()
            .if_not_exists()
            .to_owned(),
        Index::create()
            .name("idx_frk_movements_scope_order")
            .table(FrkMovement)
            .col(FrkMovementColumn::Company)
            .col(FrkMovementColumn::Year)
            .col(FrkMovementColumn::Date)
            .col(FrkMovementColumn::Id)
            .if_not_exists()
            .to_owned(),
    ]
}
