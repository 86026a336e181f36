//! Shared test utilities for the ledger crate.
//!
//! This module provides helpers for setting up test databases and building
//! entries and models with sensible defaults.

use crate::{
    core::{Scope, paddy::PaddyDetails, rice::RiceDetails},
    entities::{Grade, Variety, frk_movement, paddy_entry, rice_entry},
    errors::Result,
};
use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode, header},
};
use chrono::NaiveDate;
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use serde_json::Value;
use tower::ServiceExt;
use tracing_subscriber::EnvFilter;

/// Installs a test-friendly tracing subscriber; repeated calls are harmless.
pub fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug")),
        )
        .with_test_writer()
        .try_init();
}

/// Opens an empty in-memory `SQLite` database.
///
/// The pool holds exactly one connection: every in-memory connection is its
/// own database, so a larger pool would hand out empty databases.
pub async fn memory_connection() -> Result<DatabaseConnection> {
    let mut options = ConnectOptions::new("sqlite::memory:".to_string());
    options
        .max_connections(1)
        .min_connections(1)
        .sqlx_logging(false);
    Ok(Database::connect(options).await?)
}

/// Creates an in-memory `SQLite` database with all tables initialized.
/// This is the standard setup for all integration tests.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = memory_connection().await?;
    crate::config::database::create_tables(&db).await?;
    Ok(db)
}

/// The scope most tests run in: company "Acme", year 2024.
pub fn acme_2024() -> Scope {
    Scope {
        company: "Acme".to_string(),
        year: 2024,
    }
}

/// The `n`th of June 2024.
pub fn day(n: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 6, n).unwrap_or_default()
}

/// Paddy details with 10 bags in each of the four conditions.
pub fn paddy_details(date: NaiveDate, grade: Grade, net_weight: f64) -> PaddyDetails {
    PaddyDetails {
        date,
        godown: "North".to_string(),
        lorry_number: "AP-09-1234".to_string(),
        grade,
        moisture: 17.0,
        onb_bags: 10,
        ss_bags: 10,
        swp_bags: 10,
        nb_bags: 10,
        net_weight,
    }
}

/// Rice details with 10 bags in each of the three conditions.
pub fn rice_details(
    date: NaiveDate,
    variety: Variety,
    advice_date: Option<NaiveDate>,
    net_weight: f64,
    frk_kgs: f64,
) -> RiceDetails {
    RiceDetails {
        date,
        godown: "Dock".to_string(),
        lorry_number: "AP-09-5678".to_string(),
        variety,
        onb_bags: 10,
        ss_bags: 10,
        swp_bags: 10,
        net_weight,
        moisture: 14.0,
        advice_number: advice_date.map(|d| format!("ADV-{}", d.format("%m%d"))),
        advice_date,
        frk_kgs,
    }
}

/// An unsaved FRK movement in the Acme/2024 ledger with a zero balance.
pub fn movement(id: i64, date: NaiveDate, credited_kgs: f64, debited_kgs: f64) -> frk_movement::Model {
    frk_movement::Model {
        id,
        date,
        company: "Acme".to_string(),
        year: 2024,
        credited_kgs,
        debited_kgs,
        remaining_kgs: 0.0,
        progressive_kgs: 0.0,
        rice_entry_id: None,
    }
}

/// An unsaved paddy entry model built from [`paddy_details`].
pub fn paddy_model(id: i64, date: NaiveDate, grade: Grade, net_weight: f64) -> paddy_entry::Model {
    let details = paddy_details(date, grade, net_weight);
    paddy_entry::Model {
        id,
        date,
        godown: details.godown,
        issue_memo_id: format!("M-{id}"),
        lorry_number: details.lorry_number,
        grade,
        moisture: details.moisture,
        onb_bags: details.onb_bags,
        ss_bags: details.ss_bags,
        swp_bags: details.swp_bags,
        nb_bags: details.nb_bags,
        net_weight,
        company: "Acme".to_string(),
        year: 2024,
    }
}

/// An unsaved `BRA` rice entry model built from [`rice_details`].
pub fn rice_model(id: i64, advice_date: Option<NaiveDate>, net_weight: f64) -> rice_entry::Model {
    let details = rice_details(day(1), Variety::Bra, advice_date, net_weight, 0.0);
    rice_entry::Model {
        id,
        date: details.date,
        godown: details.godown,
        challan_number: format!("C-{id}"),
        lorry_number: details.lorry_number,
        variety: details.variety,
        onb_bags: details.onb_bags,
        ss_bags: details.ss_bags,
        swp_bags: details.swp_bags,
        net_weight,
        moisture: details.moisture,
        advice_number: details.advice_number,
        advice_date,
        frk_kgs: details.frk_kgs,
        company: "Acme".to_string(),
        year: 2024,
    }
}

/// Sends one request through `app` and returns the status with the JSON body.
///
/// An empty or non-JSON body comes back as `Value::Null`.
#[allow(clippy::unwrap_used)]
pub async fn send(app: Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let request = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(json) => request
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string())),
        None => request.body(Body::empty()),
    }
    .unwrap();

    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
}
