//! HTTP request surface.
//!
//! Handlers only parse requests, call into [`crate::core`] and format the
//! result; every business rule lives in the core modules.

mod error;
mod frk;
mod godown;
mod outturn;
mod paddy;
mod rice;

use crate::core::Scope;
use crate::errors::{Error, Result};
use axum::Router;
use sea_orm::DatabaseConnection;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

/// Shared state handed to every handler.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Database connection pool
    pub database: DatabaseConnection,
}

impl AppState {
    /// Wraps a connection pool for use as router state.
    pub fn new(database: DatabaseConnection) -> Arc<Self> {
        Arc::new(Self { database })
    }
}

/// Builds the application router with permissive CORS and request tracing.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .merge(paddy::routes())
        .merge(rice::routes())
        .merge(frk::routes())
        .merge(outturn::routes())
        .merge(godown::routes())
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Resolves the mandatory `company`/`year` pair of a request.
fn require_scope(company: Option<String>, year: Option<i32>) -> Result<Scope> {
    match (company, year) {
        (Some(company), Some(year)) => Scope::new(company, year),
        _ => Err(Error::validation("Company and year are required.")),
    }
}

/// Query string carrying only a scope.
#[derive(Debug, Default, serde::Deserialize)]
struct ScopeQuery {
    company: Option<String>,
    year: Option<i32>,
}

impl ScopeQuery {
    fn into_scope(self) -> Result<Scope> {
        require_scope(self.company, self.year)
    }
}
