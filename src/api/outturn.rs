//! `/api/outturn` handlers.

use super::{AppState, ScopeQuery};
use crate::{
    core::outturn::{self, OutturnReport, OutturnVariant},
    errors::Result,
};
use axum::{
    Json, Router,
    extract::{Query, State, rejection::QueryRejection},
    routing::get,
};
use std::sync::Arc;

pub(super) fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/outturn", get(total))
        .route("/api/outturn/a", get(grade_a))
        .route("/api/outturn/c", get(grade_c))
}

async fn report(
    state: &AppState,
    query: std::result::Result<Query<ScopeQuery>, QueryRejection>,
    variant: OutturnVariant,
) -> Result<Json<OutturnReport>> {
    let Query(query) = query?;
    let scope = query.into_scope()?;
    Ok(Json(
        outturn::compute_outturn(&state.database, &scope, variant).await?,
    ))
}

async fn total(
    State(state): State<Arc<AppState>>,
    query: std::result::Result<Query<ScopeQuery>, QueryRejection>,
) -> Result<Json<OutturnReport>> {
    report(&state, query, OutturnVariant::Total).await
}

async fn grade_a(
    State(state): State<Arc<AppState>>,
    query: std::result::Result<Query<ScopeQuery>, QueryRejection>,
) -> Result<Json<OutturnReport>> {
    report(&state, query, OutturnVariant::GradeA).await
}

async fn grade_c(
    State(state): State<Arc<AppState>>,
    query: std::result::Result<Query<ScopeQuery>, QueryRejection>,
) -> Result<Json<OutturnReport>> {
    report(&state, query, OutturnVariant::GradeC).await
}
