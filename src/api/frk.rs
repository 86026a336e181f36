//! `/api/frk` handlers.

use super::{AppState, ScopeQuery, require_scope};
use crate::{
    core::{
        frk::{self, LedgerAudit},
        input,
    },
    entities::FrkMovementModel,
    errors::{Error, Result},
};
use axum::{
    Json, Router,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
    http::StatusCode,
    routing::{delete, get},
};
use chrono::NaiveDate;
use serde::Deserialize;
use std::sync::Arc;

pub(super) fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/frk", get(list).post(record))
        .route("/api/frk/audit", get(audit))
        .route("/api/frk/:id", delete(remove))
}

#[derive(Debug, Deserialize)]
struct RecordMovement {
    date: NaiveDate,
    company: Option<String>,
    #[serde(default, deserialize_with = "input::optional")]
    year: Option<i32>,
    #[serde(default, alias = "KGs", deserialize_with = "input::optional")]
    credited_kgs: Option<f64>,
    #[serde(default, alias = "debited_KGs", deserialize_with = "input::optional")]
    debited_kgs: Option<f64>,
}

async fn record(
    State(state): State<Arc<AppState>>,
    body: std::result::Result<Json<RecordMovement>, JsonRejection>,
) -> Result<(StatusCode, Json<FrkMovementModel>)> {
    let Json(request) = body?;
    let scope = require_scope(request.company, request.year)?;
    let movement = frk::record_movement(
        &state.database,
        &scope,
        request.date,
        request.credited_kgs,
        request.debited_kgs,
    )
    .await?;
    Ok((StatusCode::CREATED, Json(movement)))
}

async fn list(
    State(state): State<Arc<AppState>>,
    query: std::result::Result<Query<ScopeQuery>, QueryRejection>,
) -> Result<Json<Vec<FrkMovementModel>>> {
    let Query(query) = query?;
    let scope = query.into_scope()?;
    Ok(Json(frk::list_movements(&state.database, &scope).await?))
}

async fn audit(
    State(state): State<Arc<AppState>>,
    query: std::result::Result<Query<ScopeQuery>, QueryRejection>,
) -> Result<Json<LedgerAudit>> {
    let Query(query) = query?;
    let scope = query.into_scope()?;
    Ok(Json(frk::audit(&state.database, &scope).await?))
}

async fn remove(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    query: std::result::Result<Query<ScopeQuery>, QueryRejection>,
) -> Result<Json<FrkMovementModel>> {
    let id: i64 = id
        .parse()
        .map_err(|_| Error::validation(format!("Invalid FRK movement id {id}")))?;
    let Query(query) = query?;
    let scope = query.into_scope()?;
    Ok(Json(frk::delete_movement(&state.database, id, &scope).await?))
}
