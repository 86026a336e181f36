//! `/api/rice` handlers.

use super::{AppState, ScopeQuery, require_scope};
use crate::{
    core::{
        input,
        rice::{self, DispatchOutcome, RiceDetails},
    },
    entities::RiceEntryModel,
    errors::{Error, Result},
};
use axum::{
    Json, Router,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
    http::StatusCode,
    routing::{get, put},
};
use serde::Deserialize;
use std::sync::Arc;

pub(super) fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/rice", get(list).post(create))
        .route("/api/rice/:key", put(update).delete(remove))
}

#[derive(Debug, Deserialize)]
struct CreateRice {
    company: Option<String>,
    #[serde(default, deserialize_with = "input::optional")]
    year: Option<i32>,
    #[serde(alias = "challanNo")]
    challan_number: String,
    #[serde(flatten)]
    details: RiceDetails,
}

#[derive(Debug, Deserialize)]
struct UpdateRice {
    company: Option<String>,
    #[serde(default, deserialize_with = "input::optional")]
    year: Option<i32>,
    #[serde(flatten)]
    details: RiceDetails,
}

#[derive(Debug, Deserialize)]
struct ListRice {
    company: Option<String>,
    year: Option<i32>,
    #[serde(alias = "challanNo")]
    challan_number: Option<String>,
}

async fn create(
    State(state): State<Arc<AppState>>,
    body: std::result::Result<Json<CreateRice>, JsonRejection>,
) -> Result<(StatusCode, Json<DispatchOutcome>)> {
    let Json(request) = body?;
    let scope = require_scope(request.company, request.year)?;
    let outcome =
        rice::create_rice_entry(&state.database, &scope, &request.challan_number, request.details)
            .await?;
    Ok((StatusCode::CREATED, Json(outcome)))
}

async fn list(
    State(state): State<Arc<AppState>>,
    query: std::result::Result<Query<ListRice>, QueryRejection>,
) -> Result<Json<Vec<RiceEntryModel>>> {
    let Query(query) = query?;
    let scope = require_scope(query.company, query.year)?;
    let entries =
        rice::list_rice_entries(&state.database, &scope, query.challan_number.as_deref()).await?;
    Ok(Json(entries))
}

async fn update(
    State(state): State<Arc<AppState>>,
    Path(challan_number): Path<String>,
    body: std::result::Result<Json<UpdateRice>, JsonRejection>,
) -> Result<Json<DispatchOutcome>> {
    let Json(request) = body?;
    let scope = require_scope(request.company, request.year)?;
    let outcome =
        rice::update_rice_entry(&state.database, &scope, &challan_number, request.details).await?;
    Ok(Json(outcome))
}

async fn remove(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    query: std::result::Result<Query<ScopeQuery>, QueryRejection>,
) -> Result<Json<serde_json::Value>> {
    let id: i64 = id
        .parse()
        .map_err(|_| Error::validation(format!("Invalid rice entry id {id}")))?;
    let Query(query) = query?;
    let scope = query.into_scope()?;
    rice::delete_rice_entry(&state.database, id, &scope).await?;
    Ok(Json(serde_json::json!({ "deleted": id })))
}
