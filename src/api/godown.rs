//! `/api/paddy-godowns` and `/api/rice-godowns` handlers.

use super::AppState;
use crate::{
    core::godown,
    entities::{GodownKind, GodownModel},
    errors::Result,
};
use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    routing::get,
};
use serde::Deserialize;
use std::sync::Arc;

pub(super) fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/paddy-godowns", get(list_paddy).post(add_paddy))
        .route("/api/rice-godowns", get(list_rice).post(add_rice))
}

type NewGodownBody = std::result::Result<Json<NewGodown>, JsonRejection>;

#[derive(Debug, Deserialize)]
struct NewGodown {
    #[serde(default)]
    name: String,
}

async fn list(state: &AppState, kind: GodownKind) -> Result<Json<Vec<String>>> {
    Ok(Json(godown::list_godowns(&state.database, kind).await?))
}

async fn add(
    state: &AppState,
    body: NewGodownBody,
    kind: GodownKind,
) -> Result<(StatusCode, Json<GodownModel>)> {
    let Json(request) = body?;
    let created = godown::add_godown(&state.database, kind, &request.name).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

async fn list_paddy(State(state): State<Arc<AppState>>) -> Result<Json<Vec<String>>> {
    list(&state, GodownKind::Paddy).await
}

async fn add_paddy(
    State(state): State<Arc<AppState>>,
    body: NewGodownBody,
) -> Result<(StatusCode, Json<GodownModel>)> {
    add(&state, body, GodownKind::Paddy).await
}

async fn list_rice(State(state): State<Arc<AppState>>) -> Result<Json<Vec<String>>> {
    list(&state, GodownKind::Rice).await
}

async fn add_rice(
    State(state): State<Arc<AppState>>,
    body: NewGodownBody,
) -> Result<(StatusCode, Json<GodownModel>)> {
    add(&state, body, GodownKind::Rice).await
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use crate::api::{AppState, router};
    use crate::errors::Result;
    use crate::test_utils::*;
    use axum::http::{Method, StatusCode};
    use serde_json::json;

    #[tokio::test]
    async fn test_godown_lists() -> Result<()> {
        let app = router(AppState::new(setup_test_db().await?));

        let (status, created) = send(
            app.clone(),
            Method::POST,
            "/api/paddy-godowns",
            Some(json!({ "name": "North" })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(created["kind"], "paddy");

        let (status, _) = send(
            app.clone(),
            Method::POST,
            "/api/paddy-godowns",
            Some(json!({ "name": "North" })),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);

        let (status, _) = send(
            app.clone(),
            Method::POST,
            "/api/rice-godowns",
            Some(json!({ "name": "  " })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, paddy) = send(app.clone(), Method::GET, "/api/paddy-godowns", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(paddy, json!(["North"]));

        let (status, rice) = send(app, Method::GET, "/api/rice-godowns", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(rice, json!([]));
        Ok(())
    }
}
