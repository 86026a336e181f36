//! `/api/paddy` handlers.

use super::{AppState, ScopeQuery, require_scope};
use crate::{
    core::{
        input,
        paddy::{self, PaddyDetails},
    },
    entities::PaddyEntryModel,
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
        .route("/api/paddy", get(list).post(create))
        .route("/api/paddy/:key", put(update).delete(remove))
}

#[derive(Debug, Deserialize)]
struct CreatePaddy {
    company: Option<String>,
    #[serde(default, deserialize_with = "input::optional")]
    year: Option<i32>,
    #[serde(alias = "issueMemoId")]
    issue_memo_id: String,
    #[serde(flatten)]
    details: PaddyDetails,
}

#[derive(Debug, Deserialize)]
struct UpdatePaddy {
    company: Option<String>,
    #[serde(default, deserialize_with = "input::optional")]
    year: Option<i32>,
    #[serde(flatten)]
    details: PaddyDetails,
}

#[derive(Debug, Deserialize)]
struct ListPaddy {
    company: Option<String>,
    year: Option<i32>,
    #[serde(alias = "issueMemoId")]
    issue_memo_id: Option<String>,
}

async fn create(
    State(state): State<Arc<AppState>>,
    body: std::result::Result<Json<CreatePaddy>, JsonRejection>,
) -> Result<(StatusCode, Json<PaddyEntryModel>)> {
    let Json(request) = body?;
    let scope = require_scope(request.company, request.year)?;
    let entry =
        paddy::create_paddy_entry(&state.database, &scope, &request.issue_memo_id, request.details)
            .await?;
    Ok((StatusCode::CREATED, Json(entry)))
}

async fn list(
    State(state): State<Arc<AppState>>,
    query: std::result::Result<Query<ListPaddy>, QueryRejection>,
) -> Result<Json<Vec<PaddyEntryModel>>> {
    let Query(query) = query?;
    let scope = require_scope(query.company, query.year)?;
    let entries =
        paddy::list_paddy_entries(&state.database, &scope, query.issue_memo_id.as_deref()).await?;
    Ok(Json(entries))
}

async fn update(
    State(state): State<Arc<AppState>>,
    Path(issue_memo_id): Path<String>,
    body: std::result::Result<Json<UpdatePaddy>, JsonRejection>,
) -> Result<Json<PaddyEntryModel>> {
    let Json(request) = body?;
    let scope = require_scope(request.company, request.year)?;
    let entry =
        paddy::update_paddy_entry(&state.database, &scope, &issue_memo_id, request.details).await?;
    Ok(Json(entry))
}

async fn remove(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    query: std::result::Result<Query<ScopeQuery>, QueryRejection>,
) -> Result<Json<serde_json::Value>> {
    let id: i64 = id
        .parse()
        .map_err(|_| Error::validation(format!("Invalid paddy entry id {id}")))?;
    let Query(query) = query?;
    let scope = query.into_scope()?;
    paddy::delete_paddy_entry(&state.database, id, &scope).await?;
    Ok(Json(serde_json::json!({ "deleted": id })))
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use crate::api::{AppState, router};
    use crate::errors::Result;
    use crate::test_utils::*;
    use axum::http::{Method, StatusCode};
    use serde_json::json;

    fn paddy_body(memo: &str) -> serde_json::Value {
        json!({
            "company": "Acme",
            "year": 2024,
            "issue_memo_id": memo,
            "date": "2024-06-01",
            "godown": "North",
            "lorry_number": "AP-09-1234",
            "grade": "RPA",
            "moisture": 17.0,
            "onb_bags": 10,
            "ss_bags": 5,
            "swp_bags": 0,
            "nb_bags": 1,
            "net_weight": 1000.0
        })
    }

    #[tokio::test]
    async fn test_create_list_update_delete() -> Result<()> {
        let app = router(AppState::new(setup_test_db().await?));

        let (status, created) =
            send(app.clone(), Method::POST, "/api/paddy", Some(paddy_body("M-1"))).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(created["issue_memo_id"], "M-1");
        assert_eq!(created["grade"], "RPA");
        let id = created["id"].as_i64().unwrap();

        let (status, duplicate) =
            send(app.clone(), Method::POST, "/api/paddy", Some(paddy_body("M-1"))).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert!(duplicate["error"].as_str().unwrap().contains("M-1"));

        let mut changed = paddy_body("ignored");
        changed["net_weight"] = json!(900.0);
        let (status, updated) = send(app.clone(), Method::PUT, "/api/paddy/M-1", Some(changed)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(updated["net_weight"], 900.0);

        let (status, listed) = send(
            app.clone(),
            Method::GET,
            "/api/paddy?company=Acme&year=2024&issue_memo_id=M-1",
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(listed.as_array().unwrap().len(), 1);

        let (status, _) = send(
            app.clone(),
            Method::DELETE,
            &format!("/api/paddy/{id}?company=Acme&year=2024"),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let (status, _) = send(
            app,
            Method::DELETE,
            &format!("/api/paddy/{id}?company=Acme&year=2024"),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        Ok(())
    }

    #[tokio::test]
    async fn test_missing_scope_is_bad_request() -> Result<()> {
        let app = router(AppState::new(setup_test_db().await?));

        let (status, body) = send(app.clone(), Method::GET, "/api/paddy?company=Acme", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Company and year are required.");

        let mut no_company = paddy_body("M-2");
        no_company.as_object_mut().unwrap().remove("company");
        let (status, _) = send(app.clone(), Method::POST, "/api/paddy", Some(no_company)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let mut no_grade = paddy_body("M-3");
        no_grade.as_object_mut().unwrap().remove("grade");
        let (status, _) = send(app, Method::POST, "/api/paddy", Some(no_grade)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        Ok(())
    }

    #[tokio::test]
    async fn test_update_missing_is_not_found() -> Result<()> {
        let app = router(AppState::new(setup_test_db().await?));
        let (status, _) = send(app, Method::PUT, "/api/paddy/M-404", Some(paddy_body("M-404"))).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        Ok(())
    }

    #[tokio::test]
    async fn test_form_style_body_is_accepted() -> Result<()> {
        let app = router(AppState::new(setup_test_db().await?));
        let form = json!({
            "date": "2024-06-01",
            "godown": "North",
            "issueMemoId": "M-9",
            "lorryNo": "AP-01-1234",
            "grade": "RPA",
            "moisture": "17",
            "onbBags": "10",
            "ssBags": "5",
            "swpBags": "",
            "nbBags": "1",
            "tonsKgs": "1000",
            "company": "Acme",
            "year": "2024"
        });
        let (status, created) = send(app.clone(), Method::POST, "/api/paddy", Some(form)).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(created["issue_memo_id"], "M-9");
        assert_eq!(created["moisture"], 17.0);
        assert_eq!(created["swp_bags"], 0);
        assert_eq!(created["nb_bags"], 1);
        assert_eq!(created["net_weight"], 1000.0);

        let (status, listed) = send(
            app,
            Method::GET,
            "/api/paddy?issueMemoId=M-9&company=Acme&year=2024",
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(listed.as_array().unwrap().len(), 1);
        Ok(())
    }
}
