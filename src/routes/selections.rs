/**
 * Selection Routes
 * Recording which user picked which house
 */
use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::routes::extract::ApiJson;
use crate::platform::models::{NewSelection, Selection, SelectionWithProperty};
use crate::state::AppState;

/// Browsers send ids as numbers or as form strings; accept both.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum LooseId {
    Number(i64),
    Text(String),
}

impl LooseId {
    fn into_text(self) -> Option<String> {
        match self {
            LooseId::Number(n) => Some(n.to_string()),
            LooseId::Text(s) => Some(s.trim().to_string()).filter(|s| !s.is_empty()),
        }
    }

    fn into_number(self) -> Option<i64> {
        match self {
            LooseId::Number(n) => Some(n),
            LooseId::Text(s) => s.trim().parse().ok(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct SelectHouseRequest {
    #[serde(default)]
    pub user_id: Option<LooseId>,
    #[serde(default)]
    pub property_id: Option<LooseId>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SelectionResponse {
    pub success: bool,
    pub selection: Selection,
}

/// POST /api/select-house
pub async fn select_house(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<SelectHouseRequest>,
) -> Result<Json<SelectionResponse>, ApiError> {
    let user_id = payload.user_id.and_then(LooseId::into_text);
    let property_id = payload.property_id.and_then(LooseId::into_number);

    let (Some(user_id), Some(property_id)) = (user_id, property_id) else {
        return Err(ApiError::Validation(
            "user_id and property_id are required".to_string(),
        ));
    };

    let selection = state
        .records
        .insert_selection(&NewSelection {
            user_id,
            property_id,
        })
        .await?;

    tracing::info!(
        selection_id = selection.id,
        property_id = selection.property_id,
        "house selected"
    );

    Ok(Json(SelectionResponse {
        success: true,
        selection,
    }))
}

/// GET /api/selected-houses - Selections joined with their property
pub async fn list_selected_houses(
    State(state): State<AppState>,
) -> Result<Json<Vec<SelectionWithProperty>>, ApiError> {
    Ok(Json(state.records.list_selections().await?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::models::NewProperty;
    use crate::platform::Records;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use axum::routing::{get, post};
    use axum::Router;
    use tower::ServiceExt;

    async fn setup() -> (Router, i64) {
        let (state, platform) = AppState::in_memory("https://demo.supabase.co", "property-media");
        let property = platform
            .insert_property(&NewProperty {
                title: "Lake view".into(),
                price: 90000.0,
                location: "Rubavu".into(),
                owner: "Eric".into(),
                description: None,
                phone: "0722000000".into(),
                image_url: None,
                video_url: None,
                image_path: None,
                video_path: None,
            })
            .await
            .unwrap();

        let router = Router::new()
            .route("/api/select-house", post(select_house))
            .route("/api/selected-houses", get(list_selected_houses))
            .with_state(state);
        (router, property.id)
    }

    async fn call(app: &Router, req: Request<Body>) -> (StatusCode, serde_json::Value) {
        let res = app.clone().oneshot(req).await.unwrap();
        let status = res.status();
        let body = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&body).unwrap())
    }

    fn post_json(json: serde_json::Value) -> Request<Body> {
        Request::post("/api/select-house")
            .header("content-type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_select_then_list_joined() {
        let (app, property_id) = setup().await;

        let (status, body) = call(
            &app,
            post_json(serde_json::json!({ "user_id": "alice", "property_id": property_id.to_string() })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert_eq!(body["selection"]["user_id"], "alice");
        assert_eq!(body["selection"]["property_id"], property_id);

        let (status, list) = call(
            &app,
            Request::get("/api/selected-houses").body(Body::empty()).unwrap(),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let rows = list.as_array().unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["properties"]["title"], "Lake view");
    }

    #[tokio::test]
    async fn test_select_requires_both_ids() {
        let (app, _) = setup().await;
        let (status, body) = call(&app, post_json(serde_json::json!({ "user_id": 5 }))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "user_id and property_id are required");
    }

    #[tokio::test]
    async fn test_select_unknown_property_is_bad_request() {
        let (app, _) = setup().await;
        let (status, body) = call(
            &app,
            post_json(serde_json::json!({ "user_id": 5, "property_id": 999 })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().contains("foreign key"));
    }
}
