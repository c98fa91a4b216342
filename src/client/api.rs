//! HTTP client for the gateway's listing and selection endpoints.

use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use serde_json::json;

use super::ClientError;
use crate::platform::models::{Property, Selection};
use crate::routes::selections::SelectionResponse;
use crate::routes::ErrorResponse;

#[derive(Clone)]
pub struct GatewayClient {
    http: Client,
    base_url: String,
}

impl GatewayClient {
    pub fn new(base_url: &str) -> Result<Self, ClientError> {
        let http = Client::builder()
            .user_agent(concat!("renthub-client/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// GET /api/houses, newest first.
    pub async fn list_properties(&self) -> Result<Vec<Property>, ClientError> {
        let response = self.http.get(self.url("/api/houses")).send().await?;
        read_json(response).await
    }

    /// POST /api/select-house
    pub async fn select_property(
        &self,
        user_id: &str,
        property_id: i64,
    ) -> Result<Selection, ClientError> {
        let response = self
            .http
            .post(self.url("/api/select-house"))
            .json(&json!({ "user_id": user_id, "property_id": property_id }))
            .send()
            .await?;
        let body: SelectionResponse = read_json(response).await?;
        Ok(body.selection)
    }
}

async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T, ClientError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response.json::<T>().await?);
    }

    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ErrorResponse>(&body)
        .map(|e| e.error)
        .unwrap_or(body);
    Err(ClientError::Gateway {
        status: status.as_u16(),
        message,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::storage::MemoryStore;
    use crate::client::{ClientApp, Registration};
    use crate::config::AppConfig;
    use crate::platform::models::NewProperty;
    use crate::platform::Records;
    use crate::state::AppState;
    use std::collections::HashMap;

    async fn spawn_gateway() -> (GatewayClient, i64) {
        let vars: HashMap<String, String> = [
            ("SUPABASE_URL", "https://demo.supabase.co"),
            ("SUPABASE_SERVICE_ROLE", "service-key"),
        ]
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
        let config = AppConfig::from_vars(vars).unwrap();
        let (state, platform) = AppState::in_memory(&config.supabase_url, &config.bucket);

        let property = platform
            .insert_property(&NewProperty {
                title: "Garden flat".into(),
                price: 300000.0,
                location: "Kigali".into(),
                owner: "Aline".into(),
                description: Some("Two bedrooms".into()),
                phone: "0788111222".into(),
                image_url: None,
                video_url: None,
                image_path: None,
                video_path: None,
            })
            .await
            .unwrap();

        let app = crate::create_app(state, &config);
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        (GatewayClient::new(&format!("http://{addr}/")).unwrap(), property.id)
    }

    #[tokio::test]
    async fn test_list_and_select_through_gateway() {
        let (gateway, property_id) = spawn_gateway().await;

        let houses = gateway.list_properties().await.unwrap();
        assert_eq!(houses.len(), 1);
        assert_eq!(houses[0].title, "Garden flat");

        let selection = gateway.select_property("alice", property_id).await.unwrap();
        assert_eq!(selection.user_id, "alice");
        assert_eq!(selection.property_id, property_id);
    }

    #[tokio::test]
    async fn test_gateway_error_message_is_surfaced() {
        let (gateway, _) = spawn_gateway().await;
        let err = gateway.select_property("alice", 4242).await.unwrap_err();
        match err {
            ClientError::Gateway { status, message } => {
                assert_eq!(status, 400);
                assert!(message.contains("foreign key"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_app_selects_as_logged_in_user() {
        let (gateway, property_id) = spawn_gateway().await;
        let mut app = ClientApp::load(MemoryStore::new()).unwrap();

        assert!(matches!(
            app.select_property(&gateway, property_id).await,
            Err(ClientError::NotLoggedIn)
        ));

        app.register(&Registration {
            username: "alice".into(),
            phone: "0788000000".into(),
            password: "pw1".into(),
            confirm_password: "pw1".into(),
        })
        .unwrap();
        app.login("alice", "pw1").unwrap();
        app.refresh_properties(&gateway).await.unwrap();
        assert!(app.render_properties().contains("Garden flat"));

        let selection = app.select_property(&gateway, property_id).await.unwrap();
        assert_eq!(selection.user_id, "alice");
    }
}
