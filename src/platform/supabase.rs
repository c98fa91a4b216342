//! Supabase REST client: PostgREST for tables, Storage API for media.

use async_trait::async_trait;
use axum::body::Bytes;
use reqwest::{Client, RequestBuilder, Response, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::{Duration, Instant};

use super::models::{
    NewProperty, NewSelection, Property, PropertyChanges, Selection, SelectionWithProperty,
    SiteUser,
};
use super::{ObjectStore, PlatformError, PlatformResult, Records};

const PROPERTIES: &str = "properties";
const SELECTIONS: &str = "selected_properties";
const SITE_USERS: &str = "site_users";

const SELECTION_JOIN: &str = "id,user_id,selected_at,property_id,properties(*)";

#[derive(Clone)]
pub struct SupabaseClient {
    http: Client,
    base: Url,
    base_url: String,
    service_key: String,
    bucket: String,
}

impl SupabaseClient {
    pub fn new(base_url: &str, service_key: &str, bucket: &str) -> PlatformResult<Self> {
        let http = Client::builder()
            .user_agent(concat!("renthub-backend/", env!("CARGO_PKG_VERSION")))
            .build()?;

        let base_url = base_url.trim_end_matches('/').to_string();
        let base = Url::parse(&base_url)
            .ok()
            .filter(|url| !url.cannot_be_a_base())
            .ok_or_else(|| PlatformError::InvalidUrl(base_url.clone()))?;

        Ok(Self {
            http,
            base,
            base_url,
            service_key: service_key.to_string(),
            bucket: bucket.to_string(),
        })
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url, table)
    }

    /// Each path segment is percent-encoded, so `#` or `?` in a file name survive.
    fn object_url(&self, path: &str) -> Url {
        let mut url = self.base.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments
                .pop_if_empty()
                .extend(["storage", "v1", "object", self.bucket.as_str()])
                .extend(path.split('/'));
        }
        url
    }

    fn authed(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .header("apikey", &self.service_key)
            .bearer_auth(&self.service_key)
    }

    /// Requests that should echo the written rows back.
    fn returning(&self, request: RequestBuilder) -> RequestBuilder {
        self.authed(request).header("Prefer", "return=representation")
    }

    async fn select_rows<T: DeserializeOwned>(
        &self,
        table: &str,
        query: &[(&str, String)],
    ) -> PlatformResult<Vec<T>> {
        let response = self
            .authed(self.http.get(self.table_url(table)))
            .query(query)
            .send()
            .await?;
        read_json(response).await
    }
}

/// Map a platform response onto the typed result.
async fn read_json<T: DeserializeOwned>(response: Response) -> PlatformResult<T> {
    let response = check_status(response).await?;
    response
        .json::<T>()
        .await
        .map_err(|e| PlatformError::Decode(e.to_string()))
}

async fn check_status(response: Response) -> PlatformResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(api_error(status, &body))
}

/// PostgREST reports `message`; the storage API uses `message` or `error`.
fn api_error(status: StatusCode, body: &str) -> PlatformError {
    let message = serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| {
            ["message", "error", "msg"]
                .iter()
                .find_map(|key| v.get(*key).and_then(Value::as_str).map(str::to_string))
        })
        .or_else(|| Some(body.trim().to_string()).filter(|b| !b.is_empty()))
        .unwrap_or_else(|| {
            status
                .canonical_reason()
                .unwrap_or("platform error")
                .to_string()
        });

    PlatformError::Api {
        status: status.as_u16(),
        message,
    }
}

fn first_row<T>(rows: Vec<T>, what: &str) -> PlatformResult<T> {
    rows.into_iter()
        .next()
        .ok_or_else(|| PlatformError::NotFound(what.to_string()))
}

fn id_filter(id: i64) -> (&'static str, String) {
    ("id", format!("eq.{id}"))
}

#[async_trait]
impl Records for SupabaseClient {
    async fn list_properties(&self) -> PlatformResult<Vec<Property>> {
        self.select_rows(
            PROPERTIES,
            &[
                ("select", "*".to_string()),
                ("order", "created_at.desc".to_string()),
            ],
        )
        .await
    }

    async fn get_property(&self, id: i64) -> PlatformResult<Property> {
        let rows = self
            .select_rows(PROPERTIES, &[("select", "*".to_string()), id_filter(id)])
            .await?;
        first_row(rows, "Property")
    }

    async fn insert_property(&self, property: &NewProperty) -> PlatformResult<Property> {
        let response = self
            .returning(self.http.post(self.table_url(PROPERTIES)))
            .json(&[property])
            .send()
            .await?;
        let rows: Vec<Property> = read_json(response).await?;
        rows.into_iter()
            .next()
            .ok_or_else(|| PlatformError::Decode("insert returned no rows".to_string()))
    }

    async fn update_property(
        &self,
        id: i64,
        changes: &PropertyChanges,
    ) -> PlatformResult<Property> {
        let response = self
            .returning(self.http.patch(self.table_url(PROPERTIES)))
            .query(&[id_filter(id)])
            .json(changes)
            .send()
            .await?;
        let rows: Vec<Property> = read_json(response).await?;
        first_row(rows, "Property")
    }

    async fn delete_property(&self, id: i64) -> PlatformResult<()> {
        let response = self
            .authed(self.http.delete(self.table_url(PROPERTIES)))
            .query(&[id_filter(id)])
            .send()
            .await?;
        check_status(response).await?;
        Ok(())
    }

    async fn insert_selection(&self, selection: &NewSelection) -> PlatformResult<Selection> {
        let response = self
            .returning(self.http.post(self.table_url(SELECTIONS)))
            .json(&[selection])
            .send()
            .await?;
        let rows: Vec<Selection> = read_json(response).await?;
        rows.into_iter()
            .next()
            .ok_or_else(|| PlatformError::Decode("insert returned no rows".to_string()))
    }

    async fn list_selections(&self) -> PlatformResult<Vec<SelectionWithProperty>> {
        self.select_rows(
            SELECTIONS,
            &[
                ("select", SELECTION_JOIN.to_string()),
                ("order", "selected_at.desc".to_string()),
            ],
        )
        .await
    }

    async fn list_site_users(&self) -> PlatformResult<Vec<SiteUser>> {
        self.select_rows(
            SITE_USERS,
            &[
                ("select", "full_name,phone,is_admin".to_string()),
                ("order", "created_at.desc".to_string()),
            ],
        )
        .await
    }

    async fn ping(&self) -> PlatformResult<Duration> {
        let start = Instant::now();
        let _: Vec<Value> = self
            .select_rows(
                PROPERTIES,
                &[("select", "id".to_string()), ("limit", "1".to_string())],
            )
            .await?;
        Ok(start.elapsed())
    }
}

#[async_trait]
impl ObjectStore for SupabaseClient {
    async fn put_object(
        &self,
        path: &str,
        bytes: Bytes,
        content_type: &str,
    ) -> PlatformResult<String> {
        let response = self
            .authed(self.http.post(self.object_url(path)))
            .header(reqwest::header::CONTENT_TYPE, content_type)
            .header("x-upsert", "false")
            .body(bytes)
            .send()
            .await?;
        let body: Value = read_json(response).await?;

        // `Key` comes back as "<bucket>/<path>".
        let bucket_prefix = format!("{}/", self.bucket);
        let stored = body
            .get("Key")
            .and_then(Value::as_str)
            .map(|key| key.strip_prefix(&bucket_prefix).unwrap_or(key).to_string())
            .unwrap_or_else(|| path.to_string());
        Ok(stored)
    }

    async fn remove_object(&self, path: &str) -> PlatformResult<()> {
        let url = format!("{}/storage/v1/object/{}", self.base_url, self.bucket);
        let response = self
            .authed(self.http.delete(url))
            .json(&serde_json::json!({ "prefixes": [path] }))
            .send()
            .await?;
        check_status(response).await?;
        Ok(())
    }

    async fn ping(&self) -> PlatformResult<Duration> {
        let start = Instant::now();
        let url = format!("{}/storage/v1/bucket/{}", self.base_url, self.bucket);
        let response = self.authed(self.http.get(url)).send().await?;
        check_status(response).await?;
        Ok(start.elapsed())
    }
}
