//! Multipart parsing and media storage for the house endpoints.

use axum::{body::Bytes, extract::Multipart};
use std::collections::HashMap;

use crate::error::ApiError;
use crate::media::{object_path, MediaKind};
use crate::state::AppState;

const FALLBACK_CONTENT_TYPE: &str = "application/octet-stream";

#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Bytes,
}

/// A stored object and the public URL derived from it.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredMedia {
    pub path: String,
    pub url: String,
}

/// Text fields plus at most one image and one video.
#[derive(Debug, Default)]
pub struct HouseForm {
    fields: HashMap<String, String>,
    image: Option<UploadedFile>,
    video: Option<UploadedFile>,
}

/// Keep only the final path segment of a client-supplied name.
fn base_name(file_name: &str) -> String {
    let name = file_name
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or_default()
        .replace('\0', "");
    if name.is_empty() || name == "." || name == ".." {
        "upload".to_string()
    } else {
        name
    }
}

impl HouseForm {
    pub async fn from_multipart(mut multipart: Multipart) -> Result<Self, ApiError> {
        let mut form = HouseForm::default();

        while let Some(field) = multipart.next_field().await? {
            let name = field.name().unwrap_or_default().to_string();

            match MediaKind::from_field_name(&name) {
                Some(kind) => {
                    let file_name = field.file_name().map(base_name);
                    let content_type = field
                        .content_type()
                        .unwrap_or(FALLBACK_CONTENT_TYPE)
                        .to_string();
                    let bytes = field.bytes().await?;

                    // An untouched file input still submits an empty part.
                    if bytes.is_empty() {
                        continue;
                    }

                    let file = UploadedFile {
                        file_name: file_name.unwrap_or_else(|| kind.field_name().to_string()),
                        content_type,
                        bytes,
                    };
                    // First file per field wins.
                    let slot = match kind {
                        MediaKind::Image => &mut form.image,
                        MediaKind::Video => &mut form.video,
                    };
                    if slot.is_none() {
                        *slot = Some(file);
                    }
                }
                None => {
                    let value = field.text().await?;
                    form.fields.insert(name, value);
                }
            }
        }

        Ok(form)
    }

    /// Trimmed value of a text field, `None` when absent or blank.
    pub fn text(&self, name: &str) -> Option<String> {
        self.fields
            .get(name)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }

    pub fn required(&self, name: &str) -> Result<String, ApiError> {
        self.text(name)
            .ok_or_else(|| ApiError::Validation(format!("{name} is required")))
    }

    pub fn price(&self) -> Result<Option<f64>, ApiError> {
        self.text("price")
            .map(|raw| {
                raw.replace(',', "")
                    .parse::<f64>()
                    .ok()
                    .filter(|p| p.is_finite() && *p >= 0.0)
                    .ok_or_else(|| ApiError::Validation("price must be a number".to_string()))
            })
            .transpose()
    }

    pub fn take_file(&mut self, kind: MediaKind) -> Option<UploadedFile> {
        match kind {
            MediaKind::Image => self.image.take(),
            MediaKind::Video => self.video.take(),
        }
    }
}

/// Upload one file under its kind's folder and derive its public URL.
pub async fn store_media(
    state: &AppState,
    kind: MediaKind,
    file: UploadedFile,
) -> Result<StoredMedia, ApiError> {
    let path = object_path(
        kind,
        &file.file_name,
        chrono::Utc::now().timestamp_millis(),
    );
    let size = file.bytes.len();
    let stored = state
        .storage
        .put_object(&path, file.bytes, &file.content_type)
        .await?;

    tracing::info!(path = %stored, size, content_type = %file.content_type, "media uploaded");

    Ok(StoredMedia {
        url: state.urls.public_url(&stored),
        path: stored,
    })
}

/// Best-effort removal of a replaced or orphaned object.
pub async fn discard_media(state: &AppState, kind: MediaKind, path: Option<String>) {
    let Some(path) = path else {
        return;
    };
    match state.storage.remove_object(&path).await {
        Ok(()) => tracing::info!(path = %path, "media deleted"),
        Err(e) => tracing::warn!(
            path = %path,
            error = %e,
            "{} delete warning",
            kind.field_name()
        ),
    }
}
