/**
 * House Routes
 * CRUD endpoints for property listings and their media
 */
use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::media::MediaKind;
use crate::platform::models::{NewProperty, Property, PropertyChanges};
use crate::routes::extract::{ApiMultipart, ApiPath};
use crate::routes::upload::{discard_media, store_media, HouseForm, StoredMedia};
use crate::state::AppState;

// ============================================================================
// Response Types
// ============================================================================

#[derive(Debug, Serialize, Deserialize)]
pub struct PropertyResponse {
    pub success: bool,
    pub property: Property,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DeleteResponse {
    pub success: bool,
    pub message: String,
}

/// Text columns shared by create and update.
const TEXT_FIELDS: [&str; 5] = ["title", "location", "owner", "description", "phone"];

// ============================================================================
// Handlers
// ============================================================================

/// POST /api/houses - Create a listing (multipart: fields + optional image/video)
pub async fn create_house(
    State(state): State<AppState>,
    ApiMultipart(multipart): ApiMultipart,
) -> Result<Json<PropertyResponse>, ApiError> {
    let mut form = HouseForm::from_multipart(multipart).await?;

    let title = form.required("title")?;
    let price = form
        .price()?
        .ok_or_else(|| ApiError::Validation("price is required".to_string()))?;
    let location = form.required("location")?;
    let owner = form.required("owner")?;
    let phone = form.required("phone")?;

    let mut uploaded = Vec::new();

    let image = match form.take_file(MediaKind::Image) {
        Some(file) => Some(store_media(&state, MediaKind::Image, file).await?),
        None => None,
    };
    if let Some(media) = &image {
        uploaded.push((MediaKind::Image, media.path.clone()));
    }

    let video = match form.take_file(MediaKind::Video) {
        Some(file) => match store_media(&state, MediaKind::Video, file).await {
            Ok(media) => Some(media),
            Err(e) => {
                discard_uploads(&state, uploaded).await;
                return Err(e);
            }
        },
        None => None,
    };
    if let Some(media) = &video {
        uploaded.push((MediaKind::Video, media.path.clone()));
    }

    let (image_url, image_path) = split_media(image);
    let (video_url, video_path) = split_media(video);

    let inserted = state
        .records
        .insert_property(&NewProperty {
            title,
            price,
            location,
            owner,
            description: form.text("description"),
            phone,
            image_url,
            video_url,
            image_path,
            video_path,
        })
        .await;

    let property = match inserted {
        Ok(property) => property,
        Err(e) => {
            discard_uploads(&state, uploaded).await;
            return Err(e.into());
        }
    };

    tracing::info!(property_id = property.id, "property created");

    Ok(Json(PropertyResponse {
        success: true,
        property,
    }))
}

/// GET /api/houses - All listings, newest first
pub async fn list_houses(State(state): State<AppState>) -> Result<Json<Vec<Property>>, ApiError> {
    Ok(Json(state.records.list_properties().await?))
}

/// PUT /api/houses/{id} - Update fields and optionally replace media
///
/// A replaced object is deleted only after the record points at its
/// successor, so the record never references a removed object.
pub async fn update_house(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
    ApiMultipart(multipart): ApiMultipart,
) -> Result<Json<PropertyResponse>, ApiError> {
    let mut form = HouseForm::from_multipart(multipart).await?;
    let existing = state.records.get_property(id).await?;

    let [title, location, owner, description, phone] = TEXT_FIELDS.map(|f| form.text(f));
    let mut changes = PropertyChanges {
        title,
        price: form.price()?,
        location,
        owner,
        description,
        phone,
        ..Default::default()
    };

    let mut replaced = Vec::new();
    let mut uploaded = Vec::new();

    if let Some(file) = form.take_file(MediaKind::Image) {
        let media = store_media(&state, MediaKind::Image, file).await?;
        replaced.push((
            MediaKind::Image,
            state.urls.stored_path(
                existing.image_path.as_deref(),
                existing.image_url.as_deref(),
            ),
        ));
        uploaded.push((MediaKind::Image, media.path.clone()));
        changes.image_url = Some(media.url);
        changes.image_path = Some(media.path);
    }

    if let Some(file) = form.take_file(MediaKind::Video) {
        let media = match store_media(&state, MediaKind::Video, file).await {
            Ok(media) => media,
            Err(e) => {
                discard_uploads(&state, uploaded).await;
                return Err(e);
            }
        };
        replaced.push((
            MediaKind::Video,
            state.urls.stored_path(
                existing.video_path.as_deref(),
                existing.video_url.as_deref(),
            ),
        ));
        uploaded.push((MediaKind::Video, media.path.clone()));
        changes.video_url = Some(media.url);
        changes.video_path = Some(media.path);
    }

    let property = match state.records.update_property(id, &changes).await {
        Ok(property) => property,
        Err(e) => {
            discard_uploads(&state, uploaded).await;
            return Err(e.into());
        }
    };

    for (kind, path) in replaced {
        discard_media(&state, kind, path).await;
    }

    tracing::info!(property_id = id, "property updated");

    Ok(Json(PropertyResponse {
        success: true,
        property,
    }))
}

/// DELETE /api/houses/{id} - Remove a listing and its media
pub async fn delete_house(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
) -> Result<Json<DeleteResponse>, ApiError> {
    let house = state.records.get_property(id).await?;

    let image = state
        .urls
        .stored_path(house.image_path.as_deref(), house.image_url.as_deref());
    let video = state
        .urls
        .stored_path(house.video_path.as_deref(), house.video_url.as_deref());

    discard_media(&state, MediaKind::Image, image).await;
    discard_media(&state, MediaKind::Video, video).await;

    state.records.delete_property(id).await?;

    tracing::info!(property_id = id, "property deleted");

    Ok(Json(DeleteResponse {
        success: true,
        message: "Deleted property and media".to_string(),
    }))
}

/// Removes objects this request stored before a later step failed.
async fn discard_uploads(state: &AppState, uploaded: Vec<(MediaKind, String)>) {
    for (kind, path) in uploaded {
        discard_media(state, kind, Some(path)).await;
    }
}

fn split_media(media: Option<StoredMedia>) -> (Option<String>, Option<String>) {
    match media {
        Some(StoredMedia { path, url }) => (Some(url), Some(path)),
        None => (None, None),
    }
}
