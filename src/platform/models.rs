//! Records exchanged with the remote platform's tables.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Rows written before validation existed may carry nulls in text columns.
fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// A listed house (`properties` table)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Property {
    pub id: i64,
    #[serde(deserialize_with = "null_as_empty")]
    pub title: String,
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(deserialize_with = "null_as_empty")]
    pub location: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub owner: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(deserialize_with = "null_as_empty")]
    pub phone: String,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub video_url: Option<String>,
    /// Object path inside the bucket, kept next to the URL it was derived from.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video_path: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// New property for insertion
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewProperty {
    pub title: String,
    pub price: f64,
    pub location: String,
    pub owner: String,
    pub description: Option<String>,
    pub phone: String,
    pub image_url: Option<String>,
    pub video_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub video_path: Option<String>,
}

/// Partial property update; absent fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PropertyChanges {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub video_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub video_path: Option<String>,
}

impl PropertyChanges {
    /// Apply onto an existing record; used by the in-memory platform.
    pub fn apply_to(&self, property: &mut Property) {
        if let Some(title) = &self.title {
            property.title = title.clone();
        }
        if let Some(price) = self.price {
            property.price = Some(price);
        }
        if let Some(location) = &self.location {
            property.location = location.clone();
        }
        if let Some(owner) = &self.owner {
            property.owner = owner.clone();
        }
        if let Some(description) = &self.description {
            property.description = Some(description.clone());
        }
        if let Some(phone) = &self.phone {
            property.phone = phone.clone();
        }
        if let Some(url) = &self.image_url {
            property.image_url = Some(url.clone());
        }
        if let Some(url) = &self.video_url {
            property.video_url = Some(url.clone());
        }
        if let Some(path) = &self.image_path {
            property.image_path = Some(path.clone());
        }
        if let Some(path) = &self.video_path {
            property.video_path = Some(path.clone());
        }
    }
}

/// A user's choice of a property (`selected_properties` table)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Selection {
    pub id: i64,
    pub user_id: String,
    pub property_id: i64,
    pub selected_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewSelection {
    pub user_id: String,
    pub property_id: i64,
}

/// Selection joined with the property it points at.
///
/// The field name matches the embedded resource key PostgREST returns for
/// `properties(*)`; it is null when the property has since been deleted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectionWithProperty {
    pub id: i64,
    pub user_id: String,
    pub property_id: i64,
    pub selected_at: DateTime<Utc>,
    #[serde(default)]
    pub properties: Option<Property>,
}

/// Server-recorded registrant (`site_users` table)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SiteUser {
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub is_admin: bool,
}
