//! In-memory platform used by tests and local demos.

use async_trait::async_trait;
use axum::body::Bytes;
use chrono::Utc;
use std::{
    collections::BTreeMap,
    sync::atomic::{AtomicBool, Ordering},
    time::Duration,
};
use tokio::sync::RwLock;

use super::models::{
    NewProperty, NewSelection, Property, PropertyChanges, Selection, SelectionWithProperty,
    SiteUser,
};
use super::{ObjectStore, PlatformError, PlatformResult, Records};

#[derive(Debug, Clone, PartialEq)]
pub struct StoredObject {
    pub bytes: Bytes,
    pub content_type: String,
}

#[derive(Default)]
struct Tables {
    next_property_id: i64,
    next_selection_id: i64,
    properties: Vec<Property>,
    selections: Vec<Selection>,
    site_users: Vec<SiteUser>,
}

#[derive(Default)]
pub struct MemoryPlatform {
    tables: RwLock<Tables>,
    objects: RwLock<BTreeMap<String, StoredObject>>,
    fail_removals: AtomicBool,
    rejected_folder: RwLock<Option<String>>,
}

impl MemoryPlatform {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed `site_users`, oldest first.
    pub async fn add_site_user(&self, user: SiteUser) {
        self.tables.write().await.site_users.push(user);
    }

    pub async fn object_paths(&self) -> Vec<String> {
        self.objects.read().await.keys().cloned().collect()
    }

    pub async fn object(&self, path: &str) -> Option<StoredObject> {
        self.objects.read().await.get(path).cloned()
    }

    /// Make every `remove_object` call fail, to exercise best-effort cleanup.
    pub fn fail_removals(&self, fail: bool) {
        self.fail_removals.store(fail, Ordering::SeqCst);
    }

    /// Reject uploads whose path starts with `folder/`, as an oversized object would be.
    pub async fn reject_uploads_under(&self, folder: &str) {
        *self.rejected_folder.write().await = Some(format!("{folder}/"));
    }
}

/// Newest first; ids break ties between rows created in the same instant.
fn newest_first(properties: &[Property]) -> Vec<Property> {
    let mut sorted = properties.to_vec();
    sorted.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
    sorted
}

#[async_trait]
impl Records for MemoryPlatform {
    async fn list_properties(&self) -> PlatformResult<Vec<Property>> {
        Ok(newest_first(&self.tables.read().await.properties))
    }

    async fn get_property(&self, id: i64) -> PlatformResult<Property> {
        self.tables
            .read()
            .await
            .properties
            .iter()
            .find(|p| p.id == id)
            .cloned()
            .ok_or_else(|| PlatformError::NotFound("Property".to_string()))
    }

    async fn insert_property(&self, new: &NewProperty) -> PlatformResult<Property> {
        let mut tables = self.tables.write().await;
        tables.next_property_id += 1;
        let property = Property {
            id: tables.next_property_id,
            title: new.title.clone(),
            price: Some(new.price),
            location: new.location.clone(),
            owner: new.owner.clone(),
            description: new.description.clone(),
            phone: new.phone.clone(),
            image_url: new.image_url.clone(),
            video_url: new.video_url.clone(),
            image_path: new.image_path.clone(),
            video_path: new.video_path.clone(),
            created_at: Utc::now(),
        };
        tables.properties.push(property.clone());
        Ok(property)
    }

    async fn update_property(
        &self,
        id: i64,
        changes: &PropertyChanges,
    ) -> PlatformResult<Property> {
        let mut tables = self.tables.write().await;
        let property = tables
            .properties
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| PlatformError::NotFound("Property".to_string()))?;
        changes.apply_to(property);
        Ok(property.clone())
    }

    async fn delete_property(&self, id: i64) -> PlatformResult<()> {
        // Deleting a missing row is a no-op, as with a filtered DELETE.
        let mut tables = self.tables.write().await;
        tables.properties.retain(|p| p.id != id);
        // selected_properties.property_id is ON DELETE CASCADE
        tables.selections.retain(|s| s.property_id != id);
        Ok(())
    }

    async fn insert_selection(&self, new: &NewSelection) -> PlatformResult<Selection> {
        let mut tables = self.tables.write().await;
        if !tables.properties.iter().any(|p| p.id == new.property_id) {
            return Err(PlatformError::Api {
                status: 409,
                message: format!(
                    "insert or update on table \"selected_properties\" violates foreign key constraint (property_id={})",
                    new.property_id
                ),
            });
        }
        tables.next_selection_id += 1;
        let selection = Selection {
            id: tables.next_selection_id,
            user_id: new.user_id.clone(),
            property_id: new.property_id,
            selected_at: Utc::now(),
        };
        tables.selections.push(selection.clone());
        Ok(selection)
    }

    async fn list_selections(&self) -> PlatformResult<Vec<SelectionWithProperty>> {
        let tables = self.tables.read().await;
        let mut joined: Vec<SelectionWithProperty> = tables
            .selections
            .iter()
            .map(|s| SelectionWithProperty {
                id: s.id,
                user_id: s.user_id.clone(),
                property_id: s.property_id,
                selected_at: s.selected_at,
                properties: tables
                    .properties
                    .iter()
                    .find(|p| p.id == s.property_id)
                    .cloned(),
            })
            .collect();
        joined.sort_by(|a, b| b.selected_at.cmp(&a.selected_at).then(b.id.cmp(&a.id)));
        Ok(joined)
    }

    async fn list_site_users(&self) -> PlatformResult<Vec<SiteUser>> {
        Ok(self
            .tables
            .read()
            .await
            .site_users
            .iter()
            .rev()
            .cloned()
            .collect())
    }

    async fn ping(&self) -> PlatformResult<Duration> {
        Ok(Duration::ZERO)
    }
}

#[async_trait]
impl ObjectStore for MemoryPlatform {
    async fn put_object(
        &self,
        path: &str,
        bytes: Bytes,
        content_type: &str,
    ) -> PlatformResult<String> {
        if let Some(folder) = self.rejected_folder.read().await.as_deref() {
            if path.starts_with(folder) {
                return Err(PlatformError::Api {
                    status: 413,
                    message: "The object exceeded the maximum allowed size".to_string(),
                });
            }
        }
        let mut objects = self.objects.write().await;
        if objects.contains_key(path) {
            return Err(PlatformError::Api {
                status: 409,
                message: "The resource already exists".to_string(),
            });
        }
        objects.insert(
            path.to_string(),
            StoredObject {
                bytes,
                content_type: content_type.to_string(),
            },
        );
        Ok(path.to_string())
    }

    async fn remove_object(&self, path: &str) -> PlatformResult<()> {
        if self.fail_removals.load(Ordering::SeqCst) {
            return Err(PlatformError::Api {
                status: 500,
                message: "storage unavailable".to_string(),
            });
        }
        self.objects.write().await.remove(path);
        Ok(())
    }

    async fn ping(&self) -> PlatformResult<Duration> {
        Ok(Duration::ZERO)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_property(title: &str) -> NewProperty {
        NewProperty {
            title: title.to_string(),
            price: 100.0,
            location: "Kigali".to_string(),
            owner: "Owner".to_string(),
            description: None,
            phone: "0780000000".to_string(),
            image_url: None,
            video_url: None,
            image_path: None,
            video_path: None,
        }
    }

    #[tokio::test]
    async fn test_properties_list_newest_first() {
        let platform = MemoryPlatform::new();
        platform.insert_property(&new_property("first")).await.unwrap();
        platform.insert_property(&new_property("second")).await.unwrap();

        let titles: Vec<String> = platform
            .list_properties()
            .await
            .unwrap()
            .into_iter()
            .map(|p| p.title)
            .collect();
        assert_eq!(titles, vec!["second", "first"]);
    }

    #[tokio::test]
    async fn test_selection_requires_existing_property() {
        let platform = MemoryPlatform::new();
        let err = platform
            .insert_selection(&NewSelection {
                user_id: "alice".to_string(),
                property_id: 99,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, PlatformError::Api { status: 409, .. }));
    }

    #[tokio::test]
    async fn test_deleting_property_drops_its_selections() {
        let platform = MemoryPlatform::new();
        let kept = platform.insert_property(&new_property("kept")).await.unwrap();
        let gone = platform.insert_property(&new_property("gone")).await.unwrap();
        for property_id in [kept.id, gone.id] {
            platform
                .insert_selection(&NewSelection {
                    user_id: "alice".to_string(),
                    property_id,
                })
                .await
                .unwrap();
        }

        platform.delete_property(gone.id).await.unwrap();

        let selections = platform.list_selections().await.unwrap();
        assert_eq!(selections.len(), 1);
        assert_eq!(selections[0].property_id, kept.id);
    }

    #[tokio::test]
    async fn test_objects_are_not_overwritten() {
        let platform = MemoryPlatform::new();
        platform
            .put_object("images/a.png", Bytes::from_static(b"a"), "image/png")
            .await
            .unwrap();
        let err = platform
            .put_object("images/a.png", Bytes::from_static(b"b"), "image/png")
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "The resource already exists");
        assert_eq!(
            platform.object("images/a.png").await.unwrap().bytes,
            Bytes::from_static(b"a")
        );
    }
}
