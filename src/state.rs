use std::sync::Arc;

use crate::config::AppConfig;
use crate::media::PublicUrls;
use crate::platform::{MemoryPlatform, ObjectStore, PlatformResult, Records, SupabaseClient};

/// Shared per-process handles; cloned into every handler.
#[derive(Clone)]
pub struct AppState {
    pub records: Arc<dyn Records>,
    pub storage: Arc<dyn ObjectStore>,
    pub urls: PublicUrls,
}

impl AppState {
    pub fn new(
        records: Arc<dyn Records>,
        storage: Arc<dyn ObjectStore>,
        urls: PublicUrls,
    ) -> Self {
        Self {
            records,
            storage,
            urls,
        }
    }

    pub fn supabase(config: &AppConfig) -> PlatformResult<Self> {
        let client = Arc::new(SupabaseClient::new(
            &config.supabase_url,
            &config.service_role_key,
            &config.bucket,
        )?);

        Ok(Self::new(
            client.clone(),
            client,
            PublicUrls::new(&config.supabase_url, &config.bucket),
        ))
    }

    /// State backed by one [`MemoryPlatform`], returned alongside for inspection.
    pub fn in_memory(base_url: &str, bucket: &str) -> (Self, Arc<MemoryPlatform>) {
        let platform = Arc::new(MemoryPlatform::new());
        let state = Self::new(
            platform.clone(),
            platform.clone(),
            PublicUrls::new(base_url, bucket),
        );
        (state, platform)
    }
}
