use std::collections::HashMap;

/// Logging settings resolved from `ENVIRONMENT`, `LOG_LEVEL` and `LOG_DIR`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogSettings {
    pub environment: String,
    pub level: String,
    pub directory: String,
}

impl LogSettings {
    pub fn from_env() -> Self {
        Self::from_vars(&std::env::vars().collect())
    }

    pub fn from_vars(vars: &HashMap<String, String>) -> Self {
        let environment = vars
            .get("ENVIRONMENT")
            .cloned()
            .unwrap_or_else(|| "development".to_string());
        let level = vars.get("LOG_LEVEL").cloned().unwrap_or_else(|| {
            if environment == "production" {
                "info".to_string()
            } else {
                "debug".to_string()
            }
        });
        let directory = vars
            .get("LOG_DIR")
            .cloned()
            .unwrap_or_else(|| "logs".to_string());

        Self {
            environment,
            level,
            directory,
        }
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    /// Filter used when `RUST_LOG` is unset.
    pub fn default_directive(&self) -> String {
        format!(
            "renthub_backend={},tower_http=debug,axum=debug",
            self.level
        )
    }
}
