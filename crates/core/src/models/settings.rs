use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Environment variable holding the Polygon.io API key.
pub const POLYGON_API_KEY_ENV: &str = "POLYGON_API_KEY";

/// User-configurable settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Settings {
    /// Optional API keys for providers that require them.
    /// Keys: provider name (e.g., "polygon").
    /// Values: the API key string.
    pub api_keys: HashMap<String, String>,
}

impl Settings {
    /// Build settings from the process environment, picking up
    /// `POLYGON_API_KEY` when set and non-empty.
    pub fn from_env() -> Self {
        let mut api_keys = HashMap::new();
        if let Ok(key) = std::env::var(POLYGON_API_KEY_ENV) {
            if !key.trim().is_empty() {
                api_keys.insert("polygon".to_string(), key.trim().to_string());
            }
        }
        Self { api_keys }
    }
}
