//! Remote store connection settings, read once at process start.

use crate::error::ConfigError;

pub const URL_VAR: &str = "SUPABASE_URL";
pub const KEY_VAR: &str = "SUPABASE_KEY";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    pub url: String,
    pub key: String,
}

impl StoreConfig {
    /// Load from the process environment, after merging a `.env` file from
    /// the working directory if one exists.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|name| dotenvy::var(name).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let url = lookup(URL_VAR)
            .filter(|v| !v.trim().is_empty())
            .ok_or(ConfigError::Missing(URL_VAR))?;
        let key = lookup(KEY_VAR)
            .filter(|v| !v.trim().is_empty())
            .ok_or(ConfigError::Missing(KEY_VAR))?;

        let url = url.trim().to_string();
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(ConfigError::Invalid {
                name: URL_VAR,
                reason: format!("expected an http(s) URL, got {url:?}"),
            });
        }

        Ok(Self {
            url,
            key: key.trim().to_string(),
        })
    }
}
