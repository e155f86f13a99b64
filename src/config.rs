//! Runtime configuration.
//!
//! Everything is read once at startup and handed to the clients that need it.
//! Credentials are optional at load time: a missing token only fails the
//! requests that actually need it.

use std::time::Duration;

use crate::error::AppError;

pub const DEFAULT_AIRTABLE_API_URL: &str = "https://api.airtable.com/v0";
pub const DEFAULT_TABLE: &str = "Portfolio";
pub const DEFAULT_SITE_URL: &str = "http://localhost:3000";
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 15;

#[derive(Debug, Clone)]
pub struct AirtableConfig {
    pub credential: Option<String>,
    pub base_id: Option<String>,
    pub table: String,
    pub api_url: String,
}

impl AirtableConfig {
    /// Returns `(credential, base_id)` or the first one that is missing.
    pub fn credentials(&self) -> Result<(&str, &str), AppError> {
        let credential = self.credential.as_deref().ok_or_else(|| {
            AppError::MissingCredentials("Missing Airtable credentials: AIRTABLE_PAT".to_string())
        })?;
        let base_id = self.base_id.as_deref().ok_or_else(|| {
            AppError::MissingCredentials(
                "Missing Airtable credentials: AIRTABLE_BASE_ID".to_string(),
            )
        })?;
        Ok((credential, base_id))
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub airtable: AirtableConfig,
    pub listing_url: Option<String>,
    pub site_url: String,
    pub bind_addr: String,
    pub http_timeout: Duration,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any key lookup. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let http_timeout = match get("HTTP_TIMEOUT_SECS") {
            Some(raw) => raw.parse::<u64>().map_err(|_| {
                AppError::ValidationError(format!("HTTP_TIMEOUT_SECS is not a number: {}", raw))
            })?,
            None => DEFAULT_HTTP_TIMEOUT_SECS,
        };

        Ok(Self {
            airtable: AirtableConfig {
                credential: get("AIRTABLE_PAT"),
                base_id: get("AIRTABLE_BASE_ID"),
                table: get("AIRTABLE_TABLE").unwrap_or_else(|| DEFAULT_TABLE.to_string()),
                api_url: get("AIRTABLE_API_URL")
                    .unwrap_or_else(|| DEFAULT_AIRTABLE_API_URL.to_string()),
            },
            listing_url: get("DOC_LISTING_URL"),
            site_url: get("SITE_URL")
                .unwrap_or_else(|| DEFAULT_SITE_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
            bind_addr: get("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string()),
            http_timeout: Duration::from_secs(http_timeout),
        })
    }
}
