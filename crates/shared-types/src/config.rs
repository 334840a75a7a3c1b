//! # Runtime Configuration
//!
//! Connection endpoints and storage location handed over by the host during
//! `quill_init`. The notification and WebSocket endpoints are optional;
//! a core without them simply never connects the listener.

use crate::errors::ArgumentError;

/// Configuration for the core runtime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Base URL of the remote HTTP API.
    pub api_url: String,
    /// Optional push-notification endpoint.
    pub notify_url: Option<String>,
    /// Optional WebSocket endpoint for change notifications.
    pub ws_url: Option<String>,
    /// Directory the host reserves for core-owned storage.
    pub storage_dir: String,
}

impl Config {
    /// Validate host-supplied configuration before the runtime starts.
    ///
    /// Required fields must be non-empty; optional endpoints, when present,
    /// must be non-empty too (a present-but-blank URL is a host bug).
    pub fn validate(&self) -> Result<(), ArgumentError> {
        require_non_empty("api_url", &self.api_url)?;
        require_non_empty("storage_dir", &self.storage_dir)?;

        if let Some(url) = &self.notify_url {
            require_non_empty("notify_url", url)?;
        }
        if let Some(url) = &self.ws_url {
            require_non_empty("ws_url", url)?;
        }

        Ok(())
    }
}

fn require_non_empty(name: &str, value: &str) -> Result<(), ArgumentError> {
    if value.trim().is_empty() {
        return Err(ArgumentError::empty(name));
    }
    Ok(())
}
