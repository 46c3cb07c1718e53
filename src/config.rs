//! Viewer configuration, embedded in the host page as JSON.

use std::time::Duration;

use serde::Deserialize;

use crate::error::{Error, Result};

/// Settings read from the `viewer-config` script element.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
	/// Base URL of the graph query service.
	pub backend_url: String,
	/// Repository loaded on start. Empty means "ask the service for the first one".
	pub repo: String,
	/// Bearer token sent with every request.
	pub token: Option<String>,
	/// Idle time after the last keystroke before auto-complete fires.
	pub search_debounce_ms: u64,
	/// Fill the viewport and follow window resizes.
	pub fullscreen: bool,
}

impl Default for ViewerConfig {
	fn default() -> Self {
		Self {
			backend_url: "http://127.0.0.1:5000".to_string(),
			repo: String::new(),
			token: None,
			search_debounce_ms: 500,
			fullscreen: true,
		}
	}
}

impl ViewerConfig {
	/// Parses and validates a JSON document. Missing fields take defaults.
	pub fn from_json(text: &str) -> Result<Self> {
		let config: Self = serde_json::from_str(text)?;
		if config.backend_url.trim().is_empty() {
			return Err(Error::Config("backend_url must not be empty".into()));
		}
		Ok(config)
	}

	pub fn search_debounce(&self) -> Duration {
		Duration::from_millis(self.search_debounce_ms)
	}
}
