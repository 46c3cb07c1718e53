//! Crate-wide error type.

use thiserror::Error;

/// Errors surfaced by the query client, the workspace, and configuration loading.
///
/// The graph model itself never fails: malformed merge input is absorbed by
/// placeholder synthesis, so none of these variants leave the model half-updated.
#[derive(Debug, Error)]
pub enum Error {
	/// A required argument was absent. Raised before any request is sent.
	#[error("missing required parameter: {0}")]
	MissingParameter(&'static str),

	/// The query service answered with a non-2xx status.
	#[error("query service returned {status}: {body}")]
	Upstream { status: u16, body: String },

	/// The request never produced a response.
	#[error("request failed: {0}")]
	Transport(#[from] reqwest::Error),

	/// A response (or embedded document) did not have the expected shape.
	#[error("malformed payload: {0}")]
	Decode(#[from] serde_json::Error),

	/// Viewer configuration was present but unusable.
	#[error("configuration error: {0}")]
	Config(String),
}

impl Error {
	/// Build an upstream error from a status code and the raw response body.
	pub fn upstream(status: u16, body: impl Into<String>) -> Self {
		Error::Upstream {
			status,
			body: body.into(),
		}
	}

	/// Whether the message is meant for the person using the viewer as-is.
	///
	/// Upstream bodies and validation messages are readable; transport and
	/// decode failures get a generic notice instead.
	pub fn is_user_facing(&self) -> bool {
		matches!(self, Error::MissingParameter(_) | Error::Upstream { .. })
	}

	/// Text to show in a notification.
	pub fn notice(&self) -> String {
		match self {
			Error::Upstream { body, .. } if !body.trim().is_empty() => body.clone(),
			e if e.is_user_facing() => e.to_string(),
			_ => "Something went wrong while talking to the graph service".to_string(),
		}
	}
}

/// Result alias used throughout the crate.
pub type Result<T, E = Error> = std::result::Result<T, E>;
