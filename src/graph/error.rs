/// Load-level failures surfaced to the data-loading caller.
///
/// Individual malformed records never reach this type; they are dropped
/// during normalization and validation.
#[derive(Debug, thiserror::Error)]
pub enum PayloadError {
	/// The payload text is not valid JSON.
	#[error("payload is not valid JSON: {0}")]
	Json(#[from] serde_json::Error),
	/// The top-level value is neither a list nor an object.
	#[error("unsupported payload shape: expected {0}")]
	UnsupportedShape(&'static str),
}

/// Result alias for payload and configuration loading.
pub type Result<T> = std::result::Result<T, PayloadError>;
