use fieldrules_core::error::CoreError;

/// Errors from fetching a schema's rules.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// The HTTP request itself failed (network, DNS, TLS, timeout).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The rules service returned a non-2xx status code.
    #[error("Rules API error ({status}): {body}")]
    Api {
        status: u16,
        /// Raw response body for debugging.
        body: String,
    },

    /// The service answered but reported `success: false`.
    #[error("Rules API rejected the request: {0}")]
    Rejected(String),

    /// A rule in the payload could not be decoded.
    #[error(transparent)]
    Decode(#[from] CoreError),
}
