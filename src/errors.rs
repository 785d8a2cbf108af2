use thiserror::Error;

/// Defines errors that can occur when interacting with the Secure Redact API.
///
/// Every error maps to an HTTP-status-like code via [`RedactError::status_code`];
/// failures that did not come with a genuine HTTP status report 500.
///
/// # Example: Handling API Errors
///
/// ```ignore
/// match client.fetch_media_status(params).await {
///     Err(RedactError::Api { status_code: 403, .. }) => {
///         // both the original request and the transparent retry were rejected
///     }
///     Err(err) => eprintln!("request failed with status {}", err.status_code()),
///     Ok(info) => println!("media {} is {:?}", info.media_id, info.status),
/// }
/// ```
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum RedactError {
    /// Client id or client secret was empty at token-derivation time.
    #[error("invalid credentials: {0}")]
    Credentials(String),
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
    /// The API reported a failure: a non-success HTTP status, or an explicit
    /// non-null `error` field in an otherwise successful response body.
    #[error("API error (HTTP {status_code}): {message}")]
    Api {
        /// HTTP status of the response that carried the error.
        status_code: u16,
        /// Error message from the API response body.
        message: String,
    },
    /// The API returned a successful response whose body does not match the
    /// endpoint contract (not valid JSON, or a missing/mistyped required field).
    ///
    /// This represents an issue with the API response itself, not the request,
    /// and is never retried.
    #[error("malformed API response: {0}")]
    MalformedResponse(String),
    /// Reading an upload source from disk failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl RedactError {
    /// Returns the HTTP-status-like code carried by this error.
    ///
    /// [`RedactError::Api`] reports the status of the failing response;
    /// everything else (credential errors, malformed bodies, network and
    /// I/O failures) reports 500.
    #[must_use]
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Api { status_code, .. } => *status_code,
            Self::Http(err) => err.status().map_or(500, |status| status.as_u16()),
            Self::Credentials(_) | Self::Json(_) | Self::MalformedResponse(_) | Self::Io(_) => 500,
        }
    }

    /// Returns `true` if this error is an authorization failure (HTTP 403)
    /// reported by the API.
    ///
    /// The client refreshes its bearer token and retries once when an
    /// authenticated request fails this way.
    #[must_use]
    pub fn is_auth_failure(&self) -> bool {
        matches!(self, Self::Api { status_code: 403, .. })
    }
}
