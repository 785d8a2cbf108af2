/// Represents the API version to target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiVersion {
    /// V2 API version (current)
    V2,
}

impl ApiVersion {
    const fn as_str(self) -> &'static str {
        match self {
            Self::V2 => "v2",
        }
    }
}

// --- URL Construction ---

/// Default production base URL.
pub const DEFAULT_BASE_URL: &str = "https://app.secureredact.co.uk";

/// Represents the Secure Redact API endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    /// Exchange the Basic credential for a bearer token
    FetchToken,
    /// Query media processing status
    FetchMediaStatus,
    /// Create a user account
    CreateUser,
    /// Upload a video, whole or in chunks
    UploadMedia,
    /// Start a redaction job
    RedactMedia,
    /// Delete a media resource
    DeleteMedia,
    /// Log a user in
    LoginUser,
    /// Download redacted media
    DownloadMedia,
    /// List or create projects
    Projects,
}

impl Endpoint {
    const fn as_str(self) -> &'static str {
        match self {
            Self::FetchToken => "token",
            Self::FetchMediaStatus => "info",
            Self::CreateUser => "signup",
            Self::UploadMedia => "video",
            Self::RedactMedia => "redact",
            Self::DeleteMedia => "video/delete",
            Self::LoginUser => "login",
            Self::DownloadMedia => "download",
            Self::Projects => "projects",
        }
    }
}

/// Constructs the full URL for an endpoint under the given base URL.
#[must_use]
pub fn build_url(base_url: &str, endpoint: Endpoint) -> String {
    format!(
        "{}/api/{}/{}",
        base_url.trim_end_matches('/'),
        ApiVersion::V2.as_str(),
        endpoint.as_str()
    )
}

/// Serializes query parameters into a query string.
///
/// Pairs whose value is `None` are omitted entirely; keys and values of the
/// remaining pairs are percent-encoded. Insertion order is preserved. Keys
/// are expected in wire convention (snake_case) at the call site.
#[must_use]
pub fn build_query(pairs: &[(&str, Option<String>)]) -> String {
    let mut parts = Vec::new();
    for (key, value) in pairs {
        if let Some(value) = value {
            parts.push(format!(
                "{}={}",
                urlencoding::encode(key),
                urlencoding::encode(value)
            ));
        }
    }
    parts.join("&")
}

/// Appends a query string to a URL, leaving the URL untouched when every
/// pair is `None`.
#[must_use]
pub fn with_query(url: String, pairs: &[(&str, Option<String>)]) -> String {
    let query = build_query(pairs);
    if query.is_empty() {
        url
    } else {
        format!("{url}?{query}")
    }
}
