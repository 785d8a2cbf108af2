use crate::auth::build_basic_token;
use crate::errors::RedactError;
use crate::http::common::{DEFAULT_BASE_URL, Endpoint, build_url, with_query};
use crate::http::error_helpers::deserialize_with_context;
use crate::http::wire;
use crate::types::{
    CreateProjectParams, CreateUserParams, DeleteMediaParams, DeleteMediaResponse,
    DownloadMediaParams, DownloadMediaResponse, FetchMediaStatusParams, FetchProjectsParams,
    FetchTokenParams, LoginResponse, LoginUserParams, MediaFile, MediaInfo, Project,
    ProjectsResponse, RedactMediaParams, RedactResponse, UploadMediaParams, UploadResponse,
    UploadSource, UserInfo,
};
use crate::upload::{
    CHUNK_SIZE, ChunkSource, FileSource, MemorySource, chunk_headers, chunk_len, total_chunks,
};
use futures_util::future::BoxFuture;
use reqwest::Client as ReqwestClient;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

/// Maximum number of transparent token-refresh retries per operation.
///
/// One initial attempt plus at most one retry: a persistently failing
/// authorization observes exactly two token-endpoint hits.
const MAX_RETRIES: u32 = 1;

/// The multipart form field carrying the binary video payload.
const VIDEO_FIELD: &str = "video";

/// The main client for interacting with the Secure Redact API.
///
/// A client owns a Basic credential derived once from the account's client
/// id and secret, and a cached bearer token it fetches lazily and refreshes
/// transparently when an authenticated request is rejected with HTTP 403.
/// Cloning is cheap; clones share the cached token.
///
/// # Example
///
/// ```no_run
/// use secure_redact::{Client, FetchMediaStatusParams};
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let client = Client::new("client_id", "client_secret")?;
///
/// let info = client
///     .fetch_media_status(FetchMediaStatusParams {
///         media_id: "media-123".to_string(),
///         username: None,
///     })
///     .await?;
/// println!("media {} is {}", info.media_id, info.status.as_str());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct Client {
    basic_token: String,
    bearer: Arc<Mutex<Option<String>>>,
    base_url: String,
    retry_server_errors: bool,
    http_client: ReqwestClient,
}

/// Builder for [`Client`] instances.
///
/// # Example
///
/// ```
/// use secure_redact::Client;
/// use std::time::Duration;
///
/// let client = Client::builder("client_id", "client_secret")
///     .timeout(Duration::from_secs(120))
///     .connect_timeout(Duration::from_secs(10))
///     .build()
///     .unwrap();
/// ```
#[derive(Debug)]
pub struct ClientBuilder {
    client_id: String,
    client_secret: String,
    base_url: Option<String>,
    timeout: Option<Duration>,
    connect_timeout: Option<Duration>,
    retry_server_errors: bool,
}

impl ClientBuilder {
    /// Overrides the base URL of the service.
    ///
    /// Useful for staging environments and for tests against a local mock
    /// server. Defaults to the production URL.
    #[must_use]
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Sets the total request timeout.
    ///
    /// Uploads of large chunks can take a while on slow links; if not set,
    /// reqwest's default (no timeout) applies.
    #[must_use]
    pub const fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Sets the connection timeout.
    #[must_use]
    pub const fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = Some(timeout);
        self
    }

    /// Also refresh the token and retry once when the API answers HTTP 500.
    ///
    /// Off by default: a 500 may mean the request already took effect
    /// server-side before the failure surfaced, so retrying can duplicate
    /// side effects such as media creation. Enable only for workloads where
    /// the affected operations are idempotent.
    #[must_use]
    pub const fn retry_server_errors(mut self, retry: bool) -> Self {
        self.retry_server_errors = retry;
        self
    }

    /// Builds the [`Client`].
    ///
    /// # Errors
    ///
    /// Returns [`RedactError::Credentials`] if the client id or secret is
    /// empty, or [`RedactError::Http`] if the HTTP client cannot be built.
    pub fn build(self) -> Result<Client, RedactError> {
        let basic_token = build_basic_token(&self.client_id, &self.client_secret)?;

        let mut builder = ReqwestClient::builder();
        if let Some(timeout) = self.timeout {
            builder = builder.timeout(timeout);
        }
        if let Some(connect_timeout) = self.connect_timeout {
            builder = builder.connect_timeout(connect_timeout);
        }
        let http_client = builder.build()?;

        Ok(Client {
            basic_token,
            bearer: Arc::new(Mutex::new(None)),
            base_url: self
                .base_url
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            retry_server_errors: self.retry_server_errors,
            http_client,
        })
    }
}

impl Client {
    /// Creates a new builder for [`Client`] instances.
    #[must_use]
    pub fn builder(client_id: impl Into<String>, client_secret: impl Into<String>) -> ClientBuilder {
        ClientBuilder {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            base_url: None,
            timeout: None,
            connect_timeout: None,
            retry_server_errors: false,
        }
    }

    /// Creates a new client with default settings.
    ///
    /// # Errors
    ///
    /// Returns [`RedactError::Credentials`] if the client id or secret is
    /// empty.
    pub fn new(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
    ) -> Result<Self, RedactError> {
        Self::builder(client_id, client_secret).build()
    }

    fn url(&self, endpoint: Endpoint) -> String {
        build_url(&self.base_url, endpoint)
    }

    // --- Token handling ---

    /// Exchanges the Basic credential for a bearer token and caches it for
    /// subsequent calls.
    ///
    /// With a `username`, the issued token is scoped to that acting user.
    /// Calling this directly is optional; every authenticated operation
    /// fetches a token on demand.
    ///
    /// # Errors
    ///
    /// Returns an error if the token endpoint rejects the credential or the
    /// response's `token` field is not a string.
    pub async fn fetch_token(&self, params: FetchTokenParams) -> Result<String, RedactError> {
        self.fetch_token_inner(params.username.as_deref()).await
    }

    async fn fetch_token_inner(&self, username: Option<&str>) -> Result<String, RedactError> {
        let url = with_query(
            self.url(Endpoint::FetchToken),
            &[("username", username.map(str::to_string))],
        );
        let body = wire::get_json(&self.http_client, &url, &self.basic_token).await?;
        let token = body.get("token").and_then(Value::as_str).ok_or_else(|| {
            RedactError::MalformedResponse("invalid token type returned".to_string())
        })?;
        let bearer = format!("Bearer {token}");
        *self.bearer.lock().await = Some(bearer.clone());
        Ok(bearer)
    }

    /// True when a failed attempt warrants a token refresh and one retry.
    fn should_refresh(&self, err: &RedactError) -> bool {
        match err {
            RedactError::Api { status_code, .. } => {
                *status_code == 403 || (self.retry_server_errors && *status_code == 500)
            }
            _ => false,
        }
    }

    /// Runs `requester` with a valid bearer token.
    ///
    /// A token is fetched up front when a `username` is supplied (tokens may
    /// be issued per acting user) or when none is cached. If the attempt
    /// fails with a refreshable status, the cached token is dropped and the
    /// whole attempt - token fetch included - runs once more.
    async fn with_auth_retry<'a, T>(
        &'a self,
        username: Option<&'a str>,
        requester: impl Fn(String) -> BoxFuture<'a, Result<T, RedactError>> + 'a,
    ) -> Result<T, RedactError> {
        let mut retries = 0;
        loop {
            let attempt = async {
                let cached = self.bearer.lock().await.clone();
                let bearer = match cached {
                    Some(token) if username.is_none() => token,
                    _ => self.fetch_token_inner(username).await?,
                };
                requester(bearer).await
            }
            .await;

            match attempt {
                Err(err) if retries < MAX_RETRIES && self.should_refresh(&err) => {
                    log::debug!(
                        "request failed with HTTP {}, refreshing token and retrying",
                        err.status_code()
                    );
                    *self.bearer.lock().await = None;
                    retries += 1;
                }
                other => return other,
            }
        }
    }

    // --- Media operations ---

    /// Queries the processing status of a media resource.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails after the transparent retry, or
    /// if the response is missing `media_id`, `username`, or `status`.
    pub async fn fetch_media_status(
        &self,
        params: FetchMediaStatusParams,
    ) -> Result<MediaInfo, RedactError> {
        let url = with_query(
            self.url(Endpoint::FetchMediaStatus),
            &[("media_id", Some(params.media_id.clone()))],
        );
        let body = self
            .with_auth_retry(params.username.as_deref(), |bearer| {
                let url = url.clone();
                Box::pin(async move { wire::get_json(&self.http_client, &url, &bearer).await })
            })
            .await?;
        deserialize_with_context(body, "MediaInfo")
    }

    /// Uploads a video for detection.
    ///
    /// Without a local [`MediaFile`](crate::MediaFile) the service ingests
    /// the video itself from `media_path`. With one, the payload travels as
    /// multipart form data under the `video` field; payloads larger than
    /// [`CHUNK_SIZE`](crate::CHUNK_SIZE) are split into sequential chunks
    /// correlated by a server-issued file identifier, and the final chunk's
    /// response is the one returned.
    ///
    /// # Errors
    ///
    /// Returns an error if the source cannot be read, if any chunk's request
    /// fails after the transparent retry, or if the response is missing
    /// `media_id` or `file_info`. Failed uploads are not resumed; restart
    /// from the first chunk.
    pub async fn upload_media(
        &self,
        params: UploadMediaParams,
    ) -> Result<UploadResponse, RedactError> {
        let url = self.url(Endpoint::UploadMedia);
        let body = match &params.file {
            None => {
                self.with_auth_retry(None, |bearer| {
                    let url = url.clone();
                    let params = &params;
                    Box::pin(async move {
                        wire::post_json(&self.http_client, &url, params, &bearer).await
                    })
                })
                .await?
            }
            Some(file) => self.upload_from_source(&url, &params, file).await?,
        };
        deserialize_with_context(body, "UploadResponse")
    }

    /// Drives a multipart upload from a resolved chunk source.
    async fn upload_from_source(
        &self,
        url: &str,
        params: &UploadMediaParams,
        file: &MediaFile,
    ) -> Result<Value, RedactError> {
        let mut source: Box<dyn ChunkSource> = match &file.source {
            UploadSource::Path(path) => Box::new(FileSource::open(path).await?),
            UploadSource::Bytes(data) => Box::new(MemorySource::new(data.clone())),
        };
        let size = source.size();
        let fields = wire::form_text_fields(params)?;

        let chunks = total_chunks(size);
        if chunks <= 1 {
            let data = source.read_range(0, size).await?;
            return self.send_chunk(url, &fields, file, data, None).await;
        }

        log::debug!("chunked upload: {size} bytes in {chunks} chunks of {CHUNK_SIZE}");
        let mut file_id: Option<String> = None;
        let mut last = Value::Null;
        for index in 0..chunks {
            let data = source
                .read_range(index * CHUNK_SIZE, chunk_len(size, index))
                .await?;
            let headers = chunk_headers(chunks, index, file_id.as_deref());
            let body = self
                .send_chunk(url, &fields, file, data, Some(headers))
                .await?;
            if file_id.is_none() {
                let id = body.get("file_id").and_then(Value::as_str).ok_or_else(|| {
                    RedactError::MalformedResponse("invalid file_id type returned".to_string())
                })?;
                log::debug!("chunk 0 accepted, file id {id}");
                file_id = Some(id.to_string());
            }
            last = body;
        }
        Ok(last)
    }

    /// Sends one multipart request: the binary part plus the string-coerced
    /// scalar fields, with chunk metadata headers when chunked.
    async fn send_chunk(
        &self,
        url: &str,
        fields: &[(String, String)],
        file: &MediaFile,
        data: Vec<u8>,
        headers: Option<Vec<(&'static str, String)>>,
    ) -> Result<Value, RedactError> {
        self.with_auth_retry(None, |bearer| {
            let url = url.to_string();
            let data = data.clone();
            let fields = fields.to_vec();
            let headers = headers.clone().unwrap_or_default();
            let file_name = file.name.clone();
            let mime_type = file.mime_type.clone();
            Box::pin(async move {
                let part = reqwest::multipart::Part::bytes(data)
                    .file_name(file_name)
                    .mime_str(&mime_type)?;
                let mut form = reqwest::multipart::Form::new().part(VIDEO_FIELD, part);
                for (key, value) in fields {
                    form = form.text(key, value);
                }
                wire::post_multipart(&self.http_client, &url, form, &headers, &bearer).await
            })
        })
        .await
    }

    /// Starts a redaction job for previously detected media.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails after the transparent retry.
    pub async fn redact_media(
        &self,
        params: RedactMediaParams,
    ) -> Result<RedactResponse, RedactError> {
        let url = self.url(Endpoint::RedactMedia);
        let body = self
            .with_auth_retry(params.username.as_deref(), |bearer| {
                let url = url.clone();
                let params = &params;
                Box::pin(
                    async move { wire::post_json(&self.http_client, &url, params, &bearer).await },
                )
            })
            .await?;
        deserialize_with_context(body, "RedactResponse")
    }

    /// Deletes a media resource.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails after the transparent retry, or
    /// if the response is missing `media_id` or `message`.
    pub async fn delete_media(
        &self,
        params: DeleteMediaParams,
    ) -> Result<DeleteMediaResponse, RedactError> {
        let url = self.url(Endpoint::DeleteMedia);
        let body = self
            .with_auth_retry(None, |bearer| {
                let url = url.clone();
                let params = &params;
                Box::pin(
                    async move { wire::post_json(&self.http_client, &url, params, &bearer).await },
                )
            })
            .await?;
        deserialize_with_context(body, "DeleteMediaResponse")
    }

    /// Downloads the redacted media file.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails after the transparent retry.
    pub async fn download_media(
        &self,
        params: DownloadMediaParams,
    ) -> Result<DownloadMediaResponse, RedactError> {
        let url = with_query(
            self.url(Endpoint::DownloadMedia),
            &[("media_id", Some(params.media_id.clone()))],
        );
        let media = self
            .with_auth_retry(params.username.as_deref(), |bearer| {
                let url = url.clone();
                Box::pin(async move { wire::download(&self.http_client, &url, &bearer).await })
            })
            .await?;
        Ok(DownloadMediaResponse { media })
    }

    // --- User operations ---

    /// Creates a user account under this client's organization.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails after the transparent retry, or
    /// if the response is missing `username`.
    pub async fn create_user(&self, params: CreateUserParams) -> Result<UserInfo, RedactError> {
        let url = self.url(Endpoint::CreateUser);
        let body = self
            .with_auth_retry(None, |bearer| {
                let url = url.clone();
                let params = &params;
                Box::pin(
                    async move { wire::post_json(&self.http_client, &url, params, &bearer).await },
                )
            })
            .await?;
        deserialize_with_context(body, "UserInfo")
    }

    /// Logs a user in, returning the URL their session should open on.
    ///
    /// Always fetches a token scoped to the acting username, even when one
    /// is already cached.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails after the transparent retry, or
    /// if the response is missing `redirect_url` or `success`.
    pub async fn login_user(&self, params: LoginUserParams) -> Result<LoginResponse, RedactError> {
        let url = self.url(Endpoint::LoginUser);
        let body = self
            .with_auth_retry(Some(&params.username), |bearer| {
                let url = url.clone();
                let params = &params;
                Box::pin(
                    async move { wire::post_json(&self.http_client, &url, params, &bearer).await },
                )
            })
            .await?;
        deserialize_with_context(body, "LoginResponse")
    }

    // --- Project operations ---

    /// Lists projects, newest first, one page at a time.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails after the transparent retry.
    pub async fn fetch_projects(
        &self,
        params: FetchProjectsParams,
    ) -> Result<ProjectsResponse, RedactError> {
        let url = with_query(
            self.url(Endpoint::Projects),
            &[
                ("page", params.page.map(|page| page.to_string())),
                ("page_size", params.page_size.map(|size| size.to_string())),
            ],
        );
        let body = self
            .with_auth_retry(None, |bearer| {
                let url = url.clone();
                Box::pin(async move { wire::get_json(&self.http_client, &url, &bearer).await })
            })
            .await?;
        deserialize_with_context(body, "ProjectsResponse")
    }

    /// Creates a project.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails after the transparent retry, or
    /// if the response is missing `project_id`.
    pub async fn create_project(
        &self,
        params: CreateProjectParams,
    ) -> Result<Project, RedactError> {
        let url = self.url(Endpoint::Projects);
        let body = self
            .with_auth_retry(None, |bearer| {
                let url = url.clone();
                let params = &params;
                Box::pin(
                    async move { wire::post_json(&self.http_client, &url, params, &bearer).await },
                )
            })
            .await?;
        deserialize_with_context(body, "Project")
    }
}
