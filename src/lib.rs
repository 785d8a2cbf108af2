//! A Rust client library for the Secure Redact video-redaction API.
//!
//! The [`Client`] authenticates with a client id/secret pair, uploads media
//! (splitting large files into sequential chunks), polls processing status,
//! starts redaction jobs, and manages users and projects.
//!
//! # Authentication
//!
//! The client derives a Basic credential from the id/secret pair once, and
//! exchanges it for short-lived bearer tokens on demand. When an
//! authenticated request is rejected with HTTP 403, the client drops the
//! cached token, fetches a fresh one, and retries the request exactly once
//! before surfacing the error.
//!
//! # Example
//!
//! ```no_run
//! use secure_redact::{Client, MediaFile, UploadMediaParams};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let client = Client::new("client_id", "client_secret")?;
//!
//! // Upload a local video; files over the chunk size are sent in
//! // sequential chunks automatically.
//! let response = client
//!     .upload_media(UploadMediaParams {
//!         video_tag: Some("dashcam.mp4".to_string()),
//!         detect_faces: Some(true),
//!         file: Some(MediaFile::from_path("dashcam.mp4", "video/mp4")),
//!         ..Default::default()
//!     })
//!     .await?;
//! println!("uploaded as {}", response.media_id);
//! # Ok(())
//! # }
//! ```

mod auth;
mod client;
mod errors;
mod http;
mod types;
mod upload;

pub use auth::build_basic_token;
pub use client::{Client, ClientBuilder};
pub use errors::RedactError;
pub use types::{
    BlurType, CreateProjectParams, CreateUserParams, DeleteMediaParams, DeleteMediaResponse,
    DownloadMediaParams, DownloadMediaResponse, FetchMediaStatusParams, FetchProjectsParams,
    FetchTokenParams, FileInfo, LoginResponse, LoginUserParams, MediaFile, MediaInfo, MediaStatus,
    Project, ProjectsResponse, RedactMediaParams, RedactResponse, UploadMediaParams,
    UploadResponse, UploadSource, UserInfo,
};
pub use upload::{CHUNK_SIZE, ChunkSource, FileSource, MemorySource};
