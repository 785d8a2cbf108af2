//! Public parameter and response types for the Secure Redact API.
//!
//! Parameter structs double as wire bodies for the POST endpoints: they
//! derive [`Serialize`] with snake_case field names matching the wire
//! format, and fields that travel out-of-band (acting usernames, upload
//! sources) are marked `#[serde(skip)]`. Response structs derive
//! [`Deserialize`]; a missing or mistyped required field surfaces as
//! [`RedactError::MalformedResponse`](crate::RedactError::MalformedResponse)
//! naming the offending field.

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

// --- Token ---

/// Parameters for [`Client::fetch_token`](crate::Client::fetch_token).
#[derive(Debug, Clone, Default)]
pub struct FetchTokenParams {
    /// Acting username to scope the issued token to, if any.
    pub username: Option<String>,
}

// --- Media status ---

/// Parameters for [`Client::fetch_media_status`](crate::Client::fetch_media_status).
#[derive(Debug, Clone)]
pub struct FetchMediaStatusParams {
    /// Identifier of the media to inspect.
    pub media_id: String,
    /// Acting username; forces a fresh token scoped to that user.
    pub username: Option<String>,
}

/// Lifecycle state of an uploaded media resource.
///
/// Newly uploaded media reports [`MediaStatus::Processing`] until detection
/// completes, then [`MediaStatus::Detected`]. This enum is marked
/// `#[non_exhaustive]`: states the service adds later are preserved in the
/// [`MediaStatus::Unknown`] variant rather than rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum MediaStatus {
    /// Detection is still running.
    Processing,
    /// Detection finished; the media is ready for redaction.
    Detected,
    /// Processing failed; see [`MediaInfo::error`].
    Failed,
    /// A status string this library does not recognize, preserved verbatim.
    Unknown {
        /// The unrecognized status string from the API.
        status: String,
    },
}

impl MediaStatus {
    /// Returns true if detection is still running.
    #[must_use]
    pub fn is_processing(&self) -> bool {
        matches!(self, Self::Processing)
    }

    /// Returns true if detection finished and the media is ready.
    #[must_use]
    pub fn is_detected(&self) -> bool {
        matches!(self, Self::Detected)
    }

    /// Returns true if processing failed.
    #[must_use]
    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed)
    }

    /// The wire representation of this status.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Processing => "processing",
            Self::Detected => "detected",
            Self::Failed => "failed",
            Self::Unknown { status } => status,
        }
    }
}

impl Serialize for MediaStatus {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for MediaStatus {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let value = serde_json::Value::deserialize(deserializer)?;
        match value.as_str() {
            Some("processing") => Ok(Self::Processing),
            Some("detected") => Ok(Self::Detected),
            Some("failed") => Ok(Self::Failed),
            Some(other) => {
                log::warn!(
                    "encountered unknown media status '{other}', preserving it verbatim"
                );
                Ok(Self::Unknown {
                    status: other.to_string(),
                })
            }
            // a non-string status is a contract violation, not a new state
            None => Err(serde::de::Error::custom(format!(
                "invalid type for field `status`: expected a string, got {value}"
            ))),
        }
    }
}

/// Status information for one media resource.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MediaInfo {
    /// Identifier of the media resource.
    pub media_id: String,
    /// Username the media belongs to.
    pub username: String,
    /// Current lifecycle state.
    pub status: MediaStatus,
    /// Server-reported error for this media, if any.
    #[serde(default)]
    pub error: Option<String>,
}

// --- Users ---

/// Parameters for [`Client::create_user`](crate::Client::create_user).
#[derive(Debug, Clone, Serialize)]
pub struct CreateUserParams {
    /// Username of the account to create.
    pub username: String,
}

/// Response from creating a user.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct UserInfo {
    /// Username of the created account.
    pub username: String,
    /// Informational message from the service, if any.
    #[serde(default)]
    pub msg: Option<String>,
    /// Server-reported error, if any.
    #[serde(default)]
    pub error: Option<String>,
}

/// Parameters for [`Client::login_user`](crate::Client::login_user).
///
/// The `username` scopes the token used for the request and is not part of
/// the request body.
#[derive(Debug, Clone, Serialize)]
pub struct LoginUserParams {
    /// Acting username to log in as.
    #[serde(skip)]
    pub username: String,
    /// Media the login session should open on.
    pub media_id: String,
}

/// Response from logging a user in.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LoginResponse {
    /// URL the user should be redirected to.
    pub redirect_url: String,
    /// Whether the login succeeded.
    pub success: bool,
}

// --- Upload ---

/// A local file to upload, either from disk or from an in-memory buffer.
#[derive(Debug, Clone)]
pub struct MediaFile {
    /// Filename reported to the service.
    pub name: String,
    /// MIME type of the payload (e.g. `video/mp4`).
    pub mime_type: String,
    /// Where the bytes come from.
    pub source: UploadSource,
}

impl MediaFile {
    /// Creates a file upload backed by a filesystem path.
    ///
    /// The reported filename defaults to the path's final component.
    #[must_use]
    pub fn from_path(path: impl Into<PathBuf>, mime_type: impl Into<String>) -> Self {
        let path = path.into();
        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self {
            name,
            mime_type: mime_type.into(),
            source: UploadSource::Path(path),
        }
    }

    /// Creates a file upload backed by an in-memory buffer.
    #[must_use]
    pub fn from_bytes(
        name: impl Into<String>,
        mime_type: impl Into<String>,
        data: impl Into<Bytes>,
    ) -> Self {
        Self {
            name: name.into(),
            mime_type: mime_type.into(),
            source: UploadSource::Bytes(data.into()),
        }
    }
}

/// The byte source backing a [`MediaFile`].
#[derive(Debug, Clone)]
pub enum UploadSource {
    /// Read from disk with positioned reads; the file is opened once at
    /// upload start and held open until the last chunk is sent.
    Path(PathBuf),
    /// Slice chunks out of an in-memory buffer.
    Bytes(Bytes),
}

/// Parameters for [`Client::upload_media`](crate::Client::upload_media).
///
/// With `file` unset the service fetches the video itself from
/// `media_path` (e.g. a presigned S3 URL). With `file` set the payload is
/// sent as multipart form data, split into sequential chunks when it
/// exceeds the chunk size.
#[derive(Debug, Clone, Default, Serialize)]
pub struct UploadMediaParams {
    /// Remote location of the video for server-side ingestion. May be empty
    /// when `file` is provided.
    pub media_path: String,
    /// Display tag for the video.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub video_tag: Option<String>,
    /// Trade processing time for higher detection accuracy.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub increased_detection_accuracy: Option<bool>,
    /// Callback URL invoked on media state changes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state_callback: Option<String>,
    /// Callback URL invoked when an export completes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub export_callback: Option<String>,
    /// Token echoed back on export callbacks.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub export_token: Option<String>,
    /// Enable license-plate detection.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detect_license_plates: Option<bool>,
    /// Enable face detection.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detect_faces: Option<bool>,
    /// Project to file the media under.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_id: Option<String>,
    /// Local payload; travels as multipart form data, not in the JSON body.
    #[serde(skip)]
    pub file: Option<MediaFile>,
}

/// Upload-time metadata about the stored file.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct FileInfo {
    /// Stored filename.
    #[serde(default)]
    pub name: String,
    /// Stored MIME type.
    #[serde(default)]
    pub mimetype: String,
    /// Stored size in bytes.
    #[serde(default)]
    pub size: u64,
}

/// Response from uploading media.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct UploadResponse {
    /// Identifier assigned to the new media resource.
    pub media_id: String,
    /// Metadata about the stored file.
    pub file_info: FileInfo,
    /// Informational message from the service, if any.
    #[serde(default)]
    pub message: Option<String>,
    /// Server-reported error, if any.
    #[serde(default)]
    pub error: Option<String>,
}

// --- Redaction ---

/// Blur style applied to detected regions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BlurType {
    /// Mosaic-style pixelation.
    Pixelated,
    /// Gaussian-style smooth blur.
    Smooth,
}

/// Parameters for [`Client::redact_media`](crate::Client::redact_media).
#[derive(Debug, Clone, Serialize)]
pub struct RedactMediaParams {
    /// Media to redact.
    pub media_id: String,
    /// Scale factor applied to detected boxes before blurring.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enlarge_boxes: Option<f64>,
    /// Also redact the audio track.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redact_audio: Option<bool>,
    /// Blur style to apply.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub blur: Option<BlurType>,
    /// Acting username; forces a fresh token scoped to that user.
    #[serde(skip)]
    pub username: Option<String>,
}

/// Response from starting a redaction.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RedactResponse {
    /// Server-reported error, if any.
    #[serde(default)]
    pub error: Option<String>,
}

// --- Deletion ---

/// Parameters for [`Client::delete_media`](crate::Client::delete_media).
#[derive(Debug, Clone, Serialize)]
pub struct DeleteMediaParams {
    /// Media to delete.
    pub media_id: String,
}

/// Response from deleting media.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DeleteMediaResponse {
    /// Identifier of the deleted media.
    pub media_id: String,
    /// Confirmation message.
    pub message: String,
    /// Server-reported error, if any.
    #[serde(default)]
    pub error: Option<String>,
}

// --- Download ---

/// Parameters for [`Client::download_media`](crate::Client::download_media).
#[derive(Debug, Clone)]
pub struct DownloadMediaParams {
    /// Media to download.
    pub media_id: String,
    /// Acting username; forces a fresh token scoped to that user.
    pub username: Option<String>,
}

/// Response from downloading redacted media.
#[derive(Debug, Clone)]
pub struct DownloadMediaResponse {
    /// The raw media bytes.
    pub media: Bytes,
}

// --- Projects ---

/// Parameters for [`Client::fetch_projects`](crate::Client::fetch_projects).
#[derive(Debug, Clone, Default)]
pub struct FetchProjectsParams {
    /// Zero-based page to fetch.
    pub page: Option<u32>,
    /// Number of projects per page.
    pub page_size: Option<u32>,
}

/// One project.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Project {
    /// Identifier of the project.
    pub project_id: String,
    /// Display name of the project.
    pub name: String,
}

/// Response from listing projects.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ProjectsResponse {
    /// Projects on the requested page.
    #[serde(default)]
    pub projects: Vec<Project>,
}

/// Parameters for [`Client::create_project`](crate::Client::create_project).
#[derive(Debug, Clone, Serialize)]
pub struct CreateProjectParams {
    /// Display name of the project to create.
    pub name: String,
}
