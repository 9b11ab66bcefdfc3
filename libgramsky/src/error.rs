//! Error types for Gramsky

use thiserror::Error;

pub type Result<T> = std::result::Result<T, GramskyError>;

#[derive(Error, Debug)]
pub enum GramskyError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Archive error: {0}")]
    Archive(#[from] ArchiveError),

    #[error("Media error: {0}")]
    Media(#[from] MediaError),

    #[error("Platform error: {0}")]
    Platform(#[from] PlatformError),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl GramskyError {
    /// Returns the appropriate exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            GramskyError::InvalidInput(_) => 3,
            GramskyError::Platform(PlatformError::Authentication(_)) => 2,
            GramskyError::Platform(_) => 1,
            GramskyError::Config(_) => 1,
            GramskyError::Archive(_) => 1,
            GramskyError::Media(_) => 1,
        }
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Invalid date '{0}': expected RFC 3339 or YYYY-MM-DD")]
    InvalidDate(String),
}

#[derive(Error, Debug)]
pub enum ArchiveError {
    #[error("No posts file found under {0} (looked for the known export layouts)")]
    PostsFileNotFound(String),

    #[error("Failed to read archive file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse posts file: {0}")]
    ParseError(#[from] serde_json::Error),

    #[error("Media file not found: {0}")]
    MediaNotFound(String),
}

#[derive(Error, Debug)]
pub enum MediaError {
    #[error("Cannot determine dimensions of '{0}', unable to resize")]
    UnreadableDimensions(String),

    #[error("'{label}' is still {size} bytes after resizing (limit {limit})")]
    StillTooLarge {
        label: String,
        size: usize,
        limit: usize,
    },

    #[error("Image processing failed: {0}")]
    Image(#[from] image::ImageError),

    #[error("Video is empty")]
    EmptyVideo,

    #[error("Failed to probe video dimensions: {0}")]
    Probe(String),

    #[error("Video embed has no upload reference")]
    MissingUploadRef,
}

#[derive(Error, Debug, Clone)]
pub enum PlatformError {
    #[error("Authentication failed: {0}")]
    Authentication(String),

    #[error("Content validation failed: {0}")]
    Validation(String),

    #[error("Upload failed: {0}")]
    Upload(String),

    #[error("Posting failed: {0}")]
    Posting(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Rate limit exceeded: {0}")]
    RateLimit(String),
}
