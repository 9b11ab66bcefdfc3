//! Instagram export reader
//!
//! Thin wrapper over the on-disk export: deserializes the posts JSON and
//! resolves media URIs to file bytes. The export is read-only source data;
//! nothing here mutates it.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::debug;

use crate::error::ArchiveError;

/// Relative locations where exports keep the posts file, newest layout first.
const POSTS_FILE_CANDIDATES: &[&str] = &[
    "your_instagram_activity/content/posts_1.json",
    "content/posts_1.json",
    "posts_1.json",
];

/// One exported post. Immutable source data.
#[derive(Debug, Clone, Deserialize)]
pub struct ArchivePost {
    pub creation_timestamp: Option<i64>,
    pub title: Option<String>,
    #[serde(default)]
    pub media: Vec<ArchiveMedia>,
}

impl ArchivePost {
    /// Timestamp of the first attached media item, if any.
    pub fn first_media_timestamp(&self) -> Option<i64> {
        self.media.first().and_then(|m| m.creation_timestamp)
    }
}

/// One attached file reference within a post.
#[derive(Debug, Clone, Deserialize)]
pub struct ArchiveMedia {
    pub uri: String,
    pub creation_timestamp: Option<i64>,
    pub title: Option<String>,
    pub media_metadata: Option<MediaMetadata>,
}

impl ArchiveMedia {
    /// Lowercased file extension derived from the URI.
    pub fn extension(&self) -> Option<String> {
        Path::new(&self.uri)
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
    }

    /// EXIF-style geolocation, when the export recorded one.
    pub fn geolocation(&self) -> Option<(f64, f64)> {
        let metadata = self.media_metadata.as_ref()?;
        let exif = metadata
            .photo_metadata
            .as_ref()
            .or(metadata.video_metadata.as_ref())?;
        exif.exif_data
            .iter()
            .find_map(|e| Some((e.latitude?, e.longitude?)))
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct MediaMetadata {
    pub photo_metadata: Option<ExifMetadata>,
    pub video_metadata: Option<ExifMetadata>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ExifMetadata {
    #[serde(default)]
    pub exif_data: Vec<ExifEntry>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ExifEntry {
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

/// The loaded export.
#[derive(Debug)]
pub struct Archive {
    pub posts: Vec<ArchivePost>,
}

impl Archive {
    /// Load the posts file from an export folder.
    ///
    /// An unreadable or unparseable posts file is fatal to the run.
    pub fn load(folder: &Path) -> Result<Self, ArchiveError> {
        let posts_path = find_posts_file(folder)
            .ok_or_else(|| ArchiveError::PostsFileNotFound(folder.display().to_string()))?;
        debug!("Loading posts file: {}", posts_path.display());

        let content = std::fs::read_to_string(&posts_path)?;
        let posts: Vec<ArchivePost> = serde_json::from_str(&content)?;
        debug!("Loaded {} post(s) from archive", posts.len());

        Ok(Self { posts })
    }
}

fn find_posts_file(folder: &Path) -> Option<PathBuf> {
    POSTS_FILE_CANDIDATES
        .iter()
        .map(|c| folder.join(c))
        .find(|p| p.is_file())
}

/// Resolve a media URI against the archive folder.
pub fn media_path(folder: &Path, uri: &str) -> PathBuf {
    folder.join(uri)
}

/// Read the raw bytes of a media file referenced by the archive.
pub fn read_media(folder: &Path, uri: &str) -> Result<Vec<u8>, ArchiveError> {
    let path = media_path(folder, uri);
    if !path.is_file() {
        return Err(ArchiveError::MediaNotFound(uri.to_string()));
    }
    Ok(std::fs::read(&path)?)
}
