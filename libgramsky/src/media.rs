//! Media classification and per-item processing
//!
//! Maps archive file extensions onto the MIME types the destination platform
//! accepts, and turns one `ArchiveMedia` into a `ProcessedMedia` ready for
//! embed selection. Unsupported or unreadable media is never an error here:
//! it yields a `ProcessedMedia` with nothing usable in it and a warning.

use std::path::Path;

use tracing::warn;

use crate::archive::{self, ArchiveMedia};
use crate::limits::MAX_CAPTION_CHARS;

/// Coarse media kind derived from a file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Image,
    Video,
    Unknown,
}

/// Image extensions the destination platform accepts.
pub fn image_mime(extension: &str) -> Option<&'static str> {
    match extension.to_ascii_lowercase().as_str() {
        "jpg" | "jpeg" => Some("image/jpeg"),
        "png" => Some("image/png"),
        "webp" => Some("image/webp"),
        "heic" => Some("image/heic"),
        _ => None,
    }
}

/// Video extensions the destination platform accepts.
pub fn video_mime(extension: &str) -> Option<&'static str> {
    match extension.to_ascii_lowercase().as_str() {
        "mp4" => Some("video/mp4"),
        "mov" => Some("video/quicktime"),
        _ => None,
    }
}

/// MIME type for an extension: image table first, then video.
pub fn mime_type(extension: &str) -> Option<&'static str> {
    image_mime(extension).or_else(|| video_mime(extension))
}

/// Coarse kind for an extension.
pub fn kind(extension: &str) -> MediaKind {
    if image_mime(extension).is_some() {
        MediaKind::Image
    } else if video_mime(extension).is_some() {
        MediaKind::Video
    } else {
        MediaKind::Unknown
    }
}

/// Transient result of classifying and reading one archive media item.
///
/// A missing `mime_type` means the item is unusable; callers must never
/// embed it. Bytes may independently be absent when the file was unreadable.
#[derive(Debug, Clone)]
pub struct ProcessedMedia {
    pub caption: String,
    pub mime_type: Option<String>,
    pub bytes: Option<Vec<u8>>,
    pub is_video: bool,
}

impl ProcessedMedia {
    pub fn usable(&self) -> bool {
        self.mime_type.is_some() && self.bytes.is_some()
    }
}

/// Classify one media item and read its bytes from the archive folder.
pub fn process_media(folder: &Path, media: &ArchiveMedia) -> ProcessedMedia {
    let caption = media_caption(media);
    let extension = media.extension().unwrap_or_default();

    let Some(mime) = mime_type(&extension) else {
        warn!("Unsupported media type '{}' for {}", extension, media.uri);
        return ProcessedMedia {
            caption,
            mime_type: None,
            bytes: None,
            is_video: false,
        };
    };
    let is_video = kind(&extension) == MediaKind::Video;

    let bytes = match archive::read_media(folder, &media.uri) {
        Ok(bytes) => Some(bytes),
        Err(e) => {
            warn!("Failed to read media {}: {}", media.uri, e);
            None
        }
    };

    ProcessedMedia {
        caption,
        mime_type: Some(mime.to_string()),
        bytes,
        is_video,
    }
}

/// Derive the caption for a media item: its title, plus a `geo:` suffix when
/// the export recorded a location with a positive latitude. Longitude sign is
/// not checked. Capped at the platform's caption ceiling.
pub fn media_caption(media: &ArchiveMedia) -> String {
    let mut caption = media.title.clone().unwrap_or_default();
    if let Some((lat, lon)) = media.geolocation() {
        if lat > 0.0 {
            caption.push_str(&format!(" geo:{},{}", lat, lon));
        }
    }
    truncate_with_ellipsis(&caption, MAX_CAPTION_CHARS)
}

/// Truncate to at most `max` characters, ending in `...` when shortened.
pub fn truncate_with_ellipsis(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let mut truncated: String = text.chars().take(max.saturating_sub(3)).collect();
    truncated.push_str("...");
    truncated
}
