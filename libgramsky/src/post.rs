//! Post segmentation and media selection
//!
//! Turns one archive post into the platform-facing shape: a publish date, a
//! truncated display text, and exactly one embed — a single validated video
//! or up to four validated images, never both. Pure given filesystem state;
//! all network work happens later in the orchestrator.

use std::path::Path;

use chrono::{DateTime, TimeZone, Utc};
use tracing::warn;

use crate::archive::ArchivePost;
use crate::imaging;
use crate::limits::{MAX_IMAGES_PER_POST, MAX_POST_CHARS, MAX_VIDEO_BYTES};
use crate::media::{self, truncate_with_ellipsis};
use crate::video;

/// One image inside an image embed.
#[derive(Debug, Clone)]
pub struct EmbedImage {
    pub caption: String,
    pub bytes: Vec<u8>,
    pub mime_type: String,
}

/// A video embed. `remote_ref` is populated only after a successful upload
/// and stays absent when simulating. Dimensions are filled in by the video
/// pipeline when the file could be probed.
#[derive(Debug, Clone)]
pub struct VideoEmbed {
    pub caption: String,
    pub bytes: Vec<u8>,
    pub mime_type: String,
    pub dimensions: Option<(u32, u32)>,
    pub remote_ref: Option<String>,
}

/// The media payload attached to a post.
///
/// A post is either entirely video or entirely images; the tagged union makes
/// a "video embed treated as an image list" state unrepresentable.
#[derive(Debug, Clone)]
pub enum Embed {
    Video(VideoEmbed),
    Images(Vec<EmbedImage>),
}

impl Embed {
    pub fn empty() -> Self {
        Embed::Images(Vec::new())
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Embed::Images(images) if images.is_empty())
    }
}

/// Output of segmentation and selection for one archive post.
#[derive(Debug, Clone)]
pub struct ProcessedPost {
    pub date: Option<DateTime<Utc>>,
    pub text: String,
    pub embed: Embed,
    pub media_count: usize,
}

/// Resolve the publish date: the post's own timestamp, else the first media
/// item's. An undated post is never guessed at.
pub fn publish_date(post: &ArchivePost) -> Option<DateTime<Utc>> {
    post.creation_timestamp
        .or_else(|| post.first_media_timestamp())
        .and_then(|ts| Utc.timestamp_opt(ts, 0).single())
}

/// Resolve the display text: the post's own title, falling back to the sole
/// media item's title when the post has exactly one. Truncated to the
/// platform's post ceiling.
pub fn display_text(post: &ArchivePost) -> String {
    let title = post
        .title
        .as_deref()
        .filter(|t| !t.is_empty())
        .or_else(|| {
            if post.media.len() == 1 {
                post.media[0].title.as_deref().filter(|t| !t.is_empty())
            } else {
                None
            }
        })
        .unwrap_or_default();
    truncate_with_ellipsis(title, MAX_POST_CHARS)
}

/// Segment one archive post and select its embed.
pub fn process_post(post: &ArchivePost, folder: &Path) -> ProcessedPost {
    let date = publish_date(post);
    let text = display_text(post);

    if post.media.is_empty() {
        return ProcessedPost {
            date,
            text,
            embed: Embed::empty(),
            media_count: 0,
        };
    }

    let first = &post.media[0];
    let first_extension = first.extension().unwrap_or_default();
    let (embed, media_count) = if media::kind(&first_extension) == media::MediaKind::Video {
        select_video(post, folder)
    } else {
        select_images(post, folder)
    };

    ProcessedPost {
        date,
        text,
        embed,
        media_count,
    }
}

/// Video rule: the first media item decides the embed shape. When it fails
/// validation or cannot be read, the post keeps an empty image list — images
/// elsewhere in the post are never promoted.
fn select_video(post: &ArchivePost, folder: &Path) -> (Embed, usize) {
    let first = &post.media[0];
    let processed = media::process_media(folder, first);

    let (Some(mime_type), Some(bytes)) = (processed.mime_type, processed.bytes) else {
        warn!("Video {} is unusable, posting without media", first.uri);
        return (Embed::empty(), 0);
    };

    if !video::fits_upload_limit(&bytes) {
        warn!(
            "Video {} is {} bytes, over the {} byte limit; posting without media",
            first.uri,
            bytes.len(),
            MAX_VIDEO_BYTES
        );
        return (Embed::empty(), 0);
    }

    let embed = Embed::Video(VideoEmbed {
        caption: processed.caption,
        bytes,
        mime_type,
        dimensions: None,
        remote_ref: None,
    });
    (embed, 1)
}

fn select_images(post: &ArchivePost, folder: &Path) -> (Embed, usize) {
    let mut images = Vec::new();

    for (index, item) in post.media.iter().enumerate() {
        if index >= MAX_IMAGES_PER_POST {
            warn!(
                "Post has {} media items; only the first {} are embedded",
                post.media.len(),
                MAX_IMAGES_PER_POST
            );
            break;
        }

        let processed = media::process_media(folder, item);
        if processed.is_video {
            warn!("Skipping video {} in an image post", item.uri);
            continue;
        }
        let (Some(mime_type), Some(bytes)) = (processed.mime_type, processed.bytes) else {
            continue;
        };

        match imaging::enforce_upload_limit(bytes, &item.uri) {
            Ok(bytes) => images.push(EmbedImage {
                caption: processed.caption,
                bytes,
                mime_type,
            }),
            Err(e) => {
                warn!("Skipping image {}: {}", item.uri, e);
            }
        }
    }

    let count = images.len();
    (Embed::Images(images), count)
}
