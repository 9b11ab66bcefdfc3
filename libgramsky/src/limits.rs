//! Bluesky embedding and rate limits
//!
//! These are the destination platform's documented ceilings. They are fixed:
//! Gramsky targets exactly one platform.

/// Maximum accepted byte size for an image blob.
pub const MAX_IMAGE_BYTES: usize = 976_000;

/// Long-edge target when an oversized image has to be resized.
pub const IMAGE_LONG_EDGE: u32 = 1920;

/// Maximum number of images in a single post embed.
pub const MAX_IMAGES_PER_POST: usize = 4;

/// Maximum accepted byte size for a video blob (100 MiB).
pub const MAX_VIDEO_BYTES: usize = 100 * 1024 * 1024;

/// Maximum post text length, in characters.
pub const MAX_POST_CHARS: usize = 300;

/// Maximum media caption (alt text) length, in characters.
pub const MAX_CAPTION_CHARS: usize = 100;

/// Mandatory wait between successive live submissions.
pub const POST_RATE_LIMIT_DELAY_MS: u64 = 3000;
