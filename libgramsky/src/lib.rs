//! Gramsky - migrate an Instagram export into a Bluesky account
//!
//! This library turns an unpacked export into a sequence of rate-limited
//! posts on the destination platform, enforcing its embedding limits along
//! the way: image blobs are resized to fit, oversized video is dropped, and
//! every post carries either a single video or up to four images.

pub mod archive;
pub mod config;
pub mod error;
pub mod imaging;
pub mod importer;
pub mod limits;
pub mod logging;
pub mod media;
pub mod platforms;
pub mod post;
pub mod video;

// Re-export commonly used types
pub use config::Config;
pub use error::{GramskyError, Result};
pub use importer::{ImportOptions, ImportSummary, PostOutcome};
pub use post::{Embed, ProcessedPost};
