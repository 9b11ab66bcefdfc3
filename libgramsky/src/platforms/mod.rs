//! Destination platform abstraction
//!
//! The orchestrator only ever talks to a `DestinationPlatform`: one
//! authenticated session, blob uploads for video, and post creation. The wire
//! protocol lives entirely behind this trait, which is what lets the import
//! run against the mock in tests and against Bluesky in production.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::Result;
use crate::post::Embed;

pub mod bluesky;

// Mock platform is available for all builds (not just tests) to support
// integration tests.
pub mod mock;

#[async_trait]
pub trait DestinationPlatform: Send + Sync {
    /// Establish the one authenticated session for the run.
    ///
    /// # Errors
    ///
    /// Returns `PlatformError::Authentication` on bad credentials. This is
    /// fatal to the whole run; it is never retried per post.
    async fn login(&mut self) -> Result<()>;

    /// Upload raw video bytes and return a durable remote blob reference.
    ///
    /// The reference is an opaque string (the serialized blob record) that
    /// `create_post` resolves when building a video embed. Failures abort
    /// only the current post.
    async fn upload_video(&self, bytes: &[u8]) -> Result<String>;

    /// Create one post with the given publish date, text, and embed.
    ///
    /// Returns the public URL of the created post when the platform exposes
    /// one. Failures abort only the current post.
    async fn create_post(
        &self,
        date: DateTime<Utc>,
        text: &str,
        embed: &Embed,
    ) -> Result<Option<String>>;

    /// Lowercase platform identifier (e.g. "bluesky").
    fn name(&self) -> &str;
}
