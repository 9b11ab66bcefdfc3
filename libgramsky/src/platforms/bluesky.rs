//! Bluesky platform implementation
//!
//! Thin adapter from the `DestinationPlatform` trait onto bsky-sdk: one
//! session per run, blob uploads, and record creation with image or video
//! embeds and a historical `created_at`.

use std::num::NonZeroU64;

use async_trait::async_trait;
use bsky_sdk::api::app::bsky::embed::defs::AspectRatioData;
use bsky_sdk::api::app::bsky::embed::images;
use bsky_sdk::api::app::bsky::embed::video as video_embed;
use bsky_sdk::api::app::bsky::feed::post::{RecordData, RecordEmbedRefs};
use bsky_sdk::api::types::string::Datetime;
use bsky_sdk::api::types::{BlobRef, Union};
use bsky_sdk::BskyAgent;
use chrono::{DateTime, Utc};

use crate::error::{MediaError, PlatformError, Result};
use crate::platforms::DestinationPlatform;
use crate::post::Embed;

/// Map Bluesky/AT Protocol errors to PlatformError.
///
/// AT Protocol errors carry their codes in the message; classification is by
/// pattern so the original code survives into the mapped error.
fn map_bluesky_error<E: std::fmt::Display + std::fmt::Debug>(
    error: E,
    context: &str,
) -> PlatformError {
    let error_msg = format!("{}", error);
    let debug_msg = format!("{:?}", error);

    if error_msg.contains("401")
        || error_msg.contains("403")
        || error_msg.contains("AuthenticationRequired")
        || error_msg.contains("InvalidToken")
        || error_msg.contains("ExpiredToken")
        || debug_msg.contains("Unauthorized")
        || debug_msg.contains("Forbidden")
    {
        return PlatformError::Authentication(format!(
            "Bluesky authentication failed during {}: {}",
            context, error_msg
        ));
    }

    if error_msg.contains("InvalidCredentials")
        || error_msg.contains("AccountNotFound")
        || (context == "authentication" && error_msg.contains("invalid"))
    {
        return PlatformError::Authentication(format!(
            "Invalid Bluesky credentials: {}. Check your handle and app password.",
            error_msg
        ));
    }

    if error_msg.contains("429")
        || error_msg.contains("RateLimitExceeded")
        || error_msg.contains("TooManyRequests")
        || debug_msg.contains("RateLimit")
    {
        return PlatformError::RateLimit(format!(
            "Bluesky rate limit exceeded during {}: {}",
            context, error_msg
        ));
    }

    if error_msg.contains("400")
        || error_msg.contains("InvalidRequest")
        || error_msg.contains("InvalidRecord")
        || error_msg.contains("BlobTooLarge")
        || debug_msg.contains("BadRequest")
    {
        return PlatformError::Validation(format!(
            "Bluesky rejected the request during {}: {}",
            context, error_msg
        ));
    }

    if error_msg.contains("connection")
        || error_msg.contains("network")
        || error_msg.contains("timeout")
        || error_msg.contains("unreachable")
        || debug_msg.contains("Connect")
        || debug_msg.contains("Timeout")
    {
        return PlatformError::Network(format!(
            "Network error while talking to the Bluesky PDS during {}: {}",
            context, error_msg
        ));
    }

    match context {
        "upload" => PlatformError::Upload(format!("Bluesky upload failed: {}", error_msg)),
        _ => PlatformError::Posting(format!(
            "Bluesky operation failed during {}: {}",
            context, error_msg
        )),
    }
}

pub struct BlueskyPlatform {
    agent: BskyAgent,
    identifier: String,
    password: String,
    handle: Option<String>,
    authenticated: bool,
}

impl BlueskyPlatform {
    /// Create a new Bluesky client.
    ///
    /// # Arguments
    ///
    /// * `identifier` - The Bluesky handle (e.g. "user.bsky.social")
    /// * `password` - The app password for authentication
    pub async fn new(identifier: String, password: String) -> Result<Self> {
        let agent = BskyAgent::builder()
            .build()
            .await
            .map_err(|e| PlatformError::Authentication(format!("Failed to create agent: {}", e)))?;

        Ok(Self {
            agent,
            identifier,
            password,
            handle: None,
            authenticated: false,
        })
    }

    async fn upload_blob(&self, bytes: Vec<u8>) -> Result<BlobRef> {
        let output = self
            .agent
            .api
            .com
            .atproto
            .repo
            .upload_blob(bytes)
            .await
            .map_err(|e| map_bluesky_error(e, "upload"))?;
        Ok(output.data.blob)
    }

    /// Build the record embed for a video selected by the pipeline. The blob
    /// was already uploaded; its serialized reference rides in `remote_ref`.
    fn build_video_embed(
        &self,
        video: &crate::post::VideoEmbed,
    ) -> Result<Union<RecordEmbedRefs>> {
        let blob_ref = video
            .remote_ref
            .as_deref()
            .ok_or(MediaError::MissingUploadRef)?;
        let blob: BlobRef = serde_json::from_str(blob_ref)
            .map_err(|e| PlatformError::Upload(format!("Unusable upload reference: {}", e)))?;
        let aspect_ratio = video.dimensions.and_then(|(w, h)| {
            Some(
                AspectRatioData {
                    width: NonZeroU64::new(w as u64)?,
                    height: NonZeroU64::new(h as u64)?,
                }
                .into(),
            )
        });
        let main = video_embed::MainData {
            alt: Some(video.caption.clone()),
            aspect_ratio,
            captions: None,
            video: blob,
        };
        Ok(Union::Refs(RecordEmbedRefs::AppBskyEmbedVideoMain(
            Box::new(main.into()),
        )))
    }

    fn post_url(&self, at_uri: &str) -> Option<String> {
        let handle = self.handle.as_deref()?;
        let rkey = at_uri.rsplit('/').next()?;
        Some(format!("https://bsky.app/profile/{}/post/{}", handle, rkey))
    }
}

#[async_trait]
impl DestinationPlatform for BlueskyPlatform {
    async fn login(&mut self) -> Result<()> {
        tracing::debug!("Creating Bluesky session for {}", self.identifier);

        let session = self
            .agent
            .login(&self.identifier, &self.password)
            .await
            .map_err(|e| map_bluesky_error(e, "authentication"))?;

        self.handle = Some(session.data.handle.as_str().to_string());
        self.authenticated = true;
        tracing::debug!("Bluesky session created");

        Ok(())
    }

    async fn upload_video(&self, bytes: &[u8]) -> Result<String> {
        if !self.authenticated {
            return Err(PlatformError::Authentication("Not authenticated".to_string()).into());
        }

        tracing::debug!("Uploading video blob ({} bytes)", bytes.len());
        let blob = self.upload_blob(bytes.to_vec()).await?;
        serde_json::to_string(&blob)
            .map_err(|e| PlatformError::Upload(format!("Unserializable blob: {}", e)).into())
    }

    async fn create_post(
        &self,
        date: DateTime<Utc>,
        text: &str,
        embed: &Embed,
    ) -> Result<Option<String>> {
        if !self.authenticated {
            return Err(PlatformError::Authentication("Not authenticated".to_string()).into());
        }

        // Image blobs upload at post time; the video blob was already
        // uploaded by the video pipeline.
        let embed_refs = match embed {
            Embed::Video(video) => Some(self.build_video_embed(video)?),
            Embed::Images(items) if items.is_empty() => None,
            Embed::Images(items) => {
                let mut uploaded = Vec::with_capacity(items.len());
                for item in items {
                    let blob = self.upload_blob(item.bytes.clone()).await?;
                    uploaded.push(
                        images::ImageData {
                            alt: item.caption.clone(),
                            aspect_ratio: None,
                            image: blob,
                        }
                        .into(),
                    );
                }
                Some(Union::Refs(RecordEmbedRefs::AppBskyEmbedImagesMain(
                    Box::new(images::MainData { images: uploaded }.into()),
                )))
            }
        };

        let record = RecordData {
            created_at: Datetime::new(date.fixed_offset()),
            embed: embed_refs,
            entities: None,
            facets: None,
            labels: None,
            langs: None,
            reply: None,
            tags: None,
            text: text.to_string(),
        };

        let response = self
            .agent
            .create_record(record)
            .await
            .map_err(|e| map_bluesky_error(e, "posting"))?;

        let at_uri = response.data.uri.to_string();
        tracing::debug!("Posted to Bluesky: {}", at_uri);

        Ok(self.post_url(&at_uri))
    }

    fn name(&self) -> &str {
        "bluesky"
    }
}
