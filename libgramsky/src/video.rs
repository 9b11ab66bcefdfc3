//! Video validation and the upload-aware video pipeline
//!
//! There is no transcode path: an oversized video is dropped, not repaired.
//! Dimension probing shells out to ffprobe and propagates failures to the
//! caller; the orchestrator decides whether that skips the post.

use std::path::Path;
use std::process::Stdio;

use tokio::process::Command;
use tracing::debug;

use crate::error::{MediaError, Result};
use crate::limits::MAX_VIDEO_BYTES;
use crate::platforms::DestinationPlatform;
use crate::post::VideoEmbed;

/// Whether a video's byte size fits the platform ceiling.
///
/// Exactly at the limit is accepted; one byte over is not.
pub fn fits_upload_limit(bytes: &[u8]) -> bool {
    bytes.len() <= MAX_VIDEO_BYTES
}

/// Probe pixel width and height of a video file with ffprobe.
pub async fn probe_dimensions(path: &Path) -> Result<(u32, u32)> {
    let output = Command::new("ffprobe")
        .args(["-v", "error"])
        .args(["-select_streams", "v:0"])
        .args(["-show_entries", "stream=width,height"])
        .args(["-of", "csv=s=x:p=0"])
        .arg(path)
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .output()
        .await
        .map_err(|e| MediaError::Probe(format!("failed to run ffprobe: {}", e)))?;

    if !output.status.success() {
        return Err(MediaError::Probe(format!(
            "ffprobe exited with {} for {}",
            output.status,
            path.display()
        ))
        .into());
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    parse_dimensions(stdout.trim())
        .ok_or_else(|| MediaError::Probe(format!("unparseable ffprobe output: {}", stdout)).into())
}

fn parse_dimensions(line: &str) -> Option<(u32, u32)> {
    let (w, h) = line.lines().next()?.trim().split_once('x')?;
    Some((w.parse().ok()?, h.parse().ok()?))
}

/// Run the full upload-aware pipeline on a selected video embed: probe the
/// file for embed metadata and, in live mode, upload the raw bytes to obtain
/// a durable remote reference.
///
/// With no platform (simulate mode) the reference stays absent.
pub async fn process_video(
    path: &Path,
    mut embed: VideoEmbed,
    platform: Option<&dyn DestinationPlatform>,
) -> Result<VideoEmbed> {
    if embed.bytes.is_empty() {
        return Err(MediaError::EmptyVideo.into());
    }

    let (width, height) = probe_dimensions(path).await?;
    debug!("Probed {} as {}x{}", path.display(), width, height);
    embed.dimensions = Some((width, height));

    if let Some(platform) = platform {
        let remote_ref = platform.upload_video(&embed.bytes).await?;
        if remote_ref.is_empty() {
            return Err(MediaError::MissingUploadRef.into());
        }
        embed.remote_ref = Some(remote_ref);
    }

    Ok(embed)
}
