//! Publish orchestrator
//!
//! Drives the end-to-end pass over an export: chronological ordering, date
//! bounds, per-post segmentation and selection, the upload-aware video
//! pipeline, rate-limited sequential submission (or simulated skip), and the
//! final summary with a live-run time estimate.
//!
//! The pass is intentionally sequential. No two submissions are ever in
//! flight at once, so the fixed inter-post delay throttles the platform API
//! regardless of how fast local I/O completes.

use std::path::PathBuf;
use std::time::Duration;

use chrono::{DateTime, TimeZone, Utc};
use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::archive::{self, Archive, ArchivePost};
use crate::error::{GramskyError, Result};
use crate::limits::POST_RATE_LIMIT_DELAY_MS;
use crate::platforms::DestinationPlatform;
use crate::post::{self, Embed};
use crate::video;

/// Options for one import run, threaded explicitly instead of read from
/// ambient process state.
#[derive(Debug, Clone)]
pub struct ImportOptions {
    /// Dry-run: no network calls, no inter-post delay, counts still
    /// accumulate for the time estimate.
    pub simulate: bool,
    /// Inclusive lower bound on the per-post check-date.
    pub min_date: Option<DateTime<Utc>>,
    /// Posts dated beyond this bound stop the entire run.
    pub max_date: Option<DateTime<Utc>>,
    /// Root of the unpacked export.
    pub archive_folder: PathBuf,
}

/// Why a post was skipped. Advisory reasons are logged, never raised.
#[derive(Debug, Clone)]
pub enum SkipReason {
    Undated,
    BeforeMinDate,
    VideoPipeline(String),
    SubmitFailed(String),
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SkipReason::Undated => write!(f, "post has no resolvable date"),
            SkipReason::BeforeMinDate => write!(f, "dated before the minimum date"),
            SkipReason::VideoPipeline(e) => write!(f, "video pipeline failed: {}", e),
            SkipReason::SubmitFailed(e) => write!(f, "submission failed: {}", e),
        }
    }
}

/// Outcome of one post, consumed by the summary step.
#[derive(Debug, Clone)]
pub enum PostOutcome {
    Published {
        url: Option<String>,
        media_count: usize,
    },
    Simulated {
        media_count: usize,
    },
    Skipped(SkipReason),
}

/// Process-scoped counters for one run, accumulated monotonically.
#[derive(Debug, Default, Clone)]
pub struct ImportSummary {
    pub imported_posts: usize,
    pub imported_media: usize,
    pub skipped_posts: usize,
    /// Present only after a simulate run.
    pub estimated_minutes: Option<u64>,
}

impl ImportSummary {
    fn from_outcomes(outcomes: &[PostOutcome], simulate: bool) -> Self {
        let mut summary = ImportSummary::default();
        for outcome in outcomes {
            match outcome {
                PostOutcome::Published { media_count, .. }
                | PostOutcome::Simulated { media_count } => {
                    summary.imported_posts += 1;
                    summary.imported_media += media_count;
                }
                PostOutcome::Skipped(_) => summary.skipped_posts += 1,
            }
        }
        if simulate {
            summary.estimated_minutes = Some(estimate_live_minutes(summary.imported_media));
        }
        summary
    }

    pub fn display(&self) {
        println!("\n=== Import Summary ===");
        println!("Posts imported: {}", self.imported_posts);
        println!("Media imported: {}", self.imported_media);
        println!("Posts skipped: {}", self.skipped_posts);
        if let Some(minutes) = self.estimated_minutes {
            println!(
                "Estimated live-run time: {}",
                format_estimate(minutes)
            );
        }
    }
}

/// Estimated wall-clock minutes for a live run: each imported media item
/// waits for the rate limit once, with a 10% safety margin.
pub fn estimate_live_minutes(imported_media: usize) -> u64 {
    let millis = imported_media as f64 * POST_RATE_LIMIT_DELAY_MS as f64;
    (millis / 60_000.0 * 1.1).round() as u64
}

/// Render an estimate as hours and minutes.
pub fn format_estimate(minutes: u64) -> String {
    format!("{} hours and {} minutes", minutes / 60, minutes % 60)
}

/// The date used for range filtering: the post's own timestamp, else the
/// first media item's.
fn check_date(post: &ArchivePost) -> Option<DateTime<Utc>> {
    post.creation_timestamp
        .or_else(|| post.first_media_timestamp())
        .and_then(|ts| Utc.timestamp_opt(ts, 0).single())
}

/// Run the import pass.
///
/// In live mode `platform` must be present and already authenticated; the
/// caller establishes the session so that an authentication failure aborts
/// before any post is touched. In simulate mode `platform` is ignored and
/// may be `None`.
pub async fn run_import(
    options: &ImportOptions,
    platform: Option<&dyn DestinationPlatform>,
) -> Result<ImportSummary> {
    if !options.simulate && platform.is_none() {
        return Err(GramskyError::InvalidInput(
            "live mode requires an authenticated platform".to_string(),
        ));
    }

    let archive = Archive::load(&options.archive_folder)?;
    info!(
        "Loaded {} post(s) from {}",
        archive.posts.len(),
        options.archive_folder.display()
    );

    // The export is assumed ascending by first-media timestamp; the stable
    // sort enforces it and preserves archive order on ties. A post whose own
    // timestamp disagrees with its first media's keeps this approximate
    // position.
    let mut posts = archive.posts;
    posts.sort_by_key(|p| p.first_media_timestamp().unwrap_or(i64::MIN));

    let platform = if options.simulate { None } else { platform };
    let mut outcomes = Vec::with_capacity(posts.len());

    for post in &posts {
        let Some(date) = check_date(post) else {
            warn!("Skipping undated post");
            outcomes.push(PostOutcome::Skipped(SkipReason::Undated));
            continue;
        };

        if let Some(min) = options.min_date {
            if date < min {
                debug!("Skipping post dated {} (before minimum)", date);
                outcomes.push(PostOutcome::Skipped(SkipReason::BeforeMinDate));
                continue;
            }
        }
        if let Some(max) = options.max_date {
            if date > max {
                // Posts are chronological; nothing later can qualify either.
                info!("Reached post dated {} beyond the maximum date, stopping", date);
                break;
            }
        }

        let outcome = import_post(options, platform, post).await;
        if let PostOutcome::Skipped(reason) = &outcome {
            warn!("Skipping post dated {}: {}", date, reason);
        }
        outcomes.push(outcome);
    }

    let summary = ImportSummary::from_outcomes(&outcomes, options.simulate);
    info!(
        "Import finished: {} post(s), {} media item(s), {} skipped",
        summary.imported_posts, summary.imported_media, summary.skipped_posts
    );
    if let Some(minutes) = summary.estimated_minutes {
        info!("Estimated live-run time: {}", format_estimate(minutes));
    }
    Ok(summary)
}

async fn import_post(
    options: &ImportOptions,
    platform: Option<&dyn DestinationPlatform>,
    post: &ArchivePost,
) -> PostOutcome {
    let mut processed = post::process_post(post, &options.archive_folder);

    // Video posts additionally run the upload-aware pipeline; any failure
    // there aborts only this post.
    processed.embed = match processed.embed {
        Embed::Video(embed) => {
            let path = archive::media_path(&options.archive_folder, &post.media[0].uri);
            match video::process_video(&path, embed, platform).await {
                Ok(embed) => Embed::Video(embed),
                Err(e) => return PostOutcome::Skipped(SkipReason::VideoPipeline(e.to_string())),
            }
        }
        other => other,
    };

    // Defensive re-check; segmentation never invents a date.
    let Some(date) = processed.date else {
        return PostOutcome::Skipped(SkipReason::Undated);
    };

    if options.simulate {
        debug!(
            "[simulate] Would post {} with {} media item(s)",
            date, processed.media_count
        );
        return PostOutcome::Simulated {
            media_count: processed.media_count,
        };
    }

    // platform presence was checked at run start
    let platform = match platform {
        Some(p) => p,
        None => {
            return PostOutcome::Skipped(SkipReason::SubmitFailed(
                "no platform available".to_string(),
            ))
        }
    };

    sleep(Duration::from_millis(POST_RATE_LIMIT_DELAY_MS)).await;

    match platform.create_post(date, &processed.text, &processed.embed).await {
        Ok(url) => {
            info!(
                "Imported post dated {} with {} media item(s){}",
                date,
                processed.media_count,
                url.as_deref()
                    .map(|u| format!(" -> {}", u))
                    .unwrap_or_default()
            );
            PostOutcome::Published {
                url,
                media_count: processed.media_count,
            }
        }
        Err(e) => PostOutcome::Skipped(SkipReason::SubmitFailed(e.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::archive::ArchiveMedia;

    #[test]
    fn test_estimate_live_minutes() {
        // 20 media * 3000ms = 60s -> 1.0 min * 1.1 = 1.1 -> 1
        assert_eq!(estimate_live_minutes(20), 1);
        assert_eq!(estimate_live_minutes(0), 0);
        // 100 media -> 5 min * 1.1 = 5.5 -> 6
        assert_eq!(estimate_live_minutes(100), 6);
    }

    #[test]
    fn test_format_estimate() {
        assert_eq!(format_estimate(1), "0 hours and 1 minutes");
        assert_eq!(format_estimate(0), "0 hours and 0 minutes");
        assert_eq!(format_estimate(135), "2 hours and 15 minutes");
    }

    #[test]
    fn test_check_date_prefers_post_timestamp() {
        let post = ArchivePost {
            creation_timestamp: Some(1600000000),
            title: None,
            media: vec![ArchiveMedia {
                uri: "m/a.jpg".to_string(),
                creation_timestamp: Some(1500000000),
                title: None,
                media_metadata: None,
            }],
        };
        assert_eq!(check_date(&post).unwrap().timestamp(), 1600000000);
    }

    #[test]
    fn test_check_date_undated() {
        let post = ArchivePost {
            creation_timestamp: None,
            title: None,
            media: vec![],
        };
        assert!(check_date(&post).is_none());
    }

    #[test]
    fn test_summary_from_outcomes() {
        let outcomes = vec![
            PostOutcome::Simulated { media_count: 2 },
            PostOutcome::Simulated { media_count: 3 },
            PostOutcome::Skipped(SkipReason::Undated),
        ];
        let summary = ImportSummary::from_outcomes(&outcomes, true);
        assert_eq!(summary.imported_posts, 2);
        assert_eq!(summary.imported_media, 5);
        assert_eq!(summary.skipped_posts, 1);
        assert!(summary.estimated_minutes.is_some());
    }

    #[tokio::test]
    async fn test_live_mode_requires_platform() {
        let options = ImportOptions {
            simulate: false,
            min_date: None,
            max_date: None,
            archive_folder: std::path::PathBuf::from("/nonexistent"),
        };
        let result = run_import(&options, None).await;
        assert!(matches!(result, Err(GramskyError::InvalidInput(_))));
    }
}
