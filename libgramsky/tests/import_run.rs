//! End-to-end import runs against a temporary archive and the mock platform.

use std::io::Cursor;
use std::path::{Path, PathBuf};

use chrono::{TimeZone, Utc};
use image::{DynamicImage, ImageFormat, RgbImage};
use serde_json::{json, Value};
use tempfile::TempDir;

use libgramsky::importer::{run_import, ImportOptions};
use libgramsky::platforms::mock::MockPlatform;

fn small_png() -> Vec<u8> {
    let img = RgbImage::from_pixel(24, 24, image::Rgb([10, 200, 100]));
    let mut out = Cursor::new(Vec::new());
    DynamicImage::ImageRgb8(img)
        .write_to(&mut out, ImageFormat::Png)
        .unwrap();
    out.into_inner()
}

/// Build an archive folder from (timestamp, title, media uris) tuples. Every
/// `.jpg` URI gets a real PNG on disk; `.mp4` URIs get junk bytes; URIs
/// starting with "missing/" get no file at all.
fn build_archive(posts: &[(Option<i64>, Option<&str>, Vec<&str>)]) -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    let content_dir = dir.path().join("content");
    std::fs::create_dir_all(&content_dir).unwrap();

    let png = small_png();
    let mut json_posts: Vec<Value> = Vec::new();
    for (ts, title, uris) in posts {
        let media: Vec<Value> = uris
            .iter()
            .map(|uri| {
                if !uri.starts_with("missing/") {
                    let path: PathBuf = dir.path().join(uri);
                    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
                    if uri.ends_with(".mp4") {
                        std::fs::write(&path, b"not really a video").unwrap();
                    } else {
                        std::fs::write(&path, &png).unwrap();
                    }
                }
                json!({ "uri": uri, "creation_timestamp": ts, "title": null })
            })
            .collect();
        json_posts.push(json!({
            "creation_timestamp": ts,
            "title": title,
            "media": media,
        }));
    }

    std::fs::write(
        content_dir.join("posts_1.json"),
        serde_json::to_string_pretty(&json_posts).unwrap(),
    )
    .unwrap();
    dir
}

fn options(archive: &Path, simulate: bool) -> ImportOptions {
    ImportOptions {
        simulate,
        min_date: None,
        max_date: None,
        archive_folder: archive.to_path_buf(),
    }
}

#[tokio::test]
async fn simulate_counts_posts_and_media_and_estimates_time() {
    // 10 posts, 2 images each.
    let posts: Vec<(Option<i64>, Option<&str>, Vec<&str>)> = (0..10)
        .map(|i| {
            (
                Some(1_600_000_000 + i * 86_400),
                Some("day"),
                vec!["media/a.jpg", "media/b.jpg"],
            )
        })
        .collect();
    let dir = build_archive(&posts);

    let summary = run_import(&options(dir.path(), true), None).await.unwrap();

    assert_eq!(summary.imported_posts, 10);
    assert_eq!(summary.imported_media, 20);
    // 20 * 3000ms = 60s -> 1.1 minutes -> rounds to 1
    assert_eq!(summary.estimated_minutes, Some(1));
    assert_eq!(
        libgramsky::importer::format_estimate(summary.estimated_minutes.unwrap()),
        "0 hours and 1 minutes"
    );
}

#[tokio::test(start_paused = true)]
async fn live_run_submits_in_chronological_order() {
    // Archive order is shuffled; first-media timestamps decide the order.
    let dir = build_archive(&[
        (Some(3000), Some("third"), vec!["media/c.jpg"]),
        (Some(1000), Some("first"), vec!["media/a.jpg"]),
        (Some(2000), Some("second"), vec!["media/b.jpg"]),
    ]);

    let platform = MockPlatform::success();
    let summary = run_import(&options(dir.path(), false), Some(&platform))
        .await
        .unwrap();

    assert_eq!(summary.imported_posts, 3);
    assert_eq!(summary.imported_media, 3);
    assert!(summary.estimated_minutes.is_none());

    let created = platform.created_posts();
    let texts: Vec<&str> = created.iter().map(|p| p.text.as_str()).collect();
    assert_eq!(texts, vec!["first", "second", "third"]);
    let dates: Vec<i64> = created.iter().map(|p| p.date.timestamp()).collect();
    assert_eq!(dates, vec![1000, 2000, 3000]);
}

#[tokio::test]
async fn min_date_after_everything_skips_all_posts() {
    let dir = build_archive(&[
        (Some(1000), Some("a"), vec!["media/a.jpg"]),
        (Some(2000), Some("b"), vec!["media/b.jpg"]),
    ]);

    let mut opts = options(dir.path(), true);
    opts.min_date = Some(Utc.timestamp_opt(10_000, 0).unwrap());

    let summary = run_import(&opts, None).await.unwrap();
    assert_eq!(summary.imported_posts, 0);
    assert_eq!(summary.imported_media, 0);
    assert_eq!(summary.skipped_posts, 2);
}

#[tokio::test(start_paused = true)]
async fn max_date_stops_the_whole_run() {
    // Five posts ascending by first-media timestamp. The fifth has a
    // post-level timestamp inside the bound, but the run has already stopped
    // at the fourth.
    let dir = build_archive(&[
        (Some(1000), Some("p1"), vec!["media/a.jpg"]),
        (Some(2000), Some("p2"), vec!["media/b.jpg"]),
        (Some(3000), Some("p3"), vec!["media/c.jpg"]),
        (Some(4000), Some("p4"), vec!["media/d.jpg"]),
        (Some(5000), Some("p5"), vec!["media/e.jpg"]),
    ]);

    // Override the fifth post's own timestamp to fall inside the bound while
    // its first-media timestamp keeps it sorted last.
    let posts_path = dir.path().join("content/posts_1.json");
    let mut posts: Vec<Value> =
        serde_json::from_str(&std::fs::read_to_string(&posts_path).unwrap()).unwrap();
    posts[4]["creation_timestamp"] = json!(2500);
    std::fs::write(&posts_path, serde_json::to_string(&posts).unwrap()).unwrap();

    let platform = MockPlatform::success();
    let mut opts = options(dir.path(), false);
    opts.max_date = Some(Utc.timestamp_opt(3500, 0).unwrap());

    let summary = run_import(&opts, Some(&platform)).await.unwrap();
    assert_eq!(summary.imported_posts, 3);
    assert_eq!(platform.created_posts().len(), 3);
}

#[tokio::test(start_paused = true)]
async fn submission_failure_skips_post_and_continues() {
    let dir = build_archive(&[
        (Some(1000), Some("a"), vec!["media/a.jpg"]),
        (Some(2000), Some("b"), vec!["media/b.jpg"]),
    ]);

    let platform = MockPlatform::post_failure("PDS rejected the record");
    let summary = run_import(&options(dir.path(), false), Some(&platform))
        .await
        .unwrap();

    assert_eq!(summary.imported_posts, 0);
    assert_eq!(summary.imported_media, 0);
    assert_eq!(summary.skipped_posts, 2);
}

#[tokio::test]
async fn undated_posts_are_skipped_with_warning() {
    let dir = build_archive(&[
        (None, Some("no date"), vec![]),
        (Some(2000), Some("dated"), vec!["media/b.jpg"]),
    ]);

    let summary = run_import(&options(dir.path(), true), None).await.unwrap();
    assert_eq!(summary.imported_posts, 1);
    assert_eq!(summary.skipped_posts, 1);
}

#[tokio::test]
async fn text_only_post_with_unreadable_media_still_imports() {
    let dir = build_archive(&[(Some(1000), Some("words"), vec!["missing/gone.jpg"])]);

    let summary = run_import(&options(dir.path(), true), None).await.unwrap();
    assert_eq!(summary.imported_posts, 1);
    assert_eq!(summary.imported_media, 0);
}

#[tokio::test]
async fn broken_video_skips_only_that_post() {
    // The junk .mp4 passes size validation but fails the dimension probe in
    // the video pipeline, so the post is skipped; its neighbor still lands.
    let dir = build_archive(&[
        (Some(1000), Some("clip"), vec!["media/clip.mp4"]),
        (Some(2000), Some("photo"), vec!["media/b.jpg"]),
    ]);

    let summary = run_import(&options(dir.path(), true), None).await.unwrap();
    assert_eq!(summary.imported_posts, 1);
    assert_eq!(summary.imported_media, 1);
    assert_eq!(summary.skipped_posts, 1);
}

#[tokio::test]
async fn missing_archive_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let result = run_import(&options(dir.path(), true), None).await;
    assert!(result.is_err());
}
