//! End-to-end runs against stub tools.

#![cfg(unix)]

use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use archive_pogchamp_emote::config::parse_config;
use archive_pogchamp_emote::error::AppError;
use archive_pogchamp_emote::pipeline::{RunOptions, run_pipeline, run_with_client};
use archive_pogchamp_emote::services::{PublicArchiveClient, RetryPolicy, SaveOutcome, SaveService};
use async_trait::async_trait;
use tempfile::TempDir;
use url::Url;

const CONFIG: &str = r#"
[archive_pogchamp_emote]
twitch_emote_id = 555555
date = "2021-01-15"
twitch_twitter_post_url = "https://twitter.com/twitch/status/1"
twitch_twitter_post_is_video = false
streamer_name = "somestreamer"
streamer_twitch_url = "https://twitch.tv/somestreamer"
streamer_social_media_urls = ["https://twitter.com/x"]
"#;

/// A wpull stand-in that records its first argument and exits with `code`.
fn stub_wpull(dir: &Path, code: i32) -> PathBuf {
    let path = dir.join("wpull");
    std::fs::write(
        &path,
        format!("#!/bin/sh\necho \"$1\" > \"$(dirname \"$0\")/wpull_called_with\"\nexit {code}\n"),
    )
    .unwrap();
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
    path
}

fn options(tmp: &TempDir, wpull: PathBuf, dry_run_wayback: bool) -> RunOptions {
    let root = tmp.path().join("out");
    std::fs::create_dir_all(&root).unwrap();
    RunOptions {
        root_output_folder: root,
        wpull_binary: wpull,
        youtube_dl_binary: PathBuf::from("/nonexistent/yt-dlp"),
        dry_run_wayback,
        dry_run_video: true,
    }
}

struct Mirror;

#[async_trait]
impl SaveService for Mirror {
    async fn save(&self, url: &Url) -> SaveOutcome {
        SaveOutcome::Success(format!("https://web.archive.org/web/20210115000000/{url}"))
    }
}

struct Rejecting;

#[async_trait]
impl SaveService for Rejecting {
    async fn save(&self, _url: &Url) -> SaveOutcome {
        SaveOutcome::FatalFailure("rejected".into())
    }
}

fn policy() -> RetryPolicy {
    RetryPolicy {
        max_attempts: 2,
        retry_backoff: Duration::from_millis(1),
        corruption_backoff: Duration::from_millis(1),
    }
}

#[tokio::test]
async fn dry_run_produces_every_artifact() {
    let tmp = TempDir::new().unwrap();
    let wpull = stub_wpull(tmp.path(), 4);
    let options = options(&tmp, wpull, true);
    let config_file = parse_config(CONFIG).unwrap();

    let summary = run_pipeline(&config_file, &options).await.unwrap();
    let day = options.root_output_folder.join("2021-01-15");

    assert_eq!(summary.crawler_exit_code, Some(4));
    assert!(summary.video_dirs.is_empty());

    let marker = day.join("videos/no_twitch.com_twitter_announcement_video.txt");
    let marker = std::fs::read_to_string(marker).unwrap();
    assert!(marker.contains("https://twitter.com/twitch/status/1"));

    let arguments = std::fs::read_to_string(
        day.join("wpull/2021-01-15_twitch-tv_pogchamp_emote_wpull_arguments.txt"),
    )
    .unwrap();
    assert!(arguments.contains("description:Daily https://twitch.tv PogChamp emote for 2021-01-15\n"));
    assert!(arguments.contains(
        "streamer_social_media_url-000-wayback:dry-run:https://twitter.com/x\n"
    ));

    let url_list = std::fs::read_to_string(
        day.join("wpull/2021-01-15_twitch-tv_pogchamp_emote_wpull_url_list.txt"),
    )
    .unwrap();
    assert_eq!(url_list.lines().count(), 6);

    let version: serde_json::Value = serde_json::from_str(
        &std::fs::read_to_string(day.join("2021-01-15_twitch-tv_pogchamp_emote_version_info.json"))
            .unwrap(),
    )
    .unwrap();
    assert_eq!(version["version"], env!("CARGO_PKG_VERSION"));

    let called_with = std::fs::read_to_string(tmp.path().join("wpull_called_with")).unwrap();
    assert_eq!(
        called_with.trim(),
        format!("@{}", summary.crawl_inputs.arguments.display())
    );
}

#[tokio::test]
async fn mirror_results_become_headers() {
    let tmp = TempDir::new().unwrap();
    let wpull = stub_wpull(tmp.path(), 0);
    let options = options(&tmp, wpull, false);
    let config_file = parse_config(CONFIG).unwrap();
    let client = PublicArchiveClient::new(Mirror, policy());

    let summary = run_with_client(&config_file.archive_pogchamp_emote, &options, &client)
        .await
        .unwrap();

    // the 6 base media URLs
    assert_eq!(summary.wayback.additional.len(), 6);
    let arguments = std::fs::read_to_string(&summary.crawl_inputs.arguments).unwrap();
    assert!(arguments.contains(
        "twitch_twitter_post_url-wayback:https://web.archive.org/web/20210115000000/https://twitter.com/twitch/status/1\n"
    ));
}

#[tokio::test]
async fn rejected_url_stops_the_run_before_the_crawl() {
    let tmp = TempDir::new().unwrap();
    let wpull = stub_wpull(tmp.path(), 0);
    let options = options(&tmp, wpull, false);
    let config_file = parse_config(CONFIG).unwrap();
    let client = PublicArchiveClient::new(Rejecting, policy());

    let err = run_with_client(&config_file.archive_pogchamp_emote, &options, &client)
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::InvalidUrl { .. }));
    assert!(!tmp.path().join("wpull_called_with").exists());
    assert!(
        !options
            .root_output_folder
            .join("2021-01-15/wpull/2021-01-15_twitch-tv_pogchamp_emote_wpull_arguments.txt")
            .exists()
    );
}

#[tokio::test]
async fn unacceptable_crawler_exit_fails_the_run() {
    let tmp = TempDir::new().unwrap();
    let wpull = stub_wpull(tmp.path(), 1);
    let options = options(&tmp, wpull, true);
    let config_file = parse_config(CONFIG).unwrap();

    let err = run_pipeline(&config_file, &options).await.unwrap_err();
    assert!(matches!(
        err,
        AppError::UnacceptableExitCode { code: Some(1), .. }
    ));
}

#[tokio::test]
async fn rerun_for_the_same_date_reuses_the_folders() {
    let tmp = TempDir::new().unwrap();
    let wpull = stub_wpull(tmp.path(), 0);
    let options = options(&tmp, wpull, true);
    let config_file = parse_config(CONFIG).unwrap();

    let first = run_pipeline(&config_file, &options).await.unwrap();
    let second = run_pipeline(&config_file, &options).await.unwrap();

    assert_eq!(first.crawl_inputs, second.crawl_inputs);
}
