// src/pipeline/run.rs

//! The full archival run, top to bottom.
//!
//! 1. Resolve configuration
//! 2. Create output folders
//! 3. Write the version-info file
//! 4. Save social media, announcement and additional URLs to the wayback machine
//! 5. Write the crawler URL list and argument file
//! 6. Download the announcement video, or write the "no video" marker
//! 7. Download additional videos
//! 8. Run the crawler
//!
//! The first failing step ends the run.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::models::{AppVersionInfo, ConfigFile, EmoteInput, RunConfig, resolve};
use crate::pipeline::emit::{self, CrawlInputs, WaybackResults};
use crate::services::{
    ProcessRunner, PublicArchiveClient, SaveService, ToolCommand, VideoArchiver,
};
use crate::utils::fs;

const TOTAL_STEPS: usize = 8;

/// wpull exit codes treated as success: 0, 4 (network failures on some
/// URLs) and 8 (server error responses on some URLs).
pub const CRAWLER_ACCEPTABLE_EXIT_CODES: [i32; 3] = [0, 4, 8];

/// Command line level settings for one run.
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Absolute folder that receives the `{date}` folder
    pub root_output_folder: PathBuf,
    pub wpull_binary: PathBuf,
    pub youtube_dl_binary: PathBuf,
    /// Skip the wayback machine calls
    pub dry_run_wayback: bool,
    /// Skip the video downloads
    pub dry_run_video: bool,
}

/// What a finished run produced.
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub config: RunConfig,
    pub wayback: WaybackResults,
    pub crawl_inputs: CrawlInputs,
    pub video_dirs: Vec<PathBuf>,
    pub crawler_exit_code: Option<i32>,
}

/// Run every step against the real Wayback Machine.
pub async fn run_pipeline(config_file: &ConfigFile, options: &RunOptions) -> Result<RunSummary> {
    let archive = PublicArchiveClient::wayback(&config_file.wayback)?;
    run_with_client(&config_file.archive_pogchamp_emote, options, &archive).await
}

/// Run every step with the given public archive client.
pub async fn run_with_client<S: SaveService>(
    input: &EmoteInput,
    options: &RunOptions,
    archive: &PublicArchiveClient<S>,
) -> Result<RunSummary> {
    let version = AppVersionInfo::current();

    step(1, "Resolve configuration");
    let config = report(1, resolve(input, &options.root_output_folder))?;

    step(2, "Create output folders");
    report(2, create_folders(&config).await)?;

    step(3, "Write version info");
    report(3, fs::write_json(&config.version_info_path(), &version).await)?;
    log::info!("Version info written to {}", config.version_info_path().display());

    step(4, "Save URLs to the wayback machine");
    let wayback = report(4, save_to_wayback(&config, archive, options.dry_run_wayback).await)?;

    step(5, "Write crawler input files");
    let crawl_inputs = report(5, emit::emit(&config, &wayback, &version).await)?;

    let videos = VideoArchiver::new(&options.youtube_dl_binary);
    let mut video_dirs = Vec::new();

    step(6, "Archive the announcement video");
    if let Some(dir) = report(6, announcement_video(&config, &videos, options.dry_run_video).await)? {
        video_dirs.push(dir);
    }

    step(7, "Archive additional videos");
    let total_videos = config.additional_video_urls().len();
    for (i, url) in config.additional_video_urls().iter().enumerate() {
        log::info!("[{}/{}] additional video {}", i + 1, total_videos, url);
        let dir = report(
            7,
            videos
                .archive_video(
                    &config.folders().video_output,
                    url,
                    &config.files().video_arguments,
                    options.dry_run_video,
                )
                .await,
        )?;
        video_dirs.push(dir);
    }

    step(8, "Run the crawler");
    let status = report(
        8,
        ProcessRunner::new()
            .run(&crawler_command(&options.wpull_binary, &crawl_inputs))
            .await,
    )?;

    log::info!("Archival for {} complete", config.date_str());

    Ok(RunSummary {
        config,
        wayback,
        crawl_inputs,
        video_dirs,
        crawler_exit_code: status.code(),
    })
}

fn step(number: usize, message: &str) {
    log::info!("[STEP {number}/{TOTAL_STEPS}] {message}");
}

/// Log a failed step with its position before handing the error back.
fn report<T>(number: usize, result: Result<T>) -> Result<T> {
    result.map_err(|e| {
        log::error!("[STEP {number}/{TOTAL_STEPS}] failed: {e}");
        e
    })
}

async fn create_folders(config: &RunConfig) -> Result<()> {
    for folder in config.folders().all() {
        log::debug!("Creating folder {}", folder.display());
        fs::ensure_dir(folder).await?;
    }
    Ok(())
}

/// Save the social media URLs, then the announcement, then the additional
/// URLs, in that order.
async fn save_to_wayback<S: SaveService>(
    config: &RunConfig,
    archive: &PublicArchiveClient<S>,
    dry_run: bool,
) -> Result<WaybackResults> {
    let social_media_urls = &config.streamer().social_media_urls;
    let total = social_media_urls.len() + 1 + config.additional_wayback_urls().len();
    let mut position = 0;
    let mut results = WaybackResults::default();

    for url in social_media_urls {
        position += 1;
        results
            .social_media
            .push(archive.archive(url, position, total, dry_run).await?);
    }

    position += 1;
    results.announcement = archive
        .archive(config.announcement_url(), position, total, dry_run)
        .await?;

    for url in config.additional_wayback_urls() {
        position += 1;
        results
            .additional
            .push(archive.archive(url, position, total, dry_run).await?);
    }

    Ok(results)
}

async fn announcement_video(
    config: &RunConfig,
    videos: &VideoArchiver,
    dry_run: bool,
) -> Result<Option<PathBuf>> {
    let url = config.announcement_url();

    if !config.announcement_is_video() {
        let marker = config.no_video_marker_path();
        log::info!(
            "Announcement {url} is not marked as a video, writing {}",
            marker.display()
        );
        let message = format!(
            "The announcement post {url} is not marked as containing a video \
             (twitch_twitter_post_is_video = false), so no video was downloaded.\n"
        );
        fs::write_bytes(&marker, message.as_bytes()).await?;
        return Ok(None);
    }

    let dir = videos
        .archive_video(
            &config.folders().video_output,
            url,
            &config.files().video_arguments,
            dry_run,
        )
        .await?;
    Ok(Some(dir))
}

/// `wpull @{argument file}`
fn crawler_command(wpull: &Path, inputs: &CrawlInputs) -> ToolCommand {
    let mut arguments_file = OsString::from("@");
    arguments_file.push(&inputs.arguments);

    ToolCommand::new(wpull)
        .arg(arguments_file)
        .acceptable_exit_codes(&CRAWLER_ACCEPTABLE_EXIT_CODES)
}
