// src/services/video.rs

//! Video archival through yt-dlp.
//!
//! Every URL gets its own directory named `video_{host}_{sha256(url)}` so
//! re-running for the same URL lands in the same place and two URLs on one
//! host never collide.

use std::path::{Path, PathBuf};

use crate::error::{AppError, Result};
use crate::services::process::{ProcessRunner, ToolCommand};
use crate::utils::{fs, get_domain, url_hash};

/// Default name of the downloader executable.
pub const DEFAULT_DOWNLOADER: &str = "yt-dlp";

/// Output file name template, relative to the per-URL directory.
const OUTPUT_TEMPLATE: &str = "%(title)s-%(id)s.%(ext)s";

/// Seconds between download progress lines.
const PROGRESS_INTERVAL_SECS: u32 = 10;

/// One progress line: `progress {percent} of {size} at {speed}, ETA {eta}`.
const PROGRESS_TEMPLATE: &str = "download:progress %(progress._percent_str)s of \
    %(progress._total_bytes_str)s at %(progress._speed_str)s, ETA %(progress._eta_str)s";

/// Drives the external video downloader for single URLs.
#[derive(Debug, Clone)]
pub struct VideoArchiver {
    downloader: PathBuf,
    runner: ProcessRunner,
}

impl VideoArchiver {
    pub fn new(downloader: impl Into<PathBuf>) -> Self {
        Self {
            downloader: downloader.into(),
            runner: ProcessRunner::new(),
        }
    }

    /// Download `url` into its own directory under `output_root`.
    ///
    /// The downloader options are written to `arg_file_name` inside that
    /// directory before the download starts. Returns the directory.
    pub async fn archive_video(
        &self,
        output_root: &Path,
        url: &str,
        arg_file_name: &str,
        dry_run: bool,
    ) -> Result<PathBuf> {
        let video_dir = output_root.join(video_dir_name(url)?);
        fs::ensure_dir(&video_dir).await?;

        if dry_run {
            log::info!(
                "dry run, not downloading video {url} into {}",
                video_dir.display()
            );
            return Ok(video_dir);
        }

        let options_path = video_dir.join(arg_file_name);
        fs::write_lines(&options_path, downloader_options(&video_dir)).await?;
        log::info!(
            "downloading video {url} into {} (options in {})",
            video_dir.display(),
            options_path.display()
        );

        let command = ToolCommand::new(&self.downloader)
            .arg("--ignore-config")
            .arg("--config-locations")
            .arg(&options_path)
            .arg("--")
            .arg(url)
            .output_level(log::Level::Info);

        self.runner
            .run(&command)
            .await
            .map_err(|e| AppError::download(url, e))?;

        log::info!("finished downloading video {url}");
        Ok(video_dir)
    }
}

/// Directory name for a video URL: `video_{host}_{sha256 of the url}`.
pub fn video_dir_name(url: &str) -> Result<String> {
    let host = get_domain(url).ok_or_else(|| AppError::download(url, "URL has no host"))?;
    Ok(format!("video_{}_{}", host, url_hash(url)))
}

/// The fixed downloader configuration, one option per line.
fn downloader_options(video_dir: &Path) -> Vec<String> {
    let output = video_dir.join(OUTPUT_TEMPLATE);
    vec![
        "--format bestvideo+bestaudio/best".to_string(),
        "--write-all-thumbnails".to_string(),
        "--write-subs".to_string(),
        "--write-auto-subs".to_string(),
        "--sub-langs all".to_string(),
        "--write-info-json".to_string(),
        "--write-description".to_string(),
        "--newline".to_string(),
        format!("--progress-delta {PROGRESS_INTERVAL_SECS}"),
        format!("--progress-template {}", quote(PROGRESS_TEMPLATE)),
        "--no-colors".to_string(),
        format!("--output {}", quote(&output.to_string_lossy())),
    ]
}

/// Double quote a value for a yt-dlp configuration file.
fn quote(value: &str) -> String {
    let escaped = value.replace('\\', "\\\\").replace('"', "\\\"");
    format!("\"{escaped}\"")
}
