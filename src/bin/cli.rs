//! archive-pogchamp-emote CLI
//!
//! Runs one archival of the daily twitch.tv PogChamp emote, top to bottom.

use std::path::PathBuf;

use archive_pogchamp_emote::{
    config,
    error::Result,
    logging::{self, LoggingOptions},
    pipeline::{self, RunOptions},
    services::video::DEFAULT_DOWNLOADER,
};
use clap::Parser;

/// Tool to automate the archival of the daily twitch.tv PogChamp emotes each day
#[derive(Parser, Debug)]
#[command(name = "archive-pogchamp-emote", version, about)]
struct Cli {
    /// The TOML configuration file
    #[arg(long)]
    config_file: PathBuf,

    /// The root folder that everything else is put in
    #[arg(long, value_parser = existing_directory)]
    root_output_folder: PathBuf,

    /// Path to the wpull executable
    #[arg(long)]
    wpull_binary_path: PathBuf,

    /// Path to the yt-dlp executable
    #[arg(long, default_value = DEFAULT_DOWNLOADER)]
    youtube_dl_binary_path: PathBuf,

    /// Save the application log to a file as well as print to stdout
    #[arg(long)]
    log_to_file: Option<PathBuf>,

    /// Increase logging verbosity
    #[arg(long)]
    verbose: bool,

    /// Testing: don't save anything to the wayback machine
    #[arg(long)]
    no_wayback_machine_save: bool,

    /// Testing: don't download any videos
    #[arg(long)]
    no_youtube_dl: bool,
}

/// Accept only existing directories, returned as absolute paths.
fn existing_directory(value: &str) -> std::result::Result<PathBuf, String> {
    let path = PathBuf::from(value)
        .canonicalize()
        .map_err(|e| format!("failed to resolve `{value}`: {e}"))?;
    if !path.is_dir() {
        return Err(format!("`{}` is not a directory", path.display()));
    }
    Ok(path)
}

/// Main entry point for the CLI application.
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    logging::init(&LoggingOptions {
        verbose: cli.verbose,
        log_file: cli.log_to_file.clone(),
    })?;

    log::debug!("Parsed arguments: {cli:?}");

    if let Err(e) = run(cli).await {
        log::error!("Something went wrong! {e}");
        return Err(e);
    }

    log::info!("Done!");
    Ok(())
}

async fn run(cli: Cli) -> Result<()> {
    let config_file = config::load_config(&cli.config_file)?;

    let options = RunOptions {
        root_output_folder: cli.root_output_folder,
        wpull_binary: cli.wpull_binary_path,
        youtube_dl_binary: cli.youtube_dl_binary_path,
        dry_run_wayback: cli.no_wayback_machine_save,
        dry_run_video: cli.no_youtube_dl,
    };

    if options.dry_run_wayback {
        log::warn!("--no-wayback-machine-save given, nothing will be saved to the wayback machine");
    }
    if options.dry_run_video {
        log::warn!("--no-youtube-dl given, no videos will be downloaded");
    }

    let summary = pipeline::run_pipeline(&config_file, &options).await?;

    log::info!("Output folder: {}", summary.config.folders().root.display());
    log::info!(
        "Crawler exited with {}",
        summary
            .crawler_exit_code
            .map_or_else(|| "no exit code".to_string(), |c| c.to_string())
    );
    if !summary.video_dirs.is_empty() {
        log::info!("Video folders: {}", summary.video_dirs.len());
    }

    Ok(())
}
