// src/pipeline/emit.rs

//! Crawler input files.
//!
//! Writes the URL list and the `@`-argument file read by wpull. The argument
//! file holds one argument per line; every provenance header is a
//! `--warc-header` line followed by a `key:value` line.

use std::path::PathBuf;

use crate::error::{AppError, Result};
use crate::models::{AppVersionInfo, RunConfig, WarcHeader};
use crate::utils::fs;

const WARC_HEADER_FLAG: &str = "--warc-header";

/// wpull behaviour flags appended after the headers.
const CRAWL_FLAGS: [&str; 12] = [
    "--waitretry",
    "30",
    "--no-robots",
    "--warc-max-size",
    "5368709120",
    "--html-parser",
    "libxml2-lxml",
    "--page-requisites",
    "--delete-after",
    "--warc-append",
    "--recursive",
    "--verbose",
];

/// Archive URLs returned by the public archive, parallel to the URL
/// collections of the [`RunConfig`] they were collected for.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WaybackResults {
    pub social_media: Vec<String>,
    pub announcement: String,
    pub additional: Vec<String>,
}

/// Paths of the written crawler input files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlInputs {
    pub url_list: PathBuf,
    pub arguments: PathBuf,
}

/// Write the URL list and argument file for the crawler.
pub async fn emit(
    config: &RunConfig,
    results: &WaybackResults,
    version: &AppVersionInfo,
) -> Result<CrawlInputs> {
    let inputs = CrawlInputs {
        url_list: config.crawl_url_list_path(),
        arguments: config.crawl_arguments_path(),
    };

    let urls = crawl_url_list(config);
    fs::write_lines(&inputs.url_list, &urls).await?;
    log::info!(
        "Wrote {} URLs to {}",
        urls.len(),
        inputs.url_list.display()
    );

    let arguments = crawl_arguments(config, results, version)?;
    fs::write_lines(&inputs.arguments, &arguments).await?;
    log::info!("Wrote crawler arguments to {}", inputs.arguments.display());

    Ok(inputs)
}

/// Base media URLs followed by the additional crawl URLs.
pub fn crawl_url_list(config: &RunConfig) -> Vec<String> {
    config
        .base_media_urls()
        .iter()
        .chain(config.additional_crawl_urls())
        .cloned()
        .collect()
}

/// Every line of the crawler argument file, in order.
pub fn crawl_arguments(
    config: &RunConfig,
    results: &WaybackResults,
    version: &AppVersionInfo,
) -> Result<Vec<String>> {
    let mut lines = vec![
        "--database".to_string(),
        config.crawl_database_path().display().to_string(),
        "--output-file".to_string(),
        config.crawl_output_log_path().display().to_string(),
        "--input-file".to_string(),
        config.crawl_url_list_path().display().to_string(),
        "--warc-file".to_string(),
        config.crawl_warc_path().display().to_string(),
        "--warc-tempdir".to_string(),
        config.folders().crawl_tempdir.display().to_string(),
    ];

    for header in warc_headers(config, results, version)? {
        lines.push(WARC_HEADER_FLAG.to_string());
        lines.push(format!("{}:{}", header.key, header.value));
    }

    lines.extend(CRAWL_FLAGS.iter().map(|flag| flag.to_string()));
    Ok(lines)
}

/// Provenance headers in the order they are written.
///
/// Fails if `results` does not hold one archive URL per URL it was
/// collected for.
pub fn warc_headers(
    config: &RunConfig,
    results: &WaybackResults,
    version: &AppVersionInfo,
) -> Result<Vec<WarcHeader>> {
    let streamer = config.streamer();

    let mut headers = vec![
        header("description", config.description()),
        header("streamer_name", &streamer.name),
        header("streamer_twitch_url", &streamer.twitch_url),
    ];

    numbered_pairs(
        &mut headers,
        "streamer_social_media_url",
        &streamer.social_media_urls,
        &results.social_media,
    )?;

    headers.push(header("twitch_twitter_post_url", config.announcement_url()));
    headers.push(header("twitch_twitter_post_url-wayback", &results.announcement));

    numbered_pairs(
        &mut headers,
        "additional_wayback_url",
        config.additional_wayback_urls(),
        &results.additional,
    )?;

    headers.push(header("date", config.date_str()));
    headers.extend(config.warc_headers().iter().cloned());

    headers.push(header("application_name", &version.name));
    headers.push(header("application_version", &version.version));
    headers.push(header("application_source", &version.source_url));
    headers.push(header("application_revision", &version.git_revision));

    Ok(headers)
}

/// `{prefix}-000`, `{prefix}-000-wayback`, `{prefix}-001`, ... numbered by
/// position in the originating collection.
fn numbered_pairs(
    headers: &mut Vec<WarcHeader>,
    prefix: &str,
    urls: &[String],
    archived: &[String],
) -> Result<()> {
    if urls.len() != archived.len() {
        return Err(AppError::ArchiveResultsMismatch {
            collection: prefix.to_string(),
            expected: urls.len(),
            found: archived.len(),
        });
    }
    for (index, (url, archive_url)) in urls.iter().zip(archived).enumerate() {
        headers.push(header(format!("{prefix}-{index:03}"), url));
        headers.push(header(format!("{prefix}-{index:03}-wayback"), archive_url));
    }
    Ok(())
}

fn header(key: impl Into<String>, value: impl Into<String>) -> WarcHeader {
    WarcHeader {
        key: key.into(),
        value: value.into(),
    }
}
