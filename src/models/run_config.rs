//! The fully resolved, immutable description of one archival run.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use serde::Serialize;

use crate::error::{AppError, Result};
use crate::models::input::{EmoteInput, ROOT_SECTION};

/// A single provenance header written into the WARC file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WarcHeader {
    pub key: String,
    pub value: String,
}

impl WarcHeader {
    /// Create a header, rejecting empty keys or values.
    ///
    /// Headers are written as one `key:value` line, so keys may not contain
    /// `:` and neither part may contain a line break.
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Result<Self> {
        let key = key.into();
        let value = value.into();
        if key.trim().is_empty() {
            return Err(AppError::config("WARC header key is empty"));
        }
        single_line("WARC header key", &key)?;
        if key.contains(':') {
            return Err(AppError::config(format!(
                "WARC header key `{key}` contains `:`"
            )));
        }
        if value.trim().is_empty() {
            return Err(AppError::config(format!("WARC header `{key}` has an empty value")));
        }
        single_line(&format!("WARC header `{key}`"), &value)?;
        Ok(Self { key, value })
    }
}

/// Output folders, all scoped under `{root_output_folder}/{date}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Folders {
    pub root: PathBuf,
    pub crawl_output: PathBuf,
    pub crawl_tempdir: PathBuf,
    pub video_output: PathBuf,
}

impl Folders {
    /// Every folder the run needs, parents first.
    pub fn all(&self) -> [&Path; 4] {
        [
            &self.root,
            &self.crawl_output,
            &self.crawl_tempdir,
            &self.video_output,
        ]
    }
}

/// Output file names derived from the event date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileNames {
    pub crawl_database: String,
    pub crawl_output_log: String,
    pub crawl_warc: String,
    pub crawl_url_list: String,
    pub crawl_arguments: String,
    pub video_arguments: String,
    pub version_info: String,
}

/// Who streamed the emote.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Streamer {
    pub name: String,
    pub twitch_url: String,
    pub social_media_urls: Vec<String>,
}

/// Immutable run descriptor produced by [`resolve`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunConfig {
    emote_id: String,
    date: NaiveDate,
    folders: Folders,
    files: FileNames,
    announcement_url: String,
    announcement_is_video: bool,
    streamer: Streamer,
    warc_headers: Vec<WarcHeader>,
    base_media_urls: Vec<String>,
    additional_crawl_urls: Vec<String>,
    additional_wayback_urls: Vec<String>,
    additional_video_urls: Vec<String>,
}

impl RunConfig {
    pub fn emote_id(&self) -> &str {
        &self.emote_id
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    /// The event date as `YYYY-MM-DD`.
    pub fn date_str(&self) -> String {
        self.date.format(templates::DATE_FORMAT).to_string()
    }

    pub fn folders(&self) -> &Folders {
        &self.folders
    }

    pub fn files(&self) -> &FileNames {
        &self.files
    }

    pub fn announcement_url(&self) -> &str {
        &self.announcement_url
    }

    pub fn announcement_is_video(&self) -> bool {
        self.announcement_is_video
    }

    pub fn streamer(&self) -> &Streamer {
        &self.streamer
    }

    /// User supplied headers in declared order.
    pub fn warc_headers(&self) -> &[WarcHeader] {
        &self.warc_headers
    }

    /// The emote image URLs, with the emote id substituted.
    pub fn base_media_urls(&self) -> &[String] {
        &self.base_media_urls
    }

    pub fn additional_crawl_urls(&self) -> &[String] {
        &self.additional_crawl_urls
    }

    /// Everything beyond the social media and announcement URLs that gets
    /// mirrored to the public archive.
    pub fn additional_wayback_urls(&self) -> &[String] {
        &self.additional_wayback_urls
    }

    pub fn additional_video_urls(&self) -> &[String] {
        &self.additional_video_urls
    }

    pub fn crawl_database_path(&self) -> PathBuf {
        self.folders.crawl_output.join(&self.files.crawl_database)
    }

    pub fn crawl_output_log_path(&self) -> PathBuf {
        self.folders.crawl_output.join(&self.files.crawl_output_log)
    }

    pub fn crawl_warc_path(&self) -> PathBuf {
        self.folders.crawl_output.join(&self.files.crawl_warc)
    }

    pub fn crawl_url_list_path(&self) -> PathBuf {
        self.folders.crawl_output.join(&self.files.crawl_url_list)
    }

    pub fn crawl_arguments_path(&self) -> PathBuf {
        self.folders.crawl_output.join(&self.files.crawl_arguments)
    }

    pub fn version_info_path(&self) -> PathBuf {
        self.folders.root.join(&self.files.version_info)
    }

    pub fn no_video_marker_path(&self) -> PathBuf {
        self.folders.video_output.join(templates::NO_VIDEO_MARKER)
    }

    /// The `description` provenance header value.
    pub fn description(&self) -> String {
        templates::DESCRIPTION.replace("{}", &self.date_str())
    }
}

/// Resolve the declarative input into a [`RunConfig`].
///
/// `root_output_folder` must already be absolute; this function performs no
/// I/O.
pub fn resolve(input: &EmoteInput, root_output_folder: &Path) -> Result<RunConfig> {
    if !root_output_folder.is_absolute() {
        return Err(AppError::config(format!(
            "root output folder `{}` is not an absolute path",
            root_output_folder.display()
        )));
    }

    let emote_id = input
        .twitch_emote_id
        .as_ref()
        .map(|id| id.as_string())
        .filter(|id| !id.is_empty())
        .ok_or_else(|| missing("twitch_emote_id"))?;
    single_line(&format!("{ROOT_SECTION}.twitch_emote_id"), &emote_id)?;

    let date_raw = required(&input.date, "date")?;
    let date = NaiveDate::parse_from_str(&date_raw, templates::DATE_FORMAT).map_err(|e| {
        AppError::config(format!(
            "{ROOT_SECTION}.date `{date_raw}` is not a YYYY-MM-DD date: {e}"
        ))
    })?;
    let date_str = date.format(templates::DATE_FORMAT).to_string();

    let announcement_url = required(&input.twitch_twitter_post_url, "twitch_twitter_post_url")?;
    let streamer = Streamer {
        name: required(&input.streamer_name, "streamer_name")?,
        twitch_url: required(&input.streamer_twitch_url, "streamer_twitch_url")?,
        social_media_urls: social_media_urls(input)?,
    };

    let warc_headers = input
        .warc_headers
        .iter()
        .map(|(key, value)| {
            let value = value.as_str().ok_or_else(|| {
                AppError::config(format!(
                    "{ROOT_SECTION}.warc_headers.{key} must be a string, got {}",
                    value.type_str()
                ))
            })?;
            WarcHeader::new(key.clone(), value)
        })
        .collect::<Result<Vec<_>>>()?;

    let root = root_output_folder.join(&date_str);
    let crawl_output = root.join(templates::CRAWL_FOLDER);
    let folders = Folders {
        crawl_tempdir: crawl_output.join(templates::CRAWL_TEMP_FOLDER),
        crawl_output,
        video_output: root.join(templates::VIDEO_FOLDER),
        root,
    };

    let files = FileNames {
        crawl_database: templates::CRAWL_DATABASE.replace("{}", &date_str),
        crawl_output_log: templates::CRAWL_OUTPUT_LOG.replace("{}", &date_str),
        crawl_warc: templates::CRAWL_WARC.replace("{}", &date_str),
        crawl_url_list: templates::CRAWL_URL_LIST.replace("{}", &date_str),
        crawl_arguments: templates::CRAWL_ARGUMENTS.replace("{}", &date_str),
        video_arguments: templates::VIDEO_ARGUMENTS.replace("{}", &date_str),
        version_info: templates::VERSION_INFO.replace("{}", &date_str),
    };

    let base_media_urls: Vec<String> = templates::BASE_MEDIA_URLS
        .iter()
        .map(|template| template.replace("{}", &emote_id))
        .collect();

    let additional_crawl_urls = clean_urls(&input.additional_wpull_urls, "additional_wpull_urls")?;
    let additional_video_urls =
        clean_urls(&input.additional_youtube_dl_urls, "additional_youtube_dl_urls")?;

    // The emote assets are always mirrored, not just crawled.
    let additional_wayback_urls = dedup(
        clean_urls(&input.additional_wayback_urls, "additional_wayback_urls")?
            .into_iter()
            .chain(additional_crawl_urls.iter().cloned())
            .chain(base_media_urls.iter().cloned()),
    );

    let config = RunConfig {
        emote_id,
        date,
        folders,
        files,
        announcement_url,
        announcement_is_video: input.twitch_twitter_post_is_video,
        streamer,
        warc_headers,
        base_media_urls,
        additional_crawl_urls,
        additional_wayback_urls,
        additional_video_urls,
    };

    log::debug!("Resolved run configuration: {config:#?}");

    Ok(config)
}

/// Normalize the plural/singular social media fields into one list.
fn social_media_urls(input: &EmoteInput) -> Result<Vec<String>> {
    if let Some(urls) = &input.streamer_social_media_urls {
        let urls = clean_urls(urls, "streamer_social_media_urls")?;
        if urls.is_empty() {
            return Err(AppError::config(format!(
                "{ROOT_SECTION}.streamer_social_media_urls is empty"
            )));
        }
        return Ok(urls);
    }

    match input.streamer_social_media_url.as_deref().map(str::trim) {
        Some(url) if !url.is_empty() => {
            single_line(&format!("{ROOT_SECTION}.streamer_social_media_url"), url)?;
            log::warn!(
                "{ROOT_SECTION}.streamer_social_media_url is deprecated, \
                 use streamer_social_media_urls = [\"{url}\"] instead"
            );
            Ok(vec![url.to_string()])
        }
        _ => Err(missing("streamer_social_media_urls")),
    }
}

fn required(value: &Option<String>, field: &str) -> Result<String> {
    let value = value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| missing(field))?;
    single_line(&format!("{ROOT_SECTION}.{field}"), value)?;
    Ok(value.to_string())
}

/// Values end up as single lines of the crawler files.
fn single_line(what: &str, value: &str) -> Result<()> {
    if value.contains(['\n', '\r']) {
        return Err(AppError::config(format!(
            "{what} contains a line break: {value:?}"
        )));
    }
    Ok(())
}

fn missing(field: &str) -> AppError {
    AppError::config(format!("{ROOT_SECTION}.{field} is missing or empty"))
}

fn clean_urls(urls: &[String], field: &str) -> Result<Vec<String>> {
    urls.iter()
        .map(|u| u.trim())
        .filter(|u| !u.is_empty())
        .map(|u| {
            single_line(&format!("{ROOT_SECTION}.{field}"), u)?;
            Ok(u.to_string())
        })
        .collect()
}

fn dedup(urls: impl Iterator<Item = String>) -> Vec<String> {
    let mut seen = HashSet::new();
    urls.filter(|u| seen.insert(u.clone())).collect()
}

mod templates {
    pub const DATE_FORMAT: &str = "%Y-%m-%d";

    pub const CRAWL_FOLDER: &str = "wpull";
    pub const CRAWL_TEMP_FOLDER: &str = "tmp";
    pub const VIDEO_FOLDER: &str = "videos";

    pub const CRAWL_DATABASE: &str = "{}_twitch-tv_pogchamp_emote_wpull_database.sqlite3";
    pub const CRAWL_OUTPUT_LOG: &str = "{}_twitch-tv_pogchamp_emote_wpull_output.log";
    pub const CRAWL_WARC: &str = "{}_twitch-tv_pogchamp_emote";
    pub const CRAWL_URL_LIST: &str = "{}_twitch-tv_pogchamp_emote_wpull_url_list.txt";
    pub const CRAWL_ARGUMENTS: &str = "{}_twitch-tv_pogchamp_emote_wpull_arguments.txt";
    pub const VIDEO_ARGUMENTS: &str = "{}_twitch-tv_pogchamp_emote_youtube-dl_arguments.txt";
    pub const VERSION_INFO: &str = "{}_twitch-tv_pogchamp_emote_version_info.json";

    pub const NO_VIDEO_MARKER: &str = "no_twitch.com_twitter_announcement_video.txt";

    pub const DESCRIPTION: &str = "Daily https://twitch.tv PogChamp emote for {}";

    pub const BASE_MEDIA_URLS: [&str; 6] = [
        "https://static-cdn.jtvnw.net/emoticons/v2/{}/default/dark/1.0",
        "https://static-cdn.jtvnw.net/emoticons/v2/{}/default/dark/2.0",
        "https://static-cdn.jtvnw.net/emoticons/v2/{}/default/dark/3.0",
        "https://static-cdn.jtvnw.net/emoticons/v2/{}/default/light/1.0",
        "https://static-cdn.jtvnw.net/emoticons/v2/{}/default/light/2.0",
        "https://static-cdn.jtvnw.net/emoticons/v2/{}/default/light/3.0",
    ];
}
