// src/models/mod.rs

//! Domain models for the archiver.
//!
//! - `input`: the declarative TOML document as written by the operator
//! - `run_config`: the resolved, immutable run descriptor
//! - `version`: build and runtime identity

pub mod input;
mod run_config;
mod version;

pub use input::{ConfigFile, EmoteId, EmoteInput, WaybackConfig};
pub use run_config::{FileNames, Folders, RunConfig, Streamer, WarcHeader, resolve};
pub use version::AppVersionInfo;
