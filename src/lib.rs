// src/lib.rs

//! Daily twitch.tv PogChamp emote archiver library

pub mod config;
pub mod error;
#[cfg(feature = "cli")]
pub mod logging;
pub mod models;
pub mod pipeline;
pub mod services;
#[cfg(test)]
mod test_log;
pub mod utils;
