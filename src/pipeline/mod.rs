//! Pipeline entry points for an archival run.
//!
//! - `emit`: write the crawler URL list and argument file
//! - `run`: sequence every step of one run

pub mod emit;
pub mod run;

pub use emit::{CrawlInputs, WaybackResults};
pub use run::{RunOptions, RunSummary, run_pipeline, run_with_client};
