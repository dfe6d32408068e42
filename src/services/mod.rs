//! Service layer for the archiver.
//!
//! This module talks to everything outside the process:
//! - The public web archive (`PublicArchiveClient`)
//! - External tools run as subprocesses (`ProcessRunner`)
//! - The video downloader (`VideoArchiver`)

pub mod process;
pub mod video;
pub mod wayback;

pub use process::{ProcessRunner, ToolCommand};
pub use video::VideoArchiver;
pub use wayback::{PublicArchiveClient, RetryPolicy, SaveOutcome, SaveService, WaybackMachine};
