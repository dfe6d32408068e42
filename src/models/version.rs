//! Build and runtime identity of this program.

use serde::{Deserialize, Serialize};

/// Set at build time to record the source revision, e.g. the output of
/// `git describe --always --dirty`.
const GIT_REVISION: Option<&str> = option_env!("ARCHIVE_POGCHAMP_EMOTE_GIT_REVISION");

/// Snapshot of the program identity, written verbatim to the version-info file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppVersionInfo {
    pub name: String,
    pub version: String,
    pub source_url: String,
    pub git_revision: String,
    pub runtime: String,
}

impl AppVersionInfo {
    /// Capture the identity of the running binary.
    pub fn current() -> Self {
        let name = env!("CARGO_PKG_NAME").to_string();
        let version = env!("CARGO_PKG_VERSION").to_string();
        let runtime = format!(
            "{}/{} ({}-{})",
            name,
            version,
            std::env::consts::OS,
            std::env::consts::ARCH
        );

        Self {
            source_url: non_empty(env!("CARGO_PKG_REPOSITORY")),
            git_revision: non_empty(GIT_REVISION.unwrap_or_default()),
            name,
            version,
            runtime,
        }
    }
}

fn non_empty(value: &str) -> String {
    if value.trim().is_empty() {
        "unknown".to_string()
    } else {
        value.trim().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn current_version_is_populated() {
        let info = AppVersionInfo::current();
        assert_eq!(info.version, env!("CARGO_PKG_VERSION"));
        assert!(!info.git_revision.is_empty());
        assert!(info.runtime.contains(std::env::consts::OS));
    }

    #[test]
    fn serializes_to_json() {
        let info = AppVersionInfo::current();
        let json = serde_json::to_string(&info).unwrap();
        let back: AppVersionInfo = serde_json::from_str(&json).unwrap();
        assert_eq!(info, back);
    }
}
