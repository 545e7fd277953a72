//! `[sync]` section configuration.
//!
//! Where remote snapshots come from and which archive members are copied.

use super::defaults;
use educe::Educe;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// `[sync]` section in cards-editor.toml.
///
/// # Example
/// ```toml
/// [sync]
/// repo = "jester19686/YGsere"
/// branch = "main"
/// timeout_secs = 30
/// auto = false   # never download when cards.js is missing
/// ```
#[derive(Debug, Clone, Educe, Serialize, Deserialize)]
#[educe(Default)]
#[serde(deny_unknown_fields)]
pub struct SyncConfig {
    /// Default repository in `owner/name` form.
    #[serde(default = "defaults::sync::repo")]
    #[educe(Default = defaults::sync::repo())]
    pub repo: String,

    /// Default branch.
    #[serde(default = "defaults::sync::branch")]
    #[educe(Default = defaults::sync::branch())]
    pub branch: String,

    /// Archive download URL with `{repo}` and `{branch}` placeholders.
    #[serde(default = "defaults::sync::archive_url")]
    #[educe(Default = defaults::sync::archive_url())]
    pub archive_url: String,

    /// Data file path inside the archive root.
    #[serde(default = "defaults::sync::data_member")]
    #[educe(Default = defaults::sync::data_member())]
    pub data_member: String,

    /// Image directory inside the archive root.
    #[serde(default = "defaults::sync::assets_member")]
    #[educe(Default = defaults::sync::assets_member())]
    pub assets_member: String,

    /// Timeout for the whole archive download.
    #[serde(default = "defaults::sync::timeout_secs")]
    #[educe(Default = defaults::sync::timeout_secs())]
    pub timeout_secs: u64,

    /// Download the snapshot automatically when the data file is missing.
    #[serde(default = "defaults::r#true")]
    #[educe(Default = true)]
    pub auto: bool,
}

impl SyncConfig {
    /// Resolve the archive URL for a repository and branch.
    pub fn archive_url_for(&self, repo: &str, branch: &str) -> String {
        self.archive_url
            .replace("{repo}", repo)
            .replace("{branch}", branch)
    }

    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}
