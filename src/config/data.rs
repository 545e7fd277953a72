//! `[data]` section configuration.
//!
//! Locations of the edited data file and the local image mirror.

use super::defaults;
use educe::Educe;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// `[data]` section in cards-editor.toml.
///
/// # Example
/// ```toml
/// [data]
/// path = "SERVER/data/cards.js"
/// assets = "client/public/cataclysms"
/// ```
#[derive(Debug, Clone, Educe, Serialize, Deserialize)]
#[educe(Default)]
#[serde(deny_unknown_fields)]
pub struct DataConfig {
    /// The cards.js module being edited.
    #[serde(default = "defaults::data::path")]
    #[educe(Default = defaults::data::path())]
    pub path: PathBuf,

    /// Directory mirroring the repository's cataclysm images.
    /// Also served under `/cataclysms/` for previews.
    #[serde(default = "defaults::data::assets")]
    #[educe(Default = defaults::data::assets())]
    pub assets: PathBuf,
}
