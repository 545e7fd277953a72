//! Default values for configuration fields.
//!
//! These functions are used by serde for default deserialization.

// ============================================================================
// Common Defaults
// ============================================================================

pub fn r#true() -> bool {
    true
}

// ============================================================================
// [data] Section Defaults
// ============================================================================

pub mod data {
    use std::path::PathBuf;

    pub fn path() -> PathBuf {
        ["data", "cards.js"].iter().collect()
    }

    pub fn assets() -> PathBuf {
        ["client", "public", "cataclysms"].iter().collect()
    }
}

// ============================================================================
// [serve] Section Defaults
// ============================================================================

pub mod serve {
    pub fn interface() -> String {
        "127.0.0.1".into()
    }

    pub fn port() -> u16 {
        5000
    }
}

// ============================================================================
// [sync] Section Defaults
// ============================================================================

pub mod sync {
    pub fn repo() -> String {
        "jester19686/YGsere".into()
    }

    pub fn branch() -> String {
        "main".into()
    }

    pub fn archive_url() -> String {
        "https://codeload.github.com/{repo}/zip/refs/heads/{branch}".into()
    }

    pub fn data_member() -> String {
        "data/cards.js".into()
    }

    pub fn assets_member() -> String {
        "client/public/cataclysms".into()
    }

    pub fn timeout_secs() -> u64 {
        60
    }
}
