//! `CATAclySMS` records.
//!
//! ```text
//! {
//!     id: 'fire',
//!     title: 'Пожар',
//!     description:
//!       'Лесные пожары...',
//!     image: '/cataclysms/fire.jpg',
//!   }
//! ```
//!
//! Older entries store the description under `text`; it is read as a
//! fallback and always written back as `description`.

use super::escape_literal;
use super::record::{self, Record};
use regex::Regex;
use std::sync::LazyLock;

/// URL prefix under which cataclysm images are published.
pub const ASSETS_ROUTE: &str = "/cataclysms/";

/// Title written for records submitted without one.
pub const DEFAULT_TITLE: &str = "Катаклизм";

static ID: LazyLock<Regex> = LazyLock::new(|| record::text_field("id"));
static TITLE: LazyLock<Regex> = LazyLock::new(|| record::text_field("title"));
static DESCRIPTION: LazyLock<Regex> = LazyLock::new(|| record::text_field("description"));
static LEGACY_TEXT: LazyLock<Regex> = LazyLock::new(|| record::text_field("text"));
static IMAGE: LazyLock<Regex> = LazyLock::new(|| record::text_field("image"));

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Cataclysm {
    pub id: String,
    pub title: String,
    pub description: String,
    pub image: String,
}

impl Record for Cataclysm {
    const NAME: &'static str = "CATAclySMS";

    fn from_literal(raw: &str) -> Self {
        Self {
            id: record::text(raw, &[&*ID]),
            title: record::text(raw, &[&*TITLE]),
            description: record::text(raw, &[&*DESCRIPTION, &*LEGACY_TEXT]),
            image: record::text(raw, &[&*IMAGE]),
        }
    }

    fn normalize(self) -> Self {
        Self {
            id: self.id.trim().to_owned(),
            title: self.title.trim().to_owned(),
            description: self.description,
            image: normalize_image(&self.image),
        }
    }

    fn is_blank(&self) -> bool {
        self.id.is_empty()
            && self.title.is_empty()
            && self.description.trim().is_empty()
            && self.image.is_empty()
    }

    fn render(&self) -> String {
        let title = if self.title.is_empty() {
            DEFAULT_TITLE
        } else {
            &self.title
        };
        format!(
            "{{\n    id: '{}',\n    title: '{}',\n    description:\n      '{}',\n    image: '{}',\n  }}",
            escape_literal(&self.id),
            escape_literal(title),
            escape_literal(&self.description),
            escape_literal(&self.image),
        )
    }
}

/// Root a bare image file name under [`ASSETS_ROUTE`].
///
/// Absolute paths and `http(s)` URLs are kept as they are.
pub fn normalize_image(image: &str) -> String {
    let image = image.trim();
    if image.is_empty() || image.starts_with('/') || image.starts_with("http") {
        image.to_owned()
    } else {
        format!("{ASSETS_ROUTE}{image}")
    }
}

/// Read all cataclysms from the document.
pub fn parse(text: &str) -> Vec<Cataclysm> {
    record::parse(text)
}

/// Replace the cataclysm section; all-blank submissions leave the document unchanged.
pub fn regenerate(text: &str, cataclysms: Vec<Cataclysm>) -> String {
    record::regenerate(text, cataclysms)
}
