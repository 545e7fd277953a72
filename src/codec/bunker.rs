//! `BUNKERS` records.
//!
//! ```text
//! {
//!     description:
//!       'Бункер под школой...',
//!     items: ['Аптечка', 'Рация'],
//!     sizeM2: 120,
//!     stayText: '1 год',
//!     foodText: 'на 6 месяцев',
//!     places: 4,
//!   }
//! ```

use super::escape_literal;
use super::record::{self, Record};
use regex::Regex;
use std::sync::LazyLock;

static DESCRIPTION: LazyLock<Regex> = LazyLock::new(|| record::text_field("description"));
static ITEMS: LazyLock<Regex> = LazyLock::new(|| record::list_field("items"));
static SIZE_M2: LazyLock<Regex> = LazyLock::new(|| record::number_field("sizeM2"));
static STAY_TEXT: LazyLock<Regex> = LazyLock::new(|| record::text_field("stayText"));
static FOOD_TEXT: LazyLock<Regex> = LazyLock::new(|| record::text_field("foodText"));
static PLACES: LazyLock<Regex> = LazyLock::new(|| record::number_field("places"));

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Bunker {
    pub description: String,
    pub items: Vec<String>,
    pub size_m2: u32,
    pub stay_text: String,
    pub food_text: String,
    pub places: u32,
}

impl Record for Bunker {
    const NAME: &'static str = "BUNKERS";

    fn from_literal(raw: &str) -> Self {
        Self {
            description: record::text(raw, &[&*DESCRIPTION]),
            items: record::strings(raw, &ITEMS),
            size_m2: record::number(raw, &SIZE_M2),
            stay_text: record::text(raw, &[&*STAY_TEXT]),
            food_text: record::text(raw, &[&*FOOD_TEXT]),
            places: record::number(raw, &PLACES),
        }
    }

    fn normalize(self) -> Self {
        Self {
            description: self.description.trim().to_owned(),
            items: self
                .items
                .iter()
                .map(|item| item.trim())
                .filter(|item| !item.is_empty())
                .map(str::to_owned)
                .collect(),
            size_m2: self.size_m2,
            stay_text: self.stay_text.trim().to_owned(),
            food_text: self.food_text.trim().to_owned(),
            places: self.places,
        }
    }

    fn is_blank(&self) -> bool {
        self.description.is_empty()
            && self.items.is_empty()
            && self.size_m2 == 0
            && self.stay_text.is_empty()
            && self.food_text.is_empty()
            && self.places == 0
    }

    fn render(&self) -> String {
        let items = self
            .items
            .iter()
            .map(|item| format!("'{}'", escape_literal(item)))
            .collect::<Vec<_>>()
            .join(", ");

        format!(
            "{{\n    description:\n      '{}',\n    items: [{items}],\n    sizeM2: {},\n    stayText: '{}',\n    foodText: '{}',\n    places: {},\n  }}",
            escape_literal(&self.description),
            self.size_m2,
            escape_literal(&self.stay_text),
            escape_literal(&self.food_text),
            self.places,
        )
    }
}

/// Read all bunkers from the document.
pub fn parse(text: &str) -> Vec<Bunker> {
    record::parse(text)
}

/// Replace the bunker section; all-blank submissions leave the document unchanged.
pub fn regenerate(text: &str, bunkers: Vec<Bunker>) -> String {
    record::regenerate(text, bunkers)
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOC: &str = "\
const BUNKERS = [
  {
    description:
      'Подземный склад.\\nСухо и тепло.',
    items: ['Аптечка', 'Рация'],
    sizeM2: 120,
    stayText: '1 год',
    foodText: 'на 6 месяцев',
    places: 4,
  },
  { description: 'Второй', items: [], sizeM2: 'x' },
];

const ABILITIES = [];

module.exports = { BUNKERS, ABILITIES };
";

    fn populated() -> Bunker {
        Bunker {
            description: "Бункер под школой".into(),
            items: vec!["Фонарь".into(), "Генератор".into()],
            size_m2: 80,
            stay_text: "2 года".into(),
            food_text: "на год".into(),
            places: 3,
        }
    }

    #[test]
    fn test_parse_bunkers() {
        let bunkers = parse(DOC);
        assert_eq!(bunkers.len(), 2);

        let first = &bunkers[0];
        assert_eq!(first.description, "Подземный склад.\nСухо и тепло.");
        assert_eq!(first.items, vec!["Аптечка", "Рация"]);
        assert_eq!(first.size_m2, 120);
        assert_eq!(first.stay_text, "1 год");
        assert_eq!(first.food_text, "на 6 месяцев");
        assert_eq!(first.places, 4);

        let second = &bunkers[1];
        assert_eq!(second.description, "Второй");
        assert!(second.items.is_empty());
        assert_eq!(second.size_m2, 0);
        assert_eq!(second.places, 0);
    }

    #[test]
    fn test_blank_bunker_is_dropped() {
        let out = regenerate(DOC, vec![Bunker::default(), populated()]);
        let bunkers = parse(&out);
        assert_eq!(bunkers, vec![populated()]);
        assert!(out.contains("const ABILITIES = [];"));
    }

    #[test]
    fn test_all_blank_submission_keeps_section() {
        let blank = Bunker {
            description: "   ".into(),
            items: vec!["  ".into()],
            ..Bunker::default()
        };
        let out = regenerate(DOC, vec![blank, Bunker::default()]);
        assert_eq!(out, DOC);
    }

    #[test]
    fn test_render_layout() {
        let bunker = Bunker {
            description: "Line 1\r\nLine 2 it's".into(),
            items: vec!["A".into()],
            size_m2: 10,
            stay_text: "t".into(),
            food_text: "f".into(),
            places: 2,
        };
        assert_eq!(
            bunker.render(),
            "{\n    description:\n      'Line 1\\nLine 2 it\\'s',\n    items: ['A'],\n    sizeM2: 10,\n    stayText: 't',\n    foodText: 'f',\n    places: 2,\n  }"
        );
    }

    #[test]
    fn test_regenerate_round_trip_is_stable() {
        let bunkers = parse(DOC);
        let once = regenerate(DOC, bunkers);
        let twice = regenerate(&once, parse(&once));
        assert_eq!(once, twice);
        assert_eq!(parse(&once)[0].description, "Подземный склад.\nСухо и тепло.");
    }

    #[test]
    fn test_numbers_only_record_is_kept() {
        let only_places = Bunker {
            places: 5,
            ..Bunker::default()
        };
        let out = regenerate("module.exports = {};", vec![only_places.clone()]);
        assert_eq!(parse(&out), vec![only_places]);
    }
}
