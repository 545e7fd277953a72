//! Decoding of the submitted edit form.
//!
//! Field names:
//!
//! | Field                         | Meaning                                        |
//! |-------------------------------|------------------------------------------------|
//! | `<LIST>_item` (repeated)      | items of one simple list, in order             |
//! | `bunk_idx` (repeated)         | indices of the submitted bunker cards          |
//! | `bunk_desc_<i>` ...           | scalar fields of bunker `<i>`                  |
//! | `bunk_item_<i>` (repeated)    | items of bunker `<i>`                          |
//! | `cat_id`, `cat_title`, ...    | cataclysm columns, zipped by position          |
//! | `revision`                    | revision the form was rendered from            |

use crate::codec::{LIST_KEYS, bunker::Bunker, cataclysm::Cataclysm};

/// Ordered `(name, value)` pairs of an `application/x-www-form-urlencoded` body.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct FormData(Vec<(String, String)>);

impl FormData {
    pub fn parse(body: &[u8]) -> Result<Self, serde_urlencoded::de::Error> {
        serde_urlencoded::from_bytes(body).map(Self)
    }

    /// First value of `name`.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.get_all(name).next()
    }

    /// Every value of `name`, in submission order.
    pub fn get_all<'a>(&'a self, name: &str) -> impl Iterator<Item = &'a str> {
        self.0
            .iter()
            .filter(move |(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// First value of `name`, trimmed; `None` when missing or blank.
    pub fn non_blank(&self, name: &str) -> Option<&str> {
        self.get(name).map(str::trim).filter(|value| !value.is_empty())
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for FormData {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        )
    }
}

/// Everything one save request asks for.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Submission {
    /// Lists present in the form. A list whose field never appears is left alone.
    pub lists: Vec<(&'static str, Vec<String>)>,
    pub bunkers: Vec<Bunker>,
    pub cataclysms: Vec<Cataclysm>,
    /// Revision the form was rendered from, if the client sent one.
    pub revision: Option<String>,
}

impl Submission {
    pub fn from_form(form: &FormData) -> Self {
        let lists = LIST_KEYS
            .iter()
            .filter_map(|&(key, _)| {
                let field = format!("{key}_item");
                form.contains(&field).then(|| {
                    let items = form
                        .get_all(&field)
                        .map(str::trim)
                        .filter(|item| !item.is_empty())
                        .map(str::to_owned)
                        .collect();
                    (key, items)
                })
            })
            .collect();

        Self {
            lists,
            bunkers: bunkers(form),
            cataclysms: cataclysms(form),
            revision: form.non_blank("revision").map(str::to_owned),
        }
    }
}

fn bunkers(form: &FormData) -> Vec<Bunker> {
    form.get_all("bunk_idx")
        .map(|i| {
            let field = |name: &str| form.get(&format!("bunk_{name}_{i}")).unwrap_or_default();
            Bunker {
                description: field("desc").to_owned(),
                items: form
                    .get_all(&format!("bunk_item_{i}"))
                    .map(str::to_owned)
                    .collect(),
                size_m2: parse_number(field("size")),
                stay_text: field("stay").to_owned(),
                food_text: field("food").to_owned(),
                places: parse_number(field("places")),
            }
        })
        .collect()
}

/// Cataclysm columns are zipped by position; shorter columns pad with empty strings.
fn cataclysms(form: &FormData) -> Vec<Cataclysm> {
    let column = |name: &str| form.get_all(name).collect::<Vec<_>>();
    let ids = column("cat_id");
    let titles = column("cat_title");
    let descriptions = column("cat_description");
    let images = column("cat_image");

    let rows = [ids.len(), titles.len(), descriptions.len(), images.len()]
        .into_iter()
        .max()
        .unwrap_or(0);
    let cell = |values: &[&str], i: usize| values.get(i).copied().unwrap_or_default().to_owned();

    (0..rows)
        .map(|i| Cataclysm {
            id: cell(&ids, i),
            title: cell(&titles, i),
            description: cell(&descriptions, i),
            image: cell(&images, i),
        })
        .collect()
}

/// Digits only after trimming; anything else (signs, decimals, overflow) is zero.
fn parse_number(value: &str) -> u32 {
    let value = value.trim();
    if value.is_empty() || !value.bytes().all(|b| b.is_ascii_digit()) {
        return 0;
    }
    value.parse().unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_keeps_order_of_repeated_fields() {
        let form = FormData::parse(b"GENDERS_item=b&x=1&GENDERS_item=a&GENDERS_item=%D0%AF").unwrap();
        assert_eq!(form.get_all("GENDERS_item").collect::<Vec<_>>(), vec!["b", "a", "Я"]);
        assert_eq!(form.get("x"), Some("1"));
        assert_eq!(form.get("missing"), None);
    }

    #[test]
    fn test_parse_plus_as_space() {
        let form = FormData::parse(b"cat_title=%D0%9D%D0%BE%D0%B2%D1%8B%D0%B9+%D0%BC%D0%B8%D1%80").unwrap();
        assert_eq!(form.get("cat_title"), Some("Новый мир"));
    }

    #[test]
    fn test_lists_only_when_submitted() {
        let form: FormData = [
            ("GENDERS_item", " Мужской "),
            ("GENDERS_item", ""),
            ("GENDERS_item", "Женский"),
            ("PHOBIAS_item", ""),
        ]
        .into_iter()
        .collect();
        let submission = Submission::from_form(&form);

        assert_eq!(
            submission.lists,
            vec![
                ("GENDERS", vec!["Мужской".to_string(), "Женский".to_string()]),
                ("PHOBIAS", Vec::new()),
            ]
        );
    }

    #[test]
    fn test_bunkers_by_index() {
        let form: FormData = [
            ("bunk_idx", "0"),
            ("bunk_desc_0", "Склад"),
            ("bunk_size_0", " 120 "),
            ("bunk_stay_0", "1 год"),
            ("bunk_food_0", "мало"),
            ("bunk_places_0", "-3"),
            ("bunk_item_0", "Аптечка"),
            ("bunk_item_0", "Рация"),
            ("bunk_idx", "1"),
            ("bunk_size_1", "1.5"),
        ]
        .into_iter()
        .collect();
        let bunkers = Submission::from_form(&form).bunkers;

        assert_eq!(bunkers.len(), 2);
        assert_eq!(bunkers[0].description, "Склад");
        assert_eq!(bunkers[0].size_m2, 120);
        assert_eq!(bunkers[0].places, 0);
        assert_eq!(bunkers[0].items, vec!["Аптечка", "Рация"]);
        assert_eq!(bunkers[1], Bunker::default());
    }

    #[test]
    fn test_cataclysm_columns_pad() {
        let form: FormData = [
            ("cat_id", "fire"),
            ("cat_title", "Пожар"),
            ("cat_id", "flood"),
            ("cat_description", "Огонь"),
            ("cat_image", "fire.jpg"),
        ]
        .into_iter()
        .collect();
        let cataclysms = Submission::from_form(&form).cataclysms;

        assert_eq!(cataclysms.len(), 2);
        assert_eq!(cataclysms[0].title, "Пожар");
        assert_eq!(cataclysms[0].image, "fire.jpg");
        assert_eq!(cataclysms[1].id, "flood");
        assert_eq!(cataclysms[1].title, "");
        assert_eq!(cataclysms[1].description, "");
    }

    #[test]
    fn test_revision_field() {
        let form: FormData = [("revision", " abc ")].into_iter().collect();
        assert_eq!(Submission::from_form(&form).revision.as_deref(), Some("abc"));

        let form: FormData = [("revision", "")].into_iter().collect();
        assert_eq!(Submission::from_form(&form).revision, None);
    }

    #[test]
    fn test_parse_number() {
        assert_eq!(parse_number("42"), 42);
        assert_eq!(parse_number(" 7 "), 7);
        assert_eq!(parse_number(""), 0);
        assert_eq!(parse_number("+1"), 0);
        assert_eq!(parse_number("1e3"), 0);
        assert_eq!(parse_number("99999999999"), 0);
    }
}
