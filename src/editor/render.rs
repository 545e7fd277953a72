//! HTML rendering of the edit form.
//!
//! The page skeleton is an embedded template with `{placeholder}` slots;
//! the repeated sections are produced here. Every value taken from the data
//! file or from the request is HTML-escaped before it reaches the page.

use super::View;
use crate::codec::{bunker::Bunker, cataclysm::Cataclysm};
use crate::config::EditorConfig;
use regex::{Captures, Regex};
use std::{borrow::Cow, sync::LazyLock};

/// Edit form page (embedded at compile time)
const EDITOR_TEMPLATE: &str = include_str!("../embed/editor.html");

/// `{name}` slots; anything else in braces (CSS, JS) is left alone.
static SLOT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\{([a-z_]+)\}").unwrap());

/// Render the whole edit page.
pub fn page(view: &View, config: &EditorConfig, flash: Option<&str>) -> String {
    let file_path = config.data.path.display().to_string();
    let file_path = html_escape(&file_path);
    let repo = html_escape(&config.sync.repo);
    let branch = html_escape(&config.sync.branch);
    let flash = flash
        .map(|message| format!(r#"<div class="flash">{}</div>"#, html_escape(message)))
        .unwrap_or_default();
    let list_cards = lists(view);
    let bunker_cards = bunkers(&view.bunkers);
    let cataclysm_rows = cataclysms(&view.cataclysms);

    fill(
        EDITOR_TEMPLATE,
        &[
            ("file_path", &*file_path),
            ("repo", &*repo),
            ("branch", &*branch),
            ("flash", flash.as_str()),
            ("revision", view.revision.as_str()),
            ("lists", list_cards.as_str()),
            ("bunkers", bunker_cards.as_str()),
            ("cataclysms", cataclysm_rows.as_str()),
        ],
    )
}

/// Substitute known slots in one pass, so slot-like text inside values stays literal.
pub fn fill(template: &str, values: &[(&str, &str)]) -> String {
    SLOT.replace_all(template, |caps: &Captures| {
        values
            .iter()
            .find(|(name, _)| *name == &caps[1])
            .map_or_else(|| caps[0].to_owned(), |(_, value)| (*value).to_owned())
    })
    .into_owned()
}

/// Escape text for element content and double- or single-quoted attributes.
pub fn html_escape(s: &str) -> Cow<'_, str> {
    // Fast path: check if escaping is needed
    if !s.contains(['<', '>', '&', '"', '\'']) {
        return Cow::Borrowed(s);
    }

    let mut result = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            '&' => result.push_str("&amp;"),
            '"' => result.push_str("&quot;"),
            '\'' => result.push_str("&#39;"),
            _ => result.push(c),
        }
    }
    Cow::Owned(result)
}

// ============================================================================
// Simple Lists
// ============================================================================

fn lists(view: &View) -> String {
    view.lists
        .iter()
        .map(|list| {
            let key = list.key;
            let rows: String = list
                .items
                .iter()
                .enumerate()
                .map(|(n, item)| {
                    format!(
                        r#"<div class="row"><div class="num">{}</div><input type="text" name="{key}_item" value="{}"/></div>"#,
                        n + 1,
                        html_escape(item)
                    )
                })
                .collect();

            format!(
                r#"<div class="card">
  <div class="card-head"><strong>{label}</strong><span class="muted" id="{key}_count">{count} шт.</span></div>
  <div class="hr"></div>
  <div id="{key}_list">
    {rows}
    <div class="row"><div class="num">{next}</div><input type="text" name="{key}_item" placeholder="Новый элемент..."/></div>
  </div>
  <div class="add" onclick="addItem('{key}')">+ Добавить ещё</div>
</div>"#,
                label = html_escape(list.label),
                count = list.items.len(),
                next = list.items.len() + 1,
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

// ============================================================================
// Bunkers
// ============================================================================

fn bunkers(bunkers: &[Bunker]) -> String {
    let blank = Bunker::default();
    bunkers
        .iter()
        .chain(std::iter::once(&blank))
        .enumerate()
        .map(|(i, bunker)| bunker_card(i, bunker))
        .collect::<Vec<_>>()
        .join("\n")
}

fn bunker_card(i: usize, bunker: &Bunker) -> String {
    let items: String = bunker
        .items
        .iter()
        .enumerate()
        .map(|(n, item)| {
            format!(
                r#"<div class="subrow"><div class="num">{}</div><input type="text" name="bunk_item_{i}" value="{}"/></div>"#,
                n + 1,
                html_escape(item)
            )
        })
        .collect();

    format!(
        r#"<div class="card" data-index="{i}">
  <input type="hidden" name="bunk_idx" value="{i}"/>
  <div class="row bunker-fields">
    <div class="num">{number}</div>
    <textarea name="bunk_desc_{i}" placeholder="Описание...">{description}</textarea>
    <input type="number" min="0" name="bunk_size_{i}" value="{size}" placeholder="м²"/>
    <input type="text" name="bunk_stay_{i}" value="{stay}" placeholder="Время пребывания"/>
    <input type="text" name="bunk_food_{i}" value="{food}" placeholder="Запас еды"/>
    <input type="number" min="0" name="bunk_places_{i}" value="{places}" placeholder="Мест"/>
  </div>
  <div class="muted label">Предметы:</div>
  <div id="bunk_items_{i}">
    {items}
    <div class="subrow"><div class="num">{next}</div><input type="text" name="bunk_item_{i}" placeholder="Новый предмет..."/></div>
  </div>
  <div class="add" onclick="addBunkItem({i})">+ Добавить предмет</div>
</div>"#,
        number = i + 1,
        description = html_escape(&bunker.description),
        size = bunker.size_m2,
        stay = html_escape(&bunker.stay_text),
        food = html_escape(&bunker.food_text),
        places = bunker.places,
        next = bunker.items.len() + 1,
    )
}

// ============================================================================
// Cataclysms
// ============================================================================

fn cataclysms(cataclysms: &[Cataclysm]) -> String {
    let rows = cataclysms.iter().enumerate().map(|(n, cataclysm)| {
        let preview = if cataclysm.image.is_empty() {
            String::new()
        } else {
            format!(
                r#"<img class="preview" src="{}" alt="" loading="lazy"/>"#,
                html_escape(&cataclysm.image)
            )
        };
        format!(
            r#"<div class="row cat-fields">
  <div class="num">{number}</div>
  <input type="text" name="cat_id" value="{id}"/>
  <input type="text" name="cat_title" value="{title}"/>
  <textarea name="cat_description">{description}</textarea>
  <div><input type="text" name="cat_image" value="{image}"/>{preview}</div>
</div>"#,
            number = n + 1,
            id = html_escape(&cataclysm.id),
            title = html_escape(&cataclysm.title),
            description = html_escape(&cataclysm.description),
            image = html_escape(&cataclysm.image),
        )
    });

    let blank = format!(
        r#"<div class="row cat-fields">
  <div class="num">{}</div>
  <input type="text" name="cat_id" placeholder="new-id"/>
  <input type="text" name="cat_title" placeholder="Заголовок"/>
  <textarea name="cat_description" placeholder="Описание..."></textarea>
  <div><input type="text" name="cat_image" placeholder="/cataclysms/new.jpg"/></div>
</div>"#,
        cataclysms.len() + 1
    );

    rows.chain(std::iter::once(blank))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOC: &str = "\
const GENDERS = ['Мужской', 'Женский'];
const BUNKERS = [
  { description: 'Склад <b>', items: ['Рация'], sizeM2: 50, stayText: '', foodText: '', places: 2 },
];
const CATAclySMS = [
  { id: 'fire', title: 'Пожар', description: 'Огонь', image: '/cataclysms/fire.jpg' },
];
module.exports = { GENDERS, BUNKERS, CATAclySMS };
";

    #[test]
    fn test_html_escape() {
        assert_eq!(html_escape("plain"), "plain");
        assert!(matches!(html_escape("plain"), Cow::Borrowed(_)));
        assert_eq!(
            html_escape(r#"<a href="x">it's & co</a>"#),
            "&lt;a href=&quot;x&quot;&gt;it&#39;s &amp; co&lt;/a&gt;"
        );
    }

    #[test]
    fn test_fill_single_pass() {
        let out = fill(
            "{a} {b} {unknown} body{color:red} ${i}",
            &[("a", "{b}"), ("b", "B")],
        );
        assert_eq!(out, "{b} B {unknown} body{color:red} ${i}");
    }

    #[test]
    fn test_page_renders_sections() {
        let view = View::from_document(DOC);
        let html = page(&view, &EditorConfig::default(), Some("Сохранено <ok>"));

        assert!(html.contains(r#"<div class="flash">Сохранено &lt;ok&gt;</div>"#));
        assert!(html.contains(r#"name="GENDERS_item" value="Женский""#));
        assert!(html.contains(r#"id="GENDERS_count">2 шт."#));
        // Empty lists still get a card with a blank row
        assert!(html.contains(r#"name="EXTRAS_item" placeholder="#));

        assert!(html.contains("Склад &lt;b&gt;</textarea>"));
        assert!(html.contains(r#"name="bunk_item_0" value="Рация""#));
        // Blank card for a new bunker
        assert!(html.contains(r#"<input type="hidden" name="bunk_idx" value="1"/>"#));

        assert!(html.contains(r#"name="cat_id" value="fire""#));
        assert!(html.contains(r#"<img class="preview" src="/cataclysms/fire.jpg""#));
        assert!(html.contains(&format!(r#"name="revision" value="{}""#, view.revision)));

        assert!(!html.contains("{lists}"));
        assert!(!html.contains("{flash}"));
    }

    #[test]
    fn test_page_without_flash() {
        let view = View::from_document("");
        let html = page(&view, &EditorConfig::default(), None);
        assert!(!html.contains(r#"class="flash""#));
        assert!(html.contains("jester19686/YGsere"));
    }
}
