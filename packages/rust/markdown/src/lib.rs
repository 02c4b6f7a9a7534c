//! Guidebook HTML to Markdown extraction.
//!
//! Walks the `div.guide` container of a duome.eu guidebook page and renders its
//! headings, separators, dialogs ([`dialog`]) and tips ([`tip`]) as Markdown.
//! Illustrations inside tips are kept as inline `<figure>` HTML.

mod dialog;
mod tip;

use std::sync::LazyLock;

use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, instrument};

use guidebook_shared::{GuidebookError, LessonId, Result};

pub use dialog::{extract_dialog_text, process_dialog};
pub use tip::process_tip;

static GUIDE_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("div.guide").expect("valid selector"));
static TITLE_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("h3.zero").expect("valid selector"));

// ---------------------------------------------------------------------------
// Extractor
// ---------------------------------------------------------------------------

/// Convert one guidebook page to Markdown.
///
/// When `lesson` is given the title becomes `Lesson {lesson}: {title}`.
/// Returns [`GuidebookError::MissingGuide`] if the page has no `div.guide`.
#[instrument(skip(markup), fields(markup_len = markup.len()))]
pub fn extract(markup: &str, lesson: Option<LessonId>) -> Result<String> {
    let doc = Html::parse_document(markup);

    let guide = doc
        .select(&GUIDE_SEL)
        .next()
        .ok_or(GuidebookError::MissingGuide)?;

    let mut fragments: Vec<String> = Vec::new();

    if let Some(title_el) = guide.select(&TITLE_SEL).next() {
        let title = lesson_title(&stripped_text(&title_el), lesson);
        fragments.push(format!("# {title}\n"));
    }

    for element in child_elements(&guide) {
        match element.value().name() {
            "h3" if !has_class(&element, "zero") => {
                fragments.push(format!("\n### {}\n", stripped_text(&element)));
            }
            "h5" => {
                fragments.push(format!("\n##### {}\n", stripped_text(&element)));
            }
            "hr" if !has_class(&element, "blue") => {
                fragments.push("\n---\n".to_string());
            }
            "div" if has_class(&element, "dialogue") => {
                if let Some(dialog) = process_dialog(&element) {
                    fragments.push(format!("\n{dialog}\n"));
                }
            }
            "div" if has_class(&element, "guide-tip") => {
                if let Some(tip) = process_tip(&element) {
                    fragments.push(format!("\n{tip}\n"));
                }
            }
            _ => {}
        }
    }

    debug!(fragments = fragments.len(), "guide extracted");

    Ok(fragments.join("\n"))
}

/// Drop everything up to `Guidebook:` and apply the optional lesson prefix.
fn lesson_title(raw: &str, lesson: Option<LessonId>) -> String {
    static GUIDEBOOK_PREFIX_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r".*Guidebook:\s*").expect("valid regex"));

    let title = GUIDEBOOK_PREFIX_RE.replace_all(raw, "");
    match lesson {
        Some(n) => format!("Lesson {n}: {title}"),
        None => title.into_owned(),
    }
}

// ---------------------------------------------------------------------------
// DOM helpers
// ---------------------------------------------------------------------------

/// Whether the element's class list contains `class`.
pub(crate) fn has_class(el: &ElementRef, class: &str) -> bool {
    el.value().classes().any(|c| c == class)
}

/// Direct element children, skipping text and comment nodes.
pub(crate) fn child_elements<'a>(el: &ElementRef<'a>) -> impl Iterator<Item = ElementRef<'a>> {
    el.children().filter_map(ElementRef::wrap)
}

/// All descendant text, untouched.
pub(crate) fn raw_text(el: &ElementRef) -> String {
    el.text().collect()
}

/// Descendant text with every text node trimmed and blanks dropped.
pub(crate) fn stripped_text(el: &ElementRef) -> String {
    el.text().map(str::trim).filter(|s| !s.is_empty()).collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn fixture_path(name: &str) -> std::path::PathBuf {
        std::path::Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("../../../fixtures")
            .join(name)
    }

    fn load_fixture(name: &str) -> String {
        fs::read_to_string(fixture_path(name))
            .unwrap_or_else(|e| panic!("failed to read fixture {name}: {e}"))
    }

    fn page(body: &str) -> String {
        format!("<html><body><div class=\"guide\">{body}</div></body></html>")
    }

    // --- Title ---

    #[test]
    fn title_strips_guidebook_prefix() {
        let html = page(r#"<h3 class="zero"><a href="/">German</a> Guidebook: Order in a cafe</h3>"#);
        assert_eq!(extract(&html, None).unwrap(), "# Order in a cafe\n");
    }

    #[test]
    fn title_with_lesson_hint() {
        let html = page(r#"<h3 class="zero">German Guidebook: Describe people</h3>"#);
        assert_eq!(
            extract(&html, Some(14)).unwrap(),
            "# Lesson 14: Describe people\n"
        );
    }

    #[test]
    fn title_prefix_match_is_case_sensitive() {
        let html = page(r#"<h3 class="zero">german guidebook: Travel</h3>"#);
        assert_eq!(extract(&html, None).unwrap(), "# german guidebook: Travel\n");
    }

    #[test]
    fn nested_title_is_found() {
        let html = page(r#"<div class="head"><h3 class="zero">Guidebook: Nested</h3></div><h5>Key phrases</h5>"#);
        assert_eq!(
            extract(&html, None).unwrap(),
            "# Nested\n\n\n##### Key phrases\n"
        );
    }

    // --- Body dispatch ---

    #[test]
    fn headings_and_rules() {
        let html = page(concat!(
            r#"<h3 class="zero">Guidebook: Basics</h3>"#,
            "\n<h3> Key  <b>phrases</b> </h3>\n",
            r#"<hr class="blue">"#,
            "<h5>Tip</h5>",
            "<hr>",
        ));

        let md = extract(&html, None).unwrap();
        assert_eq!(
            md,
            "# Basics\n\n\n### Keyphrases\n\n\n##### Tip\n\n\n---\n"
        );
    }

    #[test]
    fn zero_title_is_not_repeated_in_body() {
        let html = page(r#"<h3 class="zero">Guidebook: Once</h3>"#);
        let md = extract(&html, None).unwrap();
        assert_eq!(md.matches("Once").count(), 1);
        assert!(!md.contains("###"));
    }

    #[test]
    fn unknown_elements_and_text_are_ignored() {
        let html = page("loose text<p>paragraph</p><span>span</span><h4>h4</h4>");
        assert_eq!(extract(&html, None).unwrap(), "");
    }

    #[test]
    fn nested_children_are_not_walked() {
        let html = page("<div><h5>Hidden</h5></div>");
        assert_eq!(extract(&html, None).unwrap(), "");
    }

    #[test]
    fn dialog_and_tip_are_surrounded_by_blank_lines() {
        let html = page(concat!(
            r#"<div class="dialogue"><div class="storyline"><div class="phrase">"#,
            r#"<div class=""><span class="dotted">Hallo</span>!<span class="cAF">Hello</span></div>"#,
            "</div></div></div>",
            r#"<div class="guide-tip"><p>Note</p></div>"#,
        ));

        assert_eq!(
            extract(&html, None).unwrap(),
            "\nHallo!\nHello\n\n\n> Note\n"
        );
    }

    #[test]
    fn empty_dialog_and_tip_emit_nothing() {
        let html = page(r#"<div class="dialogue"></div><div class="guide-tip"><hr></div>"#);
        assert_eq!(extract(&html, None).unwrap(), "");
    }

    // --- Missing guide ---

    #[test]
    fn missing_guide_is_an_error() {
        let html = "<html><body><div class=\"content\"><h3>Nope</h3></div></body></html>";
        let err = extract(html, Some(1)).unwrap_err();
        assert!(matches!(err, GuidebookError::MissingGuide));
    }

    #[test]
    fn empty_markup_is_missing_guide() {
        assert!(matches!(extract("", None), Err(GuidebookError::MissingGuide)));
    }

    // --- Fixture ---

    #[test]
    fn lesson_fixture() {
        let html = load_fixture("html/guidebook_lesson.html");
        let md = extract(&html, Some(14)).unwrap();

        let expected = concat!(
            "# Lesson 14: Describe people\n",
            "\n",
            "\n",
            "### Key Phrases\n",
            "\n",
            "\n",
            "Ich bin müde.\n",
            "I am tired.\n",
            "\n",
            "Bist du groß?\n",
            "Are you tall?\n",
            "\n",
            "\n",
            "---\n",
            "\n",
            "\n",
            "> **Using sein**\n",
            ">\n",
            "> The verb sein means to be.\n",
            ">\n",
            ">\n",
            "> <figure><img src=\"https://d2pur3iezf4d1j.cloudfront.net/images/sein.svg\" alt=\"Illustration\">",
            "<figcaption>Er ist nett.</figcaption></figure>\n",
            "\n",
            "\n",
            "##### Tip\n",
        );

        assert_eq!(md, expected);
        assert!(!md.contains("yandex"));
        assert!(!md.contains("Footer"));
    }
}
