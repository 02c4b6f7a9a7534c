//! Dialog reconstruction: one sentence plus translation per storyline.

use std::sync::LazyLock;

use scraper::{ElementRef, Selector};

use crate::raw_text;

static STORYLINE_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("div.storyline").expect("valid selector"));
static PHRASE_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("div.phrase").expect("valid selector"));
static DOTTED_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("span.dotted").expect("valid selector"));
static TRANSLATION_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("span.cAF").expect("valid selector"));

/// Sentence-final tokens that sit as bare text after the word spans.
const PUNCTUATION: [&str; 4] = [".", "?", "!", ","];

/// Render every storyline of a `div.dialogue`, separated by blank lines.
pub fn process_dialog(dialog: &ElementRef) -> Option<String> {
    let lines: Vec<String> = dialog
        .select(&STORYLINE_SEL)
        .filter_map(|storyline| storyline.select(&PHRASE_SEL).next())
        .filter_map(|phrase| extract_dialog_text(&phrase))
        .collect();

    if lines.is_empty() {
        None
    } else {
        Some(lines.join("\n\n"))
    }
}

/// Rebuild one phrase as `sentence\ntranslation`.
///
/// Word spans are joined with single spaces and keep their own whitespace.
/// The translation is only included when a sentence was found.
pub fn extract_dialog_text(phrase: &ElementRef) -> Option<String> {
    let text_div = plain_container(phrase)?;

    let mut sentence = text_div
        .select(&DOTTED_SEL)
        .map(|span| raw_text(&span))
        .collect::<Vec<_>>()
        .join(" ");

    if let Some(mark) = text_div
        .children()
        .filter_map(|node| node.value().as_text())
        .map(|text| text.trim())
        .find(|text| PUNCTUATION.contains(text))
    {
        sentence.push_str(mark);
    }

    let translation = text_div
        .select(&TRANSLATION_SEL)
        .next()
        .map(|span| raw_text(&span))
        .unwrap_or_default();

    match (sentence.is_empty(), translation.is_empty()) {
        (false, false) => Some(format!("{sentence}\n{translation}")),
        (false, true) => Some(sentence),
        _ => None,
    }
}

/// First descendant `div` with no class (the text, not the playback control).
fn plain_container<'a>(phrase: &ElementRef<'a>) -> Option<ElementRef<'a>> {
    phrase
        .descendants()
        .skip(1)
        .filter_map(ElementRef::wrap)
        .find(|el| {
            el.value().name() == "div"
                && el
                    .value()
                    .attr("class")
                    .is_none_or(|class| class.trim().is_empty())
        })
}
