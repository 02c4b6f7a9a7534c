//! Tip blocks rendered as Markdown blockquotes, with illustrations kept as
//! inline `<figure>` HTML.

use std::sync::LazyLock;

use scraper::{ElementRef, Selector};

use crate::{child_elements, has_class, raw_text};

static HEADING_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("h1, h2, h3, h4, h5, h6").expect("valid selector"));

/// An empty blockquote line, used as paragraph spacing inside a tip.
const QUOTE_GAP: &str = ">";

/// Render a `div.guide-tip` as a blockquote.
pub fn process_tip(tip: &ElementRef) -> Option<String> {
    let mut lines: Vec<String> = Vec::new();

    if let Some(heading) = tip.select(&HEADING_SEL).next() {
        lines.push(format!("> **{}**", raw_text(&heading)));
        lines.push(QUOTE_GAP.to_string());
    }

    for child in child_elements(tip) {
        match child.value().name() {
            "p" => {
                let text = raw_text(&child);
                if !text.trim().is_empty() {
                    lines.push(format!("> {text}"));
                    lines.push(QUOTE_GAP.to_string());
                }
            }
            "div" if has_class(&child, "illustration") => {
                if let Some(figure) = Illustration::from_element(&child).to_figure() {
                    lines.push(QUOTE_GAP.to_string());
                    lines.push(format!("> {figure}"));
                    lines.push(QUOTE_GAP.to_string());
                }
            }
            // Separators inside tips carry no content; spacing comes from QUOTE_GAP.
            _ => {}
        }
    }

    while lines.last().is_some_and(|line| line == QUOTE_GAP) {
        lines.pop();
    }

    if lines.is_empty() {
        None
    } else {
        Some(lines.join("\n"))
    }
}

// ---------------------------------------------------------------------------
// Illustration
// ---------------------------------------------------------------------------

/// Image and caption pulled from a `div.illustration`.
#[derive(Debug, Default, PartialEq, Eq)]
struct Illustration {
    src: Option<String>,
    caption: String,
    translation: String,
}

impl Illustration {
    fn from_element(el: &ElementRef) -> Self {
        let mut illustration = Self::default();

        for child in child_elements(el) {
            match child.value().name() {
                "img" => {
                    // Tracking pixels are served from yandex.
                    if let Some(src) = child
                        .value()
                        .attr("src")
                        .filter(|src| !src.is_empty() && !src.contains("yandex"))
                    {
                        illustration.src = Some(src.to_string());
                    }
                }
                "div" if has_class(&child, "caption") => {
                    for candidate in child_elements(&child)
                        .filter(|c| c.value().name() == "div" && !has_class(c, "playback"))
                    {
                        let (caption, translation) = caption_text(&candidate);
                        illustration.caption = caption;
                        illustration.translation = translation;
                    }
                }
                _ => {}
            }
        }

        illustration
    }

    /// `<figure>` markup, or `None` when no usable image was found.
    fn to_figure(&self) -> Option<String> {
        let src = self.src.as_deref()?;

        let mut figcaption = self.caption.clone();
        if !self.translation.is_empty() {
            figcaption.push_str(&format!("<br><em>{}</em>", self.translation));
        }

        let figure = if figcaption.is_empty() {
            format!(r#"<figure><img src="{src}" alt="Illustration"></figure>"#)
        } else {
            format!(
                r#"<figure><img src="{src}" alt="Illustration"><figcaption>{figcaption}</figcaption></figure>"#
            )
        };
        Some(figure)
    }
}

/// Split a caption line into (source text, translation), both trimmed.
///
/// Reading stops at the first `<br>`, so only a `cAF` span before it counts.
fn caption_text(candidate: &ElementRef) -> (String, String) {
    let mut source = String::new();
    let mut translation = String::new();

    for node in candidate.children() {
        if let Some(text) = node.value().as_text() {
            source.push_str(text);
            continue;
        }

        let Some(el) = ElementRef::wrap(node) else {
            continue;
        };
        match el.value().name() {
            "br" => break,
            "span" if has_class(&el, "cAF") => translation = raw_text(&el),
            "span" => source.push_str(&raw_text(&el)),
            _ => {}
        }
    }

    (source.trim().to_string(), translation.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use scraper::Html;

    fn render(html: &str) -> Option<String> {
        let doc = Html::parse_fragment(html);
        let sel = Selector::parse("div.guide-tip").unwrap();
        let tip = doc.select(&sel).next().expect("tip present");
        process_tip(&tip)
    }

    #[test]
    fn title_and_paragraph() {
        let html = r#"<div class="guide-tip"><h3>Good to know</h3><p>Hello</p></div>"#;
        assert_eq!(
            render(html).as_deref(),
            Some("> **Good to know**\n>\n> Hello")
        );
    }

    #[test]
    fn heading_is_emitted_first_regardless_of_position() {
        let html = r#"<div class="guide-tip"><p>First</p><h4>Late title</h4></div>"#;
        assert_eq!(
            render(html).as_deref(),
            Some("> **Late title**\n>\n> First")
        );
    }

    #[test]
    fn paragraph_text_is_not_trimmed() {
        let html = r#"<div class="guide-tip"><p> spaced <b>bold</b> </p><p>   </p></div>"#;
        assert_eq!(render(html).as_deref(), Some(">  spaced bold "));
    }

    #[test]
    fn caption_stops_at_line_break() {
        let html = concat!(
            r#"<div class="guide-tip"><div class="illustration">"#,
            r#"<img src="https://cdn.example/a.svg">"#,
            r#"<div class="caption"><div class="playback"><span>skip</span></div>"#,
            r#"<div><span>Das</span> ist gut.<br><span class="cAF">That is good.</span></div></div>"#,
            "</div></div>",
        );
        assert_eq!(
            render(html).as_deref(),
            Some(concat!(
                ">\n",
                r#"> <figure><img src="https://cdn.example/a.svg" alt="Illustration">"#,
                "<figcaption>Das ist gut.</figcaption></figure>",
            ))
        );
    }

    #[test]
    fn image_without_caption() {
        let html = r#"<div class="guide-tip"><p>Look</p><div class="illustration"><img src="/img/b.png"></div></div>"#;
        assert_eq!(
            render(html).as_deref(),
            Some(concat!(
                "> Look\n>\n>\n",
                r#"> <figure><img src="/img/b.png" alt="Illustration"></figure>"#,
            ))
        );
    }

    #[test]
    fn translation_before_line_break_is_kept() {
        let html = concat!(
            r#"<div class="guide-tip"><div class="illustration"><img src="e.png">"#,
            r#"<div class="caption"><div><span>Er</span> ist nett.<span class="cAF"> He is nice. </span><br>ignored</div></div>"#,
            "</div></div>",
        );
        assert_eq!(
            render(html).as_deref(),
            Some(concat!(
                ">\n",
                r#"> <figure><img src="e.png" alt="Illustration">"#,
                "<figcaption>Er ist nett.<br><em>He is nice.</em></figcaption></figure>",
            ))
        );
    }

    #[test]
    fn caption_after_leading_break_is_empty() {
        let html = concat!(
            r#"<div class="guide-tip"><div class="illustration"><img src="c.png">"#,
            r#"<div class="caption"><div><br><span class="cAF"> Only English </span></div></div>"#,
            "</div></div>",
        );
        assert_eq!(
            render(html).as_deref(),
            Some(concat!(
                ">\n",
                r#"> <figure><img src="c.png" alt="Illustration"></figure>"#,
            ))
        );
    }

    #[test]
    fn tracking_pixel_only_emits_no_figure() {
        let html = concat!(
            r#"<div class="guide-tip"><p>Text</p><div class="illustration">"#,
            r#"<img src="https://mc.yandex.ru/watch/1"><div class="caption"><div>Hallo</div></div>"#,
            "</div></div>",
        );
        let md = render(html).unwrap();
        assert_eq!(md, "> Text");
        assert!(!md.contains("<figure>"));
    }

    #[test]
    fn last_valid_image_and_caption_win() {
        let html = concat!(
            r#"<div class="guide-tip"><div class="illustration">"#,
            r#"<img src="one.png"><img src="two.png"><img src="https://yandex.ru/px">"#,
            r#"<div class="caption"><div>Erste</div><div>Zweite</div></div>"#,
            "</div></div>",
        );
        let md = render(html).unwrap();
        assert!(md.contains(r#"<img src="two.png""#));
        assert!(md.contains("<figcaption>Zweite</figcaption>"));
    }

    #[test]
    fn nested_caption_divs_are_not_candidates() {
        let html = concat!(
            r#"<div class="guide-tip"><div class="illustration"><img src="d.png">"#,
            r#"<div class="caption"><div>Oben<div>Tief</div></div></div>"#,
            "</div></div>",
        );
        let md = render(html).unwrap();
        assert!(md.contains("<figcaption>Oben</figcaption>"));
    }

    #[test]
    fn horizontal_rules_are_skipped() {
        let html = r#"<div class="guide-tip"><p>A</p><hr><p>B</p><hr></div>"#;
        assert_eq!(render(html).as_deref(), Some("> A\n>\n> B"));
    }

    #[test]
    fn empty_tip() {
        let html = r#"<div class="guide-tip"><p>  </p><hr></div>"#;
        assert_eq!(render(html), None);
    }
}
