//! Markdown drafts.
//!
//! A draft written in markdown is rendered to HTML with comrak and then passed
//! through the sanitizer, so it lands in the editor like any other content.

use comrak::{Options, markdown_to_html};

use super::sanitize::sanitize;
use super::types::{BlockKind, Document, Inline};

fn create_options() -> Options {
    let mut options = Options::default();

    options.extension.autolink = true;
    options.extension.shortcodes = true;

    // Raw HTML in drafts is omitted rather than passed to the sanitizer.
    options.render.unsafe_ = false;

    options
}

/// Convert a markdown draft into a sanitized document.
pub fn from_markdown(markdown: &str) -> Document {
    let html = markdown_to_html(markdown, &create_options());
    let mut doc = sanitize(&html);
    for block in doc.blocks_mut() {
        if block.kind != BlockKind::CodeBlock {
            continue;
        }
        let text = block.plain_text();
        if let Some(trimmed) = text.strip_suffix('\n') {
            *block = block.clone().with_inlines(vec![Inline::text(trimmed)]);
        }
    }
    doc
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paragraphs_and_emphasis() {
        let doc = from_markdown("Hello **bold** and *it*\n\nSecond");
        assert_eq!(
            doc.to_html(),
            "<p>Hello <strong>bold</strong> and <em>it</em></p><p>Second</p>"
        );
    }

    #[test]
    fn test_lists() {
        let doc = from_markdown("- a\n- b\n\n1. one\n");
        assert_eq!(
            doc.to_html(),
            "<ul><li><p>a</p></li><li><p>b</p></li></ul><ol><li><p>one</p></li></ol>"
        );
    }

    #[test]
    fn test_fenced_code_drops_trailing_newline() {
        let doc = from_markdown("```rust\nlet x = 1;\n```\n");
        assert_eq!(doc.to_html(), "<pre><code>let x = 1;</code></pre>");
    }

    #[test]
    fn test_quote_and_link() {
        let doc = from_markdown("> see [docs](https://docs.rs)\n");
        assert_eq!(
            doc.to_html(),
            "<blockquote><p>see <a target=\"_blank\" rel=\"noopener noreferrer nofollow\" \
             href=\"https://docs.rs\">docs</a></p></blockquote>"
        );
    }

    #[test]
    fn test_raw_html_is_not_passed_through() {
        let doc = from_markdown("<script>alert(1)</script>\n\ntext");
        assert_eq!(doc.to_html(), "<p>text</p>");
    }

    #[test]
    fn test_strikethrough_stays_literal() {
        let doc = from_markdown("~~gone~~ text");
        assert_eq!(doc.to_html(), "<p>~~gone~~ text</p>");
    }

    #[test]
    fn test_empty_draft() {
        assert!(from_markdown("").is_blank());
    }
}
