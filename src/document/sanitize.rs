//! Allow-list sanitizer.
//!
//! Any HTML string goes in; a structured [`Document`] comes out. Everything the
//! document model cannot express is either unwrapped (unknown tags keep their
//! text) or dropped together with its content (script-like containers).

use scraper::{ElementRef, Html, Node};
use tracing::debug;

use super::links::{UrlKind, validate_url};
use super::types::{Block, BlockKind, Document, Inline, Marks};

/// Elements removed together with everything inside them.
const DROPPED_TAGS: &[&str] = &[
    "script", "style", "iframe", "object", "embed", "noscript", "template", "head", "title",
    "textarea", "select", "svg", "math",
];

/// Elements that start a block of their own.
const BLOCK_TAGS: &[&str] = &["p", "h1", "h2", "h3", "h4", "h5", "h6"];

/// Parse and sanitize an HTML fragment into a document.
pub fn sanitize(html: &str) -> Document {
    let fragment = Html::parse_fragment(html);
    let mut walker = Walker::default();
    walker.walk(fragment.root_element(), &Marks::plain());
    walker.finish()
}

/// Sanitize an HTML fragment and serialize it back to canonical markup.
pub fn sanitize_html(html: &str) -> String {
    sanitize(html).to_html()
}

struct OpenBlock {
    kind: BlockKind,
    quoted: bool,
    inlines: Vec<Inline>,
    /// Opened by a block element rather than by stray inline content.
    explicit: bool,
}

impl OpenBlock {
    fn has_content(&self) -> bool {
        self.inlines.iter().any(|inline| match inline {
            Inline::Text { text, .. } => !text.trim().is_empty(),
            Inline::Image { .. } => true,
        })
    }
}

#[derive(Default)]
struct Walker {
    blocks: Vec<Block>,
    open: Option<OpenBlock>,
    list: Option<BlockKind>,
    item: Option<BlockKind>,
    quote_depth: usize,
}

impl Walker {
    fn walk(&mut self, element: ElementRef<'_>, marks: &Marks) {
        for child in element.children() {
            match child.value() {
                Node::Text(text) => self.push_text(text.text.as_ref(), marks),
                Node::Element(elem) => {
                    if let Some(child_ref) = ElementRef::wrap(child) {
                        self.element(elem.name(), child_ref, marks);
                    }
                }
                _ => {}
            }
        }
    }

    fn element(&mut self, tag: &str, element: ElementRef<'_>, marks: &Marks) {
        match tag {
            t if DROPPED_TAGS.contains(&t) => {
                debug!(tag = t, "sanitizer dropped element");
            }
            t if BLOCK_TAGS.contains(&t) => {
                self.flush();
                self.open_block();
                self.walk(element, marks);
                self.flush();
            }
            "div" | "section" | "article" => {
                self.flush();
                self.walk(element, marks);
                self.flush();
            }
            "br" => self.line_break(),
            "pre" => {
                self.flush();
                let text: String = element.text().collect();
                self.blocks.push(
                    Block::new(BlockKind::CodeBlock)
                        .quoted(self.quote_depth > 0)
                        .with_inlines(vec![Inline::text(text)]),
                );
            }
            "blockquote" => {
                self.flush();
                self.quote_depth += 1;
                self.walk(element, marks);
                self.flush();
                self.quote_depth -= 1;
            }
            "ul" | "ol" => {
                self.flush();
                let kind = if tag == "ul" {
                    BlockKind::BulletItem
                } else {
                    BlockKind::OrderedItem
                };
                let saved = self.list.replace(kind);
                self.walk(element, marks);
                self.flush();
                self.list = saved;
            }
            "li" => self.list_item(element, marks),
            "b" | "strong" => self.walk_marked(element, marks, |m| m.bold = true),
            "i" | "em" => self.walk_marked(element, marks, |m| m.italic = true),
            "code" => self.walk_marked(element, marks, |m| m.code = true),
            "a" => {
                let mut inner = marks.clone();
                if let Some(href) = element.value().attr("href") {
                    match validate_url(href, UrlKind::Link) {
                        Ok(url) => inner.link = Some(url),
                        Err(err) => debug!(%err, "sanitizer unwrapped link"),
                    }
                }
                self.walk(element, &inner);
            }
            "img" => {
                let Some(src) = element.value().attr("src") else {
                    return;
                };
                match validate_url(src, UrlKind::Image) {
                    Ok(src) => {
                        let alt = element
                            .value()
                            .attr("alt")
                            .filter(|alt| !alt.is_empty())
                            .map(str::to_string);
                        self.ensure_open().inlines.push(Inline::Image { src, alt });
                    }
                    Err(err) => debug!(%err, "sanitizer dropped image"),
                }
            }
            _ => self.walk(element, marks),
        }
    }

    fn walk_marked(&mut self, element: ElementRef<'_>, marks: &Marks, apply: impl Fn(&mut Marks)) {
        let mut inner = marks.clone();
        apply(&mut inner);
        self.walk(element, &inner);
    }

    fn list_item(&mut self, element: ElementRef<'_>, marks: &Marks) {
        self.flush();
        let kind = self.list.unwrap_or(BlockKind::BulletItem);
        let before = self.blocks.len();
        let saved = self.item.replace(kind);
        self.walk(element, marks);
        self.flush();
        if self.blocks.len() == before {
            self.blocks.push(Block::new(kind).quoted(self.quote_depth > 0));
        }
        self.item = saved;
    }

    fn line_break(&mut self) {
        let (kind, quoted) = self.open.as_ref().map_or_else(
            || (self.current_kind(), self.quote_depth > 0),
            |open| (open.kind, open.quoted),
        );
        if let Some(open) = self.open.as_mut() {
            open.explicit = true;
        }
        self.flush();
        self.open = Some(OpenBlock {
            kind,
            quoted,
            inlines: Vec::new(),
            explicit: true,
        });
    }

    fn push_text(&mut self, raw: &str, marks: &Marks) {
        let text: String = raw
            .chars()
            .map(|ch| if matches!(ch, '\n' | '\t' | '\r') { ' ' } else { ch })
            .collect();
        if text.is_empty() {
            return;
        }
        self.ensure_open()
            .inlines
            .push(Inline::styled(text, marks.clone()));
    }

    fn current_kind(&self) -> BlockKind {
        self.item.unwrap_or(BlockKind::Paragraph)
    }

    fn open_block(&mut self) {
        self.open = Some(OpenBlock {
            kind: self.current_kind(),
            quoted: self.quote_depth > 0,
            inlines: Vec::new(),
            explicit: true,
        });
    }

    fn ensure_open(&mut self) -> &mut OpenBlock {
        let kind = self.current_kind();
        let quoted = self.quote_depth > 0;
        self.open.get_or_insert_with(|| OpenBlock {
            kind,
            quoted,
            inlines: Vec::new(),
            explicit: false,
        })
    }

    fn flush(&mut self) {
        let Some(open) = self.open.take() else {
            return;
        };
        if open.explicit || open.has_content() {
            self.blocks.push(
                Block::new(open.kind)
                    .quoted(open.quoted)
                    .with_inlines(open.inlines),
            );
        }
    }

    fn finish(mut self) -> Document {
        self.flush();
        Document::from_blocks(self.blocks)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_paragraph_is_kept() {
        assert_eq!(sanitize_html("<p>Hello</p>"), "<p>Hello</p>");
    }

    #[test]
    fn test_empty_input_is_empty_paragraph() {
        assert_eq!(sanitize_html(""), "<p></p>");
        assert_eq!(sanitize_html("   \n  "), "<p></p>");
    }

    #[test]
    fn test_script_and_style_removed_with_content() {
        let html = "<p>a</p><script>alert('x')</script><style>p{}</style><p>b</p>";
        assert_eq!(sanitize_html(html), "<p>a</p><p>b</p>");
    }

    #[test]
    fn test_inline_script_inside_paragraph_removed() {
        assert_eq!(
            sanitize_html("<p>safe<script>steal()</script> text</p>"),
            "<p>safe text</p>"
        );
    }

    #[test]
    fn test_javascript_link_is_unwrapped() {
        assert_eq!(
            sanitize_html("<p><a href=\"javascript:alert(1)\">click</a></p>"),
            "<p>click</p>"
        );
    }

    #[test]
    fn test_event_handler_attributes_are_dropped() {
        assert_eq!(
            sanitize_html("<p onclick=\"x()\"><b onmouseover=\"y()\">hi</b></p>"),
            "<p><strong>hi</strong></p>"
        );
    }

    #[test]
    fn test_unknown_tags_are_unwrapped() {
        assert_eq!(
            sanitize_html("<p>a <span class=\"x\">b</span> <custom>c</custom></p>"),
            "<p>a b c</p>"
        );
    }

    #[test]
    fn test_b_and_i_normalized() {
        assert_eq!(
            sanitize_html("<p><b>bold</b> and <i>italic</i></p>"),
            "<p><strong>bold</strong> and <em>italic</em></p>"
        );
    }

    #[test]
    fn test_bare_text_becomes_paragraph() {
        assert_eq!(sanitize_html("just text"), "<p>just text</p>");
    }

    #[test]
    fn test_whitespace_between_blocks_is_ignored() {
        assert_eq!(
            sanitize_html("<p>a</p>\n  \n<p>b</p>"),
            "<p>a</p><p>b</p>"
        );
    }

    #[test]
    fn test_whitespace_only_paragraph_is_kept() {
        assert_eq!(sanitize_html("<p>   </p>"), "<p>   </p>");
    }

    #[test]
    fn test_lists() {
        assert_eq!(
            sanitize_html("<ul><li>a</li><li><p>b</p></li></ul><ol><li>c</li></ol>"),
            "<ul><li><p>a</p></li><li><p>b</p></li></ul><ol><li><p>c</p></li></ol>"
        );
    }

    #[test]
    fn test_empty_list_item_is_kept() {
        assert_eq!(
            sanitize_html("<ul><li></li></ul>"),
            "<ul><li><p></p></li></ul>"
        );
    }

    #[test]
    fn test_blockquote_marks_blocks_quoted() {
        let doc = sanitize("<blockquote><p>q</p>loose</blockquote><p>out</p>");
        let quoted: Vec<bool> = doc.blocks().iter().map(|b| b.quoted).collect();
        assert_eq!(quoted, vec![true, true, false]);
    }

    #[test]
    fn test_pre_keeps_newlines_and_drops_marks() {
        let doc = sanitize("<pre><code>fn main() {\n    <b>x</b>\n}</code></pre>");
        assert_eq!(doc.block_count(), 1);
        assert_eq!(doc.blocks()[0].kind, BlockKind::CodeBlock);
        assert_eq!(doc.blocks()[0].plain_text(), "fn main() {\n    x\n}");
    }

    #[test]
    fn test_br_splits_paragraph() {
        assert_eq!(sanitize_html("<p>a<br>b</p>"), "<p>a</p><p>b</p>");
    }

    #[test]
    fn test_headings_become_paragraphs() {
        assert_eq!(sanitize_html("<h2>Title</h2>"), "<p>Title</p>");
    }

    #[test]
    fn test_image_with_bad_scheme_is_dropped() {
        assert_eq!(
            sanitize_html("<p><img src=\"javascript:x\" onerror=\"y()\">t</p>"),
            "<p>t</p>"
        );
    }

    #[test]
    fn test_image_keeps_src_and_alt() {
        assert_eq!(
            sanitize_html("<p><img src=\"https://x.io/a.png\" alt=\"diagram\" width=\"5\"></p>"),
            "<p><img src=\"https://x.io/a.png\" alt=\"diagram\"></p>"
        );
    }

    #[test]
    fn test_entities_survive() {
        assert_eq!(
            sanitize_html("<p>a &lt;b&gt; &amp; c</p>"),
            "<p>a &lt;b&gt; &amp; c</p>"
        );
    }

    #[test]
    fn test_iframe_removed() {
        assert_eq!(
            sanitize_html("<iframe src=\"https://evil\">x</iframe><p>ok</p>"),
            "<p>ok</p>"
        );
    }
}
