//! Canonical HTML serialization.
//!
//! Output uses only the allow-listed tags. Quoted blocks are grouped into one
//! `<blockquote>`, consecutive list items of the same kind into one list, and
//! consecutive runs sharing a link target into one `<a>`.

use std::fmt::Write;

use super::types::{Block, BlockKind, Document, Inline, Marks};

const LINK_REL: &str = "noopener noreferrer nofollow";

/// Serialize a document to canonical HTML.
pub fn to_html(doc: &Document) -> String {
    let mut out = String::new();
    for group in doc.blocks().chunk_by(|a, b| a.quoted == b.quoted) {
        let quoted = group.first().is_some_and(|block| block.quoted);
        if quoted {
            out.push_str("<blockquote>");
        }
        write_blocks(group, &mut out);
        if quoted {
            out.push_str("</blockquote>");
        }
    }
    out
}

const fn is_list(kind: BlockKind) -> bool {
    matches!(kind, BlockKind::BulletItem | BlockKind::OrderedItem)
}

fn write_blocks(blocks: &[Block], out: &mut String) {
    for group in blocks.chunk_by(|a, b| is_list(a.kind) && a.kind == b.kind) {
        let Some(first) = group.first() else {
            continue;
        };
        match first.kind {
            BlockKind::Paragraph => {
                out.push_str("<p>");
                write_inlines(first.inlines(), out);
                out.push_str("</p>");
            }
            BlockKind::CodeBlock => {
                out.push_str("<pre><code>");
                out.push_str(&escape_text(&first.plain_text()));
                out.push_str("</code></pre>");
            }
            BlockKind::BulletItem | BlockKind::OrderedItem => {
                let tag = if first.kind == BlockKind::BulletItem {
                    "ul"
                } else {
                    "ol"
                };
                let _ = write!(out, "<{tag}>");
                for item in group {
                    out.push_str("<li><p>");
                    write_inlines(item.inlines(), out);
                    out.push_str("</p></li>");
                }
                let _ = write!(out, "</{tag}>");
            }
        }
    }
}

fn link_of(inline: &Inline) -> Option<&str> {
    match inline {
        Inline::Text { marks, .. } => marks.link.as_deref(),
        Inline::Image { .. } => None,
    }
}

fn write_inlines(inlines: &[Inline], out: &mut String) {
    for group in inlines.chunk_by(|a, b| link_of(a).is_some() && link_of(a) == link_of(b)) {
        let href = group.first().and_then(link_of);
        if let Some(href) = href {
            let _ = write!(
                out,
                "<a target=\"_blank\" rel=\"{LINK_REL}\" href=\"{}\">",
                escape_attr(href)
            );
        }
        for inline in group {
            match inline {
                Inline::Text { text, marks } => write_run(text, marks, out),
                Inline::Image { src, alt } => {
                    let _ = write!(out, "<img src=\"{}\"", escape_attr(src));
                    if let Some(alt) = alt {
                        let _ = write!(out, " alt=\"{}\"", escape_attr(alt));
                    }
                    out.push('>');
                }
            }
        }
        if href.is_some() {
            out.push_str("</a>");
        }
    }
}

fn write_run(text: &str, marks: &Marks, out: &mut String) {
    if marks.bold {
        out.push_str("<strong>");
    }
    if marks.italic {
        out.push_str("<em>");
    }
    if marks.code {
        out.push_str("<code>");
    }
    out.push_str(&escape_text(text));
    if marks.code {
        out.push_str("</code>");
    }
    if marks.italic {
        out.push_str("</em>");
    }
    if marks.bold {
        out.push_str("</strong>");
    }
}

/// Escape text content.
pub fn escape_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(ch),
        }
    }
    out
}

/// Escape an attribute value for use inside double quotes.
pub fn escape_attr(value: &str) -> String {
    escape_text(value).replace('"', "&quot;")
}
