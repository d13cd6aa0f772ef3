//! Rich-text documents.
//!
//! This module handles:
//! - The structured content model (blocks, inline runs, images)
//! - Sanitizing arbitrary HTML into that model
//! - Canonical serialization back to allow-listed HTML
//! - The "meaningful content" check used before posting

mod links;
mod markdown;
pub mod sanitize;
pub mod serialize;
mod types;

use std::borrow::Cow;
use std::sync::LazyLock;

use regex::Regex;

pub use links::{UrlKind, validate_url};
pub use markdown::from_markdown;
pub use sanitize::{sanitize, sanitize_html};
pub use types::{Block, BlockKind, Document, Inline, Mark, Marks, Position, Selection};
pub(crate) use types::Unit;

static TAG_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<[^>]*>").expect("Invalid tag pattern"));

/// Remove every markup tag, keeping text between tags.
pub fn strip_tags(html: &str) -> Cow<'_, str> {
    TAG_PATTERN.replace_all(html, "")
}

/// Decode the character entities that can appear in serialized text.
///
/// Unknown or malformed entities are kept as written.
pub fn decode_entities(text: &str) -> Cow<'_, str> {
    if !text.contains('&') {
        return Cow::Borrowed(text);
    }

    let mut result = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(amp) = rest.find('&') {
        result.push_str(&rest[..amp]);
        let after = &rest[amp + 1..];
        let decoded = after
            .find(';')
            .filter(|&semi| semi > 0 && semi <= 10)
            .and_then(|semi| decode_entity(&after[..semi]).map(|ch| (ch, semi)));
        if let Some((ch, semi)) = decoded {
            result.push(ch);
            rest = &after[semi + 1..];
        } else {
            result.push('&');
            rest = after;
        }
    }
    result.push_str(rest);
    Cow::Owned(result)
}

fn decode_entity(entity: &str) -> Option<char> {
    match entity {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" | "#39" => Some('\''),
        "nbsp" => Some('\u{a0}'),
        _ => {
            let number = entity.strip_prefix('#')?;
            let code = if let Some(hex) = number.strip_prefix(['x', 'X']) {
                u32::from_str_radix(hex, 16).ok()?
            } else {
                number.parse().ok()?
            };
            char::from_u32(code)
        }
    }
}

/// True when the HTML has visible text once tags are stripped and entities
/// decoded. Image-only and whitespace-only content is not meaningful.
pub fn is_meaningful(html: &str) -> bool {
    let stripped = strip_tags(html);
    !decode_entities(&stripped).trim().is_empty()
}
