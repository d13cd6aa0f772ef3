use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::document::{Block, BlockKind, Document, Selection, Unit, sanitize};
use crate::ui::style::{Theme, style_for_block, style_for_marks};

const QUOTE_BAR: &str = "│ ";
const BULLET: &str = "• ";
const CODE_INDENT: &str = "  ";

/// A document laid out as terminal lines.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RenderedDocument {
    pub lines: Vec<Line<'static>>,
    /// Row and column of the selection head, when a selection was given.
    pub cursor: Option<(usize, u16)>,
}

/// One drawn character, tied to the block offset it came from.
#[derive(Debug, Clone)]
struct Cell {
    ch: char,
    width: usize,
    style: Style,
    offset: usize,
}

impl Cell {
    const fn is_break(&self) -> bool {
        self.ch == '\n'
    }
}

/// Render stored answer or question HTML for display.
pub fn render_html(html: &str, width: u16) -> Vec<Line<'static>> {
    render_document(&sanitize(html), width, None).lines
}

/// Lay out `document` in `width` columns.
///
/// With a selection, selected text is drawn reversed and the head position is
/// reported as the cursor.
pub fn render_document(
    document: &Document,
    width: u16,
    selection: Option<&Selection>,
) -> RenderedDocument {
    let theme = Theme::default();
    let width = usize::from(width).max(1);
    let mut rendered = RenderedDocument::default();
    let mut ordinal = 0usize;
    let mut previous: Option<&Block> = None;

    for (index, block) in document.blocks().iter().enumerate() {
        ordinal = match (block.kind, previous) {
            (BlockKind::OrderedItem, Some(prev))
                if prev.kind == BlockKind::OrderedItem && prev.quoted == block.quoted =>
            {
                ordinal + 1
            }
            (BlockKind::OrderedItem, _) => 1,
            _ => 0,
        };
        if let Some(prev) = previous
            && !(is_list(prev) && is_list(block) && prev.quoted == block.quoted)
        {
            let mut spacer = Line::default();
            if prev.quoted && block.quoted {
                spacer.push_span(Span::styled(QUOTE_BAR, theme.quote_bar));
            }
            rendered.lines.push(spacer);
        }

        let (first, rest) = prefixes(block, ordinal, &theme);
        let prefix_width = first.iter().map(Span::width).sum::<usize>();
        let available = width.saturating_sub(prefix_width).max(1);

        let highlight = selection.and_then(|sel| selected_range(sel, index));
        let cells = block_cells(block, &theme, highlight);
        let rows = wrap_cells(cells, available);

        let head = selection
            .map(|sel| sel.head)
            .filter(|head| head.block == index);
        let top = rendered.lines.len();
        let mut cursor = None;
        let mut end_col = 0usize;
        for (row_index, row) in rows.iter().enumerate() {
            let mut col = 0usize;
            for cell in row {
                if cursor.is_none()
                    && let Some(head) = head
                    && cell.offset == head.offset
                {
                    cursor = Some((top + row_index, col));
                }
                col += cell.width;
            }
            end_col = col;
            let prefix = if row_index == 0 { &first } else { &rest };
            rendered.lines.push(row_line(prefix, row));
        }
        if head.is_some() && cursor.is_none() {
            cursor = Some((top + rows.len().saturating_sub(1), end_col));
        }
        if let Some((row, col)) = cursor {
            let col = u16::try_from(col + prefix_width).unwrap_or(u16::MAX);
            rendered.cursor = Some((row, col));
        }
        previous = Some(block);
    }
    rendered
}

const fn is_list(block: &Block) -> bool {
    matches!(block.kind, BlockKind::BulletItem | BlockKind::OrderedItem)
}

/// Prefix spans for the first row of a block and for its wrapped rows.
fn prefixes(block: &Block, ordinal: usize, theme: &Theme) -> (Vec<Span<'static>>, Vec<Span<'static>>) {
    let mut first = Vec::new();
    let mut rest = Vec::new();
    if block.quoted {
        first.push(Span::styled(QUOTE_BAR, theme.quote_bar));
        rest.push(Span::styled(QUOTE_BAR, theme.quote_bar));
    }
    let marker = match block.kind {
        BlockKind::BulletItem => Some(BULLET.to_string()),
        BlockKind::OrderedItem => Some(format!("{ordinal}. ")),
        BlockKind::CodeBlock => Some(CODE_INDENT.to_string()),
        BlockKind::Paragraph => None,
    };
    if let Some(marker) = marker {
        rest.push(Span::raw(" ".repeat(marker.width())));
        first.push(Span::styled(marker, theme.list_marker));
    }
    (first, rest)
}

/// Offsets of `block_index` covered by a non-empty selection.
fn selected_range(selection: &Selection, block_index: usize) -> Option<(usize, usize)> {
    if selection.is_collapsed() {
        return None;
    }
    let start = selection.start();
    let end = selection.end();
    if block_index < start.block || block_index > end.block {
        return None;
    }
    let from = if block_index == start.block { start.offset } else { 0 };
    let to = if block_index == end.block {
        end.offset
    } else {
        usize::MAX
    };
    Some((from, to))
}

fn block_cells(block: &Block, theme: &Theme, highlight: Option<(usize, usize)>) -> Vec<Cell> {
    let base = style_for_block(block.kind, block.quoted);
    let mut cells = Vec::with_capacity(block.len());
    for (offset, unit) in block.units().into_iter().enumerate() {
        let selected = highlight.is_some_and(|(from, to)| offset >= from && offset < to);
        let finish = |style: Style| {
            if selected {
                style.add_modifier(Modifier::REVERSED)
            } else {
                style
            }
        };
        match unit {
            Unit::Char(ch, marks) => {
                let style = finish(style_for_marks(base, &marks));
                let (ch, width) = match ch {
                    '\n' => ('\n', 0),
                    '\t' => (' ', 1),
                    other => (other, other.width().unwrap_or(0)),
                };
                cells.push(Cell {
                    ch,
                    width,
                    style,
                    offset,
                });
            }
            Unit::Image { src, .. } => {
                let style = finish(theme.image);
                cells.extend(format!("[image: {src}]").chars().map(|ch| Cell {
                    ch,
                    width: ch.width().unwrap_or(0),
                    style,
                    offset,
                }));
            }
        }
    }
    cells
}

/// Break cells into rows of at most `available` columns, preferring to break
/// after a space.
fn wrap_cells(cells: Vec<Cell>, available: usize) -> Vec<Vec<Cell>> {
    let mut rows = Vec::new();
    let mut current: Vec<Cell> = Vec::new();
    let mut used = 0usize;

    for cell in cells {
        if cell.is_break() {
            current.push(cell);
            rows.push(std::mem::take(&mut current));
            used = 0;
            continue;
        }
        if used + cell.width > available && !current.is_empty() {
            let carry = current
                .iter()
                .rposition(|c| c.ch == ' ')
                .map(|space| space + 1)
                .filter(|&split| split < current.len())
                .map(|split| current.split_off(split))
                .unwrap_or_default();
            rows.push(std::mem::take(&mut current));
            used = carry.iter().map(|c| c.width).sum();
            current = carry;
            if used + cell.width > available && !current.is_empty() {
                rows.push(std::mem::take(&mut current));
                used = 0;
            }
        }
        used += cell.width;
        current.push(cell);
    }
    rows.push(current);
    rows
}

fn row_line(prefix: &[Span<'static>], row: &[Cell]) -> Line<'static> {
    let mut spans: Vec<Span<'static>> = prefix.to_vec();
    let mut text = String::new();
    let mut style: Option<Style> = None;
    for cell in row.iter().filter(|cell| !cell.is_break()) {
        if style.is_some_and(|s| s != cell.style) {
            spans.push(Span::styled(std::mem::take(&mut text), style.unwrap_or_default()));
        }
        style = Some(cell.style);
        text.push(cell.ch);
    }
    if let Some(style) = style {
        spans.push(Span::styled(text, style));
    }
    Line::from(spans)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{Inline, Position};

    fn text_of(line: &Line<'_>) -> String {
        line.spans.iter().map(|span| span.content.as_ref()).collect()
    }

    fn texts(lines: &[Line<'_>]) -> Vec<String> {
        lines.iter().map(text_of).collect()
    }

    #[test]
    fn test_paragraphs_are_separated_by_blank_line() {
        let lines = render_html("<p>one</p><p>two</p>", 40);
        assert_eq!(texts(&lines), vec!["one", "", "two"]);
    }

    #[test]
    fn test_bullets_and_numbers() {
        let lines = render_html(
            "<ul><li><p>a</p></li><li><p>b</p></li></ul><ol><li><p>x</p></li><li><p>y</p></li></ol>",
            40,
        );
        assert_eq!(texts(&lines), vec!["• a", "• b", "1. x", "2. y"]);
    }

    #[test]
    fn test_quote_bar_and_code_indent() {
        let lines = render_html(
            "<blockquote><p>quoted</p></blockquote><pre><code>let x = 1;\nx</code></pre>",
            40,
        );
        assert_eq!(
            texts(&lines),
            vec!["│ quoted", "", "  let x = 1;", "  x"]
        );
    }

    #[test]
    fn test_image_placeholder() {
        let lines = render_html(r#"<p><img src="https://i.io/a.png" alt=""></p>"#, 60);
        assert_eq!(texts(&lines), vec!["[image: https://i.io/a.png]"]);
    }

    #[test]
    fn test_wraps_at_spaces_with_hanging_indent() {
        let lines = render_html("<ul><li><p>alpha beta gamma</p></li></ul>", 12);
        assert_eq!(texts(&lines), vec!["• alpha ", "  beta gamma"]);
    }

    #[test]
    fn test_long_word_breaks_hard() {
        let lines = render_html("<p>abcdefghij</p>", 4);
        assert_eq!(texts(&lines), vec!["abcd", "efgh", "ij"]);
    }

    #[test]
    fn test_bold_span_is_styled() {
        let lines = render_html("<p>a <strong>b</strong></p>", 40);
        let bold = lines[0]
            .spans
            .iter()
            .find(|span| span.content == "b")
            .map(|span| span.style);
        assert!(bold.is_some_and(|style| style.add_modifier.contains(Modifier::BOLD)));
    }

    #[test]
    fn test_cursor_position() {
        let doc = Document::from_blocks(vec![
            Block::paragraph("hello"),
            Block::new(BlockKind::BulletItem).with_inlines(vec![Inline::text("ab")]),
        ]);
        let sel = Selection::collapsed(Position::new(1, 1));
        let rendered = render_document(&doc, 40, Some(&sel));
        assert_eq!(rendered.cursor, Some((2, 3)));

        let end = Selection::collapsed(Position::new(0, 5));
        let rendered = render_document(&doc, 40, Some(&end));
        assert_eq!(rendered.cursor, Some((0, 5)));
    }

    #[test]
    fn test_cursor_in_empty_document() {
        let rendered = render_document(&Document::empty(), 40, Some(&Selection::default()));
        assert_eq!(rendered.cursor, Some((0, 0)));
        assert_eq!(rendered.lines.len(), 1);
    }

    #[test]
    fn test_cursor_after_code_newline() {
        let doc = Document::from_blocks(vec![
            Block::new(BlockKind::CodeBlock).with_inlines(vec![Inline::text("ab\ncd")]),
        ]);
        let sel = Selection::collapsed(Position::new(0, 3));
        let rendered = render_document(&doc, 40, Some(&sel));
        assert_eq!(rendered.cursor, Some((1, 2)));
    }

    #[test]
    fn test_selection_is_reversed() {
        let doc = Document::from_blocks(vec![Block::paragraph("abcd")]);
        let sel = Selection::new(Position::new(0, 1), Position::new(0, 3));
        let rendered = render_document(&doc, 40, Some(&sel));
        let reversed: String = rendered.lines[0]
            .spans
            .iter()
            .filter(|span| span.style.add_modifier.contains(Modifier::REVERSED))
            .map(|span| span.content.as_ref())
            .collect();
        assert_eq!(reversed, "bc");
    }
}
