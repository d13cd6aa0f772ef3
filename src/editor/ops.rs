//! Document transformations behind the editor commands.
//!
//! Every function takes positions that may be stale and clamps them first.
//! Functions that report `bool` return whether the document changed.

use crate::document::{Block, BlockKind, Document, Inline, Mark, Marks, Position, Selection, Unit};

/// Cursor movement directions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Left,
    Right,
    Up,
    Down,
    Home,
    End,
}

/// `(block, from, to)` unit ranges covered by a selection.
fn block_ranges(doc: &Document, sel: Selection) -> Vec<(usize, usize, usize)> {
    let start = doc.clamp(sel.start());
    let end = doc.clamp(sel.end());
    (start.block..=end.block)
        .map(|index| {
            let len = doc.block(index).map_or(0, Block::len);
            let from = if index == start.block { start.offset } else { 0 };
            let to = if index == end.block { end.offset } else { len };
            (index, from, to)
        })
        .collect()
}

/// True when the selection covers at least one text character outside code
/// blocks and every such character satisfies `pred`.
pub fn all_chars(doc: &Document, sel: Selection, pred: impl Fn(&Marks) -> bool) -> bool {
    let mut any = false;
    for (index, from, to) in block_ranges(doc, sel) {
        let Some(block) = doc.block(index) else {
            continue;
        };
        if block.kind == BlockKind::CodeBlock {
            continue;
        }
        for unit in block.units().get(from..to).unwrap_or_default() {
            if let Unit::Char(_, marks) = unit {
                if !pred(marks) {
                    return false;
                }
                any = true;
            }
        }
    }
    any
}

/// True when every block touched by the selection satisfies `pred`.
pub fn all_blocks(doc: &Document, sel: Selection, pred: impl Fn(&Block) -> bool) -> bool {
    block_ranges(doc, sel)
        .iter()
        .all(|&(index, _, _)| doc.block(index).is_some_and(&pred))
}

fn map_chars(doc: &mut Document, sel: Selection, apply: impl Fn(&mut Marks)) -> bool {
    let ranges = block_ranges(doc, sel);
    let mut changed = false;
    for (index, from, to) in ranges {
        let Some(block) = doc.blocks_mut().get_mut(index) else {
            continue;
        };
        if block.kind == BlockKind::CodeBlock || from >= to {
            continue;
        }
        let mut units = block.units();
        for unit in units.get_mut(from..to).into_iter().flatten() {
            if let Unit::Char(_, marks) = unit {
                let before = marks.clone();
                apply(marks);
                changed |= *marks != before;
            }
        }
        block.set_units(units);
    }
    changed
}

/// Add the mark to every character in the selection, or remove it if every
/// character already has it.
pub fn toggle_mark(doc: &mut Document, sel: Selection, mark: Mark) -> bool {
    let all = all_chars(doc, sel, |marks| marks.has(mark));
    map_chars(doc, sel, |marks| marks.set(mark, !all))
}

pub fn set_link(doc: &mut Document, sel: Selection, href: &str) -> bool {
    map_chars(doc, sel, |marks| marks.link = Some(href.to_string()))
}

pub fn unset_link(doc: &mut Document, sel: Selection) -> bool {
    map_chars(doc, sel, |marks| marks.link = None)
}

/// The full extent of the link run touching `pos`, if any.
pub fn link_range_at(doc: &Document, pos: Position) -> Option<Selection> {
    let pos = doc.clamp(pos);
    let units = doc.block(pos.block)?.units();
    let link_of = |index: usize| match units.get(index) {
        Some(Unit::Char(_, marks)) => marks.link.clone(),
        _ => None,
    };
    let (seed, href) = pos
        .offset
        .checked_sub(1)
        .and_then(|before| link_of(before).map(|href| (before, href)))
        .or_else(|| link_of(pos.offset).map(|href| (pos.offset, href)))?;

    let mut from = seed;
    while from > 0 && link_of(from - 1).as_ref() == Some(&href) {
        from -= 1;
    }
    let mut to = seed + 1;
    while link_of(to).as_ref() == Some(&href) {
        to += 1;
    }
    Some(Selection::new(
        Position::new(pos.block, from),
        Position::new(pos.block, to),
    ))
}

/// Marks that text typed at `pos` would receive.
///
/// Follows the character before the cursor (or after it at the start of a
/// block). Links do not extend past either end of their run.
pub fn marks_at(doc: &Document, pos: Position) -> Marks {
    let pos = doc.clamp(pos);
    let Some(block) = doc.block(pos.block) else {
        return Marks::plain();
    };
    if block.kind == BlockKind::CodeBlock {
        return Marks::plain();
    }
    let units = block.units();
    let before = pos.offset.checked_sub(1).and_then(|i| units.get(i));
    let after = units.get(pos.offset);
    let mut marks = match (before, after) {
        (Some(Unit::Char(_, marks)), _) => marks.clone(),
        (None, Some(Unit::Char(_, marks))) => marks.clone(),
        _ => Marks::plain(),
    };
    let inside_link = matches!(
        (before, after),
        (Some(Unit::Char(_, b)), Some(Unit::Char(_, a))) if b.link.is_some() && b.link == a.link
    );
    if !inside_link {
        marks.link = None;
    }
    marks
}

/// Change a block's kind, fixing up content the new kind cannot hold.
fn convert_block(block: &mut Block, kind: BlockKind) {
    if block.kind == kind {
        return;
    }
    if block.kind == BlockKind::CodeBlock {
        let text = block.plain_text().replace('\n', " ");
        *block = Block::new(kind)
            .quoted(block.quoted)
            .with_inlines(vec![Inline::text(text)]);
    } else {
        block.kind = kind;
        block.normalize();
    }
}

/// Give every touched block `kind`, or turn them all back into paragraphs if
/// they already have it.
pub fn toggle_block(doc: &mut Document, sel: Selection, kind: BlockKind) -> bool {
    let all = all_blocks(doc, sel, |block| block.kind == kind);
    let target = if all { BlockKind::Paragraph } else { kind };
    let mut changed = false;
    for (index, _, _) in block_ranges(doc, sel) {
        if let Some(block) = doc.blocks_mut().get_mut(index) {
            let before = block.clone();
            convert_block(block, target);
            changed |= *block != before;
        }
    }
    changed
}

pub fn toggle_quote(doc: &mut Document, sel: Selection) -> bool {
    let all = all_blocks(doc, sel, |block| block.quoted);
    let mut changed = false;
    for (index, _, _) in block_ranges(doc, sel) {
        if let Some(block) = doc.blocks_mut().get_mut(index) {
            changed |= block.quoted == all;
            block.quoted = !all;
        }
    }
    changed
}

/// Remove the content between two positions and return where it was.
pub fn delete_range(doc: &mut Document, start: Position, end: Position) -> Position {
    let start = doc.clamp(start);
    let end = doc.clamp(end);
    if start >= end {
        return start;
    }
    let tail = doc
        .block(end.block)
        .map(|block| block.units().split_off(end.offset))
        .unwrap_or_default();
    let blocks = doc.blocks_mut();
    let Some(first) = blocks.get_mut(start.block) else {
        return start;
    };
    let mut units = first.units();
    units.truncate(start.offset);
    if end.block > start.block {
        units.extend(fit_units(first.kind, tail));
    } else {
        units.extend(tail);
    }
    first.set_units(units);
    if end.block > start.block {
        blocks.drain(start.block + 1..=end.block);
    }
    start
}

/// Adapt units carried over from another block to a block of `kind`.
fn fit_units(kind: BlockKind, units: Vec<Unit>) -> Vec<Unit> {
    if kind == BlockKind::CodeBlock {
        units
            .into_iter()
            .filter_map(|unit| match unit {
                Unit::Char(ch, _) => Some(Unit::Char(ch, Marks::plain())),
                Unit::Image { .. } => None,
            })
            .collect()
    } else {
        units
            .into_iter()
            .map(|unit| match unit {
                Unit::Char(ch, marks) if matches!(ch, '\n' | '\r' | '\t') => {
                    Unit::Char(' ', marks)
                }
                unit => unit,
            })
            .collect()
    }
}

fn insert_units(doc: &mut Document, pos: Position, mut new: Vec<Unit>) -> Position {
    let pos = doc.clamp(pos);
    let Some(block) = doc.blocks_mut().get_mut(pos.block) else {
        return pos;
    };
    if block.kind == BlockKind::CodeBlock {
        new.retain(|unit| matches!(unit, Unit::Char(..)));
    }
    let count = new.len();
    let mut units = block.units();
    let tail = units.split_off(pos.offset);
    units.extend(new);
    units.extend(tail);
    block.set_units(units);
    Position::new(pos.block, pos.offset + count)
}

/// Replace the selection with typed text carrying `marks`.
pub fn insert_text(doc: &mut Document, sel: Selection, text: &str, marks: &Marks) -> Position {
    let pos = delete_range(doc, sel.start(), sel.end());
    let in_code = doc
        .block(pos.block)
        .is_some_and(|block| block.kind == BlockKind::CodeBlock);
    let units = if in_code {
        text.chars()
            .filter(|&ch| ch != '\r')
            .map(|ch| Unit::Char(ch, Marks::plain()))
            .collect()
    } else {
        text.chars()
            .map(|ch| if matches!(ch, '\n' | '\r' | '\t') { ' ' } else { ch })
            .map(|ch| Unit::Char(ch, marks.clone()))
            .collect()
    };
    insert_units(doc, pos, units)
}

/// Insert an image at `pos`. Inside a code block the image goes into a new
/// paragraph after it.
pub fn insert_image(doc: &mut Document, pos: Position, src: &str) -> Position {
    let pos = doc.clamp(pos);
    let code_block_quoted = doc
        .block(pos.block)
        .filter(|block| block.kind == BlockKind::CodeBlock)
        .map(|block| block.quoted);
    if let Some(quoted) = code_block_quoted {
        let paragraph = Block::new(BlockKind::Paragraph)
            .quoted(quoted)
            .with_inlines(vec![Inline::image(src)]);
        doc.blocks_mut().insert(pos.block + 1, paragraph);
        return Position::new(pos.block + 1, 1);
    }
    let image = Unit::Image {
        src: src.to_string(),
        alt: None,
    };
    insert_units(doc, pos, vec![image])
}

/// Turn a list item or code block into a paragraph, or unquote a quoted
/// paragraph. Returns false for a plain paragraph.
fn lift(block: &mut Block) -> bool {
    if block.kind != BlockKind::Paragraph {
        convert_block(block, BlockKind::Paragraph);
        true
    } else if block.quoted {
        block.quoted = false;
        true
    } else {
        false
    }
}

/// Backspace. Returns the new cursor, or `None` if nothing changed.
pub fn delete_back(doc: &mut Document, sel: Selection) -> Option<Position> {
    if !sel.is_collapsed() {
        return Some(delete_range(doc, sel.start(), sel.end()));
    }
    let pos = doc.clamp(sel.head);
    if pos.offset > 0 {
        let prev = Position::new(pos.block, pos.offset - 1);
        return Some(delete_range(doc, prev, pos));
    }
    if doc.blocks_mut().get_mut(pos.block).is_some_and(lift) {
        return Some(pos);
    }
    let prev_block = pos.block.checked_sub(1)?;
    let prev_len = doc.block(prev_block).map_or(0, Block::len);
    Some(delete_range(doc, Position::new(prev_block, prev_len), pos))
}

/// Enter. Splits the block at the cursor; inside a code block inserts a
/// newline; on an empty list item or quote line lifts it instead.
pub fn split_block(doc: &mut Document, sel: Selection) -> Position {
    let pos = delete_range(doc, sel.start(), sel.end());
    let Some(block) = doc.blocks_mut().get_mut(pos.block) else {
        return pos;
    };
    if block.kind == BlockKind::CodeBlock {
        return insert_units(doc, pos, vec![Unit::Char('\n', Marks::plain())]);
    }
    if block.is_empty() && lift(block) {
        return pos;
    }
    let mut units = block.units();
    let tail = units.split_off(pos.offset);
    block.set_units(units);
    let mut next = Block::new(block.kind).quoted(block.quoted);
    next.set_units(tail);
    doc.blocks_mut().insert(pos.block + 1, next);
    Position::new(pos.block + 1, 0)
}

/// Where the cursor lands after moving from `pos`.
pub fn move_position(doc: &Document, pos: Position, direction: Direction) -> Position {
    let pos = doc.clamp(pos);
    let len_of = |index: usize| doc.block(index).map_or(0, Block::len);
    match direction {
        Direction::Left => {
            if pos.offset > 0 {
                Position::new(pos.block, pos.offset - 1)
            } else if pos.block > 0 {
                Position::new(pos.block - 1, len_of(pos.block - 1))
            } else {
                pos
            }
        }
        Direction::Right => {
            if pos.offset < len_of(pos.block) {
                Position::new(pos.block, pos.offset + 1)
            } else if pos.block + 1 < doc.block_count() {
                Position::new(pos.block + 1, 0)
            } else {
                pos
            }
        }
        Direction::Up => match pos.block.checked_sub(1) {
            Some(prev) => Position::new(prev, pos.offset.min(len_of(prev))),
            None => Position::new(0, 0),
        },
        Direction::Down => {
            if pos.block + 1 < doc.block_count() {
                Position::new(pos.block + 1, pos.offset.min(len_of(pos.block + 1)))
            } else {
                doc.end_position()
            }
        }
        Direction::Home => Position::new(pos.block, 0),
        Direction::End => Position::new(pos.block, len_of(pos.block)),
    }
}

pub fn select_all(doc: &Document) -> Selection {
    Selection::new(Position::default(), doc.end_position())
}
