//! Core document types.

/// Inline mark flags that can be toggled from the toolbar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mark {
    Bold,
    Italic,
    Code,
}

/// The set of marks applied to a run of text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Marks {
    pub bold: bool,
    pub italic: bool,
    pub code: bool,
    /// Link target, when the run is inside a link.
    pub link: Option<String>,
}

impl Marks {
    /// Marks with nothing applied.
    pub const fn plain() -> Self {
        Self {
            bold: false,
            italic: false,
            code: false,
            link: None,
        }
    }

    pub const fn has(&self, mark: Mark) -> bool {
        match mark {
            Mark::Bold => self.bold,
            Mark::Italic => self.italic,
            Mark::Code => self.code,
        }
    }

    pub const fn set(&mut self, mark: Mark, on: bool) {
        match mark {
            Mark::Bold => self.bold = on,
            Mark::Italic => self.italic = on,
            Mark::Code => self.code = on,
        }
    }
}

/// A piece of inline content inside a block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inline {
    /// A run of text sharing one mark set.
    Text { text: String, marks: Marks },
    /// An image node. Counts as one position unit.
    Image { src: String, alt: Option<String> },
}

impl Inline {
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text {
            text: text.into(),
            marks: Marks::plain(),
        }
    }

    pub fn styled(text: impl Into<String>, marks: Marks) -> Self {
        Self::Text {
            text: text.into(),
            marks,
        }
    }

    pub fn image(src: impl Into<String>) -> Self {
        Self::Image {
            src: src.into(),
            alt: None,
        }
    }

    /// Number of position units this inline occupies.
    pub fn len(&self) -> usize {
        match self {
            Self::Text { text, .. } => text.chars().count(),
            Self::Image { .. } => 1,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// The structural kind of a block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlockKind {
    Paragraph,
    BulletItem,
    OrderedItem,
    CodeBlock,
}

/// One position unit of a block, used while editing.
///
/// Blocks are stored as normalized runs; editing operations explode a block
/// into units, transform them, and rebuild the runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Unit {
    Char(char, Marks),
    Image { src: String, alt: Option<String> },
}

/// A block of content: paragraph, list item, or code block, optionally quoted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    pub kind: BlockKind,
    /// Whether the block sits inside a blockquote.
    pub quoted: bool,
    inlines: Vec<Inline>,
}

impl Block {
    pub const fn new(kind: BlockKind) -> Self {
        Self {
            kind,
            quoted: false,
            inlines: Vec::new(),
        }
    }

    pub fn paragraph(text: impl Into<String>) -> Self {
        Self::new(BlockKind::Paragraph).with_inlines(vec![Inline::text(text)])
    }

    #[must_use]
    pub fn with_inlines(mut self, inlines: Vec<Inline>) -> Self {
        self.inlines = inlines;
        self.normalize();
        self
    }

    #[must_use]
    pub const fn quoted(mut self, quoted: bool) -> Self {
        self.quoted = quoted;
        self
    }

    pub fn inlines(&self) -> &[Inline] {
        &self.inlines
    }

    /// Length of the block in position units.
    pub fn len(&self) -> usize {
        self.inlines.iter().map(Inline::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.inlines.is_empty()
    }

    /// Text content with images omitted.
    pub fn plain_text(&self) -> String {
        self.inlines
            .iter()
            .filter_map(|inline| match inline {
                Inline::Text { text, .. } => Some(text.as_str()),
                Inline::Image { .. } => None,
            })
            .collect()
    }

    pub(crate) fn units(&self) -> Vec<Unit> {
        let mut units = Vec::with_capacity(self.len());
        for inline in &self.inlines {
            match inline {
                Inline::Text { text, marks } => {
                    units.extend(text.chars().map(|ch| Unit::Char(ch, marks.clone())));
                }
                Inline::Image { src, alt } => units.push(Unit::Image {
                    src: src.clone(),
                    alt: alt.clone(),
                }),
            }
        }
        units
    }

    pub(crate) fn set_units(&mut self, units: Vec<Unit>) {
        let mut inlines: Vec<Inline> = Vec::new();
        for unit in units {
            match unit {
                Unit::Char(ch, marks) => {
                    if let Some(Inline::Text {
                        text,
                        marks: last_marks,
                    }) = inlines.last_mut()
                        && *last_marks == marks
                    {
                        text.push(ch);
                        continue;
                    }
                    inlines.push(Inline::Text {
                        text: ch.to_string(),
                        marks,
                    });
                }
                Unit::Image { src, alt } => inlines.push(Inline::Image { src, alt }),
            }
        }
        self.inlines = inlines;
        if self.kind == BlockKind::CodeBlock {
            self.normalize();
        }
    }

    /// Merge adjacent runs with equal marks and drop empty runs.
    pub fn normalize(&mut self) {
        if self.kind == BlockKind::CodeBlock {
            let text = self.plain_text();
            self.inlines = if text.is_empty() {
                Vec::new()
            } else {
                vec![Inline::text(text)]
            };
            return;
        }
        let units = self.units();
        self.set_units(units);
    }
}

/// A position in the document: block index plus unit offset inside the block.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Position {
    pub block: usize,
    pub offset: usize,
}

impl Position {
    pub const fn new(block: usize, offset: usize) -> Self {
        Self { block, offset }
    }
}

/// An anchor/head pair. The head is where the cursor is drawn.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Selection {
    pub anchor: Position,
    pub head: Position,
}

impl Selection {
    pub const fn new(anchor: Position, head: Position) -> Self {
        Self { anchor, head }
    }

    pub const fn collapsed(at: Position) -> Self {
        Self {
            anchor: at,
            head: at,
        }
    }

    pub fn is_collapsed(&self) -> bool {
        self.anchor == self.head
    }

    pub fn start(&self) -> Position {
        self.anchor.min(self.head)
    }

    pub fn end(&self) -> Position {
        self.anchor.max(self.head)
    }
}

/// A structured rich-text document.
///
/// Always holds at least one block. Serializes to the allow-listed HTML
/// subset; see [`crate::document::serialize`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    blocks: Vec<Block>,
}

impl Document {
    /// Create an empty document (a single empty paragraph).
    pub fn empty() -> Self {
        Self {
            blocks: vec![Block::new(BlockKind::Paragraph)],
        }
    }

    /// Create a document from blocks, normalizing each one.
    pub fn from_blocks(blocks: Vec<Block>) -> Self {
        if blocks.is_empty() {
            return Self::empty();
        }
        let mut doc = Self { blocks };
        for block in &mut doc.blocks {
            block.normalize();
        }
        doc
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub(crate) fn blocks_mut(&mut self) -> &mut Vec<Block> {
        &mut self.blocks
    }

    pub fn block(&self, index: usize) -> Option<&Block> {
        self.blocks.get(index)
    }

    pub fn block_count(&self) -> usize {
        self.blocks.len()
    }

    /// True when the document is a single empty paragraph.
    pub fn is_blank(&self) -> bool {
        self.blocks.len() == 1
            && self.blocks[0].is_empty()
            && self.blocks[0].kind == BlockKind::Paragraph
            && !self.blocks[0].quoted
    }

    /// Text content of all blocks joined by newlines, images omitted.
    pub fn plain_text(&self) -> String {
        self.blocks
            .iter()
            .map(Block::plain_text)
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// The position just past the last unit.
    pub fn end_position(&self) -> Position {
        let last = self.blocks.len().saturating_sub(1);
        Position::new(last, self.blocks.get(last).map_or(0, Block::len))
    }

    /// Clamp a position into the document's valid range.
    pub fn clamp(&self, pos: Position) -> Position {
        let block = pos.block.min(self.blocks.len().saturating_sub(1));
        let len = self.blocks.get(block).map_or(0, Block::len);
        Position::new(block, pos.offset.min(len))
    }

    /// Serialize to the canonical allow-listed HTML form.
    pub fn to_html(&self) -> String {
        super::serialize::to_html(self)
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bold() -> Marks {
        Marks {
            bold: true,
            ..Marks::plain()
        }
    }

    #[test]
    fn test_empty_document_has_one_paragraph() {
        let doc = Document::empty();
        assert_eq!(doc.block_count(), 1);
        assert!(doc.is_blank());
        assert_eq!(doc.end_position(), Position::new(0, 0));
    }

    #[test]
    fn test_from_blocks_with_no_blocks_is_empty() {
        assert_eq!(Document::from_blocks(Vec::new()), Document::empty());
    }

    #[test]
    fn test_normalize_merges_equal_runs() {
        let block = Block::new(BlockKind::Paragraph).with_inlines(vec![
            Inline::text("Hel"),
            Inline::text("lo"),
            Inline::styled("", bold()),
            Inline::styled(" world", bold()),
        ]);
        assert_eq!(
            block.inlines(),
            &[Inline::text("Hello"), Inline::styled(" world", bold())]
        );
    }

    #[test]
    fn test_image_counts_as_one_unit() {
        let block = Block::new(BlockKind::Paragraph).with_inlines(vec![
            Inline::text("ab"),
            Inline::image("https://example.com/a.png"),
            Inline::text("c"),
        ]);
        assert_eq!(block.len(), 4);
        assert_eq!(block.plain_text(), "abc");
    }

    #[test]
    fn test_code_block_normalize_strips_marks_and_images() {
        let mut block = Block::new(BlockKind::Paragraph).with_inlines(vec![
            Inline::styled("let x", bold()),
            Inline::image("https://example.com/a.png"),
            Inline::text(" = 1;"),
        ]);
        block.kind = BlockKind::CodeBlock;
        block.normalize();
        assert_eq!(block.inlines(), &[Inline::text("let x = 1;")]);
    }

    #[test]
    fn test_multibyte_length_counts_chars() {
        let block = Block::paragraph("café");
        assert_eq!(block.len(), 4);
    }

    #[test]
    fn test_clamp_position() {
        let doc = Document::from_blocks(vec![Block::paragraph("abc"), Block::paragraph("de")]);
        assert_eq!(doc.clamp(Position::new(5, 9)), Position::new(1, 2));
        assert_eq!(doc.clamp(Position::new(0, 9)), Position::new(0, 3));
    }

    #[test]
    fn test_selection_orders_endpoints() {
        let sel = Selection::new(Position::new(1, 2), Position::new(0, 4));
        assert_eq!(sel.start(), Position::new(0, 4));
        assert_eq!(sel.end(), Position::new(1, 2));
        assert!(!sel.is_collapsed());
    }

    #[test]
    fn test_plain_text_joins_blocks() {
        let doc = Document::from_blocks(vec![
            Block::paragraph("one"),
            Block::new(BlockKind::Paragraph).with_inlines(vec![Inline::image("https://x.io/i.png")]),
            Block::paragraph("two"),
        ]);
        assert_eq!(doc.plain_text(), "one\n\ntwo");
    }
}
