//! Theming and color definitions.
//!
//! Uses ANSI colors that adapt to the terminal's color palette.

use ratatui::style::{Color, Modifier, Style};

use crate::document::{BlockKind, Marks};

/// Base style for the text of a block.
pub fn style_for_block(kind: BlockKind, quoted: bool) -> Style {
    let style = match kind {
        // Code blocks - dimmer color for differentiation
        BlockKind::CodeBlock => Style::default().fg(Color::Indexed(245)),
        BlockKind::Paragraph | BlockKind::BulletItem | BlockKind::OrderedItem => Style::default(),
    };
    if quoted {
        style.add_modifier(Modifier::ITALIC)
    } else {
        style
    }
}

/// Style for a run of text, merged with its block's base style.
pub fn style_for_marks(base: Style, marks: &Marks) -> Style {
    let mut style = base;

    if marks.italic {
        style = style.add_modifier(Modifier::ITALIC);
    }
    if marks.bold {
        style = style.add_modifier(Modifier::BOLD);
    }
    if marks.code {
        style = style.fg(Color::Red).add_modifier(Modifier::BOLD);
    }
    if marks.link.is_some() {
        style = style.add_modifier(Modifier::UNDERLINED);
        if !marks.code {
            style = style.fg(Color::LightBlue);
        }
    }

    style
}

/// Colors for everything outside the content itself.
#[derive(Debug, Clone)]
pub struct Theme {
    /// Question title
    pub title: Style,
    /// Author, vote and date line above a post
    pub meta: Style,
    /// Accepted-answer badge
    pub accepted: Style,
    /// Pending (not yet confirmed) answer badge
    pub pending: Style,
    /// Tag chips
    pub tag: Style,
    /// Block quote bar
    pub quote_bar: Style,
    /// List bullet/number
    pub list_marker: Style,
    /// Image placeholder
    pub image: Style,
    /// Toolbar button
    pub button: Style,
    /// Toolbar button whose format is active at the cursor
    pub button_active: Style,
    /// Disabled toolbar button
    pub button_disabled: Style,
    /// Border of the focused pane
    pub focus_border: Style,
    /// Border of the other panes
    pub border: Style,
    /// Highlighted answer in the answer list
    pub selected: Style,
    /// Status bar
    pub status: Style,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            title: Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
            meta: Style::default().fg(Color::Indexed(245)),
            accepted: Style::default()
                .fg(Color::Green)
                .add_modifier(Modifier::BOLD),
            pending: Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::ITALIC),
            tag: Style::default().fg(Color::Black).bg(Color::Indexed(250)),
            quote_bar: Style::default().fg(Color::Blue),
            list_marker: Style::default().fg(Color::Yellow),
            image: Style::default()
                .fg(Color::Magenta)
                .add_modifier(Modifier::ITALIC),
            button: Style::default().fg(Color::Indexed(252)),
            button_active: Style::default()
                .fg(Color::Black)
                .bg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
            button_disabled: Style::default()
                .fg(Color::Indexed(240))
                .add_modifier(Modifier::DIM),
            focus_border: Style::default().fg(Color::Cyan),
            border: Style::default().fg(Color::Indexed(240)),
            selected: Style::default().bg(Color::Indexed(236)),
            status: Style::default().bg(Color::DarkGray).fg(Color::White),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_block_style() {
        let style = style_for_block(BlockKind::CodeBlock, false);
        assert!(style.fg.is_some());
    }

    #[test]
    fn test_quoted_blocks_are_italic() {
        let style = style_for_block(BlockKind::Paragraph, true);
        assert!(style.add_modifier.contains(Modifier::ITALIC));
    }

    #[test]
    fn test_marks_combine() {
        let marks = Marks {
            bold: true,
            italic: true,
            ..Marks::plain()
        };
        let style = style_for_marks(Style::default(), &marks);
        assert!(style.add_modifier.contains(Modifier::BOLD));
        assert!(style.add_modifier.contains(Modifier::ITALIC));
    }

    #[test]
    fn test_link_is_underlined_and_colored() {
        let marks = Marks {
            link: Some("https://x.io".to_string()),
            ..Marks::plain()
        };
        let style = style_for_marks(Style::default(), &marks);
        assert!(style.add_modifier.contains(Modifier::UNDERLINED));
        assert_eq!(style.fg, Some(Color::LightBlue));
    }

    #[test]
    fn test_default_theme() {
        let theme = Theme::default();
        assert!(theme.title.add_modifier.contains(Modifier::BOLD));
        assert!(theme.button_active.bg.is_some());
    }
}
