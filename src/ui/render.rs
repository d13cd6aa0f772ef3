use chrono::Utc;
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Paragraph};

use crate::app::{Focus, Model};
use crate::composer::ModerationStatus;
use crate::display::{AnswerView, QuestionView, render_document};
use crate::editor::{Format, InsertKind};

use super::style::Theme;
use super::{COMPOSER_PLACEHOLDER, overlays, status};

const ANSWER_INDENT: &str = "  ";

/// Rows given to the composer pane for a terminal of `height` rows.
pub fn composer_height(height: u16) -> u16 {
    (height.saturating_mul(2) / 5).clamp(7, 16).min(height.saturating_sub(4))
}

/// Render the complete UI.
pub fn render(model: &mut Model, frame: &mut Frame) {
    let area = frame.area();
    let toast_active = model.active_toast().is_some();
    let chunks = Layout::vertical([
        Constraint::Min(3),
        Constraint::Length(composer_height(area.height)),
        Constraint::Length(u16::from(toast_active)),
        Constraint::Length(1),
    ])
    .split(area);

    let theme = Theme::default();
    render_thread(model, frame, chunks[0], &theme);
    render_composer(model, frame, chunks[1], &theme);
    if toast_active {
        status::render_toast_bar(model, frame, chunks[2]);
    }
    status::render_status_bar(model, frame, chunks[3]);

    if model.help_visible {
        overlays::render_help_overlay(model, frame, area);
    }
}

fn pane_block<'a>(title: impl Into<Line<'a>>, focused: bool, theme: &Theme) -> Block<'a> {
    Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(if focused {
            theme.focus_border
        } else {
            theme.border
        })
}

/// Lines of the thread pane and the line where each answer starts.
pub fn thread_lines(model: &Model, width: u16) -> (Vec<Line<'static>>, Vec<usize>) {
    let theme = Theme::default();
    let mut lines: Vec<Line<'static>> = Vec::new();
    let mut starts = Vec::with_capacity(model.answers.len());

    let Some(question) = model.question.as_ref() else {
        let text = if model.loading {
            "Loading question..."
        } else {
            "Question not available. Press r to retry."
        };
        lines.push(Line::styled(text, theme.meta));
        return (lines, starts);
    };

    lines.push(Line::styled(question.title.clone(), theme.title));
    if !question.tags.is_empty() {
        let mut spans = Vec::new();
        for tag in &question.tags {
            spans.push(Span::styled(format!(" {tag} "), theme.tag));
            spans.push(Span::raw(" "));
        }
        lines.push(Line::from(spans));
    }
    let arrow_style = if model.question_upvoted {
        theme.button_active
    } else {
        theme.meta
    };
    lines.push(Line::from(vec![
        Span::styled(format!("▲ {}", model.question_upvotes()), arrow_style),
        Span::styled(
            format!(
                "  ·  asked by {}  ·  {} answers",
                question.author, question.answer_count
            ),
            theme.meta,
        ),
    ]));
    lines.push(Line::default());
    lines.extend(QuestionView::new(question).lines(width));
    lines.push(Line::default());

    let count = model.answers.len();
    let noun = if count == 1 { "Answer" } else { "Answers" };
    lines.push(Line::styled(format!("{count} {noun}"), theme.title));

    let now = Utc::now();
    let body_width = width.saturating_sub(2).max(1);
    for (index, answer) in model.answers.iter().enumerate() {
        lines.push(Line::default());
        starts.push(lines.len());
        let selected = model.selected_answer == Some(index);
        let view = AnswerView::new(answer);

        let mut header = vec![Span::raw(if selected { "▶ " } else { ANSWER_INDENT })];
        if model.voted_answers.contains(&answer.id) {
            header.push(Span::styled("▲ ", theme.button_active));
        }
        header.push(Span::styled(view.byline(now), theme.meta));
        if answer.accepted {
            header.push(Span::styled("  ✓ accepted", theme.accepted));
        }
        if answer.id.is_local() {
            header.push(Span::styled("  posting...", theme.pending));
        } else if answer.status != ModerationStatus::Approved {
            header.push(Span::styled(format!("  [{}]", answer.status.label()), theme.pending));
        }
        let header = Line::from(header);
        lines.push(if selected {
            header.patch_style(theme.selected)
        } else {
            header
        });

        for line in view.lines(body_width) {
            let mut spans = vec![Span::raw(ANSWER_INDENT)];
            spans.extend(line.spans);
            lines.push(Line::from(spans));
        }
    }
    (lines, starts)
}

fn render_thread(model: &mut Model, frame: &mut Frame, area: Rect, theme: &Theme) {
    let block = pane_block(" Question ", model.focus == Focus::Thread, theme);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let (lines, starts) = thread_lines(model, inner.width);
    let visible = usize::from(inner.height);
    model.thread_page_height = visible.max(1);
    if model.reveal_selected {
        if let Some(start) = model.selected_answer.and_then(|index| starts.get(index)) {
            // Keep the blank separator above the answer in view.
            model.thread_scroll = start.saturating_sub(1);
        }
        model.reveal_selected = false;
    }
    let max_scroll = lines.len().saturating_sub(visible);
    model.thread_scroll = model.thread_scroll.min(max_scroll);

    let end = (model.thread_scroll + visible).min(lines.len());
    let shown = lines[model.thread_scroll..end].to_vec();
    frame.render_widget(Paragraph::new(shown), inner);
}

fn toolbar_line(model: &Model, theme: &Theme) -> Line<'static> {
    let editor = model.composer.editor();
    let buttons = [
        ("B", Format::Bold),
        ("I", Format::Italic),
        ("<>", Format::Code),
        ("•", Format::BulletList),
        ("1.", Format::OrderedList),
        (">", Format::Blockquote),
        ("{}", Format::CodeBlock),
        ("Link", Format::Link),
    ];
    let mut spans = Vec::new();
    for (label, format) in buttons {
        let active = editor.is_active(format)
            || (format == Format::Link && model.dialogs.is_visible(InsertKind::Link));
        let style = if active { theme.button_active } else { theme.button };
        spans.push(Span::styled(format!(" {label} "), style));
    }
    let image_style = if model.dialogs.is_visible(InsertKind::Image) {
        theme.button_active
    } else {
        theme.button
    };
    spans.push(Span::styled(" Img ", image_style));
    spans.push(Span::raw(" │"));
    for (label, enabled) in [("Undo", editor.can_undo()), ("Redo", editor.can_redo())] {
        let style = if enabled {
            theme.button
        } else {
            theme.button_disabled
        };
        spans.push(Span::styled(format!(" {label} "), style));
    }
    spans.push(Span::raw(" │ "));
    let (post, style) = if model.composer.is_submitting() {
        ("Posting...", theme.pending)
    } else if model.composer.can_post() {
        ("[ Post ]", theme.button_active)
    } else {
        ("[ Post ]", theme.button_disabled)
    };
    spans.push(Span::styled(post, style));
    Line::from(spans)
}

fn render_composer(model: &mut Model, frame: &mut Frame, area: Rect, theme: &Theme) {
    let focused = model.focus == Focus::Composer;
    let block = pane_block(" Your Answer ", focused, theme);
    let inner = block.inner(area);
    frame.render_widget(block, area);
    if inner.height < 3 || inner.width == 0 {
        return;
    }

    let toolbar_area = Rect { height: 1, ..inner };
    let prompt_area = Rect {
        y: inner.y + inner.height - 1,
        height: 1,
        ..inner
    };
    let content_area = Rect {
        y: inner.y + 1,
        height: inner.height - 2,
        ..inner
    };
    frame.render_widget(Paragraph::new(toolbar_line(model, theme)), toolbar_area);

    let editor = model.composer.editor();
    let selection = editor.selection();
    let rendered = render_document(editor.document(), content_area.width, Some(&selection));
    let visible = usize::from(content_area.height);
    let (cursor_row, cursor_col) = rendered.cursor.unwrap_or((0, 0));
    if cursor_row < model.editor_scroll {
        model.editor_scroll = cursor_row;
    } else if cursor_row >= model.editor_scroll + visible {
        model.editor_scroll = cursor_row + 1 - visible;
    }
    model.editor_scroll = model
        .editor_scroll
        .min(rendered.lines.len().saturating_sub(1));

    let blank = editor.document().block_count() == 1 && editor.document().is_blank();
    let content = if blank && editor.document().blocks()[0].is_empty() {
        vec![Line::styled(COMPOSER_PLACEHOLDER, theme.meta)]
    } else {
        let end = (model.editor_scroll + visible).min(rendered.lines.len());
        rendered.lines[model.editor_scroll..end].to_vec()
    };
    frame.render_widget(Paragraph::new(content), content_area);

    if let Some(pending) = model.dialogs.pending() {
        let mut spans = vec![
            Span::styled(format!("{}: ", pending.kind.label()), theme.title),
            Span::raw(pending.url.clone()),
        ];
        if let Some(error) = &pending.error {
            spans.push(Span::styled(
                format!("  {error}"),
                Style::default().fg(Color::Red),
            ));
        } else {
            spans.push(Span::styled("  Enter apply · Esc cancel", theme.meta));
        }
        let prompt_width = Line::from(spans[..2].to_vec()).width();
        frame.render_widget(Paragraph::new(Line::from(spans)), prompt_area);
        if focused && !model.help_visible {
            let col = u16::try_from(prompt_width).unwrap_or(u16::MAX);
            frame.set_cursor_position((
                prompt_area.x + col.min(prompt_area.width.saturating_sub(1)),
                prompt_area.y,
            ));
        }
        return;
    }

    let hint = if focused {
        "Ctrl-s post · Ctrl-k link · Ctrl-g image · Tab/Esc thread · F1 help"
    } else {
        "Tab or a to write an answer"
    };
    frame.render_widget(Paragraph::new(Line::styled(hint, theme.meta)), prompt_area);

    if focused && !model.help_visible {
        let row = cursor_row.saturating_sub(model.editor_scroll);
        let row = u16::try_from(row).unwrap_or(u16::MAX);
        frame.set_cursor_position((
            content_area.x + cursor_col.min(content_area.width.saturating_sub(1)),
            content_area.y + row.min(content_area.height.saturating_sub(1)),
        ));
    }
}
