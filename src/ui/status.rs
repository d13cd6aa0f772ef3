use ratatui::prelude::*;
use ratatui::widgets::Paragraph;

use crate::app::{Focus, Model, ToastLevel};

pub fn render_status_bar(model: &Model, frame: &mut Frame, area: Rect) {
    let pane = match model.focus {
        Focus::Thread => "THREAD",
        Focus::Composer => "ANSWER",
    };
    let activity = if model.loading {
        "  [loading]"
    } else if model.composer.is_submitting() {
        "  [posting]"
    } else {
        ""
    };
    let count = model.answers.len();
    let noun = if count == 1 { "answer" } else { "answers" };
    let status = format!(
        " {pane}  question {}  {count} {noun}{activity}  F1:help",
        model.question_id
    );

    let status_bar =
        Paragraph::new(status).style(Style::default().bg(Color::DarkGray).fg(Color::White));

    frame.render_widget(status_bar, area);
}

pub fn render_toast_bar(model: &Model, frame: &mut Frame, area: Rect) {
    let Some((message, level)) = model.active_toast() else {
        return;
    };
    let (prefix, style) = match level {
        ToastLevel::Info => (
            "[info]",
            Style::default().bg(Color::DarkGray).fg(Color::White),
        ),
        ToastLevel::Warning => (
            "[warn]",
            Style::default().bg(Color::Yellow).fg(Color::Black),
        ),
        ToastLevel::Error => ("[error]", Style::default().bg(Color::Red).fg(Color::White)),
    };
    let toast = Paragraph::new(format!("{prefix} {message}  (Esc to dismiss)")).style(style);
    frame.render_widget(toast, area);
}
