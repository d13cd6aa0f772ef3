use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Clear, Padding, Paragraph};

use crate::app::Model;

pub fn render_help_overlay(model: &Model, frame: &mut Frame, area: Rect) {
    let popup_width = area.width.saturating_sub(12).max(48);
    let popup_height = area.height.saturating_sub(4).max(12);
    let popup = centered_popup_rect(popup_width, popup_height, area);

    let global_cfg = model
        .config_global_path
        .as_ref()
        .map_or_else(|| "<unknown>".to_string(), |p| p.display().to_string());
    let local_cfg = model
        .config_local_path
        .as_ref()
        .map_or_else(|| "<none>".to_string(), |p| p.display().to_string());

    let section_style = Style::default()
        .fg(Color::Yellow)
        .add_modifier(Modifier::BOLD);

    let mut lines: Vec<Line> = Vec::new();

    lines.push(Line::styled("Thread", section_style));
    lines.push(Line::raw("  j/k or Up/Down      Scroll"));
    lines.push(Line::raw("  Space / b           Page down / up"));
    lines.push(Line::raw("  g / G               Top / bottom"));
    lines.push(Line::raw("  n / p               Next / previous answer"));
    lines.push(Line::raw("  u                   Upvote answer (again to undo)"));
    lines.push(Line::raw("  v                   Upvote question"));
    lines.push(Line::raw("  r                   Refresh answers"));
    lines.push(Line::raw("  Tab / a             Write an answer"));
    lines.push(Line::raw(""));

    lines.push(Line::styled("Answer", section_style));
    lines.push(Line::raw("  Ctrl-b / Alt-i      Bold / italic"));
    lines.push(Line::raw("  Ctrl-e              Inline code"));
    lines.push(Line::raw("  Alt-1 / Alt-2       Bullet / numbered list"));
    lines.push(Line::raw("  Alt-3 / Alt-4       Quote / code block"));
    lines.push(Line::raw("  Ctrl-k / Ctrl-g     Link / image"));
    lines.push(Line::raw("  Ctrl-z / Ctrl-y     Undo / redo"));
    lines.push(Line::raw("  Ctrl-a              Select all (Shift+arrows extend)"));
    lines.push(Line::raw("  Ctrl-s              Post answer"));
    lines.push(Line::raw("  Tab / Esc           Back to thread"));
    lines.push(Line::raw(""));

    lines.push(Line::styled("Other", section_style));
    lines.push(Line::raw("  Esc                 Dismiss message"));
    lines.push(Line::raw("  q / Ctrl-c / Ctrl-q Quit"));
    lines.push(Line::raw("  ? / F1              Toggle help"));
    lines.push(Line::raw(""));

    lines.push(Line::styled("Config", section_style));
    lines.push(Line::raw(format!("  Global: {global_cfg}")));
    lines.push(Line::raw(format!("  Local override: {local_cfg}")));

    let block = Block::default()
        .title("Help")
        .borders(Borders::ALL)
        .padding(Padding::horizontal(1))
        .style(Style::default().bg(Color::Black).fg(Color::White));

    frame.render_widget(Clear, popup);
    frame.render_widget(Paragraph::new(lines).block(block), popup);
}

fn centered_popup_rect(width: u16, height: u16, area: Rect) -> Rect {
    let w = width.min(area.width);
    let h = height.min(area.height);
    let x = area.x + (area.width.saturating_sub(w) / 2);
    let y = area.y + (area.height.saturating_sub(h) / 2);
    Rect::new(x, y, w, h)
}
