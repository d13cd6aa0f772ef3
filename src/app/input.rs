use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseEventKind};
use ratatui::Frame;

use crate::app::model::Focus;
use crate::app::{App, Message, Model};
use crate::editor::{Command, Direction, Toggle};

use super::event_loop::ResizeDebouncer;

const WHEEL_STEP: usize = 3;

impl App {
    pub(super) fn handle_event(
        event: &Event,
        model: &Model,
        now_ms: u64,
        resize_debouncer: &mut ResizeDebouncer,
    ) -> Option<Message> {
        match event {
            Event::Key(key) if key.kind != KeyEventKind::Release => Self::handle_key(*key, model),
            Event::Paste(text) => Self::handle_paste(text, model),
            Event::Mouse(mouse) if !model.help_visible => match mouse.kind {
                MouseEventKind::ScrollUp => Some(Message::ScrollUp(WHEEL_STEP)),
                MouseEventKind::ScrollDown => Some(Message::ScrollDown(WHEEL_STEP)),
                _ => None,
            },
            Event::Resize(w, h) => {
                resize_debouncer.queue(*w, *h, now_ms);
                None
            }
            _ => None,
        }
    }

    fn handle_paste(text: &str, model: &Model) -> Option<Message> {
        if model.dialogs.visible().is_some() {
            return Some(Message::DialogInput(text.to_string()));
        }
        (model.focus == Focus::Composer)
            .then(|| Message::Edit(Command::InsertText(text.to_string())))
    }

    pub(super) fn handle_key(key: KeyEvent, model: &Model) -> Option<Message> {
        if model.help_visible {
            return Some(Message::HideHelp);
        }

        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        let alt = key.modifiers.contains(KeyModifiers::ALT);

        // Global keys
        match key.code {
            KeyCode::Char('c' | 'q') if ctrl => return Some(Message::Quit),
            KeyCode::Char('s') if ctrl => return Some(Message::Submit),
            KeyCode::F(1) => return Some(Message::ToggleHelp),
            _ => {}
        }

        // URL prompt
        if model.dialogs.visible().is_some() {
            return match key.code {
                KeyCode::Esc => Some(Message::DialogCancel),
                KeyCode::Enter => Some(Message::DialogConfirm),
                KeyCode::Backspace => Some(Message::DialogBackspace),
                KeyCode::Char('k') if ctrl => Some(Message::ToolbarLink),
                KeyCode::Char('g') if ctrl => Some(Message::ToolbarImage),
                KeyCode::Char(c) if !ctrl && !alt => Some(Message::DialogInput(c.to_string())),
                _ => None,
            };
        }

        if key.code == KeyCode::Esc && model.active_toast().is_some() {
            return Some(Message::DismissToast);
        }

        match model.focus {
            Focus::Thread => Self::handle_thread_key(key),
            Focus::Composer => Self::handle_composer_key(key, ctrl, alt),
        }
    }

    fn handle_thread_key(key: KeyEvent) -> Option<Message> {
        match key.code {
            // Navigation
            KeyCode::Char('j') | KeyCode::Down => Some(Message::ScrollDown(1)),
            KeyCode::Char('k') | KeyCode::Up => Some(Message::ScrollUp(1)),
            KeyCode::Char(' ') | KeyCode::PageDown => Some(Message::PageDown),
            KeyCode::Char('b') | KeyCode::PageUp => Some(Message::PageUp),
            KeyCode::Char('g') | KeyCode::Home => Some(Message::ScrollUp(usize::MAX)),
            KeyCode::Char('G') | KeyCode::End => Some(Message::ScrollDown(usize::MAX)),

            // Answers
            KeyCode::Char('n' | ']') => Some(Message::SelectNextAnswer),
            KeyCode::Char('p' | '[') => Some(Message::SelectPrevAnswer),
            KeyCode::Char('u') => Some(Message::ToggleAnswerVote),
            KeyCode::Char('v') => Some(Message::ToggleQuestionUpvote),
            KeyCode::Char('r') => Some(Message::Refresh),

            // Focus
            KeyCode::Tab | KeyCode::Enter | KeyCode::Char('a' | 'i') => {
                Some(Message::SwitchFocus)
            }
            KeyCode::Char('?') => Some(Message::ToggleHelp),
            KeyCode::Char('q') => Some(Message::Quit),
            _ => None,
        }
    }

    fn handle_composer_key(key: KeyEvent, ctrl: bool, alt: bool) -> Option<Message> {
        let shift = key.modifiers.contains(KeyModifiers::SHIFT);
        let edit = |command| Some(Message::Edit(command));
        let toggle = |toggle| Some(Message::Edit(Command::Toggle(toggle)));
        let move_cursor = |direction| {
            Some(Message::Edit(Command::MoveCursor {
                direction,
                extend: shift,
            }))
        };

        match key.code {
            // Toolbar
            KeyCode::Char('b') if ctrl => toggle(Toggle::Bold),
            KeyCode::Char('i') if ctrl || alt => toggle(Toggle::Italic),
            KeyCode::Char('e') if ctrl => toggle(Toggle::Code),
            KeyCode::Char('1') if alt => toggle(Toggle::BulletList),
            KeyCode::Char('2') if alt => toggle(Toggle::OrderedList),
            KeyCode::Char('3') if alt => toggle(Toggle::Blockquote),
            KeyCode::Char('4') if alt => toggle(Toggle::CodeBlock),
            KeyCode::Char('k') if ctrl => Some(Message::ToolbarLink),
            KeyCode::Char('g') if ctrl => Some(Message::ToolbarImage),
            KeyCode::Char('z') if ctrl => edit(Command::Undo),
            KeyCode::Char('y') if ctrl => edit(Command::Redo),
            KeyCode::Char('a') if ctrl => edit(Command::SelectAll),

            // Text entry
            KeyCode::Enter => edit(Command::SplitBlock),
            KeyCode::Backspace => edit(Command::DeleteBack),
            KeyCode::Left => move_cursor(Direction::Left),
            KeyCode::Right => move_cursor(Direction::Right),
            KeyCode::Up => move_cursor(Direction::Up),
            KeyCode::Down => move_cursor(Direction::Down),
            KeyCode::Home => move_cursor(Direction::Home),
            KeyCode::End => move_cursor(Direction::End),
            KeyCode::Char(c) if !ctrl && !alt => edit(Command::InsertText(c.to_string())),

            // Focus
            KeyCode::Tab | KeyCode::Esc => Some(Message::SwitchFocus),
            _ => None,
        }
    }

    pub(super) fn view(model: &mut Model, frame: &mut Frame) {
        crate::ui::render(model, frame);
    }
}
