use std::collections::HashSet;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use crate::api::Question;
use crate::composer::{AnswerComposer, AnswerId, AnswerList};
use crate::editor::{DEFAULT_HISTORY_LIMIT, InsertionDialogs};

use super::effects::Effect;

const TOAST_TTL: Duration = Duration::from_secs(4);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastLevel {
    Info,
    Warning,
    Error,
}

#[derive(Debug, Clone)]
struct Toast {
    level: ToastLevel,
    message: String,
    expires_at: Instant,
}

/// Which pane receives key input.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Focus {
    /// The question and its answers.
    #[default]
    Thread,
    /// The answer composer.
    Composer,
}

/// The complete application state.
///
/// All state lives here - no global or scattered state.
pub struct Model {
    /// Question being answered
    pub question_id: String,
    /// The question, once loaded
    pub question: Option<Question>,
    /// Whether a thread load is in progress
    pub loading: bool,
    /// Answers shown under the question
    pub answers: AnswerList,
    /// The "your answer" editor and submission state
    pub composer: AnswerComposer,
    /// Link/image URL prompts
    pub dialogs: InsertionDialogs,
    /// Pane receiving input
    pub focus: Focus,
    /// Highlighted answer in the thread pane
    pub selected_answer: Option<usize>,
    /// Scroll the thread pane to the selected answer on next render
    pub reveal_selected: bool,
    /// First visible line of the thread pane
    pub thread_scroll: usize,
    /// Number of lines the thread pane showed on last render
    pub thread_page_height: usize,
    /// First visible line of the editor content
    pub editor_scroll: usize,
    /// Local upvote on the question
    pub question_upvoted: bool,
    /// Answers the user has upvoted this session
    pub voted_answers: HashSet<AnswerId>,
    /// Terminal size
    pub terminal_size: (u16, u16),
    /// Global config path shown in help
    pub config_global_path: Option<PathBuf>,
    /// Local override path shown in help
    pub config_local_path: Option<PathBuf>,
    /// Whether help overlay is visible
    pub help_visible: bool,
    /// Whether the app should quit
    pub should_quit: bool,
    toast: Option<Toast>,
    outbox: Vec<Effect>,
}

impl std::fmt::Debug for Model {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Model")
            .field("question_id", &self.question_id)
            .field("loading", &self.loading)
            .field("answers", &self.answers.len())
            .field("focus", &self.focus)
            .field("submitting", &self.composer.is_submitting())
            .finish_non_exhaustive()
    }
}

impl Default for Model {
    fn default() -> Self {
        Self::new(String::new(), "You", DEFAULT_HISTORY_LIMIT, (80, 24))
    }
}

impl Model {
    /// Create a model for `question_id`. The thread is loaded by a
    /// [`Effect::LoadThread`] queued here.
    pub fn new(
        question_id: impl Into<String>,
        author: impl Into<String>,
        history_limit: usize,
        terminal_size: (u16, u16),
    ) -> Self {
        let question_id = question_id.into();
        let composer = AnswerComposer::new(question_id.clone(), author, history_limit);
        Self {
            question_id,
            question: None,
            loading: false,
            answers: AnswerList::new(),
            composer,
            dialogs: InsertionDialogs::default(),
            focus: Focus::Thread,
            selected_answer: None,
            reveal_selected: false,
            thread_scroll: 0,
            thread_page_height: usize::from(terminal_size.1.saturating_sub(12)).max(1),
            editor_scroll: 0,
            question_upvoted: false,
            voted_answers: HashSet::new(),
            terminal_size,
            config_global_path: None,
            config_local_path: None,
            help_visible: false,
            should_quit: false,
            toast: None,
            outbox: Vec::new(),
        }
    }

    /// Queue the initial thread load.
    #[must_use]
    pub fn with_initial_load(mut self) -> Self {
        self.loading = true;
        self.push_effect(Effect::LoadThread {
            question_id: self.question_id.clone(),
        });
        self
    }

    /// Question upvotes including the local toggle.
    pub fn question_upvotes(&self) -> u32 {
        self.question.as_ref().map_or(0, |question| {
            question.upvotes.saturating_add(u32::from(self.question_upvoted))
        })
    }

    pub(super) fn push_effect(&mut self, effect: Effect) {
        self.outbox.push(effect);
    }

    /// Take the effects queued by the last updates.
    pub fn take_effects(&mut self) -> Vec<Effect> {
        std::mem::take(&mut self.outbox)
    }

    pub fn pending_effects(&self) -> &[Effect] {
        &self.outbox
    }

    pub(super) fn show_toast(&mut self, level: ToastLevel, message: impl Into<String>) {
        self.toast = Some(Toast {
            level,
            message: message.into(),
            expires_at: Instant::now() + TOAST_TTL,
        });
    }

    pub(super) fn dismiss_toast(&mut self) -> bool {
        self.toast.take().is_some()
    }

    pub(super) fn expire_toast(&mut self, now: Instant) -> bool {
        if self
            .toast
            .as_ref()
            .is_some_and(|toast| toast.expires_at <= now)
        {
            self.toast = None;
            return true;
        }
        false
    }

    pub fn active_toast(&self) -> Option<(&str, ToastLevel)> {
        self.toast
            .as_ref()
            .map(|toast| (toast.message.as_str(), toast.level))
    }

    /// Clamp the answer selection after the list changed.
    pub(super) fn clamp_selection(&mut self) {
        self.selected_answer = match (self.selected_answer, self.answers.len()) {
            (_, 0) => None,
            (Some(index), len) => Some(index.min(len - 1)),
            (None, _) => None,
        };
    }
}
