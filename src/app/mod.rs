//! Application state and main event loop.
//!
//! This module implements The Elm Architecture (TEA):
//! - [`Model`]: The complete application state
//! - [`Message`]: All possible events and actions
//! - [`update`]: Pure function for state transitions
//! - [`App::run`]: Main event loop with rendering
//!
//! Backend calls are queued by `update` as [`Effect`]s and run on worker
//! threads; their results come back as messages.

mod effects;
mod event_loop;
mod input;
mod model;
mod update;

pub use effects::{Effect, perform};
pub use model::{Focus, Model, ToastLevel};
pub use update::{Message, update};

use std::path::PathBuf;
use std::sync::Arc;

use crate::api::QaApi;
use crate::editor::DEFAULT_HISTORY_LIMIT;

/// Main application struct that owns the terminal and runs the event loop.
pub struct App {
    question_id: String,
    api: Arc<dyn QaApi>,
    author: String,
    history_limit: usize,
    draft_html: Option<String>,
    config_global_path: Option<PathBuf>,
    config_local_path: Option<PathBuf>,
}

impl App {
    /// Create a new application for the given question.
    pub fn new(question_id: impl Into<String>, api: Arc<dyn QaApi>) -> Self {
        Self {
            question_id: question_id.into(),
            api,
            author: "You".to_string(),
            history_limit: DEFAULT_HISTORY_LIMIT,
            draft_html: None,
            config_global_path: None,
            config_local_path: None,
        }
    }

    /// Name shown on answers posted from this session.
    #[must_use]
    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.author = author.into();
        self
    }

    /// Maximum undo depth of the composer.
    #[must_use]
    pub const fn with_history_limit(mut self, limit: usize) -> Self {
        self.history_limit = limit;
        self
    }

    /// Start the composer with this HTML.
    #[must_use]
    pub fn with_draft(mut self, html: Option<String>) -> Self {
        self.draft_html = html;
        self
    }

    /// Set config paths to show in help.
    #[must_use]
    pub fn with_config_paths(
        mut self,
        global_path: Option<PathBuf>,
        local_path: Option<PathBuf>,
    ) -> Self {
        self.config_global_path = global_path;
        self.config_local_path = local_path;
        self
    }

    /// Build the initial model, with the thread load queued.
    pub fn initial_model(&self, terminal_size: (u16, u16)) -> Model {
        let mut model = Model::new(
            self.question_id.clone(),
            self.author.clone(),
            self.history_limit,
            terminal_size,
        )
        .with_initial_load();
        if let Some(html) = &self.draft_html {
            model.composer.editor_mut().load_html(html);
            model.focus = Focus::Composer;
        }
        model
            .config_global_path
            .clone_from(&self.config_global_path);
        model.config_local_path.clone_from(&self.config_local_path);
        model
    }
}
