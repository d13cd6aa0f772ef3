// Only allow lints that are either transitive-dependency noise or
// genuinely opinionated style choices that don't indicate real issues.
#![allow(
    // Transitive dependency version mismatches we can't control
    clippy::multiple_crate_versions,
    // module_name_repetitions is pure style preference (e.g. api::ApiError)
    clippy::module_name_repetitions
)]

//! # Ripple
//!
//! A terminal answer composer and reader for a Q&A platform.
//!
//! Ripple shows a question with its answers and lets you write a rich-text
//! answer with:
//! - Bold, italic and inline code marks
//! - Bullet and numbered lists, block quotes and code blocks
//! - Links and images with URL validation
//! - Undo and redo
//! - Optimistic posting with rollback when the server refuses
//!
//! ## Architecture
//!
//! The terminal app uses The Elm Architecture (TEA) pattern:
//! - **Model**: Application state
//! - **Message**: Events and actions
//! - **Update**: Pure state transitions, queuing backend effects
//! - **View**: Render to terminal
//!
//! ## Modules
//!
//! - [`document`]: Rich-text document model, HTML sanitizer and serializer
//! - [`editor`]: Editor engine, undo history and URL prompts
//! - [`composer`]: Answer composition and submission
//! - [`display`]: Read-only rendering of stored HTML
//! - [`api`]: Q&A REST client and in-memory backend
//! - [`app`]: Main application loop and state
//! - [`ui`]: Terminal UI components
//! - [`config`]: Saved command-line defaults

pub mod api;
pub mod app;
pub mod composer;
pub mod config;
pub mod display;
pub mod document;
pub mod editor;
pub mod ui;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::app::{App, Message, Model};
    pub use crate::composer::{Answer, AnswerComposer};
    pub use crate::document::Document;
    pub use crate::editor::Editor;
}
