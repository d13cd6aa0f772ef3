//! Terminal UI components.
//!
//! - [`style`]: Theming and colors
//! - render: question thread, composer, toolbar and prompts
//! - status: status and toast bars
//! - overlays: help popup

pub mod style;

mod overlays;
mod render;
mod status;

pub use render::{composer_height, render, thread_lines};

/// Placeholder shown in an empty composer.
pub const COMPOSER_PLACEHOLDER: &str = "Write your answer...";
