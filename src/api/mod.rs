//! Q&A REST API.
//!
//! [`QaApi`] is the contract the app needs from a backend. [`HttpApi`] talks
//! to the real service; [`MemoryApi`] keeps everything in process for offline
//! use and tests.

mod http;
mod memory;

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::Deserialize;
use thiserror::Error;

use crate::composer::{Answer, AnswerId};

pub use http::{DEFAULT_API_BASE, HttpApi};
pub use memory::MemoryApi;

/// Errors from a backend call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    #[error("request failed: {0}")]
    Transport(String),
    #[error("server rejected the request ({status}): {message}")]
    Rejected { status: u16, message: String },
    #[error("unexpected response: {0}")]
    Decode(String),
    #[error("HTTP client error: {0}")]
    Client(String),
}

/// A question as shown above its answers. `description` is HTML.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    pub id: String,
    pub title: String,
    pub description: String,
    pub tags: Vec<String>,
    pub upvotes: u32,
    pub answer_count: u32,
    pub author: String,
    pub status: String,
}

/// A question together with its answers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionThread {
    pub question: Question,
    pub answers: Vec<Answer>,
}

/// One page of answers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnswerPage {
    pub items: Vec<Answer>,
    pub total: u32,
}

/// Pagination window for answer listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub skip: u32,
    pub limit: u32,
}

impl Page {
    pub const MAX_LIMIT: u32 = 100;

    /// Build a page, clamping `limit` to `1..=100`.
    pub fn new(skip: u32, limit: u32) -> Self {
        Self {
            skip,
            limit: limit.clamp(1, Self::MAX_LIMIT),
        }
    }
}

impl Default for Page {
    fn default() -> Self {
        Self { skip: 0, limit: 20 }
    }
}

/// Direction of a vote.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Vote {
    Up,
    Down,
}

impl Vote {
    pub const fn value(self) -> i32 {
        match self {
            Self::Up => 1,
            Self::Down => -1,
        }
    }
}

/// The backend operations the app relies on.
pub trait QaApi: Send + Sync {
    /// Fetch a question and its answers.
    ///
    /// # Errors
    ///
    /// Returns an [`ApiError`] if the request fails or is rejected.
    fn get_question(&self, id: &str) -> Result<QuestionThread, ApiError>;

    /// List a page of answers for a question.
    ///
    /// # Errors
    ///
    /// Returns an [`ApiError`] if the request fails or is rejected.
    fn list_answers(&self, question_id: &str, page: Page) -> Result<AnswerPage, ApiError>;

    /// Persist a new answer and return the stored record.
    ///
    /// # Errors
    ///
    /// Returns an [`ApiError`] if the request fails or is rejected.
    fn create_answer(&self, question_id: &str, content: &str) -> Result<Answer, ApiError>;

    /// Record a vote on an answer.
    ///
    /// # Errors
    ///
    /// Returns an [`ApiError`] if the request fails or is rejected.
    fn vote_answer(&self, answer_id: &AnswerId, vote: Vote) -> Result<(), ApiError>;
}

/// Parse a server timestamp: RFC 3339, or a naive ISO timestamp taken as UTC.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|stamp| stamp.with_timezone(&Utc))
        .ok()
        .or_else(|| {
            NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
                .ok()
                .map(|naive| naive.and_utc())
        })
}

pub(crate) fn deserialize_timestamp<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_timestamp(&raw)
        .ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp {raw:?}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    #[test]
    fn test_page_clamps_limit() {
        assert_eq!(Page::new(0, 0).limit, 1);
        assert_eq!(Page::new(0, 500).limit, 100);
        assert_eq!(Page::default().limit, 20);
    }

    #[test]
    fn test_parse_timestamp_rfc3339() {
        let stamp = parse_timestamp("2024-07-12T10:30:00Z").unwrap();
        assert_eq!(stamp.hour(), 10);
    }

    #[test]
    fn test_parse_timestamp_naive() {
        let stamp = parse_timestamp("2024-07-12T10:30:00.123456").unwrap();
        assert_eq!(stamp.day(), 12);
        assert_eq!(stamp.minute(), 30);
    }

    #[test]
    fn test_parse_timestamp_garbage() {
        assert!(parse_timestamp("yesterday").is_none());
    }

    #[test]
    fn test_vote_values() {
        assert_eq!(Vote::Up.value(), 1);
        assert_eq!(Vote::Down.value(), -1);
    }
}
