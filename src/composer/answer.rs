use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

const LOCAL_PREFIX: &str = "local-";

/// Identifier of an answer: a server id, or a local id for answers the server
/// has not confirmed yet.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AnswerId(String);

impl AnswerId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// A fresh local identifier.
    pub fn local() -> Self {
        Self(format!("{LOCAL_PREFIX}{}", Uuid::new_v4()))
    }

    pub fn is_local(&self) -> bool {
        self.0.starts_with(LOCAL_PREFIX)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AnswerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Moderation state of an answer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModerationStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
    Flagged,
}

impl ModerationStatus {
    /// Parse a status name, case-insensitively.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "pending" => Some(Self::Pending),
            "approved" => Some(Self::Approved),
            "rejected" => Some(Self::Rejected),
            "flagged" => Some(Self::Flagged),
            _ => None,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
            Self::Flagged => "flagged",
        }
    }
}

/// A posted answer. `text` is sanitized HTML.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Answer {
    pub id: AnswerId,
    pub question_id: String,
    pub text: String,
    pub author: String,
    pub upvotes: u32,
    pub created_at: DateTime<Utc>,
    pub accepted: bool,
    pub status: ModerationStatus,
}

/// The answers shown under a question, in display order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnswerList {
    answers: Vec<Answer>,
}

impl AnswerList {
    pub const fn new() -> Self {
        Self {
            answers: Vec::new(),
        }
    }

    pub fn from_answers(answers: Vec<Answer>) -> Self {
        Self { answers }
    }

    pub fn len(&self) -> usize {
        self.answers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.answers.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Answer> {
        self.answers.iter()
    }

    pub fn get(&self, index: usize) -> Option<&Answer> {
        self.answers.get(index)
    }

    pub fn find(&self, id: &AnswerId) -> Option<&Answer> {
        self.answers.iter().find(|answer| &answer.id == id)
    }

    pub fn push(&mut self, answer: Answer) {
        self.answers.push(answer);
    }

    pub fn remove(&mut self, id: &AnswerId) -> Option<Answer> {
        let index = self.answers.iter().position(|answer| &answer.id == id)?;
        Some(self.answers.remove(index))
    }

    /// Swap the answer with `id` for `answer`, keeping its position.
    pub fn replace(&mut self, id: &AnswerId, answer: Answer) -> bool {
        match self.answers.iter_mut().find(|existing| &existing.id == id) {
            Some(slot) => {
                *slot = answer;
                true
            }
            None => false,
        }
    }

    /// Adjust an answer's vote count, never going below zero.
    pub fn adjust_votes(&mut self, id: &AnswerId, delta: i32) -> bool {
        match self.answers.iter_mut().find(|answer| &answer.id == id) {
            Some(answer) => {
                answer.upvotes = answer.upvotes.saturating_add_signed(delta);
                true
            }
            None => false,
        }
    }
}

impl<'a> IntoIterator for &'a AnswerList {
    type Item = &'a Answer;
    type IntoIter = std::slice::Iter<'a, Answer>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn answer(id: &str, upvotes: u32) -> Answer {
        Answer {
            id: AnswerId::new(id),
            question_id: "q1".to_string(),
            text: "<p>x</p>".to_string(),
            author: "sam".to_string(),
            upvotes,
            created_at: DateTime::<Utc>::UNIX_EPOCH,
            accepted: false,
            status: ModerationStatus::Approved,
        }
    }

    #[test]
    fn test_local_ids_are_unique_and_marked() {
        let a = AnswerId::local();
        let b = AnswerId::local();
        assert_ne!(a, b);
        assert!(a.is_local());
        assert!(!AnswerId::new("65f0c0ffee").is_local());
    }

    #[test]
    fn test_replace_keeps_position() {
        let mut list = AnswerList::from_answers(vec![answer("a", 0), answer("b", 0)]);
        assert!(list.replace(&AnswerId::new("a"), answer("z", 3)));
        assert_eq!(list.get(0).map(|a| a.id.as_str()), Some("z"));
        assert!(!list.replace(&AnswerId::new("missing"), answer("y", 0)));
    }

    #[test]
    fn test_votes_never_negative() {
        let mut list = AnswerList::from_answers(vec![answer("a", 1)]);
        let id = AnswerId::new("a");
        list.adjust_votes(&id, -5);
        assert_eq!(list.find(&id).map(|a| a.upvotes), Some(0));
        list.adjust_votes(&id, 2);
        assert_eq!(list.find(&id).map(|a| a.upvotes), Some(2));
    }

    #[test]
    fn test_remove() {
        let mut list = AnswerList::from_answers(vec![answer("a", 0)]);
        assert!(list.remove(&AnswerId::new("a")).is_some());
        assert!(list.is_empty());
        assert!(list.remove(&AnswerId::new("a")).is_none());
    }

    #[test]
    fn test_status_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&ModerationStatus::Flagged).unwrap(),
            "\"flagged\""
        );
    }
}
