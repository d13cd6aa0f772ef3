//! Answer composer.
//!
//! Owns the editor used to write a new answer, decides whether posting is
//! allowed, and performs the optimistic insert into the answer list.

mod answer;

use std::cell::RefCell;
use std::rc::Rc;

use chrono::{DateTime, Utc};
use tracing::{info, warn};

use crate::document::is_meaningful;
use crate::editor::Editor;

pub use answer::{Answer, AnswerId, AnswerList, ModerationStatus};

/// What the effects layer needs to persist a submitted answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionRequest {
    pub question_id: String,
    pub content: String,
    pub local_id: AnswerId,
}

#[derive(Debug, Clone)]
struct InFlight {
    local_id: AnswerId,
    draft: String,
}

/// Composer for one question's "your answer" box.
#[derive(Debug)]
pub struct AnswerComposer {
    editor: Editor,
    draft: Rc<RefCell<String>>,
    question_id: String,
    author: String,
    in_flight: Option<InFlight>,
}

impl AnswerComposer {
    pub fn new(question_id: impl Into<String>, author: impl Into<String>, history_limit: usize) -> Self {
        let mut editor = Editor::with_history_limit(history_limit);
        let draft = Rc::new(RefCell::new(editor.html()));
        let mirror = Rc::clone(&draft);
        editor.on_change(move |html| {
            html.clone_into(&mut mirror.borrow_mut());
        });
        Self {
            editor,
            draft,
            question_id: question_id.into(),
            author: author.into(),
            in_flight: None,
        }
    }

    pub const fn editor(&self) -> &Editor {
        &self.editor
    }

    pub const fn editor_mut(&mut self) -> &mut Editor {
        &mut self.editor
    }

    pub fn question_id(&self) -> &str {
        &self.question_id
    }

    pub fn author(&self) -> &str {
        &self.author
    }

    /// The latest HTML reported by the editor.
    pub fn draft(&self) -> String {
        self.draft.borrow().clone()
    }

    pub const fn is_submitting(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Whether the Post control is enabled.
    pub fn can_post(&self) -> bool {
        self.in_flight.is_none() && is_meaningful(&self.draft.borrow())
    }

    /// Post the current draft.
    ///
    /// Appends a local answer to `answers`, clears the editor, and returns the
    /// request to send. Returns `None` when posting is not allowed.
    pub fn submit(&mut self, answers: &mut AnswerList, now: DateTime<Utc>) -> Option<SubmissionRequest> {
        if !self.can_post() {
            return None;
        }
        let content = self.editor.html();
        let local_id = AnswerId::local();
        answers.push(Answer {
            id: local_id.clone(),
            question_id: self.question_id.clone(),
            text: content.clone(),
            author: self.author.clone(),
            upvotes: 0,
            created_at: now,
            accepted: false,
            status: ModerationStatus::Pending,
        });
        self.editor.reset();
        self.in_flight = Some(InFlight {
            local_id: local_id.clone(),
            draft: content.clone(),
        });
        info!(question_id = %self.question_id, %local_id, "submitting answer");
        Some(SubmissionRequest {
            question_id: self.question_id.clone(),
            content,
            local_id,
        })
    }

    /// Finish the in-flight submission.
    ///
    /// On success the local answer is replaced by the server's record. On
    /// failure it is removed and the submitted draft goes back into the
    /// editor, ahead of anything typed since.
    ///
    /// # Errors
    ///
    /// Passes the submission error back to the caller after rolling back.
    pub fn complete<E: std::fmt::Display>(
        &mut self,
        answers: &mut AnswerList,
        result: Result<Answer, E>,
    ) -> Result<(), E> {
        let Some(in_flight) = self.in_flight.take() else {
            warn!("submission completed with nothing in flight");
            return result.map(|_| ());
        };
        match result {
            Ok(answer) => {
                info!(local_id = %in_flight.local_id, id = %answer.id, "answer posted");
                if !answers.replace(&in_flight.local_id, answer.clone()) {
                    answers.push(answer);
                }
                Ok(())
            }
            Err(err) => {
                warn!(local_id = %in_flight.local_id, %err, "answer submission failed");
                answers.remove(&in_flight.local_id);
                let restored = if self.editor.document().is_blank() {
                    in_flight.draft
                } else {
                    format!("{}{}", in_flight.draft, self.editor.html())
                };
                self.editor.load_html(&restored);
                Err(err)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn composer() -> AnswerComposer {
        AnswerComposer::new("q1", "You", 100)
    }

    fn server_answer(id: &str, text: &str) -> Answer {
        Answer {
            id: AnswerId::new(id),
            question_id: "q1".to_string(),
            text: text.to_string(),
            author: "You".to_string(),
            upvotes: 0,
            created_at: DateTime::<Utc>::UNIX_EPOCH,
            accepted: false,
            status: ModerationStatus::Pending,
        }
    }

    #[test]
    fn test_empty_composer_cannot_post() {
        let mut composer = composer();
        let mut answers = AnswerList::new();
        assert!(!composer.can_post());
        assert!(composer.submit(&mut answers, Utc::now()).is_none());
        assert!(answers.is_empty());
    }

    #[test]
    fn test_whitespace_only_cannot_post() {
        let mut composer = composer();
        composer.editor_mut().load_html("<p>   </p>");
        assert_eq!(composer.draft(), "<p>   </p>");
        assert!(!composer.can_post());
    }

    #[test]
    fn test_image_only_cannot_post() {
        let mut composer = composer();
        composer.editor_mut().set_image("https://i.io/a.png").unwrap();
        assert!(!composer.can_post());
    }

    #[test]
    fn test_submit_appends_answer_and_resets_editor() {
        let mut composer = composer();
        let mut answers = AnswerList::new();
        composer.editor_mut().insert_text("Hello");
        assert!(composer.can_post());

        let now = Utc::now();
        let request = composer.submit(&mut answers, now).unwrap();
        assert_eq!(request.content, "<p>Hello</p>");
        assert_eq!(request.question_id, "q1");

        let answer = answers.get(0).unwrap();
        assert_eq!(answer.text, "<p>Hello</p>");
        assert_eq!(answer.upvotes, 0);
        assert_eq!(answer.author, "You");
        assert_eq!(answer.created_at, now);
        assert!(answer.id.is_local());

        assert_eq!(composer.editor().html(), "<p></p>");
        assert_eq!(composer.draft(), "<p></p>");
        assert!(!composer.editor().can_undo());
    }

    #[test]
    fn test_no_second_submission_while_in_flight() {
        let mut composer = composer();
        let mut answers = AnswerList::new();
        composer.editor_mut().insert_text("one");
        composer.submit(&mut answers, Utc::now()).unwrap();
        composer.editor_mut().insert_text("two");
        assert!(composer.is_submitting());
        assert!(!composer.can_post());
        assert!(composer.submit(&mut answers, Utc::now()).is_none());
        assert_eq!(answers.len(), 1);
    }

    #[test]
    fn test_success_replaces_local_answer() {
        let mut composer = composer();
        let mut answers = AnswerList::new();
        composer.editor_mut().insert_text("Hello");
        composer.submit(&mut answers, Utc::now()).unwrap();

        let result: Result<Answer, String> = Ok(server_answer("srv1", "<p>Hello</p>"));
        assert!(composer.complete(&mut answers, result).is_ok());
        assert_eq!(answers.len(), 1);
        assert_eq!(answers.get(0).map(|a| a.id.as_str()), Some("srv1"));
        assert!(!composer.is_submitting());
    }

    #[test]
    fn test_failure_rolls_back_and_restores_draft() {
        let mut composer = composer();
        let mut answers = AnswerList::new();
        composer.editor_mut().insert_text("Hello");
        composer.submit(&mut answers, Utc::now()).unwrap();

        let result: Result<Answer, String> = Err("server down".to_string());
        assert_eq!(
            composer.complete(&mut answers, result),
            Err("server down".to_string())
        );
        assert!(answers.is_empty());
        assert_eq!(composer.editor().html(), "<p>Hello</p>");
        assert_eq!(composer.draft(), "<p>Hello</p>");
        assert!(composer.can_post());
    }

    #[test]
    fn test_failure_keeps_text_typed_during_flight() {
        let mut composer = composer();
        let mut answers = AnswerList::new();
        composer.editor_mut().insert_text("first");
        composer.submit(&mut answers, Utc::now()).unwrap();
        composer.editor_mut().insert_text("more");

        let result: Result<Answer, String> = Err("nope".to_string());
        let _ = composer.complete(&mut answers, result);
        assert_eq!(composer.editor().html(), "<p>first</p><p>more</p>");
    }
}
