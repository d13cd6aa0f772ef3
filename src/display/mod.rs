//! Read-only display of questions and answers.
//!
//! Stored content is already sanitized when it is written, so the views hand
//! it out unchanged. [`render_html`] turns it into styled terminal lines.

mod render;

use chrono::{DateTime, Utc};
use ratatui::text::Line;

use crate::api::Question;
use crate::composer::Answer;

pub use render::{RenderedDocument, render_document, render_html};

/// Read view over a posted answer.
#[derive(Debug, Clone, Copy)]
pub struct AnswerView<'a> {
    answer: &'a Answer,
}

impl<'a> AnswerView<'a> {
    pub const fn new(answer: &'a Answer) -> Self {
        Self { answer }
    }

    /// The stored HTML, exactly as it was saved.
    pub fn html(&self) -> &'a str {
        &self.answer.text
    }

    /// Header line: author, votes, and age.
    pub fn byline(&self, now: DateTime<Utc>) -> String {
        let votes = self.answer.upvotes;
        let noun = if votes == 1 { "vote" } else { "votes" };
        format!(
            "{}  ·  {votes} {noun}  ·  {}",
            self.answer.author,
            relative_time(self.answer.created_at, now)
        )
    }

    pub fn lines(&self, width: u16) -> Vec<Line<'static>> {
        render_html(self.html(), width)
    }
}

/// Read view over a question body.
#[derive(Debug, Clone, Copy)]
pub struct QuestionView<'a> {
    question: &'a Question,
}

impl<'a> QuestionView<'a> {
    pub const fn new(question: &'a Question) -> Self {
        Self { question }
    }

    pub fn html(&self) -> &'a str {
        &self.question.description
    }

    pub fn lines(&self, width: u16) -> Vec<Line<'static>> {
        render_html(self.html(), width)
    }
}

/// Human-friendly age of a timestamp, such as "3 hours ago".
pub fn relative_time(then: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let elapsed = now.signed_duration_since(then);
    if elapsed.num_minutes() < 1 {
        return "Just now".to_string();
    }
    let (amount, unit) = if elapsed.num_hours() < 1 {
        (elapsed.num_minutes(), "minute")
    } else if elapsed.num_days() < 1 {
        (elapsed.num_hours(), "hour")
    } else if elapsed.num_days() < 30 {
        (elapsed.num_days(), "day")
    } else if elapsed.num_days() < 365 {
        (elapsed.num_days() / 30, "month")
    } else {
        (elapsed.num_days() / 365, "year")
    };
    let plural = if amount == 1 { "" } else { "s" };
    format!("{amount} {unit}{plural} ago")
}

/// Plain-text rendering of a question thread, for non-interactive output.
pub fn thread_text(
    question: &Question,
    answers: &[Answer],
    width: u16,
    now: DateTime<Utc>,
) -> String {
    let mut out = String::new();
    out.push_str(&question.title);
    out.push('\n');
    if !question.tags.is_empty() {
        out.push_str(&format!("[{}]\n", question.tags.join("] [")));
    }
    out.push_str(&format!("asked by {}  ·  {} votes\n\n", question.author, question.upvotes));
    push_lines(&mut out, &QuestionView::new(question).lines(width));

    let noun = if answers.len() == 1 { "Answer" } else { "Answers" };
    out.push_str(&format!("\n{} {noun}\n", answers.len()));
    for answer in answers {
        let view = AnswerView::new(answer);
        out.push('\n');
        if answer.accepted {
            out.push_str("✓ accepted  ");
        }
        out.push_str(&view.byline(now));
        out.push('\n');
        push_lines(&mut out, &view.lines(width));
    }
    out
}

fn push_lines(out: &mut String, lines: &[Line<'_>]) {
    for line in lines {
        for span in &line.spans {
            out.push_str(&span.content);
        }
        out.push('\n');
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;
    use crate::composer::{AnswerId, ModerationStatus};

    fn answer(text: &str, upvotes: u32) -> Answer {
        Answer {
            id: AnswerId::new("a1"),
            question_id: "q1".to_string(),
            text: text.to_string(),
            author: "Jane Smith".to_string(),
            upvotes,
            created_at: DateTime::<Utc>::UNIX_EPOCH,
            accepted: true,
            status: ModerationStatus::Approved,
        }
    }

    #[test]
    fn test_answer_view_returns_stored_html_verbatim() {
        let stored = "<p>Use <strong>CONCAT</strong> &amp; friends</p>";
        let answer = answer(stored, 0);
        assert_eq!(AnswerView::new(&answer).html(), stored);
    }

    #[test]
    fn test_relative_time() {
        let now = DateTime::<Utc>::UNIX_EPOCH + Duration::days(800);
        assert_eq!(relative_time(now - Duration::seconds(20), now), "Just now");
        assert_eq!(relative_time(now - Duration::minutes(1), now), "1 minute ago");
        assert_eq!(relative_time(now - Duration::hours(5), now), "5 hours ago");
        assert_eq!(relative_time(now - Duration::days(2), now), "2 days ago");
        assert_eq!(relative_time(now - Duration::days(65), now), "2 months ago");
        assert_eq!(relative_time(now - Duration::days(400), now), "1 year ago");
    }

    #[test]
    fn test_byline_pluralizes_votes() {
        let now = DateTime::<Utc>::UNIX_EPOCH + Duration::days(2);
        let one = answer("<p>x</p>", 1);
        assert_eq!(AnswerView::new(&one).byline(now), "Jane Smith  ·  1 vote  ·  2 days ago");
    }

    #[test]
    fn test_thread_text() {
        let question = Question {
            id: "q1".to_string(),
            title: "How to join 2 columns in SQL?".to_string(),
            description: "<p>First and last name.</p>".to_string(),
            tags: vec!["sql".to_string()],
            upvotes: 5,
            answer_count: 1,
            author: "Sam".to_string(),
            status: "approved".to_string(),
        };
        let answers = vec![answer("<p>Use CONCAT.</p>", 7)];
        let text = thread_text(&question, &answers, 80, DateTime::<Utc>::UNIX_EPOCH);
        assert!(text.starts_with("How to join 2 columns in SQL?\n[sql]\n"));
        assert!(text.contains("First and last name."));
        assert!(text.contains("1 Answer\n"));
        assert!(text.contains("✓ accepted  Jane Smith  ·  7 votes  ·  Just now"));
        assert!(text.contains("Use CONCAT."));
    }
}
