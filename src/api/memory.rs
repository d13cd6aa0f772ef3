use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use chrono::{Duration, Utc};
use tracing::info;

use super::{AnswerPage, ApiError, Page, QaApi, Question, QuestionThread, Vote};
use crate::composer::{Answer, AnswerId, ModerationStatus};

/// Shortest answer body the backend accepts, in characters of raw HTML.
const MIN_CONTENT_LEN: usize = 10;

#[derive(Debug, Default)]
struct Store {
    questions: HashMap<String, Question>,
    answers: Vec<Answer>,
    fail_next: Option<ApiError>,
    next_id: u64,
}

/// In-process backend with the same validation rules as the real service.
#[derive(Debug, Default)]
pub struct MemoryApi {
    store: Mutex<Store>,
}

impl MemoryApi {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a question and its answers.
    #[must_use]
    pub fn with_question(self, question: Question, answers: Vec<Answer>) -> Self {
        {
            let mut store = self.lock();
            store.answers.extend(answers);
            store.questions.insert(question.id.clone(), question);
        }
        self
    }

    /// A backend preloaded with one question, for offline use.
    pub fn sample(question_id: &str) -> Self {
        let now = Utc::now();
        let question = Question {
            id: question_id.to_string(),
            title: "How do I use React hooks correctly?".to_string(),
            description: "<p>My component re-renders forever after I added \
                <code>useEffect</code>. What are the rules for calling hooks?</p>"
                .to_string(),
            tags: vec!["react".to_string(), "hooks".to_string()],
            upvotes: 12,
            answer_count: 2,
            author: "Alex Kim".to_string(),
            status: "approved".to_string(),
        };
        let answers = vec![
            Answer {
                id: AnswerId::new("sample-1"),
                question_id: question_id.to_string(),
                text: "<p>React hooks need to be called at the <strong>top level</strong> of \
                    your component, not inside conditions, loops, or nested functions.</p>\
                    <ul><li><p>Always call hooks at the top level</p></li>\
                    <li><p>Only call hooks from function components or custom hooks</p></li></ul>\
                    <p>This is known as the <em>Rules of Hooks</em>.</p>"
                    .to_string(),
                author: "Jane Smith".to_string(),
                upvotes: 7,
                created_at: now - Duration::days(2),
                accepted: true,
                status: ModerationStatus::Approved,
            },
            Answer {
                id: AnswerId::new("sample-2"),
                question_id: question_id.to_string(),
                text: "<p>Include every value the effect reads in the dependency array of \
                    <code>useEffect</code>:</p><pre><code>useEffect(() =&gt; {\n  load(id);\n}, [id]);</code></pre>"
                    .to_string(),
                author: "John Doe".to_string(),
                upvotes: 4,
                created_at: now - Duration::days(1),
                accepted: false,
                status: ModerationStatus::Approved,
            },
        ];
        Self::new().with_question(question, answers)
    }

    /// Make the next call fail with `error`.
    pub fn fail_next(&self, error: ApiError) {
        self.lock().fail_next = Some(error);
    }

    /// Answers stored for a question, in insertion order.
    pub fn answers_for(&self, question_id: &str) -> Vec<Answer> {
        self.lock()
            .answers
            .iter()
            .filter(|answer| answer.question_id == question_id)
            .cloned()
            .collect()
    }

    fn lock(&self) -> MutexGuard<'_, Store> {
        self.store.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn begin(&self) -> Result<MutexGuard<'_, Store>, ApiError> {
        let mut store = self.lock();
        match store.fail_next.take() {
            Some(error) => Err(error),
            None => Ok(store),
        }
    }
}

fn not_found(what: &str) -> ApiError {
    ApiError::Rejected {
        status: 404,
        message: format!("{what} not found"),
    }
}

impl QaApi for MemoryApi {
    fn get_question(&self, id: &str) -> Result<QuestionThread, ApiError> {
        let store = self.begin()?;
        let question = store
            .questions
            .get(id)
            .cloned()
            .ok_or_else(|| not_found("Question"))?;
        let answers = store
            .answers
            .iter()
            .filter(|answer| answer.question_id == id)
            .cloned()
            .collect();
        Ok(QuestionThread { question, answers })
    }

    fn list_answers(&self, question_id: &str, page: Page) -> Result<AnswerPage, ApiError> {
        let store = self.begin()?;
        if !store.questions.contains_key(question_id) {
            return Err(not_found("Question"));
        }
        let matching: Vec<&Answer> = store
            .answers
            .iter()
            .filter(|answer| answer.question_id == question_id)
            .collect();
        let total = u32::try_from(matching.len()).unwrap_or(u32::MAX);
        let items = matching
            .into_iter()
            .skip(page.skip as usize)
            .take(page.limit as usize)
            .cloned()
            .collect();
        Ok(AnswerPage { items, total })
    }

    fn create_answer(&self, question_id: &str, content: &str) -> Result<Answer, ApiError> {
        let mut store = self.begin()?;
        if content.chars().count() < MIN_CONTENT_LEN {
            return Err(ApiError::Rejected {
                status: 422,
                message: format!("String should have at least {MIN_CONTENT_LEN} characters"),
            });
        }
        let question = store
            .questions
            .get_mut(question_id)
            .ok_or_else(|| not_found("Question"))?;
        question.answer_count = question.answer_count.saturating_add(1);

        store.next_id += 1;
        let answer = Answer {
            id: AnswerId::new(format!("mem-{}", store.next_id)),
            question_id: question_id.to_string(),
            text: content.to_string(),
            author: "You".to_string(),
            upvotes: 0,
            created_at: Utc::now(),
            accepted: false,
            status: ModerationStatus::Pending,
        };
        store.answers.push(answer.clone());
        info!(id = %answer.id, question_id, "stored answer in memory");
        Ok(answer)
    }

    fn vote_answer(&self, answer_id: &AnswerId, vote: Vote) -> Result<(), ApiError> {
        let mut store = self.begin()?;
        let answer = store
            .answers
            .iter_mut()
            .find(|answer| &answer.id == answer_id)
            .ok_or_else(|| not_found("Answer"))?;
        answer.upvotes = answer.upvotes.saturating_add_signed(vote.value());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_has_question_and_answers() {
        let api = MemoryApi::sample("q1");
        let thread = api.get_question("q1").unwrap();
        assert_eq!(thread.answers.len(), 2);
        assert_eq!(thread.question.answer_count, 2);
    }

    #[test]
    fn test_unknown_question_is_404() {
        let api = MemoryApi::new();
        assert!(matches!(
            api.get_question("nope"),
            Err(ApiError::Rejected { status: 404, .. })
        ));
    }

    #[test]
    fn test_create_answer_validates_length() {
        let api = MemoryApi::sample("q1");
        assert!(matches!(
            api.create_answer("q1", "<p>Hi</p>"),
            Err(ApiError::Rejected { status: 422, .. })
        ));
        let created = api.create_answer("q1", "<p>Hello there</p>").unwrap();
        assert!(!created.id.is_local());
        assert_eq!(api.answers_for("q1").len(), 3);
        assert_eq!(api.get_question("q1").unwrap().question.answer_count, 3);
    }

    #[test]
    fn test_fail_next_applies_once() {
        let api = MemoryApi::sample("q1");
        api.fail_next(ApiError::Transport("offline".to_string()));
        assert!(api.get_question("q1").is_err());
        assert!(api.get_question("q1").is_ok());
    }

    #[test]
    fn test_list_answers_pages() {
        let api = MemoryApi::sample("q1");
        let page = api.list_answers("q1", Page::new(1, 10)).unwrap();
        assert_eq!(page.total, 2);
        assert_eq!(page.items.len(), 1);
        assert_eq!(page.items[0].id.as_str(), "sample-2");
    }

    #[test]
    fn test_vote_answer() {
        let api = MemoryApi::sample("q1");
        api.vote_answer(&AnswerId::new("sample-1"), Vote::Down).unwrap();
        let votes = api.answers_for("q1")[0].upvotes;
        assert_eq!(votes, 6);
    }
}
