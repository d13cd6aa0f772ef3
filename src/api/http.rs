use std::time::Duration;

use chrono::{DateTime, Utc};
use reqwest::blocking::{Client, RequestBuilder};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use tracing::{debug, info};
use url::Url;

use super::{
    AnswerPage, ApiError, Page, QaApi, Question, QuestionThread, Vote, deserialize_timestamp,
};
use crate::composer::{Answer, AnswerId, ModerationStatus};

/// Base URL of a locally running backend.
pub const DEFAULT_API_BASE: &str = "http://localhost:8000/api/v1";

const USER_AGENT: &str = concat!("ripple/", env!("CARGO_PKG_VERSION"));
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

/// Blocking HTTP client for the Q&A backend.
#[derive(Debug, Clone)]
pub struct HttpApi {
    client: Client,
    base: Url,
    token: Option<String>,
}

impl HttpApi {
    /// Create a client for the API rooted at `base_url`.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Client`] if the URL is unusable or the HTTP client
    /// cannot be built.
    pub fn new(base_url: &str, token: Option<String>) -> Result<Self, ApiError> {
        let base = Url::parse(base_url)
            .map_err(|err| ApiError::Client(format!("invalid API base {base_url:?}: {err}")))?;
        if base.cannot_be_a_base() {
            return Err(ApiError::Client(format!(
                "API base {base_url:?} cannot hold paths"
            )));
        }
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(DEFAULT_TIMEOUT)
            .build()
            .map_err(|err| ApiError::Client(format!("Failed to build HTTP client: {err}")))?;
        Ok(Self {
            client,
            base,
            token,
        })
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, ApiError> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|()| ApiError::Client("API base cannot hold paths".to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<Envelope<T>, ApiError> {
        let response = self
            .authorized(request)
            .send()
            .map_err(|err| ApiError::Transport(err.to_string()))?;
        let status = response.status();
        let body = response
            .text()
            .map_err(|err| ApiError::Transport(err.to_string()))?;
        debug!(status = status.as_u16(), bytes = body.len(), "API response");

        if !status.is_success() {
            return Err(ApiError::Rejected {
                status: status.as_u16(),
                message: error_message(&body)
                    .unwrap_or_else(|| status.canonical_reason().unwrap_or("error").to_string()),
            });
        }
        let envelope: Envelope<T> =
            serde_json::from_str(&body).map_err(|err| ApiError::Decode(err.to_string()))?;
        if !envelope.success {
            return Err(ApiError::Rejected {
                status: status.as_u16(),
                message: envelope.message,
            });
        }
        Ok(envelope)
    }

    fn send_data<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, ApiError> {
        self.send(request)?
            .data
            .ok_or_else(|| ApiError::Decode("response has no data".to_string()))
    }
}

impl QaApi for HttpApi {
    fn get_question(&self, id: &str) -> Result<QuestionThread, ApiError> {
        let url = self.endpoint(&["questions", id])?;
        info!(%url, "fetching question");
        let data: ThreadRecord = self.send_data(self.client.get(url))?;
        Ok(QuestionThread {
            question: data.question.into(),
            answers: data.answers.into_iter().map(Answer::from).collect(),
        })
    }

    fn list_answers(&self, question_id: &str, page: Page) -> Result<AnswerPage, ApiError> {
        let url = self.endpoint(&["answers", question_id, "answers"])?;
        info!(%url, skip = page.skip, limit = page.limit, "listing answers");
        let request = self
            .client
            .get(url)
            .query(&[("skip", page.skip), ("limit", page.limit)]);
        let data: PageRecord = self.send_data(request)?;
        Ok(AnswerPage {
            items: data.items.into_iter().map(Answer::from).collect(),
            total: data.total,
        })
    }

    fn create_answer(&self, question_id: &str, content: &str) -> Result<Answer, ApiError> {
        let url = self.endpoint(&["answers", question_id, "answers"])?;
        info!(%url, "creating answer");
        let body = json!({ "content": content, "questionId": question_id });
        let record: AnswerRecord = self.send_data(self.client.post(url).json(&body))?;
        Ok(record.into())
    }

    fn vote_answer(&self, answer_id: &AnswerId, vote: Vote) -> Result<(), ApiError> {
        let url = self.endpoint(&["answers", answer_id.as_str(), "vote"])?;
        info!(%url, vote = vote.value(), "voting on answer");
        let request = self
            .client
            .post(url)
            .query(&[("vote_value", vote.value())]);
        self.send::<Value>(request).map(|_| ())
    }
}

/// Pull a readable message out of an error body.
fn error_message(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    match value.get("detail").or_else(|| value.get("message"))? {
        Value::String(message) => Some(message.clone()),
        Value::Array(items) => {
            let messages: Vec<&str> = items
                .iter()
                .filter_map(|item| item.get("msg").and_then(Value::as_str))
                .collect();
            (!messages.is_empty()).then(|| messages.join("; "))
        }
        other => Some(other.to_string()),
    }
}

#[derive(Debug, Deserialize)]
struct Envelope<T> {
    success: bool,
    data: Option<T>,
    #[serde(default)]
    message: String,
}

#[derive(Debug, Deserialize)]
struct ThreadRecord {
    question: QuestionRecord,
    #[serde(default)]
    answers: Vec<AnswerRecord>,
}

#[derive(Debug, Deserialize)]
struct PageRecord {
    items: Vec<AnswerRecord>,
    #[serde(default)]
    total: u32,
}

#[derive(Debug, Deserialize)]
struct QuestionRecord {
    #[serde(rename = "_id", alias = "id")]
    id: String,
    title: String,
    #[serde(alias = "description")]
    content: String,
    #[serde(default)]
    tags: Vec<String>,
    #[serde(default)]
    votes: i64,
    #[serde(default)]
    answer_count: i64,
    #[serde(default)]
    author_name: String,
    #[serde(default)]
    status: String,
}

#[derive(Debug, Deserialize)]
struct AnswerRecord {
    #[serde(rename = "_id", alias = "id")]
    id: String,
    content: String,
    #[serde(default)]
    votes: i64,
    #[serde(default)]
    is_accepted: bool,
    #[serde(default = "Utc::now", deserialize_with = "deserialize_timestamp")]
    created_at: DateTime<Utc>,
    #[serde(default)]
    author_name: String,
    #[serde(default)]
    question_id: String,
    #[serde(default)]
    status: Option<String>,
}

fn clamp_count(value: i64) -> u32 {
    u32::try_from(value.max(0)).unwrap_or(u32::MAX)
}

impl From<QuestionRecord> for Question {
    fn from(record: QuestionRecord) -> Self {
        Self {
            id: record.id,
            title: record.title,
            description: record.content,
            tags: record.tags,
            upvotes: clamp_count(record.votes),
            answer_count: clamp_count(record.answer_count),
            author: record.author_name,
            status: record.status,
        }
    }
}

impl From<AnswerRecord> for Answer {
    fn from(record: AnswerRecord) -> Self {
        Self {
            id: AnswerId::new(record.id),
            question_id: record.question_id,
            text: record.content,
            author: record.author_name,
            upvotes: clamp_count(record.votes),
            created_at: record.created_at,
            accepted: record.is_accepted,
            status: record
                .status
                .as_deref()
                .and_then(ModerationStatus::parse)
                .unwrap_or_default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_appends_segments() {
        let api = HttpApi::new("http://localhost:8000/api/v1", None).unwrap();
        let url = api.endpoint(&["answers", "abc", "answers"]).unwrap();
        assert_eq!(url.as_str(), "http://localhost:8000/api/v1/answers/abc/answers");

        let slashed = HttpApi::new("http://localhost:8000/api/v1/", None).unwrap();
        let url = slashed.endpoint(&["questions", "q 1"]).unwrap();
        assert_eq!(url.as_str(), "http://localhost:8000/api/v1/questions/q%201");
    }

    #[test]
    fn test_rejects_unusable_base() {
        assert!(matches!(
            HttpApi::new("mailto:x@y.z", None),
            Err(ApiError::Client(_))
        ));
        assert!(matches!(
            HttpApi::new("not a url", None),
            Err(ApiError::Client(_))
        ));
    }

    #[test]
    fn test_error_message_from_detail() {
        assert_eq!(
            error_message(r#"{"detail": "Question not found"}"#).as_deref(),
            Some("Question not found")
        );
        assert_eq!(
            error_message(
                r#"{"detail": [{"loc": ["body", "content"], "msg": "String should have at least 10 characters"}]}"#
            )
            .as_deref(),
            Some("String should have at least 10 characters")
        );
        assert_eq!(error_message("<html>502</html>"), None);
    }

    #[test]
    fn test_answer_record_decodes_server_shape() {
        let body = r#"{
            "success": true,
            "data": {
                "_id": "65f1a2b3c4d5e6f708192a3b",
                "content": "<p>Use CONCAT.</p>",
                "votes": -2,
                "is_accepted": true,
                "created_at": "2024-07-12T10:30:00.123456",
                "updated_at": "2024-07-12T10:30:00.123456",
                "question_id": "65f1a2b3c4d5e6f708192a00",
                "author_id": "65f1a2b3c4d5e6f708192a01",
                "author_name": "Jane Smith"
            },
            "message": "Answer created successfully",
            "timestamp": "2024-07-12T10:30:00Z"
        }"#;
        let envelope: Envelope<AnswerRecord> = serde_json::from_str(body).unwrap();
        let answer: Answer = envelope.data.unwrap().into();
        assert_eq!(answer.id.as_str(), "65f1a2b3c4d5e6f708192a3b");
        assert_eq!(answer.upvotes, 0);
        assert!(answer.accepted);
        assert_eq!(answer.author, "Jane Smith");
        assert_eq!(answer.status, ModerationStatus::Pending);
    }

    #[test]
    fn test_thread_record_decodes() {
        let body = r#"{
            "success": true,
            "data": {
                "question": {
                    "_id": "q1",
                    "title": "How to join 2 columns in SQL?",
                    "content": "<p>I have first and last name columns.</p>",
                    "tags": ["sql"],
                    "votes": 5,
                    "answer_count": 1,
                    "author_name": "Sam",
                    "status": "approved"
                },
                "answers": []
            },
            "message": "",
            "timestamp": "2024-07-12T10:30:00Z"
        }"#;
        let envelope: Envelope<ThreadRecord> = serde_json::from_str(body).unwrap();
        let question: Question = envelope.data.unwrap().question.into();
        assert_eq!(question.upvotes, 5);
        assert_eq!(question.tags, vec!["sql".to_string()]);
        assert_eq!(question.description, "<p>I have first and last name columns.</p>");
    }

    #[test]
    fn test_vote_envelope_without_data() {
        let body = r#"{"success": true, "data": null, "message": "Vote recorded successfully"}"#;
        let envelope: Envelope<Value> = serde_json::from_str(body).unwrap();
        assert!(envelope.success);
    }
}
