use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;

use tracing::{debug, warn};

use crate::api::{Page, QaApi, Vote};
use crate::composer::{AnswerId, SubmissionRequest};

use super::Message;

/// Work requested by [`update`](super::update) that talks to the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Fetch the question and its answers.
    LoadThread { question_id: String },
    /// Re-fetch the answer list.
    RefreshAnswers { question_id: String },
    /// Persist a submitted answer.
    PostAnswer(SubmissionRequest),
    /// Record a vote on an answer.
    VoteAnswer { id: AnswerId, vote: Vote },
}

/// Run one effect to completion and describe the result as a message.
pub fn perform(api: &dyn QaApi, effect: Effect) -> Message {
    match effect {
        Effect::LoadThread { question_id } => match api.get_question(&question_id) {
            Ok(thread) => Message::ThreadLoaded(thread),
            Err(error) => Message::ThreadLoadFailed(error),
        },
        Effect::RefreshAnswers { question_id } => {
            match api.list_answers(&question_id, Page::new(0, Page::MAX_LIMIT)) {
                Ok(page) => Message::AnswersRefreshed(page),
                Err(error) => Message::RefreshFailed(error),
            }
        }
        Effect::PostAnswer(request) => {
            match api.create_answer(&request.question_id, &request.content) {
                Ok(answer) => Message::SubmissionSucceeded(answer),
                Err(error) => Message::SubmissionFailed(error),
            }
        }
        Effect::VoteAnswer { id, vote } => match api.vote_answer(&id, vote) {
            Ok(()) => Message::VoteRecorded(id),
            Err(error) => Message::VoteFailed { id, vote, error },
        },
    }
}

/// Runs effects on worker threads and hands results back over a channel.
pub(super) struct EffectRunner {
    api: Arc<dyn QaApi>,
    sender: Sender<Message>,
    receiver: Receiver<Message>,
}

impl EffectRunner {
    pub(super) fn new(api: Arc<dyn QaApi>) -> Self {
        let (sender, receiver) = mpsc::channel();
        Self {
            api,
            sender,
            receiver,
        }
    }

    pub(super) fn spawn(&self, effect: Effect) {
        debug!(?effect, "spawning effect");
        let api = Arc::clone(&self.api);
        let sender = self.sender.clone();
        let spawned = thread::Builder::new()
            .name("ripple-effect".to_string())
            .spawn(move || {
                let message = perform(api.as_ref(), effect);
                // The receiver is gone only when the app is shutting down.
                let _ = sender.send(message);
            });
        if let Err(err) = spawned {
            warn!(%err, "failed to spawn effect worker");
        }
    }

    /// Messages from finished effects, without blocking.
    pub(super) fn drain(&self) -> Vec<Message> {
        self.receiver.try_iter().collect()
    }
}
