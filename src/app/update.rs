use chrono::Utc;
use tracing::{debug, info, warn};

use crate::api::{AnswerPage, ApiError, QuestionThread, Vote};
use crate::app::model::Focus;
use crate::app::{Model, ToastLevel};
use crate::composer::{Answer, AnswerId, AnswerList};
use crate::editor::{Command, DialogOutcome};

use super::effects::Effect;

/// All possible events and actions in the application.
///
/// These represent user input, backend results, and internal actions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message {
    // Thread
    /// The question and its answers arrived
    ThreadLoaded(QuestionThread),
    /// Loading the question failed
    ThreadLoadFailed(ApiError),
    /// Re-fetch the answers
    Refresh,
    /// A fresh answer listing arrived
    AnswersRefreshed(AnswerPage),
    /// Re-fetching the answers failed
    RefreshFailed(ApiError),
    /// Scroll the thread up by n lines
    ScrollUp(usize),
    /// Scroll the thread down by n lines
    ScrollDown(usize),
    /// Scroll the thread up one page
    PageUp,
    /// Scroll the thread down one page
    PageDown,
    /// Highlight the next answer
    SelectNextAnswer,
    /// Highlight the previous answer
    SelectPrevAnswer,
    /// Flip the local upvote on the question
    ToggleQuestionUpvote,
    /// Upvote the highlighted answer, or take the upvote back
    ToggleAnswerVote,
    /// The backend accepted a vote
    VoteRecorded(AnswerId),
    /// The backend rejected a vote
    VoteFailed {
        id: AnswerId,
        vote: Vote,
        error: ApiError,
    },

    // Composer
    /// Apply an editor command
    Edit(Command),
    /// Link toolbar button
    ToolbarLink,
    /// Image toolbar button
    ToolbarImage,
    /// Type or paste into the open URL prompt
    DialogInput(String),
    /// Delete the last character of the URL prompt
    DialogBackspace,
    /// Confirm the URL prompt
    DialogConfirm,
    /// Close the URL prompt
    DialogCancel,
    /// Post the answer
    Submit,
    /// The backend stored the posted answer
    SubmissionSucceeded(Answer),
    /// Posting the answer failed
    SubmissionFailed(ApiError),

    // Window
    /// Move input focus to the other pane
    SwitchFocus,
    /// Toggle help overlay
    ToggleHelp,
    /// Hide help overlay
    HideHelp,
    /// Hide the current toast
    DismissToast,
    /// Terminal resized
    Resize(u16, u16),
    /// Quit the application
    Quit,
}

/// Pure function that updates the model based on a message.
///
/// This is the core of TEA - all state transitions happen here. Backend work
/// is queued as [`Effect`]s for the event loop to run.
pub fn update(mut model: Model, msg: Message) -> Model {
    match msg {
        // Thread
        Message::ThreadLoaded(thread) => {
            info!(
                question_id = %thread.question.id,
                answers = thread.answers.len(),
                "thread loaded"
            );
            model.loading = false;
            model.question = Some(thread.question);
            model.answers = merge_pending(&model.answers, thread.answers);
            model.clamp_selection();
        }
        Message::ThreadLoadFailed(error) => {
            model.loading = false;
            model.show_toast(ToastLevel::Error, format!("Could not load question: {error}"));
        }
        Message::Refresh => {
            if model.question.is_none() {
                model.loading = true;
                model.push_effect(Effect::LoadThread {
                    question_id: model.question_id.clone(),
                });
            } else {
                model.push_effect(Effect::RefreshAnswers {
                    question_id: model.question_id.clone(),
                });
            }
        }
        Message::AnswersRefreshed(page) => {
            model.answers = merge_pending(&model.answers, page.items);
            if let Some(question) = model.question.as_mut() {
                question.answer_count = page.total;
            }
            model.clamp_selection();
            model.show_toast(ToastLevel::Info, "Answers refreshed");
        }
        Message::RefreshFailed(error) => {
            model.show_toast(ToastLevel::Error, format!("Refresh failed: {error}"));
        }
        Message::ScrollUp(n) => {
            model.thread_scroll = model.thread_scroll.saturating_sub(n);
        }
        Message::ScrollDown(n) => {
            model.thread_scroll = model.thread_scroll.saturating_add(n);
        }
        Message::PageUp => {
            model.thread_scroll = model.thread_scroll.saturating_sub(model.thread_page_height);
        }
        Message::PageDown => {
            model.thread_scroll = model.thread_scroll.saturating_add(model.thread_page_height);
        }
        Message::SelectNextAnswer => {
            if !model.answers.is_empty() {
                let last = model.answers.len() - 1;
                model.selected_answer =
                    Some(model.selected_answer.map_or(0, |index| (index + 1).min(last)));
                model.reveal_selected = true;
            }
        }
        Message::SelectPrevAnswer => {
            if !model.answers.is_empty() {
                model.selected_answer =
                    Some(model.selected_answer.map_or(0, |index| index.saturating_sub(1)));
                model.reveal_selected = true;
            }
        }
        Message::ToggleQuestionUpvote => {
            if model.question.is_some() {
                model.question_upvoted = !model.question_upvoted;
            }
        }
        Message::ToggleAnswerVote => toggle_answer_vote(&mut model),
        Message::VoteRecorded(id) => {
            info!(%id, "vote recorded");
        }
        Message::VoteFailed { id, vote, error } => {
            warn!(%id, %error, "vote failed");
            model.answers.adjust_votes(&id, -vote.value());
            match vote {
                Vote::Up => model.voted_answers.remove(&id),
                Vote::Down => model.voted_answers.insert(id),
            };
            model.show_toast(ToastLevel::Error, format!("Vote failed: {error}"));
        }

        // Composer
        Message::Edit(command) => {
            if let Err(err) = model.composer.editor_mut().dispatch(command) {
                debug!(%err, "edit rejected");
            }
        }
        Message::ToolbarLink => {
            let Model {
                dialogs, composer, ..
            } = &mut model;
            dialogs.press_link(composer.editor_mut());
        }
        Message::ToolbarImage => model.dialogs.press_image(),
        Message::DialogInput(text) => {
            for ch in text.chars().filter(|ch| !ch.is_control()) {
                model.dialogs.push_char(ch);
            }
        }
        Message::DialogBackspace => model.dialogs.backspace(),
        Message::DialogCancel => model.dialogs.cancel(),
        Message::DialogConfirm => {
            let Model {
                dialogs, composer, ..
            } = &mut model;
            if let DialogOutcome::Rejected(err) = dialogs.confirm(composer.editor_mut()) {
                debug!(%err, "URL rejected");
            }
        }
        Message::Submit => {
            let Model {
                composer, answers, ..
            } = &mut model;
            if let Some(request) = composer.submit(answers, Utc::now()) {
                model.dialogs.cancel();
                model.editor_scroll = 0;
                model.selected_answer = Some(model.answers.len() - 1);
                model.reveal_selected = true;
                model.push_effect(Effect::PostAnswer(request));
            }
        }
        Message::SubmissionSucceeded(answer) => {
            let Model {
                composer, answers, ..
            } = &mut model;
            let result: Result<Answer, ApiError> = Ok(answer);
            if composer.complete(answers, result).is_ok() {
                if let Some(question) = model.question.as_mut() {
                    question.answer_count = question.answer_count.saturating_add(1);
                }
                model.show_toast(ToastLevel::Info, "Answer posted");
            }
        }
        Message::SubmissionFailed(error) => {
            let Model {
                composer, answers, ..
            } = &mut model;
            let result: Result<Answer, ApiError> = Err(error);
            if let Err(error) = composer.complete(answers, result) {
                model.clamp_selection();
                model.focus = Focus::Composer;
                model.show_toast(ToastLevel::Error, format!("Could not post answer: {error}"));
            }
        }

        // Window
        Message::SwitchFocus => {
            model.focus = match model.focus {
                Focus::Thread => Focus::Composer,
                Focus::Composer => Focus::Thread,
            };
        }
        Message::ToggleHelp => {
            model.help_visible = !model.help_visible;
        }
        Message::HideHelp => {
            model.help_visible = false;
        }
        Message::DismissToast => {
            model.dismiss_toast();
        }
        Message::Resize(width, height) => {
            model.terminal_size = (width, height);
        }
        Message::Quit => {
            model.should_quit = true;
        }
    }
    model
}

/// Upvote the highlighted answer, or take back an earlier upvote. The count
/// changes immediately and is rolled back if the backend refuses.
fn toggle_answer_vote(model: &mut Model) {
    let Some(answer) = model
        .selected_answer
        .and_then(|index| model.answers.get(index))
    else {
        return;
    };
    let id = answer.id.clone();
    if id.is_local() {
        model.show_toast(ToastLevel::Warning, "Answer is still being posted");
        return;
    }
    let vote = if model.voted_answers.remove(&id) {
        Vote::Down
    } else {
        model.voted_answers.insert(id.clone());
        Vote::Up
    };
    model.answers.adjust_votes(&id, vote.value());
    model.push_effect(Effect::VoteAnswer { id, vote });
}

/// Server answers, followed by any local answers still waiting for the
/// server.
fn merge_pending(current: &AnswerList, server: Vec<Answer>) -> AnswerList {
    let mut merged = AnswerList::from_answers(server);
    for answer in current.iter().filter(|answer| answer.id.is_local()) {
        merged.push(answer.clone());
    }
    merged
}
