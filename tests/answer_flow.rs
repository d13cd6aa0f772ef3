use chrono::Utc;

use ripple::api::{ApiError, MemoryApi, QaApi};
use ripple::composer::{AnswerComposer, AnswerList};
use ripple::document::{is_meaningful, sanitize_html};
use ripple::editor::Toggle;

fn loaded(api: &MemoryApi) -> AnswerList {
    AnswerList::from_answers(api.get_question("q1").unwrap().answers)
}

#[test]
fn test_formatted_answer_is_stored_sanitized() {
    let api = MemoryApi::sample("q1");
    let mut answers = loaded(&api);
    let mut composer = AnswerComposer::new("q1", "You", 50);

    let editor = composer.editor_mut();
    editor.insert_text("Use ");
    editor.toggle(Toggle::Bold);
    editor.insert_text("useEffect");
    editor.toggle(Toggle::Bold);
    editor.insert_text(" for side effects.");

    let request = composer.submit(&mut answers, Utc::now()).unwrap();
    assert_eq!(
        request.content,
        "<p>Use <strong>useEffect</strong> for side effects.</p>"
    );
    assert_eq!(sanitize_html(&request.content), request.content);

    let result = api.create_answer(&request.question_id, &request.content);
    composer.complete(&mut answers, result).unwrap();

    assert_eq!(answers.len(), 3);
    let stored = api.answers_for("q1");
    assert_eq!(stored.last().unwrap().text, request.content);
    assert_eq!(api.get_question("q1").unwrap().question.answer_count, 3);
}

#[test]
fn test_rejected_answer_rolls_back() {
    let api = MemoryApi::sample("q1");
    let mut answers = loaded(&api);
    let mut composer = AnswerComposer::new("q1", "You", 50);
    composer.editor_mut().insert_text("Keep hooks at the top level.");

    let request = composer.submit(&mut answers, Utc::now()).unwrap();
    assert_eq!(answers.len(), 3);

    api.fail_next(ApiError::Transport("connection refused".to_string()));
    let result = api.create_answer(&request.question_id, &request.content);
    assert!(composer.complete(&mut answers, result).is_err());

    assert_eq!(answers.len(), 2);
    assert!(!composer.is_submitting());
    assert_eq!(composer.draft(), "<p>Keep hooks at the top level.</p>");
    assert!(is_meaningful(&composer.draft()));
    assert_eq!(api.answers_for("q1").len(), 2);
}

#[test]
fn test_unsafe_markup_never_reaches_the_backend() {
    let api = MemoryApi::sample("q1");
    let mut answers = loaded(&api);
    let mut composer = AnswerComposer::new("q1", "You", 50);
    composer
        .editor_mut()
        .load_html("<p onclick=\"x()\">See <a href=\"javascript:alert(1)\">this</a></p><script>x()</script>");

    let request = composer.submit(&mut answers, Utc::now()).unwrap();
    assert_eq!(request.content, "<p>See this</p>");
}
