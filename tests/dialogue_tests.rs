mod common;

use common::ScriptedProvider;
use storefront::ai::AiCapability;
use storefront::dialogue::{DialogController, DialogEvent, DialogOutcome, DialogState};
use storefront::errors::{AiError, InputError};

fn question(text: &str) -> DialogEvent {
    DialogEvent::Question(Some(text.to_string()))
}

#[tokio::test]
async fn test_request_ai_enters_question_state() {
    let controller = DialogController::new(AiCapability::available(ScriptedProvider::new()));

    let transition = controller.handle(DialogState::Idle, DialogEvent::RequestAi).await;
    assert_eq!(transition.next, DialogState::AwaitingAiQuestion);
    assert_eq!(transition.outcome, DialogOutcome::ReadyForQuestions);
}

#[tokio::test]
async fn test_request_ai_again_stays_in_question_state() {
    let controller = DialogController::new(AiCapability::available(ScriptedProvider::new()));

    let transition = controller
        .handle(DialogState::AwaitingAiQuestion, DialogEvent::RequestAi)
        .await;
    assert_eq!(transition.next, DialogState::AwaitingAiQuestion);
    assert_eq!(transition.outcome, DialogOutcome::ReadyForQuestions);
}

#[tokio::test]
async fn test_question_is_answered_and_loop_continues() {
    let provider = ScriptedProvider::answering(&["Returns are accepted within 30 days."]);
    let controller = DialogController::new(AiCapability::available(provider.clone()));

    let transition = controller
        .handle(DialogState::AwaitingAiQuestion, question("  What is the return policy?  "))
        .await;

    assert_eq!(transition.next, DialogState::AwaitingAiQuestion);
    assert_eq!(
        transition.outcome,
        DialogOutcome::Answer("Returns are accepted within 30 days.".to_string())
    );
    // The question reaches the provider trimmed
    assert_eq!(provider.prompts(), vec!["What is the return policy?".to_string()]);
}

#[tokio::test]
async fn test_failed_request_keeps_dialogue_open() {
    let provider = ScriptedProvider::new();
    provider.push(Err(AiError::RequestFailed("HTTP 503".to_string())));
    provider.push(Ok("Second time lucky.".to_string()));
    let controller = DialogController::new(AiCapability::available(provider.clone()));

    let first = controller.handle(DialogState::AwaitingAiQuestion, question("Hi?")).await;
    assert_eq!(first.next, DialogState::AwaitingAiQuestion);
    assert_eq!(first.outcome, DialogOutcome::AiFailed);

    let second = controller.handle(first.next, question("Hi again?")).await;
    assert_eq!(second.outcome, DialogOutcome::Answer("Second time lucky.".to_string()));
    assert_eq!(provider.call_count(), 2);
}

#[tokio::test]
async fn test_invalid_questions_do_not_call_provider() {
    let provider = ScriptedProvider::answering(&["unused"]);
    let controller = DialogController::new(AiCapability::available(provider.clone()));

    let empty = controller.handle(DialogState::AwaitingAiQuestion, question("   ")).await;
    assert_eq!(empty.next, DialogState::AwaitingAiQuestion);
    assert_eq!(empty.outcome, DialogOutcome::InvalidQuestion(InputError::Empty));

    let not_text = controller
        .handle(DialogState::AwaitingAiQuestion, DialogEvent::Question(None))
        .await;
    assert_eq!(not_text.next, DialogState::AwaitingAiQuestion);
    assert_eq!(not_text.outcome, DialogOutcome::InvalidQuestion(InputError::NotText));

    assert_eq!(provider.call_count(), 0);
}

#[tokio::test]
async fn test_unconfigured_ai_never_leaves_idle() {
    let controller = DialogController::new(AiCapability::Unconfigured);

    for _ in 0..3 {
        let transition = controller.handle(DialogState::Idle, DialogEvent::RequestAi).await;
        assert_eq!(transition.next, DialogState::Idle);
        assert_eq!(transition.outcome, DialogOutcome::AiUnavailable);
    }
}

#[tokio::test]
async fn test_unconfigured_ai_inside_dialogue_returns_to_idle() {
    let controller = DialogController::new(AiCapability::Unconfigured);

    let transition = controller
        .handle(DialogState::AwaitingAiQuestion, question("Anyone there?"))
        .await;
    assert_eq!(transition.next, DialogState::Idle);
    assert_eq!(transition.outcome, DialogOutcome::AiUnavailable);
}

#[tokio::test]
async fn test_question_outside_dialogue_is_rejected() {
    let provider = ScriptedProvider::answering(&["unused"]);
    let controller = DialogController::new(AiCapability::available(provider.clone()));

    let transition = controller.handle(DialogState::Idle, question("Hello?")).await;
    assert_eq!(transition.next, DialogState::Idle);
    assert_eq!(transition.outcome, DialogOutcome::NotInDialog);
    assert_eq!(provider.call_count(), 0);
}

#[tokio::test]
async fn test_done_closes_from_any_state() {
    let controller = DialogController::new(AiCapability::available(ScriptedProvider::new()));

    for state in [DialogState::Idle, DialogState::AwaitingAiQuestion] {
        let transition = controller.handle(state, DialogEvent::Done).await;
        assert_eq!(transition.next, DialogState::Idle);
        assert_eq!(transition.outcome, DialogOutcome::Closed);
    }
}

#[test]
fn test_dialog_state_serialization() {
    let json = serde_json::to_string(&DialogState::AwaitingAiQuestion).unwrap();
    let state: DialogState = serde_json::from_str(&json).unwrap();
    assert_eq!(state, DialogState::AwaitingAiQuestion);
}
