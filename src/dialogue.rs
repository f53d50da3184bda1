//! AI dialogue state machine.
//!
//! Two states: `Idle` and `AwaitingAiQuestion`. Entering the question loop is
//! guarded by the AI capability; once inside, every text message is a
//! question until the user sends `/done`.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::ai::AiCapability;
use crate::errors::{AiError, InputError};

/// Represents the conversation state for the AI dialogue
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum DialogState {
    #[default]
    Idle,
    AwaitingAiQuestion,
}

/// Inputs the dialog controller understands
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DialogEvent {
    /// The user asked to talk to the AI
    RequestAi,
    /// A message sent while in the dialogue; `None` when it carried no text
    Question(Option<String>),
    /// The user ended the dialogue
    Done,
}

/// What the controller wants the user to be told
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DialogOutcome {
    /// AI is not configured; the dialogue was not entered
    AiUnavailable,
    /// The dialogue is open and waiting for questions
    ReadyForQuestions,
    /// The provider's answer to a question
    Answer(String),
    /// The provider call failed; the user may try again
    AiFailed,
    /// The message was not a usable question
    InvalidQuestion(InputError),
    /// The dialogue was closed (or was already closed)
    Closed,
    /// A question arrived outside of the dialogue
    NotInDialog,
}

/// Result of feeding one event to the controller
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Transition {
    pub next: DialogState,
    pub outcome: DialogOutcome,
}

impl Transition {
    fn to(next: DialogState, outcome: DialogOutcome) -> Self {
        Self { next, outcome }
    }
}

/// Validates a question sent to the AI
pub fn validate_question(text: Option<&str>) -> Result<String, InputError> {
    let text = text.ok_or(InputError::NotText)?;
    let trimmed = text.trim();

    if trimmed.is_empty() {
        return Err(InputError::Empty);
    }

    Ok(trimmed.to_string())
}

/// Drives the AI question/answer loop
#[derive(Debug, Clone)]
pub struct DialogController {
    ai: AiCapability,
}

impl DialogController {
    pub fn new(ai: AiCapability) -> Self {
        Self { ai }
    }

    pub fn ai_available(&self) -> bool {
        self.ai.is_available()
    }

    /// Apply `event` to `state` and return the next state with its outcome
    pub async fn handle(&self, state: DialogState, event: DialogEvent) -> Transition {
        use DialogState::{AwaitingAiQuestion, Idle};

        debug!(state = ?state, event = ?event, "Dialog controller handling event");

        match (state, event) {
            (_, DialogEvent::RequestAi) => {
                if self.ai.is_available() {
                    Transition::to(AwaitingAiQuestion, DialogOutcome::ReadyForQuestions)
                } else {
                    Transition::to(Idle, DialogOutcome::AiUnavailable)
                }
            }
            (_, DialogEvent::Done) => Transition::to(Idle, DialogOutcome::Closed),
            (Idle, DialogEvent::Question(_)) => Transition::to(Idle, DialogOutcome::NotInDialog),
            (AwaitingAiQuestion, DialogEvent::Question(text)) => {
                let question = match validate_question(text.as_deref()) {
                    Ok(question) => question,
                    Err(e) => {
                        return Transition::to(AwaitingAiQuestion, DialogOutcome::InvalidQuestion(e));
                    }
                };

                match self.ai.ask(&question).await {
                    Ok(answer) => Transition::to(AwaitingAiQuestion, DialogOutcome::Answer(answer)),
                    Err(AiError::RequestFailed(_)) => {
                        Transition::to(AwaitingAiQuestion, DialogOutcome::AiFailed)
                    }
                    Err(AiError::Unconfigured) => {
                        info!("AI became unavailable mid-dialogue, closing it");
                        Transition::to(Idle, DialogOutcome::AiUnavailable)
                    }
                }
            }
        }
    }
}
