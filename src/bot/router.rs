//! Command Router module
//!
//! Classifies every inbound event as a command, a button press, a text
//! message or a non-text message, and dispatches it to the start/help
//! responders, the catalog responder, the dialog controller or the
//! unknown-input fallback. Every event produces exactly one [`Reply`].
//!
//! The router knows nothing about Telegram I/O; the handlers in
//! `message_handler` and `callback_handler` translate in both directions.

use teloxide::types::InlineKeyboardMarkup;
use teloxide::utils::command::BotCommands;
use tracing::{debug, info, warn};

use crate::db::CatalogStore;
use crate::dialogue::{DialogController, DialogEvent, DialogOutcome, DialogState};
use crate::errors::InputError;
use crate::localization::{t_args_lang, t_lang};
use crate::session::{SessionKey, SessionStore};

use super::commands::Command;
use super::ui_builder::{
    create_main_menu_keyboard, format_product_list, format_user_mention, split_long_message,
    CALLBACK_ASK_AI, CALLBACK_SHOW_PRODUCTS, TELEGRAM_MESSAGE_LIMIT,
};

/// Actions behind the main menu buttons
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CallbackAction {
    ShowProducts,
    AskAi,
}

impl CallbackAction {
    pub fn parse(data: &str) -> Option<Self> {
        match data {
            CALLBACK_SHOW_PRODUCTS => Some(Self::ShowProducts),
            CALLBACK_ASK_AI => Some(Self::AskAi),
            _ => None,
        }
    }
}

/// The kind of an inbound event
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EventKind {
    Command(Command),
    /// Slash-prefixed text that is not one of our commands
    UnknownCommand(String),
    /// Button press carrying its callback data
    Callback(String),
    Text(String),
    /// A message without text (photo, sticker, voice, ...)
    NonText,
}

impl EventKind {
    fn label(&self) -> &'static str {
        match self {
            Self::Command(_) => "command",
            Self::UnknownCommand(_) => "unknown_command",
            Self::Callback(_) => "callback",
            Self::Text(_) => "text",
            Self::NonText => "non_text",
        }
    }
}

/// Classify the text of a message
pub fn classify_text(text: &str, bot_username: &str) -> EventKind {
    if !text.starts_with('/') {
        return EventKind::Text(text.to_string());
    }

    match Command::parse(text, bot_username) {
        Ok(command) => EventKind::Command(command),
        Err(_) => EventKind::UnknownCommand(text.to_string()),
    }
}

/// Who sent an event
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Sender {
    pub id: u64,
    pub full_name: String,
    pub language_code: Option<String>,
}

/// An event delivered by the transport
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InboundEvent {
    pub chat_id: i64,
    pub sender: Sender,
    pub kind: EventKind,
}

impl InboundEvent {
    pub fn session_key(&self) -> SessionKey {
        SessionKey::new(self.chat_id, self.sender.id)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TextFormat {
    Plain,
    Html,
}

/// One message to send back
#[derive(Clone, Debug, PartialEq)]
pub struct OutboundMessage {
    pub text: String,
    pub format: TextFormat,
    pub keyboard: Option<InlineKeyboardMarkup>,
    /// Replace the text of the message whose button triggered the event
    pub replace_origin: bool,
}

impl OutboundMessage {
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            format: TextFormat::Plain,
            keyboard: None,
            replace_origin: false,
        }
    }

    pub fn html(text: impl Into<String>) -> Self {
        Self {
            format: TextFormat::Html,
            ..Self::plain(text)
        }
    }

    pub fn with_keyboard(mut self, keyboard: InlineKeyboardMarkup) -> Self {
        self.keyboard = Some(keyboard);
        self
    }

    pub fn replacing_origin(mut self) -> Self {
        self.replace_origin = true;
        self
    }
}

/// The complete response to one inbound event
#[derive(Clone, Debug, PartialEq)]
pub struct Reply {
    pub messages: Vec<OutboundMessage>,
}

impl Reply {
    fn new(messages: Vec<OutboundMessage>) -> Self {
        Self { messages }
    }

    fn single(message: OutboundMessage) -> Self {
        Self::new(vec![message])
    }

    /// Concatenated text of every message, mostly useful in tests and logs
    pub fn text(&self) -> String {
        self.messages
            .iter()
            .map(|message| message.text.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Whether any message offers the main menu
    pub fn has_keyboard(&self) -> bool {
        self.messages.iter().any(|message| message.keyboard.is_some())
    }
}

/// Routes inbound events to their handlers
#[derive(Debug, Clone)]
pub struct Router {
    catalog: CatalogStore,
    dialog: DialogController,
    sessions: SessionStore,
}

impl Router {
    pub fn new(catalog: CatalogStore, dialog: DialogController, sessions: SessionStore) -> Self {
        Self {
            catalog,
            dialog,
            sessions,
        }
    }

    pub async fn session_state(&self, key: SessionKey) -> DialogState {
        self.sessions.state(key).await
    }

    /// Whether dispatching `event` will call the AI provider
    pub async fn will_call_ai(&self, event: &InboundEvent) -> bool {
        match &event.kind {
            EventKind::Text(text) if !text.trim().is_empty() => {
                self.dialog.ai_available()
                    && self.session_state(event.session_key()).await == DialogState::AwaitingAiQuestion
            }
            _ => false,
        }
    }

    /// Handle one inbound event and produce its reply
    pub async fn dispatch(&self, event: InboundEvent) -> Reply {
        let key = event.session_key();
        let state = self.sessions.state(key).await;
        let InboundEvent { sender, kind, .. } = event;
        let language_code = sender.language_code.as_deref();

        debug!(
            user_id = sender.id,
            chat_id = key.chat_id,
            event = kind.label(),
            state = ?state,
            "Dispatching event"
        );

        match kind {
            EventKind::Command(Command::Start) => self.start(&sender),
            EventKind::Command(Command::Help) => self.help(language_code),
            EventKind::Command(Command::Done) => {
                self.run_dialog(key, state, DialogEvent::Done, language_code).await
            }
            EventKind::Callback(data) => match CallbackAction::parse(&data) {
                Some(CallbackAction::ShowProducts) => self.show_catalog(language_code).await,
                Some(CallbackAction::AskAi) => {
                    self.run_dialog(key, state, DialogEvent::RequestAi, language_code).await
                }
                None => {
                    warn!(user_id = sender.id, data = %data, "Unknown callback data");
                    self.unknown_input(language_code)
                }
            },
            // Inside the AI dialogue every message is a question
            EventKind::Text(text) if state == DialogState::AwaitingAiQuestion => {
                self.run_dialog(key, state, DialogEvent::Question(Some(text)), language_code)
                    .await
            }
            EventKind::NonText if state == DialogState::AwaitingAiQuestion => {
                self.run_dialog(key, state, DialogEvent::Question(None), language_code).await
            }
            EventKind::Text(_) | EventKind::NonText | EventKind::UnknownCommand(_) => {
                info!(user_id = sender.id, "Unknown command or message");
                self.unknown_input(language_code)
            }
        }
    }

    fn start(&self, sender: &Sender) -> Reply {
        let language_code = sender.language_code.as_deref();
        info!(user_id = sender.id, name = %sender.full_name, "User started the bot");

        let mention = format_user_mention(sender.id, &sender.full_name);
        let greeting = t_args_lang("start-greeting", &[("mention", mention.as_str())], language_code);

        Reply::single(
            OutboundMessage::html(greeting).with_keyboard(create_main_menu_keyboard(language_code)),
        )
    }

    fn help(&self, language_code: Option<&str>) -> Reply {
        Reply::single(
            OutboundMessage::plain(t_lang("help-text", language_code))
                .with_keyboard(create_main_menu_keyboard(language_code)),
        )
    }

    async fn show_catalog(&self, language_code: Option<&str>) -> Reply {
        let products = self.catalog.list_products().await;

        let mut messages: Vec<OutboundMessage> = if products.is_empty() {
            vec![OutboundMessage::plain(t_lang("catalog-empty", language_code))]
        } else {
            split_long_message(&format_product_list(&products, language_code), TELEGRAM_MESSAGE_LIMIT)
                .into_iter()
                .map(OutboundMessage::html)
                .collect()
        };

        if let Some(first) = messages.first_mut() {
            first.replace_origin = true;
        }

        messages.push(
            OutboundMessage::plain(t_lang("choose-next-action", language_code))
                .with_keyboard(create_main_menu_keyboard(language_code)),
        );

        Reply::new(messages)
    }

    fn unknown_input(&self, language_code: Option<&str>) -> Reply {
        Reply::single(
            OutboundMessage::plain(t_lang("unknown-input", language_code))
                .with_keyboard(create_main_menu_keyboard(language_code)),
        )
    }

    async fn run_dialog(
        &self,
        key: SessionKey,
        state: DialogState,
        event: DialogEvent,
        language_code: Option<&str>,
    ) -> Reply {
        let transition = self.dialog.handle(state, event).await;

        if transition.next != state {
            info!(
                user_id = key.user_id,
                chat_id = key.chat_id,
                from = ?state,
                to = ?transition.next,
                "Dialog state changed"
            );
        }
        self.sessions.set_state(key, transition.next).await;

        match transition.outcome {
            DialogOutcome::AiUnavailable => {
                Reply::single(OutboundMessage::plain(t_lang("ai-unavailable", language_code)))
            }
            DialogOutcome::ReadyForQuestions => Reply::new(vec![
                OutboundMessage::plain(t_lang("ai-ready", language_code)),
                OutboundMessage::plain(t_lang("choose-next-action", language_code))
                    .with_keyboard(create_main_menu_keyboard(language_code)),
            ]),
            DialogOutcome::Answer(answer) => {
                let messages: Vec<OutboundMessage> = split_long_message(&answer, TELEGRAM_MESSAGE_LIMIT)
                    .into_iter()
                    .map(OutboundMessage::plain)
                    .collect();
                if messages.is_empty() {
                    Reply::single(OutboundMessage::plain(t_lang("ai-failed", language_code)))
                } else {
                    Reply::new(messages)
                }
            }
            DialogOutcome::AiFailed => {
                Reply::single(OutboundMessage::plain(t_lang("ai-failed", language_code)))
            }
            DialogOutcome::InvalidQuestion(InputError::NotText) => {
                Reply::single(OutboundMessage::plain(t_lang("ai-question-not-text", language_code)))
            }
            DialogOutcome::InvalidQuestion(InputError::Empty) => {
                Reply::single(OutboundMessage::plain(t_lang("ai-question-empty", language_code)))
            }
            DialogOutcome::Closed => Reply::single(
                OutboundMessage::plain(t_lang("ai-done", language_code))
                    .with_keyboard(create_main_menu_keyboard(language_code)),
            ),
            DialogOutcome::NotInDialog => self.unknown_input(language_code),
        }
    }
}
