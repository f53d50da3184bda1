//! Message Handler module for processing incoming Telegram messages

use anyhow::Result;
use std::sync::Arc;
use teloxide::prelude::*;
use teloxide::types::{ChatAction, Me, MessageId, ParseMode, User};
use teloxide::RequestError;
use tracing::{debug, error, warn};

// Import router types
use super::router::{classify_text, EventKind, InboundEvent, OutboundMessage, Reply, Router, Sender, TextFormat};

/// Build the router's view of a Telegram user
pub fn sender_from_user(user: &User) -> Sender {
    Sender {
        id: user.id.0,
        full_name: user.full_name(),
        language_code: user.language_code.clone(),
    }
}

/// Turn a Telegram message into an inbound event. Messages without a sender
/// (channel posts) are not user events and yield `None`.
pub fn inbound_from_message(msg: &Message, bot_username: &str) -> Option<InboundEvent> {
    let user = msg.from.as_ref()?;

    let kind = match msg.text() {
        Some(text) => classify_text(text, bot_username),
        None => EventKind::NonText,
    };

    Some(InboundEvent {
        chat_id: msg.chat.id.0,
        sender: sender_from_user(user),
        kind,
    })
}

async fn send_outbound(bot: &Bot, chat_id: ChatId, message: &OutboundMessage) -> Result<(), RequestError> {
    let mut request = bot.send_message(chat_id, message.text.clone());
    if message.format == TextFormat::Html {
        request = request.parse_mode(ParseMode::Html);
    }
    if let Some(keyboard) = &message.keyboard {
        request = request.reply_markup(keyboard.clone());
    }
    request.await?;
    Ok(())
}

async fn edit_outbound(
    bot: &Bot,
    chat_id: ChatId,
    message_id: MessageId,
    message: &OutboundMessage,
) -> Result<(), RequestError> {
    let mut request = bot.edit_message_text(chat_id, message_id, message.text.clone());
    if message.format == TextFormat::Html {
        request = request.parse_mode(ParseMode::Html);
    }
    if let Some(keyboard) = &message.keyboard {
        request = request.reply_markup(keyboard.clone());
    }
    request.await?;
    Ok(())
}

/// Send every message of a reply. Failures are logged, never propagated, so
/// one bad message cannot stop the dispatcher.
pub async fn deliver_reply(bot: &Bot, chat_id: ChatId, origin: Option<MessageId>, reply: Reply) {
    for message in &reply.messages {
        if let (true, Some(message_id)) = (message.replace_origin, origin) {
            match edit_outbound(bot, chat_id, message_id, message).await {
                Ok(()) => continue,
                Err(e) => {
                    warn!(chat_id = %chat_id, error = %e, "Failed to edit original message, sending a new one")
                }
            }
        }

        if let Err(e) = send_outbound(bot, chat_id, message).await {
            error!(chat_id = %chat_id, error = %e, "Failed to send reply message");
        }
    }
}

pub async fn message_handler(bot: Bot, msg: Message, me: Me, router: Arc<Router>) -> Result<()> {
    let Some(event) = inbound_from_message(&msg, me.username()) else {
        debug!(chat_id = %msg.chat.id, "Ignoring message without a sender");
        return Ok(());
    };

    debug!(user_id = event.sender.id, chat_id = %msg.chat.id, "Received message from user");

    if router.will_call_ai(&event).await {
        if let Err(e) = bot.send_chat_action(msg.chat.id, ChatAction::Typing).await {
            debug!(chat_id = %msg.chat.id, error = %e, "Failed to send typing action");
        }
    }

    let reply = router.dispatch(event).await;
    deliver_reply(&bot, msg.chat.id, None, reply).await;

    Ok(())
}
