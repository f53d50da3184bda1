//! Callback Handler module for processing inline keyboard callback queries

use anyhow::Result;
use std::sync::Arc;
use teloxide::prelude::*;
use teloxide::types::CallbackQuery;
use tracing::{debug, warn};

use super::message_handler::{deliver_reply, sender_from_user};
use super::router::{EventKind, InboundEvent, Router};

/// Handle callback queries from inline keyboards
pub async fn callback_handler(bot: Bot, q: CallbackQuery, router: Arc<Router>) -> Result<()> {
    debug!(user_id = %q.from.id, data = ?q.data, "Received callback query from user");

    // Answer the callback query to remove the loading state, whatever happens next
    if let Err(e) = bot.answer_callback_query(q.id.clone()).await {
        warn!(user_id = %q.from.id, error = %e, "Failed to answer callback query");
    }

    // Without the originating message, reply in the private chat with the user
    let (chat_id, origin) = match &q.message {
        Some(msg) => (msg.chat().id, Some(msg.id())),
        None => (ChatId(q.from.id.0 as i64), None),
    };

    let event = InboundEvent {
        chat_id: chat_id.0,
        sender: sender_from_user(&q.from),
        kind: EventKind::Callback(q.data.clone().unwrap_or_default()),
    };

    let reply = router.dispatch(event).await;
    deliver_reply(&bot, chat_id, origin, reply).await;

    Ok(())
}
