//! Bot module for handling Telegram interactions
//!
//! This module is split into several submodules:
//! - `router`: Classifies inbound events and dispatches them (no Telegram I/O)
//! - `message_handler`: Turns incoming messages into events and delivers replies
//! - `callback_handler`: Handles inline keyboard callback queries
//! - `ui_builder`: Creates keyboards and formats messages
//! - `commands`: The bot's slash commands

pub mod callback_handler;
pub mod commands;
pub mod message_handler;
pub mod router;
pub mod ui_builder;

use teloxide::dispatching::UpdateHandler;
use teloxide::prelude::*;

// Re-export main handler functions for use in main.rs
pub use callback_handler::callback_handler;
pub use commands::Command;
pub use message_handler::message_handler;
pub use router::{InboundEvent, Reply, Router};

/// The dispatcher's update tree: messages and button presses
pub fn schema() -> UpdateHandler<anyhow::Error> {
    dptree::entry()
        .branch(Update::filter_message().endpoint(message_handler))
        .branch(Update::filter_callback_query().endpoint(callback_handler))
}
