//! # Storefront Telegram Bot
//!
//! A Telegram bot that lets users browse a small product catalog stored in
//! SQLite, or ask questions to an AI assistant in a two-state dialogue.

pub mod ai;
pub mod bot;
pub mod config;
pub mod db;
pub mod dialogue;
pub mod errors;
pub mod localization;
pub mod session;
