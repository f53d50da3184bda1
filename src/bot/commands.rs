//! Bot commands

use teloxide::utils::command::BotCommands;

#[derive(BotCommands, Clone, Debug, PartialEq, Eq)]
#[command(rename_rule = "lowercase", description = "Supported commands:")]
pub enum Command {
    #[command(description = "show the main menu.")]
    Start,
    #[command(description = "show this help.")]
    Help,
    #[command(description = "finish the conversation with the AI.")]
    Done,
}
