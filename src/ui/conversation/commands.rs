use std::str::FromStr;

use strum::{AsRefStr, EnumIter, EnumString, IntoEnumIterator, IntoStaticStr};

/// Commands handled locally instead of being sent to the answering service.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, EnumString, EnumIter, AsRefStr, IntoStaticStr,
)]
#[strum(serialize_all = "kebab-case")]
pub enum SlashCommand {
    /// Clear the chat
    Clear,
    /// Show available commands
    Help,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandEntry {
    pub command: SlashCommand,
    pub keyword: &'static str,
    pub description: &'static str,
}

impl SlashCommand {
    /// User-visible description shown in help.
    pub fn description(self) -> &'static str {
        match self {
            SlashCommand::Clear => "Clear the chat",
            SlashCommand::Help => "Show available commands",
        }
    }

    /// Command string without the leading '/'.
    pub fn command(self) -> &'static str {
        self.into()
    }
}

/// The command reference shown by `/help`.
pub fn command_entries() -> Vec<CommandEntry> {
    SlashCommand::iter()
        .map(|command| CommandEntry {
            command,
            keyword: command.command(),
            description: command.description(),
        })
        .collect()
}

/// Parse an already-trimmed input as a slash command.
///
/// Only the exact literal (`/clear`, `/help`) matches; anything else,
/// including `/clear now` or `/CLEAR`, is ordinary text for the service.
pub fn parse_slash_command(input: &str) -> Option<SlashCommand> {
    let name = input.strip_prefix('/')?;
    SlashCommand::from_str(name).ok()
}
