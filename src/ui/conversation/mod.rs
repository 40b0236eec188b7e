//! Conversation UI components for the chat screen

pub mod commands;
pub mod composer;
pub mod controller;
pub mod history;
pub mod message;
pub mod overlay;
pub mod reveal;

pub use commands::{SlashCommand, command_entries, parse_slash_command};
pub use composer::{ComposerWidget, ConversationComposer};
pub use controller::{
    ControllerAction, ConversationController, FAILURE_WARNING, OutboundRequest, SubmitOutcome,
};
pub use history::ConversationHistory;
pub use message::MessageView;
pub use overlay::{OverlayMode, OverlayWidget};
pub use reveal::{RevealTimer, Typewriter};
