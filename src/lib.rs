//! PockeTalk: a terminal chat client for a remote answering service.

pub mod app;
pub mod client;
pub mod config;
pub mod conversation;
pub mod error;
pub mod events;
pub mod logging;
pub mod ui;
