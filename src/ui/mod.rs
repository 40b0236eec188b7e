pub mod conversation;
pub mod markdown;
pub mod text;
