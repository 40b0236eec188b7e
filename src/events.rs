use crate::conversation::MessageId;
use crate::error::ClientError;
use crate::ui::conversation::OutboundRequest;

/// Internal application events delivered to the UI loop from spawned tasks
#[derive(Debug)]
pub enum AppEvent {
    /// A call to the answering service finished
    AnswerReady {
        request: OutboundRequest,
        result: Result<String, ClientError>,
    },

    /// One typewriter step is due for a bot message
    RevealTick(MessageId),
}

pub type AppEventSender = tokio::sync::mpsc::UnboundedSender<AppEvent>;
pub type AppEventReceiver = tokio::sync::mpsc::UnboundedReceiver<AppEvent>;
