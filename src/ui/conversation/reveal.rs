//! Typewriter reveal for bot replies.
//!
//! [`Typewriter`] is the pure cursor over the text. [`RevealTimer`] is the
//! per-message recurring tick that drives it; dropping the timer aborts its
//! task, so no tick outlives the view that owns it.

use crate::conversation::MessageId;
use crate::events::{AppEvent, AppEventSender};
use std::time::Duration;
use tokio::task::AbortHandle;
use tokio::time::MissedTickBehavior;

/// Reveal cursor over one message's text, counted in characters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Typewriter {
    text: String,
    total: usize,
    cursor: usize,
}

impl Typewriter {
    pub fn new(text: impl Into<String>) -> Self {
        let text = text.into();
        let total = text.chars().count();
        Self {
            text,
            total,
            cursor: 0,
        }
    }

    /// Advance by one character. Returns false once the full text is shown.
    pub fn tick(&mut self) -> bool {
        if self.cursor >= self.total {
            return false;
        }
        self.cursor += 1;
        true
    }

    /// The prefix currently on screen.
    pub fn displayed(&self) -> &str {
        match self.text.char_indices().nth(self.cursor) {
            Some((end, _)) => &self.text[..end],
            None => &self.text,
        }
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn total(&self) -> usize {
        self.total
    }

    pub fn is_done(&self) -> bool {
        self.cursor >= self.total
    }
}

/// Owned handle to a recurring reveal tick for one message.
///
/// The task sends exactly `steps` [`AppEvent::RevealTick`]s, one per
/// `period`, then finishes. Dropping the handle cancels it.
#[derive(Debug)]
pub struct RevealTimer {
    handle: AbortHandle,
}

impl RevealTimer {
    /// Start ticking. Returns `None` when there is nothing to reveal.
    pub fn start(
        id: MessageId,
        steps: usize,
        period: Duration,
        tx: AppEventSender,
    ) -> Option<Self> {
        if steps == 0 {
            return None;
        }

        let task = tokio::spawn(async move {
            let mut interval = tokio::time::interval_at(tokio::time::Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

            for _ in 0..steps {
                interval.tick().await;
                if tx.send(AppEvent::RevealTick(id)).is_err() {
                    break;
                }
            }
        });

        Some(Self {
            handle: task.abort_handle(),
        })
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

impl Drop for RevealTimer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
