//! Rendering of a single message, including the typewriter reveal of bot replies.

use crate::conversation::{Message, MessageId, Sender};
use crate::events::AppEventSender;
use crate::ui::conversation::reveal::{RevealTimer, Typewriter};
use crate::ui::markdown::render_markdown;
use crate::ui::text::wrap_lines;
use ratatui::{
    layout::Alignment,
    style::{Color, Modifier, Style},
    text::{Line, Span},
};
use std::time::Duration;

/// View state for one message.
///
/// Bot messages own a [`Typewriter`] and the [`RevealTimer`] that drives it;
/// dropping the view cancels the timer.
#[derive(Debug)]
pub struct MessageView {
    message: Message,
    reveal: Option<Reveal>,
}

#[derive(Debug)]
struct Reveal {
    typewriter: Typewriter,
    timer: Option<RevealTimer>,
}

impl MessageView {
    /// Create the view and, for bot messages, start revealing.
    pub fn new(message: Message, period: Duration, tx: &AppEventSender) -> Self {
        let reveal = (message.sender() == Sender::Bot).then(|| {
            let typewriter = Typewriter::new(message.text());
            let timer = RevealTimer::start(message.id(), typewriter.total(), period, tx.clone());
            Reveal { typewriter, timer }
        });

        Self { message, reveal }
    }

    pub fn id(&self) -> MessageId {
        self.message.id()
    }

    /// Advance the reveal by one character. Returns true if the displayed
    /// text changed.
    pub fn tick(&mut self) -> bool {
        let Some(reveal) = self.reveal.as_mut() else {
            return false;
        };
        let changed = reveal.typewriter.tick();
        if reveal.typewriter.is_done() {
            reveal.timer = None;
        }
        changed
    }

    pub fn is_revealing(&self) -> bool {
        self.reveal
            .as_ref()
            .is_some_and(|reveal| !reveal.typewriter.is_done())
    }

    /// Whether a reveal timer is still held.
    pub fn has_timer(&self) -> bool {
        self.reveal.as_ref().is_some_and(|reveal| reveal.timer.is_some())
    }

    /// Text currently on screen: the revealed prefix for bot messages, the
    /// full text otherwise.
    pub fn displayed_text(&self) -> &str {
        match &self.reveal {
            Some(reveal) => reveal.typewriter.displayed(),
            None => self.message.text(),
        }
    }

    /// Render into wrapped lines for a transcript `width` columns wide.
    pub fn render_lines(&self, width: u16) -> Vec<Line<'static>> {
        let width = width as usize;
        let mut lines = vec![self.header_line()];

        let body = match self.message.sender() {
            Sender::Bot => self.bot_lines(),
            Sender::User => user_lines(self.message.text()),
            Sender::System => plain_lines(self.message.text(), Style::default().fg(Color::Yellow)),
        };
        lines.extend(wrap_lines(&body, width.saturating_sub(2).max(1)));

        if self.message.sender() != Sender::User {
            for line in lines.iter_mut().skip(1) {
                line.spans.insert(0, Span::raw("  "));
            }
        }

        lines
    }

    fn header_line(&self) -> Line<'static> {
        let timestamp = self.message.timestamp().format("%H:%M:%S").to_string();
        let header = format!("{} · {}", self.message.sender().label(), timestamp);
        let line = Line::from(Span::styled(header, Style::default().fg(Color::DarkGray)));

        match self.message.sender() {
            Sender::User => line.alignment(Alignment::Right),
            _ => line,
        }
    }

    fn bot_lines(&self) -> Vec<Line<'static>> {
        let mut lines = render_markdown(self.displayed_text(), Style::default().fg(Color::White));

        if self.is_revealing() {
            let cursor = Span::styled("▋", Style::default().fg(Color::Gray));
            match lines.last_mut() {
                Some(last) => last.spans.push(cursor),
                None => lines.push(Line::from(cursor)),
            }
        }

        lines
    }
}

/// User text: verbatim, right-aligned, inverted colors.
fn user_lines(text: &str) -> Vec<Line<'static>> {
    let style = Style::default()
        .fg(Color::Black)
        .bg(Color::White)
        .add_modifier(Modifier::BOLD);

    text.lines()
        .map(|line| Line::from(Span::styled(format!(" {line} "), style)).alignment(Alignment::Right))
        .collect()
}

/// Verbatim text, no markup interpretation.
fn plain_lines(text: &str, style: Style) -> Vec<Line<'static>> {
    text.lines()
        .map(|line| Line::from(Span::styled(line.to_string(), style)))
        .collect()
}
