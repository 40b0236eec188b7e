//! Conversation transcript: one view per message, auto-scroll and rendering.

use crate::conversation::{Message, MessageId};
use crate::events::AppEventSender;
use crate::ui::conversation::message::MessageView;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget},
};
use std::cell::Cell;
use std::time::Duration;

/// Transcript of message views, kept in step with the controller's messages.
#[derive(Debug)]
pub struct ConversationHistory {
    views: Vec<MessageView>,
    reveal_interval: Duration,
    tx: AppEventSender,
    /// Lines scrolled up from the bottom; zero follows the newest message.
    scroll_from_bottom: usize,
    /// Furthest scroll possible at the last render.
    max_scroll: Cell<usize>,
}

impl ConversationHistory {
    pub fn new(reveal_interval: Duration, tx: AppEventSender) -> Self {
        Self {
            views: Vec::new(),
            reveal_interval,
            tx,
            scroll_from_bottom: 0,
            max_scroll: Cell::new(0),
        }
    }

    /// Bring the views in line with `messages`.
    ///
    /// Views whose message is gone are dropped (cancelling their reveal
    /// timers); new messages get a fresh view. Any change to the sequence
    /// scrolls back to the newest message. Returns true if anything changed.
    pub fn sync(&mut self, messages: &[Message]) -> bool {
        let unchanged = self.views.len() == messages.len()
            && self
                .views
                .iter()
                .zip(messages)
                .all(|(view, message)| view.id() == message.id());
        if unchanged {
            return false;
        }

        let mut old = std::mem::take(&mut self.views).into_iter().peekable();
        let mut views = Vec::with_capacity(messages.len());

        for message in messages {
            // Messages are append-only, so surviving views are a prefix.
            match old.next_if(|view| view.id() == message.id()) {
                Some(view) => views.push(view),
                None => views.push(MessageView::new(message.clone(), self.reveal_interval, &self.tx)),
            }
        }

        self.views = views;
        self.scroll_to_bottom();
        true
    }

    /// Apply one reveal tick. Ticks for unknown ids (already cleared) are ignored.
    pub fn tick(&mut self, id: MessageId) -> bool {
        self.views
            .iter_mut()
            .find(|view| view.id() == id)
            .is_some_and(MessageView::tick)
    }

    pub fn views(&self) -> &[MessageView] {
        &self.views
    }

    pub fn view(&self, id: MessageId) -> Option<&MessageView> {
        self.views.iter().find(|view| view.id() == id)
    }

    /// Number of reveal timers still held.
    pub fn active_timers(&self) -> usize {
        self.views.iter().filter(|view| view.has_timer()).count()
    }

    /// Scroll towards older messages, stopping at the top of what was last drawn.
    pub fn scroll_up(&mut self, lines: usize) {
        self.scroll_from_bottom = self
            .scroll_from_bottom
            .saturating_add(lines)
            .min(self.max_scroll.get());
    }

    pub fn scroll_down(&mut self, lines: usize) {
        self.scroll_from_bottom = self.scroll_from_bottom.saturating_sub(lines);
    }

    pub fn scroll_to_bottom(&mut self) {
        self.scroll_from_bottom = 0;
    }

    pub fn scroll_from_bottom(&self) -> usize {
        self.scroll_from_bottom
    }

    /// All transcript lines for a given inner width, with a blank line
    /// between messages.
    pub fn lines(&self, width: u16) -> Vec<Line<'static>> {
        let mut lines = Vec::new();
        for (i, view) in self.views.iter().enumerate() {
            if i > 0 {
                lines.push(Line::default());
            }
            lines.extend(view.render_lines(width));
        }
        lines
    }
}

impl Widget for &ConversationHistory {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = Block::default()
            .borders(Borders::TOP | Borders::BOTTOM)
            .border_style(Style::default().fg(Color::DarkGray));

        let inner_area = block.inner(area);
        block.render(area, buf);

        if self.views.is_empty() {
            self.max_scroll.set(0);
            let welcome_lines = vec![
                Line::from(Span::styled("Ask me anything.", Style::default().fg(Color::Gray))),
                Line::from(Span::styled(
                    "Press Enter to send, type /help for commands.",
                    Style::default().fg(Color::DarkGray),
                )),
            ];
            Paragraph::new(welcome_lines).render(inner_area, buf);
            return;
        }

        let lines = self.lines(inner_area.width);
        let height = inner_area.height as usize;
        let max_offset = lines.len().saturating_sub(height);
        self.max_scroll.set(max_offset);
        let top = max_offset.saturating_sub(self.scroll_from_bottom.min(max_offset));

        Paragraph::new(lines)
            .scroll((top.min(u16::MAX as usize) as u16, 0))
            .render(inner_area, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conversation::{Conversation, Sender};
    use ratatui::{Terminal, backend::TestBackend};
    use tokio::sync::mpsc;

    fn history() -> ConversationHistory {
        let (tx, _rx) = mpsc::unbounded_channel();
        ConversationHistory::new(Duration::from_millis(20), tx)
    }

    fn screen(terminal: &Terminal<TestBackend>) -> String {
        let buffer = terminal.backend().buffer();
        let mut out = String::new();
        for y in 0..buffer.area.height {
            for x in 0..buffer.area.width {
                out.push_str(buffer.get(x, y).symbol());
            }
            out.push('\n');
        }
        out
    }

    fn filled_conversation(count: usize) -> Conversation {
        let mut conversation = Conversation::new();
        for i in 0..count {
            conversation.push(Sender::System, format!("message {i}"));
        }
        conversation
    }

    fn draw(history: &ConversationHistory, width: u16, height: u16) -> Terminal<TestBackend> {
        let mut terminal = Terminal::new(TestBackend::new(width, height)).unwrap();
        terminal
            .draw(|frame| frame.render_widget(history, frame.size()))
            .unwrap();
        terminal
    }

    #[tokio::test]
    async fn scroll_up_stops_at_the_oldest_line() {
        let mut history = history();
        history.sync(filled_conversation(10).messages());
        draw(&history, 30, 8);

        history.scroll_up(1_000);
        let top = history.scroll_from_bottom();
        assert!(top > 0 && top < 1_000);

        history.scroll_up(5);
        assert_eq!(history.scroll_from_bottom(), top);

        history.scroll_down(5);
        assert_eq!(history.scroll_from_bottom(), top - 5);

        history.scroll_up(5);
        let screen = screen(&draw(&history, 30, 8));
        assert!(screen.contains("message 0"));
    }

    #[tokio::test]
    async fn nothing_to_scroll_before_first_draw() {
        let mut history = history();
        history.sync(filled_conversation(10).messages());

        history.scroll_up(3);
        assert_eq!(history.scroll_from_bottom(), 0);
    }

    #[tokio::test]
    async fn sync_keeps_existing_views() {
        let mut history = history();
        let mut conversation = Conversation::new();
        conversation.push(Sender::Bot, "first answer");
        history.sync(conversation.messages());

        let id = conversation.messages()[0].id();
        history.tick(id);
        history.tick(id);

        conversation.push(Sender::User, "next");
        assert!(history.sync(conversation.messages()));
        assert_eq!(history.views().len(), 2);
        assert_eq!(history.view(id).unwrap().displayed_text(), "fi");
    }

    #[tokio::test]
    async fn clearing_drops_views_and_timers() {
        let mut history = history();
        let mut conversation = Conversation::new();
        conversation.push(Sender::Bot, "revealing slowly");
        history.sync(conversation.messages());
        assert_eq!(history.active_timers(), 1);

        let id = conversation.messages()[0].id();
        conversation.clear();
        assert!(history.sync(conversation.messages()));

        assert!(history.views().is_empty());
        assert_eq!(history.active_timers(), 0);
        assert!(!history.tick(id));
    }

    #[tokio::test]
    async fn unchanged_sync_is_a_noop() {
        let mut history = history();
        let conversation = filled_conversation(10);
        assert!(history.sync(conversation.messages()));
        draw(&history, 30, 8);

        history.scroll_up(3);
        assert!(!history.sync(conversation.messages()));
        assert_eq!(history.scroll_from_bottom(), 3);
    }

    #[tokio::test]
    async fn new_message_scrolls_to_bottom() {
        let mut history = history();
        let mut conversation = filled_conversation(10);
        history.sync(conversation.messages());
        draw(&history, 30, 8);
        history.scroll_up(10);
        assert_eq!(history.scroll_from_bottom(), 10);

        conversation.push(Sender::System, "warning");
        history.sync(conversation.messages());
        assert_eq!(history.scroll_from_bottom(), 0);
    }

    #[tokio::test]
    async fn renders_newest_messages_at_bottom() {
        let mut history = history();
        let mut conversation = Conversation::new();
        for i in 0..10 {
            conversation.push(Sender::System, format!("message {i}"));
        }
        history.sync(conversation.messages());

        let mut terminal = Terminal::new(TestBackend::new(30, 8)).unwrap();
        terminal
            .draw(|frame| frame.render_widget(&history, frame.size()))
            .unwrap();

        let screen = screen(&terminal);
        assert!(screen.contains("message 9"));
        assert!(!screen.contains("message 0"));
    }

    #[tokio::test]
    async fn empty_history_shows_welcome() {
        let history = history();
        let mut terminal = Terminal::new(TestBackend::new(60, 6)).unwrap();
        terminal
            .draw(|frame| frame.render_widget(&history, frame.size()))
            .unwrap();

        assert!(screen(&terminal).contains("Ask me anything."));
    }
}
