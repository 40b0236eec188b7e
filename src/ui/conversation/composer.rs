use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{
        Block, Borders, Paragraph, Widget,
        block::{Position, Title},
    },
};

/// Result returned when the user interacts with the composer
#[derive(Debug, PartialEq, Eq)]
pub enum ComposerAction {
    /// Enter was pressed; carries the raw, untrimmed input
    Submit(String),
    None,
}

/// Single-line text input with a character cursor
#[derive(Debug, Clone, Default)]
pub struct ConversationComposer {
    content: String,
    /// Cursor position in characters, not bytes
    cursor: usize,
    has_focus: bool,
}

impl ConversationComposer {
    pub fn new() -> Self {
        Self {
            has_focus: true,
            ..Self::default()
        }
    }

    /// Handle key input
    pub fn handle_key(&mut self, key: KeyEvent) -> ComposerAction {
        if key.kind != KeyEventKind::Press {
            return ComposerAction::None;
        }

        match key.code {
            KeyCode::Enter => return ComposerAction::Submit(self.content.clone()),
            KeyCode::Char(c) if !key.modifiers.intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) => {
                self.insert_char(c);
            }
            KeyCode::Backspace => self.backspace(),
            KeyCode::Delete => self.delete(),
            KeyCode::Left => self.cursor = self.cursor.saturating_sub(1),
            KeyCode::Right => self.cursor = (self.cursor + 1).min(self.char_len()),
            KeyCode::Home => self.cursor = 0,
            KeyCode::End => self.cursor = self.char_len(),
            _ => {}
        }

        ComposerAction::None
    }

    /// Insert pasted text at the cursor; line breaks become spaces.
    pub fn insert_str(&mut self, text: &str) {
        for c in text.chars() {
            self.insert_char(if c == '\n' || c == '\r' { ' ' } else { c });
        }
    }

    fn char_len(&self) -> usize {
        self.content.chars().count()
    }

    fn byte_index(&self, char_index: usize) -> usize {
        self.content
            .char_indices()
            .nth(char_index)
            .map_or(self.content.len(), |(i, _)| i)
    }

    fn insert_char(&mut self, c: char) {
        let at = self.byte_index(self.cursor);
        self.content.insert(at, c);
        self.cursor += 1;
    }

    fn backspace(&mut self) {
        if self.cursor == 0 {
            return;
        }
        self.cursor -= 1;
        let at = self.byte_index(self.cursor);
        self.content.remove(at);
    }

    fn delete(&mut self) {
        if self.cursor < self.char_len() {
            let at = self.byte_index(self.cursor);
            self.content.remove(at);
        }
    }

    pub fn set_focus(&mut self, has_focus: bool) {
        self.has_focus = has_focus;
    }

    pub fn has_focus(&self) -> bool {
        self.has_focus
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn clear(&mut self) {
        self.content.clear();
        self.cursor = 0;
    }
}

/// Renders the composer; `can_send` dims the send hint when submitting is disabled.
pub struct ComposerWidget<'a> {
    composer: &'a ConversationComposer,
    can_send: bool,
}

impl<'a> ComposerWidget<'a> {
    pub fn new(composer: &'a ConversationComposer, can_send: bool) -> Self {
        Self { composer, can_send }
    }
}

impl Widget for ComposerWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let composer = self.composer;

        let send_hint = if self.can_send {
            Span::styled(" ⏎ send ", Style::default().fg(Color::Black).bg(Color::White))
        } else {
            Span::styled(" ⏎ send ", Style::default().fg(Color::DarkGray))
        };

        let block = Block::default()
            .borders(Borders::ALL)
            .title(
                Title::from(send_hint)
                    .position(Position::Bottom)
                    .alignment(Alignment::Right),
            )
            .border_style(if composer.has_focus {
                Style::default().fg(Color::Gray)
            } else {
                Style::default().fg(Color::DarkGray)
            });

        let inner = block.inner(area);
        block.render(area, buf);

        if composer.content.is_empty() {
            let mut spans = Vec::new();
            if composer.has_focus {
                spans.push(Span::styled("▌", Style::default().fg(Color::White)));
            }
            spans.push(Span::styled(
                "Type Message...or Type /help",
                Style::default().fg(Color::DarkGray),
            ));
            Paragraph::new(Line::from(spans)).render(inner, buf);
            return;
        }

        let chars: Vec<char> = composer.content.chars().collect();
        let width = inner.width.max(1) as usize;
        // Keep the cursor visible on long input.
        let start = composer.cursor.saturating_sub(width.saturating_sub(1));
        let before: String = chars[start..composer.cursor].iter().collect();
        let after: String = chars[composer.cursor..].iter().collect();

        let mut spans = vec![Span::raw(before)];
        if composer.has_focus {
            spans.push(Span::styled("▌", Style::default().add_modifier(Modifier::SLOW_BLINK)));
        }
        spans.push(Span::raw(after));

        Paragraph::new(Line::from(spans)).render(inner, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn type_text(composer: &mut ConversationComposer, text: &str) {
        for c in text.chars() {
            composer.handle_key(key(KeyCode::Char(c)));
        }
    }

    #[test]
    fn enter_submits_raw_content() {
        let mut composer = ConversationComposer::new();
        type_text(&mut composer, "  hello ");

        assert_eq!(
            composer.handle_key(key(KeyCode::Enter)),
            ComposerAction::Submit("  hello ".to_string())
        );
        // The controller decides whether to clear.
        assert_eq!(composer.content(), "  hello ");
    }

    #[test]
    fn editing_respects_multibyte_chars() {
        let mut composer = ConversationComposer::new();
        type_text(&mut composer, "héllo");
        composer.handle_key(key(KeyCode::Left));
        composer.handle_key(key(KeyCode::Left));
        composer.handle_key(key(KeyCode::Backspace));
        assert_eq!(composer.content(), "hélo");

        composer.handle_key(key(KeyCode::Home));
        composer.handle_key(key(KeyCode::Delete));
        assert_eq!(composer.content(), "élo");

        composer.handle_key(key(KeyCode::End));
        type_text(&mut composer, "!");
        assert_eq!(composer.content(), "élo!");
        assert_eq!(composer.cursor(), 4);
    }

    #[test]
    fn control_chords_do_not_insert() {
        let mut composer = ConversationComposer::new();
        composer.handle_key(KeyEvent::new(KeyCode::Char('l'), KeyModifiers::CONTROL));
        assert_eq!(composer.content(), "");
    }

    #[test]
    fn release_events_are_ignored() {
        let mut composer = ConversationComposer::new();
        let mut release = key(KeyCode::Char('x'));
        release.kind = KeyEventKind::Release;
        composer.handle_key(release);
        assert_eq!(composer.content(), "");
    }

    #[test]
    fn paste_flattens_newlines() {
        let mut composer = ConversationComposer::new();
        composer.insert_str("one\ntwo");
        assert_eq!(composer.content(), "one two");
    }

    #[test]
    fn clear_resets_cursor() {
        let mut composer = ConversationComposer::new();
        type_text(&mut composer, "abc");
        composer.clear();
        assert_eq!(composer.content(), "");
        assert_eq!(composer.cursor(), 0);
    }
}
