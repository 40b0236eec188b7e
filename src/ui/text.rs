//! Word wrapping for styled lines.

use ratatui::text::{Line, Span};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Wrap one styled line to `width` display columns.
///
/// Breaks at whitespace where possible and splits words longer than the
/// width. Styles and the line's alignment carry over to every piece. A zero
/// width returns the line unchanged.
pub fn wrap_line(line: &Line<'static>, width: usize) -> Vec<Line<'static>> {
    if width == 0 || line.width() <= width {
        return vec![line.clone()];
    }

    let mut wrapper = Wrapper::new(width);
    for span in &line.spans {
        for token in split_words(&span.content) {
            wrapper.push_token(Span::styled(token.to_string(), span.style));
        }
    }

    wrapper
        .finish()
        .into_iter()
        .map(|spans| {
            let mut wrapped = Line::from(spans);
            wrapped.style = line.style;
            wrapped.alignment = line.alignment;
            wrapped
        })
        .collect()
}

/// Wrap every line in `lines`.
pub fn wrap_lines(lines: &[Line<'static>], width: usize) -> Vec<Line<'static>> {
    lines.iter().flat_map(|line| wrap_line(line, width)).collect()
}

/// Split into alternating runs of whitespace and non-whitespace.
fn split_words(text: &str) -> Vec<&str> {
    let mut tokens = Vec::new();
    let mut start = 0;
    let mut in_space = None;

    for (idx, ch) in text.char_indices() {
        let space = ch.is_whitespace();
        if in_space.is_some_and(|prev| prev != space) {
            tokens.push(&text[start..idx]);
            start = idx;
        }
        in_space = Some(space);
    }
    if start < text.len() {
        tokens.push(&text[start..]);
    }
    tokens
}

struct Wrapper {
    width: usize,
    lines: Vec<Vec<Span<'static>>>,
    current: Vec<Span<'static>>,
    current_width: usize,
}

impl Wrapper {
    fn new(width: usize) -> Self {
        Self {
            width,
            lines: Vec::new(),
            current: Vec::new(),
            current_width: 0,
        }
    }

    fn push_token(&mut self, token: Span<'static>) {
        let token_width = token.content.width();
        let is_space = token.content.chars().all(char::is_whitespace);

        if self.current_width + token_width <= self.width {
            self.current_width += token_width;
            self.current.push(token);
            return;
        }

        if is_space {
            // Whitespace at a break point is dropped.
            self.flush();
            return;
        }

        if !self.current.is_empty() && token_width <= self.width {
            self.flush();
            self.current_width = token_width;
            self.current.push(token);
            return;
        }

        self.push_split(token);
    }

    /// Hard-split a token wider than the remaining space.
    fn push_split(&mut self, token: Span<'static>) {
        let mut piece = String::new();
        for ch in token.content.chars() {
            let ch_width = ch.width().unwrap_or(0);
            if self.current_width + ch_width > self.width && (self.current_width > 0 || !piece.is_empty()) {
                if !piece.is_empty() {
                    self.current.push(Span::styled(std::mem::take(&mut piece), token.style));
                }
                self.flush();
            }
            piece.push(ch);
            self.current_width += ch_width;
        }
        if !piece.is_empty() {
            self.current.push(Span::styled(piece, token.style));
        }
    }

    fn flush(&mut self) {
        // Trailing whitespace is not worth a column.
        while self
            .current
            .last()
            .is_some_and(|span| span.content.chars().all(char::is_whitespace))
        {
            self.current.pop();
        }
        self.lines.push(std::mem::take(&mut self.current));
        self.current_width = 0;
    }

    fn finish(mut self) -> Vec<Vec<Span<'static>>> {
        if !self.current.is_empty() {
            self.flush();
        }
        self.lines
    }
}
