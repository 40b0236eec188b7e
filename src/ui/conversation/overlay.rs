//! Modal overlays drawn over the conversation.

use crate::ui::conversation::commands::command_entries;
use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Widget, Wrap},
};

/// Which modal, if any, is presented. Exactly one mode at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OverlayMode {
    #[default]
    Normal,
    ClearConfirm,
    Help,
}

impl OverlayMode {
    pub fn is_open(self) -> bool {
        self != OverlayMode::Normal
    }
}

/// Renders the overlay for a mode; `Normal` draws nothing.
pub struct OverlayWidget {
    mode: OverlayMode,
}

impl OverlayWidget {
    pub fn new(mode: OverlayMode) -> Self {
        Self { mode }
    }
}

impl Widget for OverlayWidget {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let (title, lines, height) = match self.mode {
            OverlayMode::Normal => return,
            OverlayMode::ClearConfirm => ("Clear Chat History?", clear_confirm_lines(), 7),
            OverlayMode::Help => {
                let lines = help_lines();
                let height = lines.len() as u16 + 2;
                ("Available Commands", lines, height)
            }
        };

        let popup = centered_rect(56, height, area);
        Clear.render(popup, buf);

        let block = Block::default()
            .borders(Borders::ALL)
            .title(Span::styled(
                format!(" {title} "),
                Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
            ))
            .border_style(Style::default().fg(Color::Gray));

        Paragraph::new(lines)
            .block(block)
            .wrap(Wrap { trim: false })
            .render(popup, buf);
    }
}

fn clear_confirm_lines() -> Vec<Line<'static>> {
    vec![
        Line::from(Span::styled(
            "This will permanently delete all messages.",
            Style::default().fg(Color::Gray),
        )),
        Line::from(Span::styled(
            "This action cannot be undone.",
            Style::default().fg(Color::Gray),
        )),
        Line::default(),
        Line::from(vec![
            Span::styled("[n/Esc] Cancel", Style::default().fg(Color::Gray)),
            Span::raw("   "),
            Span::styled(
                "[y/Enter] Confirm Clear",
                Style::default().fg(Color::White).bg(Color::Red),
            ),
        ])
        .alignment(Alignment::Right),
    ]
}

fn help_lines() -> Vec<Line<'static>> {
    let mut lines: Vec<Line<'static>> = command_entries()
        .into_iter()
        .map(|entry| {
            Line::from(vec![
                Span::styled(format!("/{:<10}", entry.keyword), Style::default().fg(Color::Blue)),
                Span::styled(entry.description, Style::default().fg(Color::Gray)),
            ])
        })
        .collect();

    lines.push(Line::default());
    lines.push(Line::from(Span::styled(
        "Ctrl+L clear chat · PgUp/PgDn scroll · Ctrl+C quit",
        Style::default().fg(Color::DarkGray),
    )));
    lines.push(Line::from(Span::styled("[Esc] Close", Style::default().fg(Color::Gray))).alignment(Alignment::Right));
    lines
}

/// A `width` x `height` rectangle centered in `area`, clamped to fit.
fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);

    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(area.height.saturating_sub(height) / 2),
            Constraint::Length(height),
            Constraint::Min(0),
        ])
        .split(area);

    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Length(area.width.saturating_sub(width) / 2),
            Constraint::Length(width),
            Constraint::Min(0),
        ])
        .split(vertical[1]);

    horizontal[1]
}
