//! Terminal setup and the main event loop.

use crate::client::AnswerClient;
use crate::config::Config;
use crate::events::{AppEvent, AppEventReceiver, AppEventSender};
use crate::ui::conversation::{
    ComposerWidget, ControllerAction, ConversationController, ConversationHistory, OutboundRequest,
    OverlayWidget,
};
use anyhow::{Context, Result};
use crossterm::{
    event::{DisableBracketedPaste, EnableBracketedPaste, Event, EventStream},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use futures::StreamExt;
use ratatui::{
    Frame, Terminal,
    backend::{Backend, CrosstermBackend},
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
};
use std::io::{self, Stdout};
use std::time::{Duration, Instant};
use tokio::sync::mpsc;
use tracing::{debug, error, info};

/// Redraw cadence for the typing indicator while an answer is pending
const INDICATOR_FRAME: Duration = Duration::from_millis(150);

/// Lines moved per PageUp / PageDown
const SCROLL_STEP: usize = 5;

/// The chat application: controller state, transcript views and the
/// channel that spawned tasks report back on.
pub struct App {
    controller: ConversationController,
    history: ConversationHistory,
    client: AnswerClient,
    tx: AppEventSender,
    rx: AppEventReceiver,
    running: bool,
    started: Instant,
}

impl App {
    pub fn new(client: AnswerClient, reveal_interval: Duration) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            controller: ConversationController::new(),
            history: ConversationHistory::new(reveal_interval, tx.clone()),
            client,
            tx,
            rx,
            running: true,
            started: Instant::now(),
        }
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        let client = AnswerClient::from_config(config)?;
        Ok(Self::new(client, config.reveal_interval()))
    }

    pub fn controller(&self) -> &ConversationController {
        &self.controller
    }

    pub fn history(&self) -> &ConversationHistory {
        &self.history
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Run until the user quits.
    pub async fn run<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<()> {
        let mut events = EventStream::new();
        let mut indicator = tokio::time::interval(INDICATOR_FRAME);

        while self.running {
            terminal
                .draw(|frame| self.draw(frame))
                .context("Failed to draw frame")?;

            tokio::select! {
                maybe_event = events.next() => match maybe_event {
                    Some(Ok(event)) => self.handle_terminal_event(event),
                    Some(Err(err)) => return Err(err).context("Failed to read terminal event"),
                    None => self.running = false,
                },
                Some(event) = self.rx.recv() => self.handle_app_event(event),
                _ = indicator.tick(), if self.controller.is_awaiting_response() => {}
            }
        }

        Ok(())
    }

    /// Wait for the next event from a spawned task and apply it.
    pub async fn process_next_event(&mut self) -> Option<()> {
        let event = self.rx.recv().await?;
        self.handle_app_event(event);
        Some(())
    }

    pub fn handle_terminal_event(&mut self, event: Event) {
        match event {
            Event::Key(key) => match self.controller.handle_key(key) {
                ControllerAction::None => {}
                ControllerAction::Dispatch(request) => self.dispatch(request),
                ControllerAction::ScrollUp => self.history.scroll_up(SCROLL_STEP),
                ControllerAction::ScrollDown => self.history.scroll_down(SCROLL_STEP),
                ControllerAction::Exit => {
                    info!("exit requested");
                    self.running = false;
                }
            },
            Event::Paste(text) => self.controller.paste(&text),
            _ => {}
        }
        self.history.sync(self.controller.messages());
    }

    pub fn handle_app_event(&mut self, event: AppEvent) {
        match event {
            AppEvent::AnswerReady { request, result } => {
                self.controller.complete(&request, result);
                self.history.sync(self.controller.messages());
            }
            AppEvent::RevealTick(id) => {
                self.history.tick(id);
            }
        }
    }

    /// Send the question on its own task; the result comes back as an event.
    fn dispatch(&self, request: OutboundRequest) {
        let client = self.client.clone();
        let tx = self.tx.clone();

        tokio::spawn(async move {
            let result = client.ask(&request.input).await;
            if tx.send(AppEvent::AnswerReady { request, result }).is_err() {
                debug!("answer arrived after shutdown");
            }
        });
    }

    pub fn draw(&self, frame: &mut Frame) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(2), // Header
                Constraint::Min(3),    // Transcript
                Constraint::Length(1), // Typing indicator
                Constraint::Length(3), // Composer
                Constraint::Length(1), // Footer
            ])
            .split(frame.size());

        self.draw_header(frame, chunks[0]);
        frame.render_widget(&self.history, chunks[1]);
        if self.controller.is_awaiting_response() {
            frame.render_widget(Paragraph::new(self.typing_indicator()), chunks[2]);
        }
        frame.render_widget(
            ComposerWidget::new(self.controller.composer(), self.controller.can_submit()),
            chunks[3],
        );
        frame.render_widget(
            Paragraph::new(Line::from(Span::styled(
                "AI may produce inaccurate info",
                Style::default().fg(Color::DarkGray),
            )))
            .alignment(ratatui::layout::Alignment::Center),
            chunks[4],
        );

        if self.controller.overlay().is_open() {
            frame.render_widget(OverlayWidget::new(self.controller.overlay()), frame.size());
        }
    }

    fn draw_header(&self, frame: &mut Frame, area: Rect) {
        let halves = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Min(10), Constraint::Length(18)])
            .split(area);

        let title = vec![
            Line::from(Span::styled(
                "PockeTalk",
                Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
            )),
            Line::from(Span::styled(
                format!("answers from {}", self.client.base()),
                Style::default().fg(Color::DarkGray),
            )),
        ];
        frame.render_widget(Paragraph::new(title), halves[0]);
        frame.render_widget(
            Paragraph::new(Line::from(Span::styled(
                "Ctrl+L clear chat",
                Style::default().fg(Color::Gray),
            )))
            .alignment(ratatui::layout::Alignment::Right),
            halves[1],
        );
    }

    fn typing_indicator(&self) -> Line<'static> {
        let frame = (self.started.elapsed().as_millis() / INDICATOR_FRAME.as_millis()) % 3;
        let dots: Vec<Span<'static>> = (0..3)
            .map(|i| {
                let style = if i == frame {
                    Style::default().fg(Color::White)
                } else {
                    Style::default().fg(Color::DarkGray)
                };
                Span::styled("● ", style)
            })
            .collect();

        let mut spans = dots;
        spans.push(Span::styled("Thinking...", Style::default().fg(Color::Gray)));
        Line::from(spans)
    }
}

/// Put the terminal in raw mode on an alternate screen; restored on drop,
/// including when the loop exits with an error.
struct TerminalGuard {
    terminal: Terminal<CrosstermBackend<Stdout>>,
}

impl TerminalGuard {
    fn enter() -> Result<Self> {
        enable_raw_mode().context("Failed to enable raw mode")?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen, EnableBracketedPaste)
            .context("Failed to enter alternate screen")?;
        let terminal =
            Terminal::new(CrosstermBackend::new(stdout)).context("Failed to create terminal")?;
        Ok(Self { terminal })
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        if let Err(err) = disable_raw_mode() {
            error!(error = %err, "failed to disable raw mode");
        }
        if let Err(err) = execute!(
            self.terminal.backend_mut(),
            LeaveAlternateScreen,
            DisableBracketedPaste
        ) {
            error!(error = %err, "failed to leave alternate screen");
        }
        let _ = self.terminal.show_cursor();
    }
}

/// Start the interactive chat.
pub async fn run(config: &Config) -> Result<()> {
    let mut app = App::from_config(config)?;
    info!(endpoint = %app.client.base(), "starting chat");

    let mut guard = TerminalGuard::enter()?;
    app.run(&mut guard.terminal).await
}
