use crate::conversation::{Conversation, Message, Sender};
use crate::error::ClientError;
use crate::ui::conversation::commands::{SlashCommand, parse_slash_command};
use crate::ui::conversation::composer::{ComposerAction, ConversationComposer};
use crate::ui::conversation::overlay::OverlayMode;
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use tracing::{debug, info, warn};

/// Shown in place of an answer when the service could not be reached or
/// returned an error status.
pub const FAILURE_WARNING: &str = "⚠ request failed, please retry";

/// A question that should be sent to the answering service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundRequest {
    /// Sequence number, unique per controller
    pub number: u64,
    /// The raw, untrimmed input as typed
    pub input: String,
}

/// What a submit did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Empty or whitespace-only input
    Ignored,
    Cleared,
    HelpOpened,
    /// A user message was appended; the caller must send the request and
    /// report back through [`ConversationController::complete`]
    Dispatched(OutboundRequest),
}

/// Actions the event loop must carry out on behalf of the controller
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControllerAction {
    None,
    Dispatch(OutboundRequest),
    ScrollUp,
    ScrollDown,
    Exit,
}

/// Owns the conversation state and mediates between the user, the answering
/// service and the transcript.
///
/// No I/O happens here: a submitted question comes back as an
/// [`OutboundRequest`] and its result is fed in through
/// [`complete`](Self::complete).
#[derive(Debug, Default)]
pub struct ConversationController {
    conversation: Conversation,
    composer: ConversationComposer,
    awaiting_response: bool,
    overlay: OverlayMode,
    next_request: u64,
    in_flight: usize,
}

impl ConversationController {
    pub fn new() -> Self {
        Self {
            composer: ConversationComposer::new(),
            ..Self::default()
        }
    }

    /// Submit a line of input.
    ///
    /// The input is trimmed for command matching and for the user message;
    /// the outbound request carries it untrimmed.
    pub fn submit(&mut self, raw_input: &str) -> SubmitOutcome {
        let trimmed = raw_input.trim();
        if trimmed.is_empty() {
            return SubmitOutcome::Ignored;
        }

        match parse_slash_command(trimmed) {
            Some(SlashCommand::Clear) => {
                self.clear_conversation();
                self.close_overlay(OverlayMode::ClearConfirm);
                self.composer.clear();
                return SubmitOutcome::Cleared;
            }
            Some(SlashCommand::Help) => {
                self.open_overlay(OverlayMode::Help);
                self.composer.clear();
                return SubmitOutcome::HelpOpened;
            }
            None => {}
        }

        self.conversation.push(Sender::User, trimmed);
        self.composer.clear();
        self.awaiting_response = true;
        self.in_flight += 1;

        self.next_request += 1;
        let request = OutboundRequest {
            number: self.next_request,
            input: raw_input.to_string(),
        };
        info!(request = request.number, in_flight = self.in_flight, "dispatching question");
        SubmitOutcome::Dispatched(request)
    }

    /// Apply the result of a request.
    ///
    /// Always appends exactly one message, even if the conversation was
    /// cleared while the request was in flight.
    pub fn complete(&mut self, request: &OutboundRequest, result: Result<String, ClientError>) {
        match result {
            Ok(answer) => {
                debug!(request = request.number, bytes = answer.len(), "answer received");
                self.conversation.push(Sender::Bot, answer);
            }
            Err(err) => {
                warn!(request = request.number, error = %err, "question failed");
                self.conversation.push(Sender::System, FAILURE_WARNING);
            }
        }

        self.in_flight = self.in_flight.saturating_sub(1);
        self.awaiting_response = false;
        // An open overlay keeps the keys; closing it restores focus.
        if !self.overlay.is_open() {
            self.composer.set_focus(true);
        }
    }

    /// Open the clear-confirmation overlay.
    pub fn request_clear(&mut self) {
        self.open_overlay(OverlayMode::ClearConfirm);
    }

    /// Clear the conversation and close the confirmation overlay.
    pub fn confirm_clear(&mut self) {
        self.clear_conversation();
        self.close_overlay(OverlayMode::ClearConfirm);
    }

    /// Close the confirmation overlay, keeping the conversation.
    pub fn cancel_clear(&mut self) {
        self.close_overlay(OverlayMode::ClearConfirm);
    }

    /// Close the commands overlay.
    pub fn close_help(&mut self) {
        self.close_overlay(OverlayMode::Help);
    }

    /// Route a key press according to the current overlay mode.
    pub fn handle_key(&mut self, key: KeyEvent) -> ControllerAction {
        if key.kind != KeyEventKind::Press {
            return ControllerAction::None;
        }
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return ControllerAction::Exit;
        }

        match self.overlay {
            OverlayMode::ClearConfirm => {
                match key.code {
                    KeyCode::Char('y' | 'Y') | KeyCode::Enter => self.confirm_clear(),
                    KeyCode::Char('n' | 'N') | KeyCode::Esc => self.cancel_clear(),
                    _ => {}
                }
                ControllerAction::None
            }
            OverlayMode::Help => {
                if matches!(key.code, KeyCode::Esc | KeyCode::Enter | KeyCode::Char('q')) {
                    self.close_help();
                }
                ControllerAction::None
            }
            OverlayMode::Normal => self.handle_normal_key(key),
        }
    }

    fn handle_normal_key(&mut self, key: KeyEvent) -> ControllerAction {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('l') {
            self.request_clear();
            return ControllerAction::None;
        }

        match key.code {
            KeyCode::Esc => return ControllerAction::Exit,
            KeyCode::PageUp => return ControllerAction::ScrollUp,
            KeyCode::PageDown => return ControllerAction::ScrollDown,
            _ => {}
        }

        let ComposerAction::Submit(raw) = self.composer.handle_key(key) else {
            return ControllerAction::None;
        };

        // Slash commands are local and stay available while an answer is pending.
        let is_command = parse_slash_command(raw.trim()).is_some();
        if !is_command && !self.can_submit() {
            return ControllerAction::None;
        }

        match self.submit(&raw) {
            SubmitOutcome::Dispatched(request) => ControllerAction::Dispatch(request),
            _ => ControllerAction::None,
        }
    }

    /// Whether the send affordance is enabled: non-empty input and nothing pending.
    pub fn can_submit(&self) -> bool {
        !self.composer.content().trim().is_empty() && !self.awaiting_response
    }

    pub fn paste(&mut self, text: &str) {
        if self.overlay == OverlayMode::Normal {
            self.composer.insert_str(text);
        }
    }

    pub fn messages(&self) -> &[Message] {
        self.conversation.messages()
    }

    pub fn overlay(&self) -> OverlayMode {
        self.overlay
    }

    pub fn is_awaiting_response(&self) -> bool {
        self.awaiting_response
    }

    /// Requests dispatched and not yet completed.
    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    pub fn composer(&self) -> &ConversationComposer {
        &self.composer
    }

    fn clear_conversation(&mut self) {
        info!(messages = self.conversation.len(), "clearing conversation");
        self.conversation.clear();
    }

    fn open_overlay(&mut self, mode: OverlayMode) {
        debug!(from = ?self.overlay, to = ?mode, "overlay transition");
        self.overlay = mode;
        self.composer.set_focus(false);
    }

    /// Return to normal if `mode` is the one showing.
    fn close_overlay(&mut self, mode: OverlayMode) {
        if self.overlay == mode {
            debug!(from = ?self.overlay, "overlay closed");
            self.overlay = OverlayMode::Normal;
            self.composer.set_focus(true);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::StatusCode;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn ctrl(c: char) -> KeyEvent {
        KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL)
    }

    fn type_text(controller: &mut ConversationController, text: &str) {
        for c in text.chars() {
            controller.handle_key(key(KeyCode::Char(c)));
        }
    }

    fn transcript(controller: &ConversationController) -> Vec<(Sender, String)> {
        controller
            .messages()
            .iter()
            .map(|m| (m.sender(), m.text().to_string()))
            .collect()
    }

    fn dispatched(outcome: SubmitOutcome) -> OutboundRequest {
        match outcome {
            SubmitOutcome::Dispatched(request) => request,
            other => panic!("expected dispatch, got {other:?}"),
        }
    }

    fn status_error() -> ClientError {
        ClientError::Status {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            body: String::new(),
        }
    }

    #[test]
    fn submit_appends_user_message_before_answer() {
        let mut controller = ConversationController::new();
        let request = dispatched(controller.submit("hello"));

        assert_eq!(transcript(&controller), [(Sender::User, "hello".to_string())]);
        assert!(controller.is_awaiting_response());
        assert_eq!(request.input, "hello");

        controller.complete(&request, Ok("world".to_string()));
        assert_eq!(
            transcript(&controller),
            [
                (Sender::User, "hello".to_string()),
                (Sender::Bot, "world".to_string())
            ]
        );
        assert!(!controller.is_awaiting_response());
        assert!(controller.composer().has_focus());
    }

    #[test]
    fn failure_appends_fixed_warning() {
        let mut controller = ConversationController::new();
        let request = dispatched(controller.submit("hello"));
        controller.complete(&request, Err(status_error()));

        assert_eq!(
            transcript(&controller),
            [
                (Sender::User, "hello".to_string()),
                (Sender::System, FAILURE_WARNING.to_string())
            ]
        );
        assert!(!controller.is_awaiting_response());
    }

    #[test]
    fn user_message_is_trimmed_but_request_is_raw() {
        let mut controller = ConversationController::new();
        let request = dispatched(controller.submit("  what is rust? "));

        assert_eq!(controller.messages()[0].text(), "what is rust?");
        assert_eq!(request.input, "  what is rust? ");
    }

    #[test]
    fn blank_input_is_ignored() {
        let mut controller = ConversationController::new();
        for input in ["", "   ", "\t\n"] {
            assert_eq!(controller.submit(input), SubmitOutcome::Ignored);
        }
        assert!(controller.messages().is_empty());
        assert!(!controller.is_awaiting_response());
    }

    #[test]
    fn clear_command_with_whitespace_empties_everything() {
        let mut controller = ConversationController::new();
        let request = dispatched(controller.submit("hello"));
        controller.complete(&request, Ok("world".to_string()));

        type_text(&mut controller, " /clear ");
        assert_eq!(controller.handle_key(key(KeyCode::Enter)), ControllerAction::None);

        assert!(controller.messages().is_empty());
        assert_eq!(controller.composer().content(), "");
    }

    #[test]
    fn clear_command_on_empty_conversation() {
        let mut controller = ConversationController::new();
        assert_eq!(controller.submit("/clear"), SubmitOutcome::Cleared);
        assert!(controller.messages().is_empty());
    }

    #[test]
    fn help_command_only_touches_overlay() {
        let mut controller = ConversationController::new();
        dispatched(controller.submit("hello"));
        let before = controller.messages().to_vec();

        assert_eq!(controller.submit("/help"), SubmitOutcome::HelpOpened);
        assert_eq!(controller.messages(), before.as_slice());
        assert_eq!(controller.overlay(), OverlayMode::Help);
    }

    #[test]
    fn unknown_slash_text_goes_to_the_service() {
        let mut controller = ConversationController::new();
        let request = dispatched(controller.submit("/clear please"));
        assert_eq!(request.input, "/clear please");
    }

    #[test]
    fn clear_confirmation_flow() {
        let mut controller = ConversationController::new();
        dispatched(controller.submit("hello"));

        controller.request_clear();
        assert_eq!(controller.overlay(), OverlayMode::ClearConfirm);
        assert_eq!(controller.messages().len(), 1);

        controller.cancel_clear();
        assert_eq!(controller.overlay(), OverlayMode::Normal);
        assert_eq!(controller.messages().len(), 1);

        controller.request_clear();
        controller.confirm_clear();
        assert_eq!(controller.overlay(), OverlayMode::Normal);
        assert!(controller.messages().is_empty());
    }

    #[test]
    fn closing_twice_is_idempotent() {
        let mut controller = ConversationController::new();
        controller.request_clear();
        controller.cancel_clear();
        controller.cancel_clear();
        assert_eq!(controller.overlay(), OverlayMode::Normal);

        controller.submit("/help");
        controller.close_help();
        controller.close_help();
        assert_eq!(controller.overlay(), OverlayMode::Normal);
    }

    #[test]
    fn close_help_does_not_dismiss_clear_confirm() {
        let mut controller = ConversationController::new();
        controller.request_clear();
        controller.close_help();
        assert_eq!(controller.overlay(), OverlayMode::ClearConfirm);
    }

    #[test]
    fn completion_after_clear_still_appends() {
        let mut controller = ConversationController::new();
        let request = dispatched(controller.submit("hello"));
        controller.submit("/clear");

        controller.complete(&request, Ok("late".to_string()));
        assert_eq!(transcript(&controller), [(Sender::Bot, "late".to_string())]);
    }

    #[test]
    fn completion_under_overlay_keeps_composer_unfocused() {
        let mut controller = ConversationController::new();
        let request = dispatched(controller.submit("hello"));
        controller.submit("/help");
        assert!(!controller.composer().has_focus());

        controller.complete(&request, Ok("world".to_string()));
        assert_eq!(controller.overlay(), OverlayMode::Help);
        assert!(!controller.composer().has_focus());

        controller.close_help();
        assert!(controller.composer().has_focus());

        let request = dispatched(controller.submit("again"));
        controller.request_clear();
        controller.complete(&request, Err(status_error()));
        assert!(!controller.composer().has_focus());

        controller.cancel_clear();
        assert!(controller.composer().has_focus());
    }

    #[test]
    fn concurrent_requests_complete_out_of_order() {
        let mut controller = ConversationController::new();
        let first = dispatched(controller.submit("one"));
        let second = dispatched(controller.submit("two"));
        assert_ne!(first.number, second.number);
        assert_eq!(controller.in_flight(), 2);

        controller.complete(&second, Ok("answer two".to_string()));
        controller.complete(&first, Err(ClientError::Timeout));

        let senders: Vec<_> = controller.messages().iter().map(Message::sender).collect();
        assert_eq!(senders, [Sender::User, Sender::User, Sender::Bot, Sender::System]);
        assert_eq!(controller.in_flight(), 0);
    }

    #[test]
    fn enter_is_disabled_while_awaiting() {
        let mut controller = ConversationController::new();
        type_text(&mut controller, "first");
        let ControllerAction::Dispatch(_) = controller.handle_key(key(KeyCode::Enter)) else {
            panic!("first submit should dispatch");
        };

        type_text(&mut controller, "second");
        assert!(!controller.can_submit());
        assert_eq!(controller.handle_key(key(KeyCode::Enter)), ControllerAction::None);
        assert_eq!(controller.messages().len(), 1);
        assert_eq!(controller.composer().content(), "second");
    }

    #[test]
    fn commands_work_while_awaiting() {
        let mut controller = ConversationController::new();
        dispatched(controller.submit("hello"));

        type_text(&mut controller, "/help");
        controller.handle_key(key(KeyCode::Enter));
        assert_eq!(controller.overlay(), OverlayMode::Help);
    }

    #[test]
    fn overlay_keys() {
        let mut controller = ConversationController::new();
        dispatched(controller.submit("hello"));

        controller.handle_key(ctrl('l'));
        assert_eq!(controller.overlay(), OverlayMode::ClearConfirm);
        assert!(!controller.composer().has_focus());

        // Typing while the dialog is up does not reach the composer.
        controller.handle_key(key(KeyCode::Char('x')));
        assert_eq!(controller.composer().content(), "");

        controller.handle_key(key(KeyCode::Esc));
        assert_eq!(controller.overlay(), OverlayMode::Normal);
        assert_eq!(controller.messages().len(), 1);

        controller.handle_key(ctrl('l'));
        controller.handle_key(key(KeyCode::Char('y')));
        assert!(controller.messages().is_empty());

        controller.submit("/help");
        controller.handle_key(key(KeyCode::Char('q')));
        assert_eq!(controller.overlay(), OverlayMode::Normal);
        assert!(controller.composer().has_focus());
    }

    #[test]
    fn exit_keys() {
        let mut controller = ConversationController::new();
        assert_eq!(controller.handle_key(key(KeyCode::Esc)), ControllerAction::Exit);

        controller.request_clear();
        assert_eq!(controller.handle_key(ctrl('c')), ControllerAction::Exit);
    }
}
