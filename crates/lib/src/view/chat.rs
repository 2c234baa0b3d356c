//! Chat assistant view: message list, loading flag, and reply reconciliation.

use super::{Generation, Message, MessageIds, Phase, Role, Ticket};
use crate::client::{Gateway, GatewayFailure, GatewayOutcome};
use crate::prompt;
use crate::segment;

pub const GREETING: &str =
    "Hi there! I'm your coding assistant. How can I help you today?";

/// Appended as the single assistant reply when a request fails.
pub const FAILURE_REPLY: &str =
    "I'm sorry, I encountered an error processing your request. Please try again later.";

/// A triggered chat request: send `prompt`, then hand the outcome back with `ticket`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingChat {
    pub ticket: Ticket,
    pub prompt: String,
}

#[derive(Debug)]
pub struct ChatView {
    messages: Vec<Message>,
    phase: Phase,
    generation: Generation,
    ids: MessageIds,
    last_failure: Option<GatewayFailure>,
}

impl Default for ChatView {
    fn default() -> Self {
        Self::new()
    }
}

impl ChatView {
    /// New view holding only the assistant greeting.
    pub fn new() -> Self {
        let mut view = Self {
            messages: Vec::new(),
            phase: Phase::Idle,
            generation: Generation::default(),
            ids: MessageIds::default(),
            last_failure: None,
        };
        view.push(Role::Assistant, GREETING, false);
        view
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Input is disabled while this is true.
    pub fn is_loading(&self) -> bool {
        self.phase == Phase::Loading
    }

    /// Kind of the most recent failure, cleared by the next success.
    pub fn last_failure(&self) -> Option<GatewayFailure> {
        self.last_failure
    }

    /// Append the user's message and enter `Loading`. Blank input, or a trigger while a request
    /// is outstanding, is rejected without touching state.
    pub fn submit(&mut self, input: &str, code: Option<&str>) -> Option<PendingChat> {
        if input.trim().is_empty() || self.is_loading() {
            return None;
        }
        self.push(Role::User, input, false);
        self.phase = Phase::Loading;
        Some(PendingChat {
            ticket: self.generation.begin(),
            prompt: prompt::context_question(input, code),
        })
    }

    /// Apply a settled request. Success appends one assistant message per response segment;
    /// failure appends [`FAILURE_REPLY`]. Returns false (and changes nothing) for a stale ticket.
    pub fn complete(&mut self, ticket: Ticket, outcome: GatewayOutcome) -> bool {
        if !self.generation.is_current(ticket) {
            log::debug!("chat: discarding result of superseded request");
            return false;
        }
        match outcome {
            GatewayOutcome::Response(text) => {
                for seg in segment::segment(&text) {
                    let is_code = seg.is_code();
                    self.push(Role::Assistant, seg.content, is_code);
                }
                self.last_failure = None;
            }
            GatewayOutcome::Failed(failure) => {
                self.push(Role::Assistant, FAILURE_REPLY, false);
                self.last_failure = Some(failure);
            }
        }
        self.phase = Phase::Idle;
        true
    }

    /// Submit, await the gateway, and apply the outcome. Returns false when the input was rejected.
    pub async fn send(&mut self, gateway: &dyn Gateway, input: &str, code: Option<&str>) -> bool {
        let Some(pending) = self.submit(input, code) else {
            return false;
        };
        let outcome = gateway.send(&pending.prompt).await;
        self.complete(pending.ticket, outcome)
    }

    fn push(&mut self, role: Role, content: impl Into<String>, is_code: bool) {
        let id = self.ids.next();
        self.messages.push(Message {
            id,
            role,
            content: content.into(),
            timestamp: super::now_iso(),
            is_code,
        });
    }
}
