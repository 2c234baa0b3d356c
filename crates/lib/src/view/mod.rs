//! View state for the chat, explainer, and bookmark-solver surfaces.
//!
//! Each view is a small state machine (`Idle` → `Loading` → `Idle`) driven through `&mut self`.
//! Triggering a request issues a [`Ticket`]; a completion is applied only while its ticket is
//! the view's current generation, so results of superseded or dismissed requests are dropped.

mod chat;
mod explainer;
mod solver;

pub use chat::{ChatView, PendingChat, FAILURE_REPLY, GREETING};
pub use explainer::{ExplainerTab, ExplainerView};
pub use solver::{PendingSolution, SolverView, SOLUTION_ERROR, SOLUTION_UNAVAILABLE};

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Phase {
    #[default]
    Idle,
    Loading,
}

/// Generation token handed out when a view triggers a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Ticket(u64);

/// Per-view generation counter backing [`Ticket`]s.
#[derive(Debug, Default)]
pub struct Generation {
    current: u64,
}

impl Generation {
    /// Start a new generation; any earlier ticket becomes stale.
    pub fn begin(&mut self) -> Ticket {
        self.current += 1;
        Ticket(self.current)
    }

    /// Make every outstanding ticket stale without issuing a new one.
    pub fn invalidate(&mut self) {
        self.current += 1;
    }

    pub fn is_current(&self, ticket: Ticket) -> bool {
        ticket.0 == self.current
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// One rendered chat entry. Never mutated after it is appended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: u64,
    pub role: Role,
    pub content: String,
    /// ISO-8601, millisecond precision, UTC.
    pub timestamp: String,
    #[serde(default)]
    pub is_code: bool,
}

/// Strictly increasing message ids seeded from wall-clock milliseconds.
#[derive(Debug, Default)]
pub struct MessageIds {
    last: u64,
}

impl MessageIds {
    pub fn next(&mut self) -> u64 {
        let now = u64::try_from(chrono::Utc::now().timestamp_millis()).unwrap_or(0);
        self.last = now.max(self.last + 1);
        self.last
    }
}

/// Current time as an ISO-8601 string (`2024-05-01T12:00:00.000Z`).
pub fn now_iso() -> String {
    chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true)
}
