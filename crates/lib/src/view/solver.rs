//! Bookmark solver: a dialog that asks the gateway to explain and fix a bookmarked problem.
//!
//! Opening is not gated by the loading flag; every open starts an independent request. Only the
//! most recent open (and only while the dialog stays open) may write the solution.

use super::{Generation, Phase, Ticket};
use crate::bookmarks::BookmarkedQuestion;
use crate::client::{Gateway, GatewayFailure, GatewayOutcome};
use crate::prompt;

/// Shown when the gateway answers with an error.
pub const SOLUTION_UNAVAILABLE: &str =
    "Sorry, I couldn't generate a solution at this time. Please try again later.";

/// Shown when the gateway could not be reached.
pub const SOLUTION_ERROR: &str =
    "An error occurred while generating the solution. Please try again later.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingSolution {
    pub ticket: Ticket,
    pub prompt: String,
}

#[derive(Debug, Default)]
pub struct SolverView {
    selected: Option<BookmarkedQuestion>,
    solution: String,
    phase: Phase,
    dialog_open: bool,
    generation: Generation,
}

impl SolverView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn selected(&self) -> Option<&BookmarkedQuestion> {
        self.selected.as_ref()
    }

    pub fn solution(&self) -> &str {
        &self.solution
    }

    pub fn is_loading(&self) -> bool {
        self.phase == Phase::Loading
    }

    pub fn is_open(&self) -> bool {
        self.dialog_open
    }

    /// Open the dialog for `bookmark`, clear the previous solution, and start a request.
    pub fn open(&mut self, bookmark: &BookmarkedQuestion) -> PendingSolution {
        self.selected = Some(bookmark.clone());
        self.solution.clear();
        self.phase = Phase::Loading;
        self.dialog_open = true;
        PendingSolution {
            ticket: self.generation.begin(),
            prompt: prompt::fix_explain(&bookmark.description, &bookmark.code),
        }
    }

    /// Dismiss the dialog. Any request still in flight will be discarded on completion.
    pub fn close(&mut self) {
        self.dialog_open = false;
        self.phase = Phase::Idle;
        self.generation.invalidate();
    }

    /// Apply a settled request if `ticket` is still current.
    pub fn complete(&mut self, ticket: Ticket, outcome: GatewayOutcome) -> bool {
        if !self.generation.is_current(ticket) {
            log::debug!("solver: discarding result of superseded or dismissed request");
            return false;
        }
        self.solution = match outcome {
            GatewayOutcome::Response(text) => text,
            GatewayOutcome::Failed(GatewayFailure::Service) => SOLUTION_UNAVAILABLE.to_string(),
            GatewayOutcome::Failed(GatewayFailure::Transport) => SOLUTION_ERROR.to_string(),
        };
        self.phase = Phase::Idle;
        true
    }

    /// Open, await the gateway, and apply.
    pub async fn solve(&mut self, gateway: &dyn Gateway, bookmark: &BookmarkedQuestion) -> bool {
        let pending = self.open(bookmark);
        let outcome = gateway.send(&pending.prompt).await;
        self.complete(pending.ticket, outcome)
    }
}
