//! Code explainer view: three tabs filled from an [`ExplanationSource`].

use super::{Generation, Phase, Ticket};
use crate::explainer::{Explanation, ExplanationSource};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ExplainerTab {
    #[default]
    Explanation,
    Complexity,
    Optimizations,
}

#[derive(Debug, Default)]
pub struct ExplainerView {
    current: Option<Explanation>,
    phase: Phase,
    generation: Generation,
    active_tab: ExplainerTab,
}

impl ExplainerView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// The "Explain Code" control is disabled while this is true.
    pub fn is_loading(&self) -> bool {
        self.phase == Phase::Loading
    }

    pub fn explanation(&self) -> Option<&Explanation> {
        self.current.as_ref()
    }

    pub fn active_tab(&self) -> ExplainerTab {
        self.active_tab
    }

    pub fn select_tab(&mut self, tab: ExplainerTab) {
        self.active_tab = tab;
    }

    /// Text of the active tab, once an explanation has arrived.
    pub fn tab_content(&self) -> Option<&str> {
        let e = self.current.as_ref()?;
        Some(match self.active_tab {
            ExplainerTab::Explanation => e.explanation.as_str(),
            ExplainerTab::Complexity => e.complexity.as_str(),
            ExplainerTab::Optimizations => e.optimizations.as_str(),
        })
    }

    /// Enter `Loading` for `code`. Blank code or a request already in flight yields `None`.
    pub fn request(&mut self, code: &str) -> Option<Ticket> {
        if code.trim().is_empty() || self.is_loading() {
            return None;
        }
        self.phase = Phase::Loading;
        Some(self.generation.begin())
    }

    /// Store the explanation and return to `Idle`. Stale tickets are ignored.
    pub fn complete(&mut self, ticket: Ticket, explanation: Explanation) -> bool {
        if !self.generation.is_current(ticket) {
            log::debug!("explainer: discarding result of superseded request");
            return false;
        }
        self.current = Some(explanation);
        self.phase = Phase::Idle;
        true
    }

    /// Request, await the source, and apply. Returns false when the request was rejected.
    pub async fn explain(&mut self, source: &dyn ExplanationSource, code: &str) -> bool {
        let Some(ticket) = self.request(code) else {
            return false;
        };
        let explanation = source.explain(code).await;
        self.complete(ticket, explanation)
    }
}
