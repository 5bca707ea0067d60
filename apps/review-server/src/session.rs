//! Session state owned by the application shell
//!
//! Exactly one review session exists at a time. Loads are serialized
//! through a busy flag, and a generation counter guards every await gap:
//! external calls are never cancelled, their results are simply
//! discarded when a reset or a newer load has bumped the generation in
//! the meantime.

use std::collections::{HashMap, HashSet};

use counsel_client::ChatSession;
use review_types::{ActiveTab, AnalysisResult, ChatTranscript, ClauseBrowser, Document};

/// Everything tied to one loaded document.
pub struct ReviewSession {
    pub document: Document,
    pub analysis: AnalysisResult,
    /// Accepted rewrites, keyed by model-assigned clause id.
    pub rewrites: HashMap<u32, String>,
    /// Clause ids with a rewrite request currently awaiting the API.
    pub rewrites_in_flight: HashSet<u32>,
    pub browser: ClauseBrowser,
    pub transcript: ChatTranscript,
    pub chat: ChatSession,
}

impl ReviewSession {
    /// Start a session for a freshly analyzed document. The chat history
    /// is seeded with the document text and the transcript with the
    /// greeting.
    pub fn new(document: Document, analysis: AnalysisResult) -> Self {
        let chat = ChatSession::new(&document.text);
        Self {
            document,
            analysis,
            rewrites: HashMap::new(),
            rewrites_in_flight: HashSet::new(),
            browser: ClauseBrowser::new(),
            transcript: ChatTranscript::new(),
            chat,
        }
    }
}

/// Top-level mutable state behind the shell's lock.
pub struct ShellState {
    busy: bool,
    generation: u64,
    session: Option<ReviewSession>,
    active_tab: ActiveTab,
}

impl ShellState {
    pub fn new() -> Self {
        Self {
            busy: false,
            generation: 0,
            session: None,
            active_tab: ActiveTab::default(),
        }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn active_tab(&self) -> ActiveTab {
        self.active_tab
    }

    pub fn set_active_tab(&mut self, tab: ActiveTab) {
        self.active_tab = tab;
    }

    pub fn session(&self) -> Option<&ReviewSession> {
        self.session.as_ref()
    }

    pub fn session_mut(&mut self) -> Option<&mut ReviewSession> {
        self.session.as_mut()
    }

    /// Claim the single load slot. Returns the new generation, or `None`
    /// while another load is in flight.
    pub fn begin_load(&mut self) -> Option<u64> {
        if self.busy {
            return None;
        }
        self.busy = true;
        self.generation += 1;
        Some(self.generation)
    }

    /// Install the loaded session. A stale generation (reset raced the
    /// load) leaves the state untouched and returns false.
    pub fn complete_load(&mut self, generation: u64, session: ReviewSession) -> bool {
        if generation != self.generation {
            return false;
        }
        self.busy = false;
        self.session = Some(session);
        self.active_tab = ActiveTab::Chat;
        true
    }

    /// Release the load slot after a failed extraction or analysis. The
    /// previous session, if any, stays as it was.
    pub fn fail_load(&mut self, generation: u64) {
        if generation == self.generation {
            self.busy = false;
        }
    }

    /// Discard everything and return to the initial state.
    pub fn reset(&mut self) {
        self.session = None;
        self.active_tab = ActiveTab::Chat;
        self.busy = false;
        self.generation += 1;
    }
}

impl Default for ShellState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use review_types::{Clause, ContractDomain, DocumentKind, RiskLevel};

    fn session() -> ReviewSession {
        let document = Document::new("lease.txt", "The parties agree as follows.", DocumentKind::Plain);
        let analysis = AnalysisResult {
            summary: "A short lease.".to_string(),
            domain: ContractDomain::Property,
            clauses: vec![Clause {
                id: 7,
                title: "Deposit".to_string(),
                text: "Two months' rent.".to_string(),
                risk: RiskLevel::Medium,
                explanation: String::new(),
                legal_reference: String::new(),
                suggested_rewrite: None,
            }],
            risk_score: 40,
            red_flags: vec![],
            next_steps: vec![],
        };
        ReviewSession::new(document, analysis)
    }

    #[test]
    fn test_concurrent_load_rejected_while_busy() {
        let mut shell = ShellState::new();
        let generation = shell.begin_load().unwrap();
        assert!(shell.begin_load().is_none());

        shell.complete_load(generation, session());
        // Slot is free again after completion
        assert!(shell.begin_load().is_some());
    }

    #[test]
    fn test_stale_completion_is_discarded() {
        let mut shell = ShellState::new();
        let generation = shell.begin_load().unwrap();
        shell.reset();

        assert!(!shell.complete_load(generation, session()));
        assert!(shell.session().is_none());
    }

    #[test]
    fn test_failed_load_keeps_previous_session() {
        let mut shell = ShellState::new();
        let first = shell.begin_load().unwrap();
        shell.complete_load(first, session());

        let second = shell.begin_load().unwrap();
        shell.fail_load(second);

        assert!(shell.session().is_some());
        assert!(shell.begin_load().is_some());
    }

    #[test]
    fn test_reset_clears_everything_and_returns_to_chat() {
        let mut shell = ShellState::new();
        let generation = shell.begin_load().unwrap();
        shell.complete_load(generation, session());

        {
            let s = shell.session_mut().unwrap();
            s.rewrites.insert(7, "Cap the deposit at one month.".to_string());
            s.browser.toggle(7);
        }
        shell.set_active_tab(ActiveTab::Report);

        shell.reset();

        assert!(shell.session().is_none());
        assert_eq!(shell.active_tab(), ActiveTab::Chat);
        // A new load is permitted immediately
        assert!(shell.begin_load().is_some());
    }

    #[test]
    fn test_rewrite_stored_under_requested_id_only() {
        let mut session = session();
        session.rewrites.insert(7, "Safer wording.".to_string());

        assert_eq!(session.rewrites.get(&7).map(String::as_str), Some("Safer wording."));
        assert_eq!(session.rewrites.len(), 1);
        assert!(session.rewrites.get(&1).is_none());
    }
}
