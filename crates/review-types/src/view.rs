//! Pure view state owned by the application shell

use serde::{Deserialize, Serialize};

/// Which top-level tab is showing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActiveTab {
    /// Initial tab after load and after reset
    #[default]
    Chat,
    Report,
}

/// Exclusive clause expansion state
///
/// At most one clause is expanded at a time; reselecting the expanded
/// clause collapses it.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct ClauseBrowser {
    expanded: Option<u32>,
}

impl ClauseBrowser {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn expanded(&self) -> Option<u32> {
        self.expanded
    }

    /// Toggle a clause: expanding one collapses any other
    pub fn toggle(&mut self, clause_id: u32) {
        self.expanded = match self.expanded {
            Some(current) if current == clause_id => None,
            _ => Some(clause_id),
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_expansion_is_exclusive() {
        let mut browser = ClauseBrowser::new();
        browser.toggle(1);
        assert_eq!(browser.expanded(), Some(1));
        browser.toggle(2);
        assert_eq!(browser.expanded(), Some(2));
    }

    #[test]
    fn test_reselect_collapses() {
        let mut browser = ClauseBrowser::new();
        browser.toggle(7);
        browser.toggle(7);
        assert_eq!(browser.expanded(), None);
    }

    #[test]
    fn test_default_tab_is_chat() {
        assert_eq!(ActiveTab::default(), ActiveTab::Chat);
    }
}
