use std::collections::{HashMap, VecDeque};

use super::{CatalogState, Session};

/// A transient status line. The id lets a timer clear exactly this notice
/// and leave any newer one alone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub id: u64,
    pub text: String,
}

/// Everything the page shows, owned by the controller.
#[derive(Debug, Default)]
pub struct UiState {
    pub session: Option<Session>,
    pub catalog: CatalogState,
    pub notice: Option<Notice>,
    /// Blocking messages waiting to be shown
    pub alerts: VecDeque<String>,
    /// What the user typed into each card's price box
    pub price_inputs: HashMap<String, String>,
    /// Prices set by a successful listing, shown until the next reload
    pub price_overrides: HashMap<String, String>,
    next_notice_id: u64,
}

impl UiState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_connected(&self) -> bool {
        self.session.is_some()
    }

    /// Show a notice, replacing the current one. Returns its id.
    pub fn notify(&mut self, text: impl Into<String>) -> u64 {
        self.next_notice_id += 1;
        self.notice = Some(Notice {
            id: self.next_notice_id,
            text: text.into(),
        });
        self.next_notice_id
    }

    /// Clear the notice only if it is still the one with `id`.
    pub fn clear_notice(&mut self, id: u64) -> bool {
        if self.notice.as_ref().is_some_and(|n| n.id == id) {
            self.notice = None;
            return true;
        }
        false
    }

    pub fn alert(&mut self, text: impl Into<String>) {
        self.alerts.push_back(text.into());
    }

    pub fn take_alerts(&mut self) -> Vec<String> {
        self.alerts.drain(..).collect()
    }

    /// Drop the cached catalog and everything rendered from it.
    pub fn reset_catalog(&mut self) {
        self.catalog.reset();
        self.price_overrides.clear();
    }

    /// Back to the disconnected page.
    pub fn disconnect(&mut self) {
        self.session = None;
        self.reset_catalog();
        self.price_inputs.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::CatalogEntry;

    #[test]
    fn test_notice_expiry_keeps_newer_notice() {
        let mut ui = UiState::new();
        let first = ui.notify("Checking ownership...");
        let second = ui.notify("Creating order...");

        assert!(!ui.clear_notice(first));
        assert_eq!(ui.notice.as_ref().unwrap().text, "Creating order...");

        assert!(ui.clear_notice(second));
        assert!(ui.notice.is_none());
    }

    #[test]
    fn test_alerts_drain_in_order() {
        let mut ui = UiState::new();
        ui.alert("one");
        ui.alert("two");
        assert_eq!(ui.take_alerts(), vec!["one", "two"]);
        assert!(ui.take_alerts().is_empty());
    }

    #[test]
    fn test_disconnect_clears_page() {
        let mut ui = UiState::new();
        ui.catalog.install(0, vec![CatalogEntry::new("1")]);
        ui.catalog.next_page(12);
        ui.price_inputs.insert("1".to_string(), "0.5".to_string());
        ui.price_overrides.insert("1".to_string(), "0.5".to_string());

        ui.disconnect();

        assert!(!ui.is_connected());
        assert!(ui.catalog.rendered().is_empty());
        assert!(ui.catalog.needs_fetch());
        assert!(ui.price_inputs.is_empty());
        assert!(ui.price_overrides.is_empty());
    }
}
