// Everything that can happen to the page funnels through one enum, so the
// controller is the only place state changes.

use crate::api::CatalogEntry;
use crate::error::MarketError;
use crate::state::Ticket;
use crate::workflow::{ConnectOutcome, ListingReceipt, PurchaseReceipt};

type Outcome<T> = Result<T, MarketError>;

#[derive(Debug)]
pub enum Event {
    // User input
    Connect,
    Disconnect,
    Scroll(ScrollMetrics),
    LoadMore,
    PriceInput { token_id: String, value: String },
    List { token_id: String },
    Buy { token_id: String },

    // Spawned work reporting back. The ticket releases the in-flight slot.
    Connected {
        ticket: Ticket,
        /// Session epoch the connect was started in
        epoch: u64,
        result: Outcome<ConnectOutcome>,
    },
    CatalogFetched {
        ticket: Ticket,
        generation: u64,
        result: Outcome<Vec<CatalogEntry>>,
    },
    Listed {
        ticket: Ticket,
        result: Outcome<ListingReceipt>,
    },
    Bought {
        ticket: Ticket,
        result: Outcome<PurchaseReceipt>,
    },

    // Progress text from a running workflow
    Progress(String),

    // Timers
    ClearNotice { id: u64 },
    ReloadCatalog,

    Shutdown,
}

/// Scroll position of the page, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ScrollMetrics {
    pub viewport_height: u32,
    pub scroll_y: u32,
    pub document_height: u32,
}

impl ScrollMetrics {
    /// viewport + scroll >= document - threshold
    pub fn near_bottom(&self, threshold: u32) -> bool {
        let seen = self.viewport_height as u64 + self.scroll_y as u64 + threshold as u64;
        seen >= self.document_height as u64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_near_bottom() {
        let at = |scroll_y| ScrollMetrics {
            viewport_height: 800,
            scroll_y,
            document_height: 3000,
        };
        assert!(!at(0).near_bottom(300));
        assert!(!at(1899).near_bottom(300));
        assert!(at(1900).near_bottom(300));
        assert!(at(2200).near_bottom(300));
    }

    #[test]
    fn test_short_page_is_always_near_bottom() {
        let metrics = ScrollMetrics {
            viewport_height: 800,
            scroll_y: 0,
            document_height: 200,
        };
        assert!(metrics.near_bottom(0));
    }
}
