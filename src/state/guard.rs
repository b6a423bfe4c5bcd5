use std::collections::HashMap;

/// Things a user can start that must not run twice at once.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ActionKey {
    Connect,
    Catalog,
    List(String),
    Buy(String),
}

/// Proof that an action was started; hand it back to finish the action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ticket {
    pub key: ActionKey,
    id: u64,
}

/// Registry of running actions, one per key.
#[derive(Debug, Default)]
pub struct InFlight {
    next_id: u64,
    active: HashMap<ActionKey, u64>,
}

impl InFlight {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start `key` unless it is already running.
    pub fn begin(&mut self, key: ActionKey) -> Option<Ticket> {
        if self.active.contains_key(&key) {
            return None;
        }
        self.next_id += 1;
        self.active.insert(key.clone(), self.next_id);
        Some(Ticket {
            key,
            id: self.next_id,
        })
    }

    /// Release the action the ticket was issued for.
    /// Tickets that no longer match (already finished) are ignored.
    pub fn finish(&mut self, ticket: &Ticket) -> bool {
        if self.active.get(&ticket.key) == Some(&ticket.id) {
            self.active.remove(&ticket.key);
            return true;
        }
        false
    }

    pub fn is_busy(&self, key: &ActionKey) -> bool {
        self.active.contains_key(key)
    }

    pub fn count(&self) -> usize {
        self.active.len()
    }
}
