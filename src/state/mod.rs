mod catalog;
mod guard;
mod session;
mod ui;

pub use catalog::{CatalogState, PageOutcome};
pub use guard::{ActionKey, InFlight, Ticket};
pub use session::Session;
pub use ui::{Notice, UiState};
