use crate::api::CatalogEntry;

/// Result of asking for the next page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageOutcome {
    /// Entries `start..end` are now rendered.
    Rendered { start: usize, end: usize },
    /// The catalog is empty and nothing was ever rendered.
    Empty,
    /// Everything is already rendered.
    Exhausted,
}

/// The catalog loaded once from the backend plus how much of it is shown.
///
/// `loaded_count` only grows until `reset`. Each reset starts a new
/// generation so fetches started before it can be recognised and dropped.
#[derive(Debug, Default)]
pub struct CatalogState {
    entries: Option<Vec<CatalogEntry>>,
    loaded_count: usize,
    generation: u64,
    show_empty: bool,
}

impl CatalogState {
    pub fn new() -> Self {
        Self::default()
    }

    /// True until a fetch for the current generation has been installed.
    pub fn needs_fetch(&self) -> bool {
        self.entries.is_none()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Cache a fetched catalog. Returns false (and keeps nothing) when the
    /// fetch belongs to an older generation.
    pub fn install(&mut self, generation: u64, entries: Vec<CatalogEntry>) -> bool {
        if generation != self.generation {
            return false;
        }
        self.entries = Some(entries);
        true
    }

    /// Advance the cursor by up to `batch_size` entries.
    pub fn next_page(&mut self, batch_size: usize) -> PageOutcome {
        let total = self.total();
        if self.loaded_count >= total {
            if self.loaded_count == 0 {
                self.show_empty = true;
                return PageOutcome::Empty;
            }
            return PageOutcome::Exhausted;
        }

        let start = self.loaded_count;
        let end = (start + batch_size.max(1)).min(total);
        self.loaded_count = end;
        PageOutcome::Rendered { start, end }
    }

    /// Entries rendered so far.
    pub fn rendered(&self) -> &[CatalogEntry] {
        match &self.entries {
            Some(entries) => &entries[..self.loaded_count],
            None => &[],
        }
    }

    pub fn find_rendered(&self, token_id: &str) -> Option<&CatalogEntry> {
        self.rendered().iter().find(|e| e.token_id == token_id)
    }

    pub fn loaded_count(&self) -> usize {
        self.loaded_count
    }

    pub fn total(&self) -> usize {
        self.entries.as_ref().map_or(0, Vec::len)
    }

    /// Whether the "no NFTs" message should be shown.
    pub fn show_empty(&self) -> bool {
        self.show_empty
    }

    /// Forget everything; the next page load fetches again.
    pub fn reset(&mut self) {
        self.entries = None;
        self.loaded_count = 0;
        self.show_empty = false;
        self.generation += 1;
    }
}
