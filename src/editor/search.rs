//! Per-session search state for `/`, `?`, `n` and `N`.

use crate::query::MatchList;

#[derive(Debug, Clone, Default)]
pub struct SearchState {
    /// Last pattern searched for.
    pub pattern: Option<String>,
    /// Direction of the last `/` (true) or `?` (false).
    pub forward: bool,
    /// Matches of the last run and the index the cursor jumped to.
    pub matches: MatchList,
    pub index: Option<usize>,
}

impl SearchState {
    /// `(current, total)` for the status line, 1-based.
    pub fn info(&self) -> Option<(usize, usize)> {
        self.index.map(|i| (i + 1, self.matches.len()))
    }

    pub fn clear_results(&mut self) {
        self.matches = MatchList::default();
        self.index = None;
    }
}
