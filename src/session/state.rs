//! Session state: cursor, per-trait tally and answer history

use ahash::AHashMap;

/// Index of a trait within a session's catalog
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TraitId(u32);

impl TraitId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Traits in a fixed order: first appearance across the active questions
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TraitCatalog {
    names: Vec<String>,
    ids: AHashMap<String, TraitId>,
}

impl TraitCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Id of a trait, registering it on first sight
    pub fn intern(&mut self, name: &str) -> TraitId {
        if let Some(id) = self.ids.get(name) {
            return *id;
        }
        let id = TraitId(self.names.len() as u32);
        self.names.push(name.to_string());
        self.ids.insert(name.to_string(), id);
        id
    }

    #[inline]
    pub fn id(&self, name: &str) -> Option<TraitId> {
        self.ids.get(name).copied()
    }

    #[inline]
    pub fn name(&self, id: TraitId) -> &str {
        &self.names[id.index()]
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Traits in catalog order
    pub fn iter(&self) -> impl Iterator<Item = (TraitId, &str)> {
        self.names
            .iter()
            .enumerate()
            .map(|(i, name)| (TraitId(i as u32), name.as_str()))
    }
}

/// Mutable progress of one session
///
/// `history` is an append/pop stack holding one trait per answered
/// question; `len(history) == cursor` and `tally[t] == count(t in history)`
/// always hold.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionState {
    cursor: usize,
    tally: Vec<u32>,
    history: Vec<TraitId>,
}

impl SessionState {
    /// Fresh state for a catalog of `trait_count` traits and `capacity` questions
    pub fn new(trait_count: usize, capacity: usize) -> Self {
        Self {
            cursor: 0,
            tally: vec![0; trait_count],
            history: Vec::with_capacity(capacity),
        }
    }

    #[inline]
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Count for a trait
    #[inline]
    pub fn count(&self, id: TraitId) -> u32 {
        self.tally.get(id.index()).copied().unwrap_or(0)
    }

    /// Counts indexed by trait id
    #[inline]
    pub fn tally(&self) -> &[u32] {
        &self.tally
    }

    #[inline]
    pub fn history(&self) -> &[TraitId] {
        &self.history
    }

    /// Record an answer for the question at the cursor
    pub(crate) fn record(&mut self, id: TraitId) {
        if let Some(count) = self.tally.get_mut(id.index()) {
            *count += 1;
        }
        self.history.push(id);
        self.cursor += 1;
    }

    /// Undo the most recent answer, returning its trait
    pub(crate) fn undo(&mut self) -> Option<TraitId> {
        let id = self.history.pop()?;
        if let Some(count) = self.tally.get_mut(id.index()) {
            *count = count.saturating_sub(1);
        }
        self.cursor -= 1;
        Some(id)
    }

    /// Whether the cursor/tally/history relations hold
    pub fn is_consistent(&self) -> bool {
        if self.history.len() != self.cursor {
            return false;
        }
        let mut expected = vec![0u32; self.tally.len()];
        for id in &self.history {
            match expected.get_mut(id.index()) {
                Some(count) => *count += 1,
                None => return false,
            }
        }
        expected == self.tally
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_first_appearance_order() {
        let mut catalog = TraitCatalog::new();
        let creative = catalog.intern("Creative");
        let analytical = catalog.intern("Analytical");
        assert_eq!(catalog.intern("Creative"), creative);

        let names: Vec<&str> = catalog.iter().map(|(_, n)| n).collect();
        assert_eq!(names, vec!["Creative", "Analytical"]);
        assert_eq!(catalog.id("Analytical"), Some(analytical));
        assert_eq!(catalog.name(analytical), "Analytical");
        assert_eq!(catalog.id("Missing"), None);
    }

    #[test]
    fn test_record_and_undo() {
        let mut catalog = TraitCatalog::new();
        let a = catalog.intern("A");
        let b = catalog.intern("B");
        let mut state = SessionState::new(catalog.len(), 3);

        state.record(a);
        state.record(b);
        state.record(a);
        assert_eq!(state.cursor(), 3);
        assert_eq!(state.count(a), 2);
        assert_eq!(state.count(b), 1);
        assert!(state.is_consistent());

        assert_eq!(state.undo(), Some(a));
        assert_eq!(state.count(a), 1);
        assert_eq!(state.cursor(), 2);
        assert!(state.is_consistent());
    }

    #[test]
    fn test_undo_on_empty_is_noop() {
        let mut state = SessionState::new(2, 2);
        let before = state.clone();
        assert_eq!(state.undo(), None);
        assert_eq!(state, before);
    }
}
