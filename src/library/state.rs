use serde::Serialize;

use crate::gateway::Pagination;
use crate::models::Swing;

/// Most swings a comparison can hold at once.
pub const MAX_SELECTION: usize = 2;
/// Fewest swings needed before the comparison view opens.
pub const MIN_COMPARE: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum SelectionChange {
    Added,
    Removed,
    /// Selection already full, or the id is not in the library.
    Ignored,
}

/// Insertion-ordered swing ids picked for comparison.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Selection {
    ids: Vec<String>,
}

impl Selection {
    pub fn toggle(&mut self, id: &str) -> SelectionChange {
        if self.remove(id) {
            return SelectionChange::Removed;
        }
        if self.ids.len() >= MAX_SELECTION {
            return SelectionChange::Ignored;
        }
        self.ids.push(id.to_string());
        SelectionChange::Added
    }

    pub fn remove(&mut self, id: &str) -> bool {
        let before = self.ids.len();
        self.ids.retain(|selected| selected != id);
        self.ids.len() != before
    }

    pub fn clear(&mut self) {
        self.ids.clear();
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ids.iter().any(|selected| selected == id)
    }

    pub fn ids(&self) -> &[String] {
        &self.ids
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn can_compare(&self) -> bool {
        self.ids.len() >= MIN_COMPARE
    }

    fn retain_known(&mut self, swings: &[Swing]) {
        self.ids
            .retain(|id| swings.iter().any(|swing| &swing.id == id));
    }
}

/// What the webview needs to render the library page.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LibrarySnapshot {
    pub swings: Vec<Swing>,
    pub selection: Vec<String>,
    pub can_compare: bool,
    pub pagination: Option<Pagination>,
}

/// The fetched swing collection plus the comparison selection.
///
/// Every selected id refers to a swing currently in the collection.
#[derive(Debug, Clone, Default)]
pub struct LibraryStore {
    swings: Vec<Swing>,
    selection: Selection,
    pagination: Option<Pagination>,
}

impl LibraryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn swings(&self) -> &[Swing] {
        &self.swings
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn find(&self, id: &str) -> Option<&Swing> {
        self.swings.iter().find(|swing| swing.id == id)
    }

    /// Replaces the collection with a fresh fetch. Selected ids that no
    /// longer exist are dropped.
    pub fn set_swings(&mut self, swings: Vec<Swing>) {
        self.swings = swings;
        self.selection.retain_known(&self.swings);
    }

    pub fn set_pagination(&mut self, pagination: Option<Pagination>) {
        self.pagination = pagination;
    }

    /// Puts a just-created swing at the top of the collection.
    pub fn prepend(&mut self, swing: Swing) {
        self.swings.retain(|existing| existing.id != swing.id);
        self.swings.insert(0, swing);
    }

    /// Swaps an edited swing in place. Returns false if it is not loaded.
    pub fn replace(&mut self, swing: Swing) -> bool {
        match self.swings.iter_mut().find(|existing| existing.id == swing.id) {
            Some(slot) => {
                *slot = swing;
                true
            }
            None => false,
        }
    }

    /// Drops the swing from the collection and the selection together.
    pub fn remove(&mut self, id: &str) -> Option<Swing> {
        self.selection.remove(id);
        let index = self.swings.iter().position(|swing| swing.id == id)?;
        Some(self.swings.remove(index))
    }

    pub fn toggle_selection(&mut self, id: &str) -> SelectionChange {
        if !self.selection.contains(id) && self.find(id).is_none() {
            return SelectionChange::Ignored;
        }
        self.selection.toggle(id)
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }

    /// Selected swings in selection order.
    pub fn selected_swings(&self) -> Vec<Swing> {
        self.selection
            .ids()
            .iter()
            .filter_map(|id| self.find(id).cloned())
            .collect()
    }

    pub fn snapshot(&self) -> LibrarySnapshot {
        LibrarySnapshot {
            swings: self.swings.clone(),
            selection: self.selection.ids().to_vec(),
            can_compare: self.selection.can_compare(),
            pagination: self.pagination,
        }
    }
}
