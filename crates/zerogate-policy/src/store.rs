//! The mutable policy registry.
//!
//! An arena `Vec` plus an id→index map, owned by the engine instance
//! rather than a process-wide singleton, so each test (and each tenant)
//! gets its own store. Synchronization lives with the owner: the store
//! itself is plain data, and the engine guards it with its own lock.

use std::collections::HashMap;

use zerogate_types::PolicyId;

use crate::model::{Policy, PolicyDraft, PolicyUpdate};

/// Ordered registry of access policies.
///
/// Insertion order is significant: policies with equal priority are
/// evaluated in the order they were added, so removal compacts the arena
/// without reordering the survivors.
#[derive(Debug, Default)]
pub struct PolicyStore {
    arena: Vec<Policy>,
    index: HashMap<PolicyId, usize>,
    next_id: u64,
}

impl PolicyStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store pre-loaded with the given drafts, in order.
    pub fn with_policies(drafts: impl IntoIterator<Item = PolicyDraft>) -> Self {
        let mut store = Self::new();
        for draft in drafts {
            store.add(draft);
        }
        store
    }

    /// Inserts a draft and returns its assigned ID.
    pub fn add(&mut self, draft: PolicyDraft) -> PolicyId {
        self.next_id += 1;
        let id = PolicyId::new(self.next_id);
        self.index.insert(id, self.arena.len());
        self.arena.push(draft.into_policy(id));
        id
    }

    /// Applies a partial update to the policy with the given ID.
    ///
    /// Returns `false` (not an error) when the ID is unknown.
    pub fn update(&mut self, id: PolicyId, update: PolicyUpdate) -> bool {
        match self.index.get(&id) {
            Some(&slot) => {
                update.apply(&mut self.arena[slot]);
                true
            }
            None => false,
        }
    }

    /// Removes the policy with the given ID.
    ///
    /// Returns `false` when the ID is unknown. The arena stays compact
    /// and in insertion order (equal-priority evaluation order is an
    /// invariant), so removal shifts later entries and rebuilds their
    /// index slots.
    pub fn remove(&mut self, id: PolicyId) -> bool {
        match self.index.remove(&id) {
            Some(slot) => {
                self.arena.remove(slot);
                for (i, policy) in self.arena.iter().enumerate().skip(slot) {
                    self.index.insert(policy.id, i);
                }
                true
            }
            None => false,
        }
    }

    /// Looks up a policy by ID.
    pub fn get(&self, id: PolicyId) -> Option<&Policy> {
        self.index.get(&id).map(|&slot| &self.arena[slot])
    }

    /// All stored policies in insertion order (enabled or not).
    pub fn all(&self) -> &[Policy] {
        &self.arena
    }

    /// Number of stored policies.
    pub fn len(&self) -> usize {
        self.arena.len()
    }

    /// Whether the store is empty.
    pub fn is_empty(&self) -> bool {
        self.arena.is_empty()
    }

    /// Clones the enabled policies, pre-sorted for evaluation (ascending
    /// priority, stable over insertion order).
    ///
    /// Evaluation runs on the snapshot, so the owner's lock is held only
    /// for the duration of this clone.
    pub fn evaluation_snapshot(&self) -> Vec<Policy> {
        let mut snapshot: Vec<Policy> = self.arena.iter().filter(|p| p.enabled).cloned().collect();
        snapshot.sort_by_key(|p| p.priority);
        snapshot
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Action, PolicyKind, PolicyUpdate};

    fn draft(name: &str, priority: i32) -> PolicyDraft {
        PolicyDraft::new(name, PolicyKind::User, priority).with_action(Action::Log)
    }

    #[test]
    fn test_add_assigns_distinct_ids() {
        let mut store = PolicyStore::new();
        let a = store.add(draft("a", 1));
        let b = store.add(draft("b", 2));
        assert_ne!(a, b);
        assert_eq!(store.len(), 2);
        assert_eq!(store.get(a).map(|p| p.name.as_str()), Some("a"));
    }

    #[test]
    fn test_update_unknown_id_returns_false() {
        let mut store = PolicyStore::new();
        assert!(!store.update(PolicyId::new(99), PolicyUpdate::default().rename("x")));
    }

    #[test]
    fn test_update_changes_policy() {
        let mut store = PolicyStore::new();
        let id = store.add(draft("old", 10));
        assert!(store.update(id, PolicyUpdate::default().rename("new").set_enabled(false)));

        let policy = store.get(id).expect("policy present");
        assert_eq!(policy.name, "new");
        assert!(!policy.enabled);
    }

    #[test]
    fn test_remove_keeps_index_consistent() {
        let mut store = PolicyStore::new();
        let a = store.add(draft("a", 1));
        let b = store.add(draft("b", 2));
        let c = store.add(draft("c", 3));

        assert!(store.remove(b));
        assert!(!store.remove(b), "second remove of the same id is a no-op");
        assert_eq!(store.len(), 2);
        assert_eq!(store.get(a).map(|p| p.name.as_str()), Some("a"));
        assert_eq!(store.get(c).map(|p| p.name.as_str()), Some("c"));
        assert_eq!(store.get(b), None);
    }

    #[test]
    fn test_remove_preserves_insertion_order() {
        let mut store = PolicyStore::new();
        store.add(draft("a", 5));
        let b = store.add(draft("b", 5));
        store.add(draft("c", 5));
        store.remove(b);

        let names: Vec<String> = store
            .evaluation_snapshot()
            .into_iter()
            .map(|p| p.name)
            .collect();
        assert_eq!(names, vec!["a".to_string(), "c".to_string()]);
    }

    #[test]
    fn test_snapshot_sorted_ascending_and_stable() {
        let mut store = PolicyStore::new();
        store.add(draft("late", 50));
        store.add(draft("first-tie", 10));
        store.add(draft("early", 1));
        store.add(draft("second-tie", 10));
        store.add(draft("hidden", 0).disabled());

        let order: Vec<String> = store
            .evaluation_snapshot()
            .into_iter()
            .map(|p| p.name)
            .collect();
        assert_eq!(order, vec!["early", "first-tie", "second-tie", "late"]);
    }
}
