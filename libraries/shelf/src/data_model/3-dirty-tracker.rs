//! # DirtyTracker
//! The DirtyTracker remembers which keys were written since listeners were last notified, and by whom.
//! This allows consumers of the shelf to know when to re-render or re-compute derived data.

use std::collections::BTreeMap;

use crate::data_model::ListenerKey;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DirtyState {
    /// Not dirty, no pending notifications
    Clean,
    /// Dirty, notify all listeners except the specified one
    DirtyExcept(ListenerKey),
    /// Dirty, notify all listeners
    DirtyAll,
}

impl DirtyState {
    fn mark(self, modifier: Option<ListenerKey>) -> Self {
        use DirtyState::*;
        match (self, modifier) {
            (Clean, Some(key)) => DirtyExcept(key),
            (DirtyExcept(key1), Some(key2)) if key1 == key2 => DirtyExcept(key1),
            (Clean, None) => DirtyAll,
            (DirtyExcept(_), _) | (DirtyAll, _) => DirtyAll,
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct DirtyTracker {
    keys: BTreeMap<String, DirtyState>,
}

impl DirtyTracker {
    pub fn mark_dirty(&mut self, key: &str, modifier: Option<ListenerKey>) {
        let state = self
            .keys
            .get(key)
            .copied()
            .unwrap_or(DirtyState::Clean)
            .mark(modifier);
        self.keys.insert(key.to_string(), state);
    }

    pub fn state(&self, key: &str) -> DirtyState {
        self.keys.get(key).copied().unwrap_or(DirtyState::Clean)
    }

    /// Returns every dirty key with its state, and resets all of them to clean.
    pub fn drain(&mut self) -> Vec<(String, DirtyState)> {
        std::mem::take(&mut self.keys)
            .into_iter()
            .filter(|(_, state)| *state != DirtyState::Clean)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys() -> (ListenerKey, ListenerKey) {
        let mut map = slotmap::SlotMap::<slotmap::DefaultKey, ()>::new();
        (ListenerKey(map.insert(())), ListenerKey(map.insert(())))
    }

    #[test]
    fn test_same_modifier_stays_excluded() {
        let (a, _) = keys();
        let mut tracker = DirtyTracker::default();
        tracker.mark_dirty("lists", Some(a));
        tracker.mark_dirty("lists", Some(a));
        assert_eq!(tracker.state("lists"), DirtyState::DirtyExcept(a));
    }

    #[test]
    fn test_different_modifiers_notify_everyone() {
        let (a, b) = keys();
        let mut tracker = DirtyTracker::default();
        tracker.mark_dirty("lists", Some(a));
        tracker.mark_dirty("lists", Some(b));
        assert_eq!(tracker.state("lists"), DirtyState::DirtyAll);
    }

    #[test]
    fn test_drain_resets() {
        let mut tracker = DirtyTracker::default();
        tracker.mark_dirty("lists", None);
        assert_eq!(
            tracker.drain(),
            vec![("lists".to_string(), DirtyState::DirtyAll)]
        );
        assert_eq!(tracker.state("lists"), DirtyState::Clean);
        assert!(tracker.drain().is_empty());
    }
}
