use std::collections::VecDeque;

use crate::models::HistoryEntry;

pub const HISTORY_CAPACITY: usize = 20;

/// Bounded FIFO of vibe changes; oldest entries are evicted first.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct History {
    entries: VecDeque<HistoryEntry>,
}

impl History {
    pub fn push(&mut self, entry: HistoryEntry) {
        self.entries.push_back(entry);
        while self.entries.len() > HISTORY_CAPACITY {
            self.entries.pop_front();
        }
    }

    pub fn get(&self, index: usize) -> Option<&HistoryEntry> {
        self.entries.get(index)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Insertion order, oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &HistoryEntry> {
        self.entries.iter()
    }

    /// Display order: newest first, paired with the index `restore` expects.
    pub fn newest_first(&self) -> impl Iterator<Item = (usize, &HistoryEntry)> {
        self.entries.iter().enumerate().rev()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vibe::catalog;

    fn entry(n: usize) -> HistoryEntry {
        HistoryEntry {
            time: "09:00".into(),
            vibe_name: format!("vibe {n}"),
            trigger_text: format!("trigger {n}"),
            snapshot: catalog::default_vibe(),
        }
    }

    #[test]
    fn keeps_the_most_recent_entries_in_order() {
        let mut history = History::default();
        for n in 0..25 {
            history.push(entry(n));
        }
        assert_eq!(history.len(), HISTORY_CAPACITY);
        let names: Vec<_> = history.iter().map(|e| e.trigger_text.clone()).collect();
        let expected: Vec<_> = (5..25).map(|n| format!("trigger {n}")).collect();
        assert_eq!(names, expected);
    }

    #[test]
    fn newest_first_pairs_with_storage_index() {
        let mut history = History::default();
        for n in 0..3 {
            history.push(entry(n));
        }
        let order: Vec<_> = history.newest_first().map(|(i, _)| i).collect();
        assert_eq!(order, vec![2, 1, 0]);
        assert_eq!(history.get(2).unwrap().vibe_name, "vibe 2");
    }
}
