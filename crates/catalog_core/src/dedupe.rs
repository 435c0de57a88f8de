use std::collections::HashSet;

use crate::{ImageId, ImageRecord};

/// Ids already materialized into the feed for the current epoch.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Deduplicator {
    seen: HashSet<ImageId>,
}

impl Deduplicator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the candidates not seen before, in their original order, and
    /// admits their ids. Only duplicate entries are dropped, including
    /// repeats inside the same batch.
    pub fn filter_new(&mut self, candidates: Vec<ImageRecord>) -> Vec<ImageRecord> {
        candidates
            .into_iter()
            .filter(|record| self.seen.insert(record.id.clone()))
            .collect()
    }

    pub fn contains(&self, id: &ImageId) -> bool {
        self.seen.contains(id)
    }

    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }

    pub fn reset(&mut self) {
        self.seen.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::Deduplicator;
    use crate::ImageRecord;

    fn batch(ids: &[&str]) -> Vec<ImageRecord> {
        ids.iter()
            .map(|id| ImageRecord::new(*id, format!("image {id}"), format!("https://img/{id}")))
            .collect()
    }

    fn ids(records: &[ImageRecord]) -> Vec<&str> {
        records.iter().map(|r| r.id.as_str()).collect()
    }

    #[test]
    fn overlapping_batches_keep_only_new_entries() {
        let mut dedupe = Deduplicator::new();
        let first = dedupe.filter_new(batch(&["a", "b", "c"]));
        assert_eq!(ids(&first), vec!["a", "b", "c"]);

        let second = dedupe.filter_new(batch(&["c", "d", "a", "e"]));
        assert_eq!(ids(&second), vec!["d", "e"]);
        assert_eq!(dedupe.len(), 5);
    }

    #[test]
    fn repeats_inside_one_batch_are_dropped() {
        let mut dedupe = Deduplicator::new();
        let fresh = dedupe.filter_new(batch(&["x", "x", "y"]));
        assert_eq!(ids(&fresh), vec!["x", "y"]);
    }

    #[test]
    fn reset_forgets_everything() {
        let mut dedupe = Deduplicator::new();
        dedupe.filter_new(batch(&["a"]));
        dedupe.reset();
        assert!(dedupe.is_empty());
        assert_eq!(ids(&dedupe.filter_new(batch(&["a"]))), vec!["a"]);
    }
}
