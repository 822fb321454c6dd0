use dotwatch_protocol::{Lineage, Snapshot, TimelineBatch};

/// Holder of the two ordered snapshot histories, as last received.
///
/// Every incoming batch is authoritative and complete, so `replace` is
/// the only mutation: both sequences are overwritten unconditionally.
/// Any leniency toward malformed input lives in batch decoding, not here.
#[derive(Debug, Clone, Default)]
pub struct SnapshotStore {
    working: Vec<Snapshot>,
    past: Vec<Snapshot>,
}

impl SnapshotStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Overwrite both histories with the batch's sequences.
    pub fn replace(&mut self, batch: TimelineBatch) {
        self.working = batch.working_snapshots;
        self.past = batch.past_snapshots;
    }

    pub fn get(&self, lineage: Lineage) -> &[Snapshot] {
        match lineage {
            Lineage::Working => &self.working,
            Lineage::Past => &self.past,
        }
    }

    pub fn len(&self, lineage: Lineage) -> usize {
        self.get(lineage).len()
    }

    pub fn is_empty(&self, lineage: Lineage) -> bool {
        self.get(lineage).is_empty()
    }

    /// Newest snapshot in the lineage, if any.
    pub fn latest(&self, lineage: Lineage) -> Option<&Snapshot> {
        self.get(lineage).last()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dotwatch_protocol::Timestamp;

    fn snap(id: &str) -> Snapshot {
        Snapshot {
            id: id.into(),
            timestamp: Timestamp::Millis(0),
            dot: "digraph { a -> b }".into(),
        }
    }

    fn batch(working: &[&str], past: &[&str]) -> TimelineBatch {
        TimelineBatch {
            working_snapshots: working.iter().map(|id| snap(id)).collect(),
            past_snapshots: past.iter().map(|id| snap(id)).collect(),
        }
    }

    #[test]
    fn replace_returns_exactly_what_went_in() {
        let b = batch(&["w1", "w2"], &["p1"]);
        let mut store = SnapshotStore::new();
        store.replace(b.clone());
        assert_eq!(store.get(Lineage::Working), b.working_snapshots.as_slice());
        assert_eq!(store.get(Lineage::Past), b.past_snapshots.as_slice());
    }

    #[test]
    fn replace_overwrites_not_appends() {
        let mut store = SnapshotStore::new();
        store.replace(batch(&["w1", "w2", "w3"], &[]));
        store.replace(batch(&["w4"], &["p1"]));
        assert_eq!(store.len(Lineage::Working), 1);
        assert_eq!(store.get(Lineage::Working)[0].id, "w4");
        assert_eq!(store.len(Lineage::Past), 1);
    }

    #[test]
    fn latest_is_the_last_element() {
        let mut store = SnapshotStore::new();
        store.replace(batch(&["w1", "w2"], &[]));
        assert_eq!(store.latest(Lineage::Working).map(|s| s.id.as_str()), Some("w2"));
        assert!(store.latest(Lineage::Past).is_none());
    }
}
