//! Timeline selection state machine.
//!
//! Owns which lineage is viewed, whether the view follows the newest
//! snapshot (live) or is pinned to an index (manual), and how that
//! selection reconciles with every incoming batch. Transitions are total
//! pure functions over `(Selection, event, store)`; rendering is a
//! separate side-effect step driven by the resolved selection.

use dotwatch_protocol::{Lineage, SharedStr, Snapshot};

use crate::store::SnapshotStore;

/// Empty-state notice for an empty working history.
pub const WORKING_EMPTY_NOTICE: &str = "No uncommitted changes. Waiting for file changes...";
/// Empty-state notice for an empty past history.
pub const PAST_EMPTY_NOTICE: &str =
    "No past snapshots yet. Commit or clear working changes to archive snapshots.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Always show the newest snapshot in the selected lineage.
    Live,
    /// Show a pinned index, preserved across merges while in bounds.
    Manual,
}

/// The controller's whole state: lineage, mode, and the pin.
///
/// `pinned` is meaningful only in `Manual` mode and is re-clamped on
/// every merge and lineage switch, so a resolved index is never out of
/// bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Selection {
    pub lineage: Lineage,
    pub mode: Mode,
    pub pinned: usize,
}

impl Default for Selection {
    fn default() -> Self {
        Self {
            lineage: Lineage::Working,
            mode: Mode::Live,
            pinned: 0,
        }
    }
}

/// Inputs to the state machine: one merge notification and three user
/// gestures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimelineEvent {
    /// A new batch was stored; reconcile the selection against it.
    Merge,
    /// Drag/scrub to an index (clamped here regardless of the control).
    Scrub(usize),
    /// Return to following the newest snapshot.
    GoLive,
    /// Request to view the given lineage.
    SwitchLineage(Lineage),
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply one event and return the next state. Total: no event can
    /// fail, and the result always satisfies the selection invariants.
    #[must_use]
    pub fn apply(self, event: TimelineEvent, store: &SnapshotStore) -> Selection {
        match event {
            TimelineEvent::Merge => self.merged(store),
            TimelineEvent::Scrub(index) => self.scrubbed(index, store),
            TimelineEvent::GoLive => Selection {
                mode: Mode::Live,
                ..self
            },
            TimelineEvent::SwitchLineage(lineage) => self.switched(lineage, store),
        }
    }

    fn merged(self, store: &SnapshotStore) -> Selection {
        let mut next = self;

        // Viewing a past history that just drained: fall back to working.
        if next.lineage == Lineage::Past && store.is_empty(Lineage::Past) {
            next.lineage = Lineage::Working;
            next.mode = Mode::Live;
        }

        let len = store.len(next.lineage);
        if len == 0 {
            // Nothing to pin to.
            next.mode = Mode::Live;
            return next;
        }

        if next.mode == Mode::Manual {
            // The pin survives the merge as long as it stays in bounds;
            // a shrunken history clamps it to the newest remaining entry.
            next.pinned = next.pinned.min(len - 1);
        }
        next
    }

    fn scrubbed(self, index: usize, store: &SnapshotStore) -> Selection {
        let len = store.len(self.lineage);
        if len == 0 {
            return self;
        }
        Selection {
            mode: Mode::Manual,
            pinned: index.min(len - 1),
            ..self
        }
    }

    fn switched(self, lineage: Lineage, store: &SnapshotStore) -> Selection {
        // Disabled affordance, not an error: an empty past cannot be viewed.
        if lineage == Lineage::Past && store.is_empty(Lineage::Past) {
            return self;
        }
        Selection {
            lineage,
            mode: Mode::Live,
            pinned: 0,
        }
    }

    /// The index this selection renders, or `None` when the selected
    /// sequence is empty.
    pub fn resolved_index(&self, store: &SnapshotStore) -> Option<usize> {
        let len = store.len(self.lineage);
        if len == 0 {
            return None;
        }
        match self.mode {
            Mode::Live => Some(len - 1),
            Mode::Manual => Some(self.pinned.min(len - 1)),
        }
    }

    /// The snapshot this selection renders, if any.
    pub fn selected<'a>(&self, store: &'a SnapshotStore) -> Option<&'a Snapshot> {
        let index = self.resolved_index(store)?;
        store.get(self.lineage).get(index)
    }
}

/// Everything the view needs after a transition, derived in one place so
/// the bindings stay dumb.
#[derive(Debug, Clone, PartialEq)]
pub struct TimelineDisplay {
    /// Snapshot count in the selected lineage.
    pub total: usize,
    /// 1-based position of the rendered snapshot.
    pub position: Option<usize>,
    pub snapshot_id: Option<SharedStr>,
    /// Formatted capture time of the rendered snapshot.
    pub timestamp: Option<String>,
    /// Human label distinguishing live/pinned and working/past.
    pub mode_label: &'static str,
    /// One-line position summary for the status area.
    pub meta_line: String,
    /// Go-live affordance: enabled iff manual mode and non-empty.
    pub go_live_enabled: bool,
    /// Past affordance: enabled iff the past history is non-empty.
    pub past_enabled: bool,
    /// Range control state. Disabled with fewer than two snapshots.
    pub slider_enabled: bool,
    pub slider_max: usize,
    pub slider_value: usize,
    /// Lineage-specific notice shown instead of a render when empty.
    pub empty_notice: Option<&'static str>,
}

impl TimelineDisplay {
    pub fn derive(selection: &Selection, store: &SnapshotStore) -> TimelineDisplay {
        let sequence = store.get(selection.lineage);
        let total = sequence.len();
        let index = selection.resolved_index(store);
        let snapshot = index.and_then(|i| sequence.get(i));

        let mode_label = match (selection.mode, selection.lineage) {
            (Mode::Manual, Lineage::Past) => "Past snapshot",
            (Mode::Manual, Lineage::Working) => "Working snapshot",
            (Mode::Live, Lineage::Past) => "Past commits (latest)",
            (Mode::Live, Lineage::Working) => "Working directory (live)",
        };

        let meta_line = match (snapshot, index) {
            (Some(snapshot), Some(i)) => format!(
                "{total} snapshots | #{}/{} | id {} | {}",
                i + 1,
                total,
                snapshot.id,
                snapshot.timestamp.display_time(),
            ),
            _ => format!("0 {} snapshots", selection.lineage.label()),
        };

        let empty_notice = if total == 0 {
            Some(match selection.lineage {
                Lineage::Working => WORKING_EMPTY_NOTICE,
                Lineage::Past => PAST_EMPTY_NOTICE,
            })
        } else {
            None
        };

        TimelineDisplay {
            total,
            position: index.map(|i| i + 1),
            snapshot_id: snapshot.map(|s| s.id.clone()),
            timestamp: snapshot.map(|s| s.timestamp.display_time()),
            mode_label,
            meta_line,
            go_live_enabled: selection.mode == Mode::Manual && total > 0,
            past_enabled: !store.is_empty(Lineage::Past),
            slider_enabled: total > 1,
            slider_max: total.saturating_sub(1),
            slider_value: index.unwrap_or(0),
            empty_notice,
        }
    }
}
