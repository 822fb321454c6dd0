use chrono::{DateTime, Local, LocalResult, TimeZone};
use serde::{Deserialize, Serialize};

use crate::shared_str::SharedStr;

/// Which snapshot history a selection points at.
///
/// `Working` tracks uncommitted state and may shrink to empty when the
/// underlying changes are committed or cleared; `Past` is the archive of
/// committed states. Each incoming batch fully replaces both.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Lineage {
    Working,
    Past,
}

impl Lineage {
    /// The opposite lineage, for toggle-style selectors.
    pub fn other(self) -> Lineage {
        match self {
            Lineage::Working => Lineage::Past,
            Lineage::Past => Lineage::Working,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Lineage::Working => "working",
            Lineage::Past => "past",
        }
    }
}

/// Capture time of a snapshot, as the server sent it.
///
/// The server may emit epoch milliseconds or an ISO-8601 string; either
/// way it is display-only data and never ordered or compared.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Timestamp {
    Millis(i64),
    Text(SharedStr),
}

impl Timestamp {
    /// Local wall-clock time for the status line (`HH:MM:SS`).
    ///
    /// Unparseable text falls through verbatim rather than erroring —
    /// a bad timestamp should never block showing the snapshot.
    pub fn display_time(&self) -> String {
        match self {
            Timestamp::Millis(ms) => match Local.timestamp_millis_opt(*ms) {
                LocalResult::Single(dt) => dt.format("%H:%M:%S").to_string(),
                _ => ms.to_string(),
            },
            Timestamp::Text(s) => DateTime::parse_from_rfc3339(s)
                .map(|dt| dt.with_timezone(&Local).format("%H:%M:%S").to_string())
                .unwrap_or_else(|_| s.to_string()),
        }
    }
}

/// One point-in-time graph capture.
///
/// Created by the server, transmitted once, never mutated by the client;
/// later batches supersede it wholesale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Opaque server-assigned identifier, stable across updates.
    pub id: SharedStr,
    /// Capture time, display only.
    pub timestamp: Timestamp,
    /// DOT source of the captured graph.
    pub dot: SharedStr,
}

/// Observable connection state of the event stream.
///
/// Payload errors are transient and reported separately; they do not
/// change the connection state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamStatus {
    Connected,
    Reconnecting,
}

impl StreamStatus {
    pub fn label(self) -> &'static str {
        match self {
            StreamStatus::Connected => "Connected",
            StreamStatus::Reconnecting => "Reconnecting...",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_decodes_both_timestamp_forms() {
        let millis: Snapshot =
            serde_json::from_str(r#"{"id":"w1","timestamp":1700000000000,"dot":"digraph {}"}"#)
                .expect("millis form should decode");
        assert_eq!(millis.timestamp, Timestamp::Millis(1_700_000_000_000));

        let text: Snapshot = serde_json::from_str(
            r#"{"id":"p1","timestamp":"2026-08-07T10:15:00Z","dot":"digraph {}"}"#,
        )
        .expect("text form should decode");
        assert_eq!(
            text.timestamp,
            Timestamp::Text("2026-08-07T10:15:00Z".into())
        );
    }

    #[test]
    fn display_time_formats_rfc3339() {
        let ts = Timestamp::Text("2026-08-07T10:15:00Z".into());
        let shown = ts.display_time();
        // Local offset varies; the shape is HH:MM:SS.
        assert_eq!(shown.len(), 8);
        assert_eq!(shown.matches(':').count(), 2);
    }

    #[test]
    fn display_time_passes_garbage_through() {
        let ts = Timestamp::Text("not a time".into());
        assert_eq!(ts.display_time(), "not a time");
    }

    #[test]
    fn lineage_other_toggles() {
        assert_eq!(Lineage::Working.other(), Lineage::Past);
        assert_eq!(Lineage::Past.other(), Lineage::Working);
    }
}
