use serde::{Deserialize, Deserializer, Serialize};

use crate::types::{Lineage, Snapshot};

/// One full server update: a complete replacement for both histories.
///
/// The wire fields are `workingSnapshots` and `pastSnapshots`. Decoding
/// is lenient per field: an absent field, a non-array field, or an array
/// whose elements do not decode all collapse to an empty sequence for
/// that lineage. Only a payload that is not valid JSON at all is an
/// error — that is the caller's payload-error case.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TimelineBatch {
    #[serde(deserialize_with = "snapshots_or_empty")]
    pub working_snapshots: Vec<Snapshot>,
    #[serde(deserialize_with = "snapshots_or_empty")]
    pub past_snapshots: Vec<Snapshot>,
}

impl TimelineBatch {
    /// Decode one `graph` event payload.
    pub fn decode(data: &str) -> Result<TimelineBatch, serde_json::Error> {
        serde_json::from_str(data)
    }

    pub fn lineage(&self, lineage: Lineage) -> &[Snapshot] {
        match lineage {
            Lineage::Working => &self.working_snapshots,
            Lineage::Past => &self.past_snapshots,
        }
    }
}

fn snapshots_or_empty<'de, D>(deserializer: D) -> Result<Vec<Snapshot>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).unwrap_or_default())
}
