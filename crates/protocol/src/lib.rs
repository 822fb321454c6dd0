pub mod batch;
pub mod shared_str;
pub mod types;

pub use batch::TimelineBatch;
pub use shared_str::SharedStr;
pub use types::{Lineage, Snapshot, StreamStatus, Timestamp};
