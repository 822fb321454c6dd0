pub mod render;
pub mod store;
pub mod timeline;

pub use render::{GraphRenderer, RenderError, RenderedGraph};
pub use store::SnapshotStore;
pub use timeline::{Mode, Selection, TimelineDisplay, TimelineEvent};
