use std::fs;
use std::path::PathBuf;

use crossterm::event::{Event, KeyCode, KeyEventKind};
use dotwatch_client::StreamEvent;
use dotwatch_core::{GraphRenderer, Selection, SnapshotStore, TimelineDisplay, TimelineEvent};
use dotwatch_protocol::{SharedStr, StreamStatus};
use tracing::warn;
use url::Url;

/// The artifact currently on screen. Retained across failed renders so
/// the display freezes instead of blanking.
pub struct Artifact {
    pub id: SharedStr,
    pub dot: SharedStr,
    pub svg_bytes: usize,
}

/// All mutable viewer state, confined to the UI task.
pub struct App {
    pub endpoint: Url,
    store: SnapshotStore,
    selection: Selection,
    pub display: TimelineDisplay,
    renderer: GraphRenderer,
    svg_out: Option<PathBuf>,
    pub connected: bool,
    pub status_text: String,
    pub artifact: Option<Artifact>,
    pub scroll: u16,
}

impl App {
    pub fn new(endpoint: Url, renderer: GraphRenderer, svg_out: Option<PathBuf>) -> Self {
        let store = SnapshotStore::new();
        let selection = Selection::new();
        let display = TimelineDisplay::derive(&selection, &store);
        Self {
            endpoint,
            store,
            selection,
            display,
            renderer,
            svg_out,
            connected: false,
            status_text: "Connecting...".to_string(),
            artifact: None,
            scroll: 0,
        }
    }

    pub fn apply_stream_event(&mut self, event: StreamEvent) {
        match event {
            StreamEvent::Status(status) => {
                self.connected = status == StreamStatus::Connected;
                self.status_text = status.label().to_string();
            }
            StreamEvent::Batch(batch) => {
                self.store.replace(batch);
                self.selection = self.selection.apply(TimelineEvent::Merge, &self.store);
                self.refresh();
            }
            StreamEvent::PayloadError(err) => {
                // Timeline state is untouched; only the status degrades.
                warn!("payload error: {err}");
                self.status_text = "Payload error".to_string();
            }
        }
    }

    /// Returns true when the viewer should quit.
    pub fn handle_input(&mut self, event: &Event) -> bool {
        let Event::Key(key) = event else {
            return false;
        };
        if key.kind != KeyEventKind::Press {
            return false;
        }
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => return true,
            KeyCode::Char('l') => self.apply_action(TimelineEvent::GoLive),
            KeyCode::Tab => {
                let target = self.selection.lineage.other();
                self.apply_action(TimelineEvent::SwitchLineage(target));
            }
            KeyCode::Left => self.scrub_by(-1),
            KeyCode::Right => self.scrub_by(1),
            KeyCode::Home => self.apply_action(TimelineEvent::Scrub(0)),
            KeyCode::End => {
                let len = self.store.get(self.selection.lineage).len();
                if len > 0 {
                    self.apply_action(TimelineEvent::Scrub(len - 1));
                }
            }
            KeyCode::Up => self.scroll = self.scroll.saturating_sub(1),
            KeyCode::Down => self.scroll = self.scroll.saturating_add(1),
            _ => {}
        }
        false
    }

    fn scrub_by(&mut self, delta: isize) {
        let Some(index) = self.selection.resolved_index(&self.store) else {
            return;
        };
        self.apply_action(TimelineEvent::Scrub(index.saturating_add_signed(delta)));
    }

    fn apply_action(&mut self, event: TimelineEvent) {
        self.selection = self.selection.apply(event, &self.store);
        self.refresh();
    }

    /// Re-derive display metadata and render the resolved snapshot.
    ///
    /// A render failure keeps the previous artifact on screen and only
    /// annotates the status line.
    fn refresh(&mut self) {
        self.display = TimelineDisplay::derive(&self.selection, &self.store);
        let Some(snapshot) = self.selection.selected(&self.store).cloned() else {
            self.artifact = None;
            self.scroll = 0;
            return;
        };
        match self.renderer.render(&snapshot.dot) {
            Ok(rendered) => {
                if let Some(path) = &self.svg_out
                    && let Err(err) = fs::write(path, &rendered.svg)
                {
                    warn!("svg export failed: {err}");
                }
                let changed = self
                    .artifact
                    .as_ref()
                    .is_none_or(|artifact| artifact.id != snapshot.id);
                if changed {
                    self.scroll = 0;
                }
                self.artifact = Some(Artifact {
                    id: snapshot.id.clone(),
                    dot: snapshot.dot.clone(),
                    svg_bytes: rendered.svg.len(),
                });
                if self.connected {
                    self.status_text = "Connected".to_string();
                }
            }
            Err(err) => {
                warn!("render error: {err}");
                self.status_text = "Render error".to_string();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dotwatch_protocol::{Snapshot, TimelineBatch, Timestamp};

    fn snap(id: &str, dot: &str) -> Snapshot {
        Snapshot {
            id: id.into(),
            timestamp: Timestamp::Millis(1_700_000_000_000),
            dot: dot.into(),
        }
    }

    async fn app() -> App {
        let renderer = GraphRenderer::new();
        renderer.init().await.expect("engine should start");
        App::new(
            Url::parse("http://127.0.0.1:7878/events").expect("static url parses"),
            renderer,
            None,
        )
    }

    #[tokio::test]
    async fn batch_renders_the_newest_snapshot() {
        let mut app = app().await;
        app.apply_stream_event(StreamEvent::Status(StreamStatus::Connected));
        app.apply_stream_event(StreamEvent::Batch(TimelineBatch {
            working_snapshots: vec![
                snap("w1", "digraph { a -> b }"),
                snap("w2", "digraph { a -> c }"),
            ],
            past_snapshots: vec![],
        }));
        let artifact = app.artifact.as_ref().expect("snapshot should render");
        assert_eq!(artifact.id, "w2");
        assert!(artifact.svg_bytes > 0);
        assert_eq!(app.display.position, Some(2));
    }

    #[tokio::test]
    async fn payload_error_freezes_the_display() {
        let mut app = app().await;
        app.apply_stream_event(StreamEvent::Status(StreamStatus::Connected));
        app.apply_stream_event(StreamEvent::Batch(TimelineBatch {
            working_snapshots: vec![snap("w1", "digraph { a -> b }")],
            past_snapshots: vec![],
        }));

        app.apply_stream_event(StreamEvent::PayloadError("bad payload".to_string()));
        assert_eq!(app.status_text, "Payload error");
        assert_eq!(
            app.artifact.as_ref().map(|a| a.id.as_str()),
            Some("w1"),
            "prior artifact must survive a payload error"
        );
        assert_eq!(app.display.total, 1);

        // The next valid payload restores normal operation.
        app.apply_stream_event(StreamEvent::Batch(TimelineBatch {
            working_snapshots: vec![
                snap("w1", "digraph { a -> b }"),
                snap("w2", "digraph { a -> c }"),
            ],
            past_snapshots: vec![],
        }));
        assert_eq!(app.status_text, "Connected");
        assert_eq!(app.artifact.as_ref().map(|a| a.id.as_str()), Some("w2"));
    }

    #[tokio::test]
    async fn render_failure_keeps_the_previous_artifact() {
        let mut app = app().await;
        app.apply_stream_event(StreamEvent::Status(StreamStatus::Connected));
        app.apply_stream_event(StreamEvent::Batch(TimelineBatch {
            working_snapshots: vec![snap("w1", "digraph { a -> b }")],
            past_snapshots: vec![],
        }));
        app.apply_stream_event(StreamEvent::Batch(TimelineBatch {
            working_snapshots: vec![
                snap("w1", "digraph { a -> b }"),
                snap("w2", "digraph {{{ not dot"),
            ],
            past_snapshots: vec![],
        }));
        assert_eq!(app.status_text, "Render error");
        assert_eq!(app.artifact.as_ref().map(|a| a.id.as_str()), Some("w1"));
        // The timeline itself still advanced.
        assert_eq!(app.display.total, 2);
        assert_eq!(app.display.position, Some(2));
    }
}
