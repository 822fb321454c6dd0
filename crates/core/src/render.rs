//! Graph renderer: DOT source in, SVG artifact out.
//!
//! Thin adapter over the layout engine. The engine handle is
//! process-lifetime shared state behind a once-cell: the first `init`
//! performs the one-time startup (a probe layout), later calls return
//! immediately, and `render` refuses to run until startup has resolved.

use layout::backends::svg::SVGWriter;
use layout::gv;
use thiserror::Error;
use tokio::sync::OnceCell;

#[derive(Debug, Error)]
pub enum RenderError {
    /// The input is not syntactically valid graph source.
    #[error("invalid graph source: {0}")]
    InvalidDot(String),
    /// `render` was called before `init` resolved.
    #[error("layout engine not initialized")]
    EngineNotReady,
}

/// A successfully laid-out snapshot.
#[derive(Debug, Clone)]
pub struct RenderedGraph {
    /// Standalone SVG document.
    pub svg: String,
}

/// The one layout-engine instance for the process lifetime.
///
/// Access is single-threaded (one UI task), so the handle carries no
/// locking; the once-cell only guards startup.
#[derive(Debug)]
pub struct LayoutEngine;

impl LayoutEngine {
    fn start() -> Result<LayoutEngine, RenderError> {
        let engine = LayoutEngine;
        // Probe layout so a broken engine surfaces at startup, not on
        // the first live snapshot.
        engine.layout("digraph { boot -> ready; }")?;
        Ok(engine)
    }

    fn layout(&self, dot: &str) -> Result<String, RenderError> {
        let graph = gv::DotParser::new(dot)
            .process()
            .map_err(RenderError::InvalidDot)?;
        let mut builder = gv::GraphBuilder::new();
        builder.visit_graph(&graph);
        let mut visual = builder.get();
        let mut writer = SVGWriter::new();
        visual.do_it(false, false, false, &mut writer);
        Ok(writer.finalize())
    }
}

#[derive(Debug, Default)]
pub struct GraphRenderer {
    engine: OnceCell<LayoutEngine>,
}

impl GraphRenderer {
    pub fn new() -> Self {
        Self {
            engine: OnceCell::new(),
        }
    }

    /// One-time engine startup. Idempotent: the first call may suspend
    /// while the engine warms up; subsequent calls return the cached
    /// handle without duplicate work.
    pub async fn init(&self) -> Result<(), RenderError> {
        self.engine
            .get_or_try_init(|| async { LayoutEngine::start() })
            .await?;
        Ok(())
    }

    /// Lay out DOT source into an SVG artifact.
    ///
    /// Failure is local: callers keep the previously displayed artifact
    /// and annotate their status line.
    pub fn render(&self, dot: &str) -> Result<RenderedGraph, RenderError> {
        let engine = self.engine.get().ok_or(RenderError::EngineNotReady)?;
        let svg = engine.layout(dot)?;
        Ok(RenderedGraph { svg })
    }
}
