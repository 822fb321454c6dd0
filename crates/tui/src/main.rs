mod app;
mod renderer;

use std::io::stdout;
use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::Parser;
use crossterm::{
    event::EventStream,
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use dotwatch_client::{StreamConfig, StreamEvent};
use dotwatch_core::GraphRenderer;
use futures_util::StreamExt;
use ratatui::{Terminal, backend::CrosstermBackend};
use tokio::sync::mpsc;
use tracing_subscriber::EnvFilter;
use url::Url;

use app::App;

#[derive(Parser)]
#[command(name = "dotwatch", about = "Live terminal viewer for graph snapshot streams")]
struct Args {
    /// Event stream endpoint.
    #[arg(default_value = "http://127.0.0.1:7878/events")]
    endpoint: Url,
    /// Write the latest rendered SVG artifact to this path.
    #[arg(long)]
    svg_out: Option<PathBuf>,
    /// Append logs here; stderr would corrupt the alternate screen.
    #[arg(long, default_value = "dotwatch.log")]
    log_file: PathBuf,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(&args.log_file)?;

    // One-time engine startup, before the first render.
    let graph_renderer = GraphRenderer::new();
    graph_renderer.init().await?;

    let (tx, rx) = mpsc::channel(64);
    tokio::spawn(dotwatch_client::run(
        StreamConfig::new(args.endpoint.clone()),
        tx,
    ));

    enable_raw_mode()?;
    let mut out = stdout();
    execute!(out, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(out);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(args.endpoint, graph_renderer, args.svg_out);
    let result = run_loop(&mut terminal, &mut app, rx).await;

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    result
}

async fn run_loop(
    terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
    app: &mut App,
    mut rx: mpsc::Receiver<StreamEvent>,
) -> Result<()> {
    let mut input = EventStream::new();
    loop {
        terminal.draw(|frame| renderer::draw(frame, app))?;
        tokio::select! {
            Some(event) = rx.recv() => app.apply_stream_event(event),
            maybe_event = input.next() => {
                if let Some(Ok(event)) = maybe_event
                    && app.handle_input(&event)
                {
                    break;
                }
            }
        }
    }
    Ok(())
}

fn init_logging(path: &Path) -> Result<()> {
    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)?;
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(file)
        .with_ansi(false)
        .init();
    Ok(())
}
