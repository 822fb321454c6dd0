use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Gauge, Paragraph},
};

use crate::app::App;

pub fn draw(frame: &mut Frame, app: &App) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // status
            Constraint::Length(1), // meta
            Constraint::Length(1), // timeline gauge
            Constraint::Min(1),    // snapshot source
            Constraint::Length(1), // key help
        ])
        .split(frame.area());

    // Status bar: connection state, endpoint, selection label.
    let status_style = if app.connected {
        Style::default().fg(Color::Green)
    } else {
        Style::default().fg(Color::Red)
    };
    let status = Paragraph::new(Line::from(vec![
        Span::styled(format!(" {} ", app.status_text), status_style.add_modifier(Modifier::BOLD)),
        Span::raw("| "),
        Span::styled(app.endpoint.to_string(), Style::default().fg(Color::Gray)),
        Span::raw(" | "),
        Span::styled(app.display.mode_label, Style::default().fg(Color::White)),
    ]))
    .style(Style::default().bg(Color::DarkGray));
    frame.render_widget(status, rows[0]);

    // Meta line: position summary plus artifact size when one is up.
    let meta = match &app.artifact {
        Some(artifact) => format!(" {} | svg {} bytes", app.display.meta_line, artifact.svg_bytes),
        None => format!(" {}", app.display.meta_line),
    };
    frame.render_widget(
        Paragraph::new(meta).style(Style::default().fg(Color::Gray)),
        rows[1],
    );

    // Timeline gauge: the slider analog. Disabled with <2 snapshots.
    let (ratio, label, gauge_style) = if app.display.slider_enabled {
        (
            app.display.slider_value as f64 / app.display.slider_max.max(1) as f64,
            format!(
                "#{}/{}",
                app.display.position.unwrap_or(0),
                app.display.total
            ),
            Style::default().fg(Color::Cyan).bg(Color::Black),
        )
    } else {
        (
            0.0,
            "timeline".to_string(),
            Style::default().fg(Color::DarkGray).bg(Color::Black),
        )
    };
    frame.render_widget(
        Gauge::default().gauge_style(gauge_style).ratio(ratio).label(label),
        rows[2],
    );

    // Main panel: the selected snapshot's DOT source, or the lineage
    // empty-state notice.
    let title = match &app.artifact {
        Some(artifact) => format!(" {} — dot source ", artifact.id),
        None => " graph ".to_string(),
    };
    let block = Block::default().borders(Borders::ALL).title(title);
    let body = match (&app.artifact, app.display.empty_notice) {
        (_, Some(notice)) => Paragraph::new(notice).style(Style::default().fg(Color::Yellow)),
        (Some(artifact), None) => {
            let visible = rows[3].height.saturating_sub(2);
            let lines = artifact.dot.lines().count() as u16;
            let scroll = app.scroll.min(lines.saturating_sub(visible));
            Paragraph::new(artifact.dot.as_str()).scroll((scroll, 0))
        }
        (None, None) => {
            Paragraph::new("Waiting for snapshots...").style(Style::default().fg(Color::DarkGray))
        }
    };
    frame.render_widget(body.block(block), rows[3]);

    frame.render_widget(
        Paragraph::new(" ←/→ scrub | Home/End jump | l live | Tab lineage | ↑/↓ scroll | q quit ")
            .style(Style::default().fg(Color::DarkGray)),
        rows[4],
    );
}
