//! Pure view/render functions for the TUI.
//!
//! Functions here take `&AppState` by immutable reference, draw to a ratatui
//! Frame, and never mutate state or return effects.

use deck_engine::FontScale;
use deck_types::{Step, StepKind};
use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, List, ListItem, Paragraph, Wrap};
use unicode_width::UnicodeWidthStr;

use crate::modules::ModuleKind;
use crate::state::{AppState, ModuleView};

/// Height of the status line at the bottom.
const STATUS_HEIGHT: u16 = 1;

/// Width of the module sidebar (hidden in fullscreen).
const SIDEBAR_WIDTH: u16 = 28;

/// Renders the entire TUI to the frame.
pub fn render(app: &AppState, frame: &mut Frame) {
    let area = frame.area();

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(1), Constraint::Length(STATUS_HEIGHT)])
        .split(area);

    if app.nav.is_fullscreen() {
        render_content(app, frame, rows[0]);
    } else {
        let cols = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Length(SIDEBAR_WIDTH), Constraint::Min(1)])
            .split(rows[0]);
        render_sidebar(app, frame, cols[0]);
        render_content(app, frame, cols[1]);
    }

    render_status_line(app, frame, rows[1]);
}

fn render_sidebar(app: &AppState, frame: &mut Frame, area: Rect) {
    let inner_width = area.width.saturating_sub(4) as usize;
    let items: Vec<ListItem> = app
        .modules
        .iter()
        .enumerate()
        .map(|(i, module)| {
            let marker = if i == app.module_index { "▸ " } else { "  " };
            let label = format!("{}{}. {}", marker, i + 1, module.title);
            let label = truncate_with_ellipsis(&label, inner_width);
            let style = if i == app.module_index {
                Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::Gray)
            };
            ListItem::new(Line::from(Span::styled(label, style)))
        })
        .collect();

    let list = List::new(items).block(Block::default().borders(Borders::ALL).title(" Modules "));
    frame.render_widget(list, area);
}

fn render_content(app: &AppState, frame: &mut Frame, area: Rect) {
    // Text scale maps to horizontal padding: larger scale, narrower column.
    let pad = content_padding(app.nav.font_scale(), area.width);
    let content_area = Rect {
        x: area.x + pad,
        width: area.width.saturating_sub(pad * 2),
        ..area
    };

    match (&app.view, &app.active_module().kind) {
        (ModuleView::Simulation { sequencer, .. }, _) => {
            render_transcript(app, sequencer.visible_steps(), frame, content_area);
        }
        (ModuleView::Outline, ModuleKind::Outline { steps }) => {
            render_outline_step(app, steps, frame, content_area);
        }
        // An outline view over a simulation module cannot happen; render nothing.
        (ModuleView::Outline, ModuleKind::Simulation { .. }) => {}
    }
}

fn render_outline_step(
    app: &AppState,
    steps: &[crate::modules::OutlineStep],
    frame: &mut Frame,
    area: Rect,
) {
    let Some(step) = steps.get(app.nav.step().saturating_sub(1)) else {
        return;
    };

    let mut lines = vec![
        Line::from(Span::styled(
            step.heading,
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        )),
        Line::default(),
        Line::from(step.body),
    ];

    if !step.queries.is_empty() {
        lines.push(Line::default());
        lines.push(Line::from(Span::styled(
            "Worked examples",
            Style::default().add_modifier(Modifier::UNDERLINED),
        )));
        for (i, query) in step.queries.iter().enumerate() {
            let selected = i == app.nav.query_index();
            let marker = if selected { "● " } else { "○ " };
            let style = if selected {
                Style::default().fg(Color::Yellow)
            } else {
                Style::default().fg(Color::DarkGray)
            };
            lines.push(Line::from(Span::styled(format!("{marker}{query}"), style)));
        }
    }

    let title = format!(
        " {} ({}/{}) ",
        app.active_module().title,
        app.nav.step(),
        app.nav.total_steps()
    );
    let paragraph = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title(title))
        .wrap(Wrap { trim: false });
    frame.render_widget(paragraph, area);
}

fn render_transcript(app: &AppState, visible: &[Step], frame: &mut Frame, area: Rect) {
    let mut lines: Vec<Line> = Vec::new();
    for step in visible {
        let (badge, color) = kind_badge(step.kind);
        lines.push(Line::from(vec![
            Span::styled(
                format!("{badge:>10} "),
                Style::default().fg(color).add_modifier(Modifier::BOLD),
            ),
            Span::styled(format!("[{}] ", step.actor), Style::default().fg(Color::DarkGray)),
            Span::raw(step.content.clone()),
        ]));
        lines.push(Line::default());
    }
    if visible.is_empty() {
        lines.push(Line::from(Span::styled(
            "Press space to play, or → to step through.",
            Style::default().fg(Color::DarkGray),
        )));
    }

    let title = format!(" {} ", app.active_module().title);
    let paragraph = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title(title))
        .wrap(Wrap { trim: false });
    frame.render_widget(paragraph, area);
}

fn render_status_line(app: &AppState, frame: &mut Frame, area: Rect) {
    let mut spans: Vec<Span> = Vec::new();

    if let Some((message, _)) = &app.status {
        spans.push(Span::styled(
            message.clone(),
            Style::default().fg(Color::Yellow),
        ));
    } else {
        spans.push(Span::styled(
            format!("{} ", app.active_module().id),
            Style::default().fg(Color::Cyan),
        ));
        match &app.view {
            ModuleView::Simulation { sequencer, .. } => {
                let shown = sequencer.current_index().map_or(0, |i| i + 1);
                let state = if sequencer.is_playing() {
                    "playing"
                } else if sequencer.is_complete() {
                    "complete"
                } else {
                    "paused"
                };
                spans.push(Span::raw(format!(
                    "{shown}/{} {state} {}x",
                    sequencer.total_steps(),
                    app.speed()
                )));
            }
            ModuleView::Outline => {
                spans.push(Span::raw(format!(
                    "step {}/{}",
                    app.nav.step(),
                    app.nav.total_steps()
                )));
                if app.nav.query_count() > 0 {
                    spans.push(Span::raw(format!(
                        "  example {}/{}",
                        app.nav.query_index() + 1,
                        app.nav.query_count()
                    )));
                }
            }
        }
        if app.nav.is_fullscreen() {
            spans.push(Span::styled("  [fullscreen]", Style::default().fg(Color::Magenta)));
        }
        spans.push(Span::styled(
            format!("  {:?}", app.nav.font_scale()).to_lowercase(),
            Style::default().fg(Color::DarkGray),
        ));
    }

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

/// Badge and color for a step kind.
fn kind_badge(kind: StepKind) -> (&'static str, Color) {
    match kind {
        StepKind::UserInput => ("user", Color::Green),
        StepKind::Thinking => ("thinking", Color::DarkGray),
        StepKind::Reasoning => ("reasoning", Color::Gray),
        StepKind::AgentMessage => ("agent", Color::Cyan),
        StepKind::ToolCall => ("tool call", Color::Yellow),
        StepKind::ToolResult => ("result", Color::Blue),
        StepKind::FinalResponse => ("final", Color::Magenta),
    }
}

/// Horizontal padding for a text scale at a given width.
fn content_padding(scale: FontScale, width: u16) -> u16 {
    let fraction = match scale {
        FontScale::Xs => 0,
        FontScale::Sm => 16,
        FontScale::Md => 8,
        FontScale::Lg => 5,
        FontScale::Xl => 4,
    };
    if fraction == 0 { 0 } else { width / fraction }
}

/// Truncates a string to fit `max_width` columns, appending an ellipsis.
fn truncate_with_ellipsis(text: &str, max_width: usize) -> String {
    if text.width() <= max_width {
        return text.to_string();
    }
    let mut out = String::new();
    for ch in text.chars() {
        if out.width() + 2 > max_width {
            break;
        }
        out.push(ch);
    }
    out.push('…');
    out
}
