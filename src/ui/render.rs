//! Render functions for the TUI.
//!
//! Dispatches to the current view, then draws any overlay on top.

use crate::app::{App, Prompt, View};
use crate::record::NewsRecord;
use crate::util::strip_control_chars;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Tabs, Wrap},
    Frame,
};

use super::{help, import, records, status, stocks};

/// Minimum terminal dimensions required for normal operation.
pub(super) const MIN_WIDTH: u16 = 60;
pub(super) const MIN_HEIGHT: u16 = 12;

/// Main render dispatch function.
pub(super) fn render(f: &mut Frame, app: &mut App) {
    let area = f.area();

    if area.width < 1 || area.height < 1 {
        return;
    }

    if area.width < MIN_WIDTH || area.height < MIN_HEIGHT {
        let msg = if area.height < 3 || area.width < 20 {
            Paragraph::new("Too small")
        } else {
            Paragraph::new(format!(
                "Terminal too small\n\nMinimum: {}x{}\nCurrent: {}x{}",
                MIN_WIDTH, MIN_HEIGHT, area.width, area.height
            ))
            .alignment(Alignment::Center)
        };
        f.render_widget(msg, area);
        return;
    }

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .split(area);

    render_tabs(f, app, chunks[0]);
    match app.view {
        View::Dataset => render_dataset(f, app, chunks[1]),
        View::Import => import::render(f, app, chunks[1]),
    }
    status::render(f, app, chunks[2]);

    if app.show_detail {
        if let Some(record) = app.selected_record() {
            render_detail_overlay(f, record);
        }
    }

    if let Some(prompt) = &app.prompt {
        render_prompt_overlay(f, prompt);
    }

    if app.show_help {
        help::render(f, app);
    }
}

fn render_tabs(f: &mut Frame, app: &App, area: Rect) {
    let selected = match app.view {
        View::Dataset => 0,
        View::Import => 1,
    };
    let tabs = Tabs::new(vec![" 1 View Data ", " 2 Upload & Consolidate "])
        .select(selected)
        .style(Style::default().fg(Color::Gray))
        .highlight_style(
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        );
    f.render_widget(tabs, area);
}

/// Render the dataset view (stock picker + record table).
fn render_dataset(f: &mut Frame, app: &mut App, area: Rect) {
    let main_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(28), Constraint::Min(0)])
        .split(area);

    stocks::render(f, app, main_chunks[0]);
    records::render(f, app, main_chunks[1]);
}

/// Fixed-size rectangle centered in `area`, shrunk to fit.
fn centered_fixed(width: u16, height: u16, area: Rect) -> Rect {
    let width = width.min(area.width.saturating_sub(4));
    let height = height.min(area.height.saturating_sub(4));
    let x = area.x + (area.width.saturating_sub(width)) / 2;
    let y = area.y + (area.height.saturating_sub(height)) / 2;
    Rect::new(x, y, width, height)
}

/// Create a centered rectangle with the given percentage of the parent area.
pub(super) fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let width = area.width * percent_x / 100;
    let height = area.height * percent_y / 100;
    let x = area.x + (area.width.saturating_sub(width)) / 2;
    let y = area.y + (area.height.saturating_sub(height)) / 2;
    Rect::new(x, y, width, height)
}

/// Render a single-line text prompt centered on screen.
fn render_prompt_overlay(f: &mut Frame, prompt: &Prompt) {
    let overlay = centered_fixed(64, 8, f.area());
    if overlay.width < 20 || overlay.height < 6 {
        return;
    }

    f.render_widget(Clear, overlay);

    let mut lines = vec![
        Line::from(prompt.kind.hint()),
        Line::from(""),
        Line::from(format!("> {}_", prompt.input)),
    ];
    match &prompt.error {
        Some(err) => lines.push(Line::from(Span::styled(
            err.as_str(),
            Style::default().fg(Color::Red),
        ))),
        None => lines.push(Line::from("")),
    }
    lines.push(Line::from("(Enter) Confirm  (Esc) Cancel"));

    let paragraph = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan))
            .title(prompt.kind.title()),
    );

    f.render_widget(paragraph, overlay);
}

/// Render the full text of a record, wrapped.
fn render_detail_overlay(f: &mut Frame, record: &NewsRecord) {
    let overlay = centered_rect(70, 60, f.area());
    if overlay.width < 20 || overlay.height < 6 {
        return;
    }

    f.render_widget(Clear, overlay);

    let bold = Style::default().add_modifier(Modifier::BOLD);
    let lines = vec![
        Line::from(vec![Span::styled("Date:   ", bold), Span::raw(record.date_string())]),
        Line::from(vec![
            Span::styled("Stock:  ", bold),
            Span::raw(strip_control_chars(&record.stock).into_owned()),
        ]),
        Line::from(vec![
            Span::styled("Source: ", bold),
            Span::raw(strip_control_chars(&record.source).into_owned()),
        ]),
        Line::from(""),
        Line::from(strip_control_chars(&record.news).into_owned()),
    ];

    let paragraph = Paragraph::new(lines)
        .wrap(Wrap { trim: false })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Cyan))
                .title(" Record (Esc to close) "),
        );

    f.render_widget(paragraph, overlay);
}
