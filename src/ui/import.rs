use crate::app::App;
use crate::keybindings::{Action, Context};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph},
    Frame,
};

use super::records::render_table;
use super::status::severity_style;

/// Render the import view: workbook summary, action notices and a preview of
/// the extracted records.
pub fn render(f: &mut Frame, app: &mut App, area: Rect) {
    // Keep the notices panel small but large enough to show a few sheets
    let notice_rows = app.notices.len().clamp(1, 6) as u16 + 2;

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(5),
            Constraint::Length(notice_rows),
            Constraint::Min(3),
        ])
        .split(area);

    render_summary(f, app, chunks[0]);
    render_notices(f, app, chunks[1]);

    app.page_size = chunks[2].height.saturating_sub(3).max(1) as usize;
    let preview = app.preview_records();
    let title = format!("Preview ({} records)", preview.len());
    render_table(f, preview, app.selected_preview, true, title, chunks[2]);
}

fn render_summary(f: &mut Frame, app: &App, area: Rect) {
    let bold = Style::default().add_modifier(Modifier::BOLD);

    let lines = match app.session.extracted() {
        Some(loaded) => {
            let extraction = &loaded.extraction;
            vec![
                Line::from(vec![
                    Span::styled("Workbook: ", bold),
                    Span::raw(loaded.path.display().to_string()),
                ]),
                Line::from(format!(
                    "{} records from {} sheet(s), {} skipped",
                    extraction.records.len(),
                    extraction.sheets_used.len(),
                    extraction.issues.len()
                )),
                Line::from(vec![
                    Span::styled("Dataset:  ", bold),
                    Span::raw(app.session.store_location()),
                ]),
            ]
        }
        None => vec![
            Line::from("No workbook loaded."),
            Line::from(format!(
                "Press {} to load one, then {} to consolidate it into the dataset.",
                key_hint(app, Action::OpenWorkbook, Context::Global),
                key_hint(app, Action::Consolidate, Context::Import)
            )),
            Line::from(vec![
                Span::styled("Dataset:  ", bold),
                Span::raw(app.session.store_location()),
            ]),
        ],
    };

    let paragraph =
        Paragraph::new(lines).block(Block::default().borders(Borders::ALL).title("Import"));
    f.render_widget(paragraph, area);
}

fn key_hint(app: &App, action: Action, context: Context) -> String {
    app.keybindings
        .key_for(action, context)
        .unwrap_or_else(|| "?".to_string())
}

fn render_notices(f: &mut Frame, app: &App, area: Rect) {
    let items: Vec<ListItem> = if app.notices.is_empty() {
        vec![ListItem::new("No messages")]
    } else {
        app.notices
            .iter()
            .map(|n| {
                ListItem::new(Line::from(vec![
                    Span::styled(
                        format!("{:<8}", n.severity.label()),
                        severity_style(n.severity),
                    ),
                    Span::raw(n.message.as_str()),
                ]))
            })
            .collect()
    };

    let list = List::new(items).block(Block::default().borders(Borders::ALL).title("Messages"));
    f.render_widget(list, area);
}
