use crate::app::{App, Focus};
use crate::record::NewsRecord;
use crate::util::fit_cell;
use ratatui::{
    layout::{Constraint, Rect},
    style::{Color, Modifier, Style},
    widgets::{Block, Borders, Row, Table, TableState},
    Frame,
};

const DATE_WIDTH: u16 = 10;
const STOCK_WIDTH: u16 = 10;
const SOURCE_WIDTH: u16 = 16;
/// Borders, column gaps and the highlight marker.
const CHROME_WIDTH: u16 = 2 + 3 + 2;

/// Render a date/stock/source/news table with `selected` highlighted.
pub(super) fn render_table(
    f: &mut Frame,
    records: &[NewsRecord],
    selected: usize,
    focused: bool,
    title: String,
    area: Rect,
) {
    let news_width =
        area.width
            .saturating_sub(DATE_WIDTH + STOCK_WIDTH + SOURCE_WIDTH + CHROME_WIDTH) as usize;

    let rows: Vec<Row> = records
        .iter()
        .map(|r| {
            Row::new(vec![
                r.date_string(),
                fit_cell(&r.stock, STOCK_WIDTH as usize),
                fit_cell(&r.source, SOURCE_WIDTH as usize),
                fit_cell(&r.news, news_width),
            ])
        })
        .collect();

    let border_style = if focused {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default()
    };

    let widths = [
        Constraint::Length(DATE_WIDTH),
        Constraint::Length(STOCK_WIDTH),
        Constraint::Length(SOURCE_WIDTH),
        Constraint::Min(10),
    ];

    let table = Table::new(rows, widths)
        .header(
            Row::new(vec!["Date", "Stock", "Source", "News"])
                .style(Style::default().add_modifier(Modifier::BOLD)),
        )
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(border_style)
                .title(title),
        )
        .row_highlight_style(Style::default().bg(Color::DarkGray).fg(Color::White))
        .highlight_symbol("> ");

    let mut state = TableState::default();
    if !records.is_empty() {
        state.select(Some(selected));
    }
    f.render_stateful_widget(table, area, &mut state);
}

/// Render the dataset record table
pub fn render(f: &mut Frame, app: &mut App, area: Rect) {
    // Borders and header row
    app.page_size = area.height.saturating_sub(3).max(1) as usize;

    let records = app.visible_records();
    let title = match app.session.dataset() {
        None => "Records (no dataset)".to_string(),
        Some(all) if app.is_filtered() => {
            format!("Records - filtered {} of {}", records.len(), all.len())
        }
        Some(all) => format!("Records - all {}", all.len()),
    };

    render_table(
        f,
        records,
        app.selected_record,
        app.focus == Focus::Records,
        title,
        area,
    );
}
