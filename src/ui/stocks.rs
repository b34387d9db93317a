use crate::app::{App, Focus};
use crate::record::format_date;
use crate::util::truncate_to_width;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
    Frame,
};

/// Render the stock picker and the filter summary beneath it
pub fn render(f: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(3), Constraint::Length(6)])
        .split(area);

    render_stock_list(f, app, chunks[0]);
    render_filter_summary(f, app, chunks[1]);
}

fn render_stock_list(f: &mut Frame, app: &App, area: Rect) {
    let is_focused = app.focus == Focus::Stocks;
    let criteria = app.session.criteria();
    let stocks = app.session.stocks();
    let name_width = area.width.saturating_sub(8) as usize;

    let items: Vec<ListItem> = if stocks.is_empty() {
        vec![ListItem::new("No stocks loaded")]
    } else {
        stocks
            .iter()
            .map(|stock| {
                let selected = criteria.is_selected(stock);
                let (mark, style) = if selected {
                    ("[x] ", Style::default().fg(Color::Green).add_modifier(Modifier::BOLD))
                } else {
                    ("[ ] ", Style::default())
                };
                ListItem::new(Line::from(vec![
                    Span::styled(mark, style),
                    Span::styled(truncate_to_width(stock, name_width).into_owned(), style),
                ]))
            })
            .collect()
    };

    let border_style = if is_focused {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default()
    };

    let title = if criteria.stocks.is_empty() {
        format!("Stocks ({})", stocks.len())
    } else {
        format!("Stocks ({}/{})", criteria.stocks.len(), stocks.len())
    };

    let list = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(border_style)
                .title(title),
        )
        .highlight_style(Style::default().bg(Color::DarkGray).fg(Color::White));

    let mut state = ListState::default();
    if !stocks.is_empty() {
        state.select(Some(app.selected_stock));
    }
    f.render_stateful_widget(list, area, &mut state);
}

fn render_filter_summary(f: &mut Frame, app: &App, area: Rect) {
    let criteria = app.session.criteria();
    let show = |d: Option<chrono::NaiveDate>| d.map(format_date).unwrap_or_else(|| "-".to_string());

    let range_note = match criteria.date_range() {
        Some((start, end)) if start > end => {
            Span::styled("start is after end", Style::default().fg(Color::Yellow))
        }
        Some(_) => Span::raw(""),
        None => Span::styled("no date filter", Style::default().fg(Color::DarkGray)),
    };

    let stocks = if criteria.stocks.is_empty() {
        "all".to_string()
    } else {
        format!("{} selected", criteria.stocks.len())
    };

    let lines = vec![
        Line::from(format!("Start:  {}", show(criteria.start))),
        Line::from(format!("End:    {}", show(criteria.end))),
        Line::from(format!("Stocks: {}", stocks)),
        Line::from(range_note),
    ];

    let paragraph = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .title("Filters"),
    );
    f.render_widget(paragraph, area);
}
