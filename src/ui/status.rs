use crate::app::{App, View};
use crate::notice::Severity;
use ratatui::{
    layout::Rect,
    style::{Color, Style},
    widgets::Paragraph,
    Frame,
};
use std::borrow::Cow;

/// Foreground colour for a notice of the given severity.
pub(super) fn severity_style(severity: Severity) -> Style {
    match severity {
        Severity::Success => Style::default().fg(Color::Green),
        Severity::Warning => Style::default().fg(Color::Yellow),
        Severity::Error => Style::default().fg(Color::Red),
    }
}

/// Render the status bar
pub fn render(f: &mut Frame, app: &App, area: Rect) {
    if area.width < 1 || area.height < 1 {
        return;
    }

    let base = Style::default().bg(Color::DarkGray).fg(Color::White);

    let (text, style): (Cow<'_, str>, Style) = if let Some((msg, severity, _)) = &app.status_message
    {
        let style = match severity {
            Severity::Success => base,
            Severity::Warning => base.fg(Color::Yellow),
            Severity::Error => base.fg(Color::LightRed),
        };
        (Cow::Borrowed(msg.as_ref()), style)
    } else {
        let hints = match app.view {
            View::Dataset => {
                "[Space]stock [s]tart [e]nd [f]ilter [r]eload [Enter]detail [2]import [?]help [q]uit"
            }
            View::Import => "[o]pen workbook [m]erge into dataset [1]dataset [?]help [q]uit",
        };
        (Cow::Borrowed(hints), base)
    };

    let paragraph = Paragraph::new(text).style(style);
    f.render_widget(paragraph, area);
}
