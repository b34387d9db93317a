//! Input handling for the TUI.
//!
//! Overlays (help, record detail, text prompt) capture every key while open.
//! Otherwise keys are resolved through the keybinding registry using the
//! context of the focused panel.

use crate::app::{App, Focus, PromptKind, View};
use crate::keybindings::{Action as KbAction, Context as KbContext};
use anyhow::Result;
use crossterm::event::{KeyCode, KeyModifiers};

use super::Action;

/// Longest text accepted by a prompt.
const MAX_PROMPT_LENGTH: usize = 1024;

fn context_for(app: &App) -> KbContext {
    match (app.view, app.focus) {
        (View::Import, _) => KbContext::Import,
        (View::Dataset, Focus::Stocks) => KbContext::StockList,
        (View::Dataset, Focus::Records) => KbContext::RecordTable,
    }
}

/// Main input dispatch function.
pub(super) fn handle_input(app: &mut App, code: KeyCode, modifiers: KeyModifiers) -> Result<Action> {
    // Ctrl+C always quits, even from inside a prompt
    if code == KeyCode::Char('c') && modifiers.contains(KeyModifiers::CONTROL) {
        return Ok(Action::Quit);
    }

    if app.show_help {
        handle_help_input(app, code);
        return Ok(Action::Continue);
    }

    if app.prompt.is_some() {
        handle_prompt_input(app, code);
        return Ok(Action::Continue);
    }

    if app.show_detail {
        if matches!(code, KeyCode::Esc | KeyCode::Enter | KeyCode::Char('q')) {
            app.show_detail = false;
        }
        return Ok(Action::Continue);
    }

    let action = app
        .keybindings
        .action_for_key(code, modifiers, context_for(app));

    match action {
        Some(KbAction::Quit) => return Ok(Action::Quit),
        Some(KbAction::NavDown) => app.nav_down(),
        Some(KbAction::NavUp) => app.nav_up(),
        Some(KbAction::PageDown) => app.page_down(),
        Some(KbAction::PageUp) => app.page_up(),
        Some(KbAction::CycleFocus) => app.cycle_focus(),
        Some(KbAction::Back) => {
            if app.view == View::Import {
                app.show_view(View::Dataset);
            } else if app.focus == Focus::Records {
                app.focus = Focus::Stocks;
            }
        }
        Some(KbAction::Select) => {
            app.show_detail = app.selected_record().is_some();
        }
        Some(KbAction::ShowDataset) => app.show_view(View::Dataset),
        Some(KbAction::ShowImport) => app.show_view(View::Import),
        Some(KbAction::ToggleStock) => app.toggle_selected_stock(),
        Some(KbAction::ClearStocks) => app.clear_stocks(),
        Some(KbAction::EditStart) => app.open_prompt(PromptKind::StartDate),
        Some(KbAction::EditEnd) => app.open_prompt(PromptKind::EndDate),
        Some(KbAction::ApplyFilters) => app.apply_filters(),
        Some(KbAction::ReloadDataset) => app.reload(),
        Some(KbAction::OpenWorkbook) => app.open_prompt(PromptKind::WorkbookPath),
        Some(KbAction::Consolidate) => app.consolidate(),
        Some(KbAction::ShowHelp) => {
            app.show_help = true;
            app.help_scroll_offset = 0;
        }
        None => {}
    }

    Ok(Action::Continue)
}

/// Handle input while the help overlay is visible.
///
/// j/k/Up/Down scroll, Esc/q/? dismiss.
fn handle_help_input(app: &mut App, code: KeyCode) {
    match code {
        KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('?') => {
            app.show_help = false;
            app.help_scroll_offset = 0;
        }
        KeyCode::Char('j') | KeyCode::Down => {
            app.help_scroll_offset = app.help_scroll_offset.saturating_add(1);
        }
        KeyCode::Char('k') | KeyCode::Up => {
            app.help_scroll_offset = app.help_scroll_offset.saturating_sub(1);
        }
        _ => {}
    }
}

/// Handle input while a text prompt is open.
fn handle_prompt_input(app: &mut App, code: KeyCode) {
    let Some(prompt) = app.prompt.as_mut() else {
        return;
    };
    match code {
        KeyCode::Esc => app.prompt = None,
        KeyCode::Enter => app.submit_prompt(),
        KeyCode::Backspace => {
            prompt.input.pop();
            prompt.error = None;
        }
        KeyCode::Char(c) => {
            if prompt.input.len() < MAX_PROMPT_LENGTH {
                prompt.input.push(c);
                prompt.error = None;
            }
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::ExtractConfig;
    use crate::keybindings::KeybindingRegistry;
    use crate::record::{NewsRecord, RecordSet};
    use crate::session::Session;
    use crate::store::MemoryStore;
    use chrono::NaiveDate;
    use std::time::Duration;

    fn test_app() -> App {
        let records = RecordSet::from_rows(vec![
            NewsRecord::new(NaiveDate::from_ymd_opt(2024, 1, 5).unwrap(), "ABC", "a", "s"),
            NewsRecord::new(NaiveDate::from_ymd_opt(2024, 1, 6).unwrap(), "XYZ", "x", "s"),
        ]);
        let session = Session::new(
            Box::new(MemoryStore::with_records(records)),
            ExtractConfig::default(),
        );
        let mut app = App::new(session, KeybindingRegistry::new(), Duration::from_secs(3));
        app.reload();
        app
    }

    fn press(app: &mut App, code: KeyCode) -> Action {
        handle_input(app, code, KeyModifiers::NONE).unwrap()
    }

    fn type_text(app: &mut App, text: &str) {
        for c in text.chars() {
            press(app, KeyCode::Char(c));
        }
    }

    #[test]
    fn test_quit_key() {
        let mut app = test_app();
        assert!(matches!(press(&mut app, KeyCode::Char('q')), Action::Quit));
    }

    #[test]
    fn test_prompt_captures_quit_key() {
        let mut app = test_app();
        press(&mut app, KeyCode::Char('s'));
        assert!(app.prompt.is_some());
        assert!(matches!(
            press(&mut app, KeyCode::Char('q')),
            Action::Continue
        ));
        assert!(app.prompt.as_ref().unwrap().input.ends_with('q'));
    }

    #[test]
    fn test_edit_dates_then_filter() {
        let mut app = test_app();

        press(&mut app, KeyCode::Char('e'));
        for _ in 0..app.prompt.as_ref().unwrap().input.len() {
            press(&mut app, KeyCode::Backspace);
        }
        type_text(&mut app, "2024/01/05");
        press(&mut app, KeyCode::Enter);
        assert!(app.prompt.is_none());

        press(&mut app, KeyCode::Char('f'));
        assert_eq!(app.visible_records().len(), 1);
        assert_eq!(app.visible_records()[0].stock, "ABC");
    }

    #[test]
    fn test_space_toggles_stock_in_picker() {
        let mut app = test_app();
        press(&mut app, KeyCode::Char(' '));
        assert!(app.session.criteria().is_selected("ABC"));
        press(&mut app, KeyCode::Char('c'));
        assert!(app.session.criteria().stocks.is_empty());
    }

    #[test]
    fn test_enter_opens_and_closes_detail() {
        let mut app = test_app();
        press(&mut app, KeyCode::Tab);
        press(&mut app, KeyCode::Enter);
        assert!(app.show_detail);
        press(&mut app, KeyCode::Esc);
        assert!(!app.show_detail);
    }

    #[test]
    fn test_escape_cancels_prompt() {
        let mut app = test_app();
        press(&mut app, KeyCode::Char('o'));
        assert_eq!(app.prompt.as_ref().unwrap().kind, PromptKind::WorkbookPath);
        press(&mut app, KeyCode::Esc);
        assert!(app.prompt.is_none());
    }

    #[test]
    fn test_consolidate_without_workbook_warns() {
        let mut app = test_app();
        press(&mut app, KeyCode::Char('2'));
        assert_eq!(app.view, View::Import);
        press(&mut app, KeyCode::Char('m'));
        assert_eq!(app.notices[0].message, "Please load a workbook first.");
    }

    #[test]
    fn test_help_overlay_toggle() {
        let mut app = test_app();
        press(&mut app, KeyCode::Char('?'));
        assert!(app.show_help);
        press(&mut app, KeyCode::Char('j'));
        assert_eq!(app.help_scroll_offset, 1);
        press(&mut app, KeyCode::Char('?'));
        assert!(!app.show_help);
    }
}
