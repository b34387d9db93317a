use crate::extract::parse_date_text;
use crate::keybindings::KeybindingRegistry;
use crate::notice::{Notice, Severity};
use crate::record::{format_date, NewsRecord};
use crate::session::Session;
use std::borrow::Cow;
use std::path::PathBuf;
use std::time::Duration;
use tokio::time::Instant;

/// Rows moved by a page up/down when the viewport size is not yet known.
const DEFAULT_PAGE: usize = 10;

// ============================================================================
// View and Focus Enums
// ============================================================================

/// Current screen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Dataset, // Stock picker + filtered records
    Import,  // Workbook extraction preview + consolidate
}

/// Which panel has focus in the dataset view
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Stocks,
    Records,
}

// ============================================================================
// Text Prompt
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptKind {
    WorkbookPath,
    StartDate,
    EndDate,
}

impl PromptKind {
    pub fn title(self) -> &'static str {
        match self {
            Self::WorkbookPath => " Load Workbook ",
            Self::StartDate => " Start Date ",
            Self::EndDate => " End Date ",
        }
    }

    pub fn hint(self) -> &'static str {
        match self {
            Self::WorkbookPath => "Path to .xlsx / .xls / .ods file:",
            Self::StartDate | Self::EndDate => "Date (YYYY/MM/DD), empty to clear:",
        }
    }
}

/// Single-line text input shown as an overlay.
#[derive(Debug, Clone)]
pub struct Prompt {
    pub kind: PromptKind,
    pub input: String,
    /// Validation message from the last submit attempt.
    pub error: Option<String>,
}

// ============================================================================
// App State
// ============================================================================

pub struct App {
    pub session: Session,
    pub keybindings: KeybindingRegistry,

    pub view: View,
    pub focus: Focus,

    pub selected_stock: usize,
    pub selected_record: usize,
    pub selected_preview: usize,

    /// Rows visible in the record table, updated on render for paging.
    pub page_size: usize,

    pub prompt: Option<Prompt>,

    /// Notices from the most recent action, listed in the import view.
    pub notices: Vec<Notice>,

    /// Status bar message and the time it was set.
    pub status_message: Option<(Cow<'static, str>, Severity, Instant)>,
    pub status_timeout: Duration,

    /// Dirty flag to skip unnecessary frame renders
    pub needs_redraw: bool,

    pub show_help: bool,
    pub help_scroll_offset: usize,

    /// Full-text overlay for the selected record.
    pub show_detail: bool,

    /// Last workbook path entered, offered again by the next prompt.
    pub last_workbook: Option<PathBuf>,
}

impl App {
    pub fn new(session: Session, keybindings: KeybindingRegistry, status_timeout: Duration) -> Self {
        Self {
            session,
            keybindings,
            view: View::Dataset,
            focus: Focus::Stocks,
            selected_stock: 0,
            selected_record: 0,
            selected_preview: 0,
            page_size: DEFAULT_PAGE,
            prompt: None,
            notices: Vec::new(),
            status_message: None,
            status_timeout,
            needs_redraw: true,
            show_help: false,
            help_scroll_offset: 0,
            show_detail: false,
            last_workbook: None,
        }
    }

    // ========================================================================
    // Status and Notices
    // ========================================================================

    pub fn set_status(&mut self, msg: impl Into<Cow<'static, str>>) {
        self.status_message = Some((msg.into(), Severity::Success, Instant::now()));
    }

    /// Clear status message if expired.
    /// Returns true if a message was actually cleared
    pub fn clear_expired_status(&mut self) -> bool {
        if let Some((_, _, time)) = &self.status_message {
            if time.elapsed() >= self.status_timeout {
                self.status_message = None;
                return true;
            }
        }
        false
    }

    /// Keep the notices of an action and surface the most severe one in the
    /// status bar.
    pub fn report(&mut self, notices: Vec<Notice>) {
        let headline = notices
            .iter()
            .rev()
            .max_by_key(|n| match n.severity {
                Severity::Success => 0,
                Severity::Warning => 1,
                Severity::Error => 2,
            })
            .map(|n| {
                let text = if notices.len() > 1 {
                    format!("{} (+{} more)", n.message, notices.len() - 1)
                } else {
                    n.message.clone()
                };
                (Cow::Owned(text), n.severity, Instant::now())
            });
        if headline.is_some() {
            self.status_message = headline;
        }
        self.notices = notices;
        self.needs_redraw = true;
    }

    // ========================================================================
    // Derived Data
    // ========================================================================

    /// Records shown in the table: the filtered view once filters have been
    /// processed, the whole dataset before that.
    pub fn visible_records(&self) -> &[NewsRecord] {
        self.session
            .view()
            .or(self.session.dataset())
            .map(|set| set.rows())
            .unwrap_or_default()
    }

    pub fn is_filtered(&self) -> bool {
        self.session.view().is_some()
    }

    pub fn selected_record(&self) -> Option<&NewsRecord> {
        self.visible_records().get(self.selected_record)
    }

    pub fn selected_stock(&self) -> Option<&str> {
        self.session
            .stocks()
            .get(self.selected_stock)
            .map(String::as_str)
    }

    pub fn preview_records(&self) -> &[NewsRecord] {
        self.session
            .extracted()
            .map(|w| w.extraction.records.rows())
            .unwrap_or_default()
    }

    pub fn clamp_selections(&mut self) {
        let clamp = |idx: usize, len: usize| idx.min(len.saturating_sub(1));
        self.selected_stock = clamp(self.selected_stock, self.session.stocks().len());
        self.selected_record = clamp(self.selected_record, self.visible_records().len());
        self.selected_preview = clamp(self.selected_preview, self.preview_records().len());
    }

    // ========================================================================
    // Navigation
    // ========================================================================

    fn current_list(&mut self) -> (&mut usize, usize) {
        match (self.view, self.focus) {
            (View::Import, _) => {
                let len = self.preview_records().len();
                (&mut self.selected_preview, len)
            }
            (View::Dataset, Focus::Stocks) => {
                let len = self.session.stocks().len();
                (&mut self.selected_stock, len)
            }
            (View::Dataset, Focus::Records) => {
                let len = self.visible_records().len();
                (&mut self.selected_record, len)
            }
        }
    }

    pub fn nav_up(&mut self) {
        self.move_by(-1);
    }

    pub fn nav_down(&mut self) {
        self.move_by(1);
    }

    pub fn page_up(&mut self) {
        self.move_by(-(self.page_size.max(1) as isize));
    }

    pub fn page_down(&mut self) {
        self.move_by(self.page_size.max(1) as isize);
    }

    fn move_by(&mut self, delta: isize) {
        let (idx, len) = self.current_list();
        if len == 0 {
            *idx = 0;
            return;
        }
        let max_index = len - 1;
        *idx = idx.saturating_add_signed(delta).min(max_index);
    }

    pub fn cycle_focus(&mut self) {
        if self.view == View::Dataset {
            self.focus = match self.focus {
                Focus::Stocks => Focus::Records,
                Focus::Records => Focus::Stocks,
            };
        }
    }

    pub fn show_view(&mut self, view: View) {
        self.view = view;
        self.show_detail = false;
        self.clamp_selections();
    }

    // ========================================================================
    // Actions
    // ========================================================================

    /// Load the dataset from the store.
    pub fn reload(&mut self) {
        let notices = self.session.load_store();
        self.report(notices);
        self.clamp_selections();
    }

    pub fn toggle_selected_stock(&mut self) {
        let Some(stock) = self.selected_stock().map(str::to_string) else {
            return;
        };
        let selected = self.session.toggle_stock(&stock);
        self.set_status(if selected {
            format!("Selected {stock}")
        } else {
            format!("Deselected {stock}")
        });
    }

    pub fn clear_stocks(&mut self) {
        self.session.clear_stocks();
        self.set_status("Stock selection cleared (all stocks)");
    }

    pub fn apply_filters(&mut self) {
        let notices = self.session.apply_filters();
        let ok = !notices.iter().any(Notice::is_error);
        self.report(notices);
        if ok {
            self.view = View::Dataset;
            self.focus = Focus::Records;
            self.selected_record = 0;
        }
    }

    pub fn consolidate(&mut self) {
        let notices = self.session.consolidate();
        self.report(notices);
        self.clamp_selections();
    }

    pub fn extract(&mut self, path: PathBuf) {
        let notices = self.session.extract(&path);
        self.report(notices);
        self.last_workbook = Some(path);
        self.view = View::Import;
        self.selected_preview = 0;
    }

    // ========================================================================
    // Prompt
    // ========================================================================

    /// Open a prompt pre-filled with the current value.
    pub fn open_prompt(&mut self, kind: PromptKind) {
        let criteria = self.session.criteria();
        let input = match kind {
            PromptKind::WorkbookPath => self
                .last_workbook
                .as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_default(),
            PromptKind::StartDate => criteria.start.map(format_date).unwrap_or_default(),
            PromptKind::EndDate => criteria.end.map(format_date).unwrap_or_default(),
        };
        self.prompt = Some(Prompt {
            kind,
            input,
            error: None,
        });
    }

    /// Apply the prompt's input. Invalid input keeps the prompt open with an
    /// error message.
    pub fn submit_prompt(&mut self) {
        let Some(prompt) = self.prompt.take() else {
            return;
        };
        let value = prompt.input.trim();

        match prompt.kind {
            PromptKind::WorkbookPath => {
                let path = value.trim_matches(|c| c == '"' || c == '\'');
                if path.is_empty() {
                    self.prompt = Some(Prompt {
                        error: Some("Enter a file path".to_string()),
                        ..prompt
                    });
                    return;
                }
                self.extract(PathBuf::from(path));
            }
            PromptKind::StartDate | PromptKind::EndDate => {
                let date = if value.is_empty() {
                    None
                } else {
                    match parse_date_text(value) {
                        Some(d) => Some(d),
                        None => {
                            self.prompt = Some(Prompt {
                                error: Some(format!("'{value}' is not a date")),
                                ..prompt
                            });
                            return;
                        }
                    }
                };
                let label = date.map(format_date).unwrap_or_else(|| "none".to_string());
                if prompt.kind == PromptKind::StartDate {
                    self.session.set_start(date);
                    self.set_status(format!("Start date: {label}"));
                } else {
                    self.session.set_end(date);
                    self.set_status(format!("End date: {label}"));
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::ExtractConfig;
    use crate::record::RecordSet;
    use crate::store::MemoryStore;
    use chrono::NaiveDate;
    use tokio::time;

    fn d(m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, m, day).unwrap()
    }

    fn test_app(records: Option<RecordSet>) -> App {
        let store = match records {
            Some(r) => MemoryStore::with_records(r),
            None => MemoryStore::new(),
        };
        let session = Session::new(Box::new(store), ExtractConfig::default());
        App::new(session, KeybindingRegistry::new(), Duration::from_secs(3))
    }

    fn sample() -> RecordSet {
        RecordSet::from_rows(vec![
            NewsRecord::new(d(1, 5), "ABC", "a1", "s"),
            NewsRecord::new(d(2, 5), "XYZ", "x1", "s"),
            NewsRecord::new(d(3, 5), "ABC", "a2", "s"),
        ])
    }

    #[test]
    fn test_nav_empty_list() {
        let mut app = test_app(None);
        app.nav_down();
        assert_eq!(app.selected_stock, 0);
        assert!(app.selected_record().is_none());
    }

    #[test]
    fn test_nav_clamps_to_list() {
        let mut app = test_app(Some(sample()));
        app.reload();
        app.focus = Focus::Records;
        app.page_down();
        assert_eq!(app.selected_record, 2);
        app.nav_up();
        app.nav_up();
        app.nav_up();
        assert_eq!(app.selected_record, 0);
    }

    #[test]
    fn test_reload_shows_dataset_newest_first() {
        let mut app = test_app(Some(sample()));
        app.reload();
        assert!(!app.is_filtered());
        let news: Vec<&str> = app.visible_records().iter().map(|r| r.news.as_str()).collect();
        assert_eq!(news, vec!["a2", "x1", "a1"]);
    }

    #[test]
    fn test_toggle_and_filter() {
        let mut app = test_app(Some(sample()));
        app.reload();
        // Stocks are sorted: ABC, XYZ
        app.nav_down();
        app.toggle_selected_stock();
        app.apply_filters();

        assert_eq!(app.view, View::Dataset);
        assert_eq!(app.focus, Focus::Records);
        assert!(app.is_filtered());
        assert_eq!(app.visible_records().len(), 1);
        assert_eq!(app.selected_record().unwrap().stock, "XYZ");
    }

    #[test]
    fn test_filter_without_dataset_reports_error() {
        let mut app = test_app(None);
        app.apply_filters();
        let (_, severity, _) = app.status_message.as_ref().unwrap();
        assert_eq!(*severity, Severity::Error);
        assert_eq!(app.focus, Focus::Stocks);
    }

    #[test]
    fn test_date_prompt_round_trip() {
        let mut app = test_app(Some(sample()));
        app.reload();
        app.open_prompt(PromptKind::StartDate);
        assert_eq!(app.prompt.as_ref().unwrap().input, "2024/01/05");

        app.prompt.as_mut().unwrap().input = "2024-02-01".to_string();
        app.submit_prompt();
        assert!(app.prompt.is_none());
        assert_eq!(app.session.criteria().start, Some(d(2, 1)));
    }

    #[test]
    fn test_invalid_date_keeps_prompt_open() {
        let mut app = test_app(None);
        app.open_prompt(PromptKind::EndDate);
        app.prompt.as_mut().unwrap().input = "someday".to_string();
        app.submit_prompt();

        let prompt = app.prompt.as_ref().unwrap();
        assert_eq!(prompt.kind, PromptKind::EndDate);
        assert!(prompt.error.as_deref().unwrap().contains("someday"));
    }

    #[test]
    fn test_empty_date_clears_bound() {
        let mut app = test_app(Some(sample()));
        app.reload();
        app.open_prompt(PromptKind::EndDate);
        app.prompt.as_mut().unwrap().input.clear();
        app.submit_prompt();
        assert_eq!(app.session.criteria().end, None);
    }

    #[test]
    fn test_empty_workbook_path_rejected() {
        let mut app = test_app(None);
        app.open_prompt(PromptKind::WorkbookPath);
        app.submit_prompt();
        assert!(app.prompt.as_ref().unwrap().error.is_some());
        assert_eq!(app.view, View::Dataset);
    }

    #[test]
    fn test_report_surfaces_most_severe() {
        let mut app = test_app(None);
        app.report(vec![
            Notice::warning("Sheet X is empty and has been skipped."),
            Notice::success("Loaded 3 records"),
        ]);
        let (msg, severity, _) = app.status_message.as_ref().unwrap();
        assert_eq!(*severity, Severity::Warning);
        assert!(msg.starts_with("Sheet X is empty"));
        assert!(msg.ends_with("(+1 more)"));
        assert_eq!(app.notices.len(), 2);
    }

    #[tokio::test]
    async fn test_status_expires_after_timeout() {
        time::pause();
        let mut app = test_app(None);
        app.set_status("Test message");

        time::advance(Duration::from_secs(2)).await;
        assert!(!app.clear_expired_status());
        assert!(app.status_message.is_some());

        time::advance(Duration::from_secs(2)).await;
        assert!(app.clear_expired_status());
        assert!(app.status_message.is_none());
    }

    #[test]
    fn test_cycle_focus_only_in_dataset_view() {
        let mut app = test_app(None);
        app.cycle_focus();
        assert_eq!(app.focus, Focus::Records);
        app.show_view(View::Import);
        app.cycle_focus();
        assert_eq!(app.focus, Focus::Records);
    }
}
