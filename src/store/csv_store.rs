use csv::{ReaderBuilder, StringRecord, WriterBuilder};
use std::fs::File;
use std::path::{Path, PathBuf};

use super::{RecordStore, StoreError};
use crate::record::{parse_stored_date, NewsRecord, RecordSet, COLUMNS};

/// Well-known dataset file, relative to the working directory.
pub const DEFAULT_STORE_FILE: &str = "fundamental.csv";

/// Dataset stored as a comma-separated file with a `date,stock,news,source`
/// header.
#[derive(Debug, Clone)]
pub struct CsvStore {
    path: PathBuf,
}

impl CsvStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: std::io::Error) -> StoreError {
        StoreError::Io {
            path: self.path.clone(),
            source,
        }
    }

    fn csv_error(&self, source: csv::Error) -> StoreError {
        StoreError::Csv {
            path: self.path.clone(),
            source,
        }
    }

    /// Locate each canonical column in the header row.
    ///
    /// Matching ignores case and surrounding whitespace, so files written
    /// with capitalized headers (`Date,Stock,News,Source`) load too.
    fn column_indices(&self, headers: &StringRecord) -> Result<[usize; 4], StoreError> {
        let normalized: Vec<String> = headers
            .iter()
            .map(|h| h.trim_start_matches('\u{feff}').trim().to_lowercase())
            .collect();

        let mut indices = [0usize; 4];
        for (slot, column) in indices.iter_mut().zip(COLUMNS) {
            *slot = normalized
                .iter()
                .position(|h| h == column)
                .ok_or_else(|| StoreError::MissingColumn {
                    path: self.path.clone(),
                    column,
                })?;
        }
        Ok(indices)
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| DEFAULT_STORE_FILE.into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl Default for CsvStore {
    fn default() -> Self {
        Self::new(DEFAULT_STORE_FILE)
    }
}

impl RecordStore for CsvStore {
    fn location(&self) -> String {
        self.path.display().to_string()
    }

    fn exists(&self) -> bool {
        self.path.is_file()
    }

    fn load(&self) -> Result<Option<RecordSet>, StoreError> {
        let file = match File::open(&self.path) {
            Ok(f) => f,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %self.path.display(), "No dataset file yet");
                return Ok(None);
            }
            Err(e) => return Err(self.io_error(e)),
        };

        let mut reader = ReaderBuilder::new().flexible(true).from_reader(file);
        let headers = reader.headers().map_err(|e| self.csv_error(e))?.clone();
        if headers.is_empty() {
            tracing::debug!(path = %self.path.display(), "Dataset file is empty");
            return Ok(Some(RecordSet::new()));
        }
        let [date_idx, stock_idx, news_idx, source_idx] = self.column_indices(&headers)?;

        let mut records = RecordSet::new();
        let mut skipped = 0usize;
        for row in reader.records() {
            let row = row.map_err(|e| self.csv_error(e))?;
            let field = |idx: usize| row.get(idx).unwrap_or("");

            let Some(date) = parse_stored_date(field(date_idx)) else {
                skipped += 1;
                continue;
            };
            records.push(NewsRecord::new(
                date,
                field(stock_idx),
                field(news_idx),
                field(source_idx),
            ));
        }

        if skipped > 0 {
            tracing::warn!(
                path = %self.path.display(),
                skipped,
                "Skipped dataset rows with unreadable dates"
            );
        }
        tracing::info!(path = %self.path.display(), records = records.len(), "Loaded dataset");
        Ok(Some(records))
    }

    /// Write the full snapshot to a sibling temp file, then rename it over
    /// the dataset so readers never see a half-written file.
    fn save(&mut self, records: &RecordSet) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| self.io_error(e))?;
        }

        let temp_path = self.temp_path();
        let result = (|| {
            let mut writer = WriterBuilder::new()
                .has_headers(false)
                .from_path(&temp_path)
                .map_err(|e| self.csv_error(e))?;
            writer.write_record(COLUMNS).map_err(|e| self.csv_error(e))?;
            for record in records {
                writer.serialize(record).map_err(|e| self.csv_error(e))?;
            }
            writer.flush().map_err(|e| self.io_error(e))?;
            drop(writer);
            std::fs::rename(&temp_path, &self.path).map_err(|e| self.io_error(e))
        })();

        if result.is_err() {
            let _ = std::fs::remove_file(&temp_path);
        }
        result?;

        tracing::info!(path = %self.path.display(), records = records.len(), "Saved dataset");
        Ok(())
    }
}
