//! The ordered, persisted position history.

use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::error::{HistoryError, HistoryResult};
use crate::record::LiquidityPosition;

/// Ordered sequence of position records; insertion order is chronological
/// and the last element is always the current position.
///
/// Every mutation is followed by a full rewrite of the backing file.
/// At most one record is open at any time, and only the last one may be.
#[derive(Debug)]
pub struct PositionHistory {
    records: Vec<LiquidityPosition>,
    path: PathBuf,
}

impl PositionHistory {
    /// Create an empty history backed by `path`. Nothing is written until
    /// the first mutation.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            records: Vec::new(),
            path: path.into(),
        }
    }

    /// Load the history from `path`, or start empty when the file does not
    /// exist yet.
    pub fn load_or_default(path: impl Into<PathBuf>) -> HistoryResult<Self> {
        let path = path.into();
        match std::fs::read_to_string(&path) {
            Ok(content) => {
                let records: Vec<LiquidityPosition> = serde_json::from_str(&content)?;
                info!(
                    path = %path.display(),
                    records = records.len(),
                    "Position history loaded"
                );
                Ok(Self { records, path })
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                info!(path = %path.display(), "Position history not found, starting empty");
                Ok(Self {
                    records: Vec::new(),
                    path,
                })
            }
            Err(e) => Err(HistoryError::Io(e)),
        }
    }

    /// Append a record and persist.
    ///
    /// Rejects a second open record: the at-most-one-open invariant is
    /// enforced here rather than trusted to callers.
    pub fn push(&mut self, record: LiquidityPosition) -> HistoryResult<()> {
        if record.is_open && self.open_position().is_some() {
            return Err(HistoryError::OpenPositionExists);
        }
        self.records.push(record);
        self.save()
    }

    /// Persist the full history to the backing file.
    pub fn save(&self) -> HistoryResult<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let json = serde_json::to_string_pretty(&self.records)?;
        std::fs::write(&self.path, json)?;
        debug!(path = %self.path.display(), records = self.records.len(), "History saved");
        Ok(())
    }

    /// The currently open position, if any. Only the last record can be open.
    #[must_use]
    pub fn open_position(&self) -> Option<&LiquidityPosition> {
        self.records.last().filter(|r| r.is_open)
    }

    /// Mutable access to the open position.
    #[must_use]
    pub fn open_position_mut(&mut self) -> Option<&mut LiquidityPosition> {
        self.records.last_mut().filter(|r| r.is_open)
    }

    /// The most recent record, open or closed.
    #[must_use]
    pub fn last(&self) -> Option<&LiquidityPosition> {
        self.records.last()
    }

    #[must_use]
    pub fn has_open(&self) -> bool {
        self.open_position().is_some()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// All records, oldest first.
    #[must_use]
    pub fn records(&self) -> &[LiquidityPosition] {
        &self.records
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clm_core::{Tick, TokenAmount};

    fn temp_path(name: &str) -> PathBuf {
        let mut path = std::env::temp_dir();
        path.push(format!(
            "clm_history_{name}_{}_{}.json",
            std::process::id(),
            chrono::Utc::now().timestamp_nanos_opt().unwrap_or_default()
        ));
        path
    }

    fn open_record(token_id: u64) -> LiquidityPosition {
        LiquidityPosition::opened(
            token_id,
            Tick::new(100),
            Tick::new(200),
            Tick::new(150),
            909.09,
            1100.0,
            1000.0,
            TokenAmount::new(1),
            TokenAmount::new(1),
        )
    }

    #[test]
    fn test_push_and_reload() {
        let path = temp_path("push_reload");
        let mut history = PositionHistory::new(&path);
        history.push(open_record(1)).unwrap();

        let reloaded = PositionHistory::load_or_default(&path).unwrap();
        assert_eq!(reloaded.len(), 1);
        assert!(reloaded.has_open());
        assert_eq!(reloaded.open_position().unwrap().token_id, Some(1));

        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_load_missing_file_starts_empty() {
        let history = PositionHistory::load_or_default(temp_path("missing")).unwrap();
        assert!(history.is_empty());
        assert!(!history.has_open());
    }

    #[test]
    fn test_second_open_rejected() {
        let path = temp_path("second_open");
        let mut history = PositionHistory::new(&path);
        history.push(open_record(1)).unwrap();

        let err = history.push(open_record(2)).unwrap_err();
        assert!(matches!(err, HistoryError::OpenPositionExists));
        assert_eq!(history.len(), 1);

        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_close_then_open_allowed() {
        let path = temp_path("close_open");
        let mut history = PositionHistory::new(&path);
        history.push(open_record(1)).unwrap();

        history
            .open_position_mut()
            .unwrap()
            .mark_closed(Some("0xdec".into()), Some("0xcol".into()), None);
        history.save().unwrap();
        assert!(!history.has_open());

        history.push(open_record(2)).unwrap();
        assert_eq!(history.len(), 2);
        // The open record is the last one.
        let open_count = history.records().iter().filter(|r| r.is_open).count();
        assert_eq!(open_count, 1);
        assert!(history.last().unwrap().is_open);

        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_failed_open_appends_closed_record() {
        let path = temp_path("failed_open");
        let mut history = PositionHistory::new(&path);
        history
            .push(LiquidityPosition::failed_open(
                Tick::new(150),
                1000.0,
                "withdrawal timed out",
            ))
            .unwrap();
        assert!(!history.has_open());
        assert_eq!(
            history.last().unwrap().status_message,
            "withdrawal timed out"
        );

        std::fs::remove_file(&path).ok();
    }
}
