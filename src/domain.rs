use std::fmt;
use std::io::Error;
use std::path::PathBuf;

use derive_setters::Setters;
use polars::error::PolarsError;
use ratatui::crossterm::event::KeyEvent;

use crate::advocate::{SortKey, SortOrder};
use crate::formatters::format_phone_number;

pub const HELP_TEXT: &str = "\
q          quit
r          retry after an error
Tab        switch between sort key and order
Left/Right change the focused selector
o          type a sort order (asc|desc)
Up/Down    move the row cursor
PgUp/PgDn  move by a page
g/G        first/last advocate
y          copy the selected advocate
?          this help
Esc        close";

#[derive(Debug)]
pub enum AdvocatesError {
    IoError(Error),
    PolarsError(PolarsError),
    LoadingFailed(String),
    InvalidPath(String),
    FileNotFound,
    PermissionDenied,
    UnknownFileType,
}

impl fmt::Display for AdvocatesError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AdvocatesError::IoError(e) => write!(f, "I/O error: {e}"),
            AdvocatesError::PolarsError(e) => write!(f, "Could not read advocates: {e}"),
            AdvocatesError::LoadingFailed(msg) => write!(f, "Loading advocates failed: {msg}"),
            AdvocatesError::InvalidPath(msg) => write!(f, "Invalid path: {msg}"),
            AdvocatesError::FileNotFound => write!(f, "Advocate file not found"),
            AdvocatesError::PermissionDenied => write!(f, "Permission denied"),
            AdvocatesError::UnknownFileType => write!(f, "Unknown file type"),
        }
    }
}

impl std::error::Error for AdvocatesError {}

impl From<Error> for AdvocatesError {
    fn from(err: Error) -> Self {
        AdvocatesError::IoError(err)
    }
}

impl From<PolarsError> for AdvocatesError {
    fn from(err: PolarsError) -> Self {
        AdvocatesError::PolarsError(err)
    }
}

#[derive(Debug, Clone, Setters)]
pub struct AppConfig {
    pub data_path: PathBuf,
    pub event_poll_time: u64,
    pub sort_key: SortKey,
    pub sort_order: SortOrder,
    pub phone_formatter: fn(&str) -> String,
}

impl AppConfig {
    pub fn new(data_path: PathBuf) -> Self {
        Self {
            data_path,
            event_poll_time: 100,
            sort_key: SortKey::default(),
            sort_order: SortOrder::default(),
            phone_formatter: format_phone_number,
        }
    }
}

#[derive(Debug, Clone)]
pub enum Message {
    Quit,
    Retry,
    ToggleFocus,
    PreviousOption,
    NextOption,
    EnterOrder,
    MoveUp,
    MoveDown,
    MovePageUp,
    MovePageDown,
    MoveBeginning,
    MoveEnd,
    CopyRow,
    Help,
    Exit,
    RawKey(KeyEvent),
}
