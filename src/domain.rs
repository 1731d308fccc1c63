use derive_setters::Setters;
use polars::error::PolarsError;
use ratatui::crossterm::event::KeyEvent;
use std::fmt;
use std::io::Error;

#[derive(Debug)]
pub enum TTError {
    IoError(Error),
    PolarsError(PolarsError),
    LoadingFailed(String),
    FileNotFound,
    PermissionDenied,
    UnknownFileType,
    MissingColumn(String),
    InvalidValue { column: String, row: usize },
    PathExpansion(String),
}

impl fmt::Display for TTError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TTError::IoError(e) => write!(f, "IO error: {e}"),
            TTError::PolarsError(e) => write!(f, "Failed to read data: {e}"),
            TTError::LoadingFailed(reason) => write!(f, "Loading failed: {reason}"),
            TTError::FileNotFound => write!(f, "File not found"),
            TTError::PermissionDenied => write!(f, "Permission denied"),
            TTError::UnknownFileType => write!(f, "Unknown file type"),
            TTError::MissingColumn(name) => write!(f, "Missing column \"{name}\""),
            TTError::InvalidValue { column, row } => {
                write!(f, "Invalid value in column \"{column}\" at row {row}")
            }
            TTError::PathExpansion(reason) => write!(f, "Invalid path: {reason}"),
        }
    }
}

impl std::error::Error for TTError {}

impl From<Error> for TTError {
    fn from(err: Error) -> Self {
        TTError::IoError(err)
    }
}

impl From<PolarsError> for TTError {
    fn from(err: PolarsError) -> Self {
        TTError::PolarsError(err)
    }
}

#[derive(Debug, Clone, Setters)]
pub struct TTConfig {
    pub event_poll_time: u64,
    pub max_column_width: usize,
    pub sparkline_width: usize,
}

impl Default for TTConfig {
    fn default() -> Self {
        Self {
            event_poll_time: 100,
            max_column_width: 24,
            sparkline_width: 14,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CMDMode {
    SearchTable,
    FilterByColumn,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Message {
    Quit,
    MoveUp,
    MoveDown,
    MoveLeft,
    MoveRight,
    MovePageUp,
    MovePageDown,
    MoveBeginning,
    MoveEnd,
    Sort,
    SortColumn(usize),
    Enter,
    Exit,
    Help,
    Search,
    Filter,
    SearchNext,
    SearchPrev,
    CopyCell,
    CopyRow,
    Reload,
    Resize(usize, usize),
    RawKey(KeyEvent),
}

pub const HELP_TEXT: &str = "\
Navigation
  j / k, Down / Up   move selection
  h / l, Left / Right  select column
  PageUp / PageDown  scroll a page
  g / G              first / last token

Sorting
  s                  sort by selected column, again to reverse
  1 .. 8             sort by column number

Tokens
  Enter              open token details
  c / C              copy cell / row
  /                  search
  n / N              next / previous search result
  f                  filter by selected column
  r                  reload data file
  Esc                close details, filter or this help
  q                  quit";
