use polars::prelude::*;
use rayon::prelude::*;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info};

use crate::domain::TTError;
use crate::record::{Field, TrendingToken};

const ROUTE_COLUMN: &str = "route";

const NUMERIC_FIELDS: [Field; 6] = [
    Field::Id,
    Field::Price,
    Field::PriceChange24h,
    Field::PriceChange7d,
    Field::Volume24h,
    Field::MktCap,
];

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FileType {
    CSV,
    PARQUET,
    ARROW,
}

#[derive(Debug, Clone)]
pub struct FileInfo {
    pub path: PathBuf,
    pub file_size: u64,
    pub file_type: FileType,
}

/// Loads a token snapshot file into records, in file order.
pub fn load_tokens(path: &Path) -> Result<(FileInfo, Vec<TrendingToken>), TTError> {
    let file_info = get_file_info(path.to_path_buf())?;
    let frame = match file_info.file_type {
        FileType::CSV => load_csv(&file_info.path)?,
        FileType::PARQUET => load_parquet(&file_info.path)?,
        FileType::ARROW => load_arrow(&file_info.path)?,
    };

    let start_time = Instant::now();
    let df = frame.collect()?;
    let tokens = tokens_from_frame(&df)?;
    info!(
        "Loaded {} tokens from {:?} ({} bytes) in {}ms",
        tokens.len(),
        file_info.path,
        file_info.file_size,
        start_time.elapsed().as_millis()
    );
    Ok((file_info, tokens))
}

/// Converts a collected frame into tokens.
///
/// Numeric columns are extracted in parallel, each in its own rayon task.
pub fn tokens_from_frame(df: &DataFrame) -> Result<Vec<TrendingToken>, TTError> {
    let numbers: Vec<Vec<f64>> = NUMERIC_FIELDS
        .par_iter()
        .map(|field| load_numbers(df, field.column_name()))
        .collect::<Result<_, _>>()?;
    let Ok([ids, prices, changes_24h, changes_7d, volumes, mkt_caps]) =
        <[Vec<f64>; 6]>::try_from(numbers)
    else {
        return Err(TTError::LoadingFailed("Unexpected column count".into()));
    };

    let names = load_texts(df, Field::Name.column_name())?;
    let symbols = load_texts(df, Field::Symbol.column_name())?;
    let sparklines = load_sparklines(df, Field::Sparkline.column_name())?;
    let routes = if df.get_column_names().iter().any(|c| c.as_str() == ROUTE_COLUMN) {
        Some(load_texts(df, ROUTE_COLUMN)?)
    } else {
        debug!("No route column, deriving routes from symbols");
        None
    };

    let mut tokens = Vec::with_capacity(df.height());
    for (row, sparkline) in sparklines.into_iter().enumerate() {
        let id = ids[row];
        if !id.is_finite() || id < 0.0 || id > u32::MAX as f64 {
            return Err(TTError::InvalidValue {
                column: Field::Id.column_name().to_string(),
                row,
            });
        }
        let mut token = TrendingToken::new(
            id as u32,
            names[row].clone(),
            symbols[row].clone(),
            prices[row],
            changes_24h[row],
            changes_7d[row],
            volumes[row],
            mkt_caps[row],
            sparkline,
        );
        if let Some(routes) = &routes {
            token = token.with_route(routes[row].clone());
        }
        tokens.push(token);
    }
    Ok(tokens)
}

fn get_column<'a>(df: &'a DataFrame, name: &str) -> Result<&'a Column, TTError> {
    df.column(name)
        .map_err(|_| TTError::MissingColumn(name.to_string()))
}

fn load_numbers(df: &DataFrame, name: &str) -> Result<Vec<f64>, TTError> {
    let col = get_column(df, name)?.cast(&DataType::Float64)?;
    let values = col.as_materialized_series().f64()?;
    values
        .into_iter()
        .enumerate()
        .map(|(row, value)| {
            value.ok_or_else(|| TTError::InvalidValue {
                column: name.to_string(),
                row,
            })
        })
        .collect()
}

fn load_texts(df: &DataFrame, name: &str) -> Result<Vec<String>, TTError> {
    let col = get_column(df, name)?.cast(&DataType::String)?;
    let values = col.as_materialized_series().str()?;
    values
        .into_iter()
        .enumerate()
        .map(|(row, value)| {
            value
                .map(|s| s.trim().to_string())
                .ok_or_else(|| TTError::InvalidValue {
                    column: name.to_string(),
                    row,
                })
        })
        .collect()
}

// Sparklines are either list columns (parquet, arrow) or delimited strings (csv).
fn load_sparklines(df: &DataFrame, name: &str) -> Result<Vec<Vec<f64>>, TTError> {
    let col = get_column(df, name)?;
    if matches!(col.dtype(), DataType::List(_)) {
        let col = col.cast(&DataType::List(Box::new(DataType::Float64)))?;
        let lists = col.as_materialized_series().list()?;
        lists
            .into_iter()
            .map(|samples| -> Result<Vec<f64>, TTError> {
                match samples {
                    Some(samples) => Ok(samples.f64()?.into_iter().flatten().collect()),
                    None => Ok(Vec::new()),
                }
            })
            .collect()
    } else {
        load_texts(df, name)?
            .iter()
            .enumerate()
            .map(|(row, text)| {
                parse_sparkline(text).ok_or_else(|| TTError::InvalidValue {
                    column: name.to_string(),
                    row,
                })
            })
            .collect()
    }
}

/// Parses `"1.5;2;3.25"`, `"1.5 2 3.25"` or `"[1.5, 2, 3.25]"`.
pub fn parse_sparkline(text: &str) -> Option<Vec<f64>> {
    text.trim()
        .trim_start_matches('[')
        .trim_end_matches(']')
        .split(|c: char| c == ';' || c == ',' || c.is_whitespace())
        .filter(|s| !s.is_empty())
        .map(|s| s.parse::<f64>().ok())
        .collect()
}

fn detect_file_type(path: &Path) -> Result<FileType, TTError> {
    match path
        .extension()
        .and_then(|s| s.to_str())
        .map(|s| s.to_uppercase())
        .as_deref()
    {
        Some("CSV") => Ok(FileType::CSV),
        Some("PARQUET") | Some("PQ") => Ok(FileType::PARQUET),
        Some("ARROW") | Some("IPC") | Some("FEATHER") => Ok(FileType::ARROW),
        _ => Err(TTError::UnknownFileType),
    }
}

fn get_file_info(path: PathBuf) -> Result<FileInfo, TTError> {
    let metadata = fs::metadata(&path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => TTError::FileNotFound,
        ErrorKind::PermissionDenied => TTError::PermissionDenied,
        _ => TTError::IoError(e),
    })?;
    if !metadata.is_file() {
        return Err(TTError::LoadingFailed("Not a file!".into()));
    }

    let file_type = detect_file_type(&path)?;

    Ok(FileInfo {
        path,
        file_size: metadata.len(),
        file_type,
    })
}

fn load_csv(path: &Path) -> Result<LazyFrame, PolarsError> {
    LazyCsvReader::new(PlPath::Local(path.into()))
        .with_has_header(true)
        .finish()
}

fn load_parquet(path: &Path) -> Result<LazyFrame, PolarsError> {
    LazyFrame::scan_parquet(PlPath::Local(path.into()), ScanArgsParquet::default())
}

fn load_arrow(path: &Path) -> Result<LazyFrame, PolarsError> {
    LazyFrame::scan_ipc(
        PlPath::Local(path.into()),
        polars::io::ipc::IpcScanOptions,
        UnifiedScanArgs::default(),
    )
}
