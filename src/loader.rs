use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::Instant;

use polars::prelude::*;
use rayon::prelude::*;
use tracing::{debug, info, trace};

use crate::advocate::{self, Advocate, SortKey, SortOrder};
use crate::domain::AdvocatesError;

pub const COLUMNS: [&str; 8] = [
    "id",
    "firstName",
    "lastName",
    "city",
    "degree",
    "specialties",
    "yearsOfExperience",
    "phoneNumber",
];

const SPECIALTY_SEPARATOR: char = ';';

#[allow(clippy::upper_case_acronyms)]
#[derive(Debug, PartialEq)]
enum FileType {
    CSV,
    PARQUET,
    ARROW,
}

/// Column of the advocate file, every value already rendered to a string.
struct Column {
    name: String,
    data: Vec<Option<String>>,
}

/// Loads all advocates from `path`, ordered by `key` and `order`.
pub fn fetch_advocates(
    path: &Path,
    key: SortKey,
    order: SortOrder,
) -> Result<Vec<Advocate>, AdvocatesError> {
    let mut advocates = load_advocates(path)?;
    sort_advocates(&mut advocates, key, order);
    Ok(advocates)
}

pub fn sort_advocates(advocates: &mut [Advocate], key: SortKey, order: SortOrder) {
    advocates.par_sort_by(|a, b| advocate::compare(a, b, key, order));
}

pub fn load_advocates(path: &Path) -> Result<Vec<Advocate>, AdvocatesError> {
    let file_type = get_file_type(path)?;
    let frame = match file_type {
        FileType::CSV => load_csv(path)?,
        FileType::PARQUET => load_parquet(path)?,
        FileType::ARROW => load_arrow(path)?,
    };

    // Each column is converted in its own rayon task.
    let start_time = Instant::now();
    let df = frame.collect()?;
    let columns: Result<Vec<Column>, AdvocatesError> = COLUMNS
        .par_iter()
        .map(|name| load_column(&df, name))
        .collect();
    let mut columns: HashMap<String, Vec<Option<String>>> = columns?
        .into_iter()
        .map(|c| (c.name, c.data))
        .collect();

    let nrows = df.height();
    let mut take = |name: &str| columns.remove(name).unwrap_or_default();
    let ids = take("id");
    let first_names = take("firstName");
    let last_names = take("lastName");
    let cities = take("city");
    let degrees = take("degree");
    let specialties = take("specialties");
    let years = take("yearsOfExperience");
    let phones = take("phoneNumber");

    let advocates: Result<Vec<Advocate>, AdvocatesError> = (0..nrows)
        .into_par_iter()
        .map(|row| -> Result<Advocate, AdvocatesError> {
            Ok(Advocate {
                id: parse_number(&ids[row], "id", row)?,
                first_name: text(&first_names[row]),
                last_name: text(&last_names[row]),
                city: text(&cities[row]),
                degree: text(&degrees[row]),
                specialties: split_specialties(specialties[row].as_deref().unwrap_or("")),
                years_of_experience: parse_number(&years[row], "yearsOfExperience", row)?,
                phone_number: text(&phones[row]),
            })
        })
        .collect();
    let advocates = advocates?;

    info!(
        "Loaded {} advocates in {}ms ...",
        advocates.len(),
        start_time.elapsed().as_millis()
    );
    Ok(advocates)
}

fn load_column(df: &DataFrame, col_name: &str) -> Result<Column, AdvocatesError> {
    let col = df
        .column(col_name)
        .map_err(|_| AdvocatesError::LoadingFailed(format!("missing column \"{col_name}\"")))?
        .cast(&DataType::String)?;
    let series = col.str()?;
    let data = series
        .into_iter()
        .map(|value| value.map(|s| s.trim().to_string()))
        .collect::<Vec<Option<String>>>();
    trace!("Column \"{}\": # rows {}", col_name, data.len());
    Ok(Column {
        name: col_name.to_string(),
        data,
    })
}

fn text(value: &Option<String>) -> String {
    value.clone().unwrap_or_default()
}

fn parse_number<T: std::str::FromStr>(
    value: &Option<String>,
    column: &str,
    row: usize,
) -> Result<T, AdvocatesError> {
    value
        .as_deref()
        .and_then(|v| v.parse::<T>().ok())
        .ok_or_else(|| {
            AdvocatesError::LoadingFailed(format!(
                "invalid \"{column}\" in row {}: {:?}",
                row + 1,
                value.as_deref().unwrap_or("∅")
            ))
        })
}

pub fn split_specialties(cell: &str) -> Vec<String> {
    cell.split(SPECIALTY_SEPARATOR)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

fn detect_file_type(path: &Path) -> Result<FileType, AdvocatesError> {
    match path
        .extension()
        .and_then(|s| s.to_str())
        .map(|s| s.to_uppercase())
        .as_deref()
    {
        Some("CSV") => Ok(FileType::CSV),
        Some("PARQUET") | Some("PQ") => Ok(FileType::PARQUET),
        Some("ARROW") | Some("IPC") | Some("FEATHER") => Ok(FileType::ARROW),
        _ => Err(AdvocatesError::UnknownFileType),
    }
}

fn get_file_type(path: &Path) -> Result<FileType, AdvocatesError> {
    let metadata = fs::metadata(path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => AdvocatesError::FileNotFound,
        ErrorKind::PermissionDenied => AdvocatesError::PermissionDenied,
        _ => AdvocatesError::IoError(e),
    })?;
    if !metadata.is_file() {
        return Err(AdvocatesError::LoadingFailed("Not a file!".into()));
    }
    let file_type = detect_file_type(path)?;
    debug!("{:?}: {:?}, {} bytes", path, file_type, metadata.len());
    Ok(file_type)
}

fn load_csv(path: &Path) -> Result<LazyFrame, PolarsError> {
    // Every column arrives as text; numeric columns are parsed per row
    LazyCsvReader::new(PlPath::Local(path.into()))
        .with_has_header(true)
        .with_infer_schema_length(Some(0))
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

/// Expands `~` and environment variables in a user supplied path.
pub fn expand_path(raw: &str) -> Result<PathBuf, AdvocatesError> {
    shellexpand::full(raw)
        .map(|p| PathBuf::from(p.as_ref()))
        .map_err(|e| AdvocatesError::InvalidPath(e.to_string()))
}
