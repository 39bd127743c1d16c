use std::collections::BTreeMap;
use std::path::Path;
use chrono::NaiveDate;
use glob::glob;
use log::{debug, info, warn};
use crate::errors::ObservationError;

/// Default max distance in days between a requested date and a usable observation
pub const MAX_DISTANCE_DAYS: i64 = 60;

/// Name of the date column in the product files
const DATE_COLUMN: &str = "Date";

/// Observed satellite product rows merged by date
pub struct ModisObservations {
    rows: BTreeMap<NaiveDate, BTreeMap<String, f64>>,
    max_distance_days: i64,
}

impl ModisObservations {
    /// Loads and merges all product CSV files in a directory.
    ///
    /// Each file must have a `Date` column (`YYYY-MM-DD`, anything after the date part is
    /// ignored). All other numeric cells are kept keyed by column name; when several files
    /// provide the same column for a date, the first file (in file name order) wins.
    ///
    /// # Arguments
    ///
    /// * 'dir' - directory holding the product CSV files
    /// * 'max_distance_days' - how far away an observation may be and still be used
    pub fn load(dir: &Path, max_distance_days: i64) -> Result<ModisObservations, ObservationError> {
        let pattern = dir.join("*.csv");
        let pattern = pattern.to_str()
            .ok_or_else(|| ObservationError::Document(format!("illegal character in {}", dir.display())))?;

        let mut rows: BTreeMap<NaiveDate, BTreeMap<String, f64>> = BTreeMap::new();
        let mut files = 0;
        for entry in glob(pattern)? {
            match entry {
                Ok(path) => {
                    let n = read_product(&path, &mut rows)?;
                    debug!("read {} rows from {}", n, path.display());
                    files += 1;
                }
                Err(e) => warn!("{:?}", e),
            }
        }
        info!("loaded observations for {} dates from {} files", rows.len(), files);

        Ok(ModisObservations { rows, max_distance_days })
    }

    /// Returns observations built from already merged rows
    ///
    /// # Arguments
    ///
    /// * 'rows' - feature values per date
    /// * 'max_distance_days' - how far away an observation may be and still be used
    pub fn from_rows(rows: BTreeMap<NaiveDate, BTreeMap<String, f64>>, max_distance_days: i64) -> ModisObservations {
        ModisObservations { rows, max_distance_days }
    }

    /// Returns the observed row closest to the date, the earlier one on ties, or `None` if
    /// no row is within the max distance
    ///
    /// # Arguments
    ///
    /// * 'date' - the requested date
    pub fn nearest(&self, date: NaiveDate) -> Option<(NaiveDate, &BTreeMap<String, f64>)> {
        let before = self.rows.range(..=date).next_back();
        let after = self.rows.range(date..).next();

        let (found, values) = match (before, after) {
            (Some(b), Some(a)) => if date - *b.0 <= *a.0 - date { b } else { a },
            (Some(b), None) => b,
            (None, Some(a)) => a,
            (None, None) => return None,
        };

        if (*found - date).num_days().abs() > self.max_distance_days {
            None
        } else {
            Some((*found, values))
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Reads one product file into the merged rows and returns the number of dated rows read
///
/// # Arguments
///
/// * 'path' - path to the CSV file
/// * 'rows' - merged rows to add values to
fn read_product(path: &Path, rows: &mut BTreeMap<NaiveDate, BTreeMap<String, f64>>) -> Result<usize, ObservationError> {
    let mut reader = csv::Reader::from_path(path)?;
    let headers = reader.headers()?.clone();
    let date_idx = headers.iter()
        .position(|h| h.trim() == DATE_COLUMN)
        .ok_or_else(|| ObservationError::Document(format!("{} has no {} column", path.display(), DATE_COLUMN)))?;

    let mut count = 0;
    for record in reader.records() {
        let record = record?;
        let Some(date) = record.get(date_idx).and_then(parse_date) else {
            debug!("skipping row without valid date in {}", path.display());
            continue;
        };

        let row = rows.entry(date).or_default();
        for (i, field) in record.iter().enumerate() {
            if i == date_idx {
                continue;
            }
            if let (Some(name), Ok(value)) = (headers.get(i), field.trim().parse::<f64>()) {
                if value.is_finite() {
                    row.entry(name.trim().to_string()).or_insert(value);
                }
            }
        }
        count += 1;
    }

    Ok(count)
}

fn parse_date(field: &str) -> Option<NaiveDate> {
    let field = field.trim();
    let date_part = field.get(0..10).unwrap_or(field);
    NaiveDate::parse_from_str(date_part, "%Y-%m-%d").ok()
}
