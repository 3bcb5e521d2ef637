//! Uploaded dataset handling
//!
//! Parses a CSV upload into an in-memory table, validates the schema the
//! downtime classifier needs, and extracts the numeric feature matrix and
//! label vector used for training.

use std::io::Cursor;

use ndarray::Array2;
use thiserror::Error;

/// Columns every upload must contain.
pub const REQUIRED_COLUMNS: [&str; 4] =
    ["Machine_ID", "Temperature", "Run_Time", "Downtime_Flag"];

/// Feature columns the classifier consumes.
pub const FEATURE_COLUMNS: [&str; 2] = ["Temperature", "Run_Time"];

/// Binary target column.
pub const LABEL_COLUMN: &str = "Downtime_Flag";

#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("could not parse upload as CSV: {0}")]
    Parse(String),

    #[error("missing columns: {}", .0.join(", "))]
    MissingColumns(Vec<String>),

    #[error("row {row}: column '{column}' has non-numeric value '{value}'")]
    BadValue {
        row: usize,
        column: String,
        value: String,
    },

    #[error("row {row}: '{column}' must be 0 or 1, got '{value}'")]
    BadLabel {
        row: usize,
        column: String,
        value: String,
    },
}

/// The single in-memory dataset, replaced wholesale on every upload.
///
/// Cells stay as raw strings; numeric coercion happens at training time so
/// an upload with extra non-numeric columns is still accepted.
#[derive(Debug, Clone)]
pub struct Dataset {
    columns: Vec<String>,
    rows: Vec<Vec<String>>,
    feature_idx: [usize; FEATURE_COLUMNS.len()],
    label_idx: usize,
}

impl Dataset {
    /// Parse CSV bytes into a dataset, enforcing the required-column set.
    pub fn from_csv(bytes: &[u8]) -> Result<Self, DatasetError> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(false)
            .from_reader(Cursor::new(bytes));

        let headers = reader
            .headers()
            .map_err(|e| DatasetError::Parse(e.to_string()))?;
        let columns: Vec<String> = headers.iter().map(|h| h.trim().to_string()).collect();

        let missing: Vec<String> = REQUIRED_COLUMNS
            .iter()
            .filter(|required| !columns.iter().any(|c| c == *required))
            .map(|required| required.to_string())
            .collect();
        if !missing.is_empty() {
            return Err(DatasetError::MissingColumns(missing));
        }

        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record.map_err(|e| DatasetError::Parse(e.to_string()))?;
            rows.push(record.iter().map(|cell| cell.to_string()).collect());
        }

        let feature_idx = [
            index_of(&columns, FEATURE_COLUMNS[0])?,
            index_of(&columns, FEATURE_COLUMNS[1])?,
        ];
        let label_idx = index_of(&columns, LABEL_COLUMN)?;

        Ok(Self {
            columns,
            rows,
            feature_idx,
            label_idx,
        })
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn num_rows(&self) -> usize {
        self.rows.len()
    }

    /// Extract the feature matrix and `{0,1}` label vector for training.
    pub fn features_and_labels(&self) -> Result<(Array2<f64>, Vec<usize>), DatasetError> {
        let mut features = Array2::zeros((self.rows.len(), FEATURE_COLUMNS.len()));
        let mut labels = Vec::with_capacity(self.rows.len());

        for (row_no, row) in self.rows.iter().enumerate() {
            for (j, &col) in self.feature_idx.iter().enumerate() {
                features[[row_no, j]] = self.numeric_cell(row, row_no, col)?;
            }

            let raw = self.numeric_cell(row, row_no, self.label_idx)?;
            if raw != 0.0 && raw != 1.0 {
                return Err(DatasetError::BadLabel {
                    row: row_no + 1,
                    column: LABEL_COLUMN.to_string(),
                    value: raw.to_string(),
                });
            }
            labels.push(raw as usize);
        }

        Ok((features, labels))
    }

    fn numeric_cell(&self, row: &[String], row_no: usize, col: usize) -> Result<f64, DatasetError> {
        let cell = row.get(col).map(String::as_str).unwrap_or("");
        cell.trim()
            .parse::<f64>()
            .map_err(|_| DatasetError::BadValue {
                row: row_no + 1,
                column: self.columns[col].clone(),
                value: cell.to_string(),
            })
    }
}

fn index_of(columns: &[String], name: &str) -> Result<usize, DatasetError> {
    columns
        .iter()
        .position(|c| c == name)
        .ok_or_else(|| DatasetError::MissingColumns(vec![name.to_string()]))
}
