//! Labelled churn CSV reader.
//!
//! Reads a delimited file with a header row into a [`ChurnTable`]. Column
//! types are inferred from the data: a column is numeric iff every one of its
//! values parses as a float, otherwise it is categorical. The target column is
//! separated out and mapped `Yes`/`No` to 1/0.
use std::path::Path;

use csv::StringRecord;

use crate::dataset::{ChurnTable, ColumnValues};
use crate::error::ChurnError;

/// Read a labelled churn CSV into a table.
///
/// Fails with [`ChurnError::DataLoad`] on a missing file, a malformed row, a
/// missing target column, or a target value outside `Yes`/`No`.
pub fn load_churn_csv<P: AsRef<Path>>(path: P, target_column: &str) -> Result<ChurnTable, ChurnError> {
    let path = path.as_ref();
    let load_err = |reason: String| ChurnError::DataLoad {
        path: path.display().to_string(),
        reason,
    };

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_path(path)
        .map_err(|e| load_err(e.to_string()))?;

    let headers = reader
        .headers()
        .map_err(|e| load_err(format!("failed to read header row: {}", e)))?
        .clone();

    let target_idx = find_column(&headers, target_column)
        .ok_or_else(|| load_err(format!("missing target column '{}'", target_column)))?;

    let mut cells: Vec<Vec<String>> = vec![Vec::new(); headers.len()];
    let mut target = Vec::new();

    for (row_idx, result) in reader.records().enumerate() {
        let record = result.map_err(|e| load_err(format!("failed to read row {}: {}", row_idx + 1, e)))?;
        if record.len() != headers.len() {
            return Err(load_err(format!(
                "row {} has {} fields, expected {}",
                row_idx + 1,
                record.len(),
                headers.len()
            )));
        }

        for (idx, value) in record.iter().enumerate() {
            if idx == target_idx {
                target.push(parse_target(value).ok_or_else(|| {
                    load_err(format!(
                        "invalid target value '{}' at row {} (expected Yes or No)",
                        value,
                        row_idx + 1
                    ))
                })?);
            } else {
                cells[idx].push(value.trim().to_string());
            }
        }
    }

    if target.is_empty() {
        return Err(load_err("dataset contains no rows".to_string()));
    }

    let mut columns = Vec::with_capacity(headers.len() - 1);
    for (idx, header) in headers.iter().enumerate() {
        if idx == target_idx {
            continue;
        }
        columns.push((header.to_string(), type_column(&cells[idx])));
    }

    log::debug!(
        "Loaded {} rows, {} feature columns and target '{}' from {}",
        target.len(),
        columns.len(),
        target_column,
        path.display()
    );

    Ok(ChurnTable::new(columns, target))
}

fn find_column(headers: &StringRecord, name: &str) -> Option<usize> {
    headers
        .iter()
        .position(|header| header.eq_ignore_ascii_case(name))
}

fn parse_target(value: &str) -> Option<i32> {
    match value.trim() {
        "Yes" => Some(1),
        "No" => Some(0),
        _ => None,
    }
}

/// Numeric iff every value parses as a float.
fn type_column(values: &[String]) -> ColumnValues {
    let parsed: Option<Vec<f32>> = values.iter().map(|v| v.parse::<f32>().ok()).collect();
    match parsed {
        Some(numbers) => ColumnValues::Numeric(numbers),
        None => ColumnValues::Categorical(values.to_vec()),
    }
}
