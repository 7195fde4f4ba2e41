//! The feature codec: categorical encoding plus numeric standardisation.
//!
//! Fitted once from the training table and frozen afterwards. The codec owns
//! the contract every later transform must honor: the feature-column order
//! (numeric columns in table order, then categorical columns in table order),
//! one category-to-code table per categorical column, and one (mean, std)
//! pair per feature.
use ndarray::{Array1, Array2};

use crate::dataset::{ChurnTable, ColumnValues, CustomerRecord, FieldValue};
use crate::error::ChurnError;

/// Per-column mean/std standardiser.
#[derive(Clone, Debug)]
pub struct Scaler {
    pub mean: Vec<f32>,
    pub std: Vec<f32>,
}

impl Scaler {
    /// Minimum stddev to avoid division by zero when transforming.
    const MIN_STD: f32 = 1e-6;

    /// Fit a scaler from a matrix where rows are samples and columns are
    /// features.
    pub fn fit(x: &Array2<f32>) -> Scaler {
        let (nrows, ncols) = x.dim();
        assert!(nrows > 0 && ncols > 0, "Scaler::fit requires a non-empty matrix");

        let mut mean = vec![0.0f32; ncols];
        for r in 0..nrows {
            for c in 0..ncols {
                mean[c] += x[(r, c)];
            }
        }
        let nrows_f = nrows as f32;
        for v in mean.iter_mut() {
            *v /= nrows_f;
        }

        let mut var = vec![0.0f32; ncols];
        for r in 0..nrows {
            for c in 0..ncols {
                let d = x[(r, c)] - mean[c];
                var[c] += d * d;
            }
        }
        for v in var.iter_mut() {
            *v = (*v / nrows_f).sqrt().max(Scaler::MIN_STD);
        }

        Scaler { mean, std: var }
    }

    /// Standardise every row into a new matrix.
    pub fn transform(&self, x: &Array2<f32>) -> Array2<f32> {
        let (nrows, ncols) = x.dim();
        let mut out = Vec::with_capacity(nrows * ncols);
        for r in 0..nrows {
            for c in 0..ncols {
                out.push((x[(r, c)] - self.mean[c]) / self.std[c]);
            }
        }
        Array2::from_shape_vec((nrows, ncols), out).expect("Scaler::transform: shape mismatch")
    }

    /// Standardise a single row in place.
    pub fn transform_row(&self, row: &mut [f32]) {
        for (c, v) in row.iter_mut().enumerate() {
            *v = (*v - self.mean[c]) / self.std[c];
        }
    }

    /// Undo the standardisation of one feature value.
    pub fn invert(&self, column: usize, value: f32) -> f32 {
        value * self.std[column] + self.mean[column]
    }
}

/// Frozen category-to-code table for one column.
///
/// Codes follow the sorted lexical order of the distinct training values, so
/// refitting on the same table always reproduces the same codes.
#[derive(Clone, Debug, PartialEq)]
pub struct CategoryMap {
    values: Vec<String>,
}

impl CategoryMap {
    fn fit<'a>(values: impl Iterator<Item = &'a str>) -> CategoryMap {
        let mut distinct: Vec<String> = values.map(|v| v.to_string()).collect();
        distinct.sort_unstable();
        distinct.dedup();
        CategoryMap { values: distinct }
    }

    pub fn code(&self, value: &str) -> Option<usize> {
        self.values.binary_search_by(|v| v.as_str().cmp(value)).ok()
    }

    pub fn value(&self, code: usize) -> Option<&str> {
        self.values.get(code).map(|v| v.as_str())
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

#[derive(Clone, Debug)]
enum FeatureEncoding {
    Numeric,
    Categorical(CategoryMap),
}

#[derive(Clone, Debug)]
struct FeatureColumn {
    name: String,
    encoding: FeatureEncoding,
}

/// The fitted feature codec. Fit exactly once at training time; every later
/// transform reuses the frozen state read-only.
#[derive(Clone, Debug)]
pub struct FeatureCodec {
    columns: Vec<FeatureColumn>,
    scaler: Scaler,
}

impl FeatureCodec {
    /// Fit the codec from the training table and return it together with the
    /// encoded, standardised feature matrix for the whole table.
    ///
    /// Columns named in `excluded` (identifiers) are left out of the feature
    /// set. The resulting feature order is numeric columns in table order
    /// followed by categorical columns in table order.
    pub fn fit(
        table: &ChurnTable,
        excluded: &[String],
    ) -> Result<(FeatureCodec, Array2<f32>), ChurnError> {
        let is_excluded =
            |name: &str| excluded.iter().any(|e| e.eq_ignore_ascii_case(name));

        let mut columns = Vec::new();
        for (name, values) in table.columns() {
            if is_excluded(name) {
                continue;
            }
            if let ColumnValues::Numeric(_) = values {
                columns.push(FeatureColumn {
                    name: name.to_string(),
                    encoding: FeatureEncoding::Numeric,
                });
            }
        }
        for (name, values) in table.columns() {
            if is_excluded(name) {
                continue;
            }
            if let ColumnValues::Categorical(cells) = values {
                columns.push(FeatureColumn {
                    name: name.to_string(),
                    encoding: FeatureEncoding::Categorical(CategoryMap::fit(
                        cells.iter().map(|v| v.as_str()),
                    )),
                });
            }
        }

        if columns.is_empty() {
            return Err(ChurnError::SchemaMismatch {
                column: "*".to_string(),
                reason: "no usable feature columns after exclusions".to_string(),
            });
        }

        let n_rows = table.n_rows();
        let n_features = columns.len();
        let mut data = vec![0.0f32; n_rows * n_features];

        for (ci, column) in columns.iter().enumerate() {
            match (&column.encoding, table.column(&column.name)) {
                (FeatureEncoding::Numeric, Some(ColumnValues::Numeric(cells))) => {
                    for (r, v) in cells.iter().enumerate() {
                        data[r * n_features + ci] = *v;
                    }
                }
                (FeatureEncoding::Categorical(map), Some(ColumnValues::Categorical(cells))) => {
                    for (r, v) in cells.iter().enumerate() {
                        let code = map.code(v).expect("category fitted from this column");
                        data[r * n_features + ci] = code as f32;
                    }
                }
                _ => unreachable!("codec columns are drawn from the table"),
            }
        }

        let encoded = Array2::from_shape_vec((n_rows, n_features), data)
            .expect("FeatureCodec::fit: shape mismatch");
        let scaler = Scaler::fit(&encoded);
        let standardized = scaler.transform(&encoded);

        log::debug!(
            "Fitted feature codec: {} numeric and {} categorical columns",
            columns
                .iter()
                .filter(|c| matches!(c.encoding, FeatureEncoding::Numeric))
                .count(),
            columns
                .iter()
                .filter(|c| matches!(c.encoding, FeatureEncoding::Categorical(_)))
                .count(),
        );

        Ok((FeatureCodec { columns, scaler }, standardized))
    }

    /// The frozen feature-column order. Every transform aligns to this.
    pub fn feature_columns(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.name.as_str())
    }

    pub fn n_features(&self) -> usize {
        self.columns.len()
    }

    /// Position of a feature column in the frozen order.
    pub fn feature_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }

    /// The fitted code for a category value, if both column and value exist.
    pub fn category_code(&self, column: &str, value: &str) -> Option<usize> {
        self.columns.iter().find(|c| c.name == column).and_then(|c| {
            match &c.encoding {
                FeatureEncoding::Categorical(map) => map.code(value),
                FeatureEncoding::Numeric => None,
            }
        })
    }

    pub fn scaler(&self) -> &Scaler {
        &self.scaler
    }

    /// Apply the fitted codes and standardisation to every row of a table
    /// with the training schema.
    ///
    /// Fails with [`ChurnError::SchemaMismatch`] if a fitted column is absent
    /// or has changed type, and [`ChurnError::UnknownCategory`] on a category
    /// value unseen at fit time.
    pub fn transform_batch(&self, table: &ChurnTable) -> Result<Array2<f32>, ChurnError> {
        let n_rows = table.n_rows();
        let n_features = self.columns.len();
        let mut data = vec![0.0f32; n_rows * n_features];

        for (ci, column) in self.columns.iter().enumerate() {
            let values = table.column(&column.name).ok_or_else(|| {
                ChurnError::SchemaMismatch {
                    column: column.name.clone(),
                    reason: "column is missing from the table".to_string(),
                }
            })?;
            match (&column.encoding, values) {
                (FeatureEncoding::Numeric, ColumnValues::Numeric(cells)) => {
                    for (r, v) in cells.iter().enumerate() {
                        data[r * n_features + ci] = *v;
                    }
                }
                (FeatureEncoding::Categorical(map), ColumnValues::Categorical(cells)) => {
                    for (r, v) in cells.iter().enumerate() {
                        let code = map.code(v).ok_or_else(|| ChurnError::UnknownCategory {
                            column: column.name.clone(),
                            value: v.clone(),
                        })?;
                        data[r * n_features + ci] = code as f32;
                    }
                }
                (FeatureEncoding::Numeric, _) => {
                    return Err(ChurnError::SchemaMismatch {
                        column: column.name.clone(),
                        reason: "expected a numeric column".to_string(),
                    });
                }
                (FeatureEncoding::Categorical(_), _) => {
                    return Err(ChurnError::SchemaMismatch {
                        column: column.name.clone(),
                        reason: "expected a categorical column".to_string(),
                    });
                }
            }
        }

        let encoded = Array2::from_shape_vec((n_rows, n_features), data)
            .expect("FeatureCodec::transform_batch: shape mismatch");
        Ok(self.scaler.transform(&encoded))
    }

    /// Encode and standardise one raw record into the frozen feature order.
    ///
    /// Extra fields on the record are ignored; an absent fitted column fails
    /// with [`ChurnError::MissingFeature`], a type clash with
    /// [`ChurnError::SchemaMismatch`], and an unseen category value with
    /// [`ChurnError::UnknownCategory`].
    pub fn transform_one(&self, record: &CustomerRecord) -> Result<Array1<f32>, ChurnError> {
        let mut row = Vec::with_capacity(self.columns.len());
        for column in &self.columns {
            let value = record.get(&column.name).ok_or_else(|| {
                ChurnError::MissingFeature {
                    column: column.name.clone(),
                }
            })?;
            let encoded = match (&column.encoding, value) {
                (FeatureEncoding::Numeric, FieldValue::Number(v)) => *v as f32,
                (FeatureEncoding::Numeric, FieldValue::Text(s)) => {
                    s.trim().parse::<f32>().map_err(|_| ChurnError::SchemaMismatch {
                        column: column.name.clone(),
                        reason: format!("expected a numeric value, got '{}'", s),
                    })?
                }
                (FeatureEncoding::Categorical(map), FieldValue::Text(s)) => {
                    map.code(s).ok_or_else(|| ChurnError::UnknownCategory {
                        column: column.name.clone(),
                        value: s.clone(),
                    })? as f32
                }
                (FeatureEncoding::Categorical(_), FieldValue::Number(v)) => {
                    return Err(ChurnError::SchemaMismatch {
                        column: column.name.clone(),
                        reason: format!("expected a category string, got number {}", v),
                    });
                }
            };
            row.push(encoded);
        }

        self.scaler.transform_row(&mut row);
        Ok(Array1::from_vec(row))
    }
}
