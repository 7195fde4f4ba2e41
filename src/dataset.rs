//! In-memory dataset types and split helpers.
//!
//! `ChurnTable` holds the loaded training table with its typed columns and the
//! binary target; `CustomerRecord` is the raw single-record input shape shared
//! with the serving boundary. Splits and folds are stratified and seeded so a
//! run is reproducible end to end.
use std::collections::BTreeMap;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

/// A raw attribute value as it arrives from a dataset cell or a request body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Number(f64),
    Text(String),
}

/// One flat customer profile: attribute name to raw value.
///
/// Deserializes directly from a flat JSON object. Field order is irrelevant;
/// the feature codec reindexes to its own frozen column order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CustomerRecord {
    pub fields: BTreeMap<String, FieldValue>,
}

impl CustomerRecord {
    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.fields.get(name)
    }

    pub fn insert(&mut self, name: impl Into<String>, value: FieldValue) {
        self.fields.insert(name.into(), value);
    }
}

/// Values of one table column, typed at load time.
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnValues {
    Numeric(Vec<f32>),
    Categorical(Vec<String>),
}

impl ColumnValues {
    pub fn len(&self) -> usize {
        match self {
            ColumnValues::Numeric(v) => v.len(),
            ColumnValues::Categorical(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// The loaded training table: feature columns in file order plus the binary
/// target (1 = churned, 0 = retained), already separated by the loader.
#[derive(Debug, Clone)]
pub struct ChurnTable {
    columns: Vec<(String, ColumnValues)>,
    target: Vec<i32>,
}

impl ChurnTable {
    /// Build a table from column data and target labels. Every column must
    /// have exactly one value per target row.
    pub fn new(columns: Vec<(String, ColumnValues)>, target: Vec<i32>) -> Self {
        for (name, values) in &columns {
            assert_eq!(
                values.len(),
                target.len(),
                "column '{}' length does not match target length",
                name
            );
        }
        ChurnTable { columns, target }
    }

    pub fn n_rows(&self) -> usize {
        self.target.len()
    }

    pub fn n_columns(&self) -> usize {
        self.columns.len()
    }

    /// Columns in file order.
    pub fn columns(&self) -> impl Iterator<Item = (&str, &ColumnValues)> {
        self.columns.iter().map(|(n, v)| (n.as_str(), v))
    }

    pub fn column(&self, name: &str) -> Option<&ColumnValues> {
        self.columns
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v)
    }

    pub fn target(&self) -> &[i32] {
        &self.target
    }

    /// Fraction of positive labels.
    pub fn churn_rate(&self) -> f64 {
        if self.target.is_empty() {
            return 0.0;
        }
        let positives = self.target.iter().filter(|&&y| y == 1).count();
        positives as f64 / self.target.len() as f64
    }

    /// Rebuild the raw record for one row, as the serving boundary would
    /// submit it.
    pub fn record(&self, row: usize) -> CustomerRecord {
        let mut record = CustomerRecord::default();
        for (name, values) in &self.columns {
            let value = match values {
                ColumnValues::Numeric(v) => FieldValue::Number(f64::from(v[row])),
                ColumnValues::Categorical(v) => FieldValue::Text(v[row].clone()),
            };
            record.insert(name.clone(), value);
        }
        record
    }
}

/// Split row indices into (train, test) preserving the class balance.
///
/// Per class, indices are shuffled with a seeded RNG and `test_fraction` of
/// them (rounded) go to the test side. Both sides come back sorted so the
/// downstream matrix row order is stable.
pub fn stratified_split(y: &[i32], test_fraction: f32, seed: u64) -> (Vec<usize>, Vec<usize>) {
    assert!(
        test_fraction > 0.0 && test_fraction < 1.0,
        "test_fraction must lie strictly between 0 and 1"
    );

    let mut rng = StdRng::seed_from_u64(seed);
    let mut train = Vec::new();
    let mut test = Vec::new();

    for class in distinct_classes(y) {
        let mut indices: Vec<usize> = (0..y.len()).filter(|&i| y[i] == class).collect();
        indices.shuffle(&mut rng);

        let n_test = ((indices.len() as f32) * test_fraction).round() as usize;
        test.extend_from_slice(&indices[..n_test]);
        train.extend_from_slice(&indices[n_test..]);
    }

    train.sort_unstable();
    test.sort_unstable();
    (train, test)
}

/// Build `k` stratified cross-validation folds over row indices.
///
/// Each class's indices are shuffled once and dealt round-robin into `k`
/// buckets; fold `i` validates on bucket `i` and trains on the rest.
pub fn stratified_folds(y: &[i32], k: usize, seed: u64) -> Vec<(Vec<usize>, Vec<usize>)> {
    assert!(k >= 2, "cross-validation requires at least 2 folds");

    let mut rng = StdRng::seed_from_u64(seed);
    let mut buckets: Vec<Vec<usize>> = vec![Vec::new(); k];

    for class in distinct_classes(y) {
        let mut indices: Vec<usize> = (0..y.len()).filter(|&i| y[i] == class).collect();
        indices.shuffle(&mut rng);
        for (position, index) in indices.into_iter().enumerate() {
            buckets[position % k].push(index);
        }
    }

    (0..k)
        .map(|fold| {
            let mut valid = buckets[fold].clone();
            let mut train: Vec<usize> = buckets
                .iter()
                .enumerate()
                .filter(|(b, _)| *b != fold)
                .flat_map(|(_, bucket)| bucket.iter().copied())
                .collect();
            valid.sort_unstable();
            train.sort_unstable();
            (train, valid)
        })
        .collect()
}

fn distinct_classes(y: &[i32]) -> Vec<i32> {
    let mut classes: Vec<i32> = y.to_vec();
    classes.sort_unstable();
    classes.dedup();
    classes
}
