//! Dataset ingestion.
pub mod churn_csv;

pub use churn_csv::load_churn_csv;
