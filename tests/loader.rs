//! Integration tests for the dataset loader.

mod common;

use churn_classifiers::dataset::ColumnValues;
use churn_classifiers::error::ChurnError;
use churn_classifiers::io::load_churn_csv;

// ---------------------------------------------------------------------------
// Happy path
// ---------------------------------------------------------------------------

#[test]
fn loads_rows_and_types_columns() {
    let path = common::write_churn_dataset("loader_ok", 120, 3);
    let table = load_churn_csv(&path, "churn").unwrap();

    assert_eq!(table.n_rows(), 120);
    // Header minus the target column.
    assert_eq!(table.n_columns(), 14);

    assert!(matches!(
        table.column("age"),
        Some(ColumnValues::Numeric(_))
    ));
    assert!(matches!(
        table.column("contract_type"),
        Some(ColumnValues::Categorical(_))
    ));
    assert!(table.column("churn").is_none(), "target must be separated");

    for &label in table.target() {
        assert!(label == 0 || label == 1);
    }
    let rate = table.churn_rate();
    assert!(rate > 0.3 && rate < 0.9, "implausible churn rate {}", rate);
}

#[test]
fn target_header_match_is_case_insensitive() {
    let path = common::write_temp("loader_case.csv", "age,Churn\n41,Yes\n52,No\n");
    let table = load_churn_csv(&path, "churn").unwrap();
    assert_eq!(table.target(), &[1, 0]);
}

// ---------------------------------------------------------------------------
// Failure modes
// ---------------------------------------------------------------------------

#[test]
fn missing_file_is_a_data_load_error() {
    let err = load_churn_csv("/definitely/not/here.csv", "churn").unwrap_err();
    assert!(matches!(err, ChurnError::DataLoad { .. }), "got {:?}", err);
}

#[test]
fn missing_target_column_is_a_data_load_error() {
    let path = common::write_temp("loader_no_target.csv", "age,plan\n41,basic\n");
    let err = load_churn_csv(&path, "churn").unwrap_err();
    assert!(matches!(err, ChurnError::DataLoad { .. }));
}

#[test]
fn invalid_target_value_is_a_data_load_error() {
    let path = common::write_temp("loader_bad_target.csv", "age,churn\n41,Maybe\n");
    let err = load_churn_csv(&path, "churn").unwrap_err();
    match err {
        ChurnError::DataLoad { reason, .. } => assert!(reason.contains("Maybe")),
        other => panic!("expected DataLoad, got {:?}", other),
    }
}

#[test]
fn ragged_row_is_a_data_load_error() {
    let path = common::write_temp("loader_ragged.csv", "a,b,churn\n1,2,Yes\n3,No\n");
    let err = load_churn_csv(&path, "churn").unwrap_err();
    assert!(matches!(err, ChurnError::DataLoad { .. }));
}

#[test]
fn empty_table_is_a_data_load_error() {
    let path = common::write_temp("loader_empty.csv", "age,churn\n");
    let err = load_churn_csv(&path, "churn").unwrap_err();
    assert!(matches!(err, ChurnError::DataLoad { .. }));
}

// ---------------------------------------------------------------------------
// Type inference
// ---------------------------------------------------------------------------

#[test]
fn one_unparseable_value_makes_a_column_categorical() {
    let path = common::write_temp(
        "loader_mixed.csv",
        "age,churn\n41,Yes\nunknown,No\n12,Yes\n",
    );
    let table = load_churn_csv(&path, "churn").unwrap();
    assert!(matches!(
        table.column("age"),
        Some(ColumnValues::Categorical(_))
    ));
}
