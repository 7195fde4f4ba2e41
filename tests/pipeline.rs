//! End-to-end pipeline tests on a seeded synthetic corpus.

mod common;

use std::sync::OnceLock;

use churn_classifiers::config::{default_variants, PipelineConfig};
use churn_classifiers::dataset::FieldValue;
use churn_classifiers::error::ChurnError;
use churn_classifiers::io::load_churn_csv;
use churn_classifiers::pipeline::{ChurnPipeline, PipelineState};

/// One bootstrapped pipeline shared by the read-only assertions below;
/// training all variants plus cross-validation is the expensive part.
fn ready_pipeline() -> &'static ChurnPipeline {
    static PIPELINE: OnceLock<ChurnPipeline> = OnceLock::new();
    PIPELINE.get_or_init(|| {
        let path = common::write_churn_dataset("pipeline_scenario", 1000, 7);
        ChurnPipeline::bootstrap(PipelineConfig::default(), path).unwrap()
    })
}

fn sample_record() -> churn_classifiers::dataset::CustomerRecord {
    let path = common::write_churn_dataset("pipeline_scenario", 1000, 7);
    let table = load_churn_csv(path, "churn").unwrap();
    table.record(17)
}

// ---------------------------------------------------------------------------
// Scenario: full bootstrap on 1000 rows
// ---------------------------------------------------------------------------

#[test]
fn bootstrap_reaches_ready_with_all_variants() {
    let pipeline = ready_pipeline();
    assert_eq!(pipeline.state(), PipelineState::Ready);
    assert_eq!(pipeline.results().len(), 4);

    let names: Vec<&str> = pipeline.results().iter().map(|(n, _)| n.as_str()).collect();
    assert_eq!(
        names,
        vec!["gradient_boosting", "logistic_regression", "svm", "baseline"]
    );
}

#[test]
fn selected_model_beats_random_ranking() {
    let pipeline = ready_pipeline();
    let selected = pipeline.selected_variant().unwrap();
    let (_, result) = pipeline
        .results()
        .iter()
        .find(|(name, _)| *name == selected.name)
        .unwrap();

    assert!(result.auc > 0.5, "selected AUC = {}", result.auc);
    assert!(
        result.accuracy > 0.55 && result.accuracy <= 1.0,
        "selected accuracy = {}",
        result.accuracy
    );
    assert!(result.cv_mean > 0.5, "selected CV mean = {}", result.cv_mean);
}

#[test]
fn every_variant_reports_probabilities_in_range() {
    let pipeline = ready_pipeline();
    for (name, result) in pipeline.results() {
        assert!(!result.probabilities.is_empty());
        for &p in &result.probabilities {
            assert!(
                (0.0..=1.0).contains(&p),
                "variant '{}' produced probability {}",
                name,
                p
            );
        }
    }
}

// ---------------------------------------------------------------------------
// Inference
// ---------------------------------------------------------------------------

#[test]
fn predict_is_deterministic_and_in_range() {
    let pipeline = ready_pipeline();
    let record = sample_record();

    let first = pipeline.predict(&record).unwrap();
    let second = pipeline.predict(&record).unwrap();
    assert!((0.0..=1.0).contains(&first));
    assert!(
        (f64::from(first) - f64::from(second)).abs() < 1e-9,
        "repeated predictions diverged: {} vs {}",
        first,
        second
    );
}

#[test]
fn predict_batch_agrees_with_single_predictions() {
    let pipeline = ready_pipeline();
    let path = common::write_churn_dataset("pipeline_scenario", 1000, 7);
    let table = load_churn_csv(path, "churn").unwrap();

    let records: Vec<_> = (0..5).map(|r| table.record(r)).collect();
    let batch = pipeline.predict_batch(&records).unwrap();
    assert_eq!(batch.len(), records.len());
    for (record, &expected) in records.iter().zip(batch.iter()) {
        let single = pipeline.predict(record).unwrap();
        assert!((f64::from(single) - f64::from(expected)).abs() < 1e-9);
    }
}

#[test]
fn unseen_category_is_rejected_at_inference() {
    let pipeline = ready_pipeline();
    let mut record = sample_record();
    record.insert("contract_type", FieldValue::Text("Lifetime".to_string()));

    let err = pipeline.predict(&record).unwrap_err();
    assert!(
        matches!(err, ChurnError::UnknownCategory { ref value, .. } if value == "Lifetime"),
        "got {:?}",
        err
    );
}

// ---------------------------------------------------------------------------
// State machine
// ---------------------------------------------------------------------------

#[test]
fn predict_before_ready_is_model_not_ready() {
    let pipeline = ChurnPipeline::new(PipelineConfig::default());
    let err = pipeline.predict(&sample_record()).unwrap_err();
    assert!(matches!(err, ChurnError::ModelNotReady { .. }));
}

#[test]
fn transitions_must_happen_in_order() {
    let mut pipeline = ChurnPipeline::new(PipelineConfig::default());
    assert!(matches!(
        pipeline.fit_features().unwrap_err(),
        ChurnError::ModelNotReady { .. }
    ));
    assert!(matches!(
        pipeline.train().unwrap_err(),
        ChurnError::ModelNotReady { .. }
    ));
    assert!(matches!(
        pipeline.evaluate().unwrap_err(),
        ChurnError::ModelNotReady { .. }
    ));
}

// ---------------------------------------------------------------------------
// Per-variant failure isolation
// ---------------------------------------------------------------------------

/// A dataset without the columns the baseline heuristic needs.
fn narrow_dataset() -> std::path::PathBuf {
    let mut csv = String::from("age,plan,churn\n");
    for i in 0..40 {
        let churned = i % 2 == 0;
        let plan = if churned { "basic" } else { "premium" };
        let age = 20 + (i * 3) % 50;
        csv.push_str(&format!(
            "{},{},{}\n",
            age,
            plan,
            if churned { "Yes" } else { "No" }
        ));
    }
    common::write_temp("pipeline_narrow.csv", &csv)
}

#[test]
fn failing_variant_is_dropped_but_others_survive() {
    let mut config = PipelineConfig::default();
    config.variants = default_variants()
        .into_iter()
        .filter(|v| v.name == "baseline" || v.name == "logistic_regression")
        .collect();

    let pipeline = ChurnPipeline::bootstrap(config, narrow_dataset()).unwrap();
    assert_eq!(pipeline.state(), PipelineState::Ready);

    let names: Vec<&str> = pipeline.results().iter().map(|(n, _)| n.as_str()).collect();
    assert_eq!(names, vec!["logistic_regression"]);
    assert_eq!(
        pipeline.selected_variant().unwrap().name,
        "logistic_regression"
    );
}

#[test]
fn all_variants_failing_is_fatal() {
    let mut config = PipelineConfig::default();
    config.variants = default_variants()
        .into_iter()
        .filter(|v| v.name == "baseline")
        .collect();

    let err = ChurnPipeline::bootstrap(config, narrow_dataset()).unwrap_err();
    assert!(matches!(err, ChurnError::Training { .. }), "got {:?}", err);
}
