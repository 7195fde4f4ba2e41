//! Held-out evaluation, cross-validated stability and best-model selection.
use std::fmt::Write as _;

use ndarray::{Array2, Axis};
use statrs::statistics::Statistics;

use crate::dataset::stratified_folds;
use crate::encoding::FeatureCodec;
use crate::error::ChurnError;
use crate::models::factory;
use crate::stats::{accuracy, roc_auc};
use crate::trainer::TrainedVariant;

/// Metrics for one variant: held-out accuracy and AUC plus the k-fold
/// cross-validated accuracy on the training split.
#[derive(Debug, Clone)]
pub struct EvaluationResult {
    pub accuracy: f64,
    pub auc: f64,
    pub cv_mean: f64,
    pub cv_std: f64,
    /// Held-out class predictions at the 0.5 threshold.
    pub predictions: Vec<i32>,
    /// Held-out probabilities of the positive class.
    pub probabilities: Vec<f32>,
}

/// Score every trained variant on the held-out split and estimate stability
/// with cross-validation on the training split.
///
/// Results keep registration order; a variant whose prediction fails is
/// logged and skipped rather than failing the run.
#[allow(clippy::too_many_arguments)]
pub fn evaluate_variants(
    variants: &[TrainedVariant],
    codec: &FeatureCodec,
    x_test: &Array2<f32>,
    y_test: &[i32],
    x_train: &Array2<f32>,
    y_train: &[i32],
    cv_folds: usize,
    seed: u64,
) -> Result<Vec<(String, EvaluationResult)>, ChurnError> {
    let folds = stratified_folds(y_train, cv_folds, seed);
    let mut results = Vec::with_capacity(variants.len());

    for variant in variants {
        let probabilities = match variant.model.predict_proba(x_test) {
            Ok(p) => p,
            Err(err) => {
                log::error!("Variant '{}' failed on the test split: {}", variant.name, err);
                continue;
            }
        };

        let test_accuracy = accuracy(y_test, &probabilities);
        let auc = roc_auc(y_test, &probabilities);
        let predictions = probabilities
            .iter()
            .map(|&p| i32::from(p >= 0.5))
            .collect();

        let (cv_mean, cv_std) = cross_validate(variant, codec, x_train, y_train, &folds);

        log::info!(
            "Variant '{}': accuracy {:.4}, AUC {:.4}, CV {:.4} (+/- {:.4})",
            variant.name,
            test_accuracy,
            auc,
            cv_mean,
            2.0 * cv_std
        );

        results.push((
            variant.name.clone(),
            EvaluationResult {
                accuracy: test_accuracy,
                auc,
                cv_mean,
                cv_std,
                predictions,
                probabilities,
            },
        ));
    }

    Ok(results)
}

/// Mean and population stddev of per-fold accuracy, refitting a fresh model
/// per fold from the variant's configuration.
fn cross_validate(
    variant: &TrainedVariant,
    codec: &FeatureCodec,
    x_train: &Array2<f32>,
    y_train: &[i32],
    folds: &[(Vec<usize>, Vec<usize>)],
) -> (f64, f64) {
    let mut scores = Vec::with_capacity(folds.len());

    for (fold, (fit_idx, valid_idx)) in folds.iter().enumerate() {
        let x_fit = x_train.select(Axis(0), fit_idx);
        let y_fit: Vec<i32> = fit_idx.iter().map(|&i| y_train[i]).collect();
        let x_valid = x_train.select(Axis(0), valid_idx);
        let y_valid: Vec<i32> = valid_idx.iter().map(|&i| y_train[i]).collect();

        let attempt = factory::build_model(&variant.config, codec)
            .and_then(|mut model| model.fit(&x_fit, &y_fit).map(|_| model))
            .and_then(|model| model.predict_proba(&x_valid));

        match attempt {
            Ok(probabilities) => scores.push(accuracy(&y_valid, &probabilities)),
            Err(err) => log::warn!(
                "Variant '{}' failed on fold {}: {}",
                variant.name,
                fold,
                err
            ),
        }
    }

    if scores.is_empty() {
        log::warn!(
            "Variant '{}' produced no cross-validation scores",
            variant.name
        );
        return (0.0, 0.0);
    }

    let mean = scores.iter().mean();
    let std = scores.iter().population_std_dev();
    (mean, std)
}

/// Pick the winning variant: maximum AUC, ties broken by higher
/// cross-validated mean accuracy, then by registration order.
pub fn select_best(results: &[(String, EvaluationResult)]) -> Option<usize> {
    let mut best: Option<usize> = None;
    for (index, (_, result)) in results.iter().enumerate() {
        match best {
            None => best = Some(index),
            Some(current) => {
                let leader = &results[current].1;
                if result.auc > leader.auc
                    || (result.auc == leader.auc && result.cv_mean > leader.cv_mean)
                {
                    best = Some(index);
                }
            }
        }
    }
    best
}

/// Plain-text comparison table, best AUC first; the selected variant is
/// starred.
pub fn format_comparison(results: &[(String, EvaluationResult)], selected: Option<&str>) -> String {
    let mut order: Vec<usize> = (0..results.len()).collect();
    order.sort_by(|&a, &b| {
        results[b]
            .1
            .auc
            .partial_cmp(&results[a].1.auc)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:<22} {:>9} {:>9} {:>18}",
        "model", "accuracy", "auc", "cv accuracy"
    );
    for index in order {
        let (name, result) = &results[index];
        let marker = if selected == Some(name.as_str()) { " *" } else { "" };
        let _ = writeln!(
            out,
            "{:<22} {:>9.4} {:>9.4} {:>10.4} +/- {:.4}{}",
            name, result.accuracy, result.auc, result.cv_mean, result.cv_std, marker
        );
    }
    out
}
