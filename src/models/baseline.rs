//! Heuristic baseline variant.
//!
//! Additive scoring rules over a handful of raw customer attributes, kept in
//! the registry as a floor for the learned variants. Because every variant
//! consumes the encoded/scaled matrix, the baseline binds to the fitted codec
//! at construction time: it resolves the column indices it reads, inverts the
//! standardisation to recover raw values, and resolves the category codes it
//! compares against.
use ndarray::{Array2, ArrayView1};

use crate::encoding::FeatureCodec;
use crate::error::ChurnError;
use crate::models::classifier_trait::ClassifierModel;

const MODEL_NAME: &str = "baseline";

/// One feature column read back in raw units.
#[derive(Debug, Clone, Copy)]
struct FieldProbe {
    index: usize,
    mean: f32,
    std: f32,
}

impl FieldProbe {
    fn raw(&self, row: &ArrayView1<'_, f32>) -> f32 {
        row[self.index] * self.std + self.mean
    }
}

/// Rule-based churn scorer; `fit` learns nothing.
#[derive(Debug)]
pub struct BaselineHeuristic {
    contract: FieldProbe,
    month_to_month: f32,
    two_year: f32,
    satisfaction: FieldProbe,
    service_calls: FieldProbe,
    late_payments: FieldProbe,
    monthly_charge: FieldProbe,
    age: FieldProbe,
    tech_support: FieldProbe,
    tech_support_yes: f32,
    paperless: FieldProbe,
    paperless_yes: f32,
}

impl BaselineHeuristic {
    /// Bind the rules to a fitted codec. A codec missing one of the required
    /// columns (or category values) makes this variant fail to train, which
    /// the trainer treats as a per-variant error.
    pub fn from_codec(codec: &FeatureCodec) -> Result<Self, ChurnError> {
        let probe = |name: &str| -> Result<FieldProbe, ChurnError> {
            let index = codec.feature_index(name).ok_or_else(|| ChurnError::Training {
                model: MODEL_NAME.to_string(),
                reason: format!("required feature '{}' is not available", name),
            })?;
            let scaler = codec.scaler();
            Ok(FieldProbe {
                index,
                mean: scaler.mean[index],
                std: scaler.std[index],
            })
        };
        let code = |column: &str, value: &str| -> Result<f32, ChurnError> {
            codec
                .category_code(column, value)
                .map(|c| c as f32)
                .ok_or_else(|| ChurnError::Training {
                    model: MODEL_NAME.to_string(),
                    reason: format!("category '{}' missing from column '{}'", value, column),
                })
        };

        Ok(BaselineHeuristic {
            contract: probe("contract_type")?,
            month_to_month: code("contract_type", "Month-to-month")?,
            two_year: code("contract_type", "Two year")?,
            satisfaction: probe("satisfaction_score")?,
            service_calls: probe("number_customer_service_calls")?,
            late_payments: probe("late_payment_count")?,
            monthly_charge: probe("monthly_charge")?,
            age: probe("age")?,
            tech_support: probe("tech_support")?,
            tech_support_yes: code("tech_support", "Yes")?,
            paperless: probe("paperless_billing")?,
            paperless_yes: code("paperless_billing", "Yes")?,
        })
    }

    fn score_row(&self, row: &ArrayView1<'_, f32>) -> f32 {
        let mut probability = 0.3f32;

        let contract = self.contract.raw(row).round();
        if contract == self.month_to_month {
            probability += 0.2;
        }
        if self.satisfaction.raw(row) < 5.0 {
            probability += 0.25;
        }
        if self.service_calls.raw(row) > 5.0 {
            probability += 0.15;
        }
        if self.late_payments.raw(row) > 0.0 {
            probability += 0.1;
        }
        if self.monthly_charge.raw(row) > 80.0 {
            probability += 0.1;
        }
        if self.age.raw(row) < 30.0 {
            probability += 0.05;
        }

        if contract == self.two_year {
            probability -= 0.15;
        }
        if self.satisfaction.raw(row) >= 8.0 {
            probability -= 0.2;
        }
        if self.tech_support.raw(row).round() == self.tech_support_yes {
            probability -= 0.1;
        }
        if self.paperless.raw(row).round() == self.paperless_yes {
            probability -= 0.05;
        }

        probability.clamp(0.1, 0.9)
    }
}

impl ClassifierModel for BaselineHeuristic {
    fn fit(&mut self, _x: &Array2<f32>, _y: &[i32]) -> Result<(), ChurnError> {
        // The rules are fixed; binding to the codec happened at construction.
        Ok(())
    }

    fn predict_proba(&self, x: &Array2<f32>) -> Result<Vec<f32>, ChurnError> {
        Ok((0..x.nrows()).map(|r| self.score_row(&x.row(r))).collect())
    }

    fn name(&self) -> &str {
        MODEL_NAME
    }
}
