use ndarray::Array2;

use crate::error::ChurnError;

/// Contract shared by every variant in the training registry, learned and
/// heuristic alike.
///
/// After a successful `fit` a model is frozen: `predict_proba` takes `&self`
/// so a trained model can serve concurrent readers without locking.
pub trait ClassifierModel: Send + Sync {
    /// Fit on the encoded/scaled training matrix. `y` holds 1 (churned) and
    /// 0 (retained). A failed fit is a per-variant error, not a panic.
    fn fit(&mut self, x: &Array2<f32>, y: &[i32]) -> Result<(), ChurnError>;

    /// Probability of the positive (churn) class per row, each in [0, 1].
    fn predict_proba(&self, x: &Array2<f32>) -> Result<Vec<f32>, ChurnError>;

    /// Human readable variant name.
    fn name(&self) -> &str;
}
