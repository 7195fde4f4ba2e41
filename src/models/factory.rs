use crate::config::{ModelConfig, ModelType};
use crate::encoding::FeatureCodec;
use crate::error::ChurnError;
use crate::models::baseline::BaselineHeuristic;
use crate::models::classifier_trait::ClassifierModel;
use crate::models::gbdt::GradientBoostingClassifier;
use crate::models::logistic::LogisticRegressionClassifier;
use crate::models::svm::SvmClassifier;

/// Build a boxed classifier variant from its configuration.
///
/// The codec is needed only by the baseline variant, which binds its scoring
/// rules to the fitted feature layout; learned variants ignore it.
pub fn build_model(
    params: &ModelConfig,
    codec: &FeatureCodec,
) -> Result<Box<dyn ClassifierModel>, ChurnError> {
    match &params.model_type {
        ModelType::GradientBoosting { .. } => {
            Ok(Box::new(GradientBoostingClassifier::new(params.clone())))
        }
        ModelType::LogisticRegression { .. } => {
            Ok(Box::new(LogisticRegressionClassifier::new(params.clone())))
        }
        ModelType::Svm { .. } => Ok(Box::new(SvmClassifier::new(params.clone()))),
        ModelType::Baseline => Ok(Box::new(BaselineHeuristic::from_codec(codec)?)),
    }
}
