//! Fits the variant registry on the encoded training split.
use ndarray::Array2;

use crate::config::{ModelConfig, VariantConfig};
use crate::encoding::FeatureCodec;
use crate::error::ChurnError;
use crate::models::{factory, ClassifierModel};

/// A fitted variant plus the configuration needed to refit it from scratch
/// (cross-validation builds a fresh model per fold).
pub struct TrainedVariant {
    pub name: String,
    pub config: ModelConfig,
    pub model: Box<dyn ClassifierModel>,
}

impl std::fmt::Debug for TrainedVariant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TrainedVariant")
            .field("name", &self.name)
            .field("config", &self.config)
            .field("model", &self.model.name())
            .finish()
    }
}

/// Trains every registered variant independently on the same matrix.
pub struct ModelTrainer {
    variants: Vec<VariantConfig>,
}

impl ModelTrainer {
    pub fn new(variants: Vec<VariantConfig>) -> Self {
        ModelTrainer { variants }
    }

    /// Fit all variants on the encoded/scaled training matrix.
    ///
    /// A variant that fails to build or fit is logged and dropped from this
    /// run; the error is fatal only when no variant survives.
    pub fn train(
        &self,
        x: &Array2<f32>,
        y: &[i32],
        codec: &FeatureCodec,
    ) -> Result<Vec<TrainedVariant>, ChurnError> {
        let mut trained = Vec::with_capacity(self.variants.len());

        for variant in &self.variants {
            log::info!(
                "Training variant '{}' on {} samples with {} features",
                variant.name,
                x.nrows(),
                x.ncols()
            );

            let attempt = factory::build_model(&variant.model, codec)
                .and_then(|mut model| model.fit(x, y).map(|_| model));

            match attempt {
                Ok(model) => trained.push(TrainedVariant {
                    name: variant.name.clone(),
                    config: variant.model.clone(),
                    model,
                }),
                Err(err) => log::error!("Variant '{}' failed to fit: {}", variant.name, err),
            }
        }

        if trained.is_empty() {
            return Err(ChurnError::Training {
                model: "all".to_string(),
                reason: "no variant fitted successfully".to_string(),
            });
        }

        log::info!(
            "Trained {} of {} variants",
            trained.len(),
            self.variants.len()
        );
        Ok(trained)
    }
}
