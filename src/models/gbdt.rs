use gbdt::config::Config;
use gbdt::decision_tree::{Data, DataVec};
use gbdt::gradient_boost::GBDT;
use ndarray::Array2;

use crate::config::{ModelConfig, ModelType};
use crate::error::ChurnError;
use crate::models::classifier_trait::ClassifierModel;

/// Gradient boosted decision trees over the `gbdt` crate.
///
/// Trained with the `LogLikelyhood` loss on ±1 labels; `predict` then yields
/// logistic-transformed probabilities.
pub struct GradientBoostingClassifier {
    model: Option<GBDT>,
    params: ModelConfig,
}

impl GradientBoostingClassifier {
    pub fn new(params: ModelConfig) -> Self {
        GradientBoostingClassifier {
            model: None,
            params,
        }
    }
}

impl ClassifierModel for GradientBoostingClassifier {
    fn fit(&mut self, x: &Array2<f32>, y: &[i32]) -> Result<(), ChurnError> {
        let ModelType::GradientBoosting {
            max_depth,
            num_boost_round,
            training_optimization_level,
        } = &self.params.model_type
        else {
            return Err(ChurnError::Training {
                model: self.name().to_string(),
                reason: format!("unexpected hyper-parameters: {:?}", self.params.model_type),
            });
        };

        let mut config = Config::new();
        config.set_feature_size(x.ncols());
        config.set_shrinkage(self.params.learning_rate);
        config.set_max_depth(*max_depth);
        config.set_iterations(*num_boost_round as usize);
        config.set_training_optimization_level(*training_optimization_level);
        config.set_loss("LogLikelyhood");

        let mut model = GBDT::new(&config);

        let mut train_data: DataVec = DataVec::new();
        for (row, &label) in y.iter().enumerate() {
            let target = if label == 1 { 1.0 } else { -1.0 };
            train_data.push(Data::new_training_data(x.row(row).to_vec(), 1.0, target, None));
        }

        model.fit(&mut train_data);
        self.model = Some(model);
        Ok(())
    }

    fn predict_proba(&self, x: &Array2<f32>) -> Result<Vec<f32>, ChurnError> {
        let model = self.model.as_ref().ok_or_else(|| ChurnError::Training {
            model: self.name().to_string(),
            reason: "predict_proba called before fit".to_string(),
        })?;

        let mut test_data: DataVec = DataVec::new();
        for row in 0..x.nrows() {
            test_data.push(Data::new_test_data(x.row(row).to_vec(), None));
        }

        // LogLikelyhood predictions are already in probability space; the
        // clamp guards the [0, 1] contract against rounding at the edges.
        Ok(model
            .predict(&test_data)
            .into_iter()
            .map(|p| p.clamp(0.0, 1.0))
            .collect())
    }

    fn name(&self) -> &str {
        "gradient_boosting"
    }
}
