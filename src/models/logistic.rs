use linfa::prelude::*;
use linfa::Dataset;
use linfa_logistic::{FittedLogisticRegression, LogisticRegression};
use ndarray::{Array1, Array2};

use crate::config::{ModelConfig, ModelType};
use crate::error::ChurnError;
use crate::models::classifier_trait::ClassifierModel;

/// Linear classifier over `linfa-logistic`.
pub struct LogisticRegressionClassifier {
    model: Option<FittedLogisticRegression<f64, bool>>,
    params: ModelConfig,
}

impl LogisticRegressionClassifier {
    pub fn new(params: ModelConfig) -> Self {
        LogisticRegressionClassifier {
            model: None,
            params,
        }
    }
}

impl ClassifierModel for LogisticRegressionClassifier {
    fn fit(&mut self, x: &Array2<f32>, y: &[i32]) -> Result<(), ChurnError> {
        let ModelType::LogisticRegression { max_iterations } = &self.params.model_type else {
            return Err(ChurnError::Training {
                model: self.name().to_string(),
                reason: format!("unexpected hyper-parameters: {:?}", self.params.model_type),
            });
        };

        // linfa models work in f64; the crate convention is f32 matrices.
        let x_f64 = x.mapv(|v| f64::from(v));
        let y_bool = Array1::from_vec(y.iter().map(|&label| label == 1).collect());
        let dataset = Dataset::new(x_f64, y_bool);

        let fitted = LogisticRegression::default()
            .max_iterations(*max_iterations)
            .fit(&dataset)
            .map_err(|e| ChurnError::Training {
                model: self.name().to_string(),
                reason: e.to_string(),
            })?;

        self.model = Some(fitted);
        Ok(())
    }

    fn predict_proba(&self, x: &Array2<f32>) -> Result<Vec<f32>, ChurnError> {
        let model = self.model.as_ref().ok_or_else(|| ChurnError::Training {
            model: self.name().to_string(),
            reason: "predict_proba called before fit".to_string(),
        })?;

        let x_f64 = x.mapv(|v| f64::from(v));
        let probabilities = model.predict_probabilities(&x_f64);
        Ok(probabilities.iter().map(|&p| p as f32).collect())
    }

    fn name(&self) -> &str {
        "logistic_regression"
    }
}
