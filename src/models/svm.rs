use linfa::dataset::Pr;
use linfa::traits::Predict;
use linfa::Dataset;
use linfa_svm::{Svm, SvmParams};
use ndarray::{Array1, Array2};

use crate::config::{ModelConfig, ModelType};
use crate::error::ChurnError;
use crate::models::classifier_trait::ClassifierModel;

/// Support vector machine over `linfa-svm` with Platt-scaled probabilities.
pub struct SvmClassifier {
    model: Option<Svm<f64, Pr>>,
    params: ModelConfig,
}

impl SvmClassifier {
    pub fn new(params: ModelConfig) -> Self {
        SvmClassifier {
            model: None,
            params,
        }
    }
}

impl ClassifierModel for SvmClassifier {
    fn fit(&mut self, x: &Array2<f32>, y: &[i32]) -> Result<(), ChurnError> {
        let ModelType::Svm {
            eps,
            c,
            kernel,
            gaussian_kernel_eps,
        } = &self.params.model_type
        else {
            return Err(ChurnError::Training {
                model: self.name().to_string(),
                reason: format!("unexpected hyper-parameters: {:?}", self.params.model_type),
            });
        };

        let y_bool: Vec<bool> = y.iter().map(|&label| label == 1).collect();
        let x_f64 = x.mapv(|v| f64::from(v));
        let dataset = Dataset::new(x_f64, Array1::from_vec(y_bool));

        let (c_pos, c_neg) = *c;
        let mut params: SvmParams<f64, Pr> =
            Svm::<f64, Pr>::params().eps(*eps).pos_neg_weights(c_pos, c_neg);

        params = match kernel.as_str() {
            "linear" => params.linear_kernel(),
            "gauss" => params.gaussian_kernel(*gaussian_kernel_eps),
            other => {
                return Err(ChurnError::Training {
                    model: self.name().to_string(),
                    reason: format!(
                        "unsupported kernel '{}': valid options are linear, gauss",
                        other
                    ),
                });
            }
        };

        let fitted = <SvmParams<f64, Pr> as linfa::traits::Fit<_, _, _>>::fit(&params, &dataset)
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
        let predictions = model.predict(x_f64);
        let probabilities: Vec<Pr> = predictions.targets().to_vec();
        Ok(probabilities.iter().map(|&p| *p).collect())
    }

    fn name(&self) -> &str {
        "svm"
    }
}
