use std::path::Path;
use std::str::FromStr;

use anyhow::Context;
use serde::{Deserialize, Serialize};

/// Central configuration for a single model variant.
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct ModelConfig {
    pub learning_rate: f32,

    #[serde(flatten)]
    pub model_type: ModelType,
}

/// Supported model variants and their hyper-parameters.
///
/// Hyper-parameters are fixed per variant; there is no search. `Baseline` is
/// the heuristic scoring variant and carries no parameters of its own.
#[derive(Deserialize, Serialize, Debug, Clone)]
pub enum ModelType {
    GradientBoosting {
        max_depth: u32,
        num_boost_round: u32,
        training_optimization_level: u8,
    },
    LogisticRegression {
        max_iterations: u64,
    },
    Svm {
        eps: f64,
        c: (f64, f64),
        kernel: String,
        gaussian_kernel_eps: f64,
    },
    Baseline,
}

impl Default for ModelType {
    fn default() -> Self {
        ModelType::GradientBoosting {
            max_depth: 6,
            num_boost_round: 100,
            training_optimization_level: 2,
        }
    }
}

impl FromStr for ModelType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "gradient_boosting" | "gbdt" => Ok(ModelType::GradientBoosting {
                max_depth: 6,
                num_boost_round: 100,
                training_optimization_level: 2,
            }),
            "logistic_regression" | "logistic" => Ok(ModelType::LogisticRegression {
                max_iterations: 1000,
            }),
            "svm" => Ok(ModelType::Svm {
                eps: 0.1,
                c: (1.0, 1.0),
                kernel: "linear".to_string(),
                gaussian_kernel_eps: 0.1,
            }),
            "baseline" => Ok(ModelType::Baseline),
            _ => Err(format!(
                "Unknown model type: {}. Valid options are: gradient_boosting, logistic_regression, svm, baseline",
                s
            )),
        }
    }
}

impl ModelConfig {
    pub fn new(learning_rate: f32, model_type: ModelType) -> Self {
        Self {
            learning_rate,
            model_type,
        }
    }
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            learning_rate: 0.1,
            model_type: ModelType::default(),
        }
    }
}

/// A named entry in the variant registry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VariantConfig {
    pub name: String,

    #[serde(flatten)]
    pub model: ModelConfig,
}

/// Parameters for one full pipeline run: dataset schema knobs, the train/test
/// split, cross-validation, and the variant registry.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Name of the binary label column in the dataset (`Yes`/`No`).
    pub target_column: String,
    /// Columns excluded from the feature set (identifiers and the like).
    pub excluded_columns: Vec<String>,
    /// Fraction of rows held out for evaluation.
    pub test_fraction: f32,
    /// Folds for the cross-validated stability estimate.
    pub cv_folds: usize,
    /// Seed for every split and fold drawn during the run.
    pub seed: u64,
    /// Variant registry. Registration order is the final selection tie-break.
    pub variants: Vec<VariantConfig>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            target_column: "churn".to_string(),
            excluded_columns: vec!["customer_id".to_string()],
            test_fraction: 0.2,
            cv_folds: 5,
            seed: 42,
            variants: default_variants(),
        }
    }
}

/// The fixed variant registry used when no configuration file overrides it.
pub fn default_variants() -> Vec<VariantConfig> {
    vec![
        VariantConfig {
            name: "gradient_boosting".to_string(),
            model: ModelConfig {
                learning_rate: 0.1,
                model_type: ModelType::GradientBoosting {
                    max_depth: 6,
                    num_boost_round: 100,
                    training_optimization_level: 2,
                },
            },
        },
        VariantConfig {
            name: "logistic_regression".to_string(),
            model: ModelConfig {
                learning_rate: 0.1,
                model_type: ModelType::LogisticRegression {
                    max_iterations: 1000,
                },
            },
        },
        VariantConfig {
            name: "svm".to_string(),
            model: ModelConfig {
                learning_rate: 0.1,
                model_type: ModelType::Svm {
                    eps: 0.1,
                    c: (1.0, 1.0),
                    kernel: "linear".to_string(),
                    gaussian_kernel_eps: 0.1,
                },
            },
        },
        VariantConfig {
            name: "baseline".to_string(),
            model: ModelConfig {
                learning_rate: 0.1,
                model_type: ModelType::Baseline,
            },
        },
    ]
}

/// Load a pipeline configuration from a JSON file.
pub fn load_pipeline_config<P: AsRef<Path>>(path: P) -> anyhow::Result<PipelineConfig> {
    let content = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read config: {}", path.as_ref().display()))?;
    let config: PipelineConfig = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse config: {}", path.as_ref().display()))?;
    Ok(config)
}
