//! The end-to-end pipeline: load, fit features, train, evaluate, serve.
//!
//! `ChurnPipeline` is an explicit context object: the process builds one at
//! startup and hands it (behind an `Arc` or similar) to whatever serves
//! requests. Nothing in here is global. After `evaluate` completes the
//! pipeline is frozen; `predict` takes `&self` and is safe for concurrent
//! callers. Re-training means building a fresh pipeline and swapping the
//! handle whole, so readers never observe a half-updated codec/model pair.
use std::path::Path;

use ndarray::{Array2, Axis};

use crate::config::PipelineConfig;
use crate::dataset::{stratified_split, ChurnTable, CustomerRecord};
use crate::encoding::FeatureCodec;
use crate::error::ChurnError;
use crate::evaluation::{evaluate_variants, select_best, EvaluationResult};
use crate::io::load_churn_csv;
use crate::trainer::{ModelTrainer, TrainedVariant};

/// Lifecycle of one pipeline run. Transitions happen strictly in order;
/// `predict` before `Ready` is an error, never a silent fallback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    Uninitialized,
    DataLoaded,
    FeaturesFit,
    Trained,
    Ready,
}

impl PipelineState {
    pub fn name(&self) -> &'static str {
        match self {
            PipelineState::Uninitialized => "uninitialized",
            PipelineState::DataLoaded => "data_loaded",
            PipelineState::FeaturesFit => "features_fit",
            PipelineState::Trained => "trained",
            PipelineState::Ready => "ready",
        }
    }
}

/// The training-and-inference pipeline.
#[derive(Debug)]
pub struct ChurnPipeline {
    config: PipelineConfig,
    state: PipelineState,
    table: Option<ChurnTable>,
    codec: Option<FeatureCodec>,
    x_train: Option<Array2<f32>>,
    x_test: Option<Array2<f32>>,
    y_train: Vec<i32>,
    y_test: Vec<i32>,
    variants: Vec<TrainedVariant>,
    results: Vec<(String, EvaluationResult)>,
    selected: Option<usize>,
}

impl ChurnPipeline {
    pub fn new(config: PipelineConfig) -> Self {
        ChurnPipeline {
            config,
            state: PipelineState::Uninitialized,
            table: None,
            codec: None,
            x_train: None,
            x_test: None,
            y_train: Vec::new(),
            y_test: Vec::new(),
            variants: Vec::new(),
            results: Vec::new(),
            selected: None,
        }
    }

    /// Run the whole startup sequence: load, fit features, train, evaluate.
    pub fn bootstrap<P: AsRef<Path>>(
        config: PipelineConfig,
        dataset_path: P,
    ) -> Result<Self, ChurnError> {
        let mut pipeline = ChurnPipeline::new(config);
        pipeline.load_data(dataset_path)?;
        pipeline.fit_features()?;
        pipeline.train()?;
        pipeline.evaluate()?;
        Ok(pipeline)
    }

    pub fn state(&self) -> PipelineState {
        self.state
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Load the labelled dataset. `Uninitialized -> DataLoaded`.
    pub fn load_data<P: AsRef<Path>>(&mut self, path: P) -> Result<(), ChurnError> {
        self.expect_state(PipelineState::Uninitialized)?;

        let table = load_churn_csv(path, &self.config.target_column)?;
        log::info!(
            "Loaded {} rows and {} feature columns (churn rate {:.1}%)",
            table.n_rows(),
            table.n_columns(),
            table.churn_rate() * 100.0
        );

        self.table = Some(table);
        self.state = PipelineState::DataLoaded;
        Ok(())
    }

    /// Fit the feature codec and carve the stratified train/test split.
    /// `DataLoaded -> FeaturesFit`.
    pub fn fit_features(&mut self) -> Result<(), ChurnError> {
        self.expect_state(PipelineState::DataLoaded)?;
        let table = self.table.as_ref().expect("table present in DataLoaded");

        let (codec, matrix) = FeatureCodec::fit(table, &self.config.excluded_columns)?;
        let (train_idx, test_idx) =
            stratified_split(table.target(), self.config.test_fraction, self.config.seed);

        self.x_train = Some(matrix.select(Axis(0), &train_idx));
        self.x_test = Some(matrix.select(Axis(0), &test_idx));
        self.y_train = train_idx.iter().map(|&i| table.target()[i]).collect();
        self.y_test = test_idx.iter().map(|&i| table.target()[i]).collect();

        log::info!(
            "Fitted feature codec with {} features; split {} train / {} test rows",
            codec.n_features(),
            train_idx.len(),
            test_idx.len()
        );

        self.codec = Some(codec);
        self.state = PipelineState::FeaturesFit;
        Ok(())
    }

    /// Fit every registered variant. `FeaturesFit -> Trained`.
    pub fn train(&mut self) -> Result<(), ChurnError> {
        self.expect_state(PipelineState::FeaturesFit)?;
        let codec = self.codec.as_ref().expect("codec present in FeaturesFit");
        let x_train = self.x_train.as_ref().expect("split present in FeaturesFit");

        let trainer = ModelTrainer::new(self.config.variants.clone());
        self.variants = trainer.train(x_train, &self.y_train, codec)?;
        self.state = PipelineState::Trained;
        Ok(())
    }

    /// Evaluate all trained variants and select the best by AUC.
    /// `Trained -> Ready`.
    pub fn evaluate(&mut self) -> Result<(), ChurnError> {
        self.expect_state(PipelineState::Trained)?;
        let codec = self.codec.as_ref().expect("codec present in Trained");
        let x_train = self.x_train.as_ref().expect("split present in Trained");
        let x_test = self.x_test.as_ref().expect("split present in Trained");

        let results = evaluate_variants(
            &self.variants,
            codec,
            x_test,
            &self.y_test,
            x_train,
            &self.y_train,
            self.config.cv_folds,
            self.config.seed,
        )?;

        let best = select_best(&results).ok_or_else(|| ChurnError::Training {
            model: "all".to_string(),
            reason: "no variant produced evaluation results".to_string(),
        })?;
        let best_name = results[best].0.clone();
        let selected = self
            .variants
            .iter()
            .position(|v| v.name == best_name)
            .expect("selected variant is one of the trained variants");

        log::info!(
            "Selected model '{}' (AUC {:.4}, accuracy {:.4})",
            best_name,
            results[best].1.auc,
            results[best].1.accuracy
        );

        self.results = results;
        self.selected = Some(selected);
        self.state = PipelineState::Ready;
        Ok(())
    }

    /// Churn probability for one raw record through the frozen codec and the
    /// selected model. Deterministic for a fixed fitted state.
    pub fn predict(&self, record: &CustomerRecord) -> Result<f32, ChurnError> {
        let (codec, variant) = self.serving_parts()?;
        let features = codec.transform_one(record)?;
        let x = features.insert_axis(Axis(0));
        let probabilities = variant.model.predict_proba(&x)?;
        Ok(probabilities[0])
    }

    /// Churn probabilities for a batch of raw records.
    pub fn predict_batch(&self, records: &[CustomerRecord]) -> Result<Vec<f32>, ChurnError> {
        let (codec, variant) = self.serving_parts()?;
        if records.is_empty() {
            return Ok(Vec::new());
        }

        let n_features = codec.n_features();
        let mut data = Vec::with_capacity(records.len() * n_features);
        for record in records {
            let row = codec.transform_one(record)?;
            data.extend(row.iter().copied());
        }
        let x = Array2::from_shape_vec((records.len(), n_features), data)
            .expect("predict_batch: shape mismatch");
        variant.model.predict_proba(&x)
    }

    /// Per-variant evaluation results, in registration order.
    pub fn results(&self) -> &[(String, EvaluationResult)] {
        &self.results
    }

    /// The winning variant, once `Ready`.
    pub fn selected_variant(&self) -> Option<&TrainedVariant> {
        self.selected.map(|i| &self.variants[i])
    }

    /// The frozen feature codec, once fitted.
    pub fn codec(&self) -> Option<&FeatureCodec> {
        self.codec.as_ref()
    }

    fn serving_parts(&self) -> Result<(&FeatureCodec, &TrainedVariant), ChurnError> {
        if self.state != PipelineState::Ready {
            return Err(ChurnError::ModelNotReady {
                state: self.state.name(),
            });
        }
        let codec = self.codec.as_ref().expect("codec present in Ready");
        let variant = self
            .selected
            .map(|i| &self.variants[i])
            .expect("selection present in Ready");
        Ok((codec, variant))
    }

    fn expect_state(&self, expected: PipelineState) -> Result<(), ChurnError> {
        if self.state != expected {
            return Err(ChurnError::ModelNotReady {
                state: self.state.name(),
            });
        }
        Ok(())
    }
}
