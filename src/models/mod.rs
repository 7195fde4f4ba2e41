pub mod baseline;
pub mod classifier_trait;
pub mod factory;
pub mod gbdt;
pub mod logistic;
pub mod svm;

pub use classifier_trait::ClassifierModel;
