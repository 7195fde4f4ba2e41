//! churn-classifiers: customer churn probability models.
//!
//! This crate implements the full training-and-inference pipeline behind a
//! churn prediction service: loading a labelled customer table, fitting a
//! feature codec (categorical encoding plus numeric standardisation), training
//! a fixed registry of classifier variants, comparing them on a held-out split
//! and selecting the best by AUC, and scoring new single records with the
//! frozen codec and selected model.
//!
//! The design favors small, testable modules; the serving surface (HTTP
//! routing, request validation) lives outside this crate and consumes
//! [`pipeline::ChurnPipeline`] through a shared handle.
pub mod config;
pub mod dataset;
pub mod encoding;
pub mod error;
pub mod evaluation;
pub mod io;
pub mod models;
pub mod pipeline;
pub mod stats;
pub mod trainer;
