//! Top-level module for the word n-gram model.
//!
//! This module provides:
//! - Fixed-order word n-gram models (`NGramModel`)
//! - Context keys (`Context`)
//! - Smoothed likelihood estimation (`Smoothing::weight`)
//! - Internal per-context state (`State`)
//! - Text generation (`NGramModel::generate`, `Generator`)

/// Ordered `n-1` token keys.
pub mod context;

/// Smoothed estimators used to weight continuations.
mod estimator;

/// Generation loop, stop reasons and the high-level `Generator`.
///
/// Generation only reads the model, so any number of generators may share
/// one trained model.
pub mod generator;

/// Fixed-order word n-gram model (`n >= 2`).
///
/// Handles record ingestion, count accumulation, probability queries
/// and model merging.
pub mod ngram_model;

/// Internal representation of a single context.
///
/// Tracks continuations, the context total and supports weighted sampling.
/// This module is not exposed publicly.
mod state;

pub use context::Context;
pub use generator::{Generation, Generator, StopReason};
pub use ngram_model::{ModelStats, NGramModel};
