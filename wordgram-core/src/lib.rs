//! Word n-gram language model.
//!
//! This crate provides:
//! - A tokenizer restricted to a fixed alphabet
//! - A word n-gram model trained on titled documents
//! - A smoothed likelihood estimator with selectable formulas
//! - Stochastic text generation with an injected random source
//!
//! Training mutates the model; probability queries and generation only read
//! it, so a trained model can be shared between threads as-is.

/// Model and generator configuration.
pub mod config;

/// Corpus records and JSON loading.
pub mod corpus;

/// Error taxonomy shared by the whole crate.
pub mod error;

/// Core n-gram model and generation logic.
pub mod model;

/// Text normalization into word tokens.
pub mod tokenizer;

/// I/O utilities (file loading, folder listing).
pub mod io;

pub use config::{ContextTotals, GenerationConfig, ModelConfig, SeedHandling, Smoothing};
pub use corpus::Record;
pub use error::{ModelError, Result};
pub use model::{Context, Generation, Generator, ModelStats, NGramModel, StopReason};
pub use tokenizer::{Tokenizer, tokenize};
