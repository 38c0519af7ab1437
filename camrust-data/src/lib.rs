//! Batch providers for CamRust explanation requests.
//!
//! The explainer consumes batches through the `camrust_core::BatchSource`
//! capability; this crate supplies the in-memory implementation.

pub mod batches;

pub use batches::TensorBatches;
