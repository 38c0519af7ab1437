use crate::error::CamRustError;
use crate::tensor::Tensor;

/// The base trait for all layers composing an explainable model.
///
/// Models arrive at the explainer already trained, so the trait deliberately
/// carries no parameter/optimizer surface. What the explainer does need from
/// every layer is a forward pass built from the tracked ops, and a static
/// output-shape computation (the target-layer selector scans shapes without
/// running any data through the model).
pub trait Module: std::fmt::Debug + Send + Sync {
    /// Performs a forward pass of the module.
    fn forward(&self, input: &Tensor) -> Result<Tensor, CamRustError>;

    /// Computes the output shape this module produces for a given input
    /// shape, without executing the forward pass.
    fn output_shape(&self, input_shape: &[usize]) -> Result<Vec<usize>, CamRustError>;
}
