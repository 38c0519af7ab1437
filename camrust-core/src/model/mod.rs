//! The model abstraction the explainer works against.
//!
//! A model is an external collaborator, supplied already trained. The
//! explainer needs exactly two capabilities from it: an ordered listing of
//! layers with their output shapes (for target-layer inference), and a
//! forward pass that exposes one named internal layer's output alongside the
//! final prediction output, both produced by the *same* pass, so gradient
//! queries against the captured tensor see the recorded graph of the
//! prediction.

pub mod sequential;

pub use sequential::Sequential;

use crate::error::CamRustError;
use crate::tensor::Tensor;

/// Name and output shape of one model layer, in model order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayerInfo {
    pub name: String,
    pub output_shape: Vec<usize>,
}

/// Capability set of an explainable model.
pub trait Model: std::fmt::Debug {
    /// The ordered layer list (first layer first).
    fn layers(&self) -> Result<Vec<LayerInfo>, CamRustError>;

    /// Runs one forward pass over `input`, returning the output of the layer
    /// named `layer_name` together with the model's final output.
    ///
    /// Both tensors must come from the same recorded forward computation;
    /// running two separate passes would give the gradient extractor a stale
    /// graph.
    fn forward_capturing(
        &self,
        input: &Tensor,
        layer_name: &str,
    ) -> Result<(Tensor, Tensor), CamRustError>;
}
