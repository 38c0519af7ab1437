use crate::error::CamRustError;
use crate::nn::module::Module;
use crate::tensor::Tensor;

/// Element-wise ReLU layer. Shape-preserving, so it is the usual way to give
/// a toy model a "convolutional-shaped" (4D-output) probe point.
#[derive(Debug, Default)]
pub struct ReLU;

impl ReLU {
    pub fn new() -> Self {
        ReLU
    }
}

impl Module for ReLU {
    fn forward(&self, input: &Tensor) -> Result<Tensor, CamRustError> {
        input.relu()
    }

    fn output_shape(&self, input_shape: &[usize]) -> Result<Vec<usize>, CamRustError> {
        Ok(input_shape.to_vec())
    }
}
