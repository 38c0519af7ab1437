use crate::error::CamRustError;
use crate::nn::module::Module;
use crate::ops::activation::softmax_op;
use crate::tensor::Tensor;

/// Softmax layer over the given dimension (typically the class dimension of
/// a `(B, K)` logit matrix). The nonlinearity matters to the explainer: it is
/// what gives class scores the curvature the alpha weighting measures.
#[derive(Debug)]
pub struct Softmax {
    dim: usize,
}

impl Softmax {
    pub fn new(dim: usize) -> Self {
        Softmax { dim }
    }
}

impl Module for Softmax {
    fn forward(&self, input: &Tensor) -> Result<Tensor, CamRustError> {
        softmax_op(input, self.dim)
    }

    fn output_shape(&self, input_shape: &[usize]) -> Result<Vec<usize>, CamRustError> {
        if self.dim >= input_shape.len() {
            return Err(CamRustError::IndexOutOfBounds {
                index: vec![self.dim],
                shape: input_shape.to_vec(),
            });
        }
        Ok(input_shape.to_vec())
    }
}
