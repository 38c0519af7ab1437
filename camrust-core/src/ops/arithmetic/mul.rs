use crate::autograd::BackwardOp;
use crate::error::CamRustError;
use crate::ops::{broadcast_binary, link, reduce_to_shape};
use crate::tensor::Tensor;

/// Backward operation context for multiplication.
#[derive(Debug)]
struct MulBackward {
    a: Tensor,
    b: Tensor,
    a_shape: Vec<usize>,
    b_shape: Vec<usize>,
}

impl BackwardOp for MulBackward {
    fn backward(&self, grad_output: &Tensor) -> Result<Vec<Tensor>, CamRustError> {
        // grad_a = grad_output * b
        let grad_a_unreduced = mul_op(grad_output, &self.b)?;
        let grad_a = reduce_to_shape(&grad_a_unreduced, &self.a_shape)?;

        // grad_b = grad_output * a
        let grad_b_unreduced = mul_op(grad_output, &self.a)?;
        let grad_b = reduce_to_shape(&grad_b_unreduced, &self.b_shape)?;

        Ok(vec![grad_a, grad_b])
    }

    fn inputs(&self) -> Vec<Tensor> {
        vec![self.a.clone(), self.b.clone()]
    }
}

/// Element-wise multiplication with NumPy-style broadcasting.
pub fn mul_op(a: &Tensor, b: &Tensor) -> Result<Tensor, CamRustError> {
    let result = broadcast_binary(a, b, "mul", |x, y| x * y)?;
    if a.requires_grad() || b.requires_grad() {
        link(
            &result,
            MulBackward {
                a: a.clone(),
                b: b.clone(),
                a_shape: a.shape(),
                b_shape: b.shape(),
            },
        );
    }
    Ok(result)
}

// --- Tests ---
#[cfg(test)]
#[path = "mul_test.rs"]
mod tests;
