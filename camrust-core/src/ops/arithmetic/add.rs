use crate::autograd::BackwardOp;
use crate::error::CamRustError;
use crate::ops::{broadcast_binary, link, reduce_to_shape};
use crate::tensor::Tensor;

#[derive(Debug)]
struct AddBackward {
    a: Tensor,
    b: Tensor,
    a_shape: Vec<usize>,
    b_shape: Vec<usize>,
}

impl BackwardOp for AddBackward {
    fn backward(&self, grad_output: &Tensor) -> Result<Vec<Tensor>, CamRustError> {
        let grad_a = reduce_to_shape(grad_output, &self.a_shape)?;
        let grad_b = reduce_to_shape(grad_output, &self.b_shape)?;
        Ok(vec![grad_a, grad_b])
    }

    fn inputs(&self) -> Vec<Tensor> {
        vec![self.a.clone(), self.b.clone()]
    }
}

/// Element-wise addition with NumPy-style broadcasting.
pub fn add_op(a: &Tensor, b: &Tensor) -> Result<Tensor, CamRustError> {
    let result = broadcast_binary(a, b, "add", |x, y| x + y)?;
    if a.requires_grad() || b.requires_grad() {
        link(
            &result,
            AddBackward {
                a: a.clone(),
                b: b.clone(),
                a_shape: a.shape(),
                b_shape: b.shape(),
            },
        );
    }
    Ok(result)
}
