use crate::autograd::BackwardOp;
use crate::error::CamRustError;
use crate::ops::arithmetic::mul::mul_op;
use crate::ops::arithmetic::scalar::mul_scalar_op;
use crate::ops::{broadcast_binary, link, reduce_to_shape};
use crate::tensor::Tensor;

#[derive(Debug)]
struct DivBackward {
    a: Tensor,
    b: Tensor,
    a_shape: Vec<usize>,
    b_shape: Vec<usize>,
}

impl BackwardOp for DivBackward {
    fn backward(&self, grad_output: &Tensor) -> Result<Vec<Tensor>, CamRustError> {
        // grad_a = grad_output / b
        let grad_a_unreduced = div_op(grad_output, &self.b)?;
        let grad_a = reduce_to_shape(&grad_a_unreduced, &self.a_shape)?;

        // grad_b = -grad_output * a / b^2
        let numerator = mul_op(grad_output, &self.a)?;
        let b_squared = mul_op(&self.b, &self.b)?;
        let quotient = div_op(&numerator, &b_squared)?;
        let grad_b_unreduced = mul_scalar_op(&quotient, -1.0)?;
        let grad_b = reduce_to_shape(&grad_b_unreduced, &self.b_shape)?;

        Ok(vec![grad_a, grad_b])
    }

    fn inputs(&self) -> Vec<Tensor> {
        vec![self.a.clone(), self.b.clone()]
    }
}

/// Element-wise division with NumPy-style broadcasting.
///
/// Division follows IEEE-754 semantics: a zero denominator yields inf/NaN.
/// The CAM composer guards its one division hazard upstream by substituting
/// 1 into zero denominators before calling this op.
pub fn div_op(a: &Tensor, b: &Tensor) -> Result<Tensor, CamRustError> {
    let result = broadcast_binary(a, b, "div", |x, y| x / y)?;
    if a.requires_grad() || b.requires_grad() {
        link(
            &result,
            DivBackward {
                a: a.clone(),
                b: b.clone(),
                a_shape: a.shape(),
                b_shape: b.shape(),
            },
        );
    }
    Ok(result)
}
