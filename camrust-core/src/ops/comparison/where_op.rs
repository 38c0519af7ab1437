use crate::autograd::BackwardOp;
use crate::error::CamRustError;
use crate::ops::arithmetic::mul::mul_op;
use crate::ops::arithmetic::scalar::{add_scalar_op, mul_scalar_op};
use crate::ops::{ensure_f32_cpu, expand_to, link, reduce_to_shape};
use crate::tensor::utils::broadcast_shapes;
use crate::tensor::Tensor;

#[derive(Debug)]
struct WhereBackward {
    cond: Tensor,
    a: Tensor,
    b: Tensor,
    a_shape: Vec<usize>,
    b_shape: Vec<usize>,
}

impl BackwardOp for WhereBackward {
    fn backward(&self, grad_output: &Tensor) -> Result<Vec<Tensor>, CamRustError> {
        // Gradient flows to the branch each cell was taken from.
        let grad_a = reduce_to_shape(&mul_op(grad_output, &self.cond)?, &self.a_shape)?;
        let inverted = add_scalar_op(&mul_scalar_op(&self.cond, -1.0)?, 1.0)?;
        let grad_b = reduce_to_shape(&mul_op(grad_output, &inverted)?, &self.b_shape)?;
        Ok(vec![grad_a, grad_b])
    }

    fn inputs(&self) -> Vec<Tensor> {
        // The condition mask is not differentiable and is excluded.
        vec![self.a.clone(), self.b.clone()]
    }
}

/// Element-wise selection: where `cond` is non-zero take `a`, otherwise `b`.
/// All three operands broadcast together.
pub fn where_op(cond: &Tensor, a: &Tensor, b: &Tensor) -> Result<Tensor, CamRustError> {
    ensure_f32_cpu(cond, "where")?;
    ensure_f32_cpu(a, "where")?;
    ensure_f32_cpu(b, "where")?;

    let ab_shape =
        broadcast_shapes(&a.shape(), &b.shape()).map_err(|_| CamRustError::BroadcastError {
            shape1: a.shape(),
            shape2: b.shape(),
        })?;
    let out_shape =
        broadcast_shapes(&cond.shape(), &ab_shape).map_err(|_| CamRustError::BroadcastError {
            shape1: cond.shape(),
            shape2: ab_shape.clone(),
        })?;

    let cond_values = expand_to(cond, &out_shape)?;
    let a_values = expand_to(a, &out_shape)?;
    let b_values = expand_to(b, &out_shape)?;
    let data: Vec<f32> = cond_values
        .iter()
        .zip(a_values.iter().zip(b_values.iter()))
        .map(|(&c, (&x, &y))| if c != 0.0 { x } else { y })
        .collect();

    let result = Tensor::new(data, out_shape)?;
    if a.requires_grad() || b.requires_grad() {
        link(
            &result,
            WhereBackward {
                cond: cond.detach(),
                a: a.clone(),
                b: b.clone(),
                a_shape: a.shape(),
                b_shape: b.shape(),
            },
        );
    }
    Ok(result)
}
