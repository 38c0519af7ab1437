use crate::autograd::BackwardOp;
use crate::error::CamRustError;
use crate::ops::arithmetic::scalar::mul_scalar_op;
use crate::ops::{broadcast_binary, link, reduce_to_shape};
use crate::tensor::Tensor;

#[derive(Debug)]
struct SubBackward {
    a: Tensor,
    b: Tensor,
    a_shape: Vec<usize>,
    b_shape: Vec<usize>,
}

impl BackwardOp for SubBackward {
    fn backward(&self, grad_output: &Tensor) -> Result<Vec<Tensor>, CamRustError> {
        let grad_a = reduce_to_shape(grad_output, &self.a_shape)?;
        let neg = mul_scalar_op(grad_output, -1.0)?;
        let grad_b = reduce_to_shape(&neg, &self.b_shape)?;
        Ok(vec![grad_a, grad_b])
    }

    fn inputs(&self) -> Vec<Tensor> {
        vec![self.a.clone(), self.b.clone()]
    }
}

/// Element-wise subtraction with NumPy-style broadcasting.
pub fn sub_op(a: &Tensor, b: &Tensor) -> Result<Tensor, CamRustError> {
    let result = broadcast_binary(a, b, "sub", |x, y| x - y)?;
    if a.requires_grad() || b.requires_grad() {
        link(
            &result,
            SubBackward {
                a: a.clone(),
                b: b.clone(),
                a_shape: a.shape(),
                b_shape: b.shape(),
            },
        );
    }
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::autograd::grad_check::check_grad;
    use crate::tensor::create::ones;

    #[test]
    fn test_sub_forward() {
        let a = Tensor::new(vec![5.0, 3.0], vec![2]).unwrap();
        let b = Tensor::new(vec![1.0, 4.0], vec![2]).unwrap();
        let c = sub_op(&a, &b).unwrap();
        assert_eq!(c.get_f32_data().unwrap(), vec![4.0, -1.0]);
    }

    #[test]
    fn test_sub_backward() {
        let a = Tensor::new(vec![5.0, 3.0, -1.0, 0.5], vec![2, 2]).unwrap();
        let b = Tensor::new(vec![2.0, -3.0], vec![1, 2]).unwrap();
        a.requires_grad_(true).unwrap();
        b.requires_grad_(true).unwrap();
        let output_grad = ones(&[2, 2]).unwrap();
        check_grad(|ts| sub_op(&ts[0], &ts[1]), &[a, b], &output_grad, 1e-2, 1e-2).unwrap();
    }
}
