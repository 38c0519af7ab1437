use crate::autograd::BackwardOp;
use crate::error::CamRustError;
use crate::ops::arithmetic::mul::mul_op;
use crate::ops::{ensure_f32_cpu, link, map_values};
use crate::tensor::Tensor;

#[derive(Debug)]
struct ExpBackward {
    input: Tensor,
}

impl BackwardOp for ExpBackward {
    fn backward(&self, grad_output: &Tensor) -> Result<Vec<Tensor>, CamRustError> {
        // d exp(x)/dx = exp(x). Recomputed through the tracked op rather than
        // stored: keeping the output tensor here would create an Arc cycle
        // between the tensor and its own grad_fn.
        let y = exp_op(&self.input)?;
        Ok(vec![mul_op(grad_output, &y)?])
    }

    fn inputs(&self) -> Vec<Tensor> {
        vec![self.input.clone()]
    }
}

/// Element-wise natural exponential.
pub fn exp_op(input: &Tensor) -> Result<Tensor, CamRustError> {
    ensure_f32_cpu(input, "exp")?;
    let data = map_values(&input.get_f32_data()?, |x| x.exp());
    let result = Tensor::new(data, input.shape())?;
    if input.requires_grad() {
        link(
            &result,
            ExpBackward {
                input: input.clone(),
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
    use approx::assert_relative_eq;

    #[test]
    fn test_exp_forward() {
        let t = Tensor::new(vec![0.0, 1.0, -1.0], vec![3]).unwrap();
        let e = exp_op(&t).unwrap();
        let values = e.get_f32_data().unwrap();
        assert_relative_eq!(values[0], 1.0);
        assert_relative_eq!(values[1], std::f32::consts::E);
        assert_relative_eq!(values[2], 1.0 / std::f32::consts::E);
    }

    #[test]
    fn test_exp_backward() {
        let t = Tensor::new(vec![0.5, -0.25, 1.0], vec![3]).unwrap();
        t.requires_grad_(true).unwrap();
        let output_grad = ones(&[3]).unwrap();
        check_grad(|ts| exp_op(&ts[0]), &[t], &output_grad, 1e-3, 1e-2).unwrap();
    }
}
