use crate::autograd::BackwardOp;
use crate::error::CamRustError;
use crate::ops::arithmetic::mul::mul_op;
use crate::ops::comparison::gt::gt_scalar_op;
use crate::ops::{ensure_f32_cpu, link, map_values};
use crate::tensor::Tensor;

#[derive(Debug)]
struct ReluBackward {
    input: Tensor,
}

impl BackwardOp for ReluBackward {
    fn backward(&self, grad_output: &Tensor) -> Result<Vec<Tensor>, CamRustError> {
        // grad = grad_output * (input > 0)
        let mask = gt_scalar_op(&self.input, 0.0)?;
        Ok(vec![mul_op(grad_output, &mask)?])
    }

    fn inputs(&self) -> Vec<Tensor> {
        vec![self.input.clone()]
    }
}

/// Applies the Rectified Linear Unit activation element-wise: `max(0, x)`.
pub fn relu_op(input: &Tensor) -> Result<Tensor, CamRustError> {
    ensure_f32_cpu(input, "relu")?;
    let data = map_values(&input.get_f32_data()?, |x| if x > 0.0 { x } else { 0.0 });
    let result = Tensor::new(data, input.shape())?;
    if input.requires_grad() {
        link(
            &result,
            ReluBackward {
                input: input.clone(),
            },
        );
    }
    Ok(result)
}
