use crate::autograd::BackwardOp;
use crate::error::CamRustError;
use crate::ops::{ensure_f32_cpu, link, map_values};
use crate::tensor::Tensor;

#[derive(Debug)]
struct MulScalarBackward {
    input: Tensor,
    scalar: f32,
}

impl BackwardOp for MulScalarBackward {
    fn backward(&self, grad_output: &Tensor) -> Result<Vec<Tensor>, CamRustError> {
        Ok(vec![mul_scalar_op(grad_output, self.scalar)?])
    }

    fn inputs(&self) -> Vec<Tensor> {
        vec![self.input.clone()]
    }
}

/// Multiplies every element by a scalar.
pub fn mul_scalar_op(input: &Tensor, scalar: f32) -> Result<Tensor, CamRustError> {
    ensure_f32_cpu(input, "mul_scalar")?;
    let data = map_values(&input.get_f32_data()?, |x| x * scalar);
    let result = Tensor::new(data, input.shape())?;
    if input.requires_grad() {
        link(
            &result,
            MulScalarBackward {
                input: input.clone(),
                scalar,
            },
        );
    }
    Ok(result)
}

#[derive(Debug)]
struct AddScalarBackward {
    input: Tensor,
}

impl BackwardOp for AddScalarBackward {
    fn backward(&self, grad_output: &Tensor) -> Result<Vec<Tensor>, CamRustError> {
        Ok(vec![grad_output.clone()])
    }

    fn inputs(&self) -> Vec<Tensor> {
        vec![self.input.clone()]
    }
}

/// Adds a scalar to every element.
pub fn add_scalar_op(input: &Tensor, scalar: f32) -> Result<Tensor, CamRustError> {
    ensure_f32_cpu(input, "add_scalar")?;
    let data = map_values(&input.get_f32_data()?, |x| x + scalar);
    let result = Tensor::new(data, input.shape())?;
    if input.requires_grad() {
        link(
            &result,
            AddScalarBackward {
                input: input.clone(),
            },
        );
    }
    Ok(result)
}
