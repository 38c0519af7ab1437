use crate::autograd::BackwardOp;
use crate::error::CamRustError;
use crate::ops::{ensure_f32_cpu, link};
use crate::tensor::Tensor;

#[derive(Debug)]
struct TransposeBackward {
    input: Tensor,
}

impl BackwardOp for TransposeBackward {
    fn backward(&self, grad_output: &Tensor) -> Result<Vec<Tensor>, CamRustError> {
        Ok(vec![transpose_op(grad_output)?])
    }

    fn inputs(&self) -> Vec<Tensor> {
        vec![self.input.clone()]
    }
}

/// Transposes a 2-D tensor, producing a fresh contiguous copy.
pub fn transpose_op(input: &Tensor) -> Result<Tensor, CamRustError> {
    ensure_f32_cpu(input, "transpose")?;
    let shape = input.shape();
    if shape.len() != 2 {
        return Err(CamRustError::RankMismatch {
            expected: 2,
            actual: shape.len(),
        });
    }
    let (rows, cols) = (shape[0], shape[1]);
    let data = input.get_f32_data()?;
    let mut result = vec![0.0f32; rows * cols];
    for r in 0..rows {
        for c in 0..cols {
            result[c * rows + r] = data[r * cols + c];
        }
    }
    let output = Tensor::new(result, vec![cols, rows])?;
    if input.requires_grad() {
        link(
            &output,
            TransposeBackward {
                input: input.clone(),
            },
        );
    }
    Ok(output)
}
