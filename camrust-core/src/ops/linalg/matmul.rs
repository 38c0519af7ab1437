use crate::autograd::BackwardOp;
use crate::error::CamRustError;
use crate::ops::linalg::transpose::transpose_op;
use crate::ops::{ensure_f32_cpu, link};
use crate::tensor::Tensor;

#[derive(Debug)]
struct MatmulBackward {
    a: Tensor,
    b: Tensor,
}

impl BackwardOp for MatmulBackward {
    fn backward(&self, grad_output: &Tensor) -> Result<Vec<Tensor>, CamRustError> {
        // grad_a = grad_output @ b^T, grad_b = a^T @ grad_output
        let grad_a = matmul_op(grad_output, &transpose_op(&self.b)?)?;
        let grad_b = matmul_op(&transpose_op(&self.a)?, grad_output)?;
        Ok(vec![grad_a, grad_b])
    }

    fn inputs(&self) -> Vec<Tensor> {
        vec![self.a.clone(), self.b.clone()]
    }
}

/// 2-D matrix multiplication: `(m, k) @ (k, n) -> (m, n)`.
pub fn matmul_op(a: &Tensor, b: &Tensor) -> Result<Tensor, CamRustError> {
    ensure_f32_cpu(a, "matmul")?;
    ensure_f32_cpu(b, "matmul")?;

    let a_shape = a.shape();
    let b_shape = b.shape();
    if a_shape.len() != 2 {
        return Err(CamRustError::RankMismatch {
            expected: 2,
            actual: a_shape.len(),
        });
    }
    if b_shape.len() != 2 {
        return Err(CamRustError::RankMismatch {
            expected: 2,
            actual: b_shape.len(),
        });
    }
    if a_shape[1] != b_shape[0] {
        return Err(CamRustError::ShapeMismatch {
            expected: a_shape.clone(),
            actual: b_shape.clone(),
            operation: "matmul (inner dimensions)".to_string(),
        });
    }

    let (m, k, n) = (a_shape[0], a_shape[1], b_shape[1]);
    let a_data = a.get_f32_data()?;
    let b_data = b.get_f32_data()?;
    let mut result = vec![0.0f32; m * n];
    for i in 0..m {
        for l in 0..k {
            let a_il = a_data[i * k + l];
            if a_il == 0.0 {
                continue;
            }
            for j in 0..n {
                result[i * n + j] += a_il * b_data[l * n + j];
            }
        }
    }

    let output = Tensor::new(result, vec![m, n])?;
    if a.requires_grad() || b.requires_grad() {
        link(
            &output,
            MatmulBackward {
                a: a.clone(),
                b: b.clone(),
            },
        );
    }
    Ok(output)
}

// --- Tests ---
#[cfg(test)]
#[path = "matmul_test.rs"]
mod tests;
