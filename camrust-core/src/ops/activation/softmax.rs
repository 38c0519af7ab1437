use crate::error::CamRustError;
use crate::ops::arithmetic::{div_op, sub_op};
use crate::ops::ensure_f32_cpu;
use crate::tensor::utils::{calculate_strides, index_to_coord};
use crate::tensor::Tensor;

/// Softmax along `dim`, expressed as a composition of tracked ops
/// (`exp(x - max) / sum(exp(x - max))`).
///
/// Because every step is recorded, softmax needs no hand-written backward
/// rule, and its second and third derivatives (the curvature of the class
/// scores that the alpha weighting measures) come from the chain rule.
pub fn softmax_op(input: &Tensor, dim: usize) -> Result<Tensor, CamRustError> {
    ensure_f32_cpu(input, "softmax")?;
    let shape = input.shape();
    if dim >= shape.len() {
        return Err(CamRustError::IndexOutOfBounds {
            index: vec![dim],
            shape,
        });
    }

    // Stability shift. A constant offset leaves every derivative unchanged,
    // so the max is computed outside the recorded graph.
    let maxes = max_along_dim(input, dim)?;
    let shifted = sub_op(input, &maxes)?;
    let exps = shifted.exp()?;
    let sums = exps.sum_axes(&[dim], true)?;
    div_op(&exps, &sums)
}

/// Per-slice maximum along `dim`, keeping the dimension as size 1.
/// Untracked: used only as the softmax stability offset.
fn max_along_dim(input: &Tensor, dim: usize) -> Result<Tensor, CamRustError> {
    let shape = input.shape();
    let mut out_shape = shape.clone();
    out_shape[dim] = 1;

    let data = input.get_f32_data()?;
    let strides = calculate_strides(&shape);
    let out_strides = calculate_strides(&out_shape);
    let out_numel: usize = out_shape.iter().product();
    let mut result = vec![f32::NEG_INFINITY; out_numel];
    for (i, &value) in data.iter().enumerate() {
        let mut coords = index_to_coord(i, &strides, &shape);
        coords[dim] = 0;
        let flat: usize = coords
            .iter()
            .zip(out_strides.iter())
            .map(|(c, s)| c * s)
            .sum();
        if value > result[flat] {
            result[flat] = value;
        }
    }
    Tensor::new(result, out_shape)
}
