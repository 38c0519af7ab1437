use crate::error::CamRustError;
use crate::ops::arithmetic::scalar::mul_scalar_op;
use crate::ops::reduction::sum::sum_axes_op;
use crate::tensor::Tensor;

/// Calculates the mean of elements along the specified axes.
///
/// Expressed as a tracked sum followed by a scalar rescale, so the backward
/// rule comes from composition.
pub fn mean_axes_op(
    input: &Tensor,
    axes: &[usize],
    keep_dims: bool,
) -> Result<Tensor, CamRustError> {
    let shape = input.shape();
    let rank = shape.len();

    let reduced: Vec<usize> = if axes.is_empty() {
        (0..rank).collect()
    } else {
        for &axis in axes {
            if axis >= rank {
                return Err(CamRustError::IndexOutOfBounds {
                    index: vec![axis],
                    shape: shape.clone(),
                });
            }
        }
        let mut sorted = axes.to_vec();
        sorted.sort_unstable();
        sorted.dedup();
        sorted
    };

    let count: usize = reduced.iter().map(|&axis| shape[axis]).product();
    if count == 0 {
        return Err(CamRustError::UnsupportedOperation(
            "mean over an empty dimension".to_string(),
        ));
    }

    let total = sum_axes_op(input, axes, keep_dims)?;
    mul_scalar_op(&total, 1.0 / count as f32)
}
