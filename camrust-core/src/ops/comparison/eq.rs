use crate::error::CamRustError;
use crate::ops::{ensure_f32_cpu, map_values};
use crate::tensor::Tensor;

/// Element-wise `input == value`, returned as an f32 mask of 0.0/1.0.
///
/// Comparison is exact, not tolerance-based: the alpha-denominator guard is
/// specified for denominators that are *exactly* zero. Like the other
/// comparison ops the mask never carries a `grad_fn`.
pub fn eq_scalar_op(input: &Tensor, value: f32) -> Result<Tensor, CamRustError> {
    ensure_f32_cpu(input, "eq_scalar")?;
    let data = map_values(&input.get_f32_data()?, |x| {
        if x == value {
            1.0
        } else {
            0.0
        }
    });
    Tensor::new(data, input.shape())
}
