use crate::error::CamRustError;
use crate::ops::{ensure_f32_cpu, map_values};
use crate::tensor::Tensor;

/// Element-wise `input > threshold`, returned as an f32 mask of 0.0/1.0.
///
/// The mask is piecewise constant, so the result never carries a `grad_fn`:
/// its derivative is zero almost everywhere. This is the gate used by the
/// guided-gradient computation and by the ReLU backward rule.
pub fn gt_scalar_op(input: &Tensor, threshold: f32) -> Result<Tensor, CamRustError> {
    ensure_f32_cpu(input, "gt_scalar")?;
    let data = map_values(&input.get_f32_data()?, |x| {
        if x > threshold {
            1.0
        } else {
            0.0
        }
    });
    Tensor::new(data, input.shape())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gt_scalar_mask() {
        let t = Tensor::new(vec![-1.0, 0.0, 0.5, 2.0], vec![4]).unwrap();
        let mask = gt_scalar_op(&t, 0.0).unwrap();
        assert_eq!(mask.get_f32_data().unwrap(), vec![0.0, 0.0, 1.0, 1.0]);
        assert!(mask.grad_fn().is_none());
    }

    #[test]
    fn test_gt_scalar_never_tracked() {
        let t = Tensor::new(vec![1.0], vec![1]).unwrap();
        t.requires_grad_(true).unwrap();
        let mask = gt_scalar_op(&t, 0.0).unwrap();
        assert!(!mask.requires_grad());
    }
}
