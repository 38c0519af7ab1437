use crate::error::CamRustError;
use crate::tensor::Tensor;
use rand_distr::{Distribution, Normal};

/// Kaiming-normal initialization: samples from `N(0, sqrt(2 / fan_in))`.
///
/// Used by layer constructors when no trained weights are supplied; an
/// explainable model would normally be built with [`crate::nn::layers::Linear::from_weights`].
pub fn kaiming_normal(shape: &[usize], fan_in: usize) -> Result<Tensor, CamRustError> {
    if fan_in == 0 {
        return Err(CamRustError::UnsupportedOperation(
            "kaiming_normal requires fan_in > 0".to_string(),
        ));
    }
    let std_dev = (2.0 / fan_in as f32).sqrt();
    let normal = Normal::new(0.0f32, std_dev).map_err(|e| {
        CamRustError::InternalError(format!("failed to build normal distribution: {e}"))
    })?;
    let numel: usize = shape.iter().product();
    let mut rng = rand::thread_rng();
    let data: Vec<f32> = (0..numel).map(|_| normal.sample(&mut rng)).collect();
    Tensor::new(data, shape.to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kaiming_normal_shape() {
        let w = kaiming_normal(&[4, 8], 8).unwrap();
        assert_eq!(w.shape(), vec![4, 8]);
    }

    #[test]
    fn test_kaiming_normal_zero_fan_in() {
        assert!(kaiming_normal(&[2, 2], 0).is_err());
    }
}
