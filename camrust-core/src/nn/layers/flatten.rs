use crate::error::CamRustError;
use crate::nn::module::Module;
use crate::tensor::Tensor;

/// Flattens every dimension after the batch dimension: `(B, ...) -> (B, N)`.
#[derive(Debug, Default)]
pub struct Flatten;

impl Flatten {
    pub fn new() -> Self {
        Flatten
    }
}

impl Module for Flatten {
    fn forward(&self, input: &Tensor) -> Result<Tensor, CamRustError> {
        let shape = self.output_shape(&input.shape())?;
        input.reshape(shape)
    }

    fn output_shape(&self, input_shape: &[usize]) -> Result<Vec<usize>, CamRustError> {
        if input_shape.len() < 2 {
            return Err(CamRustError::RankMismatch {
                expected: 2,
                actual: input_shape.len(),
            });
        }
        let batch = input_shape[0];
        let rest: usize = input_shape[1..].iter().product();
        Ok(vec![batch, rest])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flatten_4d() {
        let layer = Flatten::new();
        let input = Tensor::new((0..24).map(|v| v as f32).collect(), vec![2, 2, 3, 2]).unwrap();
        let output = layer.forward(&input).unwrap();
        assert_eq!(output.shape(), vec![2, 12]);
        assert_eq!(layer.output_shape(&[2, 2, 3, 2]).unwrap(), vec![2, 12]);
    }

    #[test]
    fn test_flatten_rejects_vectors() {
        let layer = Flatten::new();
        assert!(layer.output_shape(&[4]).is_err());
    }
}
