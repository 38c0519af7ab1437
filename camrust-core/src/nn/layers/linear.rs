use crate::error::CamRustError;
use crate::nn::init::kaiming_normal;
use crate::nn::module::Module;
use crate::ops::arithmetic::add_op;
use crate::tensor::create::zeros;
use crate::tensor::Tensor;

/// Applies a linear transformation to the incoming data: `y = x W^T + b`.
///
/// Weight shape is `[out_features, in_features]`, bias shape `[out_features]`.
/// Weights are plain tensors: the explainer differentiates class scores with
/// respect to feature maps, never with respect to parameters.
#[derive(Debug)]
pub struct Linear {
    weight: Tensor,
    bias: Option<Tensor>,
    in_features: usize,
    out_features: usize,
}

impl Linear {
    /// Creates a randomly initialized linear layer (Kaiming-normal weights,
    /// zero bias). Mostly useful for tests and demos; trained models are
    /// built with [`Linear::from_weights`].
    pub fn new(
        in_features: usize,
        out_features: usize,
        has_bias: bool,
    ) -> Result<Self, CamRustError> {
        let weight = kaiming_normal(&[out_features, in_features], in_features)?;
        let bias = if has_bias {
            Some(zeros(&[out_features])?)
        } else {
            None
        };
        Ok(Linear {
            weight,
            bias,
            in_features,
            out_features,
        })
    }

    /// Builds a linear layer around externally trained parameters.
    pub fn from_weights(weight: Tensor, bias: Option<Tensor>) -> Result<Self, CamRustError> {
        let weight_shape = weight.shape();
        if weight_shape.len() != 2 {
            return Err(CamRustError::RankMismatch {
                expected: 2,
                actual: weight_shape.len(),
            });
        }
        let (out_features, in_features) = (weight_shape[0], weight_shape[1]);
        if let Some(ref bias_tensor) = bias {
            if bias_tensor.shape() != vec![out_features] {
                return Err(CamRustError::ShapeMismatch {
                    expected: vec![out_features],
                    actual: bias_tensor.shape(),
                    operation: "Linear::from_weights (bias)".to_string(),
                });
            }
        }
        Ok(Linear {
            weight,
            bias,
            in_features,
            out_features,
        })
    }
}

impl Module for Linear {
    fn forward(&self, input: &Tensor) -> Result<Tensor, CamRustError> {
        let input_shape = input.shape();
        if input_shape.len() != 2 {
            return Err(CamRustError::RankMismatch {
                expected: 2,
                actual: input_shape.len(),
            });
        }
        if input_shape[1] != self.in_features {
            return Err(CamRustError::ShapeMismatch {
                expected: vec![input_shape[0], self.in_features],
                actual: input_shape,
                operation: "Linear::forward".to_string(),
            });
        }

        let output = input.matmul(&self.weight.transpose()?)?;
        match self.bias {
            Some(ref bias) => add_op(&output, bias),
            None => Ok(output),
        }
    }

    fn output_shape(&self, input_shape: &[usize]) -> Result<Vec<usize>, CamRustError> {
        if input_shape.len() != 2 {
            return Err(CamRustError::RankMismatch {
                expected: 2,
                actual: input_shape.len(),
            });
        }
        if input_shape[1] != self.in_features {
            return Err(CamRustError::ShapeMismatch {
                expected: vec![input_shape[0], self.in_features],
                actual: input_shape.to_vec(),
                operation: "Linear::output_shape".to_string(),
            });
        }
        Ok(vec![input_shape[0], self.out_features])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_linear_forward_no_bias() {
        let weight = Tensor::new(vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0], vec![2, 3]).unwrap();
        let linear = Linear::from_weights(weight, None).unwrap();
        let input = Tensor::new(vec![10.0, 20.0, 30.0], vec![1, 3]).unwrap();
        let output = linear.forward(&input).unwrap();

        // input @ weight.T = [10, 20, 30] @ [[1, 4], [2, 5], [3, 6]] = [140, 320]
        assert_eq!(output.shape(), vec![1, 2]);
        assert_eq!(output.get_f32_data().unwrap(), vec![140.0, 320.0]);
    }

    #[test]
    fn test_linear_forward_with_bias_batch() {
        let weight = Tensor::new(vec![1.0, 0.0, 0.0, 0.0, 1.0, 0.0], vec![2, 3]).unwrap();
        let bias = Tensor::new(vec![0.1, 0.2], vec![2]).unwrap();
        let linear = Linear::from_weights(weight, Some(bias)).unwrap();

        let input =
            Tensor::new(vec![10.0, 20.0, 30.0, 1.0, 2.0, 3.0], vec![2, 3]).unwrap();
        let output = linear.forward(&input).unwrap();
        assert_eq!(output.shape(), vec![2, 2]);
        let values = output.get_f32_data().unwrap();
        assert!((values[0] - 10.1).abs() < 1e-6);
        assert!((values[1] - 20.2).abs() < 1e-6);
        assert!((values[2] - 1.1).abs() < 1e-6);
        assert!((values[3] - 2.2).abs() < 1e-6);
    }

    #[test]
    fn test_linear_rejects_bad_bias_shape() {
        let weight = Tensor::new(vec![1.0, 2.0], vec![1, 2]).unwrap();
        let bias = Tensor::new(vec![1.0, 2.0], vec![2]).unwrap();
        assert!(matches!(
            Linear::from_weights(weight, Some(bias)),
            Err(CamRustError::ShapeMismatch { .. })
        ));
    }

    #[test]
    fn test_linear_output_shape() {
        let linear = Linear::new(8, 3, true).unwrap();
        assert_eq!(linear.output_shape(&[4, 8]).unwrap(), vec![4, 3]);
        assert!(linear.output_shape(&[4, 5]).is_err());
    }
}
