//! Finite-difference verification of analytical gradients.
//!
//! Used by op tests: every op carrying a backward rule is checked against a
//! central-difference approximation of d(sum(output * output_grad))/d(input).

use crate::autograd::grad;
use crate::device::StorageDevice;
use crate::error::CamRustError;
use crate::ops::arithmetic::mul_op;
use crate::ops::reduction::sum_axes_op;
use crate::tensor::Tensor;
use crate::types::DType;
use approx::{abs_diff_eq, relative_eq};
use thiserror::Error;

/// Error type specifically for gradient checking failures.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GradCheckError {
    #[error("Gradient check failed for input {input_index}, element {element_index}: analytical {analytical} != numerical {numerical} (difference {difference})")]
    GradientMismatch {
        input_index: usize,
        element_index: usize,
        analytical: f32,
        numerical: f32,
        difference: f32,
    },

    #[error("Numerical gradient is not finite for input {input_index}, element {element_index} (loss+: {loss_plus}, loss-: {loss_minus})")]
    NumericalGradNotFinite {
        input_index: usize,
        element_index: usize,
        loss_plus: f32,
        loss_minus: f32,
    },

    #[error("Gradient check input {input_index} must be a contiguous F32 CPU leaf tensor")]
    InvalidInput { input_index: usize },

    #[error("Tensor error during gradient check: {0}")]
    TensorError(#[from] CamRustError),
}

/// Checks analytical gradients against numerical gradients using central
/// finite differences.
///
/// `func` must be a pure function of its inputs. Inputs that should be
/// differentiated must have `requires_grad` set by the caller.
pub fn check_grad<F>(
    func: F,
    inputs: &[Tensor],
    output_grad: &Tensor,
    epsilon: f32,
    tolerance: f32,
) -> Result<(), GradCheckError>
where
    F: Fn(&[Tensor]) -> Result<Tensor, CamRustError>,
{
    for (i, input) in inputs.iter().enumerate() {
        if input.dtype() != DType::F32
            || input.device() != StorageDevice::CPU
            || input.grad_fn().is_some()
            || !input.is_contiguous()
        {
            return Err(GradCheckError::InvalidInput { input_index: i });
        }
    }

    // Analytical gradients via the recorded graph.
    let output = func(inputs)?;
    let wrt: Vec<&Tensor> = inputs.iter().collect();
    let analytical = grad(&output, Some(output_grad.clone()), &wrt, false)?;

    // Scalar probe loss: sum(output * output_grad).
    let loss_of = |tensors: &[Tensor]| -> Result<f32, CamRustError> {
        let out = func(tensors)?;
        let weighted = mul_op(&out, output_grad)?;
        let total = sum_axes_op(&weighted, &[], false)?;
        total.item_f32()
    };

    for (i, input) in inputs.iter().enumerate() {
        if !input.requires_grad() {
            continue;
        }
        let base = input.get_f32_data()?;
        let shape = input.shape();
        let analytical_data = analytical[i].get_f32_data()?;

        for k in 0..base.len() {
            let mut perturbed_sets: Vec<Vec<Tensor>> = Vec::with_capacity(2);
            for sign in [1.0f32, -1.0f32] {
                let mut data = base.clone();
                data[k] += sign * epsilon;
                let mut set = Vec::with_capacity(inputs.len());
                for (j, t) in inputs.iter().enumerate() {
                    if j == i {
                        set.push(Tensor::new(data.clone(), shape.clone())?);
                    } else {
                        set.push(t.clone());
                    }
                }
                perturbed_sets.push(set);
            }
            let loss_plus = loss_of(&perturbed_sets[0])?;
            let loss_minus = loss_of(&perturbed_sets[1])?;
            if !loss_plus.is_finite() || !loss_minus.is_finite() {
                return Err(GradCheckError::NumericalGradNotFinite {
                    input_index: i,
                    element_index: k,
                    loss_plus,
                    loss_minus,
                });
            }
            let numerical = (loss_plus - loss_minus) / (2.0 * epsilon);
            let analytical_val = analytical_data[k];

            let close = abs_diff_eq!(analytical_val, numerical, epsilon = tolerance)
                || relative_eq!(analytical_val, numerical, max_relative = tolerance);
            if !close {
                return Err(GradCheckError::GradientMismatch {
                    input_index: i,
                    element_index: k,
                    analytical: analytical_val,
                    numerical,
                    difference: (analytical_val - numerical).abs(),
                });
            }
        }
    }

    Ok(())
}
