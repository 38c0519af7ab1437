//! Tensor operations.
//!
//! Each differentiable op follows the same layout: a forward function that
//! computes the result and, when any input requires grad, attaches a
//! `*Backward` struct as the output's `grad_fn`. Backward rules are written
//! with these same public ops, so gradients stay on the recorded graph and
//! can be differentiated again.

pub mod activation;
pub mod arithmetic;
pub mod comparison;
pub mod linalg;
pub mod math_elem;
pub mod reduction;
pub mod view;

use crate::autograd::BackwardOp;
use crate::device::StorageDevice;
use crate::error::CamRustError;
use crate::tensor::utils::{
    broadcast_shapes, calculate_strides, coord_to_index_broadcasted, index_to_coord,
};
use crate::tensor::Tensor;
use crate::types::DType;
use num_traits::Float;
use std::sync::Arc;

/// Rejects tensors the CPU f32 kernels cannot process.
pub(crate) fn ensure_f32_cpu(t: &Tensor, operation: &str) -> Result<(), CamRustError> {
    if t.device() != StorageDevice::CPU {
        return Err(CamRustError::DeviceMismatch {
            expected: StorageDevice::CPU,
            actual: t.device(),
            operation: operation.to_string(),
        });
    }
    if t.dtype() != DType::F32 {
        return Err(CamRustError::UnsupportedOperation(format!(
            "{} requires DType::F32, got {:?}",
            operation,
            t.dtype()
        )));
    }
    Ok(())
}

/// Attaches a backward node to an op output and marks it as tracked.
pub(crate) fn link<B>(output: &Tensor, op: B)
where
    B: BackwardOp + 'static,
{
    let op_arc: Arc<dyn BackwardOp + Send + Sync> = Arc::new(op);
    let mut guard = output.write_data();
    guard.requires_grad = true;
    guard.grad_fn = Some(op_arc);
}

/// Materializes a tensor's values broadcast to `target` shape, in logical
/// (row-major) order. Honors view strides and offsets.
pub(crate) fn expand_to(t: &Tensor, target: &[usize]) -> Result<Vec<f32>, CamRustError> {
    let guard = t.read_data();
    let data = guard.buffer().try_get_cpu_f32()?;
    let out_numel: usize = target.iter().product();
    let out_strides = calculate_strides(target);
    let mut out = Vec::with_capacity(out_numel);
    for i in 0..out_numel {
        let coords = index_to_coord(i, &out_strides, target);
        let rel = coord_to_index_broadcasted(&coords, &guard.shape, &guard.strides);
        out.push(data[guard.offset + rel]);
    }
    Ok(out)
}

/// Element-wise combination of two equal-length value slices.
pub(crate) fn zip_map<T, F>(a: &[T], b: &[T], f: F) -> Vec<T>
where
    T: Float,
    F: Fn(T, T) -> T,
{
    a.iter().zip(b.iter()).map(|(&x, &y)| f(x, y)).collect()
}

/// Element-wise map over a value slice.
pub(crate) fn map_values<T, F>(a: &[T], f: F) -> Vec<T>
where
    T: Float,
    F: Fn(T) -> T,
{
    a.iter().map(|&x| f(x)).collect()
}

/// Shared kernel for broadcasting binary element-wise ops. Computes the
/// result tensor; autograd linkage is the caller's responsibility.
pub(crate) fn broadcast_binary<F>(
    a: &Tensor,
    b: &Tensor,
    operation: &str,
    f: F,
) -> Result<Tensor, CamRustError>
where
    F: Fn(f32, f32) -> f32,
{
    ensure_f32_cpu(a, operation)?;
    ensure_f32_cpu(b, operation)?;
    let a_shape = a.shape();
    let b_shape = b.shape();
    let out_shape =
        broadcast_shapes(&a_shape, &b_shape).map_err(|_| CamRustError::BroadcastError {
            shape1: a_shape.clone(),
            shape2: b_shape.clone(),
        })?;
    let a_values = expand_to(a, &out_shape)?;
    let b_values = expand_to(b, &out_shape)?;
    let data = zip_map(&a_values, &b_values, f);
    Tensor::new(data, out_shape)
}

/// Reduces a gradient that was broadcast during the forward pass back to the
/// shape of the original operand, by summing over broadcast dimensions.
/// Built from tracked ops so higher-order queries stay correct.
pub(crate) fn reduce_to_shape(grad: &Tensor, target: &[usize]) -> Result<Tensor, CamRustError> {
    let grad_shape = grad.shape();
    if grad_shape == target {
        return Ok(grad.clone());
    }
    if target.len() > grad_shape.len() {
        return Err(CamRustError::InternalError(format!(
            "reduce_to_shape: target rank {} exceeds gradient rank {}",
            target.len(),
            grad_shape.len()
        )));
    }

    let rank_diff = grad_shape.len() - target.len();
    let mut axes: Vec<usize> = (0..rank_diff).collect();
    for (i, &t_dim) in target.iter().enumerate() {
        if t_dim == 1 && grad_shape[rank_diff + i] != 1 {
            axes.push(rank_diff + i);
        }
    }

    let summed = if axes.is_empty() {
        grad.clone()
    } else {
        reduction::sum_axes_op(grad, &axes, true)?
    };
    if summed.shape() != target {
        view::reshape_op(&summed, target.to_vec())
    } else {
        Ok(summed)
    }
}
