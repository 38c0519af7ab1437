use crate::autograd::BackwardOp;
use crate::error::CamRustError;
use crate::ops::arithmetic::mul::mul_op;
use crate::ops::view::reshape::reshape_op;
use crate::ops::{ensure_f32_cpu, link};
use crate::tensor::create::ones;
use crate::tensor::utils::{calculate_strides, index_to_coord};
use crate::tensor::Tensor;

#[derive(Debug)]
struct SumBackward {
    input: Tensor,
    input_shape: Vec<usize>,
    axes: Vec<usize>,
}

impl BackwardOp for SumBackward {
    fn backward(&self, grad_output: &Tensor) -> Result<Vec<Tensor>, CamRustError> {
        // Broadcast the incoming gradient back over the reduced dimensions:
        // restore them as size-1 dims, then multiply by ones of the input
        // shape. Both steps are tracked ops.
        let mut kd_shape = self.input_shape.clone();
        for &axis in &self.axes {
            kd_shape[axis] = 1;
        }
        let grad_kd = if grad_output.shape() == kd_shape {
            grad_output.clone()
        } else {
            reshape_op(grad_output, kd_shape)?
        };
        let expanded = mul_op(&grad_kd, &ones(&self.input_shape)?)?;
        Ok(vec![expanded])
    }

    fn inputs(&self) -> Vec<Tensor> {
        vec![self.input.clone()]
    }
}

/// Calculates the sum of elements along the specified axes.
///
/// An empty `axes` slice sums over every dimension; with `keep_dims = false`
/// that yields a scalar tensor of shape `[]`.
pub fn sum_axes_op(
    input: &Tensor,
    axes: &[usize],
    keep_dims: bool,
) -> Result<Tensor, CamRustError> {
    ensure_f32_cpu(input, "sum_axes")?;
    let guard = input.read_data();
    let input_shape = guard.shape.clone();
    let rank = input_shape.len();

    let processed: Vec<usize> = if axes.is_empty() {
        (0..rank).collect()
    } else {
        for &axis in axes {
            if axis >= rank {
                return Err(CamRustError::IndexOutOfBounds {
                    index: vec![axis],
                    shape: input_shape.clone(),
                });
            }
        }
        let mut sorted = axes.to_vec();
        sorted.sort_unstable();
        sorted.dedup();
        sorted
    };

    // Output shape and the mapping from input dims to output positions.
    let mut out_shape = Vec::new();
    let mut dim_to_out: Vec<Option<usize>> = Vec::with_capacity(rank);
    for (dim, &size) in input_shape.iter().enumerate() {
        if !processed.contains(&dim) {
            dim_to_out.push(Some(out_shape.len()));
            out_shape.push(size);
        } else if keep_dims {
            dim_to_out.push(Some(out_shape.len()));
            out_shape.push(1);
        } else {
            dim_to_out.push(None);
        }
    }

    let out_numel: usize = out_shape.iter().product();
    let out_strides = calculate_strides(&out_shape);
    let mut result = vec![0.0f32; out_numel];

    let data = guard.buffer().try_get_cpu_f32()?;
    let logical_strides = calculate_strides(&input_shape);
    for i in 0..guard.numel() {
        let coords = index_to_coord(i, &logical_strides, &input_shape);
        let value = data[guard.get_offset(&coords)];
        let mut flat = 0usize;
        for (dim, &coord) in coords.iter().enumerate() {
            if let Some(pos) = dim_to_out[dim] {
                let effective = if processed.contains(&dim) { 0 } else { coord };
                flat += effective * out_strides[pos];
            }
        }
        result[flat] += value;
    }
    drop(guard);

    let output = Tensor::new(result, out_shape)?;
    if input.requires_grad() {
        link(
            &output,
            SumBackward {
                input: input.clone(),
                input_shape,
                axes: processed,
            },
        );
    }
    Ok(output)
}
