use crate::autograd::BackwardOp;
use crate::error::CamRustError;
use crate::ops::link;
use crate::tensor::utils::calculate_strides;
use crate::tensor::Tensor;
use crate::tensor_data::TensorData;
use std::sync::{Arc, RwLock};

#[derive(Debug)]
struct ReshapeBackward {
    input: Tensor,
    input_shape: Vec<usize>,
}

impl BackwardOp for ReshapeBackward {
    fn backward(&self, grad_output: &Tensor) -> Result<Vec<Tensor>, CamRustError> {
        Ok(vec![reshape_op(grad_output, self.input_shape.clone())?])
    }

    fn inputs(&self) -> Vec<Tensor> {
        vec![self.input.clone()]
    }
}

/// Reshapes a contiguous tensor by creating a view over the same buffer.
///
/// Every op of this crate materializes contiguous outputs, so the
/// contiguity requirement holds throughout the pipeline.
pub fn reshape_op(tensor: &Tensor, new_shape: Vec<usize>) -> Result<Tensor, CamRustError> {
    let guard = tensor.read_data();

    let original_numel: usize = guard.shape.iter().product();
    let new_numel: usize = new_shape.iter().product();
    if original_numel != new_numel {
        return Err(CamRustError::ShapeMismatch {
            expected: guard.shape.clone(),
            actual: new_shape,
            operation: "reshape (numel mismatch)".to_string(),
        });
    }

    if !guard.is_contiguous() {
        return Err(CamRustError::UnsupportedOperation(
            "Reshaping a non-contiguous tensor is not supported".to_string(),
        ));
    }

    let new_strides = calculate_strides(&new_shape);
    let view = TensorData::new_view(
        Arc::clone(&guard.buffer),
        guard.device,
        guard.offset,
        new_shape,
        new_strides,
    )?;

    let requires_grad = guard.requires_grad;
    let input_shape = guard.shape.clone();
    drop(guard);

    let output = Tensor {
        data: Arc::new(RwLock::new(view)),
    };
    if requires_grad {
        link(
            &output,
            ReshapeBackward {
                input: tensor.clone(),
                input_shape,
            },
        );
    }
    Ok(output)
}
