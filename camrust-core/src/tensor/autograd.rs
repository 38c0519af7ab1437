// src/tensor/autograd.rs

use crate::autograd::{BackwardOp, NodeId};
use crate::error::CamRustError;
use crate::tensor::Tensor;
use crate::tensor_data::TensorData;
use std::sync::{Arc, RwLock};

impl Tensor {
    /// Checks if the tensor participates in gradient tracking.
    pub fn requires_grad(&self) -> bool {
        self.read_data().requires_grad
    }

    /// Sets the `requires_grad` status of this tensor **in-place**.
    /// Only allowed on leaf tensors.
    pub fn requires_grad_(&self, requires_grad: bool) -> Result<(), CamRustError> {
        let mut guard = self.write_data();
        if guard.grad_fn.is_some() {
            return Err(CamRustError::RequiresGradOnNonLeaf);
        }
        guard.requires_grad = requires_grad;
        Ok(())
    }

    /// Returns an optional reference to the gradient function (`BackwardOp`) node.
    pub fn grad_fn(&self) -> Option<Arc<dyn BackwardOp + Send + Sync>> {
        self.read_data().grad_fn.clone()
    }

    /// The stable identity of this tensor's data node in the recorded graph.
    /// Used as a map key by the gradient query; never dereferenced.
    pub(crate) fn node_id(&self) -> NodeId {
        Arc::as_ptr(&self.data)
    }

    /// Creates a new tensor that shares the same data buffer but is detached
    /// from the computation graph (no `grad_fn`, `requires_grad = false`).
    pub fn detach(&self) -> Tensor {
        let guard = self.read_data();
        let detached_data = TensorData {
            buffer: Arc::clone(&guard.buffer),
            device: guard.device,
            dtype: guard.dtype,
            shape: guard.shape.clone(),
            strides: guard.strides.clone(),
            offset: guard.offset,
            requires_grad: false,
            grad_fn: None,
        };
        Tensor {
            data: Arc::new(RwLock::new(detached_data)),
        }
    }
}

// Manual Clone: clone the Arc, not the TensorData.
impl Clone for Tensor {
    fn clone(&self) -> Self {
        Tensor {
            data: Arc::clone(&self.data),
        }
    }
}
