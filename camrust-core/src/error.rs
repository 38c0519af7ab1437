use crate::device::StorageDevice;
use thiserror::Error;

/// Custom error type for the CamRust framework.
#[derive(Error, Debug, PartialEq, Clone)] // PartialEq for easier testing
pub enum CamRustError {
    #[error("Shape mismatch: expected {expected:?}, got {actual:?} during operation {operation}")]
    ShapeMismatch {
        expected: Vec<usize>,
        actual: Vec<usize>,
        operation: String,
    },

    #[error("Rank mismatch: expected {expected} dimensions, got {actual}")]
    RankMismatch { expected: usize, actual: usize },

    #[error("Cannot broadcast shapes: {shape1:?} and {shape2:?}")]
    BroadcastError {
        shape1: Vec<usize>,
        shape2: Vec<usize>,
    },

    #[error("Index out of bounds: index {index:?} for shape {shape:?}")]
    IndexOutOfBounds {
        index: Vec<usize>,
        shape: Vec<usize>,
    },

    #[error("Tensor creation error: data length {data_len} does not match shape {shape:?}")]
    TensorCreationError { data_len: usize, shape: Vec<usize> },

    #[error("Model does not contain a layer with a 4D output shape. Grad-CAM cannot be applied.")]
    NoConvolutionalLayer,

    #[error("Layer '{name}' not found in model")]
    LayerNotFound { name: String },

    #[error("A layer named '{name}' already exists in this model")]
    DuplicateLayerName { name: String },

    #[error("requires_grad can only be toggled on leaf tensors (no grad_fn)")]
    RequiresGradOnNonLeaf,

    #[error("Gradient query on a non-scalar tensor requires an explicit output gradient.")]
    BackwardNonScalar,

    #[error("Backward pass error: {0}")]
    BackwardError(String),

    #[error("Unsupported operation: {0}")]
    UnsupportedOperation(String),

    #[error("Device mismatch for operation '{operation}': expected {expected:?}, got {actual:?}")]
    DeviceMismatch {
        expected: StorageDevice,
        actual: StorageDevice,
        operation: String,
    },

    #[error("Internal error: {0}")]
    InternalError(String),
}
