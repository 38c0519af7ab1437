use std::sync::Arc;

use crate::autograd::BackwardOp;
use crate::buffer::{Buffer, CpuBuffer};
use crate::device::StorageDevice;
use crate::error::CamRustError;
use crate::tensor::utils::calculate_strides;
use crate::types::DType;

/// Internal storage and metadata for a Tensor.
///
/// This struct holds the actual data buffer, shape, strides, device,
/// data type, and autograd-related information.
/// It is typically wrapped in `Arc<RwLock<TensorData>>` by the `Tensor` struct
/// to allow shared ownership and interior mutability.
///
/// There is deliberately no gradient accumulation field here: the
/// explanation pipeline is pure (every stage produces new tensors), and
/// gradients are returned functionally by [`crate::autograd::grad`].
#[derive(Debug)]
pub struct TensorData {
    /// The underlying data buffer, shared cheaply between views.
    pub(crate) buffer: Arc<Buffer>,
    /// The device where the buffer resides.
    pub(crate) device: StorageDevice,
    /// The data type of the elements in the buffer.
    pub(crate) dtype: DType,

    /// The shape (dimensions) of the tensor.
    pub(crate) shape: Vec<usize>,
    /// The strides for each dimension.
    pub(crate) strides: Vec<usize>,
    /// The offset into the buffer for the first element (used for views).
    pub(crate) offset: usize,

    /// Flag indicating if the tensor participates in gradient tracking.
    pub(crate) requires_grad: bool,
    /// The backward operation that produced this tensor, if any.
    /// Leaf tensors (created directly by the user) have `grad_fn = None`.
    pub(crate) grad_fn: Option<Arc<dyn BackwardOp + Send + Sync>>,
}

impl TensorData {
    /// Creates a new `TensorData` instance with the given f32 data and shape on the CPU.
    ///
    /// Takes ownership of the data vector, calculates contiguous strides
    /// automatically, and initializes metadata (offset=0, requires_grad=false).
    ///
    /// # Errors
    /// Returns `CamRustError::TensorCreationError` if the length of `data_vec`
    /// does not match the total number of elements specified by `shape`.
    pub fn new(data_vec: Vec<f32>, shape: Vec<usize>) -> Result<Self, CamRustError> {
        let numel: usize = shape.iter().product();
        let data_len = data_vec.len();
        if data_len != numel {
            return Err(CamRustError::TensorCreationError { data_len, shape });
        }

        let strides = calculate_strides(&shape);
        let buffer = Buffer::Cpu(CpuBuffer::F32(Arc::new(data_vec)));

        Ok(TensorData {
            buffer: Arc::new(buffer),
            device: StorageDevice::CPU,
            dtype: DType::F32,
            offset: 0,
            shape,
            strides,
            requires_grad: false,
            grad_fn: None,
        })
    }

    /// Creates a new `TensorData` instance with the given f64 data and shape on the CPU.
    pub fn new_f64(data_vec: Vec<f64>, shape: Vec<usize>) -> Result<Self, CamRustError> {
        let numel: usize = shape.iter().product();
        let data_len = data_vec.len();
        if data_len != numel {
            return Err(CamRustError::TensorCreationError { data_len, shape });
        }

        let strides = calculate_strides(&shape);
        let buffer = Buffer::Cpu(CpuBuffer::F64(Arc::new(data_vec)));

        Ok(TensorData {
            buffer: Arc::new(buffer),
            device: StorageDevice::CPU,
            dtype: DType::F64,
            offset: 0,
            shape,
            strides,
            requires_grad: false,
            grad_fn: None,
        })
    }

    /// Creates a new `TensorData` representing a view of an existing buffer.
    /// (Used internally by view operations such as reshape.)
    ///
    /// This constructor does **not** allocate new memory for the data but
    /// shares `buffer_arc`, setting fresh metadata. Views do not require
    /// gradients by default and have no `grad_fn`.
    pub(crate) fn new_view(
        buffer_arc: Arc<Buffer>,
        device: StorageDevice,
        offset: usize,
        shape: Vec<usize>,
        strides: Vec<usize>,
    ) -> Result<Self, CamRustError> {
        let dtype = match &*buffer_arc {
            Buffer::Cpu(CpuBuffer::F32(_)) => DType::F32,
            Buffer::Cpu(CpuBuffer::F64(_)) => DType::F64,
            Buffer::Gpu { .. } => {
                return Err(CamRustError::UnsupportedOperation(
                    "Cannot create a view over a GPU buffer".to_string(),
                ));
            }
        };

        if device != StorageDevice::CPU {
            return Err(CamRustError::DeviceMismatch {
                expected: StorageDevice::CPU,
                actual: device,
                operation: "new_view".to_string(),
            });
        }

        Ok(TensorData {
            buffer: buffer_arc,
            device,
            dtype,
            offset,
            shape,
            strides,
            requires_grad: false,
            grad_fn: None,
        })
    }

    /// Provides immutable access to the underlying shared data buffer.
    pub fn buffer(&self) -> &Arc<Buffer> {
        &self.buffer
    }

    /// Returns the number of elements in the tensor.
    pub fn numel(&self) -> usize {
        self.shape.iter().product()
    }

    /// Calculates the linear offset into the underlying shared buffer for the
    /// given multi-dimensional indices, honoring strides and the view offset.
    ///
    /// Panics if the number of indices does not match the tensor rank or if
    /// any index is out of bounds.
    pub fn get_offset(&self, indices: &[usize]) -> usize {
        assert_eq!(
            indices.len(),
            self.shape.len(),
            "Number of indices ({}) does not match tensor rank ({}) for shape {:?}",
            indices.len(),
            self.shape.len(),
            self.shape
        );

        let mut relative_offset = 0;
        for i in 0..self.shape.len() {
            assert!(
                indices[i] < self.shape[i],
                "Index {} is out of bounds for dimension {} with size {} (shape: {:?})",
                indices[i],
                i,
                self.shape[i],
                self.shape
            );
            relative_offset += indices[i] * self.strides[i];
        }
        self.offset + relative_offset
    }

    /// Checks if the tensor is contiguous in memory.
    /// A tensor is contiguous if its elements are laid out in the standard
    /// row-major order without gaps, considering its strides.
    pub fn is_contiguous(&self) -> bool {
        if self.shape.is_empty() {
            return true;
        }
        let mut current_stride = 1;
        for i in (0..self.shape.len()).rev() {
            let shape_i = self.shape[i];
            if shape_i == 0 {
                return true;
            }
            if shape_i != 1 {
                if self.strides[i] != current_stride {
                    return false;
                }
                current_stride *= shape_i;
            }
        }
        true
    }
}
