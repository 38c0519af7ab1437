// src/tensor/mod.rs

use crate::device::StorageDevice;
use crate::error::CamRustError;
use crate::tensor_data::TensorData;
use crate::types::DType;
use std::fmt;
use std::sync::{Arc, RwLock};

mod autograd;
pub mod create;
mod methods;
pub mod utils;

pub use create::{from_vec_f32, full, ones, ones_like, randn, uniform, zeros, zeros_f64, zeros_like};

/// Represents a multi-dimensional array (tensor).
///
/// `Tensor` uses `Arc<RwLock<TensorData>>` internally to allow for:
/// 1.  **Shared Ownership:** Multiple `Tensor` instances can point to the same
///     underlying data without cloning the data itself (cheap clones).
/// 2.  **Interior Mutability:** Metadata (like `requires_grad`) within
///     `TensorData` can be modified through an immutable `Tensor` reference,
///     using the `RwLock`. Read/write locks ensure thread safety.
pub struct Tensor {
    /// Arc for shared ownership, RwLock for interior mutability of TensorData.
    pub(crate) data: Arc<RwLock<TensorData>>,
}

impl Tensor {
    /// Creates a new Tensor with the given f32 data and shape on the CPU.
    ///
    /// This is the primary constructor for creating tensors from raw data.
    /// It calculates contiguous strides automatically.
    pub fn new(data_vec: Vec<f32>, shape: Vec<usize>) -> Result<Self, CamRustError> {
        let tensor_data = TensorData::new(data_vec, shape)?;
        Ok(Tensor {
            data: Arc::new(RwLock::new(tensor_data)),
        })
    }

    /// Creates a new Tensor with the given f64 data and shape on the CPU.
    pub fn new_f64(data_vec: Vec<f64>, shape: Vec<usize>) -> Result<Self, CamRustError> {
        let tensor_data = TensorData::new_f64(data_vec, shape)?;
        Ok(Tensor {
            data: Arc::new(RwLock::new(tensor_data)),
        })
    }

    /// Returns the data type (`DType`) of the tensor elements.
    pub fn dtype(&self) -> DType {
        self.read_data().dtype
    }

    /// Returns the device (`StorageDevice`) where the tensor's data resides.
    pub fn device(&self) -> StorageDevice {
        self.read_data().device
    }

    /// Returns a clone of the tensor's shape (`Vec<usize>`).
    pub fn shape(&self) -> Vec<usize> {
        self.read_data().shape.clone()
    }

    /// Returns a clone of the tensor's strides (`Vec<usize>`).
    pub fn strides(&self) -> Vec<usize> {
        self.read_data().strides.clone()
    }

    /// Returns the number of dimensions of the tensor.
    pub fn rank(&self) -> usize {
        self.read_data().shape.len()
    }

    /// Checks if the tensor is contiguous in memory.
    pub fn is_contiguous(&self) -> bool {
        self.read_data().is_contiguous()
    }

    /// Returns the number of elements in the tensor.
    pub fn numel(&self) -> usize {
        self.read_data().numel()
    }

    /// Acquires a read lock on the tensor's data.
    ///
    /// The lock is automatically released when the guard goes out of scope.
    /// Panics if the RwLock is poisoned.
    pub fn read_data(&self) -> std::sync::RwLockReadGuard<'_, TensorData> {
        self.data.read().expect("RwLock poisoned")
    }

    /// Acquires a write lock on the tensor's data.
    ///
    /// Panics if the RwLock is poisoned.
    pub fn write_data(&self) -> std::sync::RwLockWriteGuard<'_, TensorData> {
        self.data.write().expect("RwLock poisoned")
    }

    /// Returns the tensor data as a `Vec<f32>` in logical (row-major) order.
    ///
    /// Works for contiguous tensors and views alike; views are materialized
    /// element by element through their strides and offset.
    /// Returns an error if the tensor is not an F32 CPU tensor.
    pub fn get_f32_data(&self) -> Result<Vec<f32>, CamRustError> {
        let guard = self.read_data();
        if guard.device != StorageDevice::CPU {
            return Err(CamRustError::DeviceMismatch {
                expected: StorageDevice::CPU,
                actual: guard.device,
                operation: "get_f32_data".to_string(),
            });
        }
        let buffer = guard.buffer().try_get_cpu_f32()?;

        if guard.is_contiguous() && guard.offset == 0 && buffer.len() == guard.numel() {
            return Ok(buffer.as_slice().to_vec());
        }

        let shape = guard.shape.clone();
        let logical_strides = utils::calculate_strides(&shape);
        let numel = guard.numel();
        let mut out = Vec::with_capacity(numel);
        for i in 0..numel {
            let coords = utils::index_to_coord(i, &logical_strides, &shape);
            out.push(buffer[guard.get_offset(&coords)]);
        }
        Ok(out)
    }

    /// Returns the single value of a scalar-like tensor (numel == 1).
    pub fn item_f32(&self) -> Result<f32, CamRustError> {
        let numel = self.numel();
        if numel != 1 {
            return Err(CamRustError::ShapeMismatch {
                expected: vec![1],
                actual: self.shape(),
                operation: "item_f32".to_string(),
            });
        }
        Ok(self.get_f32_data()?[0])
    }
}

impl fmt::Debug for Tensor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let guard = self.read_data();
        f.debug_struct("Tensor")
            .field("shape", &guard.shape)
            .field("dtype", &guard.dtype)
            .field("device", &guard.device)
            .field("requires_grad", &guard.requires_grad)
            .field("has_grad_fn", &guard.grad_fn.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_tensor_basic() {
        let t = Tensor::new(vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0], vec![2, 3]).unwrap();
        assert_eq!(t.shape(), vec![2, 3]);
        assert_eq!(t.strides(), vec![3, 1]);
        assert_eq!(t.numel(), 6);
        assert_eq!(t.dtype(), DType::F32);
        assert_eq!(t.device(), StorageDevice::CPU);
        assert!(t.is_contiguous());
        assert!(!t.requires_grad());
    }

    #[test]
    fn test_new_tensor_len_mismatch() {
        let result = Tensor::new(vec![1.0, 2.0, 3.0], vec![2, 2]);
        assert!(matches!(
            result,
            Err(CamRustError::TensorCreationError { data_len: 3, .. })
        ));
    }

    #[test]
    fn test_get_f32_data_roundtrip() {
        let data = vec![0.5, -1.5, 2.0, 7.25];
        let t = Tensor::new(data.clone(), vec![4]).unwrap();
        assert_eq!(t.get_f32_data().unwrap(), data);
    }

    #[test]
    fn test_item_on_non_scalar_fails() {
        let t = Tensor::new(vec![1.0, 2.0], vec![2]).unwrap();
        assert!(matches!(
            t.item_f32(),
            Err(CamRustError::ShapeMismatch { .. })
        ));
    }

    #[test]
    fn test_f64_storage() {
        let t = Tensor::new_f64(vec![1.0f64, 2.0], vec![2]).unwrap();
        assert_eq!(t.dtype(), DType::F64);
        // F32 accessor must refuse an F64 buffer.
        assert!(t.get_f32_data().is_err());
    }
}
