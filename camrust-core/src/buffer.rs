use std::sync::Arc;

use crate::device::StorageDevice;
use crate::error::CamRustError;

/// Enum representing different buffer types based on device and data type.
/// This allows TensorData to hold different kinds of data buffers.
#[derive(Debug, Clone)]
pub enum Buffer {
    /// Data resides on the CPU.
    Cpu(CpuBuffer),
    /// Placeholder for a GPU buffer. Stores device and length for
    /// consistency; the actual handle would live in a dedicated backend.
    Gpu { device: StorageDevice, len: usize },
}

/// Enum for CPU-specific buffer types.
#[derive(Debug, Clone)]
pub enum CpuBuffer {
    /// Buffer holding f32 data on the CPU.
    F32(Arc<Vec<f32>>),
    /// Buffer holding f64 data on the CPU.
    F64(Arc<Vec<f64>>),
}

impl Buffer {
    /// Attempts to get a reference to the underlying `Arc<Vec<f32>>` if this is a CPU F32 buffer.
    ///
    /// Returns an error if the buffer is not a CPU buffer or not of type F32.
    pub fn try_get_cpu_f32(&self) -> Result<&Arc<Vec<f32>>, CamRustError> {
        match self {
            Buffer::Cpu(CpuBuffer::F32(data_arc)) => Ok(data_arc),
            Buffer::Cpu(_) => Err(CamRustError::UnsupportedOperation(
                "Buffer is CPU but not F32 type".to_string(),
            )),
            Buffer::Gpu { device, .. } => Err(CamRustError::DeviceMismatch {
                expected: StorageDevice::CPU,
                actual: *device,
                operation: "try_get_cpu_f32".to_string(),
            }),
        }
    }

    /// Attempts to get a reference to the underlying `Arc<Vec<f64>>` if this is a CPU F64 buffer.
    pub fn try_get_cpu_f64(&self) -> Result<&Arc<Vec<f64>>, CamRustError> {
        match self {
            Buffer::Cpu(CpuBuffer::F64(data_arc)) => Ok(data_arc),
            Buffer::Cpu(_) => Err(CamRustError::UnsupportedOperation(
                "Buffer is CPU but not F64 type".to_string(),
            )),
            Buffer::Gpu { device, .. } => Err(CamRustError::DeviceMismatch {
                expected: StorageDevice::CPU,
                actual: *device,
                operation: "try_get_cpu_f64".to_string(),
            }),
        }
    }
}
