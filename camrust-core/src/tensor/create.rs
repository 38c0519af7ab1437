// src/tensor/create.rs

use crate::error::CamRustError;
use crate::tensor::Tensor;
use crate::types::DType;
use rand::Rng;
use rand_distr::{Distribution, StandardNormal};

/// Creates a new tensor filled with zeros with the specified shape.
/// Currently creates an f32 tensor on the CPU.
pub fn zeros(shape: &[usize]) -> Result<Tensor, CamRustError> {
    let numel = shape.iter().product();
    let data_vec: Vec<f32> = vec![0.0; numel];
    Tensor::new(data_vec, shape.to_vec())
}

/// Creates a new F64 tensor filled with zeros with the specified shape on the CPU.
pub fn zeros_f64(shape: &[usize]) -> Result<Tensor, CamRustError> {
    let numel = shape.iter().product();
    let data_vec: Vec<f64> = vec![0.0; numel];
    Tensor::new_f64(data_vec, shape.to_vec())
}

/// Creates a new tensor filled with ones with the specified shape.
/// Currently creates an f32 tensor on the CPU.
pub fn ones(shape: &[usize]) -> Result<Tensor, CamRustError> {
    let numel = shape.iter().product();
    let data_vec: Vec<f32> = vec![1.0; numel];
    Tensor::new(data_vec, shape.to_vec())
}

/// Creates a new tensor filled with a specific value with the specified shape.
pub fn full(shape: &[usize], value: f32) -> Result<Tensor, CamRustError> {
    let numel = shape.iter().product();
    let data_vec: Vec<f32> = vec![value; numel];
    Tensor::new(data_vec, shape.to_vec())
}

/// Creates a new CPU F32 Tensor from a `Vec<f32>` and shape.
pub fn from_vec_f32(data_vec: Vec<f32>, shape: Vec<usize>) -> Result<Tensor, CamRustError> {
    Tensor::new(data_vec, shape)
}

/// Creates a new tensor filled with zeros, having the same shape and dtype as the input tensor.
pub fn zeros_like(tensor: &Tensor) -> Result<Tensor, CamRustError> {
    let shape = tensor.shape();
    match tensor.dtype() {
        DType::F32 => zeros(&shape),
        DType::F64 => zeros_f64(&shape),
    }
}

/// Creates a new tensor filled with ones, having the same shape as the input tensor.
/// Only F32 tensors are supported, matching the compute ops of this crate.
pub fn ones_like(tensor: &Tensor) -> Result<Tensor, CamRustError> {
    if tensor.dtype() != DType::F32 {
        return Err(CamRustError::UnsupportedOperation(format!(
            "ones_like requires DType::F32, got {:?}",
            tensor.dtype()
        )));
    }
    ones(&tensor.shape())
}

/// Creates a new f32 tensor with elements drawn from the standard normal distribution.
pub fn randn(shape: &[usize]) -> Result<Tensor, CamRustError> {
    let numel: usize = shape.iter().product();
    let mut rng = rand::thread_rng();
    let data_vec: Vec<f32> = (0..numel)
        .map(|_| StandardNormal.sample(&mut rng))
        .collect();
    Tensor::new(data_vec, shape.to_vec())
}

/// Creates a new f32 tensor with elements drawn uniformly from `[low, high)`.
pub fn uniform(shape: &[usize], low: f32, high: f32) -> Result<Tensor, CamRustError> {
    if high <= low {
        return Err(CamRustError::UnsupportedOperation(format!(
            "uniform requires low < high, got [{}, {})",
            low, high
        )));
    }
    let numel: usize = shape.iter().product();
    let mut rng = rand::thread_rng();
    let data_vec: Vec<f32> = (0..numel).map(|_| rng.gen_range(low..high)).collect();
    Tensor::new(data_vec, shape.to_vec())
}
