// Ergonomic method facade over the free-standing op functions.

use crate::error::CamRustError;
use crate::ops;
use crate::tensor::Tensor;

impl Tensor {
    /// See [`ops::view::reshape_op`].
    pub fn reshape(&self, new_shape: Vec<usize>) -> Result<Tensor, CamRustError> {
        ops::view::reshape_op(self, new_shape)
    }

    /// See [`ops::view::select_op`].
    pub fn select(&self, dim: usize, index: usize) -> Result<Tensor, CamRustError> {
        ops::view::select_op(self, dim, index)
    }

    /// See [`ops::linalg::transpose_op`].
    pub fn transpose(&self) -> Result<Tensor, CamRustError> {
        ops::linalg::transpose_op(self)
    }

    /// See [`ops::linalg::matmul_op`].
    pub fn matmul(&self, other: &Tensor) -> Result<Tensor, CamRustError> {
        ops::linalg::matmul_op(self, other)
    }

    /// See [`ops::reduction::sum_axes_op`].
    pub fn sum_axes(&self, axes: &[usize], keep_dims: bool) -> Result<Tensor, CamRustError> {
        ops::reduction::sum_axes_op(self, axes, keep_dims)
    }

    /// See [`ops::reduction::mean_axes_op`].
    pub fn mean_axes(&self, axes: &[usize], keep_dims: bool) -> Result<Tensor, CamRustError> {
        ops::reduction::mean_axes_op(self, axes, keep_dims)
    }

    /// See [`ops::activation::relu_op`].
    pub fn relu(&self) -> Result<Tensor, CamRustError> {
        ops::activation::relu_op(self)
    }

    /// See [`ops::math_elem::exp_op`].
    pub fn exp(&self) -> Result<Tensor, CamRustError> {
        ops::math_elem::exp_op(self)
    }
}
