//! Assertion helpers shared by unit and integration tests.

use crate::tensor::Tensor;

/// Asserts shape equality and element-wise closeness against expected data.
pub fn check_tensor_near(tensor: &Tensor, expected_shape: &[usize], expected_data: &[f32], epsilon: f32) {
    assert_eq!(
        tensor.shape(),
        expected_shape,
        "shape mismatch: expected {:?}, got {:?}",
        expected_shape,
        tensor.shape()
    );
    let data = tensor.get_f32_data().expect("expected an F32 CPU tensor");
    assert_eq!(
        data.len(),
        expected_data.len(),
        "element count mismatch: expected {}, got {}",
        expected_data.len(),
        data.len()
    );
    for (i, (actual, expected)) in data.iter().zip(expected_data.iter()).enumerate() {
        assert!(
            (actual - expected).abs() <= epsilon,
            "element {i} differs: expected {expected}, got {actual} (epsilon {epsilon})"
        );
    }
}

/// Asserts every element of the tensor is finite (no NaN/Inf).
pub fn assert_all_finite(tensor: &Tensor) {
    let data = tensor.get_f32_data().expect("expected an F32 CPU tensor");
    for (i, value) in data.iter().enumerate() {
        assert!(value.is_finite(), "element {i} is not finite: {value}");
    }
}
