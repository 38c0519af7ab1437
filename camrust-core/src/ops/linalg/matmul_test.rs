use super::*;
use crate::autograd::grad_check::check_grad;
use crate::tensor::create::ones;

#[test]
fn test_matmul_forward() {
    // [1, 3] @ [3, 2]
    let a = Tensor::new(vec![10.0, 20.0, 30.0], vec![1, 3]).unwrap();
    let b = Tensor::new(vec![1.0, 4.0, 2.0, 5.0, 3.0, 6.0], vec![3, 2]).unwrap();
    let c = matmul_op(&a, &b).unwrap();
    assert_eq!(c.shape(), vec![1, 2]);
    assert_eq!(c.get_f32_data().unwrap(), vec![140.0, 320.0]);
}

#[test]
fn test_matmul_inner_dim_mismatch() {
    let a = Tensor::new(vec![1.0, 2.0], vec![1, 2]).unwrap();
    let b = Tensor::new(vec![1.0, 2.0, 3.0], vec![3, 1]).unwrap();
    assert!(matches!(
        matmul_op(&a, &b),
        Err(CamRustError::ShapeMismatch { .. })
    ));
}

#[test]
fn test_matmul_rejects_vectors() {
    let a = Tensor::new(vec![1.0, 2.0], vec![2]).unwrap();
    let b = Tensor::new(vec![1.0, 2.0], vec![2, 1]).unwrap();
    assert!(matches!(
        matmul_op(&a, &b),
        Err(CamRustError::RankMismatch { .. })
    ));
}

#[test]
fn test_matmul_backward_matches_finite_differences() {
    let a = Tensor::new(vec![1.0, -2.0, 0.5, 3.0, 2.0, -1.0], vec![2, 3]).unwrap();
    let b = Tensor::new(vec![0.5, 1.0, -1.5, 2.0, 0.25, -3.0], vec![3, 2]).unwrap();
    a.requires_grad_(true).unwrap();
    b.requires_grad_(true).unwrap();
    let output_grad = ones(&[2, 2]).unwrap();
    check_grad(
        |ts| matmul_op(&ts[0], &ts[1]),
        &[a, b],
        &output_grad,
        1e-2,
        1e-2,
    )
    .unwrap();
}
