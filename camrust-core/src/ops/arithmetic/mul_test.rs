use super::*;
use crate::autograd::grad;
use crate::autograd::grad_check::check_grad;
use crate::tensor::create::{ones, ones_like};

#[test]
fn test_mul_forward() {
    let a = Tensor::new(vec![1.0, 2.0, 3.0, 4.0], vec![2, 2]).unwrap();
    let b = Tensor::new(vec![2.0, 2.0, 0.5, -1.0], vec![2, 2]).unwrap();
    let c = mul_op(&a, &b).unwrap();
    assert_eq!(c.get_f32_data().unwrap(), vec![2.0, 4.0, 1.5, -4.0]);
}

#[test]
fn test_mul_broadcast_channel_weights_pattern() {
    // The CAM ponderation pattern: (C,) * (H, W, C)
    let weights = Tensor::new(vec![2.0, 10.0], vec![2]).unwrap();
    let fmap = Tensor::new(vec![1.0, 1.0, 2.0, 2.0, 3.0, 3.0, 4.0, 4.0], vec![2, 2, 2]).unwrap();
    let product = mul_op(&weights, &fmap).unwrap();
    assert_eq!(product.shape(), vec![2, 2, 2]);
    assert_eq!(
        product.get_f32_data().unwrap(),
        vec![2.0, 10.0, 4.0, 20.0, 6.0, 30.0, 8.0, 40.0]
    );
}

#[test]
fn test_mul_broadcast_spatial_sum_pattern() {
    // The alpha-denominator pattern: (B, 1, 1, C) * (B, H, W, C)
    let s = Tensor::new(vec![10.0, 100.0], vec![1, 1, 1, 2]).unwrap();
    let third = Tensor::new(vec![1.0, 2.0, 3.0, 4.0], vec![1, 2, 1, 2]).unwrap();
    let scaled = mul_op(&s, &third).unwrap();
    assert_eq!(scaled.shape(), vec![1, 2, 1, 2]);
    assert_eq!(scaled.get_f32_data().unwrap(), vec![10.0, 200.0, 30.0, 400.0]);
}

#[test]
fn test_mul_rejects_f64() {
    let a = Tensor::new_f64(vec![1.0f64, 2.0], vec![2]).unwrap();
    let b = Tensor::new_f64(vec![3.0f64, 4.0], vec![2]).unwrap();
    assert!(matches!(
        mul_op(&a, &b),
        Err(CamRustError::UnsupportedOperation(_))
    ));
}

#[test]
fn test_mul_backward_matches_finite_differences() {
    let a = Tensor::new(vec![1.0, -2.0, 3.0, 0.5], vec![2, 2]).unwrap();
    let b = Tensor::new(vec![4.0, 5.0], vec![2]).unwrap();
    a.requires_grad_(true).unwrap();
    b.requires_grad_(true).unwrap();
    let output_grad = ones(&[2, 2]).unwrap();
    check_grad(|ts| mul_op(&ts[0], &ts[1]), &[a, b], &output_grad, 1e-2, 1e-2).unwrap();
}

#[test]
fn test_mul_second_derivative_through_backward() {
    // y = x * x; the backward rule itself must be differentiable.
    let x = Tensor::new(vec![3.0, -4.0], vec![2]).unwrap();
    x.requires_grad_(true).unwrap();
    let y = mul_op(&x, &x).unwrap();
    let g1 = grad(&y, Some(ones_like(&y).unwrap()), &[&x], true)
        .unwrap()
        .remove(0);
    assert_eq!(g1.get_f32_data().unwrap(), vec![6.0, -8.0]);
    let g2 = grad(&g1, Some(ones_like(&g1).unwrap()), &[&x], false)
        .unwrap()
        .remove(0);
    assert_eq!(g2.get_f32_data().unwrap(), vec![2.0, 2.0]);
}
