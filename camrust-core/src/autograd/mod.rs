//! Reverse-mode automatic differentiation over the recorded tensor graph.
//!
//! The entry point is [`grad`]: a functional gradient query that can be issued
//! several times against the same retained forward recording. With
//! `create_graph = true` the returned gradients are themselves recorded, so a
//! second (and third) query differentiates *through* the first, which is the
//! property the Grad-CAM++ alpha weighting depends on.

pub mod backward_op;
pub mod grad_check;
pub mod graph;

pub use backward_op::BackwardOp;
pub use graph::NodeId;

use crate::error::CamRustError;
use crate::ops::arithmetic::add_op;
use crate::tensor::{create, Tensor};
use std::collections::HashMap;

/// Computes gradients of `output` with respect to each tensor in `wrt`.
///
/// * `grad_output`: the gradient flowing into `output` (dL/dOutput). May be
///   omitted only for scalar-like outputs, where it defaults to one.
/// * `create_graph`: when `true`, the returned gradients stay attached to the
///   graph and can be differentiated again; when `false` they are detached.
///
/// Tensors in `wrt` that `output` does not depend on receive a zero gradient
/// (for the higher-order queries this is the mathematically correct result:
/// a locally-linear sub-graph has an identically-zero second derivative).
///
/// The query never mutates any tensor; repeated calls against the same
/// recorded forward pass are valid as long as the recording is alive, and the
/// chain-rule traversal is re-run from scratch each time.
pub fn grad(
    output: &Tensor,
    grad_output: Option<Tensor>,
    wrt: &[&Tensor],
    create_graph: bool,
) -> Result<Vec<Tensor>, CamRustError> {
    if !output.requires_grad() {
        log::debug!(
            "gradient query on a tensor with no recorded dependencies; returning zeros"
        );
        let mut zeros = Vec::with_capacity(wrt.len());
        for t in wrt {
            zeros.push(create::zeros_like(t)?);
        }
        return Ok(zeros);
    }

    let grad_init = match grad_output {
        Some(g) => {
            if g.shape() != output.shape() {
                return Err(CamRustError::BackwardError(format!(
                    "Gradient shape mismatch: expected {:?}, got {:?}",
                    output.shape(),
                    g.shape()
                )));
            }
            if g.device() != output.device() {
                return Err(CamRustError::BackwardError(format!(
                    "Gradient device mismatch: expected {:?}, got {:?}",
                    output.device(),
                    g.device()
                )));
            }
            g
        }
        None => {
            if output.numel() <= 1 {
                create::ones_like(output)?
            } else {
                return Err(CamRustError::BackwardNonScalar);
            }
        }
    };

    let sorted = graph::topological_sort(output);

    let mut grad_map: HashMap<NodeId, Tensor> = HashMap::new();
    grad_map.insert(output.node_id(), grad_init);

    // Reverse topological order: every node is processed after all of its
    // consumers, so its accumulated gradient is complete when visited.
    for node in sorted.iter().rev() {
        let node_grad = match grad_map.get(&node.node_id()) {
            Some(g) => g.clone(),
            None => continue, // no gradient flowed back to this node
        };

        let Some(op) = node.grad_fn() else { continue };

        let input_grads = op.backward(&node_grad)?;
        let op_inputs = op.inputs();
        if input_grads.len() != op_inputs.len() {
            return Err(CamRustError::BackwardError(format!(
                "BackwardOp returned {} gradients but has {} inputs (op: {:?})",
                input_grads.len(),
                op_inputs.len(),
                op
            )));
        }

        for (input, grad_piece) in op_inputs.into_iter().zip(input_grads) {
            if !input.requires_grad() {
                continue;
            }
            let id = input.node_id();
            match grad_map.remove(&id) {
                Some(existing) => {
                    // Tracked accumulation keeps higher-order queries correct.
                    grad_map.insert(id, add_op(&existing, &grad_piece)?);
                }
                None => {
                    grad_map.insert(id, grad_piece);
                }
            }
        }
    }

    let mut results = Vec::with_capacity(wrt.len());
    for t in wrt {
        let g = match grad_map.get(&t.node_id()) {
            Some(g) => {
                if create_graph {
                    g.clone()
                } else {
                    g.detach()
                }
            }
            None => {
                log::debug!("queried tensor unreachable from output; gradient is zero");
                create::zeros_like(t)?
            }
        };
        results.push(g);
    }
    Ok(results)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ops::arithmetic::{mul_op, mul_scalar_op};
    use crate::ops::reduction::sum_axes_op;
    use approx::assert_relative_eq;

    #[test]
    fn test_first_order_product_rule() {
        let x = Tensor::new(vec![2.0, 3.0], vec![2]).unwrap();
        x.requires_grad_(true).unwrap();
        // y = x * x, dy/dx = 2x
        let y = mul_op(&x, &x).unwrap();
        let loss = sum_axes_op(&y, &[], false).unwrap();
        let grads = grad(&loss, None, &[&x], false).unwrap();
        assert_eq!(grads[0].get_f32_data().unwrap(), vec![4.0, 6.0]);
        assert!(!grads[0].requires_grad());
    }

    #[test]
    fn test_second_order_of_square_is_constant_two() {
        let x = Tensor::new(vec![5.0], vec![1]).unwrap();
        x.requires_grad_(true).unwrap();
        let y = mul_op(&x, &x).unwrap();
        let g1 = grad(&y, Some(create::ones_like(&y).unwrap()), &[&x], true)
            .unwrap()
            .remove(0);
        assert_eq!(g1.get_f32_data().unwrap(), vec![10.0]);
        assert!(g1.requires_grad(), "create_graph must keep gradients tracked");

        let g2 = grad(&g1, Some(create::ones_like(&g1).unwrap()), &[&x], false)
            .unwrap()
            .remove(0);
        assert_eq!(g2.get_f32_data().unwrap(), vec![2.0]);
    }

    #[test]
    fn test_third_order_of_cube() {
        let x = Tensor::new(vec![1.5], vec![1]).unwrap();
        x.requires_grad_(true).unwrap();
        // y = x^3, y''' = 6 everywhere
        let y = mul_op(&mul_op(&x, &x).unwrap(), &x).unwrap();
        let ones = create::ones_like(&y).unwrap();
        let g1 = grad(&y, Some(ones.clone()), &[&x], true).unwrap().remove(0);
        let g2 = grad(&g1, Some(ones.clone()), &[&x], true).unwrap().remove(0);
        let g3 = grad(&g2, Some(ones), &[&x], false).unwrap().remove(0);

        assert_relative_eq!(g1.get_f32_data().unwrap()[0], 3.0 * 1.5 * 1.5);
        assert_relative_eq!(g2.get_f32_data().unwrap()[0], 6.0 * 1.5);
        assert_relative_eq!(g3.get_f32_data().unwrap()[0], 6.0);
    }

    #[test]
    fn test_unreachable_input_gets_zero_gradient() {
        let x = Tensor::new(vec![1.0], vec![1]).unwrap();
        let z = Tensor::new(vec![9.0], vec![1]).unwrap();
        x.requires_grad_(true).unwrap();
        z.requires_grad_(true).unwrap();
        let y = mul_scalar_op(&x, 3.0).unwrap();
        let grads = grad(&y, Some(create::ones_like(&y).unwrap()), &[&z], false).unwrap();
        assert_eq!(grads[0].get_f32_data().unwrap(), vec![0.0]);
    }

    #[test]
    fn test_non_scalar_output_without_grad_errors() {
        let x = Tensor::new(vec![1.0, 2.0], vec![2]).unwrap();
        x.requires_grad_(true).unwrap();
        let y = mul_op(&x, &x).unwrap();
        assert!(matches!(
            grad(&y, None, &[&x], false),
            Err(CamRustError::BackwardNonScalar)
        ));
    }

    #[test]
    fn test_repeated_queries_against_same_recording_agree() {
        let x = Tensor::new(vec![2.0, -1.0], vec![2]).unwrap();
        x.requires_grad_(true).unwrap();
        let y = mul_op(&x, &x).unwrap();
        let ones = create::ones_like(&y).unwrap();
        let a = grad(&y, Some(ones.clone()), &[&x], false).unwrap().remove(0);
        let b = grad(&y, Some(ones), &[&x], false).unwrap().remove(0);
        assert_eq!(a.get_f32_data().unwrap(), b.get_f32_data().unwrap());
    }
}
