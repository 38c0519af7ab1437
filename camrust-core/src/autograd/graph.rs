use crate::tensor::Tensor;
use crate::tensor_data::TensorData;
use std::collections::HashSet;
use std::sync::RwLock;

/// Stable identity of a tensor's data node in the recorded computation graph.
///
/// The pointer is used purely as a map/set key (`Arc::as_ptr`); it is never
/// dereferenced. The `Arc`s kept alive by [`super::BackwardOp::inputs`] and by
/// the traversal itself guarantee the pointed-to data outlives any key usage.
pub type NodeId = *const RwLock<TensorData>;

/// Builds a topological ordering of the computation graph that produced
/// `root`, leaves first and `root` last.
///
/// Iterative post-order DFS; the recursion-free form keeps deep chains (three
/// stacked backward graphs) from overflowing the call stack.
pub(crate) fn topological_sort(root: &Tensor) -> Vec<Tensor> {
    let mut visited: HashSet<NodeId> = HashSet::new();
    let mut order: Vec<Tensor> = Vec::new();
    // (node, children already expanded)
    let mut stack: Vec<(Tensor, bool)> = vec![(root.clone(), false)];

    while let Some((node, expanded)) = stack.pop() {
        if expanded {
            order.push(node);
            continue;
        }
        let id = node.node_id();
        if visited.contains(&id) {
            continue;
        }
        visited.insert(id);
        stack.push((node.clone(), true));
        if let Some(op) = node.grad_fn() {
            for input in op.inputs() {
                if !visited.contains(&input.node_id()) {
                    stack.push((input, false));
                }
            }
        }
    }

    order
}
