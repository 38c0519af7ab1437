use crate::error::CamRustError;
use crate::tensor::Tensor;
use std::fmt::Debug;

/// Defines the interface for the backward pass of a differentiable tensor operation.
///
/// Any operation that creates a non-leaf `Tensor` (a tensor resulting from an
/// operation on inputs that require gradients) has an associated `BackwardOp`
/// implementation, stored in the output tensor's `grad_fn` field and invoked
/// during a [`crate::autograd::grad`] query to propagate gradients according
/// to the chain rule.
///
/// Implementations must compute their results through the public, tracked op
/// functions: the returned gradients then carry `grad_fn`s of their own, which
/// is what allows gradients of gradients (the second and third derivatives the
/// CAM weighting needs) to be queried against the same recorded forward pass.
///
/// `Debug + Send + Sync` bounds are required because the `Arc<dyn BackwardOp>`
/// holding the state may be shared across threads.
pub trait BackwardOp: Debug + Send + Sync {
    /// Computes the gradients of the operation's inputs, given the gradient of
    /// the operation's output (`grad_output`, i.e. dL/dOutput).
    ///
    /// # Returns
    /// * `Ok(Vec<Tensor>)`: one gradient per input, in the same order as
    ///   [`BackwardOp::inputs`]. Each gradient has the shape and device of the
    ///   corresponding input.
    /// * `Err(CamRustError)`: if gradient computation fails (shape mismatch,
    ///   device mismatch, ...).
    fn backward(&self, grad_output: &Tensor) -> Result<Vec<Tensor>, CamRustError>;

    /// Returns the input tensors that participated in the forward operation.
    ///
    /// These are cheap handle clones (shared `Arc`s); holding them here keeps
    /// the recorded graph alive for as long as any tensor downstream of the
    /// operation is alive, and releases it when the last one is dropped. The
    /// order **must** match the order of gradients returned by `backward()`.
    /// Inputs that are not differentiable (e.g. comparison masks) are omitted
    /// from both.
    fn inputs(&self) -> Vec<Tensor>;
}
