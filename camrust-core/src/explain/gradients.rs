//! Gradient extraction: one forward pass, then up to three chained backward
//! queries per requested class, all against the same retained recording.

use crate::autograd::grad;
use crate::error::CamRustError;
use crate::model::Model;
use crate::ops::arithmetic::mul_op;
use crate::ops::comparison::gt_scalar_op;
use crate::tensor::create::ones_like;
use crate::tensor::Tensor;

/// Everything the CAM composer needs, jointly aligned by class position.
/// All tensors are detached; dropping the bundle does not keep any recorded
/// graph alive.
#[derive(Debug)]
pub struct GradientBundle {
    /// Target layer output for the whole batch, shape `(B, H, W, C)`.
    pub feature_map: Tensor,
    /// Second derivative of each class score w.r.t. the feature map.
    pub seconds: Vec<Tensor>,
    /// Third derivative of each class score w.r.t. the feature map.
    pub thirds: Vec<Tensor>,
    /// ReLU-gated first derivatives (guided gradients).
    pub guided: Vec<Tensor>,
    /// The class indices the gradients were computed for, in input order.
    pub class_indices: Vec<usize>,
}

/// First-order variant of [`GradientBundle`], used by classic Grad-CAM.
#[derive(Debug)]
pub struct GuidedBundle {
    pub feature_map: Tensor,
    pub guided: Vec<Tensor>,
    pub class_indices: Vec<usize>,
}

/// The retained differentiation context of one explanation call.
///
/// Opened once (marking a detached copy of the input images as the gradient
/// leaf and running the probed forward pass), queried up to three times per
/// class, and released at one explicit point after the last class. Ownership
/// guarantees the recorded graph is torn down on every exit path, including
/// early `?` failures.
struct Recording {
    feature_map: Tensor,
    predictions: Tensor,
}

impl Recording {
    fn open(
        model: &dyn Model,
        images: &Tensor,
        layer_name: &str,
    ) -> Result<Self, CamRustError> {
        // The detached copy is a leaf; tracking it forces the whole forward
        // pass onto the recorded graph regardless of how the caller built
        // the batch tensor.
        let leaf = images.detach();
        leaf.requires_grad_(true)?;

        let (feature_map, predictions) = model.forward_capturing(&leaf, layer_name)?;
        if predictions.rank() != 2 {
            return Err(CamRustError::RankMismatch {
                expected: 2,
                actual: predictions.rank(),
            });
        }
        log::debug!(
            "recorded forward pass: feature map {:?}, predictions {:?}",
            feature_map.shape(),
            predictions.shape()
        );
        Ok(Recording {
            feature_map,
            predictions,
        })
    }

    /// The unnormalized score vector of one class: column `class_index` of
    /// the prediction matrix, one entry per batch image.
    fn score(&self, class_index: usize) -> Result<Tensor, CamRustError> {
        self.predictions.select(1, class_index)
    }

    /// Explicit release point. Dropping the recording frees the retained
    /// graph; consuming `self` makes the point visible in the control flow.
    fn release(self) {
        log::trace!("releasing recorded forward computation");
    }
}

/// Computes guided first derivatives plus second and third derivatives of
/// each requested class score with respect to the target layer's output.
///
/// The three queries per class are issued strictly in order (first → second
/// → third) against the same recording: each derivative is defined as the
/// derivative of the previous result, so the earlier gradients must stay on
/// the recorded graph (`create_graph`) until the chain is finished.
///
/// `class_indices` holds one target class per image to explain; it may be
/// shorter than the batch. Uniqueness and range are not validated here
/// beyond what column selection naturally rejects.
pub fn collect_gradients(
    model: &dyn Model,
    images: &Tensor,
    layer_name: &str,
    class_indices: &[usize],
) -> Result<GradientBundle, CamRustError> {
    let recording = Recording::open(model, images, layer_name)?;
    let feature_map = recording.feature_map.clone();

    let mut seconds = Vec::with_capacity(class_indices.len());
    let mut thirds = Vec::with_capacity(class_indices.len());
    let mut guided = Vec::with_capacity(class_indices.len());

    for (position, &class_index) in class_indices.iter().enumerate() {
        log::debug!(
            "gradient chain for class {} ({}/{})",
            class_index,
            position + 1,
            class_indices.len()
        );
        let score = recording.score(class_index)?;

        let first = grad(&score, Some(ones_like(&score)?), &[&feature_map], true)?.remove(0);
        let second = grad(&first, Some(ones_like(&first)?), &[&feature_map], true)?.remove(0);
        let third = grad(&second, Some(ones_like(&second)?), &[&feature_map], false)?.remove(0);

        guided.push(guided_gradient(&feature_map, &first)?);
        seconds.push(second.detach());
        thirds.push(third);
    }

    recording.release();

    Ok(GradientBundle {
        feature_map: feature_map.detach(),
        seconds,
        thirds,
        guided,
        class_indices: class_indices.to_vec(),
    })
}

/// First-order extraction for classic Grad-CAM: one backward query per class.
pub fn collect_guided_gradients(
    model: &dyn Model,
    images: &Tensor,
    layer_name: &str,
    class_indices: &[usize],
) -> Result<GuidedBundle, CamRustError> {
    let recording = Recording::open(model, images, layer_name)?;
    let feature_map = recording.feature_map.clone();

    let mut guided = Vec::with_capacity(class_indices.len());
    for &class_index in class_indices {
        let score = recording.score(class_index)?;
        let first = grad(&score, Some(ones_like(&score)?), &[&feature_map], false)?.remove(0);
        guided.push(guided_gradient(&feature_map, &first)?);
    }

    recording.release();

    Ok(GuidedBundle {
        feature_map: feature_map.detach(),
        guided,
        class_indices: class_indices.to_vec(),
    })
}

/// ReLU-style gating: the gradient passes through only where both the
/// activation and the gradient itself are positive.
fn guided_gradient(feature_map: &Tensor, first: &Tensor) -> Result<Tensor, CamRustError> {
    let activation_mask = gt_scalar_op(feature_map, 0.0)?;
    let gradient_mask = gt_scalar_op(first, 0.0)?;
    let gated = mul_op(&first.detach(), &activation_mask)?;
    mul_op(&gated, &gradient_mask)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Sequential;
    use crate::nn::layers::{Flatten, Linear, ReLU, Softmax};

    fn toy_model(weight_data: Vec<f32>) -> Sequential {
        let mut model = Sequential::new(&[1, 2, 2, 1]);
        model.add_layer("features", Box::new(ReLU::new())).unwrap();
        model.add_layer("flatten", Box::new(Flatten::new())).unwrap();
        let weight = Tensor::new(weight_data, vec![2, 4]).unwrap();
        model
            .add_layer("head", Box::new(Linear::from_weights(weight, None).unwrap()))
            .unwrap();
        model.add_layer("probs", Box::new(Softmax::new(1))).unwrap();
        model
    }

    #[test]
    fn test_bundle_shapes_and_alignment() {
        let model = toy_model(vec![1.0, -0.5, 0.25, 2.0, -1.0, 0.5, 1.5, -0.25]);
        let images = Tensor::new(vec![0.5, -0.5, 1.0, 2.0], vec![1, 2, 2, 1]).unwrap();
        let bundle = collect_gradients(&model, &images, "features", &[0]).unwrap();

        assert_eq!(bundle.feature_map.shape(), vec![1, 2, 2, 1]);
        assert_eq!(bundle.seconds.len(), 1);
        assert_eq!(bundle.thirds.len(), 1);
        assert_eq!(bundle.guided.len(), 1);
        assert_eq!(bundle.class_indices, vec![0]);
        assert_eq!(bundle.seconds[0].shape(), vec![1, 2, 2, 1]);
        assert_eq!(bundle.thirds[0].shape(), vec![1, 2, 2, 1]);
        assert_eq!(bundle.guided[0].shape(), vec![1, 2, 2, 1]);
    }

    #[test]
    fn test_all_bundle_tensors_are_detached() {
        let model = toy_model(vec![1.0, -0.5, 0.25, 2.0, -1.0, 0.5, 1.5, -0.25]);
        let images = Tensor::new(vec![0.5, -0.5, 1.0, 2.0], vec![1, 2, 2, 1]).unwrap();
        let bundle = collect_gradients(&model, &images, "features", &[0, 1]).unwrap();

        assert!(!bundle.feature_map.requires_grad());
        for t in bundle
            .seconds
            .iter()
            .chain(bundle.thirds.iter())
            .chain(bundle.guided.iter())
        {
            assert!(!t.requires_grad());
            assert!(t.grad_fn().is_none());
        }
    }

    #[test]
    fn test_second_derivative_nonzero_through_softmax_head() {
        let model = toy_model(vec![2.0, -1.0, 0.5, 1.0, -2.0, 1.0, -0.5, -1.0]);
        let images = Tensor::new(vec![1.0, 0.5, 2.0, 1.5], vec![1, 2, 2, 1]).unwrap();
        let bundle = collect_gradients(&model, &images, "features", &[0]).unwrap();
        let second_values = bundle.seconds[0].get_f32_data().unwrap();
        assert!(
            second_values.iter().any(|v| v.abs() > 1e-7),
            "softmax head should give a nonzero second derivative: {second_values:?}"
        );
    }

    #[test]
    fn test_guided_gradient_is_nonnegative() {
        let model = toy_model(vec![1.0, -0.5, 0.25, 2.0, -1.0, 0.5, 1.5, -0.25]);
        let images = Tensor::new(vec![0.5, -0.5, 1.0, 2.0], vec![1, 2, 2, 1]).unwrap();
        let bundle = collect_gradients(&model, &images, "features", &[0, 1]).unwrap();
        for g in &bundle.guided {
            assert!(g.get_f32_data().unwrap().iter().all(|&v| v >= 0.0));
        }
    }

    #[test]
    fn test_invalid_class_index_rejected_by_selection() {
        let model = toy_model(vec![1.0, -0.5, 0.25, 2.0, -1.0, 0.5, 1.5, -0.25]);
        let images = Tensor::new(vec![0.5, -0.5, 1.0, 2.0], vec![1, 2, 2, 1]).unwrap();
        // Only 2 output classes; class 5 fails where the model naturally rejects it.
        assert!(matches!(
            collect_gradients(&model, &images, "features", &[5]),
            Err(CamRustError::IndexOutOfBounds { .. })
        ));
    }

    #[test]
    fn test_first_order_bundle() {
        let model = toy_model(vec![1.0, -0.5, 0.25, 2.0, -1.0, 0.5, 1.5, -0.25]);
        let images = Tensor::new(vec![0.5, -0.5, 1.0, 2.0], vec![1, 2, 2, 1]).unwrap();
        let bundle = collect_guided_gradients(&model, &images, "features", &[1]).unwrap();
        assert_eq!(bundle.guided.len(), 1);
        assert_eq!(bundle.guided[0].shape(), vec![1, 2, 2, 1]);
    }
}
