//! Grad-CAM++ (and classic Grad-CAM) visual explanations.
//!
//! One explanation request runs a strictly sequential pipeline:
//! target-layer selection → gradient extraction (one forward pass, up to
//! three chained backward queries per class against one retained recording)
//! → CAM composition. There is no feedback loop, no caching, no retry; any
//! failure aborts the whole request with no partial result.
//!
//! The deliverable is a list of 2-D f32 maps, one per processed class index,
//! in input order. No normalization, clamping, rendering or persistence
//! happens here; those are downstream collaborators consuming the list.

pub mod cam;
pub mod gradients;
pub mod selector;

pub use cam::{alpha_weights, compose_maps, ponderate, MapSelection};
pub use gradients::{collect_gradients, collect_guided_gradients, GradientBundle, GuidedBundle};
pub use selector::infer_target_layer;

use crate::error::CamRustError;
use crate::model::Model;
use crate::tensor::Tensor;
use crate::types::DType;

/// Capability of a batch provider: yield the `(images, labels)` pair for a
/// given batch index. The explainer calls this exactly once per explanation
/// request; batch assembly itself is the caller's concern.
pub trait BatchSource {
    fn batch(&self, index: usize) -> Result<(Tensor, Tensor), CamRustError>;
}

/// Derives one class index per image from a label tensor.
///
/// Accepts either a 2-D one-hot (or probability) matrix, decoded per row by
/// argmax, or a 1-D vector of already-numeric class indices.
pub fn class_indices_from_labels(labels: &Tensor) -> Result<Vec<usize>, CamRustError> {
    if labels.dtype() != DType::F32 {
        return Err(CamRustError::UnsupportedOperation(format!(
            "class_indices_from_labels requires DType::F32, got {:?}",
            labels.dtype()
        )));
    }
    let shape = labels.shape();
    let data = labels.get_f32_data()?;
    match shape.len() {
        1 => Ok(data.iter().map(|&v| v as usize).collect()),
        2 => {
            let classes = shape[1];
            if classes == 0 {
                return Err(CamRustError::ShapeMismatch {
                    expected: vec![shape[0], 1],
                    actual: shape,
                    operation: "class_indices_from_labels".to_string(),
                });
            }
            let mut indices = Vec::with_capacity(shape[0]);
            for row in data.chunks(classes) {
                let mut best = 0;
                for (column, &value) in row.iter().enumerate() {
                    if value > row[best] {
                        best = column;
                    }
                }
                indices.push(best);
            }
            Ok(indices)
        }
        rank => Err(CamRustError::RankMismatch {
            expected: 2,
            actual: rank,
        }),
    }
}

/// The Grad-CAM++ explainer.
///
/// Paper: [Grad-CAM++: Improved Visual Explanations for Deep Convolutional
/// Networks](https://arxiv.org/abs/1710.11063).
#[derive(Debug, Clone, Default)]
pub struct GradCamPlusPlus {
    /// Target layer to probe; inferred (last 4D-output layer) when absent.
    pub layer_name: Option<String>,
    /// Which image each map is computed for.
    pub selection: MapSelection,
}

impl GradCamPlusPlus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_layer(mut self, layer_name: &str) -> Self {
        self.layer_name = Some(layer_name.to_string());
        self
    }

    pub fn with_selection(mut self, selection: MapSelection) -> Self {
        self.selection = selection;
        self
    }

    /// Computes one class activation map per entry of `class_indices`
    /// (aligned with, and at most as long as, the image batch).
    pub fn explain(
        &self,
        model: &dyn Model,
        images: &Tensor,
        class_indices: &[usize],
    ) -> Result<Vec<Tensor>, CamRustError> {
        let layer_name = self.resolve_layer(model)?;
        let bundle = gradients::collect_gradients(model, images, &layer_name, class_indices)?;
        cam::compose_maps(&bundle, self.selection)
    }

    /// Pulls one batch from `source` and explains it. When `class_indices`
    /// is absent the targets are derived from the batch labels.
    pub fn explain_source(
        &self,
        model: &dyn Model,
        source: &dyn BatchSource,
        batch_index: usize,
        class_indices: Option<&[usize]>,
    ) -> Result<Vec<Tensor>, CamRustError> {
        let (images, labels) = source.batch(batch_index)?;
        let indices = match class_indices {
            Some(indices) => indices.to_vec(),
            None => class_indices_from_labels(&labels)?,
        };
        self.explain(model, &images, &indices)
    }

    fn resolve_layer(&self, model: &dyn Model) -> Result<String, CamRustError> {
        match &self.layer_name {
            Some(name) => Ok(name.clone()),
            None => selector::infer_target_layer(model),
        }
    }
}

/// Classic first-order Grad-CAM, sharing the selector, the retained
/// recording, and the ponderation with the `++` variant.
///
/// Paper: [Grad-CAM: Visual Explanations from Deep Networks via
/// Gradient-based Localization](https://arxiv.org/abs/1610.02391).
#[derive(Debug, Clone, Default)]
pub struct GradCam {
    pub layer_name: Option<String>,
    pub selection: MapSelection,
}

impl GradCam {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_layer(mut self, layer_name: &str) -> Self {
        self.layer_name = Some(layer_name.to_string());
        self
    }

    pub fn explain(
        &self,
        model: &dyn Model,
        images: &Tensor,
        class_indices: &[usize],
    ) -> Result<Vec<Tensor>, CamRustError> {
        let layer_name = match &self.layer_name {
            Some(name) => name.clone(),
            None => selector::infer_target_layer(model)?,
        };
        let bundle =
            gradients::collect_guided_gradients(model, images, &layer_name, class_indices)?;
        cam::compose_mean_maps(&bundle, self.selection)
    }
}
