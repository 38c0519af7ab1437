use crate::error::CamRustError;
use crate::model::Model;

/// Searches for the last convolutional-shaped layer to probe, as stated in
/// the Grad-CAM paper: scanning from the output backwards, the first layer
/// whose output has exactly 4 dimensions (batch, height, width, channels).
///
/// Read-only and deterministic; fails with `NoConvolutionalLayer` when the
/// model has no spatial layer at all (e.g. a pure MLP).
pub fn infer_target_layer(model: &dyn Model) -> Result<String, CamRustError> {
    for layer in model.layers()?.iter().rev() {
        if layer.output_shape.len() == 4 {
            log::debug!(
                "inferred Grad-CAM target layer '{}' with output shape {:?}",
                layer.name,
                layer.output_shape
            );
            return Ok(layer.name.clone());
        }
    }
    Err(CamRustError::NoConvolutionalLayer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Sequential;
    use crate::nn::layers::{Flatten, Linear, ReLU, Softmax};

    fn model_with_two_spatial_layers() -> Sequential {
        let mut model = Sequential::new(&[1, 4, 4, 2]);
        model.add_layer("early", Box::new(ReLU::new())).unwrap();
        model.add_layer("late", Box::new(ReLU::new())).unwrap();
        model.add_layer("flatten", Box::new(Flatten::new())).unwrap();
        model
            .add_layer("head", Box::new(Linear::new(32, 2, false).unwrap()))
            .unwrap();
        model.add_layer("probs", Box::new(Softmax::new(1))).unwrap();
        model
    }

    #[test]
    fn test_selector_picks_last_4d_layer() {
        let model = model_with_two_spatial_layers();
        // Both "early" and "late" have 4D outputs; the later one wins.
        assert_eq!(infer_target_layer(&model).unwrap(), "late");
    }

    #[test]
    fn test_selector_fails_without_4d_layer() {
        let mut model = Sequential::new(&[1, 8]);
        model
            .add_layer("dense", Box::new(Linear::new(8, 2, false).unwrap()))
            .unwrap();
        model.add_layer("probs", Box::new(Softmax::new(1))).unwrap();
        assert!(matches!(
            infer_target_layer(&model),
            Err(CamRustError::NoConvolutionalLayer)
        ));
    }
}
