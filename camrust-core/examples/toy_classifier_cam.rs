//! Builds a small randomly-initialized classifier, runs Grad-CAM++ over a
//! random image batch, and prints per-map statistics.
//!
//! Run with: `cargo run --example toy_classifier_cam`

use camrust_core::nn::layers::{Flatten, Linear, ReLU, Softmax};
use camrust_core::tensor::create::uniform;
use camrust_core::{GradCamPlusPlus, Sequential};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let (batch, height, width, channels, classes) = (2, 8, 8, 3, 4);

    let mut model = Sequential::new(&[batch, height, width, channels]);
    model.add_layer("features", Box::new(ReLU::new()))?;
    model.add_layer("flatten", Box::new(Flatten::new()))?;
    model.add_layer(
        "head",
        Box::new(Linear::new(height * width * channels, classes, true)?),
    )?;
    model.add_layer("probs", Box::new(Softmax::new(1)))?;

    let images = uniform(&[batch, height, width, channels], 0.0, 1.0)?;

    let explainer = GradCamPlusPlus::new();
    let maps = explainer.explain(&model, &images, &[0, 2])?;

    for (i, map) in maps.iter().enumerate() {
        let values = map.get_f32_data()?;
        let min = values.iter().cloned().fold(f32::INFINITY, f32::min);
        let max = values.iter().cloned().fold(f32::NEG_INFINITY, f32::max);
        let mean = values.iter().sum::<f32>() / values.len() as f32;
        println!(
            "map {} -> shape {:?}, min {:.6}, max {:.6}, mean {:.6}",
            i,
            map.shape(),
            min,
            max,
            mean
        );
    }

    Ok(())
}
