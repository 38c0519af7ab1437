#![allow(dead_code)]

use camrust_core::nn::layers::{Flatten, Linear, ReLU, Softmax};
use camrust_core::{Sequential, Tensor};

/// Deterministic pseudo-random tensor: same shape and scale always yield the
/// same values, so pipeline runs are reproducible without a seeded RNG.
pub fn deterministic_tensor(shape: &[usize], scale: f32) -> Tensor {
    let numel: usize = shape.iter().product();
    let data: Vec<f32> = (0..numel)
        .map(|i| (((i * 37 + 11) % 19) as f32 - 9.0) * scale)
        .collect();
    Tensor::new(data, shape.to_vec()).unwrap()
}

/// Strictly positive variant, for image batches that should fully pass the
/// activation gate of the probed layer.
pub fn deterministic_positive_tensor(shape: &[usize], scale: f32) -> Tensor {
    let numel: usize = shape.iter().product();
    let data: Vec<f32> = (0..numel)
        .map(|i| (((i * 29 + 5) % 13) as f32 + 1.0) * scale)
        .collect();
    Tensor::new(data, shape.to_vec()).unwrap()
}

/// A classifier with one convolutional-shaped probe layer:
/// ReLU (4D) -> Flatten -> Linear -> Softmax. Weights are deterministic.
pub fn toy_classifier(
    batch: usize,
    height: usize,
    width: usize,
    channels: usize,
    classes: usize,
) -> Sequential {
    let features = height * width * channels;
    let mut model = Sequential::new(&[batch, height, width, channels]);
    model.add_layer("features", Box::new(ReLU::new())).unwrap();
    model.add_layer("flatten", Box::new(Flatten::new())).unwrap();
    let weight = deterministic_tensor(&[classes, features], 0.05);
    let bias = deterministic_tensor(&[classes], 0.01);
    model
        .add_layer(
            "head",
            Box::new(Linear::from_weights(weight, Some(bias)).unwrap()),
        )
        .unwrap();
    model.add_layer("probs", Box::new(Softmax::new(1))).unwrap();
    model
}

/// A classifier whose two output classes have explicitly asymmetric weight
/// rows, so their gradient patterns are distinguishable.
pub fn two_class_classifier_2x2() -> Sequential {
    let mut model = Sequential::new(&[2, 2, 2, 1]);
    model.add_layer("features", Box::new(ReLU::new())).unwrap();
    model.add_layer("flatten", Box::new(Flatten::new())).unwrap();
    let weight = Tensor::new(
        vec![
            1.0, -1.0, 2.0, 0.5, // class 0
            -0.5, 2.0, -1.0, 1.0, // class 1
        ],
        vec![2, 4],
    )
    .unwrap();
    model
        .add_layer("head", Box::new(Linear::from_weights(weight, None).unwrap()))
        .unwrap();
    model.add_layer("probs", Box::new(Softmax::new(1))).unwrap();
    model
}

/// A model with no spatial layer at all (pure MLP over flat features).
pub fn flat_mlp(features: usize, classes: usize) -> Sequential {
    let mut model = Sequential::new(&[1, features]);
    let weight = deterministic_tensor(&[classes, features], 0.1);
    model
        .add_layer("head", Box::new(Linear::from_weights(weight, None).unwrap()))
        .unwrap();
    model.add_layer("probs", Box::new(Softmax::new(1))).unwrap();
    model
}
