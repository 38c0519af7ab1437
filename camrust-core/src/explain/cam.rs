//! CAM composition: alpha weighting and the ponderated channel sum.

use crate::error::CamRustError;
use crate::explain::gradients::{GradientBundle, GuidedBundle};
use crate::ops::arithmetic::{add_op, div_op, mul_op, mul_scalar_op};
use crate::ops::comparison::{eq_scalar_op, where_op};
use crate::tensor::create::ones_like;
use crate::tensor::Tensor;

/// Which image of the batch each class activation map is computed for.
///
/// The upstream formulation of this choice was ambiguous, so both readings
/// are carried as explicitly named, separately testable modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MapSelection {
    /// One CAM per image: class entry `i` explains image `i` (that image's
    /// own target class). The default.
    #[default]
    ImageAtPosition,
    /// One CAM per class: the first batch position equal to the class
    /// *value*. A class value with no matching position is an error, never a
    /// silent skip.
    FirstImageMatchingClass,
}

/// Computes the Grad-CAM++ alpha coefficients for one class.
///
/// With `S = Σ_{h,w} A` (per image and channel):
///
/// `alpha = second / (2 * second + S ⊙ third)`
///
/// Wherever the denominator is exactly zero it is substituted with 1 before
/// dividing; at such cells alpha degrades to the bare numerator. This is a
/// documented approximation, not a numerically derived value; the event is
/// recorded at debug level, never raised.
///
/// Every extent is derived from tensor metadata at runtime; batch, spatial
/// and channel sizes are unconstrained.
pub fn alpha_weights(
    feature_map: &Tensor,
    second: &Tensor,
    third: &Tensor,
) -> Result<Tensor, CamRustError> {
    let shape = feature_map.shape();
    if shape.len() != 4 {
        return Err(CamRustError::RankMismatch {
            expected: 4,
            actual: shape.len(),
        });
    }
    for (tensor, label) in [(second, "second derivative"), (third, "third derivative")] {
        if tensor.shape() != shape {
            return Err(CamRustError::ShapeMismatch {
                expected: shape.clone(),
                actual: tensor.shape(),
                operation: format!("alpha_weights ({label})"),
            });
        }
    }
    let (batch, channels) = (shape[0], shape[3]);

    // S: spatial sum of the feature map, broadcast back over every position.
    let spatial_sum = feature_map
        .sum_axes(&[1, 2], false)?
        .reshape(vec![batch, 1, 1, channels])?;
    let global_sum = mul_op(&spatial_sum, third)?;

    let denominator = add_op(&mul_scalar_op(second, 2.0)?, &global_sum)?;
    let zero_mask = eq_scalar_op(&denominator, 0.0)?;
    let guarded_cells = zero_mask
        .get_f32_data()?
        .iter()
        .filter(|&&v| v != 0.0)
        .count();
    if guarded_cells > 0 {
        log::debug!(
            "alpha denominator guard applied at {} of {} cells",
            guarded_cells,
            denominator.numel()
        );
    }
    let safe_denominator = where_op(&zero_mask, &ones_like(&denominator)?, &denominator)?;

    div_op(second, &safe_denominator)
}

/// Performs the ponderation of one image's feature map: per-channel weights
/// are the spatial mean of `alpha ⊙ guided`, and the CAM is the weighted sum
/// over channels. All inputs are rank 3 `(H, W, C)`; the result is `(H, W)`.
pub fn ponderate(
    feature_map: &Tensor,
    alpha: &Tensor,
    guided: &Tensor,
) -> Result<Tensor, CamRustError> {
    let weights = mul_op(alpha, guided)?.mean_axes(&[0, 1], false)?;
    mul_op(&weights, feature_map)?.sum_axes(&[2], false)
}

/// Produces one CAM per processed class index, in input order.
pub fn compose_maps(
    bundle: &GradientBundle,
    selection: MapSelection,
) -> Result<Vec<Tensor>, CamRustError> {
    let shape = bundle.feature_map.shape();
    if shape.len() != 4 {
        return Err(CamRustError::RankMismatch {
            expected: 4,
            actual: shape.len(),
        });
    }
    let class_count = bundle.class_indices.len();
    for (count, label) in [
        (bundle.seconds.len(), "second derivatives"),
        (bundle.thirds.len(), "third derivatives"),
        (bundle.guided.len(), "guided gradients"),
    ] {
        if count != class_count {
            return Err(CamRustError::ShapeMismatch {
                expected: vec![class_count],
                actual: vec![count],
                operation: format!("compose_maps ({label} count)"),
            });
        }
    }

    let batch = shape[0];
    let mut maps = Vec::with_capacity(class_count);
    for (position, &class_index) in bundle.class_indices.iter().enumerate() {
        let alpha = alpha_weights(
            &bundle.feature_map,
            &bundle.seconds[position],
            &bundle.thirds[position],
        )?;
        let image = image_position(selection, position, class_index, batch)?;

        let feature_map = bundle.feature_map.select(0, image)?;
        let alpha = alpha.select(0, image)?;
        let guided = bundle.guided[position].select(0, image)?;
        maps.push(ponderate(&feature_map, &alpha, &guided)?);
    }
    Ok(maps)
}

/// First-order composition for classic Grad-CAM: the channel weights are the
/// spatial mean of the guided gradients alone, which is ponderation with a
/// unit alpha.
pub fn compose_mean_maps(
    bundle: &GuidedBundle,
    selection: MapSelection,
) -> Result<Vec<Tensor>, CamRustError> {
    let shape = bundle.feature_map.shape();
    if shape.len() != 4 {
        return Err(CamRustError::RankMismatch {
            expected: 4,
            actual: shape.len(),
        });
    }
    if bundle.guided.len() != bundle.class_indices.len() {
        return Err(CamRustError::ShapeMismatch {
            expected: vec![bundle.class_indices.len()],
            actual: vec![bundle.guided.len()],
            operation: "compose_mean_maps (guided gradient count)".to_string(),
        });
    }

    let batch = shape[0];
    let mut maps = Vec::with_capacity(bundle.class_indices.len());
    for (position, &class_index) in bundle.class_indices.iter().enumerate() {
        let image = image_position(selection, position, class_index, batch)?;
        let feature_map = bundle.feature_map.select(0, image)?;
        let guided = bundle.guided[position].select(0, image)?;
        maps.push(ponderate(&feature_map, &ones_like(&guided)?, &guided)?);
    }
    Ok(maps)
}

fn image_position(
    selection: MapSelection,
    position: usize,
    class_index: usize,
    batch: usize,
) -> Result<usize, CamRustError> {
    let image = match selection {
        MapSelection::ImageAtPosition => position,
        // "First batch position whose index equals the class value" reduces
        // to the class value itself when it is in range.
        MapSelection::FirstImageMatchingClass => class_index,
    };
    if image >= batch {
        return Err(CamRustError::IndexOutOfBounds {
            index: vec![image],
            shape: vec![batch],
        });
    }
    Ok(image)
}

// --- Tests ---
#[cfg(test)]
#[path = "cam_test.rs"]
mod tests;
