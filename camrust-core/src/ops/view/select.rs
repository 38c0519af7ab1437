use crate::autograd::BackwardOp;
use crate::error::CamRustError;
use crate::ops::{ensure_f32_cpu, link};
use crate::tensor::utils::{calculate_strides, index_to_coord};
use crate::tensor::Tensor;

#[derive(Debug)]
struct SelectBackward {
    input: Tensor,
    dim: usize,
    index: usize,
}

impl BackwardOp for SelectBackward {
    fn backward(&self, grad_output: &Tensor) -> Result<Vec<Tensor>, CamRustError> {
        Ok(vec![embed_op(
            grad_output,
            self.input.shape(),
            self.dim,
            self.index,
        )?])
    }

    fn inputs(&self) -> Vec<Tensor> {
        vec![self.input.clone()]
    }
}

/// Selects the slice at `index` along `dim`, removing that dimension.
///
/// Used both to pick a class-score column out of the prediction matrix and to
/// pick a single image's feature map / alpha / guided gradient out of a batch.
pub fn select_op(input: &Tensor, dim: usize, index: usize) -> Result<Tensor, CamRustError> {
    ensure_f32_cpu(input, "select")?;
    let guard = input.read_data();
    let shape = guard.shape.clone();
    if dim >= shape.len() {
        return Err(CamRustError::IndexOutOfBounds {
            index: vec![dim],
            shape,
        });
    }
    if index >= shape[dim] {
        return Err(CamRustError::IndexOutOfBounds {
            index: vec![index],
            shape,
        });
    }

    let mut out_shape = shape.clone();
    out_shape.remove(dim);
    let out_numel: usize = out_shape.iter().product();
    let out_strides = calculate_strides(&out_shape);
    let data = guard.buffer().try_get_cpu_f32()?;

    let mut result = Vec::with_capacity(out_numel);
    for i in 0..out_numel {
        let mut coords = index_to_coord(i, &out_strides, &out_shape);
        coords.insert(dim, index);
        result.push(data[guard.get_offset(&coords)]);
    }
    drop(guard);

    let output = Tensor::new(result, out_shape)?;
    if input.requires_grad() {
        link(
            &output,
            SelectBackward {
                input: input.clone(),
                dim,
                index,
            },
        );
    }
    Ok(output)
}

#[derive(Debug)]
struct EmbedBackward {
    values: Tensor,
    dim: usize,
    index: usize,
}

impl BackwardOp for EmbedBackward {
    fn backward(&self, grad_output: &Tensor) -> Result<Vec<Tensor>, CamRustError> {
        Ok(vec![select_op(grad_output, self.dim, self.index)?])
    }

    fn inputs(&self) -> Vec<Tensor> {
        vec![self.values.clone()]
    }
}

/// The adjoint of [`select_op`]: scatters `values` into an all-zero tensor of
/// `target_shape` at position `index` along `dim`.
pub fn embed_op(
    values: &Tensor,
    target_shape: Vec<usize>,
    dim: usize,
    index: usize,
) -> Result<Tensor, CamRustError> {
    ensure_f32_cpu(values, "embed")?;
    if dim >= target_shape.len() {
        return Err(CamRustError::IndexOutOfBounds {
            index: vec![dim],
            shape: target_shape,
        });
    }
    if index >= target_shape[dim] {
        return Err(CamRustError::IndexOutOfBounds {
            index: vec![index],
            shape: target_shape,
        });
    }

    let mut expected_shape = target_shape.clone();
    expected_shape.remove(dim);
    if values.shape() != expected_shape {
        return Err(CamRustError::ShapeMismatch {
            expected: expected_shape,
            actual: values.shape(),
            operation: "embed".to_string(),
        });
    }

    let value_data = values.get_f32_data()?;
    let value_strides = calculate_strides(&expected_shape);
    let target_strides = calculate_strides(&target_shape);
    let target_numel: usize = target_shape.iter().product();
    let mut result = vec![0.0f32; target_numel];
    for (i, &value) in value_data.iter().enumerate() {
        let mut coords = index_to_coord(i, &value_strides, &expected_shape);
        coords.insert(dim, index);
        let flat: usize = coords
            .iter()
            .zip(target_strides.iter())
            .map(|(c, s)| c * s)
            .sum();
        result[flat] = value;
    }

    let output = Tensor::new(result, target_shape)?;
    if values.requires_grad() {
        link(
            &output,
            EmbedBackward {
                values: values.clone(),
                dim,
                index,
            },
        );
    }
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::autograd::grad_check::check_grad;
    use crate::tensor::create::ones;

    #[test]
    fn test_select_column() {
        // The class-score pattern: column c of a (B, K) prediction matrix.
        let predictions =
            Tensor::new(vec![0.1, 0.9, 0.7, 0.3, 0.4, 0.6], vec![3, 2]).unwrap();
        let scores = select_op(&predictions, 1, 1).unwrap();
        assert_eq!(scores.shape(), vec![3]);
        assert_eq!(scores.get_f32_data().unwrap(), vec![0.9, 0.3, 0.6]);
    }

    #[test]
    fn test_select_batch_element() {
        let batch = Tensor::new((0..12).map(|v| v as f32).collect(), vec![2, 2, 3]).unwrap();
        let second = select_op(&batch, 0, 1).unwrap();
        assert_eq!(second.shape(), vec![2, 3]);
        assert_eq!(
            second.get_f32_data().unwrap(),
            vec![6.0, 7.0, 8.0, 9.0, 10.0, 11.0]
        );
    }

    #[test]
    fn test_select_out_of_bounds() {
        let t = Tensor::new(vec![1.0, 2.0], vec![2]).unwrap();
        assert!(matches!(
            select_op(&t, 0, 2),
            Err(CamRustError::IndexOutOfBounds { .. })
        ));
        assert!(matches!(
            select_op(&t, 1, 0),
            Err(CamRustError::IndexOutOfBounds { .. })
        ));
    }

    #[test]
    fn test_embed_is_select_adjoint() {
        let values = Tensor::new(vec![1.0, 2.0, 3.0], vec![3]).unwrap();
        let embedded = embed_op(&values, vec![3, 2], 1, 0).unwrap();
        assert_eq!(
            embedded.get_f32_data().unwrap(),
            vec![1.0, 0.0, 2.0, 0.0, 3.0, 0.0]
        );
        let back = select_op(&embedded, 1, 0).unwrap();
        assert_eq!(back.get_f32_data().unwrap(), vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_embed_shape_mismatch() {
        let values = Tensor::new(vec![1.0, 2.0], vec![2]).unwrap();
        assert!(matches!(
            embed_op(&values, vec![3, 3], 1, 0),
            Err(CamRustError::ShapeMismatch { .. })
        ));
    }

    #[test]
    fn test_select_backward() {
        let t = Tensor::new(vec![1.0, -2.0, 3.0, 4.0, 0.5, -1.5], vec![3, 2]).unwrap();
        t.requires_grad_(true).unwrap();
        let output_grad = ones(&[3]).unwrap();
        check_grad(
            |ts| select_op(&ts[0], 1, 0),
            &[t],
            &output_grad,
            1e-2,
            1e-2,
        )
        .unwrap();
    }

    #[test]
    fn test_embed_backward() {
        let values = Tensor::new(vec![1.0, -2.0, 3.0], vec![3]).unwrap();
        values.requires_grad_(true).unwrap();
        let output_grad = ones(&[3, 2]).unwrap();
        check_grad(
            |ts| embed_op(&ts[0], vec![3, 2], 1, 1),
            &[values],
            &output_grad,
            1e-2,
            1e-2,
        )
        .unwrap();
    }
}
