use camrust_core::{BatchSource, CamRustError, Tensor};

/// Fixed-size batches over a pair of in-memory tensors.
///
/// `images` and `labels` are batched along their first dimension, which must
/// agree between the two. The final batch may be shorter than `batch_size`.
#[derive(Debug, Clone)]
pub struct TensorBatches {
    images: Tensor,
    labels: Tensor,
    batch_size: usize,
    length: usize,
}

impl TensorBatches {
    pub fn new(
        images: Tensor,
        labels: Tensor,
        batch_size: usize,
    ) -> Result<Self, CamRustError> {
        if batch_size == 0 {
            return Err(CamRustError::UnsupportedOperation(
                "batch_size must be positive".to_string(),
            ));
        }
        let images_shape = images.shape();
        let labels_shape = labels.shape();
        if images_shape.is_empty() {
            return Err(CamRustError::RankMismatch {
                expected: 1,
                actual: 0,
            });
        }
        if labels_shape.is_empty() {
            return Err(CamRustError::RankMismatch {
                expected: 1,
                actual: 0,
            });
        }
        if images_shape[0] != labels_shape[0] {
            return Err(CamRustError::ShapeMismatch {
                expected: vec![images_shape[0]],
                actual: vec![labels_shape[0]],
                operation: "TensorBatches::new (first dimension)".to_string(),
            });
        }

        let length = images_shape[0];
        Ok(TensorBatches {
            images,
            labels,
            batch_size,
            length,
        })
    }

    /// Number of batches, counting a trailing partial batch.
    pub fn num_batches(&self) -> usize {
        (self.length + self.batch_size - 1) / self.batch_size
    }

    pub fn len(&self) -> usize {
        self.length
    }

    pub fn is_empty(&self) -> bool {
        self.length == 0
    }

    /// Copies rows `[start, end)` of a tensor's first dimension into a fresh
    /// leaf tensor.
    fn slice_rows(tensor: &Tensor, start: usize, end: usize) -> Result<Tensor, CamRustError> {
        let shape = tensor.shape();
        let row_size: usize = shape[1..].iter().product();
        let data = tensor.get_f32_data()?;
        let slice = data[start * row_size..end * row_size].to_vec();
        let mut out_shape = shape.clone();
        out_shape[0] = end - start;
        Tensor::new(slice, out_shape)
    }
}

impl BatchSource for TensorBatches {
    fn batch(&self, index: usize) -> Result<(Tensor, Tensor), CamRustError> {
        let batches = self.num_batches();
        if index >= batches {
            return Err(CamRustError::IndexOutOfBounds {
                index: vec![index],
                shape: vec![batches],
            });
        }
        let start = index * self.batch_size;
        let end = (start + self.batch_size).min(self.length);
        let images = Self::slice_rows(&self.images, start, end)?;
        let labels = Self::slice_rows(&self.labels, start, end)?;
        Ok((images, labels))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_batches() -> TensorBatches {
        // 5 "images" of shape (2,), one-hot labels over 2 classes.
        let images = Tensor::new((0..10).map(|v| v as f32).collect(), vec![5, 2]).unwrap();
        let labels = Tensor::new(
            vec![1.0, 0.0, 0.0, 1.0, 1.0, 0.0, 0.0, 1.0, 1.0, 0.0],
            vec![5, 2],
        )
        .unwrap();
        TensorBatches::new(images, labels, 2).unwrap()
    }

    #[test]
    fn test_num_batches_counts_partial_tail() {
        let batches = sample_batches();
        assert_eq!(batches.len(), 5);
        assert_eq!(batches.num_batches(), 3);
    }

    #[test]
    fn test_batch_yields_aligned_pair() {
        let batches = sample_batches();
        let (images, labels) = batches.batch(1).unwrap();
        assert_eq!(images.shape(), vec![2, 2]);
        assert_eq!(labels.shape(), vec![2, 2]);
        assert_eq!(images.get_f32_data().unwrap(), vec![4.0, 5.0, 6.0, 7.0]);
        assert_eq!(labels.get_f32_data().unwrap(), vec![1.0, 0.0, 0.0, 1.0]);
    }

    #[test]
    fn test_trailing_batch_is_short() {
        let batches = sample_batches();
        let (images, _) = batches.batch(2).unwrap();
        assert_eq!(images.shape(), vec![1, 2]);
    }

    #[test]
    fn test_batch_index_out_of_range() {
        let batches = sample_batches();
        assert!(matches!(
            batches.batch(3),
            Err(CamRustError::IndexOutOfBounds { .. })
        ));
    }

    #[test]
    fn test_mismatched_first_dimension_rejected() {
        let images = Tensor::new(vec![0.0; 6], vec![3, 2]).unwrap();
        let labels = Tensor::new(vec![0.0; 4], vec![2, 2]).unwrap();
        assert!(matches!(
            TensorBatches::new(images, labels, 2),
            Err(CamRustError::ShapeMismatch { .. })
        ));
    }

    #[test]
    fn test_zero_batch_size_rejected() {
        let images = Tensor::new(vec![0.0; 4], vec![2, 2]).unwrap();
        let labels = Tensor::new(vec![0.0; 2], vec![2, 1]).unwrap();
        assert!(TensorBatches::new(images, labels, 0).is_err());
    }
}
