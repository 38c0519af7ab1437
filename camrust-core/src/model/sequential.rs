use crate::error::CamRustError;
use crate::model::{LayerInfo, Model};
use crate::nn::module::Module;
use crate::tensor::Tensor;

/// A model built from an ordered list of named layers.
///
/// `input_shape` describes the batch the model was designed for (including a
/// nominal batch dimension); it is what the static layer listing is computed
/// from. The forward pass itself accepts any batch size the layers can take.
#[derive(Debug)]
pub struct Sequential {
    input_shape: Vec<usize>,
    layers: Vec<(String, Box<dyn Module>)>,
}

impl Sequential {
    pub fn new(input_shape: &[usize]) -> Self {
        Sequential {
            input_shape: input_shape.to_vec(),
            layers: Vec::new(),
        }
    }

    /// Appends a named layer. Layer names identify gradient probe points, so
    /// they must be unique.
    pub fn add_layer(
        &mut self,
        name: &str,
        module: Box<dyn Module>,
    ) -> Result<(), CamRustError> {
        if self.layers.iter().any(|(existing, _)| existing == name) {
            return Err(CamRustError::DuplicateLayerName {
                name: name.to_string(),
            });
        }
        self.layers.push((name.to_string(), module));
        Ok(())
    }

    /// Plain forward pass through every layer.
    pub fn forward(&self, input: &Tensor) -> Result<Tensor, CamRustError> {
        let mut current = input.clone();
        for (_, module) in &self.layers {
            current = module.forward(&current)?;
        }
        Ok(current)
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }
}

impl Model for Sequential {
    fn layers(&self) -> Result<Vec<LayerInfo>, CamRustError> {
        let mut infos = Vec::with_capacity(self.layers.len());
        let mut shape = self.input_shape.clone();
        for (name, module) in &self.layers {
            shape = module.output_shape(&shape)?;
            infos.push(LayerInfo {
                name: name.clone(),
                output_shape: shape.clone(),
            });
        }
        Ok(infos)
    }

    fn forward_capturing(
        &self,
        input: &Tensor,
        layer_name: &str,
    ) -> Result<(Tensor, Tensor), CamRustError> {
        let mut current = input.clone();
        let mut captured: Option<Tensor> = None;
        for (name, module) in &self.layers {
            current = module.forward(&current)?;
            if name == layer_name {
                captured = Some(current.clone());
            }
        }
        match captured {
            Some(layer_output) => Ok((layer_output, current)),
            None => Err(CamRustError::LayerNotFound {
                name: layer_name.to_string(),
            }),
        }
    }
}
