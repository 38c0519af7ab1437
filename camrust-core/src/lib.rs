//! CamRust core: Grad-CAM++ class activation maps over a trained classifier,
//! together with the CPU tensor/autograd engine their second- and
//! third-order gradient queries require.

pub mod autograd;
pub mod explain;
pub mod model;
pub mod nn;
pub mod ops;
pub mod tensor;
pub mod tensor_data;
pub mod utils;

pub mod buffer;
pub mod device;
pub mod error;
pub mod types;

// Re-export the main entry points.
pub use error::CamRustError;
pub use explain::{BatchSource, GradCam, GradCamPlusPlus, MapSelection};
pub use model::{LayerInfo, Model, Sequential};
pub use tensor::Tensor;

// Re-export traits required by public functions/structs.
pub use num_traits;
