pub mod reshape;
pub mod select;

pub use reshape::reshape_op;
pub use select::{embed_op, select_op};
