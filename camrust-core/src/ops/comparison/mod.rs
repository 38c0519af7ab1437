pub mod eq;
pub mod gt;
pub mod where_op;

pub use eq::eq_scalar_op;
pub use gt::gt_scalar_op;
pub use where_op::where_op;
