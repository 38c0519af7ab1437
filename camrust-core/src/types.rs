/// Defines the possible data types for Tensor elements.
///
/// Storage supports both float widths, but the numeric ops of this crate
/// compute in `F32` only (Grad-CAM arithmetic is specified as 32-bit) and
/// report `UnsupportedOperation` for anything else.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DType {
    /// 32-bit floating-point type.
    F32,
    /// 64-bit floating-point type.
    F64,
}
