//! Dense layout transforms beneath convolution and pooling layers.
//!
//! Tensors are (height, width, channels, batches) and column-major: height varies fastest.
//! Patch matrices are `(kH*kW*C, oH*oW*N)`, also column-major, one window per column.

pub mod error;
pub mod geoalg;
pub mod nn;

pub use error::{LayoutError, Result};
pub use geoalg::f32_math::{matrix::PatchMatrix, shape::Shape4, tensor::Tensor};
pub use nn::{col2im, im2col, max_pool, ArgmaxIndices, MaxPooled, OutputExtent, WindowGeometry};
