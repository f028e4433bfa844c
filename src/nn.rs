//! CNN layout primitives: unfolding windows into patch columns, folding them back, and max pooling.

pub mod window;
pub mod im2col;
pub mod col2im;
pub mod max_pooling;

pub use window::{OutputExtent, WindowGeometry};
pub use im2col::im2col;
pub use col2im::col2im;
pub use max_pooling::{max_pool, ArgmaxIndices, MaxPooled};
