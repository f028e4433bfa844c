use thiserror::Error;

/// Precondition failures for the layout transforms.
/// Every check runs before any output buffer is allocated, so an error never comes with partial output.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LayoutError {
    /// A declared shape does not agree with the buffer or with the window geometry.
    #[error("{what}: expected {expected}, got {actual}")]
    ShapeMismatch {
        what: &'static str,
        expected: usize,
        actual: usize,
    },

    /// A tensor dimension or output extent is zero.
    #[error("{what} must be at least 1")]
    EmptyDimension { what: &'static str },

    /// An element count does not fit in usize.
    #[error("{what} overflows usize")]
    SizeOverflow { what: &'static str },

    /// Kernel size or stride is zero.
    #[error("{name} must be at least 1, got {value}")]
    DegenerateParameter { name: &'static str, value: usize },

    /// The windows implied by kernel, stride and output extent reach past the tensor.
    #[error("windows along {axis} need {required} elements but the tensor only has {extent}")]
    WindowOutOfBounds {
        axis: &'static str,
        required: usize,
        extent: usize,
    },
}

pub type Result<T> = std::result::Result<T, LayoutError>;
