use crate::{error::Result, geoalg::f32_math::{shape::Shape4, tensor::Tensor}};

use super::window::WindowGeometry;

/// Flat indices of the winning element of every pooling window.
///
/// Indices are stored 1-based into the pooled input, matching the host convention the
/// pooling output is handed to. Use [`ArgmaxIndices::zero_based`] to index Rust slices.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArgmaxIndices {
    shape: Shape4,
    indices: Vec<usize>
}

impl ArgmaxIndices {
    /// Shape of the pooled output, (oH, oW, C, N).
    pub fn shape(&self) -> Shape4 { self.shape }

    pub fn len(&self) -> usize { self.indices.len() }

    pub fn is_empty(&self) -> bool { self.indices.is_empty() }

    pub fn one_based(&self, index: usize) -> usize { self.indices[index] }

    pub fn zero_based(&self, index: usize) -> usize { self.indices[index] - 1 }

    pub fn as_one_based_slice(&self) -> &[usize] { &self.indices }

    pub fn iter_zero_based(&self) -> impl Iterator<Item = usize> + '_ {
        self.indices.iter().map(|&index| index - 1)
    }

    /// 1-based indices as an f32 tensor, the layout a numeric host expects.
    /// Exact only while indices stay below 2^24.
    pub fn as_f32_tensor(&self) -> Tensor {
        let values = self.indices.iter().map(|&index| index as f32).collect();
        Tensor::from_parts(self.shape, values)
    }
}

/// Result of max pooling: the window maxima and where each one came from.
#[derive(Debug, Clone, PartialEq)]
pub struct MaxPooled {
    pub values: Tensor,
    pub indices: ArgmaxIndices,
}

/// Max pooling without padding.
///
/// Output shape is `(oH, oW, C, N)` with `oH = (H - kH) / S + 1` and likewise for width.
/// Each window is scanned width-outer, height-inner, starting from its first element. For
/// ordinary numbers a later element replaces the running maximum only when strictly greater,
/// so on ties the earliest element in that order is kept.
///
/// NaN is the one exception to that comparison: a NaN replaces a numeric running maximum even
/// though `NaN > max` is false, and once a NaN is held nothing replaces it. A window containing
/// NaN therefore reports its first NaN.
pub fn max_pool(input: &Tensor, geometry: &WindowGeometry) -> Result<MaxPooled> {
    let shape = input.shape();
    let extent = geometry.output_extent(shape.height, shape.width)?;
    let output_shape = Shape4::new(extent.height, extent.width, shape.channels, shape.batches);

    tracing::debug!(
        height = shape.height, width = shape.width, channels = shape.channels, batches = shape.batches,
        kernel_height = geometry.kernel_height(), kernel_width = geometry.kernel_width(), stride = geometry.stride(),
        output_height = extent.height, output_width = extent.width,
        "max_pool");

    let input_values = input.values();
    let mut values = Vec::with_capacity(output_shape.size());
    let mut indices = Vec::with_capacity(output_shape.size());
    for n in 0..shape.batches {
        for channel in 0..shape.channels {
            for w in 0..extent.width {
                for h in 0..extent.height {
                    let (y, x) = geometry.window_origin(h, w);

                    // Seeding with the first element avoids any sentinel value.
                    let mut max_index = shape.flat_index(y, x, channel, n);
                    let mut max = input_values[max_index];
                    for xx in 0..geometry.kernel_width() {
                        for yy in 0..geometry.kernel_height() {
                            let index = shape.flat_index(y + yy, x + xx, channel, n);
                            let value = input_values[index];
                            if value > max || (value.is_nan() && !max.is_nan()) {
                                max = value;
                                max_index = index;
                            }
                        }
                    }

                    values.push(max);
                    indices.push(max_index + 1);
                }
            }
        }
    }

    tracing::trace!(len = values.len(), "max_pool done");
    Ok(MaxPooled {
        values: Tensor::from_parts(output_shape, values),
        indices: ArgmaxIndices { shape: output_shape, indices },
    })
}
