use crate::{error::Result, geoalg::f32_math::{matrix::PatchMatrix, tensor::Tensor}};

use super::window::{OutputExtent, WindowGeometry};

/// Unfolds every window of the tensor into one column of a patch matrix.
///
/// Output shape is `(kH*kW*C, oH*oW*N)`. For window (h, w) of sample n with origin `(h*S, w*S)`,
/// column `h + w*oH + n*oH*oW` holds the window's elements with height varying fastest,
/// then width, then channel.
///
/// Fails, without allocating, if any window of `extent` reaches past the tensor
/// or the patch matrix would hold more than `usize::MAX` elements.
pub fn im2col(input: &Tensor, geometry: &WindowGeometry, extent: OutputExtent) -> Result<PatchMatrix> {
    let shape = input.shape();
    let (rows, columns) = geometry.patch_matrix_shape(shape, extent)?;

    tracing::debug!(
        height = shape.height, width = shape.width, channels = shape.channels, batches = shape.batches,
        kernel_height = geometry.kernel_height(), kernel_width = geometry.kernel_width(), stride = geometry.stride(),
        output_height = extent.height, output_width = extent.width,
        "im2col");

    let mut patches = PatchMatrix::zeros(rows, columns);

    let values = input.values();
    for n in 0..shape.batches {
        for w in 0..extent.width {
            for h in 0..extent.height {
                let (y, x) = geometry.window_origin(h, w);
                let column = extent.patch_column(h, w, n);
                for channel in 0..shape.channels {
                    for xx in 0..geometry.kernel_width() {
                        for yy in 0..geometry.kernel_height() {
                            let destination = patches.flat_index(geometry.patch_row(yy, xx, channel), column);
                            patches[destination] = values[shape.flat_index(y + yy, x + xx, channel, n)];
                        }
                    }
                }
            }
        }
    }

    tracing::trace!(rows, columns, "im2col done");
    Ok(patches)
}
