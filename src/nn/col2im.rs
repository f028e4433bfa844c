use crate::{error::{LayoutError, Result}, geoalg::f32_math::{matrix::PatchMatrix, shape::Shape4, tensor::Tensor}};

use super::window::{OutputExtent, WindowGeometry};

/// Folds a patch matrix back into a tensor of the given shape, summing where windows overlap.
///
/// This is the adjoint of [`super::im2col::im2col`]: the output starts at zero and every
/// patch element is added into the cell it was extracted from. With a stride at least as
/// large as the kernel no cell is shared and folding exactly undoes unfolding.
///
/// Cells are accumulated in the fixed (n, w, h, ch, xx, yy) order, so results repeat
/// bit for bit. A different summation order only guarantees the same real-valued sum.
pub fn col2im(patches: &PatchMatrix, shape: Shape4, geometry: &WindowGeometry, extent: OutputExtent) -> Result<Tensor> {
    let (rows, columns) = geometry.patch_matrix_shape(shape, extent)?;
    if patches.row_count() != rows {
        return Err(LayoutError::ShapeMismatch { what: "patch matrix rows", expected: rows, actual: patches.row_count() });
    }
    if patches.column_count() != columns {
        return Err(LayoutError::ShapeMismatch { what: "patch matrix columns", expected: columns, actual: patches.column_count() });
    }

    tracing::debug!(
        height = shape.height, width = shape.width, channels = shape.channels, batches = shape.batches,
        kernel_height = geometry.kernel_height(), kernel_width = geometry.kernel_width(), stride = geometry.stride(),
        output_height = extent.height, output_width = extent.width,
        "col2im");

    let mut image = Tensor::zeros(shape);
    for n in 0..shape.batches {
        for w in 0..extent.width {
            for h in 0..extent.height {
                let (y, x) = geometry.window_origin(h, w);
                let column = extent.patch_column(h, w, n);
                for channel in 0..shape.channels {
                    for xx in 0..geometry.kernel_width() {
                        for yy in 0..geometry.kernel_height() {
                            let source = patches.flat_index(geometry.patch_row(yy, xx, channel), column);
                            image[shape.flat_index(y + yy, x + xx, channel, n)] += patches[source];
                        }
                    }
                }
            }
        }
    }

    tracing::trace!(len = image.len(), "col2im done");
    Ok(image)
}
