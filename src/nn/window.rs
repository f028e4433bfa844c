use crate::{error::{LayoutError, Result}, geoalg::f32_math::shape::Shape4};

/// Kernel size and stride shared by every window of a transform.
/// The same stride applies along height and width.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WindowGeometry {
    kernel_height: usize,
    kernel_width: usize,
    stride: usize,
}

/// Number of window positions along height and width.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OutputExtent {
    pub height: usize,
    pub width: usize,
}

impl OutputExtent {
    pub fn new(height: usize, width: usize) -> Self {
        Self { height, width }
    }

    /// Column of the patch matrix holding window (h, w) of batch sample n: `h + w*oH + n*oH*oW`.
    #[inline]
    pub fn patch_column(&self, h: usize, w: usize, n: usize) -> usize {
        h + self.height * (w + self.width * n)
    }

    pub fn windows_per_sample(&self) -> usize {
        self.height * self.width
    }

    fn check_nonempty(&self) -> Result<()> {
        if self.height == 0 {
            return Err(LayoutError::EmptyDimension { what: "output height" });
        }
        if self.width == 0 {
            return Err(LayoutError::EmptyDimension { what: "output width" });
        }

        Ok(())
    }
}

impl WindowGeometry {
    pub fn new(kernel_height: usize, kernel_width: usize, stride: usize) -> Result<Self> {
        for (name, value) in [("kernel height", kernel_height), ("kernel width", kernel_width), ("stride", stride)] {
            if value == 0 {
                return Err(LayoutError::DegenerateParameter { name, value });
            }
        }

        Ok(Self { kernel_height, kernel_width, stride })
    }

    /// Square kernel, the common case for pooling.
    pub fn square(kernel: usize, stride: usize) -> Result<Self> {
        Self::new(kernel, kernel, stride)
    }

    pub fn kernel_height(&self) -> usize { self.kernel_height }
    pub fn kernel_width(&self) -> usize { self.kernel_width }
    pub fn stride(&self) -> usize { self.stride }

    /// Elements per window in a single channel.
    pub fn kernel_area(&self) -> usize {
        self.kernel_height * self.kernel_width
    }

    /// Rows of the patch matrix: `kH*kW*C`.
    pub fn patch_len(&self, channels: usize) -> usize {
        self.kernel_area() * channels
    }

    /// Row of the patch matrix holding in-window offset (yy, xx) of the given channel: `yy + xx*kH + ch*kH*kW`.
    #[inline]
    pub fn patch_row(&self, yy: usize, xx: usize, channel: usize) -> usize {
        yy + self.kernel_height * (xx + self.kernel_width * channel)
    }

    /// Top-left (row, column) of window (h, w).
    #[inline]
    pub fn window_origin(&self, h: usize, w: usize) -> (usize, usize) {
        (h * self.stride, w * self.stride)
    }

    /// Derives how many windows fit along each axis, `(H - kH) / S + 1` with floor division.
    pub fn output_extent(&self, height: usize, width: usize) -> Result<OutputExtent> {
        if self.kernel_height > height {
            return Err(LayoutError::WindowOutOfBounds { axis: "height", required: self.kernel_height, extent: height });
        }
        if self.kernel_width > width {
            return Err(LayoutError::WindowOutOfBounds { axis: "width", required: self.kernel_width, extent: width });
        }

        Ok(OutputExtent {
            height: (height - self.kernel_height) / self.stride + 1,
            width: (width - self.kernel_width) / self.stride + 1,
        })
    }

    /// Checks that every window of the extent lies inside the tensor:
    /// `(oH-1)*S + kH <= H` and `(oW-1)*S + kW <= W`.
    /// Also rejects a shape whose element count overflows usize.
    pub fn check_covers(&self, shape: Shape4, extent: OutputExtent) -> Result<()> {
        shape.validate()?;
        extent.check_nonempty()?;

        let axes = [
            ("height", extent.height, self.kernel_height, shape.height),
            ("width", extent.width, self.kernel_width, shape.width),
        ];
        for (axis, windows, kernel, len) in axes {
            let required = (windows - 1).saturating_mul(self.stride).saturating_add(kernel);
            if required > len {
                return Err(LayoutError::WindowOutOfBounds { axis, required, extent: len });
            }
        }

        Ok(())
    }

    /// Checks the windows fit the tensor and returns the patch matrix `(rows, columns)`,
    /// `(kH*kW*C, oH*oW*N)`, failing if the matrix element count overflows usize.
    pub fn patch_matrix_shape(&self, shape: Shape4, extent: OutputExtent) -> Result<(usize, usize)> {
        self.check_covers(shape, extent)?;

        let overflow = LayoutError::SizeOverflow { what: "patch matrix size" };
        let rows = self.kernel_area().checked_mul(shape.channels).ok_or(overflow.clone())?;
        let columns = extent.windows_per_sample().checked_mul(shape.batches).ok_or(overflow.clone())?;
        rows.checked_mul(columns).ok_or(overflow)?;

        Ok((rows, columns))
    }
}
