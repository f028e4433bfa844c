use crate::error::{LayoutError, Result};

/// Dimensions of a 4D tensor laid out as (height, width, channels, batches).
/// Height varies fastest in memory, batches slowest (column-major).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Shape4 {
    pub height: usize,
    pub width: usize,
    pub channels: usize,
    pub batches: usize,
}

impl Shape4 {
    pub fn new(height: usize, width: usize, channels: usize, batches: usize) -> Self {
        Self { height, width, channels, batches }
    }

    /// Gets total number of elements described by shape.
    /// Only meaningful for shapes that passed [`Shape4::validate`].
    pub fn size(&self) -> usize {
        self.height * self.width * self.channels * self.batches
    }

    /// Total number of elements, or an error when the count does not fit in usize.
    pub fn try_size(&self) -> Result<usize> {
        self.dims()
            .into_iter()
            .try_fold(1usize, |size, len| size.checked_mul(len))
            .ok_or(LayoutError::SizeOverflow { what: "tensor size" })
    }

    pub fn dims(&self) -> [usize; 4] {
        [self.height, self.width, self.channels, self.batches]
    }

    /// Distance in the flat buffer between neighbours along each axis.
    pub fn strides(&self) -> [usize; 4] {
        let h = self.height;
        let hw = h * self.width;
        [1, h, hw, hw * self.channels]
    }

    /// Number of elements in one batch slab, (H, W, C).
    pub fn batch_size(&self) -> usize {
        self.height * self.width * self.channels
    }

    /// Flat offset of (row, column, channel, batch): `r + c*H + ch*H*W + b*H*W*C`.
    /// Every transform in the crate goes through here.
    #[inline]
    pub fn flat_index(&self, row: usize, column: usize, channel: usize, batch: usize) -> usize {
        debug_assert!(self.contains(row, column, channel, batch), "Coordinate outside of shape bounds.");
        row + self.height * (column + self.width * (channel + self.channels * batch))
    }

    /// Inverse of [`Shape4::flat_index`].
    pub fn coordinate_of(&self, index: usize) -> (usize, usize, usize, usize) {
        assert!(index < self.size(), "Index {index} outside of shape with size {}.", self.size());
        let row = index % self.height;
        let rest = index / self.height;
        let column = rest % self.width;
        let rest = rest / self.width;
        let channel = rest % self.channels;
        let batch = rest / self.channels;

        (row, column, channel, batch)
    }

    pub fn contains(&self, row: usize, column: usize, channel: usize, batch: usize) -> bool {
        row < self.height && column < self.width && channel < self.channels && batch < self.batches
    }

    /// Rejects shapes with any zero dimension or an element count that overflows usize.
    /// Returns the element count on success.
    pub fn validate(&self) -> Result<usize> {
        let names = ["height", "width", "channels", "batches"];
        for (what, len) in names.into_iter().zip(self.dims()) {
            if len == 0 {
                return Err(LayoutError::EmptyDimension { what });
            }
        }

        self.try_size()
    }
}

#[cfg(test)]
mod tests {
    use crate::error::LayoutError;

    use super::Shape4;

    #[test]
    fn test_strides() {
        let shape = Shape4::new(5, 4, 3, 2);

        assert_eq!(shape.strides(), [1, 5, 20, 60]);
        assert_eq!(shape.size(), 120);
        assert_eq!(shape.batch_size(), 60);
    }

    #[test]
    fn test_flat_index() {
        let shape = Shape4::new(100, 30, 14, 500);

        // 1 + 4*100 + 7*100*30 + 8*100*30*14 = 357401
        let actual = shape.flat_index(1, 4, 7, 8);
        assert_eq!(actual, 357401);

        let [s0, s1, s2, s3] = shape.strides();
        assert_eq!(actual, 1 * s0 + 4 * s1 + 7 * s2 + 8 * s3);
    }

    #[test]
    fn test_coordinate_of_inverts_flat_index() {
        let shape = Shape4::new(3, 4, 2, 2);

        for index in 0..shape.size() {
            let (r, c, ch, b) = shape.coordinate_of(index);
            assert_eq!(shape.flat_index(r, c, ch, b), index);
        }
    }

    #[test]
    #[should_panic]
    fn test_coordinate_of_out_of_range() {
        Shape4::new(2, 2, 1, 1).coordinate_of(4);
    }

    #[test]
    fn test_validate() {
        assert_eq!(Shape4::new(2, 3, 1, 4).validate(), Ok(24));

        let err = Shape4::new(2, 2, 0, 1).validate().unwrap_err();
        assert_eq!(err, LayoutError::EmptyDimension { what: "channels" });
    }

    #[test]
    #[cfg(target_pointer_width = "64")]
    fn test_validate_rejects_overflowing_size() {
        let shape = Shape4::new(1 << 33, 1 << 31, 1, 1);

        assert_eq!(shape.try_size(), Err(LayoutError::SizeOverflow { what: "tensor size" }));
        assert_eq!(shape.validate(), Err(LayoutError::SizeOverflow { what: "tensor size" }));
    }
}
