use std::ops::{Index, IndexMut};

use crate::error::{LayoutError, Result};

/// Matrix of patches, one patch per column.
/// Unlike most matrices in this crate, this one is column-major:
/// `flat_index(row, column) = row + column * rows`, so each patch is a contiguous slice.
#[derive(PartialEq, Debug, Clone, Default)]
pub struct PatchMatrix {
    rows: usize,
    columns: usize,
    values: Vec<f32>
}

impl Index<usize> for PatchMatrix {
    type Output = f32;

    fn index(&self, index: usize) -> &Self::Output {
        &self.values[index]
    }
}

impl IndexMut<usize> for PatchMatrix {
    fn index_mut(&mut self, index: usize) -> &mut Self::Output {
        &mut self.values[index]
    }
}

impl PatchMatrix {
    /// Returns a new PatchMatrix, failing when values does not hold rows * columns elements.
    pub fn new(rows: usize, columns: usize, values: Vec<f32>) -> Result<Self> {
        if rows == 0 {
            return Err(LayoutError::EmptyDimension { what: "patch matrix rows" });
        }
        if columns == 0 {
            return Err(LayoutError::EmptyDimension { what: "patch matrix columns" });
        }
        let size = rows.checked_mul(columns).ok_or(LayoutError::SizeOverflow { what: "patch matrix size" })?;
        if values.len() != size {
            return Err(LayoutError::ShapeMismatch {
                what: "patch matrix buffer length",
                expected: size,
                actual: values.len(),
            });
        }

        Ok(Self { rows, columns, values })
    }

    pub(crate) fn zeros(rows: usize, columns: usize) -> Self {
        Self { rows, columns, values: vec![0.; rows * columns] }
    }

    /// Returns number of rows (elements per patch).
    pub fn row_count(&self) -> usize { self.rows }

    /// Returns number of columns (patches).
    pub fn column_count(&self) -> usize { self.columns }

    pub fn shape(&self) -> (usize, usize) { (self.rows, self.columns) }

    /// Returns size of underlying vector.
    pub fn len(&self) -> usize { self.values.len() }

    pub fn is_empty(&self) -> bool { self.values.is_empty() }

    pub fn read_values(&self) -> &[f32] { &self.values }

    pub fn into_values(self) -> Vec<f32> { self.values }

    #[inline]
    pub fn flat_index(&self, row: usize, column: usize) -> usize {
        row + column * self.rows
    }

    pub fn at(&self, row: usize, column: usize) -> f32 {
        assert!(row < self.rows && column < self.columns, "Tried to read a cell that was out of bounds.");
        self.values[self.flat_index(row, column)]
    }

    /// Returns the contiguous patch stored in the given column.
    pub fn column(&self, column_index: usize) -> &[f32] {
        assert!(column_index < self.columns, "Tried to get a column that was out of bounds.");

        let start = column_index * self.rows;
        &self.values[start..start + self.rows]
    }
}
