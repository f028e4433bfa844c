use std::ops::{Index, IndexMut};

use rand::{rngs::StdRng, SeedableRng};
use rand_distr::{Distribution, Uniform};

use crate::error::{LayoutError, Result};

use super::shape::Shape4;

/// Dense 4D tensor of f32s, (height, width, channels, batches), column-major.
#[derive(Debug, Clone, PartialEq)]
pub struct Tensor {
    shape: Shape4,
    values: Vec<f32>
}

impl Index<usize> for Tensor {
    type Output = f32;

    fn index(&self, index: usize) -> &Self::Output {
        &self.values[index]
    }
}

impl IndexMut<usize> for Tensor {
    fn index_mut(&mut self, index: usize) -> &mut Self::Output {
        &mut self.values[index]
    }
}

impl Tensor {
    /// Creates a new tensor with specified shape.
    /// Fails if any dimension is zero, the element count overflows, or values does not hold exactly that many elements.
    pub fn new(shape: Shape4, values: Vec<f32>) -> Result<Self> {
        let size = shape.validate()?;
        if values.len() != size {
            return Err(LayoutError::ShapeMismatch {
                what: "tensor buffer length",
                expected: size,
                actual: values.len(),
            });
        }

        Ok(Self { shape, values })
    }

    /// Only for shapes the crate has already validated.
    pub(crate) fn zeros(shape: Shape4) -> Self {
        Self { shape, values: vec![0.; shape.size()] }
    }

    pub(crate) fn from_parts(shape: Shape4, values: Vec<f32>) -> Self {
        debug_assert_eq!(values.len(), shape.size());
        Self { shape, values }
    }

    /// Creates a tensor where each element is computed from its (row, column, channel, batch).
    pub fn from_fn(shape: Shape4, f: impl Fn(usize, usize, usize, usize) -> f32) -> Result<Self> {
        let size = shape.validate()?;

        let mut values = Vec::with_capacity(size);
        for batch in 0..shape.batches {
            for channel in 0..shape.channels {
                for column in 0..shape.width {
                    for row in 0..shape.height {
                        values.push(f(row, column, channel, batch));
                    }
                }
            }
        }

        Ok(Self { shape, values })
    }

    /// Returns a tensor filled with values drawn from the uniform distribution.
    pub fn new_randomized_uniform(shape: Shape4, uniform: Uniform<f32>) -> Result<Self> {
        let size = shape.validate()?;
        let mut rng = rand::thread_rng();
        let values = uniform.sample_iter(&mut rng).take(size).collect();

        Self::new(shape, values)
    }

    /// Same as new_randomized_uniform, but reproducible for a given seed.
    pub fn new_randomized_seeded(shape: Shape4, uniform: Uniform<f32>, seed: u64) -> Result<Self> {
        let size = shape.validate()?;
        let rng = StdRng::seed_from_u64(seed);
        let values = uniform.sample_iter(rng).take(size).collect();

        Self::new(shape, values)
    }

    pub fn shape(&self) -> Shape4 { self.shape }

    /// Returns size of underlying vector.
    pub fn len(&self) -> usize { self.values.len() }

    pub fn is_empty(&self) -> bool { self.values.is_empty() }

    pub fn values(&self) -> &[f32] { &self.values }

    pub fn into_values(self) -> Vec<f32> { self.values }

    /// Reads the element at (row, column, channel, batch).
    pub fn at(&self, row: usize, column: usize, channel: usize, batch: usize) -> f32 {
        assert!(self.shape.contains(row, column, channel, batch), "Tried to read a coordinate that was out of bounds.");
        self.values[self.shape.flat_index(row, column, channel, batch)]
    }

    /// Contiguous (H, W, C) slab holding one sample of the batch.
    pub fn batch(&self, batch: usize) -> &[f32] {
        assert!(batch < self.shape.batches, "Tried to get a batch that was out of bounds.");

        let start = batch * self.shape.batch_size();
        &self.values[start..start + self.shape.batch_size()]
    }
}
