// Convolution through im2col + matrix multiply, followed by 2x2 max pooling,
// then routes a gradient back through the pooling indices and folds it with col2im.
// RUST_LOG=colfold=debug cargo run --example conv_pool

use colfold::{col2im, im2col, max_pool, OutputExtent, PatchMatrix, Result, Shape4, Tensor, WindowGeometry};
use rand_distr::Uniform;
use tracing_subscriber::EnvFilter;

/// Multiplies row-major filters (filters x patch_len) with the column-major patch matrix.
/// Output is (oH, oW, filters, N), the layout the next layer expects.
fn convolve(patches: &PatchMatrix, filters: &[f32], filter_count: usize, extent: OutputExtent, batches: usize) -> Result<Tensor> {
    let patch_len = patches.row_count();
    let windows = extent.windows_per_sample();

    let mut values = vec![0.; windows * filter_count * batches];
    for column in 0..patches.column_count() {
        let patch = patches.column(column);
        let (window, n) = (column % windows, column / windows);
        for filter in 0..filter_count {
            let weights = &filters[filter * patch_len..(filter + 1) * patch_len];
            let dot: f32 = patch.iter().zip(weights).map(|(a, b)| a * b).sum();
            values[window + windows * (filter + filter_count * n)] = dot;
        }
    }

    Tensor::new(Shape4::new(extent.height, extent.width, filter_count, batches), values)
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let shape = Shape4::new(8, 8, 1, 2);
    let images = Tensor::new_randomized_seeded(shape, Uniform::new(0., 1.), 42)?;

    let filter_count = 4;
    let conv = WindowGeometry::square(3, 1)?;
    let conv_extent = conv.output_extent(shape.height, shape.width)?;
    let filters: Vec<f32> = (0..filter_count * conv.patch_len(shape.channels))
        .map(|i| ((i as f32) * 0.37).sin())
        .collect();

    let patches = im2col(&images, &conv, conv_extent)?;
    let features = convolve(&patches, &filters, filter_count, conv_extent, shape.batches)?;
    println!("patches {:?} -> features {:?}", patches.shape(), features.shape());

    let pool = WindowGeometry::square(2, 2)?;
    let pooled = max_pool(&features, &pool)?;
    println!("pooled {:?}", pooled.values.shape());

    // Pretend the loss gradient is 1 for every pooled value; route it to the winners.
    let mut feature_gradient = vec![0.; features.len()];
    for index in pooled.indices.iter_zero_based() {
        feature_gradient[index] += 1.;
    }
    let routed = feature_gradient.iter().filter(|&&g| g > 0.).count();
    println!("gradient reached {routed} of {} feature cells", features.len());

    // Gradient w.r.t. the image: filters^T x feature_gradient, then fold the patches back.
    let patch_len = patches.row_count();
    let windows = conv_extent.windows_per_sample();
    let mut patch_gradient = vec![0.; patches.len()];
    for column in 0..patches.column_count() {
        let (window, n) = (column % windows, column / windows);
        for filter in 0..filter_count {
            let g = feature_gradient[window + windows * (filter + filter_count * n)];
            for row in 0..patch_len {
                patch_gradient[row + column * patch_len] += g * filters[filter * patch_len + row];
            }
        }
    }

    let patch_gradient = PatchMatrix::new(patch_len, patches.column_count(), patch_gradient)?;
    let image_gradient = col2im(&patch_gradient, shape, &conv, conv_extent)?;
    println!("image gradient {:?}, first sample sum {:.4}",
        image_gradient.shape(),
        image_gradient.batch(0).iter().sum::<f32>());

    Ok(())
}
