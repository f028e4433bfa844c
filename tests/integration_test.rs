use colfold::{col2im, im2col, max_pool, LayoutError, OutputExtent, PatchMatrix, Shape4, Tensor, WindowGeometry};
use rand::{rngs::StdRng, Rng, SeedableRng};
use rand_distr::Uniform;

fn random_tensor(shape: Shape4, seed: u64) -> Tensor {
    Tensor::new_randomized_seeded(shape, Uniform::new_inclusive(-10., 10.), seed).unwrap()
}

/// Random but valid (shape, geometry) pairs.
fn random_cases(count: usize, seed: u64) -> Vec<(Shape4, WindowGeometry)> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..count).map(|_| {
        let kernel_height = rng.gen_range(1..=3);
        let kernel_width = rng.gen_range(1..=3);
        let stride = rng.gen_range(1..=3);
        let shape = Shape4::new(
            rng.gen_range(kernel_height..=kernel_height + 5),
            rng.gen_range(kernel_width..=kernel_width + 5),
            rng.gen_range(1..=3),
            rng.gen_range(1..=3));

        (shape, WindowGeometry::new(kernel_height, kernel_width, stride).unwrap())
    }).collect()
}

/// Whether some window of the extent contains cell (row, column).
fn covered(geometry: &WindowGeometry, extent: OutputExtent, row: usize, column: usize) -> bool {
    (0..extent.height).any(|h| (0..extent.width).any(|w| {
        let (y, x) = geometry.window_origin(h, w);
        (y..y + geometry.kernel_height()).contains(&row) && (x..x + geometry.kernel_width()).contains(&column)
    }))
}

fn assert_approx_eq(a: &[f32], b: &[f32], tol: f32, label: &str) {
    assert_eq!(a.len(), b.len(), "{}: length mismatch {} vs {}", label, a.len(), b.len());
    for (i, (va, vb)) in a.iter().zip(b.iter()).enumerate() {
        assert!((va - vb).abs() <= tol, "{}: mismatch at index {}: {} vs {}", label, i, va, vb);
    }
}

#[test]
fn test_shape_law() {
    for (case, (shape, geometry)) in random_cases(50, 1).into_iter().enumerate() {
        let input = random_tensor(shape, case as u64);
        let extent = geometry.output_extent(shape.height, shape.width).unwrap();

        let patches = im2col(&input, &geometry, extent).unwrap();
        assert_eq!(patches.shape(), (
            geometry.kernel_height() * geometry.kernel_width() * shape.channels,
            extent.height * extent.width * shape.batches));

        let pooled = max_pool(&input, &geometry).unwrap();
        let expected = Shape4::new(extent.height, extent.width, shape.channels, shape.batches);
        assert_eq!(pooled.values.shape(), expected);
        assert_eq!(pooled.indices.shape(), expected);
    }
}

#[test]
fn test_non_overlapping_round_trip_is_exact() {
    let mut rng = StdRng::seed_from_u64(2);
    for case in 0..30 {
        let kernel_height = rng.gen_range(1..=3);
        let kernel_width = rng.gen_range(1..=3);
        let stride = kernel_height.max(kernel_width) + rng.gen_range(0..=1);
        let geometry = WindowGeometry::new(kernel_height, kernel_width, stride).unwrap();

        // Last window ends on the last row and column; any stride beyond the kernel leaves gaps
        let extent = OutputExtent::new(rng.gen_range(1..=4), rng.gen_range(1..=4));
        let shape = Shape4::new(
            (extent.height - 1) * stride + kernel_height,
            (extent.width - 1) * stride + kernel_width,
            rng.gen_range(1..=3),
            rng.gen_range(1..=2));
        let input = random_tensor(shape, 100 + case);

        let patches = im2col(&input, &geometry, extent).unwrap();
        let folded = col2im(&patches, shape, &geometry, extent).unwrap();

        if stride == kernel_height && stride == kernel_width {
            assert_eq!(folded, input, "case {case}");
        }
        for index in 0..shape.size() {
            let (row, column, _, _) = shape.coordinate_of(index);
            if covered(&geometry, extent, row, column) {
                assert_eq!(folded[index], input[index], "case {case} index {index}");
            } else {
                assert_eq!(folded[index], 0., "case {case} index {index}");
            }
        }
    }
}

#[test]
fn test_overlap_counts_covering_windows() {
    let shape = Shape4::new(3, 3, 1, 1);
    let geometry = WindowGeometry::square(2, 1).unwrap();
    let extent = OutputExtent::new(2, 2);
    let ones = PatchMatrix::new(4, 4, vec![1.; 16]).unwrap();

    let folded = col2im(&ones, shape, &geometry, extent).unwrap();

    assert_eq!(folded.at(1, 1, 0, 0), 4.);
    for (r, c) in [(0, 0), (2, 0), (0, 2), (2, 2)] {
        assert_eq!(folded.at(r, c, 0, 0), 1.);
    }
}

#[test]
fn test_extraction_of_first_window() {
    let shape = Shape4::new(4, 4, 1, 1);
    let input = Tensor::from_fn(shape, |r, c, ch, b| shape.flat_index(r, c, ch, b) as f32).unwrap();
    let geometry = WindowGeometry::square(2, 2).unwrap();

    let patches = im2col(&input, &geometry, OutputExtent::new(2, 2)).unwrap();

    assert_eq!(patches.column(0), &[0., 1., 4., 5.]);
}

#[test]
fn test_fold_is_adjoint_of_unfold() {
    // <im2col(x), m> == <x, col2im(m)>
    for (case, (shape, geometry)) in random_cases(40, 3).into_iter().enumerate() {
        let extent = geometry.output_extent(shape.height, shape.width).unwrap();
        let x = random_tensor(shape, 200 + case as u64);

        let rows = geometry.patch_len(shape.channels);
        let columns = extent.windows_per_sample() * shape.batches;
        let mut rng = StdRng::seed_from_u64(300 + case as u64);
        let m_values: Vec<f32> = (0..rows * columns).map(|_| rng.gen_range(-1.0..1.0)).collect();
        let m = PatchMatrix::new(rows, columns, m_values).unwrap();

        let unfolded = im2col(&x, &geometry, extent).unwrap();
        let lhs: f64 = unfolded.read_values().iter().zip(m.read_values()).map(|(a, b)| (*a as f64) * (*b as f64)).sum();

        let folded = col2im(&m, shape, &geometry, extent).unwrap();
        let rhs: f64 = x.values().iter().zip(folded.values()).map(|(a, b)| (*a as f64) * (*b as f64)).sum();

        assert!((lhs - rhs).abs() <= 1e-3 * (1. + lhs.abs()), "case {case}: {lhs} vs {rhs}");
    }
}

#[test]
fn test_max_pool_ties_keep_first() {
    let input = Tensor::new(Shape4::new(2, 2, 1, 1), vec![5., 3., 3., 5.]).unwrap();

    let pooled = max_pool(&input, &WindowGeometry::square(2, 2).unwrap()).unwrap();

    assert_eq!(pooled.values.at(0, 0, 0, 0), 5.);
    assert_eq!(pooled.indices.one_based(0), input.shape().flat_index(0, 0, 0, 0) + 1);
}

#[test]
fn test_argmax_indices_are_valid() {
    for (case, (shape, geometry)) in random_cases(50, 4).into_iter().enumerate() {
        let input = random_tensor(shape, 400 + case as u64);
        let pooled = max_pool(&input, &geometry).unwrap();
        let output = pooled.values.shape();

        for (i, index) in pooled.indices.iter_zero_based().enumerate() {
            assert!(index < input.len(), "case {case}");
            assert_eq!(input[index], pooled.values[i], "case {case}");

            // The winner must sit inside its own window and channel/sample
            let (h, w, ch, n) = output.coordinate_of(i);
            let (r, c, in_ch, in_n) = shape.coordinate_of(index);
            let (y, x) = geometry.window_origin(h, w);
            assert!((y..y + geometry.kernel_height()).contains(&r), "case {case}");
            assert!((x..x + geometry.kernel_width()).contains(&c), "case {case}");
            assert_eq!((in_ch, in_n), (ch, n), "case {case}");
        }
    }
}

#[test]
fn test_max_pool_matches_patch_maxima() {
    // Pooling a single-channel tensor is the column-wise max of its patch matrix.
    let shape = Shape4::new(7, 6, 1, 2);
    let input = random_tensor(shape, 5);
    let geometry = WindowGeometry::new(3, 2, 2).unwrap();
    let extent = geometry.output_extent(shape.height, shape.width).unwrap();

    let patches = im2col(&input, &geometry, extent).unwrap();
    let pooled = max_pool(&input, &geometry).unwrap();

    let expected: Vec<f32> = (0..patches.column_count())
        .map(|column| patches.column(column).iter().cloned().fold(f32::NEG_INFINITY, f32::max))
        .collect();
    assert_approx_eq(pooled.values.values(), &expected, 0., "pooled maxima");
}

#[test]
fn test_bounds_rejection() {
    let shape = Shape4::new(5, 5, 1, 1);
    let input = random_tensor(shape, 6);
    let geometry = WindowGeometry::square(3, 2).unwrap();

    // (2-1)*2+3 = 5 fits, (3-1)*2+3 = 7 does not
    assert!(im2col(&input, &geometry, OutputExtent::new(2, 2)).is_ok());
    assert_eq!(
        im2col(&input, &geometry, OutputExtent::new(3, 2)).unwrap_err(),
        LayoutError::WindowOutOfBounds { axis: "height", required: 7, extent: 5 });

    let patches = PatchMatrix::new(9, 6, vec![0.; 54]).unwrap();
    assert_eq!(
        col2im(&patches, shape, &geometry, OutputExtent::new(2, 3)).unwrap_err(),
        LayoutError::WindowOutOfBounds { axis: "width", required: 7, extent: 5 });
}

#[test]
fn test_inputs_are_not_mutated() {
    let shape = Shape4::new(4, 4, 2, 1);
    let input = random_tensor(shape, 7);
    let before = input.clone();
    let geometry = WindowGeometry::square(2, 1).unwrap();
    let extent = geometry.output_extent(4, 4).unwrap();

    let patches = im2col(&input, &geometry, extent).unwrap();
    let patches_before = patches.clone();
    let _ = col2im(&patches, shape, &geometry, extent).unwrap();
    let _ = max_pool(&input, &geometry).unwrap();

    assert_eq!(input, before);
    assert_eq!(patches, patches_before);
}
