/*
 * Copyright (c) Microsoft Corporation.
 * Licensed under the MIT license.
 */

//! Batch norm computations over row-major vector sets.

use flatscan_vector::{L2Norm, L2NormSquared, Norm};
use rayon::prelude::{
    IndexedParallelIterator, IntoParallelRefIterator, IntoParallelRefMutIterator, ParallelSliceMut,
};

use crate::error::{Error, Result};
use crate::pool::{ParallelIteratorInPool, RayonThreadPool};
use crate::views::{MatrixView, MatrixViewMut};

/// Compute the squared L2 norm of every row of `x` into `out`.
///
/// `out` must have exactly one slot per row of `x`. Every output is >= 0.
pub fn norms_l2sqr(out: &mut [f32], x: MatrixView<'_, f32>, pool: &RayonThreadPool) -> Result<()> {
    check_one_per_row(out.len(), x.nrows())?;

    // Tiny rows are not worth shipping to the pool.
    if x.ncols() < 5 {
        for (value, row) in out.iter_mut().zip(x.row_iter()) {
            *value = (L2NormSquared).evaluate(row);
        }
    } else {
        out.par_iter_mut()
            .enumerate()
            .for_each_in_pool(pool, |(i, value)| {
                *value = (L2NormSquared).evaluate(x.row(i));
            });
    }
    Ok(())
}

/// Compute the L2 norm of every row of `x` into `out`.
pub fn norms_l2(out: &mut [f32], x: MatrixView<'_, f32>, pool: &RayonThreadPool) -> Result<()> {
    check_one_per_row(out.len(), x.nrows())?;

    if x.ncols() < 5 {
        for (value, row) in out.iter_mut().zip(x.row_iter()) {
            *value = (L2Norm).evaluate(row);
        }
    } else {
        out.par_iter_mut()
            .enumerate()
            .for_each_in_pool(pool, |(i, value)| {
                *value = (L2Norm).evaluate(x.row(i));
            });
    }
    Ok(())
}

/// Scale every row of `x` to unit L2 norm, in place. Rows with zero norm are left
/// untouched. Does not allocate.
pub fn renorm_l2(mut x: MatrixViewMut<'_, f32>, pool: &RayonThreadPool) {
    let d = x.ncols();
    if d == 0 || x.nrows() == 0 {
        return;
    }
    x.as_mut_slice()
        .par_chunks_exact_mut(d)
        .for_each_in_pool(pool, |row| {
            let norm = (L2NormSquared).evaluate(&*row);
            if norm > 0.0 {
                let inv = 1.0 / norm.sqrt();
                for value in row {
                    *value *= inv;
                }
            }
        });
}

/// Transform a precomputed inner-product matrix into squared L2 distances, in place:
/// `dis[i][j] = nr1[i] + nr2[j] - 2 * dis[i][j]`.
///
/// `dis` is `nr1.len() x nr2.len()` row-major. Negative results from floating-point
/// cancellation are clamped to 0.
pub fn inner_product_to_l2sqr(
    dis: &mut [f32],
    nr1: &[f32],
    nr2: &[f32],
    pool: &RayonThreadPool,
) -> Result<()> {
    if dis.len() != nr1.len() * nr2.len() {
        return Err(Error::ShapeMismatch(format!(
            "distance matrix of length {} cannot hold {} x {} entries",
            dis.len(),
            nr1.len(),
            nr2.len()
        )));
    }
    if nr2.is_empty() {
        return Ok(());
    }

    dis.par_chunks_exact_mut(nr2.len())
        .zip(nr1.par_iter())
        .for_each_in_pool(pool, |(row, &norm1)| {
            for (value, &norm2) in row.iter_mut().zip(nr2) {
                let dis = norm1 + norm2 - 2.0 * *value;
                *value = if dis < 0.0 { 0.0 } else { dis };
            }
        });
    Ok(())
}

fn check_one_per_row(out_len: usize, nrows: usize) -> Result<()> {
    if out_len != nrows {
        return Err(Error::ShapeMismatch(format!(
            "norm buffer has length {out_len} but the vector set has {nrows} rows"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use rand::{
        distr::{Distribution, Uniform},
        rngs::StdRng,
        SeedableRng,
    };

    use crate::pool::create_thread_pool;

    use super::*;

    fn integer_valued(rng: &mut StdRng, len: usize) -> Vec<f32> {
        let distribution = Uniform::<i64>::new(-16, 16).unwrap();
        (0..len).map(|_| distribution.sample(rng) as f32).collect()
    }

    #[test]
    fn test_norms_l2sqr() {
        let pool = create_thread_pool(2).unwrap();
        let mut rng = StdRng::seed_from_u64(0x7be4d21f0931cc55);
        for (n, d) in [(3, 2), (5, 16), (1, 33), (0, 4)] {
            let data = integer_valued(&mut rng, n * d);
            let x = MatrixView::try_from(&data, n, d).unwrap();

            let mut out = vec![0.0f32; n];
            norms_l2sqr(&mut out, x, &pool).unwrap();

            for (i, &norm) in out.iter().enumerate() {
                let expected: f32 = x.row(i).iter().map(|v| v * v).sum();
                assert_eq!(norm, expected);
                assert!(norm >= 0.0);
            }

            let mut sqrts = vec![0.0f32; n];
            norms_l2(&mut sqrts, x, &pool).unwrap();
            for (a, b) in sqrts.iter().zip(&out) {
                assert_eq!(*a, b.sqrt());
            }
        }
    }

    #[test]
    fn test_norms_shape_mismatch() {
        let pool = create_thread_pool(1).unwrap();
        let data = [0.0f32; 6];
        let x = MatrixView::try_from(&data, 3, 2).unwrap();
        let mut out = vec![0.0f32; 2];
        assert!(norms_l2sqr(&mut out, x, &pool).is_err());
    }

    #[test]
    fn test_renorm_l2() {
        let pool = create_thread_pool(2).unwrap();
        let mut data = vec![3.0f32, 4.0, 0.0, 0.0];
        renorm_l2(MatrixViewMut::try_from(&mut data, 2, 2).unwrap(), &pool);
        assert_relative_eq!(data[0], 0.6, epsilon = 1e-6);
        assert_relative_eq!(data[1], 0.8, epsilon = 1e-6);
        // The zero row must not become NaN.
        assert_eq!(&data[2..], &[0.0, 0.0]);
    }

    #[test]
    fn test_renorm_l2_is_idempotent() {
        let pool = create_thread_pool(2).unwrap();
        let mut rng = StdRng::seed_from_u64(0x3fd1a6b90c47e812);
        let mut data = integer_valued(&mut rng, 6 * 8);
        renorm_l2(MatrixViewMut::try_from(&mut data, 6, 8).unwrap(), &pool);
        let once = data.clone();
        renorm_l2(MatrixViewMut::try_from(&mut data, 6, 8).unwrap(), &pool);

        for (a, b) in data.iter().zip(&once) {
            assert_relative_eq!(*a, *b, epsilon = 1e-6);
        }
        for row in data.chunks_exact(8) {
            let norm: f32 = row.iter().map(|v| v * v).sum();
            if norm > 0.0 {
                assert_relative_eq!(norm, 1.0, epsilon = 1e-5);
            }
        }
    }

    #[test]
    fn test_inner_product_to_l2sqr_matches_direct_distances() {
        let pool = create_thread_pool(2).unwrap();
        let mut rng = StdRng::seed_from_u64(0x94ab7e5fd210c383);
        let (n1, n2, d) = (4, 6, 12);
        let a = integer_valued(&mut rng, n1 * d);
        let b = integer_valued(&mut rng, n2 * d);
        let x = MatrixView::try_from(&a, n1, d).unwrap();
        let y = MatrixView::try_from(&b, n2, d).unwrap();

        let mut dis: Vec<f32> = (0..n1 * n2)
            .map(|idx| {
                let (i, j) = (idx / n2, idx % n2);
                x.row(i).iter().zip(y.row(j)).map(|(p, q)| p * q).sum()
            })
            .collect();

        let mut nr1 = vec![0.0f32; n1];
        let mut nr2 = vec![0.0f32; n2];
        norms_l2sqr(&mut nr1, x, &pool).unwrap();
        norms_l2sqr(&mut nr2, y, &pool).unwrap();

        inner_product_to_l2sqr(&mut dis, &nr1, &nr2, &pool).unwrap();

        for i in 0..n1 {
            for j in 0..n2 {
                let expected: f32 = x
                    .row(i)
                    .iter()
                    .zip(y.row(j))
                    .map(|(p, q)| {
                        let diff = p - q;
                        diff * diff
                    })
                    .sum();
                assert_eq!(dis[i * n2 + j], expected);
                assert!(dis[i * n2 + j] >= 0.0);
            }
        }
    }
}
