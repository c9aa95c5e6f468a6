/*
 * Copyright (c) Microsoft Corporation.
 * Licensed under the MIT license.
 */

use flatscan_linalg::{sgemm, Transpose};

use crate::error::{Error, Result};
use crate::interrupt::InterruptCallback;
use crate::pool::RayonThreadPool;
use crate::result::ResultHandler;
use crate::search::check_query_database;
use crate::views::MatrixView;
use crate::{config, norms};

/// Inner-product search reformulated as a tiled matrix multiply.
///
/// Each `bs_x x bs_y` tile of the similarity matrix is computed with one GEMM call and
/// handed to the handler's block interface. The GEMM and the tile consumption both run
/// on the calling thread.
pub fn exhaustive_inner_product_gemm<H, I>(
    x: MatrixView<'_, f32>,
    y: MatrixView<'_, f32>,
    handler: &mut H,
    interrupt: &I,
) -> Result<()>
where
    H: ResultHandler,
    I: InterruptCallback + ?Sized,
{
    exhaustive_gemm_tiles(x, y, handler, interrupt, |_i0, _i1, _j0, _j1, _block| {})
}

/// Squared-L2 search reformulated as a tiled matrix multiply.
///
/// Uses the identity `|x - y|^2 = |x|^2 + |y|^2 - 2<x, y>`. Query norms are always
/// computed per call; database norms are reused from `y_norms` when provided (their
/// values must be the squared L2 norms of the rows of `y`). Negative distances from
/// floating-point cancellation are clamped to 0 before they reach the handler, so
/// downstream consumers can assume non-negativity.
pub fn exhaustive_l2sqr_gemm<H, I>(
    x: MatrixView<'_, f32>,
    y: MatrixView<'_, f32>,
    handler: &mut H,
    y_norms: Option<&[f32]>,
    pool: &RayonThreadPool,
    interrupt: &I,
) -> Result<()>
where
    H: ResultHandler,
    I: InterruptCallback + ?Sized,
{
    check_query_database(x, y)?;
    let (nx, ny) = (x.nrows(), y.nrows());
    if nx == 0 || ny == 0 {
        return Ok(());
    }

    let mut x_norms = vec![0.0f32; nx];
    norms::norms_l2sqr(&mut x_norms, x, pool)?;

    let owned_y_norms;
    let y_norms = match y_norms {
        Some(norms) => {
            if norms.len() != ny {
                return Err(Error::ShapeMismatch(format!(
                    "database norm cache has length {} but the database has {} rows",
                    norms.len(),
                    ny
                )));
            }
            norms
        }
        None => {
            let mut computed = vec![0.0f32; ny];
            norms::norms_l2sqr(&mut computed, y, pool)?;
            owned_y_norms = computed;
            &owned_y_norms
        }
    };

    exhaustive_gemm_tiles(x, y, handler, interrupt, |i0, _i1, j0, j1, block| {
        let ncols = j1 - j0;
        for (ii, line) in block.chunks_exact_mut(ncols).enumerate() {
            let x_norm = x_norms[i0 + ii];
            for (jj, value) in line.iter_mut().enumerate() {
                let dis = x_norm + y_norms[j0 + jj] - 2.0 * *value;
                // Negative values can occur for identical vectors due to roundoff.
                *value = if dis < 0.0 { 0.0 } else { dis };
            }
        }
    })
}

/// The shared tile loop: for each query block, compute `X[i0..i1] * Y[j0..j1]'` into a
/// reusable buffer, let `transform` rewrite the tile in place, and hand it to the
/// handler. The interrupt is polled once per query block.
fn exhaustive_gemm_tiles<H, I, F>(
    x: MatrixView<'_, f32>,
    y: MatrixView<'_, f32>,
    handler: &mut H,
    interrupt: &I,
    mut transform: F,
) -> Result<()>
where
    H: ResultHandler,
    I: InterruptCallback + ?Sized,
    F: FnMut(usize, usize, usize, usize, &mut [f32]),
{
    check_query_database(x, y)?;
    let (nx, ny, d) = (x.nrows(), y.nrows(), x.ncols());
    if nx == 0 || ny == 0 {
        return Ok(());
    }

    let bs_x = config::blas_query_block_size().min(nx);
    let bs_y = config::blas_database_block_size().min(ny);
    let mut tile = vec![0.0f32; bs_x * bs_y];

    for i0 in (0..nx).step_by(bs_x) {
        let i1 = (i0 + bs_x).min(nx);
        let m = i1 - i0;
        handler.begin_multiple(i0, i1);

        for j0 in (0..ny).step_by(bs_y) {
            let j1 = (j0 + bs_y).min(ny);
            let n = j1 - j0;
            let block = &mut tile[..m * n];

            // block = X[i0..i1] * Y[j0..j1]', queries as the slow axis.
            sgemm(
                Transpose::None,
                Transpose::Ordinary,
                m,
                n,
                d,
                1.0,
                &x.as_slice()[i0 * d..i1 * d],
                &y.as_slice()[j0 * d..j1 * d],
                None,
                block,
            );

            transform(i0, i1, j0, j1, block);
            handler.add_results(j0, j1, block);
        }

        handler.end_multiple();
        interrupt.check()?;
    }
    Ok(())
}
