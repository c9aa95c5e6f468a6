/*
 * Copyright (c) Microsoft Corporation.
 * Licensed under the MIT license.
 */

//! Distance computations restricted to caller-selected database rows.
//!
//! Every entry point here treats a negative id as "absent": the corresponding output
//! slot (or heap contribution) is skipped and left untouched. Ids that are
//! non-negative must be valid row indices into their vector set.

use flatscan_vector::{InnerProduct, PureDistanceFunction, SquaredL2};
use rayon::iter::IndexedParallelIterator;
use rayon::prelude::{
    IntoParallelRefIterator, IntoParallelRefMutIterator, ParallelSlice, ParallelSliceMut,
};

use crate::error::{Error, Result};
use crate::heap::{HeapOrder, Max, Min};
use crate::pool::{ParallelIteratorInPool, RayonThreadPool};
use crate::result::{HeapArray, ResultHandler, SingleResultHandler, TopKResultHandler};
use crate::search::{check_heaps, check_query_database};
use crate::views::MatrixView;

/// Compute inner products between each query and a per-query subset of `y`.
///
/// `ids` and `out` are both `nx x ny_sub` row-major: `ids[i * ny_sub + j]` names the
/// `y` row scored into `out[i * ny_sub + j]`. Negative ids are skipped.
pub fn inner_products_by_idx(
    out: &mut [f32],
    x: MatrixView<'_, f32>,
    y: MatrixView<'_, f32>,
    ids: &[i64],
    pool: &RayonThreadPool,
) -> Result<()> {
    distances_by_idx::<InnerProduct>(out, x, y, ids, pool)
}

/// Compute squared L2 distances between each query and a per-query subset of `y`.
///
/// Same layout and negative-id contract as [`inner_products_by_idx`].
pub fn l2sqr_by_idx(
    out: &mut [f32],
    x: MatrixView<'_, f32>,
    y: MatrixView<'_, f32>,
    ids: &[i64],
    pool: &RayonThreadPool,
) -> Result<()> {
    distances_by_idx::<SquaredL2>(out, x, y, ids, pool)
}

fn distances_by_idx<D>(
    out: &mut [f32],
    x: MatrixView<'_, f32>,
    y: MatrixView<'_, f32>,
    ids: &[i64],
    pool: &RayonThreadPool,
) -> Result<()>
where
    D: for<'r> PureDistanceFunction<&'r [f32], &'r [f32]>,
{
    check_query_database(x, y)?;
    let ny_sub = subset_width(out.len(), ids.len(), x.nrows())?;
    if ny_sub == 0 {
        return Ok(());
    }

    out.par_chunks_mut(ny_sub)
        .zip(ids.par_chunks(ny_sub))
        .enumerate()
        .for_each_in_pool(pool, |(i, (out_row, ids_row))| {
            let xi = x.row(i);
            for (value, &id) in out_row.iter_mut().zip(ids_row) {
                if id < 0 {
                    continue;
                }
                *value = D::evaluate(xi, y.row(id as usize));
            }
        });
    Ok(())
}

/// Compute inner products for `n` independent `(ix[j], iy[j])` row pairs.
///
/// Pairs where either index is negative are skipped and their output slot is left
/// untouched.
pub fn pairwise_indexed_inner_product(
    out: &mut [f32],
    x: MatrixView<'_, f32>,
    ix: &[i64],
    y: MatrixView<'_, f32>,
    iy: &[i64],
    pool: &RayonThreadPool,
) -> Result<()> {
    pairwise_indexed::<InnerProduct>(out, x, ix, y, iy, pool)
}

/// Compute squared L2 distances for `n` independent `(ix[j], iy[j])` row pairs.
///
/// Same negative-index contract as [`pairwise_indexed_inner_product`].
pub fn pairwise_indexed_l2sqr(
    out: &mut [f32],
    x: MatrixView<'_, f32>,
    ix: &[i64],
    y: MatrixView<'_, f32>,
    iy: &[i64],
    pool: &RayonThreadPool,
) -> Result<()> {
    pairwise_indexed::<SquaredL2>(out, x, ix, y, iy, pool)
}

fn pairwise_indexed<D>(
    out: &mut [f32],
    x: MatrixView<'_, f32>,
    ix: &[i64],
    y: MatrixView<'_, f32>,
    iy: &[i64],
    pool: &RayonThreadPool,
) -> Result<()>
where
    D: for<'r> PureDistanceFunction<&'r [f32], &'r [f32]>,
{
    check_query_database(x, y)?;
    if out.len() != ix.len() || out.len() != iy.len() {
        return Err(Error::ShapeMismatch(format!(
            "pairwise buffers disagree: {} outputs, {} x-indices, {} y-indices",
            out.len(),
            ix.len(),
            iy.len()
        )));
    }

    out.par_iter_mut()
        .zip(ix.par_iter().zip(iy.par_iter()))
        .for_each_in_pool(pool, |(value, (&i, &j))| {
            if i >= 0 && j >= 0 {
                *value = D::evaluate(x.row(i as usize), y.row(j as usize));
            }
        });
    Ok(())
}

/// Per-query top-k over the `y` subset named by `ids` (layout as in
/// [`inner_products_by_idx`]), with inner-product scoring. Reported ids are the
/// original `y` row indices. Negative ids are skipped.
///
/// This always runs the direct per-pair path; there is no GEMM reformulation for
/// subset scans.
pub fn knn_inner_products_by_idx(
    x: MatrixView<'_, f32>,
    y: MatrixView<'_, f32>,
    ids: &[i64],
    heaps: &mut HeapArray<'_>,
    pool: &RayonThreadPool,
) -> Result<()> {
    knn_by_idx::<InnerProduct, Min>(x, y, ids, heaps, pool)
}

/// Per-query top-k over the `y` subset named by `ids`, with squared-L2 scoring.
///
/// Same contract as [`knn_inner_products_by_idx`], including the negative-id skip.
pub fn knn_l2sqr_by_idx(
    x: MatrixView<'_, f32>,
    y: MatrixView<'_, f32>,
    ids: &[i64],
    heaps: &mut HeapArray<'_>,
    pool: &RayonThreadPool,
) -> Result<()> {
    knn_by_idx::<SquaredL2, Max>(x, y, ids, heaps, pool)
}

fn knn_by_idx<D, C>(
    x: MatrixView<'_, f32>,
    y: MatrixView<'_, f32>,
    ids: &[i64],
    heaps: &mut HeapArray<'_>,
    pool: &RayonThreadPool,
) -> Result<()>
where
    D: for<'r> PureDistanceFunction<&'r [f32], &'r [f32]>,
    C: HeapOrder,
{
    check_query_database(x, y)?;
    check_heaps(x, heaps)?;
    let nx = x.nrows();
    let ny_sub = subset_width(ids.len(), ids.len(), nx)?;

    let mut handler = TopKResultHandler::<C>::new(heaps);
    if ny_sub == 0 {
        // No candidates: the heaps still need their sentinel contents.
        handler.single_handlers(0, nx).for_each_in_pool(pool, |mut single| {
            single.begin();
            single.end();
        });
        return Ok(());
    }

    handler
        .single_handlers(0, nx)
        .zip(ids.par_chunks(ny_sub))
        .enumerate()
        .for_each_in_pool(pool, |(i, (mut single, ids_row))| {
            let xi = x.row(i);
            single.begin();
            for &id in ids_row {
                if id < 0 {
                    continue;
                }
                single.add_result(D::evaluate(xi, y.row(id as usize)), id);
            }
            single.end();
        });
    Ok(())
}

/// The per-query subset width shared by an output-like buffer and the id list.
fn subset_width(out_len: usize, ids_len: usize, nx: usize) -> Result<usize> {
    if out_len != ids_len {
        return Err(Error::ShapeMismatch(format!(
            "output buffer has length {out_len} but the id list has length {ids_len}"
        )));
    }
    if nx == 0 {
        if out_len != 0 {
            return Err(Error::ShapeMismatch(format!(
                "id list has length {ids_len} but there are no queries"
            )));
        }
        return Ok(0);
    }
    if out_len % nx != 0 {
        return Err(Error::ShapeMismatch(format!(
            "id list length {ids_len} is not a multiple of the {nx} queries"
        )));
    }
    Ok(out_len / nx)
}
