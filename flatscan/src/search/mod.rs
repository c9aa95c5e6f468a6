/*
 * Copyright (c) Microsoft Corporation.
 * Licensed under the MIT license.
 */

//! Exhaustive k-nearest-neighbor and range search over dense `f32` vectors.
//!
//! The entry points here own the numerical strategy gate: small query batches run the
//! direct per-pair scalar path, large batches reformulate the distance computation as
//! a tiled matrix multiply (see [`crate::config::blas_threshold`]). Both strategies
//! feed the same result handlers and produce equivalent results up to floating-point
//! roundoff.

use flatscan_vector::{InnerProduct, SquaredL2};
use tracing::debug;

use crate::error::{Error, Result};
use crate::heap::{Max, Min};
use crate::interrupt::InterruptCallback;
use crate::pool::RayonThreadPool;
use crate::result::{HeapArray, RangeResultHandler, RangeSearchResult, ResultHandler, TopKResultHandler};
use crate::views::MatrixView;
use crate::config;

mod direct;
pub use direct::exhaustive_direct;

mod gemm;
pub use gemm::{exhaustive_inner_product_gemm, exhaustive_l2sqr_gemm};

mod by_idx;
pub use by_idx::{
    inner_products_by_idx, knn_inner_products_by_idx, knn_l2sqr_by_idx, l2sqr_by_idx,
    pairwise_indexed_inner_product, pairwise_indexed_l2sqr,
};

mod pairwise;
pub use pairwise::pairwise_l2sqr;

/// Find the `k` database rows with the largest inner product against each query.
///
/// Results land in `heaps`, sorted descending per query. `x` and `y` must share a
/// dimension, and `heaps` must have one row per query.
pub fn knn_inner_product<I>(
    x: MatrixView<'_, f32>,
    y: MatrixView<'_, f32>,
    heaps: &mut HeapArray<'_>,
    pool: &RayonThreadPool,
    interrupt: &I,
) -> Result<()>
where
    I: InterruptCallback + ?Sized,
{
    check_query_database(x, y)?;
    check_heaps(x, heaps)?;

    let mut handler = TopKResultHandler::<Min>::new(heaps);
    if x.nrows() < config::blas_threshold() {
        debug!(nx = x.nrows(), ny = y.nrows(), d = x.ncols(), "knn inner product: direct path");
        exhaustive_direct::<InnerProduct, _, _>(x, y, &mut handler, pool, interrupt)?;
    } else {
        debug!(nx = x.nrows(), ny = y.nrows(), d = x.ncols(), "knn inner product: gemm path");
        exhaustive_inner_product_gemm(x, y, &mut handler, interrupt)?;
    }
    handler.finish();
    Ok(())
}

/// Find the `k` database rows closest to each query in squared L2 distance.
///
/// Results land in `heaps`, sorted ascending per query. `y_norms`, when provided,
/// must hold the squared L2 norm of each database row; it is only consulted on the
/// GEMM path, which lets callers amortize the norm computation across searches.
pub fn knn_l2sqr<I>(
    x: MatrixView<'_, f32>,
    y: MatrixView<'_, f32>,
    heaps: &mut HeapArray<'_>,
    y_norms: Option<&[f32]>,
    pool: &RayonThreadPool,
    interrupt: &I,
) -> Result<()>
where
    I: InterruptCallback + ?Sized,
{
    check_query_database(x, y)?;
    check_heaps(x, heaps)?;

    let mut handler = TopKResultHandler::<Max>::new(heaps);
    if x.nrows() < config::blas_threshold() {
        debug!(nx = x.nrows(), ny = y.nrows(), d = x.ncols(), "knn l2sqr: direct path");
        exhaustive_direct::<SquaredL2, _, _>(x, y, &mut handler, pool, interrupt)?;
    } else {
        debug!(nx = x.nrows(), ny = y.nrows(), d = x.ncols(), "knn l2sqr: gemm path");
        exhaustive_l2sqr_gemm(x, y, &mut handler, y_norms, pool, interrupt)?;
    }
    handler.finish();
    Ok(())
}

/// Collect every database row with inner product strictly greater than `radius`
/// against each query.
pub fn range_search_inner_product<I>(
    x: MatrixView<'_, f32>,
    y: MatrixView<'_, f32>,
    radius: f32,
    result: &mut RangeSearchResult,
    pool: &RayonThreadPool,
    interrupt: &I,
) -> Result<()>
where
    I: InterruptCallback + ?Sized,
{
    check_query_database(x, y)?;
    check_range_result(x, result)?;

    let mut handler = RangeResultHandler::<Min>::new(result, radius);
    if x.nrows() < config::blas_threshold() {
        debug!(nx = x.nrows(), ny = y.nrows(), radius, "range inner product: direct path");
        exhaustive_direct::<InnerProduct, _, _>(x, y, &mut handler, pool, interrupt)?;
    } else {
        debug!(nx = x.nrows(), ny = y.nrows(), radius, "range inner product: gemm path");
        exhaustive_inner_product_gemm(x, y, &mut handler, interrupt)?;
    }
    handler.finish();
    Ok(())
}

/// Collect every database row with squared L2 distance strictly less than `radius`
/// from each query.
pub fn range_search_l2sqr<I>(
    x: MatrixView<'_, f32>,
    y: MatrixView<'_, f32>,
    radius: f32,
    result: &mut RangeSearchResult,
    pool: &RayonThreadPool,
    interrupt: &I,
) -> Result<()>
where
    I: InterruptCallback + ?Sized,
{
    check_query_database(x, y)?;
    check_range_result(x, result)?;

    let mut handler = RangeResultHandler::<Max>::new(result, radius);
    if x.nrows() < config::blas_threshold() {
        debug!(nx = x.nrows(), ny = y.nrows(), radius, "range l2sqr: direct path");
        exhaustive_direct::<SquaredL2, _, _>(x, y, &mut handler, pool, interrupt)?;
    } else {
        debug!(nx = x.nrows(), ny = y.nrows(), radius, "range l2sqr: gemm path");
        exhaustive_l2sqr_gemm(x, y, &mut handler, None, pool, interrupt)?;
    }
    handler.finish();
    Ok(())
}

pub(crate) fn check_query_database(x: MatrixView<'_, f32>, y: MatrixView<'_, f32>) -> Result<()> {
    if x.ncols() != y.ncols() {
        return Err(Error::ShapeMismatch(format!(
            "queries have dimension {} but the database has dimension {}",
            x.ncols(),
            y.ncols()
        )));
    }
    Ok(())
}

pub(crate) fn check_heaps(x: MatrixView<'_, f32>, heaps: &HeapArray<'_>) -> Result<()> {
    if heaps.nq() != x.nrows() {
        return Err(Error::ShapeMismatch(format!(
            "heap array holds {} queries but the query batch has {} rows",
            heaps.nq(),
            x.nrows()
        )));
    }
    Ok(())
}

fn check_range_result(x: MatrixView<'_, f32>, result: &RangeSearchResult) -> Result<()> {
    if result.nq() != x.nrows() {
        return Err(Error::ShapeMismatch(format!(
            "range result holds {} queries but the query batch has {} rows",
            result.nq(),
            x.nrows()
        )));
    }
    Ok(())
}
