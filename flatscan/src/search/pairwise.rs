/*
 * Copyright (c) Microsoft Corporation.
 * Licensed under the MIT license.
 */

use flatscan_linalg::{sgemm_strided, Transpose};
use flatscan_vector::{L2NormSquared, Norm};
use rayon::iter::IndexedParallelIterator;
use rayon::prelude::{IntoParallelRefMutIterator, ParallelSliceMut};

use crate::error::{Error, Result};
use crate::pool::{ParallelIteratorInPool, RayonThreadPool};

/// Compute the full `nq x nb` matrix of squared L2 distances between the rows of `xq`
/// and the rows of `xb`, via one GEMM.
///
/// Rows of `xq`, `xb` and `dis` are spaced `ldq`, `ldb` and `ldd` elements apart;
/// `None` selects the tight packing (`d`, `d` and `nb` respectively). The distance
/// matrix is preloaded with `|xq[i]|^2 + |xb[j]|^2` (database norms are staged in its
/// first row to avoid a scratch allocation) and the cross terms are then folded in
/// with a single `alpha = -2, beta = 1` GEMM.
///
/// Unlike the search paths, values are reported exactly as computed: tiny negative
/// results from floating-point cancellation are *not* clamped.
#[allow(clippy::too_many_arguments)]
pub fn pairwise_l2sqr(
    xq: &[f32],
    xb: &[f32],
    dis: &mut [f32],
    d: usize,
    nq: usize,
    nb: usize,
    ldq: Option<usize>,
    ldb: Option<usize>,
    ldd: Option<usize>,
    pool: &RayonThreadPool,
) -> Result<()> {
    if nq == 0 || nb == 0 {
        return Ok(());
    }
    let ldq = ldq.unwrap_or(d);
    let ldb = ldb.unwrap_or(d);
    let ldd = ldd.unwrap_or(nb);

    check_stride("query", ldq, d)?;
    check_stride("database", ldb, d)?;
    check_stride("distance", ldd, nb)?;
    check_len("query", xq.len(), nq, d, ldq)?;
    check_len("database", xb.len(), nb, d, ldb)?;
    check_len("distance", dis.len(), nq, nb, ldd)?;

    // Stage the database norms in the first output row to avoid a scratch allocation.
    let (first, rest) = dis.split_at_mut(ldd.min(dis.len()));
    first[..nb]
        .par_iter_mut()
        .enumerate()
        .for_each_in_pool(pool, |(j, value)| {
            *value = (L2NormSquared).evaluate(&xb[j * ldb..j * ldb + d]);
        });

    // Rows 1.. read the staged norms while adding their own query norm.
    let b_norms = &first[..nb];
    rest.par_chunks_mut(ldd)
        .take(nq - 1)
        .enumerate()
        .for_each_in_pool(pool, |(i, row)| {
            let q = i + 1;
            let q_norm = (L2NormSquared).evaluate(&xq[q * ldq..q * ldq + d]);
            for (value, &b_norm) in row[..nb].iter_mut().zip(b_norms) {
                *value = q_norm + b_norm;
            }
        });

    // Row 0 last, once nothing reads the staged norms anymore.
    let q_norm = (L2NormSquared).evaluate(&xq[..d]);
    for value in &mut first[..nb] {
        *value += q_norm;
    }

    sgemm_strided(
        Transpose::None,
        Transpose::Ordinary,
        nq,
        nb,
        d,
        -2.0,
        xq,
        ldq,
        xb,
        ldb,
        Some(1.0),
        dis,
        ldd,
    );
    Ok(())
}

fn check_stride(name: &str, ld: usize, width: usize) -> Result<()> {
    if ld < width {
        return Err(Error::ShapeMismatch(format!(
            "{name} stride {ld} is smaller than the row width {width}"
        )));
    }
    Ok(())
}

fn check_len(name: &str, len: usize, rows: usize, width: usize, ld: usize) -> Result<()> {
    let required = (rows - 1) * ld + width;
    if len < required {
        return Err(Error::ShapeMismatch(format!(
            "{name} buffer has length {len} but {rows} rows spaced {ld} apart need {required}"
        )));
    }
    Ok(())
}
