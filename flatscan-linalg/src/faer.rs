/*
 * Copyright (c) Microsoft Corporation.
 * Licensed under the MIT license.
 */

use faer::{self, Par};

use super::common::Transpose;

/// See the documentation for `sgemm`.
///
/// The implementation may assume that the specified invariants hold for the sizes of the
/// intermediate arrays.
#[allow(clippy::too_many_arguments)]
pub(super) fn sgemm_impl(
    atranspose: Transpose,
    btranspose: Transpose,
    m: usize,
    n: usize,
    k: usize,
    alpha: f32,
    a: &[f32],
    b: &[f32],
    beta: Option<f32>,
    c: &mut [f32],
) {
    let a = atranspose.call(
        || faer::mat::MatRef::from_row_major_slice(a, m, k),
        || faer::mat::MatRef::from_row_major_slice(a, k, m).transpose(),
    );

    let b = btranspose.call(
        || faer::mat::MatRef::from_row_major_slice(b, k, n),
        || faer::mat::MatRef::from_row_major_slice(b, n, k).transpose(),
    );

    let mut c = faer::mat::MatMut::from_row_major_slice_mut(c, m, n);

    // Faer 0.22+ removed the option to scale by an arbitrary `beta`.
    // Instead, we need to manage it ourselves.
    let beta = match beta {
        Some(scale) => {
            if scale != 1.0 {
                c *= faer::Scale(scale);
            }
            faer::Accum::Add
        }
        None => faer::Accum::Replace,
    };

    faer::linalg::matmul::matmul(c, beta, a, b, alpha, Par::Seq)
}

/// See the documentation for `sgemm_strided`.
///
/// Operands whose leading dimension exceeds their logical width are packed into tight
/// scratch buffers and handed to the dense kernel; tight operands take the allocation-free
/// path directly.
#[allow(clippy::too_many_arguments)]
pub(super) fn sgemm_strided_impl(
    atranspose: Transpose,
    btranspose: Transpose,
    m: usize,
    n: usize,
    k: usize,
    alpha: f32,
    a: &[f32],
    lda: usize,
    b: &[f32],
    ldb: usize,
    beta: Option<f32>,
    c: &mut [f32],
    ldc: usize,
) {
    if m == 0 || n == 0 {
        return;
    }

    let (arows, acols) = (atranspose.forward(m, k), atranspose.forward(k, m));
    let (brows, bcols) = (btranspose.forward(k, n), btranspose.forward(n, k));

    if lda == acols && ldb == bcols && ldc == n {
        return sgemm_impl(
            atranspose,
            btranspose,
            m,
            n,
            k,
            alpha,
            &a[..arows * acols],
            &b[..brows * bcols],
            beta,
            &mut c[..m * n],
        );
    }

    let a_tight = pack(a, arows, acols, lda);
    let b_tight = pack(b, brows, bcols, ldb);
    let mut c_tight = vec![0.0f32; m * n];
    sgemm_impl(
        atranspose,
        btranspose,
        m,
        n,
        k,
        alpha,
        &a_tight,
        &b_tight,
        None,
        &mut c_tight,
    );

    for (i, row) in c_tight.chunks_exact(n).enumerate() {
        let dst = &mut c[i * ldc..i * ldc + n];
        match beta {
            None => dst.copy_from_slice(row),
            Some(scale) => {
                for (d, &s) in dst.iter_mut().zip(row) {
                    *d = scale.mul_add(*d, s);
                }
            }
        }
    }
}

/// Gather `rows` rows of width `cols`, spaced `ld` apart, into a dense buffer.
fn pack(src: &[f32], rows: usize, cols: usize, ld: usize) -> Vec<f32> {
    let mut out = Vec::with_capacity(rows * cols);
    for i in 0..rows {
        out.extend_from_slice(&src[i * ld..i * ld + cols]);
    }
    out
}
