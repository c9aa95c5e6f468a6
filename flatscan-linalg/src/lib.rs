/*
 * Copyright (c) Microsoft Corporation.
 * Licensed under the MIT license.
 */

pub mod common;
pub use common::Transpose;

mod faer;
use faer::{sgemm_impl, sgemm_strided_impl};

/// Matrix-matrix multiplication for implicit row-major matrices `a` and `b` using the
/// implicit row-major matrix `c` as the destination.
///
/// Performs one of the following operations:
/// ```ignore
/// 1. c = [beta * c] + alpha * a * b
/// 2. c = [beta * c] + alpha * a' * b
/// 3. c = [beta * c] + alpha * a * b'
/// 4. c = [beta * c] + alpha * a' * b'
/// ```
/// Where `x'` indicates the ordinary transpose of `x`.
///
/// If `beta` is `None`, the destination `c` is completely over-written.
///
/// * `atranspose`: Whether `a` should be interpreted as an in-place transpose.
/// * `btranspose`: Whether `b` should be interpreted as an in-place transpose.
/// * `m`: The number of rows in `c` (and in `a`, after any transposing).
/// * `n`: The number of columns in `c` (and in `b`, after any transposing).
/// * `k`: The number of columns in `a` and the number of rows in `b`, after any
///   transposing.
/// * `alpha`: Scaling parameter for the operation `a * b`.
/// * `a`: The matrix `a` with dimension `m x k` (potentially after transposing).
/// * `b`: The matrix `b` with dimension `k x n` (potentially after transposing).
/// * `beta`: Optional scaling parameter for the matrix `c`. If `None`, then `c` will be
///   overwritten entirely.
/// * `c`: The output matrix with dimension `m x n`.
///
/// # Note
///
/// This interface is a simplified version of the full cblas `sgemm` interface: it does
/// not support column-major layouts and it requires dense operands. When the operands
/// carry a non-trivial leading dimension, use [`sgemm_strided`] instead.
///
/// # Panics
///
/// Panics if
/// * `a.len() != m * k`
/// * `b.len() != k * n`
/// * `c.len() != m * n`.
#[allow(clippy::too_many_arguments)]
pub fn sgemm(
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
    // Check size requirements.
    assert_eq!(
        a.len(),
        m * k,
        "expected {}x{} matrix `a` to have length {}, instead got {}",
        m,
        k,
        m * k,
        a.len()
    );
    assert_eq!(
        b.len(),
        k * n,
        "expected {}x{} matrix `b` to have length {}, instead got {}",
        k,
        n,
        k * n,
        b.len()
    );
    assert_eq!(
        c.len(),
        m * n,
        "expected {}x{} matrix `c` to have length {}, instead got {}",
        m,
        n,
        m * n,
        c.len()
    );

    // Invoke the actual implementation.
    sgemm_impl(atranspose, btranspose, m, n, k, alpha, a, b, beta, c)
}

/// [`sgemm`] with explicit leading dimensions, in the style of the cblas interface.
///
/// Each operand is stored row-major with consecutive rows spaced `ld*` elements apart,
/// where `ld*` must be at least the stored width of the operand:
///
/// * `a` stores `m x k` rows (or `k x m` when transposed) spaced `lda` apart.
/// * `b` stores `k x n` rows (or `n x k` when transposed) spaced `ldb` apart.
/// * `c` stores `m` rows of `n` columns spaced `ldc` apart.
///
/// The trailing row of each operand only needs to extend to its stored width, not to
/// its leading dimension.
///
/// # Panics
///
/// Panics if any leading dimension is smaller than the stored width of its operand, or
/// if a slice is too short for its stored rows.
#[allow(clippy::too_many_arguments)]
pub fn sgemm_strided(
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
    let (arows, acols) = (atranspose.forward(m, k), atranspose.forward(k, m));
    let (brows, bcols) = (btranspose.forward(k, n), btranspose.forward(n, k));

    // Check stride and size requirements.
    assert!(
        lda >= acols,
        "leading dimension {} of `a` is smaller than its stored width {}",
        lda,
        acols
    );
    assert!(
        ldb >= bcols,
        "leading dimension {} of `b` is smaller than its stored width {}",
        ldb,
        bcols
    );
    assert!(
        ldc >= n,
        "leading dimension {} of `c` is smaller than its stored width {}",
        ldc,
        n
    );
    assert!(
        a.len() >= required_len(arows, acols, lda),
        "matrix `a` with {} stored rows of width {} spaced {} apart needs length {}, got {}",
        arows,
        acols,
        lda,
        required_len(arows, acols, lda),
        a.len()
    );
    assert!(
        b.len() >= required_len(brows, bcols, ldb),
        "matrix `b` with {} stored rows of width {} spaced {} apart needs length {}, got {}",
        brows,
        bcols,
        ldb,
        required_len(brows, bcols, ldb),
        b.len()
    );
    assert!(
        c.len() >= required_len(m, n, ldc),
        "matrix `c` with {} stored rows of width {} spaced {} apart needs length {}, got {}",
        m,
        n,
        ldc,
        required_len(m, n, ldc),
        c.len()
    );

    // Invoke the actual implementation.
    sgemm_strided_impl(
        atranspose, btranspose, m, n, k, alpha, a, lda, b, ldb, beta, c, ldc,
    )
}

fn required_len(rows: usize, cols: usize, ld: usize) -> usize {
    if rows == 0 {
        0
    } else {
        (rows - 1) * ld + cols
    }
}
