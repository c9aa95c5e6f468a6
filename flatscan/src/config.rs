/*
 * Copyright (c) Microsoft Corporation.
 * Licensed under the MIT license.
 */

//! Process-wide tunables for the exhaustive search kernels.
//!
//! Each knob is read once at the start of a call, so changing a value mid-call does not
//! affect searches already in flight.

use std::sync::atomic::{AtomicUsize, Ordering};

static BLAS_THRESHOLD: AtomicUsize = AtomicUsize::new(20);
static BLAS_QUERY_BLOCK_SIZE: AtomicUsize = AtomicUsize::new(4096);
static BLAS_DATABASE_BLOCK_SIZE: AtomicUsize = AtomicUsize::new(1024);

/// Query-count threshold for switching from the direct path to the GEMM-tiled path.
///
/// Batches with fewer than this many queries use pairwise scalar kernels; larger
/// batches reformulate the distance computation as a matrix multiply.
pub fn blas_threshold() -> usize {
    BLAS_THRESHOLD.load(Ordering::Relaxed)
}

/// Set the query-count threshold for the GEMM-tiled path.
pub fn set_blas_threshold(threshold: usize) {
    BLAS_THRESHOLD.store(threshold, Ordering::Relaxed);
}

/// Number of query rows per tile on the GEMM-tiled path.
pub fn blas_query_block_size() -> usize {
    BLAS_QUERY_BLOCK_SIZE.load(Ordering::Relaxed)
}

/// Set the number of query rows per tile on the GEMM-tiled path.
pub fn set_blas_query_block_size(block_size: usize) {
    BLAS_QUERY_BLOCK_SIZE.store(block_size.max(1), Ordering::Relaxed);
}

/// Number of database rows per tile on the GEMM-tiled path.
pub fn blas_database_block_size() -> usize {
    BLAS_DATABASE_BLOCK_SIZE.load(Ordering::Relaxed)
}

/// Set the number of database rows per tile on the GEMM-tiled path.
pub fn set_blas_database_block_size(block_size: usize) {
    BLAS_DATABASE_BLOCK_SIZE.store(block_size.max(1), Ordering::Relaxed);
}
