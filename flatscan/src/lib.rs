/*
 * Copyright (c) Microsoft Corporation.
 * Licensed under the MIT license.
 */
//! # flatscan
//!
//! Brute-force (flat) nearest-neighbor and range search over dense `f32` vectors,
//! under squared-L2 distance and inner-product similarity.
//!
//! The crate centers on four entry points ([`knn_inner_product`], [`knn_l2sqr`],
//! [`range_search_inner_product`] and [`range_search_l2sqr`]) that scan a query
//! batch against a database exhaustively. Small batches compute distances pair by
//! pair with the scalar kernels from `flatscan-vector`, parallelized over queries;
//! large batches reformulate the computation as tiled matrix multiplies through
//! `flatscan-linalg`. The crossover and the tile sizes are process-wide tunables in
//! [`config`].
//!
//! Searches run inside an explicit [`RayonThreadPool`] and can be abandoned
//! cooperatively through an [`InterruptCallback`], polled once per work tile.
#![cfg_attr(
    not(test),
    warn(
        clippy::panic,
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::undocumented_unsafe_blocks
    )
)]

pub mod config;
pub mod error;
pub mod heap;
pub mod interrupt;
pub mod norms;
pub mod pool;
pub mod result;
pub mod search;
pub mod views;

pub use error::{Error, Result};
pub use interrupt::{AtomicInterrupt, InterruptCallback, NoInterrupt};
pub use pool::{create_thread_pool, RayonThreadPool};
pub use result::{HeapArray, Hit, RangeSearchResult};
pub use search::{knn_inner_product, knn_l2sqr, range_search_inner_product, range_search_l2sqr};
pub use views::{MatrixView, MatrixViewMut};
