/*
 * Copyright (c) Microsoft Corporation.
 * Licensed under the MIT license.
 */
//! # flatscan-vector
//!
//! Scalar kernels for dense `f32` vectors: inner product, squared Euclidean
//! distance and L2 norms. These are the per-pair building blocks used by the
//! exhaustive search kernels; batch (matrix-at-a-time) formulations live in
//! the `flatscan` and `flatscan-linalg` crates.
//!
//! All kernels here are pure functions of their arguments and are safe to
//! call concurrently on disjoint (or shared, read-only) data.
#![cfg_attr(
    not(test),
    warn(
        clippy::panic,
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::undocumented_unsafe_blocks
    )
)]

mod traits;
pub use traits::{Norm, PureDistanceFunction};

mod distance;
pub use distance::{InnerProduct, SquaredL2};

mod norm;
pub use norm::{L2Norm, L2NormSquared};
