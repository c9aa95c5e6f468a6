/*
 * Copyright (c) Microsoft Corporation.
 * Licensed under the MIT license.
 */

//! Result collection for the exhaustive search kernels.
//!
//! Both collection disciplines (bounded top-k heaps and unbounded radius filters)
//! expose the same two interfaces so the scan loops can be shared:
//!
//! * A *single-query* interface used by the direct path. [`ResultHandler::single_handlers`]
//!   splits the handler into one independent [`SingleResultHandler`] per query; each
//!   handler owns a disjoint slice of the caller's output, so worker threads never
//!   contend.
//! * A *block* interface used by the GEMM-tiled path, driven from one thread:
//!   [`ResultHandler::begin_multiple`] opens a query range, [`ResultHandler::add_results`]
//!   absorbs one distance tile, [`ResultHandler::end_multiple`] closes the range.

use rayon::iter::IndexedParallelIterator;

mod topk;
pub use topk::{HeapArray, TopKResultHandler, TopKSingle};

mod range;
pub use range::{Hit, RangeResultHandler, RangeSearchResult, RangeSingle};

/// Collects candidates for one query from one producer thread.
pub trait SingleResultHandler {
    /// Initialize state before the first candidate.
    fn begin(&mut self);

    /// Offer one candidate.
    fn add_result(&mut self, distance: f32, id: i64);

    /// Finalize the query once every candidate has been offered.
    fn end(&mut self);
}

/// Collects candidates for a batch of queries.
pub trait ResultHandler {
    /// The per-query handler type produced by [`single_handlers`](Self::single_handlers).
    type Single<'s>: SingleResultHandler + Send
    where
        Self: 's;

    /// Split queries `i0..i1` into independent per-query handlers, yielded in query
    /// order. The handlers borrow disjoint state and may be driven from different
    /// threads concurrently.
    fn single_handlers<'s>(
        &'s mut self,
        i0: usize,
        i1: usize,
    ) -> impl IndexedParallelIterator<Item = Self::Single<'s>>;

    /// Open the query range `i0..i1` for tile absorption.
    fn begin_multiple(&mut self, i0: usize, i1: usize);

    /// Absorb a `(i1 - i0) x (j1 - j0)` distance tile, row-major in queries. Reported
    /// ids are absolute database indices (`j0` plus the tile-local column).
    fn add_results(&mut self, j0: usize, j1: usize, tile: &[f32]);

    /// Close the currently open query range.
    fn end_multiple(&mut self);

    /// Flush any deferred state into the caller's buffers at end-of-call.
    fn finish(&mut self) {}
}
