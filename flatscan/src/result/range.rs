/*
 * Copyright (c) Microsoft Corporation.
 * Licensed under the MIT license.
 */

use std::marker::PhantomData;

use rayon::iter::IndexedParallelIterator;
use rayon::prelude::{IntoParallelRefMutIterator, ParallelIterator};

use crate::heap::HeapOrder;
use crate::result::{ResultHandler, SingleResultHandler};

/// A single database entry satisfying a range predicate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hit {
    /// The id of the database entry.
    pub id: i64,

    /// The distance (or similarity) from the query to the entry.
    pub distance: f32,
}

impl Hit {
    pub fn new(id: i64, distance: f32) -> Self {
        Self { id, distance }
    }
}

/// Caller-owned output of a range search: one append-only list of [`Hit`]s per query.
///
/// No ordering is guaranteed between the hits of a query; consumers should treat each
/// list as a multiset.
#[derive(Debug, Default)]
pub struct RangeSearchResult {
    buckets: Vec<Vec<Hit>>,
}

impl RangeSearchResult {
    /// Create an empty result for `nq` queries.
    pub fn new(nq: usize) -> Self {
        Self {
            buckets: vec![Vec::new(); nq],
        }
    }

    /// The number of queries.
    pub fn nq(&self) -> usize {
        self.buckets.len()
    }

    /// The hits recorded for query `query`.
    pub fn query(&self, query: usize) -> &[Hit] {
        &self.buckets[query]
    }

    /// The total number of hits across all queries.
    pub fn total(&self) -> usize {
        self.buckets.iter().map(Vec::len).sum()
    }
}

/// Hits recorded against one block of database columns, grouped by query.
///
/// One shard exists per distinct `j0` so that a query's hits stay grouped by the
/// producing tile even though the tile loop revisits queries once per database block.
#[derive(Debug)]
struct RangePartialResult {
    j0: usize,
    queries: Vec<(usize, Vec<Hit>)>,
}

impl RangePartialResult {
    /// Open a fresh bucket for `query`. Query blocks are disjoint, so a shard sees
    /// each query at most once per search.
    fn new_result(&mut self, query: usize) -> &mut Vec<Hit> {
        let index = self.queries.len();
        self.queries.push((query, Vec::new()));
        &mut self.queries[index].1
    }
}

/// Radius filtering into a [`RangeSearchResult`], with the polarity `C` chosen at
/// compile time: `Max` keeps distances strictly below the radius (L2²), `Min` keeps
/// similarities strictly above it (inner product).
pub struct RangeResultHandler<'r, C> {
    result: &'r mut RangeSearchResult,
    radius: f32,
    i0: usize,
    i1: usize,
    partials: Vec<RangePartialResult>,
    _polarity: PhantomData<C>,
}

impl<'r, C: HeapOrder> RangeResultHandler<'r, C> {
    pub fn new(result: &'r mut RangeSearchResult, radius: f32) -> Self {
        Self {
            result,
            radius,
            i0: 0,
            i1: 0,
            partials: Vec::new(),
            _polarity: PhantomData,
        }
    }
}

impl<C: HeapOrder> ResultHandler for RangeResultHandler<'_, C> {
    type Single<'s>
        = RangeSingle<'s, C>
    where
        Self: 's;

    fn single_handlers<'s>(
        &'s mut self,
        i0: usize,
        i1: usize,
    ) -> impl IndexedParallelIterator<Item = RangeSingle<'s, C>> {
        let radius = self.radius;
        self.result.buckets[i0..i1]
            .par_iter_mut()
            .map(move |bucket| RangeSingle {
                bucket,
                radius,
                _polarity: PhantomData,
            })
    }

    fn begin_multiple(&mut self, i0: usize, i1: usize) {
        self.i0 = i0;
        self.i1 = i1;
    }

    fn add_results(&mut self, j0: usize, j1: usize, tile: &[f32]) {
        let radius = self.radius;
        let (i0, i1) = (self.i0, self.i1);
        let ncols = j1 - j0;
        debug_assert_eq!(tile.len(), (i1 - i0) * ncols);

        // One shard per block of database columns, created on first touch and reused
        // by later query blocks revisiting the same j0.
        let index = match self.partials.iter().position(|p| p.j0 == j0) {
            Some(index) => index,
            None => {
                self.partials.push(RangePartialResult {
                    j0,
                    queries: Vec::new(),
                });
                self.partials.len() - 1
            }
        };
        let shard = &mut self.partials[index];

        for i in i0..i1 {
            let line = &tile[(i - i0) * ncols..][..ncols];
            let bucket = shard.new_result(i);
            for (jj, &distance) in line.iter().enumerate() {
                if C::cmp(radius, distance) {
                    bucket.push(Hit::new((j0 + jj) as i64, distance));
                }
            }
        }
    }

    fn end_multiple(&mut self) {}

    fn finish(&mut self) {
        // Drain shards in insertion order so a query's hits stay grouped by tile.
        for partial in self.partials.drain(..) {
            for (query, hits) in partial.queries {
                self.result.buckets[query].extend(hits);
            }
        }
    }
}

/// A single-query radius collector bound to one result bucket.
pub struct RangeSingle<'s, C> {
    bucket: &'s mut Vec<Hit>,
    radius: f32,
    _polarity: PhantomData<C>,
}

impl<C: HeapOrder> SingleResultHandler for RangeSingle<'_, C> {
    fn begin(&mut self) {}

    fn add_result(&mut self, distance: f32, id: i64) {
        if C::cmp(self.radius, distance) {
            self.bucket.push(Hit::new(id, distance));
        }
    }

    fn end(&mut self) {}
}
