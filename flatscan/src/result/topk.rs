/*
 * Copyright (c) Microsoft Corporation.
 * Licensed under the MIT license.
 */

use std::marker::PhantomData;

use rayon::iter::IndexedParallelIterator;
use rayon::prelude::{ParallelIterator, ParallelSliceMut};

use crate::error::{Error, Result};
use crate::heap::{self, HeapOrder};
use crate::result::{ResultHandler, SingleResultHandler};

/// Caller-provided output buffers for a k-nearest-neighbor search: `nq` heaps of `k`
/// (value, id) slots each, stored row-major.
///
/// After a successful search, row `i` holds the results for query `i` sorted best
/// first (ascending distances for L2², descending similarities for inner product).
/// Queries with fewer than `k` matches pad the tail of their row with the heap
/// sentinel value and id -1.
#[derive(Debug)]
pub struct HeapArray<'a> {
    values: &'a mut [f32],
    ids: &'a mut [i64],
    nq: usize,
    k: usize,
}

impl<'a> HeapArray<'a> {
    /// Wrap caller buffers holding `k` slots per query.
    ///
    /// `values` and `ids` must have the same length, which must be a multiple of `k`.
    pub fn try_new(values: &'a mut [f32], ids: &'a mut [i64], k: usize) -> Result<Self> {
        if k == 0 {
            return Err(Error::ShapeMismatch("heap array requires k > 0".to_string()));
        }
        if values.len() != ids.len() {
            return Err(Error::ShapeMismatch(format!(
                "heap value buffer has length {} but id buffer has length {}",
                values.len(),
                ids.len()
            )));
        }
        if values.len() % k != 0 {
            return Err(Error::ShapeMismatch(format!(
                "heap buffer length {} is not a multiple of k = {}",
                values.len(),
                k
            )));
        }
        let nq = values.len() / k;
        Ok(Self { values, ids, nq, k })
    }

    /// The number of per-query heaps.
    pub fn nq(&self) -> usize {
        self.nq
    }

    /// The number of result slots per query.
    pub fn k(&self) -> usize {
        self.k
    }

    /// The values of row `query`.
    pub fn values_row(&self, query: usize) -> &[f32] {
        &self.values[query * self.k..(query + 1) * self.k]
    }

    /// The ids of row `query`.
    pub fn ids_row(&self, query: usize) -> &[i64] {
        &self.ids[query * self.k..(query + 1) * self.k]
    }
}

/// Top-k collection over a [`HeapArray`], with the eviction polarity `C` chosen at
/// compile time (`Max` for distances, `Min` for similarities).
pub struct TopKResultHandler<'h, 'a, C> {
    heaps: &'h mut HeapArray<'a>,
    i0: usize,
    i1: usize,
    _polarity: PhantomData<C>,
}

impl<'h, 'a, C: HeapOrder> TopKResultHandler<'h, 'a, C> {
    pub fn new(heaps: &'h mut HeapArray<'a>) -> Self {
        Self {
            heaps,
            i0: 0,
            i1: 0,
            _polarity: PhantomData,
        }
    }
}

impl<C: HeapOrder> ResultHandler for TopKResultHandler<'_, '_, C> {
    type Single<'s>
        = TopKSingle<'s, C>
    where
        Self: 's;

    fn single_handlers<'s>(
        &'s mut self,
        i0: usize,
        i1: usize,
    ) -> impl IndexedParallelIterator<Item = TopKSingle<'s, C>> {
        let k = self.heaps.k;
        let values = &mut self.heaps.values[i0 * k..i1 * k];
        let ids = &mut self.heaps.ids[i0 * k..i1 * k];
        values
            .par_chunks_exact_mut(k)
            .zip(ids.par_chunks_exact_mut(k))
            .map(|(values, ids)| TopKSingle {
                values,
                ids,
                threshold: C::NEUTRAL,
                _polarity: PhantomData,
            })
    }

    fn begin_multiple(&mut self, i0: usize, i1: usize) {
        self.i0 = i0;
        self.i1 = i1;
        let k = self.heaps.k;
        for i in i0..i1 {
            heap::heapify::<C>(
                &mut self.heaps.values[i * k..(i + 1) * k],
                &mut self.heaps.ids[i * k..(i + 1) * k],
            );
        }
    }

    fn add_results(&mut self, j0: usize, j1: usize, tile: &[f32]) {
        let k = self.heaps.k;
        let ncols = j1 - j0;
        debug_assert_eq!(tile.len(), (self.i1 - self.i0) * ncols);
        for i in self.i0..self.i1 {
            let line = &tile[(i - self.i0) * ncols..][..ncols];
            let values = &mut self.heaps.values[i * k..(i + 1) * k];
            let ids = &mut self.heaps.ids[i * k..(i + 1) * k];
            let mut threshold = values[0];
            for (jj, &distance) in line.iter().enumerate() {
                if C::cmp(threshold, distance) {
                    heap::replace_top::<C>(values, ids, distance, (j0 + jj) as i64);
                    threshold = values[0];
                }
            }
        }
    }

    fn end_multiple(&mut self) {
        let k = self.heaps.k;
        for i in self.i0..self.i1 {
            heap::reorder::<C>(
                &mut self.heaps.values[i * k..(i + 1) * k],
                &mut self.heaps.ids[i * k..(i + 1) * k],
            );
        }
    }
}

/// A single-query top-k collector bound to one heap row.
pub struct TopKSingle<'s, C> {
    values: &'s mut [f32],
    ids: &'s mut [i64],
    threshold: f32,
    _polarity: PhantomData<C>,
}

impl<C: HeapOrder> SingleResultHandler for TopKSingle<'_, C> {
    fn begin(&mut self) {
        heap::heapify::<C>(self.values, self.ids);
        self.threshold = self.values[0];
    }

    fn add_result(&mut self, distance: f32, id: i64) {
        if C::cmp(self.threshold, distance) {
            heap::replace_top::<C>(self.values, self.ids, distance, id);
            self.threshold = self.values[0];
        }
    }

    fn end(&mut self) {
        heap::reorder::<C>(self.values, self.ids);
    }
}
