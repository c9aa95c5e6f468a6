/*
 * Copyright (c) Microsoft Corporation.
 * Licensed under the MIT license.
 */

//! A thin wrapper around a Rayon thread pool.
//!
//! All parallel work in this crate runs through an explicit [`RayonThreadPool`] rather
//! than the global Rayon pool, so callers can bound the search's CPU footprint.

use rayon::iter::ParallelIterator;

use crate::error::{Error, Result};

/// Creates a new thread pool with the specified number of threads.
/// If `num_threads` is 0, it defaults to the number of logical CPUs.
pub fn create_thread_pool(num_threads: usize) -> Result<RayonThreadPool> {
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(num_threads)
        .build()
        .map_err(|err| Error::ThreadPool(err.to_string()))?;
    Ok(RayonThreadPool(pool))
}

pub struct RayonThreadPool(rayon::ThreadPool);

impl RayonThreadPool {
    pub fn install<OP, R>(&self, op: OP) -> R
    where
        OP: FnOnce() -> R + Send,
        R: Send,
    {
        self.0.install(op)
    }

    /// The number of worker threads in the pool.
    pub fn num_threads(&self) -> usize {
        self.0.current_num_threads()
    }
}

// Allow use of disallowed methods within this trait to provide custom
// implementations of common parallel operations that enforce execution
// within a specified thread pool.
#[allow(clippy::disallowed_methods)]
pub trait ParallelIteratorInPool: ParallelIterator + Sized {
    fn for_each_in_pool<OP>(self, pool: &RayonThreadPool, op: OP)
    where
        OP: Fn(Self::Item) + Sync + Send,
    {
        pool.install(|| self.for_each(op));
    }
}

// Implement the `ParallelIteratorInPool` trait for any type that implements
// `ParallelIterator`.
impl<T> ParallelIteratorInPool for T where T: ParallelIterator {}
