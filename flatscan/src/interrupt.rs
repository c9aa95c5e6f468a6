/*
 * Copyright (c) Microsoft Corporation.
 * Licensed under the MIT license.
 */

//! Utilities to support cancelation of long-running searches.

use std::sync::atomic::{AtomicBool, Ordering};

use crate::error::{Error, Result};

/// Provides a means for cancelling long-running searches.
///
/// The kernels poll [`check`](InterruptCallback::check) once per outer work tile, so a
/// search aborts within roughly one tile's latency of the callback flipping.
/// Reasonable implementations of this trait should ensure that once `want_interrupt`
/// returns `true`, all future calls to `want_interrupt` **also** return `true`.
pub trait InterruptCallback: Sync {
    /// Whether the current search should be abandoned.
    fn want_interrupt(&self) -> bool;

    /// Suggested number of queries to process between polls, given the amount of work
    /// (roughly, multiply-adds) each query costs. The default targets a roughly
    /// constant wall-clock polling cadence.
    fn period_hint(&self, work_units: usize) -> usize {
        (100_000_000 / work_units.saturating_add(1)).max(1)
    }

    /// Return `Err(Error::Cancelled)` if the callback requested an interrupt.
    fn check(&self) -> Result<()> {
        if self.want_interrupt() {
            Err(Error::Cancelled)
        } else {
            Ok(())
        }
    }
}

/// A callback that never interrupts.
///
/// The period hint is large enough that the direct path runs as a single tile.
pub struct NoInterrupt;

impl InterruptCallback for NoInterrupt {
    fn want_interrupt(&self) -> bool {
        false
    }

    fn period_hint(&self, _work_units: usize) -> usize {
        1 << 30
    }
}

/// A light-weight interrupt callback based on an `AtomicBool`.
pub struct AtomicInterrupt<'a>(&'a AtomicBool);

impl<'a> AtomicInterrupt<'a> {
    pub fn new(val: &'a AtomicBool) -> Self {
        Self(val)
    }
}

impl InterruptCallback for AtomicInterrupt<'_> {
    fn want_interrupt(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

///////////
// Tests //
///////////
