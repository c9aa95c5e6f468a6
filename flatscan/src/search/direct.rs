/*
 * Copyright (c) Microsoft Corporation.
 * Licensed under the MIT license.
 */

use flatscan_vector::PureDistanceFunction;
use rayon::iter::IndexedParallelIterator;

use crate::error::Result;
use crate::interrupt::InterruptCallback;
use crate::pool::{ParallelIteratorInPool, RayonThreadPool};
use crate::result::{ResultHandler, SingleResultHandler};
use crate::search::check_query_database;
use crate::views::MatrixView;

/// Scan every (query, database) pair with the scalar kernel `D`, feeding one
/// [`SingleResultHandler`] per query.
///
/// Queries are processed in tiles sized by the interrupt's period hint; the hint is
/// scaled by the pool width so each worker sees a full share of queries between
/// polls. Within a tile, workers fan out over queries with no shared mutable state.
pub fn exhaustive_direct<D, H, I>(
    x: MatrixView<'_, f32>,
    y: MatrixView<'_, f32>,
    handler: &mut H,
    pool: &RayonThreadPool,
    interrupt: &I,
) -> Result<()>
where
    D: for<'r> PureDistanceFunction<&'r [f32], &'r [f32]>,
    H: ResultHandler,
    I: InterruptCallback + ?Sized,
{
    check_query_database(x, y)?;
    let (nx, ny) = (x.nrows(), y.nrows());
    if nx == 0 || ny == 0 {
        return Ok(());
    }

    let period = interrupt
        .period_hint(ny.saturating_mul(x.ncols()))
        .saturating_mul(pool.num_threads().max(1))
        .max(1);

    let mut i0 = 0;
    while i0 < nx {
        let i1 = i0.saturating_add(period).min(nx);
        handler
            .single_handlers(i0, i1)
            .enumerate()
            .for_each_in_pool(pool, |(offset, mut single)| {
                let xi = x.row(i0 + offset);
                single.begin();
                for (j, yj) in y.row_iter().enumerate() {
                    single.add_result(D::evaluate(xi, yj), j as i64);
                }
                single.end();
            });
        interrupt.check()?;
        i0 = i1;
    }
    Ok(())
}
