/*
 * Copyright (c) Microsoft Corporation.
 * Licensed under the MIT license.
 */

use crate::PureDistanceFunction;

// The kernels below split their accumulation across `LANES` independent partial sums.
// Breaking the dependency chain this way lets LLVM keep several FMAs in flight (and
// vectorize the loop body when the target supports it) without any hand-written SIMD.
const LANES: usize = 8;

/// Evaluate the inner product of two equal-length vectors.
#[derive(Debug, Clone, Copy)]
pub struct InnerProduct;

impl PureDistanceFunction<&[f32], &[f32]> for InnerProduct {
    #[inline]
    fn evaluate(x: &[f32], y: &[f32]) -> f32 {
        debug_assert_eq!(x.len(), y.len());

        let mut acc = [0.0f32; LANES];
        let mut xc = x.chunks_exact(LANES);
        let mut yc = y.chunks_exact(LANES);
        for (xs, ys) in xc.by_ref().zip(yc.by_ref()) {
            for (a, (&xv, &yv)) in acc.iter_mut().zip(xs.iter().zip(ys)) {
                *a = xv.mul_add(yv, *a);
            }
        }

        let tail = xc
            .remainder()
            .iter()
            .zip(yc.remainder())
            .fold(0.0f32, |t, (&xv, &yv)| xv.mul_add(yv, t));

        acc.iter().sum::<f32>() + tail
    }
}

/// Evaluate the squared Euclidean (L2) distance between two equal-length vectors.
#[derive(Debug, Clone, Copy)]
pub struct SquaredL2;

impl PureDistanceFunction<&[f32], &[f32]> for SquaredL2 {
    #[inline]
    fn evaluate(x: &[f32], y: &[f32]) -> f32 {
        debug_assert_eq!(x.len(), y.len());

        let mut acc = [0.0f32; LANES];
        let mut xc = x.chunks_exact(LANES);
        let mut yc = y.chunks_exact(LANES);
        for (xs, ys) in xc.by_ref().zip(yc.by_ref()) {
            for (a, (&xv, &yv)) in acc.iter_mut().zip(xs.iter().zip(ys)) {
                let diff = xv - yv;
                *a = diff.mul_add(diff, *a);
            }
        }

        let tail = xc
            .remainder()
            .iter()
            .zip(yc.remainder())
            .fold(0.0f32, |t, (&xv, &yv)| {
                let diff = xv - yv;
                diff.mul_add(diff, t)
            });

        acc.iter().sum::<f32>() + tail
    }
}

///////////
// Tests //
///////////
