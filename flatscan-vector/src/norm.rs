/*
 * Copyright (c) Microsoft Corporation.
 * Licensed under the MIT license.
 */

use crate::{InnerProduct, Norm, PureDistanceFunction};

/// Evaluate the square of the L2 norm of the argument.
///
/// # Implementation
///
/// This delegates to [`InnerProduct`] with both arguments aliased. When the inner
/// product is inlined into the callsite, LLVM recognizes that the two ranges overlap
/// and optimizes out half the loads, so a dedicated unrolling strategy is not needed.
#[derive(Debug, Clone, Copy)]
pub struct L2NormSquared;

impl Norm<&[f32]> for L2NormSquared {
    #[inline]
    fn evaluate(&self, x: &[f32]) -> f32 {
        InnerProduct::evaluate(x, x)
    }
}

/// Evaluate the L2 norm of the argument.
#[derive(Debug, Clone, Copy)]
pub struct L2Norm;

impl Norm<&[f32]> for L2Norm {
    #[inline]
    fn evaluate(&self, x: &[f32]) -> f32 {
        (L2NormSquared).evaluate(x).sqrt()
    }
}

///////////
// Tests //
///////////
