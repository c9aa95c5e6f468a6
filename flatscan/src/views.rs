/*
 * Copyright (c) Microsoft Corporation.
 * Licensed under the MIT license.
 */

//! Row-major matrix views over dense slices.
//!
//! These add just enough semantic meaning to blobs of data to keep shape bookkeeping
//! out of the kernels: a query batch and a database are both matrix views whose rows
//! are individual vectors.

use thiserror::Error;

#[derive(Debug, Error)]
#[non_exhaustive]
#[error(
    "tried to construct a matrix view with {nrows} rows and {ncols} columns over a slice \
     of length {len}"
)]
pub struct TryFromError {
    len: usize,
    nrows: usize,
    ncols: usize,
}

/// An immutable view over a dense chunk of memory, interpreting that memory as a
/// 2-dimensional matrix laid out in row-major order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MatrixView<'a, T> {
    data: &'a [T],
    nrows: usize,
    ncols: usize,
}

impl<'a, T> MatrixView<'a, T> {
    /// Try to construct a view over `data`, whose length must equal `nrows * ncols`.
    pub fn try_from(data: &'a [T], nrows: usize, ncols: usize) -> Result<Self, TryFromError> {
        if data.len() != nrows * ncols {
            Err(TryFromError {
                len: data.len(),
                nrows,
                ncols,
            })
        } else {
            Ok(Self { data, nrows, ncols })
        }
    }

    /// Return the number of rows in the matrix.
    pub fn nrows(&self) -> usize {
        self.nrows
    }

    /// Return the number of columns in the matrix.
    pub fn ncols(&self) -> usize {
        self.ncols
    }

    /// Return the underlying data as a slice.
    pub fn as_slice(&self) -> &'a [T] {
        self.data
    }

    /// Return row `row` as a slice.
    ///
    /// # Panics
    ///
    /// Panics if `row >= self.nrows()`.
    pub fn row(&self, row: usize) -> &'a [T] {
        assert!(
            row < self.nrows,
            "tried to access row {row} of a matrix with {} rows",
            self.nrows
        );
        &self.data[row * self.ncols..(row + 1) * self.ncols]
    }

    /// Return an iterator over all rows in the matrix, beginning with row 0.
    pub fn row_iter(&self) -> impl ExactSizeIterator<Item = &'a [T]> {
        self.data.chunks_exact(self.ncols.max(1))
    }
}

/// A mutable companion to [`MatrixView`].
#[derive(Debug, PartialEq)]
pub struct MatrixViewMut<'a, T> {
    data: &'a mut [T],
    nrows: usize,
    ncols: usize,
}

impl<'a, T> MatrixViewMut<'a, T> {
    /// Try to construct a view over `data`, whose length must equal `nrows * ncols`.
    pub fn try_from(data: &'a mut [T], nrows: usize, ncols: usize) -> Result<Self, TryFromError> {
        if data.len() != nrows * ncols {
            Err(TryFromError {
                len: data.len(),
                nrows,
                ncols,
            })
        } else {
            Ok(Self { data, nrows, ncols })
        }
    }

    /// Return the number of rows in the matrix.
    pub fn nrows(&self) -> usize {
        self.nrows
    }

    /// Return the number of columns in the matrix.
    pub fn ncols(&self) -> usize {
        self.ncols
    }

    /// Return the underlying data as a mutable slice.
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        self.data
    }

    /// Reborrow as an immutable view.
    pub fn as_view(&self) -> MatrixView<'_, T> {
        MatrixView {
            data: self.data,
            nrows: self.nrows,
            ncols: self.ncols,
        }
    }

    /// Return row `row` as a mutable slice.
    ///
    /// # Panics
    ///
    /// Panics if `row >= self.nrows()`.
    pub fn row_mut(&mut self, row: usize) -> &mut [T] {
        assert!(
            row < self.nrows,
            "tried to access row {row} of a matrix with {} rows",
            self.nrows
        );
        &mut self.data[row * self.ncols..(row + 1) * self.ncols]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_try_from_rejects_bad_shapes() {
        let data = [0.0f32; 6];
        assert!(MatrixView::try_from(&data, 2, 3).is_ok());
        assert!(MatrixView::try_from(&data, 2, 2).is_err());
        assert!(MatrixView::try_from(&data, 7, 1).is_err());

        let err = MatrixView::try_from(&data, 4, 4).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("4 rows"));
        assert!(message.contains("length 6"));
    }

    #[test]
    fn test_rows() {
        let data = [1, 2, 3, 4, 5, 6];
        let m = MatrixView::try_from(&data, 3, 2).unwrap();
        assert_eq!(m.nrows(), 3);
        assert_eq!(m.ncols(), 2);
        assert_eq!(m.row(0), &[1, 2]);
        assert_eq!(m.row(2), &[5, 6]);

        let rows: Vec<_> = m.row_iter().collect();
        assert_eq!(rows, vec![&[1, 2][..], &[3, 4][..], &[5, 6][..]]);
    }

    #[test]
    #[should_panic(expected = "tried to access row 3")]
    fn test_row_out_of_bounds() {
        let data = [0.0f32; 6];
        let m = MatrixView::try_from(&data, 3, 2).unwrap();
        let _ = m.row(3);
    }

    #[test]
    fn test_mutable_view() {
        let mut data = [1, 2, 3, 4];
        let mut m = MatrixViewMut::try_from(&mut data, 2, 2).unwrap();
        m.row_mut(1)[0] = 9;
        assert_eq!(m.as_view().row(1), &[9, 4]);
        assert_eq!(data, [1, 2, 9, 4]);
    }
}
