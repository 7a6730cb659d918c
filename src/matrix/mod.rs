use std::fmt::Display;

use crate::ring::*;

mod owned;
mod permutation;

pub use owned::OwnedMatrix;
pub use permutation::Permutation;

///
/// Read access to a dense matrix over a ring `R`.
///
/// The algorithms of this crate work on sparse representations internally,
/// but take their input and produce their output as dense matrices, since this
/// is what the user usually has.
///
pub trait Matrix<R>
    where R: ?Sized + RingBase
{
    fn row_count(&self) -> usize;
    fn col_count(&self) -> usize;
    fn at(&self, i: usize, j: usize) -> &R::Element;

    fn format<'a, S>(&'a self, ring: &'a S) -> MatrixDisplayWrapper<'a, R, Self>
        where S: RingStore<Type = R>
    {
        MatrixDisplayWrapper {
            matrix: self,
            ring: ring.get_ring()
        }
    }

    fn matrix_eq<M, S>(&self, other: &M, ring: S) -> bool
        where M: Matrix<R>, S: RingStore<Type = R>
    {
        self.row_count() == other.row_count() && self.col_count() == other.col_count() &&
            (0..self.row_count()).all(|i| (0..self.col_count()).all(|j| ring.eq_el(self.at(i, j), other.at(i, j))))
    }

    ///
    /// Enumerates all nonzero entries as `(row, col, value)`, row by row.
    ///
    fn nonzero_entries<'a, S>(&'a self, ring: S) -> impl 'a + Iterator<Item = (usize, usize, &'a R::Element)>
        where S: 'a + RingStore<Type = R>,
            R::Element: 'a
    {
        (0..self.row_count()).flat_map(move |i| (0..self.col_count()).map(move |j| (i, j)))
            .map(move |(i, j)| (i, j, self.at(i, j)))
            .filter(move |(_, _, x)| !ring.is_zero(x))
    }
}

#[macro_export]
macro_rules! assert_matrix_eq {
    ($ring:expr, $lhs:expr, $rhs:expr) => {
        match ($ring, $lhs, $rhs) {
            (ring_val, lhs_val, rhs_val) => {
                assert!(<_ as $crate::matrix::Matrix<_>>::matrix_eq(lhs_val, rhs_val, ring_val), "Assertion failed: Expected\n{}\nto be\n{}", <_ as $crate::matrix::Matrix<_>>::format(lhs_val, ring_val), <_ as $crate::matrix::Matrix<_>>::format(rhs_val, ring_val));
            }
        }
    }
}

pub struct MatrixDisplayWrapper<'a, R, M>
    where R: ?Sized + RingBase, M: ?Sized + Matrix<R>
{
    matrix: &'a M,
    ring: &'a R
}


impl<'a, R, M> Display for MatrixDisplayWrapper<'a, R, M>
    where R: ?Sized + RingBase, M: ?Sized + Matrix<R>
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let ring = RingRef::new(self.ring);
        let cells = (0..self.matrix.row_count())
            .map(|i| (0..self.matrix.col_count()).map(|j| format!("{}", ring.format(self.matrix.at(i, j)))).collect::<Vec<_>>())
            .collect::<Vec<_>>();
        // every column is right-aligned to its widest entry
        let widths = (0..self.matrix.col_count())
            .map(|j| cells.iter().map(|row| row[j].chars().count()).max().unwrap_or(0))
            .collect::<Vec<_>>();
        for (i, row) in cells.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "[")?;
            for (j, cell) in row.iter().enumerate() {
                if j > 0 {
                    write!(f, " ")?;
                }
                write!(f, "{:>width$}", cell, width = widths[j])?;
            }
            write!(f, "]")?;
        }
        return Ok(());
    }
}
