use std::ops::Range;

use super::*;

///
/// A dense, row-major matrix that owns its elements.
///
/// Since elements do not have to implement `Clone`, all functions that copy
/// elements take the ring as additional parameter.
///
/// # Example
/// ```rust
/// # use feanor_sparse::ring::*;
/// # use feanor_sparse::primitive_int::*;
/// # use feanor_sparse::matrix::*;
/// let ring = StaticRing::<i64>::RING;
/// let A = OwnedMatrix::new(vec![1, 2, 3, 4], 2);
/// let B = A.mul(&OwnedMatrix::identity(2, 2, ring), ring);
/// assert!(A.matrix_eq(&B, ring));
/// assert_eq!(3, *A.transpose(ring).at(0, 1));
/// ```
///
pub struct OwnedMatrix<T> {
    data: Vec<T>,
    row_count: usize,
    col_count: usize
}

impl<T> OwnedMatrix<T> {

    ///
    /// Creates the `row_count x col_count` [`OwnedMatrix`] matrix, whose entries are
    /// taken from the given vector, interpreted as a row-major matrix. The number of
    /// rows is `row_count = data.len() / col_count`.
    ///
    pub fn new(data: Vec<T>, col_count: usize) -> Self {
        assert!(col_count > 0, "use `OwnedMatrix::from_fn()` to create matrices with zero columns");
        assert!(data.len() % col_count == 0);
        let row_count = data.len() / col_count;
        Self { data, row_count, col_count }
    }

    ///
    /// Creates the `row_count x col_count` [`OwnedMatrix`] whose `(i, j)`-th entry
    /// is the output of the given function on `(i, j)`.
    ///
    pub fn from_fn<F>(row_count: usize, col_count: usize, mut f: F) -> Self
        where F: FnMut(usize, usize) -> T
    {
        let mut data = Vec::with_capacity(row_count * col_count);
        for i in 0..row_count {
            for j in 0..col_count {
                data.push(f(i, j));
            }
        }
        return Self { data, row_count, col_count };
    }

    ///
    /// Creates the `row_count x col_count` zero matrix over the given ring.
    ///
    pub fn zero<R: RingStore>(row_count: usize, col_count: usize, ring: R) -> Self
        where R::Type: RingBase<Element = T>
    {
        Self::from_fn(row_count, col_count, |_, _| ring.zero())
    }

    ///
    /// Creates the `row_count x col_count` identity matrix over the given ring.
    ///
    pub fn identity<R: RingStore>(row_count: usize, col_count: usize, ring: R) -> Self
        where R::Type: RingBase<Element = T>
    {
        Self::from_fn(row_count, col_count, |i, j| if i == j { ring.one() } else { ring.zero() })
    }

    ///
    /// Creates the `row_count x col_count` matrix whose entries are given by the triples
    /// `(row, col, value)`. Entries that are not mentioned are zero, and multiple values
    /// for the same position are summed up.
    ///
    pub fn from_entries<R, I>(row_count: usize, col_count: usize, entries: I, ring: R) -> Self
        where R: RingStore,
            R::Type: RingBase<Element = T>,
            I: IntoIterator<Item = (usize, usize, T)>
    {
        let mut result = Self::zero(row_count, col_count, &ring);
        for (i, j, x) in entries {
            assert!(i < row_count && j < col_count, "entry ({}, {}) out of bounds for a {}x{} matrix", i, j, row_count, col_count);
            ring.add_assign(result.at_mut(i, j), x);
        }
        return result;
    }

    pub fn at(&self, i: usize, j: usize) -> &T {
        assert!(i < self.row_count);
        assert!(j < self.col_count);
        &self.data[i * self.col_count + j]
    }

    pub fn at_mut(&mut self, i: usize, j: usize) -> &mut T {
        assert!(i < self.row_count);
        assert!(j < self.col_count);
        &mut self.data[i * self.col_count + j]
    }

    pub fn row(&self, i: usize) -> &[T] {
        assert!(i < self.row_count);
        &self.data[(i * self.col_count)..((i + 1) * self.col_count)]
    }

    pub fn row_count(&self) -> usize {
        self.row_count
    }

    pub fn col_count(&self) -> usize {
        self.col_count
    }

    pub fn clone_matrix<R: RingStore>(&self, ring: R) -> Self
        where R::Type: RingBase<Element = T>
    {
        Self::from_fn(self.row_count, self.col_count, |i, j| ring.clone_el(self.at(i, j)))
    }

    pub fn transpose<R: RingStore>(&self, ring: R) -> Self
        where R::Type: RingBase<Element = T>
    {
        Self::from_fn(self.col_count, self.row_count, |i, j| ring.clone_el(self.at(j, i)))
    }

    ///
    /// Returns a copy of the submatrix consisting of the given rows and columns.
    ///
    pub fn submatrix<R: RingStore>(&self, rows: Range<usize>, cols: Range<usize>, ring: R) -> Self
        where R::Type: RingBase<Element = T>
    {
        assert!(rows.end <= self.row_count);
        assert!(cols.end <= self.col_count);
        Self::from_fn(rows.len(), cols.len(), |i, j| ring.clone_el(self.at(i + rows.start, j + cols.start)))
    }

    ///
    /// Computes the matrix product `self * rhs`.
    ///
    pub fn mul<R: RingStore>(&self, rhs: &OwnedMatrix<T>, ring: R) -> Self
        where R::Type: RingBase<Element = T>
    {
        assert_eq!(self.col_count, rhs.row_count, "cannot multiply a {}x{} by a {}x{} matrix", self.row_count, self.col_count, rhs.row_count, rhs.col_count);
        Self::from_fn(self.row_count, rhs.col_count, |i, j| ring.sum((0..self.col_count).map(|k| ring.mul_ref(self.at(i, k), rhs.at(k, j)))))
    }

    ///
    /// Returns the matrix `[self | rhs]`.
    ///
    pub fn concat_cols<R: RingStore>(&self, rhs: &OwnedMatrix<T>, ring: R) -> Self
        where R::Type: RingBase<Element = T>
    {
        assert_eq!(self.row_count, rhs.row_count);
        Self::from_fn(self.row_count, self.col_count + rhs.col_count, |i, j| if j < self.col_count {
            ring.clone_el(self.at(i, j))
        } else {
            ring.clone_el(rhs.at(i, j - self.col_count))
        })
    }

    pub fn is_zero<R: RingStore>(&self, ring: R) -> bool
        where R::Type: RingBase<Element = T>
    {
        self.data.iter().all(|x| ring.is_zero(x))
    }

    pub fn is_identity<R: RingStore>(&self, ring: R) -> bool
        where R::Type: RingBase<Element = T>
    {
        self.row_count == self.col_count &&
            (0..self.row_count).all(|i| (0..self.col_count).all(|j| if i == j { ring.is_one(self.at(i, j)) } else { ring.is_zero(self.at(i, j)) }))
    }

    pub fn is_diagonal<R: RingStore>(&self, ring: R) -> bool
        where R::Type: RingBase<Element = T>
    {
        (0..self.row_count).all(|i| (0..self.col_count).all(|j| i == j || ring.is_zero(self.at(i, j))))
    }

    ///
    /// Returns the entries `(i, i)` for `i < min(row_count, col_count)`.
    ///
    pub fn diagonal<R: RingStore>(&self, ring: R) -> Vec<T>
        where R::Type: RingBase<Element = T>
    {
        (0..usize::min(self.row_count, self.col_count)).map(|i| ring.clone_el(self.at(i, i))).collect()
    }

    pub fn swap_rows(&mut self, i: usize, j: usize) {
        if i == j {
            return;
        }
        let (fst, snd) = (usize::min(i, j), usize::max(i, j));
        let (upper, lower) = self.data.split_at_mut(snd * self.col_count);
        upper[(fst * self.col_count)..((fst + 1) * self.col_count)].swap_with_slice(&mut lower[..self.col_count]);
    }

    pub fn swap_cols(&mut self, i: usize, j: usize) {
        for k in 0..self.row_count {
            self.data.swap(k * self.col_count + i, k * self.col_count + j);
        }
    }

    ///
    /// Returns the matrix `P * self`, where `P` moves row `perm[k]` to position `k`.
    ///
    pub fn permute_rows<R: RingStore>(&self, perm: &Permutation, ring: R) -> Self
        where R::Type: RingBase<Element = T>
    {
        assert_eq!(self.row_count, perm.len());
        Self::from_fn(self.row_count, self.col_count, |i, j| ring.clone_el(self.at(perm.apply(i), j)))
    }

    ///
    /// Returns the matrix `self * Q`, where `Q` moves column `perm[k]` to position `k`.
    ///
    pub fn permute_cols<R: RingStore>(&self, perm: &Permutation, ring: R) -> Self
        where R::Type: RingBase<Element = T>
    {
        assert_eq!(self.col_count, perm.len());
        Self::from_fn(self.row_count, self.col_count, |i, j| ring.clone_el(self.at(i, perm.apply(j))))
    }
}

impl<R> Matrix<R> for OwnedMatrix<R::Element>
    where R: ?Sized + RingBase
{
    fn row_count(&self) -> usize {
        OwnedMatrix::row_count(self)
    }

    fn col_count(&self) -> usize {
        OwnedMatrix::col_count(self)
    }

    fn at(&self, i: usize, j: usize) -> &R::Element {
        OwnedMatrix::at(self, i, j)
    }
}

#[cfg(test)]
use crate::primitive_int::StaticRing;
#[cfg(test)]
use crate::assert_matrix_eq;

#[test]
fn test_mul_and_transpose() {
    let ring = StaticRing::<i64>::RING;
    let A = OwnedMatrix::new(vec![1, 2, 3, 4, 5, 6], 3);
    let B = OwnedMatrix::new(vec![1, 0, 0, 1, 1, 1], 2);
    let expected = OwnedMatrix::new(vec![4, 5, 10, 11], 2);
    assert_matrix_eq!(&ring, &A.mul(&B, ring), &expected);
    assert_matrix_eq!(&ring, &A.transpose(ring).transpose(ring), &A);
    assert_eq!(6, *A.transpose(ring).at(2, 1));
}

#[test]
fn test_swap_rows_cols() {
    let ring = StaticRing::<i64>::RING;
    let mut A = OwnedMatrix::new(vec![1, 2, 3, 4, 5, 6], 2);
    A.swap_rows(2, 0);
    assert_matrix_eq!(&ring, &A, &OwnedMatrix::new(vec![5, 6, 3, 4, 1, 2], 2));
    A.swap_cols(0, 1);
    assert_matrix_eq!(&ring, &A, &OwnedMatrix::new(vec![6, 5, 4, 3, 2, 1], 2));
}

#[test]
fn test_entries_roundtrip() {
    let ring = StaticRing::<i64>::RING;
    let A = OwnedMatrix::new(vec![0, 2, 0, 0, 0, -1, 7, 0, 0], 3);
    let entries = A.nonzero_entries(&ring).map(|(i, j, x)| (i, j, *x)).collect::<Vec<_>>();
    assert_eq!(vec![(0, 1, 2), (1, 2, -1), (2, 0, 7)], entries);
    let B = OwnedMatrix::from_entries(3, 3, entries, ring);
    assert_matrix_eq!(&ring, &A, &B);
}

#[test]
fn test_predicates() {
    let ring = StaticRing::<i64>::RING;
    assert!(OwnedMatrix::identity(3, 3, ring).is_identity(ring));
    assert!(OwnedMatrix::identity(3, 4, ring).is_diagonal(ring));
    assert!(!OwnedMatrix::identity(3, 4, ring).is_identity(ring));
    assert!(OwnedMatrix::zero(2, 5, ring).is_zero(ring));
    let A = OwnedMatrix::new(vec![2, 0, 0, 0, 3, 0], 3);
    assert!(A.is_diagonal(ring));
    assert_eq!(vec![2, 3], A.diagonal(ring));
    assert_matrix_eq!(&ring, &A.submatrix(0..2, 1..3, ring), &OwnedMatrix::new(vec![0, 0, 3, 0], 2));
}

#[test]
fn test_format() {
    let ring = StaticRing::<i64>::RING;
    let A = OwnedMatrix::new(vec![1, -20, 3, 4], 2);
    assert_eq!("[1 -20]\n[3   4]", format!("{}", A.format(&ring)));
}
