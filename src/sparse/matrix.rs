use std::marker::PhantomData;
use std::ops::Range;

use serde::de::{DeserializeSeed, SeqAccess, Visitor};
use serde::ser::SerializeTuple;
use serde::{Deserializer, Serialize, Serializer};

use crate::algorithms::elimination::RowOperation;
use crate::matrix::*;
use crate::parallel::potential_parallel_for_each;
use crate::ring::*;
use crate::serialization::*;

use super::row::SparseRow;

///
/// A sparse matrix, stored as a list of [`SparseRow`]s.
///
/// This is the working representation of all algorithms in this crate. It is
/// built once from a dense matrix (or a list of `(row, col, value)` components),
/// modified in place and finally converted back.
///
/// # Example
/// ```rust
/// # use feanor_sparse::ring::*;
/// # use feanor_sparse::primitive_int::*;
/// # use feanor_sparse::matrix::*;
/// # use feanor_sparse::sparse::*;
/// let ring = StaticRing::<i64>::RING;
/// let A = OwnedMatrix::new(vec![1, 0, 2, 0, 3, 0], 3);
/// let mut A_sparse = SparseRowMatrix::from_dense(&A, ring);
/// assert_eq!(3, A_sparse.nnz());
/// A_sparse.add_row(0, 1, &-1, ring);
/// assert_eq!(vec![(1, 0, -1), (1, 1, 3), (1, 2, -2)], A_sparse.components().filter(|(i, _, _)| *i == 1).map(|(i, j, x)| (i, j, *x)).collect::<Vec<_>>());
/// ```
///
pub struct SparseRowMatrix<T> {
    rows: Vec<SparseRow<T>>,
    col_count: usize
}

impl<T> SparseRowMatrix<T> {

    ///
    /// Creates the `row_count x col_count` zero matrix.
    ///
    pub fn new(row_count: usize, col_count: usize) -> Self {
        SparseRowMatrix {
            rows: (0..row_count).map(|_| SparseRow::new()).collect(),
            col_count: col_count
        }
    }

    pub fn from_rows(rows: Vec<SparseRow<T>>, col_count: usize) -> Self {
        assert!(rows.iter().all(|row| row.iter().next_back().map(|(j, _)| j < col_count).unwrap_or(true)));
        SparseRowMatrix { rows, col_count }
    }

    pub fn from_dense<R, M>(matrix: &M, ring: R) -> Self
        where R: RingStore,
            R::Type: RingBase<Element = T>,
            M: Matrix<R::Type>
    {
        let mut result = Self::new(matrix.row_count(), matrix.col_count());
        for (i, j, x) in matrix.nonzero_entries(&ring) {
            result.rows[i].push(j, ring.clone_el(x));
        }
        return result;
    }

    ///
    /// Creates the matrix with the given nonzero components `(row, col, value)`.
    /// The components can be given in any order, and values for the same position
    /// are added up.
    ///
    pub fn from_components<R, I>(row_count: usize, col_count: usize, components: I, ring: R) -> Self
        where R: RingStore,
            R::Type: RingBase<Element = T>,
            I: IntoIterator<Item = (usize, usize, T)>
    {
        let mut buckets = (0..row_count).map(|_| Vec::new()).collect::<Vec<_>>();
        for (i, j, x) in components {
            assert!(i < row_count && j < col_count, "component ({}, {}) out of bounds for a {}x{} matrix", i, j, row_count, col_count);
            buckets[i].push((j, x));
        }
        SparseRowMatrix {
            rows: buckets.into_iter().map(|entries| SparseRow::from_entries(entries, &ring)).collect(),
            col_count: col_count
        }
    }

    pub fn to_dense<R>(&self, ring: R) -> OwnedMatrix<T>
        where R: RingStore,
            R::Type: RingBase<Element = T>
    {
        OwnedMatrix::from_entries(self.row_count(), self.col_count(), self.components().map(|(i, j, x)| (i, j, ring.clone_el(x))), &ring)
    }

    ///
    /// Enumerates all nonzero components `(row, col, value)`, row by row.
    ///
    pub fn components<'a>(&'a self) -> impl 'a + Iterator<Item = (usize, usize, &'a T)> {
        self.rows.iter().enumerate().flat_map(|(i, row)| row.iter().map(move |(j, x)| (i, j, x)))
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn col_count(&self) -> usize {
        self.col_count
    }

    pub fn row(&self, i: usize) -> &SparseRow<T> {
        &self.rows[i]
    }

    pub fn row_mut(&mut self, i: usize) -> &mut SparseRow<T> {
        &mut self.rows[i]
    }

    pub fn rows(&self) -> &[SparseRow<T>] {
        &self.rows
    }

    pub fn into_rows(self) -> Vec<SparseRow<T>> {
        self.rows
    }

    pub fn at(&self, i: usize, j: usize) -> Option<&T> {
        self.rows[i].at(j)
    }

    pub fn nnz(&self) -> usize {
        self.rows.iter().map(|row| row.nnz()).sum()
    }

    pub fn row_weight<R>(&self, i: usize, ring: R) -> usize
        where R: RingStore,
            R::Type: RingBase<Element = T>
    {
        self.rows[i].weight(ring)
    }

    pub fn clone_matrix<R>(&self, ring: R) -> Self
        where R: RingStore,
            R::Type: RingBase<Element = T>
    {
        SparseRowMatrix {
            rows: self.rows.iter().map(|row| row.clone_row(&ring)).collect(),
            col_count: self.col_count
        }
    }

    ///
    /// Performs `row[to] += factor * row[from]`, and returns the change of the weight of
    /// row `to`.
    ///
    pub fn add_row<R>(&mut self, from: usize, to: usize, factor: &T, ring: R) -> i64
        where R: RingStore,
            R::Type: RingBase<Element = T>
    {
        assert!(from != to, "cannot add a row to itself");
        let (source, target) = if from < to {
            let (upper, lower) = self.rows.split_at_mut(to);
            (&upper[from], &mut lower[0])
        } else {
            let (upper, lower) = self.rows.split_at_mut(from);
            (&lower[0], &mut upper[to])
        };
        target.add_scaled(source, factor, ring)
    }

    ///
    /// Performs `row[to] += factor * row[from]` for every `(to, factor)` in `targets`.
    /// The target rows must be distinct and different from `from`. The merges are
    /// independent, and are performed in parallel if the feature `parallel` is enabled.
    ///
    /// Returns the change of the weight of each target row, in the order of `targets`.
    ///
    pub fn batch_add_row<R>(&mut self, from: usize, targets: Vec<(usize, T)>, ring: R) -> Vec<i64>
        where R: RingStore + Sync,
            R::Type: RingBase<Element = T>,
            T: Send + Sync
    {
        let mut target_indices = targets.iter().map(|(i, _)| *i).collect::<Vec<_>>();
        target_indices.sort_unstable();
        target_indices.dedup();
        assert!(target_indices.len() == targets.len(), "target rows of a batched row addition must be distinct");
        assert!(target_indices.binary_search(&from).is_err(), "cannot add a row to itself");

        let mut work = targets.into_iter()
            .map(|(i, factor)| (i, std::mem::take(&mut self.rows[i]), factor, 0))
            .collect::<Vec<_>>();
        let source = &self.rows[from];
        potential_parallel_for_each(
            &mut work,
            || Vec::new(),
            |buffer, _, (_, row, factor, delta)| {
                *delta = row.add_scaled_with_buffer(source, factor, &ring, buffer);
            }
        );
        let mut deltas = Vec::with_capacity(work.len());
        for (i, row, _, delta) in work {
            self.rows[i] = row;
            deltas.push(delta);
        }
        return deltas;
    }

    pub fn scale_row<R>(&mut self, i: usize, factor: &T, ring: R) -> i64
        where R: RingStore,
            R::Type: RingBase<Element = T>
    {
        self.rows[i].scale(factor, ring)
    }

    pub fn swap_rows(&mut self, i: usize, j: usize) {
        self.rows.swap(i, j);
    }

    pub fn apply_row_op<R>(&mut self, op: &RowOperation<T>, ring: R)
        where R: RingStore,
            R::Type: RingBase<Element = T>
    {
        match op {
            RowOperation::AddRow { from, to, factor } => { self.add_row(*from, *to, factor, ring); },
            RowOperation::MulRow { row, factor } => { self.scale_row(*row, factor, ring); },
            RowOperation::SwapRows(i, j) => self.swap_rows(*i, *j)
        }
    }

    ///
    /// Returns the transpose of this matrix. Since rows are processed in order, every
    /// new row is filled in ascending order, so this takes time `O(nnz + rows + cols)`.
    ///
    pub fn transpose(self) -> Self {
        let row_count = self.row_count();
        let mut result = Self::new(self.col_count, row_count);
        for (i, row) in self.rows.into_iter().enumerate() {
            for (j, x) in row.into_entries() {
                result.rows[j].push(i, x);
            }
        }
        return result;
    }

    pub fn push_row(&mut self, row: SparseRow<T>) {
        assert!(row.iter().next_back().map(|(j, _)| j < self.col_count).unwrap_or(true));
        self.rows.push(row);
    }

    ///
    /// Appends the rows of `other` below the rows of `self`.
    ///
    pub fn append(&mut self, other: SparseRowMatrix<T>) {
        assert_eq!(self.col_count, other.col_count);
        self.rows.extend(other.rows);
    }

    ///
    /// Returns a copy of the submatrix with the given rows and columns.
    ///
    pub fn sub<R>(&self, rows: Range<usize>, cols: Range<usize>, ring: R) -> Self
        where R: RingStore,
            R::Type: RingBase<Element = T>
    {
        assert!(rows.end <= self.row_count());
        assert!(cols.end <= self.col_count);
        SparseRowMatrix {
            rows: self.rows[rows].iter().map(|row| {
                let mut result = SparseRow::new();
                for (j, x) in row.iter().filter(|(j, _)| cols.contains(j)) {
                    result.push(j - cols.start, ring.clone_el(x));
                }
                result
            }).collect(),
            col_count: cols.len()
        }
    }

    pub fn check<R>(&self, ring: R)
        where R: RingStore,
            R::Type: RingBase<Element = T>
    {
        for row in &self.rows {
            row.check(&ring);
            assert!(row.iter().next_back().map(|(j, _)| j < self.col_count).unwrap_or(true));
        }
    }
}

///
/// Serializes a [`SparseRowMatrix`] as tuple `(row_count, col_count, rows)`, where
/// each row is a list of `(col, value)` pairs.
///
pub struct SerializeSparseMatrix<'a, R: RingStore>
    where R::Type: SerializableElementRing
{
    matrix: &'a SparseRowMatrix<El<R>>,
    ring: R
}

impl<'a, R: RingStore> SerializeSparseMatrix<'a, R>
    where R::Type: SerializableElementRing
{
    pub fn new(matrix: &'a SparseRowMatrix<El<R>>, ring: R) -> Self {
        Self { matrix, ring }
    }
}

struct SerializeSparseRow<'a, R: RingStore>
    where R::Type: SerializableElementRing
{
    row: &'a SparseRow<El<R>>,
    ring: &'a R
}

impl<'a, R: RingStore> Serialize for SerializeSparseRow<'a, R>
    where R::Type: SerializableElementRing
{
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
        where S: Serializer
    {
        serialize_seq_helper(serializer, self.row.iter().map(|(j, x)| SerializeIndexedWithRing::new(j, x, self.ring)))
    }
}

struct SerializeSparseRows<'a, R: RingStore>
    where R::Type: SerializableElementRing
{
    matrix: &'a SparseRowMatrix<El<R>>,
    ring: &'a R
}

impl<'a, R: RingStore> Serialize for SerializeSparseRows<'a, R>
    where R::Type: SerializableElementRing
{
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
        where S: Serializer
    {
        serialize_seq_helper(serializer, self.matrix.rows.iter().map(|row| SerializeSparseRow { row: row, ring: self.ring }))
    }
}

impl<'a, R: RingStore> Serialize for SerializeSparseMatrix<'a, R>
    where R::Type: SerializableElementRing
{
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
        where S: Serializer
    {
        let mut tuple = serializer.serialize_tuple(3)?;
        tuple.serialize_element(&self.matrix.row_count())?;
        tuple.serialize_element(&self.matrix.col_count())?;
        tuple.serialize_element(&SerializeSparseRows { matrix: self.matrix, ring: &self.ring })?;
        return tuple.end();
    }
}

///
/// [`DeserializeSeed`] for matrices serialized by [`SerializeSparseMatrix`]. Fails if
/// the data does not describe a valid matrix, e.g. if a row is not sorted or an entry
/// is out of bounds.
///
pub struct DeserializeSparseMatrix<R: RingStore>
    where R::Type: SerializableElementRing
{
    ring: R
}

impl<R: RingStore> DeserializeSparseMatrix<R>
    where R::Type: SerializableElementRing
{
    pub fn new(ring: R) -> Self {
        Self { ring }
    }
}

struct DeserializeSparseRow<'a, R: RingStore>
    where R::Type: SerializableElementRing
{
    ring: &'a R
}

impl<'a, R: RingStore> Clone for DeserializeSparseRow<'a, R>
    where R::Type: SerializableElementRing
{
    fn clone(&self) -> Self {
        Self { ring: self.ring }
    }
}

impl<'a, 'de, R: RingStore> DeserializeSeed<'de> for DeserializeSparseRow<'a, R>
    where R::Type: SerializableElementRing
{
    type Value = SparseRow<El<R>>;

    fn deserialize<D>(self, deserializer: D) -> Result<Self::Value, D::Error>
        where D: Deserializer<'de>
    {
        let mut result = SparseRow::new();
        let mut sorted = true;
        deserialize_seq_helper(deserializer, |(j, x)| {
            sorted &= result.leading_col().is_none() || result.iter().next_back().unwrap().0 < j;
            if sorted && !self.ring.is_zero(&x) {
                result.push(j, x);
            }
        }, DeserializeIndexedWithRing::new(self.ring))?;
        if !sorted {
            return Err(serde::de::Error::custom("entries of a sparse row must be strictly sorted by column"));
        }
        return Ok(result);
    }
}

struct DeserializeSparseRows<'a, R: RingStore>
    where R::Type: SerializableElementRing
{
    ring: &'a R
}

impl<'a, 'de, R: RingStore> DeserializeSeed<'de> for DeserializeSparseRows<'a, R>
    where R::Type: SerializableElementRing
{
    type Value = Vec<SparseRow<El<R>>>;

    fn deserialize<D>(self, deserializer: D) -> Result<Self::Value, D::Error>
        where D: Deserializer<'de>
    {
        let mut result = Vec::new();
        deserialize_seq_helper(deserializer, |row| result.push(row), DeserializeSparseRow { ring: self.ring })?;
        return Ok(result);
    }
}

impl<'de, R: RingStore> DeserializeSeed<'de> for DeserializeSparseMatrix<R>
    where R::Type: SerializableElementRing
{
    type Value = SparseRowMatrix<El<R>>;

    fn deserialize<D>(self, deserializer: D) -> Result<Self::Value, D::Error>
        where D: Deserializer<'de>
    {
        struct MatrixVisitor<'de, R: RingStore>
            where R::Type: SerializableElementRing
        {
            ring: R,
            deserializer: PhantomData<&'de ()>
        }

        impl<'de, R: RingStore> Visitor<'de> for MatrixVisitor<'de, R>
            where R::Type: SerializableElementRing
        {
            type Value = SparseRowMatrix<El<R>>;

            fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
                write!(formatter, "a sparse matrix, given as row count, column count and list of rows")
            }

            fn visit_seq<A>(self, mut seq: A) -> Result<Self::Value, A::Error>
                where A: SeqAccess<'de>
            {
                let row_count = seq.next_element::<usize>()?.ok_or_else(|| serde::de::Error::invalid_length(0, &self))?;
                let col_count = seq.next_element::<usize>()?.ok_or_else(|| serde::de::Error::invalid_length(1, &self))?;
                let rows = seq.next_element_seed(DeserializeSparseRows { ring: &self.ring })?.ok_or_else(|| serde::de::Error::invalid_length(2, &self))?;
                if rows.len() != row_count {
                    return Err(serde::de::Error::custom(format!("expected {} rows, but got {}", row_count, rows.len())));
                }
                if rows.iter().any(|row| row.iter().next_back().map(|(j, _)| j >= col_count).unwrap_or(false)) {
                    return Err(serde::de::Error::custom(format!("entry out of bounds for a matrix with {} columns", col_count)));
                }
                return Ok(SparseRowMatrix { rows, col_count });
            }
        }

        deserializer.deserialize_tuple(3, MatrixVisitor { ring: self.ring, deserializer: PhantomData })
    }
}

#[cfg(test)]
use crate::primitive_int::StaticRing;
#[cfg(test)]
use crate::assert_matrix_eq;

#[cfg(test)]
fn test_matrix() -> SparseRowMatrix<i64> {
    let ring = StaticRing::<i64>::RING;
    SparseRowMatrix::from_dense(&OwnedMatrix::new(vec![
        1, 0, 2, 0,
        0, 0, 0, 0,
        0, 3, 0, -1,
        4, 0, 0, 5
    ], 4), ring)
}

#[test]
fn test_dense_roundtrip() {
    let ring = StaticRing::<i64>::RING;
    let A = test_matrix();
    assert_eq!(6, A.nnz());
    let B = SparseRowMatrix::from_components(4, 4, A.components().map(|(i, j, x)| (i, j, *x)).collect::<Vec<_>>().into_iter().rev(), ring);
    assert_eq!(
        A.components().map(|(i, j, x)| (i, j, *x)).collect::<Vec<_>>(),
        B.components().map(|(i, j, x)| (i, j, *x)).collect::<Vec<_>>()
    );
    assert_matrix_eq!(&ring, &A.to_dense(ring), &B.to_dense(ring));
}

#[test]
fn test_add_row_and_batch() {
    let ring = StaticRing::<i64>::RING;
    let mut A = test_matrix();
    A.add_row(3, 0, &1, ring);
    assert_eq!(vec![(0, &5), (2, &2), (3, &5)], A.row(0).iter().collect::<Vec<_>>());
    let deltas = A.batch_add_row(2, vec![(1, 2), (3, 1)], ring);
    assert_eq!(vec![(1, &6), (3, &-2)], A.row(1).iter().collect::<Vec<_>>());
    assert_eq!(vec![(0, &4), (1, &3), (3, &4)], A.row(3).iter().collect::<Vec<_>>());
    assert_eq!(vec![A.row_weight(1, ring) as i64, 3 + 2 + 3 - 3 - 3], deltas);
}

#[test]
#[should_panic]
fn test_batch_add_row_duplicate_target() {
    let ring = StaticRing::<i64>::RING;
    let mut A = test_matrix();
    A.batch_add_row(2, vec![(1, 2), (1, 1)], ring);
}

#[test]
fn test_transpose() {
    let ring = StaticRing::<i64>::RING;
    let A = test_matrix();
    let A_T = A.clone_matrix(ring).transpose();
    assert_matrix_eq!(&ring, &A.to_dense(ring).transpose(ring), &A_T.to_dense(ring));
    assert_eq!(vec![(0, &1), (3, &4)], A_T.row(0).iter().collect::<Vec<_>>());
}

#[test]
fn test_sub_and_append() {
    let ring = StaticRing::<i64>::RING;
    let A = test_matrix();
    let mut B = A.sub(2..4, 1..4, ring);
    assert_matrix_eq!(&ring, &OwnedMatrix::new(vec![3, 0, -1, 0, 0, 5], 3), &B.to_dense(ring));
    B.append(A.sub(0..1, 1..4, ring));
    assert_eq!(3, B.row_count());
    assert_eq!(vec![(1, &2)], B.row(2).iter().collect::<Vec<_>>());
}

#[test]
fn test_serialize_sparse_matrix() {
    let ring = StaticRing::<i64>::RING;
    let A = test_matrix();
    let json = serde_json::to_string(&SerializeSparseMatrix::new(&A, ring)).unwrap();
    assert_eq!("[4,4,[[[0,1],[2,2]],[],[[1,3],[3,-1]],[[0,4],[3,5]]]]", json);
    let mut deserializer = serde_json::Deserializer::from_str(&json);
    let B = DeserializeSparseMatrix::new(ring).deserialize(&mut deserializer).unwrap();
    assert_matrix_eq!(&ring, &A.to_dense(ring), &B.to_dense(ring));
}

#[test]
fn test_deserialize_invalid_sparse_matrix() {
    let ring = StaticRing::<i64>::RING;
    let mut deserializer = serde_json::Deserializer::from_str("[1,4,[[[2,1],[0,2]]]]");
    assert!(DeserializeSparseMatrix::new(ring).deserialize(&mut deserializer).is_err());
    let mut deserializer = serde_json::Deserializer::from_str("[1,2,[[[0,1],[3,2]]]]");
    assert!(DeserializeSparseMatrix::new(ring).deserialize(&mut deserializer).is_err());
    let mut deserializer = serde_json::Deserializer::from_str("[2,2,[[[0,1]]]]");
    assert!(DeserializeSparseMatrix::new(ring).deserialize(&mut deserializer).is_err());
}
