use std::collections::BTreeSet;

use crate::algorithms::elimination::RowOperation;
use crate::ring::*;

use super::matrix::SparseRowMatrix;
use super::EXTENSIVE_RUNTIME_ASSERTS;

///
/// A [`SparseRowMatrix`] together with two indices that are kept up-to-date under
/// all row operations:
///  - the elimination weight of each row, i.e. the sum of [`RingBase::elimination_weight()`]
///    over its entries
///  - for each column `j`, the set of rows whose leftmost nonzero entry is in column `j`
///
/// Both are updated incrementally, using the weight changes reported by the row merges,
/// and are only computed from scratch during construction or transposition.
///
pub struct EliminationIndex<R: RingStore> {
    ring: R,
    matrix: SparseRowMatrix<El<R>>,
    row_weights: Vec<usize>,
    heads: Vec<BTreeSet<usize>>
}

impl<R: RingStore> EliminationIndex<R> {

    pub fn new(matrix: SparseRowMatrix<El<R>>, ring: R) -> Self {
        let row_weights = (0..matrix.row_count()).map(|i| matrix.row_weight(i, &ring)).collect();
        let mut heads = (0..matrix.col_count()).map(|_| BTreeSet::new()).collect::<Vec<_>>();
        for i in 0..matrix.row_count() {
            if let Some(j) = matrix.row(i).leading_col() {
                heads[j].insert(i);
            }
        }
        return EliminationIndex { ring, matrix, row_weights, heads };
    }

    pub fn ring(&self) -> &R {
        &self.ring
    }

    pub fn matrix(&self) -> &SparseRowMatrix<El<R>> {
        &self.matrix
    }

    pub fn into_matrix(self) -> SparseRowMatrix<El<R>> {
        self.matrix
    }

    pub fn row_count(&self) -> usize {
        self.matrix.row_count()
    }

    pub fn col_count(&self) -> usize {
        self.matrix.col_count()
    }

    pub fn row_weight(&self, i: usize) -> usize {
        self.row_weights[i]
    }

    pub fn leading_entry(&self, i: usize) -> Option<(usize, &El<R>)> {
        self.matrix.row(i).leading_entry()
    }

    pub fn at(&self, i: usize, j: usize) -> Option<&El<R>> {
        self.matrix.at(i, j)
    }

    ///
    /// Returns the rows whose leftmost nonzero entry is in column `j`, in ascending order.
    ///
    pub fn rows_with_head_in_col<'a>(&'a self, j: usize) -> impl 'a + Iterator<Item = usize> {
        self.heads[j].iter().copied()
    }

    ///
    /// Returns the rows whose leftmost nonzero entry is in column `j`, together with that entry.
    ///
    pub fn heads_in_col<'a>(&'a self, j: usize) -> impl 'a + Iterator<Item = (usize, &'a El<R>)> {
        self.heads[j].iter().map(move |i| (*i, self.matrix.row(*i).leading_entry().unwrap().1))
    }

    pub fn head_count_in_col(&self, j: usize) -> usize {
        self.heads[j].len()
    }

    ///
    /// Returns all rows `i < before_row` that have a nonzero entry in column `col`.
    /// This requires a scan over all these rows.
    ///
    pub fn entries_above_row<'a>(&'a self, col: usize, before_row: usize) -> impl 'a + Iterator<Item = (usize, &'a El<R>)> {
        (0..before_row).filter_map(move |i| self.matrix.at(i, col).map(|x| (i, x)))
    }

    fn update_head(&mut self, i: usize, old_head: Option<usize>) {
        let new_head = self.matrix.row(i).leading_col();
        if old_head != new_head {
            if let Some(j) = old_head {
                let removed = self.heads[j].remove(&i);
                debug_assert!(removed);
            }
            if let Some(j) = new_head {
                self.heads[j].insert(i);
            }
        }
    }

    fn update_weight(&mut self, i: usize, delta: i64) {
        let new_weight = self.row_weights[i] as i64 + delta;
        debug_assert!(new_weight >= 0);
        self.row_weights[i] = new_weight as usize;
    }

    ///
    /// Performs `row[to] += factor * row[from]`.
    ///
    pub fn add_row(&mut self, from: usize, to: usize, factor: &El<R>) {
        let old_head = self.matrix.row(to).leading_col();
        let delta = self.matrix.add_row(from, to, factor, &self.ring);
        self.update_weight(to, delta);
        self.update_head(to, old_head);
        self.check();
    }

    ///
    /// Performs `row[to] += factor * row[from]` for all `(to, factor)` in `targets`,
    /// where the merges run in parallel. See also [`SparseRowMatrix::batch_add_row()`].
    ///
    pub fn batch_add_row(&mut self, from: usize, targets: Vec<(usize, El<R>)>)
        where R: Sync,
            El<R>: Send + Sync
    {
        let old_heads = targets.iter().map(|(i, _)| (*i, self.matrix.row(*i).leading_col())).collect::<Vec<_>>();
        let deltas = self.matrix.batch_add_row(from, targets, &self.ring);
        for ((i, old_head), delta) in old_heads.into_iter().zip(deltas.into_iter()) {
            self.update_weight(i, delta);
            self.update_head(i, old_head);
        }
        self.check();
    }

    pub fn scale_row(&mut self, i: usize, factor: &El<R>) {
        let old_head = self.matrix.row(i).leading_col();
        let delta = self.matrix.scale_row(i, factor, &self.ring);
        self.update_weight(i, delta);
        self.update_head(i, old_head);
        self.check();
    }

    pub fn swap_rows(&mut self, i: usize, j: usize) {
        if i == j {
            return;
        }
        let head_i = self.matrix.row(i).leading_col();
        let head_j = self.matrix.row(j).leading_col();
        if let Some(col) = head_i {
            self.heads[col].remove(&i);
        }
        if let Some(col) = head_j {
            self.heads[col].remove(&j);
        }
        self.matrix.swap_rows(i, j);
        self.row_weights.swap(i, j);
        if let Some(col) = head_i {
            self.heads[col].insert(j);
        }
        if let Some(col) = head_j {
            self.heads[col].insert(i);
        }
        self.check();
    }

    ///
    /// Performs `col[to] += factor * col[from]`. This has to scan all rows, and is
    /// thus much more expensive than row operations.
    ///
    pub fn add_col(&mut self, from: usize, to: usize, factor: &El<R>) {
        assert!(from != to, "cannot add a column to itself");
        for i in 0..self.row_count() {
            if let Some(x) = self.matrix.at(i, from) {
                let value = self.ring.mul_ref(x, factor);
                let old_head = self.matrix.row(i).leading_col();
                let delta = self.matrix.row_mut(i).add_at(to, value, &self.ring);
                self.update_weight(i, delta);
                self.update_head(i, old_head);
            }
        }
        self.check();
    }

    pub fn apply(&mut self, op: &RowOperation<El<R>>) {
        match op {
            RowOperation::AddRow { from, to, factor } => self.add_row(*from, *to, factor),
            RowOperation::MulRow { row, factor } => self.scale_row(*row, factor),
            RowOperation::SwapRows(i, j) => self.swap_rows(*i, *j)
        }
    }

    ///
    /// Replaces the matrix by its transpose, and rebuilds both indices.
    ///
    pub fn transpose(&mut self) {
        let matrix = std::mem::replace(&mut self.matrix, SparseRowMatrix::new(0, 0)).transpose();
        self.row_weights = (0..matrix.row_count()).map(|i| matrix.row_weight(i, &self.ring)).collect();
        self.heads = (0..matrix.col_count()).map(|_| BTreeSet::new()).collect();
        for i in 0..matrix.row_count() {
            if let Some(j) = matrix.row(i).leading_col() {
                self.heads[j].insert(i);
            }
        }
        self.matrix = matrix;
        self.check();
    }

    ///
    /// Checks whether the only nonzero entries are on the diagonal.
    ///
    pub fn is_diagonal(&self) -> bool {
        (0..self.row_count()).all(|i| {
            let row = self.matrix.row(i);
            row.is_empty() || (row.nnz() == 1 && row.leading_col() == Some(i))
        })
    }

    ///
    /// Recomputes both indices from scratch and compares them to the stored values.
    /// Only has an effect if extensive runtime assertions are enabled.
    ///
    pub fn check(&self) {
        if EXTENSIVE_RUNTIME_ASSERTS {
            self.matrix.check(&self.ring);
            for i in 0..self.row_count() {
                assert_eq!(self.matrix.row_weight(i, &self.ring), self.row_weights[i], "weight of row {} is out of date", i);
                if let Some(j) = self.matrix.row(i).leading_col() {
                    assert!(self.heads[j].contains(&i), "row {} is missing in the head index of column {}", i, j);
                }
            }
            for j in 0..self.col_count() {
                for i in &self.heads[j] {
                    assert_eq!(Some(j), self.matrix.row(*i).leading_col(), "row {} is wrongly in the head index of column {}", i, j);
                }
            }
        }
    }
}

#[cfg(test)]
use crate::primitive_int::StaticRing;
#[cfg(test)]
use crate::matrix::OwnedMatrix;

#[cfg(test)]
fn test_index() -> EliminationIndex<StaticRing<i64>> {
    let ring = StaticRing::<i64>::RING;
    let A = OwnedMatrix::new(vec![
        0, 2, 1, 0,
        3, 0, 0, 1,
        0, 0, 0, 0,
        1, -4, 0, 0,
        0, 5, 0, 2
    ], 4);
    EliminationIndex::new(SparseRowMatrix::from_dense(&A, ring), ring)
}

#[test]
fn test_heads() {
    let index = test_index();
    assert_eq!(vec![1, 3], index.rows_with_head_in_col(0).collect::<Vec<_>>());
    assert_eq!(vec![(0, &2), (4, &5)], index.heads_in_col(1).collect::<Vec<_>>());
    assert_eq!(0, index.head_count_in_col(2));
    assert_eq!(vec![(0, &2), (3, &-4)], index.entries_above_row(1, 4).collect::<Vec<_>>());
    assert_eq!(2 + 1, index.row_weight(0));
    assert_eq!(0, index.row_weight(2));
}

#[test]
fn test_row_operations_update_index() {
    let mut index = test_index();
    index.add_row(3, 1, &-3);
    assert_eq!(vec![3], index.rows_with_head_in_col(0).collect::<Vec<_>>());
    assert_eq!(vec![0, 1, 4], index.rows_with_head_in_col(1).collect::<Vec<_>>());
    assert_eq!(4 + 1, index.row_weight(1));
    index.swap_rows(1, 2);
    assert_eq!(vec![0, 2, 4], index.rows_with_head_in_col(1).collect::<Vec<_>>());
    assert_eq!(0, index.row_weight(1));
    assert_eq!(5, index.row_weight(2));
    index.batch_add_row(2, vec![(0, -1), (4, -1)]);
    assert_eq!(vec![0, 2, 4], index.rows_with_head_in_col(1).collect::<Vec<_>>());
    assert_eq!(Some(&-10), index.at(0, 1));
    assert_eq!(Some(&-7), index.at(4, 1));
    assert_eq!(6, index.row_weight(0));
    assert_eq!(4, index.row_weight(4));
    index.scale_row(3, &-1);
    assert_eq!(Some((0, &-1)), index.leading_entry(3));
}

#[test]
fn test_add_col_and_transpose() {
    let mut index = test_index();
    index.add_col(0, 1, &1);
    assert_eq!(vec![(1, &3), (3, &1)], index.heads_in_col(0).collect::<Vec<_>>());
    assert_eq!(Some(&3), index.at(1, 1));
    assert_eq!(Some(&-3), index.at(3, 1));
    index.transpose();
    assert_eq!(4, index.row_count());
    assert_eq!(5, index.col_count());
    assert_eq!(vec![1, 2], index.rows_with_head_in_col(0).collect::<Vec<_>>());
    assert_eq!(vec![(0, &3), (3, &1)], index.heads_in_col(1).collect::<Vec<_>>());
    assert_eq!(9, index.row_weight(1));
    assert!(!index.is_diagonal());
}
