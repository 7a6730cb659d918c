use std::ops::Range;

use crate::divisibility::*;
use crate::matrix::OwnedMatrix;
use crate::pid::*;
use crate::ring::*;

use super::ops::*;
use super::EliminationForm;

///
/// The result of [`super::eliminate()`], i.e. the normal form `D` of a matrix `A` together with
/// the logs of row and column operations that transform `A` into `D`.
///
/// Denote by `P` the product of the elementary matrices of all row operations, and by `Q` the
/// product of the elementary matrices of all column operations, in the order they were applied.
/// Then `P A Q = D`. All transformation matrices are computed on demand, by replaying the logged
/// operations on (parts of) an identity matrix.
///
pub struct EliminationResult<R>
    where R: RingStore
{
    ring: R,
    form: EliminationForm,
    result: OwnedMatrix<El<R>>,
    row_ops: Vec<RowOperation<El<R>>>,
    col_ops: Vec<ColOperation<El<R>>>
}

fn identity_block<R>(rows: Range<usize>, cols: Range<usize>, ring: R) -> OwnedMatrix<El<R>>
    where R: RingStore
{
    OwnedMatrix::from_fn(rows.len(), cols.len(), |i, j| if i + rows.start == j + cols.start { ring.one() } else { ring.zero() })
}

impl<R> EliminationResult<R>
    where R: RingStore,
        R::Type: EuclideanRing
{
    pub(super) fn new(ring: R, form: EliminationForm, result: OwnedMatrix<El<R>>, row_ops: Vec<RowOperation<El<R>>>, col_ops: Vec<ColOperation<El<R>>>) -> Self {
        EliminationResult { ring, form, result, row_ops, col_ops }
    }

    pub fn ring(&self) -> &R {
        &self.ring
    }

    pub fn form(&self) -> EliminationForm {
        self.form
    }

    ///
    /// Returns the normal form `D = P A Q`.
    ///
    pub fn result(&self) -> &OwnedMatrix<El<R>> {
        &self.result
    }

    pub fn into_result(self) -> OwnedMatrix<El<R>> {
        self.result
    }

    pub fn row_ops(&self) -> &[RowOperation<El<R>>] {
        &self.row_ops
    }

    pub fn col_ops(&self) -> &[ColOperation<El<R>>] {
        &self.col_ops
    }

    pub fn row_count(&self) -> usize {
        self.result.row_count()
    }

    pub fn col_count(&self) -> usize {
        self.result.col_count()
    }

    fn assert_diagonal(&self) {
        assert!(
            self.form == EliminationForm::Diagonal || self.form == EliminationForm::Smith,
            "this is only supported for diagonal normal forms, but the matrix was eliminated to {:?}", self.form
        );
    }

    ///
    /// Returns the rank of the matrix, i.e. the number of nonzero diagonal entries
    /// of the normal form. Only available for diagonal forms.
    ///
    pub fn rank(&self) -> usize {
        self.assert_diagonal();
        self.result.diagonal(&self.ring).iter().filter(|x| !self.ring.is_zero(x)).count()
    }

    pub fn nullity(&self) -> usize {
        self.col_count() - self.rank()
    }

    ///
    /// Returns the left transform `P`.
    ///
    pub fn left(&self) -> OwnedMatrix<El<R>> {
        self.left_restricted_to_cols(0..self.row_count())
    }

    ///
    /// Returns the columns of `P` in the given range.
    ///
    pub fn left_restricted_to_cols(&self, cols: Range<usize>) -> OwnedMatrix<El<R>> {
        let mut result = identity_block(0..self.row_count(), cols, &self.ring);
        result.apply_row_operations(&self.row_ops, &self.ring);
        return result;
    }

    ///
    /// Returns the rows of `P` in the given range.
    ///
    pub fn left_restricted_to_rows(&self, rows: Range<usize>) -> OwnedMatrix<El<R>> {
        let mut result = identity_block(rows, 0..self.row_count(), &self.ring);
        for op in self.row_ops.iter().rev() {
            result.apply_col_operation(&op.clone_op(&self.ring).opposite(), &self.ring);
        }
        return result;
    }

    ///
    /// Returns `P^-1`.
    ///
    pub fn left_inverse(&self) -> OwnedMatrix<El<R>> {
        self.left_inverse_restricted_to_cols(0..self.row_count())
    }

    pub fn left_inverse_restricted_to_cols(&self, cols: Range<usize>) -> OwnedMatrix<El<R>> {
        let mut result = identity_block(0..self.row_count(), cols, &self.ring);
        for op in self.row_ops.iter().rev() {
            result.apply_row_operation(&op.inverse(&self.ring), &self.ring);
        }
        return result;
    }

    pub fn left_inverse_restricted_to_rows(&self, rows: Range<usize>) -> OwnedMatrix<El<R>> {
        let mut result = identity_block(rows, 0..self.row_count(), &self.ring);
        for op in self.row_ops.iter() {
            result.apply_col_operation(&op.inverse(&self.ring).opposite(), &self.ring);
        }
        return result;
    }

    ///
    /// Returns the right transform `Q`.
    ///
    pub fn right(&self) -> OwnedMatrix<El<R>> {
        self.right_restricted_to_rows(0..self.col_count())
    }

    pub fn right_restricted_to_rows(&self, rows: Range<usize>) -> OwnedMatrix<El<R>> {
        let mut result = identity_block(rows, 0..self.col_count(), &self.ring);
        result.apply_col_operations(&self.col_ops, &self.ring);
        return result;
    }

    pub fn right_restricted_to_cols(&self, cols: Range<usize>) -> OwnedMatrix<El<R>> {
        let mut result = identity_block(0..self.col_count(), cols, &self.ring);
        for op in self.col_ops.iter().rev() {
            result.apply_row_operation(&op.clone_op(&self.ring).opposite(), &self.ring);
        }
        return result;
    }

    ///
    /// Returns `Q^-1`.
    ///
    pub fn right_inverse(&self) -> OwnedMatrix<El<R>> {
        self.right_inverse_restricted_to_rows(0..self.col_count())
    }

    pub fn right_inverse_restricted_to_rows(&self, rows: Range<usize>) -> OwnedMatrix<El<R>> {
        let mut result = identity_block(rows, 0..self.col_count(), &self.ring);
        for op in self.col_ops.iter().rev() {
            result.apply_col_operation(&op.inverse(&self.ring), &self.ring);
        }
        return result;
    }

    pub fn right_inverse_restricted_to_cols(&self, cols: Range<usize>) -> OwnedMatrix<El<R>> {
        let mut result = identity_block(0..self.col_count(), cols, &self.ring);
        for op in self.col_ops.iter() {
            result.apply_row_operation(&op.inverse(&self.ring).opposite(), &self.ring);
        }
        return result;
    }

    ///
    /// Returns a matrix whose columns form a basis of the kernel of `A`, namely the
    /// last [`EliminationResult::nullity()`] columns of `Q`.
    ///
    pub fn kernel_matrix(&self) -> OwnedMatrix<El<R>> {
        self.right_restricted_to_cols(self.rank()..self.col_count())
    }

    ///
    /// Returns the matrix `T` with `T * kernel_matrix() = I`, namely the last rows of `Q^-1`.
    ///
    pub fn kernel_transition_matrix(&self) -> OwnedMatrix<El<R>> {
        self.right_inverse_restricted_to_rows(self.rank()..self.col_count())
    }

    ///
    /// Returns a matrix whose columns generate the image of `A`, namely the first
    /// [`EliminationResult::rank()`] columns of `P^-1 D`.
    ///
    pub fn image_matrix(&self) -> OwnedMatrix<El<R>> {
        let rank = self.rank();
        let mut result = self.left_inverse_restricted_to_cols(0..rank);
        for j in 0..rank {
            for i in 0..result.row_count() {
                self.ring.mul_assign_ref(result.at_mut(i, j), self.result.at(j, j));
            }
        }
        return result;
    }

    ///
    /// Returns the matrix `T` with `T * image_matrix()` equal to the nonzero diagonal
    /// block of the normal form, namely the first rows of `P`.
    ///
    pub fn image_transition_matrix(&self) -> OwnedMatrix<El<R>> {
        self.left_restricted_to_rows(0..self.rank())
    }

    ///
    /// Finds `x` with `A x = rhs`, or returns `None` if no such `x` exists. If there
    /// are multiple solutions, an unspecified one is returned.
    ///
    pub fn invert(&self, rhs: &OwnedMatrix<El<R>>) -> Option<OwnedMatrix<El<R>>> {
        self.assert_diagonal();
        assert_eq!(self.row_count(), rhs.row_count(), "right-hand side has {} rows, but the matrix has {} rows", rhs.row_count(), self.row_count());
        let ring = &self.ring;
        let mut y = rhs.clone_matrix(ring);
        y.apply_row_operations(&self.row_ops, ring);

        let mut x = OwnedMatrix::zero(self.col_count(), rhs.col_count(), ring);
        for i in 0..self.row_count() {
            for k in 0..rhs.col_count() {
                let value = y.at(i, k);
                if ring.is_zero(value) {
                    continue;
                }
                if i >= self.col_count() || ring.is_zero(self.result.at(i, i)) {
                    return None;
                }
                *x.at_mut(i, k) = ring.checked_div(value, self.result.at(i, i))?;
            }
        }
        for op in self.col_ops.iter().rev() {
            x.apply_row_operation(&op.clone_op(ring).opposite(), ring);
        }
        return Some(x);
    }

    ///
    /// Returns the determinant of the (square) matrix `A`. Since all normal forms are
    /// triangular, this is available for every [`EliminationForm`].
    ///
    pub fn determinant(&self) -> El<R> {
        assert_eq!(self.row_count(), self.col_count(), "determinant is only defined for square matrices");
        let ring = &self.ring;
        let det_result = ring.prod(self.result.diagonal(ring));
        let det_ops = ring.prod(
            self.row_ops.iter().map(|op| op.determinant(ring)).chain(self.col_ops.iter().map(|op| op.determinant(ring)))
        );
        match ring.checked_div(&det_result, &det_ops) {
            Some(result) => result,
            None => panic!("determinant {} of the elementary operations is not a unit", ring.format(&det_ops))
        }
    }

    ///
    /// Returns the inverse `A^-1 = Q D^-1 P` of the square matrix `A`, or `None` if `A`
    /// is not invertible. Only available for diagonal forms.
    ///
    pub fn inverse(&self) -> Option<OwnedMatrix<El<R>>> {
        self.assert_diagonal();
        assert_eq!(self.row_count(), self.col_count(), "only square matrices can be inverted");
        let ring = &self.ring;
        let n = self.row_count();
        let diagonal_inverse = self.result.diagonal(ring).iter().map(|x| ring.invert(x)).collect::<Option<Vec<_>>>()?;
        let mut result = OwnedMatrix::zero(n, n, ring);
        for (i, x) in diagonal_inverse.into_iter().enumerate() {
            *result.at_mut(i, i) = x;
        }
        return Some(self.right().mul(&result, ring).mul(&self.left(), ring));
    }
}
