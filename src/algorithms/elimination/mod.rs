use tracing::{event, instrument, Level};

use crate::matrix::Matrix;
use crate::pid::*;
use crate::ring::*;
use crate::sparse::{EliminationIndex, SparseRowMatrix};

mod ops;
mod engine;
mod result;

pub use ops::{RowOperation, ColOperation};
pub use result::EliminationResult;

use engine::{EliminationState, Eliminator};

///
/// The normal forms that [`eliminate()`] can compute.
///
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EliminationForm {
    ///
    /// Row echelon form, i.e. the leading entries of the nonzero rows are in strictly
    /// increasing columns, and all zero rows are at the bottom. Leading entries are normalized.
    ///
    RowEchelon,
    ///
    /// The transpose of the row echelon form of the transpose.
    ///
    ColEchelon,
    ///
    /// Row echelon form in which additionally all entries above a leading entry
    /// are reduced modulo the leading entry.
    ///
    RowHermite,
    ColHermite,
    ///
    /// A diagonal matrix, whose nonzero entries are normalized and come first.
    ///
    Diagonal,
    ///
    /// A diagonal matrix as for [`EliminationForm::Diagonal`], but in which every diagonal
    /// entry divides the next one.
    ///
    Smith
}

///
/// Transforms the given matrix into the given normal form `D` by elementary row and column
/// operations, i.e. computes `D = P A Q` with invertible `P` and `Q`.
///
/// The elimination works on a sparse copy of the matrix. In each step, the pivot is chosen
/// among the rows whose leading entry is in the current column, by minimal euclidean degree
/// and then minimal row weight (as given by [`RingBase::elimination_weight()`]), to keep fill-in
/// and coefficient growth small.
///
/// # Example
/// ```rust
/// # use feanor_sparse::ring::*;
/// # use feanor_sparse::primitive_int::*;
/// # use feanor_sparse::matrix::*;
/// # use feanor_sparse::algorithms::elimination::*;
/// let ring = StaticRing::<i64>::RING;
/// let A = OwnedMatrix::new(vec![2, 0, 0, 3], 2);
/// let result = eliminate(ring, &A, EliminationForm::Smith);
/// assert_eq!(vec![1, 6], result.result().diagonal(ring));
/// assert_eq!(6, result.determinant());
/// ```
///
pub fn eliminate<R, M>(ring: R, matrix: &M, form: EliminationForm) -> EliminationResult<R>
    where R: RingStore + Sync,
        R::Type: EuclideanRing,
        El<R>: Send + Sync,
        M: Matrix<R::Type>
{
    let matrix = SparseRowMatrix::from_dense(matrix, &ring);
    eliminate_sparse(ring, matrix, form)
}

///
/// Same as [`eliminate()`], but takes the matrix in sparse representation.
///
#[instrument(skip_all, level = "trace")]
pub fn eliminate_sparse<R>(ring: R, matrix: SparseRowMatrix<El<R>>, form: EliminationForm) -> EliminationResult<R>
    where R: RingStore + Sync,
        R::Type: EuclideanRing,
        El<R>: Send + Sync
{
    let (matrix, row_ops, col_ops) = {
        let index = EliminationIndex::new(matrix, &ring);
        let mut state = EliminationState::new(index);
        let mut eliminator = Eliminator::new(form);
        eliminator.prepare(&mut state);
        let mut steps = 0;
        while !eliminator.is_done(&state) {
            eliminator.iteration(&mut state);
            steps += 1;
        }
        eliminator.finalize(&mut state);
        let (index, row_ops, col_ops) = state.into_parts();
        event!(Level::INFO, form = ?form, steps = steps, row_ops = row_ops.len(), col_ops = col_ops.len());
        (index.into_matrix(), row_ops, col_ops)
    };
    let result = matrix.to_dense(&ring);
    return EliminationResult::new(ring, form, result, row_ops, col_ops);
}

#[cfg(test)]
use crate::divisibility::DivisibilityRingStore;
#[cfg(test)]
use crate::matrix::OwnedMatrix;
#[cfg(test)]
use crate::primitive_int::StaticRing;
#[cfg(test)]
use crate::rings::rational::RationalField;
#[cfg(test)]
use crate::rings::poly::DensePolyRing;
#[cfg(test)]
use crate::rings::zn::Fp;
#[cfg(test)]
use crate::assert_matrix_eq;
#[cfg(test)]
use crate::tracing::LogAlgorithmSubscriber;
#[cfg(test)]
use oorandom::Rand64;

#[cfg(test)]
fn assert_transforms_valid<R>(A: &OwnedMatrix<El<R>>, result: &EliminationResult<R>)
    where R: RingStore,
        R::Type: EuclideanRing
{
    let ring = result.ring();
    assert_matrix_eq!(ring, &result.left().mul(A, ring).mul(&result.right(), ring), result.result());
    assert!(result.left().mul(&result.left_inverse(), ring).is_identity(ring));
    assert!(result.right_inverse().mul(&result.right(), ring).is_identity(ring));
}

#[cfg(test)]
fn is_row_echelon<R>(A: &OwnedMatrix<El<R>>, ring: R) -> bool
    where R: RingStore
{
    let leading_cols = (0..A.row_count()).map(|i| (0..A.col_count()).find(|j| !ring.is_zero(A.at(i, *j)))).collect::<Vec<_>>();
    let nonzero_rows = leading_cols.iter().take_while(|j| j.is_some()).count();
    leading_cols[nonzero_rows..].iter().all(|j| j.is_none()) &&
        (1..nonzero_rows).all(|i| leading_cols[i - 1].unwrap() < leading_cols[i].unwrap())
}

#[test]
fn test_smith_full_rank() {
    LogAlgorithmSubscriber::init_test();
    let ring = StaticRing::<i64>::RING;
    let A = OwnedMatrix::new(vec![
        2, -1, -2, -2, -3,
        1, 2, -1, 1, -1,
        2, -2, -4, -3, -6,
        1, 7, 1, 5, 3,
        1, -12, -6, -10, -11
    ], 5);
    let result = eliminate(ring, &A, EliminationForm::Smith);
    assert!(result.result().is_identity(ring));
    assert_eq!(5, result.rank());
    assert_eq!(0, result.nullity());
    assert_transforms_valid(&A, &result);
    let A_inv = result.inverse().unwrap();
    assert!(A.mul(&A_inv, ring).is_identity(ring));
    assert!(ring.is_unit(&result.determinant()));
}

#[test]
fn test_smith_rank_deficient() {
    let ring = StaticRing::<i64>::RING;
    let A = OwnedMatrix::new(vec![
        3, -5, -22, 20, 8,
        6, -11, -50, 45, 18,
        -1, 2, 10, -9, -3,
        3, -6, -30, 27, 10,
        -1, 2, 7, -6, -3
    ], 5);
    let result = eliminate(ring, &A, EliminationForm::Smith);
    assert_eq!(vec![1, 1, 1, 1, 0], result.result().diagonal(ring));
    assert!(result.result().is_diagonal(ring));
    assert_eq!(4, result.rank());
    assert_eq!(1, result.nullity());
    assert_eq!(0, result.determinant());
    assert!(result.inverse().is_none());
    assert_transforms_valid(&A, &result);

    let kernel = result.kernel_matrix();
    assert_eq!(1, kernel.col_count());
    assert!(!kernel.is_zero(ring));
    assert!(A.mul(&kernel, ring).is_zero(ring));
    assert!(result.kernel_transition_matrix().mul(&kernel, ring).is_identity(ring));
}

#[test]
fn test_smith_divisor_chain() {
    let ring = StaticRing::<i64>::RING;
    let A = OwnedMatrix::new(vec![
        2, 4, 4,
        -6, 6, 12,
        10, -4, -16
    ], 3);
    let result = eliminate(ring, &A, EliminationForm::Smith);
    assert_matrix_eq!(&ring, &OwnedMatrix::new(vec![2, 0, 0, 0, 6, 0, 0, 0, 12], 3), result.result());
    assert_eq!(-144, result.determinant());
    assert_transforms_valid(&A, &result);

    let B = OwnedMatrix::new(vec![4, 0, 0, 6], 2);
    let result = eliminate(ring, &B, EliminationForm::Smith);
    assert_eq!(vec![2, 12], result.result().diagonal(ring));
    assert_transforms_valid(&B, &result);
}

#[test]
fn test_smith_random() {
    let ring = StaticRing::<i64>::RING;
    let mut rng = Rand64::new(17);
    for (rows, cols) in [(2, 2), (4, 4), (5, 3), (3, 5)] {
        for _ in 0..8 {
            let A = OwnedMatrix::from_fn(rows, cols, |_, _| rng.rand_range(0..13) as i64 - 6);
            let result = eliminate(ring, &A, EliminationForm::Smith);
            let D = result.result();
            assert!(D.is_diagonal(ring));
            let diagonal = D.diagonal(ring);
            assert!(diagonal.iter().all(|d| *d >= 0));
            for k in 1..diagonal.len() {
                assert!(ring.checked_div(&diagonal[k], &diagonal[k - 1]).is_some(), "{:?} is not a divisor chain", diagonal);
            }
            assert_transforms_valid(&A, &result);
        }
    }
    let B = OwnedMatrix::new(vec![6, 0, 0, 0, 10, 0, 0, 0, 15], 3);
    let result = eliminate(ring, &B, EliminationForm::Smith);
    assert_eq!(vec![1, 30, 30], result.result().diagonal(ring));
    assert_eq!(900, result.determinant());
    assert_transforms_valid(&B, &result);
}

#[test]
fn test_smith_polynomials() {
    let QQ = RationalField::new(StaticRing::<i64>::RING);
    let QQX = DensePolyRing::new(QQ, "X");
    let X = QQX.indeterminate();
    let two = QQX.from_int(2);
    let A = OwnedMatrix::new(vec![
        QQX.sub_ref(&X, &two), QQX.neg_one(),
        QQX.zero(), QQX.sub_ref(&X, &two)
    ], 2);
    let result = eliminate(&QQX, &A, EliminationForm::Smith);
    let expected = QQX.pow(QQX.sub_ref(&X, &two), 2);
    assert!(QQX.is_one(result.result().at(0, 0)));
    assert_el_eq!(&QQX, &expected, result.result().at(1, 1));
    assert!(result.result().is_diagonal(&QQX));
    assert_el_eq!(&QQX, &expected, &result.determinant());
    assert_transforms_valid(&A, &result);
}

#[test]
fn test_echelon_forms() {
    let ring = StaticRing::<i64>::RING;
    let A = OwnedMatrix::new(vec![
        0, 2, 4, 1,
        0, 3, 6, 0,
        1, 1, 1, 1,
        2, 2, 2, 5
    ], 4);
    for form in [EliminationForm::RowEchelon, EliminationForm::RowHermite] {
        let result = eliminate(ring, &A, form);
        assert!(is_row_echelon(result.result(), ring));
        assert!(result.col_ops().is_empty());
        assert_transforms_valid(&A, &result);
    }
    for form in [EliminationForm::ColEchelon, EliminationForm::ColHermite] {
        let result = eliminate(ring, &A, form);
        assert!(is_row_echelon(&result.result().transpose(ring), ring));
        assert!(result.row_ops().is_empty());
        assert_transforms_valid(&A, &result);
    }
    let H = eliminate(ring, &A, EliminationForm::RowHermite).into_result();
    for i in 0..4 {
        if let Some(j) = (0..4).find(|j| *H.at(i, *j) != 0) {
            let pivot = *H.at(i, j);
            assert!(pivot > 0);
            assert!((0..i).all(|k| H.at(k, j).abs() < pivot));
        }
    }
}

#[cfg(test)]
fn assert_hermite_reduced(H: &OwnedMatrix<i64>) {
    for i in 0..H.row_count() {
        if let Some(j) = (0..H.col_count()).find(|j| *H.at(i, *j) != 0) {
            let pivot = *H.at(i, j);
            assert!((0..i).all(|k| H.at(k, j).abs() < pivot.abs()), "entry above pivot ({}, {}) is not reduced", i, j);
        }
    }
}

#[test]
fn test_hermite_forms_random() {
    let ring = StaticRing::<i64>::RING;
    let mut rng = Rand64::new(3);
    for (rows, cols) in [(4, 4), (5, 3), (3, 6), (6, 6)] {
        for _ in 0..8 {
            let A = OwnedMatrix::from_fn(rows, cols, |_, _| if rng.rand_u64() % 3 == 0 { 0 } else { rng.rand_range(0..9) as i64 - 4 });

            let result = eliminate(ring, &A, EliminationForm::RowHermite);
            assert!(is_row_echelon(result.result(), ring));
            assert_hermite_reduced(result.result());
            assert_transforms_valid(&A, &result);

            let result = eliminate(ring, &A, EliminationForm::ColHermite);
            let H = result.result().transpose(ring);
            assert!(is_row_echelon(&H, ring));
            assert_hermite_reduced(&H);
            assert_transforms_valid(&A, &result);
        }
    }
}

#[test]
fn test_kernel_and_image() {
    let ring = StaticRing::<i64>::RING;
    let A = OwnedMatrix::new(vec![
        1, 2, 3,
        4, 5, 6,
        7, 8, 9
    ], 3);
    let result = eliminate(ring, &A, EliminationForm::Smith);
    assert_eq!(vec![1, 3, 0], result.result().diagonal(ring));
    assert_eq!(2, result.rank());
    assert_transforms_valid(&A, &result);

    let kernel = result.kernel_matrix();
    assert!(A.mul(&kernel, ring).is_zero(ring));
    assert!(result.kernel_transition_matrix().mul(&kernel, ring).is_identity(ring));

    let image = result.image_matrix();
    assert_eq!(2, image.col_count());
    assert_matrix_eq!(&ring, &result.image_transition_matrix().mul(&image, ring), &result.result().submatrix(0..2, 0..2, ring));

    let left_rows = result.left_restricted_to_rows(1..3);
    assert_matrix_eq!(&ring, &result.left().submatrix(1..3, 0..3, ring), &left_rows);
    let right_cols = result.right_inverse_restricted_to_cols(0..2);
    assert_matrix_eq!(&ring, &result.right_inverse().submatrix(0..3, 0..2, ring), &right_cols);
    let left_inv_rows = result.left_inverse_restricted_to_rows(0..1);
    assert_matrix_eq!(&ring, &result.left_inverse().submatrix(0..1, 0..3, ring), &left_inv_rows);
}

#[test]
fn test_invert() {
    let ring = StaticRing::<i64>::RING;
    let A = OwnedMatrix::new(vec![
        1, 2, 3,
        4, 5, 6,
        7, 8, 9
    ], 3);
    let result = eliminate(ring, &A, EliminationForm::Diagonal);
    let b = OwnedMatrix::new(vec![6, 15, 24], 1);
    let x = result.invert(&b).unwrap();
    assert_matrix_eq!(&ring, &b, &A.mul(&x, ring));

    // [1, 1, 1] is not in the image of A
    let c = OwnedMatrix::new(vec![1, 1, 2], 1);
    assert!(result.invert(&c).is_none());

    // [0, 1, 2] is in the image over Q, but not over Z
    let d = OwnedMatrix::new(vec![0, 1, 2], 1);
    assert!(result.invert(&d).is_none());
}

#[test]
fn test_diagonal_over_field() {
    let ring = Fp::<7>::RING;
    let A = OwnedMatrix::new(vec![
        0, 1, 3,
        2, 0, 0,
        4, 1, 3
    ], 3);
    let result = eliminate(ring, &A, EliminationForm::Diagonal);
    assert!(result.result().is_diagonal(ring));
    assert_eq!(2, result.rank());
    assert_eq!(vec![1, 1, 0], result.result().diagonal(ring));
    assert_transforms_valid(&A, &result);
    assert_eq!(0, result.determinant());
}

#[test]
fn test_empty_and_zero_matrices() {
    let ring = StaticRing::<i64>::RING;
    let A = OwnedMatrix::zero(3, 2, ring);
    let result = eliminate(ring, &A, EliminationForm::Smith);
    assert_eq!(0, result.rank());
    assert_eq!(2, result.nullity());
    assert!(result.kernel_matrix().is_identity(ring));
    assert!(result.image_matrix().col_count() == 0);

    let B: OwnedMatrix<i64> = OwnedMatrix::from_fn(0, 3, |_, _| unreachable!());
    let result = eliminate(ring, &B, EliminationForm::RowEchelon);
    assert_eq!(0, result.row_count());
    assert_eq!(3, result.col_count());
}

#[test]
#[should_panic]
fn test_rank_of_echelon_form() {
    let ring = StaticRing::<i64>::RING;
    let A = OwnedMatrix::new(vec![1, 2, 3, 4], 2);
    eliminate(ring, &A, EliminationForm::RowEchelon).rank();
}
