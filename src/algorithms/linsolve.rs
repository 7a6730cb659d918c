use crate::divisibility::*;
use crate::field::Field;
use crate::matrix::*;
use crate::pid::EuclideanRing;
use crate::ring::*;
use crate::rings::zn::Fp;
use crate::sparse::{SparseRow, SparseRowMatrix};

use super::elimination::{eliminate, eliminate_sparse, EliminationForm};
use super::lu::prefactorize;
use super::pivot::find_pivots;
use super::rank::{calculate_rank_with_pivots, RankConfig};

///
/// Solves `x U = rhs` for the row vector `x`, where `U` is an `r x n` matrix whose `k`-th row
/// has its leading entry, which must be a unit, in column `k`.
///
/// Only the first `r` entries of `rhs` are eliminated, and `rhs` is left with the rest. In other
/// words, if `U = [U1, B]` with a square `U1`, then afterwards `rhs` contains `rhs - x U`, which
/// is zero on the first `r` columns and equal to `rhs2 - rhs1 U1^-1 B` on the remaining ones.
///
pub fn solve_left_upper_triangular_destructive<R>(ring: R, upper: &SparseRowMatrix<El<R>>, rhs: &mut SparseRow<El<R>>, buffer: &mut Vec<(usize, El<R>)>) -> SparseRow<El<R>>
    where R: RingStore,
        R::Type: DivisibilityRing
{
    let r = upper.row_count();
    let mut result = SparseRow::new();
    while let Some((k, value)) = rhs.leading_entry() {
        if k >= r {
            break;
        }
        assert!(upper.row(k).leading_col() == Some(k), "row {} of the matrix does not have its leading entry on the diagonal", k);
        let pivot = upper.at(k, k).unwrap();
        let pivot_inv = match ring.invert(pivot) {
            Some(x) => x,
            None => panic!("diagonal entry {} in row {} is not invertible", ring.format(pivot), k)
        };
        let factor = ring.mul_ref_snd(pivot_inv, value);
        rhs.add_scaled_with_buffer(upper.row(k), &ring.negate(ring.clone_el(&factor)), &ring, buffer);
        result.push(k, factor);
    }
    return result;
}

///
/// Solves `X U = B` for a square upper triangular matrix `U` whose diagonal entries are units.
///
/// # Example
/// ```rust
/// # use feanor_sparse::ring::*;
/// # use feanor_sparse::primitive_int::*;
/// # use feanor_sparse::matrix::*;
/// # use feanor_sparse::algorithms::linsolve::*;
/// let ring = StaticRing::<i64>::RING;
/// let U = OwnedMatrix::new(vec![1, 2, 0, -1], 2);
/// let B = OwnedMatrix::new(vec![1, 4], 2);
/// let X = solve_left_upper_triangular(ring, &U, &B);
/// assert_eq!(&[1, -2], X.row(0));
/// ```
///
pub fn solve_left_upper_triangular<R>(ring: R, upper: &OwnedMatrix<El<R>>, rhs: &OwnedMatrix<El<R>>) -> OwnedMatrix<El<R>>
    where R: RingStore,
        R::Type: DivisibilityRing
{
    let n = upper.row_count();
    assert_eq!(n, upper.col_count(), "matrix must be square");
    assert_eq!(n, rhs.col_count(), "right-hand side has {} columns, but the matrix has {} columns", rhs.col_count(), n);
    let upper_sparse = SparseRowMatrix::from_dense(upper, &ring);
    let mut buffer = Vec::new();
    let mut solution = Vec::with_capacity(rhs.row_count());
    for i in 0..rhs.row_count() {
        let mut row = SparseRow::from_entries(rhs.row(i).iter().enumerate().map(|(j, x)| (j, ring.clone_el(x))), &ring);
        let x = solve_left_upper_triangular_destructive(&ring, &upper_sparse, &mut row, &mut buffer);
        debug_assert!(row.is_empty());
        solution.push(x);
    }
    return SparseRowMatrix::from_rows(solution, n).to_dense(&ring);
}

///
/// Solves `x A = b` for an invertible square matrix `A`, by bringing `A` into column Hermite
/// form. Panics if `A` is not invertible.
///
pub fn solve_left_regular<R>(ring: R, matrix: &OwnedMatrix<El<R>>, rhs: &OwnedMatrix<El<R>>) -> OwnedMatrix<El<R>>
    where R: RingStore + Sync,
        R::Type: EuclideanRing,
        El<R>: Send + Sync
{
    assert_eq!(matrix.row_count(), matrix.col_count(), "matrix must be square");
    assert_eq!(matrix.row_count(), rhs.col_count(), "right-hand side has {} columns, but the matrix has {} rows", rhs.col_count(), matrix.row_count());
    let elimination = eliminate(&ring, matrix, EliminationForm::ColHermite);
    assert!(elimination.result().is_identity(&ring), "matrix is not invertible");

    // P A Q = I, so x = b Q P
    let mut result = rhs.clone_matrix(&ring);
    result.apply_col_operations(elimination.col_ops(), &ring);
    for op in elimination.row_ops().iter().rev() {
        result.apply_col_operation(&op.clone_op(&ring).opposite(), &ring);
    }
    return result;
}

///
/// Checks whether `A x = b` has a solution, for a column vector `b`.
///
/// This computes the structural pivots of `A`, and then compares the ranks of the Schur
/// complements of the pivot block in `A` and `[A | b]`.
///
pub fn has_solution<R>(ring: R, matrix: &OwnedMatrix<El<R>>, rhs: &OwnedMatrix<El<R>>) -> bool
    where R: RingStore + Sync,
        R::Type: Field,
        El<R>: Send + Sync
{
    assert_eq!(matrix.row_count(), rhs.row_count());
    assert_eq!(1, rhs.col_count(), "right-hand side must be a column vector");
    let col_count = matrix.col_count();
    let pivots = find_pivots(&ring, matrix);
    let r = pivots.pivot_count();
    let extended = SparseRowMatrix::from_dense(&matrix.concat_cols(rhs, &ring), &ring);
    let (_, _, schur_complement) = prefactorize(&ring, &extended, &pivots.with_appended_cols(1));

    // in echelon form, A x = b is inconsistent iff some row has its leading entry in the last column
    let elimination = eliminate_sparse(&ring, schur_complement, EliminationForm::RowEchelon);
    let echelon = elimination.result();
    return (0..echelon.row_count()).all(|i| (0..=(col_count - r)).find(|j| !ring.is_zero(echelon.at(i, *j))) != Some(col_count - r));
}

///
/// Checks whether `A x = b` has a solution, for a column vector `b`, by comparing the ranks of
/// `A` and `[A | b]` as computed by the randomized [`super::rank::calculate_rank_with_pivots()`].
///
/// If the result is `true`, then a solution exists. If it is `false`, there is a small
/// probability that the rank of `A` was underestimated, and a solution exists anyway.
///
pub fn probably_has_solution<const P: u64>(ring: Fp<P>, matrix: &OwnedMatrix<u64>, rhs: &OwnedMatrix<u64>) -> bool {
    assert_eq!(matrix.row_count(), rhs.row_count());
    assert_eq!(1, rhs.col_count(), "right-hand side must be a column vector");
    let pivots = find_pivots(ring, matrix).pivots;
    let matrix_sparse = SparseRowMatrix::from_dense(matrix, ring);
    let extended = SparseRowMatrix::<u64>::from_dense(&matrix.concat_cols(rhs, ring), ring);
    let rank = calculate_rank_with_pivots(ring, &matrix_sparse, &pivots, RankConfig::default());
    let extended_rank = calculate_rank_with_pivots(ring, &extended, &pivots, RankConfig::default());
    return extended_rank <= rank;
}

#[cfg(test)]
use crate::primitive_int::StaticRing;
#[cfg(test)]
use crate::rings::zn::F2;
#[cfg(test)]
use crate::assert_matrix_eq;

#[cfg(test)]
fn test_system_f2() -> OwnedMatrix<u64> {
    OwnedMatrix::new(vec![
        1, 0, 1, 0,
        0, 1, 1, 1,
        0, 0, 0, 0,
        1, 1, 0, 1,
        1, 0, 1, 0
    ], 4)
}

#[test]
fn test_solve_left_upper_triangular() {
    let ring = StaticRing::<i64>::RING;
    let U = OwnedMatrix::new(vec![
        1, 2, 3,
        0, -1, 4,
        0, 0, 1
    ], 3);
    let B = OwnedMatrix::new(vec![
        1, 0, 5,
        0, 0, 0,
        2, 3, 0
    ], 3);
    let X = solve_left_upper_triangular(ring, &U, &B);
    assert_eq!(&[1, 2, -6], X.row(0));
    assert_eq!(&[0, 0, 0], X.row(1));
    assert_matrix_eq!(&ring, &X.mul(&U, ring), &B);
}

#[test]
fn test_solve_left_upper_triangular_destructive_keeps_tail() {
    let ring = StaticRing::<i64>::RING;
    let U = SparseRowMatrix::from_dense(&OwnedMatrix::new(vec![
        1, 1, 0, 2,
        0, 1, 1, 0
    ], 4), ring);
    let mut rhs = SparseRow::from_entries([(0, 2), (1, 1), (3, 1)], ring);
    let x = solve_left_upper_triangular_destructive(ring, &U, &mut rhs, &mut Vec::new());
    assert_eq!(vec![(0, &2), (1, &-1)], x.iter().collect::<Vec<_>>());
    assert_eq!(vec![(2, &1), (3, &-3)], rhs.iter().collect::<Vec<_>>());
}

#[test]
#[should_panic]
fn test_solve_left_upper_triangular_non_unit() {
    let ring = StaticRing::<i64>::RING;
    let U = OwnedMatrix::new(vec![2, 1, 0, 1], 2);
    solve_left_upper_triangular(ring, &U, &OwnedMatrix::new(vec![2, 0], 2));
}

#[test]
fn test_solve_left_regular() {
    let ring = StaticRing::<i64>::RING;
    let A = OwnedMatrix::new(vec![2, 1, 1, 1], 2);
    let x = solve_left_regular(ring, &A, &OwnedMatrix::new(vec![3, 2], 2));
    assert_eq!(&[1, 1], x.row(0));

    let ring = Fp::<5>::RING;
    let A = OwnedMatrix::new(vec![
        1, 2, 0,
        0, 1, 3,
        1, 0, 1
    ], 3);
    let B = OwnedMatrix::new(vec![
        1, 2, 3,
        4, 0, 0
    ], 3);
    let X = solve_left_regular(ring, &A, &B);
    assert_matrix_eq!(&ring, &X.mul(&A, ring), &B);
}

#[test]
#[should_panic]
fn test_solve_left_regular_singular() {
    let ring = StaticRing::<i64>::RING;
    let A = OwnedMatrix::new(vec![2, 0, 0, 1], 2);
    solve_left_regular(ring, &A, &OwnedMatrix::new(vec![1, 1], 2));
}

#[test]
fn test_has_solution() {
    let ring = F2::RING;
    let A = test_system_f2();
    assert!(has_solution(ring, &A, &OwnedMatrix::new(vec![1, 1, 0, 0, 1], 1)));
    assert!(has_solution(ring, &A, &OwnedMatrix::new(vec![0, 0, 0, 0, 0], 1)));
    assert!(!has_solution(ring, &A, &OwnedMatrix::new(vec![1, 1, 0, 0, 0], 1)));

    let ring = Fp::<7>::RING;
    let A = OwnedMatrix::new(vec![1, 2, 2, 4], 2);
    assert!(has_solution(ring, &A, &OwnedMatrix::new(vec![1, 2], 1)));
    assert!(!has_solution(ring, &A, &OwnedMatrix::new(vec![1, 3], 1)));
}

#[test]
fn test_probably_has_solution() {
    let ring = F2::RING;
    let A = test_system_f2();
    assert!(probably_has_solution(ring, &A, &OwnedMatrix::new(vec![1, 1, 0, 0, 1], 1)));
    assert!(probably_has_solution(ring, &A, &OwnedMatrix::new(vec![0, 0, 0, 0, 0], 1)));
    assert!(!probably_has_solution(ring, &A, &OwnedMatrix::new(vec![1, 1, 0, 0, 0], 1)));
}
