use tracing::{event, instrument, Level};

use crate::divisibility::*;
use crate::field::Field;
use crate::matrix::*;
use crate::parallel::potential_parallel_map;
use crate::ring::*;
use crate::sparse::{SparseRow, SparseRowMatrix};

use super::linsolve::solve_left_upper_triangular_destructive;
use super::pivot::{find_pivots_sparse, PivotResult};

///
/// A factorization `P A Q = L U` as computed by [`factorize()`], where `P` and `Q` are
/// permutation matrices (given by `row_permutation` resp. `col_permutation` in the sense
/// of [`OwnedMatrix::permute_rows()`] resp. [`OwnedMatrix::permute_cols()`]), `L` is an
/// `m x r` lower triangular matrix with ones on the diagonal, and `U` is an `r x n` upper
/// triangular matrix with nonzero diagonal. Here `r` is the rank of `A`.
///
pub struct LUResult<T> {
    pub row_permutation: Permutation,
    pub col_permutation: Permutation,
    pub L: OwnedMatrix<T>,
    pub U: OwnedMatrix<T>
}

impl<T> LUResult<T> {

    pub fn rank(&self) -> usize {
        self.U.row_count()
    }
}

fn permute_sparse<R>(ring: R, matrix: &SparseRowMatrix<El<R>>, pivots: &PivotResult<El<R>>) -> SparseRowMatrix<El<R>>
    where R: RingStore
{
    assert_eq!(matrix.row_count(), pivots.row_permutation.len());
    assert_eq!(matrix.col_count(), pivots.col_permutation.len());
    let rows = (0..matrix.row_count()).map(|k| SparseRow::from_entries(
        matrix.row(pivots.row_permutation.apply(k)).iter().map(|(j, x)| (pivots.col_permutation.position_of(j), ring.clone_el(x))),
        &ring
    )).collect();
    return SparseRowMatrix::from_rows(rows, matrix.col_count());
}

///
/// Eliminates the pivot block of a matrix, without touching the rest.
///
/// More concretely, let `P A Q = [[U1, B], [C, D]]` be the matrix permuted according to the
/// given pivots, such that `U1` is the square upper triangular pivot block. Then this computes
/// `L = C U1^-1`, `U = [U1, B]` and the Schur complement `S = D - C U1^-1 B`, so that
/// ```text
/// P A Q = [[I], [L]] U + [[0, 0], [0, S]]
/// ```
/// The rows of `L` and `S` are computed independently, in parallel if the feature `parallel`
/// is enabled.
///
#[instrument(skip_all, level = "trace")]
pub fn prefactorize<R>(ring: R, matrix: &SparseRowMatrix<El<R>>, pivots: &PivotResult<El<R>>) -> (SparseRowMatrix<El<R>>, SparseRowMatrix<El<R>>, SparseRowMatrix<El<R>>)
    where R: RingStore + Sync,
        R::Type: DivisibilityRing,
        El<R>: Send + Sync
{
    let r = pivots.pivot_count();
    let col_count = matrix.col_count();
    let mut rows = permute_sparse(&ring, matrix, pivots).into_rows();
    let lower_rows = rows.split_off(r);
    let upper = SparseRowMatrix::from_rows(rows, col_count);

    let solved = potential_parallel_map(lower_rows, |_, mut row| {
        let x = solve_left_upper_triangular_destructive(&ring, &upper, &mut row, &mut Vec::new());
        debug_assert!(row.leading_col().map(|j| j >= r).unwrap_or(true));
        let schur_row = SparseRow::from_entries(row.into_entries().into_iter().map(|(j, x)| (j - r, x)), &ring);
        (x, schur_row)
    });
    let (lower, schur_complement): (Vec<_>, Vec<_>) = solved.into_iter().unzip();
    event!(Level::TRACE, pivots = r, schur_complement_rows = schur_complement.len());
    return (
        SparseRowMatrix::from_rows(lower, r),
        upper,
        SparseRowMatrix::from_rows(schur_complement, col_count - r)
    );
}

///
/// Computes the LU-decomposition `P A Q = L U` of a matrix over a field.
///
/// This repeatedly computes structural pivots (see [`super::pivot::find_pivots()`]) and
/// eliminates them using [`prefactorize()`], continuing with the Schur complement until
/// it is zero.
///
/// # Example
/// ```rust
/// # use feanor_sparse::ring::*;
/// # use feanor_sparse::rings::zn::*;
/// # use feanor_sparse::matrix::*;
/// # use feanor_sparse::algorithms::lu::*;
/// let ring = Fp::<7>::RING;
/// let A: OwnedMatrix<u64> = OwnedMatrix::new(vec![
///     1, 2, 3,
///     2, 4, 6,
///     0, 1, 1
/// ], 3);
/// let lu = factorize(ring, &A);
/// assert_eq!(2, lu.rank());
/// let A_permuted = A.permute_rows(&lu.row_permutation, ring).permute_cols(&lu.col_permutation, ring);
/// assert!(A_permuted.matrix_eq(&lu.L.mul(&lu.U, ring), ring));
/// ```
///
#[instrument(skip_all, level = "trace")]
pub fn factorize<R, M>(ring: R, matrix: &M) -> LUResult<El<R>>
    where R: RingStore + Sync,
        R::Type: Field,
        El<R>: Send + Sync,
        M: Matrix<R::Type>
{
    let row_count = matrix.row_count();
    let col_count = matrix.col_count();
    let mut row_order = (0..row_count).collect::<Vec<_>>();
    let mut col_order = (0..col_count).collect::<Vec<_>>();
    let mut L = OwnedMatrix::identity(row_count, row_count, &ring);
    let mut U = OwnedMatrix::zero(row_count, col_count, &ring);

    // the remaining matrix is the block of P A Q with rows and columns starting at `done`
    let mut remaining = SparseRowMatrix::from_dense(matrix, &ring);
    let mut done = 0;
    let mut rounds = 0;
    loop {
        let pivots = find_pivots_sparse(&ring, &remaining);
        let r = pivots.pivot_count();
        if r == 0 {
            break;
        }
        let (lower, upper, schur_complement) = prefactorize(&ring, &remaining, &pivots);

        let new_row_order = (0..remaining.row_count()).map(|k| row_order[done + pivots.row_permutation.apply(k)]).collect::<Vec<_>>();
        row_order[done..].copy_from_slice(&new_row_order);
        let new_col_order = (0..remaining.col_count()).map(|k| col_order[done + pivots.col_permutation.apply(k)]).collect::<Vec<_>>();
        col_order[done..].copy_from_slice(&new_col_order);

        // the already computed parts of L and U must follow the permutation of the remaining block
        let old_L = L.submatrix(done..row_count, 0..done, &ring);
        for k in 0..remaining.row_count() {
            for j in 0..done {
                *L.at_mut(done + k, j) = ring.clone_el(old_L.at(pivots.row_permutation.apply(k), j));
            }
        }
        let old_U = U.submatrix(0..done, done..col_count, &ring);
        for i in 0..done {
            for k in 0..remaining.col_count() {
                *U.at_mut(i, done + k) = ring.clone_el(old_U.at(i, pivots.col_permutation.apply(k)));
            }
        }

        for (i, j, x) in upper.components() {
            *U.at_mut(done + i, done + j) = ring.clone_el(x);
        }
        for (i, j, x) in lower.components() {
            *L.at_mut(done + r + i, done + j) = ring.clone_el(x);
        }

        done += r;
        rounds += 1;
        remaining = schur_complement;
        event!(Level::TRACE, round = rounds, pivots = r, rank = done);
    }
    event!(Level::INFO, rounds = rounds, rank = done);

    return LUResult {
        row_permutation: Permutation::from_order(row_order),
        col_permutation: Permutation::from_order(col_order),
        L: L.submatrix(0..row_count, 0..done, &ring),
        U: U.submatrix(0..done, 0..col_count, &ring)
    };
}

#[cfg(test)]
use crate::primitive_int::StaticRing;
#[cfg(test)]
use crate::rings::zn::{Fp, F2};
#[cfg(test)]
use crate::algorithms::elimination::{eliminate, EliminationForm};
#[cfg(test)]
use crate::assert_matrix_eq;
#[cfg(test)]
use crate::tracing::LogAlgorithmSubscriber;

#[cfg(test)]
fn assert_lu_valid<R>(ring: R, A: &OwnedMatrix<El<R>>, lu: &LUResult<El<R>>)
    where R: RingStore + Copy,
        R::Type: Field
{
    let A_permuted = A.permute_rows(&lu.row_permutation, ring).permute_cols(&lu.col_permutation, ring);
    assert_matrix_eq!(&ring, &A_permuted, &lu.L.mul(&lu.U, ring));
    for i in 0..lu.L.row_count() {
        for j in i..lu.rank() {
            assert!(if i == j { ring.is_one(lu.L.at(i, j)) } else { ring.is_zero(lu.L.at(i, j)) });
        }
    }
    for i in 0..lu.rank() {
        assert!(!ring.is_zero(lu.U.at(i, i)));
        for j in 0..i {
            assert!(ring.is_zero(lu.U.at(i, j)));
        }
    }
}

#[test]
fn test_prefactorize() {
    let ring = StaticRing::<i64>::RING;
    let A = OwnedMatrix::new(vec![
        1, 0, 0, 0, 0, 1, 0, 0, 1,
        0, 1, 1, 1, 0, 1, 0, 1, 0,
        0, 0, 1, 1, 0, 0, 0, 1, 1,
        0, 1, 0, 0, 1, 0, 0, 0, 0,
        0, 0, 1, 0, 0, 0, 0, 0, 0,
        0, 1, 0, 0, 0, 1, 0, 1, 0
    ], 9);
    let A_sparse = SparseRowMatrix::from_dense(&A, ring);
    let pivots = find_pivots_sparse(ring, &A_sparse);
    let r = pivots.pivot_count();
    assert_eq!(5, r);
    let (L, U, S) = prefactorize(ring, &A_sparse, &pivots);
    assert_eq!((1, 5), (L.row_count(), L.col_count()));
    assert_eq!((5, 9), (U.row_count(), U.col_count()));
    assert_eq!((1, 4), (S.row_count(), S.col_count()));

    let mut IL = OwnedMatrix::identity(6, r, ring);
    for (i, j, x) in L.components() {
        *IL.at_mut(r + i, j) = *x;
    }
    let mut expected = IL.mul(&U.to_dense(ring), ring);
    for (i, j, x) in S.components() {
        *expected.at_mut(r + i, r + j) += *x;
    }
    let A_permuted = A.permute_rows(&pivots.row_permutation, ring).permute_cols(&pivots.col_permutation, ring);
    assert_matrix_eq!(&ring, &A_permuted, &expected);
}

#[test]
fn test_factorize_f2() {
    let ring = F2::RING;
    let A: OwnedMatrix<u64> = OwnedMatrix::new(vec![
        1, 0, 1, 0,
        0, 1, 1, 1,
        0, 0, 0, 0,
        1, 1, 0, 1,
        1, 0, 1, 0
    ], 4);
    let lu = factorize(ring, &A);
    assert_eq!(2, lu.rank());
    assert_lu_valid(ring, &A, &lu);
}

#[test]
fn test_factorize_needs_several_rounds() {
    let ring = Fp::<7>::RING;
    // every row contains all columns of the first row, so every round finds only one pivot
    let A: OwnedMatrix<u64> = OwnedMatrix::new(vec![
        1, 1, 1, 1,
        1, 2, 3, 4,
        1, 4, 2, 1,
        1, 3, 4, 0
    ], 4);
    let lu = factorize(ring, &A);
    assert_eq!(eliminate(ring, &A, EliminationForm::Diagonal).rank(), lu.rank());
    assert_lu_valid(ring, &A, &lu);
}

#[test]
fn test_factorize_random() {
    LogAlgorithmSubscriber::init_test();
    let ring = Fp::<5>::RING;
    let mut rng = oorandom::Rand64::new(3);
    for _ in 0..5 {
        let A: OwnedMatrix<u64> = OwnedMatrix::from_fn(12, 9, |_, _| if rng.rand_u64() % 3 == 0 { rng.rand_u64() % 5 } else { 0 });
        let lu = factorize(ring, &A);
        assert_eq!(eliminate(ring, &A, EliminationForm::Diagonal).rank(), lu.rank());
        assert_lu_valid(ring, &A, &lu);
    }
}

#[test]
fn test_factorize_zero() {
    let ring = Fp::<7>::RING;
    let A = OwnedMatrix::zero(3, 2, ring);
    let lu = factorize(ring, &A);
    assert_eq!(0, lu.rank());
    assert_lu_valid(ring, &A, &lu);
}
