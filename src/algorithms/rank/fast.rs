use tracing::instrument;

use crate::matrix::*;
use crate::parallel::potential_parallel_for_each;
use crate::rings::zn::{Fp, ZnBase};
use crate::sparse::{SparseRow, SparseRowMatrix};

use super::super::pivot::find_pivots_sparse;
use super::{RankCalculator, RankConfig};

///
/// Same as [`super::calculate_rank()`], but all slots share one contiguous buffer.
///
#[stability::unstable(feature = "enable")]
pub fn calculate_rank<const P: u64, M>(ring: Fp<P>, matrix: &M) -> usize
    where M: Matrix<ZnBase<P, true>>
{
    let matrix = SparseRowMatrix::from_dense(matrix, ring);
    let pivots = find_pivots_sparse(ring, &matrix).pivots;
    calculate_rank_with_pivots(ring, &matrix, &pivots, RankConfig::default())
}

///
/// Same as [`super::calculate_rank_with_pivots()`], but all slots share one contiguous buffer
/// of length `slots * col_count`, and the `k`-th slot works on the `k`-th chunk.
///
/// For the same config, this gives the same result as [`super::calculate_rank_with_pivots()`].
///
#[stability::unstable(feature = "enable")]
#[instrument(skip_all, level = "trace")]
pub fn calculate_rank_with_pivots<const P: u64>(ring: Fp<P>, matrix: &SparseRowMatrix<u64>, pivots: &[(usize, usize, u64)], config: RankConfig) -> usize {
    let mut calculator = RankCalculator::new(ring, matrix, pivots, config);
    let cols = matrix.col_count();
    if calculator.remaining_rows.is_empty() || cols == 0 {
        return calculator.pivots.len();
    }
    let slots = calculator.config.slots;
    let mut buffer = vec![0; cols * slots];
    calculator.run(|calculator, step, round| {
        let mut candidates: Vec<Option<SparseRow<u64>>> = (0..slots).map(|_| None).collect();
        let work = buffer.chunks_mut(cols).zip(candidates.iter_mut()).collect::<Vec<_>>();
        potential_parallel_for_each(work, || (), |_, slot, (chunk, candidate)| {
            let row = calculator.random_combination(step, round, slot);
            *candidate = calculator.reduce(row, chunk);
        });
        return candidates.into_iter().flatten().collect();
    })
}

#[cfg(test)]
use crate::rings::zn::F2;
#[cfg(test)]
use oorandom::Rand64;

#[test]
fn test_calculate_rank_fast() {
    let ring = F2::RING;
    let A: OwnedMatrix<u64> = OwnedMatrix::new(vec![
        1, 0, 1, 0,
        0, 1, 1, 1,
        0, 0, 0, 0,
        1, 1, 0, 1,
        1, 0, 1, 0
    ], 4);
    assert_eq!(2, calculate_rank(ring, &A));
    assert_eq!(0, calculate_rank(ring, &OwnedMatrix::<u64>::from_fn(3, 0, |_, _| 0)));
}

#[test]
fn test_calculate_rank_fast_agrees() {
    let ring = Fp::<3>::RING;
    let mut rng = Rand64::new(11);
    for _ in 0..5 {
        let A: OwnedMatrix<u64> = OwnedMatrix::from_fn(25, 30, |_, _| if rng.rand_u64() % 5 == 0 { rng.rand_range(0..3) } else { 0 });
        let A_sparse = SparseRowMatrix::from_dense(&A, ring);
        for config in [RankConfig::default(), RankConfig { slots: 3, seed: 42 }] {
            assert_eq!(
                super::calculate_rank_with_pivots(ring, &A_sparse, &[], config),
                calculate_rank_with_pivots(ring, &A_sparse, &[], config)
            );
        }
    }
}
