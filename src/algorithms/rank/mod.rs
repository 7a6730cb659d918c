use oorandom::Rand64;
use tracing::{event, instrument, Level};

use crate::field::FieldStore;
use crate::matrix::*;
use crate::parallel::potential_parallel_map;
use crate::ring::*;
use crate::rings::zn::{Fp, ZnBase};
use crate::sparse::{SparseRow, SparseRowMatrix};

use super::pivot::find_pivots_sparse;

///
/// Contains a variant of the rank computation that uses a single flat buffer.
///
pub mod fast;

///
/// Parameters of the randomized rank computation.
///
/// Every round tries `slots` random combinations of the remaining rows in parallel. The
/// randomness is derived from `seed`, so the result is reproducible for a fixed seed.
///
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RankConfig {
    pub slots: usize,
    pub seed: u128
}

impl Default for RankConfig {

    fn default() -> Self {
        RankConfig { slots: 8, seed: 0x8c5e_3a6b_71f2_4d09 }
    }
}

///
/// Computes the rank of a matrix over a prime field, with a randomized algorithm.
///
/// The result is never larger than the actual rank, but with small probability it
/// might be smaller. Use [`super::elimination::eliminate()`] for an exact result.
///
/// # Example
/// ```rust
/// # use feanor_sparse::ring::*;
/// # use feanor_sparse::rings::zn::*;
/// # use feanor_sparse::matrix::*;
/// # use feanor_sparse::algorithms::rank::*;
/// let A: OwnedMatrix<u64> = OwnedMatrix::new(vec![
///     1, 1, 0,
///     0, 1, 1,
///     1, 0, 1
/// ], 3);
/// assert_eq!(2, calculate_rank(F2::RING, &A));
/// ```
///
pub fn calculate_rank<const P: u64, M>(ring: Fp<P>, matrix: &M) -> usize
    where M: Matrix<ZnBase<P, true>>
{
    let matrix = SparseRowMatrix::from_dense(matrix, ring);
    let pivots = find_pivots_sparse(ring, &matrix).pivots;
    calculate_rank_with_pivots(ring, &matrix, &pivots, RankConfig::default())
}

///
/// Computes the rank of a matrix over a prime field, starting from the given pivots.
///
/// The pivots must be ordered such that each pivot row has zeros in the pivot columns of
/// all previous pivots, as returned by [`super::pivot::find_pivots()`]. The remaining rows are
/// then reduced by eliminating random linear combinations of them against the pivots. The number
/// of rows per combination is doubled whenever a round yields no new pivot.
///
#[instrument(skip_all, level = "trace")]
pub fn calculate_rank_with_pivots<const P: u64>(ring: Fp<P>, matrix: &SparseRowMatrix<u64>, pivots: &[(usize, usize, u64)], config: RankConfig) -> usize {
    let mut calculator = RankCalculator::new(ring, matrix, pivots, config);
    if calculator.remaining_rows.is_empty() {
        return calculator.pivots.len();
    }
    let mut buffers = (0..calculator.config.slots).map(|_| vec![0; matrix.col_count()]).collect::<Vec<_>>();
    calculator.run(|calculator, step, round| {
        let candidates = potential_parallel_map(std::mem::take(&mut buffers), |slot, mut buffer| {
            let row = calculator.random_combination(step, round, slot);
            let row = calculator.reduce(row, &mut buffer);
            (buffer, row)
        });
        let mut result = Vec::new();
        for (buffer, row) in candidates {
            buffers.push(buffer);
            result.extend(row);
        }
        return result;
    })
}

struct RankCalculator<const P: u64> {
    ring: Fp<P>,
    data: SparseRowMatrix<u64>,
    pivots: Vec<(usize, usize, u64)>,
    remaining_rows: Vec<usize>,
    config: RankConfig,
    buffer: Vec<u64>
}

impl<const P: u64> RankCalculator<P> {

    fn new(ring: Fp<P>, matrix: &SparseRowMatrix<u64>, pivots: &[(usize, usize, u64)], config: RankConfig) -> Self {
        assert!(config.slots > 0);
        let mut is_pivot_row = vec![false; matrix.row_count()];
        for (i, _, _) in pivots {
            is_pivot_row[*i] = true;
        }
        let remaining_rows = (0..matrix.row_count()).filter(|i| !is_pivot_row[*i] && !matrix.row(*i).is_empty()).collect();
        RankCalculator {
            ring: ring,
            data: matrix.clone_matrix(ring),
            pivots: pivots.to_vec(),
            remaining_rows: remaining_rows,
            config: config,
            buffer: vec![0; matrix.col_count()]
        }
    }

    ///
    /// Runs the main loop, where `find_candidates` is called once per round with the current
    /// step and round, and returns the nonzero candidate rows, already reduced by the pivots.
    ///
    fn run<F>(&mut self, mut find_candidates: F) -> usize
        where F: FnMut(&Self, usize, usize) -> Vec<SparseRow<u64>>
    {
        let n = self.remaining_rows.len();
        let mut step = 1;
        let mut round = 0;
        loop {
            let mut added = 0;
            let candidates = find_candidates(&*self, step, round);
            // candidates of the same round may depend on each other
            let mut buffer = std::mem::take(&mut self.buffer);
            for row in candidates {
                if let Some(row) = self.reduce(row, &mut buffer) {
                    self.add_pivot(row);
                    added += 1;
                }
            }
            self.buffer = buffer;
            event!(Level::TRACE, round = round, step = step, added = added, rank = self.pivots.len());
            round += 1;
            if added == 0 {
                if step < n {
                    step = std::cmp::min(2 * step, n);
                } else {
                    break;
                }
            }
        }
        event!(Level::INFO, rounds = round, rank = self.pivots.len());
        return self.pivots.len();
    }

    fn add_pivot(&mut self, row: SparseRow<u64>) {
        let (j, x) = row.leading_entry().unwrap();
        let pivot = (self.data.row_count(), j, *x);
        self.data.push_row(row);
        self.pivots.push(pivot);
    }

    fn rng_for(&self, round: usize, slot: usize) -> Rand64 {
        Rand64::new(self.config.seed ^ ((round as u128) << 64) ^ (slot as u128).wrapping_mul(0x9e37_79b9_7f4a_7c15))
    }

    ///
    /// Returns a random linear combination of `step` randomly chosen remaining rows, with nonzero
    /// coefficients. Once `step` covers all remaining rows, returns a combination of all of them
    /// with uniformly random coefficients instead.
    ///
    fn random_combination(&self, step: usize, round: usize, slot: usize) -> SparseRow<u64> {
        let mut rng = self.rng_for(round, slot);
        let mut result = SparseRow::new();
        let mut buffer = Vec::new();
        if step < self.remaining_rows.len() {
            for _ in 0..step {
                let coeff = 1 + rng.rand_range(0..(P - 1));
                let i = self.remaining_rows[rng.rand_range(0..(self.remaining_rows.len() as u64)) as usize];
                result.add_scaled_with_buffer(self.data.row(i), &coeff, self.ring, &mut buffer);
            }
        } else {
            for i in &self.remaining_rows {
                let coeff = self.ring.get_ring().random_element(|| rng.rand_u64());
                if !self.ring.is_zero(&coeff) {
                    result.add_scaled_with_buffer(self.data.row(*i), &coeff, self.ring, &mut buffer);
                }
            }
        }
        return result;
    }

    ///
    /// Eliminates the pivots from `row`, in order, using the dense `buffer`, which must be
    /// zero and is left zero.
    ///
    fn reduce(&self, row: SparseRow<u64>, buffer: &mut [u64]) -> Option<SparseRow<u64>> {
        let ring = self.ring;
        debug_assert!(buffer.iter().all(|x| ring.is_zero(x)));
        for (j, x) in row.iter() {
            buffer[j] = *x;
        }
        for (i, j, pivot) in &self.pivots {
            if ring.is_zero(&buffer[*j]) {
                continue;
            }
            let factor = ring.negate(ring.div(&buffer[*j], pivot));
            for (k, x) in self.data.row(*i).iter() {
                ring.add_assign(&mut buffer[k], ring.mul_ref(x, &factor));
            }
        }
        let mut result = SparseRow::new();
        for (j, x) in buffer.iter_mut().enumerate() {
            if !ring.is_zero(x) {
                result.push(j, std::mem::replace(x, 0));
            }
        }
        return if result.is_empty() { None } else { Some(result) };
    }
}

#[cfg(test)]
use crate::rings::zn::F2;
#[cfg(test)]
use crate::algorithms::elimination::{eliminate, EliminationForm};
#[cfg(test)]
use crate::tracing::LogAlgorithmSubscriber;

#[cfg(test)]
fn random_low_rank_matrix<const P: u64>(rng: &mut Rand64, rows: usize, cols: usize, rank: usize) -> OwnedMatrix<u64> {
    let ring = Fp::<P>::RING;
    let left = OwnedMatrix::from_fn(rows, rank, |_, _| rng.rand_range(0..P));
    let right = OwnedMatrix::from_fn(rank, cols, |_, _| if rng.rand_u64() % 4 == 0 { rng.rand_range(0..P) } else { 0 });
    return left.mul(&right, ring);
}

#[test]
fn test_calculate_rank_small() {
    let ring = F2::RING;
    let A = OwnedMatrix::new(vec![
        1, 0, 1, 0,
        0, 1, 1, 1,
        0, 0, 0, 0,
        1, 1, 0, 1,
        1, 0, 1, 0
    ], 4);
    assert_eq!(2, calculate_rank(ring, &A));
    assert_eq!(0, calculate_rank(ring, &OwnedMatrix::zero(3, 3, ring)));
    assert_eq!(3, calculate_rank(ring, &OwnedMatrix::identity(3, 3, ring)));
}

#[test]
fn test_calculate_rank_without_pivots() {
    let ring = F2::RING;
    let A = OwnedMatrix::new(vec![
        1, 1, 0, 1,
        0, 1, 1, 1,
        1, 0, 1, 0,
        1, 1, 1, 0
    ], 4);
    let A_sparse = SparseRowMatrix::from_dense(&A, ring);
    assert_eq!(3, calculate_rank_with_pivots(ring, &A_sparse, &[], RankConfig::default()));
    assert_eq!(3, calculate_rank_with_pivots(ring, &A_sparse, &[], RankConfig { slots: 24, seed: 1 }));
    assert!(calculate_rank_with_pivots(ring, &A_sparse, &[], RankConfig { slots: 1, seed: 1 }) <= 3);
}

#[cfg(test)]
fn calculate_rank_reliably<const P: u64>(A: &OwnedMatrix<u64>) -> usize {
    let ring = Fp::<P>::RING;
    let A_sparse = SparseRowMatrix::from_dense(A, ring);
    let pivots = find_pivots_sparse(ring, &A_sparse).pivots;
    let result = calculate_rank_with_pivots(ring, &A_sparse, &pivots, RankConfig { slots: 32, seed: 7 });
    assert!(calculate_rank(ring, A) <= result);
    return result;
}

#[test]
fn test_calculate_rank_random() {
    LogAlgorithmSubscriber::init_test();
    let mut rng = Rand64::new(5);
    for rank in [1, 4, 10, 25] {
        let A = random_low_rank_matrix::<2>(&mut rng, 40, 60, rank);
        let expected = eliminate(F2::RING, &A, EliminationForm::Diagonal).rank();
        assert_eq!(expected, calculate_rank_reliably::<2>(&A));
    }
    for rank in [3, 12] {
        let A = random_low_rank_matrix::<7>(&mut rng, 30, 20, rank);
        let expected = eliminate(Fp::<7>::RING, &A, EliminationForm::Diagonal).rank();
        assert_eq!(expected, calculate_rank_reliably::<7>(&A));
    }
}
