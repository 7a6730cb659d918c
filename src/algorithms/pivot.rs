use std::cell::RefCell;
use std::collections::VecDeque;
use std::sync::Mutex;

use thread_local::ThreadLocal;
use tracing::{event, instrument, Level};

use crate::divisibility::*;
use crate::matrix::*;
use crate::parallel::potential_parallel_for_each;
use crate::ring::*;
use crate::sparse::SparseRowMatrix;

///
/// A set of structural pivots of a matrix `A`, as found by [`find_pivots()`].
///
/// The pivots are sorted such that permuting the rows of `A` by `row_permutation` and the
/// columns by `col_permutation` moves the pivots to the diagonal of the top left
/// `r x r` block (with `r = pivot_count()`), and this block is upper triangular. Non-pivot
/// rows and columns follow the pivot ones in ascending order.
///
pub struct PivotResult<T> {
    pub pivots: Vec<(usize, usize, T)>,
    pub row_permutation: Permutation,
    pub col_permutation: Permutation
}

impl<T> PivotResult<T> {

    pub fn pivot_count(&self) -> usize {
        self.pivots.len()
    }

    ///
    /// Returns the same pivots, considered as pivots of the matrix that has `count`
    /// additional columns on the right. The new columns are never pivot columns.
    ///
    pub fn with_appended_cols(self, count: usize) -> Self {
        let col_count = self.col_permutation.len();
        let col_order = self.col_permutation.order().iter().copied().chain(col_count..(col_count + count)).collect();
        PivotResult {
            pivots: self.pivots,
            row_permutation: self.row_permutation,
            col_permutation: Permutation::from_order(col_order)
        }
    }
}

///
/// Finds a large set of pivots of the given matrix, without performing any arithmetic.
///
/// The pivots are chosen only among entries that are units, and such that the dependency
/// graph between them is acyclic, i.e. the pivot rows can be permuted into a triangular
/// block. This follows the approach of "Parallel Sparse PLUQ Factorization modulo p" by
/// Bouillaguet, Delaplace and Voge.
///
/// # Example
/// ```rust
/// # use feanor_sparse::ring::*;
/// # use feanor_sparse::matrix::*;
/// # use feanor_sparse::rings::zn::*;
/// # use feanor_sparse::algorithms::pivot::*;
/// let ring = F2::RING;
/// let A: OwnedMatrix<u64> = OwnedMatrix::new(vec![
///     0, 1, 1,
///     1, 1, 0,
///     0, 0, 1
/// ], 3);
/// let pivots = find_pivots(ring, &A);
/// assert_eq!(3, pivots.pivot_count());
/// ```
///
pub fn find_pivots<R, M>(ring: R, matrix: &M) -> PivotResult<El<R>>
    where R: RingStore,
        R::Type: DivisibilityRing,
        M: Matrix<R::Type>
{
    find_pivots_sparse(&ring, &SparseRowMatrix::from_dense(matrix, &ring))
}

#[instrument(skip_all, level = "trace")]
pub fn find_pivots_sparse<R>(ring: R, matrix: &SparseRowMatrix<El<R>>) -> PivotResult<El<R>>
    where R: RingStore,
        R::Type: DivisibilityRing
{
    let structure = MatrixStructure::new(&ring, matrix);
    let mut finder = PivotFinder::new(&structure);
    finder.find_row_local_pivots();
    event!(Level::INFO, pivots = finder.pivots.count(), "row-local pivots");
    finder.find_col_extension_pivots();
    event!(Level::INFO, pivots = finder.pivots.count(), "column-extension pivots");
    finder.find_cycle_free_pivots();
    event!(Level::INFO, pivots = finder.pivots.count(), "cycle-free pivots");

    let order = finder.sorted_pivots();
    let mut is_pivot_row = vec![false; structure.row_count()];
    let mut is_pivot_col = vec![false; structure.col_count()];
    let pivots = order.iter().map(|(i, j)| {
        is_pivot_row[*i] = true;
        is_pivot_col[*j] = true;
        (*i, *j, ring.clone_el(matrix.at(*i, *j).unwrap()))
    }).collect::<Vec<_>>();

    let row_order = pivots.iter().map(|(i, _, _)| *i).chain((0..structure.row_count()).filter(|i| !is_pivot_row[*i])).collect();
    let col_order = pivots.iter().map(|(_, j, _)| *j).chain((0..structure.col_count()).filter(|j| !is_pivot_col[*j])).collect();
    return PivotResult {
        pivots: pivots,
        row_permutation: Permutation::from_order(row_order),
        col_permutation: Permutation::from_order(col_order)
    };
}

///
/// The nonzero pattern of the matrix, together with all information the heuristics
/// need. After this is built, no ring arithmetic is necessary anymore.
///
struct MatrixStructure {
    entries: Vec<Vec<usize>>,
    candidates: Vec<Vec<usize>>,
    lead_weights: Vec<usize>,
    row_weights: Vec<usize>,
    col_nnz: Vec<usize>
}

impl MatrixStructure {

    fn new<R>(ring: R, matrix: &SparseRowMatrix<El<R>>) -> Self
        where R: RingStore,
            R::Type: DivisibilityRing
    {
        let mut col_nnz = vec![0; matrix.col_count()];
        let mut entries = Vec::with_capacity(matrix.row_count());
        let mut candidates = Vec::with_capacity(matrix.row_count());
        let mut lead_weights = Vec::with_capacity(matrix.row_count());
        let mut row_weights = Vec::with_capacity(matrix.row_count());
        for row in matrix.rows() {
            entries.push(row.iter().map(|(j, _)| j).collect::<Vec<_>>());
            candidates.push(row.iter().filter(|(_, x)| ring.is_unit(x)).map(|(j, _)| j).collect::<Vec<_>>());
            lead_weights.push(row.leading_entry().map(|(_, x)| ring.elimination_weight(x)).unwrap_or(0));
            row_weights.push(row.weight(&ring));
            for (j, _) in row.iter() {
                col_nnz[j] += 1;
            }
        }
        return MatrixStructure { entries, candidates, lead_weights, row_weights, col_nnz };
    }

    fn row_count(&self) -> usize {
        self.entries.len()
    }

    fn col_count(&self) -> usize {
        self.col_nnz.len()
    }

    fn cols_in(&self, i: usize) -> &[usize] {
        &self.entries[i]
    }

    fn is_candidate(&self, i: usize, j: usize) -> bool {
        self.candidates[i].binary_search(&j).is_ok()
    }
}

///
/// The pivots found so far, as map from pivot column to pivot row. Pivots are
/// only ever added, so two registries that started equal can be synchronized
/// by copying the pivots that were added after the first `count()`.
///
#[derive(Clone)]
struct PivotData {
    row_of_col: Vec<Option<usize>>,
    cols: Vec<usize>
}

impl PivotData {

    fn new(col_count: usize) -> Self {
        PivotData { row_of_col: vec![None; col_count], cols: Vec::new() }
    }

    fn count(&self) -> usize {
        self.cols.len()
    }

    fn has_col(&self, j: usize) -> bool {
        self.row_of_col[j].is_some()
    }

    fn row_for(&self, j: usize) -> Option<usize> {
        self.row_of_col[j]
    }

    fn set(&mut self, i: usize, j: usize) {
        assert!(!self.has_col(j), "column {} already has a pivot", j);
        self.row_of_col[j] = Some(i);
        self.cols.push(j);
    }

    fn iter<'a>(&'a self) -> impl 'a + Iterator<Item = (usize, usize)> {
        self.cols.iter().map(|j| (self.row_of_col[*j].unwrap(), *j))
    }

    fn update_from(&mut self, newer: &PivotData) {
        debug_assert!(self.count() <= newer.count());
        for k in self.count()..newer.count() {
            let j = newer.cols[k];
            self.set(newer.row_of_col[j].unwrap(), j);
        }
    }
}

struct PivotFinder<'a> {
    structure: &'a MatrixStructure,
    pivots: PivotData
}

impl<'a> PivotFinder<'a> {

    fn new(structure: &'a MatrixStructure) -> Self {
        PivotFinder { structure: structure, pivots: PivotData::new(structure.col_count()) }
    }

    ///
    /// Nonempty rows that are not yet pivot rows, lightest first.
    ///
    fn remaining_rows(&self) -> Vec<usize> {
        let mut is_pivot_row = vec![false; self.structure.row_count()];
        for (i, _) in self.pivots.iter() {
            is_pivot_row[i] = true;
        }
        let mut result = (0..self.structure.row_count()).filter(|i| !is_pivot_row[*i] && !self.structure.entries[*i].is_empty()).collect::<Vec<_>>();
        result.sort_by_key(|i| (self.structure.row_weights[*i], *i));
        return result;
    }

    ///
    /// Every row whose leading entry is a unit claims the column of the leading entry,
    /// unless a cheaper row has already claimed it.
    ///
    fn find_row_local_pivots(&mut self) {
        let mut rows = self.remaining_rows();
        rows.sort_by_key(|i| (self.structure.lead_weights[*i], self.structure.row_weights[*i], *i));
        for i in rows {
            let j = self.structure.entries[i][0];
            if !self.pivots.has_col(j) && self.structure.is_candidate(i, j) {
                self.pivots.set(i, j);
            }
        }
    }

    ///
    /// Every remaining row takes its leftmost unit entry whose column does not appear
    /// in any pivot row, and then reserves all of its own columns.
    ///
    fn find_col_extension_pivots(&mut self) {
        let mut reserved = vec![false; self.structure.col_count()];
        for (i, _) in self.pivots.iter() {
            for j in self.structure.cols_in(i) {
                reserved[*j] = true;
            }
        }
        for i in self.remaining_rows() {
            let pivot_col = self.structure.cols_in(i).iter().copied().find(|j| !reserved[*j] && self.structure.is_candidate(i, *j));
            if let Some(j) = pivot_col {
                self.pivots.set(i, j);
                for j in self.structure.cols_in(i) {
                    reserved[*j] = true;
                }
            }
        }
    }

    fn find_cycle_free_pivots(&mut self) {
        let col_count = self.structure.col_count();
        let rows = self.remaining_rows();
        let registry = Mutex::new(std::mem::replace(&mut self.pivots, PivotData::new(col_count)));
        let snapshots: ThreadLocal<RefCell<PivotData>> = ThreadLocal::new();
        let workers: ThreadLocal<RefCell<RowWorker>> = ThreadLocal::new();
        let structure = self.structure;

        potential_parallel_for_each(rows, || (), |_, _, i| {
            let mut snapshot = snapshots.get_or(|| RefCell::new(registry.lock().unwrap().clone())).borrow_mut();
            let mut worker = workers.get_or(|| RefCell::new(RowWorker::new(col_count))).borrow_mut();
            find_cycle_free_pivot_in(i, structure, &registry, &mut snapshot, &mut worker);
        });

        self.pivots = registry.into_inner().unwrap();
    }

    ///
    /// Orders the pivots such that the pivot block is upper triangular, i.e. a pivot row
    /// may only contain pivot columns that come after its own pivot column.
    ///
    fn sorted_pivots(&self) -> Vec<(usize, usize)> {
        let mut in_degree = vec![0; self.structure.col_count()];
        for (i, j) in self.pivots.iter() {
            for j2 in self.structure.cols_in(i) {
                if *j2 != j && self.pivots.has_col(*j2) {
                    in_degree[*j2] += 1;
                }
            }
        }
        let mut open = self.pivots.iter().filter(|(_, j)| in_degree[*j] == 0).map(|(_, j)| j).collect::<VecDeque<_>>();
        let mut result = Vec::with_capacity(self.pivots.count());
        while let Some(j) = open.pop_front() {
            let i = self.pivots.row_for(j).unwrap();
            result.push((i, j));
            for j2 in self.structure.cols_in(i) {
                if *j2 != j && self.pivots.has_col(*j2) {
                    in_degree[*j2] -= 1;
                    if in_degree[*j2] == 0 {
                        open.push_back(*j2);
                    }
                }
            }
        }
        assert!(result.len() == self.pivots.count(), "the dependency graph of the pivots contains a cycle");
        return result;
    }
}

///
/// Searches a pivot for row `i` against the local snapshot, and commits it only if
/// no other thread committed a pivot in the meantime. Otherwise, the snapshot is
/// refreshed and the search starts over.
///
fn find_cycle_free_pivot_in(i: usize, structure: &MatrixStructure, registry: &Mutex<PivotData>, snapshot: &mut PivotData, worker: &mut RowWorker) {
    loop {
        snapshot.update_from(&registry.lock().unwrap());
        worker.init(i, structure, snapshot);
        worker.traverse(structure, snapshot);
        let Some(j) = worker.choose_candidate(structure) else {
            return;
        };
        let mut pivots = registry.lock().unwrap();
        if pivots.count() == snapshot.count() {
            pivots.set(i, j);
            snapshot.set(i, j);
            return;
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum ColStatus {
    Unknown, Candidate, Occupied
}

///
/// Per-thread scratch space for the breadth-first search through the pivot rows.
///
/// A column is occupied if it appears in a pivot row that is reachable from the current
/// row, since choosing it as pivot would close a cycle.
///
struct RowWorker {
    status: Vec<ColStatus>,
    queued: Vec<bool>,
    touched: Vec<usize>,
    queue: VecDeque<usize>,
    candidate_count: usize
}

impl RowWorker {

    fn new(col_count: usize) -> Self {
        RowWorker {
            status: vec![ColStatus::Unknown; col_count],
            queued: vec![false; col_count],
            touched: Vec::new(),
            queue: VecDeque::new(),
            candidate_count: 0
        }
    }

    fn reset(&mut self) {
        for j in self.touched.drain(..) {
            self.status[j] = ColStatus::Unknown;
            self.queued[j] = false;
        }
        self.queue.clear();
        self.candidate_count = 0;
    }

    fn init(&mut self, i: usize, structure: &MatrixStructure, pivots: &PivotData) {
        self.reset();
        for j in structure.cols_in(i) {
            if pivots.has_col(*j) {
                self.enqueue(*j);
                self.set_occupied(*j);
            } else if structure.is_candidate(i, *j) {
                self.set_candidate(*j);
            } else {
                self.set_occupied(*j);
            }
        }
    }

    fn traverse(&mut self, structure: &MatrixStructure, pivots: &PivotData) {
        while self.candidate_count > 0 {
            let Some(j) = self.queue.pop_front() else {
                return;
            };
            let i = pivots.row_for(j).unwrap();
            for j2 in structure.cols_in(i) {
                if pivots.has_col(*j2) && !self.queued[*j2] {
                    self.enqueue(*j2);
                }
                self.set_occupied(*j2);
            }
        }
    }

    ///
    /// Among the remaining candidates, prefers columns with few entries, since those
    /// cause less fill-in during the later elimination.
    ///
    fn choose_candidate(&self, structure: &MatrixStructure) -> Option<usize> {
        self.touched.iter().copied().filter(|j| self.status[*j] == ColStatus::Candidate).min_by_key(|j| (structure.col_nnz[*j], *j))
    }

    fn touch(&mut self, j: usize) {
        if self.status[j] == ColStatus::Unknown && !self.queued[j] {
            self.touched.push(j);
        }
    }

    fn enqueue(&mut self, j: usize) {
        self.touch(j);
        self.queued[j] = true;
        self.queue.push_back(j);
    }

    fn set_candidate(&mut self, j: usize) {
        self.touch(j);
        debug_assert!(self.status[j] == ColStatus::Unknown);
        self.status[j] = ColStatus::Candidate;
        self.candidate_count += 1;
    }

    fn set_occupied(&mut self, j: usize) {
        self.touch(j);
        if self.status[j] == ColStatus::Candidate {
            self.candidate_count -= 1;
        }
        self.status[j] = ColStatus::Occupied;
    }
}

#[cfg(test)]
use crate::primitive_int::StaticRing;
#[cfg(test)]
use crate::rings::zn::F2;
#[cfg(test)]
use crate::tracing::LogAlgorithmSubscriber;

#[cfg(test)]
fn structure_of(A: &OwnedMatrix<i64>) -> MatrixStructure {
    let ring = StaticRing::<i64>::RING;
    MatrixStructure::new(ring, &SparseRowMatrix::from_dense(A, ring))
}

#[cfg(test)]
fn assert_pivots_valid<R>(ring: R, A: &OwnedMatrix<El<R>>, pivots: &PivotResult<El<R>>)
    where R: RingStore + Copy,
        R::Type: DivisibilityRing
{
    let B = A.permute_rows(&pivots.row_permutation, ring).permute_cols(&pivots.col_permutation, ring);
    for k in 0..pivots.pivot_count() {
        assert!(ring.is_unit(B.at(k, k)));
        assert_el_eq!(ring, pivots.pivots[k].2, *B.at(k, k));
        for l in 0..k {
            assert!(ring.is_zero(B.at(k, l)), "pivot block is not upper triangular at ({}, {})", k, l);
        }
    }
}

#[test]
fn test_matrix_structure() {
    let A = OwnedMatrix::new(vec![
        1, 0, 2, 0,
        0, 0, 0, 0,
        0, -1, 3, 1
    ], 4);
    let structure = structure_of(&A);
    assert_eq!(vec![vec![0, 2], vec![], vec![1, 2, 3]], structure.entries);
    assert_eq!(vec![vec![0], vec![], vec![1, 3]], structure.candidates);
    assert_eq!(vec![1, 0, 1], structure.lead_weights);
    assert_eq!(vec![3, 0, 4], structure.row_weights);
    assert_eq!(vec![1, 1, 2, 1], structure.col_nnz);
}

#[test]
fn test_pivot_data() {
    let mut pivots = PivotData::new(4);
    assert_eq!(0, pivots.count());
    assert!(!pivots.has_col(2));
    pivots.set(1, 2);
    assert!(pivots.has_col(2));
    assert_eq!(Some(1), pivots.row_for(2));

    let mut snapshot = PivotData::new(4);
    snapshot.update_from(&pivots);
    pivots.set(0, 3);
    snapshot.update_from(&pivots);
    assert_eq!(vec![(1, 2), (0, 3)], snapshot.iter().collect::<Vec<_>>());
}

#[test]
fn test_find_row_local_pivots() {
    let A = OwnedMatrix::new(vec![
        1, 0, 1, 0, 0, 1, 1, 0, 1,
        0, 1, 1, 1, 0, 1, 0, 1, 0,
        0, 0, 1, 1, 0, 0, 0, 1, 1,
        0, 1, 1, 0, 1, 0, 0, 0, 0,
        0, 0, 1, 1, 0, 0, 0, 0, 0,
        0, 0, 0, 0, 0, 1, 0, 1, 1
    ], 9);
    let structure = structure_of(&A);
    let mut finder = PivotFinder::new(&structure);
    assert_eq!(vec![4, 3, 5, 2, 0, 1], finder.remaining_rows());
    finder.find_row_local_pivots();
    assert_eq!(vec![(4, 2), (3, 1), (5, 5), (0, 0)], finder.pivots.iter().collect::<Vec<_>>());
    assert_eq!(vec![2, 1], finder.remaining_rows());
}

#[test]
fn test_row_local_pivots_prefer_light_entries() {
    let A = OwnedMatrix::new(vec![
        3, 1, 0,
        1, 1, 1,
        -1, 0, 0
    ], 3);
    let structure = structure_of(&A);
    let mut finder = PivotFinder::new(&structure);
    finder.find_row_local_pivots();
    assert_eq!(vec![(2, 0)], finder.pivots.iter().collect::<Vec<_>>());
}

#[cfg(test)]
fn test_matrix_6x9() -> OwnedMatrix<i64> {
    OwnedMatrix::new(vec![
        1, 0, 0, 0, 0, 1, 0, 0, 1,
        0, 1, 1, 1, 0, 1, 0, 1, 0,
        0, 0, 1, 1, 0, 0, 0, 1, 1,
        0, 1, 0, 0, 1, 0, 0, 0, 0,
        0, 0, 1, 0, 0, 0, 0, 0, 0,
        0, 1, 0, 0, 0, 1, 0, 1, 0
    ], 9)
}

#[test]
fn test_find_col_extension_pivots() {
    let A = test_matrix_6x9();
    let structure = structure_of(&A);
    let mut finder = PivotFinder::new(&structure);
    finder.find_row_local_pivots();
    assert_eq!(vec![(4, 2), (3, 1), (0, 0)], finder.pivots.iter().collect::<Vec<_>>());
    finder.find_col_extension_pivots();
    assert_eq!(vec![(4, 2), (3, 1), (0, 0), (5, 7), (2, 3)], finder.pivots.iter().collect::<Vec<_>>());
}

#[test]
fn test_find_cycle_free_pivots_sequentially() {
    let A = test_matrix_6x9();
    let structure = structure_of(&A);
    let finder = PivotFinder::new(&structure);
    let registry = Mutex::new(PivotData::new(9));
    let mut snapshot = PivotData::new(9);
    let mut worker = RowWorker::new(9);
    for i in finder.remaining_rows() {
        find_cycle_free_pivot_in(i, &structure, &registry, &mut snapshot, &mut worker);
    }
    assert_eq!(vec![(4, 2), (3, 4), (0, 0), (5, 1), (2, 3)], registry.into_inner().unwrap().iter().collect::<Vec<_>>());
}

#[test]
fn test_find_cycle_free_pivots_parallel() {
    let A = test_matrix_6x9();
    let structure = structure_of(&A);
    let mut finder = PivotFinder::new(&structure);
    finder.find_cycle_free_pivots();
    // rows 0 and 3 contain a column that occurs nowhere else
    assert!(finder.pivots.count() >= 2);
    assert!(finder.pivots.has_col(0));
    assert!(finder.pivots.has_col(4) || finder.pivots.row_for(1) == Some(3));
    // panics if the pivots contain a cycle
    finder.sorted_pivots();
}

#[test]
fn test_find_pivots() {
    let ring = StaticRing::<i64>::RING;
    let A = test_matrix_6x9();
    let pivots = find_pivots(ring, &A);
    assert_eq!(vec![(0, 0, 1), (2, 3, 1), (4, 2, 1), (5, 7, 1), (3, 1, 1)], pivots.pivots);
    assert_eq!(&[0, 2, 4, 5, 3, 1], pivots.row_permutation.order());
    assert_eq!(&[0, 3, 2, 7, 1, 4, 5, 6, 8], pivots.col_permutation.order());
    assert_pivots_valid(ring, &A, &pivots);
}

#[test]
fn test_find_pivots_non_units() {
    let ring = StaticRing::<i64>::RING;
    let A = OwnedMatrix::new(vec![
        2, 1,
        4, 0
    ], 2);
    let pivots = find_pivots(ring, &A);
    assert_eq!(vec![(0, 1, 1)], pivots.pivots);
    assert_pivots_valid(ring, &A, &pivots);
}

#[test]
fn test_find_pivots_zero() {
    let ring = StaticRing::<i64>::RING;
    let pivots = find_pivots(ring, &OwnedMatrix::zero(3, 2, ring));
    assert_eq!(0, pivots.pivot_count());
    assert_eq!(Permutation::identity(3), pivots.row_permutation);
    assert_eq!(Permutation::identity(2), pivots.col_permutation);

    let pivots = find_pivots(ring, &OwnedMatrix::identity(2, 2, ring));
    assert_eq!(2, pivots.pivot_count());
}

#[test]
fn test_find_pivots_random() {
    LogAlgorithmSubscriber::init_test();
    let ring = F2::RING;
    let mut rng = oorandom::Rand64::new(1);
    for _ in 0..10 {
        let A: OwnedMatrix<u64> = OwnedMatrix::from_fn(60, 80, |_, _| if rng.rand_u64() % 10 == 0 { 1 } else { 0 });
        let pivots = find_pivots(ring, &A);
        assert!(pivots.pivot_count() > 10);
        assert_pivots_valid(ring, &A, &pivots);
    }
}
