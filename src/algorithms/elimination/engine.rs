use tracing::{event, Level};

use crate::divisibility::*;
use crate::pid::*;
use crate::ring::*;
use crate::sparse::EliminationIndex;

use super::ops::*;
use super::EliminationForm;

///
/// The matrix that is currently being eliminated, together with the log of all
/// operations performed so far.
///
/// The index might hold the transpose of the current matrix, in which case row operations
/// on the index are logged as the corresponding column operations.
///
pub(super) struct EliminationState<R>
    where R: RingStore + Copy
{
    ring: R,
    index: EliminationIndex<R>,
    row_ops: Vec<RowOperation<El<R>>>,
    col_ops: Vec<ColOperation<El<R>>>,
    transposed: bool
}

impl<R> EliminationState<R>
    where R: RingStore + Copy + Sync,
        R::Type: EuclideanRing,
        El<R>: Send + Sync
{
    pub(super) fn new(index: EliminationIndex<R>) -> Self {
        EliminationState {
            ring: *index.ring(),
            index: index,
            row_ops: Vec::new(),
            col_ops: Vec::new(),
            transposed: false
        }
    }

    pub(super) fn into_parts(self) -> (EliminationIndex<R>, Vec<RowOperation<El<R>>>, Vec<ColOperation<El<R>>>) {
        assert!(!self.transposed);
        (self.index, self.row_ops, self.col_ops)
    }

    fn log(&mut self, op: RowOperation<El<R>>) {
        if self.transposed {
            self.col_ops.push(op.transposed());
        } else {
            self.row_ops.push(op);
        }
    }

    fn record(&mut self, op: RowOperation<El<R>>) {
        self.index.apply(&op);
        self.log(op);
    }

    ///
    /// Performs `row[to] += factor * row[from]` for all `(to, factor)` in `targets` as one
    /// batched (and potentially parallel) operation.
    ///
    fn record_batch(&mut self, from: usize, targets: Vec<(usize, El<R>)>) {
        let ring = self.ring;
        let ops = targets.iter().map(|(to, factor)| RowOperation::AddRow { from: from, to: *to, factor: ring.clone_el(factor) }).collect::<Vec<_>>();
        self.index.batch_add_row(from, targets);
        for op in ops {
            self.log(op);
        }
    }

    fn record_add_col(&mut self, from: usize, to: usize, factor: El<R>) {
        assert!(!self.transposed);
        self.index.add_col(from, to, &factor);
        self.col_ops.push(ColOperation::AddCol { from, to, factor });
    }

    fn transpose(&mut self) {
        self.index.transpose();
        self.transposed = !self.transposed;
    }

    fn untranspose(&mut self) {
        if self.transposed {
            self.transpose();
        }
    }

    fn pivot_at(&self, i: usize, j: usize) -> &El<R> {
        match self.index.at(i, j) {
            Some(x) => x,
            None => panic!("pivot entry ({}, {}) is zero", i, j)
        }
    }

    fn diagonal_entry(&self, i: usize) -> &El<R> {
        self.pivot_at(i, i)
    }
}

///
/// The two cursors of a row echelon run. Everything in rows `< current_row` and columns
/// `< current_col` is already in echelon form.
///
pub(super) struct EchelonRun {
    reduced: bool,
    current_row: usize,
    current_col: usize
}

impl EchelonRun {

    pub(super) fn new(reduced: bool) -> Self {
        EchelonRun { reduced, current_row: 0, current_col: 0 }
    }

    pub(super) fn is_done<R: RingStore>(&self, index: &EliminationIndex<R>) -> bool {
        self.current_row >= index.row_count() || self.current_col >= index.col_count()
    }

    fn accept<R>(&mut self, state: &mut EliminationState<R>)
        where R: RingStore + Copy + Sync,
            R::Type: EuclideanRing,
            El<R>: Send + Sync
    {
        if self.reduced {
            self.reduce_above(state);
        }
        self.current_row += 1;
        self.current_col += 1;
    }

    ///
    /// Reduces all entries above the pivot at `(current_row, current_col)` modulo the pivot.
    ///
    fn reduce_above<R>(&self, state: &mut EliminationState<R>)
        where R: RingStore + Copy + Sync,
            R::Type: EuclideanRing,
            El<R>: Send + Sync
    {
        let ring = state.ring;
        let pivot = ring.clone_el(state.pivot_at(self.current_row, self.current_col));
        let targets = state.index.entries_above_row(self.current_col, self.current_row)
            .map(|(i, x)| (i, ring.negate(ring.euclidean_div(ring.clone_el(x), &pivot))))
            .filter(|(_, factor)| !ring.is_zero(factor))
            .collect::<Vec<_>>();
        if targets.len() > 0 {
            state.record_batch(self.current_row, targets);
        }
    }

    ///
    /// Performs one elimination step in the current column. Either the column is empty
    /// below `current_row`, or a pivot is found and the cursors advance, or the leading
    /// entries in the current column have been reduced by the pivot with minimal degree,
    /// in which case the next iteration continues with the remainders.
    ///
    pub(super) fn iteration<R>(&mut self, state: &mut EliminationState<R>)
        where R: RingStore + Copy + Sync,
            R::Type: EuclideanRing,
            El<R>: Send + Sync
    {
        let ring = state.ring;
        let col = self.current_col;
        let candidates = state.index.heads_in_col(col).map(|(i, x)| (i, ring.clone_el(x))).collect::<Vec<_>>();
        debug_assert!(candidates.iter().all(|(i, _)| *i >= self.current_row));
        event!(Level::TRACE, row = self.current_row, col = col, candidates = candidates.len());

        if candidates.len() == 0 {
            self.current_col += 1;
            return;
        }
        if candidates.len() == 1 && candidates[0].0 == self.current_row && ring.is_normalized(&candidates[0].1) {
            self.accept(state);
            return;
        }

        let pivot_row = candidates.iter()
            .min_by_key(|(i, x)| (ring.euclidean_deg(x), state.index.row_weight(*i), *i))
            .map(|(i, _)| *i).unwrap();
        let pivot = ring.clone_el(state.index.leading_entry(pivot_row).unwrap().1);

        let targets = candidates.into_iter()
            .filter(|(i, _)| *i != pivot_row)
            .map(|(i, x)| (i, ring.negate(ring.euclidean_div(x, &pivot))))
            .filter(|(_, factor)| !ring.is_zero(factor))
            .collect::<Vec<_>>();
        if targets.len() > 0 {
            state.record_batch(pivot_row, targets);
        }
        if state.index.head_count_in_col(col) > 1 {
            return;
        }

        let unit = ring.normalization_unit(&pivot);
        if !ring.is_one(&unit) {
            state.record(RowOperation::MulRow { row: pivot_row, factor: unit });
        }
        if pivot_row != self.current_row {
            state.record(RowOperation::SwapRows(pivot_row, self.current_row));
        }
        self.accept(state);
    }
}

///
/// Makes the diagonal entries of a diagonal matrix a divisor chain, by going through all
/// pairs `i < j` and replacing `(d_i, d_j)` by their gcd and lcm if `d_i` does not divide `d_j`.
///
pub(super) struct DivisorChain {
    rank: usize,
    i: usize,
    j: usize
}

impl DivisorChain {

    fn new<R>(state: &EliminationState<R>) -> Self
        where R: RingStore + Copy + Sync,
            R::Type: EuclideanRing,
            El<R>: Send + Sync
    {
        assert!(!state.transposed);
        let n = usize::min(state.index.row_count(), state.index.col_count());
        let rank = (0..n).take_while(|i| state.index.at(*i, *i).is_some()).count();
        assert!((rank..n).all(|i| state.index.at(i, i).is_none()), "zero diagonal entries are not at the end");
        DivisorChain { rank, i: 0, j: 1 }
    }

    fn is_done(&self) -> bool {
        self.i + 1 >= self.rank
    }

    fn iteration<R>(&mut self, state: &mut EliminationState<R>)
        where R: RingStore + Copy + Sync,
            R::Type: EuclideanRing,
            El<R>: Send + Sync
    {
        let ring = state.ring;
        let (i, j) = (self.i, self.j);
        if ring.checked_div(state.diagonal_entry(j), state.diagonal_entry(i)).is_none() {
            event!(Level::TRACE, i = i, j = j, "gcd step");
            Self::make_divisible(i, j, state);
        }
        self.j += 1;
        if self.j >= self.rank {
            self.i += 1;
            self.j = self.i + 1;
        }
    }

    ///
    /// Transforms the diagonal block `[[a, 0], [0, b]]` in rows and columns `i, j` into
    /// `[[gcd(a, b), 0], [0, lcm(a, b)]]`, using a Bezout identity `s * a + t * b = g`.
    ///
    fn make_divisible<R>(i: usize, j: usize, state: &mut EliminationState<R>)
        where R: RingStore + Copy + Sync,
            R::Type: EuclideanRing,
            El<R>: Send + Sync
    {
        let ring = state.ring;
        let a = ring.clone_el(state.diagonal_entry(i));
        let b = ring.clone_el(state.diagonal_entry(j));
        let (s, t, g) = ring.ideal_gen(&a, &b);
        let (a_quo, b_quo) = match (ring.checked_div(&a, &g), ring.checked_div(&b, &g)) {
            (Some(a_quo), Some(b_quo)) => (a_quo, b_quo),
            _ => panic!("gcd {} does not divide {} and {}", ring.format(&g), ring.format(&a), ring.format(&b))
        };
        if !ring.is_zero(&s) {
            state.record(RowOperation::AddRow { from: i, to: j, factor: s });
        }
        if !ring.is_zero(&t) {
            state.record_add_col(j, i, t);
        }
        // block is now [[a, 0], [g, b]]
        state.record(RowOperation::AddRow { from: j, to: i, factor: ring.negate(a_quo) });
        state.record_add_col(i, j, ring.negate(b_quo));
        // block is now [[0, -ab/g], [g, 0]]
        state.record(RowOperation::SwapRows(i, j));
        for k in [i, j] {
            let unit = ring.normalization_unit(state.diagonal_entry(k));
            if !ring.is_one(&unit) {
                state.record(RowOperation::MulRow { row: k, factor: unit });
            }
        }
    }
}

///
/// The states of the elimination towards the different [`EliminationForm`]s.
///
pub(super) enum Eliminator {
    Echelon {
        run: EchelonRun,
        transpose: bool
    },
    Diagonal {
        run: EchelonRun
    },
    Smith {
        run: EchelonRun,
        chain: Option<DivisorChain>
    }
}

impl Eliminator {

    pub(super) fn new(form: EliminationForm) -> Self {
        match form {
            EliminationForm::RowEchelon => Eliminator::Echelon { run: EchelonRun::new(false), transpose: false },
            EliminationForm::RowHermite => Eliminator::Echelon { run: EchelonRun::new(true), transpose: false },
            EliminationForm::ColEchelon => Eliminator::Echelon { run: EchelonRun::new(false), transpose: true },
            EliminationForm::ColHermite => Eliminator::Echelon { run: EchelonRun::new(true), transpose: true },
            EliminationForm::Diagonal => Eliminator::Diagonal { run: EchelonRun::new(false) },
            EliminationForm::Smith => Eliminator::Smith { run: EchelonRun::new(false), chain: None }
        }
    }

    pub(super) fn prepare<R>(&mut self, state: &mut EliminationState<R>)
        where R: RingStore + Copy + Sync,
            R::Type: EuclideanRing,
            El<R>: Send + Sync
    {
        if let Eliminator::Echelon { transpose: true, .. } = self {
            state.transpose();
        }
    }

    pub(super) fn is_done<R>(&self, state: &EliminationState<R>) -> bool
        where R: RingStore + Copy + Sync,
            R::Type: EuclideanRing,
            El<R>: Send + Sync
    {
        match self {
            Eliminator::Echelon { run, .. } => run.is_done(&state.index),
            Eliminator::Diagonal { run } => run.is_done(&state.index) && state.index.is_diagonal(),
            Eliminator::Smith { chain: Some(chain), .. } => chain.is_done(),
            Eliminator::Smith { chain: None, .. } => false
        }
    }

    ///
    /// Alternates between row echelon runs on the matrix and on its transpose, until
    /// the matrix is diagonal.
    ///
    fn diagonal_iteration<R>(run: &mut EchelonRun, state: &mut EliminationState<R>)
        where R: RingStore + Copy + Sync,
            R::Type: EuclideanRing,
            El<R>: Send + Sync
    {
        if run.is_done(&state.index) {
            debug_assert!(!state.index.is_diagonal());
            event!(Level::TRACE, "transpose");
            state.transpose();
            *run = EchelonRun::new(false);
        } else {
            run.iteration(state);
        }
    }

    pub(super) fn iteration<R>(&mut self, state: &mut EliminationState<R>)
        where R: RingStore + Copy + Sync,
            R::Type: EuclideanRing,
            El<R>: Send + Sync
    {
        match self {
            Eliminator::Echelon { run, .. } => run.iteration(state),
            Eliminator::Diagonal { run } => Self::diagonal_iteration(run, state),
            Eliminator::Smith { chain: Some(chain), .. } => chain.iteration(state),
            Eliminator::Smith { run, chain } => {
                if run.is_done(&state.index) && state.index.is_diagonal() {
                    state.untranspose();
                    *chain = Some(DivisorChain::new(state));
                } else {
                    Self::diagonal_iteration(run, state);
                }
            }
        }
    }

    pub(super) fn finalize<R>(&mut self, state: &mut EliminationState<R>)
        where R: RingStore + Copy + Sync,
            R::Type: EuclideanRing,
            El<R>: Send + Sync
    {
        state.untranspose();
    }
}
