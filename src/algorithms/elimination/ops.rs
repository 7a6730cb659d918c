use crate::divisibility::*;
use crate::matrix::OwnedMatrix;
use crate::ring::*;

///
/// An elementary row operation, i.e. left-multiplication by an elementary matrix.
///
#[derive(Debug, PartialEq, Eq)]
pub enum RowOperation<T> {
    /// `row[to] += factor * row[from]`
    AddRow { from: usize, to: usize, factor: T },
    /// `row[row] *= factor`, where `factor` must be a unit
    MulRow { row: usize, factor: T },
    SwapRows(usize, usize)
}

///
/// An elementary column operation, i.e. right-multiplication by an elementary matrix.
///
#[derive(Debug, PartialEq, Eq)]
pub enum ColOperation<T> {
    /// `col[to] += factor * col[from]`
    AddCol { from: usize, to: usize, factor: T },
    /// `col[col] *= factor`, where `factor` must be a unit
    MulCol { col: usize, factor: T },
    SwapCols(usize, usize)
}

impl<T> RowOperation<T> {

    ///
    /// Returns the determinant of the elementary matrix corresponding to this operation.
    ///
    pub fn determinant<R>(&self, ring: R) -> T
        where R: RingStore,
            R::Type: RingBase<Element = T>
    {
        match self {
            RowOperation::AddRow { .. } => ring.one(),
            RowOperation::MulRow { factor, .. } => ring.clone_el(factor),
            RowOperation::SwapRows(i, j) if i == j => ring.one(),
            RowOperation::SwapRows(_, _) => ring.neg_one()
        }
    }

    ///
    /// Returns the operation that undoes this operation.
    ///
    pub fn inverse<R>(&self, ring: R) -> Self
        where R: RingStore,
            R::Type: DivisibilityRing + RingBase<Element = T>
    {
        match self {
            RowOperation::AddRow { from, to, factor } => RowOperation::AddRow { from: *from, to: *to, factor: ring.negate(ring.clone_el(factor)) },
            RowOperation::MulRow { row, factor } => RowOperation::MulRow { row: *row, factor: invert_unit(factor, ring) },
            RowOperation::SwapRows(i, j) => RowOperation::SwapRows(*i, *j)
        }
    }

    ///
    /// Returns the column operation `op'` such that performing this operation on `A^T`
    /// is the same as performing `op'` on `A`.
    ///
    pub fn transposed(self) -> ColOperation<T> {
        match self {
            RowOperation::AddRow { from, to, factor } => ColOperation::AddCol { from, to, factor },
            RowOperation::MulRow { row, factor } => ColOperation::MulCol { col: row, factor },
            RowOperation::SwapRows(i, j) => ColOperation::SwapCols(i, j)
        }
    }

    ///
    /// Returns the column operation `op'` such that right-multiplication by `op'` is the
    /// same as right-multiplication by the elementary matrix of this operation.
    ///
    pub fn opposite(self) -> ColOperation<T> {
        match self {
            RowOperation::AddRow { from, to, factor } => ColOperation::AddCol { from: to, to: from, factor },
            RowOperation::MulRow { row, factor } => ColOperation::MulCol { col: row, factor },
            RowOperation::SwapRows(i, j) => ColOperation::SwapCols(i, j)
        }
    }

    pub fn clone_op<R>(&self, ring: R) -> Self
        where R: RingStore,
            R::Type: RingBase<Element = T>
    {
        match self {
            RowOperation::AddRow { from, to, factor } => RowOperation::AddRow { from: *from, to: *to, factor: ring.clone_el(factor) },
            RowOperation::MulRow { row, factor } => RowOperation::MulRow { row: *row, factor: ring.clone_el(factor) },
            RowOperation::SwapRows(i, j) => RowOperation::SwapRows(*i, *j)
        }
    }
}

impl<T> ColOperation<T> {

    pub fn determinant<R>(&self, ring: R) -> T
        where R: RingStore,
            R::Type: RingBase<Element = T>
    {
        match self {
            ColOperation::AddCol { .. } => ring.one(),
            ColOperation::MulCol { factor, .. } => ring.clone_el(factor),
            ColOperation::SwapCols(i, j) if i == j => ring.one(),
            ColOperation::SwapCols(_, _) => ring.neg_one()
        }
    }

    pub fn inverse<R>(&self, ring: R) -> Self
        where R: RingStore,
            R::Type: DivisibilityRing + RingBase<Element = T>
    {
        match self {
            ColOperation::AddCol { from, to, factor } => ColOperation::AddCol { from: *from, to: *to, factor: ring.negate(ring.clone_el(factor)) },
            ColOperation::MulCol { col, factor } => ColOperation::MulCol { col: *col, factor: invert_unit(factor, ring) },
            ColOperation::SwapCols(i, j) => ColOperation::SwapCols(*i, *j)
        }
    }

    pub fn transposed(self) -> RowOperation<T> {
        match self {
            ColOperation::AddCol { from, to, factor } => RowOperation::AddRow { from, to, factor },
            ColOperation::MulCol { col, factor } => RowOperation::MulRow { row: col, factor },
            ColOperation::SwapCols(i, j) => RowOperation::SwapRows(i, j)
        }
    }

    ///
    /// Returns the row operation `op'` such that left-multiplication by `op'` is the
    /// same as left-multiplication by the elementary matrix of this operation.
    ///
    pub fn opposite(self) -> RowOperation<T> {
        match self {
            ColOperation::AddCol { from, to, factor } => RowOperation::AddRow { from: to, to: from, factor },
            ColOperation::MulCol { col, factor } => RowOperation::MulRow { row: col, factor },
            ColOperation::SwapCols(i, j) => RowOperation::SwapRows(i, j)
        }
    }

    pub fn clone_op<R>(&self, ring: R) -> Self
        where R: RingStore,
            R::Type: RingBase<Element = T>
    {
        match self {
            ColOperation::AddCol { from, to, factor } => ColOperation::AddCol { from: *from, to: *to, factor: ring.clone_el(factor) },
            ColOperation::MulCol { col, factor } => ColOperation::MulCol { col: *col, factor: ring.clone_el(factor) },
            ColOperation::SwapCols(i, j) => ColOperation::SwapCols(*i, *j)
        }
    }
}

fn invert_unit<R>(x: &El<R>, ring: R) -> El<R>
    where R: RingStore,
        R::Type: DivisibilityRing
{
    match ring.invert(x) {
        Some(result) => result,
        None => panic!("scaling factor {} of an elementary operation is not a unit", ring.format(x))
    }
}

impl<T> OwnedMatrix<T> {

    pub fn apply_row_operation<R>(&mut self, op: &RowOperation<T>, ring: R)
        where R: RingStore,
            R::Type: RingBase<Element = T>
    {
        match op {
            RowOperation::AddRow { from, to, factor } => {
                assert!(from != to);
                for k in 0..self.col_count() {
                    let value = ring.mul_ref(self.at(*from, k), factor);
                    ring.add_assign(self.at_mut(*to, k), value);
                }
            },
            RowOperation::MulRow { row, factor } => {
                for k in 0..self.col_count() {
                    ring.mul_assign_ref(self.at_mut(*row, k), factor);
                }
            },
            RowOperation::SwapRows(i, j) => self.swap_rows(*i, *j)
        }
    }

    pub fn apply_col_operation<R>(&mut self, op: &ColOperation<T>, ring: R)
        where R: RingStore,
            R::Type: RingBase<Element = T>
    {
        match op {
            ColOperation::AddCol { from, to, factor } => {
                assert!(from != to);
                for k in 0..self.row_count() {
                    let value = ring.mul_ref(self.at(k, *from), factor);
                    ring.add_assign(self.at_mut(k, *to), value);
                }
            },
            ColOperation::MulCol { col, factor } => {
                for k in 0..self.row_count() {
                    ring.mul_assign_ref(self.at_mut(k, *col), factor);
                }
            },
            ColOperation::SwapCols(i, j) => self.swap_cols(*i, *j)
        }
    }

    ///
    /// Applies all given row operations, in order.
    ///
    pub fn apply_row_operations<'a, R, I>(&mut self, ops: I, ring: R)
        where R: RingStore,
            R::Type: RingBase<Element = T>,
            I: IntoIterator<Item = &'a RowOperation<T>>,
            T: 'a
    {
        for op in ops {
            self.apply_row_operation(op, &ring);
        }
    }

    ///
    /// Applies all given column operations, in order.
    ///
    pub fn apply_col_operations<'a, R, I>(&mut self, ops: I, ring: R)
        where R: RingStore,
            R::Type: RingBase<Element = T>,
            I: IntoIterator<Item = &'a ColOperation<T>>,
            T: 'a
    {
        for op in ops {
            self.apply_col_operation(op, &ring);
        }
    }
}

#[cfg(test)]
use crate::primitive_int::StaticRing;
#[cfg(test)]
use crate::assert_matrix_eq;

#[test]
fn test_operations_on_dense_matrix() {
    let ring = StaticRing::<i64>::RING;
    let mut A = OwnedMatrix::new(vec![1, 2, 3, 4, 5, 6], 3);
    A.apply_row_operations([
        &RowOperation::AddRow { from: 0, to: 1, factor: -4 },
        &RowOperation::MulRow { row: 1, factor: -1 },
        &RowOperation::SwapRows(0, 1)
    ], ring);
    assert_matrix_eq!(&ring, &A, &OwnedMatrix::new(vec![0, 3, 6, 1, 2, 3], 3));
    A.apply_col_operations([
        &ColOperation::AddCol { from: 0, to: 2, factor: -3 },
        &ColOperation::SwapCols(0, 2)
    ], ring);
    assert_matrix_eq!(&ring, &A, &OwnedMatrix::new(vec![6, 3, 0, 0, 2, 1], 3));
}

#[test]
fn test_inverse_and_opposite() {
    let ring = StaticRing::<i64>::RING;
    let A = OwnedMatrix::new(vec![1, 2, 3, 4, 5, 6, 7, 8, 10], 3);
    let ops = [
        RowOperation::AddRow { from: 2, to: 0, factor: 5 },
        RowOperation::MulRow { row: 1, factor: -1 },
        RowOperation::SwapRows(1, 2)
    ];
    for op in &ops {
        let mut B = A.clone_matrix(ring);
        B.apply_row_operation(op, ring);
        B.apply_row_operation(&op.inverse(ring), ring);
        assert_matrix_eq!(&ring, &A, &B);

        let mut E = OwnedMatrix::identity(3, 3, ring);
        E.apply_row_operation(op, ring);
        let mut C = A.clone_matrix(ring);
        C.apply_col_operation(&op.clone_op(ring).opposite(), ring);
        assert_matrix_eq!(&ring, &A.mul(&E, ring), &C);
    }
}

#[test]
fn test_transposed() {
    let ring = StaticRing::<i64>::RING;
    let A = OwnedMatrix::new(vec![1, 2, 3, 4, 5, 6], 2);
    let op = RowOperation::AddRow { from: 1, to: 0, factor: 2 };
    let mut B = A.transpose(ring);
    B.apply_row_operation(&op, ring);
    let mut C = A.clone_matrix(ring);
    C.apply_col_operation(&op.transposed(), ring);
    assert_matrix_eq!(&ring, &B.transpose(ring), &C);
    assert_eq!(-1, ColOperation::<i64>::SwapCols(0, 1).determinant(ring));
    assert_eq!(1, ColOperation::<i64>::SwapCols(1, 1).determinant(ring));
}

#[test]
#[should_panic]
fn test_inverse_non_unit() {
    let ring = StaticRing::<i64>::RING;
    RowOperation::MulRow { row: 0, factor: 2 }.inverse(ring);
}
