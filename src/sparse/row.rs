use std::cmp::Ordering;

use crate::ring::*;

use super::EXTENSIVE_RUNTIME_ASSERTS;

///
/// A sparse vector, stored as list of `(column, value)` pairs that is strictly
/// sorted by column. Zero values are never stored.
///
/// Rows do not store their ring, so every function that needs arithmetic takes
/// the ring as additional parameter. Functions that change entries return the
/// change of the sum of the [`RingBase::elimination_weight()`]s of the entries,
/// which is used by [`super::EliminationIndex`] to keep track of row weights.
///
pub struct SparseRow<T> {
    entries: Vec<(usize, T)>
}

impl<T> Default for SparseRow<T> {

    fn default() -> Self {
        Self::new()
    }
}

impl<T> SparseRow<T> {

    pub const fn new() -> Self {
        SparseRow { entries: Vec::new() }
    }

    ///
    /// Creates a row from the given entries, which may be given in any order.
    /// Entries with the same column are added up, and zeros are dropped.
    ///
    pub fn from_entries<R, I>(entries: I, ring: R) -> Self
        where R: RingStore,
            R::Type: RingBase<Element = T>,
            I: IntoIterator<Item = (usize, T)>
    {
        let mut entries = entries.into_iter().collect::<Vec<_>>();
        entries.sort_by_key(|(j, _)| *j);
        let mut result: Vec<(usize, T)> = Vec::with_capacity(entries.len());
        for (j, x) in entries {
            match result.last_mut() {
                Some((last_j, last_x)) if *last_j == j => ring.add_assign(last_x, x),
                _ => result.push((j, x))
            }
        }
        result.retain(|(_, x)| !ring.is_zero(x));
        return SparseRow { entries: result };
    }

    pub fn nnz(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter<'a>(&'a self) -> impl 'a + ExactSizeIterator<Item = (usize, &'a T)> + DoubleEndedIterator {
        self.entries.iter().map(|(j, x)| (*j, x))
    }

    pub fn into_entries(self) -> Vec<(usize, T)> {
        self.entries
    }

    ///
    /// Returns the leftmost nonzero entry, if the row is not zero.
    ///
    pub fn leading_entry<'a>(&'a self) -> Option<(usize, &'a T)> {
        self.entries.first().map(|(j, x)| (*j, x))
    }

    pub fn leading_col(&self) -> Option<usize> {
        self.entries.first().map(|(j, _)| *j)
    }

    pub fn at<'a>(&'a self, col: usize) -> Option<&'a T> {
        self.entries.binary_search_by_key(&col, |(j, _)| *j).ok().map(|idx| &self.entries[idx].1)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    ///
    /// Appends an entry to the end of the row; the column must be larger than all
    /// columns currently in the row, and the value must be nonzero.
    ///
    pub(crate) fn push(&mut self, col: usize, value: T) {
        debug_assert!(self.entries.last().map(|(j, _)| *j < col).unwrap_or(true));
        self.entries.push((col, value));
    }

    pub fn weight<R>(&self, ring: R) -> usize
        where R: RingStore,
            R::Type: RingBase<Element = T>
    {
        self.entries.iter().map(|(_, x)| ring.elimination_weight(x)).sum()
    }

    pub fn clone_row<R>(&self, ring: R) -> Self
        where R: RingStore,
            R::Type: RingBase<Element = T>
    {
        SparseRow { entries: self.entries.iter().map(|(j, x)| (*j, ring.clone_el(x))).collect() }
    }

    pub fn to_dense<R>(&self, len: usize, ring: R) -> Vec<T>
        where R: RingStore,
            R::Type: RingBase<Element = T>
    {
        let mut result = (0..len).map(|_| ring.zero()).collect::<Vec<_>>();
        for (j, x) in &self.entries {
            result[*j] = ring.clone_el(x);
        }
        return result;
    }

    pub fn check<R>(&self, ring: R)
        where R: RingStore,
            R::Type: RingBase<Element = T>
    {
        if EXTENSIVE_RUNTIME_ASSERTS {
            assert!((1..self.entries.len()).all(|k| self.entries[k - 1].0 < self.entries[k].0));
            assert!(self.entries.iter().all(|(_, x)| !ring.is_zero(x)));
        }
    }

    ///
    /// Multiplies every entry by `factor`, which must not be zero. If `factor` is a zero
    /// divisor, entries might become zero, and are removed.
    ///
    pub fn scale<R>(&mut self, factor: &T, ring: R) -> i64
        where R: RingStore,
            R::Type: RingBase<Element = T>
    {
        assert!(!ring.is_zero(factor), "cannot scale a sparse row by zero");
        let mut delta = 0;
        self.entries.retain_mut(|(_, x)| {
            delta -= ring.elimination_weight(x) as i64;
            ring.mul_assign_ref(x, factor);
            delta += ring.elimination_weight(x) as i64;
            !ring.is_zero(x)
        });
        return delta;
    }

    ///
    /// Adds `value` to the entry in column `col`, inserting or removing the entry if necessary.
    ///
    pub fn add_at<R>(&mut self, col: usize, value: T, ring: R) -> i64
        where R: RingStore,
            R::Type: RingBase<Element = T>
    {
        if ring.is_zero(&value) {
            return 0;
        }
        match self.entries.binary_search_by_key(&col, |(j, _)| *j) {
            Ok(idx) => {
                let old_weight = ring.elimination_weight(&self.entries[idx].1) as i64;
                ring.add_assign(&mut self.entries[idx].1, value);
                if ring.is_zero(&self.entries[idx].1) {
                    self.entries.remove(idx);
                    return -old_weight;
                } else {
                    return ring.elimination_weight(&self.entries[idx].1) as i64 - old_weight;
                }
            },
            Err(idx) => {
                let weight = ring.elimination_weight(&value) as i64;
                self.entries.insert(idx, (col, value));
                return weight;
            }
        }
    }

    ///
    /// Computes `self += factor * source`, using a two-pointer merge over both rows.
    ///
    /// The merged row is built in `buffer`, and then swapped with the entries of `self`,
    /// so that the old allocation of `self` is reused as `buffer` during the next call.
    /// Returns the change of the weight of `self`.
    ///
    #[inline(never)]
    pub fn add_scaled_with_buffer<R>(&mut self, source: &SparseRow<T>, factor: &T, ring: R, buffer: &mut Vec<(usize, T)>) -> i64
        where R: RingStore,
            R::Type: RingBase<Element = T>
    {
        self.check(&ring);
        source.check(&ring);
        if ring.is_zero(factor) {
            return 0;
        }
        buffer.clear();
        std::mem::swap(&mut self.entries, buffer);
        let mut delta = 0;
        let mut target = buffer.drain(..).peekable();
        let mut source = source.entries.iter().peekable();
        loop {
            let ordering = match (target.peek(), source.peek()) {
                (None, None) => break,
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (Some((target_j, _)), Some((source_j, _))) => target_j.cmp(source_j)
            };
            match ordering {
                Ordering::Less => {
                    self.entries.push(target.next().unwrap());
                },
                Ordering::Greater => {
                    let (j, x) = source.next().unwrap();
                    let value = ring.mul_ref(x, factor);
                    if !ring.is_zero(&value) {
                        delta += ring.elimination_weight(&value) as i64;
                        self.entries.push((*j, value));
                    }
                },
                Ordering::Equal => {
                    let (j, mut value) = target.next().unwrap();
                    let (_, x) = source.next().unwrap();
                    delta -= ring.elimination_weight(&value) as i64;
                    ring.add_assign(&mut value, ring.mul_ref(x, factor));
                    if !ring.is_zero(&value) {
                        delta += ring.elimination_weight(&value) as i64;
                        self.entries.push((j, value));
                    }
                }
            }
        }
        drop(target);
        self.check(&ring);
        return delta;
    }

    pub fn add_scaled<R>(&mut self, source: &SparseRow<T>, factor: &T, ring: R) -> i64
        where R: RingStore,
            R::Type: RingBase<Element = T>
    {
        self.add_scaled_with_buffer(source, factor, ring, &mut Vec::new())
    }
}

#[cfg(test)]
use crate::primitive_int::StaticRing;
#[cfg(test)]
use crate::rings::zn::F2;

#[cfg(test)]
fn row_of<const N: usize>(entries: [(usize, i64); N]) -> SparseRow<i64> {
    SparseRow::from_entries(entries, StaticRing::<i64>::RING)
}

#[test]
fn test_from_entries() {
    let ring = StaticRing::<i64>::RING;
    let row = SparseRow::from_entries([(4, 1), (1, 2), (4, -1), (0, 0), (2, 3), (1, 1)], ring);
    assert_eq!(vec![(1, 3), (2, 3)], row.iter().map(|(j, x)| (j, *x)).collect::<Vec<_>>());
    assert_eq!(Some((1, &3)), row.leading_entry());
    assert_eq!(Some(&3), row.at(2));
    assert_eq!(None, row.at(4));
    assert_eq!(vec![0, 3, 3, 0], row.to_dense(4, ring));
}

#[test]
fn test_add_scaled() {
    let ring = StaticRing::<i64>::RING;
    let mut target = row_of([(0, 1), (2, 2), (5, 4)]);
    let source = row_of([(1, 1), (2, -1), (6, 1)]);
    let delta = target.add_scaled(&source, &2, ring);
    assert_eq!(vec![(0, 1), (1, 2), (5, 4), (6, 2)], target.iter().map(|(j, x)| (j, *x)).collect::<Vec<_>>());
    assert_eq!(target.weight(ring) as i64 - row_of([(0, 1), (2, 2), (5, 4)]).weight(ring) as i64, delta);
}

#[test]
fn test_add_scaled_cancel_everything() {
    let ring = StaticRing::<i64>::RING;
    let mut target = row_of([(0, 3), (3, -6)]);
    let source = row_of([(0, 1), (3, -2)]);
    let weight = target.weight(ring) as i64;
    let mut buffer = Vec::new();
    let delta = target.add_scaled_with_buffer(&source, &-3, ring, &mut buffer);
    assert!(target.is_empty());
    assert_eq!(-weight, delta);
}

#[test]
fn test_add_scaled_f2() {
    let ring = F2::RING;
    let mut target = SparseRow::from_entries([(0, 1), (1, 1), (3, 1)], ring);
    let source = SparseRow::from_entries([(1, 1), (2, 1), (3, 1)], ring);
    let delta = target.add_scaled(&source, &1, ring);
    assert_eq!(vec![(0, 1), (2, 1)], target.iter().map(|(j, x)| (j, *x)).collect::<Vec<_>>());
    assert_eq!(-1, delta);
}

#[test]
fn test_scale_and_add_at() {
    let ring = StaticRing::<i64>::RING;
    let mut row = row_of([(1, 1), (3, -2)]);
    assert_eq!(2, row.scale(&-3, ring));
    assert_eq!(vec![(1, -3), (3, 6)], row.iter().map(|(j, x)| (j, *x)).collect::<Vec<_>>());
    assert_eq!(1, row.add_at(0, 1, ring));
    assert_eq!(-2, row.add_at(1, 3, ring));
    assert_eq!(vec![(0, 1), (3, 6)], row.iter().map(|(j, x)| (j, *x)).collect::<Vec<_>>());
}

#[test]
#[should_panic]
fn test_scale_by_zero() {
    let mut row = row_of([(1, 1)]);
    row.scale(&0, StaticRing::<i64>::RING);
}
