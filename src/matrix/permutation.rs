
///
/// A permutation of `{0, ..., n - 1}`, stored both as explicit order list and as
/// its inverse, so that both directions can be queried in constant time.
///
/// The convention is that the permutation "moves" the index `apply(k)` to position `k`.
/// In other words, permuting the rows of a matrix `A` by `perm` gives the matrix whose
/// `k`-th row is the `perm.apply(k)`-th row of `A`.
///
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Permutation {
    order: Vec<usize>,
    inverse: Vec<usize>
}

impl Permutation {

    ///
    /// Creates the permutation from its explicit order list. Panics if the given
    /// list does not contain every index in `0..order.len()` exactly once.
    ///
    pub fn from_order(order: Vec<usize>) -> Self {
        let mut inverse = vec![usize::MAX; order.len()];
        for (k, i) in order.iter().enumerate() {
            assert!(*i < order.len(), "index {} out of range for permutation of length {}", i, order.len());
            assert!(inverse[*i] == usize::MAX, "index {} occurs twice", i);
            inverse[*i] = k;
        }
        return Permutation { order, inverse };
    }

    pub fn identity(len: usize) -> Self {
        Permutation { order: (0..len).collect(), inverse: (0..len).collect() }
    }

    ///
    /// Returns the index that is moved to position `k`.
    ///
    pub fn apply(&self, k: usize) -> usize {
        self.order[k]
    }

    ///
    /// Returns the position to which index `i` is moved, i.e. the inverse of [`Permutation::apply()`].
    ///
    pub fn position_of(&self, i: usize) -> usize {
        self.inverse[i]
    }

    pub fn inverse(&self) -> Permutation {
        Permutation { order: self.inverse.clone(), inverse: self.order.clone() }
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn order(&self) -> &[usize] {
        &self.order
    }
}

#[test]
fn test_permutation_inverse() {
    let perm = Permutation::from_order(vec![2, 0, 3, 1]);
    assert_eq!(4, perm.len());
    assert_eq!(3, perm.apply(2));
    assert_eq!(2, perm.position_of(3));
    let inv = perm.inverse();
    for k in 0..4 {
        assert_eq!(k, inv.apply(perm.apply(k)));
        assert_eq!(k, perm.position_of(perm.apply(k)));
    }
    assert_eq!(Permutation::identity(3), Permutation::from_order(vec![0, 1, 2]));
}

#[test]
#[should_panic]
fn test_permutation_duplicate() {
    Permutation::from_order(vec![0, 1, 1]);
}
