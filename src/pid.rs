use crate::ring::*;
use crate::divisibility::*;
use crate::algorithms;

///
/// Trait for rings that support euclidean division.
///
/// In other words, there is a degree function d(.)
/// returning nonnegative integers such that for every `x, y`
/// with `y != 0` there are `q, r` with `x = qy + r` and
/// `d(r) < d(y)` or `r = 0`. Note that `q, r` do not have to be unique,
/// and implementations are free to use any choice.
///
/// Additionally, euclidean rings in this crate fix a canonical representative
/// for every class of associated elements, via [`EuclideanRing::normalization_unit()`].
/// This is what makes the normal forms computed by [`crate::algorithms::elimination`]
/// unique.
///
/// # Example
/// ```
/// # use feanor_sparse::assert_el_eq;
/// # use feanor_sparse::ring::*;
/// # use feanor_sparse::pid::*;
/// # use feanor_sparse::primitive_int::*;
/// let ring = StaticRing::<i64>::RING;
/// let (q, r) = ring.euclidean_div_rem(14, &6);
/// assert_el_eq!(&ring, &14, &ring.add(ring.mul(q, 6), r));
/// assert!(ring.euclidean_deg(&r) < ring.euclidean_deg(&6));
/// ```
///
pub trait EuclideanRing: DivisibilityRing {

    fn euclidean_div_rem(&self, lhs: Self::Element, rhs: &Self::Element) -> (Self::Element, Self::Element);
    fn euclidean_deg(&self, val: &Self::Element) -> Option<usize>;

    ///
    /// Returns a unit `u` such that `u * x` is the canonical representative of
    /// the class of elements associated to `x`. For `x = 0`, this is `1`.
    ///
    fn normalization_unit(&self, x: &Self::Element) -> Self::Element;

    fn is_normalized(&self, x: &Self::Element) -> bool {
        self.is_one(&self.normalization_unit(x))
    }

    fn euclidean_div(&self, lhs: Self::Element, rhs: &Self::Element) -> Self::Element {
        self.euclidean_div_rem(lhs, rhs).0
    }

    fn euclidean_rem(&self, lhs: Self::Element, rhs: &Self::Element) -> Self::Element {
        self.euclidean_div_rem(lhs, rhs).1
    }

    ///
    /// Computes a Bezout identity.
    ///
    /// More concretely, this returns (s, t, g) such that g is a generator
    /// of the ideal `(lhs, rhs)` and `g = s * lhs + t * rhs`.
    ///
    fn ideal_gen(&self, lhs: &Self::Element, rhs: &Self::Element) -> (Self::Element, Self::Element, Self::Element) {
        algorithms::eea::eea(self.clone_el(lhs), self.clone_el(rhs), RingRef::new(self))
    }
}

///
/// [`RingStore`] for [`EuclideanRing`]s
///
pub trait EuclideanRingStore: RingStore + DivisibilityRingStore
    where Self::Type: EuclideanRing
{
    delegate!{ fn euclidean_div_rem(&self, lhs: El<Self>, rhs: &El<Self>) -> (El<Self>, El<Self>) }
    delegate!{ fn euclidean_div(&self, lhs: El<Self>, rhs: &El<Self>) -> El<Self> }
    delegate!{ fn euclidean_rem(&self, lhs: El<Self>, rhs: &El<Self>) -> El<Self> }
    delegate!{ fn euclidean_deg(&self, val: &El<Self>) -> Option<usize> }
    delegate!{ fn normalization_unit(&self, x: &El<Self>) -> El<Self> }
    delegate!{ fn is_normalized(&self, x: &El<Self>) -> bool }
    delegate!{ fn ideal_gen(&self, lhs: &El<Self>, rhs: &El<Self>) -> (El<Self>, El<Self>, El<Self>) }

    ///
    /// Returns the canonical associate of `x`.
    ///
    fn normalize(&self, x: El<Self>) -> El<Self> {
        let unit = self.normalization_unit(&x);
        self.mul(x, unit)
    }
}

impl<R> EuclideanRingStore for R
    where R: RingStore,
        R::Type: EuclideanRing
{}

#[stability::unstable(feature = "enable")]
#[cfg(any(test, feature = "generic_tests"))]
pub mod generic_tests {

    use super::*;

    #[stability::unstable(feature = "enable")]
    pub fn test_euclidean_ring_axioms<R: RingStore, I: Iterator<Item = El<R>>>(ring: R, edge_case_elements: I)
        where R::Type: EuclideanRing
    {
        let elements = edge_case_elements.collect::<Vec<_>>();
        for a in &elements {
            let unit = ring.normalization_unit(a);
            assert!(ring.is_unit(&unit));
            assert!(ring.is_normalized(&ring.normalize(ring.clone_el(a))));

            for b in &elements {
                if ring.is_zero(b) {
                    continue;
                }
                let (q, r) = ring.euclidean_div_rem(ring.clone_el(a), b);
                assert!(ring.is_zero(&r) || ring.euclidean_deg(&r) < ring.euclidean_deg(b));
                assert_el_eq!(ring, a, ring.add(ring.mul_ref_snd(q, b), r));

                let (s, t, d) = ring.ideal_gen(a, b);
                assert_el_eq!(ring, d, ring.add(ring.mul_ref(&s, a), ring.mul_ref(&t, b)));
                assert!(ring.checked_div(a, &d).is_some());
                assert!(ring.checked_div(b, &d).is_some());
            }
        }
    }
}
