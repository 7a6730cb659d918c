use crate::ring::*;

///
/// Trait for rings that support checking divisibility, i.e.
/// whether for `x, y` there is `k` such that `x = ky`.
///
pub trait DivisibilityRing: RingBase {

    ///
    /// Checks whether there is an element `x` such that `rhs * x = lhs`, and
    /// returns it if it exists. Note that this does not have to be unique, if
    /// rhs is a left zero-divisor. In particular, this function will return any
    /// element in the ring if `lhs = rhs = 0`.
    ///
    fn checked_div(&self, lhs: &Self::Element, rhs: &Self::Element) -> Option<Self::Element>;

    fn is_unit(&self, x: &Self::Element) -> bool {
        self.checked_div(&self.one(), x).is_some()
    }
}

///
/// [`RingStore`] for [`DivisibilityRing`]s
///
pub trait DivisibilityRingStore: RingStore
    where Self::Type: DivisibilityRing
{
    delegate!{ fn checked_div(&self, lhs: &El<Self>, rhs: &El<Self>) -> Option<El<Self>> }
    delegate!{ fn is_unit(&self, x: &El<Self>) -> bool }

    fn invert(&self, value: &El<Self>) -> Option<El<Self>> {
        self.checked_div(&self.one(), value)
    }
}

impl<R> DivisibilityRingStore for R
    where R: RingStore,
        R::Type: DivisibilityRing
{}

#[stability::unstable(feature = "enable")]
#[cfg(any(test, feature = "generic_tests"))]
pub mod generic_tests {

    use super::*;

    #[stability::unstable(feature = "enable")]
    pub fn test_divisibility_axioms<R: RingStore, I: Iterator<Item = El<R>>>(ring: R, edge_case_elements: I)
        where R::Type: DivisibilityRing
    {
        let elements = edge_case_elements.collect::<Vec<_>>();
        for a in &elements {
            for b in &elements {
                let ab = ring.mul_ref(a, b);
                let quotient = ring.checked_div(&ab, b);
                assert!(quotient.is_some(), "{} should be divisible by {}", ring.format(&ab), ring.format(b));
                assert_el_eq!(ring, ab, ring.mul_ref_fst(b, quotient.unwrap()));
                if let Some(q) = ring.checked_div(a, b) {
                    assert_el_eq!(ring, a, ring.mul_ref_fst(b, q));
                }
            }
            if ring.is_unit(a) {
                assert_el_eq!(ring, ring.one(), ring.mul_ref_snd(ring.invert(a).unwrap(), a));
            }
        }
    }
}
