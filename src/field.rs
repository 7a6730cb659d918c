use crate::ring::*;
use crate::pid::*;

///
/// Trait for rings that are fields, i.e. where every nonzero element
/// is a unit.
///
/// Every field is trivially a [`EuclideanRing`], where division has no remainder.
///
pub trait Field: EuclideanRing {

    fn div(&self, lhs: &Self::Element, rhs: &Self::Element) -> Self::Element {
        assert!(!self.is_zero(rhs), "division by zero");
        self.checked_div(lhs, rhs).unwrap()
    }
}

///
/// [`RingStore`] for [`Field`]s
///
pub trait FieldStore: RingStore + EuclideanRingStore
    where Self::Type: Field
{
    delegate!{ fn div(&self, lhs: &El<Self>, rhs: &El<Self>) -> El<Self> }
}

impl<R> FieldStore for R
    where R: RingStore,
        R::Type: Field
{}
