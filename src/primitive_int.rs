use std::ops::{AddAssign, SubAssign, MulAssign, Neg, Div, Rem};
use std::marker::PhantomData;
use std::fmt::{Debug, Display};

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::ring::*;
use crate::divisibility::DivisibilityRing;
use crate::pid::EuclideanRing;
use crate::serialization::SerializableElementRing;

///
/// Trait for the primitive signed integer types that can be used as elements of
/// a [`StaticRing`].
///
pub trait PrimitiveInt: 'static + Send + Sync + AddAssign + SubAssign + MulAssign + Neg<Output = Self> + Eq + Ord + From<i8> + TryFrom<i32> + Into<i128> + Copy + Div<Self, Output = Self> + Rem<Self, Output = Self> + Display + Debug + Serialize + for<'de> Deserialize<'de> {

    fn bits() -> usize;
}

impl PrimitiveInt for i32 {
    fn bits() -> usize { Self::BITS as usize }
}

impl PrimitiveInt for i64 {
    fn bits() -> usize { Self::BITS as usize }
}

impl PrimitiveInt for i128 {
    fn bits() -> usize { Self::BITS as usize }
}

///
/// The ring of integers, represented by a primitive integer type `T`.
///
/// Operations are performed with the native integer arithmetic, so results that
/// do not fit into `T` cause an overflow.
///
pub struct StaticRingBase<T> {
    element: PhantomData<T>
}

impl<T> PartialEq for StaticRingBase<T> {
    fn eq(&self, _: &Self) -> bool {
        true
    }
}

impl<T> Debug for StaticRingBase<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Z")
    }
}

impl<T: PrimitiveInt> RingValue<StaticRingBase<T>> {
    pub const RING: StaticRing<T> = RingValue::from(StaticRingBase { element: PhantomData });
}

impl<T> Copy for StaticRingBase<T> {}

impl<T> Clone for StaticRingBase<T> {

    fn clone(&self) -> Self {
        *self
    }
}

impl<T: PrimitiveInt> RingBase for StaticRingBase<T> {

    type Element = T;

    fn clone_el(&self, val: &Self::Element) -> Self::Element {
        *val
    }

    fn add_assign(&self, lhs: &mut Self::Element, rhs: Self::Element) {
        *lhs += rhs;
    }

    fn sub_assign(&self, lhs: &mut Self::Element, rhs: Self::Element) {
        *lhs -= rhs;
    }

    fn negate_inplace(&self, lhs: &mut Self::Element) {
        *lhs = -*lhs;
    }

    fn mul_assign(&self, lhs: &mut Self::Element, rhs: Self::Element) {
        *lhs *= rhs;
    }

    fn from_int(&self, value: i32) -> Self::Element { T::try_from(value).map_err(|_| ()).unwrap() }

    fn eq_el(&self, lhs: &Self::Element, rhs: &Self::Element) -> bool {
        *lhs == *rhs
    }

    fn is_commutative(&self) -> bool { true }

    fn dbg<'a>(&self, value: &Self::Element, out: &mut std::fmt::Formatter<'a>) -> std::fmt::Result {
        write!(out, "{}", *value)
    }

    ///
    /// The weight of an integer is its bitlength, so pivots with small absolute
    /// value are preferred.
    ///
    fn elimination_weight(&self, value: &Self::Element) -> usize {
        let value: i128 = (*value).into();
        (i128::BITS - value.unsigned_abs().leading_zeros()) as usize
    }
}

impl<T: PrimitiveInt> DivisibilityRing for StaticRingBase<T> {

    fn checked_div(&self, lhs: &Self::Element, rhs: &Self::Element) -> Option<Self::Element> {
        if self.is_zero(lhs) && self.is_zero(rhs) {
            return Some(self.zero());
        } else if self.is_zero(rhs) {
            return None;
        }
        let (div, rem) = self.euclidean_div_rem(*lhs, rhs);
        if self.is_zero(&rem) {
            return Some(div);
        } else {
            return None;
        }
    }

    fn is_unit(&self, x: &Self::Element) -> bool {
        self.is_one(x) || self.is_neg_one(x)
    }
}

impl<T: PrimitiveInt> EuclideanRing for StaticRingBase<T> {

    fn euclidean_div_rem(&self, lhs: Self::Element, rhs: &Self::Element) -> (Self::Element, Self::Element) {
        (lhs / *rhs, lhs % *rhs)
    }

    fn euclidean_deg(&self, val: &Self::Element) -> Option<usize> {
        let val: i128 = (*val).into();
        val.checked_abs().and_then(|x| usize::try_from(x).ok())
    }

    fn normalization_unit(&self, x: &Self::Element) -> Self::Element {
        if *x < self.zero() { self.neg_one() } else { self.one() }
    }
}

impl<T: PrimitiveInt> SerializableElementRing for StaticRingBase<T> {

    fn deserialize<'de, D>(&self, deserializer: D) -> Result<Self::Element, D::Error>
        where D: Deserializer<'de>
    {
        T::deserialize(deserializer)
    }

    fn serialize<S>(&self, el: &Self::Element, serializer: S) -> Result<S::Ok, S::Error>
        where S: Serializer
    {
        el.serialize(serializer)
    }
}

pub type StaticRing<T> = RingValue<StaticRingBase<T>>;

#[cfg(test)]
use crate::pid::EuclideanRingStore;

#[test]
fn test_ring_axioms() {
    crate::ring::generic_tests::test_ring_axioms(StaticRing::<i32>::RING, [-2, -1, 0, 1, 2, 3, 4, 5, 6, 7, 8].into_iter());
    crate::ring::generic_tests::test_ring_axioms(StaticRing::<i64>::RING, [-2, -1, 0, 1, 2, 3, 4, 5, 6, 7, 8].into_iter());
    crate::ring::generic_tests::test_ring_axioms(StaticRing::<i128>::RING, [-2, -1, 0, 1, 2, 3, 4, 5, 6, 7, 8].into_iter());
}

#[test]
fn test_euclidean_axioms() {
    crate::divisibility::generic_tests::test_divisibility_axioms(StaticRing::<i64>::RING, [-6, -1, 0, 1, 2, 3, 7, 12].into_iter());
    crate::pid::generic_tests::test_euclidean_ring_axioms(StaticRing::<i64>::RING, [-6, -1, 0, 1, 2, 3, 7, 12].into_iter());
}

#[test]
fn test_elimination_weight() {
    let ring = StaticRing::<i64>::RING;
    assert_eq!(0, ring.elimination_weight(&0));
    assert_eq!(1, ring.elimination_weight(&-1));
    assert_eq!(3, ring.elimination_weight(&5));
    assert_eq!(3, ring.elimination_weight(&-7));
    assert_eq!(64, ring.elimination_weight(&i64::MIN));
}

#[test]
fn test_normalize() {
    let ring = StaticRing::<i64>::RING;
    assert_eq!(2, ring.normalize(-2));
    assert_eq!(2, ring.normalize(2));
    assert_eq!(0, ring.normalize(0));
    assert!(ring.is_normalized(&0));
    assert!(!ring.is_normalized(&-5));
}

#[test]
fn test_serialization() {
    crate::serialization::generic_tests::test_serialization(StaticRing::<i64>::RING, [-6, -1, 0, 1, 2, 3, 7, 12].into_iter());
}
