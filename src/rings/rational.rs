use std::fmt::Debug;

use serde::{Deserializer, Serializer};

use crate::divisibility::{DivisibilityRing, DivisibilityRingStore};
use crate::field::Field;
use crate::pid::{EuclideanRing, EuclideanRingStore};
use crate::ring::*;
use crate::serialization::*;

///
/// An implementation of the rational numbers `Q`, based on representing them
/// as a reduced tuple `(numerator, denominator)` over a euclidean ring of integers.
///
/// Be careful when instantiating it with finite-precision integers, like `StaticRing<i64>`,
/// since by nature of the rational numbers, both numerator and denominator can increase
/// dramatically, even when the numbers itself are of moderate size.
///
/// # Example
/// ```rust
/// # use feanor_sparse::assert_el_eq;
/// # use feanor_sparse::ring::*;
/// # use feanor_sparse::primitive_int::*;
/// # use feanor_sparse::rings::rational::*;
/// # use feanor_sparse::field::FieldStore;
/// let QQ = RationalField::new(StaticRing::<i64>::RING);
/// let one_half = QQ.div(&QQ.one(), &QQ.from_int(2));
/// assert_el_eq!(QQ, QQ.div(&QQ.one(), &QQ.from_int(4)), QQ.pow(QQ.clone_el(&one_half), 2));
/// assert_eq!(1, *QQ.num(&one_half));
/// assert_eq!(2, *QQ.den(&one_half));
/// ```
///
pub struct RationalFieldBase<I: RingStore>
    where I::Type: EuclideanRing
{
    integers: I
}

impl<I> Clone for RationalFieldBase<I>
    where I: RingStore + Clone,
        I::Type: EuclideanRing
{
    fn clone(&self) -> Self {
        Self { integers: self.integers.clone() }
    }
}

impl<I> Copy for RationalFieldBase<I>
    where I: RingStore + Copy,
        I::Type: EuclideanRing
{}

impl<I> Debug for RationalFieldBase<I>
    where I: RingStore,
        I::Type: EuclideanRing
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Q")
    }
}

impl<I> PartialEq for RationalFieldBase<I>
    where I: RingStore,
        I::Type: EuclideanRing
{
    fn eq(&self, other: &Self) -> bool {
        self.integers.get_ring() == other.integers.get_ring()
    }
}

pub struct RationalFieldEl<I>(El<I>, El<I>)
    where I: RingStore,
        I::Type: EuclideanRing;

impl<I> Debug for RationalFieldEl<I>
    where I: RingStore,
        I::Type: EuclideanRing,
        El<I>: Debug
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RationalFieldEl")
            .field("num", &self.0)
            .field("den", &self.1)
            .finish()
    }
}

pub type RationalField<I> = RingValue<RationalFieldBase<I>>;

impl<I> RationalField<I>
    where I: RingStore,
        I::Type: EuclideanRing
{
    ///
    /// Returns the fraction field of the given integer ring.
    ///
    pub const fn new(integers: I) -> Self {
        RingValue::from(RationalFieldBase { integers })
    }

    pub fn num<'a>(&'a self, el: &'a El<Self>) -> &'a El<I> {
        &el.0
    }

    pub fn den<'a>(&'a self, el: &'a El<Self>) -> &'a El<I> {
        &el.1
    }

    pub fn from_fraction(&self, num: El<I>, den: El<I>) -> El<Self> {
        self.get_ring().from_fraction(num, den)
    }

    pub fn base_ring(&self) -> &I {
        &self.get_ring().integers
    }
}

impl<I> RationalFieldBase<I>
    where I: RingStore,
        I::Type: EuclideanRing
{
    fn reduce(&self, value: (&mut El<I>, &mut El<I>)) {
        let (_, _, gcd) = self.integers.ideal_gen(&*value.0, &*value.1);
        *value.0 = self.integers.checked_div(&*value.0, &gcd).unwrap();
        *value.1 = self.integers.checked_div(&*value.1, &gcd).unwrap();
        let unit = self.integers.normalization_unit(&*value.1);
        self.integers.mul_assign_ref(value.0, &unit);
        self.integers.mul_assign(value.1, unit);
    }

    pub fn from_fraction(&self, mut num: El<I>, mut den: El<I>) -> RationalFieldEl<I> {
        assert!(!self.integers.is_zero(&den), "denominator must not be zero");
        self.reduce((&mut num, &mut den));
        return RationalFieldEl(num, den);
    }
}

impl<I> RingBase for RationalFieldBase<I>
    where I: RingStore,
        I::Type: EuclideanRing
{
    type Element = RationalFieldEl<I>;

    fn clone_el(&self, val: &Self::Element) -> Self::Element {
        RationalFieldEl(self.integers.clone_el(&val.0), self.integers.clone_el(&val.1))
    }

    fn add_assign(&self, lhs: &mut Self::Element, rhs: Self::Element) {
        if self.integers.is_zero(&rhs.0) {
            // do nothing
        } else if self.integers.is_zero(&lhs.0) {
            *lhs = rhs;
        } else if self.integers.is_one(&lhs.1) && self.integers.is_one(&rhs.1) {
            self.integers.add_assign(&mut lhs.0, rhs.0);
        } else {
            self.integers.mul_assign_ref(&mut lhs.0, &rhs.1);
            self.integers.add_assign(&mut lhs.0, self.integers.mul_ref_snd(rhs.0, &lhs.1));
            self.integers.mul_assign(&mut lhs.1, rhs.1);
            self.reduce((&mut lhs.0, &mut lhs.1));
        }
    }

    fn negate_inplace(&self, lhs: &mut Self::Element) {
        self.integers.negate_inplace(&mut lhs.0);
    }

    fn mul_assign(&self, lhs: &mut Self::Element, rhs: Self::Element) {
        self.integers.mul_assign(&mut lhs.0, rhs.0);
        self.integers.mul_assign(&mut lhs.1, rhs.1);
        self.reduce((&mut lhs.0, &mut lhs.1));
    }

    fn from_int(&self, value: i32) -> Self::Element {
        RationalFieldEl(self.integers.from_int(value), self.integers.one())
    }

    fn eq_el(&self, lhs: &Self::Element, rhs: &Self::Element) -> bool {
        self.integers.eq_el(&self.integers.mul_ref(&lhs.0, &rhs.1), &self.integers.mul_ref(&lhs.1, &rhs.0))
    }

    fn is_zero(&self, value: &Self::Element) -> bool {
        self.integers.is_zero(&value.0)
    }

    fn is_commutative(&self) -> bool { true }

    fn dbg<'a>(&self, value: &Self::Element, out: &mut std::fmt::Formatter<'a>) -> std::fmt::Result {
        if self.integers.is_one(&value.1) {
            write!(out, "{}", self.integers.format(&value.0))
        } else {
            write!(out, "{}/{}", self.integers.format(&value.0), self.integers.format(&value.1))
        }
    }

    ///
    /// The weight of a fraction is the sum of the weights of numerator and denominator.
    ///
    fn elimination_weight(&self, value: &Self::Element) -> usize {
        if self.is_zero(value) {
            0
        } else {
            self.integers.elimination_weight(&value.0) + self.integers.elimination_weight(&value.1)
        }
    }
}

impl<I> DivisibilityRing for RationalFieldBase<I>
    where I: RingStore,
        I::Type: EuclideanRing
{
    fn checked_div(&self, lhs: &Self::Element, rhs: &Self::Element) -> Option<Self::Element> {
        if self.is_zero(lhs) && self.is_zero(rhs) {
            Some(self.zero())
        } else if self.is_zero(rhs) {
            None
        } else {
            let mut result = RationalFieldEl(self.integers.mul_ref(&lhs.0, &rhs.1), self.integers.mul_ref(&lhs.1, &rhs.0));
            self.reduce((&mut result.0, &mut result.1));
            Some(result)
        }
    }

    fn is_unit(&self, x: &Self::Element) -> bool {
        !self.is_zero(x)
    }
}

impl<I> EuclideanRing for RationalFieldBase<I>
    where I: RingStore,
        I::Type: EuclideanRing
{
    fn euclidean_div_rem(&self, lhs: Self::Element, rhs: &Self::Element) -> (Self::Element, Self::Element) {
        assert!(!self.is_zero(rhs));
        (self.checked_div(&lhs, rhs).unwrap(), self.zero())
    }

    fn euclidean_deg(&self, val: &Self::Element) -> Option<usize> {
        if self.is_zero(val) {
            Some(0)
        } else {
            Some(1)
        }
    }

    fn normalization_unit(&self, x: &Self::Element) -> Self::Element {
        if self.is_zero(x) {
            self.one()
        } else {
            self.checked_div(&self.one(), x).unwrap()
        }
    }
}

impl<I> Field for RationalFieldBase<I>
    where I: RingStore,
        I::Type: EuclideanRing
{}

impl<I> SerializableElementRing for RationalFieldBase<I>
    where I: RingStore,
        I::Type: EuclideanRing + SerializableElementRing
{
    fn deserialize<'de, D>(&self, deserializer: D) -> Result<Self::Element, D::Error>
        where D: Deserializer<'de>
    {
        let mut parts = Vec::with_capacity(2);
        deserialize_seq_helper(deserializer, |x| parts.push(x), DeserializeWithRing::new(&self.integers))?;
        if parts.len() != 2 {
            return Err(serde::de::Error::invalid_length(parts.len(), &"a pair (numerator, denominator)"));
        }
        let den = parts.pop().unwrap();
        let num = parts.pop().unwrap();
        if self.integers.is_zero(&den) {
            return Err(serde::de::Error::custom("denominator must not be zero"));
        }
        return Ok(self.from_fraction(num, den));
    }

    fn serialize<S>(&self, el: &Self::Element, serializer: S) -> Result<S::Ok, S::Error>
        where S: Serializer
    {
        serialize_seq_helper(serializer, [&el.0, &el.1].into_iter().map(|x| SerializeWithRing::new(x, &self.integers)))
    }
}

#[cfg(test)]
use crate::primitive_int::StaticRing;
#[cfg(test)]
use crate::field::FieldStore;

#[cfg(test)]
fn edge_case_elements<'a>(QQ: &'a RationalField<StaticRing<i64>>) -> impl 'a + Iterator<Item = El<RationalField<StaticRing<i64>>>> {
    [(0, 1), (1, 1), (-1, 1), (1, 2), (-3, 4), (5, 3), (7, 1)].into_iter().map(|(num, den)| QQ.from_fraction(num, den))
}

#[test]
fn test_ring_axioms() {
    let QQ = RationalField::new(StaticRing::<i64>::RING);
    crate::ring::generic_tests::test_ring_axioms(&QQ, edge_case_elements(&QQ));
    crate::divisibility::generic_tests::test_divisibility_axioms(&QQ, edge_case_elements(&QQ).filter(|x| *QQ.num(x) != 0));
    crate::pid::generic_tests::test_euclidean_ring_axioms(&QQ, edge_case_elements(&QQ));
}

#[test]
fn test_reduced_representation() {
    let QQ = RationalField::new(StaticRing::<i64>::RING);
    let x = QQ.from_fraction(6, -4);
    assert_eq!(-3, *QQ.num(&x));
    assert_eq!(2, *QQ.den(&x));
    let y = QQ.div(&QQ.from_int(3), &QQ.from_int(-9));
    assert_eq!(-1, *QQ.num(&y));
    assert_eq!(3, *QQ.den(&y));
    assert_el_eq!(QQ, QQ.one(), QQ.normalize(QQ.from_int(-3)));
}

#[test]
fn test_elimination_weight() {
    let QQ = RationalField::new(StaticRing::<i64>::RING);
    assert_eq!(0, QQ.elimination_weight(&QQ.zero()));
    assert_eq!(2, QQ.elimination_weight(&QQ.one()));
    assert_eq!(5, QQ.elimination_weight(&QQ.from_fraction(-3, 4)));
}

#[test]
fn test_serialization() {
    let QQ = RationalField::new(StaticRing::<i64>::RING);
    crate::serialization::generic_tests::test_serialization(&QQ, edge_case_elements(&QQ));
    let json = serde_json::to_string(&SerializeWithRing::new(&QQ.from_fraction(-3, 4), &QQ)).unwrap();
    assert_eq!("[-3,4]", json);
}
