use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::algorithms::eea::const_eea;
use crate::pid::EuclideanRing;
use crate::field::Field;
use crate::divisibility::*;
use crate::ring::*;
use crate::serialization::SerializableElementRing;

///
/// Ring that implements arithmetic in `Z/nZ` for a small `n` known
/// at compile time.
///
/// If `IS_FIELD` is set, `N` must be prime, and the ring additionally implements
/// [`Field`]. The most important instance for this crate is [`F2`], the field with
/// two elements, over which [`crate::algorithms::rank`] computes ranks.
///
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ZnBase<const N: u64, const IS_FIELD: bool>;

pub const fn is_prime(n: u64) -> bool {
    assert!(n >= 2);
    let mut d = 2;
    while d * d <= n {
        if n % d == 0 {
            return false;
        }
        d += 1;
    }
    return true;
}

impl<const N: u64, const IS_FIELD: bool> ZnBase<N, IS_FIELD> {

    pub const fn new() -> Self {
        assert!(N >= 2);
        assert!(N <= u32::MAX as u64);
        assert!(!IS_FIELD || is_prime(N));
        ZnBase
    }

    ///
    /// Returns a uniformly random element, using the given source of random bits.
    ///
    pub fn random_element<G: FnMut() -> u64>(&self, mut rng: G) -> u64 {
        rng() % N
    }

    pub fn modulus(&self) -> u64 {
        N
    }
}

impl<const N: u64, const IS_FIELD: bool> RingBase for ZnBase<N, IS_FIELD> {
    type Element = u64;

    fn clone_el(&self, val: &Self::Element) -> Self::Element {
        *val
    }

    fn add_assign(&self, lhs: &mut Self::Element, rhs: Self::Element) {
        debug_assert!(*lhs < N && rhs < N);
        *lhs += rhs;
        if *lhs >= N {
            *lhs -= N;
        }
    }

    fn negate_inplace(&self, lhs: &mut Self::Element) {
        if *lhs != 0 {
            *lhs = N - *lhs;
        }
    }

    fn mul_assign(&self, lhs: &mut Self::Element, rhs: Self::Element) {
        *lhs = (*lhs * rhs) % N
    }

    fn from_int(&self, value: i32) -> Self::Element {
        (value as i64).rem_euclid(N as i64) as u64
    }

    fn eq_el(&self, lhs: &Self::Element, rhs: &Self::Element) -> bool {
        *lhs == *rhs
    }

    fn is_commutative(&self) -> bool { true }

    fn dbg<'a>(&self, value: &Self::Element, out: &mut std::fmt::Formatter<'a>) -> std::fmt::Result {
        write!(out, "{}", *value)
    }
}

impl<const N: u64, const IS_FIELD: bool> DivisibilityRing for ZnBase<N, IS_FIELD> {

    fn checked_div(&self, lhs: &Self::Element, rhs: &Self::Element) -> Option<Self::Element> {
        let (s, _, d) = const_eea(*rhs as i128, N as i128);
        let d = d.unsigned_abs() as u64;
        let rhs_inv = s.rem_euclid(N as i128) as u64;
        if *lhs % d == 0 {
            Some(self.mul(*lhs / d, rhs_inv))
        } else {
            None
        }
    }
}

impl<const N: u64> EuclideanRing for ZnBase<N, true> {

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

impl<const N: u64> Field for ZnBase<N, true> {}

impl<const N: u64, const IS_FIELD: bool> SerializableElementRing for ZnBase<N, IS_FIELD> {

    fn deserialize<'de, D>(&self, deserializer: D) -> Result<Self::Element, D::Error>
        where D: Deserializer<'de>
    {
        let result = u64::deserialize(deserializer)?;
        if result >= N {
            return Err(serde::de::Error::custom(format!("{} is not a reduced representative modulo {}", result, N)));
        }
        return Ok(result);
    }

    fn serialize<S>(&self, el: &Self::Element, serializer: S) -> Result<S::Ok, S::Error>
        where S: Serializer
    {
        el.serialize(serializer)
    }
}

impl<const N: u64, const IS_FIELD: bool> RingValue<ZnBase<N, IS_FIELD>> {

    pub const RING: Self = Self::from(ZnBase::new());
}

///
/// Ring that implements arithmetic in `Z/nZ` for a small `n` known
/// at compile time. For details, see [`ZnBase`].
///
pub type Zn<const N: u64> = RingValue<ZnBase<N, false>>;

///
/// Ring that implements arithmetic in `Z/nZ` for a small prime `n` known
/// at compile time. For details, see [`ZnBase`].
///
pub type Fp<const P: u64> = RingValue<ZnBase<P, true>>;

///
/// The field with two elements.
///
pub type F2 = Fp<2>;

#[cfg(test)]
use crate::pid::EuclideanRingStore;

#[test]
fn test_ring_axioms_zn() {
    crate::ring::generic_tests::test_ring_axioms(Zn::<17>::RING, Zn::<17>::RING.get_ring().elements());
    crate::ring::generic_tests::test_ring_axioms(Zn::<12>::RING, Zn::<12>::RING.get_ring().elements());
    crate::ring::generic_tests::test_ring_axioms(Fp::<2>::RING, Fp::<2>::RING.get_ring().elements());
}

#[test]
fn test_divisibility_axioms_zn() {
    crate::divisibility::generic_tests::test_divisibility_axioms(Zn::<17>::RING, Zn::<17>::RING.get_ring().elements());
    crate::divisibility::generic_tests::test_divisibility_axioms(Zn::<12>::RING, Zn::<12>::RING.get_ring().elements());
}

#[test]
fn test_euclidean_axioms_fp() {
    crate::pid::generic_tests::test_euclidean_ring_axioms(Fp::<17>::RING, Fp::<17>::RING.get_ring().elements());
    crate::pid::generic_tests::test_euclidean_ring_axioms(F2::RING, F2::RING.get_ring().elements());
}

#[test]
fn test_normalize_fp() {
    let ring = Fp::<7>::RING;
    assert_eq!(1, ring.normalize(3));
    assert_eq!(0, ring.normalize(0));
    assert!(!ring.is_unit(&ring.zero()));
    assert!(Zn::<12>::RING.is_unit(&5));
    assert!(!Zn::<12>::RING.is_unit(&4));
}

#[test]
fn test_serialization_zn() {
    crate::serialization::generic_tests::test_serialization(Zn::<12>::RING, Zn::<12>::RING.get_ring().elements());
}

#[cfg(test)]
impl<const N: u64, const IS_FIELD: bool> ZnBase<N, IS_FIELD> {

    fn elements(&self) -> impl Iterator<Item = u64> {
        0..N
    }
}
