use std::fmt::Debug;

use serde::{Deserializer, Serializer};

use crate::divisibility::*;
use crate::field::{Field, FieldStore};
use crate::pid::EuclideanRing;
use crate::ring::*;
use crate::serialization::*;

///
/// The univariate polynomial ring `K[X]` over a field `K`, with polynomials stored as
/// dense vectors of coefficients.
///
/// This is the standard example of a euclidean ring that is not the integers, and the
/// euclidean degree is (one more than) the polynomial degree. In particular, the normal
/// forms computed by [`crate::algorithms::elimination`] are available over `K[X]`, e.g.
/// to compute the Smith normal form of the characteristic matrix `X * I - A`.
///
/// # Example
/// ```
/// # use feanor_sparse::assert_el_eq;
/// # use feanor_sparse::ring::*;
/// # use feanor_sparse::rings::poly::*;
/// # use feanor_sparse::rings::zn::*;
/// let P = DensePolyRing::new(Fp::<7>::RING, "X");
/// let x = P.indeterminate();
/// let f = P.add(P.pow(P.clone_el(&x), 2), P.one());
/// assert_eq!(Some(2), P.degree(&f));
/// assert_el_eq!(P, P.from_terms([(1, 0), (1, 2)]), f);
/// ```
///
pub struct DensePolyRingBase<R: RingStore>
    where R::Type: Field
{
    base_ring: R,
    unknown_name: &'static str
}

impl<R> Clone for DensePolyRingBase<R>
    where R: RingStore + Clone,
        R::Type: Field
{
    fn clone(&self) -> Self {
        Self { base_ring: self.base_ring.clone(), unknown_name: self.unknown_name }
    }
}

impl<R> Copy for DensePolyRingBase<R>
    where R: RingStore + Copy,
        R::Type: Field
{}

impl<R> Debug for DensePolyRingBase<R>
    where R: RingStore,
        R::Type: Field
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "K[{}]", self.unknown_name)
    }
}

impl<R> PartialEq for DensePolyRingBase<R>
    where R: RingStore,
        R::Type: Field
{
    fn eq(&self, other: &Self) -> bool {
        self.base_ring.get_ring() == other.base_ring.get_ring()
    }
}

///
/// A polynomial, stored as its coefficients. There are no trailing zero coefficients,
/// so the zero polynomial has no coefficients at all.
///
pub struct DensePolyRingEl<R: RingStore> {
    data: Vec<El<R>>
}

impl<R> Debug for DensePolyRingEl<R>
    where R: RingStore,
        El<R>: Debug
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.data.iter()).finish()
    }
}

pub type DensePolyRing<R> = RingValue<DensePolyRingBase<R>>;

impl<R> DensePolyRing<R>
    where R: RingStore,
        R::Type: Field
{
    pub fn new(base_ring: R, unknown_name: &'static str) -> Self {
        RingValue::from(DensePolyRingBase { base_ring, unknown_name })
    }

    pub fn base_ring(&self) -> &R {
        &self.get_ring().base_ring
    }

    pub fn indeterminate(&self) -> El<Self> {
        self.get_ring().indeterminate()
    }

    pub fn degree(&self, f: &El<Self>) -> Option<usize> {
        self.get_ring().degree(f)
    }

    pub fn coefficient_at(&self, f: &El<Self>, i: usize) -> El<R> {
        self.get_ring().coefficient_at(f, i)
    }

    pub fn from_terms<I>(&self, terms: I) -> El<Self>
        where I: IntoIterator<Item = (El<R>, usize)>
    {
        self.get_ring().from_terms(terms)
    }

    pub fn from_base(&self, c: El<R>) -> El<Self> {
        self.get_ring().from_terms([(c, 0)])
    }
}

impl<R> DensePolyRingBase<R>
    where R: RingStore,
        R::Type: Field
{
    fn trim(&self, f: &mut DensePolyRingEl<R>) {
        while f.data.last().map(|c| self.base_ring.is_zero(c)).unwrap_or(false) {
            f.data.pop();
        }
    }

    pub fn indeterminate(&self) -> DensePolyRingEl<R> {
        DensePolyRingEl { data: vec![self.base_ring.zero(), self.base_ring.one()] }
    }

    pub fn degree(&self, f: &DensePolyRingEl<R>) -> Option<usize> {
        f.data.len().checked_sub(1)
    }

    pub fn coefficient_at(&self, f: &DensePolyRingEl<R>, i: usize) -> El<R> {
        f.data.get(i).map(|c| self.base_ring.clone_el(c)).unwrap_or_else(|| self.base_ring.zero())
    }

    pub fn from_terms<I>(&self, terms: I) -> DensePolyRingEl<R>
        where I: IntoIterator<Item = (El<R>, usize)>
    {
        let mut result = DensePolyRingEl { data: Vec::new() };
        for (c, i) in terms {
            if result.data.len() <= i {
                result.data.resize_with(i + 1, || self.base_ring.zero());
            }
            self.base_ring.add_assign(&mut result.data[i], c);
        }
        self.trim(&mut result);
        return result;
    }

    fn poly_div(&self, lhs: &mut DensePolyRingEl<R>, rhs: &DensePolyRingEl<R>) -> DensePolyRingEl<R> {
        let rhs_deg = self.degree(rhs).unwrap();
        let lc_inv = self.base_ring.div(&self.base_ring.one(), &rhs.data[rhs_deg]);
        let mut quotient = DensePolyRingEl { data: Vec::new() };
        while let Some(lhs_deg) = self.degree(lhs).filter(|d| *d >= rhs_deg) {
            let factor = self.base_ring.mul_ref(&lhs.data[lhs_deg], &lc_inv);
            let shift = lhs_deg - rhs_deg;
            for i in 0..=rhs_deg {
                self.base_ring.sub_assign(&mut lhs.data[i + shift], self.base_ring.mul_ref(&factor, &rhs.data[i]));
            }
            debug_assert!(self.base_ring.is_zero(&lhs.data[lhs_deg]));
            if quotient.data.len() <= shift {
                quotient.data.resize_with(shift + 1, || self.base_ring.zero());
            }
            quotient.data[shift] = factor;
            self.trim(lhs);
        }
        return quotient;
    }
}

impl<R> RingBase for DensePolyRingBase<R>
    where R: RingStore,
        R::Type: Field
{
    type Element = DensePolyRingEl<R>;

    fn clone_el(&self, val: &Self::Element) -> Self::Element {
        DensePolyRingEl { data: val.data.iter().map(|c| self.base_ring.clone_el(c)).collect() }
    }

    fn add_assign_ref(&self, lhs: &mut Self::Element, rhs: &Self::Element) {
        if lhs.data.len() < rhs.data.len() {
            lhs.data.resize_with(rhs.data.len(), || self.base_ring.zero());
        }
        for (i, c) in rhs.data.iter().enumerate() {
            self.base_ring.add_assign_ref(&mut lhs.data[i], c);
        }
        self.trim(lhs);
    }

    fn add_assign(&self, lhs: &mut Self::Element, rhs: Self::Element) {
        self.add_assign_ref(lhs, &rhs);
    }

    fn negate_inplace(&self, lhs: &mut Self::Element) {
        for c in &mut lhs.data {
            self.base_ring.negate_inplace(c);
        }
    }

    fn mul_assign(&self, lhs: &mut Self::Element, rhs: Self::Element) {
        self.mul_assign_ref(lhs, &rhs);
    }

    fn mul_assign_ref(&self, lhs: &mut Self::Element, rhs: &Self::Element) {
        *lhs = self.mul_ref(lhs, rhs);
    }

    fn mul_ref(&self, lhs: &Self::Element, rhs: &Self::Element) -> Self::Element {
        if lhs.data.is_empty() || rhs.data.is_empty() {
            return self.zero();
        }
        let mut result = (0..(lhs.data.len() + rhs.data.len() - 1)).map(|_| self.base_ring.zero()).collect::<Vec<_>>();
        for (i, a) in lhs.data.iter().enumerate() {
            for (j, b) in rhs.data.iter().enumerate() {
                self.base_ring.add_assign(&mut result[i + j], self.base_ring.mul_ref(a, b));
            }
        }
        let mut result = DensePolyRingEl { data: result };
        self.trim(&mut result);
        return result;
    }

    fn from_int(&self, value: i32) -> Self::Element {
        self.from_terms([(self.base_ring.from_int(value), 0)])
    }

    fn eq_el(&self, lhs: &Self::Element, rhs: &Self::Element) -> bool {
        lhs.data.len() == rhs.data.len() && lhs.data.iter().zip(rhs.data.iter()).all(|(a, b)| self.base_ring.eq_el(a, b))
    }

    fn is_zero(&self, value: &Self::Element) -> bool {
        value.data.is_empty()
    }

    fn is_commutative(&self) -> bool { true }

    fn dbg<'a>(&self, value: &Self::Element, out: &mut std::fmt::Formatter<'a>) -> std::fmt::Result {
        if value.data.is_empty() {
            return write!(out, "0");
        }
        let mut first = true;
        for i in (0..value.data.len()).rev() {
            let c = &value.data[i];
            if self.base_ring.is_zero(c) {
                continue;
            }
            if !first {
                write!(out, " + ")?;
            }
            first = false;
            if i == 0 || !self.base_ring.is_one(c) {
                write!(out, "{}", self.base_ring.format(c))?;
            }
            match i {
                0 => {},
                1 => write!(out, "{}", self.unknown_name)?,
                _ => write!(out, "{}^{}", self.unknown_name, i)?
            }
        }
        return Ok(());
    }

    ///
    /// Polynomials are weighted by their degree, which is the main source of cost
    /// during elimination.
    ///
    fn elimination_weight(&self, value: &Self::Element) -> usize {
        value.data.len()
    }
}

impl<R> DivisibilityRing for DensePolyRingBase<R>
    where R: RingStore,
        R::Type: Field
{
    fn checked_div(&self, lhs: &Self::Element, rhs: &Self::Element) -> Option<Self::Element> {
        if self.is_zero(rhs) {
            return if self.is_zero(lhs) { Some(self.zero()) } else { None };
        }
        let (quo, rem) = self.euclidean_div_rem(self.clone_el(lhs), rhs);
        if self.is_zero(&rem) {
            Some(quo)
        } else {
            None
        }
    }

    fn is_unit(&self, x: &Self::Element) -> bool {
        self.degree(x) == Some(0)
    }
}

impl<R> EuclideanRing for DensePolyRingBase<R>
    where R: RingStore,
        R::Type: Field
{
    fn euclidean_div_rem(&self, mut lhs: Self::Element, rhs: &Self::Element) -> (Self::Element, Self::Element) {
        assert!(!self.is_zero(rhs), "division by zero");
        let quo = self.poly_div(&mut lhs, rhs);
        return (quo, lhs);
    }

    fn euclidean_deg(&self, val: &Self::Element) -> Option<usize> {
        Some(val.data.len())
    }

    ///
    /// The normalized polynomials are the monic ones.
    ///
    fn normalization_unit(&self, x: &Self::Element) -> Self::Element {
        match x.data.last() {
            None => self.one(),
            Some(lc) => self.from_terms([(self.base_ring.div(&self.base_ring.one(), lc), 0)])
        }
    }
}

impl<R> SerializableElementRing for DensePolyRingBase<R>
    where R: RingStore,
        R::Type: Field + SerializableElementRing
{
    fn deserialize<'de, D>(&self, deserializer: D) -> Result<Self::Element, D::Error>
        where D: Deserializer<'de>
    {
        let mut data = Vec::new();
        deserialize_seq_helper(deserializer, |c| data.push(c), DeserializeWithRing::new(&self.base_ring))?;
        let mut result = DensePolyRingEl { data };
        self.trim(&mut result);
        return Ok(result);
    }

    fn serialize<S>(&self, el: &Self::Element, serializer: S) -> Result<S::Ok, S::Error>
        where S: Serializer
    {
        serialize_seq_helper(serializer, el.data.iter().map(|c| SerializeWithRing::new(c, &self.base_ring)))
    }
}

#[cfg(test)]
use crate::rings::zn::Fp;
#[cfg(test)]
use crate::rings::rational::RationalField;
#[cfg(test)]
use crate::primitive_int::StaticRing;
#[cfg(test)]
use crate::pid::EuclideanRingStore;

#[cfg(test)]
fn edge_case_elements<'a, R>(P: &'a DensePolyRing<R>) -> impl 'a + Iterator<Item = El<DensePolyRing<R>>>
    where R: RingStore,
        R::Type: Field
{
    let base = P.base_ring();
    vec![
        P.zero(),
        P.one(),
        P.indeterminate(),
        P.from_terms([(base.from_int(2), 0), (base.from_int(1), 1)]),
        P.from_terms([(base.from_int(-1), 0), (base.from_int(3), 2)]),
        P.from_terms([(base.from_int(1), 0), (base.from_int(1), 1), (base.from_int(1), 3)]),
    ].into_iter()
}

#[test]
fn test_ring_axioms() {
    let P = DensePolyRing::new(Fp::<7>::RING, "X");
    crate::ring::generic_tests::test_ring_axioms(&P, edge_case_elements(&P));
    crate::divisibility::generic_tests::test_divisibility_axioms(&P, edge_case_elements(&P));
    crate::pid::generic_tests::test_euclidean_ring_axioms(&P, edge_case_elements(&P));
}

#[test]
fn test_euclidean_division_over_rationals() {
    let QQ = RationalField::new(StaticRing::<i64>::RING);
    let P = DensePolyRing::new(&QQ, "X");
    let f = P.from_terms([(QQ.from_int(1), 0), (QQ.from_int(2), 2)]);
    let g = P.from_terms([(QQ.from_int(1), 0), (QQ.from_int(3), 1)]);
    let (q, r) = P.euclidean_div_rem(P.clone_el(&f), &g);
    assert_eq!(Some(1), P.degree(&q));
    assert_eq!(Some(0), P.degree(&r));
    assert_el_eq!(P, f, P.add(P.mul_ref(&q, &g), r));
    assert_el_eq!(QQ, QQ.from_fraction(11, 9), P.coefficient_at(&P.euclidean_rem(P.clone_el(&f), &g), 0));
}

#[test]
fn test_normalize() {
    let P = DensePolyRing::new(Fp::<7>::RING, "X");
    let f = P.from_terms([(1, 0), (3, 1)]);
    let normalized = P.normalize(P.clone_el(&f));
    assert_el_eq!(P, P.from_terms([(5, 0), (1, 1)]), normalized);
    assert!(P.is_normalized(&normalized));
    assert!(!P.is_normalized(&f));
    assert!(P.is_unit(&P.from_int(3)));
}

#[test]
fn test_format() {
    let P = DensePolyRing::new(Fp::<7>::RING, "X");
    assert_eq!("X^2 + 2X + 1", format!("{}", P.format(&P.from_terms([(1, 0), (2, 1), (1, 2)]))));
    assert_eq!("0", format!("{}", P.format(&P.zero())));
}

#[test]
fn test_serialization() {
    let P = DensePolyRing::new(Fp::<7>::RING, "X");
    crate::serialization::generic_tests::test_serialization(&P, edge_case_elements(&P));
}
