use std::fmt::{Debug, Display, Formatter};

///
/// Basic trait for objects that have a ring structure.
///
/// Implementors of this trait provide the basic ring operations on their
/// associated [`RingBase::Element`] type, and additionally operators for displaying
/// and equality testing. If a performance advantage can be achieved by accepting some
/// arguments by reference instead of by value, the default-implemented functions for
/// ring operations on references should be overwritten.
///
/// Note that usually, this trait will not be used directly, but always
/// through a [`RingStore`]. While this trait defines the functionality,
/// [`RingStore`] abstracts the storage, so algorithms can be given a ring by value,
/// by reference or wrapped in a [`RingRef`].
///
/// # Elimination weight
///
/// The sparse algorithms in this crate need a measure for the "complexity" of an
/// element, to decide which pivots cause the least growth of coefficients and fill-in.
/// This is given by [`RingBase::elimination_weight()`]. It is not required to have any
/// algebraic meaning, except that the zero element should have weight `0`.
///
pub trait RingBase: PartialEq {

    type Element: Sized;

    fn clone_el(&self, val: &Self::Element) -> Self::Element;
    fn add_assign_ref(&self, lhs: &mut Self::Element, rhs: &Self::Element) { self.add_assign(lhs, self.clone_el(rhs)) }
    fn add_assign(&self, lhs: &mut Self::Element, rhs: Self::Element);
    fn sub_assign_ref(&self, lhs: &mut Self::Element, rhs: &Self::Element) { self.sub_assign(lhs, self.clone_el(rhs)) }
    fn negate_inplace(&self, lhs: &mut Self::Element);
    fn mul_assign(&self, lhs: &mut Self::Element, rhs: Self::Element);
    fn mul_assign_ref(&self, lhs: &mut Self::Element, rhs: &Self::Element) { self.mul_assign(lhs, self.clone_el(rhs)) }
    fn zero(&self) -> Self::Element { self.from_int(0) }
    fn one(&self) -> Self::Element { self.from_int(1) }
    fn neg_one(&self) -> Self::Element { self.from_int(-1) }
    fn from_int(&self, value: i32) -> Self::Element;
    fn eq_el(&self, lhs: &Self::Element, rhs: &Self::Element) -> bool;
    fn is_zero(&self, value: &Self::Element) -> bool { self.eq_el(value, &self.zero()) }
    fn is_one(&self, value: &Self::Element) -> bool { self.eq_el(value, &self.one()) }
    fn is_neg_one(&self, value: &Self::Element) -> bool { self.eq_el(value, &self.neg_one()) }
    fn is_commutative(&self) -> bool { true }
    fn dbg<'a>(&self, value: &Self::Element, out: &mut Formatter<'a>) -> std::fmt::Result;

    ///
    /// Returns a measure for how "expensive" it is to have the given element as entry
    /// of a sparse matrix during elimination. Used to break ties between pivot candidates
    /// and to track the cost of rows.
    ///
    fn elimination_weight(&self, value: &Self::Element) -> usize {
        if self.is_zero(value) { 0 } else { 1 }
    }

    fn negate(&self, mut value: Self::Element) -> Self::Element {
        self.negate_inplace(&mut value);
        return value;
    }

    fn sub_assign(&self, lhs: &mut Self::Element, mut rhs: Self::Element) {
        self.negate_inplace(&mut rhs);
        self.add_assign(lhs, rhs);
    }

    fn add_ref(&self, lhs: &Self::Element, rhs: &Self::Element) -> Self::Element {
        let mut result = self.clone_el(lhs);
        self.add_assign_ref(&mut result, rhs);
        return result;
    }

    fn add_ref_fst(&self, lhs: &Self::Element, mut rhs: Self::Element) -> Self::Element {
        self.add_assign_ref(&mut rhs, lhs);
        return rhs;
    }

    fn add_ref_snd(&self, mut lhs: Self::Element, rhs: &Self::Element) -> Self::Element {
        self.add_assign_ref(&mut lhs, rhs);
        return lhs;
    }

    fn add(&self, mut lhs: Self::Element, rhs: Self::Element) -> Self::Element {
        self.add_assign(&mut lhs, rhs);
        return lhs;
    }

    fn sub_ref(&self, lhs: &Self::Element, rhs: &Self::Element) -> Self::Element {
        let mut result = self.clone_el(lhs);
        self.sub_assign_ref(&mut result, rhs);
        return result;
    }

    fn sub_ref_fst(&self, lhs: &Self::Element, mut rhs: Self::Element) -> Self::Element {
        self.sub_assign_ref(&mut rhs, lhs);
        self.negate_inplace(&mut rhs);
        return rhs;
    }

    fn sub_ref_snd(&self, mut lhs: Self::Element, rhs: &Self::Element) -> Self::Element {
        self.sub_assign_ref(&mut lhs, rhs);
        return lhs;
    }

    fn sub(&self, mut lhs: Self::Element, rhs: Self::Element) -> Self::Element {
        self.sub_assign(&mut lhs, rhs);
        return lhs;
    }

    fn mul_ref(&self, lhs: &Self::Element, rhs: &Self::Element) -> Self::Element {
        let mut result = self.clone_el(lhs);
        self.mul_assign_ref(&mut result, rhs);
        return result;
    }

    fn mul_ref_fst(&self, lhs: &Self::Element, mut rhs: Self::Element) -> Self::Element {
        if self.is_commutative() {
            self.mul_assign_ref(&mut rhs, lhs);
            return rhs;
        } else {
            let mut result = self.clone_el(lhs);
            self.mul_assign(&mut result, rhs);
            return result;
        }
    }

    fn mul_ref_snd(&self, mut lhs: Self::Element, rhs: &Self::Element) -> Self::Element {
        self.mul_assign_ref(&mut lhs, rhs);
        return lhs;
    }

    fn mul(&self, mut lhs: Self::Element, rhs: Self::Element) -> Self::Element {
        self.mul_assign(&mut lhs, rhs);
        return lhs;
    }

    fn pow(&self, x: Self::Element, power: usize) -> Self::Element {
        let mut result = self.one();
        let mut current = x;
        let mut remaining = power;
        while remaining > 0 {
            if remaining & 1 == 1 {
                self.mul_assign_ref(&mut result, &current);
            }
            remaining >>= 1;
            if remaining > 0 {
                current = self.mul_ref(&current, &current);
            }
        }
        return result;
    }

    fn sum<I>(&self, els: I) -> Self::Element
        where I: IntoIterator<Item = Self::Element>
    {
        els.into_iter().fold(self.zero(), |a, b| self.add(a, b))
    }

    fn prod<I>(&self, els: I) -> Self::Element
        where I: IntoIterator<Item = Self::Element>
    {
        els.into_iter().fold(self.one(), |a, b| self.mul(a, b))
    }
}

macro_rules! delegate {
    (fn $name:ident (&self, $($pname:ident: $ptype:ty),*) -> $rtype:ty) => {
        fn $name (&self, $($pname: $ptype),*) -> $rtype {
            self.get_ring().$name($($pname),*)
        }
    };
    (fn $name:ident (&self) -> $rtype:ty) => {
        fn $name (&self) -> $rtype {
            self.get_ring().$name()
        }
    };
}

///
/// Basic trait for objects that store (in some sense) a ring. This can
/// be a ring-by-value, a reference to a ring, or a [`RingRef`].
///
/// As opposed to [`RingBase`], which is responsible for the functionality
/// and ring operations, this trait is solely responsible for the storage.
/// All algorithms in this crate take their ring as some `R: RingStore`.
///
pub trait RingStore: Sized {

    type Type: RingBase + ?Sized;

    fn get_ring<'a>(&'a self) -> &'a Self::Type;

    delegate!{ fn clone_el(&self, val: &El<Self>) -> El<Self> }
    delegate!{ fn add_assign_ref(&self, lhs: &mut El<Self>, rhs: &El<Self>) -> () }
    delegate!{ fn add_assign(&self, lhs: &mut El<Self>, rhs: El<Self>) -> () }
    delegate!{ fn sub_assign_ref(&self, lhs: &mut El<Self>, rhs: &El<Self>) -> () }
    delegate!{ fn sub_assign(&self, lhs: &mut El<Self>, rhs: El<Self>) -> () }
    delegate!{ fn negate_inplace(&self, lhs: &mut El<Self>) -> () }
    delegate!{ fn mul_assign(&self, lhs: &mut El<Self>, rhs: El<Self>) -> () }
    delegate!{ fn mul_assign_ref(&self, lhs: &mut El<Self>, rhs: &El<Self>) -> () }
    delegate!{ fn zero(&self) -> El<Self> }
    delegate!{ fn one(&self) -> El<Self> }
    delegate!{ fn neg_one(&self) -> El<Self> }
    delegate!{ fn from_int(&self, value: i32) -> El<Self> }
    delegate!{ fn eq_el(&self, lhs: &El<Self>, rhs: &El<Self>) -> bool }
    delegate!{ fn is_zero(&self, value: &El<Self>) -> bool }
    delegate!{ fn is_one(&self, value: &El<Self>) -> bool }
    delegate!{ fn is_neg_one(&self, value: &El<Self>) -> bool }
    delegate!{ fn is_commutative(&self) -> bool }
    delegate!{ fn elimination_weight(&self, value: &El<Self>) -> usize }
    delegate!{ fn negate(&self, value: El<Self>) -> El<Self> }
    delegate!{ fn add_ref(&self, lhs: &El<Self>, rhs: &El<Self>) -> El<Self> }
    delegate!{ fn add_ref_fst(&self, lhs: &El<Self>, rhs: El<Self>) -> El<Self> }
    delegate!{ fn add_ref_snd(&self, lhs: El<Self>, rhs: &El<Self>) -> El<Self> }
    delegate!{ fn add(&self, lhs: El<Self>, rhs: El<Self>) -> El<Self> }
    delegate!{ fn sub_ref(&self, lhs: &El<Self>, rhs: &El<Self>) -> El<Self> }
    delegate!{ fn sub_ref_fst(&self, lhs: &El<Self>, rhs: El<Self>) -> El<Self> }
    delegate!{ fn sub_ref_snd(&self, lhs: El<Self>, rhs: &El<Self>) -> El<Self> }
    delegate!{ fn sub(&self, lhs: El<Self>, rhs: El<Self>) -> El<Self> }
    delegate!{ fn mul_ref(&self, lhs: &El<Self>, rhs: &El<Self>) -> El<Self> }
    delegate!{ fn mul_ref_fst(&self, lhs: &El<Self>, rhs: El<Self>) -> El<Self> }
    delegate!{ fn mul_ref_snd(&self, lhs: El<Self>, rhs: &El<Self>) -> El<Self> }
    delegate!{ fn mul(&self, lhs: El<Self>, rhs: El<Self>) -> El<Self> }
    delegate!{ fn pow(&self, x: El<Self>, power: usize) -> El<Self> }

    fn sum<I>(&self, els: I) -> El<Self>
        where I: IntoIterator<Item = El<Self>>
    {
        self.get_ring().sum(els)
    }

    fn prod<I>(&self, els: I) -> El<Self>
        where I: IntoIterator<Item = El<Self>>
    {
        self.get_ring().prod(els)
    }

    fn format<'a>(&'a self, value: &'a El<Self>) -> RingElementDisplayWrapper<'a, Self> {
        RingElementDisplayWrapper { ring: self, element: value }
    }

    fn println(&self, value: &El<Self>) {
        println!("{}", self.format(value));
    }
}

pub struct RingElementDisplayWrapper<'a, R: RingStore> {
    ring: &'a R,
    element: &'a El<R>
}

impl<'a, R: RingStore> Display for RingElementDisplayWrapper<'a, R> {

    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        self.ring.get_ring().dbg(self.element, f)
    }
}

impl<'a, R: RingStore> Debug for RingElementDisplayWrapper<'a, R> {

    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        self.ring.get_ring().dbg(self.element, f)
    }
}

pub type El<R> = <<R as RingStore>::Type as RingBase>::Element;

///
/// The most fundamental [`RingStore`]. It is basically a no-op container,
/// i.e. stores a [`RingBase`] object by value, and allows accessing it.
///
/// We cannot implement `RingStore` directly for every `R: RingBase`, as
/// this would conflict with the implementation for references. Hence, concrete
/// rings follow the pattern
/// ```ignore
/// struct ABase { ... }
/// impl RingBase for ABase { ... }
/// type A = RingValue<ABase>;
/// ```
///
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct RingValue<R: RingBase> {
    ring: R
}

impl<R: RingBase> RingValue<R> {

    pub const fn from(value: R) -> Self {
        RingValue { ring: value }
    }

    pub fn into(self) -> R {
        self.ring
    }
}

impl<R: RingBase> RingStore for RingValue<R> {

    type Type = R;

    fn get_ring(&self) -> &R {
        &self.ring
    }
}

///
/// The second most basic [`RingStore`]. Similarly to [`RingValue`] it is just
/// a no-op container, but stores a reference to a [`RingBase`].
///
/// This is mainly required when implementing functionality on the level of
/// [`RingBase`] that itself wants to call an algorithm requiring a [`RingStore`].
///
pub struct RingRef<'a, R: RingBase + ?Sized> {
    ring: &'a R
}

impl<'a, R: RingBase + ?Sized> Clone for RingRef<'a, R> {

    fn clone(&self) -> Self {
        *self
    }
}

impl<'a, R: RingBase + ?Sized> Copy for RingRef<'a, R> {}

impl<'a, R: RingBase + ?Sized> RingRef<'a, R> {

    pub const fn new(value: &'a R) -> Self {
        RingRef { ring: value }
    }
}

impl<'a, R: RingBase + ?Sized> RingStore for RingRef<'a, R> {

    type Type = R;

    fn get_ring(&self) -> &R {
        self.ring
    }
}

impl<'a, S: RingStore> RingStore for &'a S {

    type Type = <S as RingStore>::Type;

    fn get_ring(&self) -> &Self::Type {
        (**self).get_ring()
    }
}

///
/// Asserts that two ring elements are equal, and prints them using the
/// ring's formatting otherwise.
///
#[macro_export]
macro_rules! assert_el_eq {
    ($ring:expr, $lhs:expr, $rhs:expr) => {
        match (&$ring, &$lhs, &$rhs) {
            (ring_val, lhs_val, rhs_val) => {
                assert!(<_ as $crate::ring::RingStore>::eq_el(ring_val, lhs_val, rhs_val), "Assertion failed: {} != {}", <_ as $crate::ring::RingStore>::format(ring_val, lhs_val), <_ as $crate::ring::RingStore>::format(ring_val, rhs_val));
            }
        }
    }
}

#[stability::unstable(feature = "enable")]
#[cfg(any(test, feature = "generic_tests"))]
pub mod generic_tests {

    use super::*;

    ///
    /// Checks the ring axioms (as far as possible) on all combinations of the given elements.
    ///
    #[stability::unstable(feature = "enable")]
    pub fn test_ring_axioms<R: RingStore, I: Iterator<Item = El<R>>>(ring: R, edge_case_elements: I) {
        let elements = edge_case_elements.collect::<Vec<_>>();
        let zero = ring.zero();
        let one = ring.one();

        assert!(ring.is_zero(&zero));
        assert!(ring.is_one(&one));
        assert!(ring.is_neg_one(&ring.neg_one()));
        assert_eq!(0, ring.elimination_weight(&zero));

        for a in &elements {
            assert_el_eq!(ring, a, ring.add_ref(a, &zero));
            assert_el_eq!(ring, a, ring.mul_ref(a, &one));
            assert_el_eq!(ring, zero, ring.add_ref_fst(a, ring.negate(ring.clone_el(a))));
            assert_el_eq!(ring, zero, ring.mul_ref(a, &zero));
            assert!(ring.is_zero(a) || ring.elimination_weight(a) > 0);

            for b in &elements {
                assert_el_eq!(ring, ring.add_ref(a, b), ring.add_ref(b, a));
                if ring.is_commutative() {
                    assert_el_eq!(ring, ring.mul_ref(a, b), ring.mul_ref(b, a));
                }
                assert_el_eq!(ring, a, ring.add_ref_fst(b, ring.sub_ref(a, b)));

                for c in &elements {
                    assert_el_eq!(ring, ring.add_ref_snd(ring.add_ref(a, b), c), ring.add_ref_fst(a, ring.add_ref(b, c)));
                    assert_el_eq!(ring, ring.mul_ref_snd(ring.mul_ref(a, b), c), ring.mul_ref_fst(a, ring.mul_ref(b, c)));
                    assert_el_eq!(ring, ring.mul_ref_snd(ring.add_ref(a, b), c), ring.add(ring.mul_ref(a, c), ring.mul_ref(b, c)));
                }
            }
        }
    }
}
