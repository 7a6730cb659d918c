
///
/// This module contains the rings `Z/nZ` for a compile-time modulus `n`, in particular the
/// prime fields [`zn::Fp`] and [`zn::F2`].
///
pub mod zn;

///
/// This module contains [`rational::RationalField`], the field of fractions of an integer ring.
///
pub mod rational;

///
/// This module contains [`poly::DensePolyRing`], the univariate polynomials over a field.
///
pub mod poly;
