use tracing::instrument;

use crate::pid::*;
use crate::ring::*;

///
/// For `a, b` computes `s, t, d` such that `s*a + t*b == d` is a greatest
/// common divisor of `a` and `b`.
///
/// In most cases, prefer [`EuclideanRing::ideal_gen()`], which may use a
/// ring-specific algorithm.
///
/// The gcd `d` is only unique up to units, and `s, t` are not unique at all.
/// No guarantees are given on which of these solutions is returned.
///
#[instrument(skip_all, level = "trace")]
pub fn eea<R>(a: El<R>, b: El<R>, ring: R) -> (El<R>, El<R>, El<R>)
    where R: RingStore,
        R::Type: EuclideanRing
{
    let (mut a, mut b) = (a, b);
    let (mut sa, mut ta) = (ring.one(), ring.zero());
    let (mut sb, mut tb) = (ring.zero(), ring.one());

    while !ring.is_zero(&b) {
        let (quo, rem) = ring.euclidean_div_rem(a, &b);
        let tb_new = ring.sub(ta, ring.mul_ref(&quo, &tb));
        let sb_new = ring.sub(sa, ring.mul_ref_snd(quo, &sb));
        let b_new = rem;

        ta = tb;
        sa = sb;
        a = b;
        tb = tb_new;
        sb = sb_new;
        b = b_new;
    }
    return (sa, ta, a);
}

///
/// The same as [`eea()`], but defined as const-fn and only for `i128`.
///
pub const fn const_eea(a: i128, b: i128) -> (i128, i128, i128) {
    let (mut a, mut b) = (a, b);

    let (mut sa, mut ta) = (1, 0);
    let (mut sb, mut tb) = (0, 1);

    while b != 0 {
        let (quo, rem) = (a / b, a % b);
        ta -= quo * tb;
        sa -= quo * sb;
        a = rem;

        std::mem::swap(&mut a, &mut b);
        std::mem::swap(&mut sa, &mut sb);
        std::mem::swap(&mut ta, &mut tb);
    }
    return (sa, ta, a);
}

#[cfg(test)]
use crate::divisibility::*;
#[cfg(test)]
use crate::primitive_int::StaticRing;

#[test]
fn test_eea_sign() {
    let ring = StaticRing::<i64>::RING;
    for (a, b) in [(3, 5), (-3, 5), (3, -5), (-3, -5), (12, 18), (0, 4), (4, 0)] {
        let (s, t, d) = eea(a, b, ring);
        assert_eq!(d, s * a + t * b);
        assert!(ring.checked_div(&a, &d).is_some());
        assert!(ring.checked_div(&b, &d).is_some());
    }
    assert_eq!((-1, 1, 1), const_eea(2, 3));
}
