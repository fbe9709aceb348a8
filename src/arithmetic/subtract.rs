//! Subtraction, unsigned, with the precondition `a >= b`.
//!
//! Each position computes `a[k] + base - b[k] - borrow`; the borrow for
//! the next position is read off the high bit of the raw result (a set bit
//! above the digit width means no borrow happened) before masking it away.

use crate::digit::{BITS_PER_DIGIT, DIGIT_BASE, DIGIT_MAX};
use crate::numbers::Bigint;
use crate::Result;

/// `dest = a - b`; the caller must ensure `a >= b`.
pub fn sub(dest: &mut Bigint, a: &Bigint, b: &Bigint) -> Result<()> {
    debug_assert!(a >= b);
    let a_len = a.len;
    let b_len = b.len;
    if dest.digits.len() < a_len {
        dest.grow(a_len * 2 + 1, false)?;
    }

    dest.digits[0] = a.digits[0] + DIGIT_BASE - b.digits[0];
    for k in 1..b_len {
        let borrow = 1 - (dest.digits[k - 1] >> BITS_PER_DIGIT);
        dest.digits[k - 1] &= DIGIT_MAX;
        dest.digits[k] = a.digits[k] + DIGIT_BASE - b.digits[k] - borrow;
    }
    for k in b_len..a_len {
        let borrow = 1 - (dest.digits[k - 1] >> BITS_PER_DIGIT);
        dest.digits[k - 1] &= DIGIT_MAX;
        dest.digits[k] = a.digits[k] + DIGIT_BASE - borrow;
    }
    dest.digits[a_len - 1] &= DIGIT_MAX;
    dest.len = a_len;
    dest.trim();
    dest.invalidate_cache();
    Ok(())
}

/// `a -= b`; the caller must ensure `a >= b`.
pub fn sub_assign(a: &mut Bigint, b: &Bigint) -> Result<()> {
    debug_assert!(&*a >= b);
    let a_len = a.len;
    let b_len = b.len;

    a.digits[0] += DIGIT_BASE - b.digits[0];
    for k in 1..b_len {
        let borrow = 1 - (a.digits[k - 1] >> BITS_PER_DIGIT);
        a.digits[k - 1] &= DIGIT_MAX;
        a.digits[k] += DIGIT_BASE - b.digits[k] - borrow;
    }
    for k in b_len..a_len {
        let borrow = 1 - (a.digits[k - 1] >> BITS_PER_DIGIT);
        a.digits[k - 1] &= DIGIT_MAX;
        a.digits[k] += DIGIT_BASE - borrow;
    }
    a.digits[a_len - 1] &= DIGIT_MAX;
    a.trim();
    a.invalidate_cache();
    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::arithmetic::add;

    #[test]
    fn small_differences() {
        let mut dest = Bigint::zero();
        sub(&mut dest, &Bigint::from_u64(10000), &Bigint::from_u64(1234)).unwrap();
        assert_eq!(dest, Bigint::from_u64(8766));
    }

    #[test]
    fn self_difference_is_canonical_zero() {
        let a = Bigint::from_u64(0xFEED_FACE_0BAD_F00D);
        let mut dest = Bigint::zero();
        sub(&mut dest, &a, &a).unwrap();
        assert_eq!(dest.len(), 1);
        assert!(dest.is_zero());

        let mut b = a.clone();
        sub_assign(&mut b, &a).unwrap();
        assert!(b.is_zero());
    }

    #[test]
    fn borrow_chain_shrinks_length() {
        // base^2 - 1 == [max, max]
        let mut base_sq = Bigint::zero();
        base_sq.digits[..3].copy_from_slice(&[0, 0, 1]);
        base_sq.len = 3;
        let mut dest = Bigint::zero();
        sub(&mut dest, &base_sq, &Bigint::from_u64(1)).unwrap();
        assert_eq!(&dest.digits[..dest.len], &[DIGIT_MAX, DIGIT_MAX]);
    }

    #[test]
    fn undoes_addition() {
        let a = Bigint::from_bytes(&[0x78, 0x56, 0x34, 0x12, 0xEF, 0xCD, 0xAB, 0x89, 0x67, 0x45]);
        let b = Bigint::from_bytes(&[0x11, 0x22, 0x33, 0x44, 0x55, 0x66, 0x77]);
        let mut sum = Bigint::zero();
        add(&mut sum, &a, &b).unwrap();
        let mut back = Bigint::zero();
        sub(&mut back, &sum, &b).unwrap();
        assert_eq!(back, a);
        sub_assign(&mut sum, &a).unwrap();
        assert_eq!(sum, b);
    }
}
