//! Schoolbook multiplication.
//!
//! Partial products are accumulated raw into the destination digits and
//! normalised by a single carry pass at the end. The word slack makes this
//! sound as long as the shorter operand stays under `2^(W - 2D)` digits
//! (64 digits in either configuration), which covers every operand size
//! the RSA layer produces.

use crate::digit::{BITS_PER_DIGIT, DIGIT_MAX};
use crate::numbers::Bigint;
use crate::Result;

/// `dest = a * b`. `a` and `b` may be the same bigint (squaring).
pub fn mul(dest: &mut Bigint, a: &Bigint, b: &Bigint) -> Result<()> {
    if a.is_zero() || b.is_zero() {
        dest.set_digit(0);
        return Ok(());
    }
    let a_len = a.len;
    let b_len = b.len;
    debug_assert!(a_len.min(b_len) < (1usize << (crate::digit::Word::BITS - 2 * BITS_PER_DIGIT)));
    let product_len = a_len + b_len;
    if dest.digits.len() < product_len {
        dest.grow(product_len + 1, false)?;
    }
    dest.digits[..product_len].fill(0);

    for k in 0..a_len {
        for i in 0..b_len {
            dest.digits[k + i] += a.digits[k] * b.digits[i];
        }
    }
    for i in 0..product_len - 1 {
        let carry = dest.digits[i] >> BITS_PER_DIGIT;
        dest.digits[i] &= DIGIT_MAX;
        dest.digits[i + 1] += carry;
    }
    dest.len = product_len;
    if dest.len > 1 && dest.digits[dest.len - 1] == 0 {
        dest.len -= 1;
    }
    dest.invalidate_cache();
    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;
    use hex_literal::hex;

    fn from_be(bytes: &[u8]) -> Bigint {
        let le: alloc::vec::Vec<u8> = bytes.iter().rev().copied().collect();
        Bigint::from_bytes(&le)
    }

    #[test]
    fn zero_annihilates() {
        let mut dest = Bigint::from_u64(99);
        mul(&mut dest, &Bigint::zero(), &Bigint::from_u64(12345)).unwrap();
        assert!(dest.is_zero());
        assert_eq!(dest.len(), 1);

        mul(&mut dest, &Bigint::from_u64(12345), &Bigint::zero()).unwrap();
        assert!(dest.is_zero());
    }

    #[test]
    fn small_products() {
        let mut dest = Bigint::zero();
        mul(&mut dest, &Bigint::from_u64(123_456), &Bigint::from_u64(654_321)).unwrap();
        assert_eq!(dest, Bigint::from_u64(123_456 * 654_321));

        mul(&mut dest, &Bigint::from_u64(1), &Bigint::from_u64(77)).unwrap();
        assert_eq!(dest, Bigint::from_u64(77));
    }

    #[test]
    fn multi_digit_product() {
        let u = from_be(&hex!("deadbeefcafebabe0123456789abcdef55aa55aa"));
        let v = from_be(&hex!("feedface0badf00d1122334455667788"));
        let expected = from_be(&hex!(
            "ddbf647495d63fba18dfc88527ddf4a2fed81172ed9d710a4df1b169dfb0f76f440b8850"
        ));
        let mut dest = Bigint::zero();
        mul(&mut dest, &u, &v).unwrap();
        assert_eq!(dest, expected);
        // commutes
        mul(&mut dest, &v, &u).unwrap();
        assert_eq!(dest, expected);
    }

    #[test]
    fn squaring_with_shared_operand() {
        let u = from_be(&hex!("0123456789abcdef"));
        let mut sq = Bigint::zero();
        mul(&mut sq, &u, &u).unwrap();
        let expected = from_be(&hex!("014b66dc33f6acdca5e20890f2a521"));
        assert_eq!(sq, expected);
    }

    #[test]
    fn product_length_is_trimmed() {
        // 2 * 3 allocates two digits but uses one
        let mut dest = Bigint::zero();
        mul(&mut dest, &Bigint::from_u64(2), &Bigint::from_u64(3)).unwrap();
        assert_eq!(dest.len(), 1);
        assert_eq!(dest, Bigint::from_u64(6));
    }
}
