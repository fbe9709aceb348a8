//! Modular reduction, exponentiation, and inverse.

use core::cmp::Ordering;

use crate::arithmetic::{add, div_rem, mul, sub};
use crate::digit::{Word, BITS_PER_DIGIT};
use crate::numbers::Bigint;
use crate::scratch::Scratch;
use crate::Result;

/// Scratch slots `mod_pow` needs from its arena.
pub(crate) const MOD_POW_SCRATCHES: usize = 6;

/// `dest = a % b`. Allocates its own quotient and working storage; callers
/// in a loop should use [`div_rem`] with a prepared arena instead.
pub fn rem(dest: &mut Bigint, a: &Bigint, b: &Bigint) -> Result<()> {
    let mut quotient = Bigint::with_digits(a.len);
    let mut s1 = Bigint::with_digits(b.len + 1);
    let mut s2 = Bigint::with_digits(b.len + 1);
    div_rem(&mut quotient, a, b, dest, &mut s1, &mut s2)
}

/// `dest = base^exp mod m`, by right-to-left square-and-multiply.
///
/// The exponent is consumed bit by bit out of a scratch copy; the base's
/// running power and every intermediate product live in the arena, so a
/// loop over many exponentiations allocates nothing after the first.
pub fn mod_pow(
    dest: &mut Bigint,
    base: &Bigint,
    exp: &Bigint,
    m: &Bigint,
    scratch: &mut Scratch,
) -> Result<()> {
    if m.is_one() {
        dest.set_zero();
        return Ok(());
    }
    let num_digits = m.len + base.len;
    scratch.prepare(MOD_POW_SCRATCHES, num_digits)?;
    if dest.digits.len() < num_digits {
        dest.grow(num_digits, false)?;
    }
    dest.set_digit(1);

    let [x, apow, product, s1, s2, quotient] = scratch.array_mut::<MOD_POW_SCRATCHES>();
    x.copy_from(exp)?;
    apow.copy_from(base)?;
    while !x.is_zero() {
        if x.digits[0] & 1 == 1 {
            mul(product, dest, apow)?;
            div_rem(quotient, product, m, dest, s1, s2)?;
        }
        shr1(x);
        mul(product, apow, apow)?;
        div_rem(quotient, product, m, apow, s1, s2)?;
    }
    Ok(())
}

/// Halve in place.
fn shr1(x: &mut Bigint) {
    let mut carry: Word = 0;
    for i in (0..x.len).rev() {
        let d = x.digits[i] | (carry << BITS_PER_DIGIT);
        carry = d & 1;
        x.digits[i] = d >> 1;
    }
    if x.len > 1 && x.digits[x.len - 1] == 0 {
        x.len -= 1;
    }
    x.invalidate_cache();
}

/// `dest = a^-1 mod m`, by the extended Euclidean algorithm.
///
/// The engine has no signed integers, so the Bézout coefficients are kept
/// as magnitude plus sign flag and the `y := x - q*y` update branches on
/// the operand signs. Requires `gcd(a, m) == 1`; `m == 1` yields 0.
pub fn mod_inv(dest: &mut Bigint, a: &Bigint, m: &Bigint) -> Result<()> {
    if dest.digits.len() < m.len {
        dest.grow(m.len, false)?;
    }
    if m.is_one() {
        dest.set_zero();
        return Ok(());
    }
    let mut a_cur = a.clone();
    let mut m_cur = m.clone();
    let mut t = Bigint::with_digits(m.len);
    let mut y = Bigint::with_digits(m.len);
    let mut x = Bigint::with_digits(m.len);
    x.set_digit(1);
    let mut q = Bigint::with_digits(m.len);
    let mut temp = Bigint::with_digits(m.len);
    let mut s1 = Bigint::with_digits(m.len + 1);
    let mut s2 = Bigint::with_digits(m.len + 1);
    let mut x_neg = false;
    let mut y_neg = false;

    while a_cur.len > 1 || a_cur.digits[0] > 1 {
        div_rem(&mut q, &a_cur, &m_cur, &mut temp, &mut s1, &mut s2)?;
        a_cur.copy_from(&m_cur)?;
        m_cur.copy_from(&temp)?;

        t.copy_from(&y)?;
        let t_neg = y_neg;
        mul(&mut temp, &q, &y)?;
        // y := x - q*y, with temp = |q*y|
        match x.cmp(&temp) {
            Ordering::Less => {
                if x_neg {
                    if y_neg {
                        sub(&mut y, &temp, &x)?;
                        y_neg = false;
                    } else {
                        add(&mut y, &x, &temp)?;
                        y_neg = true;
                    }
                } else if y_neg {
                    add(&mut y, &temp, &x)?;
                    y_neg = false;
                } else {
                    sub(&mut y, &temp, &x)?;
                    y_neg = true;
                }
            }
            Ordering::Greater => {
                if x_neg {
                    if y_neg {
                        sub(&mut y, &x, &temp)?;
                    } else {
                        add(&mut y, &x, &temp)?;
                        y_neg = true;
                    }
                } else if y_neg {
                    add(&mut y, &x, &temp)?;
                    y_neg = false;
                } else {
                    sub(&mut y, &x, &temp)?;
                }
            }
            Ordering::Equal => {
                if x_neg == y_neg {
                    y.set_zero();
                    y_neg = false;
                } else {
                    add(&mut y, &x, &temp)?;
                    y_neg = x_neg;
                }
            }
        }
        if y.is_zero() {
            y_neg = false;
        }
        x.copy_from(&t)?;
        x_neg = t_neg;
    }

    if x_neg {
        sub(&mut t, m, &x)?;
        dest.copy_from(&t)
    } else {
        dest.copy_from(&x)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use hex_literal::hex;

    fn from_be(bytes: &[u8]) -> Bigint {
        let le: alloc::vec::Vec<u8> = bytes.iter().rev().copied().collect();
        Bigint::from_bytes(&le)
    }

    fn pow(base: u64, exp: &Bigint, m: u64) -> Bigint {
        let mut dest = Bigint::zero();
        let mut scratch = Scratch::new();
        mod_pow(
            &mut dest,
            &Bigint::from_u64(base),
            exp,
            &Bigint::from_u64(m),
            &mut scratch,
        )
        .unwrap();
        dest
    }

    #[test]
    fn rem_discards_quotient() {
        let mut dest = Bigint::zero();
        rem(&mut dest, &Bigint::from_u64(1000), &Bigint::from_u64(7)).unwrap();
        assert_eq!(dest, Bigint::from_u64(1000 % 7));
    }

    #[test]
    fn fermat_on_f4() {
        // ord(2) divides 65536 in (Z/65537)*, so 2^65536 == 1
        assert!(pow(2, &Bigint::from_u64(65536), 65537).is_one());
    }

    #[test]
    fn fermat_on_the_mersenne_prime() {
        // 2^(p-1) == 1 mod p for the prime p = 2^31 - 1
        let p: u64 = (1 << 31) - 1;
        assert!(pow(2, &Bigint::from_u64(p - 1), p).is_one());
    }

    #[test]
    fn zero_exponent_and_unit_modulus() {
        assert!(pow(3, &Bigint::zero(), 7).is_one());
        assert!(pow(12345, &Bigint::from_u64(678), 1).is_zero());
    }

    #[test]
    fn matches_a_multi_digit_reference() {
        // GP/PARI: lift(Mod(0xdeadbeefcafebabe, 0xfeedface0badf00d1122334455667788)^0x123456789)
        let m = from_be(&hex!("feedface0badf00d1122334455667788"));
        let mut dest = Bigint::zero();
        let mut scratch = Scratch::new();
        mod_pow(
            &mut dest,
            &Bigint::from_u64(0xdeadbeefcafebabe),
            &Bigint::from_u64(0x123456789),
            &m,
            &mut scratch,
        )
        .unwrap();
        let expected = from_be(&hex!("9cceb06a035710c96a5bca7c2f9b7c00"));
        assert_eq!(dest, expected);
    }

    #[test]
    fn small_inverses() {
        let mut dest = Bigint::zero();
        mod_inv(&mut dest, &Bigint::from_u64(3), &Bigint::from_u64(11)).unwrap();
        assert_eq!(dest, Bigint::from_u64(4));

        mod_inv(&mut dest, &Bigint::from_u64(7), &Bigint::from_u64(40)).unwrap();
        assert_eq!(dest, Bigint::from_u64(23));

        mod_inv(&mut dest, &Bigint::from_u64(5), &Bigint::from_u64(1)).unwrap();
        assert!(dest.is_zero());
    }

    #[test]
    fn inverse_property_on_larger_moduli() {
        let m = from_be(&hex!("feedface0badf00d1122334455667789")); // odd
        for a in [3u64, 65537, 0xdeadbeef, 0x0123456789abcdef] {
            let a = Bigint::from_u64(a);
            let mut inv = Bigint::zero();
            mod_inv(&mut inv, &a, &m).unwrap();
            let mut product = Bigint::zero();
            mul(&mut product, &a, &inv).unwrap();
            let mut check = Bigint::zero();
            rem(&mut check, &product, &m).unwrap();
            assert!(check.is_one(), "a * a^-1 != 1 mod m");
        }
    }
}
