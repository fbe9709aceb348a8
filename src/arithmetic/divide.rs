//! Schoolbook long division, the central algorithm of the crate.
//!
//! The general case runs on the narrow-digit image (see
//! [`crate::numbers::Cache`]): at [`CACHE_BITS`] per digit, the top four
//! digits of the running remainder pack into a single word, which is what
//! the quotient-digit estimation needs. Canonical digits are too wide for
//! that (only two of them fit a word), so both inputs are converted up
//! front and the quotient and remainder are read back at the end; the
//! conversion cost amortises over the many estimation steps of a long
//! division.
//!
//! Per quotient digit, most-significant first:
//!
//! 1. compare the running remainder `r` against `b`: equal means the digit
//!    is 1, smaller means 0 (shift the next dividend digit into `r`);
//! 2. otherwise estimate the digit by dividing a trial dividend (top 1–4
//!    digits of `r`) by a trial divisor (matching top digits of `b`, one
//!    fewer when `r` is a digit longer);
//! 3. correct the estimate downward while `q̂·b` exceeds `r` (the 4-digit
//!    trial keeps the overshoot to a small constant);
//! 4. set `r := r − q̂·b` and shift in the next dividend digit.

use core::cmp::Ordering;

use crate::arithmetic::cmp_digits;
use crate::digit::{CACHE_BASE, CACHE_BITS, CACHE_MAX};
use crate::numbers::{Bigint, Cache};
use crate::{Error, Result};

/// `quotient = a / b`, `remainder = a % b`.
///
/// `scratch1` and `scratch2` are working storage for the inner
/// estimate-and-correct products; sizing them to `b.len() + 1` digits up
/// front avoids reallocation. The borrow checker enforces that `quotient`
/// is distinct from every other argument. Division by zero is refused.
pub fn div_rem(
    quotient: &mut Bigint,
    a: &Bigint,
    b: &Bigint,
    remainder: &mut Bigint,
    scratch1: &mut Bigint,
    scratch2: &mut Bigint,
) -> Result<()> {
    if b.is_zero() {
        return Err(Error::InvalidArgument);
    }
    match b.cmp(a) {
        Ordering::Greater => {
            remainder.copy_from(a)?;
            quotient.set_digit(0);
            Ok(())
        }
        Ordering::Equal => {
            quotient.set_digit(1);
            remainder.set_digit(0);
            Ok(())
        }
        Ordering::Less => {
            if a.len == 1 {
                // both operands are single digits: native divide
                quotient.set_digit(a.digits[0] / b.digits[0]);
                remainder.set_digit(a.digits[0] % b.digits[0]);
                Ok(())
            } else {
                div_cached(quotient, a, b, remainder, scratch1, scratch2)
            }
        }
    }
}

/// The long division proper, on the narrow-digit images.
fn div_cached(
    quotient: &mut Bigint,
    a: &Bigint,
    b: &Bigint,
    remainder: &mut Bigint,
    scratch1: &mut Bigint,
    scratch2: &mut Bigint,
) -> Result<()> {
    a.cache_update(CACHE_BITS);
    b.cache_update(CACHE_BITS);
    let a_image = a.cache.borrow();
    let b_image = b.cache.borrow();
    let ac: &Cache = &a_image;
    let bc: &Cache = &b_image;
    let b_len = bc.len;
    let q_hi = ac.len - b_len;

    let q = quotient.cache.get_mut();
    q.bits = CACHE_BITS;
    q.prepare(q_hi + 1);
    q.len = q_hi + 1;

    let r = remainder.cache.get_mut();
    r.bits = CACHE_BITS;
    r.prepare(b_len + 1);
    // the first partial dividend is the top b_len digits of a
    r.digits[..b_len].copy_from_slice(&ac.digits[q_hi..q_hi + b_len]);
    r.len = b_len;

    let product = scratch1.cache.get_mut();
    product.bits = CACHE_BITS;
    product.prepare(b_len + 2);
    let scratch = scratch2.cache.get_mut();
    scratch.bits = CACHE_BITS;
    scratch.prepare(b_len + 2);

    for q_index in (1..=q_hi).rev() {
        quotient_digit(q_index, q, r, ac, bc, product, scratch, true);
    }
    quotient_digit(0, q, r, ac, bc, product, scratch, false);

    // at most one leading zero can appear in the quotient
    if q.len > 1 && q.digits[q.len - 1] == 0 {
        q.len -= 1;
    }
    q.valid = true;
    r.valid = true;

    drop(a_image);
    drop(b_image);
    quotient.cache_retrieve()?;
    remainder.cache_retrieve()?;
    scratch1.invalidate_cache();
    scratch2.invalidate_cache();
    Ok(())
}

/// Produce the quotient digit at `q_index` and advance the running
/// remainder. With `shift_in`, the dividend digit at `q_index - 1` is
/// brought into position 0 of the new remainder; the final iteration has
/// nothing left to shift in.
#[allow(clippy::too_many_arguments)]
fn quotient_digit(
    q_index: usize,
    q: &mut Cache,
    r: &mut Cache,
    a: &Cache,
    b: &Cache,
    product: &mut Cache,
    scratch: &mut Cache,
    shift_in: bool,
) {
    let b_len = b.len;
    match cmp_digits(&r.digits[..r.len], &b.digits[..b_len]) {
        Ordering::Equal => {
            // r == b: the digit is 1 and the remainder restarts from the
            // next dividend digit
            q.digits[q_index] = 1;
            r.len = 1;
            r.digits[0] = if q_index > 0 { a.digits[q_index - 1] } else { 0 };
        }
        Ordering::Less => {
            // r < b: the digit is 0; shift r up one position and bring in
            // the next dividend digit
            q.digits[q_index] = 0;
            if q_index > 0 {
                if r.len > 1 || r.digits[0] > 0 {
                    r.prepare(r.len + 1);
                    for k in (1..=r.len).rev() {
                        r.digits[k] = r.digits[k - 1];
                    }
                    r.len += 1;
                }
                r.digits[0] = a.digits[q_index - 1];
            }
        }
        Ordering::Greater => {
            let r_len = r.len;
            let rd = &r.digits;
            let bd = &b.digits;
            // Trial dividend from the top digits of r, trial divisor from
            // the top digits of b (one digit fewer when r is the longer,
            // so both truncate by the same power of the base). The running
            // remainder never exceeds b by more than one digit, so every
            // index below is in range.
            let (trial_r, trial_b) = match r_len {
                1 => (rd[0], bd[0]),
                2 => {
                    let tr = (rd[1] << CACHE_BITS) | rd[0];
                    let tb = if b_len == 2 {
                        (bd[1] << CACHE_BITS) | bd[0]
                    } else {
                        bd[0]
                    };
                    (tr, tb)
                }
                3 => {
                    let tr = (rd[2] << (2 * CACHE_BITS)) | (rd[1] << CACHE_BITS) | rd[0];
                    let tb = if r_len > b_len {
                        (bd[b_len - 1] << CACHE_BITS) | bd[b_len - 2]
                    } else {
                        (bd[b_len - 1] << (2 * CACHE_BITS))
                            | (bd[b_len - 2] << CACHE_BITS)
                            | bd[b_len - 3]
                    };
                    (tr, tb)
                }
                _ => {
                    let top = r_len - 1;
                    let tr = (rd[top] << (3 * CACHE_BITS))
                        | (rd[top - 1] << (2 * CACHE_BITS))
                        | (rd[top - 2] << CACHE_BITS)
                        | rd[top - 3];
                    let tb = if r_len > b_len {
                        (bd[b_len - 1] << (2 * CACHE_BITS))
                            | (bd[b_len - 2] << CACHE_BITS)
                            | bd[b_len - 3]
                    } else {
                        (bd[b_len - 1] << (3 * CACHE_BITS))
                            | (bd[b_len - 2] << (2 * CACHE_BITS))
                            | (bd[b_len - 3] << CACHE_BITS)
                            | bd[b_len - 4]
                    };
                    (tr, tb)
                }
            };
            let mut q_hat = trial_r / trial_b;

            // correct the estimate downward until q̂·b fits under r
            product.len = 1;
            product.digits[0] = q_hat;
            mul_image(scratch, product, b);
            while cmp_digits(&r.digits[..r.len], &scratch.digits[..scratch.len])
                == Ordering::Less
            {
                if product.digits[0] == 0 {
                    break;
                }
                product.digits[0] -= 1;
                q_hat -= 1;
                mul_image(scratch, product, b);
            }
            q.digits[q_index] = q_hat;

            // product temporarily holds the new remainder r - q̂·b
            sub_image(product, r, scratch);
            debug_assert!(
                cmp_digits(&product.digits[..product.len], &b.digits[..b_len])
                    != Ordering::Greater
            );
            let shift = shift_in as usize;
            if product.len > 1 || product.digits[0] > 0 {
                let new_len = product.len + shift;
                r.prepare(new_len);
                r.len = new_len;
                for k in (0..product.len).rev() {
                    r.digits[k + shift] = product.digits[k];
                }
                if shift == 1 {
                    r.digits[0] = a.digits[q_index - 1];
                }
            } else {
                r.len = 1;
                r.digits[0] = if shift == 1 { a.digits[q_index - 1] } else { 0 };
            }
        }
    }
}

/// Schoolbook multiply at the narrow digit width.
fn mul_image(dest: &mut Cache, a: &Cache, b: &Cache) {
    let product_len = a.len + b.len;
    dest.bits = CACHE_BITS;
    dest.prepare(product_len);
    dest.digits[..product_len].fill(0);
    for k in 0..a.len {
        for i in 0..b.len {
            dest.digits[k + i] += a.digits[k] * b.digits[i];
        }
    }
    for i in 0..product_len - 1 {
        let carry = dest.digits[i] >> CACHE_BITS;
        dest.digits[i] &= CACHE_MAX;
        dest.digits[i + 1] += carry;
    }
    dest.len = product_len;
    if dest.len > 1 && dest.digits[dest.len - 1] == 0 {
        dest.len -= 1;
    }
}

/// `dest = a - b` at the narrow digit width; requires `a >= b`.
fn sub_image(dest: &mut Cache, a: &Cache, b: &Cache) {
    let a_len = a.len;
    let b_len = b.len;
    debug_assert!(cmp_digits(&a.digits[..a_len], &b.digits[..b_len]) != Ordering::Less);
    dest.bits = CACHE_BITS;
    dest.prepare(a_len);

    dest.digits[0] = a.digits[0] + CACHE_BASE - b.digits[0];
    for k in 1..b_len {
        let borrow = 1 - (dest.digits[k - 1] >> CACHE_BITS);
        dest.digits[k - 1] &= CACHE_MAX;
        dest.digits[k] = a.digits[k] + CACHE_BASE - b.digits[k] - borrow;
    }
    for k in b_len..a_len {
        let borrow = 1 - (dest.digits[k - 1] >> CACHE_BITS);
        dest.digits[k - 1] &= CACHE_MAX;
        dest.digits[k] = a.digits[k] + CACHE_BASE - borrow;
    }
    dest.digits[a_len - 1] &= CACHE_MAX;
    let mut len = a_len;
    while len > 1 && dest.digits[len - 1] == 0 {
        len -= 1;
    }
    dest.len = len;
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::arithmetic::{add, mul};
    use hex_literal::hex;

    fn from_be(bytes: &[u8]) -> Bigint {
        let le: alloc::vec::Vec<u8> = bytes.iter().rev().copied().collect();
        Bigint::from_bytes(&le)
    }

    fn check(a: &Bigint, b: &Bigint) -> (Bigint, Bigint) {
        let mut q = Bigint::zero();
        let mut r = Bigint::zero();
        let mut s1 = Bigint::with_digits(b.len() + 1);
        let mut s2 = Bigint::with_digits(b.len() + 1);
        div_rem(&mut q, a, b, &mut r, &mut s1, &mut s2).unwrap();
        // a == q*b + r and 0 <= r < b
        assert!(r < *b, "remainder not reduced");
        let mut qb = Bigint::zero();
        mul(&mut qb, &q, b).unwrap();
        let mut back = Bigint::zero();
        add(&mut back, &qb, &r).unwrap();
        assert_eq!(&back, a, "q*b + r != a");
        (q, r)
    }

    #[test]
    fn divisor_larger_and_equal_fast_paths() {
        let a = Bigint::from_u64(5);
        let b = Bigint::from_u64(6);
        let (q, r) = check(&a, &b);
        assert!(q.is_zero());
        assert_eq!(r, a);

        let (q, r) = check(&a, &a);
        assert!(q.is_one());
        assert!(r.is_zero());
    }

    #[test]
    fn single_digit_native_path() {
        for (a, b) in [(7u64, 2u64), (100, 10), (1, 1), (0, 3), (999_999, 1000)] {
            let (q, r) = check(&Bigint::from_u64(a), &Bigint::from_u64(b));
            assert_eq!(q, Bigint::from_u64(a / b));
            assert_eq!(r, Bigint::from_u64(a % b));
        }
    }

    #[test]
    fn long_division_reference_case() {
        // 123456789012345678901234567890 / 9876543210
        let a = from_be(&hex!("018ee90ff6c373e0ee4e3f0ad2"));
        let b = from_be(&hex!("024cb016ea"));
        let (q, r) = check(&a, &b);
        assert_eq!(q, from_be(&hex!("ad78ebab718c0b66"))); // 12499999887343749990
        assert_eq!(r, from_be(&hex!("5d21db96"))); // 1562499990
    }

    #[test]
    fn exact_multiple_has_zero_remainder() {
        let b = from_be(&hex!("feedface0badf00d1122334455667788"));
        let m = from_be(&hex!("deadbeefcafebabe0123456789abcdef55aa55aa"));
        let mut a = Bigint::zero();
        mul(&mut a, &m, &b).unwrap();
        let (q, r) = check(&a, &b);
        assert_eq!(q, m);
        assert!(r.is_zero());

        // and one more with a known remainder
        let mut a2 = a.clone();
        crate::arithmetic::add_digit(&mut a2, 0x1234567).unwrap();
        let (q2, r2) = check(&a2, &b);
        assert_eq!(q2, m);
        assert_eq!(r2, Bigint::from_u64(0x1234567));
    }

    #[test]
    fn interior_zero_quotient_digits() {
        // a = b << (many digits) produces long runs of zero quotient digits
        let b = from_be(&hex!("0bad0bad0bad0bad0bad0bad"));
        let mut shifted = Bigint::with_digits(b.len() + 8);
        shifted.digits[8..8 + b.len()].copy_from_slice(&b.digits[..b.len()]);
        shifted.len = 8 + b.len();
        let (q, r) = check(&shifted, &b);
        assert!(r.is_zero());
        assert_eq!(q.len(), 9);
        assert_eq!(q.digits[8], 1);
        assert!(q.digits[..8].iter().all(|&d| d == 0));
    }

    #[test]
    fn dividend_much_longer_than_divisor() {
        let mut bytes = [0u8; 96];
        let mut state = 0x9E3779B97F4A7C15u64;
        for b in bytes.iter_mut() {
            state = state.wrapping_mul(6364136223846793005).wrapping_add(1);
            *b = (state >> 56) as u8;
        }
        bytes[95] |= 0x80;
        let a = Bigint::from_bytes(&bytes);
        for width in [1usize, 3, 7, 17, 40] {
            let b = Bigint::from_bytes(&bytes[..width]);
            if b.is_zero() {
                continue;
            }
            check(&a, &b);
        }
    }

    #[test]
    fn division_by_zero_is_refused() {
        let mut q = Bigint::zero();
        let mut r = Bigint::zero();
        let mut s1 = Bigint::zero();
        let mut s2 = Bigint::zero();
        assert_eq!(
            div_rem(
                &mut q,
                &Bigint::from_u64(5),
                &Bigint::zero(),
                &mut r,
                &mut s1,
                &mut s2
            ),
            Err(Error::InvalidArgument)
        );
    }
}
