//! Random bigints, composed from a caller-supplied [`RngCore`].
//!
//! Values are assembled from 16-bit chunks, most significant first within
//! each digit. Injecting the generator here is deliberate: prime search
//! for key material should be fed from a cryptographically strong source,
//! tests from a seeded one, and this boundary is where that choice lives.

use rand_core::RngCore;

use crate::digit::{Word, BITS_PER_DIGIT, DIGIT_MAX};
use crate::numbers::Bigint;
use crate::{Error, Result};

const RAND_BITS: u32 = 16;
const RAND_MASK: Word = (1 << RAND_BITS) - 1;

fn chunk(rng: &mut impl RngCore) -> Word {
    (rng.next_u32() as Word) & RAND_MASK
}

/// Fill `p` with a uniform random value of exactly `num_bits` significant
/// bits (the top bit is forced). `num_bits` below one digit is refused.
pub fn random_bits(p: &mut Bigint, num_bits: u32, rng: &mut impl RngCore) -> Result<()> {
    if num_bits < BITS_PER_DIGIT {
        return Err(Error::InvalidArgument);
    }
    let full_digits = (num_bits / BITS_PER_DIGIT) as usize;
    let rem_bits = num_bits % BITS_PER_DIGIT;
    let num_digits = full_digits + (rem_bits > 0) as usize;
    if p.digits.len() < num_digits {
        p.grow(num_digits, false)?;
    }
    p.len = num_digits;

    for i in 0..num_digits {
        let digit_bits = if i < full_digits { BITS_PER_DIGIT } else { rem_bits };
        let mut d: Word = 0;
        let mut left = digit_bits;
        while left >= RAND_BITS {
            d = (d << RAND_BITS) | chunk(rng);
            left -= RAND_BITS;
        }
        if left > 0 {
            d = (d << left) | (chunk(rng) & (((1 as Word) << left) - 1));
        }
        p.digits[i] = d;
    }
    let top_bit = if rem_bits > 0 { rem_bits - 1 } else { BITS_PER_DIGIT - 1 };
    p.digits[num_digits - 1] |= (1 as Word) << top_bit;
    p.invalidate_cache();
    Ok(())
}

/// Sample a uniform value in `[0, limit)` into `p`; `limit` must be
/// positive.
///
/// Chunks are drawn most significant first. Until one lands strictly below
/// the limit's chunk, each is sampled in `[0, limit_chunk]`; from then on
/// the rest are free. If every chunk ties the limit, the result equals
/// `limit` and is stepped down by one.
pub fn random_below(p: &mut Bigint, limit: &Bigint, rng: &mut impl RngCore) -> Result<()> {
    if limit.is_zero() {
        return Err(Error::InvalidArgument);
    }
    if p.digits.len() < limit.len {
        p.grow(limit.len, false)?;
    }
    p.len = limit.len;

    let mut below = false;
    for i in (0..p.len).rev() {
        let mut d: Word = 0;
        let mut left = BITS_PER_DIGIT;
        while left >= RAND_BITS {
            left -= RAND_BITS;
            let mut r = chunk(rng);
            if !below {
                let lim = (limit.digits[i] >> left) & RAND_MASK;
                r %= lim + 1;
                if r < lim {
                    below = true;
                }
            }
            d = (d << RAND_BITS) | r;
        }
        if left > 0 {
            let mask = ((1 as Word) << left) - 1;
            let mut r = chunk(rng) & mask;
            if !below {
                let lim = limit.digits[i] & mask;
                r %= lim + 1;
                if r < lim {
                    below = true;
                }
            }
            d = (d << left) | r;
        }
        p.digits[i] = d;
    }

    if !below {
        // p == limit: step down by one
        let mut i = 0;
        while p.digits[i] == 0 {
            p.digits[i] = DIGIT_MAX;
            i += 1;
        }
        p.digits[i] -= 1;
    }
    p.trim();
    p.invalidate_cache();
    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;
    use rand_chacha::rand_core::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn rng() -> ChaCha8Rng {
        ChaCha8Rng::seed_from_u64(0x5EED)
    }

    #[test]
    fn exact_bit_width() {
        let mut rng = rng();
        let mut p = Bigint::zero();
        for bits in [
            BITS_PER_DIGIT,
            BITS_PER_DIGIT + 1,
            2 * BITS_PER_DIGIT,
            257,
            512,
        ] {
            for _ in 0..8 {
                random_bits(&mut p, bits, &mut rng).unwrap();
                assert_eq!(p.significant_bits(), bits);
            }
        }
    }

    #[test]
    fn too_few_bits_is_refused() {
        let mut p = Bigint::zero();
        assert_eq!(
            random_bits(&mut p, BITS_PER_DIGIT - 1, &mut rng()),
            Err(Error::InvalidArgument)
        );
    }

    #[test]
    fn below_stays_below() {
        let mut rng = rng();
        let limit = Bigint::from_u64(0x1_0000_0001);
        let mut p = Bigint::zero();
        for _ in 0..200 {
            random_below(&mut p, &limit, &mut rng).unwrap();
            assert!(p < limit);
        }
    }

    #[test]
    fn unit_limit_always_yields_zero() {
        let mut rng = rng();
        let limit = Bigint::from_u64(1);
        let mut p = Bigint::from_u64(999);
        for _ in 0..16 {
            random_below(&mut p, &limit, &mut rng).unwrap();
            assert!(p.is_zero());
        }
    }

    #[test]
    fn zero_limit_is_refused() {
        let mut p = Bigint::zero();
        assert_eq!(
            random_below(&mut p, &Bigint::zero(), &mut rng()),
            Err(Error::InvalidArgument)
        );
    }

    #[test]
    fn small_limit_reaches_all_residues() {
        let mut rng = rng();
        let limit = Bigint::from_u64(3);
        let mut seen = [false; 3];
        let mut p = Bigint::zero();
        for _ in 0..64 {
            random_below(&mut p, &limit, &mut rng).unwrap();
            seen[p.digits[0] as usize] = true;
        }
        assert_eq!(seen, [true, true, true]);
    }
}
