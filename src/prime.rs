//! Primality: sieve prefilter, Fermat testing, random prime search.

use rand_core::RngCore;

use crate::arithmetic::{add_digit, cmp_digits, div_rem, mod_pow, sub, MOD_POW_SCRATCHES};
use crate::numbers::Bigint;
use crate::scratch::Scratch;
use crate::{Error, Result};

/// Scratch slots `is_large_prime` needs from its arena.
const PRIME_TEST_SCRATCHES: usize = 4;

/// Build a sieve of odd primes up to `n` (exclusive) into `sieve`'s value
/// slots, ascending. `n` below 3 is refused.
///
/// The sieve is a cheap divisibility prefilter for [`is_large_prime`]: a
/// random candidate usually has a small factor, and one short division is
/// far cheaper than a Fermat trial.
pub fn build_sieve(sieve: &mut Scratch, n: u32) -> Result<()> {
    if n < 3 {
        return Err(Error::InvalidArgument);
    }
    let n = n as usize;
    let mut is_prime = alloc::vec![true; n];
    let mut k = 2usize;
    let k_end = n / 2 + 1;
    loop {
        while k < k_end && !is_prime[k] {
            k += 1;
        }
        if k == k_end {
            break;
        }
        let mut i = k * 2;
        while i < n {
            is_prime[i] = false;
            i += k;
        }
        k += 1;
    }
    sieve.vals.clear();
    for k in 3..n {
        if is_prime[k] {
            sieve.vals.push(Bigint::from_u64(k as u64));
        }
    }
    Ok(())
}

/// Fermat primality test with a sieve prefilter.
///
/// Rejects if any sieve prime strictly below `p` divides it, then runs
/// `num_tests` Fermat trials with witnesses uniform in `[2, p - 2]`; a
/// witness `a` with `a^(p-1) mod p != 1` proves compositeness. A `p` that
/// survives is prime except with probability about `2^-num_tests`.
///
/// `scratch` amortises the trial divisions and exponentiations across
/// calls. Requires `p >= 5` and `num_tests >= 1`.
pub fn is_large_prime(
    p: &Bigint,
    num_tests: u32,
    sieve: Option<&Scratch>,
    scratch: &mut Scratch,
    rng: &mut impl RngCore,
) -> Result<bool> {
    if num_tests < 1 {
        return Err(Error::InvalidArgument);
    }
    // the witness range [2, p - 2] is empty below 5
    if p.len == 1 && p.digits[0] < 5 {
        return Err(Error::InvalidArgument);
    }
    scratch.prepare(PRIME_TEST_SCRATCHES, p.len)?;
    scratch.child().prepare(MOD_POW_SCRATCHES, p.len)?;
    let Scratch { vals, children } = scratch;
    let child = &mut children[0];

    if let Some(sieve) = sieve {
        for s in sieve.vals.iter() {
            // only strictly smaller primes are divisors worth testing
            if cmp_digits(&s.digits[..s.len], &p.digits[..p.len]) != core::cmp::Ordering::Less {
                break;
            }
            let (lo, hi) = vals.split_at_mut(2);
            let (quotient, s1) = hi.split_at_mut(1);
            div_rem(
                &mut quotient[0],
                p,
                s,
                &mut lo[1],
                &mut s1[0],
                &mut child.vals[0],
            )?;
            if lo[1].is_zero() {
                return Ok(false);
            }
        }
    }

    let [p_minus_1, limit, witness, power]: &mut [Bigint; PRIME_TEST_SCRATCHES] =
        (&mut vals[..PRIME_TEST_SCRATCHES]).try_into().expect("prepared above");
    limit.set_digit(1);
    sub(p_minus_1, p, limit)?;
    witness.set_digit(2);
    sub(limit, p_minus_1, witness)?; // witnesses: [0, p - 3) shifted up by 2
    for _ in 0..num_tests {
        crate::random::random_below(witness, limit, rng)?;
        add_digit(witness, 2)?;
        mod_pow(power, witness, p_minus_1, p, child)?;
        if !power.is_one() {
            return Ok(false);
        }
    }
    Ok(true)
}

/// Search for a random prime of exactly `num_bits` significant bits.
///
/// Draws odd candidates of the requested width until one passes
/// [`is_large_prime`]. Expected draws are on the order of
/// `num_bits * ln(2) / 2`; the scratch tree is set up once and reused
/// across the whole search.
pub fn random_large_prime(
    num_bits: u32,
    num_tests: u32,
    sieve: Option<&Scratch>,
    rng: &mut impl RngCore,
) -> Result<Bigint> {
    let mut p = Bigint::with_bits(num_bits)?;
    let mut scratch = Scratch::new();
    scratch.prepare(PRIME_TEST_SCRATCHES, p.digits.len())?;
    scratch.child().prepare(MOD_POW_SCRATCHES, p.digits.len())?;
    loop {
        crate::random::random_bits(&mut p, num_bits, rng)?;
        p.digits[0] |= 1;
        p.invalidate_cache();
        if is_large_prime(&p, num_tests, sieve, &mut scratch, rng)? {
            return Ok(p);
        }
    }
}
