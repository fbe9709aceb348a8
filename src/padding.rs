//! OAEP padding for RSA encipherment.
//!
//! Main reference is RFC 8017 (PKCS #1 v2.2), with the label restricted to
//! empty and the mask generating function to MGF1 over the same hash.
//!
//! ```ignore
//!                       +----------+------+--+-------+
//!                  DB = |  lHash   |  PS  |01|   M   |
//!                       +----------+------+--+-------+
//!                                        |
//!             +----------+               V
//!             |   seed   |--- MGF ---> xor
//!             +----------+               |
//!                   |                    |
//!                  xor <----- MGF -------|
//!                   |                    |
//!                   V                    V
//!             +-------------+----------------------+
//!        EM = | masked seed |      masked DB       |
//!             +-------------+----------------------+
//! ```
//!
//! The encoded block is byte-for-byte the integer the modular
//! exponentiation consumes (little-endian across bytes, so `EM[k - 1]` is
//! the integer's top byte).

use core::marker::PhantomData;

use alloc::vec;
use alloc::vec::Vec;
use digest::{generic_array::typenum::Unsigned, Digest};
use rand_core::RngCore;

#[derive(Debug)]
pub enum Error {
    /// message too long to fit in the block with the required padding
    MessageTooLong,
    /// the block does not decode as a padded message
    DecodingError,
}

pub type Result<T> = core::result::Result<T, Error>;

/// Mask Generating Function 1.
///
/// XORs `data` with `Hash(seed || counter)` blocks. An undersized final
/// chunk zips away the excess mask bytes on its own.
pub fn xor_mgf1<H: Digest>(hasher: &mut H, seed: &[u8], data: &mut [u8]) {
    hasher.reset();
    let mut counter: u32 = 0;
    let h_len = H::OutputSize::to_usize();
    for chunk in data.chunks_mut(h_len) {
        hasher.update(seed);
        hasher.update(counter.to_be_bytes().as_ref());
        for (byte_to_mask, masking_byte) in chunk.iter_mut().zip(hasher.finalize_reset().iter()) {
            *byte_to_mask ^= *masking_byte;
        }
        counter += 1;
    }
}

/// ## Optimal Asymmetric Encryption Padding
///
/// `DB = lHash || PS || 01 || M`, where the padding string PS is
/// `k - msg.len() - 2*h_len - 1` zeros; then `EM = maskedSeed || maskedDB`,
/// where first the random seed (of hash-output length) masks the DB, and
/// then the DB masks the seed.
pub struct Oaep<H: Digest> {
    __: PhantomData<H>,
}

impl<H: Digest> Oaep<H> {
    /// Pad `msg` into a `k`-byte encoded block.
    pub fn pad(msg: &[u8], k: usize, rng: &mut impl RngCore) -> Result<Vec<u8>> {
        // 1. check the message fits
        let h_len = H::OutputSize::to_usize();
        if msg.len() + 2 * h_len + 1 > k {
            return Err(Error::MessageTooLong);
        }

        // 2. construct the data block
        let mut padded = vec![0u8; k];
        let (seed, data_block) = padded.split_at_mut(h_len);
        let mut hasher = H::new();
        data_block[..h_len].copy_from_slice(&hasher.finalize_reset()); // lHash of the empty label
        let ps_len = k - msg.len() - 2 * h_len - 1;
        data_block[h_len + ps_len] = 0x1;
        let db_len = data_block.len();
        data_block[db_len - msg.len()..].copy_from_slice(msg);

        // 3. random seed
        rng.fill_bytes(seed);

        // 4. + 5. maskedDB, then maskedSeed
        xor_mgf1(&mut hasher, seed, data_block);
        xor_mgf1(&mut hasher, data_block, seed);

        Ok(padded)
    }

    /// Recover the message from an encoded block.
    pub fn unpad(padded: &[u8]) -> Result<Vec<u8>> {
        let h_len = H::OutputSize::to_usize();
        let k = padded.len();
        if k < 2 * h_len + 2 {
            return Err(Error::DecodingError);
        }
        let mut block = padded.to_vec();
        let (seed, data_block) = block.split_at_mut(h_len);

        // 1. + 2. unmask the seed, then the data block
        let mut hasher = H::new();
        xor_mgf1(&mut hasher, data_block, seed);
        xor_mgf1(&mut hasher, seed, data_block);

        // 3. verify lHash (the hasher is freshly reset, so finalize()
        // is the hash of the empty label)
        if &data_block[..h_len] != hasher.finalize().as_ref() {
            return Err(Error::DecodingError);
        }

        // 4. find the 0x01 delimiter behind the padding string
        let remainder = &data_block[h_len..];
        let ps_len = remainder
            .iter()
            .position(|&byte| byte != 0)
            .ok_or(Error::DecodingError)?;
        if remainder[ps_len] != 1 {
            return Err(Error::DecodingError);
        }

        Ok(remainder[ps_len + 1..].to_vec())
    }
}
