//! RSA keys.
//!
//! A private key consists of the prime pair `(p, q)` together with the
//! precomputed CRT exponents `d_p = d mod (p-1)`, `d_q = d mod (q-1)` and
//! `q^{-1} mod p`, so decryption runs two half-size exponentiations
//! instead of one full-size one ([RFC 8017, 5.1.2][rsadp]). The public
//! exponent is fixed to [`E`] = 65537.
//!
//! Encryption and decryption wrap the primitives in OAEP (see
//! [`crate::padding`]) over SHA3-256.
//!
//! [rsadp]: https://tools.ietf.org/html/rfc8017#section-5.1.2

use alloc::vec;
use alloc::vec::Vec;
use digest::{generic_array::typenum::Unsigned, Digest};
use rand_core::RngCore;
use sha3::Sha3_256;
use zeroize::Zeroize;

use crate::arithmetic::{
    add, add_assign, add_digit, div_rem, mod_inv, mod_pow, mul, rem, sub_assign,
};
use crate::bits::{BitReader, BitWriter};
use crate::numbers::Bigint;
use crate::padding::{self, Oaep};
use crate::prime::{build_sieve, random_large_prime};
use crate::scratch::Scratch;
use crate::{Error, Result, E};

type KeyDigest = Sha3_256;

fn hash_len() -> usize {
    <KeyDigest as Digest>::OutputSize::to_usize()
}

fn map_padding(e: padding::Error) -> Error {
    match e {
        padding::Error::MessageTooLong => Error::MessageTooLong,
        padding::Error::DecodingError => Error::DecryptionFailed,
    }
}

/// RSA public key: the modulus `N = pq` and the exponent `e`.
#[derive(Clone, Zeroize)]
pub struct PublicKey {
    pub(crate) e: Bigint,
    pub(crate) n: Bigint,
}

/// RSA private key, with the CRT precomputation.
///
/// `m1_inc` is `(floor(q/p) + 1) * p`: a multiple of `p` just above `q`,
/// added to `m_1` when the CRT recombination would otherwise go negative.
#[derive(Zeroize)]
pub struct PrivateKey {
    pub(crate) p: Bigint,
    pub(crate) q: Bigint,
    pub(crate) dp: Bigint,
    pub(crate) dq: Bigint,
    pub(crate) qinv: Bigint,
    pub(crate) m1_inc: Bigint,
    pub(crate) public: PublicKey,
}

impl PublicKey {
    pub fn modulus(&self) -> &Bigint {
        &self.n
    }

    pub fn exponent(&self) -> &Bigint {
        &self.e
    }

    /// Bytes of padded block the modulus can carry: the largest whole-byte
    /// count strictly below the modulus size.
    pub(crate) fn usable_size(&self) -> usize {
        ((self.n.significant_bits() - 1) / 8) as usize
    }

    /// Longest message [`encrypt`](Self::encrypt) accepts.
    pub fn max_msg_len(&self) -> usize {
        self.usable_size().saturating_sub(2 * hash_len() + 1)
    }

    /// [RSAEP][rsaep]: `dest = m^e mod n`, for `m < n`.
    ///
    /// [rsaep]: https://tools.ietf.org/html/rfc8017#section-5.1.1
    pub fn encryption_primitive(
        &self,
        m: &Bigint,
        dest: &mut Bigint,
        scratch: &mut Scratch,
    ) -> Result<()> {
        if *m >= self.n {
            return Err(Error::InvalidArgument);
        }
        mod_pow(dest, m, &self.e, &self.n, scratch)
    }

    /// OAEP-pad `msg` and encrypt it, returning the serialized ciphertext.
    pub fn encrypt(&self, msg: &[u8], rng: &mut impl RngCore) -> Result<Vec<u8>> {
        if msg.len() > self.max_msg_len() {
            return Err(Error::MessageTooLong);
        }
        let k = self.usable_size();
        // Retry until the padded block's top byte has its low bit set.
        // Serialization drops leading zero bytes, so this pins the
        // decrypted block to re-serialise at exactly k bytes and keeps
        // the OAEP masks aligned.
        let padded = loop {
            let padded = Oaep::<KeyDigest>::pad(msg, k, rng).map_err(map_padding)?;
            if padded[k - 1] & 1 == 1 {
                break padded;
            }
        };
        let mut m = Bigint::with_digits(self.n.len());
        m.deserialize(&padded)?;
        let mut c = Bigint::with_digits(2 * self.n.len());
        let mut scratch = Scratch::new();
        self.encryption_primitive(&m, &mut c, &mut scratch)?;
        Ok(c.to_bytes())
    }

    /// Bytes needed by [`serialize_into`](Self::serialize_into).
    pub fn serialized_size(&self) -> usize {
        field_size(&self.e) + field_size(&self.n)
    }

    /// Write `(e, n)` as length-prefixed fields; returns the bytes written.
    pub fn serialize_into(&self, buf: &mut [u8]) -> Result<usize> {
        let total = self.serialized_size();
        if buf.len() < total {
            return Err(Error::BufferTooSmall);
        }
        let mut offset = 0;
        write_field(buf, &mut offset, &self.e)?;
        write_field(buf, &mut offset, &self.n)?;
        Ok(offset)
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buf = vec![0u8; self.serialized_size()];
        // cannot fail: buf is sized above
        let _ = self.serialize_into(&mut buf);
        buf
    }

    pub fn from_bytes(key: &[u8]) -> Result<Self> {
        let mut e = Bigint::zero();
        let mut n = Bigint::zero();
        let mut offset = 0;
        read_field(key, &mut offset, &mut e)?;
        read_field(key, &mut offset, &mut n)?;
        Ok(PublicKey { e, n })
    }
}

impl PrivateKey {
    /// Generate a fresh key of roughly `bits` modulus bits.
    ///
    /// The primes are drawn at `5/11` and `6/11` of the key size with 20
    /// Fermat tests each, behind a sieve of primes up to 100 000.
    pub fn generate(bits: u32, rng: &mut impl RngCore) -> Result<Self> {
        let mut sieve = Scratch::new();
        build_sieve(&mut sieve, 100_000)?;
        let p_bits = bits * 5 / 11;
        let q_bits = bits - p_bits;
        let p = random_large_prime(p_bits, 20, Some(&sieve), rng)?;
        let q = random_large_prime(q_bits, 20, Some(&sieve), rng)?;
        Self::from_primes(p, q)
    }

    /// Assemble a key from a prime pair.
    ///
    /// Computes `d = e^{-1} mod (p-1)(q-1)` and fails with
    /// [`Error::KeyGeneration`] if the inverse does not verify (which
    /// happens when `e` divides `p - 1` or `q - 1`) or if the modulus is
    /// too small to carry any OAEP payload.
    pub fn from_primes(p: Bigint, q: Bigint) -> Result<Self> {
        let mut n = Bigint::with_digits(p.len() + q.len());
        mul(&mut n, &p, &q)?;
        let one = Bigint::from_u64(1);
        let mut p_minus_1 = p.clone();
        sub_assign(&mut p_minus_1, &one)?;
        let mut q_minus_1 = q.clone();
        sub_assign(&mut q_minus_1, &one)?;
        let mut totient = Bigint::with_digits(n.len());
        mul(&mut totient, &p_minus_1, &q_minus_1)?;

        let e = Bigint::from_u64(E as u64);
        let mut d = Bigint::with_digits(totient.len());
        mod_inv(&mut d, &e, &totient)?;
        let mut check = Bigint::with_digits(totient.len() + 1);
        mul(&mut check, &d, &e)?;
        let mut remainder = Bigint::with_digits(totient.len());
        rem(&mut remainder, &check, &totient)?;
        if !remainder.is_one() {
            return Err(Error::KeyGeneration);
        }

        let mut dp = Bigint::with_digits(p.len());
        rem(&mut dp, &d, &p_minus_1)?;
        let mut dq = Bigint::with_digits(q.len());
        rem(&mut dq, &d, &q_minus_1)?;
        let mut qinv = Bigint::with_digits(p.len());
        mod_inv(&mut qinv, &q, &p)?;
        let m1_inc = m1_increment(&p, &q)?;
        d.zeroize();

        let key = PrivateKey {
            p,
            q,
            dp,
            dq,
            qinv,
            m1_inc,
            public: PublicKey { e, n },
        };
        if key.public.max_msg_len() == 0 {
            return Err(Error::KeyGeneration);
        }
        Ok(key)
    }

    pub fn public_key(&self) -> &PublicKey {
        &self.public
    }

    /// [RSADP][rsadp] via the CRT: `m_1 = c^{d_p} mod p`,
    /// `m_2 = c^{d_q} mod q`, `h = (m_1 - m_2) q^{-1} mod p`,
    /// `dest = m_2 + h q`.
    ///
    /// [rsadp]: https://tools.ietf.org/html/rfc8017#section-5.1.2
    pub fn decryption_primitive(
        &self,
        c: &Bigint,
        dest: &mut Bigint,
        scratch: &mut Scratch,
    ) -> Result<()> {
        if *c >= self.public.n {
            return Err(Error::InvalidArgument);
        }
        let mut m1 = Bigint::with_digits(self.p.len() + 1);
        let mut m2 = Bigint::with_digits(self.q.len() + 1);
        mod_pow(&mut m1, c, &self.dp, &self.p, scratch)?;
        mod_pow(&mut m2, c, &self.dq, &self.q, scratch)?;
        if m1 < m2 {
            add_assign(&mut m1, &self.m1_inc)?;
        }
        sub_assign(&mut m1, &m2)?;
        let mut t = Bigint::with_digits(m1.len() + self.qinv.len());
        mul(&mut t, &m1, &self.qinv)?;
        let mut h = Bigint::with_digits(self.p.len());
        rem(&mut h, &t, &self.p)?;
        mul(&mut t, &h, &self.q)?;
        add(dest, &t, &m2)
    }

    /// Decrypt a serialized ciphertext and strip the OAEP padding.
    pub fn decrypt(&self, ciphertext: &[u8]) -> Result<Vec<u8>> {
        let k = self.public.usable_size();
        if ciphertext.is_empty() || ciphertext.len() > k + 1 {
            return Err(Error::InvalidArgument);
        }
        let mut c = Bigint::with_digits(self.public.n.len());
        c.deserialize(ciphertext)?;
        let mut m = Bigint::with_digits(self.public.n.len() + 1);
        let mut scratch = Scratch::new();
        self.decryption_primitive(&c, &mut m, &mut scratch)?;
        Oaep::<KeyDigest>::unpad(&m.to_bytes()).map_err(|_| Error::DecryptionFailed)
    }

    /// Bytes needed by [`serialize_into`](Self::serialize_into).
    pub fn serialized_size(&self) -> usize {
        self.fields().iter().map(|f| field_size(f)).sum()
    }

    /// Write `(p, q, n, e, dp, dq, qinv)` as length-prefixed fields;
    /// returns the bytes written.
    pub fn serialize_into(&self, buf: &mut [u8]) -> Result<usize> {
        let total = self.serialized_size();
        if buf.len() < total {
            return Err(Error::BufferTooSmall);
        }
        let mut offset = 0;
        for field in self.fields() {
            write_field(buf, &mut offset, field)?;
        }
        Ok(offset)
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buf = vec![0u8; self.serialized_size()];
        // cannot fail: buf is sized above
        let _ = self.serialize_into(&mut buf);
        buf
    }

    pub fn from_bytes(key: &[u8]) -> Result<Self> {
        let mut fields: [Bigint; 7] = core::array::from_fn(|_| Bigint::zero());
        let mut offset = 0;
        for field in fields.iter_mut() {
            read_field(key, &mut offset, field)?;
        }
        let [p, q, n, e, dp, dq, qinv] = fields;
        let m1_inc = m1_increment(&p, &q)?;
        Ok(PrivateKey {
            p,
            q,
            dp,
            dq,
            qinv,
            m1_inc,
            public: PublicKey { e, n },
        })
    }

    fn fields(&self) -> [&Bigint; 7] {
        [
            &self.p,
            &self.q,
            &self.public.n,
            &self.public.e,
            &self.dp,
            &self.dq,
            &self.qinv,
        ]
    }
}

/// `(floor(q/p) + 1) * p`.
fn m1_increment(p: &Bigint, q: &Bigint) -> Result<Bigint> {
    let mut quotient = Bigint::with_digits(q.len());
    let mut r = Bigint::with_digits(p.len() + 1);
    let mut s1 = Bigint::with_digits(p.len() + 1);
    let mut s2 = Bigint::with_digits(p.len() + 1);
    div_rem(&mut quotient, q, p, &mut r, &mut s1, &mut s2)?;
    add_digit(&mut quotient, 1)?;
    let mut inc = Bigint::with_digits(quotient.len() + p.len());
    mul(&mut inc, &quotient, p)?;
    Ok(inc)
}

fn field_size(v: &Bigint) -> usize {
    v.serialized_size() + 4
}

fn write_field(buf: &mut [u8], offset: &mut usize, v: &Bigint) -> Result<()> {
    let size = v.serialized_size();
    BitWriter::new(&mut buf[*offset..]).write(32, size as u64)?;
    *offset += 4;
    *offset += v.serialize_into(&mut buf[*offset..])?;
    Ok(())
}

fn read_field(buf: &[u8], offset: &mut usize, v: &mut Bigint) -> Result<()> {
    if buf.len() < *offset + 4 {
        return Err(Error::InvalidArgument);
    }
    let size = BitReader::new(&buf[*offset..])
        .read(32)
        .map_err(|_| Error::InvalidArgument)? as usize;
    *offset += 4;
    if size == 0 || buf.len() < *offset + size {
        return Err(Error::InvalidArgument);
    }
    v.deserialize(&buf[*offset..*offset + size])?;
    *offset += size;
    Ok(())
}
