//! RSA with OAEP padding, built from the ground up on its own
//! arbitrary-precision integer engine.
//!
//! The engine stores integers as little-endian digits packed at less than
//! word width ([`BITS_PER_DIGIT`] bits per word), which keeps every carry
//! and partial product inside a single machine word; see
//! [`arithmetic::div_rem`] for the long division built on top. Around it
//! sit prime search ([`random_large_prime`]), the key layer
//! ([`PrivateKey`], [`PublicKey`]) and OAEP ([`padding`]).
//!
//! All randomness is drawn from a caller-supplied
//! [`rand_core::RngCore`]; key material deserves a cryptographically
//! strong one.
#![cfg_attr(not(test), no_std)]

extern crate alloc;

mod bits;
mod convert;
mod digit;
mod error;
mod key;
mod numbers;
mod prime;
mod random;
mod scratch;

pub mod arithmetic;
pub mod padding;

pub use digit::{Word, BITS_PER_DIGIT};
pub use error::{Error, Result};
pub use key::{PrivateKey, PublicKey};
pub use numbers::Bigint;
pub use prime::{build_sieve, is_large_prime, random_large_prime};
pub use random::{random_below, random_bits};
pub use scratch::Scratch;

/// The public exponent `e`: the fourth Fermat prime, `2^16 + 1`.
///
/// This library only issues RSA keys with `e = 65537`. An example
/// recommendation to do so is RFC 4871: <https://www.ietf.org/rfc/rfc4871.txt>;
/// more generally, there seems no need to have too many knobs to turn.
pub const E: u32 = 0x1_0001;
