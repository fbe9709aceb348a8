use core::fmt;

/// The ways a bigint or RSA operation can fail.
///
/// Errors are local to the operation that reports them; scratch and cache
/// state stay internally consistent, so a failed call leaves every involved
/// bigint usable for subsequent calls.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Error {
    /// A non-growable bigint needed more digits than its buffer holds.
    /// No partial result is guaranteed.
    CapacityExhausted,
    /// An argument was outside the domain of the operation (zero divisor,
    /// zero random limit, too few primality tests, a bit request below the
    /// minimum, malformed key bytes).
    InvalidArgument,
    /// The caller-provided output buffer is smaller than required.
    BufferTooSmall,
    /// The message does not fit the key size under OAEP.
    MessageTooLong,
    /// Decryption produced a block that does not unpad.
    DecryptionFailed,
    /// Key generation failed its internal consistency check.
    KeyGeneration,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Error::CapacityExhausted => "capacity exhausted",
            Error::InvalidArgument => "invalid argument",
            Error::BufferTooSmall => "buffer too small",
            Error::MessageTooLong => "message too long",
            Error::DecryptionFailed => "decryption failed",
            Error::KeyGeneration => "key generation failed",
        };
        f.write_str(s)
    }
}

/// [`Error`] or success.
pub type Result<T> = core::result::Result<T, Error>;
