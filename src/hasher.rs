use std::fmt;
use std::sync::Arc;

use md5::Md5;
use ripemd::Ripemd160;
use sha1::Sha1;
use sha2::{Digest as _, Sha224, Sha256, Sha384, Sha512};

use crate::Error;

/// A lowercase hexadecimal digest string, as produced by a [`Hasher`].
pub type Digest = String;

/// Built-in digest algorithms a [`Hasher`] can be configured with.
///
/// Default is [`HashAlgorithm::Sha256`].
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HashAlgorithm {
    /// MD5.
    Md5,
    /// RIPEMD-160.
    Ripemd160,
    /// SHA-1.
    Sha,
    /// SHA-224.
    Sha224,
    /// SHA-256 (default).
    #[default]
    Sha256,
    /// SHA-384.
    Sha384,
    /// SHA-512.
    Sha512,
    /// SHA-256 applied twice (`H(H(x))`).
    Sha256OfSha256,
}

impl HashAlgorithm {
    fn digest(&self, data: &[u8]) -> Digest {
        match self {
            HashAlgorithm::Md5 => hex::encode(Md5::digest(data)),
            HashAlgorithm::Ripemd160 => hex::encode(Ripemd160::digest(data)),
            HashAlgorithm::Sha => hex::encode(Sha1::digest(data)),
            HashAlgorithm::Sha224 => hex::encode(Sha224::digest(data)),
            HashAlgorithm::Sha256 => hex::encode(Sha256::digest(data)),
            HashAlgorithm::Sha384 => hex::encode(Sha384::digest(data)),
            HashAlgorithm::Sha512 => hex::encode(Sha512::digest(data)),
            HashAlgorithm::Sha256OfSha256 => {
                let once = Sha256::digest(data);
                hex::encode(Sha256::digest(once))
            }
        }
    }
}

#[derive(Clone)]
enum HasherKind {
    Algorithm(HashAlgorithm),
    Custom(Arc<dyn Fn(&[u8]) -> String + Send + Sync>),
}

/// A pluggable digest function over byte strings.
///
/// Wraps either one of the built-in [`HashAlgorithm`] variants or a
/// user-supplied closure, the way `Smt<D, H>` in the teacher crate wraps a
/// `PhantomData<H>` hasher type parameter — except the choice here is a
/// runtime value, since the spec lets a caller pick an algorithm by name or
/// install a function after the fact.
#[derive(Clone)]
pub struct Hasher {
    kind: HasherKind,
}

impl fmt::Debug for Hasher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            HasherKind::Algorithm(a) => f.debug_tuple("Hasher").field(a).finish(),
            HasherKind::Custom(_) => f.debug_tuple("Hasher").field(&"<custom fn>").finish(),
        }
    }
}

impl Default for Hasher {
    fn default() -> Self {
        Self::new(HashAlgorithm::default())
    }
}

impl Hasher {
    /// Creates a hasher backed by one of the built-in algorithms.
    pub fn new(algorithm: HashAlgorithm) -> Self {
        Self {
            kind: HasherKind::Algorithm(algorithm),
        }
    }

    /// Installs a user-supplied digest function, overriding any algorithm
    /// choice.
    ///
    /// The function is probed once, against an empty input, to confirm it
    /// returns a lowercase-hex digest string; this is the "surfaces on
    /// first use" moment for [`Error::InvalidHashFunction`] described in
    /// the spec's error handling section, brought as early as possible
    /// since Rust's type system already rules out the "wrong argument
    /// shape" half of that error kind at compile time.
    pub fn with_function<F>(f: F) -> Result<Self, Error>
    where
        F: Fn(&[u8]) -> String + Send + Sync + 'static,
    {
        let hasher = Self {
            kind: HasherKind::Custom(Arc::new(f)),
        };

        if !is_hex_digest(&hasher.hash(&[])) {
            return Err(Error::InvalidHashFunction);
        }

        Ok(hasher)
    }

    /// Hashes a single byte string.
    pub(crate) fn hash(&self, data: &[u8]) -> Digest {
        match &self.kind {
            HasherKind::Algorithm(algorithm) => algorithm.digest(data),
            HasherKind::Custom(f) => f(data),
        }
    }

    /// Combines two digests the way an inner node combines its children:
    /// `H(a ‖ b)`, where `‖` is concatenation of the two hex strings
    /// themselves, not of their decoded bytes. This is the chosen
    /// interoperability invariant (see the spec's reference vector).
    pub(crate) fn concat(&self, a: &str, b: &str) -> Digest {
        let mut buf = String::with_capacity(a.len() + b.len());

        buf.push_str(a);
        buf.push_str(b);

        self.hash(buf.as_bytes())
    }
}

fn is_hex_digest(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b))
}
