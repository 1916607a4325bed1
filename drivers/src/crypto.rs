/*++

Licensed under the Apache-2.0 license.

File Name:

    crypto.rs

Abstract:

    File contains the symmetric cipher and hash primitives used to seal the
    persisted component record.

--*/

use aes::Aes256;
use cipher::{KeyIvInit, StreamCipher};
use sha2::Digest;
use subtle::ConstantTimeEq;

pub const AES_256_KEY_SIZE: usize = 32;
pub const AES_IV_SIZE: usize = 16;
pub const SHA256_DIGEST_SIZE: usize = 32;

type Ctr = ctr::Ctr128BE<Aes256>;

/// AES-256 in counter mode.
pub struct Aes256Ctr {
    cryptor: Ctr,
}

impl Aes256Ctr {
    pub fn new(key: &[u8; AES_256_KEY_SIZE], iv: &[u8; AES_IV_SIZE]) -> Self {
        Self {
            cryptor: Ctr::new(key.into(), iv.into()),
        }
    }

    /// Encrypt or decrypt `buf` in place.
    pub fn apply(&mut self, buf: &mut [u8]) {
        self.cryptor.apply_keystream(buf);
    }
}

/// SHA-256
pub struct Sha256;

impl Sha256 {
    /// Digest of the concatenation of `parts`.
    pub fn digest(parts: &[&[u8]]) -> [u8; SHA256_DIGEST_SIZE] {
        let mut hasher = sha2::Sha256::new();
        for part in parts {
            hasher.update(part);
        }
        hasher.finalize().into()
    }
}

/// Compare two byte strings without an early exit on the first mismatch.
/// Strings of different length compare unequal.
pub fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    a.ct_eq(b).into()
}
