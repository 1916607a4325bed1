/*++

Licensed under the Apache-2.0 license.

File Name:

    trng.rs

Abstract:

    File contains the random number source interface.

--*/

use ap_error::{ApError, ApResult};

pub trait Trng {
    /// Generate one random word
    fn generate(&mut self) -> ApResult<u32>;

    /// Fill `buf` with random bytes
    fn fill(&mut self, buf: &mut [u8]) -> ApResult<()> {
        for chunk in buf.chunks_mut(4) {
            let word = self.generate()?.to_le_bytes();
            chunk.copy_from_slice(&word[..chunk.len()]);
        }
        Ok(())
    }
}

/// Draw a value uniformly from `min..=max`.
pub fn uniform_u32<T: Trng + ?Sized>(trng: &mut T, min: u32, max: u32) -> ApResult<u32> {
    if min > max {
        return Err(ApError::PARAMS_INVALID);
    }
    let span = max - min;
    if span == u32::MAX {
        return trng.generate();
    }
    let span = span + 1;
    // Reject the tail so every residue is equally likely.
    let limit = u32::MAX - (u32::MAX % span);
    loop {
        let value = trng.generate()?;
        if value < limit {
            return Ok(min + value % span);
        }
    }
}
