/*++

Licensed under the Apache-2.0 license.

File Name:

    flash.rs

Abstract:

    File contains the flash interface used for persistent storage and a
    RAM backed implementation with NOR semantics.

--*/

use ap_error::{ApError, ApResult};

/// Page-erasable non-volatile storage.
///
/// Writes follow NOR semantics: programming can only clear bits, so a region
/// must be erased before it is rewritten.
pub trait Flash {
    /// Erase granularity in bytes
    const PAGE_SIZE: u32;

    /// Read `buf.len()` bytes starting at `addr`
    fn read(&self, addr: u32, buf: &mut [u8]) -> ApResult<()>;

    /// Erase the page starting at `addr` to all ones
    fn erase_page(&mut self, addr: u32) -> ApResult<()>;

    /// Program `data` starting at `addr`
    fn write(&mut self, addr: u32, data: &[u8]) -> ApResult<()>;
}

/// Flash device emulated in RAM.
pub struct MemFlash<const SIZE: usize> {
    base: u32,
    mem: [u8; SIZE],
}

impl<const SIZE: usize> MemFlash<SIZE> {
    pub const PAGE: u32 = 8 * 1024;

    /// Create an erased device mapped at `base`.
    pub fn new(base: u32) -> Self {
        Self {
            base,
            mem: [0xff; SIZE],
        }
    }

    /// Raw view of the device contents.
    pub fn contents(&self) -> &[u8] {
        &self.mem
    }

    /// Raw mutable view; lets tests corrupt storage directly.
    pub fn contents_mut(&mut self) -> &mut [u8] {
        &mut self.mem
    }

    fn range(&self, addr: u32, len: usize) -> ApResult<core::ops::Range<usize>> {
        let start = addr
            .checked_sub(self.base)
            .ok_or(ApError::DRIVER_FLASH_OUT_OF_BOUNDS)? as usize;
        let end = start
            .checked_add(len)
            .filter(|end| *end <= SIZE)
            .ok_or(ApError::DRIVER_FLASH_OUT_OF_BOUNDS)?;
        Ok(start..end)
    }
}

impl<const SIZE: usize> Flash for MemFlash<SIZE> {
    const PAGE_SIZE: u32 = Self::PAGE;

    fn read(&self, addr: u32, buf: &mut [u8]) -> ApResult<()> {
        let range = self.range(addr, buf.len())?;
        buf.copy_from_slice(&self.mem[range]);
        Ok(())
    }

    fn erase_page(&mut self, addr: u32) -> ApResult<()> {
        if (addr.wrapping_sub(self.base)) % Self::PAGE_SIZE != 0 {
            return Err(ApError::DRIVER_FLASH_UNALIGNED_ERASE);
        }
        let range = self.range(addr, Self::PAGE_SIZE as usize)?;
        self.mem[range].fill(0xff);
        Ok(())
    }

    fn write(&mut self, addr: u32, data: &[u8]) -> ApResult<()> {
        let range = self.range(addr, data.len())?;
        for (cell, byte) in self.mem[range].iter_mut().zip(data) {
            *cell &= *byte;
        }
        Ok(())
    }
}
