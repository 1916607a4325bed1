// Licensed under the Apache-2.0 license

//! Flash device backed by a host file, so provisioned state survives
//! between emulator runs.

use std::fs;
use std::path::{Path, PathBuf};

use ap_drivers::Flash;
use ap_error::{ApError, ApResult};

const PAGE_SIZE: u32 = 8 * 1024;

pub struct FileFlash {
    base: u32,
    image: Vec<u8>,
    path: Option<PathBuf>,
}

impl FileFlash {
    /// Erased device of `size` bytes mapped at `base`, not persisted.
    pub fn in_memory(base: u32, size: usize) -> Self {
        Self {
            base,
            image: vec![0xff; size],
            path: None,
        }
    }

    /// Device persisted at `path`. A missing file, or one of the wrong size,
    /// reads as an erased device.
    pub fn open(path: &Path, base: u32, size: usize) -> ApResult<Self> {
        let image = match fs::read(path) {
            Ok(image) if image.len() == size => image,
            Ok(_) => vec![0xff; size],
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => vec![0xff; size],
            Err(_) => return Err(ApError::DRIVER_FLASH_IO),
        };
        Ok(Self {
            base,
            image,
            path: Some(path.to_path_buf()),
        })
    }

    pub fn image(&self) -> &[u8] {
        &self.image
    }

    pub fn image_mut(&mut self) -> &mut [u8] {
        &mut self.image
    }

    fn range(&self, addr: u32, len: usize) -> ApResult<std::ops::Range<usize>> {
        let start = addr
            .checked_sub(self.base)
            .ok_or(ApError::DRIVER_FLASH_OUT_OF_BOUNDS)? as usize;
        let end = start
            .checked_add(len)
            .filter(|end| *end <= self.image.len())
            .ok_or(ApError::DRIVER_FLASH_OUT_OF_BOUNDS)?;
        Ok(start..end)
    }

    fn persist(&self) -> ApResult<()> {
        match &self.path {
            Some(path) => fs::write(path, &self.image).map_err(|_| ApError::DRIVER_FLASH_IO),
            None => Ok(()),
        }
    }
}

impl Flash for FileFlash {
    const PAGE_SIZE: u32 = PAGE_SIZE;

    fn read(&self, addr: u32, buf: &mut [u8]) -> ApResult<()> {
        let range = self.range(addr, buf.len())?;
        buf.copy_from_slice(&self.image[range]);
        Ok(())
    }

    fn erase_page(&mut self, addr: u32) -> ApResult<()> {
        if addr.wrapping_sub(self.base) % PAGE_SIZE != 0 {
            return Err(ApError::DRIVER_FLASH_UNALIGNED_ERASE);
        }
        let range = self.range(addr, PAGE_SIZE as usize)?;
        self.image[range].fill(0xff);
        self.persist()
    }

    fn write(&mut self, addr: u32, data: &[u8]) -> ApResult<()> {
        let range = self.range(addr, data.len())?;
        for (cell, byte) in self.image[range].iter_mut().zip(data) {
            *cell &= *byte;
        }
        self.persist()
    }
}
