/*++

Licensed under the Apache-2.0 license.

File Name:

    flash_store.rs

Abstract:

    File contains the encrypted, digest protected record of provisioned
    component ids kept in flash.

--*/

use ap_drivers::{
    constant_time_eq, cprintln, Aes256Ctr, Flash, Sha256, Trng, AES_256_KEY_SIZE, AES_IV_SIZE,
    SHA256_DIGEST_SIZE,
};
use ap_error::{ApError, ApResult, ErrorKind};
use zerocopy::byteorder::little_endian::U32;
use zerocopy::{FromBytes, FromZeros, Immutable, IntoBytes, KnownLayout};
use zeroize::{Zeroize, Zeroizing};

/// Maximum number of components the AP can be provisioned with.
pub const MAX_COMPONENTS: usize = 32;

/// Bumped whenever `FlashRecord` changes shape.
pub const RECORD_LAYOUT_VERSION: u8 = 1;

/// Ordered list of provisioned component ids.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct ComponentIdList {
    len: usize,
    ids: [u32; MAX_COMPONENTS],
}

impl Default for ComponentIdList {
    fn default() -> Self {
        Self::new()
    }
}

impl ComponentIdList {
    pub const fn new() -> Self {
        Self {
            len: 0,
            ids: [0; MAX_COMPONENTS],
        }
    }

    pub fn from_slice(ids: &[u32]) -> ApResult<Self> {
        let mut list = Self::new();
        for id in ids {
            list.push(*id)?;
        }
        Ok(list)
    }

    pub fn push(&mut self, id: u32) -> ApResult<()> {
        let slot = self
            .ids
            .get_mut(self.len)
            .ok_or(ApError::STORE_ID_LIST_FULL)?;
        *slot = id;
        self.len += 1;
        Ok(())
    }

    pub fn as_slice(&self) -> &[u32] {
        &self.ids[..self.len]
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn contains(&self, id: u32) -> bool {
        self.as_slice().contains(&id)
    }

    pub fn position(&self, id: u32) -> Option<usize> {
        self.as_slice().iter().position(|&x| x == id)
    }

    /// Overwrite `outgoing` with `incoming` in place, keeping every other
    /// slot where it is. Returns the index that changed.
    pub fn replace(&mut self, outgoing: u32, incoming: u32) -> ApResult<usize> {
        if self.contains(incoming) {
            return Err(ApError::REPLACE_ALREADY_PROVISIONED);
        }
        let index = self
            .position(outgoing)
            .ok_or(ApError::REPLACE_NOT_PROVISIONED)?;
        self.ids[index] = incoming;
        Ok(index)
    }
}

#[repr(C)]
#[derive(FromBytes, IntoBytes, KnownLayout, Immutable)]
struct RecordBody {
    magic: U32,
    count: U32,
    ids: [U32; MAX_COMPONENTS],
}

/// Flash image of the record. Everything before `iv` is encrypted.
#[repr(C)]
#[derive(FromBytes, IntoBytes, KnownLayout, Immutable)]
struct FlashRecord {
    body: RecordBody,
    digest: [u8; SHA256_DIGEST_SIZE],
    iv: [u8; AES_IV_SIZE],
}

/// Size of the record in flash.
pub const RECORD_SIZE: usize = core::mem::size_of::<FlashRecord>();

/// Bytes covered by the cipher.
const SEALED_SIZE: usize = RECORD_SIZE - AES_IV_SIZE;

const _: () = assert!(RECORD_SIZE == 184);
const _: () = assert!(SEALED_SIZE == 168);

/// Result of loading the record at startup.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum LoadOutcome {
    /// The stored record decrypted and verified.
    Verified,

    /// The stored record failed the named check and was replaced with the
    /// build time defaults.
    Reprovisioned(ApError),
}

pub struct CredentialStore<F: Flash> {
    flash: F,
    addr: u32,
    key: Zeroizing<[u8; AES_256_KEY_SIZE]>,
    magic: u32,
    ids: ComponentIdList,
}

impl<F: Flash> CredentialStore<F> {
    /// `addr` must be the start of a flash page; the record owns that page.
    pub fn new(flash: F, addr: u32, key: &[u8; AES_256_KEY_SIZE], magic: u32) -> Self {
        Self {
            flash,
            addr,
            key: Zeroizing::new(*key),
            magic,
            ids: ComponentIdList::new(),
        }
    }

    /// Load the stored record. A record that fails its digest, magic or
    /// count check is discarded and `defaults` is written in its place.
    ///
    /// Flash faults are returned as errors, never treated as tampering.
    pub fn load_and_verify<T: Trng + ?Sized>(
        &mut self,
        trng: &mut T,
        defaults: &[u32],
    ) -> ApResult<LoadOutcome> {
        match self.read_verified() {
            Ok(ids) => {
                self.ids = ids;
                Ok(LoadOutcome::Verified)
            }
            Err(err) if err.kind() == ErrorKind::Integrity => {
                cprintln!("[store] Record rejected ({}), reprovisioning", u32::from(err));
                let ids = ComponentIdList::from_slice(defaults)?;
                self.save(trng, &ids)?;
                Ok(LoadOutcome::Reprovisioned(err))
            }
            Err(err) => Err(err),
        }
    }

    /// Seal `ids` under a fresh IV and rewrite the record page.
    pub fn save<T: Trng + ?Sized>(&mut self, trng: &mut T, ids: &ComponentIdList) -> ApResult<()> {
        let mut record = FlashRecord::new_zeroed();
        let result = self.seal_and_write(trng, ids, &mut record);
        record.as_mut_bytes().zeroize();
        result?;
        self.ids = *ids;
        Ok(())
    }

    /// Ids from the last successful load or save.
    pub fn component_ids(&self) -> &ComponentIdList {
        &self.ids
    }

    pub fn flash(&self) -> &F {
        &self.flash
    }

    pub fn flash_mut(&mut self) -> &mut F {
        &mut self.flash
    }

    fn digest(body: &RecordBody) -> [u8; SHA256_DIGEST_SIZE] {
        Sha256::digest(&[&[RECORD_LAYOUT_VERSION], body.as_bytes()])
    }

    fn read_verified(&self) -> ApResult<ComponentIdList> {
        let mut record = FlashRecord::new_zeroed();
        let result = self.open(&mut record);
        record.as_mut_bytes().zeroize();
        result
    }

    fn open(&self, record: &mut FlashRecord) -> ApResult<ComponentIdList> {
        self.flash.read(self.addr, record.as_mut_bytes())?;

        let iv = record.iv;
        Aes256Ctr::new(&self.key, &iv).apply(&mut record.as_mut_bytes()[..SEALED_SIZE]);

        let mut expected = Self::digest(&record.body);
        let digest_ok = constant_time_eq(&expected, &record.digest);
        expected.zeroize();
        if !digest_ok {
            return Err(ApError::STORE_DIGEST_MISMATCH);
        }
        if record.body.magic.get() != self.magic {
            return Err(ApError::STORE_MAGIC_MISMATCH);
        }
        let count = record.body.count.get() as usize;
        if count > MAX_COMPONENTS {
            return Err(ApError::STORE_COUNT_INVALID);
        }

        let mut ids = ComponentIdList::new();
        for id in &record.body.ids[..count] {
            ids.push(id.get())?;
        }
        Ok(ids)
    }

    fn seal_and_write<T: Trng + ?Sized>(
        &mut self,
        trng: &mut T,
        ids: &ComponentIdList,
        record: &mut FlashRecord,
    ) -> ApResult<()> {
        record.body.magic = U32::new(self.magic);
        record.body.count = U32::new(ids.len() as u32);
        for (slot, id) in record.body.ids.iter_mut().zip(ids.as_slice()) {
            *slot = U32::new(*id);
        }
        record.digest = Self::digest(&record.body);
        trng.fill(&mut record.iv)?;

        let iv = record.iv;
        Aes256Ctr::new(&self.key, &iv).apply(&mut record.as_mut_bytes()[..SEALED_SIZE]);

        self.flash.erase_page(self.addr)?;
        self.flash.write(self.addr, record.as_bytes())
    }
}
