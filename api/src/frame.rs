/*++

Licensed under the Apache-2.0 license.

File Name:

    frame.rs

Abstract:

    File contains the bus frame exchanged between the AP and components.

--*/

use ap_error::{ApError, ApResult};
use zerocopy::byteorder::little_endian::U32;
use zerocopy::{FromBytes, FromZeros, Immutable, IntoBytes, KnownLayout};
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::{FRAME_HEADER_SIZE, FRAME_SIZE, MAX_CONTENTS_SIZE, MAX_SECURE_PAYLOAD};

/// Command carried by a frame.
#[repr(u8)]
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Opcode {
    None = 0,
    Scan = 1,
    Validate = 2,
    Boot = 3,
    Attest = 4,
}

impl From<Opcode> for u8 {
    fn from(opcode: Opcode) -> u8 {
        opcode as u8
    }
}

impl TryFrom<u8> for Opcode {
    type Error = ApError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Opcode::None),
            1 => Ok(Opcode::Scan),
            2 => Ok(Opcode::Validate),
            3 => Ok(Opcode::Boot),
            4 => Ok(Opcode::Attest),
            _ => Err(ApError::CHANNEL_INVALID_OPCODE),
        }
    }
}

/// On-wire frame layout. All integers are little-endian.
#[repr(C)]
#[derive(FromBytes, IntoBytes, KnownLayout, Immutable)]
pub struct FrameWire {
    /// Opcode
    pub opcode: u8,

    /// Reserved, zero
    pub reserved: [u8; 3],

    /// Fresh challenge chosen by the sender
    pub challenge: U32,

    /// Sender's echo of the last challenge it received
    pub response: U32,

    /// Contents
    pub contents: [u8; MAX_CONTENTS_SIZE],
}

const _: () = assert!(core::mem::size_of::<FrameWire>() == FRAME_SIZE);

/// Frame under construction for transmission.
///
/// Contents start zeroed and are wiped again when the frame is dropped.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct OutboundFrame {
    opcode: u8,
    challenge: u32,
    response: u32,
    contents: [u8; MAX_CONTENTS_SIZE],
}

impl OutboundFrame {
    pub fn new(opcode: Opcode) -> Self {
        Self {
            opcode: opcode.into(),
            challenge: 0,
            response: 0,
            contents: [0; MAX_CONTENTS_SIZE],
        }
    }

    /// Place `bytes` at the start of the contents.
    pub fn with_contents(mut self, bytes: &[u8]) -> ApResult<Self> {
        let dest = self
            .contents
            .get_mut(..bytes.len())
            .ok_or(ApError::CHANNEL_PAYLOAD_TOO_LARGE)?;
        dest.copy_from_slice(bytes);
        Ok(self)
    }

    /// Place `bytes` at `offset`.
    pub fn with_contents_at(mut self, offset: usize, bytes: &[u8]) -> ApResult<Self> {
        let dest = self
            .contents
            .get_mut(offset..offset + bytes.len())
            .ok_or(ApError::CHANNEL_PAYLOAD_TOO_LARGE)?;
        dest.copy_from_slice(bytes);
        Ok(self)
    }

    /// Place a little-endian word at the start of the contents.
    pub fn with_word(mut self, word: u32) -> Self {
        self.contents[..4].copy_from_slice(&word.to_le_bytes());
        self
    }

    /// Contents become a length byte followed by `bytes`.
    pub fn with_len_prefixed(mut self, bytes: &[u8]) -> ApResult<Self> {
        if bytes.len() > MAX_SECURE_PAYLOAD {
            return Err(ApError::CHANNEL_PAYLOAD_TOO_LARGE);
        }
        self.contents[0] = bytes.len() as u8;
        self.contents[1..=bytes.len()].copy_from_slice(bytes);
        Ok(self)
    }

    /// Bind the frame to an exchange: our fresh challenge and our answer to
    /// the peer's last challenge.
    pub fn sealed(mut self, challenge: u32, response: u32) -> Self {
        self.challenge = challenge;
        self.response = response;
        self
    }

    pub fn opcode(&self) -> u8 {
        self.opcode
    }

    pub fn challenge(&self) -> u32 {
        self.challenge
    }

    pub fn response(&self) -> u32 {
        self.response
    }

    /// Serialize into `wire`.
    pub fn encode(&self, wire: &mut FrameWire) {
        wire.opcode = self.opcode;
        wire.reserved = [0; 3];
        wire.challenge = U32::new(self.challenge);
        wire.response = U32::new(self.response);
        wire.contents = self.contents;
    }
}

/// Frame received from a peer.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct InboundFrame {
    opcode: u8,
    challenge: u32,
    response: u32,
    contents: [u8; MAX_CONTENTS_SIZE],
}

impl InboundFrame {
    /// Decode a frame. Bytes missing after the header read as zero.
    pub fn decode(bytes: &[u8]) -> ApResult<Self> {
        if bytes.len() < FRAME_HEADER_SIZE {
            return Err(ApError::CHANNEL_FRAME_TOO_SHORT);
        }
        if bytes.len() > FRAME_SIZE {
            return Err(ApError::CHANNEL_PAYLOAD_TOO_LARGE);
        }

        let mut wire = FrameWire::new_zeroed();
        wire.as_mut_bytes()[..bytes.len()].copy_from_slice(bytes);
        let opcode = Opcode::try_from(wire.opcode);

        let frame = Self {
            opcode: wire.opcode,
            challenge: wire.challenge.get(),
            response: wire.response.get(),
            contents: wire.contents,
        };
        wire.as_mut_bytes().zeroize();

        opcode.map(|_| frame)
    }

    pub fn opcode(&self) -> Opcode {
        // Checked at decode time.
        Opcode::try_from(self.opcode).unwrap_or(Opcode::None)
    }

    pub fn challenge(&self) -> u32 {
        self.challenge
    }

    pub fn response(&self) -> u32 {
        self.response
    }

    pub fn contents(&self) -> &[u8] {
        &self.contents
    }

    /// Little-endian word at the start of the contents.
    pub fn word(&self) -> u32 {
        u32::from_le_bytes([
            self.contents[0],
            self.contents[1],
            self.contents[2],
            self.contents[3],
        ])
    }

    /// Payload of a length-prefixed frame.
    pub fn len_prefixed(&self) -> ApResult<&[u8]> {
        let len = self.contents[0] as usize;
        if len > MAX_SECURE_PAYLOAD {
            return Err(ApError::CHANNEL_PAYLOAD_TOO_LARGE);
        }
        Ok(&self.contents[1..=len])
    }

    /// Text field of at most `max_len` bytes at `offset`, cut at the first NUL.
    pub fn text_field(&self, offset: usize, max_len: usize) -> &[u8] {
        let end = core::cmp::min(offset + max_len, MAX_CONTENTS_SIZE);
        let field = self.contents.get(offset..end).unwrap_or(&[]);
        match field.iter().position(|&b| b == 0) {
            Some(nul) => &field[..nul],
            None => field,
        }
    }
}
