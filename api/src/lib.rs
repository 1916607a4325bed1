// Licensed under the Apache-2.0 license

#![cfg_attr(not(test), no_std)]

pub mod frame;

pub use ap_error as error;

pub use frame::{FrameWire, InboundFrame, Opcode, OutboundFrame};

/// Size of every bus transaction in bytes.
pub const FRAME_SIZE: usize = 256;

/// Opcode, reserved bytes, challenge and response.
pub const FRAME_HEADER_SIZE: usize = 12;

/// Bytes available for frame contents.
pub const MAX_CONTENTS_SIZE: usize = FRAME_SIZE - FRAME_HEADER_SIZE;

/// Maximum meaningful bytes in a length-prefixed post-boot payload.
pub const MAX_SECURE_PAYLOAD: usize = 64;

/// Boot instruction: component may finish booting.
pub const BOOT_PROCEED: u32 = 0;

/// Boot instruction: at least one component failed validation.
pub const BOOT_ABORT: u32 = u32::MAX;

/// Offset of the component boot message in a boot reply.
pub const BOOT_MSG_OFFSET: usize = 4;

/// Maximum length of a component boot message.
pub const BOOT_MSG_SIZE: usize = 64;

/// Width of each attestation text field.
pub const ATTEST_FIELD_SIZE: usize = 64;

/// Attestation fields are laid out at a 65 byte stride, leaving a NUL
/// separator after each field.
pub const ATTEST_LOC_OFFSET: usize = 0;
pub const ATTEST_DATE_OFFSET: usize = 65;
pub const ATTEST_CUST_OFFSET: usize = 130;

const _: () = assert!(ATTEST_CUST_OFFSET + ATTEST_FIELD_SIZE <= MAX_CONTENTS_SIZE);
const _: () = assert!(BOOT_MSG_OFFSET + BOOT_MSG_SIZE <= MAX_CONTENTS_SIZE);
const _: () = assert!(MAX_SECURE_PAYLOAD + 1 <= MAX_CONTENTS_SIZE);
