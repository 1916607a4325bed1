/*++

Licensed under the Apache-2.0 license.

File Name:

    lib.rs

Abstract:

    File contains API and macros used by the AP firmware for error handling

--*/
#![cfg_attr(not(feature = "std"), no_std)]
use core::convert::From;
use core::num::{NonZeroU32, TryFromIntError};

/// Application Processor Error Type
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct ApError(pub NonZeroU32);

/// Broad classes of failure. Every class is recoverable: the command loop
/// always regains control.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum ErrorKind {
    /// Flash, TRNG or console driver fault
    Driver,

    /// A bus exchange did not complete
    Transport,

    /// Stored record digest, magic or count is invalid
    Integrity,

    /// A peer returned an unexpected identity or status
    Validation,

    /// PIN or token mismatch
    Credential,

    /// Oversized payload, unparseable identifier, unknown command
    MalformedInput,

    /// Code outside any known group
    Unknown,
}

/// Macro to define error constants ensuring uniqueness
///
/// This macro takes a list of (name, value, doc) tuples and generates
/// constant definitions for each error code.
#[macro_export]
macro_rules! define_error_constants {
    ($(($name:ident, $value:expr, $doc:expr)),* $(,)?) => {
        $(
            #[doc = $doc]
            pub const $name: ApError = ApError::new_const($value);
        )*

        #[cfg(test)]
        /// Returns a vector of all defined error constants for testing uniqueness
        pub fn all_constants() -> Vec<(&'static str, u32)> {
            vec![
                $(
                    (stringify!($name), $value),
                )*
            ]
        }
    };
}

impl ApError {
    /// Create an AP error; intended to only be used from const contexts, as we don't want
    /// runtime panics if val is zero. Use `ApError::try_from()` for runtime values.
    const fn new_const(val: u32) -> Self {
        match NonZeroU32::new(val) {
            Some(val) => Self(val),
            None => panic!("ApError cannot be 0"),
        }
    }

    define_error_constants![
        (
            DRIVER_FLASH_OUT_OF_BOUNDS,
            0x00010001,
            "Driver Error: flash access outside of device"
        ),
        (
            DRIVER_FLASH_UNALIGNED_ERASE,
            0x00010002,
            "Driver Error: flash erase address not page aligned"
        ),
        (
            DRIVER_FLASH_IO,
            0x00010004,
            "Driver Error: flash backing store I/O failure"
        ),
        (
            DRIVER_TRNG_FAILURE,
            0x00010005,
            "Driver Error: TRNG failed to produce entropy"
        ),
        (
            DRIVER_CONSOLE_READ_FAILURE,
            0x00010006,
            "Driver Error: console line could not be read"
        ),
        (
            BUS_TRANSMIT_FAILURE,
            0x00020001,
            "Transport Error: bus transmit did not complete"
        ),
        (
            BUS_RECEIVE_FAILURE,
            0x00020002,
            "Transport Error: bus receive did not complete"
        ),
        (
            BUS_ADDRESS_RESERVED,
            0x00020004,
            "Transport Error: component id maps to a reserved or out of range address"
        ),
        (
            CHANNEL_RESPONSE_MISMATCH,
            0x00020005,
            "Transport Error: peer response does not answer our challenge"
        ),
        (
            STORE_DIGEST_MISMATCH,
            0x00030001,
            "Integrity Error: stored record digest mismatch"
        ),
        (
            STORE_MAGIC_MISMATCH,
            0x00030002,
            "Integrity Error: stored record magic mismatch"
        ),
        (
            STORE_COUNT_INVALID,
            0x00030003,
            "Integrity Error: stored record identity count out of range"
        ),
        (
            VALIDATE_ID_MISMATCH,
            0x00040001,
            "Validation Error: component returned unexpected id"
        ),
        (
            VALIDATE_FAILED,
            0x00040002,
            "Validation Error: one or more components failed validation"
        ),
        (
            BOOT_COMPONENT_REFUSED,
            0x00040003,
            "Validation Error: component did not acknowledge boot"
        ),
        (
            BOOT_FAILED,
            0x00040004,
            "Validation Error: one or more components failed to boot"
        ),
        (
            ATTEST_NOT_PROVISIONED,
            0x00040005,
            "Validation Error: attestation requested for non-provisioned component"
        ),
        (
            REPLACE_ALREADY_PROVISIONED,
            0x00040006,
            "Validation Error: incoming component is already provisioned"
        ),
        (
            REPLACE_NOT_PROVISIONED,
            0x00040007,
            "Validation Error: outgoing component is not provisioned"
        ),
        (
            CREDENTIAL_PIN_MISMATCH,
            0x00050001,
            "Credential Error: invalid PIN"
        ),
        (
            CREDENTIAL_TOKEN_MISMATCH,
            0x00050002,
            "Credential Error: invalid replacement token"
        ),
        (
            INPUT_INVALID_HEX,
            0x00060001,
            "Malformed Input: identifier is not valid hex"
        ),
        (
            INPUT_UNRECOGNIZED_COMMAND,
            0x00060002,
            "Malformed Input: unrecognized command"
        ),
        (
            CHANNEL_PAYLOAD_TOO_LARGE,
            0x00060003,
            "Malformed Input: declared payload length exceeds limit"
        ),
        (
            CHANNEL_FRAME_TOO_SHORT,
            0x00060004,
            "Malformed Input: frame shorter than header"
        ),
        (
            CHANNEL_INVALID_OPCODE,
            0x00060005,
            "Malformed Input: frame carries unknown opcode"
        ),
        (
            CHANNEL_BUFFER_TOO_SMALL,
            0x00060006,
            "Malformed Input: receive buffer smaller than declared payload"
        ),
        (
            PARAMS_INVALID,
            0x00060007,
            "Malformed Input: provisioning parameters out of range"
        ),
        (
            STORE_ID_LIST_FULL,
            0x00060008,
            "Malformed Input: more than 32 component ids"
        ),
    ];

    /// Failure class of this error, derived from the code's group.
    pub fn kind(&self) -> ErrorKind {
        match self.0.get() >> 16 {
            0x0001 => ErrorKind::Driver,
            0x0002 => ErrorKind::Transport,
            0x0003 => ErrorKind::Integrity,
            0x0004 => ErrorKind::Validation,
            0x0005 => ErrorKind::Credential,
            0x0006 => ErrorKind::MalformedInput,
            _ => ErrorKind::Unknown,
        }
    }
}

impl From<core::num::NonZeroU32> for crate::ApError {
    fn from(val: core::num::NonZeroU32) -> Self {
        crate::ApError(val)
    }
}

impl From<ApError> for core::num::NonZeroU32 {
    fn from(val: ApError) -> Self {
        val.0
    }
}

impl From<ApError> for u32 {
    fn from(val: ApError) -> Self {
        core::num::NonZeroU32::from(val).get()
    }
}

impl TryFrom<u32> for ApError {
    type Error = TryFromIntError;
    fn try_from(val: u32) -> Result<Self, TryFromIntError> {
        NonZeroU32::try_from(val).map(ApError)
    }
}

pub type ApResult<T> = Result<T, ApError>;
