/*++

Licensed under the Apache-2.0 license.

File Name:

    lib.rs

Abstract:

    File contains exports for the AP driver library.

--*/

#![cfg_attr(not(feature = "std"), no_std)]

mod board_link;
mod console;
mod crypto;
mod flash;
mod led;
pub mod memory_layout;
pub mod printer;
mod timer;
mod trng;

pub use ap_error::{ApError, ApResult, ErrorKind};
pub use board_link::{
    component_id_to_i2c_addr, scan_addresses, BoardLink, I2cAddr, I2C_ADDR_MAX, I2C_ADDR_MIN,
    I2C_RESERVED_ADDRS,
};
pub use console::Console;
pub use crypto::{constant_time_eq, Aes256Ctr, Sha256, AES_256_KEY_SIZE, AES_IV_SIZE, SHA256_DIGEST_SIZE};
pub use flash::{Flash, MemFlash};
pub use led::{Led, LedId};
pub use printer::HexU32;
pub use timer::Delay;
pub use trng::{uniform_u32, Trng};
