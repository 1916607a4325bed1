/*++

Licensed under the Apache-2.0 license.

File Name:

    params.rs

Abstract:

    File contains the provisioning parameters baked in at build time.

--*/

use ap_api::BOOT_MSG_SIZE;
use ap_drivers::AES_256_KEY_SIZE;
use ap_error::{ApError, ApResult};
use zeroize::Zeroizing;

use crate::flash_store::MAX_COMPONENTS;

mod generated {
    include!(concat!(env!("OUT_DIR"), "/ap_params.rs"));
}

/// Length of the attestation PIN.
pub const AP_PIN_LEN: usize = 6;

/// Length of the replacement token.
pub const AP_TOKEN_LEN: usize = 16;

/// Secrets and initial state the device is provisioned with.
///
/// Intentionally not `Debug`.
#[derive(Clone)]
pub struct ProvisioningParams {
    pub pin: &'static str,
    pub token: &'static str,
    pub boot_msg: &'static str,
    pub component_ids: &'static [u32],
    pub flash_magic: u32,
    /// Cleared by `Drivers::init` once the store holds its own copy.
    pub flash_key: Zeroizing<[u8; AES_256_KEY_SIZE]>,
}

impl ProvisioningParams {
    /// Values generated from the build environment.
    pub fn build_defaults() -> Self {
        Self {
            pin: generated::AP_PIN,
            token: generated::AP_TOKEN,
            boot_msg: generated::AP_BOOT_MSG,
            component_ids: generated::COMPONENT_IDS,
            flash_magic: generated::FLASH_MAGIC,
            flash_key: Zeroizing::new(generated::FLASH_KEY),
        }
    }

    pub fn validate(&self) -> ApResult<()> {
        if self.pin.len() != AP_PIN_LEN
            || self.token.len() != AP_TOKEN_LEN
            || self.boot_msg.len() > BOOT_MSG_SIZE
            || self.component_ids.len() > MAX_COMPONENTS
        {
            return Err(ApError::PARAMS_INVALID);
        }
        Ok(())
    }
}
