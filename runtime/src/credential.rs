/*++

Licensed under the Apache-2.0 license.

File Name:

    credential.rs

Abstract:

    File contains the PIN and replacement token checks that gate attest
    and replace.

--*/

use ap_drivers::{cprintln, uniform_u32, Delay, Led, LedId};
use ap_error::{ApError, ApResult};
use subtle::ConstantTimeEq;
use zeroize::Zeroizing;

use crate::host_messaging::recv_input;
use crate::{host_debug, host_error, ApPlatform, Drivers};

/// Bounds of the random delay applied before every comparison.
pub const RANDOM_DELAY_MIN_US: u32 = 500_000;
pub const RANDOM_DELAY_MAX_US: u32 = 1_500_000;

/// Penalty after a failed check.
pub const LOCKOUT_DELAY_US: u32 = 4_000_000;

/// Console line buffer for secret entry.
pub const CREDENTIAL_INPUT_SIZE: usize = 50;

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Credential {
    /// Gates attest
    Pin,

    /// Gates replace
    Token,
}

impl Credential {
    fn prompt(self) -> &'static str {
        match self {
            Credential::Pin => "Enter pin: ",
            Credential::Token => "Enter token: ",
        }
    }

    fn secret<P: ApPlatform>(self, drivers: &Drivers<P>) -> &'static [u8] {
        match self {
            Credential::Pin => drivers.params.pin.as_bytes(),
            Credential::Token => drivers.params.token.as_bytes(),
        }
    }

    fn mismatch(self) -> ApError {
        match self {
            Credential::Pin => ApError::CREDENTIAL_PIN_MISMATCH,
            Credential::Token => ApError::CREDENTIAL_TOKEN_MISMATCH,
        }
    }

    /// Read the credential from the operator and compare it to the
    /// provisioned secret.
    ///
    /// Every attempt waits a random 0.5 to 1.5 s before the comparison. A
    /// failed attempt additionally holds LED3 off for the lockout period
    /// before the error is returned.
    pub fn check<P: ApPlatform>(self, drivers: &mut Drivers<P>) -> ApResult<()> {
        let mut buf = Zeroizing::new([0u8; CREDENTIAL_INPUT_SIZE]);
        let read = recv_input(&mut drivers.console, self.prompt(), &mut buf[..]);

        let delay = uniform_u32(&mut drivers.trng, RANDOM_DELAY_MIN_US, RANDOM_DELAY_MAX_US)
            .unwrap_or(RANDOM_DELAY_MAX_US);
        drivers.delay.delay_us(delay);

        let secret = self.secret(drivers);
        let len = read.unwrap_or(0);
        // The comparison always covers secret.len() bytes of the zero padded
        // buffer; the length test joins the same Choice.
        let len_ok = (len as u64).ct_eq(&(secret.len() as u64));
        let bytes_ok = match buf.get(..secret.len()) {
            Some(input) => input.ct_eq(secret),
            None => 0u8.ct_eq(&1u8),
        };

        if bool::from(len_ok & bytes_ok) {
            match self {
                Credential::Pin => host_debug!(&mut drivers.console, "Pin Accepted!"),
                Credential::Token => host_debug!(&mut drivers.console, "Token Accepted!"),
            }
            return Ok(());
        }

        match self {
            Credential::Pin => host_error!(&mut drivers.console, "Invalid PIN!"),
            Credential::Token => host_error!(&mut drivers.console, "Invalid Token!"),
        }
        Self::lockout(drivers);
        Err(self.mismatch())
    }

    fn lockout<P: ApPlatform>(drivers: &mut Drivers<P>) {
        cprintln!("[cred] Lockout");
        drivers.led.off(LedId::Led3);
        drivers.delay.delay_us(LOCKOUT_DELAY_US);
        drivers.led.on(LedId::Led3);
    }
}
