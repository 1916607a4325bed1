// Licensed under the Apache-2.0 license

use ap_drivers::memory_layout::FLASH_RECORD_ORG;
use ap_drivers::{BoardLink, Console, Delay, Flash, I2cAddr, Led, Trng};
use ap_error::ApResult;
use zeroize::Zeroize;

use crate::channel::SecureChannel;
use crate::flash_store::{CredentialStore, LoadOutcome};
use crate::host_debug;
use crate::params::ProvisioningParams;

/// Board the firmware runs on.
pub trait ApPlatform: Sized {
    type Link: BoardLink;
    type Flash: Flash;
    type Trng: Trng;
    type Delay: Delay;
    type Led: Led;
    type Console: Console;

    /// Entered once every provisioned component has booted.
    fn post_boot(drivers: &mut Drivers<Self>) -> !;
}

/// Raw peripherals handed to `Drivers::init`.
pub struct Peripherals<P: ApPlatform> {
    pub link: P::Link,
    pub flash: P::Flash,
    pub trng: P::Trng,
    pub delay: P::Delay,
    pub led: P::Led,
    pub console: P::Console,
}

pub struct Drivers<P: ApPlatform> {
    pub channel: SecureChannel<P::Link>,
    pub store: CredentialStore<P::Flash>,
    pub trng: P::Trng,
    pub delay: P::Delay,
    pub led: P::Led,
    pub console: P::Console,
    pub params: ProvisioningParams,
}

impl<P: ApPlatform> Drivers<P> {
    /// Bring up the drivers and load the component record, reprovisioning
    /// it from `params` if it does not verify.
    pub fn init(peripherals: Peripherals<P>, mut params: ProvisioningParams) -> ApResult<Self> {
        params.validate()?;

        let Peripherals {
            link,
            flash,
            mut trng,
            delay,
            led,
            mut console,
        } = peripherals;

        let mut store = CredentialStore::new(
            flash,
            FLASH_RECORD_ORG,
            &params.flash_key,
            params.flash_magic,
        );
        params.flash_key.zeroize();

        if let LoadOutcome::Reprovisioned(_) =
            store.load_and_verify(&mut trng, params.component_ids)?
        {
            host_debug!(&mut console, "Failed to verify flash integrity, resetting flash!");
        }

        Ok(Self {
            channel: SecureChannel::new(link),
            store,
            trng,
            delay,
            led,
            console,
            params,
        })
    }

    /// Ids the AP is currently provisioned for.
    pub fn provisioned_ids(&self) -> &[u32] {
        self.store.component_ids().as_slice()
    }

    /// Send up to 64 bytes to the booted component at `addr`.
    pub fn secure_send(&mut self, addr: u8, buf: &[u8]) -> ApResult<()> {
        let addr = I2cAddr::new(addr)?;
        self.channel.secure_send(&mut self.trng, addr, buf)
    }

    /// Receive up to 64 bytes from the booted component at `addr`.
    pub fn secure_receive(&mut self, addr: u8, buf: &mut [u8]) -> ApResult<usize> {
        let addr = I2cAddr::new(addr)?;
        self.channel.secure_receive(&mut self.trng, addr, buf)
    }
}
