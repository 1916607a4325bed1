/*++

Licensed under the Apache-2.0 license.

File Name:

    replace.rs

Abstract:

    File contains the replace command: token gated swap of one provisioned
    component id for another.

--*/

use ap_drivers::{cprintln, HexU32};
use ap_error::{ApError, ApResult};

use crate::credential::Credential;
use crate::host_messaging::read_component_id;
use crate::{host_debug, host_error, host_success, ApPlatform, Drivers};

pub struct ReplaceCmd;
impl ReplaceCmd {
    pub(crate) fn execute<P: ApPlatform>(drivers: &mut Drivers<P>) -> ApResult<()> {
        Credential::Token.check(drivers)?;
        let incoming = read_component_id(&mut drivers.console, "Component ID In: ")?;
        let outgoing = read_component_id(&mut drivers.console, "Component ID Out: ")?;
        Self::replace_component(drivers, incoming, outgoing)
    }

    /// Put `incoming` in the slot held by `outgoing` and persist the list.
    /// Storage is untouched unless the swap is allowed.
    pub(crate) fn replace_component<P: ApPlatform>(
        drivers: &mut Drivers<P>,
        incoming: u32,
        outgoing: u32,
    ) -> ApResult<()> {
        let mut ids = *drivers.store.component_ids();
        if let Err(err) = ids.replace(outgoing, incoming) {
            if err == ApError::REPLACE_ALREADY_PROVISIONED {
                host_error!(
                    &mut drivers.console,
                    "Component {} is already provisioned!",
                    HexU32(incoming)
                );
            } else {
                host_error!(
                    &mut drivers.console,
                    "Component {} is not provisioned for the system",
                    HexU32(outgoing)
                );
            }
            return Err(err);
        }

        if let Err(err) = drivers.store.save(&mut drivers.trng, &ids) {
            cprintln!("[replace] Save failed {}", u32::from(err));
            host_error!(&mut drivers.console, "Failed to store component list");
            return Err(err);
        }

        host_debug!(
            &mut drivers.console,
            "Replaced {} with {}",
            HexU32(outgoing),
            HexU32(incoming)
        );
        host_success!(&mut drivers.console, "Replace");
        Ok(())
    }
}
