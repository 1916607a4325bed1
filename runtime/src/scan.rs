/*++

Licensed under the Apache-2.0 license.

File Name:

    scan.rs

Abstract:

    File contains the list command: provisioned ids and bus scan.

--*/

use ap_api::{Opcode, OutboundFrame};
use ap_drivers::{scan_addresses, HexU32};
use ap_error::ApResult;

use crate::{host_info, host_success, ApPlatform, Drivers};

pub struct ScanCmd;
impl ScanCmd {
    /// Print every provisioned id, then every id found on the bus.
    /// Absent addresses are skipped silently.
    pub(crate) fn execute<P: ApPlatform>(drivers: &mut Drivers<P>) -> ApResult<()> {
        for id in drivers.store.component_ids().as_slice() {
            host_info!(&mut drivers.console, "P>{}", HexU32(*id));
        }

        for addr in scan_addresses() {
            drivers.channel.reset();
            let reply =
                drivers
                    .channel
                    .issue_cmd(&mut drivers.trng, addr, OutboundFrame::new(Opcode::Scan));
            if let Ok(reply) = reply {
                host_info!(&mut drivers.console, "F>{}", HexU32(reply.word()));
            }
        }

        host_success!(&mut drivers.console, "List");
        Ok(())
    }
}
