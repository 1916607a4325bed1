/*++

Licensed under the Apache-2.0 license.

File Name:

    attest.rs

Abstract:

    File contains the attest command: PIN gated retrieval of a component's
    attestation data.

--*/

use ap_api::{
    Opcode, OutboundFrame, ATTEST_CUST_OFFSET, ATTEST_DATE_OFFSET, ATTEST_FIELD_SIZE,
    ATTEST_LOC_OFFSET,
};
use ap_drivers::{component_id_to_i2c_addr, HexU32};
use ap_error::{ApError, ApResult};

use crate::credential::Credential;
use crate::host_messaging::{printable, read_component_id};
use crate::{host_error, host_info, host_success, ApPlatform, Drivers};

pub struct AttestCmd;
impl AttestCmd {
    pub(crate) fn execute<P: ApPlatform>(drivers: &mut Drivers<P>) -> ApResult<()> {
        Credential::Pin.check(drivers)?;
        let id = read_component_id(&mut drivers.console, "Component ID: ")?;
        Self::attest_component(drivers, id)
    }

    /// Fetch and print the attestation data of provisioned component `id`.
    pub(crate) fn attest_component<P: ApPlatform>(
        drivers: &mut Drivers<P>,
        id: u32,
    ) -> ApResult<()> {
        if !drivers.store.component_ids().contains(id) {
            host_error!(
                &mut drivers.console,
                "Cannot attest non-provisioned component"
            );
            return Err(ApError::ATTEST_NOT_PROVISIONED);
        }

        drivers.channel.reset();
        let first = component_id_to_i2c_addr(id).and_then(|addr| {
            drivers
                .channel
                .issue_cmd(&mut drivers.trng, addr, OutboundFrame::new(Opcode::Attest))
                .map(|_| addr)
        });
        let addr = match first {
            Ok(addr) => addr,
            Err(err) => {
                host_error!(&mut drivers.console, "Failed to validate component");
                return Err(err);
            }
        };

        let reply =
            match drivers
                .channel
                .issue_cmd(&mut drivers.trng, addr, OutboundFrame::new(Opcode::Attest))
            {
                Ok(reply) => reply,
                Err(err) => {
                    host_error!(&mut drivers.console, "Failed to retrieve attestation data");
                    return Err(err);
                }
            };

        let loc = printable(reply.text_field(ATTEST_LOC_OFFSET, ATTEST_FIELD_SIZE));
        let date = printable(reply.text_field(ATTEST_DATE_OFFSET, ATTEST_FIELD_SIZE));
        let cust = printable(reply.text_field(ATTEST_CUST_OFFSET, ATTEST_FIELD_SIZE));

        let console = &mut drivers.console;
        host_info!(&mut *console, "C>{}", HexU32(id));
        host_info!(&mut *console, "LOC>{}", loc);
        host_info!(&mut *console, "DATE>{}", date);
        host_info!(&mut *console, "CUST>{}", cust);
        host_success!(&mut *console, "Attest");
        Ok(())
    }
}
