/*++

Licensed under the Apache-2.0 license.

File Name:

    boot.rs

Abstract:

    File contains the boot command: validate every provisioned component,
    then instruct each to boot or abort.

--*/

use ap_api::{Opcode, OutboundFrame, BOOT_ABORT, BOOT_MSG_OFFSET, BOOT_MSG_SIZE, BOOT_PROCEED};
use ap_drivers::{component_id_to_i2c_addr, cprintln, HexU32};
use ap_error::{ApError, ApResult};
use zeroize::Zeroizing;

use crate::flash_store::MAX_COMPONENTS;
use crate::host_messaging::printable;
use crate::{host_error, host_info, host_success, ApPlatform, Drivers};

/// Challenge each component returned from its final validate round, by
/// position in the provisioned list.
type ChallengeCache = Zeroizing<[u32; MAX_COMPONENTS]>;

pub struct BootCmd;
impl BootCmd {
    /// Returns `Ok` only if every component validated and booted; the caller
    /// then hands control to the post-boot hook.
    pub(crate) fn execute<P: ApPlatform>(drivers: &mut Drivers<P>) -> ApResult<()> {
        let mut challenges: ChallengeCache = Zeroizing::new([0; MAX_COMPONENTS]);

        let validated = Self::validate_components(drivers, &mut challenges);
        let booted = Self::boot_components(drivers, &challenges, validated.is_ok());

        match validated.and(booted) {
            Ok(()) => {
                let boot_msg = drivers.params.boot_msg;
                host_info!(&mut drivers.console, "AP>{}", boot_msg);
                host_success!(&mut drivers.console, "Boot");
                drivers.channel.reset();
                Ok(())
            }
            Err(err) => {
                host_error!(&mut drivers.console, "Boot Failed");
                Err(err)
            }
        }
    }

    /// Validate each component in turn. A failing component does not stop
    /// the others from being validated.
    fn validate_components<P: ApPlatform>(
        drivers: &mut Drivers<P>,
        challenges: &mut ChallengeCache,
    ) -> ApResult<()> {
        let ids = *drivers.store.component_ids();
        let mut result = Ok(());

        for (id, challenge) in ids.as_slice().iter().zip(challenges.iter_mut()) {
            if let Err(err) = Self::validate_component(drivers, *id, challenge) {
                cprintln!("[boot] Validate {} failed {}", HexU32(*id), u32::from(err));
                host_error!(&mut drivers.console, "Component ID: {} invalid", HexU32(*id));
                result = Err(ApError::VALIDATE_FAILED);
            }
        }
        result
    }

    /// Two validate rounds: the first proves the component answers our
    /// challenge, the second proves we answer the component's. The
    /// component's last challenge is kept for the boot round even if the id
    /// it reports is wrong, so it still receives the abort.
    fn validate_component<P: ApPlatform>(
        drivers: &mut Drivers<P>,
        id: u32,
        challenge: &mut u32,
    ) -> ApResult<()> {
        let addr = component_id_to_i2c_addr(id)?;

        drivers.channel.reset();
        drivers
            .channel
            .issue_cmd(&mut drivers.trng, addr, OutboundFrame::new(Opcode::Validate))?;
        let reply =
            drivers
                .channel
                .issue_cmd(&mut drivers.trng, addr, OutboundFrame::new(Opcode::Validate))?;

        *challenge = reply.challenge();
        if reply.word() != id {
            return Err(ApError::VALIDATE_ID_MISMATCH);
        }
        Ok(())
    }

    /// Send every component its boot instruction: proceed only if all
    /// validated, abort otherwise.
    fn boot_components<P: ApPlatform>(
        drivers: &mut Drivers<P>,
        challenges: &ChallengeCache,
        proceed: bool,
    ) -> ApResult<()> {
        let ids = *drivers.store.component_ids();
        let mut result = Ok(());

        for (id, challenge) in ids.as_slice().iter().zip(challenges.iter()) {
            if let Err(err) = Self::boot_component(drivers, *id, *challenge, proceed) {
                cprintln!("[boot] Boot {} failed {}", HexU32(*id), u32::from(err));
                host_error!(&mut drivers.console, "Could not boot component {}", HexU32(*id));
                result = Err(ApError::BOOT_FAILED);
            }
        }
        result
    }

    fn boot_component<P: ApPlatform>(
        drivers: &mut Drivers<P>,
        id: u32,
        challenge: u32,
        proceed: bool,
    ) -> ApResult<()> {
        let addr = component_id_to_i2c_addr(id)?;
        let instruction = if proceed { BOOT_PROCEED } else { BOOT_ABORT };

        drivers.channel.restore_peer_challenge(challenge);
        let reply = drivers.channel.issue_cmd(
            &mut drivers.trng,
            addr,
            OutboundFrame::new(Opcode::Boot).with_word(instruction),
        )?;
        if reply.word() != BOOT_PROCEED {
            return Err(ApError::BOOT_COMPONENT_REFUSED);
        }

        let msg = printable(reply.text_field(BOOT_MSG_OFFSET, BOOT_MSG_SIZE));
        host_info!(&mut drivers.console, "{}>{}", HexU32(id), msg);
        Ok(())
    }
}
