/*++

Licensed under the Apache-2.0 license.

File Name:

    lib.rs

Abstract:

    File contains exports for the AP runtime library and the operator
    command loop.

--*/
#![cfg_attr(not(feature = "std"), no_std)]

mod attest;
mod boot;
pub mod channel;
pub mod credential;
mod drivers;
pub mod flash_store;
pub mod host_messaging;
pub mod params;
mod replace;
mod scan;

pub use ap_error::{ApError, ApResult};
pub use attest::AttestCmd;
pub use boot::BootCmd;
pub use channel::{ResponseCheck, SecureChannel};
pub use credential::Credential;
pub use drivers::{ApPlatform, Drivers, Peripherals};
pub use flash_store::{ComponentIdList, CredentialStore, LoadOutcome, MAX_COMPONENTS};
pub use params::ProvisioningParams;
pub use replace::ReplaceCmd;
pub use scan::ScanCmd;

use ap_drivers::{cprintln, Delay, Led, LedId};
use host_messaging::{printable, recv_input};

/// Console line buffer for commands.
pub const COMMAND_INPUT_SIZE: usize = 100;

/// Pause after a failed console read before prompting again.
pub const CONSOLE_RETRY_DELAY_US: u32 = 100_000;

/// What the command loop does after a command returns.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum CommandOutcome {
    /// Back to the prompt.
    Completed,

    /// Every component booted; control passes to the post-boot hook.
    Booted,
}

/// Run one operator command line.
///
/// Failures have already been reported to the host when this returns.
pub fn handle_command<P: ApPlatform>(
    drivers: &mut Drivers<P>,
    line: &[u8],
) -> ApResult<CommandOutcome> {
    drivers.channel.reset();

    match line {
        b"list" => ScanCmd::execute(drivers).map(|_| CommandOutcome::Completed),
        b"boot" => BootCmd::execute(drivers).map(|_| CommandOutcome::Booted),
        b"replace" => ReplaceCmd::execute(drivers).map(|_| CommandOutcome::Completed),
        b"attest" => AttestCmd::execute(drivers).map(|_| CommandOutcome::Completed),
        _ => {
            host_error!(
                &mut drivers.console,
                "Unrecognized command '{}'",
                printable(line)
            );
            Err(ApError::INPUT_UNRECOGNIZED_COMMAND)
        }
    }
}

/// Prompt for the next command line into `buf`.
///
/// A failed read is logged and followed by `CONSOLE_RETRY_DELAY_US` of
/// backoff so a dead console does not spin the loop.
pub fn read_command<P: ApPlatform>(
    drivers: &mut Drivers<P>,
    buf: &mut [u8],
) -> ApResult<usize> {
    buf.fill(0);
    recv_input(&mut drivers.console, "Enter Command: ", buf).map_err(|err| {
        cprintln!("[rt] Console read failed {}", u32::from(err));
        drivers.delay.delay_us(CONSOLE_RETRY_DELAY_US);
        err
    })
}

/// Operator command loop. Returns only through the post-boot hook.
pub fn run<P: ApPlatform>(drivers: &mut Drivers<P>) -> ! {
    host_info!(&mut drivers.console, "Application Processor Started");

    drivers.led.on(LedId::Led1);
    drivers.led.on(LedId::Led3);

    let mut buf = [0u8; COMMAND_INPUT_SIZE];
    loop {
        let Ok(len) = read_command(drivers, &mut buf) else {
            continue;
        };
        let line = buf.get(..len).unwrap_or(&[]);

        match handle_command(drivers, line) {
            Ok(CommandOutcome::Booted) => P::post_boot(drivers),
            Ok(CommandOutcome::Completed) => (),
            Err(err) => cprintln!("[rt] Command failed {}", u32::from(err)),
        }
    }
}
