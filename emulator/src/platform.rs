/*++

Licensed under the Apache-2.0 license.

File Name:

    platform.rs

Abstract:

    File contains the host-side peripherals the emulated AP runs against.

--*/

use std::convert::Infallible;
use std::io::{self, BufRead, Write};
use std::process::exit;

use ap_api::MAX_SECURE_PAYLOAD;
use ap_drivers::{component_id_to_i2c_addr, cprintln, Console, HexU32, Led, LedId};
use ap_error::{ApError, ApResult};
use ap_hw_model::{copy_line, FileFlash, OsTrng, SimBus, StdDelay};
use ap_runtime::{host_error, host_info, ApPlatform, Drivers};
use ufmt::uWrite;

/// Greeting each component receives once the system is up.
const POST_BOOT_GREETING: &[u8] = b"AP post-boot hello";

pub struct EmuPlatform;

impl ApPlatform for EmuPlatform {
    type Link = SimBus;
    type Flash = FileFlash;
    type Trng = OsTrng;
    type Delay = StdDelay;
    type Led = TerminalLed;
    type Console = StdConsole;

    fn post_boot(drivers: &mut Drivers<Self>) -> ! {
        drivers.led.on(LedId::Led2);

        let ids = *drivers.store.component_ids();
        for &id in ids.as_slice() {
            let Ok(addr) = component_id_to_i2c_addr(id) else {
                continue;
            };
            let addr = addr.get();
            if drivers.secure_send(addr, POST_BOOT_GREETING).is_err() {
                host_error!(&mut drivers.console, "Secure send to {} failed", HexU32(id));
                continue;
            }

            let mut buf = [0u8; MAX_SECURE_PAYLOAD];
            match drivers.secure_receive(addr, &mut buf) {
                Ok(len) => host_info!(
                    &mut drivers.console,
                    "{}>secure {} bytes",
                    HexU32(id),
                    len
                ),
                Err(_) => {
                    host_error!(&mut drivers.console, "Secure receive from {} failed", HexU32(id))
                }
            }
        }
        exit(0);
    }
}

/// Operator console on stdin/stdout. End of input powers the board off.
#[derive(Default)]
pub struct StdConsole;

impl uWrite for StdConsole {
    type Error = Infallible;

    fn write_str(&mut self, s: &str) -> Result<(), Infallible> {
        let mut out = io::stdout().lock();
        let _ = out.write_all(s.as_bytes());
        let _ = out.flush();
        Ok(())
    }
}

impl Console for StdConsole {
    fn read_line(&mut self, buf: &mut [u8]) -> ApResult<usize> {
        let mut line = String::new();
        match io::stdin().lock().read_line(&mut line) {
            Ok(0) => {
                cprintln!("[emu] Console closed");
                exit(0);
            }
            Ok(_) => {
                let line = line.trim_end_matches(&['\r', '\n'][..]);
                Ok(copy_line(line.as_bytes(), buf))
            }
            Err(_) => Err(ApError::DRIVER_CONSOLE_READ_FAILURE),
        }
    }
}

/// Status LEDs reported on the debug log.
#[derive(Default)]
pub struct TerminalLed;

impl TerminalLed {
    fn report(led: LedId, state: &str) {
        let n: u8 = match led {
            LedId::Led1 => 1,
            LedId::Led2 => 2,
            LedId::Led3 => 3,
        };
        cprintln!("[led] LED{} {}", n, state);
    }
}

impl Led for TerminalLed {
    fn on(&mut self, led: LedId) {
        Self::report(led, "on");
    }

    fn off(&mut self, led: LedId) {
        Self::report(led, "off");
    }
}
