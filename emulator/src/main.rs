/*++

Licensed under the Apache-2.0 license.

File Name:

    main.rs

Abstract:

    File contains main entrypoint for the Application Processor emulator.

--*/

use std::path::PathBuf;
use std::process::exit;

use ap_drivers::memory_layout::{FLASH_PAGE_SIZE, FLASH_RECORD_ORG};
use ap_hw_model::{FileFlash, OsTrng, SimBus, SimComponent, StdDelay};
use ap_runtime::host_messaging::parse_component_id;
use ap_runtime::{Drivers, Peripherals, ProvisioningParams};
use clap::{arg, value_parser, ArgAction};

mod platform;
use platform::{EmuPlatform, StdConsole, TerminalLed};

/// The record page and the page above it.
const EMU_FLASH_SIZE: usize = 2 * FLASH_PAGE_SIZE as usize;

fn parse_id(s: &str) -> Result<u32, String> {
    parse_component_id(s.as_bytes()).map_err(|_| format!("'{s}' is not a hex component id"))
}

fn leak(s: &str) -> &'static str {
    Box::leak(s.to_owned().into_boxed_str())
}

fn main() {
    let args = clap::Command::new("ap-emu")
        .about("Application Processor emulator")
        .arg(
            arg!(--flash <FILE> "Flash image file, created on first use")
                .required(false)
                .value_parser(value_parser!(PathBuf)),
        )
        .arg(
            arg!(--component <ID> "Component present on the bus (repeatable)")
                .required(false)
                .action(ArgAction::Append)
                .value_parser(parse_id),
        )
        .arg(
            arg!(--provision <ID> "Component the AP is provisioned for (repeatable)")
                .required(false)
                .action(ArgAction::Append)
                .value_parser(parse_id),
        )
        .arg(arg!(--pin <PIN> "Attestation PIN").required(false))
        .arg(arg!(--token <TOKEN> "Replacement token").required(false))
        .arg(arg!(--boot-msg <MSG> "AP boot message").required(false))
        .arg(arg!(--erase "Erase the flash image before booting").action(ArgAction::SetTrue))
        .get_matches();

    let mut params = ProvisioningParams::build_defaults();
    if let Some(pin) = args.get_one::<String>("pin") {
        params.pin = leak(pin);
    }
    if let Some(token) = args.get_one::<String>("token") {
        params.token = leak(token);
    }
    if let Some(msg) = args.get_one::<String>("boot-msg") {
        params.boot_msg = leak(msg);
    }
    if let Some(ids) = args.get_many::<u32>("provision") {
        params.component_ids = Vec::leak(ids.copied().collect());
    }
    if params.validate().is_err() {
        eprintln!("Provisioning parameters are invalid");
        exit(-1);
    }

    // Without an explicit bus population every provisioned component answers.
    let present: Vec<u32> = match args.get_many::<u32>("component") {
        Some(ids) => ids.copied().collect(),
        None => params.component_ids.to_vec(),
    };
    let bus = present
        .into_iter()
        .fold(SimBus::new(), |bus, id| bus.with_component(SimComponent::new(id)));

    let mut flash = match args.get_one::<PathBuf>("flash") {
        Some(path) => match FileFlash::open(path, FLASH_RECORD_ORG, EMU_FLASH_SIZE) {
            Ok(flash) => flash,
            Err(_) => {
                eprintln!("Flash image {:?} could not be read", path);
                exit(-1);
            }
        },
        None => FileFlash::in_memory(FLASH_RECORD_ORG, EMU_FLASH_SIZE),
    };
    if args.get_flag("erase") {
        flash.image_mut().fill(0xff);
    }

    let peripherals = Peripherals::<EmuPlatform> {
        link: bus,
        flash,
        trng: OsTrng,
        delay: StdDelay,
        led: TerminalLed,
        console: StdConsole,
    };
    let mut drivers = match Drivers::init(peripherals, params) {
        Ok(drivers) => drivers,
        Err(err) => {
            eprintln!("AP initialization failed: 0x{:08x}", u32::from(err));
            exit(-1);
        }
    };

    ap_runtime::run(&mut drivers);
}
