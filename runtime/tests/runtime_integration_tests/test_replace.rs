// Licensed under the Apache-2.0 license

use ap_drivers::LedId;
use ap_error::ApError;
use ap_hw_model::LedEvent;
use ap_runtime::CommandOutcome;

use crate::common::*;

#[test]
fn test_replace_in_place_and_persisted() {
    let mut drivers = provisioned_board(THREE_COMPONENTS);
    let (result, output) = run_command(
        &mut drivers,
        "replace",
        &[TEST_TOKEN, "0x11111127", "0x11111125"],
    );
    assert_eq!(result, Ok(CommandOutcome::Completed));
    assert_eq!(
        output,
        [
            debug("Enter token: "),
            "%ack%\n\n".into(),
            debug("Token Accepted!"),
            debug("Component ID In: "),
            "%ack%\n\n".into(),
            debug("Component ID Out: "),
            "%ack%\n\n".into(),
            debug("Replaced 0x11111125 with 0x11111127"),
            success("Replace"),
        ]
        .concat()
    );
    assert_eq!(
        drivers.provisioned_ids(),
        &[COMPONENT_A, COMPONENT_D, COMPONENT_C]
    );

    // Survives a power cycle.
    let mut rebooted = init_drivers(bus_with(&[]), copy_flash(&drivers), THREE_COMPONENTS);
    assert_eq!(rebooted.console.take_output(), "");
    assert_eq!(
        rebooted.provisioned_ids(),
        &[COMPONENT_A, COMPONENT_D, COMPONENT_C]
    );
}

#[test]
fn test_replace_incoming_already_provisioned() {
    let mut drivers = provisioned_board(THREE_COMPONENTS);
    let before = drivers.store.flash().contents().to_vec();

    let (result, output) = run_command(
        &mut drivers,
        "replace",
        &[TEST_TOKEN, "0x11111126", "0x11111125"],
    );
    assert_eq!(result, Err(ApError::REPLACE_ALREADY_PROVISIONED));
    assert!(output.ends_with(&error("Component 0x11111126 is already provisioned!")));
    assert_eq!(drivers.provisioned_ids(), THREE_COMPONENTS);
    assert_eq!(drivers.store.flash().contents(), &before[..]);
}

#[test]
fn test_replace_outgoing_not_provisioned() {
    let mut drivers = provisioned_board(THREE_COMPONENTS);
    let before = drivers.store.flash().contents().to_vec();

    let (result, output) = run_command(
        &mut drivers,
        "replace",
        &[TEST_TOKEN, "0x11111127", "0x11111128"],
    );
    assert_eq!(result, Err(ApError::REPLACE_NOT_PROVISIONED));
    assert!(output.ends_with(&error(
        "Component 0x11111128 is not provisioned for the system"
    )));
    assert_eq!(drivers.provisioned_ids(), THREE_COMPONENTS);
    assert_eq!(drivers.store.flash().contents(), &before[..]);
}

#[test]
fn test_replace_wrong_token() {
    let mut drivers = provisioned_board(THREE_COMPONENTS);
    let before = drivers.store.flash().contents().to_vec();

    let (result, output) = run_command(&mut drivers, "replace", &["a1b2c3d4e5f60719"]);
    assert_eq!(result, Err(ApError::CREDENTIAL_TOKEN_MISMATCH));
    assert!(output.ends_with(&error("Invalid Token!")));
    assert!(!output.contains("Component ID In"));
    assert_eq!(
        drivers.led.events(),
        &[LedEvent::Off(LedId::Led3), LedEvent::On(LedId::Led3)]
    );
    assert_eq!(drivers.store.flash().contents(), &before[..]);
}

#[test]
fn test_replace_invalid_id() {
    let mut drivers = provisioned_board(THREE_COMPONENTS);
    let (result, output) = run_command(&mut drivers, "replace", &[TEST_TOKEN, "0xzz"]);
    assert_eq!(result, Err(ApError::INPUT_INVALID_HEX));
    assert!(output.ends_with(&error("Invalid component ID '0xzz'")));
    assert!(!output.contains("Component ID Out"));
    assert_eq!(drivers.provisioned_ids(), THREE_COMPONENTS);
}

#[test]
fn test_replace_console_failure_reported() {
    let mut drivers = provisioned_board(THREE_COMPONENTS);
    let before = drivers.store.flash().contents().to_vec();

    let (result, output) = run_command(&mut drivers, "replace", &[TEST_TOKEN, "0x11111127"]);
    assert_eq!(result, Err(ApError::DRIVER_CONSOLE_READ_FAILURE));
    let tail: String = [
        debug("Component ID Out: "),
        "%ack%\n\n".into(),
        error("Failed to read component ID"),
    ]
    .concat();
    assert!(output.ends_with(&tail));
    assert_eq!(drivers.provisioned_ids(), THREE_COMPONENTS);
    assert_eq!(drivers.store.flash().contents(), &before[..]);
}
