// Licensed under the Apache-2.0 license

use ap_drivers::LedId;
use ap_error::ApError;
use ap_hw_model::{LedEvent, SimComponent};
use ap_runtime::credential::{LOCKOUT_DELAY_US, RANDOM_DELAY_MAX_US, RANDOM_DELAY_MIN_US};
use ap_runtime::CommandOutcome;

use crate::common::*;

fn prompt(msg: &str) -> String {
    [debug(msg), "%ack%\n\n".to_string()].concat()
}

#[test]
fn test_attest_success() {
    let mut drivers = provisioned_board(TWO_COMPONENTS);
    let bus = drivers.channel.link_mut();
    bus.detach(COMPONENT_B);
    bus.attach(SimComponent::new(COMPONENT_B).with_attestation(
        "McLean",
        "08/08/08",
        "Fritz",
    ));

    let (result, output) = run_command(&mut drivers, "attest", &[TEST_PIN, "0x11111125"]);
    assert_eq!(result, Ok(CommandOutcome::Completed));
    assert_eq!(
        output,
        [
            prompt("Enter pin: "),
            debug("Pin Accepted!"),
            prompt("Component ID: "),
            info("C>0x11111125"),
            info("LOC>McLean"),
            info("DATE>08/08/08"),
            info("CUST>Fritz"),
            success("Attest"),
        ]
        .concat()
    );

    let delays = drivers.delay.log();
    assert_eq!(delays.len(), 1);
    assert!((RANDOM_DELAY_MIN_US..=RANDOM_DELAY_MAX_US).contains(&delays[0]));
}

#[test]
fn test_attest_field_truncated_at_64() {
    let long = "x".repeat(80);
    let mut drivers = provisioned_board(TWO_COMPONENTS);
    let bus = drivers.channel.link_mut();
    bus.detach(COMPONENT_A);
    bus.attach(SimComponent::new(COMPONENT_A).with_attestation(&long, "d", "c"));

    let (result, output) = run_command(&mut drivers, "attest", &[TEST_PIN, "11111124"]);
    assert_eq!(result, Ok(CommandOutcome::Completed));
    assert!(output.contains(&info(&format!("LOC>{}", "x".repeat(64)))));
    assert!(output.contains(&info("DATE>d")));
}

#[test]
fn test_attest_wrong_pin() {
    let mut drivers = provisioned_board(TWO_COMPONENTS);
    let (result, output) = run_command(&mut drivers, "attest", &["135791"]);
    assert_eq!(result, Err(ApError::CREDENTIAL_PIN_MISMATCH));
    assert_eq!(output, [prompt("Enter pin: "), error("Invalid PIN!")].concat());

    assert!(drivers.channel.link().log().is_empty());
    assert_eq!(
        drivers.led.events(),
        &[LedEvent::Off(LedId::Led3), LedEvent::On(LedId::Led3)]
    );
    assert_eq!(drivers.delay.log()[1], LOCKOUT_DELAY_US);
}

#[test]
fn test_attest_non_provisioned() {
    let mut drivers = provisioned_board(TWO_COMPONENTS);
    drivers
        .channel
        .link_mut()
        .attach(SimComponent::new(COMPONENT_C));

    let (result, output) = run_command(&mut drivers, "attest", &[TEST_PIN, "0x11111126"]);
    assert_eq!(result, Err(ApError::ATTEST_NOT_PROVISIONED));
    assert!(output.ends_with(&error("Cannot attest non-provisioned component")));
    assert!(drivers.channel.link().log().is_empty());
}

#[test]
fn test_attest_invalid_id() {
    let mut drivers = provisioned_board(TWO_COMPONENTS);
    let (result, output) = run_command(&mut drivers, "attest", &[TEST_PIN, "component"]);
    assert_eq!(result, Err(ApError::INPUT_INVALID_HEX));
    assert!(output.ends_with(&error("Invalid component ID 'component'")));
    assert!(drivers.channel.link().log().is_empty());
}

#[test]
fn test_attest_missing_component() {
    let mut drivers = provisioned_board(TWO_COMPONENTS);
    drivers.channel.link_mut().detach(COMPONENT_A);

    let (result, output) = run_command(&mut drivers, "attest", &[TEST_PIN, "0x11111124"]);
    assert_eq!(result, Err(ApError::BUS_TRANSMIT_FAILURE));
    assert!(output.ends_with(&error("Failed to validate component")));
}

#[test]
fn test_attest_console_failure_reported() {
    let mut drivers = provisioned_board(TWO_COMPONENTS);
    let (result, output) = run_command(&mut drivers, "attest", &[TEST_PIN]);
    assert_eq!(result, Err(ApError::DRIVER_CONSOLE_READ_FAILURE));
    assert_eq!(
        output,
        [
            prompt("Enter pin: "),
            debug("Pin Accepted!"),
            prompt("Component ID: "),
            error("Failed to read component ID"),
        ]
        .concat()
    );
    assert!(drivers.channel.link().log().is_empty());
}
