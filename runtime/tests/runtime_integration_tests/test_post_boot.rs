// Licensed under the Apache-2.0 license

use ap_api::MAX_SECURE_PAYLOAD;
use ap_error::ApError;
use ap_hw_model::{Behavior, SimComponent};
use ap_runtime::{CommandOutcome, Drivers};

use crate::common::*;

const ADDR_A: u8 = 0x24;
const ADDR_B: u8 = 0x25;

fn booted_board() -> Drivers<SimPlatform> {
    let mut drivers = provisioned_board(TWO_COMPONENTS);
    let (result, _) = run_command(&mut drivers, "boot", &[]);
    assert_eq!(result, Ok(CommandOutcome::Booted));
    drivers.channel.link_mut().clear_log();
    drivers
}

#[test]
fn test_secure_send_and_receive() {
    let mut drivers = booted_board();

    drivers.secure_send(ADDR_A, b"hello component").unwrap();
    let component = drivers.channel.link().component(COMPONENT_A).unwrap();
    assert_eq!(component.inbox, vec![b"hello component".to_vec()]);

    // The simulated component echoes what it was sent.
    let mut buf = [0u8; MAX_SECURE_PAYLOAD];
    let len = drivers.secure_receive(ADDR_A, &mut buf).unwrap();
    assert_eq!(&buf[..len], b"hello component");
}

#[test]
fn test_secure_receive_queued_message() {
    let mut drivers = booted_board();
    drivers
        .channel
        .link_mut()
        .component_mut(COMPONENT_B)
        .unwrap()
        .queue_secure_message(&[0xa5; MAX_SECURE_PAYLOAD]);

    let mut buf = [0u8; 80];
    assert_eq!(
        drivers.secure_receive(ADDR_B, &mut buf),
        Ok(MAX_SECURE_PAYLOAD)
    );
    assert_eq!(&buf[..MAX_SECURE_PAYLOAD], &[0xa5; MAX_SECURE_PAYLOAD]);

    // Nothing else on offer.
    assert_eq!(
        drivers.secure_receive(ADDR_B, &mut buf),
        Err(ApError::BUS_RECEIVE_FAILURE)
    );
}

#[test]
fn test_secure_send_rejects_oversized_payload() {
    let mut drivers = booted_board();
    assert_eq!(
        drivers.secure_send(ADDR_A, &[0u8; MAX_SECURE_PAYLOAD + 1]),
        Err(ApError::CHANNEL_PAYLOAD_TOO_LARGE)
    );
    assert!(drivers.channel.link().log().is_empty());

    drivers.secure_send(ADDR_A, &[0u8; MAX_SECURE_PAYLOAD]).unwrap();
}

#[test]
fn test_secure_receive_buffer_too_small() {
    let mut drivers = booted_board();
    drivers
        .channel
        .link_mut()
        .component_mut(COMPONENT_A)
        .unwrap()
        .queue_secure_message(b"0123456789");

    let mut buf = [0u8; 4];
    assert_eq!(
        drivers.secure_receive(ADDR_A, &mut buf),
        Err(ApError::CHANNEL_BUFFER_TOO_SMALL)
    );
}

#[test]
fn test_secure_messaging_bad_address() {
    let mut drivers = booted_board();
    assert_eq!(
        drivers.secure_send(0x36, b"hi"),
        Err(ApError::BUS_ADDRESS_RESERVED)
    );
    assert_eq!(
        drivers.secure_send(0x7f, b"hi"),
        Err(ApError::BUS_ADDRESS_RESERVED)
    );
    assert_eq!(
        drivers.secure_send(0x30, b"hi"),
        Err(ApError::BUS_TRANSMIT_FAILURE)
    );
}

#[test]
fn test_secure_send_to_silent_component() {
    let mut drivers = booted_board();
    let bus = drivers.channel.link_mut();
    bus.detach(COMPONENT_B);
    bus.attach(SimComponent::new(COMPONENT_B).with_behavior(Behavior {
        silent: true,
        ..Default::default()
    }));

    assert_eq!(
        drivers.secure_send(ADDR_B, b"hi"),
        Err(ApError::BUS_RECEIVE_FAILURE)
    );
    assert!(drivers
        .channel
        .link()
        .component(COMPONENT_B)
        .unwrap()
        .inbox
        .is_empty());
}

#[test]
fn test_provisioned_ids() {
    let drivers = booted_board();
    assert_eq!(drivers.provisioned_ids(), TWO_COMPONENTS);
}

#[test]
fn test_secure_receive_rejects_oversized_length() {
    let mut drivers = provisioned_board(TWO_COMPONENTS);
    let bus = drivers.channel.link_mut();
    bus.detach(COMPONENT_A);
    bus.attach(SimComponent::new(COMPONENT_A).with_behavior(Behavior {
        echo_secure: true,
        secure_len_override: Some(MAX_SECURE_PAYLOAD as u8 + 1),
        ..Default::default()
    }));
    let (result, _) = run_command(&mut drivers, "boot", &[]);
    assert_eq!(result, Ok(CommandOutcome::Booted));

    drivers
        .channel
        .link_mut()
        .component_mut(COMPONENT_A)
        .unwrap()
        .queue_secure_message(b"abc");

    let mut buf = [0xee_u8; 128];
    assert_eq!(
        drivers.secure_receive(ADDR_A, &mut buf),
        Err(ApError::CHANNEL_PAYLOAD_TOO_LARGE)
    );
    assert_eq!(buf, [0xee_u8; 128]);
}
