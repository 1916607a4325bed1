// Licensed under the Apache-2.0 license

use ap_drivers::{scan_addresses, I2C_RESERVED_ADDRS};
use ap_hw_model::{Behavior, SimComponent};
use ap_runtime::CommandOutcome;

use crate::common::*;

#[test]
fn test_list_prints_provisioned_and_found() {
    let mut drivers = provisioned_board(TWO_COMPONENTS);
    drivers
        .channel
        .link_mut()
        .attach(SimComponent::new(0x2222_2240));

    let (result, output) = run_command(&mut drivers, "list", &[]);
    assert_eq!(result, Ok(CommandOutcome::Completed));
    assert_eq!(
        output,
        [
            info("P>0x11111124"),
            info("P>0x11111125"),
            info("F>0x11111124"),
            info("F>0x11111125"),
            info("F>0x22222240"),
            success("List"),
        ]
        .concat()
    );
}

#[test]
fn test_scan_visits_every_address_once() {
    let mut drivers = provisioned_board(TWO_COMPONENTS);
    let (_, _) = run_command(&mut drivers, "list", &[]);

    let scanned = drivers.channel.link().transmit_addrs();
    let expected: Vec<u8> = scan_addresses().map(u8::from).collect();
    assert_eq!(scanned, expected);
    assert_eq!(scanned.len(), 0x78 - 0x08 - I2C_RESERVED_ADDRS.len());
    for reserved in I2C_RESERVED_ADDRS {
        assert!(!scanned.contains(&reserved));
    }
}

#[test]
fn test_list_with_missing_and_silent_components() {
    let mut drivers = provisioned_board(TWO_COMPONENTS);
    drivers.channel.link_mut().detach(COMPONENT_A);
    drivers.channel.link_mut().detach(COMPONENT_B);
    drivers.channel.link_mut().attach(
        SimComponent::new(COMPONENT_B).with_behavior(Behavior {
            silent: true,
            ..Default::default()
        }),
    );

    let (result, output) = run_command(&mut drivers, "list", &[]);
    assert_eq!(result, Ok(CommandOutcome::Completed));
    assert_eq!(
        output,
        [info("P>0x11111124"), info("P>0x11111125"), success("List")].concat()
    );
}
