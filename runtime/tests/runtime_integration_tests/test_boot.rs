// Licensed under the Apache-2.0 license

use ap_api::{BOOT_ABORT, BOOT_PROCEED};
use ap_error::ApError;
use ap_hw_model::{Behavior, SimComponent};
use ap_runtime::CommandOutcome;

use crate::common::*;

fn replace_component(drivers: &mut ap_runtime::Drivers<SimPlatform>, component: SimComponent) {
    let bus = drivers.channel.link_mut();
    bus.detach(component.id());
    bus.attach(component);
}

#[test]
fn test_boot_success() {
    let mut drivers = provisioned_board(TWO_COMPONENTS);
    replace_component(
        &mut drivers,
        SimComponent::new(COMPONENT_B).with_boot_msg("second component up"),
    );

    let (result, output) = run_command(&mut drivers, "boot", &[]);
    assert_eq!(result, Ok(CommandOutcome::Booted));
    assert_eq!(
        output,
        [
            info("0x11111124>Component 0x11111124 booted"),
            info("0x11111125>second component up"),
            info("AP>AP ready"),
            success("Boot"),
        ]
        .concat()
    );

    for id in TWO_COMPONENTS {
        let component = drivers.channel.link().component(*id).unwrap();
        assert!(component.booted);
        assert_eq!(component.boot_instruction, Some(BOOT_PROCEED));
    }
}

#[test]
fn test_boot_challenge_continuity() {
    let mut drivers = provisioned_board(THREE_COMPONENTS);
    let (result, _) = run_command(&mut drivers, "boot", &[]);
    assert_eq!(result, Ok(CommandOutcome::Booted));

    for id in THREE_COMPONENTS {
        let component = drivers.channel.link().component(*id).unwrap();
        assert!(component.validate_challenge.is_some());
        assert_eq!(component.boot_response, component.validate_challenge);
        assert_eq!(component.rejected_frames, 0);
    }
}

#[test]
fn test_boot_aborts_everyone_on_wrong_id() {
    let mut drivers = provisioned_board(THREE_COMPONENTS);
    replace_component(
        &mut drivers,
        SimComponent::new(COMPONENT_B).with_behavior(Behavior {
            report_id: Some(0xdead_beef),
            ..Default::default()
        }),
    );

    let (result, output) = run_command(&mut drivers, "boot", &[]);
    assert_eq!(result, Err(ApError::VALIDATE_FAILED));
    assert_eq!(
        output,
        [
            error("Component ID: 0x11111125 invalid"),
            error("Could not boot component 0x11111124"),
            error("Could not boot component 0x11111125"),
            error("Could not boot component 0x11111126"),
            error("Boot Failed"),
        ]
        .concat()
    );

    for id in THREE_COMPONENTS {
        let component = drivers.channel.link().component(*id).unwrap();
        assert!(!component.booted);
        assert_eq!(component.boot_instruction, Some(BOOT_ABORT));
    }
}

#[test]
fn test_boot_aborts_everyone_on_missing_component() {
    let mut drivers = provisioned_board(THREE_COMPONENTS);
    drivers.channel.link_mut().detach(COMPONENT_C);

    let (result, output) = run_command(&mut drivers, "boot", &[]);
    assert_eq!(result, Err(ApError::VALIDATE_FAILED));
    assert!(output.starts_with(&error("Component ID: 0x11111126 invalid")));
    assert!(output.ends_with(&error("Boot Failed")));
    assert!(!output.contains("%success"));

    for id in [COMPONENT_A, COMPONENT_B] {
        let component = drivers.channel.link().component(id).unwrap();
        assert!(!component.booted);
        assert_eq!(component.boot_instruction, Some(BOOT_ABORT));
    }
}

#[test]
fn test_boot_refused_by_component() {
    let mut drivers = provisioned_board(TWO_COMPONENTS);
    replace_component(
        &mut drivers,
        SimComponent::new(COMPONENT_A).with_behavior(Behavior {
            refuse_boot: true,
            ..Default::default()
        }),
    );

    let (result, output) = run_command(&mut drivers, "boot", &[]);
    assert_eq!(result, Err(ApError::BOOT_FAILED));
    assert_eq!(
        output,
        [
            error("Could not boot component 0x11111124"),
            info("0x11111125>Component 0x11111125 booted"),
            error("Boot Failed"),
        ]
        .concat()
    );
}

#[test]
fn test_boot_unreachable_id() {
    // Low seven bits land on a reserved address.
    static IDS: [u32; 2] = [COMPONENT_A, 0x1111_1118];
    let mut drivers = provisioned_board(&IDS);

    let (result, output) = run_command(&mut drivers, "boot", &[]);
    assert_eq!(result, Err(ApError::VALIDATE_FAILED));
    assert!(output.contains(&error("Component ID: 0x11111118 invalid")));
    assert!(output.contains(&error("Could not boot component 0x11111118")));
    assert_eq!(
        drivers
            .channel
            .link()
            .component(COMPONENT_A)
            .unwrap()
            .boot_instruction,
        Some(BOOT_ABORT)
    );
}

#[test]
fn test_boot_with_no_components() {
    let mut drivers = provisioned_board(&[]);
    let (result, output) = run_command(&mut drivers, "boot", &[]);
    assert_eq!(result, Ok(CommandOutcome::Booted));
    assert_eq!(output, [info("AP>AP ready"), success("Boot")].concat());
}
