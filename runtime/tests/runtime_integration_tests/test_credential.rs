// Licensed under the Apache-2.0 license

use ap_drivers::LedId;
use ap_error::ApError;
use ap_hw_model::LedEvent;
use ap_runtime::credential::{LOCKOUT_DELAY_US, RANDOM_DELAY_MAX_US, RANDOM_DELAY_MIN_US};
use ap_runtime::Credential;

use crate::common::*;

fn check(credential: Credential, input: &str) -> (Result<(), ApError>, Vec<u32>, Vec<LedEvent>) {
    let mut drivers = provisioned_board(TWO_COMPONENTS);
    drivers.console.push_line(input);
    let result = credential.check(&mut drivers);
    (
        result,
        drivers.delay.log().to_vec(),
        drivers.led.events().to_vec(),
    )
}

#[test]
fn test_correct_credentials_accepted() {
    let (result, delays, leds) = check(Credential::Pin, TEST_PIN);
    assert_eq!(result, Ok(()));
    assert_eq!(delays.len(), 1);
    assert!(leds.is_empty());

    let (result, _, _) = check(Credential::Token, TEST_TOKEN);
    assert_eq!(result, Ok(()));
}

#[test]
fn test_wrong_length_rejected() {
    let long = "1".repeat(200);
    for input in ["", "13579", "1357900", "135790 ", long.as_str()] {
        let (result, delays, leds) = check(Credential::Pin, input);
        assert_eq!(result, Err(ApError::CREDENTIAL_PIN_MISMATCH), "{input:?}");
        assert!((RANDOM_DELAY_MIN_US..=RANDOM_DELAY_MAX_US).contains(&delays[0]));
        assert_eq!(delays[1], LOCKOUT_DELAY_US);
        assert_eq!(
            leds,
            vec![LedEvent::Off(LedId::Led3), LedEvent::On(LedId::Led3)]
        );
    }
}

#[test]
fn test_pin_is_not_accepted_as_token_prefix() {
    let (result, _, _) = check(Credential::Token, &TEST_TOKEN[..6]);
    assert_eq!(result, Err(ApError::CREDENTIAL_TOKEN_MISMATCH));

    let (result, _, _) = check(Credential::Pin, &TEST_TOKEN[..6]);
    assert_eq!(result, Err(ApError::CREDENTIAL_PIN_MISMATCH));
}

#[test]
fn test_random_delay_always_applied() {
    let mut seen = Vec::new();
    let mut drivers = provisioned_board(TWO_COMPONENTS);
    for attempt in 0..20 {
        drivers.delay.clear();
        let input = if attempt % 2 == 0 { TEST_PIN } else { "000000" };
        drivers.console.push_line(input);
        let _ = Credential::Pin.check(&mut drivers);

        let random = drivers.delay.log()[0];
        assert!((RANDOM_DELAY_MIN_US..=RANDOM_DELAY_MAX_US).contains(&random));
        seen.push(random);
    }
    seen.dedup();
    assert!(seen.len() > 1);
}

#[test]
fn test_trng_failure_uses_longest_delay() {
    let mut drivers = provisioned_board(TWO_COMPONENTS);
    drivers.trng.set_failing(true);
    drivers.console.push_line(TEST_PIN);

    assert_eq!(Credential::Pin.check(&mut drivers), Ok(()));
    assert_eq!(drivers.delay.log(), &[RANDOM_DELAY_MAX_US]);
}

#[test]
fn test_console_failure_is_a_mismatch() {
    let mut drivers = provisioned_board(TWO_COMPONENTS);
    assert_eq!(
        Credential::Token.check(&mut drivers),
        Err(ApError::CREDENTIAL_TOKEN_MISMATCH)
    );
    assert_eq!(drivers.delay.log().len(), 2);
    assert!(drivers.led.is_on(LedId::Led3));
}
