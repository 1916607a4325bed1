// Licensed under the Apache-2.0 license

use std::time::Duration;

use ap_drivers::{Delay, Led, LedId, Trng};
use ap_error::{ApError, ApResult};
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};

/// Delay that only records what was asked of it.
#[derive(Default)]
pub struct RecordingDelay {
    log: Vec<u32>,
}

impl RecordingDelay {
    pub fn new() -> Self {
        Self::default()
    }

    /// Each requested delay in microseconds, in order.
    pub fn log(&self) -> &[u32] {
        &self.log
    }

    pub fn clear(&mut self) {
        self.log.clear();
    }
}

impl Delay for RecordingDelay {
    fn delay_us(&mut self, us: u32) {
        self.log.push(us);
    }
}

/// Delay that sleeps the calling thread.
#[derive(Default)]
pub struct StdDelay;

impl Delay for StdDelay {
    fn delay_us(&mut self, us: u32) {
        std::thread::sleep(Duration::from_micros(u64::from(us)));
    }
}

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum LedEvent {
    On(LedId),
    Off(LedId),
}

/// LEDs that remember every change.
#[derive(Default)]
pub struct RecordingLed {
    events: Vec<LedEvent>,
    lit: [bool; 3],
}

impl RecordingLed {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> &[LedEvent] {
        &self.events
    }

    pub fn is_on(&self, led: LedId) -> bool {
        self.lit[Self::index(led)]
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }

    fn index(led: LedId) -> usize {
        match led {
            LedId::Led1 => 0,
            LedId::Led2 => 1,
            LedId::Led3 => 2,
        }
    }
}

impl Led for RecordingLed {
    fn on(&mut self, led: LedId) {
        self.lit[Self::index(led)] = true;
        self.events.push(LedEvent::On(led));
    }

    fn off(&mut self, led: LedId) {
        self.lit[Self::index(led)] = false;
        self.events.push(LedEvent::Off(led));
    }
}

/// Deterministic generator for reproducible tests.
pub struct SeededTrng {
    rng: StdRng,
    fail: bool,
}

impl SeededTrng {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            fail: false,
        }
    }

    /// Make every subsequent `generate` fail.
    pub fn set_failing(&mut self, fail: bool) {
        self.fail = fail;
    }
}

impl Default for SeededTrng {
    fn default() -> Self {
        Self::new(0x2545_f491)
    }
}

impl Trng for SeededTrng {
    fn generate(&mut self) -> ApResult<u32> {
        if self.fail {
            return Err(ApError::DRIVER_TRNG_FAILURE);
        }
        Ok(self.rng.next_u32())
    }
}

/// Entropy from the host operating system.
#[derive(Default)]
pub struct OsTrng;

impl Trng for OsTrng {
    fn generate(&mut self) -> ApResult<u32> {
        let mut word = [0u8; 4];
        getrandom::getrandom(&mut word).map_err(|_| ApError::DRIVER_TRNG_FAILURE)?;
        Ok(u32::from_le_bytes(word))
    }
}
