// Licensed under the Apache-2.0 license

/// Board status LEDs.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum LedId {
    Led1,
    Led2,
    Led3,
}

pub trait Led {
    fn on(&mut self, led: LedId);
    fn off(&mut self, led: LedId);
}
