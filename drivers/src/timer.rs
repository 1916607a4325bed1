// Licensed under the Apache-2.0 license

/// Busy-wait delay source.
pub trait Delay {
    fn delay_us(&mut self, us: u32);
}
