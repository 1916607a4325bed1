// Licensed under the Apache-2.0 license

//! Host-side model of the AP board: the component bus with simulated
//! components, console, LEDs, delay, TRNG and flash.

mod bus;
mod component;
mod console;
mod flash_image;
mod peripherals;

pub use bus::{BusEvent, SimBus};
pub use component::{Behavior, SimComponent};
pub use console::{copy_line, ScriptedConsole};
pub use flash_image::FileFlash;
pub use peripherals::{LedEvent, OsTrng, RecordingDelay, RecordingLed, SeededTrng, StdDelay};
