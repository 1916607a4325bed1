/*++

Licensed under the Apache-2.0 license.

File Name:

    printer.rs

Abstract:

    File contains support routines and macros for diagnostic output

--*/
use core::convert::Infallible;
use ufmt::{uDisplay, uWrite};

#[derive(Default)]
pub struct Printer;

impl uWrite for Printer {
    type Error = Infallible;

    /// Writes a string slice into this writer, returning whether the write succeeded.
    fn write_str(&mut self, _str: &str) -> Result<(), Self::Error> {
        cfg_if::cfg_if! {
            if #[cfg(feature = "std")] {
                eprint!("{_str}");
            }
        }
        Ok(())
    }
}

#[macro_export]
macro_rules! cprint {
    ($($tt:tt)*) => {{
        let _ = ufmt::uwrite!(&mut $crate::printer::Printer::default(), $($tt)*);
    }}
}

#[macro_export]
macro_rules! cprintln {
    ($($tt:tt)*) => {{
        let _ = ufmt::uwriteln!(&mut $crate::printer::Printer::default(), $($tt)*);
    }}
}

fn hex_digit(nibble: u8) -> char {
    if nibble < 10 {
        (nibble + b'0') as char
    } else {
        (nibble - 10 + b'a') as char
    }
}

/// A word rendered as `0x` followed by eight lowercase hex digits.
pub struct HexU32(pub u32);
impl uDisplay for HexU32 {
    fn fmt<W>(&self, f: &mut ufmt::Formatter<'_, W>) -> Result<(), W::Error>
    where
        W: uWrite + ?Sized,
    {
        f.write_str("0x")?;
        for shift in (0..8).rev() {
            f.write_char(hex_digit(((self.0 >> (shift * 4)) & 0xf) as u8))?;
        }
        Ok(())
    }
}
