// Licensed under the Apache-2.0 license

use ap_error::ApResult;
use core::convert::Infallible;
use ufmt::uWrite;

/// Operator console: formatted output plus line input.
pub trait Console: uWrite<Error = Infallible> {
    /// Block until a line arrives and copy it into `buf` without the line
    /// terminator. Lines longer than `buf.len() - 1` are truncated. Returns
    /// the number of bytes stored.
    fn read_line(&mut self, buf: &mut [u8]) -> ApResult<usize>;
}
