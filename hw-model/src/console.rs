// Licensed under the Apache-2.0 license

use std::collections::VecDeque;
use std::convert::Infallible;

use ap_drivers::Console;
use ap_error::{ApError, ApResult};
use ufmt::uWrite;

/// Copy `line` into `buf` the way a UART line reader would: truncated to
/// leave room for a terminator, remainder zeroed.
pub fn copy_line(line: &[u8], buf: &mut [u8]) -> usize {
    let len = line.len().min(buf.len().saturating_sub(1));
    buf[..len].copy_from_slice(&line[..len]);
    if let Some(rest) = buf.get_mut(len..) {
        rest.fill(0);
    }
    len
}

/// Console fed from a fixed script of input lines, capturing everything
/// written to it.
#[derive(Default)]
pub struct ScriptedConsole {
    input: VecDeque<Vec<u8>>,
    output: String,
}

impl ScriptedConsole {
    pub fn new<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<[u8]>,
    {
        Self {
            input: lines.into_iter().map(|l| l.as_ref().to_vec()).collect(),
            output: String::new(),
        }
    }

    pub fn push_line(&mut self, line: impl AsRef<[u8]>) {
        self.input.push_back(line.as_ref().to_vec());
    }

    /// Return and clear the captured output.
    pub fn take_output(&mut self) -> String {
        std::mem::take(&mut self.output)
    }

    pub fn lines_remaining(&self) -> usize {
        self.input.len()
    }
}

impl uWrite for ScriptedConsole {
    type Error = Infallible;

    fn write_str(&mut self, s: &str) -> Result<(), Infallible> {
        self.output.push_str(s);
        Ok(())
    }
}

impl Console for ScriptedConsole {
    fn read_line(&mut self, buf: &mut [u8]) -> ApResult<usize> {
        let line = self
            .input
            .pop_front()
            .ok_or(ApError::DRIVER_CONSOLE_READ_FAILURE)?;
        Ok(copy_line(&line, buf))
    }
}
