/*++

Licensed under the Apache-2.0 license.

File Name:

    host_messaging.rs

Abstract:

    File contains the operator protocol spoken over the console: tagged
    messages, acknowledged prompts and identifier parsing.

--*/

use ap_drivers::Console;
use ap_error::{ApError, ApResult};

#[doc(hidden)]
#[macro_export]
macro_rules! host_message {
    ($tag:literal, $console:expr, $($tt:tt)*) => {{
        let console = $console;
        let _ = ufmt::uwrite!(console, "%{}: ", $tag);
        let _ = ufmt::uwrite!(console, $($tt)*);
        let _ = ufmt::uwrite!(console, "%\n");
    }};
}

/// `%info: ...%`
#[macro_export]
macro_rules! host_info {
    ($console:expr, $($tt:tt)*) => {
        $crate::host_message!("info", $console, $($tt)*)
    };
}

/// `%success: ...%`
#[macro_export]
macro_rules! host_success {
    ($console:expr, $($tt:tt)*) => {
        $crate::host_message!("success", $console, $($tt)*)
    };
}

/// `%error: ...%`
#[macro_export]
macro_rules! host_error {
    ($console:expr, $($tt:tt)*) => {
        $crate::host_message!("error", $console, $($tt)*)
    };
}

/// `%debug: ...%`
#[macro_export]
macro_rules! host_debug {
    ($console:expr, $($tt:tt)*) => {
        $crate::host_message!("debug", $console, $($tt)*)
    };
}

/// Tell the host the device is ready for a line.
pub fn print_ack<C: Console>(console: &mut C) {
    let _ = ufmt::uwrite!(console, "%ack%\n");
}

/// Prompt the host and read its answer into `buf`, returning the number of
/// bytes read.
pub fn recv_input<C: Console>(
    console: &mut C,
    prompt: &str,
    buf: &mut [u8],
) -> ApResult<usize> {
    host_debug!(&mut *console, "{}", prompt);
    print_ack(console);
    let len = console.read_line(buf);
    let _ = ufmt::uwrite!(console, "\n");
    len
}

/// Console line buffer for component ids.
pub const ID_INPUT_SIZE: usize = 50;

/// Prompt for a component id. A failed read or an unparseable answer is
/// reported to the host.
pub fn read_component_id<C: Console>(console: &mut C, prompt: &str) -> ApResult<u32> {
    let mut buf = [0u8; ID_INPUT_SIZE];
    let len = match recv_input(console, prompt, &mut buf) {
        Ok(len) => len,
        Err(err) => {
            host_error!(&mut *console, "Failed to read component ID");
            return Err(err);
        }
    };
    let line = buf.get(..len).unwrap_or(&[]);
    let id = parse_component_id(line);
    if id.is_err() {
        host_error!(&mut *console, "Invalid component ID '{}'", printable(line));
    }
    id
}

/// Parse a component id written as hex, with or without a `0x` prefix.
pub fn parse_component_id(input: &[u8]) -> ApResult<u32> {
    let start = input
        .iter()
        .position(|b| !b.is_ascii_whitespace())
        .unwrap_or(input.len());
    let end = input
        .iter()
        .rposition(|b| !b.is_ascii_whitespace())
        .map_or(start, |i| i + 1);
    let trimmed = &input[start..end];
    let digits = trimmed
        .strip_prefix(b"0x")
        .or_else(|| trimmed.strip_prefix(b"0X"))
        .unwrap_or(trimmed);
    if digits.is_empty() || digits.len() > 8 {
        return Err(ApError::INPUT_INVALID_HEX);
    }

    let mut id = 0u32;
    for &c in digits {
        let nibble = match c {
            b'0'..=b'9' => c - b'0',
            b'a'..=b'f' => c - b'a' + 10,
            b'A'..=b'F' => c - b'A' + 10,
            _ => return Err(ApError::INPUT_INVALID_HEX),
        };
        id = (id << 4) | u32::from(nibble);
    }
    Ok(id)
}

/// Longest printable ASCII prefix of `bytes`.
pub fn printable(bytes: &[u8]) -> &str {
    let end = bytes
        .iter()
        .position(|b| !(b.is_ascii_graphic() || *b == b' '))
        .unwrap_or(bytes.len());
    core::str::from_utf8(&bytes[..end]).unwrap_or("")
}
