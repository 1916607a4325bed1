/*++

Licensed under the Apache-2.0 license.

File Name:

    board_link.rs

Abstract:

    File contains the bus transport interface between the AP and components
    and the component id to bus address mapping.

--*/

use ap_error::{ApError, ApResult};

/// Lowest address scanned on the component bus.
pub const I2C_ADDR_MIN: u8 = 0x08;

/// One past the highest address scanned on the component bus.
pub const I2C_ADDR_MAX: u8 = 0x78;

/// Addresses owned by other on-board peripherals.
pub const I2C_RESERVED_ADDRS: [u8; 3] = [0x18, 0x28, 0x36];

/// 7-bit bus address of a component.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct I2cAddr(u8);

impl I2cAddr {
    /// Validate a raw address against the component range and reserved list.
    pub fn new(addr: u8) -> ApResult<Self> {
        if !(I2C_ADDR_MIN..I2C_ADDR_MAX).contains(&addr) || I2C_RESERVED_ADDRS.contains(&addr) {
            return Err(ApError::BUS_ADDRESS_RESERVED);
        }
        Ok(Self(addr))
    }

    pub fn get(self) -> u8 {
        self.0
    }
}

impl From<I2cAddr> for u8 {
    fn from(addr: I2cAddr) -> u8 {
        addr.0
    }
}

/// Derive the bus address of a component from its id.
///
/// The address is the low seven bits of the id. Ids whose address falls
/// outside `I2C_ADDR_MIN..I2C_ADDR_MAX` or onto a reserved address have no
/// reachable address.
pub fn component_id_to_i2c_addr(component_id: u32) -> ApResult<I2cAddr> {
    I2cAddr::new((component_id & 0x7f) as u8)
}

/// Every scannable address in ascending order, reserved addresses skipped.
pub fn scan_addresses() -> impl Iterator<Item = I2cAddr> {
    (I2C_ADDR_MIN..I2C_ADDR_MAX).filter_map(|addr| I2cAddr::new(addr).ok())
}

/// Frame transport to a single bus peer.
///
/// Implementations own retry and timeout policy; a returned error means the
/// step did not complete.
pub trait BoardLink {
    /// Send one frame to `addr`
    fn transmit(&mut self, addr: I2cAddr, frame: &[u8]) -> ApResult<()>;

    /// Wait for one frame from `addr`, returning the number of bytes placed
    /// in `buf`
    fn poll_recv(&mut self, addr: I2cAddr, buf: &mut [u8]) -> ApResult<usize>;

    /// Transmit then poll for the reply.
    fn exchange(&mut self, addr: I2cAddr, frame: &[u8], reply: &mut [u8]) -> ApResult<usize> {
        self.transmit(addr, frame)?;
        self.poll_recv(addr, reply)
    }
}
