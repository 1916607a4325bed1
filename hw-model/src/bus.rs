// Licensed under the Apache-2.0 license

use ap_api::FRAME_SIZE;
use ap_drivers::{BoardLink, I2cAddr};
use ap_error::{ApError, ApResult};

use crate::SimComponent;

/// One transaction seen on the bus.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum BusEvent {
    Transmit { addr: u8, opcode: u8 },
    Receive { addr: u8, len: usize },
}

/// Component bus with simulated peers attached.
#[derive(Default)]
pub struct SimBus {
    components: Vec<SimComponent>,
    log: Vec<BusEvent>,
}

impl SimBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_component(mut self, component: SimComponent) -> Self {
        self.attach(component);
        self
    }

    pub fn attach(&mut self, component: SimComponent) {
        self.components.push(component);
    }

    /// Unplug the component with `id`.
    pub fn detach(&mut self, id: u32) -> Option<SimComponent> {
        let index = self.components.iter().position(|c| c.id() == id)?;
        Some(self.components.remove(index))
    }

    pub fn component(&self, id: u32) -> Option<&SimComponent> {
        self.components.iter().find(|c| c.id() == id)
    }

    pub fn component_mut(&mut self, id: u32) -> Option<&mut SimComponent> {
        self.components.iter_mut().find(|c| c.id() == id)
    }

    /// Every transaction since the last `clear_log`.
    pub fn log(&self) -> &[BusEvent] {
        &self.log
    }

    pub fn clear_log(&mut self) {
        self.log.clear();
    }

    /// Addresses that received a transmit, in order.
    pub fn transmit_addrs(&self) -> Vec<u8> {
        self.log
            .iter()
            .filter_map(|event| match event {
                BusEvent::Transmit { addr, .. } => Some(*addr),
                BusEvent::Receive { .. } => None,
            })
            .collect()
    }

    fn at(&mut self, addr: I2cAddr) -> Option<&mut SimComponent> {
        self.components
            .iter_mut()
            .find(|c| c.addr() == Some(addr))
    }
}

impl BoardLink for SimBus {
    fn transmit(&mut self, addr: I2cAddr, frame: &[u8]) -> ApResult<()> {
        self.log.push(BusEvent::Transmit {
            addr: addr.get(),
            opcode: frame.first().copied().unwrap_or(0),
        });
        if frame.len() > FRAME_SIZE {
            return Err(ApError::BUS_TRANSMIT_FAILURE);
        }
        let component = self.at(addr).ok_or(ApError::BUS_TRANSMIT_FAILURE)?;
        component.receive(frame);
        Ok(())
    }

    fn poll_recv(&mut self, addr: I2cAddr, buf: &mut [u8]) -> ApResult<usize> {
        let reply = self
            .at(addr)
            .and_then(|component| component.take_reply())
            .ok_or(ApError::BUS_RECEIVE_FAILURE)?;
        let len = reply.len().min(buf.len());
        buf[..len].copy_from_slice(&reply[..len]);
        self.log.push(BusEvent::Receive {
            addr: addr.get(),
            len,
        });
        Ok(len)
    }
}
