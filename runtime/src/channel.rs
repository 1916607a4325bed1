/*++

Licensed under the Apache-2.0 license.

File Name:

    channel.rs

Abstract:

    File contains the challenge chained frame exchange with a single
    component: command rounds and the post-boot secure send/receive
    handshake.

--*/

use ap_api::{FrameWire, InboundFrame, Opcode, OutboundFrame, FRAME_SIZE};
use ap_drivers::{BoardLink, I2cAddr, Trng};
use ap_error::{ApError, ApResult};
use zerocopy::{FromZeros, IntoBytes};
use zeroize::{Zeroize, Zeroizing};

/// Whether `poll_recv` requires the peer to answer our last challenge.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum ResponseCheck {
    Verify,

    /// Accept the frame whatever it echoes. Only used for a frame that opens
    /// an exchange the peer initiated.
    Waive,
}

pub struct SecureChannel<L: BoardLink> {
    link: L,

    /// Challenge carried by the last frame we transmitted.
    sent_challenge: u32,

    /// Challenge carried by the last frame we accepted.
    peer_challenge: u32,
}

impl<L: BoardLink> SecureChannel<L> {
    pub fn new(link: L) -> Self {
        Self {
            link,
            sent_challenge: 0,
            peer_challenge: 0,
        }
    }

    pub fn link(&self) -> &L {
        &self.link
    }

    pub fn link_mut(&mut self) -> &mut L {
        &mut self.link
    }

    /// Forget all challenge state.
    pub fn reset(&mut self) {
        self.sent_challenge = 0;
        self.peer_challenge = 0;
    }

    /// Resume an exchange with a peer whose last challenge is `challenge`.
    pub fn restore_peer_challenge(&mut self, challenge: u32) {
        self.sent_challenge = 0;
        self.peer_challenge = challenge;
    }

    /// Seal `frame` with a fresh challenge and our answer to the peer's
    /// last challenge, then send it.
    pub fn transmit<T: Trng + ?Sized>(
        &mut self,
        trng: &mut T,
        addr: I2cAddr,
        frame: OutboundFrame,
    ) -> ApResult<()> {
        let challenge = trng.generate()?;
        let frame = frame.sealed(challenge, self.peer_challenge);

        let mut wire = FrameWire::new_zeroed();
        frame.encode(&mut wire);
        let result = self.link.transmit(addr, wire.as_bytes());
        wire.as_mut_bytes().zeroize();
        result?;

        self.sent_challenge = challenge;
        Ok(())
    }

    /// Receive one frame from `addr`.
    pub fn poll_recv(&mut self, addr: I2cAddr, check: ResponseCheck) -> ApResult<InboundFrame> {
        let mut buf = Zeroizing::new([0u8; FRAME_SIZE]);
        let len = self.link.poll_recv(addr, &mut buf[..])?;
        let frame = InboundFrame::decode(buf.get(..len).ok_or(ApError::BUS_RECEIVE_FAILURE)?)?;

        if check == ResponseCheck::Verify && frame.response() != self.sent_challenge {
            return Err(ApError::CHANNEL_RESPONSE_MISMATCH);
        }
        self.peer_challenge = frame.challenge();
        Ok(frame)
    }

    /// One command round: send `frame` and wait for the answering frame.
    pub fn issue_cmd<T: Trng + ?Sized>(
        &mut self,
        trng: &mut T,
        addr: I2cAddr,
        frame: OutboundFrame,
    ) -> ApResult<InboundFrame> {
        self.transmit(trng, addr, frame)?;
        self.poll_recv(addr, ResponseCheck::Verify)
    }

    /// Deliver at most 64 bytes to a booted component.
    ///
    /// Hello, the peer's answer, then the length prefixed payload.
    pub fn secure_send<T: Trng + ?Sized>(
        &mut self,
        trng: &mut T,
        addr: I2cAddr,
        payload: &[u8],
    ) -> ApResult<()> {
        let frame = OutboundFrame::new(Opcode::None).with_len_prefixed(payload)?;

        self.reset();
        self.issue_cmd(trng, addr, OutboundFrame::new(Opcode::None))?;
        self.transmit(trng, addr, frame)
    }

    /// Receive at most 64 bytes from a booted component into `buf`,
    /// returning the payload length.
    pub fn secure_receive<T: Trng + ?Sized>(
        &mut self,
        trng: &mut T,
        addr: I2cAddr,
        buf: &mut [u8],
    ) -> ApResult<usize> {
        self.reset();
        self.poll_recv(addr, ResponseCheck::Waive)?;
        let frame = self.issue_cmd(trng, addr, OutboundFrame::new(Opcode::None))?;

        let payload = frame.len_prefixed()?;
        let dest = buf
            .get_mut(..payload.len())
            .ok_or(ApError::CHANNEL_BUFFER_TOO_SMALL)?;
        dest.copy_from_slice(payload);
        Ok(payload.len())
    }
}
