// Licensed under the Apache-2.0 license

use std::collections::VecDeque;

use ap_api::{
    FrameWire, InboundFrame, Opcode, OutboundFrame, ATTEST_CUST_OFFSET, ATTEST_DATE_OFFSET,
    ATTEST_LOC_OFFSET, BOOT_MSG_OFFSET, BOOT_PROCEED,
};
use ap_drivers::{component_id_to_i2c_addr, I2cAddr};
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use zerocopy::{FromZeros, IntoBytes};

/// Faults a simulated component can be told to exhibit.
#[derive(Debug, Default, Clone, Copy, Eq, PartialEq)]
pub struct Behavior {
    /// Never answer anything.
    pub silent: bool,

    /// Report this id instead of the real one when validated or scanned.
    pub report_id: Option<u32>,

    /// Answer a boot proceed with a non-zero status.
    pub refuse_boot: bool,

    /// Queue every received post-boot message back to the AP.
    pub echo_secure: bool,

    /// Declare this payload length in post-boot replies, whatever the
    /// payload actually is.
    pub secure_len_override: Option<u8>,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
enum State {
    Idle,
    AwaitValidateConfirm { challenge: u32 },
    AwaitBoot { challenge: u32 },
    AwaitAttestConfirm { challenge: u32 },
    Booted,
    AwaitSecurePayload { challenge: u32 },
    AwaitSecureAck { challenge: u32 },
}

/// A component on the simulated bus, speaking the peer side of the AP
/// protocol.
pub struct SimComponent {
    id: u32,
    addr: Option<I2cAddr>,
    boot_msg: String,
    location: String,
    date: String,
    customer: String,
    behavior: Behavior,

    state: State,
    rng: StdRng,
    replies: VecDeque<Vec<u8>>,
    outbox: VecDeque<Vec<u8>>,

    /// Challenge issued in the final validate reply.
    pub validate_challenge: Option<u32>,

    /// Response field of the last boot frame received.
    pub boot_response: Option<u32>,

    /// Instruction word of the last boot frame received.
    pub boot_instruction: Option<u32>,

    pub booted: bool,

    /// Post-boot payloads received from the AP.
    pub inbox: Vec<Vec<u8>>,

    /// Frames rejected because their response did not match.
    pub rejected_frames: usize,
}

impl SimComponent {
    pub fn new(id: u32) -> Self {
        Self {
            id,
            addr: component_id_to_i2c_addr(id).ok(),
            boot_msg: format!("Component {id:#010x} booted"),
            location: "Bedford, MA".into(),
            date: "2024-01-15".into(),
            customer: "Example Customer".into(),
            behavior: Behavior {
                echo_secure: true,
                ..Default::default()
            },
            state: State::Idle,
            rng: StdRng::seed_from_u64(u64::from(id)),
            replies: VecDeque::new(),
            outbox: VecDeque::new(),
            validate_challenge: None,
            boot_response: None,
            boot_instruction: None,
            booted: false,
            inbox: Vec::new(),
            rejected_frames: 0,
        }
    }

    pub fn with_behavior(mut self, behavior: Behavior) -> Self {
        self.behavior = behavior;
        self
    }

    pub fn with_boot_msg(mut self, msg: &str) -> Self {
        self.boot_msg = msg.into();
        self
    }

    pub fn with_attestation(mut self, location: &str, date: &str, customer: &str) -> Self {
        self.location = location.into();
        self.date = date.into();
        self.customer = customer.into();
        self
    }

    pub fn id(&self) -> u32 {
        self.id
    }

    pub fn addr(&self) -> Option<I2cAddr> {
        self.addr
    }

    /// Queue a post-boot message for the AP to collect with
    /// `secure_receive`.
    pub fn queue_secure_message(&mut self, payload: &[u8]) {
        self.outbox.push_back(payload.to_vec());
        self.offer_next_message();
    }

    /// Accept one frame from the AP.
    pub fn receive(&mut self, bytes: &[u8]) {
        if self.behavior.silent {
            return;
        }
        self.replies.clear();
        let Ok(frame) = InboundFrame::decode(bytes) else {
            self.rejected_frames += 1;
            return;
        };

        match self.state {
            State::AwaitValidateConfirm { challenge } if frame.opcode() == Opcode::Validate => {
                if !self.answers(&frame, challenge) {
                    return;
                }
                let next = self.next_challenge();
                self.validate_challenge = Some(next);
                self.state = State::AwaitBoot { challenge: next };
                let reply = OutboundFrame::new(Opcode::Validate).with_word(self.reported_id());
                self.reply_with(&frame, next, reply);
            }
            State::AwaitBoot { challenge } if frame.opcode() == Opcode::Boot => {
                self.boot_response = Some(frame.response());
                self.boot_instruction = Some(frame.word());
                if !self.answers(&frame, challenge) {
                    return;
                }
                self.boot(&frame);
            }
            State::AwaitAttestConfirm { challenge } if frame.opcode() == Opcode::Attest => {
                if !self.answers(&frame, challenge) {
                    return;
                }
                self.state = State::Idle;
                let next = self.next_challenge();
                let reply = self.attestation_frame();
                self.reply_with(&frame, next, reply);
            }
            State::Booted | State::AwaitSecurePayload { .. } | State::AwaitSecureAck { .. } => {
                self.receive_booted(&frame);
            }
            _ => self.receive_idle(&frame),
        }
    }

    /// Next frame waiting for the AP to poll.
    pub fn take_reply(&mut self) -> Option<Vec<u8>> {
        self.replies.pop_front()
    }

    fn receive_idle(&mut self, frame: &InboundFrame) {
        self.state = State::Idle;
        let next = self.next_challenge();
        match frame.opcode() {
            Opcode::Scan => {
                let reply = OutboundFrame::new(Opcode::Scan).with_word(self.reported_id());
                self.reply_with(frame, next, reply);
            }
            Opcode::Validate => {
                self.state = State::AwaitValidateConfirm { challenge: next };
                self.reply_with(frame, next, OutboundFrame::new(Opcode::Validate));
            }
            Opcode::Attest => {
                self.state = State::AwaitAttestConfirm { challenge: next };
                self.reply_with(frame, next, OutboundFrame::new(Opcode::Attest));
            }
            Opcode::Boot | Opcode::None => self.rejected_frames += 1,
        }
    }

    fn receive_booted(&mut self, frame: &InboundFrame) {
        match self.state {
            State::AwaitSecurePayload { challenge } if frame.response() == challenge => {
                self.state = State::Booted;
                if let Ok(payload) = frame.len_prefixed() {
                    let payload = payload.to_vec();
                    if self.behavior.echo_secure {
                        self.outbox.push_back(payload.clone());
                    }
                    self.inbox.push(payload);
                }
                self.offer_next_message();
            }
            State::AwaitSecureAck { challenge } if frame.response() == challenge => {
                self.state = State::Booted;
                let next = self.next_challenge();
                if let Some(payload) = self.outbox.pop_front() {
                    let reply = match self.behavior.secure_len_override {
                        Some(len) => OutboundFrame::new(Opcode::None)
                            .with_contents_at(0, &[len])
                            .and_then(|f| f.with_contents_at(1, &payload)),
                        None => OutboundFrame::new(Opcode::None).with_len_prefixed(&payload),
                    };
                    if let Ok(reply) = reply {
                        self.reply_with(frame, next, reply);
                    }
                }
            }
            _ => {
                // Hello from the AP opening a secure send.
                let next = self.next_challenge();
                self.state = State::AwaitSecurePayload { challenge: next };
                self.reply_with(frame, next, OutboundFrame::new(Opcode::None));
            }
        }
    }

    fn boot(&mut self, frame: &InboundFrame) {
        let next = self.next_challenge();
        let instruction = frame.word();
        if instruction != BOOT_PROCEED {
            self.state = State::Idle;
            self.reply_with(frame, next, OutboundFrame::new(Opcode::Boot).with_word(instruction));
            return;
        }
        if self.behavior.refuse_boot {
            self.state = State::Idle;
            self.reply_with(frame, next, OutboundFrame::new(Opcode::Boot).with_word(1));
            return;
        }

        self.booted = true;
        self.state = State::Booted;
        let msg = self.boot_msg.clone();
        let reply = OutboundFrame::new(Opcode::Boot)
            .with_word(BOOT_PROCEED)
            .with_contents_at(BOOT_MSG_OFFSET, msg.as_bytes());
        if let Ok(reply) = reply {
            self.reply_with(frame, next, reply);
        }
    }

    /// Put the next outgoing post-boot message on offer: a hello the AP
    /// picks up with an unchecked poll.
    fn offer_next_message(&mut self) {
        if self.state != State::Booted || self.outbox.is_empty() {
            return;
        }
        let next = self.next_challenge();
        self.state = State::AwaitSecureAck { challenge: next };
        let hello = OutboundFrame::new(Opcode::None).sealed(next, 0);
        self.replies.push_back(encode(&hello));
    }

    fn attestation_frame(&self) -> OutboundFrame {
        let frame = OutboundFrame::new(Opcode::Attest);
        let fields = [
            (ATTEST_LOC_OFFSET, &self.location),
            (ATTEST_DATE_OFFSET, &self.date),
            (ATTEST_CUST_OFFSET, &self.customer),
        ];
        fields
            .into_iter()
            .fold(frame, |frame, (offset, text)| {
                let bytes = text.as_bytes();
                let bytes = &bytes[..bytes.len().min(ap_api::ATTEST_FIELD_SIZE)];
                match frame.with_contents_at(offset, bytes) {
                    Ok(frame) => frame,
                    Err(_) => OutboundFrame::new(Opcode::Attest),
                }
            })
    }

    fn answers(&mut self, frame: &InboundFrame, challenge: u32) -> bool {
        if frame.response() == challenge {
            return true;
        }
        self.rejected_frames += 1;
        self.state = if self.booted { State::Booted } else { State::Idle };
        false
    }

    fn reported_id(&self) -> u32 {
        self.behavior.report_id.unwrap_or(self.id)
    }

    fn reply_with(&mut self, to: &InboundFrame, challenge: u32, reply: OutboundFrame) {
        let reply = reply.sealed(challenge, to.challenge());
        self.replies.push_back(encode(&reply));
    }

    fn next_challenge(&mut self) -> u32 {
        self.rng.next_u32()
    }
}

fn encode(frame: &OutboundFrame) -> Vec<u8> {
    let mut wire = FrameWire::new_zeroed();
    frame.encode(&mut wire);
    wire.as_bytes().to_vec()
}
