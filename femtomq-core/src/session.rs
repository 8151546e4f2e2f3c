//! Session engine
//!
//! Owns the inbound parse state machine, the outbound byte buffer, the
//! keepalive deadline and the QoS 2 receiver set. The engine performs no
//! I/O: the host feeds inbound bytes through [`Session::feed`] and writes
//! every [`Event::Outgoing`] buffer to its transport.

use heapless::Vec;
use log::{debug, error, trace, warn};

use crate::error::ClientError;
use crate::protocol::packet_type::PacketType;
use crate::protocol::packets::{Packet, PingReq, PubAck, PubComp, PubRec};
use crate::protocol::qos::QoS;
use crate::protocol::ProtocolError;

/// What one [`Session::feed`] round produced.
///
/// `consumed` counts the inbound bytes advanced this round; the host
/// re-invokes `feed` with the remainder until it gets [`Event::None`].
#[derive(Debug, PartialEq, Eq)]
pub struct FeedResult<'a> {
    pub consumed: usize,
    pub event: Event<'a>,
}

#[derive(Debug, PartialEq, Eq)]
pub enum Event<'a> {
    /// Input fully consumed, nothing to report.
    None,
    /// A complete packet arrived. Borrowed fields point into the inbound
    /// scratch and stay valid until the next `feed` call; copy out
    /// anything needed longer.
    Incoming(Packet<'a>),
    /// Bytes the host must write to the transport. The outbound scratch
    /// is considered reset after the next `feed` call.
    Outgoing(&'a [u8]),
    /// Non-fatal error; the engine has already advanced past the bad
    /// input and keeps running.
    Error(ClientError),
}

/// Inbound parse state.
///
/// The remaining length accumulates seven bits per byte through the
/// multiplier sequence 1, 128, 16384, 2097152; a continuation bit on the
/// fourth byte is invalid.
#[derive(Debug, Clone, Copy)]
enum ReadState {
    TypeAndFlags,
    RemainingLength {
        header: u8,
        value: usize,
        multiplier: usize,
    },
    Accumulate {
        header: u8,
        needed: usize,
    },
    Discard {
        remaining: usize,
    },
}

/// Sans-I/O MQTT session engine over two caller-provided scratch buffers.
///
/// Allocates nothing after construction. Inbound packet bodies accumulate
/// in `rx`; outbound packets serialize into `tx`. The pending-PUBREC
/// table is a fixed-capacity vector sized by `MAX_PENDING_PUBREC`.
pub struct Session<'buf, const MAX_PENDING_PUBREC: usize = 128> {
    rx: &'buf mut [u8],
    rx_len: usize,
    tx: &'buf mut [u8],
    tx_len: usize,
    tx_handed: bool,
    state: ReadState,
    keep_alive_secs: u16,
    last_outgoing_ms: u64,
    pending_pubrec: Vec<u16, MAX_PENDING_PUBREC>,
}

impl<'buf, const MAX_PENDING_PUBREC: usize> Session<'buf, MAX_PENDING_PUBREC> {
    /// Create a session over the caller's scratch buffers.
    ///
    /// `rx` bounds the largest packet body the session can receive; a
    /// bigger inbound packet is discarded with an
    /// [`ClientError::OutOfMemory`] event.
    pub fn new(rx: &'buf mut [u8], tx: &'buf mut [u8], now_ms: u64) -> Self {
        Self {
            rx,
            rx_len: 0,
            tx,
            tx_len: 0,
            tx_handed: false,
            state: ReadState::TypeAndFlags,
            keep_alive_secs: 0,
            last_outgoing_ms: now_ms,
            pending_pubrec: Vec::new(),
        }
    }

    /// Keepalive interval in seconds; 0 disables the PINGREQ timer.
    pub fn set_keep_alive(&mut self, secs: u16) {
        self.keep_alive_secs = secs;
    }

    /// Packet ids of QoS 2 publishes received but not yet released.
    pub fn pending_pubrec(&self) -> &[u16] {
        &self.pending_pubrec
    }

    /// Serialize `packet` onto the outbound scratch.
    pub fn enqueue(&mut self, packet: &Packet<'_>, now_ms: u64) -> Result<(), ClientError> {
        self.enqueue_with(now_ms, |buffer| packet.encode(buffer))
    }

    /// Append outbound bytes produced by `encode`, which gets the free
    /// tail of the outbound scratch and returns how much it wrote.
    pub(crate) fn enqueue_with(
        &mut self,
        now_ms: u64,
        encode: impl FnOnce(&mut [u8]) -> Result<usize, ProtocolError>,
    ) -> Result<(), ClientError> {
        self.reclaim_tx();
        let written = encode(&mut self.tx[self.tx_len..])?;
        self.tx_len += written;
        self.last_outgoing_ms = now_ms;
        Ok(())
    }

    /// Advance the session: drain outbound bytes, then parse `input`.
    ///
    /// At most one event is produced per call. The host loop slices
    /// `input` by `consumed` and calls again until the event is
    /// [`Event::None`]; an empty `input` drains pending outbound traffic.
    pub fn feed(&mut self, input: &[u8], now_ms: u64) -> FeedResult<'_> {
        self.reclaim_tx();

        // An idle outbound side owes the broker a PINGREQ before this
        // round's drain.
        if self.keep_alive_secs != 0
            && now_ms.saturating_sub(self.last_outgoing_ms)
                > u64::from(self.keep_alive_secs) * 1000
        {
            trace!(
                "no outbound traffic for over {}s, sending PINGREQ",
                self.keep_alive_secs
            );
            if self.enqueue(&Packet::PingReq(PingReq), now_ms).is_err() {
                debug!("outbound scratch full, keepalive PINGREQ dropped");
            }
        }

        // Outbound bytes always drain before inbound parsing.
        if self.tx_len != 0 {
            self.tx_handed = true;
            return FeedResult {
                consumed: 0,
                event: Event::Outgoing(&self.tx[..self.tx_len]),
            };
        }

        let mut consumed = 0;
        loop {
            match self.state {
                ReadState::TypeAndFlags => {
                    if consumed >= input.len() {
                        break;
                    }
                    let header = input[consumed];
                    consumed += 1;
                    self.state = ReadState::RemainingLength {
                        header,
                        value: 0,
                        multiplier: 1,
                    };
                }
                ReadState::RemainingLength {
                    header,
                    value,
                    multiplier,
                } => {
                    if consumed >= input.len() {
                        break;
                    }
                    let byte = input[consumed];
                    consumed += 1;
                    let value = value + (byte as usize & 0x7F) * multiplier;
                    if byte & 0x80 != 0 {
                        if multiplier == 2_097_152 {
                            error!("remaining length uses more than four bytes, resyncing");
                            self.state = ReadState::TypeAndFlags;
                            return FeedResult {
                                consumed,
                                event: Event::Error(
                                    ProtocolError::InvalidLengthEncoding.into(),
                                ),
                            };
                        }
                        self.state = ReadState::RemainingLength {
                            header,
                            value,
                            multiplier: multiplier * 128,
                        };
                    } else if value > self.rx.len() {
                        warn!(
                            "inbound body of {} bytes exceeds the {} byte scratch, discarding",
                            value,
                            self.rx.len()
                        );
                        self.state = ReadState::Discard { remaining: value };
                        return FeedResult {
                            consumed,
                            event: Event::Error(ClientError::OutOfMemory {
                                required: value,
                                capacity: self.rx.len(),
                            }),
                        };
                    } else if value == 0 {
                        self.state = ReadState::TypeAndFlags;
                        return self.finish_packet(header, 0, consumed, now_ms);
                    } else {
                        self.rx_len = 0;
                        self.state = ReadState::Accumulate {
                            header,
                            needed: value,
                        };
                    }
                }
                ReadState::Accumulate { header, needed } => {
                    let available = input.len() - consumed;
                    if available == 0 {
                        break;
                    }
                    let take = (needed - self.rx_len).min(available);
                    self.rx[self.rx_len..self.rx_len + take]
                        .copy_from_slice(&input[consumed..consumed + take]);
                    self.rx_len += take;
                    consumed += take;
                    if self.rx_len == needed {
                        self.state = ReadState::TypeAndFlags;
                        return self.finish_packet(header, needed, consumed, now_ms);
                    }
                    break;
                }
                ReadState::Discard { remaining } => {
                    let take = remaining.min(input.len() - consumed);
                    consumed += take;
                    if take == remaining {
                        self.state = ReadState::TypeAndFlags;
                    } else {
                        self.state = ReadState::Discard {
                            remaining: remaining - take,
                        };
                        break;
                    }
                }
            }
        }

        FeedResult {
            consumed,
            event: Event::None,
        }
    }

    /// A full body sits in the inbound scratch: decode it, run the QoS
    /// receiver duties, and surface the event. Automatic acks are queued
    /// before the packet event so the host observes them as at least
    /// enqueued when the application learns of the message.
    fn finish_packet(
        &mut self,
        header: u8,
        body_len: usize,
        consumed: usize,
        now_ms: u64,
    ) -> FeedResult<'_> {
        let packet_type = match PacketType::from_header_byte(header) {
            Some(packet_type) => packet_type,
            None => {
                return FeedResult {
                    consumed,
                    event: Event::Error(
                        ProtocolError::InvalidPacketType {
                            packet_type: header >> 4,
                        }
                        .into(),
                    ),
                };
            }
        };
        if !packet_type.server_to_client() {
            warn!("broker sent {:?}, which a client never receives", packet_type);
            return FeedResult {
                consumed,
                event: Event::Error(ClientError::UnhandledPacket { packet_type }),
            };
        }

        let body = &self.rx[..body_len];
        let packet = match Packet::parse(packet_type, header & 0x0F, body) {
            Ok(packet) => packet,
            Err(e) => {
                error!("failed to decode {:?} body: {}", packet_type, e);
                return FeedResult {
                    consumed,
                    event: Event::Error(e.into()),
                };
            }
        };

        match &packet {
            Packet::Publish(publish) => match (publish.qos, publish.packet_id) {
                (QoS::AtLeastOnce, Some(packet_id)) => {
                    Self::push_response(
                        self.tx,
                        &mut self.tx_len,
                        &mut self.last_outgoing_ms,
                        now_ms,
                        &Packet::PubAck(PubAck { packet_id }),
                    );
                }
                (QoS::ExactlyOnce, Some(packet_id)) => {
                    let duplicate = self.pending_pubrec.contains(&packet_id);
                    let tracked = duplicate || self.pending_pubrec.push(packet_id).is_ok();
                    Self::push_response(
                        self.tx,
                        &mut self.tx_len,
                        &mut self.last_outgoing_ms,
                        now_ms,
                        &Packet::PubRec(PubRec { packet_id }),
                    );
                    if duplicate {
                        trace!("re-acknowledged duplicate QoS 2 publish, packet_id {}", packet_id);
                        return FeedResult {
                            consumed,
                            event: Event::None,
                        };
                    }
                    if !tracked {
                        warn!(
                            "pending PUBREC table full, suppressing delivery of packet_id {}",
                            packet_id
                        );
                        return FeedResult {
                            consumed,
                            event: Event::None,
                        };
                    }
                }
                _ => {}
            },
            Packet::PubRel(pubrel) => {
                let packet_id = pubrel.packet_id;
                Self::push_response(
                    self.tx,
                    &mut self.tx_len,
                    &mut self.last_outgoing_ms,
                    now_ms,
                    &Packet::PubComp(PubComp { packet_id }),
                );
                if let Some(index) = self
                    .pending_pubrec
                    .iter()
                    .position(|&id| id == packet_id)
                {
                    self.pending_pubrec.swap_remove(index);
                }
            }
            _ => {}
        }

        FeedResult {
            consumed,
            event: Event::Incoming(packet),
        }
    }

    /// Serialize an automatic response onto the outbound scratch.
    ///
    /// Takes the fields apart so it can run while a decoded packet still
    /// borrows the inbound scratch. A response that does not fit is
    /// dropped; the broker retransmits and duplicate suppression absorbs
    /// the redelivery.
    fn push_response(
        tx: &mut [u8],
        tx_len: &mut usize,
        last_outgoing_ms: &mut u64,
        now_ms: u64,
        response: &Packet<'_>,
    ) {
        match response.encode(&mut tx[*tx_len..]) {
            Ok(written) => {
                *tx_len += written;
                *last_outgoing_ms = now_ms;
            }
            Err(e) => debug!("dropping automatic {:?}: {}", response.packet_type(), e),
        }
    }

    /// The outbound scratch is reset lazily, on the first touch after it
    /// was handed to the host.
    fn reclaim_tx(&mut self) {
        if self.tx_handed {
            self.tx_handed = false;
            self.tx_len = 0;
        }
    }
}
