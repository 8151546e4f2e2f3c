mod connack;
mod connect;
mod disconnect;
mod pingreq;
mod pingresp;
mod puback;
mod pubcomp;
mod publish;
mod pubrec;
mod pubrel;
mod suback;
mod subscribe;
mod unsuback;
mod unsubscribe;

pub use crate::protocol::packets::connack::{ConnAck, ConnectReturnCode};
pub use crate::protocol::packets::connect::{Connect, ConnectFlags, Will};
pub use crate::protocol::packets::disconnect::Disconnect;
pub use crate::protocol::packets::pingreq::PingReq;
pub use crate::protocol::packets::pingresp::PingResp;
pub use crate::protocol::packets::puback::PubAck;
pub use crate::protocol::packets::pubcomp::PubComp;
pub use crate::protocol::packets::publish::Publish;
pub use crate::protocol::packets::pubrec::PubRec;
pub use crate::protocol::packets::pubrel::PubRel;
pub use crate::protocol::packets::suback::{ReturnCodes, SubAck, SubAckReturnCode};
pub use crate::protocol::packets::subscribe::{
    Subscribe, Subscription, SubscriptionIter, TopicFilters,
};
pub use crate::protocol::packets::unsuback::UnsubAck;
pub use crate::protocol::packets::unsubscribe::{FilterIter, FilterList, Unsubscribe};

use crate::protocol::packet_type::PacketType;
use crate::protocol::utils::{
    read_variable_length, variable_length_length, ByteWriter, MAX_REMAINING_LENGTH,
};
use crate::protocol::ProtocolError;

/// Fixed header flag nibble PUBREL, SUBSCRIBE and UNSUBSCRIBE must carry
/// (MQTT 3.1.1 reserved-bits requirement).
pub(crate) const RESERVED_FLAGS: u8 = 0b0010;

/// Body serialization, shared by every packet kind.
///
/// `body_len` is the exact remaining length, computed up front so the
/// fixed header can be written once without a second pass.
pub(crate) trait PacketBody {
    fn body_len(&self) -> usize;
    fn encode_body(&self, writer: &mut ByteWriter<'_>) -> Result<(), ProtocolError>;
}

/// One MQTT 3.1.1 control packet, keyed by the 4-bit packet type.
///
/// Decoded variable-length fields borrow the buffer they were parsed
/// from; inside a session event that is the inbound scratch, and the
/// borrow ends at the next `feed` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Packet<'a> {
    Connect(Connect<'a>),
    ConnAck(ConnAck),
    Publish(Publish<'a>),
    PubAck(PubAck),
    PubRec(PubRec),
    PubRel(PubRel),
    PubComp(PubComp),
    Subscribe(Subscribe<'a>),
    SubAck(SubAck<'a>),
    Unsubscribe(Unsubscribe<'a>),
    UnsubAck(UnsubAck),
    PingReq(PingReq),
    PingResp(PingResp),
    Disconnect(Disconnect),
}

impl<'a> Packet<'a> {
    pub fn packet_type(&self) -> PacketType {
        match self {
            Packet::Connect(_) => PacketType::Connect,
            Packet::ConnAck(_) => PacketType::ConnAck,
            Packet::Publish(_) => PacketType::Publish,
            Packet::PubAck(_) => PacketType::PubAck,
            Packet::PubRec(_) => PacketType::PubRec,
            Packet::PubRel(_) => PacketType::PubRel,
            Packet::PubComp(_) => PacketType::PubComp,
            Packet::Subscribe(_) => PacketType::Subscribe,
            Packet::SubAck(_) => PacketType::SubAck,
            Packet::Unsubscribe(_) => PacketType::Unsubscribe,
            Packet::UnsubAck(_) => PacketType::UnsubAck,
            Packet::PingReq(_) => PacketType::PingReq,
            Packet::PingResp(_) => PacketType::PingResp,
            Packet::Disconnect(_) => PacketType::Disconnect,
        }
    }

    /// Type-specific flag nibble of the fixed header.
    pub fn flags(&self) -> u8 {
        match self {
            Packet::Publish(publish) => publish.flags_nibble(),
            Packet::PubRel(_) | Packet::Subscribe(_) | Packet::Unsubscribe(_) => RESERVED_FLAGS,
            _ => 0b0000,
        }
    }

    pub fn header_first_byte(&self) -> u8 {
        (self.packet_type() as u8) << 4 | (self.flags() & 0x0F)
    }

    /// Decode a packet body given the already-parsed type and flag
    /// nibble. `body` must be exactly the remaining length declared in
    /// the fixed header; decoders never read past it.
    pub fn parse(
        packet_type: PacketType,
        flags: u8,
        body: &'a [u8],
    ) -> Result<Self, ProtocolError> {
        match packet_type {
            PacketType::Connect => Connect::decode(flags, body).map(Packet::Connect),
            PacketType::ConnAck => ConnAck::decode(flags, body).map(Packet::ConnAck),
            PacketType::Publish => Publish::decode(flags, body).map(Packet::Publish),
            PacketType::PubAck => PubAck::decode(flags, body).map(Packet::PubAck),
            PacketType::PubRec => PubRec::decode(flags, body).map(Packet::PubRec),
            PacketType::PubRel => PubRel::decode(flags, body).map(Packet::PubRel),
            PacketType::PubComp => PubComp::decode(flags, body).map(Packet::PubComp),
            PacketType::Subscribe => Subscribe::decode(flags, body).map(Packet::Subscribe),
            PacketType::SubAck => SubAck::decode(flags, body).map(Packet::SubAck),
            PacketType::Unsubscribe => Unsubscribe::decode(flags, body).map(Packet::Unsubscribe),
            PacketType::UnsubAck => UnsubAck::decode(flags, body).map(Packet::UnsubAck),
            PacketType::PingReq => PingReq::decode(flags, body).map(Packet::PingReq),
            PacketType::PingResp => PingResp::decode(flags, body).map(Packet::PingResp),
            PacketType::Disconnect => Disconnect::decode(flags, body).map(Packet::Disconnect),
        }
    }

    /// Decode one complete packet, fixed header included.
    ///
    /// The session engine frames incrementally and calls [`Packet::parse`]
    /// directly; this one-shot form serves hosts (and tests) that already
    /// hold a whole packet.
    pub fn decode(bytes: &'a [u8]) -> Result<Self, ProtocolError> {
        if bytes.is_empty() {
            return Err(ProtocolError::IncompletePacket { available: 0 });
        }
        let header = bytes[0];
        let packet_type = PacketType::from_header_byte(header).ok_or(
            ProtocolError::InvalidPacketType {
                packet_type: header >> 4,
            },
        )?;

        let (remaining_length, len_bytes) = read_variable_length(&bytes[1..])?;
        let body_start = 1 + len_bytes;
        if bytes.len() < body_start + remaining_length {
            return Err(ProtocolError::IncompletePacket {
                available: bytes.len(),
            });
        }

        let body = &bytes[body_start..body_start + remaining_length];
        Self::parse(packet_type, header & 0x0F, body)
    }

    fn body_len(&self) -> usize {
        match self {
            Packet::Connect(packet) => packet.body_len(),
            Packet::ConnAck(packet) => packet.body_len(),
            Packet::Publish(packet) => packet.body_len(),
            Packet::PubAck(packet) => packet.body_len(),
            Packet::PubRec(packet) => packet.body_len(),
            Packet::PubRel(packet) => packet.body_len(),
            Packet::PubComp(packet) => packet.body_len(),
            Packet::Subscribe(packet) => packet.body_len(),
            Packet::SubAck(packet) => packet.body_len(),
            Packet::Unsubscribe(packet) => packet.body_len(),
            Packet::UnsubAck(packet) => packet.body_len(),
            Packet::PingReq(packet) => packet.body_len(),
            Packet::PingResp(packet) => packet.body_len(),
            Packet::Disconnect(packet) => packet.body_len(),
        }
    }

    /// Total serialized size, fixed header included.
    pub fn encoded_len(&self) -> Result<u32, ProtocolError> {
        let body_len = self.body_len();
        if body_len > MAX_REMAINING_LENGTH {
            return Err(ProtocolError::InvalidLengthEncoding);
        }
        Ok((1 + variable_length_length(body_len) + body_len) as u32)
    }

    /// Serialize the packet into `buffer`, fixed header included, and
    /// return the number of bytes written.
    pub fn encode(&self, buffer: &mut [u8]) -> Result<usize, ProtocolError> {
        let body_len = self.body_len();
        if body_len > MAX_REMAINING_LENGTH {
            return Err(ProtocolError::InvalidLengthEncoding);
        }

        let mut writer = ByteWriter::new(buffer);
        writer.put_u8(self.header_first_byte())?;
        writer.put_variable_length(body_len)?;

        match self {
            Packet::Connect(packet) => packet.encode_body(&mut writer)?,
            Packet::ConnAck(packet) => packet.encode_body(&mut writer)?,
            Packet::Publish(packet) => packet.encode_body(&mut writer)?,
            Packet::PubAck(packet) => packet.encode_body(&mut writer)?,
            Packet::PubRec(packet) => packet.encode_body(&mut writer)?,
            Packet::PubRel(packet) => packet.encode_body(&mut writer)?,
            Packet::PubComp(packet) => packet.encode_body(&mut writer)?,
            Packet::Subscribe(packet) => packet.encode_body(&mut writer)?,
            Packet::SubAck(packet) => packet.encode_body(&mut writer)?,
            Packet::Unsubscribe(packet) => packet.encode_body(&mut writer)?,
            Packet::UnsubAck(packet) => packet.encode_body(&mut writer)?,
            Packet::PingReq(packet) => packet.encode_body(&mut writer)?,
            Packet::PingResp(packet) => packet.encode_body(&mut writer)?,
            Packet::Disconnect(packet) => packet.encode_body(&mut writer)?,
        }

        Ok(writer.written())
    }
}
