use crate::protocol::packets::PacketBody;
use crate::protocol::utils::{ByteReader, ByteWriter};
use crate::protocol::ProtocolError;

/// PUBREL is transmitted with fixed header flags 0b0010 (a reserved-bits
/// requirement of the protocol; see `Packet::flags`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PubRel {
    pub packet_id: u16,
}

impl PubRel {
    pub fn decode(_flags: u8, body: &[u8]) -> Result<Self, ProtocolError> {
        let packet_id = ByteReader::new(body).take_u16()?;
        Ok(Self { packet_id })
    }
}

impl PacketBody for PubRel {
    fn body_len(&self) -> usize {
        2
    }

    fn encode_body(&self, writer: &mut ByteWriter<'_>) -> Result<(), ProtocolError> {
        writer.put_u16(self.packet_id)
    }
}

impl core::fmt::Display for PubRel {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "PubRel {{ packet_id: {} }}", self.packet_id)
    }
}
