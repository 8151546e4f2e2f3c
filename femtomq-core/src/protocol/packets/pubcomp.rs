use crate::protocol::packets::PacketBody;
use crate::protocol::utils::{ByteReader, ByteWriter};
use crate::protocol::ProtocolError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PubComp {
    pub packet_id: u16,
}

impl PubComp {
    pub fn decode(_flags: u8, body: &[u8]) -> Result<Self, ProtocolError> {
        let packet_id = ByteReader::new(body).take_u16()?;
        Ok(Self { packet_id })
    }
}

impl PacketBody for PubComp {
    fn body_len(&self) -> usize {
        2
    }

    fn encode_body(&self, writer: &mut ByteWriter<'_>) -> Result<(), ProtocolError> {
        writer.put_u16(self.packet_id)
    }
}
