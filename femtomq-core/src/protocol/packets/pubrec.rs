use crate::protocol::packets::PacketBody;
use crate::protocol::utils::{ByteReader, ByteWriter};
use crate::protocol::ProtocolError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PubRec {
    pub packet_id: u16,
}

impl PubRec {
    pub fn decode(_flags: u8, body: &[u8]) -> Result<Self, ProtocolError> {
        let packet_id = ByteReader::new(body).take_u16()?;
        Ok(Self { packet_id })
    }
}

impl PacketBody for PubRec {
    fn body_len(&self) -> usize {
        2
    }

    fn encode_body(&self, writer: &mut ByteWriter<'_>) -> Result<(), ProtocolError> {
        writer.put_u16(self.packet_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::packets::Packet;

    #[test]
    fn test_pubrec_packet_roundtrip() {
        let packet = match Packet::decode(&[0x50, 0x02, 0x00, 0x2A]) {
            Ok(Packet::PubRec(pubrec)) => pubrec,
            other => panic!("expected PUBREC, got {:?}", other),
        };
        assert_eq!(packet.packet_id, 42);
        let mut buffer = [0u8; 8];
        let encoded_size = Packet::PubRec(packet).encode(&mut buffer).unwrap();
        assert_eq!(&buffer[..encoded_size], &[0x50, 0x02, 0x00, 0x2A]);
    }
}
