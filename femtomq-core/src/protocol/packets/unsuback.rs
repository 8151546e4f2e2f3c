use crate::protocol::packets::PacketBody;
use crate::protocol::utils::{ByteReader, ByteWriter};
use crate::protocol::ProtocolError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnsubAck {
    pub packet_id: u16,
}

impl UnsubAck {
    pub fn decode(_flags: u8, body: &[u8]) -> Result<Self, ProtocolError> {
        let packet_id = ByteReader::new(body).take_u16()?;
        Ok(Self { packet_id })
    }
}

impl PacketBody for UnsubAck {
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
    fn test_unsuback_packet_roundtrip() {
        let packet = match Packet::decode(&[0xB0, 0x02, 0x12, 0x34]) {
            Ok(Packet::UnsubAck(unsuback)) => unsuback,
            other => panic!("expected UNSUBACK, got {:?}", other),
        };
        assert_eq!(packet.packet_id, 0x1234);
        let mut buffer = [0u8; 8];
        let encoded_size = Packet::UnsubAck(packet).encode(&mut buffer).unwrap();
        assert_eq!(&buffer[..encoded_size], &[0xB0, 0x02, 0x12, 0x34]);
    }

    #[test]
    fn test_unsuback_truncated_body() {
        let result = Packet::decode(&[0xB0, 0x00]);
        assert!(matches!(
            result,
            Err(ProtocolError::IncompletePacket { .. })
        ));
    }
}
