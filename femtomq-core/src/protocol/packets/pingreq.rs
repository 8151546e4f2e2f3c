use crate::protocol::packets::PacketBody;
use crate::protocol::utils::ByteWriter;
use crate::protocol::ProtocolError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PingReq;

impl PingReq {
    pub fn decode(_flags: u8, _body: &[u8]) -> Result<Self, ProtocolError> {
        Ok(Self)
    }
}

impl PacketBody for PingReq {
    fn body_len(&self) -> usize {
        0
    }

    fn encode_body(&self, _writer: &mut ByteWriter<'_>) -> Result<(), ProtocolError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::packets::Packet;

    #[test]
    fn test_pingreq_packet_roundtrip() {
        assert!(matches!(
            Packet::decode(&[0xC0, 0x00]),
            Ok(Packet::PingReq(PingReq))
        ));
        let mut buffer = [0u8; 4];
        let encoded_size = Packet::PingReq(PingReq).encode(&mut buffer).unwrap();
        assert_eq!(&buffer[..encoded_size], &[0xC0, 0x00]);
    }
}
