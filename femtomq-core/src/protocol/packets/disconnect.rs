use crate::protocol::packets::PacketBody;
use crate::protocol::utils::ByteWriter;
use crate::protocol::ProtocolError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Disconnect;

impl Disconnect {
    pub fn decode(_flags: u8, _body: &[u8]) -> Result<Self, ProtocolError> {
        Ok(Self)
    }
}

impl PacketBody for Disconnect {
    fn body_len(&self) -> usize {
        0
    }

    fn encode_body(&self, _writer: &mut ByteWriter<'_>) -> Result<(), ProtocolError> {
        Ok(())
    }
}
