use crate::protocol::packets::PacketBody;
use crate::protocol::qos::QoS;
use crate::protocol::utils::{ByteReader, ByteWriter};
use crate::protocol::ProtocolError;

/// One entry of a SUBACK payload: the granted QoS, or a failure marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubAckReturnCode {
    Success(QoS),
    Failure,
}

impl SubAckReturnCode {
    pub const fn from_u8(code: u8) -> Result<Self, ProtocolError> {
        match code {
            0 => Ok(SubAckReturnCode::Success(QoS::AtMostOnce)),
            1 => Ok(SubAckReturnCode::Success(QoS::AtLeastOnce)),
            2 => Ok(SubAckReturnCode::Success(QoS::ExactlyOnce)),
            0x80 => Ok(SubAckReturnCode::Failure),
            _ => Err(ProtocolError::InvalidReturnCode { code }),
        }
    }
}

/// Decoded SUBACK return-code list, kept in wire form (one byte per
/// requested topic filter, in request order).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReturnCodes<'a> {
    wire: &'a [u8],
}

impl<'a> ReturnCodes<'a> {
    fn validate(wire: &'a [u8]) -> Result<Self, ProtocolError> {
        for &code in wire {
            SubAckReturnCode::from_u8(code)?;
        }
        Ok(Self { wire })
    }

    pub(crate) fn as_bytes(&self) -> &'a [u8] {
        self.wire
    }

    pub fn len(&self) -> usize {
        self.wire.len()
    }

    pub fn is_empty(&self) -> bool {
        self.wire.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = SubAckReturnCode> + 'a {
        // validated at decode time, so the fallback arm is unreachable
        self.wire
            .iter()
            .map(|&code| SubAckReturnCode::from_u8(code).unwrap_or(SubAckReturnCode::Failure))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubAck<'a> {
    pub packet_id: u16,
    pub return_codes: ReturnCodes<'a>,
}

impl<'a> SubAck<'a> {
    pub fn decode(_flags: u8, body: &'a [u8]) -> Result<Self, ProtocolError> {
        let mut reader = ByteReader::new(body);
        let packet_id = reader.take_u16()?;
        let return_codes = ReturnCodes::validate(reader.take_rest())?;
        Ok(Self {
            packet_id,
            return_codes,
        })
    }
}

impl PacketBody for SubAck<'_> {
    fn body_len(&self) -> usize {
        2 + self.return_codes.as_bytes().len()
    }

    fn encode_body(&self, writer: &mut ByteWriter<'_>) -> Result<(), ProtocolError> {
        writer.put_u16(self.packet_id)?;
        writer.put_bytes(self.return_codes.as_bytes())
    }
}
