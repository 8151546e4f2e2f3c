use crate::protocol::packets::PacketBody;
use crate::protocol::utils::{ByteReader, ByteWriter};
use crate::protocol::ProtocolError;

#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectReturnCode {
    Accepted = 0,
    UnacceptableProtocolVersion = 1,
    IdentifierRejected = 2,
    ServerUnavailable = 3,
    BadUserNameOrPassword = 4,
    NotAuthorized = 5,
}

impl TryFrom<u8> for ConnectReturnCode {
    type Error = ProtocolError;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(ConnectReturnCode::Accepted),
            1 => Ok(ConnectReturnCode::UnacceptableProtocolVersion),
            2 => Ok(ConnectReturnCode::IdentifierRejected),
            3 => Ok(ConnectReturnCode::ServerUnavailable),
            4 => Ok(ConnectReturnCode::BadUserNameOrPassword),
            5 => Ok(ConnectReturnCode::NotAuthorized),
            _ => Err(ProtocolError::InvalidConnectReturnCode { return_code: code }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConnAck {
    pub session_present: bool,
    pub return_code: ConnectReturnCode,
}

impl ConnAck {
    pub fn decode(_flags: u8, body: &[u8]) -> Result<Self, ProtocolError> {
        let mut reader = ByteReader::new(body);
        let session_present = match reader.take_u8()? {
            0b0000_0000 => false,
            0b0000_0001 => true,
            flag => return Err(ProtocolError::InvalidSessionPresentFlag { flag }),
        };
        let return_code = ConnectReturnCode::try_from(reader.take_u8()?)?;
        Ok(Self {
            session_present,
            return_code,
        })
    }
}

impl PacketBody for ConnAck {
    fn body_len(&self) -> usize {
        2
    }

    fn encode_body(&self, writer: &mut ByteWriter<'_>) -> Result<(), ProtocolError> {
        writer.put_u8(if self.session_present { 0b0000_0001 } else { 0b0000_0000 })?;
        writer.put_u8(self.return_code as u8)
    }
}

impl core::fmt::Display for ConnAck {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(
            f,
            "ConnAck {{ session_present: {}, return_code: {:?} }}",
            self.session_present, self.return_code
        )
    }
}
