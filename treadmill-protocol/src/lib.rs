use std::fmt;

pub const STX: u8 = 0x02;
pub const ETX: u8 = 0x03;
/// Sender tag carried by every frame the host writes.
pub const HOST_ID: u8 = 0x08;
/// Sender tag the device puts on its responses. Inbound frames are not checked against it.
pub const DEVICE_ID: u8 = 0x07;

/// STX + sender + command + ETX.
pub const MIN_FRAME_LEN: usize = 4;
pub const MAX_FRAME_LEN: usize = 128;

/// One STX..ETX delimited unit on the wire.
///
/// There is no length field, checksum or escaping: a payload byte equal to
/// ETX ends the frame early and one equal to STX restarts it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    source: u8,
    command: u8,
    payload: Vec<u8>,
}

impl Frame {
    pub fn new(source: u8, command: u8, payload: impl Into<Vec<u8>>) -> Self {
        Self {
            source,
            command,
            payload: payload.into(),
        }
    }

    /// A frame tagged as coming from the host.
    pub fn outbound(command: u8, payload: impl Into<Vec<u8>>) -> Self {
        Self::new(HOST_ID, command, payload)
    }

    pub fn source(&self) -> u8 {
        self.source
    }

    pub fn command(&self) -> u8 {
        self.command
    }

    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    /// Length on the wire, delimiters included.
    pub fn len(&self) -> usize {
        self.payload.len() + MIN_FRAME_LEN
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ParseError<'_>> {
        let (_, frame) = parser::parse_frame(bytes)?;
        Ok(frame)
    }

    pub fn iter_bytes(&self) -> iterator::FrameIterator<'_> {
        iterator::FrameIterator::new(self)
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        self.iter_bytes().collect::<Vec<u8>>()
    }
}

impl<'a> TryFrom<&'a [u8]> for Frame {
    type Error = ParseError<'a>;

    fn try_from(bytes: &'a [u8]) -> Result<Self, Self::Error> {
        Frame::from_bytes(bytes)
    }
}

impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, b) in self.iter_bytes().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "0x{:02X}", b)?;
        }
        Ok(())
    }
}

pub use command::{Command, CommandId, OperationMode, RangeError, Rgb, RgbColor};
pub use parser::ParseError;
pub use response::{DecodeError, Response, ResponseId};
pub use stream::{FrameParser, ParserState};
pub use utils::{from_tenths, to_tenths};

mod command;
mod iterator;
mod parser;
mod response;
mod stream;
mod utils;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_hex() {
        let frame = Frame::outbound(0x01, [0x2A]);
        assert_eq!(frame.to_string(), "0x02 0x08 0x01 0x2A 0x03");
        assert_eq!(frame.len(), 5);
    }

    #[test]
    fn test_try_from() {
        let bytes: &[u8] = b"\x02\x07\x0d\x00\x2a\x03";
        let frame = Frame::try_from(bytes).unwrap();
        assert_eq!(frame.source(), DEVICE_ID);
        assert_eq!(frame.command(), 0x0D);
        assert_eq!(frame.payload(), b"\x00\x2a");
    }
}
