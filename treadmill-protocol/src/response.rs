use std::fmt;

use thiserror::Error;

use crate::parser::parse_word;
use crate::utils::from_tenths;
use crate::Frame;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ResponseId {
    Temperature = 0x0B,
    Pressure = 0x0C,
    Speed = 0x0D,
    Incline = 0x0E,
}

impl fmt::Display for ResponseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ResponseId::Temperature => "temperature",
            ResponseId::Pressure => "pressure",
            ResponseId::Speed => "speed",
            ResponseId::Incline => "incline",
        })
    }
}

impl TryFrom<u8> for ResponseId {
    type Error = DecodeError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0x0B => Ok(ResponseId::Temperature),
            0x0C => Ok(ResponseId::Pressure),
            0x0D => Ok(ResponseId::Speed),
            0x0E => Ok(ResponseId::Incline),
            other => Err(DecodeError::UnknownResponse(other)),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("unknown response code: 0x{0:02X}")]
    UnknownResponse(u8),

    #[error("{response} response truncated: {len} bytes")]
    Truncated { response: ResponseId, len: usize },
}

/// A reading reported by the device.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Response {
    /// Degrees Celsius.
    Temperature(f64),
    Pressure(f64),
    Speed(u16),
    Incline(u16),
}

impl Response {
    pub fn id(&self) -> ResponseId {
        match self {
            Response::Temperature(_) => ResponseId::Temperature,
            Response::Pressure(_) => ResponseId::Pressure,
            Response::Speed(_) => ResponseId::Speed,
            Response::Incline(_) => ResponseId::Incline,
        }
    }

    pub fn from_frame(frame: &Frame) -> Result<Self, DecodeError> {
        let id = ResponseId::try_from(frame.command())?;

        // every response carries one big-endian word; trailing bytes are ignored
        let (_, raw) = parse_word(frame.payload()).map_err(|_| DecodeError::Truncated {
            response: id,
            len: frame.len(),
        })?;

        Ok(match id {
            ResponseId::Temperature => Response::Temperature(from_tenths(raw)),
            ResponseId::Pressure => Response::Pressure(from_tenths(raw)),
            ResponseId::Speed => Response::Speed(raw),
            ResponseId::Incline => Response::Incline(raw),
        })
    }
}

impl TryFrom<&Frame> for Response {
    type Error = DecodeError;

    fn try_from(frame: &Frame) -> Result<Self, Self::Error> {
        Response::from_frame(frame)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Command, DEVICE_ID};

    #[test]
    fn test_decode_temperature() {
        let frame = Frame::from_bytes(b"\x02\x08\x0b\x01\x45\x03").unwrap();
        assert_eq!(Response::from_frame(&frame), Ok(Response::Temperature(32.5)));
    }

    #[test]
    fn test_decode_each_response() {
        let cases = [
            (0x0B, Response::Temperature(6553.5)),
            (0x0C, Response::Pressure(6553.5)),
            (0x0D, Response::Speed(0xFFFF)),
            (0x0E, Response::Incline(0xFFFF)),
        ];
        for (id, expected) in cases {
            let frame = Frame::new(DEVICE_ID, id, [0xFF, 0xFF]);
            assert_eq!(Response::try_from(&frame), Ok(expected));
            assert_eq!(expected.id() as u8, id);
        }
    }

    #[test]
    fn test_speed_round_trip() {
        for v in 0..=169 {
            let sent = Command::Speed(v).encode().unwrap();
            let echoed = Frame::new(DEVICE_ID, ResponseId::Speed as u8, [0x00, sent.payload()[0]]);
            assert_eq!(Response::from_frame(&echoed), Ok(Response::Speed(v as u16)));
        }
    }

    #[test]
    fn test_temperature_round_trip() {
        for raw in (0..=65535u32).step_by(7) {
            let t = f64::from(raw) / 10.0;
            let sent = Command::TemperatureSetpoint(t).encode().unwrap();
            let echoed = Frame::new(DEVICE_ID, ResponseId::Temperature as u8, sent.payload());
            assert_eq!(Response::from_frame(&echoed), Ok(Response::Temperature(t)));
        }
    }

    #[test]
    fn test_unknown_response() {
        let frame = Frame::new(DEVICE_ID, 0x42, [0x00, 0x01]);
        assert_eq!(Response::from_frame(&frame), Err(DecodeError::UnknownResponse(0x42)));
        assert_eq!(
            DecodeError::UnknownResponse(0x42).to_string(),
            "unknown response code: 0x42",
        );
    }

    #[test]
    fn test_truncated() {
        let frame = Frame::from_bytes(b"\x02\x07\x0d\x00\x03").unwrap();
        assert_eq!(
            Response::from_frame(&frame),
            Err(DecodeError::Truncated {
                response: ResponseId::Speed,
                len: 5,
            }),
        );
        let frame = Frame::new(DEVICE_ID, 0x0B, Vec::new());
        assert!(matches!(
            Response::from_frame(&frame),
            Err(DecodeError::Truncated { len: 4, .. }),
        ));
    }
}
