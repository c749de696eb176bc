use bytes::{Buf, BufMut, BytesMut};
use std::io::Error;
use tokio_util::codec::{Decoder, Encoder};
use tracing::trace;
use treadmill_protocol::{Frame, FrameParser};

/// Frames a treadmill byte stream.
///
/// Decoding never fails: malformed input is dropped by the parser, so the
/// only errors a `Framed` stream yields come from the transport itself.
#[derive(Debug, Default)]
pub struct FrameCodec {
    parser: FrameParser,
}

impl FrameCodec {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Decoder for FrameCodec {
    type Item = Frame;
    type Error = Error;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        while src.has_remaining() {
            let byte = src.get_u8();
            if let Some(frame) = self.parser.feed(byte) {
                trace!("Decoded frame {}", frame);
                return Ok(Some(frame));
            }
        }

        Ok(None)
    }
}

impl Encoder<Frame> for FrameCodec {
    type Error = Error;

    fn encode(&mut self, item: Frame, dst: &mut BytesMut) -> Result<(), Self::Error> {
        trace!("Encoding frame {}", item);

        dst.reserve(item.len());
        for byte in item.iter_bytes() {
            dst.put_u8(byte);
        }

        Ok(())
    }
}
