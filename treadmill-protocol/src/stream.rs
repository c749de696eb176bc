use std::mem;

use crate::{Frame, ETX, MAX_FRAME_LEN, STX};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ParserState {
    #[default]
    Idle,
    Accumulating { buffer: Vec<u8> },
}

/// Byte driven framer for the inbound stream.
///
/// STX always starts a new frame, discarding whatever was accumulated. ETX
/// closes it. A closed frame that fails validation is dropped and the parser
/// waits for the next STX; there is no other resynchronization.
#[derive(Debug, Clone)]
pub struct FrameParser {
    state: ParserState,
    capacity: usize,
}

impl Default for FrameParser {
    fn default() -> Self {
        Self::with_capacity(MAX_FRAME_LEN)
    }
}

impl FrameParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bytes past `capacity` are discarded, so an overlong frame never keeps
    /// its ETX and fails validation once closed.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            state: ParserState::Idle,
            capacity,
        }
    }

    pub fn state(&self) -> &ParserState {
        &self.state
    }

    pub fn is_idle(&self) -> bool {
        self.state == ParserState::Idle
    }

    pub fn reset(&mut self) {
        self.state = ParserState::Idle;
    }

    pub fn feed(&mut self, byte: u8) -> Option<Frame> {
        if byte == STX {
            let mut buffer = Vec::with_capacity(self.capacity);
            buffer.push(STX);
            self.state = ParserState::Accumulating { buffer };
            return None;
        }

        let ParserState::Accumulating { buffer } = &mut self.state else {
            // noise between frames
            return None;
        };

        if buffer.len() < self.capacity {
            buffer.push(byte);
        }
        if byte != ETX {
            return None;
        }

        let buffer = mem::take(buffer);
        self.state = ParserState::Idle;
        Frame::from_bytes(&buffer).ok()
    }

    pub fn feed_all(&mut self, bytes: &[u8]) -> Vec<Frame> {
        bytes.iter().filter_map(|b| self.feed(*b)).collect()
    }
}
