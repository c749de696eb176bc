use crate::*;

pub struct FrameIterator<'a> {
    frame: &'a Frame,
    index: usize,
}

impl<'a> FrameIterator<'a> {
    pub(crate) fn new(frame: &'a Frame) -> Self {
        Self { frame, index: 0 }
    }
}

impl Iterator for FrameIterator<'_> {
    type Item = u8;

    fn next(&mut self) -> Option<Self::Item> {
        let payload = self.frame.payload();
        let b = match self.index {
            0 => STX,
            1 => self.frame.source(),
            2 => self.frame.command(),
            i if i < 3 + payload.len() => payload[i - 3],
            i if i == 3 + payload.len() => ETX,
            _ => return None,
        };
        self.index += 1;
        Some(b)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.frame.len().saturating_sub(self.index);
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for FrameIterator<'_> {}
