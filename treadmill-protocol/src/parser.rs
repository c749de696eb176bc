use nom::{
    bytes::complete::{tag, take},
    combinator::eof,
    error::{Error, ErrorKind},
    number::complete::{be_u16, u8 as byte},
    Err, IResult, Parser,
};
use crate::{Frame, ETX, MIN_FRAME_LEN, STX};

fn tag_start(i: &[u8]) -> IResult<&[u8], &[u8]> {
    tag(&[STX][..]).parse(i)
}

fn tag_end(i: &[u8]) -> IResult<&[u8], &[u8]> {
    tag(&[ETX][..]).parse(i)
}

fn header_byte(i: &[u8]) -> IResult<&[u8], u8> {
    byte(i)
}

fn end_of_input(i: &[u8]) -> IResult<&[u8], &[u8]> {
    eof(i)
}

pub type ParseError<'a> = Err<Error<&'a [u8]>>;

/// Parses exactly one frame spanning the whole input.
///
/// Without a length field the payload is whatever sits between the command
/// byte and the trailing ETX.
pub fn parse_frame(i: &[u8]) -> IResult<&[u8], Frame> {
    if i.len() < MIN_FRAME_LEN {
        return Err(Err::Error(Error::new(i, ErrorKind::Eof)));
    }
    let payload_len = i.len() - MIN_FRAME_LEN;

    let (i, (_, source, command, payload, _, _)) = (
        tag_start,
        header_byte,
        header_byte,
        take(payload_len),
        tag_end,
        end_of_input,
    )
        .parse(i)?;

    Ok((i, Frame::new(source, command, payload)))
}

/// Reads the big-endian 16 bit value leading a response payload.
pub fn parse_word(i: &[u8]) -> IResult<&[u8], u16> {
    be_u16(i)
}
