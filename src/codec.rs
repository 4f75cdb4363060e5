use bytes::{Buf, BytesMut};
use std::io::{self, Cursor};
use thiserror::Error as ThisError;
use tokio_util::codec::{Decoder, Encoder};

use crate::frame::{self, Frame};

pub const DEFAULT_MAX_FRAME_SIZE: usize = 512 * 1024 * 1024;

#[derive(Debug, ThisError)]
pub enum Error {
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error("protocol error; {0}")]
    Protocol(#[from] frame::Error),
    #[error("protocol error; frame of {size} bytes exceeds the {limit} bytes limit")]
    FrameTooLarge { size: usize, limit: usize },
}

/// Splits a byte stream into request frames and renders reply frames.
///
/// Requests come in two shapes: RESP arrays of bulk strings (anything starting with `*`) and
/// inline commands, a single line of whitespace separated tokens as typed in a telnet session.
///
/// Decoding never waits on malformed input. When a frame is broken, the bytes read up to the
/// point of failure are dropped from the buffer before the error is returned, so that calling
/// `decode` again resumes with whatever follows.
#[derive(Clone, Copy, Debug)]
pub struct FrameCodec {
    max_frame_size: usize,
}

impl FrameCodec {
    pub fn new(max_frame_size: usize) -> FrameCodec {
        FrameCodec { max_frame_size }
    }

    fn ensure_within_limit(&self, src: &mut BytesMut) -> Result<(), Error> {
        if src.len() > self.max_frame_size {
            let size = src.len();
            src.clear();
            return Err(Error::FrameTooLarge {
                size,
                limit: self.max_frame_size,
            });
        }
        Ok(())
    }

    fn decode_inline(&mut self, src: &mut BytesMut) -> Result<Option<Frame>, Error> {
        loop {
            let Some(newline) = src.iter().position(|b| *b == b'\n') else {
                self.ensure_within_limit(src)?;
                return Ok(None);
            };

            let line = src.split_to(newline + 1).freeze();
            let parts: Vec<Frame> = line
                .split(|b| b.is_ascii_whitespace())
                .filter(|token| !token.is_empty())
                .map(|token| Frame::Bulk(line.slice_ref(token)))
                .collect();

            // Blank lines are skipped, as long as the next line is not a RESP array.
            if parts.is_empty() {
                match src.first() {
                    None => return Ok(None),
                    Some(b'*') => return self.decode(src),
                    Some(_) => continue,
                }
            }

            return Ok(Some(Frame::Array(parts)));
        }
    }
}

impl Default for FrameCodec {
    fn default() -> Self {
        FrameCodec::new(DEFAULT_MAX_FRAME_SIZE)
    }
}

impl Decoder for FrameCodec {
    type Item = Frame;
    type Error = Error;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        match src.first() {
            None => return Ok(None),
            Some(b'*') => {}
            Some(_) => return self.decode_inline(src),
        }

        let mut cursor = Cursor::new(&src[..]);
        let res = Frame::parse_request(&mut cursor);
        // At least one byte is always consumed on error, otherwise the reader would spin.
        let position = (cursor.position() as usize).max(1);

        match res {
            Ok(frame) => {
                src.advance(position);
                Ok(Some(frame))
            }
            Err(frame::Error::Incomplete) => {
                self.ensure_within_limit(src)?;
                Ok(None)
            }
            // There is no telling where a request holding non-bulk elements ends.
            Err(err @ frame::Error::InvalidRequest) => {
                src.clear();
                Err(err.into())
            }
            Err(err) => {
                src.advance(position.min(src.len()));
                Err(err.into())
            }
        }
    }
}

impl Encoder<Frame> for FrameCodec {
    type Error = Error;

    fn encode(&mut self, item: Frame, dst: &mut BytesMut) -> Result<(), Self::Error> {
        dst.extend_from_slice(&item.serialize());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;

    fn bulks(parts: &[&str]) -> Frame {
        Frame::Array(
            parts
                .iter()
                .map(|p| Frame::Bulk(Bytes::copy_from_slice(p.as_bytes())))
                .collect(),
        )
    }

    #[test]
    fn decode_array_request() {
        let mut codec = FrameCodec::default();
        let mut buf = BytesMut::from(&b"*2\r\n$3\r\nGET\r\n$3\r\nfoo\r\n"[..]);

        let frame = codec.decode(&mut buf).unwrap();

        assert_eq!(frame, Some(bulks(&["GET", "foo"])));
        assert!(buf.is_empty());
    }

    #[test]
    fn decode_pipelined_requests() {
        let mut codec = FrameCodec::default();
        let mut buf = BytesMut::from(&b"*1\r\n$4\r\nPING\r\n*2\r\n$4\r\nECHO\r\n$2\r\nhi\r\n"[..]);

        assert_eq!(codec.decode(&mut buf).unwrap(), Some(bulks(&["PING"])));
        assert_eq!(codec.decode(&mut buf).unwrap(), Some(bulks(&["ECHO", "hi"])));
        assert_eq!(codec.decode(&mut buf).unwrap(), None);
    }

    #[test]
    fn decode_partial_request_waits_for_more_bytes() {
        let mut codec = FrameCodec::default();
        let mut buf = BytesMut::from(&b"*2\r\n$3\r\nGET\r\n$3\r\nfo"[..]);

        assert_eq!(codec.decode(&mut buf).unwrap(), None);
        assert_eq!(buf.len(), 19);

        buf.extend_from_slice(b"o\r\n");

        assert_eq!(codec.decode(&mut buf).unwrap(), Some(bulks(&["GET", "foo"])));
    }

    #[test]
    fn decode_truncated_request_followed_by_valid_one() {
        let mut codec = FrameCodec::default();
        let mut buf = BytesMut::from(&b"*2\r\n$3\r\nfoo"[..]);

        assert_eq!(codec.decode(&mut buf).unwrap(), None);

        buf.extend_from_slice(b"*1\r\n$4\r\nPING\r\n");

        let err = codec.decode(&mut buf).unwrap_err();
        assert!(matches!(
            err,
            Error::Protocol(frame::Error::MissingTerminator)
        ));
        assert_eq!(codec.decode(&mut buf).unwrap(), Some(bulks(&["PING"])));
    }

    #[test]
    fn decode_non_numeric_length_skips_the_line() {
        let mut codec = FrameCodec::default();
        let mut buf = BytesMut::from(&b"*abc\r\n*1\r\n$4\r\nPING\r\n"[..]);

        let err = codec.decode(&mut buf).unwrap_err();
        assert!(matches!(
            err,
            Error::Protocol(frame::Error::InvalidInteger(_))
        ));
        assert_eq!(codec.decode(&mut buf).unwrap(), Some(bulks(&["PING"])));
    }

    #[test]
    fn decode_non_bulk_element_drops_the_buffer() {
        let mut codec = FrameCodec::default();
        let mut buf = BytesMut::from(&b"*2\r\n$3\r\nGET\r\n*1\r\n$3\r\nfoo\r\n"[..]);

        let err = codec.decode(&mut buf).unwrap_err();

        assert!(matches!(
            err,
            Error::Protocol(frame::Error::InvalidRequest)
        ));
        assert!(buf.is_empty());
        assert_eq!(codec.decode(&mut buf).unwrap(), None);
    }

    #[test]
    fn decode_inline_request() {
        let mut codec = FrameCodec::default();
        let mut buf = BytesMut::from(&b"SET  foo\tbar\r\n"[..]);

        assert_eq!(
            codec.decode(&mut buf).unwrap(),
            Some(bulks(&["SET", "foo", "bar"]))
        );
        assert!(buf.is_empty());
    }

    #[test]
    fn decode_inline_request_skips_blank_lines() {
        let mut codec = FrameCodec::default();
        let mut buf = BytesMut::from(&b"\r\n   \nPING\n"[..]);

        assert_eq!(codec.decode(&mut buf).unwrap(), Some(bulks(&["PING"])));
    }

    #[test]
    fn decode_inline_request_waits_for_newline() {
        let mut codec = FrameCodec::default();
        let mut buf = BytesMut::from(&b"PIN"[..]);

        assert_eq!(codec.decode(&mut buf).unwrap(), None);

        buf.extend_from_slice(b"G\r\n");

        assert_eq!(codec.decode(&mut buf).unwrap(), Some(bulks(&["PING"])));
    }

    #[test]
    fn decode_frame_too_large() {
        let mut codec = FrameCodec::new(8);
        let mut buf = BytesMut::from(&b"*1\r\n$100\r\nabc"[..]);

        let err = codec.decode(&mut buf).unwrap_err();

        assert!(matches!(err, Error::FrameTooLarge { limit: 8, .. }));
        assert!(buf.is_empty());
    }

    #[test]
    fn encode_reply() {
        let mut codec = FrameCodec::default();
        let mut dst = BytesMut::new();

        codec.encode(Frame::Simple("OK".to_string()), &mut dst).unwrap();
        codec.encode(Frame::Null, &mut dst).unwrap();

        assert_eq!(&dst[..], b"+OK\r\n$-1\r\n");
    }
}
