//! Common message header encoding and decoding.
//!
//! Every hub message starts with the same header:
//! ```text
//! ┌──────────────┬──────────┬──────────┬─────────────────┐
//! │  length      │  hub id  │  type    │    content      │
//! │  1-2 bytes   │  1 byte  │  1 byte  │                 │
//! └──────────────┴──────────┴──────────┴─────────────────┘
//! ```
//!
//! The length covers the whole message, including the length field itself.
//! Lengths below 128 fit in one byte. Longer messages use two bytes: the
//! low seven bits with the high bit set, followed by the remaining bits.

use bytes::{BufMut, Bytes, BytesMut};

use crate::error::FrameError;

/// Largest length the two-byte prefix can express.
pub const MAX_MESSAGE_LEN: usize = 0x7FFF;

/// Largest length that fits in the single-byte prefix.
const SHORT_LENGTH_MAX: usize = 0x7F;

/// Continuation bit of the first length byte.
const LENGTH_CONTINUATION: u8 = 0x80;

/// Bytes after the length prefix that belong to the header (hub id, type).
const HEADER_TAIL_LEN: usize = 2;

/// A parsed common header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    /// Declared total message length.
    pub length: usize,
    /// Hub identifier.
    pub hub_id: u8,
    /// Message type discriminant.
    pub message_type: u8,
    /// Number of header bytes, i.e. the content offset.
    pub header_len: usize,
}

/// Computes the total encoded length for a message with `content_len` content bytes.
#[must_use]
pub const fn total_length(content_len: usize) -> usize {
    let short = 1 + HEADER_TAIL_LEN + content_len;
    if short <= SHORT_LENGTH_MAX { short } else { short + 1 }
}

/// Writes the length prefix for a message of `length` total bytes.
///
/// # Errors
///
/// Returns [`FrameError::TooLarge`] if the length exceeds [`MAX_MESSAGE_LEN`].
pub fn put_length(buf: &mut BytesMut, length: usize) -> Result<(), FrameError> {
    if length > MAX_MESSAGE_LEN {
        return Err(FrameError::TooLarge {
            size: length,
            max: MAX_MESSAGE_LEN,
        });
    }

    if length <= SHORT_LENGTH_MAX {
        buf.put_u8(length as u8);
    } else {
        buf.put_u8((length as u8 & 0x7F) | LENGTH_CONTINUATION);
        buf.put_u8((length >> 7) as u8);
    }
    Ok(())
}

/// Reads the length prefix, returning the declared length and the prefix width.
///
/// # Errors
///
/// Returns [`FrameError::TooShort`] if the prefix is truncated.
pub fn read_length(data: &[u8]) -> Result<(usize, usize), FrameError> {
    let first = *data.first().ok_or(FrameError::TooShort { needed: 1, got: 0 })?;

    if first & LENGTH_CONTINUATION == 0 {
        return Ok((usize::from(first), 1));
    }

    let second = *data.get(1).ok_or(FrameError::TooShort {
        needed: 2,
        got: data.len(),
    })?;
    let length = usize::from(first & 0x7F) | (usize::from(second) << 7);
    Ok((length, 2))
}

/// Parses and validates the common header of a complete message buffer.
///
/// # Errors
///
/// Returns a `FrameError` if the buffer is shorter than the header or the
/// declared length differs from the buffer length.
pub fn read_header(data: &[u8]) -> Result<Header, FrameError> {
    let (length, prefix_len) = read_length(data)?;

    if length != data.len() {
        return Err(FrameError::LengthMismatch {
            declared: length,
            actual: data.len(),
        });
    }

    let header_len = prefix_len + HEADER_TAIL_LEN;
    if data.len() < header_len {
        return Err(FrameError::TooShort {
            needed: header_len,
            got: data.len(),
        });
    }

    Ok(Header {
        length,
        hub_id: data[prefix_len],
        message_type: data[prefix_len + 1],
        header_len,
    })
}

/// Frames `content` with a common header.
///
/// # Errors
///
/// Returns [`FrameError::TooLarge`] if the message cannot be length-prefixed.
pub fn encode(hub_id: u8, message_type: u8, content: &[u8]) -> Result<Bytes, FrameError> {
    let length = total_length(content.len());
    let mut buf = BytesMut::with_capacity(length);
    put_length(&mut buf, length)?;
    buf.put_u8(hub_id);
    buf.put_u8(message_type);
    buf.put_slice(content);
    Ok(buf.freeze())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_short() {
        let frame = encode(0x00, 0x81, &[0x00, 0x11, 0x01, 0x32]).unwrap();
        assert_eq!(&frame[..], &[0x07, 0x00, 0x81, 0x00, 0x11, 0x01, 0x32]);
    }

    #[test]
    fn test_encode_long_uses_two_byte_prefix() {
        let content = vec![0xAA; 200];
        let frame = encode(0x00, 0x44, &content).unwrap();
        assert_eq!(frame.len(), 204);
        assert_eq!(frame[0], (204 & 0x7F) as u8 | 0x80);
        assert_eq!(frame[1], (204 >> 7) as u8);
        assert_eq!(read_length(&frame).unwrap(), (204, 2));
    }

    #[test]
    fn test_length_boundary() {
        // 124 content bytes + 3 header bytes = 127, the last single-byte length
        assert_eq!(total_length(124), 127);
        assert_eq!(total_length(125), 129);
    }

    #[test]
    fn test_read_header() {
        let data = [0x05, 0x00, 0x43, 0x64, 0x02];
        let header = read_header(&data).unwrap();
        assert_eq!(
            header,
            Header {
                length: 5,
                hub_id: 0x00,
                message_type: 0x43,
                header_len: 3,
            }
        );
    }

    #[test]
    fn test_read_header_length_mismatch() {
        let data = [0x0A, 0x00, 0x45, 0x01, 0x02, 0x03];
        assert_eq!(
            read_header(&data),
            Err(FrameError::LengthMismatch {
                declared: 10,
                actual: 6,
            })
        );
    }

    #[test]
    fn test_read_header_empty() {
        assert_eq!(
            read_header(&[]),
            Err(FrameError::TooShort { needed: 1, got: 0 })
        );
    }

    #[test]
    fn test_put_length_too_large() {
        let mut buf = BytesMut::new();
        assert!(matches!(
            put_length(&mut buf, MAX_MESSAGE_LEN + 1),
            Err(FrameError::TooLarge { .. })
        ));
    }
}
