//! Sportiduino frame structure and encoding/decoding

use bytes::{Buf, BufMut, Bytes, BytesMut};
use std::fmt;

use crate::{
    checksum,
    command::{Command, ResponseCode},
    constants::{FRAGMENT_OFFSET, MAX_DATA_LEN, START_BYTE},
    error::{Error, Result},
};

/// Sportiduino protocol frame
///
/// # Frame Structure
///
/// ```text
/// ┌──────────┬──────────┬──────────┬──────────────┬──────────┐
/// │  Start   │   Code   │  Length  │   Payload    │ Checksum │
/// │  0xFE    │  1 byte  │  1 byte  │  0..25 bytes │  1 byte  │
/// └──────────┴──────────┴──────────┴──────────────┴──────────┘
/// ```
///
/// The checksum is the 8-bit sum of code, length and payload. A length
/// above `0x1E` marks a continuation fragment carrying a full 25-byte
/// payload; its 1-based index is `length - 0x1E`. Multi-byte values inside
/// payloads are big-endian.
///
/// # Examples
///
/// ```
/// use sportiduino_core::{Command, Frame};
///
/// let frame = Frame::request(Command::ReadVersion, &[]).unwrap();
/// assert_eq!(frame.encode().as_ref(), &[0xFE, 0x46, 0x00, 0x46]);
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct Frame {
    /// Command code (outbound) or response code (inbound)
    pub code: u8,
    
    /// Length byte as sent on the wire
    pub length: u8,
    
    /// Frame payload
    pub payload: Bytes,
}

impl Frame {
    /// Start byte, code, length and checksum
    pub const OVERHEAD: usize = 4;
    
    /// Create a frame whose length byte is the payload length
    ///
    /// # Errors
    ///
    /// Returns [`Error::ParameterTooLong`] if the payload exceeds 25 bytes.
    pub fn new(code: u8, payload: impl Into<Bytes>) -> Result<Self> {
        let payload = payload.into();
        if payload.len() > MAX_DATA_LEN {
            return Err(Error::ParameterTooLong {
                size: payload.len(),
                max: MAX_DATA_LEN,
            });
        }
        
        Ok(Self {
            code,
            length: payload.len() as u8,
            payload,
        })
    }
    
    /// Create an outbound command frame
    pub fn request(command: Command, parameters: &[u8]) -> Result<Self> {
        Self::new(command.into(), Bytes::copy_from_slice(parameters))
    }
    
    /// Create a continuation fragment with the given 1-based index
    ///
    /// Continuation fragments always carry a full payload.
    pub fn continuation(code: u8, index: u8, payload: impl Into<Bytes>) -> Result<Self> {
        let payload = payload.into();
        if payload.len() != MAX_DATA_LEN {
            return Err(Error::InvalidPayload(format!(
                "continuation fragment must carry {} bytes, got {}",
                MAX_DATA_LEN,
                payload.len()
            )));
        }
        
        let length = FRAGMENT_OFFSET
            .checked_add(index)
            .filter(|_| index > 0)
            .ok_or(Error::Overflow {
                value: u64::from(index),
                width: 1,
            })?;
        
        Ok(Self {
            code,
            length,
            payload,
        })
    }
    
    /// Number of payload bytes that follow a given length byte
    pub fn payload_len(length: u8) -> usize {
        usize::from(length).min(MAX_DATA_LEN)
    }
    
    /// Rebuild a received frame from its fields, verifying the checksum
    ///
    /// # Errors
    ///
    /// Returns an error if the payload size does not match the length byte
    /// or the checksum does not match.
    pub fn from_parts(code: u8, length: u8, payload: Bytes, received: u8) -> Result<Self> {
        let expected_len = Self::payload_len(length);
        if payload.len() != expected_len {
            return Err(Error::Truncated {
                expected: expected_len,
                actual: payload.len(),
            });
        }
        
        let frame = Self {
            code,
            length,
            payload,
        };
        
        let expected = frame.checksum();
        if expected != received {
            return Err(Error::ChecksumMismatch { expected, received });
        }
        
        Ok(frame)
    }
    
    /// Calculate checksum for this frame
    pub fn checksum(&self) -> u8 {
        let mut body = Vec::with_capacity(2 + self.payload.len());
        body.push(self.code);
        body.push(self.length);
        body.extend_from_slice(&self.payload);
        checksum::calculate(&body)
    }
    
    /// Encode frame to bytes
    ///
    /// # Examples
    ///
    /// ```
    /// use sportiduino_core::{Command, Frame};
    ///
    /// let frame = Frame::request(Command::SetCpNumber, &[31]).unwrap();
    /// let bytes = frame.encode();
    /// assert_eq!(bytes.len(), 5);
    /// ```
    pub fn encode(&self) -> BytesMut {
        let mut buf = BytesMut::with_capacity(self.size());
        
        buf.put_u8(START_BYTE);
        buf.put_u8(self.code);
        buf.put_u8(self.length);
        buf.put_slice(&self.payload);
        buf.put_u8(self.checksum());
        
        buf
    }
    
    /// Decode one frame from the front of a buffer
    ///
    /// Bytes after the frame are ignored.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The first byte is not the start byte
    /// - Buffer is shorter than the frame it announces
    /// - Checksum verification fails
    ///
    /// # Examples
    ///
    /// ```
    /// use bytes::BytesMut;
    /// use sportiduino_core::Frame;
    ///
    /// let frame = Frame::decode(BytesMut::from(&[0xFE, 0x66, 0x01, 0x6B, 0xD2][..])).unwrap();
    /// assert_eq!(frame.code, 0x66);
    /// assert_eq!(frame.payload.as_ref(), &[0x6B]);
    /// ```
    pub fn decode(mut buf: BytesMut) -> Result<Self> {
        if buf.len() < Self::OVERHEAD {
            return Err(Error::Truncated {
                expected: Self::OVERHEAD,
                actual: buf.len(),
            });
        }
        
        let start = buf.get_u8();
        if start != START_BYTE {
            return Err(Error::Framing(start));
        }
        
        let code = buf.get_u8();
        let length = buf.get_u8();
        let payload_len = Self::payload_len(length);
        
        if buf.len() < payload_len + 1 {
            return Err(Error::Truncated {
                expected: Self::OVERHEAD + payload_len,
                actual: Self::OVERHEAD - 1 + buf.len(),
            });
        }
        
        let payload = buf.split_to(payload_len).freeze();
        let checksum = buf.get_u8();
        
        Self::from_parts(code, length, payload, checksum)
    }
    
    /// Response code of a received frame
    pub fn response_code(&self) -> ResponseCode {
        ResponseCode::from(self.code)
    }
    
    /// Check if more fragments follow this one
    pub fn is_continuation(&self) -> bool {
        self.length > FRAGMENT_OFFSET
    }
    
    /// 1-based fragment index of a continuation frame
    pub fn fragment_index(&self) -> Option<u8> {
        self.is_continuation().then(|| self.length - FRAGMENT_OFFSET)
    }
    
    /// Get total frame size
    pub fn size(&self) -> usize {
        Self::OVERHEAD + self.payload.len()
    }
}

impl fmt::Debug for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Frame")
            .field("code", &format!("0x{:02X}", self.code))
            .field("length", &format!("0x{:02X}", self.length))
            .field("payload", &hex::encode(&self.payload))
            .field("checksum", &format!("0x{:02X}", self.checksum()))
            .finish()
    }
}

impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.fragment_index() {
            Some(index) => write!(
                f,
                "Frame[0x{:02X}](fragment={}, len={})",
                self.code,
                index,
                self.payload.len()
            ),
            None => write!(f, "Frame[0x{:02X}](len={})", self.code, self.payload.len()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;
    
    #[test]
    fn test_frame_request() {
        let frame = Frame::request(Command::SetCpNumber, &[31]).unwrap();
        assert_eq!(frame.code, 0x42);
        assert_eq!(frame.length, 1);
        assert_eq!(frame.encode().as_ref(), &[0xFE, 0x42, 0x01, 0x1F, 0x62]);
    }
    
    #[test]
    fn test_frame_version_request() {
        let frame = Frame::request(Command::ReadVersion, &[]).unwrap();
        assert_eq!(frame.encode().as_ref(), &[0xFE, 0x46, 0x00, 0x46]);
    }
    
    #[test]
    fn test_frame_too_long() {
        let result = Frame::request(Command::InitCard, &[0; 26]);
        assert!(matches!(
            result,
            Err(Error::ParameterTooLong { size: 26, max: 25 })
        ));
    }
    
    #[test]
    fn test_frame_max_len() {
        let frame = Frame::request(Command::InitCard, &[0xAA; 25]).unwrap();
        let decoded = Frame::decode(frame.encode()).unwrap();
        assert!(!decoded.is_continuation());
        assert_eq!(decoded.payload.len(), 25);
    }
    
    #[test]
    fn test_frame_decode_response() {
        let buf = BytesMut::from(&[0xFE, 0x79, 0x00, 0x79][..]);
        let frame = Frame::decode(buf).unwrap();
        
        assert_eq!(frame.response_code(), ResponseCode::Ok);
        assert!(frame.payload.is_empty());
        assert_eq!(frame.fragment_index(), None);
    }
    
    #[test]
    fn test_frame_bad_start_byte() {
        let buf = BytesMut::from(&[0xFD, 0x79, 0x00, 0x79][..]);
        assert!(matches!(Frame::decode(buf), Err(Error::Framing(0xFD))));
    }
    
    #[test]
    fn test_frame_checksum_verification() {
        let mut encoded = Frame::request(Command::SetCpNumber, &[31]).unwrap().encode();
        
        // Corrupt checksum (last byte)
        let last = encoded.len() - 1;
        encoded[last] ^= 0xFF;
        
        match Frame::decode(encoded) {
            Err(Error::ChecksumMismatch { expected, received }) => assert_ne!(expected, received),
            other => panic!("Expected ChecksumMismatch error, got {:?}", other),
        }
    }
    
    #[test]
    fn test_frame_too_short() {
        let buf = BytesMut::from(&[0xFE, 0x63, 0x05, 0x00][..]);
        assert!(matches!(Frame::decode(buf), Err(Error::Truncated { .. })));
        
        let buf = BytesMut::from(&[0xFE, 0x63][..]);
        assert!(matches!(Frame::decode(buf), Err(Error::Truncated { .. })));
    }
    
    #[test]
    fn test_continuation_fragment() {
        let frame = Frame::continuation(0x63, 2, vec![0x11; 25]).unwrap();
        assert_eq!(frame.length, 0x20);
        assert!(frame.is_continuation());
        assert_eq!(frame.fragment_index(), Some(2));
        
        let decoded = Frame::decode(frame.encode()).unwrap();
        assert_eq!(decoded, frame);
    }
    
    #[test]
    fn test_continuation_requires_full_payload() {
        assert!(Frame::continuation(0x63, 1, vec![0; 10]).is_err());
        assert!(Frame::continuation(0x63, 0, vec![0; 25]).is_err());
        assert!(Frame::continuation(0x63, 0xF0, vec![0; 25]).is_err());
    }
    
    #[test]
    fn test_payload_len_clamped() {
        assert_eq!(Frame::payload_len(0), 0);
        assert_eq!(Frame::payload_len(25), 25);
        assert_eq!(Frame::payload_len(28), 25);
        assert_eq!(Frame::payload_len(0x1F), 25);
    }
    
    proptest! {
        #[test]
        fn prop_encode_decode(code in any::<u8>(), params in proptest::collection::vec(any::<u8>(), 0..=25)) {
            let frame = Frame::new(code, params.clone()).unwrap();
            let decoded = Frame::decode(frame.encode()).unwrap();
            
            prop_assert_eq!(decoded.code, code);
            prop_assert_eq!(decoded.payload.as_ref(), params.as_slice());
            prop_assert!(!decoded.is_continuation());
        }
    }
}
