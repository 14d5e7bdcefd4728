//! Response classification and dispatch
//!
//! [`classify`] is the one place where the wire-level error response turns
//! into a [`DeviceError`]. [`Response::parse`] builds on it to hand each
//! known response code to its payload parser.

use std::fmt;

use bytes::Bytes;

use sportiduino_types::{CardData, LogEntry, RawCardData, ReadMode, VersionInfo};

use crate::{
    command::ResponseCode,
    error::{DeviceError, Result},
    parse,
};

/// Translate an error response into a [`DeviceError`]
///
/// Any other response passes through unchanged.
///
/// # Examples
///
/// ```
/// use sportiduino_core::{response::classify, DeviceError};
///
/// assert_eq!(classify(0x78, &[0x02]), Err(DeviceError::CardWrite));
/// assert_eq!(classify(0x79, &[]), Ok((0x79, &[][..])));
/// ```
pub fn classify(code: u8, data: &[u8]) -> std::result::Result<(u8, &[u8]), DeviceError> {
    if code == ResponseCode::ERROR {
        return Err(device_error(data));
    }
    Ok((code, data))
}

/// Error carried by an ERROR response payload; empty payloads are `Unknown(0)`
fn device_error(data: &[u8]) -> DeviceError {
    DeviceError::from_code(data.first().copied().unwrap_or(0))
}

/// A decoded master station response
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Response {
    Log(LogEntry),
    CardData(CardData),
    CardRaw(RawCardData),
    Version(VersionInfo),
    Mode(ReadMode),
    Ok,
    Unrecognized {
        code: u8,
        data: Bytes,
    },
}

impl Response {
    /// Classify and parse a reassembled response
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Device`] for error responses and parser errors
    /// for malformed payloads.
    pub fn parse(code: u8, data: Bytes) -> Result<Self> {
        let response = match ResponseCode::from(code) {
            ResponseCode::Log => Self::Log(parse::parse_log(&data)?),
            ResponseCode::CardData => Self::CardData(parse::parse_card_data(&data)?),
            ResponseCode::CardRaw => Self::CardRaw(parse::parse_raw_card_data(&data)?),
            ResponseCode::Version => Self::Version(parse::parse_version(&data)?),
            ResponseCode::Mode => Self::Mode(parse::parse_read_mode(&data)?),
            ResponseCode::Ok => Self::Ok,
            ResponseCode::Error => return Err(device_error(&data).into()),
            ResponseCode::Unrecognized(code) => Self::Unrecognized { code, data },
        };
        
        Ok(response)
    }
    
    /// Response code this response was decoded from
    pub fn code(&self) -> ResponseCode {
        match self {
            Self::Log(_) => ResponseCode::Log,
            Self::CardData(_) => ResponseCode::CardData,
            Self::CardRaw(_) => ResponseCode::CardRaw,
            Self::Version(_) => ResponseCode::Version,
            Self::Mode(_) => ResponseCode::Mode,
            Self::Ok => ResponseCode::Ok,
            Self::Unrecognized { code, .. } => ResponseCode::Unrecognized(*code),
        }
    }
}

impl fmt::Display for Response {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Log(entry) => write!(f, "{}", entry),
            Self::CardData(card) => write!(f, "{}", card),
            Self::CardRaw(raw) => write!(f, "RawCard(pages={})", raw.len()),
            Self::Version(version) => write!(f, "Version({})", version),
            Self::Mode(mode) => write!(f, "Mode({:?})", mode),
            Self::Ok => write!(f, "Ok"),
            Self::Unrecognized { code, data } => {
                write!(f, "Unrecognized(0x{:02X}, {})", code, hex::encode(data))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use pretty_assertions::assert_eq;
    
    #[test]
    fn test_classify_errors() {
        assert_eq!(classify(0x78, &[0x01]), Err(DeviceError::Communication));
        assert_eq!(classify(0x78, &[0x02]), Err(DeviceError::CardWrite));
        assert_eq!(classify(0x78, &[0x03]), Err(DeviceError::CardRead));
        assert_eq!(classify(0x78, &[0x09]), Err(DeviceError::Unknown(0x09)));
        assert_eq!(classify(0x78, &[]), Err(DeviceError::Unknown(0x00)));
    }
    
    #[test]
    fn test_classify_passes_through() {
        assert_eq!(classify(0x79, &[]), Ok((0x79, &[][..])));
        assert_eq!(classify(0x66, &[107]), Ok((0x66, &[107][..])));
    }
    
    #[test]
    fn test_parse_ok() {
        assert_eq!(Response::parse(0x79, Bytes::new()).unwrap(), Response::Ok);
    }
    
    #[test]
    fn test_parse_version() {
        let response = Response::parse(0x66, Bytes::from_static(&[107])).unwrap();
        assert_eq!(response, Response::Version(VersionInfo::new(107)));
        assert_eq!(response.code(), ResponseCode::Version);
    }
    
    #[test]
    fn test_parse_error_response() {
        let result = Response::parse(0x78, Bytes::from_static(&[0x03]));
        assert!(matches!(result, Err(Error::Device(DeviceError::CardRead))));
        
        let result = Response::parse(0x78, Bytes::new());
        assert!(matches!(result, Err(Error::Device(DeviceError::Unknown(0)))));
    }
    
    #[test]
    fn test_parse_card_data() {
        let data = Bytes::from_static(&[0x00, 0x09, 0, 0, 0, 0, 0, 0, 0, 0, 31, 0, 0, 0, 100]);
        match Response::parse(0x63, data).unwrap() {
            Response::CardData(card) => {
                assert_eq!(card.card_number, 9);
                assert_eq!(card.punches.len(), 1);
            }
            other => panic!("Expected card data, got {:?}", other),
        }
    }
    
    #[test]
    fn test_parse_malformed_payload() {
        let result = Response::parse(0x63, Bytes::from_static(&[0x00]));
        assert!(matches!(result, Err(Error::Truncated { .. })));
    }
    
    #[test]
    fn test_parse_unrecognized() {
        let response = Response::parse(0x70, Bytes::from_static(&[1, 2])).unwrap();
        assert_eq!(
            response,
            Response::Unrecognized {
                code: 0x70,
                data: Bytes::from_static(&[1, 2]),
            }
        );
        assert_eq!(response.to_string(), "Unrecognized(0x70, 0102)");
    }
}
