//! Error types for sportiduino-core

use std::fmt;

/// Result type alias for sportiduino operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core protocol errors
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Frame did not begin with the start byte
    #[error("Framing error: expected start byte 0xFE, got 0x{0:02X}")]
    Framing(u8),
    
    /// Checksum verification failed
    #[error("Checksum mismatch: expected 0x{expected:02X}, received 0x{received:02X}")]
    ChecksumMismatch {
        expected: u8,
        received: u8,
    },
    
    /// No response within the read timeout
    #[error("Timeout waiting for response")]
    Timeout,
    
    /// Command parameters do not fit in a single frame
    #[error("Parameters too long: {size} bytes (max: {max} bytes)")]
    ParameterTooLong {
        size: usize,
        max: usize,
    },
    
    /// Continuation fragment out of order or from another response
    #[error("Fragment sequence error: expected {expected}, got {actual}")]
    FragmentSequence {
        expected: String,
        actual: String,
    },
    
    /// Response split over more fragments than allowed
    #[error("Too many continuation fragments (max: {max})")]
    TooManyFragments {
        max: usize,
    },
    
    /// Payload is shorter than its layout requires
    #[error("Payload truncated: expected at least {expected} bytes, got {actual} bytes")]
    Truncated {
        expected: usize,
        actual: usize,
    },
    
    /// Value does not fit in the wire field
    #[error("Value {value} does not fit in {width} bytes")]
    Overflow {
        value: u64,
        width: usize,
    },
    
    /// Payload is well-sized but its contents are invalid
    #[error("Invalid payload: {0}")]
    InvalidPayload(String),
    
    /// No candidate port answered as a master station
    #[error("No master station found: {}", describe_attempts(.attempts))]
    NoDeviceFound {
        attempts: Vec<PortAttempt>,
    },
    
    /// Master station reported an error
    #[error("Device error: {0}")]
    Device(#[from] DeviceError),
}

impl Error {
    /// Check if error is recoverable (retry might succeed)
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::Timeout
                | Self::Device(DeviceError::CardRead)
                | Self::Device(DeviceError::CardWrite)
        )
    }
    
    /// Check if error leaves the link in an unknown state
    pub fn requires_reconnect(&self) -> bool {
        matches!(
            self,
            Self::Framing(_)
                | Self::ChecksumMismatch { .. }
                | Self::FragmentSequence { .. }
                | Self::TooManyFragments { .. }
        )
    }
}

/// Error reported by the master station in an error response
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum DeviceError {
    #[error("communication error")]
    Communication,
    
    #[error("card write error")]
    CardWrite,
    
    #[error("card read error")]
    CardRead,
    
    #[error("unknown error code 0x{0:02X}")]
    Unknown(u8),
}

impl DeviceError {
    pub const COM: u8 = 0x01;
    pub const WRITE_CARD: u8 = 0x02;
    pub const READ_CARD: u8 = 0x03;
    
    pub fn from_code(code: u8) -> Self {
        match code {
            Self::COM => Self::Communication,
            Self::WRITE_CARD => Self::CardWrite,
            Self::READ_CARD => Self::CardRead,
            other => Self::Unknown(other),
        }
    }
    
    pub fn code(self) -> u8 {
        match self {
            Self::Communication => Self::COM,
            Self::CardWrite => Self::WRITE_CARD,
            Self::CardRead => Self::READ_CARD,
            Self::Unknown(code) => code,
        }
    }
}

/// Why a candidate port was rejected during discovery
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortAttempt {
    pub address: String,
    pub reason: String,
}

impl PortAttempt {
    pub fn new(address: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            reason: reason.into(),
        }
    }
}

impl fmt::Display for PortAttempt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.address, self.reason)
    }
}

fn describe_attempts(attempts: &[PortAttempt]) -> String {
    if attempts.is_empty() {
        return "no candidate ports found".to_string();
    }
    attempts
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;
    
    #[test]
    fn test_device_error_codes() {
        assert_eq!(DeviceError::from_code(0x01), DeviceError::Communication);
        assert_eq!(DeviceError::from_code(0x02), DeviceError::CardWrite);
        assert_eq!(DeviceError::from_code(0x03), DeviceError::CardRead);
        assert_eq!(DeviceError::from_code(0x42), DeviceError::Unknown(0x42));
        assert_eq!(DeviceError::CardRead.code(), 0x03);
    }
    
    #[test]
    fn test_no_device_found_message() {
        let empty = Error::NoDeviceFound { attempts: Vec::new() };
        assert_eq!(empty.to_string(), "No master station found: no candidate ports found");
        
        let err = Error::NoDeviceFound {
            attempts: vec![
                PortAttempt::new("/dev/ttyUSB0", "permission denied"),
                PortAttempt::new("/dev/ttyUSB1", "timeout"),
            ],
        };
        assert_eq!(
            err.to_string(),
            "No master station found: /dev/ttyUSB0: permission denied; /dev/ttyUSB1: timeout"
        );
    }
    
    #[test]
    fn test_recoverable() {
        assert!(Error::Timeout.is_recoverable());
        assert!(!Error::Framing(0x00).is_recoverable());
        assert!(Error::ChecksumMismatch { expected: 1, received: 2 }.requires_reconnect());
    }
}
