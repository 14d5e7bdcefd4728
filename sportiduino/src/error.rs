//! High-level error types

use sportiduino_core::{Command, DeviceError, ResponseCode};

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Protocol error: {0}")]
    Protocol(sportiduino_core::Error),
    
    #[error("Master station reported {0}")]
    Device(DeviceError),
    
    #[error("Transport error: {0}")]
    Transport(sportiduino_transport::Error),
    
    #[error("Master station not connected")]
    NotConnected,
    
    #[error("Unexpected response to {command}: {response}")]
    UnexpectedResponse {
        command: Command,
        response: ResponseCode,
    },
}

impl Error {
    /// Check if the station did not answer in time
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Protocol(sportiduino_core::Error::Timeout))
    }
    
    /// Check if error is recoverable (retry might succeed)
    pub fn is_recoverable(&self) -> bool {
        match self {
            Self::Protocol(e) => e.is_recoverable(),
            Self::Device(e) => matches!(e, DeviceError::CardRead | DeviceError::CardWrite),
            _ => false,
        }
    }
    
    /// Check if error requires reconnection
    pub fn requires_reconnect(&self) -> bool {
        match self {
            Self::Protocol(e) => e.requires_reconnect(),
            Self::Transport(_) | Self::NotConnected => true,
            _ => false,
        }
    }
}

impl From<sportiduino_core::Error> for Error {
    fn from(err: sportiduino_core::Error) -> Self {
        match err {
            sportiduino_core::Error::Device(e) => Self::Device(e),
            other => Self::Protocol(other),
        }
    }
}

impl From<DeviceError> for Error {
    fn from(err: DeviceError) -> Self {
        Self::Device(err)
    }
}

impl From<sportiduino_transport::Error> for Error {
    fn from(err: sportiduino_transport::Error) -> Self {
        match err {
            sportiduino_transport::Error::ReadTimeout => Self::Protocol(sportiduino_core::Error::Timeout),
            sportiduino_transport::Error::NotConnected => Self::NotConnected,
            other => Self::Transport(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    
    #[test]
    fn test_transport_timeout_is_protocol_timeout() {
        let err = Error::from(sportiduino_transport::Error::ReadTimeout);
        assert!(err.is_timeout());
        assert!(err.is_recoverable());
    }
    
    #[test]
    fn test_device_errors_are_flattened() {
        let err = Error::from(sportiduino_core::Error::Device(DeviceError::CardWrite));
        assert!(matches!(err, Error::Device(DeviceError::CardWrite)));
        assert_eq!(err.to_string(), "Master station reported card write error");
    }
    
    #[test]
    fn test_requires_reconnect() {
        assert!(Error::from(sportiduino_core::Error::Framing(0x00)).requires_reconnect());
        assert!(Error::NotConnected.requires_reconnect());
        assert!(!Error::Device(DeviceError::CardRead).requires_reconnect());
    }
}
