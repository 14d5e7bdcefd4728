//! Sportiduino command and response codes

use std::fmt;

use crate::error::{Error, Result};

/// Command codes sent to the master station
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Command {
    // Station configuration
    SetTime = 0x41,
    SetCpNumber = 0x42,
    SetPassword = 0x43,
    
    // Card writing
    InitCard = 0x44,
    WritePages = 0x45,
    
    // Station information
    ReadVersion = 0x46,
    
    // Log reader cards
    InitLogReader = 0x47,
    ReadLogReader = 0x48,
    
    // Card reading
    SetReadMode = 0x49,
    ReadCard = 0x4B,
    ReadRaw = 0x4C,
    InitSleepCard = 0x4E,
    
    // Signalling
    BeepError = 0x58,
    BeepOk = 0x59,
}

impl Command {
    /// Get command name
    pub fn name(self) -> &'static str {
        match self {
            Self::SetTime => "CMD_SET_TIME",
            Self::SetCpNumber => "CMD_SET_CP_NUM",
            Self::SetPassword => "CMD_SET_PASSWD",
            Self::InitCard => "CMD_INIT_CARD",
            Self::WritePages => "CMD_WRITE_PAGES6_7",
            Self::ReadVersion => "CMD_READ_VERSION",
            Self::InitLogReader => "CMD_INIT_LOGREADER",
            Self::ReadLogReader => "CMD_READ_LOGREADER",
            Self::SetReadMode => "CMD_SET_READ_MODE",
            Self::ReadCard => "CMD_READ_CARD",
            Self::ReadRaw => "CMD_READ_RAW",
            Self::InitSleepCard => "CMD_INIT_SLEEPCARD",
            Self::BeepError => "CMD_BEEP_ERROR",
            Self::BeepOk => "CMD_BEEP_OK",
        }
    }
}

impl From<Command> for u8 {
    fn from(cmd: Command) -> u8 {
        cmd as u8
    }
}

impl TryFrom<u8> for Command {
    type Error = Error;
    
    fn try_from(value: u8) -> Result<Self> {
        match value {
            0x41 => Ok(Self::SetTime),
            0x42 => Ok(Self::SetCpNumber),
            0x43 => Ok(Self::SetPassword),
            0x44 => Ok(Self::InitCard),
            0x45 => Ok(Self::WritePages),
            0x46 => Ok(Self::ReadVersion),
            0x47 => Ok(Self::InitLogReader),
            0x48 => Ok(Self::ReadLogReader),
            0x49 => Ok(Self::SetReadMode),
            0x4B => Ok(Self::ReadCard),
            0x4C => Ok(Self::ReadRaw),
            0x4E => Ok(Self::InitSleepCard),
            0x58 => Ok(Self::BeepError),
            0x59 => Ok(Self::BeepOk),
            _ => Err(Error::InvalidPayload(format!("unknown command code 0x{:02X}", value))),
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(0x{:02X})", self.name(), *self as u8)
    }
}

/// Response codes sent by the master station
///
/// Unknown codes are kept as [`ResponseCode::Unrecognized`] so that newer
/// firmware does not silently fall through.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum ResponseCode {
    Log,
    CardData,
    CardRaw,
    Version,
    Mode,
    Error,
    Ok,
    Unrecognized(u8),
}

impl ResponseCode {
    pub const LOG: u8 = 0x61;
    pub const CARD_DATA: u8 = 0x63;
    pub const CARD_RAW: u8 = 0x65;
    pub const VERSION: u8 = 0x66;
    pub const MODE: u8 = 0x69;
    pub const ERROR: u8 = 0x78;
    pub const OK: u8 = 0x79;
    
    /// Get response name
    pub fn name(self) -> &'static str {
        match self {
            Self::Log => "RESP_LOG",
            Self::CardData => "RESP_CARD_DATA",
            Self::CardRaw => "RESP_CARD_RAW",
            Self::Version => "RESP_VERSION",
            Self::Mode => "RESP_MODE",
            Self::Error => "RESP_ERROR",
            Self::Ok => "RESP_OK",
            Self::Unrecognized(_) => "RESP_UNKNOWN",
        }
    }
}

impl From<u8> for ResponseCode {
    fn from(value: u8) -> Self {
        match value {
            Self::LOG => Self::Log,
            Self::CARD_DATA => Self::CardData,
            Self::CARD_RAW => Self::CardRaw,
            Self::VERSION => Self::Version,
            Self::MODE => Self::Mode,
            Self::ERROR => Self::Error,
            Self::OK => Self::Ok,
            other => Self::Unrecognized(other),
        }
    }
}

impl From<ResponseCode> for u8 {
    fn from(code: ResponseCode) -> u8 {
        match code {
            ResponseCode::Log => ResponseCode::LOG,
            ResponseCode::CardData => ResponseCode::CARD_DATA,
            ResponseCode::CardRaw => ResponseCode::CARD_RAW,
            ResponseCode::Version => ResponseCode::VERSION,
            ResponseCode::Mode => ResponseCode::MODE,
            ResponseCode::Error => ResponseCode::ERROR,
            ResponseCode::Ok => ResponseCode::OK,
            ResponseCode::Unrecognized(other) => other,
        }
    }
}

impl fmt::Display for ResponseCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(0x{:02X})", self.name(), u8::from(*self))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    
    #[test]
    fn test_command_conversion() {
        assert_eq!(u8::from(Command::ReadVersion), 0x46);
        assert_eq!(Command::try_from(0x4B).unwrap(), Command::ReadCard);
        assert_eq!(Command::BeepOk.to_string(), "CMD_BEEP_OK(0x59)");
    }
    
    #[test]
    fn test_unknown_command() {
        assert!(Command::try_from(0x4A).is_err());
    }
    
    #[test]
    fn test_response_code_conversion() {
        assert_eq!(ResponseCode::from(0x63), ResponseCode::CardData);
        assert_eq!(ResponseCode::from(0x79), ResponseCode::Ok);
        assert_eq!(u8::from(ResponseCode::Error), 0x78);
    }
    
    #[test]
    fn test_unrecognized_response_code() {
        let code = ResponseCode::from(0x70);
        assert_eq!(code, ResponseCode::Unrecognized(0x70));
        assert_eq!(u8::from(code), 0x70);
        assert_eq!(code.to_string(), "RESP_UNKNOWN(0x70)");
    }
}
