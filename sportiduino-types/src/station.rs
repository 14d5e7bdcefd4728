//! Master station information structures

use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};

/// Firmware version reported by the master station
///
/// The station reports a single byte; `107` reads as version `1.7`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VersionInfo {
    raw: u8,
}

impl VersionInfo {
    pub fn new(raw: u8) -> Self {
        Self { raw }
    }
    
    pub fn raw(&self) -> u8 {
        self.raw
    }
    
    pub fn major(&self) -> u8 {
        self.raw / 100
    }
    
    pub fn minor(&self) -> u8 {
        self.raw % 100
    }
}

impl fmt::Display for VersionInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major(), self.minor())
    }
}

/// Card reading mode of the master station
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[repr(u8)]
pub enum ReadMode {
    /// Cards are read only on request
    #[default]
    Single = 0,
    
    /// Station reports every card placed on it
    Continuous = 1,
}

impl From<ReadMode> for u8 {
    fn from(mode: ReadMode) -> u8 {
        mode as u8
    }
}

impl TryFrom<u8> for ReadMode {
    type Error = Error;
    
    fn try_from(value: u8) -> Result<Self> {
        match value {
            0 => Ok(Self::Single),
            1 => Ok(Self::Continuous),
            _ => Err(Error::Validation(format!("invalid read mode: {}", value))),
        }
    }
}

impl FromStr for ReadMode {
    type Err = Error;
    
    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "single" => Ok(Self::Single),
            "continuous" => Ok(Self::Continuous),
            _ => Err(Error::Parse(format!("unknown read mode '{}'", s))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    
    #[test]
    fn test_version_parts() {
        let version = VersionInfo::new(107);
        assert_eq!(version.major(), 1);
        assert_eq!(version.minor(), 7);
        assert_eq!(version.raw(), 107);
        assert_eq!(version.to_string(), "1.7");
    }
    
    #[test]
    fn test_read_mode_conversion() {
        assert_eq!(u8::from(ReadMode::Continuous), 1);
        assert_eq!(ReadMode::try_from(0).unwrap(), ReadMode::Single);
        assert!(ReadMode::try_from(2).is_err());
    }
    
    #[test]
    fn test_read_mode_from_str() {
        assert_eq!("Continuous".parse::<ReadMode>().unwrap(), ReadMode::Continuous);
        assert!("burst".parse::<ReadMode>().is_err());
    }
}
