//! Connection settings

use std::time::Duration;

use sportiduino_core::constants::{DEFAULT_BAUD_RATE, DEFAULT_READ_TIMEOUT};

/// Master station connection settings
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use sportiduino::StationConfig;
///
/// let config = StationConfig::new()
///     .with_port("/dev/ttyUSB0")
///     .with_timeout(Duration::from_secs(2));
/// assert_eq!(config.baud_rate, 9600);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StationConfig {
    /// Serial port; `None` scans the available ports
    pub port: Option<String>,
    
    /// Serial baud rate
    pub baud_rate: u32,
    
    /// Timeout for each read from the station
    pub timeout: Duration,
}

impl StationConfig {
    pub fn new() -> Self {
        Self::default()
    }
    
    /// Use a specific port instead of scanning
    pub fn with_port(mut self, port: impl Into<String>) -> Self {
        self.port = Some(port.into());
        self
    }
    
    /// Set baud rate
    pub fn with_baud_rate(mut self, baud_rate: u32) -> Self {
        self.baud_rate = baud_rate;
        self
    }
    
    /// Set read timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

impl Default for StationConfig {
    fn default() -> Self {
        Self {
            port: None,
            baud_rate: DEFAULT_BAUD_RATE,
            timeout: Duration::from_secs(DEFAULT_READ_TIMEOUT),
        }
    }
}
