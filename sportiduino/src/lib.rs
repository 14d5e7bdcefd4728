//! # sportiduino
//!
//! Async client for Sportiduino master stations connected over a serial port.
//!
//! ## Features
//!
//! - Typed commands and responses
//! - Async/await API using Tokio
//! - Automatic port discovery
//! - Reassembly of multi-frame responses
//!
//! ## Quick Start
//!
//! ```no_run
//! use sportiduino::{MasterStation, StationConfig};
//!
//! #[tokio::main]
//! async fn main() -> sportiduino::Result<()> {
//!     // Scan serial ports for a station
//!     let mut station = MasterStation::connect(StationConfig::new()).await?;
//!
//!     // Wait for a card and confirm with a beep
//!     let card = station.wait_for_card().await?;
//!     println!("{}", card);
//!     station.beep_ok().await?;
//!
//!     station.disconnect().await?;
//!
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod discovery;
pub mod error;
pub mod observer;
pub mod station;

// Re-exports
pub use config::StationConfig;
pub use discovery::{PortDiscovery, SystemPorts};
pub use error::{Error, Result};
pub use observer::{FrameObserver, TracingObserver};
pub use station::{ConnectionState, Connector, MasterStation};

pub use sportiduino_core::Error as ProtocolError;
pub use sportiduino_core::{Command, DeviceError, Frame, PortAttempt, Response, ResponseCode};
pub use sportiduino_transport::{PortOpener, Transport};

// Re-export types
pub use sportiduino_types::{CardData, LogEntry, Punch, RawCardData, ReadMode, VersionInfo};
