//! Transport layer for the Sportiduino protocol
//!
//! Provides serial communication with the master station and a scripted
//! in-memory transport for tests.

pub mod error;
pub mod mock;
pub mod serial;

pub use error::{Error, Result};
pub use mock::{MockHandle, MockOpener, MockTransport};
pub use serial::{SerialOpener, SerialTransport};

use std::time::Duration;

use async_trait::async_trait;
use bytes::BytesMut;

/// Byte channel to a master station
///
/// One transport is owned by one session; no method is called concurrently.
#[async_trait]
pub trait Transport: Send {
    /// Write raw bytes
    async fn write(&mut self, data: &[u8]) -> Result<()>;
    
    /// Read exactly `n` bytes, failing with [`Error::ReadTimeout`] if they
    /// do not arrive in time
    async fn read_exact(&mut self, n: usize, timeout: Duration) -> Result<BytesMut>;
    
    /// Discard any unread input
    async fn flush_input(&mut self) -> Result<()>;
    
    /// Close the channel
    async fn close(&mut self) -> Result<()>;
    
    /// Check if the channel is open
    fn is_open(&self) -> bool;
    
    /// Port name or path
    fn address(&self) -> String;
}

/// Opens transports by address
#[async_trait]
pub trait PortOpener: Send + Sync {
    async fn open(&self, address: &str) -> Result<Box<dyn Transport>>;
}
