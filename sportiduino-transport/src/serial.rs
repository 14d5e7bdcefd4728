//! Serial transport for the master station
//!
//! The master station enumerates as a USB virtual COM port and talks 8N1,
//! 9600 baud by default.

use std::time::Duration;

use async_trait::async_trait;
use bytes::BytesMut;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::time::timeout;
use tokio_serial::{ClearBuffer, SerialPort, SerialPortBuilderExt, SerialStream};
use tracing::{debug, trace, warn};

use crate::{error::*, PortOpener, Transport};

/// Serial port transport
pub struct SerialTransport {
    port: Option<SerialStream>,
    port_name: String,
    baud_rate: u32,
}

impl SerialTransport {
    /// Open a serial port (8 data bits, no parity, 1 stop bit)
    ///
    /// Must be called from within a tokio runtime.
    pub async fn open(port: &str, baud_rate: u32) -> Result<Self> {
        debug!(port = %port, baud_rate, "Opening serial port");
        
        let stream = tokio_serial::new(port, baud_rate)
            .data_bits(tokio_serial::DataBits::Eight)
            .parity(tokio_serial::Parity::None)
            .stop_bits(tokio_serial::StopBits::One)
            .flow_control(tokio_serial::FlowControl::None)
            .open_native_async()
            .map_err(|e| Error::Open {
                address: port.to_string(),
                reason: e.to_string(),
            })?;
        
        debug!(port = %port, "Serial port opened");
        
        Ok(Self {
            port: Some(stream),
            port_name: port.to_string(),
            baud_rate,
        })
    }
    
    pub fn baud_rate(&self) -> u32 {
        self.baud_rate
    }
}

#[async_trait]
impl Transport for SerialTransport {
    async fn write(&mut self, data: &[u8]) -> Result<()> {
        let port = self.port.as_mut().ok_or(Error::NotConnected)?;
        
        trace!(port = %self.port_name, "Sending {} bytes: {}", data.len(), hex::encode(data));
        
        port.write_all(data).await?;
        port.flush().await?;
        
        Ok(())
    }
    
    async fn read_exact(&mut self, n: usize, read_timeout: Duration) -> Result<BytesMut> {
        let port = self.port.as_mut().ok_or(Error::NotConnected)?;
        
        let mut buf = BytesMut::zeroed(n);
        
        // Bytes of a partially received read are dropped on timeout
        timeout(read_timeout, port.read_exact(&mut buf))
            .await
            .map_err(|_| Error::ReadTimeout)?
            .map_err(Error::Io)?;
        
        trace!(port = %self.port_name, "Received {} bytes: {}", n, hex::encode(&buf));
        
        Ok(buf)
    }
    
    async fn flush_input(&mut self) -> Result<()> {
        let port = self.port.as_mut().ok_or(Error::NotConnected)?;
        
        port.clear(ClearBuffer::Input)
            .map_err(|e| Error::Io(e.into()))?;
        
        Ok(())
    }
    
    async fn close(&mut self) -> Result<()> {
        if let Some(mut port) = self.port.take() {
            debug!("Closing {}...", self.port_name);
            
            if let Err(e) = port.flush().await {
                warn!(port = %self.port_name, error = %e, "Failed to flush before closing");
            }
        }
        
        Ok(())
    }
    
    fn is_open(&self) -> bool {
        self.port.is_some()
    }
    
    fn address(&self) -> String {
        self.port_name.clone()
    }
}

impl Drop for SerialTransport {
    fn drop(&mut self) {
        if self.is_open() {
            warn!("Serial transport {} dropped while still open", self.port_name);
        }
    }
}

/// Opens [`SerialTransport`]s at a fixed baud rate
#[derive(Debug, Clone, Copy)]
pub struct SerialOpener {
    baud_rate: u32,
}

impl SerialOpener {
    pub fn new(baud_rate: u32) -> Self {
        Self { baud_rate }
    }
}

#[async_trait]
impl PortOpener for SerialOpener {
    async fn open(&self, address: &str) -> Result<Box<dyn Transport>> {
        let transport = SerialTransport::open(address, self.baud_rate).await?;
        Ok(Box::new(transport))
    }
}

/// Serial ports reported by the operating system
pub fn available_ports() -> Result<Vec<String>> {
    let ports = tokio_serial::available_ports().map_err(|e| Error::Io(e.into()))?;
    Ok(ports.into_iter().map(|info| info.port_name).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    
    #[tokio::test]
    async fn test_open_missing_port() {
        let result = SerialTransport::open("/dev/sportiduino-does-not-exist", 9600).await;
        
        match result {
            Err(Error::Open { address, .. }) => {
                assert_eq!(address, "/dev/sportiduino-does-not-exist");
            }
            Err(e) => panic!("Expected open error, got {}", e),
            Ok(_) => panic!("Expected open error"),
        }
    }
    
    #[tokio::test]
    async fn test_opener_reports_address() {
        let opener = SerialOpener::new(9600);
        let result = opener.open("/dev/sportiduino-does-not-exist").await;
        assert!(matches!(result, Err(Error::Open { .. })));
    }
}
