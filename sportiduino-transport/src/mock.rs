//! Scripted in-memory transport
//!
//! [`MockTransport`] plays the master station side of a conversation from a
//! script: each `write` releases the next scripted reply into the input
//! buffer. A reply is made of chunks, each readable only after a number of
//! read timeouts, so a station that stalls mid-response can be replayed.
//! A [`MockHandle`] stays with the test to script replies and inspect what
//! was sent after the transport has been handed to a session.
//!
//! # Example
//!
//! ```
//! use sportiduino_transport::MockTransport;
//!
//! let transport = MockTransport::new("/dev/ttyMOCK0");
//! let handle = transport.handle();
//! // Version response for the liveness check
//! handle.reply(&[0xFE, 0x66, 0x01, 0x6B, 0xD2]);
//! ```

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use bytes::BytesMut;
use parking_lot::Mutex;
use tracing::trace;

use crate::{error::*, PortOpener, Transport};

#[derive(Debug)]
struct Chunk {
    timeouts: usize,
    bytes: Vec<u8>,
}

type Reply = Vec<Chunk>;

#[derive(Debug)]
struct MockState {
    inbound: VecDeque<u8>,
    replies: VecDeque<Reply>,
    script: VecDeque<Chunk>,
    sent: Vec<Vec<u8>>,
    flushes: usize,
    open: bool,
}

/// Transport that answers writes from a script
#[derive(Debug)]
pub struct MockTransport {
    address: String,
    state: Arc<Mutex<MockState>>,
}

/// Test-side view of a [`MockTransport`]
#[derive(Debug, Clone)]
pub struct MockHandle {
    state: Arc<Mutex<MockState>>,
}

impl MockTransport {
    /// Create an open mock transport
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            state: Arc::new(Mutex::new(MockState {
                inbound: VecDeque::new(),
                replies: VecDeque::new(),
                script: VecDeque::new(),
                sent: Vec::new(),
                flushes: 0,
                open: true,
            })),
        }
    }
    
    pub fn handle(&self) -> MockHandle {
        MockHandle {
            state: Arc::clone(&self.state),
        }
    }
}

impl MockHandle {
    /// Queue bytes to be delivered after the next unanswered write
    pub fn reply(&self, bytes: impl AsRef<[u8]>) {
        self.reply_after_timeouts(0, bytes);
    }
    
    /// Queue bytes that become readable only after `timeouts` reads time out
    pub fn reply_after_timeouts(&self, timeouts: usize, bytes: impl AsRef<[u8]>) {
        self.reply_chunks([(timeouts, bytes)]);
    }
    
    /// Queue a reply delivered in chunks
    ///
    /// Each chunk is `(timeouts, bytes)`: once the bytes before it are read,
    /// `timeouts` reads time out before the chunk becomes readable.
    pub fn reply_chunks<B: AsRef<[u8]>>(&self, chunks: impl IntoIterator<Item = (usize, B)>) {
        let reply = chunks
            .into_iter()
            .map(|(timeouts, bytes)| Chunk {
                timeouts,
                bytes: bytes.as_ref().to_vec(),
            })
            .collect();
        self.state.lock().replies.push_back(reply);
    }
    
    /// Put bytes straight into the input buffer
    pub fn push_input(&self, bytes: impl AsRef<[u8]>) {
        self.state.lock().inbound.extend(bytes.as_ref());
    }
    
    /// Every buffer written so far, one entry per `write`
    pub fn sent(&self) -> Vec<Vec<u8>> {
        self.state.lock().sent.clone()
    }
    
    /// Unread input bytes
    pub fn pending_input(&self) -> usize {
        self.state.lock().inbound.len()
    }
    
    /// Scripted replies not yet released
    pub fn remaining_replies(&self) -> usize {
        self.state.lock().replies.len()
    }
    
    /// Number of `flush_input` calls
    pub fn flushes(&self) -> usize {
        self.state.lock().flushes
    }
    
    pub fn is_open(&self) -> bool {
        self.state.lock().open
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn write(&mut self, data: &[u8]) -> Result<()> {
        let mut state = self.state.lock();
        if !state.open {
            return Err(Error::NotConnected);
        }
        
        state.sent.push(data.to_vec());
        
        if let Some(reply) = state.replies.pop_front() {
            state.script = reply.into();
        }
        
        Ok(())
    }
    
    async fn read_exact(&mut self, n: usize, _timeout: Duration) -> Result<BytesMut> {
        let mut state = self.state.lock();
        if !state.open {
            return Err(Error::NotConnected);
        }
        
        while state.inbound.len() < n {
            let Some(chunk) = state.script.front_mut() else {
                return Err(Error::ReadTimeout);
            };
            
            if chunk.timeouts > 0 {
                chunk.timeouts -= 1;
                return Err(Error::ReadTimeout);
            }
            
            if let Some(chunk) = state.script.pop_front() {
                state.inbound.extend(chunk.bytes);
            }
        }
        
        let buf: BytesMut = state.inbound.drain(..n).collect();
        trace!("Mock read {} bytes: {}", n, hex::encode(&buf));
        
        Ok(buf)
    }
    
    async fn flush_input(&mut self) -> Result<()> {
        let mut state = self.state.lock();
        if !state.open {
            return Err(Error::NotConnected);
        }
        
        state.inbound.clear();
        state.flushes += 1;
        Ok(())
    }
    
    async fn close(&mut self) -> Result<()> {
        self.state.lock().open = false;
        Ok(())
    }
    
    fn is_open(&self) -> bool {
        self.state.lock().open
    }
    
    fn address(&self) -> String {
        self.address.clone()
    }
}

/// [`PortOpener`] handing out prepared mock transports by address
///
/// Each address holds a queue of outcomes, consumed one per `open`.
/// Addresses without a queued outcome fail to open.
#[derive(Debug, Default)]
pub struct MockOpener {
    ports: Mutex<HashMap<String, VecDeque<std::result::Result<MockTransport, String>>>>,
    opened: Mutex<Vec<String>>,
}

impl MockOpener {
    pub fn new() -> Self {
        Self::default()
    }
    
    /// Queue a transport to return for its address
    pub fn with_port(self, transport: MockTransport) -> Self {
        self.ports
            .lock()
            .entry(transport.address.clone())
            .or_default()
            .push_back(Ok(transport));
        self
    }
    
    /// Queue an open failure for an address
    pub fn with_failure(self, address: impl Into<String>, reason: impl Into<String>) -> Self {
        self.ports
            .lock()
            .entry(address.into())
            .or_default()
            .push_back(Err(reason.into()));
        self
    }
    
    /// Addresses passed to `open`, in call order
    pub fn opened(&self) -> Vec<String> {
        self.opened.lock().clone()
    }
}

#[async_trait]
impl PortOpener for MockOpener {
    async fn open(&self, address: &str) -> Result<Box<dyn Transport>> {
        self.opened.lock().push(address.to_string());
        
        let outcome = self
            .ports
            .lock()
            .get_mut(address)
            .and_then(VecDeque::pop_front);
        
        match outcome {
            Some(Ok(transport)) => Ok(Box::new(transport)),
            Some(Err(reason)) => Err(Error::Open {
                address: address.to_string(),
                reason,
            }),
            None => Err(Error::Open {
                address: address.to_string(),
                reason: "no such port".to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    
    const TIMEOUT: Duration = Duration::from_millis(10);
    
    #[tokio::test]
    async fn test_reply_released_on_write() {
        let mut transport = MockTransport::new("mock");
        let handle = transport.handle();
        handle.reply(&[0xFE, 0x79, 0x00, 0x79]);
        
        assert!(matches!(
            transport.read_exact(1, TIMEOUT).await,
            Err(Error::ReadTimeout)
        ));
        
        transport.write(&[0xFE, 0x59, 0x00, 0x59]).await.unwrap();
        
        let start = transport.read_exact(1, TIMEOUT).await.unwrap();
        assert_eq!(start.as_ref(), &[0xFE]);
        let rest = transport.read_exact(3, TIMEOUT).await.unwrap();
        assert_eq!(rest.as_ref(), &[0x79, 0x00, 0x79]);
        
        assert_eq!(handle.sent(), vec![vec![0xFE, 0x59, 0x00, 0x59]]);
        assert_eq!(handle.remaining_replies(), 0);
    }
    
    #[tokio::test]
    async fn test_reply_after_timeouts() {
        let mut transport = MockTransport::new("mock");
        let handle = transport.handle();
        handle.reply_after_timeouts(2, &[0xAA]);
        
        transport.write(&[0x00]).await.unwrap();
        
        assert!(transport.read_exact(1, TIMEOUT).await.is_err());
        assert!(transport.read_exact(1, TIMEOUT).await.is_err());
        assert_eq!(transport.read_exact(1, TIMEOUT).await.unwrap().as_ref(), &[0xAA]);
    }
    
    #[tokio::test]
    async fn test_reply_chunks_stall_between_chunks() {
        let mut transport = MockTransport::new("mock");
        let handle = transport.handle();
        handle.reply_chunks([(0, vec![0x01, 0x02]), (1, vec![0x03])]);
        
        transport.write(&[0x00]).await.unwrap();
        
        assert_eq!(transport.read_exact(2, TIMEOUT).await.unwrap().as_ref(), &[0x01, 0x02]);
        assert!(matches!(
            transport.read_exact(1, TIMEOUT).await,
            Err(Error::ReadTimeout)
        ));
        assert_eq!(transport.read_exact(1, TIMEOUT).await.unwrap().as_ref(), &[0x03]);
    }
    
    #[tokio::test]
    async fn test_flush_and_close() {
        let mut transport = MockTransport::new("mock");
        let handle = transport.handle();
        handle.push_input(&[1, 2, 3]);
        assert_eq!(handle.pending_input(), 3);
        
        transport.flush_input().await.unwrap();
        assert_eq!(handle.pending_input(), 0);
        assert_eq!(handle.flushes(), 1);
        
        transport.close().await.unwrap();
        assert!(!handle.is_open());
        assert!(matches!(transport.write(&[0]).await, Err(Error::NotConnected)));
    }
    
    #[tokio::test]
    async fn test_opener_outcomes() {
        let opener = MockOpener::new()
            .with_failure("/dev/ttyUSB0", "busy")
            .with_port(MockTransport::new("/dev/ttyUSB1"));
        
        assert!(matches!(
            opener.open("/dev/ttyUSB0").await,
            Err(Error::Open { reason, .. }) if reason == "busy"
        ));
        
        let transport = opener.open("/dev/ttyUSB1").await.unwrap();
        assert_eq!(transport.address(), "/dev/ttyUSB1");
        
        // Each queued outcome is used once
        assert!(opener.open("/dev/ttyUSB1").await.is_err());
        assert_eq!(opener.opened(), vec!["/dev/ttyUSB0", "/dev/ttyUSB1", "/dev/ttyUSB1"]);
    }
}
