//! Frame observation hooks
//!
//! Observers see every frame the session writes or reads. They cannot
//! change what is sent or how responses are handled.

use sportiduino_core::{Command, Frame};
use tracing::trace;

/// Receives send/receive events from a [`crate::MasterStation`]
pub trait FrameObserver: Send + Sync {
    /// Called with the encoded bytes of every outgoing frame
    fn on_send(&self, _command: Command, _bytes: &[u8]) {}
    
    /// Called for every frame read back, including continuation fragments
    fn on_receive(&self, _frame: &Frame) {}
}

/// Logs frames as `tracing` events
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl FrameObserver for TracingObserver {
    fn on_send(&self, command: Command, bytes: &[u8]) {
        trace!("=> {} {}", command, hex::encode(bytes));
    }
    
    fn on_receive(&self, frame: &Frame) {
        trace!("<= {:?}", frame);
    }
}
