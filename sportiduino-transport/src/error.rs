//! Transport errors

use std::io;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Not connected")]
    NotConnected,
    
    #[error("Read timeout")]
    ReadTimeout,
    
    #[error("Could not open port '{address}': {reason}")]
    Open {
        address: String,
        reason: String,
    },
    
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}
