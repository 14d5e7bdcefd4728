//! Log reader contents

use std::fmt;

/// Cards recorded by a checkpoint station, as dumped through a log reader card
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LogEntry {
    /// Checkpoint the log was taken from
    pub checkpoint: u8,
    
    /// Card numbers in the order they were punched
    pub card_numbers: Vec<u16>,
}

impl LogEntry {
    pub fn new(checkpoint: u8) -> Self {
        Self {
            checkpoint,
            card_numbers: Vec::new(),
        }
    }
}

impl fmt::Display for LogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Log[CP {}](cards={})", self.checkpoint, self.card_numbers.len())
    }
}
