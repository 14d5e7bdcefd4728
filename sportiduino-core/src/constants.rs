//! Protocol constants

/// Frame start marker
pub const START_BYTE: u8 = 0xFE;

/// Length values above this mark a continuation fragment
pub const FRAGMENT_OFFSET: u8 = 0x1E;

/// Maximum payload carried by one frame
pub const MAX_DATA_LEN: usize = 25;

/// Upper bound on continuation fragments accepted for one response
pub const MAX_FRAGMENTS: usize = 32;

/// Default serial baud rate
pub const DEFAULT_BAUD_RATE: u32 = 9600;

/// Default read timeout (seconds)
pub const DEFAULT_READ_TIMEOUT: u64 = 5;

/// Reserved checkpoint numbers
pub mod stations {
    /// Start station
    pub const START: u8 = 240;
    
    /// Finish station
    pub const FINISH: u8 = 245;
}

/// Card memory layout
pub mod card {
    /// Bytes taken by the card number and pages 6 and 7 in card data
    pub const HEADER_LEN: usize = 10;
    
    /// Checkpoint number plus a 4-byte timestamp
    pub const PUNCH_RECORD_LEN: usize = 5;
    
    /// Page number plus 4 content bytes
    pub const RAW_PAGE_RECORD_LEN: usize = 5;
    
    /// Bytes accepted for page 6 or page 7 in write commands
    pub const PAGE_PARAM_LEN: usize = 5;
}
