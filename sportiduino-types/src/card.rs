//! Card contents as reported by the master station

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};

/// Converts a unix timestamp stored on a card to a UTC date/time
pub fn timestamp_to_datetime(timestamp: u32) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp(i64::from(timestamp), 0)
}

/// A single checkpoint visit recorded on a card
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Punch {
    /// Checkpoint number
    pub checkpoint: u8,
    
    /// Punch time (unix seconds)
    pub timestamp: u32,
}

impl Punch {
    pub fn new(checkpoint: u8, timestamp: u32) -> Self {
        Self { checkpoint, timestamp }
    }
    
    /// Punch time as a UTC date/time
    pub fn time(&self) -> Option<DateTime<Utc>> {
        timestamp_to_datetime(self.timestamp)
    }
}

impl fmt::Display for Punch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.time() {
            Some(time) => write!(f, "CP {} @ {}", self.checkpoint, time.format("%Y-%m-%d %H:%M:%S")),
            None => write!(f, "CP {} @ {}", self.checkpoint, self.timestamp),
        }
    }
}

/// Decoded card contents
///
/// Start and finish stations are reserved checkpoint numbers; their records
/// are kept apart from the ordinary punch list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CardData {
    /// Card number assigned at initialization
    pub card_number: u16,
    
    /// Contents of page 6
    pub page6: [u8; 4],
    
    /// Contents of page 7
    pub page7: [u8; 4],
    
    /// Checkpoint punches in card order
    pub punches: Vec<Punch>,
    
    /// Start station punch time
    pub start: Option<u32>,
    
    /// Finish station punch time
    pub finish: Option<u32>,
}

impl CardData {
    pub fn new(card_number: u16) -> Self {
        Self {
            card_number,
            ..Self::default()
        }
    }
    
    pub fn start_time(&self) -> Option<DateTime<Utc>> {
        self.start.and_then(timestamp_to_datetime)
    }
    
    pub fn finish_time(&self) -> Option<DateTime<Utc>> {
        self.finish.and_then(timestamp_to_datetime)
    }
    
    /// Seconds between start and finish, when both are present
    pub fn running_time(&self) -> Option<u32> {
        match (self.start, self.finish) {
            (Some(start), Some(finish)) => finish.checked_sub(start),
            _ => None,
        }
    }
}

impl fmt::Display for CardData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Card[{}](punches={}", self.card_number, self.punches.len())?;
        if let Some(start) = self.start {
            write!(f, ", start={}", start)?;
        }
        if let Some(finish) = self.finish {
            write!(f, ", finish={}", finish)?;
        }
        write!(f, ")")
    }
}

/// Raw page dump of a card, keyed by page number
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawCardData {
    pages: BTreeMap<u8, [u8; 4]>,
}

impl RawCardData {
    pub fn new() -> Self {
        Self::default()
    }
    
    /// Store a page, replacing any previous content
    pub fn insert(&mut self, page: u8, content: [u8; 4]) -> Option<[u8; 4]> {
        self.pages.insert(page, content)
    }
    
    pub fn page(&self, page: u8) -> Option<&[u8; 4]> {
        self.pages.get(&page)
    }
    
    pub fn len(&self) -> usize {
        self.pages.len()
    }
    
    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }
    
    /// Pages in ascending page-number order
    pub fn iter(&self) -> impl Iterator<Item = (u8, &[u8; 4])> + '_ {
        self.pages.iter().map(|(page, content)| (*page, content))
    }
}
