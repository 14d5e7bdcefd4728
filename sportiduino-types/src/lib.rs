//! Type definitions for sportiduino

pub mod card;
pub mod error;
pub mod log;
pub mod station;

pub use card::{CardData, Punch, RawCardData};
pub use error::{Error, Result};
pub use log::LogEntry;
pub use station::{ReadMode, VersionInfo};
