//! # sportiduino-core
//!
//! Core protocol implementation for the Sportiduino master station.
//!
//! This crate provides the low-level protocol primitives:
//! - Frame structure and encoding/decoding
//! - Checksum calculation
//! - Continuation fragment reassembly
//! - Command and response codes
//! - Response classification and payload parsers
//! - Command parameter encoders

pub mod checksum;
pub mod command;
pub mod constants;
pub mod error;
pub mod frame;
pub mod params;
pub mod parse;
pub mod reassembly;
pub mod response;

pub use command::{Command, ResponseCode};
pub use error::{DeviceError, Error, PortAttempt, Result};
pub use frame::Frame;
pub use reassembly::Reassembler;
pub use response::Response;
