//! Transmitter library
//!
//! Point-to-point file transfer over TCP: a receiver persists incoming
//! sessions to disk, a sender streams one session per local file.

pub mod cli;
pub mod client;
pub mod copy;
pub mod error;
pub mod fs_enum;
pub mod logger;
pub mod protocol;
pub mod protocol_core;
pub mod server;
pub mod workers;

pub use error::{ErrorKind, TransferError};
pub use workers::TransferSummary;
