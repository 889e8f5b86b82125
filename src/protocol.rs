//! Shared protocol constants for the transmitter session wire format
//!
//! Per session, in order:
//! 1. announcement: `name_len u16 (LE) | name bytes (UTF-8)`
//! 2. acknowledgment: 2 bytes, [`ACK`] or [`NAK`]
//! 3. raw file bytes until the sender closes its half of the connection

// Fixed unit moved per read/write call in both directions
pub const CHUNK_SIZE: usize = 1024;

// Maximum encoded length of an announced filename
pub const MAX_NAME_LEN: usize = 1024;

// Length prefix of the announcement frame
pub const NAME_LEN_BYTES: usize = 2;

pub const ACK: &[u8; 2] = b"ok";
pub const NAK: &[u8; 2] = b"no";

pub const DEFAULT_IP: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 8088;
