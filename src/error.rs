//! Error types for the I/O boundary.
//!
//! The planning core itself is total; only talking to the engine can fail.

use thiserror::Error;

use crate::types::PlayerId;

/// Malformed or truncated engine input
#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("engine closed the stream mid-message")]
    UnexpectedEof,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("expected {expected} fields, found {found} in line {line:?}")]
    FieldCount {
        expected: usize,
        found: usize,
        line: String,
    },

    #[error("invalid number {token:?} in line {line:?}")]
    InvalidNumber { token: String, line: String },

    #[error("invalid constants line: {0}")]
    Constants(#[from] serde_json::Error),

    #[error("map dimensions {width}x{height} are out of range")]
    Dimensions { width: u32, height: u32 },

    #[error("player count {0} is out of range")]
    PlayerCount(u32),

    #[error("frame mentions unknown player {0}")]
    UnknownPlayer(PlayerId),

    #[error("cell update at {x},{y} is outside the {width}x{height} map")]
    OutOfBounds {
        x: u32,
        y: u32,
        width: i32,
        height: i32,
    },
}

/// Anything that can stop the bot's game loop
#[derive(Debug, Error)]
pub enum BotError {
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    #[error("player {0} is missing from the turn snapshot")]
    MissingPlayer(PlayerId),
}
