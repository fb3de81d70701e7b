//! Snapshot encoding for the full simulation state
//!
//! Binary snapshots use bincode 2 with the standard config; JSON snapshots
//! are meant for inspection. Both carry the RNG state, id counters, timers
//! and statistics, so a decoded state continues exactly where it left off.

use std::path::Path;

use crate::game::state::GameState;

#[derive(Debug, thiserror::Error)]
pub enum PersistenceError {
    #[error("Encode error: {0}")]
    Encode(#[from] bincode::error::EncodeError),
    #[error("Decode error: {0}")]
    Decode(#[from] bincode::error::DecodeError),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub fn encode(state: &GameState) -> Result<Vec<u8>, PersistenceError> {
    Ok(bincode::serde::encode_to_vec(
        state,
        bincode::config::standard(),
    )?)
}

pub fn decode(bytes: &[u8]) -> Result<GameState, PersistenceError> {
    let (state, _len): (GameState, usize) =
        bincode::serde::decode_from_slice(bytes, bincode::config::standard())?;
    Ok(state)
}

pub fn to_json(state: &GameState) -> Result<String, PersistenceError> {
    Ok(serde_json::to_string_pretty(state)?)
}

pub fn from_json(json: &str) -> Result<GameState, PersistenceError> {
    Ok(serde_json::from_str(json)?)
}

/// Write a binary snapshot to `path`
pub fn save(state: &GameState, path: impl AsRef<Path>) -> Result<(), PersistenceError> {
    std::fs::write(path, encode(state)?)?;
    Ok(())
}

/// Read a binary snapshot from `path`
pub fn load(path: impl AsRef<Path>) -> Result<GameState, PersistenceError> {
    decode(&std::fs::read(path)?)
}
