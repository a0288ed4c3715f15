//! Save/load for timeline snapshots.
//!
//! Uses bincode for compact binary serialization. The snapshot carries a
//! format version so stale saves are refused instead of misread.

use std::io::{Read, Write};

use serde::{Deserialize, Serialize};

use crate::timeline::Timeline;

/// Version number for the snapshot format (increment when format changes)
const SAVE_VERSION: u32 = 1;

#[derive(Serialize, Deserialize)]
struct SaveData {
    version: u32,
    timeline: Timeline,
}

/// Errors that can occur during save/load
#[derive(Debug, thiserror::Error)]
pub enum SaveError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Bincode(#[from] Box<bincode::ErrorKind>),
    #[error("Save version mismatch: expected {expected}, found {found}")]
    VersionMismatch { expected: u32, found: u32 },
}

pub fn save_timeline<W: Write>(writer: W, timeline: &Timeline) -> Result<(), SaveError> {
    let data = SaveData {
        version: SAVE_VERSION,
        timeline: timeline.clone(),
    };
    bincode::serialize_into(writer, &data)?;
    log::debug!("saved timeline with {} events", timeline.len());
    Ok(())
}

pub fn load_timeline<R: Read>(reader: R) -> Result<Timeline, SaveError> {
    let data: SaveData = bincode::deserialize_from(reader)?;
    if data.version != SAVE_VERSION {
        return Err(SaveError::VersionMismatch {
            expected: SAVE_VERSION,
            found: data.version,
        });
    }
    Ok(data.timeline)
}
