// SPDX-License-Identifier: MIT OR Apache-2.0
//! Error types for the sequencer core.

use crate::keyframe::{KeyframeId, ValueType};
use crate::track::TrackId;

/// Errors raised at the sequencer's public boundary.
///
/// Numeric input (frames, zoom, pan, splitter width) is clamped, never
/// rejected, so nothing here comes from pointer handling.
#[derive(Debug, thiserror::Error)]
pub enum SequencerError {
    /// Reading or writing a configuration file failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration text could not be parsed
    #[error("Config parse error: {0}")]
    Config(#[from] ron::error::SpannedError),

    /// Configuration could not be serialized
    #[error("Config serialization error: {0}")]
    ConfigWrite(#[from] ron::Error),

    /// Configuration parsed but holds unusable values
    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    /// A value does not match the type a track declares
    #[error("Track '{track}' holds {expected} values, got {found}")]
    ValueTypeMismatch {
        /// Track name
        track: String,
        /// Declared type of the track
        expected: ValueType,
        /// Type of the rejected value
        found: ValueType,
    },

    /// Track not found
    #[error("Track not found: {0:?}")]
    TrackNotFound(TrackId),

    /// Keyframe not found
    #[error("Keyframe not found: {0:?}")]
    KeyframeNotFound(KeyframeId),

    /// An edit needs a selected keyframe
    #[error("No keyframe selected")]
    NothingSelected,

    /// Component index past the end of a value
    #[error("{value_type} has no component {index}")]
    ComponentOutOfRange {
        /// Type of the edited value
        value_type: ValueType,
        /// Rejected index
        index: usize,
    },
}

/// Result type for sequencer operations
pub type Result<T> = std::result::Result<T, SequencerError>;
