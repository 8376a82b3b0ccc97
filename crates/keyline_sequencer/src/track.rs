// SPDX-License-Identifier: MIT OR Apache-2.0
//! Track definitions for the sequencer.

use crate::error::{Result, SequencerError};
use crate::keyframe::{make_keyframe, Keyframe, KeyframeId, Value, ValueType};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a track
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TrackId(pub Uuid);

impl TrackId {
    /// Create a new random track ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for TrackId {
    fn default() -> Self {
        Self::new()
    }
}

/// A named track of keyframes sharing one value type.
///
/// Keyframes stay in insertion order; nothing here sorts them by frame.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Track {
    /// Unique track ID
    pub id: TrackId,
    /// Track name
    pub name: String,
    value_type: ValueType,
    keyframes: Vec<Keyframe>,
}

impl Track {
    /// Create a new, empty track
    pub fn new(name: impl Into<String>, value_type: ValueType) -> Self {
        Self {
            id: TrackId::new(),
            name: name.into(),
            value_type,
            keyframes: Vec::new(),
        }
    }

    /// Declared value type, fixed at construction
    pub fn value_type(&self) -> ValueType {
        self.value_type
    }

    /// Append a keyframe.
    ///
    /// Several keyframes may share a frame.
    pub fn insert(&mut self, keyframe: Keyframe) -> Result<KeyframeId> {
        self.check_type(&keyframe.value)?;
        let id = keyframe.id;
        self.keyframes.push(keyframe);
        Ok(id)
    }

    /// Append a zero-valued keyframe of this track's type
    pub fn add_keyframe_at(&mut self, frame: u32) -> KeyframeId {
        let keyframe = make_keyframe(frame, self.value_type);
        let id = keyframe.id;
        self.keyframes.push(keyframe);
        id
    }

    /// Remove every keyframe matching `predicate`, returning how many went
    pub fn remove_where(&mut self, mut predicate: impl FnMut(&Keyframe) -> bool) -> usize {
        let before = self.keyframes.len();
        self.keyframes.retain(|k| !predicate(k));
        before - self.keyframes.len()
    }

    /// Remove a keyframe by ID
    pub fn remove_keyframe(&mut self, keyframe_id: KeyframeId) -> Option<Keyframe> {
        let index = self.position(keyframe_id)?;
        Some(self.keyframes.remove(index))
    }

    /// Storage index of a keyframe
    pub fn position(&self, keyframe_id: KeyframeId) -> Option<usize> {
        self.keyframes.iter().position(|k| k.id == keyframe_id)
    }

    /// Get keyframe by ID
    pub fn keyframe(&self, keyframe_id: KeyframeId) -> Option<&Keyframe> {
        self.keyframes.iter().find(|k| k.id == keyframe_id)
    }

    /// Get mutable keyframe by ID.
    ///
    /// Only the frame should be written through this; use [`Track::set_value`]
    /// for values so the type stays checked.
    pub(crate) fn keyframe_mut(&mut self, keyframe_id: KeyframeId) -> Option<&mut Keyframe> {
        self.keyframes.iter_mut().find(|k| k.id == keyframe_id)
    }

    /// Move a keyframe to another frame
    pub fn set_frame(&mut self, keyframe_id: KeyframeId, frame: u32) -> Result<()> {
        let keyframe = self
            .keyframe_mut(keyframe_id)
            .ok_or(SequencerError::KeyframeNotFound(keyframe_id))?;
        keyframe.frame = frame;
        Ok(())
    }

    /// Replace a keyframe's value, keeping the declared type
    pub fn set_value(&mut self, keyframe_id: KeyframeId, value: Value) -> Result<()> {
        self.check_type(&value)?;
        let keyframe = self
            .keyframe_mut(keyframe_id)
            .ok_or(SequencerError::KeyframeNotFound(keyframe_id))?;
        keyframe.value = value;
        Ok(())
    }

    /// Get keyframes in a frame range (inclusive)
    pub fn keyframes_in_range(&self, start: u32, end: u32) -> impl Iterator<Item = &Keyframe> {
        self.keyframes
            .iter()
            .filter(move |k| k.frame >= start && k.frame <= end)
    }

    /// Get all keyframes in storage order
    pub fn keyframes(&self) -> &[Keyframe] {
        &self.keyframes
    }

    /// Get keyframe count
    pub fn keyframe_count(&self) -> usize {
        self.keyframes.len()
    }

    fn check_type(&self, value: &Value) -> Result<()> {
        let found = value.value_type();
        if found == self.value_type {
            Ok(())
        } else {
            Err(SequencerError::ValueTypeMismatch {
                track: self.name.clone(),
                expected: self.value_type,
                found,
            })
        }
    }
}
