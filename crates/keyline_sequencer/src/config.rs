// SPDX-License-Identifier: MIT OR Apache-2.0
//! Sequencer configuration.
//!
//! Stored as RON:
//!
//! ```ron
//! (
//!     frame_count: 200,
//!     frames_per_second: 24,
//!     tracks: [
//!         (name: "Position", value_type: Vec3, keyframes: [0, 40]),
//!     ],
//! )
//! ```
//!
//! Missing fields take their defaults.

use crate::error::{Result, SequencerError};
use crate::keyframe::ValueType;
use crate::sequence::Sequence;
use crate::timeline::{DEFAULT_FRAME_WIDTH, DEFAULT_TRACK_LABEL_WIDTH, MAX_ZOOM, MIN_ZOOM};
use crate::track::Track;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Track created when the sequencer starts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackConfig {
    /// Track name
    pub name: String,
    /// Declared value type
    pub value_type: ValueType,
    /// Frames holding a zero-valued keyframe
    #[serde(default)]
    pub keyframes: Vec<u32>,
}

impl TrackConfig {
    /// Create a track config
    pub fn new(name: impl Into<String>, value_type: ValueType, keyframes: Vec<u32>) -> Self {
        Self {
            name: name.into(),
            value_type,
            keyframes,
        }
    }
}

/// Sequencer settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SequencerConfig {
    /// Sequence name
    pub name: String,
    /// Last addressable frame
    pub frame_count: u32,
    /// Playback rate
    pub frames_per_second: u32,
    /// Pixels per frame at zoom 1
    pub base_frame_width: f32,
    /// Initial width of the track label column
    pub track_label_width: f32,
    /// Height of one track row
    pub track_height: f32,
    /// Height of the ruler header
    pub header_height: f32,
    /// Initial zoom factor
    pub initial_zoom: f32,
    /// Tracks to create
    pub tracks: Vec<TrackConfig>,
}

impl Default for SequencerConfig {
    fn default() -> Self {
        Self {
            name: "Main Sequence".to_string(),
            frame_count: 200,
            frames_per_second: 24,
            base_frame_width: DEFAULT_FRAME_WIDTH,
            track_label_width: DEFAULT_TRACK_LABEL_WIDTH,
            track_height: 28.0,
            header_height: 32.0,
            initial_zoom: 1.0,
            tracks: vec![
                TrackConfig::new("Position", ValueType::Vec3, vec![40, 100, 160]),
                TrackConfig::new("Rotation", ValueType::Quat, vec![20, 100]),
                TrackConfig::new("Intensity", ValueType::Float, vec![0, 40, 160]),
            ],
        }
    }
}

impl SequencerConfig {
    /// Parse from RON text and validate
    pub fn from_ron_str(text: &str) -> Result<Self> {
        let config: SequencerConfig = ron::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize to pretty RON
    pub fn to_ron_string(&self) -> Result<String> {
        let pretty = ron::ser::PrettyConfig::default()
            .depth_limit(4)
            .indentor("    ".to_string());
        Ok(ron::ser::to_string_pretty(self, pretty)?)
    }

    /// Load from a RON file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config = Self::from_ron_str(&content)?;
        tracing::info!(
            "Loaded sequencer config {:?}: {} tracks, {} frames at {} fps",
            path,
            config.tracks.len(),
            config.frame_count,
            config.frames_per_second
        );
        Ok(config)
    }

    /// Save to a RON file
    pub fn save(&self, path: &Path) -> Result<()> {
        std::fs::write(path, self.to_ron_string()?)?;
        tracing::info!("Saved sequencer config to {:?}", path);
        Ok(())
    }

    /// Reject values the sequencer cannot work with
    pub fn validate(&self) -> Result<()> {
        if self.frames_per_second == 0 {
            return Err(SequencerError::InvalidConfig(
                "frames_per_second must be positive".to_string(),
            ));
        }
        if self.base_frame_width <= 0.0 || !self.base_frame_width.is_finite() {
            return Err(SequencerError::InvalidConfig(format!(
                "base_frame_width must be positive, got {}",
                self.base_frame_width
            )));
        }
        if self.track_height <= 0.0 || self.header_height < 0.0 {
            return Err(SequencerError::InvalidConfig(
                "track_height must be positive and header_height non-negative".to_string(),
            ));
        }
        if !(MIN_ZOOM..=MAX_ZOOM).contains(&self.initial_zoom) {
            return Err(SequencerError::InvalidConfig(format!(
                "initial_zoom {} outside [{MIN_ZOOM}, {MAX_ZOOM}]",
                self.initial_zoom
            )));
        }
        if let Some(track) = self
            .tracks
            .iter()
            .find(|t| t.keyframes.iter().any(|&f| f > self.frame_count))
        {
            return Err(SequencerError::InvalidConfig(format!(
                "track '{}' has a keyframe past frame {}",
                track.name, self.frame_count
            )));
        }
        Ok(())
    }

    /// Build the initial sequence
    pub fn build_sequence(&self) -> Sequence {
        let mut sequence = Sequence::new(self.name.clone(), self.frame_count);
        for track_config in &self.tracks {
            let mut track = Track::new(track_config.name.clone(), track_config.value_type);
            for &frame in &track_config.keyframes {
                track.add_keyframe_at(frame);
            }
            sequence.add_track(track);
        }
        sequence
    }
}
