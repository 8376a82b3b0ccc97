// SPDX-License-Identifier: MIT OR Apache-2.0
//! Commands a host toolbar or menu sends in, and edit events it drains out.

use crate::keyframe::KeyframeId;
use crate::sequence::{KeyframeRef, PlaybackState};
use serde::{Deserialize, Serialize};

/// Host-facing command surface
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SequencerCommand {
    /// Start playing from the current frame
    Play,
    /// Pause, keeping the current frame
    Pause,
    /// Play if paused or stopped, pause otherwise
    TogglePlayback,
    /// Stop and rewind to frame 0
    Stop,
    /// Seek to frame 0
    GoToStart,
    /// Seek to the last frame
    GoToEnd,
    /// One frame back
    StepBack,
    /// One frame forward
    StepForward,
    /// Delete the selected keyframe
    DeleteSelected,
    /// Duplicate the selected keyframe
    DuplicateSelected,
    /// Dismiss the keyframe context menu
    CloseContextMenu,
}

impl SequencerCommand {
    /// Get the display name
    pub fn label(&self) -> &'static str {
        match self {
            Self::Play => "Play",
            Self::Pause => "Pause",
            Self::TogglePlayback => "Play/Pause",
            Self::Stop => "Stop",
            Self::GoToStart => "Go to Start",
            Self::GoToEnd => "Go to End",
            Self::StepBack => "Step Back",
            Self::StepForward => "Step Forward",
            Self::DeleteSelected => "Delete",
            Self::DuplicateSelected => "Duplicate",
            Self::CloseContextMenu => "Close",
        }
    }
}

/// Something that changed in the model or playback.
///
/// Drained with [`crate::SequencerEditor::take_events`]; a host can build
/// undo history or dirty tracking on top of these.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SequencerEvent {
    /// A keyframe ended up on another frame (drag release or numeric edit)
    KeyframeMoved {
        /// The keyframe
        key: KeyframeRef,
        /// Frame before the edit
        from: u32,
        /// Frame after the edit
        to: u32,
    },
    /// Keyframes carrying an ID were removed
    KeyframeDeleted {
        /// Removed identity
        keyframe: KeyframeId,
        /// How many keyframes, across all tracks, carried it
        count: usize,
    },
    /// A keyframe was cloned into its track
    KeyframeDuplicated {
        /// The original
        source: KeyframeRef,
        /// The clone
        copy: KeyframeRef,
    },
    /// A keyframe's value was edited
    KeyframeEdited {
        /// The keyframe
        key: KeyframeRef,
    },
    /// The selected keyframe changed
    SelectionChanged {
        /// New selection
        selected: Option<KeyframeRef>,
    },
    /// Playback started, paused or stopped
    PlaybackChanged {
        /// New state
        state: PlaybackState,
        /// Frame at the change
        frame: u32,
    },
}
