// SPDX-License-Identifier: MIT OR Apache-2.0
//! Keyframe sequencer core for Keyline.
//!
//! This crate holds everything a timeline widget needs except drawing:
//! - Tracks of typed keyframes
//! - A fixed-rate playback clock
//! - A zoomable, pannable frame/pixel transform
//! - Hit-testing and the pointer interaction state machine
//!
//! ## Architecture
//!
//! A host feeds one [`SequencerInput`] per UI frame into
//! [`SequencerEditor::update`] and draws the returned [`SequencerView`].
//! Toolbar and menu actions go in as [`SequencerCommand`]s; model changes
//! come out as [`SequencerEvent`]s via [`SequencerEditor::take_events`].

pub mod command;
pub mod config;
pub mod editor;
pub mod error;
pub mod input;
pub mod interaction;
pub mod keyframe;
pub mod sequence;
pub mod timeline;
pub mod track;
pub mod view;

pub use command::{SequencerCommand, SequencerEvent};
pub use config::{SequencerConfig, TrackConfig};
pub use editor::{SequencerEditor, WHEEL_PAN_SPEED};
pub use error::{Result, SequencerError};
pub use hit_test::{KeyframeHit, TrackLayout};
pub use input::{Key, Modifiers, PointerButton, PointerButtons, SequencerInput};
pub use interaction::{ContextAction, ContextMenu, Interaction, InteractionMode};
pub use keyframe::{make_keyframe, Keyframe, KeyframeId, Value, ValueType};
pub use sequence::{KeyframeRef, PlaybackClock, PlaybackState, Sequence};
pub use timeline::ViewTransform;
pub use track::{Track, TrackId};
pub use view::{ContextMenuView, InspectorField, InspectorView, KeyframeView, SequencerView, TrackView};
