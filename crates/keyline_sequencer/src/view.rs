// SPDX-License-Identifier: MIT OR Apache-2.0
//! Read-only snapshot handed to a renderer after every update.

use crate::hit_test::TrackLayout;
use crate::interaction::{ContextAction, ContextMenu, Interaction, InteractionMode};
use crate::keyframe::{KeyframeId, Value, ValueType};
use crate::sequence::{KeyframeRef, PlaybackClock, Sequence};
use crate::timeline::ViewTransform;
use crate::track::TrackId;
use egui::{Pos2, Rect};
use std::ops::RangeInclusive;

/// A keyframe as drawn
#[derive(Debug, Clone, PartialEq)]
pub struct KeyframeView {
    /// Keyframe ID
    pub id: KeyframeId,
    /// Frame it sits on
    pub frame: u32,
    /// Screen position of its marker
    pub screen_pos: Pos2,
    /// Whether it is the selected keyframe
    pub is_selected: bool,
    /// Whether it is being dragged
    pub is_dragging: bool,
}

/// A track row as drawn
#[derive(Debug, Clone, PartialEq)]
pub struct TrackView {
    /// Track ID
    pub id: TrackId,
    /// Track name
    pub name: String,
    /// Declared value type
    pub value_type: ValueType,
    /// Row rectangle, label column included
    pub row_rect: Rect,
    /// Keyframes in storage order
    pub keyframes: Vec<KeyframeView>,
}

/// One editable number of the selected keyframe
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InspectorField {
    /// Component label ("x", "value", ...)
    pub label: &'static str,
    /// Current value
    pub value: f32,
}

/// Inspector contents for the selected keyframe
#[derive(Debug, Clone, PartialEq)]
pub struct InspectorView {
    /// The keyframe shown
    pub key: KeyframeRef,
    /// Owning track name
    pub track_name: String,
    /// Frame
    pub frame: u32,
    /// Full value
    pub value: Value,
    /// One field per component
    pub fields: Vec<InspectorField>,
}

impl InspectorView {
    /// Build the inspector for a keyframe, if it still exists
    pub fn new(sequence: &Sequence, key: KeyframeRef) -> Option<Self> {
        let track = sequence.track(key.track)?;
        let keyframe = track.keyframe(key.keyframe)?;
        let labels = keyframe.value_type().component_labels();
        let fields = labels
            .iter()
            .copied()
            .zip(keyframe.value.components())
            .map(|(label, value)| InspectorField { label, value })
            .collect();

        Some(Self {
            key,
            track_name: track.name.clone(),
            frame: keyframe.frame,
            value: keyframe.value,
            fields,
        })
    }
}

/// Context menu as drawn
#[derive(Debug, Clone, PartialEq)]
pub struct ContextMenuView {
    /// Keyframe the menu acts on
    pub key: KeyframeRef,
    /// Where to open the menu
    pub anchor: Pos2,
    /// Offered actions
    pub actions: Vec<ContextAction>,
}

impl From<ContextMenu> for ContextMenuView {
    fn from(menu: ContextMenu) -> Self {
        Self {
            key: menu.key,
            anchor: menu.anchor,
            actions: ContextAction::ALL.to_vec(),
        }
    }
}

/// Everything a renderer needs for one frame
#[derive(Debug, Clone, PartialEq)]
pub struct SequencerView {
    /// Track rows in declaration order
    pub tracks: Vec<TrackView>,
    /// Current playback frame
    pub current_frame: u32,
    /// Screen x of the current-frame marker
    pub current_frame_x: f32,
    /// Frames worth drawing ticks for
    pub visible_frames: RangeInclusive<u32>,
    /// Frames that get a ruler label
    pub label_frames: Vec<u32>,
    /// Zoom factor
    pub zoom: f32,
    /// Pan offset in pixels
    pub pan_offset: f32,
    /// Pixels per frame
    pub frame_width: f32,
    /// Width of the label column
    pub track_label_width: f32,
    /// Ruler header rectangle
    pub ruler_rect: Rect,
    /// Whether playback is running
    pub is_playing: bool,
    /// Active gesture
    pub mode: InteractionMode,
    /// Selected keyframe
    pub selected: Option<KeyframeRef>,
    /// Inspector for the selected keyframe
    pub inspector: Option<InspectorView>,
    /// Open context menu
    pub context_menu: Option<ContextMenuView>,
}

impl SequencerView {
    /// Build a snapshot of the current state
    pub fn build(
        sequence: &Sequence,
        clock: &PlaybackClock,
        view: &ViewTransform,
        layout: &TrackLayout,
        interaction: &Interaction,
    ) -> Self {
        let selected = interaction.selected();
        let dragged = interaction.mode().dragged_keyframe();

        let tracks = sequence
            .tracks()
            .enumerate()
            .map(|(row, track)| TrackView {
                id: track.id,
                name: track.name.clone(),
                value_type: track.value_type(),
                row_rect: layout.row_rect(view, row),
                keyframes: track
                    .keyframes()
                    .iter()
                    .map(|keyframe| {
                        let key = KeyframeRef::new(track.id, keyframe.id);
                        KeyframeView {
                            id: keyframe.id,
                            frame: keyframe.frame,
                            screen_pos: layout.keyframe_pos(view, row, keyframe.frame),
                            is_selected: selected == Some(key),
                            is_dragging: dragged == Some(key),
                        }
                    })
                    .collect(),
            })
            .collect();

        Self {
            tracks,
            current_frame: clock.current_frame(),
            current_frame_x: view.frame_to_pixel(clock.current_frame()),
            visible_frames: view.visible_frame_range(),
            label_frames: view.label_frames().collect(),
            zoom: view.zoom(),
            pan_offset: view.pan_offset(),
            frame_width: view.frame_width(),
            track_label_width: view.track_label_width(),
            ruler_rect: layout.ruler_rect(view),
            is_playing: clock.is_playing(),
            mode: interaction.mode(),
            selected,
            inspector: selected.and_then(|key| InspectorView::new(sequence, key)),
            context_menu: interaction.context_menu().map(ContextMenuView::from),
        }
    }

    /// Track row by name
    pub fn track(&self, name: &str) -> Option<&TrackView> {
        self.tracks.iter().find(|t| t.name == name)
    }
}
