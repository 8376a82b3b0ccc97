// SPDX-License-Identifier: MIT OR Apache-2.0
//! Sequencer editor: owns the model, clock, view and interaction state and
//! runs one update per UI frame.

use crate::command::{SequencerCommand, SequencerEvent};
use crate::config::SequencerConfig;
use crate::error::{Result, SequencerError};
use crate::hit_test::{hit_test_keyframe, hit_test_scrub_handle, hit_test_splitter, TrackLayout};
use crate::input::{Key, Modifiers, SequencerInput};
use crate::interaction::{Interaction, InteractionContext, PointerHits};
use crate::keyframe::Value;
use crate::sequence::{KeyframeRef, PlaybackClock, Sequence};
use crate::timeline::{ViewTransform, DEFAULT_FRAME_WIDTH, DEFAULT_TRACK_LABEL_WIDTH};
use crate::view::SequencerView;

/// Pixels panned per wheel notch with shift held
pub const WHEEL_PAN_SPEED: f32 = 40.0;

/// Sequencer editor state
#[derive(Debug, Clone)]
pub struct SequencerEditor {
    sequence: Sequence,
    clock: PlaybackClock,
    view: ViewTransform,
    layout: TrackLayout,
    interaction: Interaction,
    events: Vec<SequencerEvent>,
}

impl SequencerEditor {
    /// Create an editor for a sequence with the default layout
    pub fn new(sequence: Sequence, frames_per_second: u32) -> Self {
        let view = ViewTransform::new(
            sequence.frame_count(),
            DEFAULT_FRAME_WIDTH,
            DEFAULT_TRACK_LABEL_WIDTH,
        );
        Self {
            sequence,
            clock: PlaybackClock::new(frames_per_second),
            view,
            layout: TrackLayout::default(),
            interaction: Interaction::new(),
            events: Vec::new(),
        }
    }

    /// Create an editor from a validated configuration
    pub fn from_config(config: &SequencerConfig) -> Result<Self> {
        config.validate()?;
        let sequence = config.build_sequence();
        let view = ViewTransform::new(
            config.frame_count,
            config.base_frame_width,
            config.track_label_width,
        )
        .with_zoom(config.initial_zoom);

        tracing::info!(
            "Sequencer '{}' ready: {} tracks, {} frames",
            sequence.name,
            sequence.track_count(),
            sequence.frame_count()
        );

        Ok(Self {
            sequence,
            clock: PlaybackClock::new(config.frames_per_second),
            view,
            layout: TrackLayout {
                header_height: config.header_height,
                track_height: config.track_height,
            },
            interaction: Interaction::new(),
            events: Vec::new(),
        })
    }

    /// Tracks and keyframes
    pub fn sequence(&self) -> &Sequence {
        &self.sequence
    }

    /// Mutable access for host-side edits.
    ///
    /// References into the sequence are revalidated on the next update.
    pub fn sequence_mut(&mut self) -> &mut Sequence {
        &mut self.sequence
    }

    /// Playback clock
    pub fn clock(&self) -> &PlaybackClock {
        &self.clock
    }

    /// View transform
    pub fn view(&self) -> &ViewTransform {
        &self.view
    }

    /// Row layout
    pub fn layout(&self) -> &TrackLayout {
        &self.layout
    }

    /// Interaction state
    pub fn interaction(&self) -> &Interaction {
        &self.interaction
    }

    /// Selected keyframe
    pub fn selected(&self) -> Option<KeyframeRef> {
        self.interaction.selected()
    }

    /// Run one UI frame and return what to draw
    pub fn update(&mut self, input: &SequencerInput) -> SequencerView {
        self.interaction.revalidate(&self.sequence, &mut self.events);
        self.advance_clock(input.elapsed_time);

        self.view.set_viewport(input.viewport);
        self.apply_wheel(input);
        self.interaction.update_view(input, &mut self.view);

        let hits = self.pointer_hits(input);
        let mut ctx = InteractionContext {
            sequence: &mut self.sequence,
            clock: &mut self.clock,
            view: &self.view,
            events: &mut self.events,
        };
        self.interaction.handle_pointer(input, &hits, &mut ctx);

        for &key in &input.keys_pressed {
            self.handle_key(key, input.modifiers);
        }

        self.snapshot()
    }

    /// Build the view without processing input
    pub fn snapshot(&self) -> SequencerView {
        SequencerView::build(
            &self.sequence,
            &self.clock,
            &self.view,
            &self.layout,
            &self.interaction,
        )
    }

    /// Apply a toolbar, menu or keyboard command
    pub fn apply_command(&mut self, command: SequencerCommand) {
        tracing::debug!("Sequencer command: {}", command.label());
        let frame_count = self.sequence.frame_count();
        let before = self.clock.state();

        match command {
            SequencerCommand::Play => self.clock.play(),
            SequencerCommand::Pause => self.clock.pause(),
            SequencerCommand::TogglePlayback => self.clock.toggle_playback(),
            SequencerCommand::Stop => self.clock.stop(),
            SequencerCommand::GoToStart => self.clock.set_frame(0, frame_count),
            SequencerCommand::GoToEnd => self.clock.set_frame(i64::from(frame_count), frame_count),
            SequencerCommand::StepBack => self.clock.step(-1, frame_count),
            SequencerCommand::StepForward => self.clock.step(1, frame_count),
            SequencerCommand::DeleteSelected => self.delete_selected(),
            SequencerCommand::DuplicateSelected => self.duplicate_selected(),
            SequencerCommand::CloseContextMenu => self.interaction.close_context_menu(),
        }

        if self.clock.state() != before {
            self.push_playback_changed();
        }
    }

    /// Seek the playhead, clamped into the frame range
    pub fn seek(&mut self, frame: i64) {
        self.clock.set_frame(frame, self.sequence.frame_count());
    }

    /// Select a keyframe, or clear the selection with `None`
    pub fn select(&mut self, key: Option<KeyframeRef>) -> Result<()> {
        if let Some(key) = key {
            if !self.sequence.contains(key) {
                return Err(SequencerError::KeyframeNotFound(key.keyframe));
            }
        }
        self.interaction.select(key, &mut self.events);
        Ok(())
    }

    /// Move the selected keyframe to a frame (clamped).
    ///
    /// Returns the frame actually written.
    pub fn set_selected_frame(&mut self, frame: i64) -> Result<u32> {
        let key = self.selected_key()?;
        let from = self
            .sequence
            .keyframe(key)
            .ok_or(SequencerError::KeyframeNotFound(key.keyframe))?
            .frame;
        let to = self.sequence.move_keyframe(key, frame)?;
        if to != from {
            self.events.push(SequencerEvent::KeyframeMoved { key, from, to });
            tracing::debug!("Inspector moved {:?} from {} to {}", key.keyframe, from, to);
        }
        Ok(to)
    }

    /// Replace the selected keyframe's value
    pub fn set_selected_value(&mut self, value: Value) -> Result<()> {
        let key = self.selected_key()?;
        self.sequence.set_value(key, value)?;
        self.events.push(SequencerEvent::KeyframeEdited { key });
        tracing::debug!("Inspector set {:?} to {:?}", key.keyframe, value);
        Ok(())
    }

    /// Replace one component of the selected keyframe's value
    pub fn set_selected_component(&mut self, index: usize, component: f32) -> Result<()> {
        let key = self.selected_key()?;
        let current = self
            .sequence
            .keyframe(key)
            .ok_or(SequencerError::KeyframeNotFound(key.keyframe))?
            .value;
        let value = current
            .with_component(index, component)
            .ok_or(SequencerError::ComponentOutOfRange {
                value_type: current.value_type(),
                index,
            })?;
        self.set_selected_value(value)
    }

    /// Drain the events emitted since the last call
    pub fn take_events(&mut self) -> Vec<SequencerEvent> {
        std::mem::take(&mut self.events)
    }

    fn selected_key(&self) -> Result<KeyframeRef> {
        self.interaction.selected().ok_or(SequencerError::NothingSelected)
    }

    fn advance_clock(&mut self, elapsed_time: f32) {
        let before = self.clock.state();
        self.clock.tick(elapsed_time, self.sequence.frame_count());
        if self.clock.state() != before {
            self.push_playback_changed();
        }
    }

    fn push_playback_changed(&mut self) {
        self.events.push(SequencerEvent::PlaybackChanged {
            state: self.clock.state(),
            frame: self.clock.current_frame(),
        });
    }

    fn apply_wheel(&mut self, input: &SequencerInput) {
        if input.wheel_delta == 0.0 || !input.wheel_delta.is_finite() {
            return;
        }
        let Some(pointer) = input.pointer_position else {
            return;
        };
        if !input.viewport.contains(pointer) {
            return;
        }
        if input.modifiers.zoom() {
            self.view.apply_zoom(input.wheel_delta, pointer.x);
        } else if input.modifiers.shift {
            self.view.apply_pan(input.wheel_delta * WHEEL_PAN_SPEED);
        }
    }

    fn pointer_hits(&self, input: &SequencerInput) -> PointerHits {
        let Some(pointer) = input.pointer_position else {
            return PointerHits::default();
        };
        PointerHits {
            keyframe: hit_test_keyframe(&self.sequence, &self.view, &self.layout, pointer),
            scrub_handle: hit_test_scrub_handle(&self.view, self.clock.current_frame(), pointer),
            splitter: hit_test_splitter(&self.view, pointer),
            ruler: self.layout.ruler_rect(&self.view).contains(pointer),
            timeline_body: self.layout.timeline_body(&self.view).contains(pointer),
        }
    }

    fn handle_key(&mut self, key: Key, modifiers: Modifiers) {
        let command = match key {
            Key::Space => SequencerCommand::TogglePlayback,
            Key::Home => SequencerCommand::GoToStart,
            Key::End => SequencerCommand::GoToEnd,
            Key::ArrowLeft => SequencerCommand::StepBack,
            Key::ArrowRight => SequencerCommand::StepForward,
            Key::Delete => SequencerCommand::DeleteSelected,
            Key::Escape => SequencerCommand::CloseContextMenu,
            Key::D if modifiers.ctrl || modifiers.command => SequencerCommand::DuplicateSelected,
            Key::D => return,
        };
        self.apply_command(command);
    }

    fn delete_selected(&mut self) {
        let Some(key) = self.interaction.selected() else {
            return;
        };
        let count = self.sequence.delete_keyframe(key.keyframe);
        self.interaction.forget(key, &mut self.events);
        self.interaction.close_context_menu();
        if count > 0 {
            self.events.push(SequencerEvent::KeyframeDeleted {
                keyframe: key.keyframe,
                count,
            });
            tracing::debug!("Deleted {} keyframe(s) with id {:?}", count, key.keyframe);
        }
    }

    fn duplicate_selected(&mut self) {
        let Some(key) = self.interaction.selected() else {
            return;
        };
        self.interaction.close_context_menu();
        match self.sequence.duplicate_keyframe(key) {
            Ok(copy) => {
                self.events.push(SequencerEvent::KeyframeDuplicated { source: key, copy });
                tracing::debug!("Duplicated {:?} as {:?}", key.keyframe, copy.keyframe);
            }
            Err(err) => tracing::warn!("Duplicate failed: {err}"),
        }
    }
}

impl Default for SequencerEditor {
    fn default() -> Self {
        Self::new(Sequence::default(), 24)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::PointerButton;
    use crate::keyframe::ValueType;
    use crate::sequence::PlaybackState;
    use crate::track::Track;
    use egui::{Pos2, Rect, Vec2};

    fn viewport() -> Rect {
        Rect::from_min_size(Pos2::ZERO, Vec2::new(1000.0, 400.0))
    }

    fn editor() -> (SequencerEditor, KeyframeRef) {
        let mut sequence = Sequence::new("Test", 100);
        let mut track = Track::new("Position", ValueType::Vec3);
        let kf = track.add_keyframe_at(10);
        let track_id = sequence.add_track(track);
        let mut editor = SequencerEditor::new(sequence, 24);
        editor.update(&SequencerInput::new(viewport()));
        (editor, KeyframeRef::new(track_id, kf))
    }

    #[test]
    fn test_space_toggles_and_clock_advances() {
        let (mut editor, _) = editor();
        editor.update(&SequencerInput::new(viewport()).key(Key::Space));
        assert!(editor.clock().is_playing());

        let view = editor.update(&SequencerInput::new(viewport()).elapsed(1.0));
        assert_eq!(view.current_frame, 24);
        assert_eq!(
            editor.take_events(),
            vec![SequencerEvent::PlaybackChanged {
                state: PlaybackState::Playing,
                frame: 0
            }]
        );
    }

    #[test]
    fn test_playback_stops_at_end() {
        let (mut editor, _) = editor();
        editor.apply_command(SequencerCommand::Play);
        editor.take_events();

        editor.update(&SequencerInput::new(viewport()).elapsed(10.0));
        assert_eq!(editor.clock().current_frame(), 100);
        assert_eq!(editor.clock().state(), PlaybackState::Stopped);
        assert_eq!(
            editor.take_events(),
            vec![SequencerEvent::PlaybackChanged {
                state: PlaybackState::Stopped,
                frame: 100
            }]
        );
    }

    #[test]
    fn test_navigation_keys() {
        let (mut editor, _) = editor();
        editor.update(&SequencerInput::new(viewport()).key(Key::End));
        assert_eq!(editor.clock().current_frame(), 100);
        editor.update(&SequencerInput::new(viewport()).key(Key::ArrowRight));
        assert_eq!(editor.clock().current_frame(), 100);
        editor.update(&SequencerInput::new(viewport()).key(Key::ArrowLeft));
        assert_eq!(editor.clock().current_frame(), 99);
        editor.update(&SequencerInput::new(viewport()).key(Key::Home));
        assert_eq!(editor.clock().current_frame(), 0);
    }

    #[test]
    fn test_delete_key_removes_selection() {
        let (mut editor, key) = editor();
        editor.select(Some(key)).unwrap();
        let view = editor.update(&SequencerInput::new(viewport()).key(Key::Delete));

        assert!(view.selected.is_none());
        assert_eq!(view.tracks[0].keyframes.len(), 0);
        assert!(editor.take_events().contains(&SequencerEvent::KeyframeDeleted {
            keyframe: key.keyframe,
            count: 1
        }));
    }

    #[test]
    fn test_ctrl_d_duplicates() {
        let (mut editor, key) = editor();
        editor.select(Some(key)).unwrap();

        editor.update(&SequencerInput::new(viewport()).key(Key::D));
        assert_eq!(editor.sequence().track(key.track).unwrap().keyframe_count(), 1);

        editor.update(
            &SequencerInput::new(viewport())
                .key(Key::D)
                .with_modifiers(Modifiers::CTRL),
        );
        let track = editor.sequence().track(key.track).unwrap();
        assert_eq!(track.keyframe_count(), 2);
        assert_eq!(track.keyframes()[1].frame, 15);
        assert_eq!(editor.selected(), Some(key));
    }

    #[test]
    fn test_inspector_edits() {
        let (mut editor, key) = editor();
        assert!(matches!(
            editor.set_selected_frame(3),
            Err(SequencerError::NothingSelected)
        ));

        editor.select(Some(key)).unwrap();
        editor.take_events();

        assert_eq!(editor.set_selected_frame(500).unwrap(), 100);
        assert_eq!(editor.set_selected_frame(-4).unwrap(), 0);
        editor.set_selected_component(2, 7.5).unwrap();
        assert_eq!(
            editor.sequence().keyframe(key).unwrap().value,
            Value::Vec3([0.0, 0.0, 7.5])
        );
        assert!(matches!(
            editor.set_selected_value(Value::Float(1.0)),
            Err(SequencerError::ValueTypeMismatch { .. })
        ));
        assert!(matches!(
            editor.set_selected_component(3, 1.0),
            Err(SequencerError::ComponentOutOfRange { index: 3, .. })
        ));

        assert_eq!(
            editor.take_events(),
            vec![
                SequencerEvent::KeyframeMoved { key, from: 10, to: 100 },
                SequencerEvent::KeyframeMoved { key, from: 100, to: 0 },
                SequencerEvent::KeyframeEdited { key },
            ]
        );
    }

    #[test]
    fn test_wheel_zoom_and_pan() {
        let (mut editor, _) = editor();
        let pointer = Pos2::new(600.0, 200.0);

        let view = editor.update(
            &SequencerInput::new(viewport())
                .pointer_at(pointer)
                .wheel(1.0, Modifiers::CTRL),
        );
        assert!((view.zoom - 1.1).abs() < 1e-5);
        // Frame 40 stays under the pointer.
        assert!((editor.view().frame_at_pixel(600.0) - 40.0).abs() < 1e-3);

        let pan_before = editor.view().pan_offset();
        editor.update(
            &SequencerInput::new(viewport())
                .pointer_at(pointer)
                .wheel(-2.0, Modifiers::SHIFT),
        );
        assert!((editor.view().pan_offset() - (pan_before - 80.0)).abs() < 1e-3);

        // No modifier: the wheel does nothing to the view.
        let before = editor.view().clone();
        editor.update(
            &SequencerInput::new(viewport())
                .pointer_at(pointer)
                .wheel(1.0, Modifiers::NONE),
        );
        assert_eq!(editor.view(), &before);
    }

    #[test]
    fn test_wheel_outside_viewport_or_not_finite_is_ignored() {
        let (mut editor, _) = editor();
        let before = editor.view().clone();

        editor.update(
            &SequencerInput::new(viewport())
                .pointer_at(Pos2::new(600.0, 900.0))
                .wheel(5.0, Modifiers::CTRL),
        );
        editor.update(
            &SequencerInput::new(viewport())
                .pointer_at(Pos2::new(1200.0, 200.0))
                .wheel(-3.0, Modifiers::SHIFT),
        );
        editor.update(
            &SequencerInput::new(viewport())
                .pointer_at(Pos2::new(600.0, 200.0))
                .wheel(f32::NAN, Modifiers::CTRL),
        );
        editor.update(
            &SequencerInput::new(viewport())
                .pointer_at(Pos2::new(600.0, 200.0))
                .wheel(f32::INFINITY, Modifiers::SHIFT),
        );
        assert_eq!(editor.view(), &before);
    }

    #[test]
    fn test_stale_selection_is_dropped_on_update() {
        let (mut editor, key) = editor();
        editor.select(Some(key)).unwrap();
        editor.sequence_mut().delete_keyframe(key.keyframe);

        let view = editor.update(&SequencerInput::new(viewport()));
        assert!(view.selected.is_none());
        assert!(view.inspector.is_none());
    }

    #[test]
    fn test_select_unknown_keyframe_fails() {
        let (mut editor, key) = editor();
        let bogus = KeyframeRef::new(key.track, crate::keyframe::KeyframeId::new());
        assert!(matches!(
            editor.select(Some(bogus)),
            Err(SequencerError::KeyframeNotFound(_))
        ));
    }

    #[test]
    fn test_from_config_applies_layout() {
        let config = SequencerConfig {
            track_height: 40.0,
            header_height: 20.0,
            initial_zoom: 2.0,
            ..SequencerConfig::default()
        };
        let mut editor = SequencerEditor::from_config(&config).unwrap();
        let view = editor.update(&SequencerInput::new(viewport()));

        assert_eq!(view.tracks.len(), 3);
        assert_eq!(view.zoom, 2.0);
        assert_eq!(view.frame_width, 20.0);
        assert_eq!(view.tracks[1].row_rect.min.y, 60.0);

        // Click the Rotation keyframe at frame 20 (row 1, centre y 80).
        let pos = Pos2::new(200.0 + 20.0 * 20.0, 80.0);
        let view = editor.update(
            &SequencerInput::new(viewport())
                .pointer_at(pos)
                .press(PointerButton::Primary),
        );
        assert_eq!(view.inspector.map(|i| i.track_name), Some("Rotation".to_string()));
    }
}
