// SPDX-License-Identifier: MIT OR Apache-2.0
//! Pointer interaction state machine.
//!
//! Exactly one [`InteractionMode`] is active at a time. Dragging a keyframe,
//! scrubbing and resizing the splitter are driven by the primary button;
//! panning by the middle button. Wheel zoom is stateless and handled by the
//! editor before this runs, so it can happen during any mode.
//!
//! Selection lives beside the mode and survives mode changes.

use crate::command::SequencerEvent;
use crate::hit_test::KeyframeHit;
use crate::input::{PointerButton, SequencerInput};
use crate::sequence::{KeyframeRef, PlaybackClock, Sequence};
use crate::timeline::ViewTransform;
use egui::Pos2;

/// Active pointer gesture
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum InteractionMode {
    /// No gesture in progress
    #[default]
    Idle,
    /// Dragging a keyframe along its track
    DraggingKeyframe {
        /// The dragged keyframe
        key: KeyframeRef,
        /// Pointer x minus keyframe x at grab time
        pixel_offset: f32,
        /// Frame the keyframe had when grabbed
        start_frame: u32,
    },
    /// Dragging the current-frame marker
    Scrubbing,
    /// Middle-button pan
    PanningView {
        /// Pointer x on the previous update
        last_x: f32,
    },
    /// Dragging the label/timeline splitter
    ResizingSplitter {
        /// Pointer x minus splitter x at grab time
        grab_offset: f32,
    },
}

impl InteractionMode {
    /// Get the display name
    pub fn name(&self) -> &'static str {
        match self {
            Self::Idle => "Idle",
            Self::DraggingKeyframe { .. } => "Dragging Keyframe",
            Self::Scrubbing => "Scrubbing",
            Self::PanningView { .. } => "Panning",
            Self::ResizingSplitter { .. } => "Resizing",
        }
    }

    /// The keyframe being dragged, if any
    pub fn dragged_keyframe(&self) -> Option<KeyframeRef> {
        match self {
            Self::DraggingKeyframe { key, .. } => Some(*key),
            _ => None,
        }
    }
}

/// Action offered by the keyframe context menu
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContextAction {
    /// Delete the keyframe
    Delete,
    /// Duplicate the keyframe
    Duplicate,
}

impl ContextAction {
    /// Every action, in menu order
    pub const ALL: [ContextAction; 2] = [ContextAction::Delete, ContextAction::Duplicate];

    /// Get the display name
    pub fn label(&self) -> &'static str {
        match self {
            Self::Delete => "Delete",
            Self::Duplicate => "Duplicate",
        }
    }
}

/// Open context menu for a keyframe
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContextMenu {
    /// Keyframe the menu acts on
    pub key: KeyframeRef,
    /// Screen position of the right-click
    pub anchor: Pos2,
}

/// What lies under the pointer this update
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PointerHits {
    /// Keyframe under the pointer
    pub keyframe: Option<KeyframeHit>,
    /// On the current-frame marker band
    pub scrub_handle: bool,
    /// On the label/timeline splitter
    pub splitter: bool,
    /// Inside the ruler header
    pub ruler: bool,
    /// Inside the keyframe area
    pub timeline_body: bool,
}

/// Everything a transition may touch
pub struct InteractionContext<'a> {
    /// Tracks and keyframes
    pub sequence: &'a mut Sequence,
    /// Playback clock
    pub clock: &'a mut PlaybackClock,
    /// View transform, read-only here
    pub view: &'a ViewTransform,
    /// Event sink
    pub events: &'a mut Vec<SequencerEvent>,
}

/// Transient UI state: mode, selection and context menu
#[derive(Debug, Clone, Default)]
pub struct Interaction {
    mode: InteractionMode,
    selected: Option<KeyframeRef>,
    context_menu: Option<ContextMenu>,
}

impl Interaction {
    /// Create an idle interaction with nothing selected
    pub fn new() -> Self {
        Self::default()
    }

    /// Active mode
    pub fn mode(&self) -> InteractionMode {
        self.mode
    }

    /// Selected keyframe
    pub fn selected(&self) -> Option<KeyframeRef> {
        self.selected
    }

    /// Open context menu
    pub fn context_menu(&self) -> Option<ContextMenu> {
        self.context_menu
    }

    /// Close the context menu
    pub fn close_context_menu(&mut self) {
        self.context_menu = None;
    }

    /// Change the selection, emitting an event when it actually changes
    pub fn select(&mut self, key: Option<KeyframeRef>, events: &mut Vec<SequencerEvent>) {
        if self.selected != key {
            self.selected = key;
            events.push(SequencerEvent::SelectionChanged { selected: key });
        }
    }

    /// Drop references that no longer resolve.
    ///
    /// Run before anything else in an update, since keyframes may have been
    /// deleted or moved between tracks since the last one.
    pub fn revalidate(&mut self, sequence: &Sequence, events: &mut Vec<SequencerEvent>) {
        if let Some(key) = self.selected {
            if !sequence.contains(key) {
                tracing::warn!("Dropping stale keyframe selection {:?}", key.keyframe);
                self.select(None, events);
            }
        }
        if let Some(key) = self.mode.dragged_keyframe() {
            if !sequence.contains(key) {
                tracing::warn!("Dragged keyframe {:?} vanished, ending drag", key.keyframe);
                self.mode = InteractionMode::Idle;
            }
        }
        if let Some(menu) = self.context_menu {
            if !sequence.contains(menu.key) {
                self.context_menu = None;
            }
        }
    }

    /// Forget any reference to `key` after it was deleted
    pub fn forget(&mut self, key: KeyframeRef, events: &mut Vec<SequencerEvent>) {
        if self.selected.is_some_and(|s| s.keyframe == key.keyframe) {
            self.select(None, events);
        }
        if self.mode.dragged_keyframe().is_some_and(|d| d.keyframe == key.keyframe) {
            self.mode = InteractionMode::Idle;
        }
        if self.context_menu.is_some_and(|m| m.key.keyframe == key.keyframe) {
            self.context_menu = None;
        }
    }

    /// Continue the view gestures (pan, splitter) started on earlier updates
    pub fn update_view(&mut self, input: &SequencerInput, view: &mut ViewTransform) {
        match &mut self.mode {
            InteractionMode::PanningView { last_x } => {
                if let Some(pointer) = input.pointer_position {
                    view.apply_pan(pointer.x - *last_x);
                    *last_x = pointer.x;
                }
                if !input.down(PointerButton::Middle) {
                    tracing::debug!("Pan finished at offset {}", view.pan_offset());
                    self.mode = InteractionMode::Idle;
                }
            }
            InteractionMode::ResizingSplitter { grab_offset } => {
                if let Some(pointer) = input.pointer_position {
                    view.set_track_label_width(pointer.x - view.viewport().min.x - *grab_offset);
                }
                if !input.down(PointerButton::Primary) {
                    tracing::debug!("Label column resized to {}", view.track_label_width());
                    self.mode = InteractionMode::Idle;
                }
            }
            _ => {}
        }
    }

    /// Run pointer transitions for this update
    pub fn handle_pointer(
        &mut self,
        input: &SequencerInput,
        hits: &PointerHits,
        ctx: &mut InteractionContext<'_>,
    ) {
        let Some(pointer) = input.pointer_position else {
            self.release_without_pointer(input, ctx);
            return;
        };

        // Presses outside the viewport belong to the host; gestures already
        // in progress keep tracking the pointer wherever it goes.
        let inside = ctx.view.viewport().contains(pointer);

        if inside && input.pressed(PointerButton::Secondary) {
            match hits.keyframe {
                Some(hit) => {
                    self.select(Some(hit.key), ctx.events);
                    self.context_menu = Some(ContextMenu {
                        key: hit.key,
                        anchor: pointer,
                    });
                    tracing::debug!("Opened context menu for {:?}", hit.key.keyframe);
                }
                None => self.context_menu = None,
            }
        }

        match self.mode {
            InteractionMode::Idle if inside => self.handle_idle(input, pointer, hits, ctx),
            InteractionMode::Idle => {}
            InteractionMode::DraggingKeyframe {
                key,
                pixel_offset,
                start_frame,
            } => {
                if input.down(PointerButton::Primary) || input.released(PointerButton::Primary) {
                    let frame = ctx.view.pixel_to_frame(pointer.x - pixel_offset);
                    if let Err(err) = ctx.sequence.move_keyframe(key, i64::from(frame)) {
                        tracing::warn!("Keyframe drag failed: {err}");
                        self.mode = InteractionMode::Idle;
                        return;
                    }
                }
                if !input.down(PointerButton::Primary) {
                    self.finish_drag(key, start_frame, ctx);
                }
            }
            InteractionMode::Scrubbing => {
                if input.down(PointerButton::Primary) || input.released(PointerButton::Primary) {
                    self.scrub_to(pointer.x, ctx);
                }
                if !input.down(PointerButton::Primary) {
                    tracing::debug!("Scrub finished at frame {}", ctx.clock.current_frame());
                    self.mode = InteractionMode::Idle;
                }
            }
            InteractionMode::PanningView { .. } | InteractionMode::ResizingSplitter { .. } => {}
        }
    }

    fn handle_idle(
        &mut self,
        input: &SequencerInput,
        pointer: Pos2,
        hits: &PointerHits,
        ctx: &mut InteractionContext<'_>,
    ) {
        if input.pressed(PointerButton::Primary) {
            self.context_menu = None;

            if input.double_click && hits.timeline_body {
                self.start_scrub(pointer.x, ctx);
            } else if let Some(hit) = hits.keyframe {
                self.select(Some(hit.key), ctx.events);
                let start_frame = ctx.sequence.keyframe(hit.key).map_or(0, |k| k.frame);
                self.pause_playback(ctx);
                self.mode = InteractionMode::DraggingKeyframe {
                    key: hit.key,
                    pixel_offset: pointer.x - hit.screen_pos.x,
                    start_frame,
                };
                tracing::debug!("Started drag of {:?} at frame {}", hit.key.keyframe, start_frame);
            } else if hits.splitter {
                self.mode = InteractionMode::ResizingSplitter {
                    grab_offset: pointer.x - ctx.view.timeline_origin_x(),
                };
            } else if hits.scrub_handle || hits.ruler {
                self.start_scrub(pointer.x, ctx);
            }
        } else if input.pressed(PointerButton::Middle) {
            self.mode = InteractionMode::PanningView { last_x: pointer.x };
            tracing::debug!("Started pan");
        }
    }

    fn start_scrub(&mut self, x: f32, ctx: &mut InteractionContext<'_>) {
        self.mode = InteractionMode::Scrubbing;
        self.scrub_to(x, ctx);
        tracing::debug!("Started scrub at frame {}", ctx.clock.current_frame());
    }

    fn scrub_to(&mut self, x: f32, ctx: &mut InteractionContext<'_>) {
        self.pause_playback(ctx);
        let frame = ctx.view.pixel_to_frame(x);
        ctx.clock.set_frame(i64::from(frame), ctx.sequence.frame_count());
    }

    fn pause_playback(&self, ctx: &mut InteractionContext<'_>) {
        if ctx.clock.is_playing() {
            ctx.clock.pause();
            ctx.events.push(SequencerEvent::PlaybackChanged {
                state: ctx.clock.state(),
                frame: ctx.clock.current_frame(),
            });
        }
    }

    fn finish_drag(&mut self, key: KeyframeRef, start_frame: u32, ctx: &mut InteractionContext<'_>) {
        self.mode = InteractionMode::Idle;
        let Some(frame) = ctx.sequence.keyframe(key).map(|k| k.frame) else {
            return;
        };
        if frame != start_frame {
            ctx.events.push(SequencerEvent::KeyframeMoved {
                key,
                from: start_frame,
                to: frame,
            });
        }
        tracing::debug!("Dropped {:?} at frame {}", key.keyframe, frame);
    }

    /// The pointer left the window: end gestures whose button is gone
    fn release_without_pointer(&mut self, input: &SequencerInput, ctx: &mut InteractionContext<'_>) {
        match self.mode {
            InteractionMode::DraggingKeyframe { key, start_frame, .. }
                if !input.down(PointerButton::Primary) =>
            {
                self.finish_drag(key, start_frame, ctx);
            }
            InteractionMode::Scrubbing if !input.down(PointerButton::Primary) => {
                self.mode = InteractionMode::Idle;
            }
            _ => {}
        }
    }
}
