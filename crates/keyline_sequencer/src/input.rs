// SPDX-License-Identifier: MIT OR Apache-2.0
//! Per-frame input snapshot handed to the sequencer.
//!
//! The host gathers pointer, wheel and keyboard state once per UI frame and
//! passes it to [`crate::SequencerEditor::update`]. Nothing in the core reads
//! input from anywhere else.

use egui::{Pos2, Rect};
use serde::{Deserialize, Serialize};

/// Scroll points egui reports for one mouse wheel notch
const SCROLL_POINTS_PER_NOTCH: f32 = 50.0;
/// egui folds ctrl+wheel into `zoom_delta = exp(points / 200)`
const ZOOM_POINTS_PER_LN: f32 = 200.0;

/// Pointer button
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PointerButton {
    /// Left button
    Primary,
    /// Right button
    Secondary,
    /// Wheel button, used for panning
    Middle,
}

/// One flag per pointer button
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PointerButtons {
    /// Primary button
    pub primary: bool,
    /// Secondary button
    pub secondary: bool,
    /// Middle button
    pub middle: bool,
}

impl PointerButtons {
    /// No button set
    pub const NONE: Self = Self {
        primary: false,
        secondary: false,
        middle: false,
    };

    /// Only `button` set
    pub fn only(button: PointerButton) -> Self {
        let mut buttons = Self::NONE;
        buttons.set(button, true);
        buttons
    }

    /// Flag for one button
    pub fn get(&self, button: PointerButton) -> bool {
        match button {
            PointerButton::Primary => self.primary,
            PointerButton::Secondary => self.secondary,
            PointerButton::Middle => self.middle,
        }
    }

    /// Set the flag for one button
    pub fn set(&mut self, button: PointerButton, value: bool) {
        match button {
            PointerButton::Primary => self.primary = value,
            PointerButton::Secondary => self.secondary = value,
            PointerButton::Middle => self.middle = value,
        }
    }
}

/// Held modifier keys
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Modifiers {
    /// Alt / Option
    pub alt: bool,
    /// Control
    pub ctrl: bool,
    /// Shift
    pub shift: bool,
    /// Platform command key (Ctrl, or Cmd on macOS)
    pub command: bool,
}

impl Modifiers {
    /// No modifier held
    pub const NONE: Self = Self {
        alt: false,
        ctrl: false,
        shift: false,
        command: false,
    };

    /// Control held
    pub const CTRL: Self = Self {
        alt: false,
        ctrl: true,
        shift: false,
        command: true,
    };

    /// Shift held
    pub const SHIFT: Self = Self {
        alt: false,
        ctrl: false,
        shift: true,
        command: false,
    };

    /// Whether the zoom modifier (ctrl or command) is held
    pub fn zoom(&self) -> bool {
        self.ctrl || self.command
    }
}

/// Keys the sequencer reacts to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Key {
    /// Toggle playback
    Space,
    /// Go to first frame
    Home,
    /// Go to last frame
    End,
    /// Step one frame back
    ArrowLeft,
    /// Step one frame forward
    ArrowRight,
    /// Delete the selected keyframe
    Delete,
    /// Close the context menu
    Escape,
    /// Duplicate the selected keyframe (with the command modifier)
    D,
}

impl Key {
    const ALL: [Key; 8] = [
        Key::Space,
        Key::Home,
        Key::End,
        Key::ArrowLeft,
        Key::ArrowRight,
        Key::Delete,
        Key::Escape,
        Key::D,
    ];

    fn to_egui(self) -> egui::Key {
        match self {
            Key::Space => egui::Key::Space,
            Key::Home => egui::Key::Home,
            Key::End => egui::Key::End,
            Key::ArrowLeft => egui::Key::ArrowLeft,
            Key::ArrowRight => egui::Key::ArrowRight,
            Key::Delete => egui::Key::Delete,
            Key::Escape => egui::Key::Escape,
            Key::D => egui::Key::D,
        }
    }
}

/// Everything the sequencer needs to know about one UI frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SequencerInput {
    /// Seconds since the previous update
    pub elapsed_time: f32,
    /// Pointer position, if the pointer is over the window
    pub pointer_position: Option<Pos2>,
    /// Buttons currently held
    pub buttons_down: PointerButtons,
    /// Buttons pressed this frame
    pub just_pressed: PointerButtons,
    /// Buttons released this frame
    pub just_released: PointerButtons,
    /// The primary press this frame completes a double click
    pub double_click: bool,
    /// Wheel movement in notches (positive zooms in / pans right)
    pub wheel_delta: f32,
    /// Modifiers held
    pub modifiers: Modifiers,
    /// Keys pressed this frame
    pub keys_pressed: Vec<Key>,
    /// Screen rectangle the sequencer occupies
    pub viewport: Rect,
}

impl SequencerInput {
    /// An idle frame: no pointer, no buttons, no time elapsed
    pub fn new(viewport: Rect) -> Self {
        Self {
            elapsed_time: 0.0,
            pointer_position: None,
            buttons_down: PointerButtons::NONE,
            just_pressed: PointerButtons::NONE,
            just_released: PointerButtons::NONE,
            double_click: false,
            wheel_delta: 0.0,
            modifiers: Modifiers::NONE,
            keys_pressed: Vec::new(),
            viewport,
        }
    }

    /// Set elapsed time
    pub fn elapsed(mut self, seconds: f32) -> Self {
        self.elapsed_time = seconds;
        self
    }

    /// Set pointer position
    pub fn pointer_at(mut self, pos: Pos2) -> Self {
        self.pointer_position = Some(pos);
        self
    }

    /// Press `button` this frame (it is also held)
    pub fn press(mut self, button: PointerButton) -> Self {
        self.just_pressed.set(button, true);
        self.buttons_down.set(button, true);
        self
    }

    /// Keep `button` held
    pub fn hold(mut self, button: PointerButton) -> Self {
        self.buttons_down.set(button, true);
        self
    }

    /// Release `button` this frame
    pub fn release(mut self, button: PointerButton) -> Self {
        self.just_released.set(button, true);
        self.buttons_down.set(button, false);
        self
    }

    /// Mark the primary press as a double click
    pub fn double_clicked(mut self) -> Self {
        self.double_click = true;
        self
    }

    /// Wheel movement with modifiers
    pub fn wheel(mut self, notches: f32, modifiers: Modifiers) -> Self {
        self.wheel_delta = notches;
        self.modifiers = modifiers;
        self
    }

    /// Press a key this frame
    pub fn key(mut self, key: Key) -> Self {
        self.keys_pressed.push(key);
        self
    }

    /// Set held modifiers
    pub fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }

    /// Whether `button` was pressed this frame
    pub fn pressed(&self, button: PointerButton) -> bool {
        self.just_pressed.get(button)
    }

    /// Whether `button` is held
    pub fn down(&self, button: PointerButton) -> bool {
        self.buttons_down.get(button)
    }

    /// Whether `button` was released this frame
    pub fn released(&self, button: PointerButton) -> bool {
        self.just_released.get(button)
    }

    /// Build a snapshot from an egui frame's input
    pub fn from_egui(input: &egui::InputState, viewport: Rect) -> Self {
        let pointer = &input.pointer;
        let collect = |f: &dyn Fn(egui::PointerButton) -> bool| PointerButtons {
            primary: f(egui::PointerButton::Primary),
            secondary: f(egui::PointerButton::Secondary),
            middle: f(egui::PointerButton::Middle),
        };

        let mut modifiers = Modifiers {
            alt: input.modifiers.alt,
            ctrl: input.modifiers.ctrl,
            shift: input.modifiers.shift,
            command: input.modifiers.command,
        };

        // egui turns ctrl+wheel into a zoom factor instead of a scroll delta.
        let zoom = input.zoom_delta();
        let wheel_delta = if zoom != 1.0 {
            modifiers.ctrl = true;
            zoom.ln() * ZOOM_POINTS_PER_LN / SCROLL_POINTS_PER_NOTCH
        } else if modifiers.shift {
            (input.raw_scroll_delta.x + input.raw_scroll_delta.y) / SCROLL_POINTS_PER_NOTCH
        } else {
            input.raw_scroll_delta.y / SCROLL_POINTS_PER_NOTCH
        };

        Self {
            elapsed_time: input.stable_dt,
            pointer_position: pointer.latest_pos(),
            buttons_down: collect(&|b| pointer.button_down(b)),
            just_pressed: collect(&|b| pointer.button_pressed(b)),
            just_released: collect(&|b| pointer.button_released(b)),
            double_click: pointer.button_double_clicked(egui::PointerButton::Primary),
            wheel_delta,
            modifiers,
            keys_pressed: Key::ALL
                .into_iter()
                .filter(|key| input.key_pressed(key.to_egui()))
                .collect(),
            viewport,
        }
    }
}
