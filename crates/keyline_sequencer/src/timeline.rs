// SPDX-License-Identifier: MIT OR Apache-2.0
//! Timeline view transform.
//!
//! Maps frame indices to horizontal pixel positions and back, given a zoom
//! factor and a pan offset. The timeline starts right of the track label
//! column:
//!
//! ```text
//! x = timeline_origin_x + frame * frame_width + pan_offset
//! ```
//!
//! Pan is clamped so that the visible centre never leaves `[0, frame_count]`.

use egui::Rect;
use std::ops::RangeInclusive;

/// Minimum zoom factor
pub const MIN_ZOOM: f32 = 0.1;
/// Maximum zoom factor
pub const MAX_ZOOM: f32 = 10.0;
/// Zoom change per wheel notch
pub const ZOOM_STEP: f32 = 0.1;
/// Narrowest the track label column may be dragged
pub const MIN_TRACK_LABEL_WIDTH: f32 = 60.0;
/// Widest the track label column may be, as a share of the viewport
pub const MAX_TRACK_LABEL_RATIO: f32 = 0.8;
/// Pixels per frame at zoom 1 unless configured otherwise
pub const DEFAULT_FRAME_WIDTH: f32 = 10.0;
/// Label column width unless configured otherwise
pub const DEFAULT_TRACK_LABEL_WIDTH: f32 = 200.0;
/// Minimum pixel distance between two ruler labels
const MIN_LABEL_SPACING_PX: f32 = 30.0;

/// Zoom/pan state of the timeline
#[derive(Debug, Clone, PartialEq)]
pub struct ViewTransform {
    zoom: f32,
    pan_offset: f32,
    track_label_width: f32,
    base_frame_width: f32,
    frame_count: u32,
    viewport: Rect,
}

impl ViewTransform {
    /// Create a transform at zoom 1 with no pan.
    ///
    /// The viewport is empty until [`ViewTransform::set_viewport`] is called.
    pub fn new(frame_count: u32, base_frame_width: f32, track_label_width: f32) -> Self {
        Self {
            zoom: 1.0,
            pan_offset: 0.0,
            track_label_width: track_label_width.max(0.0),
            base_frame_width: if base_frame_width > 0.0 { base_frame_width } else { 1.0 },
            frame_count,
            viewport: Rect::ZERO,
        }
    }

    /// Start at another zoom factor (clamped), still unpanned
    pub fn with_zoom(mut self, zoom: f32) -> Self {
        self.zoom = zoom.clamp(MIN_ZOOM, MAX_ZOOM);
        self
    }

    /// Current zoom factor
    pub fn zoom(&self) -> f32 {
        self.zoom
    }

    /// Current horizontal pan in pixels
    pub fn pan_offset(&self) -> f32 {
        self.pan_offset
    }

    /// Width of the track label column
    pub fn track_label_width(&self) -> f32 {
        self.track_label_width
    }

    /// Pixels per frame at zoom 1
    pub fn base_frame_width(&self) -> f32 {
        self.base_frame_width
    }

    /// Last addressable frame
    pub fn frame_count(&self) -> u32 {
        self.frame_count
    }

    /// Viewport the sequencer occupies, in screen pixels
    pub fn viewport(&self) -> Rect {
        self.viewport
    }

    /// Pixels per frame at the current zoom
    pub fn frame_width(&self) -> f32 {
        self.base_frame_width * self.zoom
    }

    /// Screen x of frame 0 with no pan
    pub fn timeline_origin_x(&self) -> f32 {
        self.viewport.min.x + self.track_label_width
    }

    /// Width of the timeline area right of the label column
    pub fn visible_width(&self) -> f32 {
        if self.viewport.is_positive() {
            (self.viewport.width() - self.track_label_width).max(0.0)
        } else {
            0.0
        }
    }

    /// Width of the whole frame range at the current zoom
    pub fn max_timeline_width(&self) -> f32 {
        self.frame_count as f32 * self.frame_width()
    }

    /// Allowed pan range `[min, max]`
    pub fn pan_range(&self) -> (f32, f32) {
        let half = self.visible_width() / 2.0;
        (-self.max_timeline_width() + half, half)
    }

    /// Update the viewport, keeping pan valid
    pub fn set_viewport(&mut self, viewport: Rect) {
        if self.viewport == viewport {
            return;
        }
        self.viewport = viewport;
        self.track_label_width = self.clamp_label_width(self.track_label_width);
        self.clamp_pan();
    }

    /// Resize the label column (splitter drag), clamped to a sane share of
    /// the viewport
    pub fn set_track_label_width(&mut self, width: f32) {
        if width.is_nan() {
            return;
        }
        self.track_label_width = self.clamp_label_width(width);
        self.clamp_pan();
    }

    fn clamp_label_width(&self, width: f32) -> f32 {
        let max = if self.viewport.is_positive() {
            (self.viewport.width() * MAX_TRACK_LABEL_RATIO).max(MIN_TRACK_LABEL_WIDTH)
        } else {
            f32::INFINITY
        };
        width.clamp(MIN_TRACK_LABEL_WIDTH, max)
    }

    /// Screen x of a frame
    pub fn frame_to_pixel(&self, frame: u32) -> f32 {
        self.timeline_origin_x() + frame as f32 * self.frame_width() + self.pan_offset
    }

    /// Unrounded, unclamped frame position under a screen x
    pub fn frame_at_pixel(&self, pixel: f32) -> f32 {
        (pixel - self.timeline_origin_x() - self.pan_offset) / self.frame_width()
    }

    /// Nearest frame under a screen x, clamped to `[0, frame_count]`
    pub fn pixel_to_frame(&self, pixel: f32) -> u32 {
        let frame = self.frame_at_pixel(pixel).round();
        frame.clamp(0.0, self.frame_count as f32) as u32
    }

    /// Zoom by `wheel_delta` notches, keeping the frame under `mouse_x` in
    /// place
    pub fn apply_zoom(&mut self, wheel_delta: f32, mouse_x: f32) {
        if !wheel_delta.is_finite() {
            return;
        }
        self.set_zoom(self.zoom + wheel_delta * ZOOM_STEP, mouse_x);
    }

    /// Set an absolute zoom, anchored at `anchor_x`
    ///
    /// Non-finite arguments leave the view unchanged.
    pub fn set_zoom(&mut self, zoom: f32, anchor_x: f32) {
        if !zoom.is_finite() || !anchor_x.is_finite() {
            return;
        }
        let anchor_frame = self.frame_at_pixel(anchor_x);
        self.zoom = zoom.clamp(MIN_ZOOM, MAX_ZOOM);
        self.pan_offset = anchor_x - self.timeline_origin_x() - anchor_frame * self.frame_width();
        self.clamp_pan();
    }

    /// Pan by a horizontal pointer delta
    pub fn apply_pan(&mut self, delta_x: f32) {
        if !delta_x.is_finite() {
            return;
        }
        self.pan_offset += delta_x;
        self.clamp_pan();
    }

    fn clamp_pan(&mut self) {
        let (min, max) = self.pan_range();
        self.pan_offset = self.pan_offset.clamp(min, max);
    }

    /// Frames worth drawing, padded by one on each side and clamped to the
    /// frame range
    pub fn visible_frame_range(&self) -> RangeInclusive<u32> {
        let frame_width = self.frame_width();
        let visible_start = -self.pan_offset / frame_width;
        let visible_end = (self.visible_width() - self.pan_offset) / frame_width;

        let frame_count = i64::from(self.frame_count);
        let start = (visible_start.floor() as i64 - 1).clamp(0, frame_count);
        let end = (visible_end.ceil() as i64 + 1).clamp(0, frame_count);
        start as u32..=end as u32
    }

    /// Frames between two ruler labels.
    ///
    /// Starts from a zoom-dependent base and doubles until labels are at
    /// least 30 px apart, without exceeding a quarter of the frame range.
    pub fn label_spacing(&self) -> u32 {
        let base: u32 = if self.zoom < 0.5 {
            50
        } else if self.zoom < 1.0 {
            20
        } else if self.zoom > 3.0 {
            5
        } else {
            10
        };
        let cap = (self.frame_count / 4).max(1);
        let frame_width = self.frame_width();

        let mut spacing = base.min(cap);
        while (spacing as f32) * frame_width < MIN_LABEL_SPACING_PX && spacing * 2 <= cap {
            spacing *= 2;
        }
        spacing
    }

    /// Frames that get a ruler label inside the visible range
    pub fn label_frames(&self) -> impl Iterator<Item = u32> {
        let spacing = self.label_spacing();
        let range = self.visible_frame_range();
        let first = range.start().div_ceil(spacing) * spacing;
        (first..=*range.end()).step_by(spacing as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use egui::{Pos2, Vec2};

    fn transform() -> ViewTransform {
        let mut view = ViewTransform::new(200, 10.0, 200.0);
        view.set_viewport(Rect::from_min_size(Pos2::ZERO, Vec2::new(1000.0, 400.0)));
        view
    }

    fn pan_is_clamped(view: &ViewTransform) -> bool {
        let (min, max) = view.pan_range();
        view.pan_offset() >= min - 1e-3 && view.pan_offset() <= max + 1e-3
    }

    #[test]
    fn test_frame_pixel_round_trip() {
        let mut view = transform();
        for (zoom, pan) in [(1.0, 0.0), (0.1, 250.0), (3.7, -900.0), (10.0, -15000.0)] {
            view.set_zoom(zoom, view.timeline_origin_x());
            view.apply_pan(pan - view.pan_offset());
            for frame in 0..=200 {
                assert_eq!(view.pixel_to_frame(view.frame_to_pixel(frame)), frame);
            }
        }
    }

    #[test]
    fn test_frame_to_pixel_formula() {
        let view = transform();
        assert_eq!(view.timeline_origin_x(), 200.0);
        assert_eq!(view.frame_to_pixel(0), 200.0);
        assert_eq!(view.frame_to_pixel(20), 400.0);
    }

    #[test]
    fn test_pixel_to_frame_clamps() {
        let view = transform();
        assert_eq!(view.pixel_to_frame(-500.0), 0);
        assert_eq!(view.pixel_to_frame(view.frame_to_pixel(200) + 400.0), 200);
        assert_eq!(view.pixel_to_frame(204.0), 0);
        assert_eq!(view.pixel_to_frame(206.0), 1);
    }

    #[test]
    fn test_zoom_keeps_frame_under_mouse() {
        let mut view = transform();
        let mouse_x = view.timeline_origin_x() + view.visible_width() / 2.0;
        for start_zoom in [0.1, 0.35, 0.5, 1.0, 2.0, 4.5, 9.9, 10.0] {
            for delta in [-3.0, -1.0, 1.0, 3.0] {
                view.set_zoom(start_zoom, mouse_x);
                let before = view.frame_at_pixel(mouse_x);
                view.apply_zoom(delta, mouse_x);
                let after_x = view.timeline_origin_x()
                    + before * view.frame_width()
                    + view.pan_offset();
                assert!(
                    (after_x - mouse_x).abs() <= 0.5,
                    "zoom {start_zoom} delta {delta}: drifted to {after_x}"
                );
                assert!(pan_is_clamped(&view));
            }
        }
    }

    #[test]
    fn test_zoom_is_clamped() {
        let mut view = transform();
        view.apply_zoom(500.0, 600.0);
        assert_eq!(view.zoom(), MAX_ZOOM);
        view.apply_zoom(-500.0, 600.0);
        assert_eq!(view.zoom(), MIN_ZOOM);
        assert!(pan_is_clamped(&view));
    }

    #[test]
    fn test_pan_is_clamped() {
        let mut view = transform();
        view.apply_pan(10_000.0);
        assert_eq!(view.pan_offset(), 400.0);
        view.apply_pan(-100_000.0);
        assert_eq!(view.pan_offset(), -2000.0 + 400.0);
        view.apply_pan(300.0);
        assert!(pan_is_clamped(&view));
    }

    #[test]
    fn test_non_finite_zoom_and_pan_are_ignored() {
        let mut view = transform();
        view.apply_zoom(2.0, 600.0);
        view.apply_pan(-150.0);
        let before = view.clone();

        view.apply_zoom(f32::NAN, 600.0);
        view.apply_zoom(1.0, f32::NAN);
        view.set_zoom(f32::INFINITY, 600.0);
        view.apply_pan(f32::NAN);
        view.apply_pan(f32::NEG_INFINITY);
        view.set_track_label_width(f32::NAN);
        assert_eq!(view, before);
    }

    #[test]
    fn test_visible_frame_range() {
        let mut view = transform();
        assert_eq!(view.visible_frame_range(), 0..=81);

        view.apply_pan(-1000.0);
        assert_eq!(view.visible_frame_range(), 99..=181);

        view.apply_pan(-10_000.0);
        assert_eq!(*view.visible_frame_range().end(), 200);
    }

    #[test]
    fn test_label_spacing_never_overlaps() {
        let mut view = transform();
        for zoom in [0.1, 0.2, 0.49, 0.5, 0.99, 1.0, 2.0, 3.0, 3.1, 10.0] {
            view.set_zoom(zoom, 600.0);
            let spacing = view.label_spacing();
            assert!(spacing <= 50, "spacing {spacing} above a quarter of the range");
            assert!(
                spacing as f32 * view.frame_width() >= 30.0 || spacing * 2 > 50,
                "labels overlap at zoom {zoom}"
            );
        }
    }

    #[test]
    fn test_label_spacing_bases() {
        let mut view = transform();
        view.set_zoom(1.0, 600.0);
        assert_eq!(view.label_spacing(), 10);
        view.set_zoom(5.0, 600.0);
        assert_eq!(view.label_spacing(), 5);
        // 20 frames at 0.7 * 10 px = 140 px, already wide enough.
        view.set_zoom(0.7, 600.0);
        assert_eq!(view.label_spacing(), 20);
    }

    #[test]
    fn test_label_frames_are_multiples_of_spacing() {
        let view = transform();
        let frames: Vec<u32> = view.label_frames().collect();
        assert_eq!(frames.first(), Some(&0));
        assert!(frames.iter().all(|f| f % 10 == 0));
        assert_eq!(frames.last(), Some(&80));
    }

    #[test]
    fn test_label_width_clamp() {
        let mut view = transform();
        view.set_track_label_width(5.0);
        assert_eq!(view.track_label_width(), MIN_TRACK_LABEL_WIDTH);
        view.set_track_label_width(5000.0);
        assert_eq!(view.track_label_width(), 800.0);
        assert!(pan_is_clamped(&view));
    }
}
