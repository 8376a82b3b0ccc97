// SPDX-License-Identifier: MIT OR Apache-2.0
//! Sequence containing multiple tracks, and the playback clock driving it.

use crate::error::{Result, SequencerError};
use crate::keyframe::{Keyframe, KeyframeId, Value};
use crate::track::{Track, TrackId};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Frames a duplicated keyframe is shifted by
pub const DUPLICATE_FRAME_OFFSET: u32 = 5;

/// Handle to one keyframe inside a sequence.
///
/// Never a borrow: resolve it with [`Sequence::resolve`] each time it is used,
/// since deleting or duplicating keyframes shifts storage indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct KeyframeRef {
    /// Owning track
    pub track: TrackId,
    /// Keyframe within the track
    pub keyframe: KeyframeId,
}

impl KeyframeRef {
    /// Create a new reference
    pub fn new(track: TrackId, keyframe: KeyframeId) -> Self {
        Self { track, keyframe }
    }
}

/// A sequence of tracks over a fixed frame range `[0, frame_count]`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Sequence {
    /// Sequence name
    pub name: String,
    /// Tracks in declaration order
    tracks: IndexMap<TrackId, Track>,
    /// Last addressable frame
    frame_count: u32,
}

impl Sequence {
    /// Create a new sequence
    pub fn new(name: impl Into<String>, frame_count: u32) -> Self {
        Self {
            name: name.into(),
            tracks: IndexMap::new(),
            frame_count,
        }
    }

    /// Last addressable frame
    pub fn frame_count(&self) -> u32 {
        self.frame_count
    }

    /// Clamp a possibly negative frame into `[0, frame_count]`
    pub fn clamp_frame(&self, frame: i64) -> u32 {
        frame.clamp(0, i64::from(self.frame_count)) as u32
    }

    /// Add a track
    pub fn add_track(&mut self, track: Track) -> TrackId {
        let id = track.id;
        self.tracks.insert(id, track);
        id
    }

    /// Get a track
    pub fn track(&self, track_id: TrackId) -> Option<&Track> {
        self.tracks.get(&track_id)
    }

    /// Get a mutable track
    pub fn track_mut(&mut self, track_id: TrackId) -> Option<&mut Track> {
        self.tracks.get_mut(&track_id)
    }

    /// Get a track by its row index
    pub fn track_at(&self, index: usize) -> Option<&Track> {
        self.tracks.get_index(index).map(|(_, track)| track)
    }

    /// Get all tracks in declaration order
    pub fn tracks(&self) -> impl Iterator<Item = &Track> {
        self.tracks.values()
    }

    /// Get track count
    pub fn track_count(&self) -> usize {
        self.tracks.len()
    }

    /// Resolve a reference to `(track_index, keyframe_index)`
    pub fn resolve(&self, key: KeyframeRef) -> Option<(usize, usize)> {
        let (track_index, _, track) = self.tracks.get_full(&key.track)?;
        let keyframe_index = track.position(key.keyframe)?;
        Some((track_index, keyframe_index))
    }

    /// Get the keyframe a reference points at
    pub fn keyframe(&self, key: KeyframeRef) -> Option<&Keyframe> {
        self.tracks.get(&key.track)?.keyframe(key.keyframe)
    }

    /// Whether a reference still points at a keyframe
    pub fn contains(&self, key: KeyframeRef) -> bool {
        self.keyframe(key).is_some()
    }

    /// Find the first track holding a keyframe with this ID
    pub fn locate(&self, keyframe_id: KeyframeId) -> Option<KeyframeRef> {
        self.tracks
            .values()
            .find(|t| t.keyframe(keyframe_id).is_some())
            .map(|t| KeyframeRef::new(t.id, keyframe_id))
    }

    /// Move a keyframe, clamping the target into the frame range.
    ///
    /// Returns the frame actually written.
    pub fn move_keyframe(&mut self, key: KeyframeRef, frame: i64) -> Result<u32> {
        let frame = self.clamp_frame(frame);
        self.track_mut(key.track)
            .ok_or(SequencerError::TrackNotFound(key.track))?
            .set_frame(key.keyframe, frame)?;
        Ok(frame)
    }

    /// Replace a keyframe's value (type-checked against the track)
    pub fn set_value(&mut self, key: KeyframeRef, value: Value) -> Result<()> {
        self.track_mut(key.track)
            .ok_or(SequencerError::TrackNotFound(key.track))?
            .set_value(key.keyframe, value)
    }

    /// Remove every keyframe carrying `keyframe_id`, in every track.
    ///
    /// Returns the number of keyframes removed.
    pub fn delete_keyframe(&mut self, keyframe_id: KeyframeId) -> usize {
        self.tracks
            .values_mut()
            .map(|track| track.remove_where(|k| k.id == keyframe_id))
            .sum()
    }

    /// Clone a keyframe into its owning track, [`DUPLICATE_FRAME_OFFSET`]
    /// frames later (clamped to the frame range)
    pub fn duplicate_keyframe(&mut self, key: KeyframeRef) -> Result<KeyframeRef> {
        let frame_count = self.frame_count;
        let track = self
            .track_mut(key.track)
            .ok_or(SequencerError::TrackNotFound(key.track))?;
        let source = track
            .keyframe(key.keyframe)
            .ok_or(SequencerError::KeyframeNotFound(key.keyframe))?;
        let frame = source
            .frame
            .saturating_add(DUPLICATE_FRAME_OFFSET)
            .min(frame_count);
        let copy = source.duplicated_at(frame);
        let id = track.insert(copy)?;
        Ok(KeyframeRef::new(key.track, id))
    }
}

impl Default for Sequence {
    fn default() -> Self {
        Self::new("Untitled Sequence", 200)
    }
}

/// Playback state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PlaybackState {
    /// Stopped
    #[default]
    Stopped,
    /// Playing forward
    Playing,
    /// Paused
    Paused,
}

/// Slack when converting accumulated seconds into whole frames, so an exact
/// multiple of the frame period never loses a frame to rounding.
const ACCUMULATOR_EPSILON: f64 = 1e-9;

/// Fixed-rate playback clock.
///
/// Advances `current_frame` by whole frames; the fractional remainder is kept
/// in an accumulator that stays below one frame period after every tick.
#[derive(Debug, Clone)]
pub struct PlaybackClock {
    current_frame: u32,
    state: PlaybackState,
    frames_per_second: u32,
    time_accumulator: f64,
}

impl PlaybackClock {
    /// Create a stopped clock at frame 0.
    ///
    /// A rate of zero is raised to one frame per second.
    pub fn new(frames_per_second: u32) -> Self {
        Self {
            current_frame: 0,
            state: PlaybackState::Stopped,
            frames_per_second: frames_per_second.max(1),
            time_accumulator: 0.0,
        }
    }

    /// Current frame
    pub fn current_frame(&self) -> u32 {
        self.current_frame
    }

    /// Playback state
    pub fn state(&self) -> PlaybackState {
        self.state
    }

    /// Is currently playing
    pub fn is_playing(&self) -> bool {
        self.state == PlaybackState::Playing
    }

    /// Playback rate
    pub fn frames_per_second(&self) -> u32 {
        self.frames_per_second
    }

    /// Seconds accumulated toward the next frame
    pub fn time_accumulator(&self) -> f64 {
        self.time_accumulator
    }

    /// Duration of one frame in seconds
    pub fn frame_period(&self) -> f64 {
        1.0 / f64::from(self.frames_per_second)
    }

    /// Advance by `delta_time` seconds.
    ///
    /// Reaching past `frame_count` clamps there and stops playback.
    pub fn tick(&mut self, delta_time: f32, frame_count: u32) {
        if !self.is_playing() {
            return;
        }

        self.time_accumulator += f64::from(delta_time.max(0.0));
        let period = self.frame_period();
        let whole = ((self.time_accumulator + ACCUMULATOR_EPSILON) / period).floor();
        if whole < 1.0 {
            return;
        }
        self.time_accumulator = (self.time_accumulator - whole * period).max(0.0);

        // Float-to-int casts saturate, so huge deltas land past the end.
        let target = u64::from(self.current_frame).saturating_add(whole as u64);
        if target > u64::from(frame_count) {
            self.current_frame = frame_count;
            self.state = PlaybackState::Stopped;
            self.time_accumulator = 0.0;
            tracing::debug!("Playback reached end frame {}", frame_count);
        } else {
            self.current_frame = target as u32;
        }
    }

    /// Seek to a frame, clamped into `[0, frame_count]`
    pub fn set_frame(&mut self, frame: i64, frame_count: u32) {
        self.current_frame = frame.clamp(0, i64::from(frame_count)) as u32;
    }

    /// Play from current position
    pub fn play(&mut self) {
        self.state = PlaybackState::Playing;
    }

    /// Pause playback
    pub fn pause(&mut self) {
        if self.state == PlaybackState::Playing {
            self.state = PlaybackState::Paused;
        }
    }

    /// Toggle play/pause
    pub fn toggle_playback(&mut self) {
        if self.is_playing() {
            self.pause();
        } else {
            self.play();
        }
    }

    /// Stop and reset to the first frame
    pub fn stop(&mut self) {
        self.state = PlaybackState::Stopped;
        self.current_frame = 0;
        self.time_accumulator = 0.0;
    }

    /// Step by `delta` frames, clamped into the frame range
    pub fn step(&mut self, delta: i64, frame_count: u32) {
        self.set_frame(i64::from(self.current_frame) + delta, frame_count);
    }
}

impl Default for PlaybackClock {
    fn default() -> Self {
        Self::new(24)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keyframe::ValueType;

    fn sequence_with_tracks() -> (Sequence, TrackId, TrackId) {
        let mut sequence = Sequence::new("Test", 200);
        let mut a = Track::new("A", ValueType::Vec3);
        let mut b = Track::new("B", ValueType::Float);
        a.add_keyframe_at(10);
        b.add_keyframe_at(20);
        let a = sequence.add_track(a);
        let b = sequence.add_track(b);
        (sequence, a, b)
    }

    #[test]
    fn test_one_second_at_24_fps() {
        let mut clock = PlaybackClock::new(24);
        clock.play();
        clock.tick(1.0, 200);
        assert_eq!(clock.current_frame(), 24);
        assert!(clock.time_accumulator() < clock.frame_period());
    }

    #[test]
    fn test_sub_second_ticks_do_not_drift() {
        let mut clock = PlaybackClock::new(24);
        clock.play();
        for _ in 0..48 {
            clock.tick(1.0 / 48.0, 200);
        }
        assert_eq!(clock.current_frame(), 24);

        for _ in 0..4 {
            clock.tick(0.25, 200);
        }
        assert_eq!(clock.current_frame(), 48);
        assert!(clock.time_accumulator() < clock.frame_period());
    }

    #[test]
    fn test_tick_ignored_while_stopped() {
        let mut clock = PlaybackClock::new(30);
        clock.tick(5.0, 200);
        assert_eq!(clock.current_frame(), 0);
        assert_eq!(clock.time_accumulator(), 0.0);
    }

    #[test]
    fn test_reaching_end_stops_playback() {
        let mut clock = PlaybackClock::new(10);
        clock.set_frame(19, 20);
        clock.play();

        clock.tick(0.1, 20);
        assert_eq!(clock.current_frame(), 20);
        assert!(clock.is_playing());

        clock.tick(0.1, 20);
        assert_eq!(clock.current_frame(), 20);
        assert!(!clock.is_playing());
    }

    #[test]
    fn test_huge_delta_stops_at_end() {
        let mut clock = PlaybackClock::new(24);
        clock.set_frame(5, 200);
        clock.play();
        clock.tick(1e30, 200);
        assert_eq!(clock.current_frame(), 200);
        assert_eq!(clock.state(), PlaybackState::Stopped);
        assert_eq!(clock.time_accumulator(), 0.0);

        clock.set_frame(5, 200);
        clock.play();
        clock.tick(f32::INFINITY, 200);
        assert_eq!(clock.current_frame(), 200);
        assert_eq!(clock.time_accumulator(), 0.0);
    }

    #[test]
    fn test_stop_and_step() {
        let mut clock = PlaybackClock::new(24);
        clock.set_frame(500, 100);
        assert_eq!(clock.current_frame(), 100);
        clock.step(1, 100);
        assert_eq!(clock.current_frame(), 100);
        clock.step(-3, 100);
        assert_eq!(clock.current_frame(), 97);

        clock.play();
        clock.stop();
        assert_eq!(clock.current_frame(), 0);
        assert_eq!(clock.state(), PlaybackState::Stopped);
        clock.step(-1, 100);
        assert_eq!(clock.current_frame(), 0);
    }

    #[test]
    fn test_pause_and_toggle() {
        let mut clock = PlaybackClock::default();
        clock.toggle_playback();
        assert!(clock.is_playing());
        clock.toggle_playback();
        assert_eq!(clock.state(), PlaybackState::Paused);
        clock.pause();
        assert_eq!(clock.state(), PlaybackState::Paused);
    }

    #[test]
    fn test_resolve_and_locate() {
        let (sequence, a, b) = sequence_with_tracks();
        let kf = sequence.track(b).unwrap().keyframes()[0].id;
        let key = sequence.locate(kf).unwrap();
        assert_eq!(key.track, b);
        assert_eq!(sequence.resolve(key), Some((1, 0)));
        assert!(sequence.resolve(KeyframeRef::new(a, kf)).is_none());
    }

    #[test]
    fn test_move_keyframe_clamps() {
        let (mut sequence, a, _) = sequence_with_tracks();
        let key = KeyframeRef::new(a, sequence.track(a).unwrap().keyframes()[0].id);
        assert_eq!(sequence.move_keyframe(key, -5).unwrap(), 0);
        assert_eq!(sequence.move_keyframe(key, 999).unwrap(), 200);
        assert_eq!(sequence.keyframe(key).unwrap().frame, 200);
    }

    #[test]
    fn test_duplicate_into_owning_track() {
        let (mut sequence, a, b) = sequence_with_tracks();
        let source = KeyframeRef::new(a, sequence.track(a).unwrap().keyframes()[0].id);
        sequence.set_value(source, Value::Vec3([1.0, 2.0, 3.0])).unwrap();

        let copy = sequence.duplicate_keyframe(source).unwrap();
        assert_eq!(copy.track, a);
        assert_ne!(copy.keyframe, source.keyframe);
        let copied = sequence.keyframe(copy).unwrap();
        assert_eq!(copied.frame, 15);
        assert_eq!(copied.value, Value::Vec3([1.0, 2.0, 3.0]));
        assert_eq!(sequence.keyframe(source).unwrap().frame, 10);
        assert_eq!(sequence.track(a).unwrap().keyframe_count(), 2);
        assert_eq!(sequence.track(b).unwrap().keyframe_count(), 1);
    }

    #[test]
    fn test_duplicate_near_end_clamps() {
        let mut sequence = Sequence::new("Short", 12);
        let mut track = Track::new("T", ValueType::Int);
        let kf = track.add_keyframe_at(10);
        let track = sequence.add_track(track);
        let copy = sequence.duplicate_keyframe(KeyframeRef::new(track, kf)).unwrap();
        assert_eq!(sequence.keyframe(copy).unwrap().frame, 12);
    }

    #[test]
    fn test_delete_removes_identity_from_every_track() {
        let (mut sequence, a, b) = sequence_with_tracks();
        let shared = sequence.track(a).unwrap().keyframes()[0].clone();
        // Same ID, now living in a second track too.
        let mut alias = shared.clone();
        alias.value = Value::Float(0.0);
        sequence.track_mut(b).unwrap().insert(alias).unwrap();

        assert_eq!(sequence.delete_keyframe(shared.id), 2);
        assert_eq!(sequence.track(a).unwrap().keyframe_count(), 0);
        assert_eq!(sequence.track(b).unwrap().keyframe_count(), 1);
    }
}
