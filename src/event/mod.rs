#![doc = r#"
Timed MIDI, meta and system exclusive records.

An [`Event`] is a plain value: a tick time, a raw kind byte and the payload bytes.
An event that is not stored in a [`Track`](crate::track::Track) is *floating*.
Floating note pairings travel together as an [`EventChain`].

# Payload layout

| Category         | Raw kind      | Payload                                   |
|------------------|---------------|-------------------------------------------|
| Meta             | `0x00..=0x7F` | the meta data bytes (no `FF`, no length)  |
| Channel          | `0x80..=0xEF` | status byte followed by 1 or 2 data bytes |
| System exclusive | `0xF0`/`0xF7` | the bytes following the delta time        |
"#]

mod kind;
pub use kind::*;

mod chain;
pub use chain::*;

mod factory;

mod fields;

mod meta;
pub use meta::*;

mod text;
pub use text::*;

use crate::error::{ArgumentError, DataError, DataResult};

/// The largest representable event time: `2^31 - 1` ticks.
pub const MAX_TIME: u32 = i32::MAX as u32;

/// Clamp `val` into `[min, max]`
pub(crate) fn clip<T: Ord>(min: T, val: T, max: T) -> T {
    val.max(min).min(max)
}

/// Clamp a signed time into `[0, MAX_TIME]`
pub(crate) fn clip_time(time: i64) -> u32 {
    clip(0, time, MAX_TIME as i64) as u32
}

#[doc = r#"
One timed record of a track.

# Example
```rust
# use mididata::prelude::*;
// the status byte is synthesized when the payload starts with a data byte
let event = Event::new(0, 0x91, &[60, 100]).unwrap();
assert_eq!(event.payload(), &[0x91, 60, 100]);
assert!(event.is_note_on());
assert_eq!(event.channel(), Some(1));
```
"#]
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Event {
    time: u32,
    kind_raw: u8,
    payload: Vec<u8>,
}

impl Event {
    /// Create an event from a time, raw kind and payload.
    ///
    /// For channel kinds and `0xF0`, a payload that begins with a data byte (`<= 0x7F`)
    /// is taken to be missing its status byte, and `kind` is prepended.
    /// Otherwise the channel nibble of a channel kind is taken from the payload's status byte.
    ///
    /// Times above [`MAX_TIME`] are clipped.
    ///
    /// # Errors
    /// - [`ArgumentError::NegativeTime`] if `time < 0`
    /// - [`ArgumentError::KindOutOfRange`] if `kind` is not a byte
    /// - [`ArgumentError::MissingPayload`] if a channel or `0xF0` kind has no payload
    /// - [`ArgumentError::ChannelPayloadTooLong`] if a channel kind has 4 or more bytes
    pub fn new(time: i64, kind: i32, payload: &[u8]) -> DataResult<Self> {
        if time < 0 {
            return Err(ArgumentError::NegativeTime(time).into());
        }
        let Ok(kind) = u8::try_from(kind) else {
            return Err(ArgumentError::KindOutOfRange(kind).into());
        };
        let is_channel = is_channel_kind(kind);
        if is_channel && payload.len() >= 4 {
            return Err(ArgumentError::ChannelPayloadTooLong(payload.len()).into());
        }
        let has_status = is_channel || kind == 0xF0;
        if has_status && payload.is_empty() {
            return Err(ArgumentError::MissingPayload(kind).into());
        }

        let mut kind_raw = kind;
        let payload = match payload.first() {
            Some(&first) if has_status && first <= 0x7F => {
                let mut bytes = Vec::with_capacity(payload.len() + 1);
                bytes.push(kind);
                bytes.extend_from_slice(payload);
                bytes
            }
            Some(&first) if is_channel => {
                kind_raw = (kind & 0xF0) | (first & 0x0F);
                payload.to_vec()
            }
            _ => payload.to_vec(),
        };

        Ok(Self {
            time: clip_time(time),
            kind_raw,
            payload,
        })
    }

    /// Build an event from parts that are already known to be consistent
    pub(crate) fn from_parts(time: u32, kind_raw: u8, payload: Vec<u8>) -> Self {
        Self {
            time: time.min(MAX_TIME),
            kind_raw,
            payload,
        }
    }

    /// Absolute time in ticks (or SMPTE sub-frame units)
    #[inline]
    pub const fn time(&self) -> u32 {
        self.time
    }

    /// Set the time of this event, clipped to `[0, MAX_TIME]`.
    ///
    /// This only changes the stored value. Events owned by a track are moved
    /// through [`Track::set_time`](crate::track::Track::set_time) instead.
    pub fn set_time(&mut self, time: i64) {
        self.time = clip_time(time);
    }

    pub(crate) fn set_time_unchecked(&mut self, time: u32) {
        self.time = time;
    }

    /// The raw kind byte, including the channel for channel events
    #[inline]
    pub const fn kind_raw(&self) -> u8 {
        self.kind_raw
    }

    pub(crate) fn set_kind_raw_unchecked(&mut self, kind_raw: u8) {
        self.kind_raw = kind_raw;
    }

    /// The kind of this event, if it is a named kind
    pub fn kind(&self) -> Option<Kind> {
        Kind::from_raw(self.kind_raw)
    }

    /// The payload bytes
    #[inline]
    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    /// Length of the payload in bytes
    #[inline]
    pub fn len(&self) -> usize {
        self.payload.len()
    }

    /// True if the payload is empty
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.payload.is_empty()
    }

    pub(crate) fn payload_mut(&mut self) -> &mut Vec<u8> {
        &mut self.payload
    }

    pub(crate) fn byte(&self, index: usize) -> Option<u8> {
        self.payload.get(index).copied()
    }

    /// A human readable rendering of the event.
    ///
    /// # Errors
    /// Always [`DataError::Unsupported`]: no rendering has been defined.
    pub fn describe(&self) -> DataResult<String> {
        Err(DataError::Unsupported("Event::describe"))
    }

    /// Meta events: sequence number through sequencer specific (`0x00..=0x7F`)
    pub const fn is_meta(&self) -> bool {
        self.kind_raw <= 0x7F
    }

    /// Channel events (`0x80..=0xEF`)
    pub const fn is_channel_event(&self) -> bool {
        is_channel_kind(self.kind_raw)
    }

    /// System exclusive events (`0xF0` or `0xF7`)
    pub const fn is_sysex(&self) -> bool {
        self.kind_raw == 0xF0 || self.kind_raw == 0xF7
    }

    /// Events whose payload is text (`0x01..=0x1E`)
    pub const fn is_text_based(&self) -> bool {
        is_text_kind(self.kind_raw)
    }

    /// A note on with a non-zero velocity
    pub fn is_note_on(&self) -> bool {
        (0x90..=0x9F).contains(&self.kind_raw) && self.byte(2).is_some_and(|v| v > 0)
    }

    /// A note off, or a note on with velocity zero
    pub fn is_note_off(&self) -> bool {
        match self.kind_raw {
            0x80..=0x8F => true,
            0x90..=0x9F => self.byte(2).is_none_or(|v| v == 0),
            _ => false,
        }
    }

    /// Note off encoded with the `0x8n` status
    pub const fn is_note_off_status(&self) -> bool {
        0x80 <= self.kind_raw && self.kind_raw <= 0x8F
    }

    /// Polyphonic key pressure
    pub const fn is_key_aftertouch(&self) -> bool {
        0xA0 <= self.kind_raw && self.kind_raw <= 0xAF
    }

    /// Control change
    pub const fn is_control_change(&self) -> bool {
        0xB0 <= self.kind_raw && self.kind_raw <= 0xBF
    }

    /// Program change
    pub const fn is_program_change(&self) -> bool {
        0xC0 <= self.kind_raw && self.kind_raw <= 0xCF
    }

    /// Channel pressure
    pub const fn is_channel_aftertouch(&self) -> bool {
        0xD0 <= self.kind_raw && self.kind_raw <= 0xDF
    }

    /// Pitch bend
    pub const fn is_pitch_bend(&self) -> bool {
        0xE0 <= self.kind_raw && self.kind_raw <= 0xEF
    }

    /// End-of-track marker
    pub const fn is_end_of_track(&self) -> bool {
        self.kind_raw == Kind::EndOfTrack as u8
    }

    /// Tempo change
    pub const fn is_tempo(&self) -> bool {
        self.kind_raw == Kind::Tempo as u8
    }

    /// SMPTE offset
    pub const fn is_smpte_offset(&self) -> bool {
        self.kind_raw == Kind::SmpteOffset as u8
    }

    /// Time signature
    pub const fn is_time_signature(&self) -> bool {
        self.kind_raw == Kind::TimeSignature as u8
    }

    /// Key signature
    pub const fn is_key_signature(&self) -> bool {
        self.kind_raw == Kind::KeySignature as u8
    }

    /// Sequence number
    pub const fn is_sequence_number(&self) -> bool {
        self.kind_raw == Kind::SequenceNumber as u8
    }

    /// Track name
    pub const fn is_track_name(&self) -> bool {
        self.kind_raw == Kind::TrackName as u8
    }

    /// Lyric
    pub const fn is_lyric(&self) -> bool {
        self.kind_raw == Kind::Lyric as u8
    }

    /// Marker
    pub const fn is_marker(&self) -> bool {
        self.kind_raw == Kind::Marker as u8
    }

    /// Channel prefix
    pub const fn is_channel_prefix(&self) -> bool {
        self.kind_raw == Kind::ChannelPrefix as u8
    }

    /// Port prefix
    pub const fn is_port_prefix(&self) -> bool {
        self.kind_raw == Kind::PortPrefix as u8
    }

    /// Sequencer specific
    pub const fn is_sequencer_specific(&self) -> bool {
        self.kind_raw == Kind::SequencerSpecific as u8
    }

    /// True for tempo, SMPTE offset, time signature and key signature events
    pub fn is_conductor_only(&self) -> bool {
        self.kind().is_some_and(|kind| kind.is_conductor_only())
    }
}

#[test]
fn new_rejects_invalid_arguments() {
    use pretty_assertions::assert_eq;

    assert_eq!(
        Event::new(-1, 0x90, &[0x90, 60, 100]),
        Err(ArgumentError::NegativeTime(-1).into())
    );
    assert_eq!(
        Event::new(0, 256, &[]),
        Err(ArgumentError::KindOutOfRange(256).into())
    );
    assert_eq!(
        Event::new(0, -3, &[]),
        Err(ArgumentError::KindOutOfRange(-3).into())
    );
    assert_eq!(
        Event::new(0, 0xB0, &[0xB0, 1, 2, 3]),
        Err(ArgumentError::ChannelPayloadTooLong(4).into())
    );
    assert_eq!(
        Event::new(0, 0xC0, &[]),
        Err(ArgumentError::MissingPayload(0xC0).into())
    );
}

#[test]
fn new_synchronizes_channel_with_payload() {
    use pretty_assertions::assert_eq;

    // status present: the channel comes from the payload
    let event = Event::new(10, 0x90, &[0x95, 64, 90]).unwrap();
    assert_eq!(event.kind_raw(), 0x95);
    assert_eq!(event.payload(), &[0x95, 64, 90]);

    // status missing: it is synthesized from the kind
    let event = Event::new(10, 0xB3, &[7, 100]).unwrap();
    assert_eq!(event.kind_raw(), 0xB3);
    assert_eq!(event.payload(), &[0xB3, 7, 100]);

    let sysex = Event::new(0, 0xF0, &[0x43, 0x10, 0xF7]).unwrap();
    assert_eq!(sysex.payload(), &[0xF0, 0x43, 0x10, 0xF7]);
}

#[test]
fn new_clips_large_times() {
    let event = Event::new(i64::MAX, 0x2F, &[]).unwrap();
    assert_eq!(event.time(), MAX_TIME);
}

#[test]
fn note_classification() {
    let on = Event::new(0, 0x90, &[60, 1]).unwrap();
    let on0 = Event::new(0, 0x90, &[60, 0]).unwrap();
    let off = Event::new(0, 0x80, &[60, 64]).unwrap();
    assert!(on.is_note_on() && !on.is_note_off());
    assert!(on0.is_note_off() && !on0.is_note_on());
    assert!(off.is_note_off() && off.is_note_off_status());
    assert!(on.is_channel_event() && !on.is_meta());
}

#[test]
fn describe_is_unsupported() {
    let event = Event::new(0, 0x2F, &[]).unwrap();
    assert!(event.describe().unwrap_err().is_unsupported());
}
