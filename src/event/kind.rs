use num_enum::{IntoPrimitive, TryFromPrimitive};

#[doc = r#"
The kind of an [`Event`](super::Event), as numbered by the Standard MIDI File format.

Meta kinds (`0x00..=0x7F`) are the meta type byte that follows `FF` in a file.
Channel kinds (`0x80..=0xEF`) are the status nibble with the channel cleared;
an event's raw kind keeps the channel in its low nibble.
System exclusive kinds are the `F0`/`F7` status bytes.

# Example
```rust
# use mididata::prelude::*;
assert_eq!(Kind::from_raw(0x93), Some(Kind::NoteOn));
assert_eq!(Kind::from_raw(0x51), Some(Kind::Tempo));
assert_eq!(Kind::from_raw(0x0A), None);
assert_eq!(u8::from(Kind::EndOfTrack), 0x2F);
```
"#]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, IntoPrimitive, TryFromPrimitive)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
#[allow(missing_docs)]
pub enum Kind {
    SequenceNumber = 0x00,
    TextEvent = 0x01,
    CopyrightNotice = 0x02,
    TrackName = 0x03,
    InstrumentName = 0x04,
    Lyric = 0x05,
    Marker = 0x06,
    CuePoint = 0x07,
    ProgramName = 0x08,
    DeviceName = 0x09,
    ChannelPrefix = 0x20,
    PortPrefix = 0x21,
    EndOfTrack = 0x2F,
    Tempo = 0x51,
    SmpteOffset = 0x54,
    TimeSignature = 0x58,
    KeySignature = 0x59,
    SequencerSpecific = 0x7F,
    NoteOff = 0x80,
    NoteOn = 0x90,
    KeyAftertouch = 0xA0,
    ControlChange = 0xB0,
    ProgramChange = 0xC0,
    ChannelAftertouch = 0xD0,
    PitchBend = 0xE0,
    SysExStart = 0xF0,
    SysExContinue = 0xF7,
}

impl Kind {
    /// Identify the kind of a raw kind byte.
    ///
    /// Channel kinds ignore the channel nibble. Unnamed meta kinds return `None`.
    pub fn from_raw(raw: u8) -> Option<Self> {
        let raw = if is_channel_kind(raw) { raw & 0xF0 } else { raw };
        Self::try_from(raw).ok()
    }

    /// True for the meta kinds that may only live in a format 1 conductor track
    pub const fn is_conductor_only(&self) -> bool {
        matches!(
            self,
            Self::Tempo | Self::SmpteOffset | Self::TimeSignature | Self::KeySignature
        )
    }

    /// True for the kinds whose payload is text
    pub const fn is_text_based(&self) -> bool {
        is_text_kind(*self as u8)
    }
}

/// Channel kinds carry their channel in the low nibble
pub(crate) const fn is_channel_kind(raw: u8) -> bool {
    0x80 <= raw && raw <= 0xEF
}

/// Text kinds lie strictly between sequence number and `0x1F`
pub(crate) const fn is_text_kind(raw: u8) -> bool {
    0x00 < raw && raw < 0x1F
}

#[test]
fn channel_kinds_mask_the_channel() {
    use pretty_assertions::assert_eq;
    for channel in 0..16 {
        assert_eq!(Kind::from_raw(0x80 | channel), Some(Kind::NoteOff));
        assert_eq!(Kind::from_raw(0xE0 | channel), Some(Kind::PitchBend));
    }
    assert_eq!(Kind::from_raw(0xF0), Some(Kind::SysExStart));
    assert_eq!(Kind::from_raw(0xF7), Some(Kind::SysExContinue));
    assert_eq!(Kind::from_raw(0xF1), None);
}

#[test]
fn text_kinds() {
    assert!(Kind::Lyric.is_text_based());
    assert!(Kind::DeviceName.is_text_based());
    assert!(!Kind::SequenceNumber.is_text_based());
    assert!(!Kind::ChannelPrefix.is_text_based());
    assert!(is_text_kind(0x1E));
    assert!(!is_text_kind(0x1F));
}
