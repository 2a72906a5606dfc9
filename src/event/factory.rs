use crate::{
    config::Config,
    error::{ArgumentError, DataResult},
    event::{
        Charset, Event, EventChain, KeySignature, Kind, MAX_TIME, SmpteOffset, TimeSignature,
        clip, fields::tempo_bytes, is_text_kind,
    },
};

fn channel_status(kind: Kind, channel: i32) -> u8 {
    u8::from(kind) | clip(0, channel, 15) as u8
}

fn data_byte(value: i32) -> u8 {
    clip(0, value, 127) as u8
}

/// Factories for floating events.
///
/// Every numeric argument is clipped into the range of the field it fills.
impl Event {
    fn meta(time: u32, kind: Kind, payload: Vec<u8>) -> Self {
        Self::from_parts(time, kind.into(), payload)
    }

    fn channel_message(time: u32, kind: Kind, channel: i32, data: &[u8]) -> Self {
        let status = channel_status(kind, channel);
        let mut payload = Vec::with_capacity(data.len() + 1);
        payload.push(status);
        payload.extend_from_slice(data);
        Self::from_parts(time, status, payload)
    }

    /// A sequence number (`FF 00`), clipped to `0..=65535`
    pub fn new_sequence_number(time: u32, number: i32) -> Self {
        let number = clip(0, number, u16::MAX as i32) as u16;
        Self::meta(time, Kind::SequenceNumber, number.to_be_bytes().to_vec())
    }

    /// A text-based meta event of any kind in `0x01..=0x1E`.
    ///
    /// The payload is marked with `charset` unless `text` starts with a tag of its own.
    ///
    /// # Errors
    /// [`ArgumentError::NotTextKind`] if `kind` does not carry text.
    pub fn new_text_based(time: u32, kind: u8, charset: Charset, text: &str) -> DataResult<Self> {
        if !is_text_kind(kind) {
            return Err(ArgumentError::NotTextKind(kind).into());
        }
        Ok(Self::text_of_kind(time, kind, charset, text))
    }

    fn text_of_kind(time: u32, kind: u8, charset: Charset, text: &str) -> Self {
        let mut event = Self::from_parts(time, kind, charset.marker().to_vec());
        event.write_text(text, &Config::default());
        event
    }

    /// A text event (`FF 01`)
    pub fn new_text_event(time: u32, charset: Charset, text: &str) -> Self {
        Self::text_of_kind(time, Kind::TextEvent.into(), charset, text)
    }

    /// A copyright notice (`FF 02`)
    pub fn new_copyright_notice(time: u32, charset: Charset, text: &str) -> Self {
        Self::text_of_kind(time, Kind::CopyrightNotice.into(), charset, text)
    }

    /// A track name (`FF 03`)
    pub fn new_track_name(time: u32, charset: Charset, text: &str) -> Self {
        Self::text_of_kind(time, Kind::TrackName.into(), charset, text)
    }

    /// An instrument name (`FF 04`)
    pub fn new_instrument_name(time: u32, charset: Charset, text: &str) -> Self {
        Self::text_of_kind(time, Kind::InstrumentName.into(), charset, text)
    }

    /// A lyric (`FF 05`)
    pub fn new_lyric(time: u32, charset: Charset, text: &str) -> Self {
        Self::text_of_kind(time, Kind::Lyric.into(), charset, text)
    }

    /// A marker (`FF 06`)
    pub fn new_marker(time: u32, charset: Charset, text: &str) -> Self {
        Self::text_of_kind(time, Kind::Marker.into(), charset, text)
    }

    /// A cue point (`FF 07`)
    pub fn new_cue_point(time: u32, charset: Charset, text: &str) -> Self {
        Self::text_of_kind(time, Kind::CuePoint.into(), charset, text)
    }

    /// A program name (`FF 08`)
    pub fn new_program_name(time: u32, charset: Charset, text: &str) -> Self {
        Self::text_of_kind(time, Kind::ProgramName.into(), charset, text)
    }

    /// A device name (`FF 09`)
    pub fn new_device_name(time: u32, charset: Charset, text: &str) -> Self {
        Self::text_of_kind(time, Kind::DeviceName.into(), charset, text)
    }

    /// A channel prefix (`FF 20`), clipped to `0..=15`
    pub fn new_channel_prefix(time: u32, channel: i32) -> Self {
        Self::meta(time, Kind::ChannelPrefix, vec![clip(0, channel, 15) as u8])
    }

    /// A port prefix (`FF 21`), clipped to `0..=255`
    pub fn new_port_prefix(time: u32, port: i32) -> Self {
        Self::meta(time, Kind::PortPrefix, vec![clip(0, port, 255) as u8])
    }

    /// The end-of-track marker (`FF 2F`)
    pub fn new_end_of_track(time: u32) -> Self {
        Self::meta(time, Kind::EndOfTrack, Vec::new())
    }

    /// A tempo change (`FF 51`) in microseconds per quarter note
    pub fn new_tempo(time: u32, tempo: i64) -> Self {
        Self::meta(time, Kind::Tempo, tempo_bytes(tempo).to_vec())
    }

    /// An SMPTE offset (`FF 54`)
    pub fn new_smpte_offset(time: u32, offset: SmpteOffset) -> Self {
        Self::meta(time, Kind::SmpteOffset, offset.to_bytes().to_vec())
    }

    /// A time signature (`FF 58`)
    pub fn new_time_signature(time: u32, signature: TimeSignature) -> Self {
        Self::meta(time, Kind::TimeSignature, signature.to_bytes().to_vec())
    }

    /// A key signature (`FF 59`)
    pub fn new_key_signature(time: u32, signature: KeySignature) -> Self {
        Self::meta(time, Kind::KeySignature, signature.to_bytes().to_vec())
    }

    /// A sequencer specific meta event (`FF 7F`)
    pub fn new_sequencer_specific(time: u32, data: &[u8]) -> Self {
        Self::meta(time, Kind::SequencerSpecific, data.to_vec())
    }

    /// A note off (`8n kk vv`)
    pub fn new_note_off(time: u32, channel: i32, key: i32, velocity: i32) -> Self {
        Self::channel_message(time, Kind::NoteOff, channel, &[data_byte(key), data_byte(velocity)])
    }

    /// A note on (`9n kk vv`).
    ///
    /// A velocity of zero makes the event a note off.
    pub fn new_note_on(time: u32, channel: i32, key: i32, velocity: i32) -> Self {
        Self::channel_message(time, Kind::NoteOn, channel, &[data_byte(key), data_byte(velocity)])
    }

    /// A note on paired with a `8n` note off `duration` ticks later.
    ///
    /// The note on velocity is clipped to `1..=127` so that the pair stays a note.
    ///
    /// # Example
    /// ```rust
    /// # use mididata::prelude::*;
    /// let note = Event::new_note_on_note_off(100, 0, 60, 100, 64, 480);
    /// assert!(note.is_note());
    /// assert_eq!(note.first().time(), 100);
    /// assert_eq!(note.last().time(), 580);
    /// assert_eq!(note.last().velocity(), Some(64));
    /// ```
    pub fn new_note_on_note_off(
        time: u32,
        channel: i32,
        key: i32,
        on_velocity: i32,
        off_velocity: i32,
        duration: i64,
    ) -> EventChain {
        let on = Self::new_note_on(time, channel, key, clip(1, on_velocity, 127));
        let off = Self::new_note_off(note_end(time, duration), channel, key, off_velocity);
        EventChain::from_members(vec![on, off], 0)
    }

    /// A note on paired with a `9n` velocity zero note off `duration` ticks later
    pub fn new_note_on_note_on0(
        time: u32,
        channel: i32,
        key: i32,
        velocity: i32,
        duration: i64,
    ) -> EventChain {
        let on = Self::new_note_on(time, channel, key, clip(1, velocity, 127));
        let off = Self::new_note_on(note_end(time, duration), channel, key, 0);
        EventChain::from_members(vec![on, off], 0)
    }

    /// Alias of [`Event::new_note_on_note_on0`], the compact way to write a note
    pub fn new_note(time: u32, channel: i32, key: i32, velocity: i32, duration: i64) -> EventChain {
        Self::new_note_on_note_on0(time, channel, key, velocity, duration)
    }

    /// Polyphonic key pressure (`An kk vv`)
    pub fn new_key_aftertouch(time: u32, channel: i32, key: i32, value: i32) -> Self {
        Self::channel_message(time, Kind::KeyAftertouch, channel, &[data_byte(key), data_byte(value)])
    }

    /// A control change (`Bn cc vv`)
    pub fn new_control_change(time: u32, channel: i32, controller: i32, value: i32) -> Self {
        Self::channel_message(
            time,
            Kind::ControlChange,
            channel,
            &[data_byte(controller), data_byte(value)],
        )
    }

    /// A program change (`Cn pp`)
    pub fn new_program_change(time: u32, channel: i32, program: i32) -> Self {
        Self::channel_message(time, Kind::ProgramChange, channel, &[data_byte(program)])
    }

    /// Channel pressure (`Dn vv`)
    pub fn new_channel_aftertouch(time: u32, channel: i32, value: i32) -> Self {
        Self::channel_message(time, Kind::ChannelAftertouch, channel, &[data_byte(value)])
    }

    /// A pitch bend (`En ll mm`), `0..=16383` with 8192 at the centre
    pub fn new_pitch_bend(time: u32, channel: i32, value: i32) -> Self {
        let value = clip(0, value, 16383);
        Self::channel_message(
            time,
            Kind::PitchBend,
            channel,
            &[(value & 0x7F) as u8, ((value >> 7) & 0x7F) as u8],
        )
    }

    /// A system exclusive event.
    ///
    /// A payload starting with `F0` is a [`Kind::SysExStart`], anything else a
    /// [`Kind::SysExContinue`].
    ///
    /// # Errors
    /// [`ArgumentError::MissingPayload`] if `data` is empty.
    pub fn new_sysex(time: u32, data: &[u8]) -> DataResult<Self> {
        let kind = match data.first() {
            None => return Err(ArgumentError::MissingPayload(Kind::SysExStart.into()).into()),
            Some(0xF0) => Kind::SysExStart,
            Some(_) => Kind::SysExContinue,
        };
        Ok(Self::from_parts(time, kind.into(), data.to_vec()))
    }
}

fn note_end(time: u32, duration: i64) -> u32 {
    clip(0, time as i64 + duration.max(0), MAX_TIME as i64) as u32
}

#[test]
fn note_on_note_off_pairs() {
    use pretty_assertions::assert_eq;
    let note = Event::new_note_on_note_off(100, 0, 60, 100, 64, 480);
    assert_eq!(note.len(), 2);
    assert_eq!(note.first().payload(), &[0x90, 60, 100]);
    assert_eq!(note.last().payload(), &[0x80, 60, 64]);
    assert_eq!(note.last().time(), 580);
    assert_eq!(note.duration(), Some(480));
}

#[test]
fn note_on0_pairs() {
    use pretty_assertions::assert_eq;
    let note = Event::new_note(0, 3, 64, 0, -10);
    assert!(note.is_note());
    assert_eq!(note.first().velocity(), Some(1));
    assert_eq!(note.last().payload(), &[0x93, 64, 0]);
    assert_eq!(note.last().time(), 0);
}

#[test]
fn channel_factories_clip() {
    use pretty_assertions::assert_eq;
    assert_eq!(Event::new_note_on(0, 16, 200, 300).payload(), &[0x9F, 127, 127]);
    assert_eq!(Event::new_note_on(0, -1, -5, 10).payload(), &[0x90, 0, 10]);
    assert_eq!(Event::new_program_change(0, 9, 12).kind(), Some(Kind::ProgramChange));
    assert_eq!(Event::new_channel_aftertouch(0, 1, 50).payload(), &[0xD1, 50]);
    assert_eq!(Event::new_channel_prefix(0, 16).payload(), &[15]);
}

#[test]
fn text_factories() {
    use pretty_assertions::assert_eq;
    let name = Event::new_track_name(0, Charset::Unspecified, "Piano");
    assert_eq!(name.payload(), b"Piano");
    assert!(name.is_track_name());

    // a tag in the text wins over the requested charset
    let lyric = Event::new_lyric(0, Charset::Utf16Le, "{@LATIN}la");
    assert_eq!(lyric.payload(), b"{@LATIN}la");

    assert!(Event::new_text_based(0, 0x2F, Charset::Unspecified, "x").is_err());
    let cue = Event::new_text_based(5, 0x07, Charset::Unspecified, "go").unwrap();
    assert_eq!(cue.kind(), Some(Kind::CuePoint));
}

#[test]
fn sysex_kind_follows_first_byte() {
    use pretty_assertions::assert_eq;
    let start = Event::new_sysex(0, &[0xF0, 0x7E, 0xF7]).unwrap();
    assert_eq!(start.kind(), Some(Kind::SysExStart));
    let cont = Event::new_sysex(0, &[0x01, 0xF7]).unwrap();
    assert_eq!(cont.kind(), Some(Kind::SysExContinue));
    assert!(Event::new_sysex(0, &[]).is_err());
}
