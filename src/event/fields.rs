//! Numeric payload fields.
//!
//! Getters return `None` when the field does not apply to the event's kind.
//! Setters clip to the field's range and fail only when the field does not apply.

use crate::{
    error::{ArgumentError, DataError, DataResult},
    event::{Event, KeySignature, SmpteOffset, TimeSignature, clip},
};

/// Smallest tempo, in microseconds per quarter note
pub const MIN_TEMPO: u32 = 1;
/// Largest tempo that fits the three tempo bytes
pub const MAX_TEMPO: u32 = 0xFF_FFFF;

impl Event {
    fn field_error(&self) -> DataError {
        DataError::InvalidArgument(ArgumentError::FieldNotApplicable(self.kind_raw()))
    }

    fn set_byte(&mut self, index: usize, value: u8) {
        let payload = self.payload_mut();
        if payload.len() <= index {
            payload.resize(index + 1, 0);
        }
        payload[index] = value;
    }

    fn has_key(&self) -> bool {
        self.is_note_on() || self.is_note_off() || self.is_key_aftertouch()
    }

    /// The channel (0-15) of a channel event
    pub fn channel(&self) -> Option<u8> {
        self.is_channel_event().then_some(self.kind_raw() & 0x0F)
    }

    /// Set the channel of a channel event, clipped to `0..=15`.
    ///
    /// The raw kind and the status byte are both updated.
    pub fn set_channel(&mut self, channel: i32) -> DataResult<()> {
        if !self.is_channel_event() {
            return Err(self.field_error());
        }
        let status = (self.kind_raw() & 0xF0) | clip(0, channel, 15) as u8;
        self.set_kind_raw_unchecked(status);
        self.set_byte(0, status);
        Ok(())
    }

    /// The key number of a note on, note off or key aftertouch
    pub fn key(&self) -> Option<u8> {
        if self.has_key() { self.byte(1) } else { None }
    }

    /// Set the key number, clipped to `0..=127`
    pub fn set_key(&mut self, key: i32) -> DataResult<()> {
        if !self.has_key() {
            return Err(self.field_error());
        }
        self.set_byte(1, clip(0, key, 127) as u8);
        Ok(())
    }

    /// The velocity of a note on or note off
    pub fn velocity(&self) -> Option<u8> {
        if self.is_note_on() || self.is_note_off() {
            Some(self.byte(2).unwrap_or(0))
        } else {
            None
        }
    }

    /// Set the velocity.
    ///
    /// A note on stays a note on: its velocity is clipped to `1..=127`.
    /// A `0x8n` note off takes `0..=127`. A note on with velocity zero stands for a
    /// note off and keeps its zero: on such an event the call succeeds and changes
    /// nothing.
    pub fn set_velocity(&mut self, velocity: i32) -> DataResult<()> {
        if self.is_note_on() {
            self.set_byte(2, clip(1, velocity, 127) as u8);
        } else if self.is_note_off_status() {
            self.set_byte(2, clip(0, velocity, 127) as u8);
        } else if !self.is_note_off() {
            return Err(self.field_error());
        }
        Ok(())
    }

    /// The value of a key aftertouch, control change, channel aftertouch (0-127)
    /// or pitch bend (0-16383, centre 8192)
    pub fn value(&self) -> Option<u16> {
        if self.is_key_aftertouch() || self.is_control_change() {
            self.byte(2).map(u16::from)
        } else if self.is_channel_aftertouch() {
            self.byte(1).map(u16::from)
        } else if self.is_pitch_bend() {
            let lsb = self.byte(1)? as u16 & 0x7F;
            let msb = self.byte(2)? as u16 & 0x7F;
            Some(msb << 7 | lsb)
        } else {
            None
        }
    }

    /// Set the value, clipped to `0..=127` (`0..=16383` for pitch bend)
    pub fn set_value(&mut self, value: i32) -> DataResult<()> {
        if self.is_key_aftertouch() || self.is_control_change() {
            self.set_byte(2, clip(0, value, 127) as u8);
        } else if self.is_channel_aftertouch() {
            self.set_byte(1, clip(0, value, 127) as u8);
        } else if self.is_pitch_bend() {
            let value = clip(0, value, 16383);
            self.set_byte(1, (value & 0x7F) as u8);
            self.set_byte(2, ((value >> 7) & 0x7F) as u8);
        } else {
            return Err(self.field_error());
        }
        Ok(())
    }

    /// The number of a sequence number (0-65535), channel prefix (0-15), port prefix (0-255),
    /// control change (controller, 0-127) or program change (program, 0-127)
    pub fn number(&self) -> Option<u16> {
        if self.is_sequence_number() {
            let [msb, lsb] = [self.byte(0)?, self.byte(1)?];
            Some(u16::from_be_bytes([msb, lsb]))
        } else if self.is_channel_prefix() || self.is_port_prefix() {
            self.byte(0).map(u16::from)
        } else if self.is_control_change() || self.is_program_change() {
            self.byte(1).map(u16::from)
        } else {
            None
        }
    }

    /// Set the number, clipped to the range of the event's kind
    pub fn set_number(&mut self, number: i32) -> DataResult<()> {
        if self.is_sequence_number() {
            let [msb, lsb] = (clip(0, number, 65535) as u16).to_be_bytes();
            *self.payload_mut() = vec![msb, lsb];
        } else if self.is_channel_prefix() {
            *self.payload_mut() = vec![clip(0, number, 15) as u8];
        } else if self.is_port_prefix() {
            *self.payload_mut() = vec![clip(0, number, 255) as u8];
        } else if self.is_control_change() || self.is_program_change() {
            self.set_byte(1, clip(0, number, 127) as u8);
        } else {
            return Err(self.field_error());
        }
        Ok(())
    }

    /// Microseconds per quarter note of a tempo event
    pub fn tempo(&self) -> Option<u32> {
        if !self.is_tempo() {
            return None;
        }
        let &[a, b, c, ..] = self.payload() else {
            return None;
        };
        Some(u32::from_be_bytes([0, a, b, c]))
    }

    /// Set the tempo, clipped to `MIN_TEMPO..=MAX_TEMPO` microseconds per quarter note.
    ///
    /// `tempo = 60_000_000 / bpm`
    pub fn set_tempo(&mut self, tempo: i64) -> DataResult<()> {
        if !self.is_tempo() {
            return Err(self.field_error());
        }
        *self.payload_mut() = tempo_bytes(tempo).to_vec();
        Ok(())
    }

    /// The time signature of a time signature event
    pub fn time_signature(&self) -> Option<TimeSignature> {
        if !self.is_time_signature() {
            return None;
        }
        TimeSignature::from_bytes(self.payload())
    }

    /// Rewrite the time signature
    pub fn set_time_signature(&mut self, signature: TimeSignature) -> DataResult<()> {
        if !self.is_time_signature() {
            return Err(self.field_error());
        }
        *self.payload_mut() = signature.to_bytes().to_vec();
        Ok(())
    }

    /// The key signature of a key signature event
    pub fn key_signature(&self) -> Option<KeySignature> {
        if !self.is_key_signature() {
            return None;
        }
        KeySignature::from_bytes(self.payload())
    }

    /// Rewrite the key signature
    pub fn set_key_signature(&mut self, signature: KeySignature) -> DataResult<()> {
        if !self.is_key_signature() {
            return Err(self.field_error());
        }
        *self.payload_mut() = signature.to_bytes().to_vec();
        Ok(())
    }

    /// The offset of an SMPTE offset event
    pub fn smpte_offset(&self) -> Option<SmpteOffset> {
        if !self.is_smpte_offset() {
            return None;
        }
        SmpteOffset::from_bytes(self.payload())
    }

    /// Rewrite the SMPTE offset
    pub fn set_smpte_offset(&mut self, offset: SmpteOffset) -> DataResult<()> {
        if !self.is_smpte_offset() {
            return Err(self.field_error());
        }
        *self.payload_mut() = offset.to_bytes().to_vec();
        Ok(())
    }
}

pub(crate) fn tempo_bytes(tempo: i64) -> [u8; 3] {
    let tempo = clip(MIN_TEMPO as i64, tempo, MAX_TEMPO as i64) as u32;
    let [_, a, b, c] = tempo.to_be_bytes();
    [a, b, c]
}

#[test]
fn velocity_keeps_note_class() {
    use pretty_assertions::assert_eq;
    let mut on = Event::new_note_on(0, 0, 60, 100);
    on.set_velocity(0).unwrap();
    assert_eq!(on.velocity(), Some(1));
    on.set_velocity(500).unwrap();
    assert_eq!(on.velocity(), Some(127));

    let mut off = Event::new_note_off(0, 0, 60, 64);
    off.set_velocity(-5).unwrap();
    assert_eq!(off.velocity(), Some(0));

    // a zero-velocity note on is left untouched
    let mut on0 = Event::new_note_on(0, 0, 60, 0);
    on0.set_velocity(90).unwrap();
    assert_eq!(on0.payload(), &[0x90, 60, 0]);
    assert_eq!(on0.velocity(), Some(0));
    assert!(on0.is_note_off());
}

#[test]
fn channel_updates_kind_and_status() {
    use pretty_assertions::assert_eq;
    let mut cc = Event::new_control_change(0, 2, 7, 100);
    cc.set_channel(20).unwrap();
    assert_eq!(cc.channel(), Some(15));
    assert_eq!(cc.kind_raw(), 0xBF);
    assert_eq!(cc.payload()[0], 0xBF);
    assert!(Event::new_tempo(0, 1).channel().is_none());
}

#[test]
fn pitch_bend_packs_seven_bit_halves() {
    use pretty_assertions::assert_eq;
    let mut bend = Event::new_pitch_bend(0, 0, 8192);
    assert_eq!(bend.payload(), &[0xE0, 0x00, 0x40]);
    assert_eq!(bend.value(), Some(8192));
    bend.set_value(20_000).unwrap();
    assert_eq!(bend.value(), Some(16383));
    assert_eq!(bend.payload(), &[0xE0, 0x7F, 0x7F]);
}

#[test]
fn tempo_is_clipped() {
    use pretty_assertions::assert_eq;
    let mut tempo = Event::new_tempo(0, 500_000);
    assert_eq!(tempo.payload(), &[0x07, 0xA1, 0x20]);
    tempo.set_tempo(0).unwrap();
    assert_eq!(tempo.tempo(), Some(MIN_TEMPO));
    tempo.set_tempo(i64::MAX).unwrap();
    assert_eq!(tempo.tempo(), Some(MAX_TEMPO));
}

#[test]
fn numbers_per_kind() {
    use pretty_assertions::assert_eq;
    let mut seq = Event::new_sequence_number(0, 70_000);
    assert_eq!(seq.number(), Some(65535));
    seq.set_number(258).unwrap();
    assert_eq!(seq.payload(), &[1, 2]);

    let mut program = Event::new_program_change(0, 0, 5);
    program.set_number(300).unwrap();
    assert_eq!(program.number(), Some(127));

    let mut prefix = Event::new_channel_prefix(0, 3);
    prefix.set_number(99).unwrap();
    assert_eq!(prefix.number(), Some(15));

    assert!(Event::new_end_of_track(0).set_number(1).is_err());
}

#[test]
fn fields_reject_other_kinds() {
    use pretty_assertions::assert_eq;
    let mut tempo = Event::new_tempo(0, 1);
    assert!(tempo.set_key(60).is_err());
    assert!(tempo.set_velocity(60).is_err());
    assert!(tempo.set_value(60).is_err());
    assert!(tempo.set_time_signature(TimeSignature::default()).is_err());
    assert_eq!(tempo.key(), None);
    assert_eq!(
        tempo.set_number(3).unwrap_err().to_string(),
        "Invalid argument: Kind 0x51 has no such field"
    );
}
