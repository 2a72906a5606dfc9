use crate::{
    event::Kind,
    micros::UMicros,
    sequence::{Sequence, Timing},
};

/// Microseconds per quarter note until the first tempo event (120 BPM)
pub const DEFAULT_TEMPO: u32 = 500_000;

impl Sequence {
    /// The wall-clock offset of a tick time from the start of the sequence.
    ///
    /// With ticks per quarter note, the tempo events of the first track are
    /// integrated, starting from [`DEFAULT_TEMPO`]. With SMPTE timing a tick is
    /// `1 / (fps * ticks_per_frame)` seconds.
    pub fn time_to_micros(&self, time: u32) -> UMicros {
        match self.timing {
            Timing::TicksPerQuarterNote(tpqn) => {
                let tpqn = u128::from(tpqn.ticks_per_quarter_note().max(1));
                let mut elapsed: u128 = 0;
                let mut last_time = 0u32;
                let mut tempo = DEFAULT_TEMPO;
                if let Some(track) = self.master_track() {
                    let mut cursor = track.first_kind_event(Kind::Tempo);
                    while let Some(id) = cursor {
                        let Some(event) = track.get(id) else { break };
                        if event.time() >= time {
                            break;
                        }
                        elapsed += u128::from(event.time() - last_time) * u128::from(tempo);
                        last_time = event.time();
                        tempo = event.tempo().unwrap_or(tempo);
                        cursor = track.next_same_kind(id);
                    }
                }
                elapsed += u128::from(time - last_time) * u128::from(tempo);
                UMicros::new((elapsed / tpqn) as u64)
            }
            Timing::Smpte(header) => {
                let ticks_per_second =
                    header.fps().as_f64() * f64::from(header.ticks_per_frame().max(1));
                UMicros::new((f64::from(time) * 1_000_000. / ticks_per_second) as u64)
            }
        }
    }
}

#[test]
fn default_tempo_is_120_bpm() {
    use crate::sequence::Format;
    use pretty_assertions::assert_eq;
    let sequence = Sequence::new(Format::Simultaneous, Timing::new_ticks_per_quarter_note(96));
    assert_eq!(sequence.time_to_micros(96 * 2).us(), 1_000_000);
}

#[test]
fn tempo_changes_are_integrated() {
    use crate::event::Event;
    use crate::sequence::Format;
    use pretty_assertions::assert_eq;
    let mut sequence = Sequence::new(Format::Simultaneous, Timing::new_ticks_per_quarter_note(480));
    let conductor = sequence.add_track();
    let track = sequence.track_mut(conductor).unwrap();
    track.insert_event(Event::new_tempo(0, 1_000_000)).unwrap();
    track.insert_event(Event::new_tempo(960, 250_000)).unwrap();

    assert_eq!(sequence.time_to_micros(480).us(), 1_000_000);
    assert_eq!(sequence.time_to_micros(960).us(), 2_000_000);
    assert_eq!(sequence.time_to_micros(960 + 240).us(), 2_125_000);
}

#[test]
fn smpte_ticks_are_fixed_length() {
    use crate::sequence::{Format, SmpteFps};
    use pretty_assertions::assert_eq;
    let sequence = Sequence::new(
        Format::SingleMultiChannel,
        Timing::new_smpte(SmpteFps::TwentyFive, 40),
    );
    // 1000 ticks per second
    assert_eq!(sequence.time_to_micros(1500).us(), 1_500_000);
}
