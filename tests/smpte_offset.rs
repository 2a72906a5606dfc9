use mididata::prelude::*;

/// A format 0 sequence with SMPTE timing and an offset event at the start
fn sequence_with_offset(offset: SmpteOffset) -> (Sequence, EventId) {
    let mut sequence = Sequence::new(
        Format::SingleMultiChannel,
        Timing::new_smpte(offset.fps, 40),
    );
    let id = sequence.add_track();
    let track = sequence.track_mut(id).unwrap();
    let event = track.insert_event(Event::new_smpte_offset(0, offset)).unwrap();
    (sequence, event)
}

fn offset_of(sequence: &Sequence, id: EventId) -> SmpteOffset {
    let track = sequence.track(sequence.first_track().unwrap()).unwrap();
    track.get(id).and_then(Event::smpte_offset).unwrap()
}

#[test]
fn offset_bytes_carry_the_frame_rate() {
    for (fps, mode) in [
        (SmpteFps::TwentyFour, 0x00u8),
        (SmpteFps::TwentyFive, 0x20),
        (SmpteFps::TwentyNine, 0x40),
        (SmpteFps::Thirty, 0x60),
    ] {
        let (sequence, id) = sequence_with_offset(SmpteOffset::new(fps, 1, 2, 3, 4, 5));
        let track = sequence.track(sequence.first_track().unwrap()).unwrap();
        let event = track.get(id).unwrap();
        assert_eq!(event.payload(), [mode | 1, 2, 3, 4, 5]);
        assert_eq!(offset_of(&sequence, id).fps, fps);
    }
}

#[test]
fn frames_are_clipped_per_frame_rate() {
    let cases = [
        (SmpteFps::TwentyFour, 23),
        (SmpteFps::TwentyFive, 24),
        (SmpteFps::TwentyNine, 29),
        (SmpteFps::Thirty, 29),
    ];
    for (fps, max) in cases {
        let (sequence, id) = sequence_with_offset(SmpteOffset::new(fps, 30, 70, 70, 99, 200));
        let offset = offset_of(&sequence, id);
        assert_eq!(offset.frame, max);
        assert_eq!((offset.hour, offset.minute, offset.second), (23, 59, 59));
        assert_eq!(offset.subframe, 99);
    }
}

#[test]
fn offset_can_be_rewritten_in_place() {
    let (mut sequence, id) = sequence_with_offset(SmpteOffset::default());
    let first = sequence.first_track().unwrap();
    let track = sequence.track_mut(first).unwrap();
    let replacement = SmpteOffset::new(SmpteFps::TwentyFive, 0, 0, 10, 12, 50);
    track.set_smpte_offset(id, replacement).unwrap();
    assert_eq!(offset_of(&sequence, id), replacement);

    let micros = replacement.as_micros();
    assert_eq!(micros, 10_000_000. + 12. * 1_000_000. / 25. + 50. * 10_000. / 25.);
}

#[test]
fn non_offset_events_have_no_offset() {
    let mut track = Track::new();
    let tempo = track.insert_event(Event::new_tempo(0, 500_000)).unwrap();
    assert_eq!(track.get(tempo).and_then(Event::smpte_offset), None);
    assert!(track.set_smpte_offset(tempo, SmpteOffset::default()).is_err());
}

#[test]
fn smpte_ticks_to_micros() {
    let (sequence, _) = sequence_with_offset(SmpteOffset::new(SmpteFps::Thirty, 0, 0, 0, 0, 0));
    // 30 fps * 40 ticks per frame
    assert_eq!(sequence.time_to_micros(1200).us(), 1_000_000);
}
