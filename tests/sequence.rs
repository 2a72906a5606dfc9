use mididata::prelude::*;

fn format_one() -> (Sequence, TrackId, TrackId) {
    let mut sequence = Sequence::new(Format::Simultaneous, Timing::new_ticks_per_quarter_note(480));
    let conductor = sequence.add_track();
    let performance = sequence.add_track();
    (sequence, conductor, performance)
}

#[test]
fn conductor_refuses_channel_events() {
    let (mut sequence, conductor, _) = format_one();
    let track = sequence.track_mut(conductor).unwrap();
    assert_eq!(
        track.insert_event(Event::new_program_change(0, 0, 1)),
        Err(FormatError::ChannelEventInConductor.into())
    );
    track
        .insert_event(Event::new_time_signature(0, TimeSignature::new(3, 2, 24, 8)))
        .unwrap();
    track
        .insert_event(Event::new_marker(0, Charset::Unspecified, "A"))
        .unwrap();
    assert_eq!(track.len(), 2);
}

#[test]
fn performance_tracks_refuse_global_meta_events() {
    let (mut sequence, _, performance) = format_one();
    let track = sequence.track_mut(performance).unwrap();
    for event in [
        Event::new_tempo(0, 400_000),
        Event::new_smpte_offset(0, SmpteOffset::default()),
        Event::new_time_signature(0, TimeSignature::default()),
        Event::new_key_signature(0, KeySignature::new(-3, Mode::Minor)),
    ] {
        assert_eq!(
            track.insert_event(event),
            Err(FormatError::GlobalMetaOutsideConductor.into())
        );
    }
    track.insert_event(Event::new_note(0, 9, 36, 120, 30)).unwrap();
    assert_eq!(sequence.num_events(), 2);
}

#[test]
fn format_zero_and_two_do_not_restrict() {
    for format in [Format::SingleMultiChannel, Format::SequentiallyIndependent] {
        let mut sequence = Sequence::new(format, Timing::default());
        let first = sequence.add_track();
        let second = sequence.add_track();
        for id in [first, second] {
            let track = sequence.track_mut(id).unwrap();
            track.insert_event(Event::new_tempo(0, 400_000)).unwrap();
            track.insert_event(Event::new_control_change(0, 0, 7, 100)).unwrap();
        }
        assert_eq!(sequence.conductor_track(), None);
        assert_eq!(sequence.num_events(), 4);
    }
}

#[test]
fn track_chain_plumbing() {
    let (mut sequence, conductor, performance) = format_one();
    let extra = sequence.add_track();
    let order: Vec<TrackId> = sequence.tracks().map(|(id, _)| id).collect();
    assert_eq!(order, [conductor, performance, extra]);
    assert_eq!(sequence.last_track(), Some(extra));
    assert_eq!(sequence.prev_track(extra), Some(performance));

    sequence.delete_track(performance).unwrap();
    assert_eq!(sequence.next_track(conductor), Some(extra));
    assert_eq!(sequence.num_tracks(), 2);
    assert!(sequence.track(performance).is_none());
    assert_eq!(
        sequence.delete_track(performance),
        Err(OwnershipError::UnknownTrack(performance).into())
    );
}

#[test]
fn clone_into_another_sequence() {
    let (mut sequence, _, performance) = format_one();
    let track = sequence.track_mut(performance).unwrap();
    track
        .insert_event(Event::new_track_name(0, Charset::Unspecified, "Piano"))
        .unwrap();
    track.insert_event(Event::new_note(0, 0, 60, 100, 480)).unwrap();
    track.insert_event(Event::new_end_of_track(0)).unwrap();

    let copy = sequence.track(performance).unwrap().create_clone().unwrap();
    assert_eq!(copy.role(), TrackRole::Standalone);
    let mut other = Sequence::new(Format::SingleMultiChannel, Timing::default());
    let id = other.push_track(copy);
    let copied = other.track(id).unwrap();
    assert_eq!(copied.name().as_deref(), Some("Piano"));
    assert_eq!(copied.len(), 4);
    assert_eq!(copied.end_time(), 480);
}

#[test]
fn default_charset_comes_from_the_sequence() {
    let mut sequence = Sequence::with_config(
        Format::SingleMultiChannel,
        Timing::default(),
        Config::new(Charset::Jp),
    );
    let config = *sequence.config();
    let id = sequence.add_track();
    let track = sequence.track_mut(id).unwrap();
    let lyric = track
        .insert_text_based_event(0, Kind::Lyric as u8, Charset::Unspecified, "さくら")
        .unwrap();
    let event = track.get(lyric).unwrap();
    // written in the default charset, without a marker
    assert_eq!(event.charset(), Some(Charset::Unspecified));
    assert_eq!(event.text_with(&config).as_deref(), Some("さくら"));
    assert_ne!(event.text().as_deref(), Some("さくら"));
}

#[test]
fn measures_follow_the_conductor() {
    let (mut sequence, conductor, _) = format_one();
    let track = sequence.track_mut(conductor).unwrap();
    track
        .insert_event(Event::new_time_signature(0, TimeSignature::new(3, 2, 24, 8)))
        .unwrap();
    let position = sequence.break_time(1440 * 2 + 480 + 1).unwrap();
    assert_eq!(position, MeasureBeatTick::new(2, 1, 1));
    assert_eq!(position.to_string(), "    2: 1:  1");
    assert_eq!(sequence.make_time("2:1:1".parse().unwrap()), Ok(1440 * 2 + 481));
}

#[test]
fn sequence_sets() {
    let mut set = SequenceSet::new();
    let (first, ..) = format_one();
    let a = set.push(first);
    let b = set.push(Sequence::default());
    assert_eq!(set.get(a).map(Sequence::num_tracks), Some(2));
    assert_eq!(set.prev(b), Some(a));
    set.get_mut(b).unwrap().add_track();
    let tracks: Vec<usize> = set.iter().map(|(_, sequence)| sequence.num_tracks()).collect();
    assert_eq!(tracks, [2, 1]);
}
