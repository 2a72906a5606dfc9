use mididata::prelude::*;

fn times(track: &Track) -> Vec<u32> {
    track.iter().map(|(_, event)| event.time()).collect()
}

/// Times never decrease and the end-of-track marker, if any, is last
fn assert_ordered(track: &Track) {
    let times = times(track);
    assert!(times.windows(2).all(|pair| pair[0] <= pair[1]), "{times:?}");
    let markers: Vec<EventId> = track
        .iter()
        .filter(|(_, event)| event.is_end_of_track())
        .map(|(id, _)| id)
        .collect();
    assert!(markers.len() <= 1);
    if let Some(&marker) = markers.first() {
        assert_eq!(track.last_event(), Some(marker));
    }
    assert_eq!(track.iter().count(), track.len());
}

#[test]
fn inserts_and_deletes_keep_the_order() {
    let mut track = Track::new();
    track.insert_event(Event::new_end_of_track(0)).unwrap();
    let mut ids = Vec::new();
    for (i, time) in [480u32, 0, 960, 240, 240, 1200, 60].into_iter().enumerate() {
        let id = track
            .insert_event(Event::new_note(time, (i % 3) as i32, 60 + i as i32, 90, 120))
            .unwrap();
        ids.push(id);
        assert_ordered(&track);
    }
    track
        .insert_event(Event::new_control_change(300, 0, 64, 127))
        .unwrap();
    assert_ordered(&track);
    assert_eq!(track.end_time(), 1320);

    track.delete(ids[2]).unwrap();
    assert_ordered(&track);
    track.set_time(ids[0], 2000).unwrap();
    assert_ordered(&track);
    assert_eq!(track.end_time(), 2120);
    track.set_time(ids[0], 10).unwrap();
    assert_ordered(&track);
    // the end-of-track marker never moves back
    assert_eq!(track.end_time(), 2120);
}

#[test]
fn combine_twice_is_a_no_op() {
    let mut track = Track::new();
    let on = track.insert_event(Event::new_note_on(0, 3, 64, 80)).unwrap();
    let off = track.insert_event(Event::new_note_off(240, 3, 64, 0)).unwrap();
    track.combine(on).unwrap();
    let before = (track.next_combined(on), track.prev_combined(off));
    track.combine(on).unwrap();
    track.combine(off).unwrap();
    assert_eq!((track.next_combined(on), track.prev_combined(off)), before);
    assert_eq!(before, (Some(off), Some(on)));
}

#[test]
fn chop_without_a_chain_is_a_no_op() {
    let mut track = Track::new();
    let single = track.insert_event(Event::new_program_change(0, 0, 5)).unwrap();
    track.chop(single).unwrap();
    assert!(!track.is_combined(single));
    assert_eq!(track.len(), 1);
}

#[test]
fn note_on_note_off_factory() {
    let chain = Event::new_note_on_note_off(100, 0, 60, 100, 64, 480);
    assert_eq!(chain.first().time(), 100);
    assert_eq!(chain.last().time(), 580);
    assert!(chain.is_note());

    let mut track = Track::new();
    let on = track.insert_event(chain).unwrap();
    let off = track.next_combined(on).unwrap();
    assert!(track.is_note(on));
    assert!(track.is_note(off));
    assert!(track.is_note_on_note_off(off));
    assert_eq!(track.get(off).and_then(Event::velocity), Some(64));
}

#[test]
fn early_end_of_track_is_raised() {
    let mut track = Track::new();
    track.insert_event(Event::new_lyric(960, Charset::Unspecified, "la")).unwrap();
    let eot = track.insert_event(Event::new_end_of_track(10)).unwrap();
    assert_eq!(track.get(eot).map(Event::time), Some(960));
    assert_eq!(track.last_event(), Some(eot));
}

#[test]
fn clone_is_fresh_and_independent() {
    let mut track = Track::new();
    let on = track
        .insert_event(Event::new_note_on_note_off(0, 1, 50, 100, 0, 96))
        .unwrap();
    let mut clone = track.create_clone().unwrap();
    let clone_on = clone.first_event().unwrap();
    let clone_off = clone.next_combined(clone_on).unwrap();
    assert_eq!(clone.get(clone_on), track.get(on));
    assert_eq!(clone.prev_combined(clone_off), Some(clone_on));

    clone.set_velocity(clone_on, 20).unwrap();
    clone.delete(clone_off).unwrap();
    assert!(clone.is_empty());
    assert_eq!(track.len(), 2);
    assert_eq!(track.get(on).and_then(Event::velocity), Some(100));
}

#[test]
fn duration_moves_the_note_off_only() {
    let mut track = Track::new();
    let on = track.insert_event(Event::new_note(480, 0, 60, 100, 240)).unwrap();
    track.set_duration(on, 960).unwrap();
    let off = track.next_combined(on).unwrap();
    assert_eq!(track.get(on).map(Event::time), Some(480));
    assert_eq!(track.get(off).map(Event::time), Some(1440));

    track.set_duration(on, -5).unwrap();
    assert_eq!(track.duration(on), Some(0));
}

#[test]
fn delete_counts_one_or_two() {
    let mut track = Track::new();
    let a = track.insert_event(Event::new_pitch_bend(0, 0, 8192)).unwrap();
    let b = track.insert_event(Event::new_pitch_bend(10, 0, 0)).unwrap();
    let c = track.insert_event(Event::new_pitch_bend(20, 0, 16383)).unwrap();
    let note = track.insert_event(Event::new_note(5, 0, 60, 100, 10)).unwrap();
    assert_eq!(track.len(), 5);

    track.delete_single(b).unwrap();
    assert_eq!(track.len(), 4);
    assert_eq!(track.next_same_kind(a), Some(c));
    assert!(track.iter().all(|(id, _)| id != b));

    track.delete(note).unwrap();
    assert_eq!(track.len(), 2);
}

#[test]
fn delete_single_leaves_the_other_half() {
    let mut track = Track::new();
    let on = track.insert_event(Event::new_note(0, 0, 60, 100, 10)).unwrap();
    let off = track.next_combined(on).unwrap();
    let removed = track.delete_single(on).unwrap();
    assert!(removed.is_note_on());
    assert_eq!(track.len(), 1);
    assert!(!track.is_combined(off));
    assert!(!track.is_note(off));
}

#[test]
fn jp_text_round_trip() {
    let mut track = Track::new();
    let id = track
        .insert_text_based_event(0, Kind::Lyric as u8, Charset::Jp, "")
        .unwrap();
    track.set_text(id, "hello").unwrap();
    let event = track.get(id).unwrap();
    assert_eq!(event.text().as_deref(), Some("hello"));
    assert!(event.payload().starts_with(b"{@JP}"));
}

#[test]
fn stale_handles_are_rejected() {
    let mut track = Track::new();
    let id = track.insert_event(Event::new_tempo(0, 500_000)).unwrap();
    track.delete_single(id).unwrap();
    let err = DataError::Ownership(OwnershipError::UnknownEvent(id));
    assert_eq!(track.set_time(id, 10), Err(err.clone()));
    assert_eq!(track.combine(id), Err(err.clone()));
    assert_eq!(track.set_tempo(id, 1), Err(err));
    assert_eq!(track.next(id), None);
}
