//! Editing stored events: time changes, pairing, deletion, cloning and field setters.

use crate::{
    error::{ArgumentError, DataError, DataResult},
    event::{
        Charset, Event, EventChain, KeySignature, MAX_TIME, SmpteOffset, TimeSignature, clip,
        clip_time,
    },
    track::{EventId, Track},
};

impl Track {
    /// Set the time of an event, re-linking it at its new position.
    ///
    /// The requested time is clipped to `[0, MAX_TIME]` before the delta is taken. Every
    /// member of a combined chain moves by that delta, each clipped on its own. Within the chain a note off never moves ahead of its note on,
    /// and an end-of-track marker in the way is pushed forward.
    ///
    /// A floating event only has its stored time changed.
    ///
    /// # Example
    /// ```rust
    /// # use mididata::prelude::*;
    /// let mut track = Track::new();
    /// let tempo = track.insert_event(Event::new_tempo(0, 500_000)).unwrap();
    /// let note = track.insert_event(Event::new_note(10, 0, 60, 100, 20)).unwrap();
    /// track.set_time(note, 100).unwrap();
    ///
    /// let off = track.next_combined(note).unwrap();
    /// assert_eq!(track.get(off).map(Event::time), Some(120));
    /// assert_eq!(track.first_event(), Some(tempo));
    /// ```
    pub fn set_time(&mut self, id: EventId, time: i64) -> DataResult<()> {
        self.check(id)?;
        let time = clip_time(time);
        let members = self.combined_members(id);
        if members.len() == 1 {
            return self.move_event(id, time);
        }
        let delta = time as i64 - self.event_of(id).time() as i64;
        // move the leading member first so the others never have to pass it
        let ordered: Vec<EventId> = if delta > 0 {
            members.into_iter().rev().collect()
        } else {
            members
        };
        for member in ordered {
            let time = clip_time(self.event_of(member).time() as i64 + delta);
            self.move_event(member, time)?;
        }
        Ok(())
    }

    /// Settle a single event at `time`
    fn move_event(&mut self, id: EventId, time: u32) -> DataResult<()> {
        let node = self.node(id);
        if !node.attached {
            self.node_mut(id).event.set_time_unchecked(time);
            return Ok(());
        }
        if self.is_end_of_track_tail(id) {
            let floor = node.prev.map_or(0, |prev| self.event_of(prev).time());
            self.node_mut(id).event.set_time_unchecked(time.max(floor));
            return Ok(());
        }
        let current = node.event.time();
        let is_off = node.event.is_note_off();
        let (prev_combined, next_combined) = (node.prev_combined, node.next_combined);

        if time >= current {
            let mut anchor = id;
            let mut cursor = node.next;
            while let Some(candidate) = cursor {
                if Some(candidate) == next_combined {
                    break;
                }
                if self.is_end_of_track_tail(candidate) {
                    self.raise_end_of_track(candidate, time);
                    break;
                }
                let event = self.event_of(candidate);
                let stop = if is_off {
                    event.time() > time || (event.time() == time && !event.is_note_off())
                } else {
                    event.time() > time
                };
                if stop {
                    break;
                }
                anchor = candidate;
                cursor = self.node(candidate).next;
            }
            if anchor == id {
                self.retime_in_place(id, time);
                return Ok(());
            }
            self.unlink(id);
            self.node_mut(id).event.set_time_unchecked(time);
            self.link_after(id, anchor)
        } else {
            let mut anchor = id;
            let mut cursor = node.prev;
            while let Some(candidate) = cursor {
                if Some(candidate) == prev_combined {
                    break;
                }
                let event = self.event_of(candidate);
                let stop = if is_off {
                    event.time() < time || (event.time() == time && !event.is_note_off())
                } else {
                    event.time() <= time
                };
                if stop {
                    break;
                }
                anchor = candidate;
                cursor = self.node(candidate).prev;
            }
            if anchor == id {
                self.retime_in_place(id, time);
                return Ok(());
            }
            self.unlink(id);
            self.node_mut(id).event.set_time_unchecked(time);
            self.link_before(id, anchor)
        }
    }

    /// Change the time without moving, clamped between the neighbours
    fn retime_in_place(&mut self, id: EventId, time: u32) {
        let node = self.node(id);
        let lower = node.prev.map_or(0, |prev| self.event_of(prev).time());
        let upper = node.next.map_or(MAX_TIME, |next| self.event_of(next).time());
        self.node_mut(id).event.set_time_unchecked(clip(lower, time, upper));
    }

    /// Ticks between the note on and note off of the note that `id` belongs to.
    ///
    /// `None` if `id` is not part of a note, or if the note off is earlier than the note on.
    pub fn duration(&self, id: EventId) -> Option<u32> {
        let (on, off) = self.note_pair(id)?;
        self.event_of(off).time().checked_sub(self.event_of(on).time())
    }

    /// Move the note off of a note to `duration` ticks after its note on.
    ///
    /// The note on never moves. Negative durations are treated as zero.
    ///
    /// # Errors
    /// [`ArgumentError::NotANote`] if `id` is not part of a note.
    pub fn set_duration(&mut self, id: EventId, duration: i64) -> DataResult<()> {
        self.check(id)?;
        let Some((on, off)) = self.note_pair(id) else {
            return Err(ArgumentError::NotANote.into());
        };
        let end = clip_time(self.event_of(on).time() as i64 + duration.max(0));
        self.move_event(off, end)
    }

    /// Pair an uncombined note on or note off with its counterpart.
    ///
    /// A note on takes the first later uncombined note off of the same key and channel;
    /// a note off takes the nearest earlier uncombined note on. Combined events and events
    /// without a counterpart are left as they are.
    pub fn combine(&mut self, id: EventId) -> DataResult<()> {
        self.check(id)?;
        if self.is_combined(id) {
            return Ok(());
        }
        let event = self.event_of(id);
        let (key, channel) = (event.key(), event.channel());
        let counterpart = |track: &Self, other: EventId, note_on: bool| {
            let event = track.event_of(other);
            let class = if note_on {
                event.is_note_on()
            } else {
                event.is_note_off()
            };
            class && !track.is_combined(other) && event.key() == key && event.channel() == channel
        };

        if event.is_note_on() {
            let mut cursor = self.node(id).next;
            while let Some(other) = cursor {
                if counterpart(self, other, false) {
                    self.link_combined(id, other);
                    break;
                }
                cursor = self.node(other).next;
            }
        } else if event.is_note_off() {
            let mut cursor = self.node(id).prev;
            while let Some(other) = cursor {
                if counterpart(self, other, true) {
                    self.link_combined(other, id);
                    break;
                }
                cursor = self.node(other).prev;
            }
        }
        Ok(())
    }

    /// Dissolve the combined chain of `id`, leaving every member in place
    pub fn chop(&mut self, id: EventId) -> DataResult<()> {
        self.check(id)?;
        for member in self.combined_members(id) {
            let node = self.node_mut(member);
            node.prev_combined = None;
            node.next_combined = None;
        }
        Ok(())
    }

    /// Unlink and drop one event, bridging its combined neighbours
    pub(super) fn remove_single(&mut self, id: EventId) -> Option<Event> {
        if !self.contains(id) {
            return None;
        }
        self.unlink(id);
        self.discard(id)
    }

    /// Delete exactly one event, returning it as a floating event.
    ///
    /// A combined neighbour stays in the track, paired with whatever remains of the chain.
    pub fn delete_single(&mut self, id: EventId) -> DataResult<Event> {
        self.remove_single(id).ok_or(DataError::unknown_event(id))
    }

    /// Delete an event with every member of its combined chain.
    ///
    /// The members are returned as a floating chain focused on `id`.
    pub fn delete(&mut self, id: EventId) -> DataResult<EventChain> {
        self.check(id)?;
        let members = self.combined_members(id);
        let focus = members.iter().position(|&member| member == id).unwrap_or(0);
        let events: Vec<Event> = members
            .into_iter()
            .filter_map(|member| self.remove_single(member))
            .collect();
        Ok(EventChain::from_members(events, focus))
    }

    /// Delete every event of the track
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.first = None;
        self.last = None;
        self.num_events = 0;
    }

    /// Clone the combined chain of `id` as a floating chain focused on the clone of `id`
    pub fn create_event_clone(&self, id: EventId) -> DataResult<EventChain> {
        self.check(id)?;
        let members = self.combined_members(id);
        let focus = members.iter().position(|&member| member == id).unwrap_or(0);
        let events = members
            .into_iter()
            .map(|member| self.event_of(member).clone())
            .collect();
        Ok(EventChain::from_members(events, focus))
    }

    /// A standalone copy of this track with fresh handles and fresh pairings.
    ///
    /// # Errors
    /// Propagates any insertion failure; the partial copy is dropped.
    pub fn create_clone(&self) -> DataResult<Track> {
        let mut clone = Track::with_config(self.config);
        for (id, _) in self.iter() {
            if self.node(id).prev_combined.is_none() {
                clone.insert_event(self.create_event_clone(id)?)?;
            }
        }
        Ok(clone)
    }

    /// Number the attached events in chronological order and refresh the event count.
    ///
    /// Returns the count. See [`Track::temp_index`].
    pub fn count_event(&mut self) -> usize {
        let mut index = 0;
        let mut cursor = self.first;
        while let Some(id) = cursor {
            let node = self.node_mut(id);
            node.temp_index = index;
            cursor = node.next;
            index += 1;
        }
        self.num_events = index;
        index
    }

    fn edit_event(
        &mut self,
        id: EventId,
        edit: impl FnOnce(&mut Event) -> DataResult<()>,
    ) -> DataResult<()> {
        self.check(id)?;
        edit(&mut self.node_mut(id).event)
    }

    /// Set the key of an event and of every member of its combined chain
    pub fn set_key(&mut self, id: EventId, key: i32) -> DataResult<()> {
        self.check(id)?;
        for member in self.combined_members(id) {
            self.node_mut(member).event.set_key(key)?;
        }
        Ok(())
    }

    /// Set the channel of an event and of every member of its combined chain.
    ///
    /// The same-kind links follow the new raw kind.
    pub fn set_channel(&mut self, id: EventId, channel: i32) -> DataResult<()> {
        self.check(id)?;
        for member in self.combined_members(id) {
            self.node_mut(member).event.set_channel(channel)?;
            self.relink_same_kind(member);
        }
        Ok(())
    }

    /// See [`Event::set_velocity`]
    pub fn set_velocity(&mut self, id: EventId, velocity: i32) -> DataResult<()> {
        self.edit_event(id, |event| event.set_velocity(velocity))
    }

    /// See [`Event::set_value`]
    pub fn set_value(&mut self, id: EventId, value: i32) -> DataResult<()> {
        self.edit_event(id, |event| event.set_value(value))
    }

    /// See [`Event::set_number`]
    pub fn set_number(&mut self, id: EventId, number: i32) -> DataResult<()> {
        self.edit_event(id, |event| event.set_number(number))
    }

    /// See [`Event::set_tempo`]
    pub fn set_tempo(&mut self, id: EventId, tempo: i64) -> DataResult<()> {
        self.edit_event(id, |event| event.set_tempo(tempo))
    }

    /// See [`Event::set_time_signature`]
    pub fn set_time_signature(&mut self, id: EventId, signature: TimeSignature) -> DataResult<()> {
        self.edit_event(id, |event| event.set_time_signature(signature))
    }

    /// See [`Event::set_key_signature`]
    pub fn set_key_signature(&mut self, id: EventId, signature: KeySignature) -> DataResult<()> {
        self.edit_event(id, |event| event.set_key_signature(signature))
    }

    /// See [`Event::set_smpte_offset`]
    pub fn set_smpte_offset(&mut self, id: EventId, offset: SmpteOffset) -> DataResult<()> {
        self.edit_event(id, |event| event.set_smpte_offset(offset))
    }

    /// Replace the text of a text-based event.
    ///
    /// The charset comes from a tag at the start of `text`, else the marker already in
    /// the payload, else the marker of the nearest earlier event of the same kind, else
    /// the track's default charset.
    pub fn set_text(&mut self, id: EventId, text: &str) -> DataResult<()> {
        self.check(id)?;
        let event = self.event_of(id);
        if !event.is_text_based() {
            return Err(ArgumentError::NotTextKind(event.kind_raw()).into());
        }
        let unmarked = Charset::detect_tag(text).0 == Charset::Unspecified
            && Charset::detect(event.payload()).0 == Charset::Unspecified;
        let inherited = self
            .node(id)
            .prev_same_kind
            .and_then(|prev| self.event_of(prev).charset())
            .filter(|&charset| charset != Charset::Unspecified);
        let config = self.config;
        let event = &mut self.node_mut(id).event;
        if let (true, Some(charset)) = (unmarked, inherited) {
            *event.payload_mut() = charset.marker().to_vec();
        }
        event.write_text(text, &config);
        Ok(())
    }

    /// See [`Event::set_charset_with`]; the track's config supplies the default charset
    pub fn set_charset(&mut self, id: EventId, charset: Charset) -> DataResult<()> {
        let config = self.config;
        self.edit_event(id, |event| event.set_charset_with(charset, &config))
    }
}

#[cfg(test)]
fn order(track: &Track) -> Vec<EventId> {
    track.iter().map(|(id, _)| id).collect()
}

#[test]
fn set_time_moves_forward_past_equal_times() {
    use pretty_assertions::assert_eq;
    let mut track = Track::new();
    let a = track.insert_event(Event::new_tempo(0, 1)).unwrap();
    let b = track.insert_event(Event::new_tempo(10, 1)).unwrap();
    let c = track.insert_event(Event::new_tempo(20, 1)).unwrap();
    track.set_time(a, 10).unwrap();
    assert_eq!(order(&track), [b, a, c]);

    track.set_time(a, 5).unwrap();
    // moving back: the first position whose predecessor is not later
    assert_eq!(order(&track), [a, b, c]);
    assert_eq!(track.get(a).map(Event::time), Some(5));
}

#[test]
fn set_time_pushes_the_end_of_track() {
    use pretty_assertions::assert_eq;
    let mut track = Track::new();
    let a = track.insert_event(Event::new_tempo(0, 1)).unwrap();
    let eot = track.insert_event(Event::new_end_of_track(100)).unwrap();
    track.set_time(a, 500).unwrap();
    assert_eq!(order(&track), [a, eot]);
    assert_eq!(track.get(eot).map(Event::time), Some(500));

    // the marker itself never moves ahead of the last event
    track.set_time(eot, 0).unwrap();
    assert_eq!(track.get(eot).map(Event::time), Some(500));
}

#[test]
fn note_moves_as_a_whole() {
    use pretty_assertions::assert_eq;
    let mut track = Track::new();
    let on = track.insert_event(Event::new_note(100, 0, 60, 100, 50)).unwrap();
    let off = track.next_combined(on).unwrap();
    track.set_time(off, 200).unwrap();
    assert_eq!(order(&track), [on, off]);
    assert_eq!(track.get(on).map(Event::time), Some(150));
    assert_eq!(track.get(off).map(Event::time), Some(200));
}

#[test]
fn note_off_tie_breaks() {
    use pretty_assertions::assert_eq;
    let mut track = Track::new();
    let cc = track.insert_event(Event::new_control_change(50, 0, 7, 1)).unwrap();
    let other_off = track.insert_event(Event::new_note_off(50, 0, 62, 0)).unwrap();
    // note offs go ahead of simultaneous events on insertion
    assert_eq!(order(&track), [other_off, cc]);
    let off = track.insert_event(Event::new_note_off(10, 0, 60, 0)).unwrap();

    // forward: after the simultaneous note off, before the controller
    track.set_time(off, 50).unwrap();
    assert_eq!(order(&track), [other_off, off, cc]);

    let later = track.insert_event(Event::new_tempo(60, 1)).unwrap();
    track.set_time(off, 70).unwrap();
    assert_eq!(order(&track), [other_off, cc, later, off]);
    // backward: stops behind a simultaneous event that is not a note off
    track.set_time(off, 50).unwrap();
    assert_eq!(order(&track), [other_off, cc, off, later]);
}

#[test]
fn duration_moves_only_the_note_off() {
    use pretty_assertions::assert_eq;
    let mut track = Track::new();
    let on = track.insert_event(Event::new_note(100, 0, 60, 100, 50)).unwrap();
    let off = track.next_combined(on).unwrap();
    track.set_duration(off, 400).unwrap();
    assert_eq!(track.get(on).map(Event::time), Some(100));
    assert_eq!(track.get(off).map(Event::time), Some(500));
    assert_eq!(track.duration(on), Some(400));

    let tempo = track.insert_event(Event::new_tempo(0, 1)).unwrap();
    assert_eq!(
        track.set_duration(tempo, 10),
        Err(ArgumentError::NotANote.into())
    );
}

#[test]
fn combine_and_chop() {
    use pretty_assertions::assert_eq;
    let mut track = Track::new();
    let on = track.insert_event(Event::new_note_on(0, 0, 60, 100)).unwrap();
    let wrong_key = track.insert_event(Event::new_note_off(5, 0, 61, 0)).unwrap();
    let off = track.insert_event(Event::new_note_off(10, 0, 60, 0)).unwrap();

    track.combine(on).unwrap();
    assert_eq!(track.next_combined(on), Some(off));
    assert!(!track.is_combined(wrong_key));
    track.combine(on).unwrap();
    assert_eq!(track.next_combined(on), Some(off));
    assert_eq!(track.prev_combined(off), Some(on));

    track.chop(on).unwrap();
    assert!(!track.is_combined(on) && !track.is_combined(off));
    track.chop(on).unwrap();

    // a note off finds its note on backwards
    track.combine(off).unwrap();
    assert!(track.is_note(on));
    assert_eq!(track.len(), 3);
}

#[test]
fn delete_counts() {
    use pretty_assertions::assert_eq;
    let mut track = Track::new();
    let a = track.insert_event(Event::new_control_change(0, 0, 7, 1)).unwrap();
    let b = track.insert_event(Event::new_control_change(5, 0, 7, 2)).unwrap();
    let c = track.insert_event(Event::new_control_change(9, 0, 7, 3)).unwrap();
    let note = track.insert_event(Event::new_note(0, 0, 60, 100, 10)).unwrap();
    assert_eq!(track.len(), 5);

    let removed = track.delete_single(b).unwrap();
    assert_eq!(removed.value(), Some(2));
    assert_eq!(track.len(), 4);
    assert_eq!(track.next_same_kind(a), Some(c));
    assert_eq!(track.prev_same_kind(c), Some(a));
    assert!(track.get(b).is_none());
    assert!(track.delete_single(b).is_err());

    let chain = track.delete(note).unwrap();
    assert_eq!(chain.len(), 2);
    assert_eq!(track.len(), 2);

    track.clear();
    assert!(track.is_empty());
    assert!(track.get(a).is_none());
}

#[test]
fn clone_is_independent() {
    use pretty_assertions::assert_eq;
    let mut track = Track::new();
    let on = track.insert_event(Event::new_note_on_note_off(0, 0, 60, 100, 64, 480)).unwrap();
    track.insert_event(Event::new_end_of_track(0)).unwrap();

    let mut clone = track.create_clone().unwrap();
    let originals: Vec<Event> = track.iter().map(|(_, event)| event.clone()).collect();
    let copies: Vec<Event> = clone.iter().map(|(_, event)| event.clone()).collect();
    assert_eq!(originals, copies);

    let clone_on = clone.first_event().unwrap();
    assert!(clone.is_note(clone_on));
    clone.set_key(clone_on, 72).unwrap();
    clone.set_time(clone_on, 100).unwrap();
    assert_eq!(track.get(on).and_then(Event::key), Some(60));
    assert_eq!(track.get(on).map(Event::time), Some(0));
    let clone_off = clone.next_combined(clone_on).unwrap();
    assert_eq!(clone.get(clone_off).and_then(Event::key), Some(72));
}

#[test]
fn channel_change_resettles_same_kind_links() {
    use pretty_assertions::assert_eq;
    let mut track = Track::new();
    let a = track.insert_event(Event::new_program_change(0, 0, 1)).unwrap();
    let b = track.insert_event(Event::new_program_change(10, 1, 1)).unwrap();
    let c = track.insert_event(Event::new_program_change(20, 0, 1)).unwrap();
    track.set_channel(b, 0).unwrap();
    assert_eq!(track.next_same_kind(a), Some(b));
    assert_eq!(track.next_same_kind(b), Some(c));
    assert_eq!(track.count_event(), 3);
    assert_eq!(track.temp_index(c), Some(2));
}
