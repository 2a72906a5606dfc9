//! Insertion: placing floating events and notes into a track.

use crate::{
    error::{ArgumentError, DataError, DataResult, FormatError},
    event::{Charset, Event, EventChain, is_text_kind},
    track::{EventId, Track, TrackRole},
};

impl Track {
    /// Fails if the track's role forbids the event
    fn check_role(&self, event: &Event) -> DataResult<()> {
        match self.role {
            TrackRole::Conductor if event.is_channel_event() => {
                Err(FormatError::ChannelEventInConductor.into())
            }
            TrackRole::Performance if event.is_conductor_only() => {
                Err(FormatError::GlobalMetaOutsideConductor.into())
            }
            _ => Ok(()),
        }
    }

    /// A second end-of-track marker is folded into the existing one, which is pushed
    /// forward if the new marker is later. Returns the existing marker.
    fn fold_end_of_track(&mut self, event: &Event) -> Option<EventId> {
        if !event.is_end_of_track() {
            return None;
        }
        let eot = self.end_of_track()?;
        #[cfg(feature = "tracing")]
        tracing::warn!(
            time = event.time(),
            "track already ends with an end-of-track marker; folding the new marker into it"
        );
        self.raise_end_of_track(eot, event.time());
        Some(eot)
    }

    /// Store `event` and place it with `place`, dropping it again if placement fails
    fn insert_with(
        &mut self,
        event: Event,
        place: impl FnOnce(&mut Self, EventId) -> DataResult<()>,
    ) -> DataResult<EventId> {
        self.check_role(&event)?;
        if let Some(eot) = self.fold_end_of_track(&event) {
            return Ok(eot);
        }
        let id = self.alloc(event);
        match place(self, id) {
            Ok(()) => Ok(id),
            Err(err) => {
                self.discard(id);
                Err(err)
            }
        }
    }

    /// An end-of-track marker always goes to the tail, raised to the last event's time
    fn place_at_tail(&mut self, id: EventId) -> DataResult<()> {
        match self.last {
            Some(last) => self.link_after(id, last),
            None => {
                self.link_only(id);
                Ok(())
            }
        }
    }

    fn place_before(&mut self, id: EventId, target: Option<EventId>) -> DataResult<()> {
        if self.first.is_none() || self.event_of(id).is_end_of_track() {
            return self.place_at_tail(id);
        }
        match (target, self.end_of_track()) {
            (Some(target), _) => self.link_before(id, target),
            (None, Some(eot)) => {
                let time = self.event_of(id).time();
                self.raise_end_of_track(eot, time);
                self.link_before(id, eot)
            }
            (None, None) => match self.last {
                Some(last) => self.link_after(id, last),
                None => self.place_at_tail(id),
            },
        }
    }

    fn place_after(&mut self, id: EventId, target: Option<EventId>) -> DataResult<()> {
        let Some(first) = self.first else {
            return self.place_at_tail(id);
        };
        if self.event_of(id).is_end_of_track() {
            return self.place_at_tail(id);
        }
        let time = self.event_of(id).time();
        match target {
            Some(target) if self.is_end_of_track_tail(target) => {
                self.raise_end_of_track(target, time);
                self.link_before(id, target)
            }
            Some(target) => {
                if let Some(eot) = self.end_of_track() {
                    self.raise_end_of_track(eot, time);
                }
                self.link_after(id, target)
            }
            None => self.link_before(id, first),
        }
    }

    /// Insert a single event immediately before `target`, or at the end of the track when
    /// `target` is `None`.
    ///
    /// The time is corrected to fit between the new neighbours. Inserting at the end
    /// keeps an end-of-track marker last, pushing it forward as needed. A second
    /// end-of-track marker is not inserted: the existing one is returned instead.
    ///
    /// # Errors
    /// - [`FormatError`] if the track's role forbids the event
    /// - [`OwnershipError::UnknownEvent`](crate::error::OwnershipError::UnknownEvent) if
    ///   `target` is not attached to this track
    pub fn insert_single_event_before(
        &mut self,
        event: Event,
        target: Option<EventId>,
    ) -> DataResult<EventId> {
        if let Some(target) = target {
            self.check_attached(target)?;
        }
        self.insert_with(event, |track, id| track.place_before(id, target))
    }

    /// Insert a single event immediately after `target`, or at the start of the track when
    /// `target` is `None`.
    ///
    /// Inserting after the end-of-track marker inserts before it instead, pushing the
    /// marker forward to the event's time.
    ///
    /// # Errors
    /// See [`Track::insert_single_event_before`].
    pub fn insert_single_event_after(
        &mut self,
        event: Event,
        target: Option<EventId>,
    ) -> DataResult<EventId> {
        if let Some(target) = target {
            self.check_attached(target)?;
        }
        self.insert_with(event, |track, id| track.place_after(id, target))
    }

    /// Insert an event or a note immediately before `target`, or at the end when `target`
    /// is `None`.
    ///
    /// A note's note on is placed before `target`; its note off follows at its own time,
    /// ahead of simultaneous events. Returns the handle of the chain's focused member.
    ///
    /// # Errors
    /// - the errors of [`Track::insert_single_event_before`]
    /// - [`DataError::Unsupported`] for combined chains that are not notes
    pub fn insert_event_before(
        &mut self,
        event: impl Into<EventChain>,
        target: Option<EventId>,
    ) -> DataResult<EventId> {
        let chain = event.into();
        let target = match target {
            Some(target) => {
                self.check_attached(target)?;
                Some(if self.is_note(target) {
                    target
                } else {
                    self.first_combined_of(target)
                })
            }
            None => None,
        };
        self.insert_chain(
            chain,
            |track, on| track.insert_single_event_before(on, target),
            true,
        )
    }

    /// Insert an event or a note immediately after `target`, or at the start when `target`
    /// is `None`.
    ///
    /// A note's note off is placed after simultaneous note offs.
    ///
    /// # Errors
    /// See [`Track::insert_event_before`].
    pub fn insert_event_after(
        &mut self,
        event: impl Into<EventChain>,
        target: Option<EventId>,
    ) -> DataResult<EventId> {
        let chain = event.into();
        let target = match target {
            Some(target) => {
                self.check_attached(target)?;
                Some(if self.is_note(target) {
                    target
                } else {
                    self.last_combined_of(target)
                })
            }
            None => None,
        };
        self.insert_chain(
            chain,
            |track, on| track.insert_single_event_after(on, target),
            false,
        )
    }

    /// Insert a single event with `insert_first`, or a note's note on with `insert_first`
    /// followed by its note off
    fn insert_chain(
        &mut self,
        chain: EventChain,
        insert_first: impl FnOnce(&mut Self, Event) -> DataResult<EventId>,
        off_before_simultaneous: bool,
    ) -> DataResult<EventId> {
        if chain.len() == 1 {
            let mut members = chain.chop();
            return match members.pop() {
                Some(event) => insert_first(self, event),
                None => Err(DataError::Unsupported("inserting an empty chain")),
            };
        }
        if !chain.is_note() {
            return Err(DataError::Unsupported("inserting combined chains other than notes"));
        }
        let focus = chain.focus_index();
        let Ok([on, off]) = <[Event; 2]>::try_from(chain.chop()) else {
            return Err(DataError::Unsupported("inserting combined chains other than notes"));
        };

        let on = insert_first(self, on)?;
        let off_id = self.alloc(off);
        self.link_combined(on, off_id);
        if let Err(err) = self.place_note_off(off_id, off_before_simultaneous) {
            self.discard(off_id);
            self.remove_single(on);
            return Err(err);
        }
        Ok(if focus == 0 { on } else { off_id })
    }

    /// Place a note off after its already attached note on.
    ///
    /// With `before_simultaneous` the note off goes ahead of every event at its time,
    /// otherwise it goes after the note offs at its time. An end-of-track marker in the
    /// way is pushed forward.
    fn place_note_off(&mut self, off: EventId, before_simultaneous: bool) -> DataResult<()> {
        let Some(on) = self.node(off).prev_combined else {
            return Err(ArgumentError::NotANote.into());
        };
        let time = self.event_of(off).time();
        let mut anchor = on;
        let mut cursor = self.node(on).next;
        while let Some(candidate) = cursor {
            if self.is_end_of_track_tail(candidate) {
                self.raise_end_of_track(candidate, time);
                break;
            }
            let event = self.event_of(candidate);
            let stop = if before_simultaneous {
                event.time() >= time
            } else {
                event.time() > time || (event.time() == time && !event.is_note_off())
            };
            if stop {
                break;
            }
            anchor = candidate;
            cursor = self.node(candidate).next;
        }
        self.link_after(off, anchor)
    }

    /// Insert an event or a note at the position given by its time.
    ///
    /// The track is scanned from the end, so an event goes after the events at the same
    /// time. A note off goes after simultaneous note offs and never ahead of its note on.
    /// Each member of a chain is placed on its own. Returns the handle of the chain's
    /// focused member.
    ///
    /// # Errors
    /// [`FormatError`] if the track's role forbids any member.
    ///
    /// # Example
    /// ```rust
    /// # use mididata::prelude::*;
    /// let mut track = Track::new();
    /// let late = track.insert_event(Event::new_tempo(480, 400_000)).unwrap();
    /// let early = track.insert_event(Event::new_tempo(0, 500_000)).unwrap();
    /// assert_eq!(track.first_event(), Some(early));
    /// assert_eq!(track.next(early), Some(late));
    /// ```
    pub fn insert_event(&mut self, event: impl Into<EventChain>) -> DataResult<EventId> {
        let chain = event.into();
        for member in chain.iter() {
            self.check_role(member)?;
        }
        let focus = chain.focus_index();
        let mut inserted: Vec<EventId> = Vec::with_capacity(chain.len());
        for member in chain {
            if let Some(eot) = self.fold_end_of_track(&member) {
                inserted.push(eot);
                continue;
            }
            let id = self.alloc(member);
            if let Some(&prev) = inserted.last() {
                self.link_combined(prev, id);
            }
            if let Err(err) = self.place_by_time(id) {
                self.discard(id);
                for id in inserted {
                    self.remove_single(id);
                }
                return Err(err);
            }
            inserted.push(id);
        }
        inserted
            .get(focus)
            .copied()
            .ok_or(DataError::Unsupported("inserting an empty chain"))
    }

    fn place_by_time(&mut self, id: EventId) -> DataResult<()> {
        let (time, is_off, paired_on) = {
            let node = self.node(id);
            (node.event.time(), node.event.is_note_off(), node.prev_combined)
        };
        let mut cursor = self.last;
        while let Some(candidate) = cursor {
            let event = self.event_of(candidate);
            let fits = if is_off {
                Some(candidate) == paired_on
                    || (event.time() == time && event.is_note_off())
                    || event.time() < time
            } else {
                event.time() <= time
            };
            if fits {
                return self.place_after(id, Some(candidate));
            }
            cursor = self.node(candidate).prev;
        }
        self.place_after(id, None)
    }

    /// Create a sequence number event and insert it by time
    pub fn insert_sequence_number(&mut self, time: u32, number: i32) -> DataResult<EventId> {
        self.insert_event(Event::new_sequence_number(time, number))
    }

    /// Create a text-based event of `kind` (`0x01..=0x1E`) and insert it by time.
    ///
    /// The text is written once the event is in the track, so that with
    /// [`Charset::Unspecified`] it takes the charset of the nearest earlier event of the
    /// same kind (see [`Track::set_text`]).
    ///
    /// # Errors
    /// - [`ArgumentError::NotTextKind`] if `kind` does not carry text
    /// - the errors of [`Track::insert_event`]
    pub fn insert_text_based_event(
        &mut self,
        time: u32,
        kind: u8,
        charset: Charset,
        text: &str,
    ) -> DataResult<EventId> {
        if !is_text_kind(kind) {
            return Err(ArgumentError::NotTextKind(kind).into());
        }
        let id = self.insert_event(Event::new_text_based(time, kind, charset, "")?)?;
        if let Err(err) = self.set_text(id, text) {
            self.remove_single(id);
            return Err(err);
        }
        Ok(id)
    }

    /// Create a track name event and insert it.
    ///
    /// # Errors
    /// Always [`DataError::Unsupported`].
    pub fn insert_track_name(&mut self, _time: u32, _name: &str) -> DataResult<EventId> {
        Err(DataError::Unsupported("Track::insert_track_name"))
    }

    /// Take an event and its combined chain out of the track, keeping them alive.
    ///
    /// # Errors
    /// Always [`DataError::Unsupported`]; use [`Track::detach`] or [`Track::delete`].
    pub fn remove_event(&mut self, _id: EventId) -> DataResult<EventChain> {
        Err(DataError::Unsupported("Track::remove_event"))
    }

    /// Take a single event out of the track, keeping it alive.
    ///
    /// # Errors
    /// Always [`DataError::Unsupported`]; use [`Track::detach`] or [`Track::delete_single`].
    pub fn remove_single_event(&mut self, _id: EventId) -> DataResult<Event> {
        Err(DataError::Unsupported("Track::remove_single_event"))
    }
}

#[cfg(test)]
fn times(track: &Track) -> Vec<u32> {
    track.iter().map(|(_, event)| event.time()).collect()
}

#[test]
fn end_of_track_is_raised_to_the_last_event() {
    use pretty_assertions::assert_eq;
    let mut track = Track::new();
    track.insert_event(Event::new_tempo(960, 500_000)).unwrap();
    let eot = track.insert_event(Event::new_end_of_track(100)).unwrap();
    assert_eq!(track.last_event(), Some(eot));
    assert_eq!(times(&track), [960, 960]);
}

#[test]
fn second_end_of_track_is_folded() {
    use pretty_assertions::assert_eq;
    let mut track = Track::new();
    let eot = track.insert_event(Event::new_end_of_track(10)).unwrap();
    assert_eq!(track.insert_event(Event::new_end_of_track(5)).unwrap(), eot);
    assert_eq!(times(&track), [10]);
    assert_eq!(
        track.insert_single_event_after(Event::new_end_of_track(50), None).unwrap(),
        eot
    );
    assert_eq!(times(&track), [50]);
    assert_eq!(track.len(), 1);
}

#[test]
fn single_insert_targets() {
    use pretty_assertions::assert_eq;
    let mut track = Track::new();
    let eot = track.insert_event(Event::new_end_of_track(100)).unwrap();

    // appended before the end-of-track marker, which moves forward
    let a = track.insert_single_event_before(Event::new_tempo(200, 1), None).unwrap();
    assert_eq!(track.next(a), Some(eot));
    assert_eq!(times(&track), [200, 200]);

    // after the end-of-track really means before it
    let b = track.insert_single_event_after(Event::new_tempo(300, 1), Some(eot)).unwrap();
    assert_eq!(track.next(b), Some(eot));
    assert_eq!(times(&track), [200, 300, 300]);

    // at the start, time corrected down to the first event
    let c = track.insert_single_event_after(Event::new_tempo(250, 1), None).unwrap();
    assert_eq!(track.first_event(), Some(c));
    assert_eq!(times(&track), [200, 200, 300, 300]);

    // before a target, time corrected up to the predecessor
    let d = track.insert_single_event_before(Event::new_tempo(0, 1), Some(b)).unwrap();
    assert_eq!(track.prev(b), Some(d));
    assert_eq!(track.get(d).map(Event::time), Some(200));
}

#[test]
fn note_offs_group_after_simultaneous_note_offs() {
    use pretty_assertions::assert_eq;
    let mut track = Track::new();
    let first = track.insert_event(Event::new_note(0, 0, 60, 100, 10)).unwrap();
    let cc = track.insert_event(Event::new_control_change(10, 0, 7, 100)).unwrap();
    let second = track.insert_event(Event::new_note(0, 0, 64, 100, 10)).unwrap();

    let first_off = track.next_combined(first).unwrap();
    let second_off = track.next_combined(second).unwrap();
    let order: Vec<EventId> = track.iter().map(|(id, _)| id).collect();
    assert_eq!(order, [first, second, first_off, second_off, cc]);
}

#[test]
fn note_before_target_puts_note_off_ahead_of_simultaneous_events() {
    use pretty_assertions::assert_eq;
    let mut track = Track::new();
    let eot = track.insert_event(Event::new_end_of_track(0)).unwrap();
    let cc = track.insert_event(Event::new_control_change(20, 0, 7, 100)).unwrap();
    let on = track
        .insert_event_before(Event::new_note_on_note_off(20, 0, 60, 100, 0, 0), Some(cc))
        .unwrap();
    let off = track.next_combined(on).unwrap();
    let order: Vec<EventId> = track.iter().map(|(id, _)| id).collect();
    assert_eq!(order, [on, off, cc, eot]);
    assert!(track.is_note_on_note_off(on));

    let on2 = track
        .insert_event_after(Event::new_note(20, 0, 62, 100, 0), Some(cc))
        .unwrap();
    let off2 = track.next_combined(on2).unwrap();
    let order: Vec<EventId> = track.iter().map(|(id, _)| id).collect();
    assert_eq!(order, [on, off, cc, on2, off2, eot]);
    assert!(track.is_note_on_note_on0(off2));
}

#[test]
fn note_off_extends_end_of_track() {
    use pretty_assertions::assert_eq;
    let mut track = Track::new();
    let eot = track.insert_event(Event::new_end_of_track(0)).unwrap();
    track
        .insert_event_after(Event::new_note(0, 0, 60, 100, 960), None)
        .unwrap();
    assert_eq!(track.last_event(), Some(eot));
    assert_eq!(times(&track), [0, 960, 960]);
}

#[test]
fn conductor_role_is_enforced() {
    use crate::error::DataError;
    use pretty_assertions::assert_eq;
    let mut conductor = Track::new();
    conductor.set_role(TrackRole::Conductor);
    assert_eq!(
        conductor.insert_event(Event::new_note(0, 0, 60, 100, 10)),
        Err(DataError::Format(FormatError::ChannelEventInConductor))
    );
    assert!(conductor.is_empty());
    conductor.insert_event(Event::new_tempo(0, 500_000)).unwrap();

    let mut performance = Track::new();
    performance.set_role(TrackRole::Performance);
    assert_eq!(
        performance.insert_single_event_before(Event::new_tempo(0, 500_000), None),
        Err(DataError::Format(FormatError::GlobalMetaOutsideConductor))
    );
    performance.insert_event(Event::new_note(0, 0, 60, 100, 10)).unwrap();
}

#[test]
fn text_insert_inherits_charset() {
    use pretty_assertions::assert_eq;
    let mut track = Track::new();
    track
        .insert_text_based_event(0, 0x05, Charset::Jp, "\u{3042}")
        .unwrap();
    let second = track
        .insert_text_based_event(10, 0x05, Charset::Unspecified, "\u{3044}")
        .unwrap();
    let event = track.get(second).unwrap();
    assert_eq!(event.charset(), Some(Charset::Jp));
    assert_eq!(event.text().as_deref(), Some("\u{3044}"));

    assert!(track.insert_text_based_event(0, 0x51, Charset::Jp, "x").is_err());
}

#[test]
fn unimplemented_operations_report_unsupported() {
    let mut track = Track::new();
    let id = track.insert_sequence_number(0, 1).unwrap();
    assert!(track.insert_track_name(0, "x").unwrap_err().is_unsupported());
    assert!(track.remove_event(id).unwrap_err().is_unsupported());
    assert!(track.remove_single_event(id).unwrap_err().is_unsupported());
}
