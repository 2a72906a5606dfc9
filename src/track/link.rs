//! Linking primitives: splicing events in and out of the chronological and same-kind chains.

use crate::{
    error::{DataResult, OwnershipError},
    event::{Event, MAX_TIME, clip},
    track::{EventId, Node, Track},
};

impl Track {
    /// Store an event without linking it
    pub(super) fn alloc(&mut self, event: Event) -> EventId {
        EventId(self.nodes.insert(Node::new(event)))
    }

    /// Drop a floating event from storage, bridging its combined neighbours
    pub(super) fn discard(&mut self, id: EventId) -> Option<Event> {
        let node = self.nodes.get(id.0)?;
        let (prev, next) = (node.prev_combined, node.next_combined);
        if let Some(prev) = prev {
            self.node_mut(prev).next_combined = next;
        }
        if let Some(next) = next {
            self.node_mut(next).prev_combined = prev;
        }
        self.nodes.remove(id.0).map(|node| node.event)
    }

    pub(super) fn link_combined(&mut self, first: EventId, second: EventId) {
        self.node_mut(first).next_combined = Some(second);
        self.node_mut(second).prev_combined = Some(first);
    }

    pub(super) fn is_end_of_track_tail(&self, id: EventId) -> bool {
        let node = self.node(id);
        node.event.is_end_of_track() && node.next.is_none()
    }

    /// The end-of-track marker at the tail, if any
    pub(super) fn end_of_track(&self) -> Option<EventId> {
        self.last.filter(|&id| self.event_of(id).is_end_of_track())
    }

    /// Push an end-of-track marker forward to `time`; never moves it back
    pub(super) fn raise_end_of_track(&mut self, eot: EventId, time: u32) {
        let event = &mut self.node_mut(eot).event;
        if event.time() < time {
            #[cfg(feature = "tracing")]
            tracing::debug!(from = event.time(), to = time, "extending end of track");
            event.set_time_unchecked(time);
        }
    }

    fn check_link(&self, id: EventId, target: EventId) -> DataResult<()> {
        self.check(id)?;
        if self.node(id).attached {
            return Err(OwnershipError::NotFloating.into());
        }
        if id == target {
            return Err(OwnershipError::SameEvent.into());
        }
        self.check_attached(target)
    }

    /// True if `a` comes strictly before `b` in the chronological chain
    fn precedes(&self, a: EventId, b: EventId) -> bool {
        let mut cursor = self.node(a).next;
        while let Some(id) = cursor {
            if id == b {
                return true;
            }
            cursor = self.node(id).next;
        }
        false
    }

    /// Fails if linking `id` between `prev` and `next` would reorder its combined chain.
    ///
    /// Only combined neighbours that are attached are checked.
    fn check_combined_order(
        &self,
        id: EventId,
        prev: Option<EventId>,
        next: Option<EventId>,
    ) -> DataResult<()> {
        let node = self.node(id);
        let attached = |other: &EventId| self.node(*other).attached;
        let earlier_fits = node.prev_combined.filter(attached).is_none_or(|earlier| {
            prev.is_some_and(|prev| prev == earlier || self.precedes(earlier, prev))
        });
        let later_fits = node.next_combined.filter(attached).is_none_or(|later| {
            next.is_some_and(|next| next == later || self.precedes(next, later))
        });
        if earlier_fits && later_fits {
            Ok(())
        } else {
            Err(OwnershipError::CombinedOrder.into())
        }
    }

    /// Clamp the floating event's time into `[lower, upper]`
    fn clamp_time(&mut self, id: EventId, lower: u32, upper: u32) {
        let event = &mut self.node_mut(id).event;
        let time = clip(lower, event.time(), upper);
        if time != event.time() {
            #[cfg(feature = "tracing")]
            tracing::debug!(from = event.time(), to = time, "clamping inserted event time");
            event.set_time_unchecked(time);
        }
    }

    /// Link the floating event `id` as the only event of an empty track
    pub(super) fn link_only(&mut self, id: EventId) {
        debug_assert!(self.first.is_none());
        let node = self.node_mut(id);
        node.prev = None;
        node.next = None;
        node.prev_same_kind = None;
        node.next_same_kind = None;
        node.attached = true;
        self.first = Some(id);
        self.last = Some(id);
        self.num_events += 1;
        #[cfg(feature = "tracing")]
        tracing::trace!(?id, "linked into empty track");
    }

    /// Link the floating event `id` immediately before `target`.
    ///
    /// The event's time is clamped between the times of its new neighbours. When
    /// `target` is the end-of-track marker, the marker is first pushed forward to the
    /// event's time.
    ///
    /// # Errors
    /// - [`OwnershipError::NotFloating`] if `id` is already linked
    /// - [`OwnershipError::SameEvent`] if `id == target`
    /// - [`OwnershipError::UnknownEvent`] if either handle is not stored here, or `target` is floating
    /// - [`OwnershipError::CombinedOrder`] if the position is ahead of an attached combined
    ///   predecessor (a note off before its note on) or behind an attached combined successor
    pub fn link_before(&mut self, id: EventId, target: EventId) -> DataResult<()> {
        self.check_link(id, target)?;
        let prev = self.node(target).prev;
        self.check_combined_order(id, prev, Some(target))?;
        if self.is_end_of_track_tail(target) {
            let time = self.event_of(id).time();
            self.raise_end_of_track(target, time);
        }
        let lower = prev.map_or(0, |prev| self.event_of(prev).time());
        let upper = self.event_of(target).time();
        self.clamp_time(id, lower, upper);

        let node = self.node_mut(id);
        node.prev = prev;
        node.next = Some(target);
        node.attached = true;
        match prev {
            Some(prev) => self.node_mut(prev).next = Some(id),
            None => self.first = Some(id),
        }
        self.node_mut(target).prev = Some(id);
        self.link_same_kind(id);
        self.num_events += 1;
        #[cfg(feature = "tracing")]
        tracing::trace!(?id, ?target, "linked before");
        Ok(())
    }

    /// Link the floating event `id` immediately after `target`.
    ///
    /// The event's time is clamped between the times of its new neighbours.
    ///
    /// # Errors
    /// - [`OwnershipError::AfterEndOfTrack`] if `target` is the end-of-track marker at the tail
    /// - the errors of [`Track::link_before`]
    pub fn link_after(&mut self, id: EventId, target: EventId) -> DataResult<()> {
        self.check_link(id, target)?;
        if self.is_end_of_track_tail(target) {
            return Err(OwnershipError::AfterEndOfTrack.into());
        }
        let next = self.node(target).next;
        self.check_combined_order(id, Some(target), next)?;
        let lower = self.event_of(target).time();
        let upper = next.map_or(MAX_TIME, |next| self.event_of(next).time());
        self.clamp_time(id, lower, upper);

        let node = self.node_mut(id);
        node.prev = Some(target);
        node.next = next;
        node.attached = true;
        match next {
            Some(next) => self.node_mut(next).prev = Some(id),
            None => self.last = Some(id),
        }
        self.node_mut(target).next = Some(id);
        self.link_same_kind(id);
        self.num_events += 1;
        #[cfg(feature = "tracing")]
        tracing::trace!(?id, ?target, "linked after");
        Ok(())
    }

    /// Take an event out of the chronological and same-kind chains, keeping it stored.
    ///
    /// The event becomes floating: it keeps its handle and its combined links and can be
    /// linked again with [`Track::link_before`] or [`Track::link_after`]. Detaching a
    /// floating event does nothing.
    pub fn detach(&mut self, id: EventId) -> DataResult<()> {
        self.check(id)?;
        self.unlink(id);
        Ok(())
    }

    pub(super) fn unlink(&mut self, id: EventId) {
        if !self.node(id).attached {
            return;
        }
        self.unlink_same_kind(id);
        let node = self.node_mut(id);
        let (prev, next) = (node.prev.take(), node.next.take());
        node.attached = false;
        match prev {
            Some(prev) => self.node_mut(prev).next = next,
            None => self.first = next,
        }
        match next {
            Some(next) => self.node_mut(next).prev = prev,
            None => self.last = prev,
        }
        self.num_events -= 1;
        #[cfg(feature = "tracing")]
        tracing::trace!(?id, "unlinked");
    }

    /// Find the nearest same-kind neighbours of an attached event and link both ways
    fn link_same_kind(&mut self, id: EventId) {
        let kind = self.event_of(id).kind_raw();
        let same_kind = |track: &Self, mut cursor: Option<EventId>, forward: bool| {
            while let Some(other) = cursor {
                let node = track.node(other);
                if node.event.kind_raw() == kind {
                    return Some(other);
                }
                cursor = if forward { node.next } else { node.prev };
            }
            None
        };
        let prev = same_kind(self, self.node(id).prev, false);
        let next = same_kind(self, self.node(id).next, true);

        let node = self.node_mut(id);
        node.prev_same_kind = prev;
        node.next_same_kind = next;
        if let Some(prev) = prev {
            self.node_mut(prev).next_same_kind = Some(id);
        }
        if let Some(next) = next {
            self.node_mut(next).prev_same_kind = Some(id);
        }
    }

    fn unlink_same_kind(&mut self, id: EventId) {
        let node = self.node_mut(id);
        let (prev, next) = (node.prev_same_kind.take(), node.next_same_kind.take());
        if let Some(prev) = prev {
            self.node_mut(prev).next_same_kind = next;
        }
        if let Some(next) = next {
            self.node_mut(next).prev_same_kind = prev;
        }
    }

    /// Re-settle the same-kind links of an attached event after its raw kind changed
    pub(super) fn relink_same_kind(&mut self, id: EventId) {
        if self.node(id).attached {
            self.unlink_same_kind(id);
            self.link_same_kind(id);
        }
    }
}

#[test]
fn link_rejects_bad_operands() {
    use crate::error::DataError;
    use pretty_assertions::assert_eq;

    let mut track = Track::new();
    let a = track.insert_event(Event::new_tempo(0, 500_000)).unwrap();
    let b = track.insert_event(Event::new_end_of_track(10)).unwrap();

    assert_eq!(
        track.link_before(a, b),
        Err(DataError::Ownership(OwnershipError::NotFloating))
    );
    track.detach(a).unwrap();
    assert!(track.is_floating(a));
    assert_eq!(track.len(), 1);
    assert_eq!(
        track.link_before(a, a),
        Err(DataError::Ownership(OwnershipError::SameEvent))
    );
    assert_eq!(
        track.link_after(a, b),
        Err(DataError::Ownership(OwnershipError::AfterEndOfTrack))
    );
    track.link_before(a, b).unwrap();
    assert_eq!(track.first_event(), Some(a));
    assert_eq!(track.len(), 2);
}

#[test]
fn link_clamps_time_and_extends_end_of_track() {
    use pretty_assertions::assert_eq;

    let mut track = Track::new();
    let first = track.insert_event(Event::new_tempo(100, 500_000)).unwrap();
    let eot = track.insert_event(Event::new_end_of_track(200)).unwrap();

    // clamped up to the predecessor's time
    let early = track.insert_event(Event::new_marker(0, Default::default(), "m")).unwrap();
    track.detach(early).unwrap();
    track.link_after(early, first).unwrap();
    assert_eq!(track.get(early).map(Event::time), Some(100));

    // linking a late event before the end-of-track pushes the marker forward
    let late = track.insert_event(Event::new_lyric(150, Default::default(), "la")).unwrap();
    track.detach(late).unwrap();
    track.set_time(late, 400).unwrap();
    assert_eq!(track.get(late).map(Event::time), Some(400));
    track.link_before(late, eot).unwrap();
    assert_eq!(track.get(eot).map(Event::time), Some(400));
    assert_eq!(track.get(late).map(Event::time), Some(400));
    assert_eq!(track.last_event(), Some(eot));
}

#[test]
fn same_kind_links_follow_the_channel() {
    use pretty_assertions::assert_eq;

    let mut track = Track::new();
    let a = track.insert_event(Event::new_control_change(0, 0, 7, 1)).unwrap();
    let b = track.insert_event(Event::new_control_change(10, 1, 7, 1)).unwrap();
    let c = track.insert_event(Event::new_control_change(20, 0, 7, 1)).unwrap();

    assert_eq!(track.next_same_kind(a), Some(c));
    assert_eq!(track.prev_same_kind(c), Some(a));
    assert_eq!(track.next_same_kind(b), None);

    track.detach(c).unwrap();
    assert_eq!(track.next_same_kind(a), None);
    assert_eq!(track.prev_same_kind(c), None);
}

#[test]
fn note_members_relink_only_in_order() {
    use crate::error::DataError;
    use pretty_assertions::assert_eq;

    let mut track = Track::new();
    let on = track.insert_event(Event::new_note(0, 0, 60, 100, 10)).unwrap();
    let off = track.next_combined(on).unwrap();
    let cc = track.insert_event(Event::new_control_change(20, 0, 7, 1)).unwrap();

    // the note on cannot follow its own note off
    track.detach(on).unwrap();
    assert_eq!(
        track.link_after(on, cc),
        Err(DataError::Ownership(OwnershipError::CombinedOrder))
    );
    assert_eq!(
        track.link_before(on, cc),
        Err(DataError::Ownership(OwnershipError::CombinedOrder))
    );
    assert!(track.is_floating(on));
    track.link_before(on, off).unwrap();
    assert_eq!(track.first_event(), Some(on));
    assert_eq!(track.duration(on), Some(10));

    // the note off stops at its note on going backward
    track.detach(off).unwrap();
    let early = track.insert_event(Event::new_control_change(0, 0, 1, 1)).unwrap();
    assert_eq!(track.first_event(), Some(on));
    assert_eq!(track.next(on), Some(early));
    assert_eq!(
        track.link_before(off, on),
        Err(DataError::Ownership(OwnershipError::CombinedOrder))
    );
    track.link_after(off, early).unwrap();
    let order: Vec<EventId> = track.iter().map(|(id, _)| id).collect();
    assert_eq!(order, [on, early, off, cc]);
    assert_eq!(track.get(off).map(Event::time), Some(10));
    assert_eq!(track.duration(off), Some(10));
}
