use crate::event::{Event, clip_time};

#[doc = r#"
A floating combined chain: events that travel together as one logical entity.

Consecutive members are combined neighbours. Today the only chains built are a note on
followed by its note off; a single event is a chain of one.

The `focus` is the member that corresponds to the handle the chain was taken from,
so an insertion returns the handle of that member.

# Example
```rust
# use mididata::prelude::*;
let mut note = Event::new_note(0, 0, 60, 100, 120);
note.set_time(480);
assert_eq!(note.first().time(), 480);
assert_eq!(note.last().time(), 600);

let single = EventChain::from(Event::new_end_of_track(0));
assert_eq!(single.len(), 1);
```
"#]
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EventChain {
    members: Vec<Event>,
    focus: usize,
}

impl From<Event> for EventChain {
    fn from(event: Event) -> Self {
        Self {
            members: vec![event],
            focus: 0,
        }
    }
}

impl EventChain {
    /// `members` must not be empty
    pub(crate) fn from_members(members: Vec<Event>, focus: usize) -> Self {
        debug_assert!(!members.is_empty());
        let focus = focus.min(members.len().saturating_sub(1));
        Self { members, focus }
    }

    /// The members, first to last
    pub fn members(&self) -> &[Event] {
        &self.members
    }

    /// Iterate over the members, first to last
    pub fn iter(&self) -> core::slice::Iter<'_, Event> {
        self.members.iter()
    }

    /// The number of members, at least one
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Always false; present for symmetry with [`EventChain::len`]
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// The first member (the note on of a note)
    pub fn first(&self) -> &Event {
        &self.members[0]
    }

    /// The last member (the note off of a note)
    pub fn last(&self) -> &Event {
        &self.members[self.members.len() - 1]
    }

    /// Index of the focused member
    pub fn focus_index(&self) -> usize {
        self.focus
    }

    /// The focused member
    pub fn focus(&self) -> &Event {
        &self.members[self.focus]
    }

    /// Mutable access to the focused member.
    ///
    /// Use [`EventChain::set_time`] to move the chain as a whole.
    pub fn focus_mut(&mut self) -> &mut Event {
        &mut self.members[self.focus]
    }

    /// True if this chain is a note on followed by a note off of the same key and channel
    pub fn is_note(&self) -> bool {
        let [on, off] = self.members.as_slice() else {
            return false;
        };
        on.is_note_on()
            && off.is_note_off()
            && on.key() == off.key()
            && on.channel() == off.channel()
    }

    /// Ticks between the note on and note off of a note.
    ///
    /// `None` if the chain is not a note, or if its note off comes before its note on.
    pub fn duration(&self) -> Option<u32> {
        if !self.is_note() {
            return None;
        }
        self.last().time().checked_sub(self.first().time())
    }

    /// Move the note off to `duration` ticks after the note on.
    ///
    /// Negative durations are treated as zero. Does nothing if this chain is not a note.
    pub fn set_duration(&mut self, duration: i64) {
        if !self.is_note() {
            return;
        }
        let end = self.first().time() as i64 + duration.max(0);
        let last = self.members.len() - 1;
        self.members[last].set_time(end);
    }

    /// Set the time of the focused member and move every other member by the same delta.
    ///
    /// The requested time is clipped to `[0, MAX_TIME]` before the delta is taken, then
    /// each member is clipped on its own. [`Track::set_time`](crate::track::Track::set_time)
    /// follows the same rule.
    pub fn set_time(&mut self, time: i64) {
        let delta = clip_time(time) as i64 - self.focus().time() as i64;
        for member in &mut self.members {
            member.set_time(member.time() as i64 + delta);
        }
    }

    /// Split the chain into independent events
    pub fn chop(self) -> Vec<Event> {
        self.members
    }
}

impl IntoIterator for EventChain {
    type Item = Event;
    type IntoIter = std::vec::IntoIter<Event>;

    fn into_iter(self) -> Self::IntoIter {
        self.members.into_iter()
    }
}

impl<'a> IntoIterator for &'a EventChain {
    type Item = &'a Event;
    type IntoIter = core::slice::Iter<'a, Event>;

    fn into_iter(self) -> Self::IntoIter {
        self.members.iter()
    }
}

#[test]
fn set_time_moves_every_member() {
    use pretty_assertions::assert_eq;
    let mut note = Event::new_note_on_note_off(100, 0, 60, 100, 64, 480);
    note.set_time(-200);
    // the target clips at zero first, so the whole note moves back by 100
    assert_eq!(note.first().time(), 0);
    assert_eq!(note.last().time(), 480);
    assert_eq!(note.duration(), Some(480));

    note.set_time(1000);
    assert_eq!(note.first().time(), 1000);
    assert_eq!(note.last().time(), 1480);
}

#[test]
fn reversed_note_has_no_duration() {
    let mut note = Event::new_note(100, 0, 60, 100, 20);
    note.members[1].set_time(50);
    assert!(note.is_note());
    assert_eq!(note.duration(), None);
}

#[test]
fn duration_only_moves_the_note_off() {
    use pretty_assertions::assert_eq;
    let mut note = Event::new_note(10, 0, 60, 100, 20);
    note.set_duration(100);
    assert_eq!(note.first().time(), 10);
    assert_eq!(note.last().time(), 110);
    assert_eq!(note.duration(), Some(100));

    let mut single = EventChain::from(Event::new_tempo(0, 500_000));
    single.set_duration(5);
    assert_eq!(single.duration(), None);
}
