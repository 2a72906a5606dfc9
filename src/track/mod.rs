#![doc = r#"
Tracks: ordered chains of events.

A [`Track`] owns its events. Each stored event is addressed by an [`EventId`] and
takes part in four link roles:

1. the chronological chain (`prev`/`next`), non-decreasing in time,
2. the same-kind chain, linking the nearest events with the same raw kind,
3. the combined chain, pairing a note on with its note off,
4. ownership: an event linked into the chronological chain is *attached*.

Every mutation goes through the track so the four roles stay consistent.
Events enter as floating values ([`Event`] or [`EventChain`]) and are placed by
time ([`Track::insert_event`]) or next to a target
([`Track::insert_event_before`], [`Track::insert_event_after`]).

# Example
```rust
# use mididata::prelude::*;
let mut track = Track::new();
track.insert_event(Event::new_end_of_track(0)).unwrap();
let note = track.insert_event(Event::new_note_on_note_off(100, 0, 60, 100, 64, 480)).unwrap();

let times: Vec<u32> = track.iter().map(|(_, event)| event.time()).collect();
// the end-of-track marker was pushed behind the note off
assert_eq!(times, [100, 580, 580]);
assert!(track.is_note(note));
```
"#]

mod edit;
mod insert;
mod link;

use crate::{
    arena::{Arena, Key},
    config::Config,
    error::{DataError, DataResult},
    event::{Event, Kind},
};

/// A handle to an event stored in a [`Track`].
///
/// Handles stay valid while the event lives, across time changes and re-linking.
/// A handle of a deleted event is rejected by every operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EventId(Key);

/// How the owning sequence constrains a track's content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TrackRole {
    /// Not constrained: a standalone track, or any track of a format 0 or 2 sequence
    #[default]
    Standalone,
    /// The first track of a format 1 sequence; refuses channel events
    Conductor,
    /// A later track of a format 1 sequence; refuses tempo, SMPTE offset and signatures
    Performance,
}

#[derive(Debug)]
struct Node {
    event: Event,
    prev: Option<EventId>,
    next: Option<EventId>,
    prev_same_kind: Option<EventId>,
    next_same_kind: Option<EventId>,
    prev_combined: Option<EventId>,
    next_combined: Option<EventId>,
    attached: bool,
    temp_index: usize,
}

impl Node {
    fn new(event: Event) -> Self {
        Self {
            event,
            prev: None,
            next: None,
            prev_same_kind: None,
            next_same_kind: None,
            prev_combined: None,
            next_combined: None,
            attached: false,
            temp_index: 0,
        }
    }
}

/// An ordered chain of events.
#[derive(Debug, Default)]
pub struct Track {
    nodes: Arena<Node>,
    first: Option<EventId>,
    last: Option<EventId>,
    num_events: usize,
    role: TrackRole,
    config: Config,
}

impl Track {
    /// An empty standalone track
    pub fn new() -> Self {
        Self::default()
    }

    /// An empty standalone track reading text with `config`
    pub fn with_config(config: Config) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    fn node(&self, id: EventId) -> &Node {
        &self.nodes[id.0]
    }

    fn node_mut(&mut self, id: EventId) -> &mut Node {
        &mut self.nodes[id.0]
    }

    fn event_of(&self, id: EventId) -> &Event {
        &self.node(id).event
    }

    /// Fails unless `id` names a stored event, attached or floating
    fn check(&self, id: EventId) -> DataResult<()> {
        if self.nodes.contains(id.0) {
            Ok(())
        } else {
            Err(DataError::unknown_event(id))
        }
    }

    /// Fails unless `id` names an event linked into the chronological chain
    fn check_attached(&self, id: EventId) -> DataResult<()> {
        match self.nodes.get(id.0) {
            Some(node) if node.attached => Ok(()),
            _ => Err(DataError::unknown_event(id)),
        }
    }

    /// The role assigned by the owning sequence
    pub const fn role(&self) -> TrackRole {
        self.role
    }

    pub(crate) fn set_role(&mut self, role: TrackRole) {
        self.role = role;
    }

    /// The configuration used to read and write text
    pub const fn config(&self) -> &Config {
        &self.config
    }

    pub(crate) fn set_config(&mut self, config: Config) {
        self.config = config;
    }

    /// The event behind a handle, attached or floating
    pub fn get(&self, id: EventId) -> Option<&Event> {
        self.nodes.get(id.0).map(|node| &node.event)
    }

    /// True if `id` names an event stored in this track
    pub fn contains(&self, id: EventId) -> bool {
        self.nodes.contains(id.0)
    }

    /// True if the event is stored in this track but not linked into the chronological chain.
    ///
    /// See [`Track::detach`].
    pub fn is_floating(&self, id: EventId) -> bool {
        self.nodes.get(id.0).is_some_and(|node| !node.attached)
    }

    /// Number of attached events
    #[inline]
    pub fn len(&self) -> usize {
        self.num_events
    }

    /// True if no event is attached
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.num_events == 0
    }

    /// The chronologically first event
    pub fn first_event(&self) -> Option<EventId> {
        self.first
    }

    /// The chronologically last event
    pub fn last_event(&self) -> Option<EventId> {
        self.last
    }

    /// Time of the first event, zero for an empty track
    pub fn begin_time(&self) -> u32 {
        self.first.map_or(0, |id| self.event_of(id).time())
    }

    /// Time of the last event, zero for an empty track
    pub fn end_time(&self) -> u32 {
        self.last.map_or(0, |id| self.event_of(id).time())
    }

    /// The chronological successor
    pub fn next(&self, id: EventId) -> Option<EventId> {
        self.nodes.get(id.0)?.next
    }

    /// The chronological predecessor
    pub fn prev(&self, id: EventId) -> Option<EventId> {
        self.nodes.get(id.0)?.prev
    }

    /// The nearest later event with the same raw kind
    pub fn next_same_kind(&self, id: EventId) -> Option<EventId> {
        self.nodes.get(id.0)?.next_same_kind
    }

    /// The nearest earlier event with the same raw kind
    pub fn prev_same_kind(&self, id: EventId) -> Option<EventId> {
        self.nodes.get(id.0)?.prev_same_kind
    }

    /// The next member of the combined chain
    pub fn next_combined(&self, id: EventId) -> Option<EventId> {
        self.nodes.get(id.0)?.next_combined
    }

    /// The previous member of the combined chain
    pub fn prev_combined(&self, id: EventId) -> Option<EventId> {
        self.nodes.get(id.0)?.prev_combined
    }

    /// The first member of the combined chain, `id` itself when not combined
    pub fn first_combined(&self, id: EventId) -> Option<EventId> {
        self.check(id).ok()?;
        Some(self.first_combined_of(id))
    }

    /// The last member of the combined chain, `id` itself when not combined
    pub fn last_combined(&self, id: EventId) -> Option<EventId> {
        self.check(id).ok()?;
        Some(self.last_combined_of(id))
    }

    fn first_combined_of(&self, mut id: EventId) -> EventId {
        while let Some(prev) = self.node(id).prev_combined {
            id = prev;
        }
        id
    }

    fn last_combined_of(&self, mut id: EventId) -> EventId {
        while let Some(next) = self.node(id).next_combined {
            id = next;
        }
        id
    }

    /// Every member of the combined chain of `id`, first to last
    fn combined_members(&self, id: EventId) -> Vec<EventId> {
        let mut members = Vec::with_capacity(2);
        let mut cursor = Some(self.first_combined_of(id));
        while let Some(member) = cursor {
            members.push(member);
            cursor = self.node(member).next_combined;
        }
        members
    }

    /// True if the event has a combined neighbour
    pub fn is_combined(&self, id: EventId) -> bool {
        self.nodes
            .get(id.0)
            .is_some_and(|node| node.prev_combined.is_some() || node.next_combined.is_some())
    }

    /// True if the event belongs to a note on / note off pairing of the same key and channel
    pub fn is_note(&self, id: EventId) -> bool {
        self.note_pair(id).is_some()
    }

    /// True if the event belongs to a note whose note off uses the `8n` status
    pub fn is_note_on_note_off(&self, id: EventId) -> bool {
        self.note_pair(id)
            .is_some_and(|(_, off)| self.event_of(off).is_note_off_status())
    }

    /// True if the event belongs to a note whose note off is a `9n` with velocity zero
    pub fn is_note_on_note_on0(&self, id: EventId) -> bool {
        self.note_pair(id)
            .is_some_and(|(_, off)| !self.event_of(off).is_note_off_status())
    }

    /// The (note on, note off) handles of the note that `id` belongs to
    fn note_pair(&self, id: EventId) -> Option<(EventId, EventId)> {
        self.check(id).ok()?;
        let members = self.combined_members(id);
        let &[on, off] = members.as_slice() else {
            return None;
        };
        let (on_event, off_event) = (self.event_of(on), self.event_of(off));
        let pairs = on_event.is_note_on()
            && off_event.is_note_off()
            && on_event.key() == off_event.key()
            && on_event.channel() == off_event.channel();
        pairs.then_some((on, off))
    }

    /// The index assigned by the last [`Track::count_event`]
    pub fn temp_index(&self, id: EventId) -> Option<usize> {
        self.nodes.get(id.0).map(|node| node.temp_index)
    }

    /// The first event of the given kind, channel ignored
    pub fn first_kind_event(&self, kind: Kind) -> Option<EventId> {
        self.iter()
            .find(|(_, event)| event.kind() == Some(kind))
            .map(|(id, _)| id)
    }

    /// The last event of the given kind, channel ignored
    pub fn last_kind_event(&self, kind: Kind) -> Option<EventId> {
        let mut cursor = self.last;
        while let Some(id) = cursor {
            if self.event_of(id).kind() == Some(kind) {
                return Some(id);
            }
            cursor = self.node(id).prev;
        }
        None
    }

    /// Iterate over the attached events in chronological order
    pub fn iter(&self) -> Iter<'_> {
        Iter {
            track: self,
            cursor: self.first,
        }
    }

    /// The text of the first track name event
    pub fn name(&self) -> Option<String> {
        let id = self.first_kind_event(Kind::TrackName)?;
        self.event_of(id).text_with(&self.config)
    }

    /// Rename the track.
    ///
    /// The first track name event is rewritten. A track without one falls through
    /// to [`Track::insert_track_name`].
    pub fn set_name(&mut self, name: &str) -> DataResult<()> {
        match self.first_kind_event(Kind::TrackName) {
            Some(id) => self.set_text(id, name),
            None => self.insert_track_name(0, name).map(|_| ()),
        }
    }
}

/// Chronological iterator over a [`Track`], see [`Track::iter`]
#[derive(Debug, Clone)]
pub struct Iter<'a> {
    track: &'a Track,
    cursor: Option<EventId>,
}

impl<'a> Iterator for Iter<'a> {
    type Item = (EventId, &'a Event);

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.cursor?;
        let node = self.track.node(id);
        self.cursor = node.next;
        Some((id, &node.event))
    }
}

impl<'a> IntoIterator for &'a Track {
    type Item = (EventId, &'a Event);
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[test]
fn empty_track() {
    use pretty_assertions::assert_eq;
    let track = Track::new();
    assert!(track.is_empty());
    assert_eq!(track.first_event(), None);
    assert_eq!(track.begin_time(), 0);
    assert_eq!(track.end_time(), 0);
    assert_eq!(track.name(), None);
    assert_eq!(track.role(), TrackRole::Standalone);
}

#[test]
fn kind_search_ignores_the_channel() {
    use pretty_assertions::assert_eq;
    let mut track = Track::new();
    let a = track.insert_event(Event::new_control_change(0, 1, 7, 100)).unwrap();
    track.insert_event(Event::new_tempo(10, 500_000)).unwrap();
    let b = track.insert_event(Event::new_control_change(20, 9, 7, 100)).unwrap();
    assert_eq!(track.first_kind_event(Kind::ControlChange), Some(a));
    assert_eq!(track.last_kind_event(Kind::ControlChange), Some(b));
    assert_eq!(track.first_kind_event(Kind::Lyric), None);
}

#[test]
fn name_reads_the_first_track_name() {
    use crate::event::Charset;
    use pretty_assertions::assert_eq;
    let mut track = Track::new();
    assert!(track.set_name("Lead").unwrap_err().is_unsupported());

    track
        .insert_event(Event::new_track_name(0, Charset::Unspecified, "Lead"))
        .unwrap();
    assert_eq!(track.name().as_deref(), Some("Lead"));
    track.set_name("Bass").unwrap();
    assert_eq!(track.name().as_deref(), Some("Bass"));
}
