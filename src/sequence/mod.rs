#![doc = r#"
Contains the [`Sequence`], a chain of [`Track`]s with its header.

# Example
```rust
# use mididata::prelude::*;
let mut sequence = Sequence::new(Format::Simultaneous, Timing::new_ticks_per_quarter_note(480));
let conductor = sequence.add_track();
let piano = sequence.add_track();

sequence
    .track_mut(conductor)
    .unwrap()
    .insert_event(Event::new_tempo(0, 600_000))
    .unwrap();
// channel events belong to the performance tracks of a format 1 sequence
assert!(sequence
    .track_mut(conductor)
    .unwrap()
    .insert_event(Event::new_note(0, 0, 60, 100, 480))
    .is_err());
sequence
    .track_mut(piano)
    .unwrap()
    .insert_event(Event::new_note(0, 0, 60, 100, 480))
    .unwrap();

assert_eq!(sequence.num_tracks(), 2);
assert_eq!(sequence.num_events(), 3);
assert_eq!(sequence.time_to_micros(480).us(), 600_000);
```
"#]

mod format;
pub use format::*;

mod measure;
pub use measure::*;

mod set;
pub use set::*;

mod tempo;
pub use tempo::DEFAULT_TEMPO;

mod timing;
pub use timing::*;

use crate::{
    arena::{Arena, Key},
    config::Config,
    error::{DataResult, OwnershipError},
    track::{Track, TrackRole},
};

/// A handle to a track owned by a [`Sequence`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TrackId(Key);

#[derive(Debug)]
struct TrackSlot {
    track: Track,
    prev: Option<TrackId>,
    next: Option<TrackId>,
}

#[doc = r#"
A sequence of tracks with its header: the [`Format`] and the [`Timing`].

Tracks are kept in a doubly linked chain. The sequence decides the [`TrackRole`] of
each of its tracks: under [`Format::Simultaneous`] the first track is the conductor
and every other track a performance track.
"#]
#[derive(Debug, Default)]
pub struct Sequence {
    tracks: Arena<TrackSlot>,
    first: Option<TrackId>,
    last: Option<TrackId>,
    format: Format,
    timing: Timing,
    config: Config,
}

impl Sequence {
    /// Create an empty sequence
    pub fn new(format: Format, timing: Timing) -> Self {
        Self::with_config(format, timing, Config::default())
    }

    /// Create an empty sequence whose tracks use `config`
    pub fn with_config(format: Format, timing: Timing, config: Config) -> Self {
        Self {
            tracks: Arena::default(),
            first: None,
            last: None,
            format,
            timing,
            config,
        }
    }

    /// The header format
    pub fn format(&self) -> Format {
        self.format
    }

    /// Change the header format, reassigning the track roles.
    ///
    /// Events already in the tracks are not checked against the new roles.
    pub fn set_format(&mut self, format: Format) {
        self.format = format;
        self.refresh_roles();
    }

    /// The time base
    pub fn timing(&self) -> Timing {
        self.timing
    }

    /// Change the time base. Event times are kept as they are.
    pub fn set_timing(&mut self, timing: Timing) {
        self.timing = timing;
    }

    /// The configuration shared by the tracks
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Replace the configuration of the sequence and of every track in it
    pub fn set_config(&mut self, config: Config) {
        self.config = config;
        let mut cursor = self.first;
        while let Some(id) = cursor {
            let slot = &mut self.tracks[id.0];
            slot.track.set_config(config);
            cursor = slot.next;
        }
    }

    /// Append a new empty track and return its handle
    pub fn add_track(&mut self) -> TrackId {
        self.push_track(Track::new())
    }

    /// Append an existing track, taking ownership of it.
    ///
    /// The track adopts the sequence's configuration and the role its position implies.
    /// Its events are not checked against that role.
    pub fn push_track(&mut self, mut track: Track) -> TrackId {
        track.set_config(self.config);
        let id = TrackId(self.tracks.insert(TrackSlot {
            track,
            prev: self.last,
            next: None,
        }));
        match self.last {
            Some(last) => self.tracks[last.0].next = Some(id),
            None => self.first = Some(id),
        }
        self.last = Some(id);
        self.refresh_roles();
        #[cfg(feature = "tracing")]
        tracing::trace!(?id, tracks = self.tracks.len(), "added track");
        id
    }

    /// Unlink a track from the chain and hand it back as a standalone track
    pub fn remove_track(&mut self, id: TrackId) -> DataResult<Track> {
        let Some(slot) = self.tracks.remove(id.0) else {
            return Err(OwnershipError::UnknownTrack(id).into());
        };
        match slot.prev {
            Some(prev) => self.tracks[prev.0].next = slot.next,
            None => self.first = slot.next,
        }
        match slot.next {
            Some(next) => self.tracks[next.0].prev = slot.prev,
            None => self.last = slot.prev,
        }
        let mut track = slot.track;
        track.set_role(TrackRole::Standalone);
        self.refresh_roles();
        Ok(track)
    }

    /// Delete every event of a track, then remove the track from the sequence
    pub fn delete_track(&mut self, id: TrackId) -> DataResult<()> {
        let mut track = self.remove_track(id)?;
        track.clear();
        #[cfg(feature = "tracing")]
        tracing::trace!(?id, "deleted track");
        Ok(())
    }

    /// Delete every track
    pub fn clear(&mut self) {
        self.tracks.clear();
        self.first = None;
        self.last = None;
    }

    /// The track behind a handle
    pub fn track(&self, id: TrackId) -> Option<&Track> {
        self.tracks.get(id.0).map(|slot| &slot.track)
    }

    /// The track behind a handle, mutably
    pub fn track_mut(&mut self, id: TrackId) -> Option<&mut Track> {
        self.tracks.get_mut(id.0).map(|slot| &mut slot.track)
    }

    /// The first track
    pub fn first_track(&self) -> Option<TrackId> {
        self.first
    }

    /// The last track
    pub fn last_track(&self) -> Option<TrackId> {
        self.last
    }

    /// The track after `id`
    pub fn next_track(&self, id: TrackId) -> Option<TrackId> {
        self.tracks.get(id.0)?.next
    }

    /// The track before `id`
    pub fn prev_track(&self, id: TrackId) -> Option<TrackId> {
        self.tracks.get(id.0)?.prev
    }

    /// The conductor track, if the format has one and a track exists
    pub fn conductor_track(&self) -> Option<TrackId> {
        self.first.filter(|_| self.format.has_conductor())
    }

    /// The track whose meta events drive the tempo map and the measures.
    ///
    /// This is the first track for every format.
    pub(crate) fn master_track(&self) -> Option<&Track> {
        self.first.and_then(|id| self.track(id))
    }

    /// Iterate over the tracks in chain order
    pub fn tracks(&self) -> Tracks<'_> {
        Tracks {
            sequence: self,
            cursor: self.first,
        }
    }

    /// The number of tracks
    pub fn num_tracks(&self) -> usize {
        self.tracks.len()
    }

    /// The number of events over all tracks
    pub fn num_events(&self) -> usize {
        self.tracks().map(|(_, track)| track.len()).sum()
    }

    /// The latest end time over all tracks
    pub fn end_time(&self) -> u32 {
        self.tracks()
            .map(|(_, track)| track.end_time())
            .max()
            .unwrap_or(0)
    }

    fn refresh_roles(&mut self) {
        let conductor = self.conductor_track();
        let has_conductor = self.format.has_conductor();
        let mut cursor = self.first;
        while let Some(id) = cursor {
            let role = match (has_conductor, Some(id) == conductor) {
                (false, _) => TrackRole::Standalone,
                (true, true) => TrackRole::Conductor,
                (true, false) => TrackRole::Performance,
            };
            let slot = &mut self.tracks[id.0];
            slot.track.set_role(role);
            cursor = slot.next;
        }
    }
}

/// Iterator over the tracks of a [`Sequence`], see [`Sequence::tracks`]
#[derive(Debug, Clone)]
pub struct Tracks<'a> {
    sequence: &'a Sequence,
    cursor: Option<TrackId>,
}

impl<'a> Iterator for Tracks<'a> {
    type Item = (TrackId, &'a Track);

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.cursor?;
        let slot = self.sequence.tracks.get(id.0)?;
        self.cursor = slot.next;
        Some((id, &slot.track))
    }
}

#[test]
fn roles_follow_the_chain() {
    use pretty_assertions::assert_eq;
    let mut sequence = Sequence::new(Format::Simultaneous, Timing::default());
    let a = sequence.add_track();
    let b = sequence.add_track();
    let c = sequence.add_track();
    assert_eq!(sequence.conductor_track(), Some(a));
    assert_eq!(sequence.track(b).map(Track::role), Some(TrackRole::Performance));

    sequence.delete_track(a).unwrap();
    assert_eq!(sequence.first_track(), Some(b));
    assert_eq!(sequence.prev_track(b), None);
    assert_eq!(sequence.track(b).map(Track::role), Some(TrackRole::Conductor));
    assert_eq!(sequence.next_track(b), Some(c));
    assert!(sequence.track(a).is_none());
    assert_eq!(
        sequence.delete_track(a),
        Err(OwnershipError::UnknownTrack(a).into())
    );

    sequence.set_format(Format::SingleMultiChannel);
    assert_eq!(sequence.conductor_track(), None);
    assert_eq!(sequence.track(b).map(Track::role), Some(TrackRole::Standalone));
}

#[test]
fn delete_track_drops_its_events() {
    use crate::event::Event;
    use pretty_assertions::assert_eq;
    let mut sequence = Sequence::new(Format::SingleMultiChannel, Timing::default());
    let only = sequence.add_track();
    let track = sequence.track_mut(only).unwrap();
    track.insert_event(Event::new_note(0, 0, 60, 100, 10)).unwrap();
    track.insert_event(Event::new_end_of_track(0)).unwrap();
    assert_eq!(sequence.num_events(), 3);
    assert_eq!(sequence.end_time(), 10);

    sequence.delete_track(only).unwrap();
    assert_eq!(sequence.num_tracks(), 0);
    assert_eq!(sequence.num_events(), 0);
    assert_eq!(sequence.first_track(), None);
    assert_eq!(sequence.last_track(), None);
}

#[test]
fn removed_tracks_become_standalone() {
    use crate::event::{Charset, Event};
    use pretty_assertions::assert_eq;
    let mut sequence = Sequence::with_config(
        Format::Simultaneous,
        Timing::default(),
        Config::new(Charset::Jp),
    );
    let conductor = sequence.add_track();
    let moved = sequence.remove_track(conductor).unwrap();
    assert_eq!(moved.role(), TrackRole::Standalone);
    assert_eq!(moved.config().default_charset(), Charset::Jp);

    let mut performance = Track::new();
    performance
        .insert_event(Event::new_program_change(0, 0, 1))
        .unwrap();
    let first = sequence.push_track(performance);
    assert_eq!(sequence.track(first).map(Track::role), Some(TrackRole::Conductor));

    sequence.set_config(Config::new(Charset::Latin));
    assert_eq!(
        sequence.track(first).map(|track| track.config().default_charset()),
        Some(Charset::Latin)
    );
}
