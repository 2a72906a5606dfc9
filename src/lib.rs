#![warn(missing_docs)]
#![warn(clippy::all)]
#![doc = r#"
An editable, in-memory model of Standard MIDI File data.

A [`Sequence`](crate::sequence::Sequence) holds a chain of
[`Track`](crate::track::Track)s, and every track holds its events in
chronological order. Events are plain values until they are inserted; from then on
they are addressed by an [`EventId`](crate::track::EventId) and kept linked four ways:

- chronologically, with the end-of-track marker always last,
- to the nearest events of the same raw kind,
- to the other half of a note (a note on and its note off are *combined*),
- to the track that owns them.

Every edit (inserting, moving, deleting, pairing) keeps those links consistent.
Times that would break the order are corrected, not rejected.

# Example
```rust
use mididata::prelude::*;

let mut track = Track::new();
track.insert_event(Event::new_end_of_track(0)).unwrap();
let note = track
    .insert_event(Event::new_note_on_note_off(100, 0, 60, 100, 64, 480))
    .unwrap();

assert!(track.is_note(note));
assert_eq!(track.duration(note), Some(480));
// the end-of-track marker was pushed behind the note off
assert_eq!(track.end_time(), 580);
```

Reading and writing the binary file format is left to a codec built on the
`Event::new_*` factories and [`Track::iter`](crate::track::Track::iter).
"#]

mod arena;

pub mod config;

pub mod error;

pub mod event;

pub mod micros;

pub mod sequence;

pub mod track;

/// Commonly re-exported types
pub mod prelude {
    pub use crate::{config::*, error::*, event::*, micros::*, sequence::*};

    pub use crate::track::{EventId, Iter, Track, TrackRole};
}
