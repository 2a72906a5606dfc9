use core::{fmt, str::FromStr};

use crate::{
    error::{ArgumentError, DataError, DataResult},
    event::{Kind, MAX_TIME, TimeSignature},
    sequence::Sequence,
};

#[doc = r#"
A position written as measure, beat and tick.

Measures and beats count from zero. The text form pads each field to a fixed width,
`"    1: 2:120"`, and parsing accepts the fields with or without the padding.

# Example
```rust
# use mididata::prelude::*;
let position: MeasureBeatTick = "2:1:240".parse().unwrap();
assert_eq!(position, MeasureBeatTick::new(2, 1, 240));
assert_eq!(position.to_string(), "    2: 1:240");
```
"#]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MeasureBeatTick {
    /// Zero-based measure
    pub measure: u32,
    /// Zero-based beat within the measure
    pub beat: u32,
    /// Tick within the beat
    pub tick: u32,
}

impl MeasureBeatTick {
    /// Create a position
    pub const fn new(measure: u32, beat: u32, tick: u32) -> Self {
        Self {
            measure,
            beat,
            tick,
        }
    }
}

impl fmt::Display for MeasureBeatTick {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:>5}:{:>2}:{:>3}", self.measure, self.beat, self.tick)
    }
}

impl FromStr for MeasureBeatTick {
    type Err = DataError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || DataError::from(ArgumentError::MeasureBeatTick(s.to_string()));
        let mut fields = s.split(':').map(|field| field.trim().parse::<u32>());
        let (Some(Ok(measure)), Some(Ok(beat)), Some(Ok(tick)), None) =
            (fields.next(), fields.next(), fields.next(), fields.next())
        else {
            return Err(invalid());
        };
        Ok(Self::new(measure, beat, tick))
    }
}

/// A stretch of the timeline under one time signature
#[derive(Debug, Clone, Copy)]
struct Segment {
    start: u64,
    first_measure: u64,
    beat: u64,
    measure: u64,
}

impl Segment {
    fn new(start: u64, first_measure: u64, signature: TimeSignature, tpqn: u64) -> Self {
        let beat = (tpqn * 4 / u64::from(signature.denominator())).max(1);
        let measure = (beat * u64::from(signature.numerator)).max(1);
        Self {
            start,
            first_measure,
            beat,
            measure,
        }
    }

    /// Measures begun between the segment start and `time`.
    ///
    /// A signature change in the middle of a measure starts a new measure.
    fn measures_until(&self, time: u64) -> u64 {
        (time - self.start).div_ceil(self.measure)
    }
}

impl Sequence {
    /// The time signature segments of the first track, in order
    fn segments(&self, tpqn: u64) -> Vec<Segment> {
        let mut segments = vec![Segment::new(0, 0, TimeSignature::default(), tpqn)];
        let Some(track) = self.master_track() else {
            return segments;
        };
        let mut cursor = track.first_kind_event(Kind::TimeSignature);
        while let Some(id) = cursor {
            if let Some((time, signature)) = track
                .get(id)
                .and_then(|event| Some((u64::from(event.time()), event.time_signature()?)))
            {
                let current = segments[segments.len() - 1];
                let first_measure = current.first_measure + current.measures_until(time);
                let next = Segment::new(time, first_measure, signature, tpqn);
                if time == current.start {
                    let last = segments.len() - 1;
                    segments[last] = Segment {
                        first_measure: current.first_measure,
                        ..next
                    };
                } else {
                    segments.push(next);
                }
            }
            cursor = track.next_same_kind(id);
        }
        segments
    }

    fn ticks_per_quarter_note(&self) -> DataResult<u64> {
        self.timing
            .ticks_per_quarter_note()
            .map(u64::from)
            .ok_or(DataError::Unsupported("measure:beat:tick with SMPTE timing"))
    }

    /// Split a time into measure, beat and tick.
    ///
    /// Uses the time signatures of the first track, 4/4 until the first one.
    ///
    /// # Errors
    /// [`DataError::Unsupported`] for SMPTE timing.
    pub fn break_time(&self, time: u32) -> DataResult<MeasureBeatTick> {
        let tpqn = self.ticks_per_quarter_note()?;
        let time = u64::from(time);
        let segments = self.segments(tpqn);
        let segment = segments
            .iter()
            .rev()
            .find(|segment| segment.start <= time)
            .copied()
            .unwrap_or(segments[0]);
        let offset = time - segment.start;
        let measure = segment.first_measure + offset / segment.measure;
        let within = offset % segment.measure;
        Ok(MeasureBeatTick::new(
            measure as u32,
            (within / segment.beat) as u32,
            (within % segment.beat) as u32,
        ))
    }

    /// Join a measure, beat and tick into a time, clipped to the event time range.
    ///
    /// Beats and ticks past the end of their measure or beat carry over.
    ///
    /// # Errors
    /// [`DataError::Unsupported`] for SMPTE timing.
    pub fn make_time(&self, position: MeasureBeatTick) -> DataResult<u32> {
        let tpqn = self.ticks_per_quarter_note()?;
        let measure = u64::from(position.measure);
        let segments = self.segments(tpqn);
        let segment = segments
            .iter()
            .rev()
            .find(|segment| segment.first_measure <= measure)
            .copied()
            .unwrap_or(segments[0]);
        let time = segment.start
            + (measure - segment.first_measure) * segment.measure
            + u64::from(position.beat) * segment.beat
            + u64::from(position.tick);
        Ok(time.min(u64::from(MAX_TIME)) as u32)
    }
}

#[test]
fn parse_and_display() {
    use pretty_assertions::assert_eq;
    let position = MeasureBeatTick::new(12, 3, 5);
    assert_eq!(position.to_string(), "   12: 3:  5");
    assert_eq!(position.to_string().parse::<MeasureBeatTick>(), Ok(position));
    assert_eq!(
        "1:2".parse::<MeasureBeatTick>(),
        Err(ArgumentError::MeasureBeatTick("1:2".to_string()).into())
    );
    assert!("1:2:3:4".parse::<MeasureBeatTick>().is_err());
    assert!("a:2:3".parse::<MeasureBeatTick>().is_err());
}

#[test]
fn four_four_by_default() {
    use crate::sequence::{Format, Timing};
    use pretty_assertions::assert_eq;
    let sequence = Sequence::new(Format::Simultaneous, Timing::new_ticks_per_quarter_note(480));
    assert_eq!(sequence.break_time(0), Ok(MeasureBeatTick::new(0, 0, 0)));
    assert_eq!(sequence.break_time(1920 + 960 + 7), Ok(MeasureBeatTick::new(1, 2, 7)));
    assert_eq!(sequence.make_time(MeasureBeatTick::new(1, 2, 7)), Ok(2887));
}

#[test]
fn signature_changes() {
    use crate::event::Event;
    use crate::sequence::{Format, Timing};
    use pretty_assertions::assert_eq;
    let mut sequence = Sequence::new(Format::Simultaneous, Timing::new_ticks_per_quarter_note(480));
    let conductor = sequence.add_track();
    let track = sequence.track_mut(conductor).unwrap();
    // two bars of 4/4, then 6/8
    track
        .insert_event(Event::new_time_signature(3840, TimeSignature::new(6, 3, 24, 8)))
        .unwrap();

    assert_eq!(sequence.break_time(3839), Ok(MeasureBeatTick::new(1, 3, 479)));
    assert_eq!(sequence.break_time(3840), Ok(MeasureBeatTick::new(2, 0, 0)));
    // an eighth note is 240 ticks, a 6/8 measure 1440
    assert_eq!(sequence.break_time(3840 + 1440 + 250), Ok(MeasureBeatTick::new(3, 1, 10)));
    assert_eq!(sequence.make_time(MeasureBeatTick::new(3, 1, 10)), Ok(3840 + 1440 + 250));
    assert_eq!(sequence.make_time(MeasureBeatTick::new(1, 0, 0)), Ok(1920));
}

#[test]
fn smpte_has_no_measures() {
    use crate::sequence::{Format, SmpteFps, Timing};
    let sequence = Sequence::new(Format::SingleMultiChannel, Timing::new_smpte(SmpteFps::TwentyFive, 40));
    assert!(sequence.break_time(10).is_err_and(|err| err.is_unsupported()));
    assert!(sequence.make_time(MeasureBeatTick::default()).is_err_and(|err| err.is_unsupported()));
}
