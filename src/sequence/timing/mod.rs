mod smpte;
pub use smpte::*;

use crate::event::clip;

/// The time base of a sequence.
///
/// This is either the number of ticks per quarter note or
/// the SMPTE format, in which ticks subdivide a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Timing {
    /// Event times count ticks of a quarter note
    TicksPerQuarterNote(TicksPerQuarterNote),

    /// Event times count ticks of an SMPTE frame
    Smpte(SmpteHeader),
}

impl Default for Timing {
    fn default() -> Self {
        Self::new_ticks_per_quarter_note(480)
    }
}

impl Timing {
    /// The tickrate per quarter note defines what a "quarter note" means.
    ///
    /// The value is clipped to 1-32767.
    pub fn new_ticks_per_quarter_note(tpqn: i32) -> Self {
        Self::TicksPerQuarterNote(TicksPerQuarterNote {
            inner: clip(1, tpqn, 0x7FFF) as u16,
        })
    }

    /// Define the timing in terms of fps and ticks per frame
    pub const fn new_smpte(fps: SmpteFps, ticks_per_frame: u8) -> Self {
        Self::Smpte(SmpteHeader {
            fps,
            ticks_per_frame,
        })
    }

    /// Read the two division bytes of a file header.
    ///
    /// Returns `None` for an SMPTE division with an unknown frame rate.
    pub fn from_division(bytes: [u8; 2]) -> Option<Self> {
        match bytes[0] >> 7 {
            0 => Some(Self::new_ticks_per_quarter_note(
                u16::from_be_bytes(bytes) as i32
            )),
            _ => {
                let fps = SmpteFps::from_division_byte(bytes[0] as i8)?;
                Some(Self::new_smpte(fps, bytes[1]))
            }
        }
    }

    /// The two division bytes of a file header
    pub const fn to_division(&self) -> [u8; 2] {
        match self {
            Self::TicksPerQuarterNote(t) => t.inner.to_be_bytes(),
            Self::Smpte(s) => [s.fps.division_byte() as u8, s.ticks_per_frame],
        }
    }

    /// Returns Some if the timing is defined
    /// as ticks per quarter note
    pub const fn ticks_per_quarter_note(&self) -> Option<u16> {
        match self {
            Self::TicksPerQuarterNote(t) => Some(t.ticks_per_quarter_note()),
            _ => None,
        }
    }

    /// Returns Some if the timing is SMPTE based
    pub const fn smpte(&self) -> Option<SmpteHeader> {
        match self {
            Self::Smpte(s) => Some(*s),
            _ => None,
        }
    }
}

/// A representation of the `tpqn` timing
#[derive(Debug, Clone, PartialEq, Eq, Hash, Copy)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TicksPerQuarterNote {
    inner: u16,
}

impl TicksPerQuarterNote {
    /// Returns the ticks per quarter note.
    pub const fn ticks_per_quarter_note(&self) -> u16 {
        self.inner
    }
}

/// A representation of the `smpte` timing
#[derive(Debug, Clone, PartialEq, Eq, Hash, Copy)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SmpteHeader {
    fps: SmpteFps,
    ticks_per_frame: u8,
}

impl SmpteHeader {
    /// Returns the frames per second
    pub const fn fps(&self) -> SmpteFps {
        self.fps
    }

    /// Returns the ticks per frame
    pub const fn ticks_per_frame(&self) -> u8 {
        self.ticks_per_frame
    }
}

#[test]
fn ticks_per_quarter_note_is_clipped() {
    use pretty_assertions::assert_eq;
    assert_eq!(Timing::new_ticks_per_quarter_note(0).ticks_per_quarter_note(), Some(1));
    assert_eq!(
        Timing::new_ticks_per_quarter_note(40_000).ticks_per_quarter_note(),
        Some(0x7FFF)
    );
    assert_eq!(Timing::new_smpte(SmpteFps::Thirty, 80).ticks_per_quarter_note(), None);
}

#[test]
fn division_bytes() {
    use pretty_assertions::assert_eq;
    let timing = Timing::from_division([0x01, 0xE0]).unwrap();
    assert_eq!(timing.ticks_per_quarter_note(), Some(480));
    assert_eq!(timing.to_division(), [0x01, 0xE0]);

    // -25 fps, 40 ticks per frame
    let smpte = Timing::from_division([0xE7, 0x28]).unwrap();
    let header = smpte.smpte().unwrap();
    assert_eq!(header.fps(), SmpteFps::TwentyFive);
    assert_eq!(header.ticks_per_frame(), 40);
    assert_eq!(smpte.to_division(), [0xE7, 0x28]);

    assert_eq!(Timing::from_division([0x80, 0x28]), None);
}
