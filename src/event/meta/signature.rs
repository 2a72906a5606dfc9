use num_enum::{IntoPrimitive, TryFromPrimitive};

use crate::event::clip;

#[doc = r#"
The contents of a time signature meta event (`FF 58 04 nn dd cc bb`).

# Example
```rust
# use mididata::prelude::*;
let six_eight = TimeSignature::new(6, 3, 36, 8);
assert_eq!(six_eight.denominator(), 8);
assert_eq!(TimeSignature::default().to_bytes(), [4, 2, 24, 8]);
```
"#]
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TimeSignature {
    /// Numerator
    pub numerator: u8,
    /// Denominator as a power of two exponent (2 means a quarter note)
    pub denominator_exp: u8,
    /// MIDI clocks per metronome click
    pub clocks_per_click: u8,
    /// Notated 32nd notes per MIDI quarter note
    pub thirty_seconds_per_quarter: u8,
}

impl Default for TimeSignature {
    fn default() -> Self {
        Self {
            numerator: 4,
            denominator_exp: 2,
            clocks_per_click: 24,
            thirty_seconds_per_quarter: 8,
        }
    }
}

impl TimeSignature {
    /// Create a time signature, clipping every field to `0..=255`
    pub fn new(numerator: i32, denominator_exp: i32, clocks_per_click: i32, thirty_seconds: i32) -> Self {
        Self {
            numerator: clip(0, numerator, 255) as u8,
            denominator_exp: clip(0, denominator_exp, 255) as u8,
            clocks_per_click: clip(0, clocks_per_click, 255) as u8,
            thirty_seconds_per_quarter: clip(0, thirty_seconds, 255) as u8,
        }
    }

    /// The denominator, `2^denominator_exp`, saturating at `u32::MAX`
    pub const fn denominator(&self) -> u32 {
        if self.denominator_exp >= 32 {
            u32::MAX
        } else {
            1 << self.denominator_exp
        }
    }

    /// The four payload bytes
    pub const fn to_bytes(&self) -> [u8; 4] {
        [
            self.numerator,
            self.denominator_exp,
            self.clocks_per_click,
            self.thirty_seconds_per_quarter,
        ]
    }

    /// Read a time signature, `None` if fewer than four bytes are present
    pub fn from_bytes(data: &[u8]) -> Option<Self> {
        let &[nn, dd, cc, bb, ..] = data else {
            return None;
        };
        Some(Self {
            numerator: nn,
            denominator_exp: dd,
            clocks_per_click: cc,
            thirty_seconds_per_quarter: bb,
        })
    }
}

/// Major or minor
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default, IntoPrimitive, TryFromPrimitive)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum Mode {
    /// Major key
    #[default]
    Major = 0,
    /// Minor key
    Minor = 1,
}

#[doc = r#"
The contents of a key signature meta event (`FF 59 02 sf mi`).

`accidentals` counts sharps when positive and flats when negative.

# Example
```rust
# use mididata::prelude::*;
let key = KeySignature::new(-9, Mode::Minor);
assert_eq!(key.accidentals, -7);
assert_eq!(key.to_bytes(), [0xF9, 1]);
```
"#]
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct KeySignature {
    /// Sharps (positive) or flats (negative), `-7..=7`
    pub accidentals: i8,
    /// Major or minor
    pub mode: Mode,
}

impl KeySignature {
    /// Create a key signature, clipping the accidentals to `-7..=7`
    pub fn new(accidentals: i32, mode: Mode) -> Self {
        Self {
            accidentals: clip(-7, accidentals, 7) as i8,
            mode,
        }
    }

    /// The two payload bytes
    pub const fn to_bytes(&self) -> [u8; 2] {
        [self.accidentals as u8, self.mode as u8]
    }

    /// Read a key signature, `None` if fewer than two bytes are present.
    ///
    /// Any non-zero mode byte reads as minor.
    pub fn from_bytes(data: &[u8]) -> Option<Self> {
        let &[sf, mi, ..] = data else {
            return None;
        };
        let mode = if mi == 0 { Mode::Major } else { Mode::Minor };
        Some(Self::new(sf as i8 as i32, mode))
    }
}

#[test]
fn time_signature_clips_fields() {
    use pretty_assertions::assert_eq;
    let sig = TimeSignature::new(300, -1, 24, 8);
    assert_eq!(sig.to_bytes(), [255, 0, 24, 8]);
    assert_eq!(sig.denominator(), 1);
    assert_eq!(TimeSignature::from_bytes(&[3, 2, 24, 8]), Some(TimeSignature::new(3, 2, 24, 8)));
    assert_eq!(TimeSignature::from_bytes(&[3, 2]), None);
}

#[test]
fn key_signature_round_trips_flats() {
    use pretty_assertions::assert_eq;
    let key = KeySignature::from_bytes(&[0xFD, 0]).unwrap();
    assert_eq!(key.accidentals, -3);
    assert_eq!(key.mode, Mode::Major);
    assert_eq!(KeySignature::new(12, Mode::Major).accidentals, 7);
}
