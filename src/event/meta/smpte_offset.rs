#![doc = r#"
SMPTE Offset - the SMPTE time at which a track is to start

The SMPTE Offset meta event (`FF 54 05 hr mn se fr ff`) lets a sequencer line up
a track with video or film. It carries:
- Frame rate (24, 25, 29.97 or 30 fps), packed with the hour
- Hours (0-23)
- Minutes (0-59)
- Seconds (0-59)
- Frames (0-23/24/29/29 depending on fps)
- Subframes (0-99, hundredths of a frame)
"#]

use crate::{event::clip, sequence::SmpteFps};

/// A track's starting position in SMPTE time code.
///
/// Values built through [`SmpteOffset::new`] are always in range; the frame
/// limit follows the frame rate (see [`SmpteFps::max_frame`]).
///
/// # Example
/// ```rust
/// # use mididata::prelude::*;
/// let offset = SmpteOffset::new(SmpteFps::TwentyFour, 30, 75, 10, 40, 120);
/// assert_eq!(offset.hour, 23);
/// assert_eq!(offset.minute, 59);
/// assert_eq!(offset.frame, 23);
/// assert_eq!(offset.subframe, 99);
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SmpteOffset {
    /// The frame rate, stored in bits 5-6 of the first payload byte.
    pub fps: SmpteFps,
    /// Hour component of the time code (0-23).
    pub hour: u8,
    /// Minute component of the time code (0-59).
    pub minute: u8,
    /// Second component of the time code (0-59).
    pub second: u8,
    /// Frame number within the current second.
    ///
    /// Valid range depends on the frame rate:
    /// - 24 fps: 0-23
    /// - 25 fps: 0-24
    /// - 29.97 fps: 0-29
    /// - 30 fps: 0-29
    pub frame: u8,
    /// Subframe component, in 1/100ths of a frame (0-99).
    pub subframe: u8,
}

impl Default for SmpteOffset {
    fn default() -> Self {
        Self {
            fps: SmpteFps::TwentyFour,
            hour: 0,
            minute: 0,
            second: 0,
            frame: 0,
            subframe: 0,
        }
    }
}

impl SmpteOffset {
    /// Create an offset, clipping every field into its range.
    pub fn new(fps: SmpteFps, hour: i32, minute: i32, second: i32, frame: i32, subframe: i32) -> Self {
        Self {
            fps,
            hour: clip(0, hour, 23) as u8,
            minute: clip(0, minute, 59) as u8,
            second: clip(0, second, 59) as u8,
            frame: clip(0, frame, fps.max_frame() as i32) as u8,
            subframe: clip(0, subframe, 99) as u8,
        }
    }

    /// Convert this SMPTE offset to microseconds, using its own frame rate.
    pub const fn as_micros(&self) -> f64 {
        ((((self.hour as u64 * 3600) + (self.minute as u64) * 60 + self.second as u64) * 1_000_000)
            as f64)
            + ((self.frame as u64) * 1_000_000) as f64 / self.fps.as_f64()
            + ((self.subframe as u32) * 10_000) as f64 / self.fps.as_f64()
    }

    /// The five payload bytes of an SMPTE offset event.
    ///
    /// - Byte 0: `0rrhhhhh` where `rr` is the frame rate, `hhhhh` the hour
    /// - Byte 1: minutes
    /// - Byte 2: seconds
    /// - Byte 3: frames
    /// - Byte 4: subframes
    pub const fn to_bytes(&self) -> [u8; 5] {
        [
            (self.fps.mode_bits() << 5) | (self.hour & 0b0001_1111),
            self.minute,
            self.second,
            self.frame,
            self.subframe,
        ]
    }

    /// Read an offset from a payload, clipping fields that are out of range.
    ///
    /// Returns `None` if fewer than five bytes are present.
    pub fn from_bytes(data: &[u8]) -> Option<Self> {
        let &[hr, mn, se, fr, ff, ..] = data else {
            return None;
        };
        let fps = SmpteFps::from_mode_bits(hr >> 5);
        Some(Self::new(
            fps,
            (hr & 0b0001_1111) as i32,
            mn as i32,
            se as i32,
            fr as i32,
            ff as i32,
        ))
    }
}

#[test]
fn read_smpte_offset() {
    use pretty_assertions::assert_eq;
    // the bytes after 00 FF 54 05
    let bytes = [0x41, 0x17, 0x2D, 0x0C, 0x22];
    let offset = SmpteOffset::from_bytes(&bytes).unwrap();

    assert_eq!(offset.fps, SmpteFps::TwentyNine);
    assert_eq!(offset.hour, 1);
    assert_eq!(offset.minute, 23);
    assert_eq!(offset.second, 45);
    assert_eq!(offset.frame, 12);
    assert_eq!(offset.subframe, 34);
    assert_eq!(offset.to_bytes(), bytes);
}

#[test]
fn read_out_of_range_smpte_offset() {
    use pretty_assertions::assert_eq;
    let bytes = [0x7F, 0x50, 0x2D, 0x1E, 0x22];
    let offset = SmpteOffset::from_bytes(&bytes).unwrap();
    assert_eq!(offset.fps, SmpteFps::Thirty);
    assert_eq!(offset.hour, 23);
    assert_eq!(offset.minute, 59);
    assert_eq!(offset.frame, 29);

    assert_eq!(SmpteOffset::from_bytes(&bytes[..4]), None);
}

#[test]
fn frame_limit_follows_fps() {
    use pretty_assertions::assert_eq;
    let frames = [
        SmpteFps::TwentyFour,
        SmpteFps::TwentyFive,
        SmpteFps::TwentyNine,
        SmpteFps::Thirty,
    ]
    .map(|fps| SmpteOffset::new(fps, 0, 0, 0, 99, 0).frame);
    assert_eq!(frames, [23, 24, 29, 29]);
}
