use num_enum::{IntoPrimitive, TryFromPrimitive};

#[doc = r#"
The header format of a sequence.

In a [`Format::Simultaneous`] sequence the first track is the conductor track:
it holds the tempo, SMPTE offset, time signature and key signature events of the
whole sequence, and no channel events. Every other track is a performance track
and may not carry those global events.
"#]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, TryFromPrimitive, IntoPrimitive)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum Format {
    /// Format 0: a single multi-channel track
    SingleMultiChannel = 0,
    /// Format 1: simultaneous tracks led by a conductor track
    #[default]
    Simultaneous = 1,
    /// Format 2: sequentially independent single-track patterns
    SequentiallyIndependent = 2,
}

impl Format {
    /// Returns true if the first track is a conductor track
    pub const fn has_conductor(&self) -> bool {
        matches!(self, Self::Simultaneous)
    }
}

#[test]
fn format_numbers() {
    use pretty_assertions::assert_eq;
    assert_eq!(u8::from(Format::SequentiallyIndependent), 2);
    assert_eq!(Format::try_from(0u8), Ok(Format::SingleMultiChannel));
    assert!(Format::try_from(3u8).is_err());
    assert!(Format::Simultaneous.has_conductor());
    assert!(!Format::SingleMultiChannel.has_conductor());
}
