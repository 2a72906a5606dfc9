use thiserror::Error;

use crate::{sequence::SequenceId, sequence::TrackId, track::EventId};

#[doc = r#"
A set of errors that can occur while building or editing a MIDI data graph.

Every variant is a violation of a caller contract. Time clamping, end-of-track
extension and numeric clipping are normalisations and never produce an error.
"#]
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DataError {
    /// An argument was out of its domain
    #[error("Invalid argument: {0}")]
    InvalidArgument(#[from] ArgumentError),
    /// An event or track was used in a position its ownership forbids
    #[error("Ownership violation: {0}")]
    Ownership(#[from] OwnershipError),
    /// The sequence format forbids this event in this track
    #[error("Format violation: {0}")]
    Format(#[from] FormatError),
    /// The operation exists but has no implementation
    #[error("{0} is not supported")]
    Unsupported(&'static str),
}

/// Argument validation errors
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ArgumentError {
    /// Times must be zero or positive
    #[error("Time must be zero or positive, found {0}")]
    NegativeTime(i64),
    /// Kinds are a single byte
    #[error("Kind must be in 0..=255, found {0}")]
    KindOutOfRange(i32),
    /// Channel and system exclusive events need at least one data byte
    #[error("Kind {0:#04X} requires a payload")]
    MissingPayload(u8),
    /// Channel events carry at most three bytes, including the status byte
    #[error("Channel events carry at most 3 bytes, found {0}")]
    ChannelPayloadTooLong(usize),
    /// Text accessors only apply to kinds 0x01..=0x1E
    #[error("Kind {0:#04X} does not carry text")]
    NotTextKind(u8),
    /// The field does not exist for this kind of event
    #[error("Kind {0:#04X} has no such field")]
    FieldNotApplicable(u8),
    /// The event is not a member of a note pairing
    #[error("Event is not a note")]
    NotANote,
    /// A measure/beat/tick string could not be parsed
    #[error("Could not parse \"{0}\" as measure:beat:tick")]
    MeasureBeatTick(String),
}

/// Errors concerning which track or chain owns an event
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum OwnershipError {
    /// The event is already linked into a track
    #[error("Event is already owned by a track")]
    NotFloating,
    /// Inserting an event relative to itself
    #[error("Cannot link an event to itself")]
    SameEvent,
    /// Nothing may follow the end-of-track marker
    #[error("Cannot link an event after the end-of-track marker")]
    AfterEndOfTrack,
    /// Linking there would put a combined event ahead of its predecessor in the chain,
    /// such as a note off ahead of its note on
    #[error("Cannot link a combined event out of order with its chain")]
    CombinedOrder,
    /// The handle does not name a live event of this track
    #[error("{0:?} does not belong to this track")]
    UnknownEvent(EventId),
    /// The handle does not name a live track of this sequence
    #[error("{0:?} does not belong to this sequence")]
    UnknownTrack(TrackId),
    /// The handle does not name a live sequence of this set
    #[error("{0:?} does not belong to this set")]
    UnknownSequence(SequenceId),
}

/// Format-1 track content restrictions
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum FormatError {
    /// Channel events are not allowed in the conductor track
    #[error("Channel events cannot be inserted into the conductor track")]
    ChannelEventInConductor,
    /// Tempo, SMPTE offset, time and key signatures belong to the conductor track
    #[error("Tempo, SMPTE offset and signature events belong to the conductor track")]
    GlobalMetaOutsideConductor,
}

impl DataError {
    /// True if the error reports an unimplemented operation
    pub const fn is_unsupported(&self) -> bool {
        matches!(self, Self::Unsupported(_))
    }

    pub(crate) const fn unknown_event(id: EventId) -> Self {
        Self::Ownership(OwnershipError::UnknownEvent(id))
    }
}

/// The result type of fallible operations (see [`DataError`])
pub type DataResult<T> = Result<T, DataError>;

#[test]
fn error_messages_name_the_category() {
    use pretty_assertions::assert_eq;

    let err: DataError = ArgumentError::NegativeTime(-4).into();
    assert_eq!(
        err.to_string(),
        "Invalid argument: Time must be zero or positive, found -4"
    );

    let err: DataError = FormatError::ChannelEventInConductor.into();
    assert!(err.to_string().starts_with("Format violation"));

    let err = DataError::Unsupported("RemoveEvent");
    assert!(err.is_unsupported());
    assert_eq!(err.to_string(), "RemoveEvent is not supported");
}
