#![doc = r#"
Configuration shared by a [`Sequence`](crate::sequence::Sequence) and its tracks.

There is no process-wide state: a [`Config`] is owned by a sequence, copied into every
track it holds, and passed explicitly to the event-level text accessors.
"#]

use crate::event::Charset;

/// Settings that influence how payload bytes are interpreted.
///
/// # Example
/// ```rust
/// # use mididata::prelude::*;
/// let config = Config::default().with_default_charset(Charset::Jp);
/// assert_eq!(config.default_charset(), Charset::Jp);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Config {
    default_charset: Charset,
}

impl Config {
    /// Create a config with an explicit default charset
    pub const fn new(default_charset: Charset) -> Self {
        Self { default_charset }
    }

    /// Replace the default charset
    pub const fn with_default_charset(mut self, charset: Charset) -> Self {
        self.default_charset = charset;
        self
    }

    /// The charset used for text payloads that carry no tag or byte order mark.
    ///
    /// [`Charset::Unspecified`] means UTF-8.
    pub const fn default_charset(&self) -> Charset {
        self.default_charset
    }
}
