#![doc = r#"
Text payloads and their character sets.

Text-based meta events (kinds `0x01..=0x1E`) mark their encoding in the first payload bytes:

| Charset               | Marker             |
|-----------------------|--------------------|
| [`Charset::Latin`]    | `{@LATIN}` (ASCII) |
| [`Charset::Jp`]       | `{@JP}` (ASCII)    |
| [`Charset::Utf16Le`]  | `FF FE`            |
| [`Charset::Utf16Be`]  | `FE FF`            |

A payload without a marker is [`Charset::Unspecified`] and is read with the
[`Config`]'s default charset, or as UTF-8 when that is unspecified too.
"#]

use encoding_rs::{Encoding, SHIFT_JIS, UTF_16BE, UTF_16LE, WINDOWS_1252};
use num_enum::{IntoPrimitive, TryFromPrimitive};

use crate::{
    config::Config,
    error::{ArgumentError, DataResult},
    event::Event,
};

const LATIN_TAG: &str = "{@LATIN}";
const JP_TAG: &str = "{@JP}";
const UTF16LE_BOM: [u8; 2] = [0xFF, 0xFE];
const UTF16BE_BOM: [u8; 2] = [0xFE, 0xFF];

/// The character set of a text payload, numbered by its code page.
///
/// # Example
/// ```rust
/// # use mididata::prelude::*;
/// assert_eq!(u16::from(Charset::Jp), 932);
/// assert_eq!(Charset::try_from(1252), Ok(Charset::Latin));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, IntoPrimitive, TryFromPrimitive)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u16)]
pub enum Charset {
    /// No marker: the configured default, else UTF-8
    #[default]
    Unspecified = 0,
    /// `{@LATIN}`, Windows code page 1252
    Latin = 1252,
    /// `{@JP}`, Shift-JIS (code page 932)
    Jp = 932,
    /// UTF-16 little endian, `FF FE`
    Utf16Le = 1200,
    /// UTF-16 big endian, `FE FF`
    Utf16Be = 1201,
}

impl Charset {
    /// Detect the marker at the start of a payload.
    ///
    /// Returns the charset and the number of marker bytes.
    pub fn detect(payload: &[u8]) -> (Self, usize) {
        if payload.starts_with(&UTF16LE_BOM) {
            (Self::Utf16Le, 2)
        } else if payload.starts_with(&UTF16BE_BOM) {
            (Self::Utf16Be, 2)
        } else if payload.starts_with(LATIN_TAG.as_bytes()) {
            (Self::Latin, LATIN_TAG.len())
        } else if payload.starts_with(JP_TAG.as_bytes()) {
            (Self::Jp, JP_TAG.len())
        } else {
            (Self::Unspecified, 0)
        }
    }

    /// Detect a tag at the start of a string.
    ///
    /// `{@LATIN}` and `{@JP}` select their charsets; a leading U+FEFF selects UTF-16 LE.
    /// Returns the charset and the text following the tag.
    pub fn detect_tag(text: &str) -> (Self, &str) {
        if let Some(rest) = text.strip_prefix(LATIN_TAG) {
            (Self::Latin, rest)
        } else if let Some(rest) = text.strip_prefix(JP_TAG) {
            (Self::Jp, rest)
        } else if let Some(rest) = text.strip_prefix('\u{FEFF}') {
            (Self::Utf16Le, rest)
        } else {
            (Self::Unspecified, text)
        }
    }

    /// The marker bytes written in front of text in this charset
    pub const fn marker(&self) -> &'static [u8] {
        match self {
            Self::Unspecified => &[],
            Self::Latin => LATIN_TAG.as_bytes(),
            Self::Jp => JP_TAG.as_bytes(),
            Self::Utf16Le => &UTF16LE_BOM,
            Self::Utf16Be => &UTF16BE_BOM,
        }
    }

    fn encoding(&self) -> Option<&'static Encoding> {
        match self {
            Self::Unspecified => None,
            Self::Latin => Some(WINDOWS_1252),
            Self::Jp => Some(SHIFT_JIS),
            Self::Utf16Le => Some(UTF_16LE),
            Self::Utf16Be => Some(UTF_16BE),
        }
    }

    /// Decode unmarked bytes in this charset
    pub fn decode(&self, bytes: &[u8]) -> String {
        match self.encoding() {
            Some(encoding) => encoding
                .decode_without_bom_handling(bytes)
                .0
                .into_owned(),
            None => String::from_utf8_lossy(bytes).into_owned(),
        }
    }

    /// Encode text in this charset, without a marker.
    ///
    /// Characters that Latin or Shift-JIS cannot represent become numeric character references.
    pub fn encode(&self, text: &str) -> Vec<u8> {
        match self {
            Self::Utf16Le => text.encode_utf16().flat_map(u16::to_le_bytes).collect(),
            Self::Utf16Be => text.encode_utf16().flat_map(u16::to_be_bytes).collect(),
            Self::Latin | Self::Jp => match self.encoding() {
                Some(encoding) => encoding.encode(text).0.into_owned(),
                None => text.as_bytes().to_vec(),
            },
            Self::Unspecified => text.as_bytes().to_vec(),
        }
    }
}

/// Write `text` in `charset`, marking it unless it falls back to the default
fn encode_payload(charset: Charset, text: &str, config: &Config) -> Vec<u8> {
    match charset {
        Charset::Unspecified => config.default_charset().encode(text),
        charset => {
            let mut bytes = charset.marker().to_vec();
            bytes.extend(charset.encode(text));
            bytes
        }
    }
}

impl Event {
    /// The charset marked in this event's payload.
    ///
    /// Returns `None` for events that do not carry text.
    pub fn charset(&self) -> Option<Charset> {
        self.is_text_based()
            .then(|| Charset::detect(self.payload()).0)
    }

    /// The text of this event, decoding unmarked payloads as UTF-8.
    ///
    /// Returns `None` for events that do not carry text.
    pub fn text(&self) -> Option<String> {
        self.text_with(&Config::default())
    }

    /// The text of this event, decoding unmarked payloads with the config's default charset.
    pub fn text_with(&self, config: &Config) -> Option<String> {
        if !self.is_text_based() {
            return None;
        }
        let (charset, marker_len) = Charset::detect(self.payload());
        let body = &self.payload()[marker_len..];
        let text = match charset {
            Charset::Unspecified => config.default_charset().decode(body),
            charset => charset.decode(body),
        };
        Some(text)
    }

    /// Replace the text of this event (see [`Event::set_text_with`]).
    pub fn set_text(&mut self, text: &str) -> DataResult<()> {
        self.set_text_with(text, &Config::default())
    }

    /// Replace the text of this event.
    ///
    /// The charset is taken from a tag at the start of `text`, else from the marker
    /// already in the payload, else the config's default. Text in the default charset
    /// is written without a marker.
    ///
    /// # Errors
    /// [`ArgumentError::NotTextKind`] if this event does not carry text.
    ///
    /// # Example
    /// ```rust
    /// # use mididata::prelude::*;
    /// let mut event = Event::new_lyric(0, Charset::Unspecified, "");
    /// event.set_text("{@JP}hello").unwrap();
    /// assert!(event.payload().starts_with(b"{@JP}"));
    /// assert_eq!(event.text().unwrap(), "hello");
    /// ```
    pub fn set_text_with(&mut self, text: &str, config: &Config) -> DataResult<()> {
        if !self.is_text_based() {
            return Err(ArgumentError::NotTextKind(self.kind_raw()).into());
        }
        self.write_text(text, config);
        Ok(())
    }

    pub(crate) fn write_text(&mut self, text: &str, config: &Config) {
        let (tagged, body) = Charset::detect_tag(text);
        let charset = match tagged {
            Charset::Unspecified => Charset::detect(self.payload()).0,
            tagged => tagged,
        };
        *self.payload_mut() = encode_payload(charset, body, config);
    }

    /// Change the charset of this event, keeping its text (see [`Event::set_charset_with`]).
    pub fn set_charset(&mut self, charset: Charset) -> DataResult<()> {
        self.set_charset_with(charset, &Config::default())
    }

    /// Change the charset of this event.
    ///
    /// The current text is decoded with the old charset and re-encoded with the new one.
    ///
    /// # Errors
    /// [`ArgumentError::NotTextKind`] if this event does not carry text.
    pub fn set_charset_with(&mut self, charset: Charset, config: &Config) -> DataResult<()> {
        let Some(text) = self.text_with(config) else {
            return Err(ArgumentError::NotTextKind(self.kind_raw()).into());
        };
        *self.payload_mut() = encode_payload(charset, &text, config);
        Ok(())
    }
}

#[test]
fn detects_every_marker() {
    use pretty_assertions::assert_eq;
    assert_eq!(Charset::detect(b"{@LATIN}abc"), (Charset::Latin, 8));
    assert_eq!(Charset::detect(b"{@JP}abc"), (Charset::Jp, 5));
    assert_eq!(Charset::detect(&[0xFF, 0xFE, b'a', 0]), (Charset::Utf16Le, 2));
    assert_eq!(Charset::detect(&[0xFE, 0xFF, 0, b'a']), (Charset::Utf16Be, 2));
    assert_eq!(Charset::detect(b"abc"), (Charset::Unspecified, 0));
}

#[test]
fn jp_text_round_trips() {
    use pretty_assertions::assert_eq;
    let mut event = Event::new_text_event(0, Charset::Jp, "");
    event.set_text("hello").unwrap();
    assert!(event.payload().starts_with(b"{@JP}"));
    assert_eq!(event.text().unwrap(), "hello");

    event.set_text("\u{3042}\u{3044}").unwrap();
    assert_eq!(&event.payload()[5..], &[0x82, 0xA0, 0x82, 0xA2]);
    assert_eq!(event.text().unwrap(), "\u{3042}\u{3044}");
}

#[test]
fn changing_charset_keeps_the_text() {
    use pretty_assertions::assert_eq;
    let mut event = Event::new_marker(0, Charset::Latin, "caf\u{e9}");
    assert_eq!(event.payload(), b"{@LATIN}caf\xE9");

    event.set_charset(Charset::Utf16Be).unwrap();
    assert_eq!(event.charset(), Some(Charset::Utf16Be));
    assert_eq!(event.payload(), &[0xFE, 0xFF, 0, b'c', 0, b'a', 0, b'f', 0, 0xE9]);
    assert_eq!(event.text().unwrap(), "caf\u{e9}");

    event.set_charset(Charset::Utf16Le).unwrap();
    assert_eq!(event.text().unwrap(), "caf\u{e9}");
}

#[test]
fn default_charset_comes_from_config() {
    use pretty_assertions::assert_eq;
    let config = Config::new(Charset::Jp);
    let mut event = Event::new_lyric(0, Charset::Unspecified, "");
    event.set_text_with("\u{3042}", &config).unwrap();
    // unmarked, encoded with the default
    assert_eq!(event.payload(), &[0x82, 0xA0]);
    assert_eq!(event.charset(), Some(Charset::Unspecified));
    assert_eq!(event.text_with(&config).unwrap(), "\u{3042}");
}

#[test]
fn text_on_other_kinds_is_rejected() {
    let mut tempo = Event::new_tempo(0, 500_000);
    assert_eq!(tempo.text(), None);
    assert!(tempo.set_text("x").is_err());
    assert!(tempo.set_charset(Charset::Jp).is_err());
}
