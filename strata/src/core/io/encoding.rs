use std::fmt::{Display, Formatter};

use crate::core::consts::DEFAULT_TEXT_CHUNK_SIZE;
use crate::errors::EncodingError;

/// <sup>[`serde`](https://serde.rs)</sup>
/// Text encoding used by text channels.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum Encoding {
    /// UTF-8 (default value).
    #[default]
    Utf8,
    /// 7-bit US-ASCII. Bytes above `0x7F` are rejected.
    Ascii,
    /// ISO-8859-1. Every byte maps to the code point of the same value.
    Latin1,
    /// UTF-16, little-endian.
    Utf16Le,
    /// UTF-16, big-endian.
    Utf16Be,
}

impl Encoding {
    /// Canonical name of the encoding.
    pub fn name(&self) -> &'static str {
        match self {
            Encoding::Utf8 => "UTF-8",
            Encoding::Ascii => "US-ASCII",
            Encoding::Latin1 => "ISO-8859-1",
            Encoding::Utf16Le => "UTF-16LE",
            Encoding::Utf16Be => "UTF-16BE",
        }
    }

    /// Byte-order mark of the encoding, empty for single-byte encodings.
    pub fn bom(&self) -> &'static [u8] {
        match self {
            Encoding::Utf8 => &[0xEF, 0xBB, 0xBF],
            Encoding::Utf16Le => &[0xFF, 0xFE],
            Encoding::Utf16Be => &[0xFE, 0xFF],
            Encoding::Ascii | Encoding::Latin1 => &[],
        }
    }

    /// Maximum length in bytes of a single encoded character.
    pub fn max_char_len(&self) -> usize {
        match self {
            Encoding::Utf8 | Encoding::Utf16Le | Encoding::Utf16Be => 4,
            Encoding::Ascii | Encoding::Latin1 => 1,
        }
    }

    /// Encodes `text`, appending bytes to `out`.
    ///
    /// On error `out` may contain a partially encoded prefix.
    ///
    /// # Errors
    ///
    /// Returns [`EncodingError`] with the byte offset in `text` of the first character that can't
    /// be represented.
    pub fn encode(&self, text: &str, out: &mut Vec<u8>) -> Result<(), EncodingError> {
        match self {
            Encoding::Utf8 => out.extend_from_slice(text.as_bytes()),
            Encoding::Ascii | Encoding::Latin1 => {
                let limit = if *self == Encoding::Ascii { 0x7F } else { 0xFF };
                out.reserve(text.len());
                for (idx, ch) in text.char_indices() {
                    if ch as u32 > limit {
                        return Err(EncodingError::new(
                            *self,
                            idx as u64,
                            format!("character {ch:?} is not representable"),
                        ));
                    }
                    out.push(ch as u8);
                }
            }
            Encoding::Utf16Le => text
                .encode_utf16()
                .for_each(|unit| out.extend_from_slice(&unit.to_le_bytes())),
            Encoding::Utf16Be => text
                .encode_utf16()
                .for_each(|unit| out.extend_from_slice(&unit.to_be_bytes())),
        }
        Ok(())
    }

    /// Decodes a complete byte sequence.
    ///
    /// A leading byte-order mark of this encoding is skipped.
    pub fn decode(&self, bytes: &[u8]) -> Result<String, EncodingError> {
        let mut decoder = Decoder::new(*self);
        let mut text = String::with_capacity(bytes.len());
        decoder.decode(bytes, &mut text)?;
        decoder.finish()?;
        Ok(text)
    }

    /// Decodes the longest complete prefix of `bytes` into `out`.
    ///
    /// Returns the amount of consumed bytes. Unconsumed bytes form an incomplete trailing
    /// character. On failure returns the offset of the offending byte and a reason.
    fn decode_prefix(&self, bytes: &[u8], out: &mut String) -> Result<usize, (usize, String)> {
        match self {
            Encoding::Utf8 => match std::str::from_utf8(bytes) {
                Ok(text) => {
                    out.push_str(text);
                    Ok(bytes.len())
                }
                Err(err) => {
                    let valid = err.valid_up_to();
                    if err.error_len().is_some() {
                        return Err((valid, "invalid UTF-8 sequence".into()));
                    }
                    let text = std::str::from_utf8(&bytes[..valid])
                        .map_err(|_| (0, "invalid UTF-8 sequence".to_string()))?;
                    out.push_str(text);
                    Ok(valid)
                }
            },
            Encoding::Ascii => {
                if let Some(idx) = bytes.iter().position(|b| !b.is_ascii()) {
                    return Err((idx, format!("byte 0x{:02X} is not ASCII", bytes[idx])));
                }
                out.extend(bytes.iter().map(|&b| char::from(b)));
                Ok(bytes.len())
            }
            Encoding::Latin1 => {
                out.extend(bytes.iter().map(|&b| char::from(b)));
                Ok(bytes.len())
            }
            Encoding::Utf16Le => decode_utf16(bytes, u16::from_le_bytes, out),
            Encoding::Utf16Be => decode_utf16(bytes, u16::from_be_bytes, out),
        }
    }
}

impl Display for Encoding {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

fn decode_utf16(
    bytes: &[u8],
    read_unit: fn([u8; 2]) -> u16,
    out: &mut String,
) -> Result<usize, (usize, String)> {
    let unit_at = |pos: usize| read_unit([bytes[pos], bytes[pos + 1]]);

    let mut pos = 0;
    while pos + 2 <= bytes.len() {
        let unit = unit_at(pos);
        match unit {
            0xD800..=0xDBFF => {
                // Surrogate pairs are never split across calls.
                if pos + 4 > bytes.len() {
                    break;
                }
                let low = unit_at(pos + 2);
                if !(0xDC00..=0xDFFF).contains(&low) {
                    return Err((pos, format!("unpaired high surrogate 0x{unit:04X}")));
                }
                let code = 0x10000 + (((unit as u32) - 0xD800) << 10) + ((low as u32) - 0xDC00);
                let ch = char::from_u32(code)
                    .ok_or_else(|| (pos, format!("invalid code point 0x{code:X}")))?;
                out.push(ch);
                pos += 4;
            }
            0xDC00..=0xDFFF => {
                return Err((pos, format!("unpaired low surrogate 0x{unit:04X}")));
            }
            _ => {
                let ch = char::from_u32(unit as u32)
                    .ok_or_else(|| (pos, format!("invalid code unit 0x{unit:04X}")))?;
                out.push(ch);
                pos += 2;
            }
        }
    }
    Ok(pos)
}

/// Incremental decoder.
///
/// Bytes of a character split across two [`Decoder::decode`] calls are held back and prefixed to
/// the next input, so decoded text never contains a broken character.
///
/// # Usage
///
/// ```rust
/// use strata::core::io::{Decoder, Encoding};
///
/// let bytes = "añb".as_bytes();
/// let mut decoder = Decoder::new(Encoding::Utf8);
/// let mut text = String::new();
///
/// decoder.decode(&bytes[..2], &mut text).unwrap();
/// assert_eq!(text, "a");
///
/// decoder.decode(&bytes[2..], &mut text).unwrap();
/// decoder.finish().unwrap();
/// assert_eq!(text, "añb");
/// ```
#[derive(Clone, Debug)]
pub struct Decoder {
    encoding: Encoding,
    pending: Vec<u8>,
    offset: u64,
    bom_checked: bool,
}

impl Decoder {
    /// Creates a decoder for the specified encoding.
    pub fn new(encoding: Encoding) -> Self {
        Self {
            encoding,
            pending: Vec::with_capacity(encoding.max_char_len()),
            offset: 0,
            bom_checked: false,
        }
    }

    /// Encoding of this decoder.
    pub fn encoding(&self) -> Encoding {
        self.encoding
    }

    /// Bytes of an incomplete character waiting for the next input.
    pub fn pending(&self) -> &[u8] {
        self.pending.as_slice()
    }

    /// Stream offset of the first byte not yet decoded.
    pub fn offset(&self) -> u64 {
        self.offset
    }

    /// Decodes `input`, appending complete characters to `out`.
    ///
    /// # Errors
    ///
    /// Returns [`EncodingError`] with the stream offset of the first invalid byte.
    pub fn decode(&mut self, input: &[u8], out: &mut String) -> Result<(), EncodingError> {
        self.pending.extend_from_slice(input);
        if !self.check_bom() {
            return Ok(());
        }

        let consumed = self
            .encoding
            .decode_prefix(&self.pending, out)
            .map_err(|(idx, reason)| {
                EncodingError::new(self.encoding, self.offset + idx as u64, reason)
            })?;
        self.pending.drain(..consumed);
        self.offset += consumed as u64;

        Ok(())
    }

    /// Signals the end of input.
    ///
    /// # Errors
    ///
    /// Returns [`EncodingError`] if an incomplete character is still pending.
    pub fn finish(&mut self) -> Result<(), EncodingError> {
        self.bom_checked = true;
        if self.pending.is_empty() {
            return Ok(());
        }
        Err(EncodingError::new(
            self.encoding,
            self.offset,
            format!(
                "incomplete sequence of {} byte(s) at end of stream",
                self.pending.len()
            ),
        ))
    }

    /// Skips a leading byte-order mark.
    ///
    /// Returns `false` while there are too few bytes to decide.
    fn check_bom(&mut self) -> bool {
        if self.bom_checked {
            return true;
        }

        let bom = self.encoding.bom();
        if self.pending.len() < bom.len() && bom.starts_with(&self.pending) {
            return false;
        }
        if !bom.is_empty() && self.pending.starts_with(bom) {
            self.pending.drain(..bom.len());
            self.offset += bom.len() as u64;
        }

        self.bom_checked = true;
        true
    }
}

/// <sup>[`serde`](https://serde.rs)</sup>
/// Line terminator written by text channels.
///
/// Readers always accept both `"\n"` and `"\r\n"`.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum LineEnding {
    /// `"\n"` (default value).
    #[default]
    Lf,
    /// `"\r\n"`.
    CrLf,
}

impl LineEnding {
    /// Terminator as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            LineEnding::Lf => "\n",
            LineEnding::CrLf => "\r\n",
        }
    }
}

/// <sup>[`serde`](https://serde.rs)</sup>
/// Text channel settings.
///
/// # Usage
///
/// ```rust
/// use strata::core::io::{Encoding, LineEnding, TextOptions};
///
/// let options = TextOptions::new()
///     .encoding(Encoding::Latin1)
///     .line_ending(LineEnding::CrLf);
///
/// assert_eq!(options.encoding, Encoding::Latin1);
/// ```
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct TextOptions {
    /// Byte-to-text mapping.
    pub encoding: Encoding,
    /// Terminator appended by `write_line`.
    pub line_ending: LineEnding,
    /// Amount of bytes requested from the inner channel per read.
    pub chunk_size: usize,
}

impl TextOptions {
    /// Creates default options: UTF-8, `"\n"` terminators.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets encoding.
    pub fn encoding(mut self, encoding: Encoding) -> Self {
        self.encoding = encoding;
        self
    }

    /// Sets line terminator used for writing.
    pub fn line_ending(mut self, line_ending: LineEnding) -> Self {
        self.line_ending = line_ending;
        self
    }

    /// Sets read chunk size, values below one byte are raised to one.
    pub fn chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }
}

impl Default for TextOptions {
    fn default() -> Self {
        Self {
            encoding: Encoding::default(),
            line_ending: LineEnding::default(),
            chunk_size: DEFAULT_TEXT_CHUNK_SIZE,
        }
    }
}
