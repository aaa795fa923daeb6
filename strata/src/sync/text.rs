use crate::core::io::Decoder;
use crate::core::utils::Closer;
use crate::sync::ByteChannel;

use crate::prelude::*;

/// <sup>[`sync`](crate::sync)</sup>
/// Decorator translating between text and bytes of the configured [`Encoding`].
///
/// Decoding never splits a character: bytes of an incomplete trailing character are held until the
/// next inner read completes it. If the stream ends in the middle of a character, reading fails with
/// [`Error::Encoding`].
///
/// Lines are terminated by `"\n"` or `"\r\n"`, terminators are not included into returned lines.
/// Writing appends the terminator from [`TextOptions::line_ending`].
///
/// Text channel is also a [`ByteChannel`]: raw bytes pass through as long as no decoded text is
/// held. Reading raw bytes while decoded text is buffered is an [`Error::InvalidOperation`].
///
/// # Usage
///
/// ```rust
/// use strata::sync::prelude::*;
///
/// let mut channel = TextChannel::new(MemoryChannel::from_bytes(b"one\r\ntwo\nthree".to_vec()));
///
/// let lines: Vec<String> = channel.lines().collect::<Result<_>>().unwrap();
/// assert_eq!(lines, ["one", "two", "three"]);
/// ```
#[derive(Debug)]
pub struct TextChannel<C: ByteChannel> {
    inner: Option<C>,
    options: TextOptions,
    decoder: Decoder,
    decoded: String,
    cursor: usize,
    chunk: Vec<u8>,
    encoded: Vec<u8>,
    eof: bool,
    info: ChannelInfo,
    state: Closer,
}

impl<C: ByteChannel> TextChannel<C> {
    /// Wraps a channel with default [`TextOptions`]: UTF-8 and `"\n"` terminators.
    pub fn new(inner: C) -> Self {
        Self::with_options(TextOptions::default(), inner)
    }

    /// Wraps a channel with custom options.
    pub fn with_options(options: TextOptions, inner: C) -> Self {
        Self {
            info: inner.info().clone(),
            inner: Some(inner),
            decoder: Decoder::new(options.encoding),
            decoded: String::new(),
            cursor: 0,
            chunk: vec![0u8; options.chunk_size.max(1)],
            encoded: Vec::new(),
            eof: false,
            options,
            state: Closer::new(),
        }
    }

    /// Options of this channel.
    pub fn options(&self) -> &TextOptions {
        &self.options
    }

    /// Encoding of this channel.
    pub fn encoding(&self) -> Encoding {
        self.options.encoding
    }

    /// Reads the next line without its terminator.
    ///
    /// Returns `None` at the end of stream. The last line does not need a terminator.
    pub fn read_line(&mut self) -> Result<Option<String>> {
        self.state.ensure_open()?;
        self.compact();

        let mut scanned = 0;
        loop {
            if let Some(idx) = self.decoded[scanned..].find('\n') {
                let end = scanned + idx;
                let line = &self.decoded[..end];
                let line = line.strip_suffix('\r').unwrap_or(line).to_string();
                self.cursor = end + 1;
                return Ok(Some(line));
            }
            scanned = self.decoded.len();

            if !self.fill()? {
                if self.decoded.is_empty() {
                    return Ok(None);
                }
                self.cursor = self.decoded.len();
                return Ok(Some(self.decoded.clone()));
            }
        }
    }

    /// Returns a lazy iterator over remaining lines.
    ///
    /// The iterator stops after the first error.
    pub fn lines(&mut self) -> Lines<'_, C> {
        Lines {
            channel: self,
            done: false,
        }
    }

    /// Decodes all remaining bytes.
    pub fn read_all(&mut self) -> Result<String> {
        self.state.ensure_open()?;
        self.compact();

        while self.fill()? {}

        self.cursor = 0;
        Ok(std::mem::take(&mut self.decoded))
    }

    /// Encodes and writes `text`.
    pub fn write_text(&mut self, text: &str) -> Result<()> {
        self.write_encoded(text, None)
    }

    /// Encodes and writes `text` followed by the configured line terminator.
    pub fn write_line(&mut self, text: &str) -> Result<()> {
        self.write_encoded(text, Some(self.options.line_ending))
    }

    /// Returns the inner channel without closing it.
    ///
    /// Decoded text that was not consumed yet is discarded.
    pub fn into_inner(mut self) -> Result<C> {
        self.state.ensure_open()?;
        self.state.close();
        self.inner.take().ok_or(Error::Closed)
    }

    fn inner_mut(&mut self) -> Result<&mut C> {
        self.state.ensure_open()?;
        self.inner.as_mut().ok_or(Error::Closed)
    }

    fn write_encoded(&mut self, text: &str, line_ending: Option<LineEnding>) -> Result<()> {
        self.state.ensure_open()?;

        self.encoded.clear();
        self.options.encoding.encode(text, &mut self.encoded)?;
        if let Some(line_ending) = line_ending {
            self.options
                .encoding
                .encode(line_ending.as_str(), &mut self.encoded)?;
        }

        let inner = self.inner.as_mut().ok_or(Error::Closed)?;
        inner.write_all(&self.encoded)
    }

    fn compact(&mut self) {
        if self.cursor > 0 {
            self.decoded.drain(..self.cursor);
            self.cursor = 0;
        }
    }

    /// Decodes one more chunk, returns `false` at the end of stream.
    fn fill(&mut self) -> Result<bool> {
        if self.eof {
            return Ok(false);
        }

        let inner = self.inner.as_mut().ok_or(Error::Closed)?;
        match inner.read(&mut self.chunk)? {
            ReadOutcome::Data(n) => {
                self.decoder.decode(&self.chunk[..n], &mut self.decoded)?;
                Ok(true)
            }
            ReadOutcome::EndOfStream => {
                self.eof = true;
                self.decoder.finish()?;
                log::trace!(
                    "[{}] decoded {} bytes of {}",
                    self.info,
                    self.decoder.offset(),
                    self.options.encoding
                );
                Ok(false)
            }
        }
    }
}

impl<C: ByteChannel> ByteChannel for TextChannel<C> {
    fn read(&mut self, buf: &mut [u8]) -> Result<ReadOutcome> {
        self.state.ensure_open()?;
        if buf.is_empty() {
            return Ok(ReadOutcome::Data(0));
        }
        if self.cursor < self.decoded.len() || !self.decoder.pending().is_empty() {
            return Err(Error::InvalidOperation(
                "raw read while decoded text is buffered",
            ));
        }
        if self.eof {
            return Ok(ReadOutcome::EndOfStream);
        }
        self.inner_mut()?.read(buf)
    }

    fn write(&mut self, buf: &[u8]) -> Result<usize> {
        self.inner_mut()?.write(buf)
    }

    fn flush(&mut self) -> Result<()> {
        self.inner_mut()?.flush()
    }

    fn close(&mut self) -> Result<()> {
        if !self.state.close() {
            return Ok(());
        }

        self.decoded.clear();
        self.cursor = 0;
        match self.inner.as_mut() {
            Some(inner) => inner.close(),
            None => Ok(()),
        }
    }

    fn is_closed(&self) -> bool {
        self.state.is_closed()
    }

    fn info(&self) -> &ChannelInfo {
        &self.info
    }
}

impl<C: ByteChannel> Drop for TextChannel<C> {
    fn drop(&mut self) {
        if let Err(err) = self.close() {
            log::warn!("[{}] error while closing on drop: {err:?}", self.info);
        }
    }
}

/// Lazy iterator over lines of a [`TextChannel`].
///
/// Created by [`TextChannel::lines`].
#[derive(Debug)]
pub struct Lines<'a, C: ByteChannel> {
    channel: &'a mut TextChannel<C>,
    done: bool,
}

impl<C: ByteChannel> Iterator for Lines<'_, C> {
    type Item = Result<String>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        match self.channel.read_line() {
            Ok(Some(line)) => Some(Ok(line)),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(err) => {
                self.done = true;
                Some(Err(err))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sync::testing::ProbeChannel;
    use crate::sync::{BufferedChannel, MemoryChannel};

    #[test]
    fn split_characters_are_decoded() {
        let text = "añb€😀";
        let inner = ProbeChannel::with_input(text.as_bytes().to_vec()).read_chunk(1);
        let mut channel = TextChannel::new(inner);

        assert_eq!(channel.read_all().unwrap(), text);
        assert_eq!(channel.read_all().unwrap(), "");
    }

    #[test]
    fn lines_accept_both_terminators() {
        let inner = MemoryChannel::from_bytes(b"a\r\n\nb\nlast\r".to_vec());
        let mut channel = TextChannel::with_options(TextOptions::new().chunk_size(3), inner);

        assert_eq!(channel.read_line().unwrap().as_deref(), Some("a"));
        assert_eq!(channel.read_line().unwrap().as_deref(), Some(""));
        assert_eq!(channel.read_line().unwrap().as_deref(), Some("b"));
        assert_eq!(channel.read_line().unwrap().as_deref(), Some("last\r"));
        assert_eq!(channel.read_line().unwrap(), None);
        assert_eq!(channel.read_line().unwrap(), None);
    }

    #[test]
    fn lines_stop_after_error() {
        let inner = MemoryChannel::from_bytes(b"ok\n\xC3".to_vec());
        let mut channel = TextChannel::new(inner);
        let mut lines = channel.lines();

        assert_eq!(lines.next().unwrap().unwrap(), "ok");
        let err = lines.next().unwrap().unwrap_err();
        match err {
            Error::Encoding(err) => assert_eq!(err.offset, 3),
            err => panic!("unexpected error: {err:?}"),
        }
        assert!(lines.next().is_none());
    }

    #[test]
    fn write_line_uses_configured_encoding() {
        let options = TextOptions::new()
            .encoding(Encoding::Latin1)
            .line_ending(LineEnding::CrLf);
        let mut channel = TextChannel::with_options(options, MemoryChannel::new());

        channel.write_line("café").unwrap();
        channel.write_text("end").unwrap();

        let bytes = channel.into_inner().unwrap().into_bytes();
        assert_eq!(bytes, b"caf\xE9\r\nend");
    }

    #[test]
    fn unrepresentable_text_is_rejected() {
        let options = TextOptions::new().encoding(Encoding::Ascii);
        let mut channel = TextChannel::with_options(options, MemoryChannel::new());

        let err = channel.write_text("naïve").unwrap_err();
        assert!(matches!(err, Error::Encoding(EncodingError { offset: 2, .. })));
    }

    #[test]
    fn utf16_with_bom_round_trip() {
        let options = TextOptions::new().encoding(Encoding::Utf16Be).chunk_size(1);

        let mut bytes = Encoding::Utf16Be.bom().to_vec();
        Encoding::Utf16Be.encode("𝄞 clef\n", &mut bytes).unwrap();

        let mut channel = TextChannel::with_options(options, MemoryChannel::from_bytes(bytes));
        assert_eq!(channel.read_line().unwrap().as_deref(), Some("𝄞 clef"));
        assert_eq!(channel.read_line().unwrap(), None);
    }

    #[test]
    fn hello_world_through_buffered_memory() {
        let mut writer = TextChannel::new(BufferedChannel::new(MemoryChannel::new()));
        writer.write_text("Hello, World!").unwrap();
        let bytes = writer
            .into_inner()
            .unwrap()
            .into_inner()
            .unwrap()
            .into_bytes();

        let mut reader = TextChannel::new(BufferedChannel::new(MemoryChannel::from_bytes(bytes)));
        assert_eq!(reader.read_all().unwrap(), "Hello, World!");
    }

    #[test]
    fn raw_read_is_rejected_while_text_is_buffered() {
        let mut channel = TextChannel::new(MemoryChannel::from_bytes(b"one\ntwo\n".to_vec()));
        channel.read_line().unwrap();

        let err = channel.read(&mut [0u8; 4]).unwrap_err();
        assert!(matches!(err, Error::InvalidOperation(_)));
    }

    #[test]
    fn close_closes_inner_once() {
        let inner = ProbeChannel::new();
        let probe = inner.probe();
        let mut channel = TextChannel::new(inner);

        channel.close().unwrap();
        channel.close().unwrap();
        drop(channel);

        assert_eq!(probe.closes(), 1);
        assert!(probe.is_closed());
    }

    #[test]
    fn zero_sized_read_does_not_reach_inner() {
        let inner = ProbeChannel::with_input(b"text".to_vec());
        let probe = inner.probe();
        let mut channel = TextChannel::new(inner);

        assert_eq!(channel.read(&mut []).unwrap(), ReadOutcome::Data(0));
        assert_eq!(probe.reads(), 0);

        assert_eq!(channel.read_all().unwrap(), "text");
        let reads = probe.reads();
        assert_eq!(channel.read(&mut []).unwrap(), ReadOutcome::Data(0));
        assert_eq!(probe.reads(), reads);
    }
}
