//! # Compression channel
//!
//! [`CompressionChannel`] compresses bytes written to it or decompresses bytes read from it. The
//! codec is a streaming deflate engine provided by [`flate2`], framing is selected by
//! [`Algorithm`].

mod engine;

use engine::{Deflater, Inflater};

use crate::core::utils::Closer;
use crate::sync::ByteChannel;

use crate::prelude::*;

enum Codec {
    Compress(Deflater),
    Decompress(Inflater),
}

impl std::fmt::Debug for Codec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Codec::Compress(_) => f.write_str("Compress"),
            Codec::Decompress(_) => f.write_str("Decompress"),
        }
    }
}

/// <sup>[`sync`](crate::sync)</sup>
/// Decorator that compresses on write or decompresses on read.
///
/// A channel works in a single [`Direction`]. Reading from a compressor or writing to a
/// decompressor fails with [`Error::InvalidOperation`].
///
/// Compressors finalize the stream (final block and framing trailer) exactly once, either on
/// [`close`](ByteChannel::close) or on [`finish`](CompressionChannel::finish). A compressor's
/// [`flush`](ByteChannel::flush) performs a sync flush: everything written so far becomes decodable
/// by the reading side.
///
/// Decompressors pull compressed bytes until at least one byte is decompressed. Malformed or
/// truncated input is reported as [`Error::CorruptData`], after which the channel is poisoned and
/// returns the same error on every operation. Gzip input is decoded member after member until the
/// inner channel ends, bytes past the end of a zlib or raw deflate stream are ignored.
///
/// # Usage
///
/// ```rust
/// use strata::sync::prelude::*;
///
/// let options = CompressionOptions::from(Algorithm::Gzip);
///
/// let mut compressor = CompressionChannel::compressor(MemoryChannel::new(), options);
/// compressor.write_all(&[42u8; 4096]).unwrap();
/// let compressed = compressor.finish().unwrap().into_bytes();
/// assert!(compressed.len() < 4096);
///
/// let mut decompressor =
///     CompressionChannel::decompressor(MemoryChannel::from_bytes(compressed), options);
/// let mut content = Vec::new();
/// decompressor.read_to_end(&mut content).unwrap();
/// assert_eq!(content, [42u8; 4096]);
/// ```
#[derive(Debug)]
pub struct CompressionChannel<C: ByteChannel> {
    inner: Option<C>,
    codec: Codec,
    options: CompressionOptions,
    out: Vec<u8>,
    out_pos: usize,
    chunk: Vec<u8>,
    eof: bool,
    poisoned: Option<String>,
    total_in: u64,
    total_out: u64,
    info: ChannelInfo,
    state: Closer,
}

impl<C: ByteChannel> CompressionChannel<C> {
    /// Wraps a channel, bytes written to the result are compressed.
    pub fn compressor(inner: C, options: CompressionOptions) -> Self {
        let codec = Codec::Compress(Deflater::new(options.algorithm, options.level));
        Self::build(inner, codec, options)
    }

    /// Wraps a channel, bytes read from the result are decompressed.
    pub fn decompressor(inner: C, options: CompressionOptions) -> Self {
        let codec = Codec::Decompress(Inflater::new(options.algorithm));
        Self::build(inner, codec, options)
    }

    fn build(inner: C, codec: Codec, options: CompressionOptions) -> Self {
        let chunk = match codec {
            Codec::Compress(_) => Vec::new(),
            Codec::Decompress(_) => vec![0u8; options.chunk_size.max(1)],
        };

        Self {
            info: inner.info().clone(),
            inner: Some(inner),
            codec,
            options,
            out: Vec::new(),
            out_pos: 0,
            chunk,
            eof: false,
            poisoned: None,
            total_in: 0,
            total_out: 0,
            state: Closer::new(),
        }
    }

    /// Direction of this channel.
    pub fn direction(&self) -> Direction {
        match self.codec {
            Codec::Compress(_) => Direction::Compress,
            Codec::Decompress(_) => Direction::Decompress,
        }
    }

    /// Options of this channel.
    pub fn options(&self) -> &CompressionOptions {
        &self.options
    }

    /// Amount of bytes that entered the codec: uncompressed for compressors, compressed for
    /// decompressors.
    pub fn total_in(&self) -> u64 {
        match &self.codec {
            Codec::Compress(deflater) => deflater.total_in(),
            Codec::Decompress(_) => self.total_in,
        }
    }

    /// Amount of bytes that left the codec: compressed bytes written to the inner channel, or
    /// decompressed bytes returned to readers.
    pub fn total_out(&self) -> u64 {
        self.total_out
    }

    /// Finalizes the compressed stream and returns the inner channel without closing it.
    ///
    /// For decompressors, returns the inner channel as is.
    pub fn finish(mut self) -> Result<C> {
        self.state.ensure_open()?;
        self.check_poisoned()?;

        let finalized = self.finalize();
        self.track(finalized)?;

        self.state.close();
        self.inner.take().ok_or(Error::Closed)
    }

    fn check_poisoned(&self) -> Result<()> {
        match &self.poisoned {
            Some(reason) => Err(Error::CorruptData(reason.clone())),
            None => Ok(()),
        }
    }

    fn track<T>(&mut self, result: Result<T>) -> Result<T> {
        if let Err(Error::CorruptData(reason)) = &result {
            if self.poisoned.is_none() {
                log::debug!("[{}] corrupt compressed data: {reason}", self.info);
                self.poisoned = Some(reason.clone());
            }
        }
        result
    }

    /// Writes codec output to the inner channel.
    fn drain_out(&mut self) -> Result<()> {
        if self.out.is_empty() {
            return Ok(());
        }

        let inner = self.inner.as_mut().ok_or(Error::Closed)?;
        inner.write_all(&self.out)?;
        self.total_out += self.out.len() as u64;
        self.out.clear();

        Ok(())
    }

    fn finalize(&mut self) -> Result<()> {
        let Codec::Compress(deflater) = &mut self.codec else {
            return Ok(());
        };

        deflater.finish(&mut self.out)?;
        self.drain_out()?;
        log::trace!(
            "[{}] {} stream finalized: {} -> {} bytes",
            self.info,
            self.options.algorithm,
            self.total_in(),
            self.total_out
        );

        let inner = self.inner.as_mut().ok_or(Error::Closed)?;
        inner.flush()
    }

    fn read_decompressed(&mut self, buf: &mut [u8]) -> Result<ReadOutcome> {
        let Codec::Decompress(inflater) = &mut self.codec else {
            return Err(Error::InvalidOperation("read from a compressing channel"));
        };
        let inner = self.inner.as_mut().ok_or(Error::Closed)?;

        loop {
            if self.out_pos < self.out.len() {
                let n = buf.len().min(self.out.len() - self.out_pos);
                buf[..n].copy_from_slice(&self.out[self.out_pos..self.out_pos + n]);
                self.out_pos += n;
                if self.out_pos == self.out.len() {
                    self.out.clear();
                    self.out_pos = 0;
                }
                self.total_out += n as u64;
                return Ok(ReadOutcome::Data(n));
            }

            if self.eof || inflater.is_done() {
                return Ok(ReadOutcome::EndOfStream);
            }

            match inner.read(&mut self.chunk)? {
                ReadOutcome::Data(0) => return Ok(ReadOutcome::Data(0)),
                ReadOutcome::Data(n) => {
                    self.total_in += n as u64;
                    inflater.feed(&self.chunk[..n], &mut self.out)?;
                }
                ReadOutcome::EndOfStream => {
                    self.eof = true;
                    inflater.finish(&mut self.out)?;
                }
            }
        }
    }

    fn write_compressed(&mut self, buf: &[u8]) -> Result<usize> {
        let Codec::Compress(deflater) = &mut self.codec else {
            return Err(Error::InvalidOperation("write to a decompressing channel"));
        };

        deflater.compress(buf, &mut self.out)?;
        self.drain_out()?;

        Ok(buf.len())
    }

    fn sync_flush(&mut self) -> Result<()> {
        if let Codec::Compress(deflater) = &mut self.codec {
            deflater.sync_flush(&mut self.out)?;
            self.drain_out()?;
        }

        let inner = self.inner.as_mut().ok_or(Error::Closed)?;
        inner.flush()
    }
}

impl<C: ByteChannel> ByteChannel for CompressionChannel<C> {
    fn read(&mut self, buf: &mut [u8]) -> Result<ReadOutcome> {
        self.state.ensure_open()?;
        self.check_poisoned()?;
        if buf.is_empty() {
            return Ok(ReadOutcome::Data(0));
        }

        let result = self.read_decompressed(buf);
        self.track(result)
    }

    fn write(&mut self, buf: &[u8]) -> Result<usize> {
        self.state.ensure_open()?;
        self.check_poisoned()?;
        if buf.is_empty() {
            return Ok(0);
        }

        self.write_compressed(buf)
    }

    fn flush(&mut self) -> Result<()> {
        self.state.ensure_open()?;
        self.check_poisoned()?;
        self.sync_flush()
    }

    fn close(&mut self) -> Result<()> {
        if !self.state.close() {
            return Ok(());
        }
        if self.inner.is_none() {
            return Ok(());
        }

        let finalized = match self.poisoned {
            Some(_) => Ok(()),
            None => self.finalize(),
        };
        let closed = match self.inner.as_mut() {
            Some(inner) => inner.close(),
            None => Ok(()),
        };
        log::debug!("[{}] {} channel closed", self.info, self.options.algorithm);

        finalized.and(closed)
    }

    fn is_closed(&self) -> bool {
        self.state.is_closed()
    }

    fn info(&self) -> &ChannelInfo {
        &self.info
    }
}

impl<C: ByteChannel> Drop for CompressionChannel<C> {
    fn drop(&mut self) {
        if let Err(err) = self.close() {
            log::warn!("[{}] error while closing on drop: {err:?}", self.info);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sync::testing::ProbeChannel;
    use crate::sync::MemoryChannel;

    fn pattern(len: usize) -> Vec<u8> {
        (0..len).map(|i| (i % 251) as u8).collect()
    }

    fn compress(options: CompressionOptions, data: &[u8]) -> Vec<u8> {
        let mut channel = CompressionChannel::compressor(MemoryChannel::new(), options);
        for part in data.chunks(1000) {
            channel.write_all(part).unwrap();
        }
        channel.finish().unwrap().into_bytes()
    }

    #[test]
    fn million_bytes_round_trip() {
        let data = pattern(1_000_000);

        for algorithm in [Algorithm::Zlib, Algorithm::Gzip, Algorithm::Deflate] {
            let options = CompressionOptions::from(algorithm).chunk_size(512);
            let compressed = compress(options, &data);
            assert!(compressed.len() < data.len() / 10, "{algorithm}");

            let mut channel =
                CompressionChannel::decompressor(MemoryChannel::from_bytes(compressed), options);
            let mut content = Vec::new();
            channel.read_to_end(&mut content).unwrap();

            assert_eq!(content.len(), data.len());
            assert!(content == data, "{algorithm}");
            assert_eq!(channel.total_out(), data.len() as u64);
        }
    }

    #[test]
    fn truncated_stream_poisons_channel() {
        let options = CompressionOptions::default();
        let compressed = compress(options, &pattern(50_000));
        let truncated = compressed[..compressed.len() / 2].to_vec();

        let mut channel =
            CompressionChannel::decompressor(MemoryChannel::from_bytes(truncated), options);
        let mut content = Vec::new();
        let err = channel.read_to_end(&mut content).unwrap_err();
        assert!(matches!(err, Error::CorruptData(_)));

        let err = channel.read(&mut [0u8; 16]).unwrap_err();
        assert!(matches!(err, Error::CorruptData(_)));

        channel.close().unwrap();
    }

    #[test]
    fn empty_input_is_corrupt() {
        let mut channel = CompressionChannel::decompressor(
            MemoryChannel::new(),
            CompressionOptions::from(Algorithm::Gzip),
        );
        let err = channel.read(&mut [0u8; 16]).unwrap_err();
        assert!(matches!(err, Error::CorruptData(_)));
    }

    #[test]
    fn wrong_direction_is_rejected() {
        let options = CompressionOptions::default();

        let mut compressor = CompressionChannel::compressor(MemoryChannel::new(), options);
        assert_eq!(compressor.direction(), Direction::Compress);
        let err = compressor.read(&mut [0u8; 4]).unwrap_err();
        assert!(matches!(err, Error::InvalidOperation(_)));
        compressor.write_all(b"still usable").unwrap();

        let mut decompressor = CompressionChannel::decompressor(MemoryChannel::new(), options);
        assert_eq!(decompressor.direction(), Direction::Decompress);
        let err = decompressor.write(b"data").unwrap_err();
        assert!(matches!(err, Error::InvalidOperation(_)));
    }

    #[test]
    fn flush_makes_written_bytes_decodable() {
        let inner = ProbeChannel::new();
        let probe = inner.probe();
        let options = CompressionOptions::from(Algorithm::Deflate);

        let mut compressor = CompressionChannel::compressor(inner, options);
        compressor.write_all(b"first part").unwrap();
        compressor.flush().unwrap();
        assert_eq!(probe.flushes(), 1);

        let mut decompressor =
            CompressionChannel::decompressor(MemoryChannel::from_bytes(probe.written()), options);
        let mut buf = [0u8; 32];
        let ReadOutcome::Data(n) = decompressor.read(&mut buf).unwrap() else {
            panic!("expected data");
        };
        assert_eq!(&buf[..n], b"first part");
    }

    #[test]
    fn close_finalizes_once_and_releases_inner() {
        let inner = ProbeChannel::new();
        let probe = inner.probe();

        let mut compressor = CompressionChannel::compressor(inner, CompressionOptions::default());
        compressor.write_all(&pattern(10_000)).unwrap();
        compressor.close().unwrap();
        let written = probe.written();

        compressor.close().unwrap();
        drop(compressor);

        assert_eq!(probe.written(), written);
        assert_eq!(probe.closes(), 1);

        let mut decompressor = CompressionChannel::decompressor(
            MemoryChannel::from_bytes(written),
            CompressionOptions::default(),
        );
        let mut content = Vec::new();
        decompressor.read_to_end(&mut content).unwrap();
        assert_eq!(content, pattern(10_000));
    }

    #[test]
    fn close_releases_inner_when_finalization_fails() {
        let inner = ProbeChannel::new().fail_on_write();
        let probe = inner.probe();

        let mut compressor = CompressionChannel::compressor(inner, CompressionOptions::default());
        let err = compressor.close().unwrap_err();

        assert_eq!(err.io_kind(), Some(std::io::ErrorKind::BrokenPipe));
        assert_eq!(probe.closes(), 1);
    }

    #[test]
    fn trailing_bytes_do_not_reach_readers() {
        let options = CompressionOptions::from(Algorithm::Zlib);
        let mut compressed = compress(options, b"payload");
        compressed.extend_from_slice(b"trailing");

        let inner = ProbeChannel::with_input(compressed).read_chunk(4);
        let mut channel = CompressionChannel::decompressor(inner, options);
        let mut content = Vec::new();
        channel.read_to_end(&mut content).unwrap();

        assert_eq!(content, b"payload");
    }

    #[test]
    fn stacked_compression_round_trip() {
        let data = pattern(20_000);
        let outer = CompressionOptions::from(Algorithm::Gzip);
        let inner = CompressionOptions::from(Algorithm::Zlib).level(Level::fast());

        let mut channel = CompressionChannel::compressor(
            CompressionChannel::compressor(MemoryChannel::new(), inner),
            outer,
        );
        channel.write_all(&data).unwrap();
        let compressed = channel.finish().unwrap().finish().unwrap().into_bytes();

        let mut channel = CompressionChannel::decompressor(
            CompressionChannel::decompressor(MemoryChannel::from_bytes(compressed), inner),
            outer,
        );
        let mut content = Vec::new();
        channel.read_to_end(&mut content).unwrap();
        assert!(content == data);
    }

    #[test]
    fn gzip_members_are_read_until_inner_end() {
        let options = CompressionOptions::from(Algorithm::Gzip);
        let mut compressed = compress(options, b"first member|");
        compressed.extend_from_slice(&compress(options, b"second member"));

        let inner = ProbeChannel::with_input(compressed).read_chunk(7);
        let mut channel = CompressionChannel::decompressor(inner, options);
        let mut content = Vec::new();
        channel.read_to_end(&mut content).unwrap();

        assert_eq!(content, b"first member|second member");
    }

    #[test]
    fn garbage_after_gzip_member_is_corrupt() {
        let options = CompressionOptions::from(Algorithm::Gzip);
        let mut compressed = compress(options, b"payload");
        compressed.extend_from_slice(b"garbage");

        let mut channel =
            CompressionChannel::decompressor(MemoryChannel::from_bytes(compressed), options);
        let mut content = Vec::new();
        let err = channel.read_to_end(&mut content).unwrap_err();
        assert!(matches!(err, Error::CorruptData(_)));
    }
}
