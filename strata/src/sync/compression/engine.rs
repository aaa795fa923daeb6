//! Streaming deflate-family codecs on top of [`flate2`].
//!
//! Compressors and the gzip decompressor are [`flate2`] push-style writers over a `Vec<u8>` sink,
//! so framing (headers, checksums, trailers, member boundaries) is handled by [`flate2`]. Zlib and
//! raw deflate streams are decoded with the low-level [`Decompress`] which reports the end of a
//! stream explicitly: a stream that stops before its final block is detected as truncated.

use std::io::Write;

use flate2::write::{DeflateEncoder, GzEncoder, MultiGzDecoder, ZlibEncoder};
use flate2::{Compression, Decompress, DecompressError, FlushDecompress, Status};

use crate::prelude::*;

/// Minimum spare capacity reserved for codec output per step.
const OUT_CHUNK: usize = 8192;

fn compress_failure(err: std::io::Error) -> Error {
    Error::from(std::io::Error::other(err))
}

fn corrupt(err: DecompressError) -> Error {
    Error::CorruptData(err.to_string())
}

fn corrupt_member(err: std::io::Error) -> Error {
    Error::CorruptData(format!("invalid gzip member: {err}"))
}

enum Encoder {
    Zlib(ZlibEncoder<Vec<u8>>),
    Gzip(GzEncoder<Vec<u8>>),
    Deflate(DeflateEncoder<Vec<u8>>),
}

impl Encoder {
    fn writer(&mut self) -> &mut dyn Write {
        match self {
            Encoder::Zlib(encoder) => encoder,
            Encoder::Gzip(encoder) => encoder,
            Encoder::Deflate(encoder) => encoder,
        }
    }

    fn output(&mut self) -> &mut Vec<u8> {
        match self {
            Encoder::Zlib(encoder) => encoder.get_mut(),
            Encoder::Gzip(encoder) => encoder.get_mut(),
            Encoder::Deflate(encoder) => encoder.get_mut(),
        }
    }

    fn try_finish(&mut self) -> std::io::Result<()> {
        match self {
            Encoder::Zlib(encoder) => encoder.try_finish(),
            Encoder::Gzip(encoder) => encoder.try_finish(),
            Encoder::Deflate(encoder) => encoder.try_finish(),
        }
    }
}

/// Compressing half of a codec.
pub(super) struct Deflater {
    encoder: Encoder,
    total_in: u64,
    finished: bool,
}

impl Deflater {
    pub(super) fn new(algorithm: Algorithm, level: Level) -> Self {
        let level = Compression::new(level.level());
        let encoder = match algorithm {
            Algorithm::Zlib => Encoder::Zlib(ZlibEncoder::new(Vec::new(), level)),
            Algorithm::Gzip => Encoder::Gzip(GzEncoder::new(Vec::new(), level)),
            Algorithm::Deflate => Encoder::Deflate(DeflateEncoder::new(Vec::new(), level)),
        };

        Self {
            encoder,
            total_in: 0,
            finished: false,
        }
    }

    /// Compresses `input`, appending produced bytes to `out`.
    pub(super) fn compress(&mut self, input: &[u8], out: &mut Vec<u8>) -> Result<()> {
        self.ensure_unfinished()?;

        self.encoder
            .writer()
            .write_all(input)
            .map_err(compress_failure)?;
        self.total_in += input.len() as u64;
        out.append(self.encoder.output());

        Ok(())
    }

    /// Emits everything compressed so far, so it can be decoded without the rest of the stream.
    pub(super) fn sync_flush(&mut self, out: &mut Vec<u8>) -> Result<()> {
        self.ensure_unfinished()?;

        self.encoder.writer().flush().map_err(compress_failure)?;
        out.append(self.encoder.output());

        Ok(())
    }

    /// Terminates the stream, appending the final block and framing trailer to `out`.
    ///
    /// Does nothing when called again.
    pub(super) fn finish(&mut self, out: &mut Vec<u8>) -> Result<()> {
        if self.finished {
            return Ok(());
        }

        self.encoder.try_finish().map_err(compress_failure)?;
        out.append(self.encoder.output());
        self.finished = true;

        Ok(())
    }

    /// Uncompressed bytes consumed.
    pub(super) fn total_in(&self) -> u64 {
        self.total_in
    }

    fn ensure_unfinished(&self) -> Result<()> {
        match self.finished {
            true => Err(Error::InvalidOperation("write to a finalized compressed stream")),
            false => Ok(()),
        }
    }
}

enum Decoder {
    /// Gzip file: one or more members.
    Members(MultiGzDecoder<Vec<u8>>),
    /// Single zlib or raw deflate stream.
    Stream(Decompress),
}

/// Decompressing half of a codec.
pub(super) struct Inflater {
    decoder: Decoder,
    algorithm: Algorithm,
    done: bool,
}

impl Inflater {
    pub(super) fn new(algorithm: Algorithm) -> Self {
        let decoder = match algorithm {
            Algorithm::Gzip => Decoder::Members(MultiGzDecoder::new(Vec::new())),
            Algorithm::Zlib => Decoder::Stream(Decompress::new(true)),
            Algorithm::Deflate => Decoder::Stream(Decompress::new(false)),
        };

        Self {
            decoder,
            algorithm,
            done: false,
        }
    }

    /// Returns `true` once the end of the compressed stream was reached.
    ///
    /// Gzip input may carry further members, so it is done only after [`Inflater::finish`].
    pub(super) fn is_done(&self) -> bool {
        self.done
    }

    /// Consumes all of `input`, appending decompressed bytes to `out`.
    ///
    /// Bytes past the end of a zlib or deflate stream are ignored.
    pub(super) fn feed(&mut self, input: &[u8], out: &mut Vec<u8>) -> Result<()> {
        if self.done {
            log::trace!("ignoring {} bytes past the end of stream", input.len());
            return Ok(());
        }

        if let Decoder::Members(decoder) = &mut self.decoder {
            decoder.write_all(input).map_err(corrupt_member)?;
            decoder.flush().map_err(corrupt_member)?;
            out.append(decoder.get_mut());
            return Ok(());
        }

        self.inflate(input, out)?;
        Ok(())
    }

    /// Signals the end of compressed input, appending remaining output to `out`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::CorruptData`] if the compressed stream is incomplete.
    pub(super) fn finish(&mut self, out: &mut Vec<u8>) -> Result<()> {
        if self.done {
            return Ok(());
        }

        if let Decoder::Members(decoder) = &mut self.decoder {
            decoder.try_finish().map_err(corrupt_member)?;
            out.append(decoder.get_mut());
            self.done = true;
        } else {
            self.inflate(&[], out)?;
        }

        if !self.done {
            return Err(Error::CorruptData(format!(
                "truncated {} stream",
                self.algorithm
            )));
        }
        Ok(())
    }

    /// Runs the decompressor over `input` until it is consumed or the stream ends.
    ///
    /// Returns the amount of consumed bytes.
    fn inflate(&mut self, input: &[u8], out: &mut Vec<u8>) -> Result<usize> {
        let Decoder::Stream(decompress) = &mut self.decoder else {
            return Ok(0);
        };
        let mut consumed = 0;

        loop {
            out.reserve(OUT_CHUNK);
            let spare = out.capacity() - out.len();
            let (before_in, before_out) = (decompress.total_in(), decompress.total_out());

            let status = decompress
                .decompress_vec(&input[consumed..], out, FlushDecompress::None)
                .map_err(corrupt)?;

            let step_in = (decompress.total_in() - before_in) as usize;
            let step_out = (decompress.total_out() - before_out) as usize;
            consumed += step_in;

            if status == Status::StreamEnd {
                self.done = true;
                return Ok(consumed);
            }
            if step_out == spare {
                continue;
            }
            if consumed == input.len() {
                return Ok(consumed);
            }
            if step_in == 0 && step_out == 0 {
                return Err(Error::CorruptData(format!(
                    "{} stream makes no progress",
                    self.algorithm
                )));
            }
        }
    }
}
