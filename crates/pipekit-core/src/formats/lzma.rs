//! Raw LZMA framing for tar streams.
//!
//! The container is the LZMA "alone" layout: a 5-byte properties block
//! (lc/lp/pb byte plus a little-endian dictionary size), an 8-byte
//! little-endian uncompressed size (all ones when unknown), then the
//! compressed payload. It is not an `.xz` container; those start with a
//! magic number and are rejected with an explicit error.

use std::io::Cursor;
use std::io::Read;
use std::io::Write;

use xz2::read::XzDecoder;
use xz2::stream::LzmaOptions;
use xz2::stream::Stream;
use xz2::write::XzEncoder;

use crate::PipelineError;
use crate::Result;

/// Length of the properties block plus the size field.
pub const HEADER_LEN: usize = 13;

/// Largest valid lc/lp/pb byte: `(pb * 5 + lp) * 9 + lc` with all at max.
const MAX_PROPERTIES_BYTE: u8 = 224;

const XZ_MAGIC: [u8; 6] = [0xFD, 0x37, 0x7A, 0x58, 0x5A, 0x00];

/// Uncompressed size value meaning "unknown, read to the end marker".
pub const UNKNOWN_SIZE: u64 = u64::MAX;

/// Parsed raw LZMA header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LzmaHeader {
    /// lc/lp/pb properties byte.
    pub properties: u8,
    /// Dictionary size in bytes.
    pub dictionary_size: u32,
    /// Declared uncompressed size, `None` when unknown.
    pub uncompressed_size: Option<u64>,
}

impl LzmaHeader {
    /// Parses and validates the 13 header bytes.
    ///
    /// # Errors
    ///
    /// Returns `PipelineError::MalformedContainer` if the bytes are an `.xz`
    /// signature or the properties byte is out of range.
    pub fn parse(bytes: &[u8; HEADER_LEN]) -> Result<Self> {
        if bytes[..XZ_MAGIC.len()] == XZ_MAGIC {
            return Err(PipelineError::MalformedContainer(
                "found an .xz container, expected a raw LZMA header".to_string(),
            ));
        }
        if bytes[0] > MAX_PROPERTIES_BYTE {
            return Err(PipelineError::MalformedContainer(format!(
                "invalid LZMA properties byte {:#04x}",
                bytes[0]
            )));
        }

        let mut dictionary = [0u8; 4];
        dictionary.copy_from_slice(&bytes[1..5]);
        let mut size = [0u8; 8];
        size.copy_from_slice(&bytes[5..HEADER_LEN]);
        let size = u64::from_le_bytes(size);

        Ok(Self {
            properties: bytes[0],
            dictionary_size: u32::from_le_bytes(dictionary),
            uncompressed_size: (size != UNKNOWN_SIZE).then_some(size),
        })
    }
}

/// Decoder returned by [`decoder`].
pub type LzmaReader<R> = XzDecoder<std::io::Chain<Cursor<[u8; HEADER_LEN]>, R>>;

/// Reads and validates the header from `inner`, then returns a reader over
/// the decompressed payload.
///
/// # Errors
///
/// Returns `PipelineError::MalformedContainer` if fewer than 13 bytes are
/// available or the header is invalid.
pub fn decoder<R: Read>(mut inner: R) -> Result<LzmaReader<R>> {
    let mut header = [0u8; HEADER_LEN];
    inner.read_exact(&mut header).map_err(|e| {
        if e.kind() == std::io::ErrorKind::UnexpectedEof {
            PipelineError::MalformedContainer(format!(
                "truncated LZMA header: expected {HEADER_LEN} bytes"
            ))
        } else {
            PipelineError::Io(e)
        }
    })?;
    LzmaHeader::parse(&header)?;

    let stream = Stream::new_lzma_decoder(u64::MAX).map_err(std::io::Error::from)?;
    Ok(XzDecoder::new_stream(Cursor::new(header).chain(inner), stream))
}

/// Returns a writer that compresses into the raw LZMA framing.
///
/// The size field is written as unknown and the payload ends with an end
/// marker. Call `finish()` on the result to flush the trailer.
///
/// # Errors
///
/// Returns an error if the preset is not in `0..=9`.
pub fn encoder<W: Write>(inner: W, preset: u32) -> Result<XzEncoder<W>> {
    let options = LzmaOptions::new_preset(preset).map_err(std::io::Error::from)?;
    let stream = Stream::new_lzma_encoder(&options).map_err(std::io::Error::from)?;
    Ok(XzEncoder::new_stream(inner, stream))
}
