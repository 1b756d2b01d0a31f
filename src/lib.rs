// src/lib.rs
//! huffpack — prefix-code (Huffman) file compressor.
//!
//! Compressed file layout:
//!   Bytes 0..2:    header length, little-endian u16
//!   Bytes 2..2+N:  serialized code tree, N = header length
//!                  (pre-order: `#` absent tree, `1` + symbol for a leaf,
//!                  `0` + left + right for an internal node)
//!   Then:          bit-packed symbol codes, MSB-first within each byte,
//!                  zero-padded in the final byte
//!   Final byte:    count of valid bits (0-8) in the last payload byte;
//!                  0 only when the payload is empty

pub mod bitstring;
pub mod decode;
pub mod encode;
pub mod error;
pub mod tree;

pub use decode::{decompress_file, decompress_stream, DEFAULT_CHUNK_BYTES};
pub use encode::{compress_file, compress_to_writer, EncodeStats};
pub use error::{ConfigError, Error, FormatError, Result};

use std::io;

/// Compresses a string in memory. The byte layout, including the
/// length-prefixed header and the trailing valid-bit byte, matches what
/// `compress_file` writes to disk.
pub fn compress(text: &str) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    encode::compress_to_writer(text, &mut out)?;
    Ok(out)
}

/// Decompresses an in-memory compressed image back to its original text.
pub fn decompress(data: &[u8]) -> Result<String> {
    let mut out = Vec::new();
    decode::decompress_stream(&mut &data[..], &mut out, DEFAULT_CHUNK_BYTES)?;
    String::from_utf8(out).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e).into())
}
