//! Stream encoder: two passes over the input.
//!
//! Pass one counts symbol frequencies; pass two looks up each symbol's code
//! and packs it bit by bit, draining completed bytes to the writer whenever
//! the accumulator crosses `DRAIN_THRESHOLD_BITS`. Output layout: header
//! length (u16 LE) + serialized tree + packed payload + one trailing byte
//! holding the valid-bit count of the final payload byte.

use std::collections::HashMap;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::bitstring::BitString;
use crate::error::{ConfigError, FormatError, Result};
use crate::tree::Tree;

/// Accumulator flush trigger: 16 KiB worth of bits.
pub const DRAIN_THRESHOLD_BITS: usize = 8 * 16 * 1024;

/// Byte counts of one encode run, for reporting.
#[derive(Debug, Clone, Copy)]
pub struct EncodeStats {
    pub input_bytes: usize,
    pub header_bytes: usize,
    pub payload_bytes: usize,
}

impl EncodeStats {
    /// Whole-file compressed size: length prefix + header + payload +
    /// trailing-count byte.
    pub fn compressed_bytes(&self) -> usize {
        2 + self.header_bytes + self.payload_bytes + 1
    }

    /// Size reduction vs the input, in percent. Negative when header
    /// overhead outweighs the packing gain.
    pub fn reduction_percent(&self) -> f64 {
        if self.input_bytes == 0 {
            return 0.0;
        }
        (1.0 - self.compressed_bytes() as f64 / self.input_bytes as f64) * 100.0
    }
}

fn count_frequencies(text: &str) -> HashMap<char, u64> {
    let mut freq = HashMap::new();
    for symbol in text.chars() {
        *freq.entry(symbol).or_insert(0) += 1;
    }
    freq
}

/// Compresses `text` into `out`. Flushes the writer before returning.
pub fn compress_to_writer<W: Write>(text: &str, out: &mut W) -> Result<EncodeStats> {
    let tree = Tree::from_frequencies(&count_frequencies(text));

    let header = tree.serialize();
    let header_len: u16 = header
        .len()
        .try_into()
        .map_err(|_| FormatError::HeaderOverflow { len: header.len() })?;
    out.write_all(&header_len.to_le_bytes())?;
    out.write_all(header.as_bytes())?;

    let table = tree.code_table();
    let mut bits = BitString::new();
    let mut payload_bytes = 0;

    for symbol in text.chars() {
        // both passes see the same text, so a miss means a broken table
        let entry = table
            .get(&symbol)
            .ok_or(FormatError::UnknownSymbol(symbol))?;
        bits.append_bits(&entry.code);

        if bits.size() >= DRAIN_THRESHOLD_BITS {
            let ready = bits.drain_ready_bytes();
            payload_bytes += ready.len();
            out.write_all(&ready)?;
        }
    }

    let trailing = bits.trailing_valid_bits();
    let rest = bits.drain_all();
    payload_bytes += rest.len();
    out.write_all(&rest)?;
    out.write_all(&[trailing])?;
    out.flush()?;

    Ok(EncodeStats {
        input_bytes: text.len(),
        header_bytes: header.len(),
        payload_bytes,
    })
}

/// Compresses the UTF-8 file at `input` into `output`.
pub fn compress_file(input: &Path, output: &Path) -> Result<EncodeStats> {
    if input == output {
        return Err(ConfigError::SamePath(input.to_path_buf()).into());
    }

    let text = fs::read_to_string(input)?;
    let mut out = BufWriter::new(File::create(output)?);
    compress_to_writer(&text, &mut out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[test]
    fn concrete_layout() {
        let mut out = Vec::new();
        let stats = compress_to_writer("AAAAABBC", &mut out).unwrap();

        assert_eq!(&out[..2], &8u16.to_le_bytes());
        assert_eq!(&out[2..10], b"001C1B1A");
        // A=1, B=01, C=00: 11111 01 01 00 packs to 0xFA 0x80, 3 trailing bits
        assert_eq!(&out[10..], &[0b1111_1010, 0b1000_0000, 3]);

        assert_eq!(stats.header_bytes, 8);
        assert_eq!(stats.payload_bytes, 2);
        assert_eq!(stats.compressed_bytes(), 13);
    }

    #[test]
    fn empty_input_layout() {
        let mut out = Vec::new();
        let stats = compress_to_writer("", &mut out).unwrap();
        assert_eq!(out, vec![1, 0, b'#', 0]);
        assert_eq!(stats.payload_bytes, 0);
        assert_eq!(stats.reduction_percent(), 0.0);
    }

    #[test]
    fn single_symbol_layout() {
        let mut out = Vec::new();
        compress_to_writer("AAAAAAAA", &mut out).unwrap();
        // "1A" header; eight 0-bits pack into one zero byte, all 8 valid
        assert_eq!(out, vec![2, 0, b'1', b'A', 0x00, 8]);
    }

    #[test]
    fn same_path_is_rejected() {
        let path = Path::new("whatever.txt");
        assert!(matches!(
            compress_file(path, path),
            Err(Error::Config(ConfigError::SamePath(_)))
        ));
    }
}
