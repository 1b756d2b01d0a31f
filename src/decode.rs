//! Stream decoder.
//!
//! The compressed stream's last byte is the valid-bit count and the byte
//! before it is the final (possibly partial) payload byte, but the decoder
//! reads fixed-size chunks and cannot know which two bytes are the last
//! until EOF. `PendingTail` therefore withholds the newest two bytes at all
//! times; every earlier byte is confirmed payload and fed to the tree walk.

use std::fs::File;
use std::io::{BufReader, BufWriter, Cursor, Read, Write};
use std::path::Path;

use bitstream_io::{BigEndian, BitRead, BitReader};

use crate::error::{ConfigError, FormatError, Result};
use crate::tree::{Node, NodeId, Tree};

/// Chunk size for payload reads.
pub const DEFAULT_CHUNK_BYTES: usize = 10 * 1024;

/// The two newest bytes seen so far, withheld until EOF resolves them into
/// (final payload byte, valid-bit count).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PendingTail {
    Empty,
    One(u8),
    Two(u8, u8),
}

impl PendingTail {
    /// Folds a chunk in: everything except the newest two bytes becomes
    /// confirmed payload. Chunks of length 0, 1 and >=2 all shift state
    /// without losing or duplicating a byte.
    fn absorb(&mut self, chunk: &[u8], confirmed: &mut Vec<u8>) {
        match *chunk {
            [] => {}
            [byte] => {
                *self = match *self {
                    PendingTail::Empty => PendingTail::One(byte),
                    PendingTail::One(a) => PendingTail::Two(a, byte),
                    PendingTail::Two(a, b) => {
                        confirmed.push(a);
                        PendingTail::Two(b, byte)
                    }
                };
            }
            [.., y, z] => {
                match *self {
                    PendingTail::Empty => {}
                    PendingTail::One(a) => confirmed.push(a),
                    PendingTail::Two(a, b) => confirmed.extend_from_slice(&[a, b]),
                }
                confirmed.extend_from_slice(&chunk[..chunk.len() - 2]);
                *self = PendingTail::Two(y, z);
            }
        }
    }

    /// EOF: `Some((last, count))` means `count` bits of `last` remain to
    /// walk; `None` means the payload was empty (lone zero marker).
    fn finish(self) -> std::result::Result<Option<(u8, u8)>, FormatError> {
        match self {
            PendingTail::Two(last, count) => {
                if count == 0 || count > 8 {
                    return Err(FormatError::BadTrailingCount(count));
                }
                Ok(Some((last, count)))
            }
            PendingTail::One(0) => Ok(None),
            PendingTail::One(_) | PendingTail::Empty => Err(FormatError::TruncatedStream),
        }
    }
}

/// Bit-by-bit walk: left on 0, right on 1; reaching a leaf emits its symbol
/// and resets to the root.
struct Walker<'a> {
    tree: &'a Tree,
    root: NodeId,
    current: NodeId,
}

impl<'a> Walker<'a> {
    fn new(tree: &'a Tree) -> Option<Self> {
        tree.root().map(|root| Self {
            tree,
            root,
            current: root,
        })
    }

    fn step<W: Write>(&mut self, bit: bool, out: &mut W) -> Result<()> {
        match self.tree.node(self.current) {
            // single-leaf tree: the lone symbol's code is one 0 bit
            Node::Leaf { symbol, .. } => {
                if bit {
                    return Err(FormatError::CorruptPayload.into());
                }
                write_symbol(*symbol, out)
            }
            Node::Internal { left, right, .. } => {
                let next = if bit { *right } else { *left };
                if let Node::Leaf { symbol, .. } = self.tree.node(next) {
                    self.current = self.root;
                    write_symbol(*symbol, out)
                } else {
                    self.current = next;
                    Ok(())
                }
            }
        }
    }

    fn mid_code(&self) -> bool {
        self.current != self.root
    }
}

fn write_symbol<W: Write>(symbol: char, out: &mut W) -> Result<()> {
    let mut buf = [0u8; 4];
    out.write_all(symbol.encode_utf8(&mut buf).as_bytes())?;
    Ok(())
}

fn walk_bytes<W: Write>(bytes: &[u8], walker: &mut Walker, out: &mut W) -> Result<()> {
    let mut reader = BitReader::endian(Cursor::new(bytes), BigEndian);
    for _ in 0..bytes.len() * 8 {
        let bit = reader.read_bit()?;
        walker.step(bit, out)?;
    }
    Ok(())
}

fn walk_final_byte<W: Write>(last: u8, valid: u8, walker: &mut Walker, out: &mut W) -> Result<()> {
    let mut reader = BitReader::endian(Cursor::new([last]), BigEndian);
    for _ in 0..valid {
        let bit = reader.read_bit()?;
        walker.step(bit, out)?;
    }
    Ok(())
}

/// read_exact, except a short read reports how much was actually there.
fn read_fully<R: Read>(input: &mut R, buf: &mut [u8]) -> Result<()> {
    let mut filled = 0;
    while filled < buf.len() {
        let n = input.read(&mut buf[filled..])?;
        if n == 0 {
            return Err(FormatError::HeaderTruncated {
                expected: buf.len(),
                actual: filled,
            }
            .into());
        }
        filled += n;
    }
    Ok(())
}

fn read_header<R: Read>(input: &mut R) -> Result<Tree> {
    let mut len_buf = [0u8; 2];
    read_fully(input, &mut len_buf)?;
    let header_len = u16::from_le_bytes(len_buf) as usize;

    let mut header = vec![0u8; header_len];
    read_fully(input, &mut header)?;

    let header = String::from_utf8(header).map_err(|_| FormatError::MalformedTree)?;
    Ok(Tree::deserialize(&header)?)
}

/// Decompresses a whole stream, reading the payload `chunk_bytes` at a time.
/// Output is identical for any chunk size; the pending tail guarantees the
/// final two bytes are never walked as ordinary payload.
pub fn decompress_stream<R: Read, W: Write>(
    input: &mut R,
    out: &mut W,
    chunk_bytes: usize,
) -> Result<()> {
    let tree = read_header(input)?;
    let mut walker = Walker::new(&tree);

    let mut tail = PendingTail::Empty;
    let mut chunk = vec![0u8; chunk_bytes.max(1)];
    let mut confirmed = Vec::new();

    loop {
        let n = input.read(&mut chunk)?;
        if n == 0 {
            break;
        }
        confirmed.clear();
        tail.absorb(&chunk[..n], &mut confirmed);
        if !confirmed.is_empty() {
            let walker = walker.as_mut().ok_or(FormatError::CorruptPayload)?;
            walk_bytes(&confirmed, walker, out)?;
        }
    }

    if let Some((last, valid)) = tail.finish()? {
        let walker = walker.as_mut().ok_or(FormatError::CorruptPayload)?;
        walk_final_byte(last, valid, walker, out)?;
    }

    if walker.map_or(false, |walker| walker.mid_code()) {
        return Err(FormatError::TruncatedStream.into());
    }

    out.flush()?;
    Ok(())
}

/// Decompresses the file at `input` into `output`.
pub fn decompress_file(input: &Path, output: &Path) -> Result<()> {
    if input == output {
        return Err(ConfigError::SamePath(input.to_path_buf()).into());
    }

    let mut reader = BufReader::new(File::open(input)?);
    let mut writer = BufWriter::new(File::create(output)?);
    decompress_stream(&mut reader, &mut writer, DEFAULT_CHUNK_BYTES)
}
