//! Typed error values. Every error aborts the whole operation; there is no
//! retry and no partial-result recovery.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("i/o: {0}")]
    Io(#[from] io::Error),

    #[error("format: {0}")]
    Format(#[from] FormatError),

    #[error("config: {0}")]
    Config(#[from] ConfigError),
}

/// Anything wrong with the compressed byte stream itself.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FormatError {
    #[error("header: expected {expected} bytes, got {actual}")]
    HeaderTruncated { expected: usize, actual: usize },

    #[error("header: serialized tree is {len} bytes, over the u16 limit")]
    HeaderOverflow { len: usize },

    #[error("header: malformed tree serialization")]
    MalformedTree,

    #[error("no code for symbol {0:?}")]
    UnknownSymbol(char),

    #[error("stream ends mid-code")]
    TruncatedStream,

    #[error("trailing bit count {0} out of range")]
    BadTrailingCount(u8),

    #[error("payload bit has no matching branch")]
    CorruptPayload,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("input and output are the same path: {}", .0.display())]
    SamePath(PathBuf),
}
