use std::{io, path::PathBuf};

use miniz_oxide::inflate::TINFLStatus;

/// A failure inside the PNG chunk codec.
///
/// These don't know which file they came from, [`Error`] adds that part.
#[derive(Debug, thiserror::Error)]
pub enum PngError {
  /// The first 8 bytes aren't the PNG signature.
  #[error("file is not a valid PNG (bad signature)")]
  NoPngSignature,

  /// The data ended in the middle of a chunk, or before `IEND`.
  #[error("unexpected end of PNG data")]
  UnexpectedEndOfInput,

  /// The first chunk of the stream must be the header.
  #[error("first chunk is not IHDR")]
  FirstChunkNotIHDR,

  /// The header chunk has the wrong length or an illegal field value.
  #[error("invalid IHDR chunk: {0}")]
  IllegalHeader(&'static str),

  /// A critical chunk failed its checksum.
  #[error("CRC mismatch in {chunk} chunk (declared {declared:#010x}, actual {actual:#010x})")]
  CrcMismatch {
    /// Which chunk type failed.
    chunk: String,
    /// CRC stored in the file.
    declared: u32,
    /// CRC computed over the chunk.
    actual: u32,
  },

  /// A palette image didn't have a palette before its image data.
  #[error("palette image has no PLTE chunk")]
  MissingPalette,

  /// A text chunk isn't laid out like the format says it should be.
  #[error("malformed {chunk} chunk: {reason}")]
  MalformedText {
    /// Which text chunk type.
    chunk: &'static str,
    /// What was wrong with it.
    reason: &'static str,
  },

  /// A text chunk uses a compressed variant, which this crate won't decode.
  ///
  /// The value is the compression-type code, see
  /// [`TextCompression`](crate::png::TextCompression).
  #[error("unsupported compression type in metadata: {0}")]
  UnsupportedCompression(i8),

  /// The zlib stream of the image data couldn't be inflated.
  #[error("image data failed to decompress: {0:?}")]
  Inflate(TINFLStatus),

  /// The inflated image data isn't the size the header implies.
  #[error("image data is {actual} bytes after decompression, expected {expected}")]
  ImageDataWrongSize {
    /// Size implied by the header.
    expected: usize,
    /// Size actually found.
    actual: usize,
  },

  /// A scanline used a filter type outside of 0 through 4.
  #[error("illegal adaptive filter type {0}")]
  IllegalAdaptiveFilterType(u8),

  /// A pixel buffer doesn't have the shape the header describes.
  #[error("pixel buffer is {rows}x{row_bytes}, header needs {expected_rows}x{expected_row_bytes}")]
  PixelBufferMismatch {
    /// Rows given.
    rows: usize,
    /// Bytes per row given.
    row_bytes: usize,
    /// Rows required.
    expected_rows: usize,
    /// Bytes per row required.
    expected_row_bytes: usize,
  },

  /// A metadata key can't be stored as a PNG keyword.
  #[error("invalid metadata key {0:?}: keywords must be 1-79 bytes with no NUL")]
  InvalidKeyword(String),

  /// A metadata value can't be stored in a text chunk.
  #[error("invalid value for metadata key {0:?}: text must not contain NUL")]
  InvalidText(String),

  /// The allocator couldn't give us enough space.
  #[error("allocation failed")]
  Alloc,

  /// A checked math operation failed.
  #[error("image dimensions overflow")]
  CheckedMath,
}
impl From<std::collections::TryReserveError> for PngError {
  #[inline]
  fn from(_: std::collections::TryReserveError) -> Self {
    Self::Alloc
  }
}

/// An error from the `pngmeta` crate.
#[derive(Debug, thiserror::Error)]
pub enum Error {
  /// The file couldn't be opened, read, or replaced.
  #[error("{}: {source}", .path.display())]
  Io {
    /// The file being worked on.
    path: PathBuf,
    /// What the OS said.
    #[source]
    source: io::Error,
  },

  /// The file's PNG data couldn't be decoded or re-encoded.
  #[error("{}: {source}", .path.display())]
  Png {
    /// The file being worked on.
    path: PathBuf,
    /// The codec failure.
    #[source]
    source: PngError,
  },

  /// A command line assignment wasn't `key=value`.
  #[error("invalid metadata format: {0}")]
  Usage(String),
}

/// The broad category of an [`Error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
  /// File missing, unreadable, or unwritable.
  Io,
  /// Bad signature, corrupt chunk stream, or encode failure.
  Format,
  /// A text chunk uses a compression scheme that isn't decoded.
  UnsupportedCompression,
  /// Malformed command line arguments.
  Usage,
}

impl Error {
  #[inline]
  pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
    Self::Io { path: path.into(), source }
  }

  #[inline]
  pub(crate) fn png(path: impl Into<PathBuf>, source: PngError) -> Self {
    Self::Png { path: path.into(), source }
  }

  /// Which part of the error taxonomy this falls under.
  #[must_use]
  pub fn kind(&self) -> ErrorKind {
    match self {
      Self::Io { .. } => ErrorKind::Io,
      Self::Png { source: PngError::UnsupportedCompression(_), .. } => {
        ErrorKind::UnsupportedCompression
      }
      Self::Png { .. } => ErrorKind::Format,
      Self::Usage(_) => ErrorKind::Usage,
    }
  }

  /// The compression-type code, if this is an unsupported compression error.
  #[must_use]
  pub fn compression_code(&self) -> Option<i8> {
    match self {
      Self::Png { source: PngError::UnsupportedCompression(code), .. } => Some(*code),
      _ => None,
    }
  }
}

/// Result alias for the file level operations.
pub type Result<T> = core::result::Result<T, Error>;

/// Result alias for the codec level operations.
pub type PngResult<T> = core::result::Result<T, PngError>;
