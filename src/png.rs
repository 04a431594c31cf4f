//! The PNG chunk codec.
//!
//! * [Portable Network Graphics Specification (Third Edition)][png-spec]
//!
//! [png-spec]: https://www.w3.org/TR/png/
//!
//! A PNG is an 8 byte signature followed by a series of "chunks". Each chunk
//! is a big-endian length, a four byte type tag, the data, and a CRC-32 of the
//! type and data. The codec only cares about a few chunk types:
//!
//! * `IHDR`: the [`ImageHeader`], always the first chunk.
//! * `PLTE` and `tRNS`: kept as opaque bytes so palette and color-keyed
//!   images survive being written back out.
//! * `tEXt`, `zTXt`, `iTXt`: text metadata. Only the uncompressed forms are
//!   accepted, see [`TextCompression`].
//! * `IDAT`: the compressed, filtered pixel data. All the `IDAT` chunks
//!   together form a single zlib stream.
//! * `IEND`: the end of the stream. Data after it is ignored.
//!
//! Every other chunk is skipped when reading and not written.
//!
//! ## Reading
//!
//! [`decode_metadata`] walks the chunks and collects the text entries without
//! touching the image data. [`decode_image`] also inflates and unfilters the
//! image data into a [`PixelBuffer`] of full rows (interlaced images are
//! de-interlaced).
//!
//! ## Writing
//!
//! [`encode_png`] takes a [`DecodedImage`] and gives back the bytes of a new
//! PNG, with the header echoed exactly and one `tEXt` chunk per metadata
//! entry.

use core::fmt::{Debug, Write};
use std::collections::BTreeMap;

use bytemuck::{Pod, Zeroable};
use tracing::{debug, trace, warn};

use crate::{int_endian::U32BE, PngError, PngResult};

mod crc32;
pub use crc32::*;

mod raw_chunk;
pub use raw_chunk::*;

mod ihdr;
pub use ihdr::*;

mod text;
pub use text::*;

mod adam7;
use adam7::reduced_image_dimensions;

mod unfilter;
pub use unfilter::*;

mod filter;
pub use filter::*;

mod pixels;
pub use pixels::*;

mod decode;
pub use decode::*;

mod encode;
pub use encode::*;

/// The first eight bytes of every PNG datastream.
pub const PNG_SIGNATURE: [u8; 8] = [137, 80, 78, 71, 13, 10, 26, 10];

/// Checks if the PNG signature is correct.
///
/// This is `false` for any slice shorter than the signature.
#[inline]
#[must_use]
pub fn is_png_signature_correct(bytes: &[u8]) -> bool {
  bytes.starts_with(&PNG_SIGNATURE)
}

/// Text metadata, keyword to text.
///
/// Keys compare byte for byte. Iteration order is sorted, but nothing about
/// the PNG format depends on the order.
pub type MetadataSet = BTreeMap<String, String>;

/// Everything the codec keeps from a PNG.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedImage {
  /// The `IHDR` fields, written back unchanged by [`encode_png`].
  pub header: ImageHeader,
  /// `PLTE` chunk data, if any.
  pub palette: Option<Vec<u8>>,
  /// `tRNS` chunk data, if any.
  pub transparency: Option<Vec<u8>>,
  /// Unfiltered, de-interlaced pixel rows.
  pub pixels: PixelBuffer,
  /// Text entries by keyword. On decode a later chunk replaces an earlier one
  /// with the same keyword.
  pub metadata: MetadataSet,
}

#[test]
fn test_signature() {
  assert!(is_png_signature_correct(&PNG_SIGNATURE));
  assert!(is_png_signature_correct(b"\x89PNG\r\n\x1a\nmore bytes"));
  assert!(!is_png_signature_correct(b"\x89PNG"));
  assert!(!is_png_signature_correct(b"GIF89a\0\0\0\0"));
}
