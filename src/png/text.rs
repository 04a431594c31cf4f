//! The three text chunk types.
//!
//! * [tEXt](https://www.w3.org/TR/png/#11tEXt): Latin-1 keyword, NUL, Latin-1
//!   text.
//! * [zTXt](https://www.w3.org/TR/png/#11zTXt): keyword, NUL, compression
//!   method byte, zlib stream.
//! * [iTXt](https://www.w3.org/TR/png/#11iTXt): keyword, NUL, compression flag,
//!   compression method, language tag, NUL, translated keyword, NUL, UTF-8
//!   text (possibly zlib compressed).

use super::*;

/// Identifies which text variant an entry came from.
///
/// The discriminant is the "compression type code" reported by
/// [`PngError::UnsupportedCompression`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(i8)]
pub enum TextCompression {
  /// `tEXt`, which is never compressed.
  None = -1,
  /// `zTXt`
  Zlib = 0,
  /// `iTXt` with the compression flag clear.
  InternationalNone = 1,
  /// `iTXt` with the compression flag set.
  InternationalZlib = 2,
}
impl TextCompression {
  /// The numeric compression type code.
  #[inline]
  #[must_use]
  pub const fn code(self) -> i8 {
    self as i8
  }
  #[inline]
  #[must_use]
  pub const fn is_compressed(self) -> bool {
    matches!(self, Self::Zlib | Self::InternationalZlib)
  }
}

/// One key/value pair read out of a text chunk.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TextEntry {
  /// The chunk's keyword.
  pub key: String,
  /// The chunk's text.
  pub value: String,
  /// Which chunk variant this came from.
  pub compression: TextCompression,
}

/// Latin-1 is what the format says, but plenty of writers put UTF-8 in there.
///
/// Anything that's valid UTF-8 is kept as UTF-8, otherwise every byte is
/// taken as the Latin-1 code point of the same value, so no bytes are lost.
fn latin1_or_utf8(bytes: &[u8]) -> String {
  match core::str::from_utf8(bytes) {
    Ok(s) => s.to_owned(),
    Err(_) => bytes.iter().map(|&b| b as char).collect(),
  }
}

#[inline]
fn split_at_nul(bytes: &[u8]) -> Option<(&[u8], &[u8])> {
  let pos = bytes.iter().position(|&b| b == 0)?;
  Some((&bytes[..pos], &bytes[pos + 1..]))
}

/// Keywords are 1-79 bytes. NUL can't appear, it's the separator.
#[inline]
const fn is_keyword_len_ok(keyword: &[u8]) -> bool {
  !keyword.is_empty() && keyword.len() <= 79
}

/// Keyword bytes as they get written: Latin-1 when every char fits in a
/// byte, otherwise UTF-8.
fn keyword_bytes(key: &str) -> Vec<u8> {
  if key.chars().all(|c| (c as u32) <= 0xFF) {
    key.chars().map(|c| c as u8).collect()
  } else {
    key.as_bytes().to_vec()
  }
}

/// Parses the data of a `tEXt`, `zTXt`, or `iTXt` chunk.
///
/// * Returns `Ok(None)` for any other chunk type.
/// * Compressed text is an error carrying the compression type code. Nothing
///   gets inflated here.
pub fn parse_text_chunk(chunk_ty: ChunkType, data: &[u8]) -> PngResult<Option<TextEntry>> {
  match chunk_ty {
    ChunkType::tEXt => {
      let (keyword, text) = split_at_nul(data)
        .ok_or(PngError::MalformedText { chunk: "tEXt", reason: "no keyword separator" })?;
      if !is_keyword_len_ok(keyword) {
        return Err(PngError::MalformedText { chunk: "tEXt", reason: "keyword must be 1-79 bytes" });
      }
      if text.contains(&0) {
        return Err(PngError::MalformedText { chunk: "tEXt", reason: "text contains NUL" });
      }
      Ok(Some(TextEntry {
        key: latin1_or_utf8(keyword),
        value: latin1_or_utf8(text),
        compression: TextCompression::None,
      }))
    }
    ChunkType::zTXt => {
      split_at_nul(data)
        .ok_or(PngError::MalformedText { chunk: "zTXt", reason: "no keyword separator" })?;
      Err(PngError::UnsupportedCompression(TextCompression::Zlib.code()))
    }
    ChunkType::iTXt => {
      let (keyword, rest) = split_at_nul(data)
        .ok_or(PngError::MalformedText { chunk: "iTXt", reason: "no keyword separator" })?;
      if !is_keyword_len_ok(keyword) {
        return Err(PngError::MalformedText { chunk: "iTXt", reason: "keyword must be 1-79 bytes" });
      }
      let (flag, rest) = match rest {
        [flag, _method, rest @ ..] => (*flag, rest),
        _ => return Err(PngError::MalformedText { chunk: "iTXt", reason: "missing flags" }),
      };
      let compression = match flag {
        0 => TextCompression::InternationalNone,
        1 => TextCompression::InternationalZlib,
        _ => {
          return Err(PngError::MalformedText { chunk: "iTXt", reason: "bad compression flag" })
        }
      };
      let (_language, rest) = split_at_nul(rest)
        .ok_or(PngError::MalformedText { chunk: "iTXt", reason: "no language tag" })?;
      let (_translated_keyword, text) = split_at_nul(rest)
        .ok_or(PngError::MalformedText { chunk: "iTXt", reason: "no translated keyword" })?;
      if compression.is_compressed() {
        return Err(PngError::UnsupportedCompression(compression.code()));
      }
      if text.contains(&0) {
        return Err(PngError::MalformedText { chunk: "iTXt", reason: "text contains NUL" });
      }
      let value = core::str::from_utf8(text)
        .map_err(|_| PngError::MalformedText { chunk: "iTXt", reason: "text is not UTF-8" })?;
      Ok(Some(TextEntry { key: latin1_or_utf8(keyword), value: value.to_owned(), compression }))
    }
    _ => Ok(None),
  }
}

/// Builds the data of an uncompressed `tEXt` chunk.
///
/// The keyword is written as Latin-1 if it can be, and as UTF-8 if not. The
/// value is written as UTF-8. Either way the written keyword must be 1-79
/// bytes, and neither part may contain a NUL.
///
/// Any keyword that [`parse_text_chunk`] accepted can be written back.
pub fn build_text_chunk(key: &str, value: &str) -> PngResult<Vec<u8>> {
  let keyword = keyword_bytes(key);
  if !is_keyword_len_ok(&keyword) || keyword.contains(&0) {
    return Err(PngError::InvalidKeyword(key.to_owned()));
  }
  if value.as_bytes().contains(&0) {
    return Err(PngError::InvalidText(key.to_owned()));
  }
  let mut data = Vec::new();
  data.try_reserve(keyword.len() + 1 + value.len())?;
  data.extend_from_slice(&keyword);
  data.push(0);
  data.extend_from_slice(value.as_bytes());
  Ok(data)
}
