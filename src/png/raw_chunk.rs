use super::*;

/// The four byte tag that says what kind of chunk a chunk is.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct ChunkType(pub [u8; 4]);
#[allow(nonstandard_style)]
impl ChunkType {
  pub const IHDR: Self = Self(*b"IHDR");
  pub const PLTE: Self = Self(*b"PLTE");
  pub const IDAT: Self = Self(*b"IDAT");
  pub const IEND: Self = Self(*b"IEND");
  pub const tRNS: Self = Self(*b"tRNS");
  pub const tEXt: Self = Self(*b"tEXt");
  pub const zTXt: Self = Self(*b"zTXt");
  pub const iTXt: Self = Self(*b"iTXt");

  /// Critical chunks have an uppercase first letter.
  ///
  /// A decoder that doesn't understand a critical chunk can't display the
  /// image, but any ancillary chunk can be skipped.
  #[inline]
  #[must_use]
  pub const fn is_critical(self) -> bool {
    (self.0[0] & 32) == 0
  }
}
impl Debug for ChunkType {
  fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
    f.write_char(self.0[0] as char)?;
    f.write_char(self.0[1] as char)?;
    f.write_char(self.0[2] as char)?;
    f.write_char(self.0[3] as char)?;
    Ok(())
  }
}
impl core::fmt::Display for ChunkType {
  #[inline]
  fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
    Debug::fmt(self, f)
  }
}

/// An unparsed chunk from a PNG.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RawChunk<'b> {
  pub(crate) type_: ChunkType,
  pub(crate) data: &'b [u8],
  pub(crate) declared_crc: u32,
}
impl Debug for RawChunk<'_> {
  #[inline]
  fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
    f.debug_struct("RawChunk")
      .field("type_", &self.type_)
      .field("data", &(&self.data[..self.data.len().min(12)], self.data.len()))
      .field("declared_crc", &self.declared_crc)
      .finish()
  }
}
impl<'b> RawChunk<'b> {
  #[inline]
  #[must_use]
  pub const fn chunk_type(&self) -> ChunkType {
    self.type_
  }
  #[inline]
  #[must_use]
  pub const fn data(&self) -> &'b [u8] {
    self.data
  }
  #[inline]
  #[must_use]
  pub const fn declared_crc(&self) -> u32 {
    self.declared_crc
  }
  #[inline]
  #[must_use]
  pub fn compute_actual_crc(&self) -> u32 {
    chunk_crc(self.type_.0, self.data)
  }

  /// Checks the declared CRC against the actual one.
  ///
  /// * Critical chunks with a bad CRC are an error.
  /// * Ancillary chunks with a bad CRC give `Ok(false)`, and the caller should
  ///   skip the chunk.
  pub fn verify_crc(&self) -> PngResult<bool> {
    let actual = self.compute_actual_crc();
    if actual == self.declared_crc {
      Ok(true)
    } else if self.type_.is_critical() {
      Err(PngError::CrcMismatch {
        chunk: self.type_.to_string(),
        declared: self.declared_crc,
        actual,
      })
    } else {
      warn!(
        chunk = %self.type_,
        declared = self.declared_crc,
        actual,
        "skipping ancillary chunk with bad CRC"
      );
      Ok(false)
    }
  }
}

/// An iterator that produces successive raw chunks from PNG bytes.
///
/// If the data runs out partway through a chunk the iterator gives a single
/// [`PngError::UnexpectedEndOfInput`] and then stops. It never panics, no
/// matter what bytes you give it.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct RawChunkIter<'b>(pub(crate) &'b [u8]);
impl<'b> RawChunkIter<'b> {
  /// Pass the full PNG bytes, it will remove the PNG signature automatically.
  ///
  /// The signature is *not* checked, use
  /// [`from_png_bytes`](Self::from_png_bytes) for that.
  #[inline]
  #[must_use]
  pub const fn new(bytes: &'b [u8]) -> Self {
    match bytes {
      [_, _, _, _, _, _, _, _, rest @ ..] => Self(rest),
      _ => Self(&[]),
    }
  }

  /// Checks the PNG signature and then iterates the chunks after it.
  pub fn from_png_bytes(bytes: &'b [u8]) -> PngResult<Self> {
    if is_png_signature_correct(bytes) {
      Ok(Self::new(bytes))
    } else {
      Err(PngError::NoPngSignature)
    }
  }
}
impl<'b> Iterator for RawChunkIter<'b> {
  type Item = PngResult<RawChunk<'b>>;
  #[inline]
  fn next(&mut self) -> Option<Self::Item> {
    if self.0.is_empty() {
      return None;
    }
    // Note: any early return below leaves the iterator empty so that a
    // truncated stream gives exactly one error.
    let bytes = core::mem::take(&mut self.0);
    let (len_bytes, rest) = match try_pull_byte_array::<4>(bytes) {
      Some(x) => x,
      None => return Some(Err(PngError::UnexpectedEndOfInput)),
    };
    let chunk_len = u32::from_be_bytes(len_bytes) as usize;
    let (type_bytes, rest) = match try_pull_byte_array::<4>(rest) {
      Some(x) => x,
      None => return Some(Err(PngError::UnexpectedEndOfInput)),
    };
    if rest.len() < chunk_len {
      return Some(Err(PngError::UnexpectedEndOfInput));
    }
    let (data, rest) = rest.split_at(chunk_len);
    let (decl_bytes, rest) = match try_pull_byte_array::<4>(rest) {
      Some(x) => x,
      None => return Some(Err(PngError::UnexpectedEndOfInput)),
    };
    self.0 = rest;
    Some(Ok(RawChunk {
      type_: ChunkType(type_bytes),
      data,
      declared_crc: u32::from_be_bytes(decl_bytes),
    }))
  }
}

#[inline]
fn try_pull_byte_array<const N: usize>(bytes: &[u8]) -> Option<([u8; N], &[u8])> {
  if bytes.len() >= N {
    let (head, tail) = bytes.split_at(N);
    let mut a = [0_u8; N];
    a.copy_from_slice(head);
    Some((a, tail))
  } else {
    None
  }
}

/// Largest data length a chunk is allowed to declare.
pub const MAX_CHUNK_LEN: usize = (1 << 31) - 1;

/// Write a chunk (length, type, data, CRC) to the end of the output buffer.
pub fn write_chunk(output: &mut Vec<u8>, chunk_ty: ChunkType, data: &[u8]) -> PngResult<()> {
  if data.len() > MAX_CHUNK_LEN {
    return Err(PngError::CheckedMath);
  }
  output.try_reserve(12 + data.len())?;
  output.extend_from_slice(&(data.len() as u32).to_be_bytes());
  output.extend_from_slice(&chunk_ty.0);
  output.extend_from_slice(data);
  output.extend_from_slice(&chunk_crc(chunk_ty.0, data).to_be_bytes());
  Ok(())
}
