use super::*;

/// Rows of raw pixel bytes, stored in one contiguous allocation.
///
/// The bytes are exactly what the PNG holds once decompressed and unfiltered:
/// no filter bytes, packed sub-byte pixels, big-endian 16-bit channels.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct PixelBuffer {
  row_bytes: usize,
  data: Vec<u8>,
}
impl PixelBuffer {
  /// A zeroed buffer of `rows` rows that are each `row_bytes` long.
  pub fn new(rows: usize, row_bytes: usize) -> PngResult<Self> {
    let len = rows.checked_mul(row_bytes).ok_or(PngError::CheckedMath)?;
    let mut data = Vec::new();
    data.try_reserve(len)?;
    data.resize(len, 0);
    Ok(Self { row_bytes, data })
  }

  /// Wraps existing bytes as rows of `row_bytes` each.
  ///
  /// Fails if the bytes don't divide evenly into rows.
  pub fn from_vec(data: Vec<u8>, row_bytes: usize) -> PngResult<Self> {
    if row_bytes == 0 || data.len() % row_bytes != 0 {
      return Err(PngError::PixelBufferMismatch {
        rows: 0,
        row_bytes,
        expected_rows: 0,
        expected_row_bytes: row_bytes,
      });
    }
    Ok(Self { row_bytes, data })
  }

  /// A buffer shaped for the given header.
  #[inline]
  pub fn for_header(header: &ImageHeader) -> PngResult<Self> {
    Self::new(header.height as usize, header.row_bytes()?)
  }

  #[inline]
  #[must_use]
  pub fn row_count(&self) -> usize {
    if self.row_bytes == 0 {
      0
    } else {
      self.data.len() / self.row_bytes
    }
  }

  #[inline]
  #[must_use]
  pub const fn row_bytes(&self) -> usize {
    self.row_bytes
  }

  /// ## Panics
  /// * If `y` is out of bounds.
  #[inline]
  #[must_use]
  pub fn row(&self, y: usize) -> &[u8] {
    &self.data[y * self.row_bytes..(y + 1) * self.row_bytes]
  }

  /// ## Panics
  /// * If `y` is out of bounds.
  #[inline]
  #[must_use]
  pub fn row_mut(&mut self, y: usize) -> &mut [u8] {
    &mut self.data[y * self.row_bytes..(y + 1) * self.row_bytes]
  }

  #[inline]
  pub fn rows(&self) -> core::slice::ChunksExact<'_, u8> {
    self.data.chunks_exact(self.row_bytes.max(1))
  }

  #[inline]
  pub fn rows_mut(&mut self) -> core::slice::ChunksExactMut<'_, u8> {
    self.data.chunks_exact_mut(self.row_bytes.max(1))
  }

  /// All the rows, back to back.
  #[inline]
  #[must_use]
  pub fn as_bytes(&self) -> &[u8] {
    &self.data
  }

  #[inline]
  #[must_use]
  pub fn into_vec(self) -> Vec<u8> {
    self.data
  }

  /// Checks that this buffer is exactly `height` rows of `row_bytes`.
  pub fn check_shape(&self, header: &ImageHeader) -> PngResult<()> {
    let expected_rows = header.height as usize;
    let expected_row_bytes = header.row_bytes()?;
    if self.row_count() == expected_rows && self.row_bytes == expected_row_bytes {
      Ok(())
    } else {
      Err(PngError::PixelBufferMismatch {
        rows: self.row_count(),
        row_bytes: self.row_bytes,
        expected_rows,
        expected_row_bytes,
      })
    }
  }
}
impl Debug for PixelBuffer {
  fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
    f.debug_struct("PixelBuffer")
      .field("rows", &self.row_count())
      .field("row_bytes", &self.row_bytes)
      .field("data", &&self.data[..self.data.len().min(12)])
      .finish()
  }
}

#[test]
fn test_pixel_buffer_shape() {
  let header = ImageHeader::new(3, 2, 8, PngColorType::RGB).unwrap();
  let mut buf = PixelBuffer::for_header(&header).unwrap();
  assert_eq!(buf.row_count(), 2);
  assert_eq!(buf.row_bytes(), 9);
  buf.row_mut(1)[0] = 7;
  assert_eq!(buf.as_bytes()[9], 7);
  assert!(buf.check_shape(&header).is_ok());

  let wrong = PixelBuffer::new(3, 9).unwrap();
  assert!(matches!(wrong.check_shape(&header), Err(PngError::PixelBufferMismatch { rows: 3, .. })));
  assert!(PixelBuffer::from_vec(vec![0; 10], 9).is_err());
}
