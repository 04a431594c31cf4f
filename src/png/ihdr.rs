use super::*;

/// The types of color that PNG supports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum PngColorType {
  /// Greyscale
  Y = 0,
  /// Red, Green, Blue
  RGB = 2,
  /// Index into a palette.
  ///
  /// The palette will have RGB8 data. There may optionally be a transparency
  /// chunk.
  Index = 3,
  /// Greyscale + Alpha
  YA = 4,
  /// Red, Green, Blue, Alpha
  RGBA = 6,
}
impl PngColorType {
  /// The number of channels in this type of color.
  #[inline]
  #[must_use]
  pub const fn channel_count(self) -> usize {
    match self {
      Self::Y => 1,
      Self::RGB => 3,
      Self::Index => 1,
      Self::YA => 2,
      Self::RGBA => 4,
    }
  }

  /// If the bit depth given is allowed with this color type.
  #[inline]
  #[must_use]
  pub const fn allows_bit_depth(self, bit_depth: u8) -> bool {
    match self {
      Self::Y => matches!(bit_depth, 1 | 2 | 4 | 8 | 16),
      Self::Index => matches!(bit_depth, 1 | 2 | 4 | 8),
      Self::RGB | Self::YA | Self::RGBA => matches!(bit_depth, 8 | 16),
    }
  }
}
impl TryFrom<u8> for PngColorType {
  type Error = PngError;
  #[inline]
  fn try_from(value: u8) -> Result<Self, Self::Error> {
    Ok(match value {
      0 => PngColorType::Y,
      2 => PngColorType::RGB,
      3 => PngColorType::Index,
      4 => PngColorType::YA,
      6 => PngColorType::RGBA,
      _ => return Err(PngError::IllegalHeader("unknown color type")),
    })
  }
}

/// How the pixel data is laid out within the image data stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum PngInterlaceMethod {
  /// Scanlines go top to bottom.
  NoInterlace = 0,
  /// The image is stored as seven "reduced images".
  ///
  /// Please don't make new interlaced images, they're terrible.
  Adam7 = 1,
}

/// The compression method of the image data. There's only one.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum PngCompressionMethod {
  /// Zlib / Deflate with a 32k window at most.
  #[default]
  Deflate = 0,
}

/// The filter method of the image data. There's only one.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum PngFilterMethod {
  /// Each scanline picks one of five filter types.
  #[default]
  Adaptive = 0,
}

/// The exact byte layout of the `IHDR` chunk's data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Pod, Zeroable)]
#[repr(C)]
pub(crate) struct IhdrData {
  width: U32BE,
  height: U32BE,
  bit_depth: u8,
  color_type: u8,
  compression_method: u8,
  filter_method: u8,
  interlace_method: u8,
}

/// Image Header
///
/// All seven fields are kept so that a decoded header can be written back out
/// without any change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ImageHeader {
  /// width in pixels
  pub width: u32,
  /// height in pixels
  pub height: u32,
  /// bits per channel
  pub bit_depth: u8,
  /// pixel color type
  pub color_type: PngColorType,
  /// if the image data is stored interlaced.
  pub interlace_method: PngInterlaceMethod,
  /// always deflate
  pub compression_method: PngCompressionMethod,
  /// always adaptive
  pub filter_method: PngFilterMethod,
}
impl ImageHeader {
  /// Makes a non-interlaced header, checking the values.
  pub fn new(width: u32, height: u32, bit_depth: u8, color_type: PngColorType) -> PngResult<Self> {
    let out = Self {
      width,
      height,
      bit_depth,
      color_type,
      interlace_method: PngInterlaceMethod::NoInterlace,
      compression_method: PngCompressionMethod::Deflate,
      filter_method: PngFilterMethod::Adaptive,
    };
    out.validate()?;
    Ok(out)
  }

  /// Same header, but using Adam7 interlacing.
  #[inline]
  #[must_use]
  pub const fn with_adam7(self) -> Self {
    Self { interlace_method: PngInterlaceMethod::Adam7, ..self }
  }

  #[inline]
  #[must_use]
  pub const fn is_interlaced(&self) -> bool {
    matches!(self.interlace_method, PngInterlaceMethod::Adam7)
  }

  /// Checks the header against the rules of the format.
  pub fn validate(&self) -> PngResult<()> {
    const MAX_DIMENSION: u32 = (1 << 31) - 1;
    if self.width == 0 || self.height == 0 {
      return Err(PngError::IllegalHeader("width and height must be non-zero"));
    }
    if self.width > MAX_DIMENSION || self.height > MAX_DIMENSION {
      return Err(PngError::IllegalHeader("width or height exceeds 2^31-1"));
    }
    if !self.color_type.allows_bit_depth(self.bit_depth) {
      return Err(PngError::IllegalHeader("bit depth not allowed for this color type"));
    }
    Ok(())
  }

  #[inline]
  #[must_use]
  pub const fn bits_per_pixel(&self) -> usize {
    (self.bit_depth as usize) * self.color_type.channel_count()
  }

  /// Bytes per pixel, rounded up to at least 1.
  ///
  /// Filtering works with this as the distance to the "left" byte.
  #[inline]
  #[must_use]
  pub const fn filter_chunk_size(&self) -> usize {
    let bits = self.bits_per_pixel();
    if bits < 8 {
      1
    } else {
      bits / 8
    }
  }

  /// Bytes in one row of pixels that's `width` pixels wide (no filter byte).
  ///
  /// When pixels are less than 8 bits it's possible to end up with partial
  /// bytes on the end, so we must round up.
  #[inline]
  pub fn bytes_per_row(&self, width: u32) -> PngResult<usize> {
    let bits = self.bits_per_pixel().checked_mul(width as usize).ok_or(PngError::CheckedMath)?;
    Ok(bits / 8 + usize::from(bits % 8 != 0))
  }

  /// Bytes in one row of the full image.
  #[inline]
  pub fn row_bytes(&self) -> PngResult<usize> {
    self.bytes_per_row(self.width)
  }

  /// Gets the size of the image data after zlib decompression.
  ///
  /// That's every row of every pass plus one filter byte per row.
  pub fn filtered_data_len(&self) -> PngResult<usize> {
    let passes: &[(u32, u32)] = if self.is_interlaced() {
      &reduced_image_dimensions(self.width, self.height)[1..]
    } else {
      &[(self.width, self.height)]
    };
    let mut total = 0_usize;
    for &(w, h) in passes {
      if w == 0 || h == 0 {
        continue;
      }
      let line = self.bytes_per_row(w)?.checked_add(1).ok_or(PngError::CheckedMath)?;
      let pass = line.checked_mul(h as usize).ok_or(PngError::CheckedMath)?;
      total = total.checked_add(pass).ok_or(PngError::CheckedMath)?;
    }
    Ok(total)
  }

  /// The 13 bytes of `IHDR` chunk data for this header.
  #[inline]
  #[must_use]
  pub fn to_ihdr_bytes(&self) -> [u8; 13] {
    let data = IhdrData {
      width: U32BE::from_u32(self.width),
      height: U32BE::from_u32(self.height),
      bit_depth: self.bit_depth,
      color_type: self.color_type as u8,
      compression_method: self.compression_method as u8,
      filter_method: self.filter_method as u8,
      interlace_method: self.interlace_method as u8,
    };
    bytemuck::cast(data)
  }
}
impl TryFrom<&[u8]> for ImageHeader {
  type Error = PngError;
  fn try_from(value: &[u8]) -> Result<Self, Self::Error> {
    let data: IhdrData = bytemuck::try_pod_read_unaligned(value)
      .map_err(|_| PngError::IllegalHeader("chunk must be 13 bytes"))?;
    let out = Self {
      width: data.width.to_u32(),
      height: data.height.to_u32(),
      bit_depth: data.bit_depth,
      color_type: PngColorType::try_from(data.color_type)?,
      interlace_method: match data.interlace_method {
        0 => PngInterlaceMethod::NoInterlace,
        1 => PngInterlaceMethod::Adam7,
        _ => return Err(PngError::IllegalHeader("unknown interlace method")),
      },
      compression_method: match data.compression_method {
        0 => PngCompressionMethod::Deflate,
        _ => return Err(PngError::IllegalHeader("unknown compression method")),
      },
      filter_method: match data.filter_method {
        0 => PngFilterMethod::Adaptive,
        _ => return Err(PngError::IllegalHeader("unknown filter method")),
      },
    };
    out.validate()?;
    Ok(out)
  }
}
