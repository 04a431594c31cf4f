use super::*;

/// Settings for [`encode_png`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EncodeOptions {
  /// zlib compression level, 0 (store) through 10 (slowest). Larger values
  /// are clamped to 10.
  pub compression_level: u8,
  /// Largest payload of a single `IDAT` chunk. 0 is treated as 1.
  pub max_idat_len: usize,
  /// How each scanline picks its filter.
  pub filter: FilterStrategy,
}
impl Default for EncodeOptions {
  #[inline]
  fn default() -> Self {
    Self { compression_level: 6, max_idat_len: 8 * 1024, filter: FilterStrategy::Adaptive }
  }
}

/// Encodes an image into PNG bytes.
///
/// Chunk order is `IHDR`, `PLTE` and `tRNS` (if present), one `tEXt` per
/// metadata entry, the `IDAT` chunks, and then `IEND`. The header is written
/// exactly as given.
///
/// ## Failure
/// * The pixel buffer doesn't match the header's geometry.
/// * A palette image has no palette.
/// * A metadata key or value can't go in a `tEXt` chunk.
pub fn encode_png(image: &DecodedImage, options: &EncodeOptions) -> PngResult<Vec<u8>> {
  let header = &image.header;
  header.validate()?;
  image.pixels.check_shape(header)?;
  if header.color_type == PngColorType::Index && image.palette.is_none() {
    return Err(PngError::MissingPalette);
  }
  let text_chunks = image
    .metadata
    .iter()
    .map(|(key, value)| build_text_chunk(key, value))
    .collect::<PngResult<Vec<_>>>()?;

  let filtered = filter_pixels(header, &image.pixels, options.filter)?;
  let level = options.compression_level.min(10);
  let zlib = miniz_oxide::deflate::compress_to_vec_zlib(&filtered, level);
  let max_idat_len = options.max_idat_len.clamp(1, MAX_CHUNK_LEN);

  let mut png = Vec::new();
  png.try_reserve(PNG_SIGNATURE.len() + zlib.len() + 1024)?;
  png.extend_from_slice(&PNG_SIGNATURE);
  write_chunk(&mut png, ChunkType::IHDR, &header.to_ihdr_bytes())?;
  if let Some(palette) = &image.palette {
    write_chunk(&mut png, ChunkType::PLTE, palette)?;
  }
  if let Some(transparency) = &image.transparency {
    write_chunk(&mut png, ChunkType::tRNS, transparency)?;
  }
  for text in &text_chunks {
    write_chunk(&mut png, ChunkType::tEXt, text)?;
  }
  for idat in zlib.chunks(max_idat_len) {
    write_chunk(&mut png, ChunkType::IDAT, idat)?;
  }
  write_chunk(&mut png, ChunkType::IEND, &[])?;
  debug!(
    filtered_len = filtered.len(),
    zlib_len = zlib.len(),
    idat_chunks = zlib.len().div_ceil(max_idat_len),
    text_chunks = text_chunks.len(),
    total_len = png.len(),
    "encoded image"
  );
  Ok(png)
}

/// Filters the pixels, one reduced image at a time when interlaced.
fn filter_pixels(
  header: &ImageHeader, pixels: &PixelBuffer, strategy: FilterStrategy,
) -> PngResult<Vec<u8>> {
  if !header.is_interlaced() {
    return filter_image(header, pixels.as_bytes(), pixels.row_bytes(), strategy);
  }
  let mut filtered = Vec::new();
  filtered.try_reserve(header.filtered_data_len()?)?;
  let dims = reduced_image_dimensions(header.width, header.height);
  for (image_level, &(w, h)) in dims.iter().enumerate().skip(1) {
    if w == 0 || h == 0 {
      continue;
    }
    let pass_data = adam7::gather_pass(header, image_level, pixels)?;
    filtered.extend(filter_image(header, &pass_data, header.bytes_per_row(w)?, strategy)?);
  }
  Ok(filtered)
}
