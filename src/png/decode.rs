use super::*;

use miniz_oxide::inflate::TINFLStatus;

/// Walks the chunk stream: signature, then `IHDR`, then everything up to
/// `IEND`.
///
/// Every chunk after the header that passes its CRC check (other than `IEND`)
/// is given to `on_chunk`. Ancillary chunks with a bad CRC are skipped, a
/// critical chunk with a bad CRC is an error.
fn walk_chunks<'b>(
  bytes: &'b [u8], mut on_chunk: impl FnMut(RawChunk<'b>) -> PngResult<()>,
) -> PngResult<ImageHeader> {
  let mut it = RawChunkIter::from_png_bytes(bytes)?;
  let first = it.next().ok_or(PngError::UnexpectedEndOfInput)??;
  if first.chunk_type() != ChunkType::IHDR {
    return Err(PngError::FirstChunkNotIHDR);
  }
  first.verify_crc()?;
  let header = ImageHeader::try_from(first.data())?;
  trace!(?header, "IHDR");
  for chunk in it {
    let chunk = chunk?;
    trace!(chunk_type = %chunk.chunk_type(), len = chunk.data().len(), "chunk");
    if !chunk.verify_crc()? {
      continue;
    }
    if chunk.chunk_type() == ChunkType::IEND {
      return Ok(header);
    }
    on_chunk(chunk)?;
  }
  Err(PngError::UnexpectedEndOfInput)
}

/// Adds a text chunk's entry (if it is a text chunk) to the set.
///
/// Later chunks overwrite earlier ones with the same key.
fn collect_text(metadata: &mut MetadataSet, chunk: &RawChunk<'_>) -> PngResult<()> {
  if let Some(TextEntry { key, value, compression }) =
    parse_text_chunk(chunk.chunk_type(), chunk.data())?
  {
    trace!(%key, code = compression.code(), "text entry");
    metadata.insert(key, value);
  }
  Ok(())
}

/// Reads just the text metadata out of PNG bytes.
///
/// The image data is walked past but never inflated.
///
/// ## Failure
/// * [`PngError::UnsupportedCompression`] on the first compressed text chunk.
/// * Any structural problem in the chunk stream.
pub fn decode_metadata(bytes: &[u8]) -> PngResult<MetadataSet> {
  let mut metadata = MetadataSet::new();
  walk_chunks(bytes, |chunk| collect_text(&mut metadata, &chunk))?;
  debug!(entries = metadata.len(), "decoded metadata");
  Ok(metadata)
}

/// Fully decodes PNG bytes: header, structural chunks, pixels, and metadata.
pub fn decode_image(bytes: &[u8]) -> PngResult<DecodedImage> {
  let mut metadata = MetadataSet::new();
  let mut palette: Option<Vec<u8>> = None;
  let mut transparency: Option<Vec<u8>> = None;
  let mut idat: Vec<&[u8]> = Vec::new();
  let header = walk_chunks(bytes, |chunk| {
    match chunk.chunk_type() {
      ChunkType::IDAT => idat.push(chunk.data()),
      ChunkType::PLTE => palette = Some(chunk.data().to_vec()),
      ChunkType::tRNS => transparency = Some(chunk.data().to_vec()),
      _ => collect_text(&mut metadata, &chunk)?,
    }
    Ok(())
  })?;
  if header.color_type == PngColorType::Index && palette.is_none() {
    return Err(PngError::MissingPalette);
  }

  let filtered_len = header.filtered_data_len()?;
  let mut zlib: Vec<u8> = Vec::new();
  zlib.try_reserve(idat.iter().map(|d| d.len()).sum())?;
  idat.iter().for_each(|d| zlib.extend_from_slice(d));
  // The output only grows as data actually inflates, and the limit is one
  // byte past the expected size so that a stream which is too long shows up
  // as a size mismatch.
  let limit = filtered_len.saturating_add(1);
  let mut filtered = match miniz_oxide::inflate::decompress_to_vec_zlib_with_limit(&zlib, limit) {
    Ok(filtered) => filtered,
    Err(e) if e.status == TINFLStatus::HasMoreOutput => {
      let actual = e.output.len();
      return Err(PngError::ImageDataWrongSize { expected: filtered_len, actual });
    }
    Err(e) => return Err(PngError::Inflate(e.status)),
  };
  if filtered.len() != filtered_len {
    return Err(PngError::ImageDataWrongSize { expected: filtered_len, actual: filtered.len() });
  }

  let pixels = unfilter_into_pixels(&header, &mut filtered)?;
  debug!(
    width = header.width,
    height = header.height,
    bit_depth = header.bit_depth,
    color_type = ?header.color_type,
    interlaced = header.is_interlaced(),
    idat_chunks = idat.len(),
    entries = metadata.len(),
    "decoded image"
  );
  Ok(DecodedImage { header, palette, transparency, pixels, metadata })
}

/// Unfilters the decompressed data and lays the pixels out as full rows.
fn unfilter_into_pixels(header: &ImageHeader, filtered: &mut [u8]) -> PngResult<PixelBuffer> {
  let mut pixels = PixelBuffer::for_header(header)?;
  let fcs = header.filter_chunk_size();
  if !header.is_interlaced() {
    let row_bytes = header.row_bytes()?;
    unfilter_in_place(filtered, row_bytes, fcs)?;
    for (line, row) in filtered.chunks_exact(row_bytes + 1).zip(pixels.rows_mut()) {
      row.copy_from_slice(&line[1..]);
    }
    return Ok(pixels);
  }
  let dims = reduced_image_dimensions(header.width, header.height);
  let mut offset = 0;
  for (image_level, &(w, h)) in dims.iter().enumerate().skip(1) {
    if w == 0 || h == 0 {
      continue;
    }
    let pass_row_bytes = header.bytes_per_row(w)?;
    let pass_len = (pass_row_bytes + 1) * h as usize;
    let pass = &mut filtered[offset..offset + pass_len];
    offset += pass_len;
    unfilter_in_place(pass, pass_row_bytes, fcs)?;
    let mut pass_data = Vec::new();
    pass_data.try_reserve(pass_row_bytes * h as usize)?;
    for line in pass.chunks_exact(pass_row_bytes + 1) {
      pass_data.extend_from_slice(&line[1..]);
    }
    adam7::scatter_pass(header, image_level, &pass_data, &mut pixels)?;
  }
  Ok(pixels)
}
