//! Adam7 interlacing.
//!
//! ```txt
//! 1 6 4 6 2 6 4 6
//! 7 7 7 7 7 7 7 7
//! 5 6 5 6 5 6 5 6
//! 7 7 7 7 7 7 7 7
//! 3 6 4 6 3 6 4 6
//! 7 7 7 7 7 7 7 7
//! 5 6 5 6 5 6 5 6
//! 7 7 7 7 7 7 7 7
//! ```
//!
//! An interlaced image is stored as seven "reduced images", one per number in
//! the pattern above. Each reduced image is filtered on its own, so the codec
//! unfilters a reduced image and then scatters its pixels into the full image
//! (or gathers and then filters, when encoding).

use super::*;

/// Given the dimensions of the full PNG image, computes the size of each
/// reduced image.
///
/// The output uses index 0 as the base image size, and indexes 1 through 7 for
/// the size of reduced images 1 through 7.
#[inline]
#[must_use]
pub(crate) const fn reduced_image_dimensions(
  full_width: u32, full_height: u32,
) -> [(u32, u32); 8] {
  let full_patterns_wide = full_width / 8;
  let full_patterns_high = full_height / 8;
  //
  let partial_pattern_width = full_width % 8;
  let partial_pattern_height = full_height % 8;
  //
  let zero = (full_width, full_height);
  //
  let first = (
    full_patterns_wide + (partial_pattern_width + 7) / 8,
    full_patterns_high + (partial_pattern_height + 7) / 8,
  );
  let second = (
    full_patterns_wide + (partial_pattern_width + 3) / 8,
    full_patterns_high + (partial_pattern_height + 7) / 8,
  );
  let third = (
    full_patterns_wide * 2 + ((partial_pattern_width + 3) / 4),
    full_patterns_high + ((partial_pattern_height + 3) / 8),
  );
  let fourth = (
    full_patterns_wide * 2 + (partial_pattern_width + 1) / 4,
    full_patterns_high * 2 + (partial_pattern_height + 3) / 4,
  );
  let fifth = (
    full_patterns_wide * 4 + ((partial_pattern_width + 1) / 2),
    full_patterns_high * 2 + (partial_pattern_height + 1) / 4,
  );
  let sixth = (
    full_patterns_wide * 4 + partial_pattern_width / 2,
    full_patterns_high * 4 + ((partial_pattern_height + 1) / 2),
  );
  let seventh = (
    full_patterns_wide * 8 + partial_pattern_width,
    full_patterns_high * 4 + (partial_pattern_height / 2),
  );
  //
  [zero, first, second, third, fourth, fifth, sixth, seventh]
}

/// Converts a reduced image location into the full image location.
///
/// For consistency with [reduced_image_dimensions], an `image_level` of 0
/// gives back the input unchanged.
///
/// ## Panics
/// * If the image level given exceeds 7.
#[inline]
#[must_use]
pub(crate) const fn interlaced_pos_to_full_pos(
  image_level: usize, reduced_x: u32, reduced_y: u32,
) -> (u32, u32) {
  #[allow(clippy::identity_op)]
  match image_level {
    0 /* full image */ => (reduced_x, reduced_y),
    1 => (reduced_x * 8 + 0, reduced_y * 8 + 0),
    2 => (reduced_x * 8 + 4, reduced_y * 8 + 0),
    3 => (reduced_x * 4 + 0, reduced_y * 8 + 4),
    4 => (reduced_x * 4 + 2, reduced_y * 4 + 0),
    5 => (reduced_x * 2 + 0, reduced_y * 4 + 2),
    6 => (reduced_x * 2 + 1, reduced_y * 2 + 0),
    7 => (reduced_x * 1 + 0, reduced_y * 2 + 1),
    _ => panic!("reduced image level must be 1 through 7")
  }
}

/// Copies pixel `src_x` of `src` into pixel `dst_x` of `dst`.
///
/// Pixels smaller than a byte are packed big-end first within each byte.
#[inline]
fn copy_pixel(src: &[u8], src_x: usize, dst: &mut [u8], dst_x: usize, bits_per_pixel: usize) {
  if bits_per_pixel >= 8 {
    let n = bits_per_pixel / 8;
    dst[dst_x * n..(dst_x + 1) * n].copy_from_slice(&src[src_x * n..(src_x + 1) * n]);
  } else {
    let mask = (1_u8 << bits_per_pixel) - 1;
    let src_bit = src_x * bits_per_pixel;
    let src_shift = 8 - bits_per_pixel - (src_bit % 8);
    let value = (src[src_bit / 8] >> src_shift) & mask;
    let dst_bit = dst_x * bits_per_pixel;
    let dst_shift = 8 - bits_per_pixel - (dst_bit % 8);
    let byte = &mut dst[dst_bit / 8];
    *byte = (*byte & !(mask << dst_shift)) | (value << dst_shift);
  }
}

/// Places the unfiltered rows of reduced image `image_level` into the full
/// image.
///
/// `pass_data` is the reduced image's rows back to back (no filter bytes).
pub(crate) fn scatter_pass(
  header: &ImageHeader, image_level: usize, pass_data: &[u8], out: &mut PixelBuffer,
) -> PngResult<()> {
  let (pass_width, pass_height) =
    reduced_image_dimensions(header.width, header.height)[image_level];
  if pass_width == 0 || pass_height == 0 {
    return Ok(());
  }
  let bpp = header.bits_per_pixel();
  let pass_row_bytes = header.bytes_per_row(pass_width)?;
  for (reduced_y, pass_row) in pass_data.chunks_exact(pass_row_bytes).enumerate() {
    for reduced_x in 0..pass_width {
      let (x, y) = interlaced_pos_to_full_pos(image_level, reduced_x, reduced_y as u32);
      copy_pixel(pass_row, reduced_x as usize, out.row_mut(y as usize), x as usize, bpp);
    }
  }
  Ok(())
}

/// Pulls the pixels of reduced image `image_level` out of the full image.
///
/// The output is the reduced image's rows back to back (no filter bytes). The
/// unused bits at the end of each row are zero.
pub(crate) fn gather_pass(
  header: &ImageHeader, image_level: usize, full: &PixelBuffer,
) -> PngResult<Vec<u8>> {
  let (pass_width, pass_height) =
    reduced_image_dimensions(header.width, header.height)[image_level];
  if pass_width == 0 || pass_height == 0 {
    return Ok(Vec::new());
  }
  let bpp = header.bits_per_pixel();
  let pass_row_bytes = header.bytes_per_row(pass_width)?;
  let mut pass_data = Vec::new();
  pass_data.try_reserve(pass_row_bytes * pass_height as usize)?;
  pass_data.resize(pass_row_bytes * pass_height as usize, 0);
  for (reduced_y, pass_row) in pass_data.chunks_exact_mut(pass_row_bytes).enumerate() {
    for reduced_x in 0..pass_width {
      let (x, y) = interlaced_pos_to_full_pos(image_level, reduced_x, reduced_y as u32);
      copy_pixel(full.row(y as usize), x as usize, pass_row, reduced_x as usize, bpp);
    }
  }
  Ok(pass_data)
}
