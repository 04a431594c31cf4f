//! From the PNG spec:
//!
//! > Filters are applied to **bytes**, not to pixels, regardless of the bit
//! > depth or color type of the image.

use super::*;

/// Reconstructs filtered scanlines in place.
///
/// * `filtered` is `height` lines that are each a filter type byte followed
///   by `row_bytes` bytes.
/// * `filter_chunk_size` is the distance back to the "left" byte.
///
/// After this returns every filter byte is set to 0 (the "None" filter), and
/// the rest of each line holds the actual pixel data.
pub fn unfilter_in_place(
  filtered: &mut [u8], row_bytes: usize, filter_chunk_size: usize,
) -> PngResult<()> {
  let line_len = row_bytes + 1;
  if filtered.len() % line_len != 0 {
    return Err(PngError::ImageDataWrongSize {
      expected: filtered.len() - filtered.len() % line_len,
      actual: filtered.len(),
    });
  }
  let bpp = filter_chunk_size;
  let mut previous_pixel_line_data: &[u8] = &[];
  for filterline in filtered.chunks_exact_mut(line_len) {
    let (filter_byte, pixel_line_data) = match filterline.split_first_mut() {
      Some(x) => x,
      None => continue,
    };
    // On the first line the "previous line" is an implied line of zeros.
    let up = |i: usize| previous_pixel_line_data.get(i).copied().unwrap_or(0);
    match *filter_byte {
      0 => (),
      1 => {
        for i in bpp..pixel_line_data.len() {
          pixel_line_data[i] = reconstruct_sub(pixel_line_data[i], pixel_line_data[i - bpp]);
        }
      }
      2 => {
        for (i, x) in pixel_line_data.iter_mut().enumerate() {
          *x = reconstruct_up(*x, up(i));
        }
      }
      3 => {
        for i in 0..pixel_line_data.len() {
          let a = if i >= bpp { pixel_line_data[i - bpp] } else { 0 };
          pixel_line_data[i] = reconstruct_average(pixel_line_data[i], a, up(i));
        }
      }
      4 => {
        for i in 0..pixel_line_data.len() {
          let (a, c) = if i >= bpp { (pixel_line_data[i - bpp], up(i - bpp)) } else { (0, 0) };
          pixel_line_data[i] = reconstruct_paeth(pixel_line_data[i], a, up(i), c);
        }
      }
      other => return Err(PngError::IllegalAdaptiveFilterType(other)),
    }
    *filter_byte = 0;
    previous_pixel_line_data = pixel_line_data;
  }
  Ok(())
}

/// Reconstruct Filter Type 1
///
/// * `fx` filtered X
/// * `ra` reconstructed `a`:
///   * Bit Depth <8: the byte before this byte
///   * Bit Depth >=8: the corresponding byte from the pixel to the left of this
///     pixel (or skip reconstruction if this is the leftmost pixel)
#[inline]
const fn reconstruct_sub(fx: u8, ra: u8) -> u8 {
  fx.wrapping_add(ra)
}

/// Reconstruct Filter Type 2
///
/// * `fx` filtered X
/// * `rb` reconstructed `b`: The byte corresponding to this byte within the
///   previous scanline.
#[inline]
const fn reconstruct_up(fx: u8, rb: u8) -> u8 {
  fx.wrapping_add(rb)
}

/// Reconstruct Filter Type 3
///
/// The average is computed without overflow, then truncated.
#[inline]
const fn reconstruct_average(fx: u8, ra: u8, rb: u8) -> u8 {
  fx.wrapping_add(((ra as u16 + rb as u16) / 2) as u8)
}

/// Reconstruct Filter Type 4
///
/// * `rc` reconstructed `c`: the byte to the left of `rb`.
#[inline]
const fn reconstruct_paeth(fx: u8, ra: u8, rb: u8, rc: u8) -> u8 {
  fx.wrapping_add(paeth_predictor(ra, rb, rc))
}

/// The Paeth filter function computes a simple linear function of the three
/// neighboring pixels (left `a`, above `b`, upper left `c`).
///
/// The output is the "predictor" of the neighboring pixel closest to the
/// computed value.
///
/// If any neighboring pixel isn't present because this is the top or left edge
/// of the image just substitute 0 in that position.
#[inline]
#[must_use]
pub(crate) const fn paeth_predictor(a: u8, b: u8, c: u8) -> u8 {
  // Note: The PNG spec says "The calculations within the PaethPredictor
  // function shall be performed exactly, without overflow.", so we use i32 math
  // here, which is wide enough to never give us trouble no matter what the u8
  // input values are.
  let a_ = a as i32;
  let b_ = b as i32;
  let c_ = c as i32;
  let p = a_ + b_ - c_;
  let pa = (p - a_).abs();
  let pb = (p - b_).abs();
  let pc = (p - c_).abs();
  // The order of these tests is also fixed by the spec.
  if pa <= pb && pa <= pc {
    a
  } else if pb <= pc {
    b
  } else {
    c
  }
}
