//! Adaptive filtering for encoding.
//!
//! Each scanline is written with a leading filter type byte. Which filter
//! works best depends on the data, so for every line all five are tried and
//! the one with the smallest sum of absolute (signed) residuals is kept. This
//! is the usual heuristic from the PNG spec's encoder recommendations.

use super::*;

/// The five adaptive filter types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum FilterType {
  None = 0,
  Sub = 1,
  Up = 2,
  Average = 3,
  Paeth = 4,
}
impl FilterType {
  const ALL: [Self; 5] = [Self::None, Self::Sub, Self::Up, Self::Average, Self::Paeth];
}

/// How the encoder picks a filter for each scanline.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum FilterStrategy {
  /// Use a fixed filter for every line.
  Fixed(FilterType),
  /// Minimum sum of absolute differences, except that images with less than 8
  /// bits per pixel, or palette images, always use `None`.
  #[default]
  Adaptive,
}

/// Applies `filter` to `row` and writes the filter byte plus the filtered
/// bytes to the end of `out`.
///
/// `prev` is the previous (unfiltered) row, or empty for the first row.
fn filter_row(filter: FilterType, row: &[u8], prev: &[u8], bpp: usize, out: &mut Vec<u8>) {
  out.push(filter as u8);
  let up = |i: usize| prev.get(i).copied().unwrap_or(0);
  let left = |i: usize| if i >= bpp { row[i - bpp] } else { 0 };
  match filter {
    FilterType::None => out.extend_from_slice(row),
    FilterType::Sub => out.extend(row.iter().enumerate().map(|(i, &x)| x.wrapping_sub(left(i)))),
    FilterType::Up => out.extend(row.iter().enumerate().map(|(i, &x)| x.wrapping_sub(up(i)))),
    FilterType::Average => out.extend(
      row
        .iter()
        .enumerate()
        .map(|(i, &x)| x.wrapping_sub(((left(i) as u16 + up(i) as u16) / 2) as u8)),
    ),
    FilterType::Paeth => out.extend(row.iter().enumerate().map(|(i, &x)| {
      let c = if i >= bpp { up(i - bpp) } else { 0 };
      x.wrapping_sub(paeth_predictor(left(i), up(i), c))
    })),
  }
}

/// Sum of the filtered bytes taken as signed values.
#[inline]
fn residual_score(filtered: &[u8]) -> u64 {
  filtered.iter().map(|&b| u64::from((b as i8).unsigned_abs())).sum()
}

/// Filters `rows` (each `row_bytes` long) into a fresh buffer of filterlines.
pub fn filter_image(
  header: &ImageHeader, rows: &[u8], row_bytes: usize, strategy: FilterStrategy,
) -> PngResult<Vec<u8>> {
  let mut out = Vec::new();
  if row_bytes == 0 {
    return Ok(out);
  }
  let line_count = rows.len() / row_bytes;
  out.try_reserve(line_count * (row_bytes + 1))?;
  let bpp = header.filter_chunk_size();
  let strategy = match strategy {
    FilterStrategy::Adaptive
      if header.bit_depth < 8 || header.color_type == PngColorType::Index =>
    {
      FilterStrategy::Fixed(FilterType::None)
    }
    other => other,
  };
  let mut scratch = Vec::with_capacity(row_bytes + 1);
  let mut best = Vec::with_capacity(row_bytes + 1);
  let mut prev: &[u8] = &[];
  for row in rows.chunks_exact(row_bytes) {
    match strategy {
      FilterStrategy::Fixed(filter) => filter_row(filter, row, prev, bpp, &mut out),
      FilterStrategy::Adaptive => {
        let mut best_score = u64::MAX;
        for filter in FilterType::ALL {
          scratch.clear();
          filter_row(filter, row, prev, bpp, &mut scratch);
          let score = residual_score(&scratch[1..]);
          if score < best_score {
            best_score = score;
            core::mem::swap(&mut best, &mut scratch);
          }
        }
        out.extend_from_slice(&best);
      }
    }
    prev = row;
  }
  Ok(out)
}
