use pngmeta::{png::*, *};

use super::{fixture, rand_bytes, scratch_copy};

fn set(pairs: &[(&str, &str)]) -> MetadataSet {
  pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
}

fn pixels_of(path: &std::path::Path) -> PixelBuffer {
  decode_image(&std::fs::read(path).unwrap()).unwrap().pixels
}

#[test]
fn test_read_fixture_metadata() {
  let metadata = read_metadata(fixture("rgb8_text.png")).unwrap();
  assert_eq!(metadata, set(&[("Title", "Hello"), ("Author", "Ren\u{e9}")]));
  assert!(read_metadata(fixture("grey16_plain.png")).unwrap().is_empty());
}

#[test]
fn test_empty_write_round_trip() {
  let dir = tempfile::tempdir().unwrap();
  let path = scratch_copy(dir.path(), "grey16_plain.png");
  let before = pixels_of(&path);
  write_metadata(&path, &MetadataSet::new()).unwrap();
  assert!(read_metadata(&path).unwrap().is_empty());
  assert_eq!(pixels_of(&path), before);
}

#[test]
fn test_write_merges_into_existing() {
  let dir = tempfile::tempdir().unwrap();
  let path = scratch_copy(dir.path(), "rgb8_text.png");
  let before = decode_image(&std::fs::read(&path).unwrap()).unwrap();
  write_metadata(&path, &set(&[("Title", "Changed"), ("Software", "pngmeta")])).unwrap();
  let after = decode_image(&std::fs::read(&path).unwrap()).unwrap();
  assert_eq!(
    after.metadata,
    set(&[("Title", "Changed"), ("Author", "Ren\u{e9}"), ("Software", "pngmeta")])
  );
  assert_eq!(after.header, before.header);
  assert_eq!(after.pixels, before.pixels);

  // and again on top of that
  write_metadata(&path, &set(&[("b", "3"), ("c", "4")])).unwrap();
  let metadata = read_metadata(&path).unwrap();
  assert_eq!(metadata.len(), 5);
  assert_eq!(metadata["Title"], "Changed");
  assert_eq!(metadata["c"], "4");
}

#[test]
fn test_write_keeps_palette_and_interlacing() {
  let dir = tempfile::tempdir().unwrap();
  let path = scratch_copy(dir.path(), "palette4_adam7.png");
  let before = decode_image(&std::fs::read(&path).unwrap()).unwrap();
  write_metadata(&path, &set(&[("Comment", "rewritten")])).unwrap();
  let after = decode_image(&std::fs::read(&path).unwrap()).unwrap();
  assert_eq!(after.header.to_ihdr_bytes(), before.header.to_ihdr_bytes());
  assert_eq!(after.palette, before.palette);
  assert_eq!(after.transparency, before.transparency);
  assert_eq!(after.pixels, before.pixels);
  assert_eq!(after.metadata["Comment"], "rewritten");
}

#[test]
fn test_pixels_survive_every_format() {
  let dir = tempfile::tempdir().unwrap();
  let formats = [
    (PngColorType::Y, &[1_u8, 2, 4, 8, 16][..]),
    (PngColorType::RGB, &[8, 16]),
    (PngColorType::Index, &[1, 2, 4, 8]),
    (PngColorType::YA, &[8, 16]),
    (PngColorType::RGBA, &[8, 16]),
  ];
  for (color_type, depths) in formats {
    for &bit_depth in depths {
      for interlaced in [false, true] {
        let mut header = ImageHeader::new(11, 7, bit_depth, color_type).unwrap();
        if interlaced {
          header = header.with_adam7();
        }
        let row_bytes = header.row_bytes().unwrap();
        let mut data = rand_bytes(row_bytes * 7);
        // the unused bits at the end of a packed row aren't kept by interlacing
        let used_bits = header.bits_per_pixel() * 11 % 8;
        if used_bits != 0 {
          for row in data.chunks_exact_mut(row_bytes) {
            row[row_bytes - 1] &= !(0xFF_u8 >> used_bits);
          }
        }
        let image = DecodedImage {
          header,
          palette: (color_type == PngColorType::Index).then(|| rand_bytes(3 * 256)),
          transparency: None,
          pixels: PixelBuffer::from_vec(data, row_bytes).unwrap(),
          metadata: set(&[("Format", "original")]),
        };
        let path = dir.path().join(format!("{color_type:?}_{bit_depth}_{interlaced}.png"));
        std::fs::write(&path, encode_png(&image, &EncodeOptions::default()).unwrap()).unwrap();

        write_metadata(&path, &set(&[("Format", "updated"), ("Extra", "x")])).unwrap();
        let after = decode_image(&std::fs::read(&path).unwrap()).unwrap();
        assert_eq!(after.header, image.header, "{path:?}");
        assert_eq!(after.pixels, image.pixels, "{path:?}");
        assert_eq!(after.palette, image.palette, "{path:?}");
        assert_eq!(after.metadata, set(&[("Format", "updated"), ("Extra", "x")]));
      }
    }
  }
}

#[test]
fn test_compressed_text_aborts_write() {
  let dir = tempfile::tempdir().unwrap();
  let path = scratch_copy(dir.path(), "ztxt.png");
  let original = std::fs::read(&path).unwrap();
  let e = read_metadata(&path).unwrap_err();
  assert_eq!(e.kind(), ErrorKind::UnsupportedCompression);
  assert_eq!(e.compression_code(), Some(0));
  let e = write_metadata(&path, &set(&[("a", "b")])).unwrap_err();
  assert_eq!(e.compression_code(), Some(0));
  assert_eq!(std::fs::read(&path).unwrap(), original);
}

#[test]
fn test_failed_write_leaves_file_alone() {
  let dir = tempfile::tempdir().unwrap();
  let path = scratch_copy(dir.path(), "rgb8_text.png");
  let original = std::fs::read(&path).unwrap();
  for updates in [set(&[("", "empty key")]), set(&[("k", "nul\0inside")])] {
    let e = write_metadata(&path, &updates).unwrap_err();
    assert_eq!(e.kind(), ErrorKind::Format);
    assert!(e.to_string().contains("rgb8_text.png"), "{e}");
  }
  assert_eq!(std::fs::read(&path).unwrap(), original);
  // no temporary files left behind
  assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
}

#[test]
fn test_not_a_png_is_format_error() {
  let dir = tempfile::tempdir().unwrap();
  let path = dir.path().join("fake.png");
  std::fs::write(&path, b"definitely not a png").unwrap();
  assert_eq!(read_metadata(&path).unwrap_err().kind(), ErrorKind::Format);
  assert_eq!(write_metadata(&path, &MetadataSet::new()).unwrap_err().kind(), ErrorKind::Format);
  assert_eq!(std::fs::read(&path).unwrap(), b"definitely not a png");
}

#[test]
fn test_usage_error_before_any_io() {
  let dir = tempfile::tempdir().unwrap();
  let path = scratch_copy(dir.path(), "rgb8_text.png");
  let original = std::fs::read(&path).unwrap();
  let e = parse_assignments(["Title=ok", "novalueseparator"]).unwrap_err();
  assert_eq!(e.kind(), ErrorKind::Usage);
  assert!(e.to_string().contains("novalueseparator"));
  assert_eq!(std::fs::read(&path).unwrap(), original);
}

#[cfg(unix)]
#[test]
fn test_write_keeps_permissions() {
  use std::os::unix::fs::PermissionsExt;
  let dir = tempfile::tempdir().unwrap();
  let path = scratch_copy(dir.path(), "grey16_plain.png");
  std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o640)).unwrap();
  write_metadata(&path, &set(&[("k", "v")])).unwrap();
  let mode = std::fs::metadata(&path).unwrap().permissions().mode();
  assert_eq!(mode & 0o777, 0o640);
}

#[cfg(unix)]
#[test]
fn test_write_through_symlink() {
  let dir = tempfile::tempdir().unwrap();
  let real = scratch_copy(dir.path(), "rgb8_text.png");
  let link = dir.path().join("link.png");
  std::os::unix::fs::symlink(&real, &link).unwrap();
  write_metadata(&link, &set(&[("k", "v")])).unwrap();
  assert!(std::fs::symlink_metadata(&link).unwrap().file_type().is_symlink());
  assert_eq!(read_metadata(&real).unwrap()["k"], "v");
  assert_eq!(read_metadata(&link).unwrap()["Title"], "Hello");
}

/// Puts one extra chunk right after `IHDR`.
fn with_chunk_after_header(name: &str, chunk_ty: ChunkType, data: &[u8]) -> Vec<u8> {
  let png = std::fs::read(fixture(name)).unwrap();
  let ihdr_end = 8 + 12 + 13;
  let mut out = png[..ihdr_end].to_vec();
  write_chunk(&mut out, chunk_ty, data).unwrap();
  out.extend_from_slice(&png[ihdr_end..]);
  out
}

#[test]
fn test_latin1_keyword_survives_write() {
  let dir = tempfile::tempdir().unwrap();
  let path = dir.path().join("latin1.png");
  let mut data = vec![0xE9_u8; 79];
  data.extend_from_slice(b"\0value");
  let png = with_chunk_after_header("grey16_plain.png", ChunkType::tEXt, &data);
  std::fs::write(&path, png).unwrap();
  let key = "\u{e9}".repeat(79);
  assert_eq!(read_metadata(&path).unwrap(), set(&[(key.as_str(), "value")]));
  write_metadata(&path, &set(&[("k", "v")])).unwrap();
  assert_eq!(read_metadata(&path).unwrap(), set(&[(key.as_str(), "value"), ("k", "v")]));
}

#[test]
fn test_empty_keyword_fails_on_read_too() {
  let dir = tempfile::tempdir().unwrap();
  let path = dir.path().join("empty_key.png");
  let png = with_chunk_after_header("grey16_plain.png", ChunkType::tEXt, b"\0orphan");
  std::fs::write(&path, &png).unwrap();
  assert_eq!(read_metadata(&path).unwrap_err().kind(), ErrorKind::Format);
  assert_eq!(write_metadata(&path, &set(&[("k", "v")])).unwrap_err().kind(), ErrorKind::Format);
  assert_eq!(std::fs::read(&path).unwrap(), png);
}
