use pngmeta::{png::*, PngError};
use walkdir::WalkDir;

use super::{fixture, rand_bytes};

fn read_fixture(name: &str) -> Vec<u8> {
  std::fs::read(fixture(name)).unwrap()
}

#[test]
fn test_RawChunkIter_no_panics() {
  // iter ALL files in the test folder, even non-png files shouldn't panic it.
  for entry in WalkDir::new("tests/").into_iter().filter_map(|e| e.ok()) {
    println!("{}", entry.path().display());
    let v = match std::fs::read(entry.path()) {
      Ok(v) => v,
      Err(e) => {
        println!("Error reading file: {e:?}");
        continue;
      }
    };
    for _ in RawChunkIter::new(&v) {
      //
    }
    let _ = decode_metadata(&v);
    let _ = decode_image(&v);
  }
  // even totally random data should never panic the iterator!
  for _ in 0..10 {
    let v = rand_bytes(1024);
    for _ in RawChunkIter::new(&v) {
      //
    }
    let mut with_signature = PNG_SIGNATURE.to_vec();
    with_signature.extend_from_slice(&v);
    let _ = decode_image(&with_signature);
  }
}

#[test]
fn test_decode_rgb8_with_text() {
  let png = read_fixture("rgb8_text.png");
  let image = decode_image(&png).unwrap();
  assert_eq!(image.header, ImageHeader::new(3, 2, 8, PngColorType::RGB).unwrap());
  assert_eq!(image.pixels.row(0), &[255, 0, 0, 0, 255, 0, 0, 0, 255]);
  assert_eq!(image.pixels.row(1), &[10, 20, 30, 40, 50, 60, 70, 80, 90]);
  assert_eq!(image.metadata["Title"], "Hello");
  // Latin-1 text
  assert_eq!(image.metadata["Author"], "Ren\u{e9}");
  assert_eq!(image.palette, None);
}

#[test]
fn test_decode_interlaced_palette() {
  let png = read_fixture("palette4_adam7.png");
  let image = decode_image(&png).unwrap();
  assert!(image.header.is_interlaced());
  assert_eq!(image.header.bit_depth, 4);
  assert_eq!(image.palette.as_ref().map(Vec::len), Some(48));
  assert_eq!(image.transparency.as_deref(), Some(&[0, 128][..]));
  for y in 0..5 {
    let row = image.pixels.row(y);
    let expected: Vec<u8> = (0..5).map(|x| ((x + 3 * y) % 16) as u8).collect();
    let got: Vec<u8> = (0..5).map(|x| (row[x / 2] >> (4 - 4 * (x % 2))) & 0xF).collect();
    assert_eq!(got, expected, "row {y}");
    // padding nibble
    assert_eq!(row[2] & 0xF, 0);
  }
  assert_eq!(image.metadata["Comment"], "interlaced palette");
}

#[test]
fn test_decode_grey16_without_text() {
  let png = read_fixture("grey16_plain.png");
  let image = decode_image(&png).unwrap();
  assert_eq!(image.pixels.as_bytes(), &[0x12, 0x34, 0xAB, 0xCD, 0xFF, 0xFF, 0x00, 0x01]);
  assert!(image.metadata.is_empty());
  assert!(decode_metadata(&png).unwrap().is_empty());
}

#[test]
fn test_compressed_text_is_rejected_with_code() {
  for (name, code) in [("ztxt.png", 0), ("itxt_compressed.png", 2)] {
    let png = read_fixture(name);
    match decode_metadata(&png) {
      Err(PngError::UnsupportedCompression(c)) => assert_eq!(c, code, "{name}"),
      other => panic!("{name}: {other:?}"),
    }
    assert!(matches!(decode_image(&png), Err(PngError::UnsupportedCompression(_))));
  }
}

#[test]
fn test_uncompressed_international_text() {
  let metadata = decode_metadata(&read_fixture("itxt.png")).unwrap();
  assert_eq!(metadata["Title"], "\u{732b}");
}

#[test]
fn test_duplicate_keys_last_wins() {
  let metadata = decode_metadata(&read_fixture("duplicate_keys.png")).unwrap();
  assert_eq!(metadata.len(), 1);
  assert_eq!(metadata["Key"], "second");
}

#[test]
fn test_text_after_image_data_is_read() {
  let metadata = decode_metadata(&read_fixture("text_after_idat.png")).unwrap();
  assert_eq!(metadata["Late"], "after the pixels");
}

#[test]
fn test_ancillary_crc_error_is_skipped() {
  let metadata = decode_metadata(&read_fixture("bad_text_crc.png")).unwrap();
  assert!(!metadata.contains_key("Broken"));
  assert_eq!(metadata["Fine"], "ok");
}

#[test]
fn test_critical_crc_error_is_fatal() {
  let mut png = read_fixture("rgb8_text.png");
  // the IHDR CRC sits right after its 13 data bytes
  png[8 + 8 + 13] ^= 0xFF;
  assert!(matches!(decode_metadata(&png), Err(PngError::CrcMismatch { .. })));
}

#[test]
fn test_truncated_stream() {
  let png = read_fixture("rgb8_text.png");
  for len in [4, 8, 20, 40, png.len() - 12, png.len() - 1] {
    assert!(decode_metadata(&png[..len]).is_err(), "len {len}");
  }
  assert!(matches!(decode_metadata(b"not a png at all"), Err(PngError::NoPngSignature)));
}

#[test]
fn test_reencode_is_byte_stable() {
  let png = read_fixture("palette4_adam7.png");
  let image = decode_image(&png).unwrap();
  let once = encode_png(&image, &EncodeOptions::default()).unwrap();
  let again = encode_png(&decode_image(&once).unwrap(), &EncodeOptions::default()).unwrap();
  assert_eq!(once, again);
  assert_eq!(decode_image(&once).unwrap(), image);
}
