//! Reading and merging the text metadata of PNG files on disk.

use std::{fs, io::Write, path::Path};

use tracing::{debug, info};

use crate::{
  png::{decode_image, decode_metadata, encode_png, EncodeOptions, MetadataSet},
  Error, Result,
};

/// Reads every text entry of the PNG at `path`.
///
/// A valid PNG without any text chunks gives an empty set. The file is only
/// ever opened for reading.
pub fn read_metadata(path: impl AsRef<Path>) -> Result<MetadataSet> {
  let path = path.as_ref();
  let bytes = fs::read(path).map_err(|e| Error::io(path, e))?;
  let metadata = decode_metadata(&bytes).map_err(|e| Error::png(path, e))?;
  debug!(path = %path.display(), entries = metadata.len(), "read metadata");
  Ok(metadata)
}

/// Merges `updates` into the metadata of the PNG at `path`, using the default
/// [`EncodeOptions`].
///
/// See [`write_metadata_with`].
#[inline]
pub fn write_metadata(path: impl AsRef<Path>, updates: &MetadataSet) -> Result<()> {
  write_metadata_with(path, updates, &EncodeOptions::default())
}

/// Merges `updates` into the metadata of the PNG at `path`.
///
/// The image is fully decoded, the merged metadata is attached, and the
/// result is encoded with the same header and the same pixels. The new bytes
/// go to a temporary file next to `path`, which is then renamed over `path`.
/// If anything fails the original file is left as it was.
pub fn write_metadata_with(
  path: impl AsRef<Path>, updates: &MetadataSet, options: &EncodeOptions,
) -> Result<()> {
  let path = path.as_ref();
  let bytes = fs::read(path).map_err(|e| Error::io(path, e))?;
  let mut image = decode_image(&bytes).map_err(|e| Error::png(path, e))?;
  merge_metadata(&mut image.metadata, updates);
  let png = encode_png(&image, options).map_err(|e| Error::png(path, e))?;
  replace_file(path, &png)?;
  info!(
    path = %path.display(),
    updated = updates.len(),
    entries = image.metadata.len(),
    "wrote metadata"
  );
  Ok(())
}

/// Adds every entry of `updates` to `existing`, replacing any value already
/// there under the same key.
#[inline]
pub fn merge_metadata(existing: &mut MetadataSet, updates: &MetadataSet) {
  existing.extend(updates.iter().map(|(k, v)| (k.clone(), v.clone())));
}

/// Splits a `key=value` argument at the first `=`.
///
/// The value can be empty, and can contain more `=` characters.
pub fn parse_assignment(arg: &str) -> Result<(String, String)> {
  match arg.split_once('=') {
    Some((key, value)) => Ok((key.to_owned(), value.to_owned())),
    None => Err(Error::Usage(arg.to_owned())),
  }
}

/// Parses every argument with [`parse_assignment`], stopping at the first bad
/// one. Later assignments to the same key win.
pub fn parse_assignments<I, S>(args: I) -> Result<MetadataSet>
where
  I: IntoIterator<Item = S>,
  S: AsRef<str>,
{
  args.into_iter().map(|arg| parse_assignment(arg.as_ref())).collect()
}

/// Atomically replaces the file at `path` with `bytes`, keeping its
/// permissions.
///
/// Symlinks are followed, so the file that gets replaced is the link's
/// target and the link itself stays a link.
fn replace_file(path: &Path, bytes: &[u8]) -> Result<()> {
  let resolved = fs::canonicalize(path).map_err(|e| Error::io(path, e))?;
  let path = resolved.as_path();
  // a canonical path always has a parent unless it's the root itself
  let dir = path.parent().unwrap_or(path);
  let permissions = fs::metadata(path).map_err(|e| Error::io(path, e))?.permissions();
  let mut tmp = tempfile::NamedTempFile::new_in(dir).map_err(|e| Error::io(dir, e))?;
  tmp.write_all(bytes).map_err(|e| Error::io(tmp.path(), e))?;
  tmp.as_file().sync_all().map_err(|e| Error::io(tmp.path(), e))?;
  tmp.as_file().set_permissions(permissions).map_err(|e| Error::io(tmp.path(), e))?;
  tmp.persist(path).map_err(|e| Error::io(path, e.error))?;
  Ok(())
}
