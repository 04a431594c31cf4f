#![forbid(unsafe_code)]
#![cfg_attr(docs_rs, feature(doc_cfg))]
#![warn(missing_debug_implementations)]

//! Read and merge the text metadata of PNG files.
//!
//! PNG files can hold any number of keyword/text pairs in `tEXt` (and the
//! related `zTXt` and `iTXt`) chunks. This crate reads those pairs out of a
//! file, and it can add or replace pairs while keeping the image itself (the
//! header and every pixel) exactly the same.
//!
//! ```no_run
//! # fn main() -> pngmeta::Result<()> {
//! let mut updates = pngmeta::png::MetadataSet::new();
//! updates.insert("Author".to_string(), "Somebody".to_string());
//! pngmeta::write_metadata("picture.png", &updates)?;
//! for (key, value) in pngmeta::read_metadata("picture.png")? {
//!   println!("{key}: {value}");
//! }
//! # Ok(())
//! # }
//! ```
//!
//! The [`png`] module has the chunk codec that all of this is built on, if you
//! want to work with bytes in memory instead of files.
//!
//! Compressed text (`zTXt`, or compressed `iTXt`) is never inflated. Reading a
//! file with any compressed text is an error with
//! [`ErrorKind::UnsupportedCompression`].

mod error;
pub use error::*;

mod int_endian;

pub mod png;

pub mod metadata;
pub use metadata::*;
