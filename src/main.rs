//! The `pngmeta` command line tool.
//!
//! * `pngmeta <path>` prints the text metadata of a PNG.
//! * `pngmeta <path> key=value...` merges the pairs into the PNG's metadata.

use std::{path::PathBuf, process::ExitCode};

use clap::Parser;
use pngmeta::{parse_assignments, read_metadata, write_metadata, Error};
use tracing_subscriber::{filter::LevelFilter, EnvFilter};

#[derive(Parser, Debug)]
#[command(name = "pngmeta")]
#[command(author, version, about, long_about = None)]
struct Args {
  /// PNG file to read, or to update when assignments are given
  #[arg(value_name = "PATH")]
  path: PathBuf,

  /// Metadata to set, split at the first `=`
  #[arg(value_name = "KEY=VALUE", allow_hyphen_values = true)]
  assignments: Vec<String>,
}

fn main() -> ExitCode {
  tracing_subscriber::fmt()
    .with_writer(std::io::stderr)
    .with_env_filter(
      EnvFilter::builder().with_default_directive(LevelFilter::WARN.into()).from_env_lossy(),
    )
    .init();

  let args = match Args::try_parse() {
    Ok(args) => args,
    Err(e) => {
      // help and version go to stdout and aren't failures
      let _ = e.print();
      return if e.use_stderr() { ExitCode::FAILURE } else { ExitCode::SUCCESS };
    }
  };

  match run(args) {
    Ok(()) => ExitCode::SUCCESS,
    Err(Error::Usage(arg)) => {
      eprintln!("Invalid metadata format: {arg}");
      ExitCode::FAILURE
    }
    Err(e) => {
      eprintln!("Error: {e}");
      ExitCode::FAILURE
    }
  }
}

fn run(args: Args) -> pngmeta::Result<()> {
  if args.assignments.is_empty() {
    let metadata = read_metadata(&args.path)?;
    if metadata.is_empty() {
      println!("No metadata found in the PNG file.");
    } else {
      println!("Metadata from PNG file:");
      for (key, value) in &metadata {
        println!("Key: {key}, Value: {value}");
      }
    }
  } else {
    // every argument is checked before the file is touched
    let updates = parse_assignments(&args.assignments)?;
    write_metadata(&args.path, &updates)?;
    println!("Metadata successfully written to the PNG file.");
  }
  Ok(())
}
