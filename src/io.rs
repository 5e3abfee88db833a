//! Opening record files, with gzip handled by file extension.

use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result};
use flate2::read::MultiGzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;

/// Path that stands for stdin or stdout.
pub const STDIO_PATH: &str = "-";

const READ_BUFFER: usize = 2 << 20;
const WRITE_BUFFER: usize = 4 << 20;

fn is_gzip(path: &Path) -> bool {
    path.extension().and_then(|s| s.to_str()) == Some("gz")
}

fn is_stdio(path: &Path) -> bool {
    path.as_os_str() == STDIO_PATH
}

/// Opens `path` for line reading, decompressing `.gz` files. `-` reads stdin.
pub fn open_reader(path: &Path) -> Result<Box<dyn BufRead + Send>> {
    if is_stdio(path) {
        return Ok(Box::new(BufReader::with_capacity(READ_BUFFER, io::stdin())));
    }

    let file =
        File::open(path).with_context(|| format!("Failed to open input {}", path.display()))?;

    if is_gzip(path) {
        let decoder = MultiGzDecoder::new(file);
        Ok(Box::new(BufReader::with_capacity(READ_BUFFER, decoder)))
    } else {
        Ok(Box::new(BufReader::with_capacity(READ_BUFFER, file)))
    }
}

/// Creates `path` for writing, compressing when it ends in `.gz`. `-` writes stdout.
///
/// The gzip trailer is written when the returned writer is dropped.
pub fn create_writer(path: &Path) -> Result<Box<dyn Write + Send>> {
    if is_stdio(path) {
        return Ok(Box::new(BufWriter::with_capacity(WRITE_BUFFER, io::stdout())));
    }

    let file =
        File::create(path).with_context(|| format!("Failed to create output {}", path.display()))?;

    if is_gzip(path) {
        // level 1: records are tiny and highly repetitive, speed wins
        let encoder = GzEncoder::new(file, Compression::new(1));
        Ok(Box::new(BufWriter::with_capacity(WRITE_BUFFER, encoder)))
    } else {
        Ok(Box::new(BufWriter::with_capacity(WRITE_BUFFER, file)))
    }
}
