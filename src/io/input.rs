//! # Input Sources
//!
//! Resolves command-line inputs into buffered byte readers. Files ending in
//! `.gz` or `.bgz` are decompressed on the fly; with no files the run reads stdin.

use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};

use flate2::read::MultiGzDecoder;
use tracing::info_span;

use crate::error::{Result, TrificError};

/// One collision log to process
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum InputSource {
    Stdin,
    File(PathBuf),
}

impl InputSource {
    /// Sources in command-line order; stdin when no paths are given
    pub fn from_paths(paths: &[PathBuf]) -> Vec<InputSource> {
        if paths.is_empty() {
            vec![InputSource::Stdin]
        } else {
            paths.iter().cloned().map(InputSource::File).collect()
        }
    }

    /// Display name for logs
    pub fn name(&self) -> String {
        match self {
            InputSource::Stdin => "<stdin>".to_string(),
            InputSource::File(path) => path.display().to_string(),
        }
    }

    /// Open the source for line reading
    pub fn open(&self) -> Result<Box<dyn BufRead>> {
        match self {
            InputSource::Stdin => Ok(Box::new(io::stdin().lock())),
            InputSource::File(path) => open_file(path),
        }
    }
}

fn open_file(path: &Path) -> Result<Box<dyn BufRead>> {
    info_span!("input_open", path = ?path).in_scope(|| {
        let file = File::open(path).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => TrificError::FileNotFound {
                path: path.to_path_buf(),
            },
            _ => TrificError::Io(e),
        })?;

        let is_gzipped = path
            .extension()
            .map(|e| e == "gz" || e == "bgz")
            .unwrap_or(false);

        let reader: Box<dyn BufRead> = if is_gzipped {
            Box::new(BufReader::new(MultiGzDecoder::new(file)))
        } else {
            Box::new(BufReader::new(file))
        };
        Ok(reader)
    })
}
