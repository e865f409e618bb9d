//! In-memory ZIP archives of generated documents

use std::collections::BTreeSet;
use std::io::{Cursor, Write};

use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::error::RenderError;
use crate::filenames::unique_filename;

pub struct ZipBundle {
    writer: ZipWriter<Cursor<Vec<u8>>>,
    options: SimpleFileOptions,
    names: BTreeSet<String>,
}

impl ZipBundle {
    pub fn new() -> Self {
        Self {
            writer: ZipWriter::new(Cursor::new(Vec::new())),
            options: SimpleFileOptions::default().compression_method(CompressionMethod::Deflated),
            names: BTreeSet::new(),
        }
    }

    /// Add a file. `path` may contain `/` to place it in a folder.
    pub fn add(&mut self, path: &str, bytes: &[u8]) -> Result<(), RenderError> {
        self.writer.start_file(path, self.options)?;
        self.writer.write_all(bytes)?;
        self.names.insert(path.to_string());
        Ok(())
    }

    /// Add a file, appending `_2`, `_3`... to the stem when `path` is taken.
    /// Returns the path actually used.
    pub fn add_unique(&mut self, path: &str, bytes: &[u8]) -> Result<String, RenderError> {
        let candidate = unique_filename(path, &self.names);
        if candidate != path {
            tracing::debug!(path, renamed = %candidate, "Archive entry renamed");
        }
        self.add(&candidate, bytes)?;
        Ok(candidate)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn finish(self) -> Result<Vec<u8>, RenderError> {
        let cursor = self.writer.finish()?;
        Ok(cursor.into_inner())
    }
}

impl Default for ZipBundle {
    fn default() -> Self {
        Self::new()
    }
}
