//! In-memory zip packaging of the selected images
//!
//! The backend accepts one archive per batch, so the picked files are
//! bundled client-side before upload. The archive is built in memory;
//! batches are bounded by what a phone can hold in its picker.

use std::fs::File;
use std::io::{self, Cursor};
use std::path::PathBuf;

use thiserror::Error;
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

/// A picked image: display name plus where it lives on disk.
#[derive(Debug, Clone)]
pub struct ImageFile {
    /// Name the file keeps inside the archive.
    pub name: String,
    pub path: PathBuf,
}

impl ImageFile {
    pub fn new(name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
        }
    }
}

/// Archive construction failure
#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error("no files to bundle")]
    Empty,

    #[error("archive I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("archive write error: {0}")]
    Zip(#[from] zip::result::ZipError),
}

/// Bundle the given files into a single deflate-compressed zip.
pub fn bundle_images(files: &[ImageFile]) -> Result<Vec<u8>, ArchiveError> {
    if files.is_empty() {
        return Err(ArchiveError::Empty);
    }

    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let options = FileOptions::default().compression_method(CompressionMethod::Deflated);

    for file in files {
        writer.start_file(file.name.as_str(), options)?;
        let mut source = File::open(&file.path)?;
        io::copy(&mut source, &mut writer)?;
    }

    let cursor = writer.finish()?;
    tracing::debug!(
        files = files.len(),
        bytes = cursor.get_ref().len(),
        "image archive built"
    );
    Ok(cursor.into_inner())
}
