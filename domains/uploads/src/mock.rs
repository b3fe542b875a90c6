//! Mock geotag inspector
//!
//! Data-driven stand-in for the platform EXIF reader: answers are
//! scripted per file name, so survey behavior is fully deterministic in
//! tests.

use std::collections::HashSet;
use std::path::Path;

use crate::geotag::{GeotagError, GeotagInspector};

/// Inspector with scripted per-file answers.
#[derive(Debug, Clone, Default)]
pub struct MockGeotagInspector {
    tagged: HashSet<String>,
    failing: HashSet<String>,
    tag_all: bool,
}

impl MockGeotagInspector {
    /// Inspector that reports every file as untagged unless scripted.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inspector that reports every file as geotagged.
    pub fn tagging_everything() -> Self {
        Self {
            tag_all: true,
            ..Self::default()
        }
    }

    /// Script a file name as geotagged.
    pub fn tagged(mut self, name: &str) -> Self {
        self.tagged.insert(name.to_string());
        self
    }

    /// Script a file name to fail inspection.
    pub fn failing(mut self, name: &str) -> Self {
        self.failing.insert(name.to_string());
        self
    }
}

impl GeotagInspector for MockGeotagInspector {
    fn has_geotag(&self, file: &Path) -> Result<bool, GeotagError> {
        let name = file
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or_default();
        if self.failing.contains(name) {
            return Err(GeotagError::Metadata(format!("unreadable metadata: {name}")));
        }
        Ok(self.tag_all || self.tagged.contains(name))
    }
}
