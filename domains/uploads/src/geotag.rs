//! Geotag survey over the images of a pending upload
//!
//! Drone images without GPS coordinates degrade the analysis, so the
//! client samples the selection and warns the user before uploading.
//! Reading the actual EXIF metadata belongs to the platform side and
//! enters through the [`GeotagInspector`] seam; this module owns the
//! filtering, sampling, and aggregation around it.

use std::path::Path;

use serde::Serialize;
use thiserror::Error;

use crate::archive::ImageFile;

/// File extensions treated as inspectable images.
const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "tiff", "tif", "bmp", "gif", "webp"];

/// Largest number of files inspected per survey.
pub const MAX_SAMPLE: usize = 20;

/// Survey failure
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GeotagError {
    #[error("no image files to inspect")]
    NoImages,

    #[error("failed to read image metadata: {0}")]
    Metadata(String),
}

/// Reads GPS presence out of one image file.
///
/// Implemented by the embedding platform over its EXIF reader; the mock
/// implementation lives in [`crate::mock`].
pub trait GeotagInspector: Send + Sync {
    fn has_geotag(&self, file: &Path) -> Result<bool, GeotagError>;
}

/// Per-file survey outcome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GeotagCheck {
    pub file_name: String,
    pub has_geotag: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Aggregate survey outcome.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GeotagSummary {
    pub total_images: usize,
    pub sample_size: usize,
    pub successful_checks: usize,
    pub geotagged_count: usize,
    pub error_count: usize,
    /// Share of geotagged images among successful checks, one decimal.
    pub geotag_percentage: f64,
}

/// Full survey result: the summary plus each sampled file's outcome.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GeotagSurvey {
    pub summary: GeotagSummary,
    pub results: Vec<GeotagCheck>,
}

fn is_image(file: &ImageFile) -> bool {
    file.path
        .extension()
        .and_then(|extension| extension.to_str())
        .map(|extension| {
            let extension = extension.to_ascii_lowercase();
            IMAGE_EXTENSIONS.contains(&extension.as_str())
        })
        .unwrap_or(false)
}

/// Evenly spaced sample positions across `len` items, at most `max`.
fn sample_indices(len: usize, max: usize) -> Vec<usize> {
    if len <= max {
        (0..len).collect()
    } else {
        (0..max).map(|i| i * len / max).collect()
    }
}

/// Survey the selection for geotags.
///
/// Non-image files are ignored; a selection without any images is an
/// error. Per-file inspector failures are recorded against the file and
/// excluded from the percentage, never aborting the survey.
pub fn survey(
    inspector: &dyn GeotagInspector,
    files: &[ImageFile],
) -> Result<GeotagSurvey, GeotagError> {
    let images: Vec<&ImageFile> = files.iter().filter(|file| is_image(file)).collect();
    if images.is_empty() {
        return Err(GeotagError::NoImages);
    }

    let sample: Vec<&ImageFile> = sample_indices(images.len(), MAX_SAMPLE)
        .into_iter()
        .map(|index| images[index])
        .collect();

    let mut results = Vec::with_capacity(sample.len());
    for file in &sample {
        match inspector.has_geotag(&file.path) {
            Ok(has_geotag) => results.push(GeotagCheck {
                file_name: file.name.clone(),
                has_geotag,
                error: None,
            }),
            Err(e) => {
                tracing::debug!(file = %file.name, error = %e, "geotag inspection failed");
                results.push(GeotagCheck {
                    file_name: file.name.clone(),
                    has_geotag: false,
                    error: Some(e.to_string()),
                });
            }
        }
    }

    let error_count = results.iter().filter(|check| check.error.is_some()).count();
    let successful_checks = results.len() - error_count;
    let geotagged_count = results.iter().filter(|check| check.has_geotag).count();
    let geotag_percentage = if successful_checks > 0 {
        let raw = geotagged_count as f64 / successful_checks as f64 * 100.0;
        (raw * 10.0).round() / 10.0
    } else {
        0.0
    };

    Ok(GeotagSurvey {
        summary: GeotagSummary {
            total_images: images.len(),
            sample_size: sample.len(),
            successful_checks,
            geotagged_count,
            error_count,
            geotag_percentage,
        },
        results,
    })
}
