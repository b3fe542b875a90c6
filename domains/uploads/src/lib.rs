//! Uploads domain: the batch upload pipeline
//!
//! Turning a set of picked images into an analysis batch takes three
//! steps: bundle the images into one zip archive, survey a sample of
//! them for GPS geotags so the user can be warned before committing,
//! and post the archive with its form fields to the upload endpoint
//! through the authenticated request path.

mod api;
mod archive;
mod geotag;
pub mod mock;

pub use api::{BatchMetadata, Coordinates, NewBatch, UploadError, UploadReceipt, UploadsApi};
pub use archive::{bundle_images, ArchiveError, ImageFile};
pub use geotag::{
    GeotagCheck, GeotagError, GeotagInspector, GeotagSummary, GeotagSurvey, survey, MAX_SAMPLE,
};
