//! Batches domain: dashboard resources and background status polling
//!
//! A batch is the unit of analysis work the backend processes after an
//! upload. This crate carries the typed resource, the dashboard API
//! wrapper over the authenticated request path, and the cancellable
//! poller views use to follow a batch to its terminal state.

mod api;
mod entities;
mod poller;

pub use api::{BatchApiError, BatchesApi};
pub use entities::{Batch, BatchDescription, BatchStatus};
pub use poller::{BatchWatcher, DEFAULT_POLL_INTERVAL};
