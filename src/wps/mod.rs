pub mod client;
pub mod document;
pub mod error;
pub mod request;
pub mod types;

#[cfg(test)]
pub(crate) mod fixtures;

pub use client::{ClientOptions, Fetcher, WpsClient};
pub use document::parse_status_document;
pub use error::WpsError;
pub use types::{ErrorDescriptor, Execution, JobStatus, OutputValue, ProcessOutput};
