//! # groundwork bucket
//!
//! Object storage contract: upload, download and metadata for named blobs.

pub mod bucket;
pub mod content_type;
pub mod stats;

pub use bucket::{read_declared, Bucket, BucketExt, ObjectReader};
pub use content_type::content_type_for;
pub use stats::Stats;
