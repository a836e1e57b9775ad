//! photo_inspect - per-file inspection of user-selected images
//!
//! Turns a selection of file handles into enriched records: a data URL of
//! the content and, for images, the decoded resolution, a thumbnail, the
//! embedded EXIF tags, GPS coordinates and (when a geocoding credential is
//! configured) a street address.
//!
//! ## Example
//!
//! ```rust,no_run
//! use photo_inspect::{FilePipeline, InspectConfig, InspectSession};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let session = InspectSession::new(FilePipeline::new(InspectConfig::from_env()?));
//!
//! if let Some(batch) = session.select_paths(&["photo.jpg", "notes.txt"]).await {
//!     for record in &batch.records {
//!         println!("{} {:?} {:?}", record.name, record.resolution, record.location);
//!     }
//! }
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod coords;
pub mod data_url;
pub mod error;
pub mod file;
pub mod geocode;
pub mod imaging;
pub mod metrics;
pub mod pipeline;
pub mod reader;
pub mod session;
pub mod summary;
pub mod tags;

pub use config::{GeocodingConfig, InspectConfig};
pub use coords::Coordinates;
pub use error::{ConfigError, DecodeError, GeocodeError, ProcessError, ReadError, ResizeError, Result, TagExtractionError};
pub use file::{FileSource, SelectedFile};
pub use geocode::{Geocoder, HttpGeocoder, LocationResolver};
pub use imaging::Resolution;
pub use metrics::{Metrics, MetricsSnapshot};
pub use pipeline::{Batch, FileFailure, FilePipeline, FileRecord, FileStage};
pub use session::InspectSession;
pub use tags::{ExifTagExtractor, Rational, TagExtractor, TagMap, TagValue};
