//! Per-file processing pipeline
//!
//! Each selected file runs through
//! `Reading -> Decoding -> Resizing -> ExtractingTags -> ConvertingCoordinates -> Geocoding`,
//! stopping after `Reading` for anything that isn't an image and skipping
//! geocoding when no GPS position was found. Stages within a file are
//! strictly sequential. Files of a batch run as separate tasks, bounded by
//! `InspectConfig::concurrency`, and the batch is reassembled in selection
//! order once every file has settled.
//!
//! A failure in any stage fails only that file. Failed files are left out
//! of [`Batch::records`] and listed in [`Batch::failures`].

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, error, info, warn};

use crate::config::InspectConfig;
use crate::coords::{self, Coordinates};
use crate::error::ProcessError;
use crate::file::SelectedFile;
use crate::geocode::LocationResolver;
use crate::imaging::{self, Resolution};
use crate::metrics::{Metrics, Stage, Timer};
use crate::reader;
use crate::tags::{ExifTagExtractor, TagExtractor, TagMap};

/// Everything known about one selected file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileRecord {
    pub name: String,
    pub content_type: String,
    pub size: u64,
    /// Full-resolution data URL
    pub encoded_data: String,
    pub is_image: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolution: Option<Resolution>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail_data: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<TagMap>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coordinates: Option<Coordinates>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

/// Where a file was when it failed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FileStage {
    Reading,
    Decoding,
    Resizing,
    ExtractingTags,
    ConvertingCoordinates,
    Geocoding,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileFailure {
    pub name: String,
    pub stage: FileStage,
    pub message: String,
}

impl FileFailure {
    fn new(file: &SelectedFile, stage: FileStage, error: impl Into<ProcessError>) -> Self {
        Self {
            name: file.name.clone(),
            stage,
            message: error.into().to_string(),
        }
    }
}

/// The result of one selection event. Immutable once built.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Batch {
    pub token: u64,
    pub records: Vec<FileRecord>,
    pub failures: Vec<FileFailure>,
}

impl Batch {
    pub fn empty(token: u64) -> Self {
        Self { token, ..Default::default() }
    }
}

/// Run a CPU-bound step off the async workers.
async fn blocking<T, E, F>(f: F) -> Result<T, ProcessError>
where
    F: FnOnce() -> Result<T, E> + Send + 'static,
    T: Send + 'static,
    E: Into<ProcessError> + Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| ProcessError::Worker(e.to_string()))?
        .map_err(Into::into)
}

#[derive(Clone)]
pub struct FilePipeline {
    config: Arc<InspectConfig>,
    tags: Arc<dyn TagExtractor>,
    locations: LocationResolver,
    metrics: Arc<Metrics>,
}

impl FilePipeline {
    /// Pipeline with the EXIF extractor and the configured geocoder.
    pub fn new(config: InspectConfig) -> Self {
        let locations = LocationResolver::from_config(config.geocoding.as_ref());
        Self::with_collaborators(config, Arc::new(ExifTagExtractor::new()), locations)
    }

    pub fn with_collaborators(
        config: InspectConfig,
        tags: Arc<dyn TagExtractor>,
        locations: LocationResolver,
    ) -> Self {
        Self {
            config: Arc::new(config),
            tags,
            locations,
            metrics: Metrics::new(),
        }
    }

    pub fn with_metrics(mut self, metrics: Arc<Metrics>) -> Self {
        self.metrics = metrics;
        self
    }

    pub fn metrics(&self) -> Arc<Metrics> {
        Arc::clone(&self.metrics)
    }

    pub fn config(&self) -> &InspectConfig {
        &self.config
    }

    /// Build the record for a single file.
    pub async fn process_file(&self, file: &SelectedFile) -> Result<FileRecord, FileFailure> {
        let timer = Timer::new();
        let result = self.run_stages(file).await;
        self.metrics.record_file(result.is_ok(), timer.elapsed_ms());
        result
    }

    async fn run_stages(&self, file: &SelectedFile) -> Result<FileRecord, FileFailure> {
        let encoded = reader::read_data_url(file)
            .await
            .map_err(|e| FileFailure::new(file, FileStage::Reading, e))?;

        let mut record = FileRecord {
            name: file.name.clone(),
            content_type: file.content_type.clone(),
            size: file.size,
            encoded_data: encoded,
            is_image: file.is_image(),
            resolution: None,
            thumbnail_data: None,
            tags: None,
            coordinates: None,
            location: None,
        };

        if !record.is_image {
            debug!("{} is {}, skipping image stages", file.name, file.content_type);
            return Ok(record);
        }

        let source: Arc<str> = Arc::from(record.encoded_data.as_str());

        let decode_src = Arc::clone(&source);
        let resolution = blocking(move || imaging::decode_resolution(&decode_src))
            .await
            .map_err(|e| FileFailure::new(file, FileStage::Decoding, e))?;
        self.metrics.record_stage(Stage::Decode);

        let max_dimension = self.config.thumbnail_max_dimension;
        let thumbnail = blocking(move || imaging::resize(&source, max_dimension))
            .await
            .map_err(|e| FileFailure::new(file, FileStage::Resizing, e))?;
        self.metrics.record_stage(Stage::Resize);

        let tags = self
            .tags
            .extract(file)
            .await
            .map_err(|e| FileFailure::new(file, FileStage::ExtractingTags, e))?;
        self.metrics.record_stage(Stage::ExtractTags);

        let coordinates = coords::coordinates_from_tags(&tags);
        let location = match coordinates {
            Some(coordinates) => {
                self.metrics.record_stage(Stage::ConvertCoordinates);
                self.locate(file, coordinates).await?
            }
            None => None,
        };

        record.resolution = Some(resolution);
        record.thumbnail_data = Some(thumbnail);
        record.tags = Some(tags);
        record.coordinates = coordinates;
        record.location = location;
        Ok(record)
    }

    async fn locate(&self, file: &SelectedFile, coordinates: Coordinates) -> Result<Option<String>, FileFailure> {
        if !self.locations.is_enabled() {
            return Ok(None);
        }

        self.metrics.record_stage(Stage::GeocodeRequest);
        let location = self
            .locations
            .resolve(coordinates)
            .await
            .map_err(|e| FileFailure::new(file, FileStage::Geocoding, e))?;

        if location.is_some() {
            self.metrics.record_stage(Stage::LocationFound);
        }
        Ok(location)
    }

    /// Process every file of one selection event, preserving selection order.
    pub async fn process_batch(&self, token: u64, files: Vec<SelectedFile>) -> Batch {
        let names: Vec<String> = files.iter().map(|f| f.name.clone()).collect();
        let permits = Arc::new(Semaphore::new(self.config.concurrency.max(1)));
        let mut tasks = JoinSet::new();

        for (index, file) in files.into_iter().enumerate() {
            let pipeline = self.clone();
            let permits = Arc::clone(&permits);
            tasks.spawn(async move {
                let _permit = permits.acquire_owned().await;
                (index, pipeline.process_file(&file).await)
            });
        }

        let mut outcomes: Vec<Option<Result<FileRecord, FileFailure>>> = names.iter().map(|_| None).collect();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((index, outcome)) => outcomes[index] = Some(outcome),
                Err(e) => error!("File task aborted: {}", e),
            }
        }

        let mut batch = Batch::empty(token);
        for (name, outcome) in names.into_iter().zip(outcomes) {
            match outcome {
                Some(Ok(record)) => batch.records.push(record),
                Some(Err(failure)) => {
                    warn!("Failed to process {} while {:?}: {}", failure.name, failure.stage, failure.message);
                    batch.failures.push(failure);
                }
                None => {
                    warn!("Failed to process {}: worker did not finish", name);
                    batch.failures.push(FileFailure {
                        name,
                        stage: FileStage::Reading,
                        message: ProcessError::Worker("task aborted".to_string()).to_string(),
                    });
                }
            }
        }

        info!(
            "Batch {}: {} records, {} failures",
            token,
            batch.records.len(),
            batch.failures.len()
        );
        batch
    }
}
