use thiserror::Error;

/// File content could not be read into memory.
#[derive(Error, Debug)]
#[error("Error reading file {name}.")]
pub struct ReadError {
    pub name: String,
    #[source]
    pub source: std::io::Error,
}

#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("Invalid data URL: {0}")]
    InvalidDataUrl(String),

    #[error("Invalid base64 payload: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("Image decode failed: {0}")]
    Image(#[from] image::ImageError),

    #[error("Decoded image has no pixels ({width}x{height})")]
    Empty { width: u32, height: u32 },
}

#[derive(Error, Debug)]
pub enum ResizeError {
    #[error("Resize failed to decode source: {0}")]
    Decode(#[from] DecodeError),

    #[error("Invalid thumbnail size: {0}")]
    InvalidSize(u32),

    #[error("Raster resize failed: {0}")]
    Raster(String),

    #[error("Thumbnail encode failed: {0}")]
    Encode(image::ImageError),
}

/// Raised only when the extractor itself breaks; missing tags are not an error.
#[derive(Error, Debug)]
pub enum TagExtractionError {
    #[error("Failed to read {name} for tag extraction: {source}")]
    Read {
        name: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Tag extraction worker for {0} stopped without a result")]
    WorkerDropped(String),
}

#[derive(Error, Debug)]
pub enum GeocodeError {
    #[error("Geocoding request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Geocoding service returned HTTP {status}: {body}")]
    Http { status: u16, body: String },

    #[error("Geocoding service status {status}: {message}")]
    Service { status: String, message: String },

    #[error("Geocoding response parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid value for {key}: {value}")]
    Invalid { key: String, value: String },
}

/// Everything that can take a single file to the failed state.
#[derive(Error, Debug)]
pub enum ProcessError {
    #[error(transparent)]
    Read(#[from] ReadError),

    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error(transparent)]
    Resize(#[from] ResizeError),

    #[error(transparent)]
    TagExtraction(#[from] TagExtractionError),

    #[error(transparent)]
    Geocode(#[from] GeocodeError),

    #[error("Selection failed: {0}")]
    Selection(String),

    #[error("Worker failed: {0}")]
    Worker(String),
}

pub type Result<T> = std::result::Result<T, ProcessError>;
