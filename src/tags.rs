//! Embedded metadata tag extraction
//!
//! [`TagExtractor`] is the seam to whatever library reads camera tags. The
//! bundled [`ExifTagExtractor`] runs kamadak-exif on a blocking worker and
//! hands the result back over a one-shot channel, so callers see a single
//! future that always settles. A file without EXIF data (PNG, GIF, a JPEG
//! straight out of an editor) yields an empty map rather than an error.

use std::collections::BTreeMap;
use std::io::Cursor;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::oneshot;
use tracing::debug;

use crate::error::TagExtractionError;
use crate::file::SelectedFile;

pub const GPS_LATITUDE: &str = "GPSLatitude";
pub const GPS_LATITUDE_REF: &str = "GPSLatitudeRef";
pub const GPS_LONGITUDE: &str = "GPSLongitude";
pub const GPS_LONGITUDE_REF: &str = "GPSLongitudeRef";

/// An unsigned or signed EXIF rational
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rational {
    pub numerator: i64,
    pub denominator: i64,
}

impl Rational {
    pub fn new(numerator: i64, denominator: i64) -> Self {
        Self { numerator, denominator }
    }

    /// Zero denominators produce a non-finite result.
    pub fn to_f64(&self) -> f64 {
        self.numerator as f64 / self.denominator as f64
    }
}

/// A single tag value, flattened from the EXIF type zoo
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TagValue {
    Text(String),
    Number(f64),
    Numbers(Vec<f64>),
    Rationals(Vec<Rational>),
}

impl TagValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            TagValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_rationals(&self) -> Option<&[Rational]> {
        match self {
            TagValue::Rationals(v) => Some(v),
            _ => None,
        }
    }
}

/// Tag name -> value, ordered by name
pub type TagMap = BTreeMap<String, TagValue>;

#[async_trait]
pub trait TagExtractor: Send + Sync {
    /// Extract all tags from the file. Must resolve with an empty map when
    /// the file carries no tags.
    async fn extract(&self, file: &SelectedFile) -> Result<TagMap, TagExtractionError>;
}

/// kamadak-exif backed extractor
#[derive(Debug, Clone, Default)]
pub struct ExifTagExtractor;

impl ExifTagExtractor {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl TagExtractor for ExifTagExtractor {
    async fn extract(&self, file: &SelectedFile) -> Result<TagMap, TagExtractionError> {
        let bytes = file.read_bytes().await.map_err(|source| TagExtractionError::Read {
            name: file.name.clone(),
            source,
        })?;

        let (tx, rx) = oneshot::channel();
        tokio::task::spawn_blocking(move || {
            // Receiver gone means the caller stopped waiting
            let _ = tx.send(read_tags(&bytes));
        });

        let tags = rx
            .await
            .map_err(|_| TagExtractionError::WorkerDropped(file.name.clone()))?;

        debug!("Extracted {} tags from {}", tags.len(), file.name);
        Ok(tags)
    }
}

/// Parse every primary-image EXIF field out of a container (JPEG, TIFF, HEIF, PNG, WebP).
pub fn read_tags(bytes: &[u8]) -> TagMap {
    let mut cursor = Cursor::new(bytes);
    let exif_data = match exif::Reader::new().read_from_container(&mut cursor) {
        Ok(exif_data) => exif_data,
        Err(e) => {
            debug!("No EXIF tags: {}", e);
            return TagMap::new();
        }
    };

    let mut tags = TagMap::new();
    for field in exif_data.fields() {
        if field.ifd_num != exif::In::PRIMARY {
            continue;
        }
        if let Some(value) = tag_value(field) {
            tags.entry(field.tag.to_string()).or_insert(value);
        }
    }
    tags
}

fn numbers<T: Into<f64> + Copy>(values: &[T]) -> Option<TagValue> {
    match values {
        [] => None,
        [single] => Some(TagValue::Number((*single).into())),
        many => Some(TagValue::Numbers(many.iter().map(|&n| n.into()).collect())),
    }
}

fn tag_value(field: &exif::Field) -> Option<TagValue> {
    match &field.value {
        exif::Value::Ascii(vecs) => {
            let text = vecs
                .iter()
                .map(|v| String::from_utf8_lossy(v).trim_end_matches('\0').trim().to_string())
                .collect::<Vec<_>>()
                .join(" ");
            Some(TagValue::Text(text))
        }
        exif::Value::Rational(v) => Some(TagValue::Rationals(
            v.iter().map(|r| Rational::new(r.num as i64, r.denom as i64)).collect(),
        )),
        exif::Value::SRational(v) => Some(TagValue::Rationals(
            v.iter().map(|r| Rational::new(r.num as i64, r.denom as i64)).collect(),
        )),
        exif::Value::Byte(v) => numbers(v.as_slice()),
        exif::Value::SByte(v) => numbers(v.as_slice()),
        exif::Value::Short(v) => numbers(v.as_slice()),
        exif::Value::SShort(v) => numbers(v.as_slice()),
        exif::Value::Long(v) => numbers(v.as_slice()),
        exif::Value::SLong(v) => numbers(v.as_slice()),
        exif::Value::Float(v) => numbers(v.as_slice()),
        exif::Value::Double(v) => numbers(v.as_slice()),
        exif::Value::Undefined(..) => Some(TagValue::Text(field.display_value().to_string())),
        _ => None,
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use exif::experimental::Writer;
    use exif::{Field, In, Tag, Value};

    /// JPEG with a GPS block spliced in as an APP1 segment.
    pub(crate) fn jpeg_with_gps(lat: [u32; 3], lat_ref: &str, lon: [u32; 3], lon_ref: &str) -> Vec<u8> {
        let rationals = |dms: [u32; 3]| {
            Value::Rational(dms.iter().map(|&n| exif::Rational { num: n, denom: 1 }).collect())
        };
        let fields = [
            Field { tag: Tag::Make, ifd_num: In::PRIMARY, value: Value::Ascii(vec![b"TestCam".to_vec()]) },
            Field { tag: Tag::GPSLatitudeRef, ifd_num: In::PRIMARY, value: Value::Ascii(vec![lat_ref.as_bytes().to_vec()]) },
            Field { tag: Tag::GPSLatitude, ifd_num: In::PRIMARY, value: rationals(lat) },
            Field { tag: Tag::GPSLongitudeRef, ifd_num: In::PRIMARY, value: Value::Ascii(vec![lon_ref.as_bytes().to_vec()]) },
            Field { tag: Tag::GPSLongitude, ifd_num: In::PRIMARY, value: rationals(lon) },
        ];

        let mut writer = Writer::new();
        for field in &fields {
            writer.push_field(field);
        }
        let mut tiff = Cursor::new(Vec::new());
        writer.write(&mut tiff, false).unwrap();
        let tiff = tiff.into_inner();

        let mut jpeg = Vec::new();
        image::DynamicImage::ImageRgb8(image::RgbImage::new(40, 20))
            .write_to(&mut Cursor::new(&mut jpeg), image::ImageFormat::Jpeg)
            .unwrap();

        let mut app1 = b"Exif\0\0".to_vec();
        app1.extend_from_slice(&tiff);
        let len = (app1.len() + 2) as u16;

        let mut out = jpeg[..2].to_vec();
        out.extend_from_slice(&[0xFF, 0xE1]);
        out.extend_from_slice(&len.to_be_bytes());
        out.extend_from_slice(&app1);
        out.extend_from_slice(&jpeg[2..]);
        out
    }

    #[test]
    fn test_rational_to_f64() {
        assert_eq!(Rational::new(3, 2).to_f64(), 1.5);
        assert!(!Rational::new(1, 0).to_f64().is_finite());
    }

    #[test]
    fn test_read_tags_gps() {
        let bytes = jpeg_with_gps([40, 30, 0], "N", [73, 59, 24], "W");
        let tags = read_tags(&bytes);

        assert_eq!(tags.get("Make"), Some(&TagValue::Text("TestCam".to_string())));
        assert_eq!(tags.get(GPS_LATITUDE_REF).and_then(|v| v.as_text()), Some("N"));
        assert_eq!(tags.get(GPS_LONGITUDE_REF).and_then(|v| v.as_text()), Some("W"));
        assert_eq!(
            tags.get(GPS_LATITUDE).and_then(|v| v.as_rationals()),
            Some(&[Rational::new(40, 1), Rational::new(30, 1), Rational::new(0, 1)][..])
        );
    }

    #[test]
    fn test_read_tags_without_exif() {
        let mut png = Vec::new();
        image::RgbImage::new(4, 4)
            .write_to(&mut Cursor::new(&mut png), image::ImageFormat::Png)
            .unwrap();
        assert!(read_tags(&png).is_empty());
        assert!(read_tags(b"plain text").is_empty());
        assert!(read_tags(&[0xFF, 0xD8]).is_empty());
    }

    #[tokio::test]
    async fn test_extractor_resolves_empty_for_untagged_file() {
        let file = SelectedFile::from_bytes("notes.txt", "text/plain", b"no tags here".to_vec());
        let tags = ExifTagExtractor::new().extract(&file).await.unwrap();
        assert!(tags.is_empty());
    }

    #[test]
    fn test_tag_value_serialization() {
        let mut tags = TagMap::new();
        tags.insert("GPSLatitudeRef".to_string(), TagValue::Text("S".to_string()));
        tags.insert("Orientation".to_string(), TagValue::Number(1.0));
        tags.insert("GPSLatitude".to_string(), TagValue::Rationals(vec![Rational::new(40, 1)]));

        let json = serde_json::to_value(&tags).unwrap();
        assert_eq!(json["GPSLatitudeRef"], "S");
        assert_eq!(json["Orientation"], 1.0);
        assert_eq!(json["GPSLatitude"][0]["numerator"], 40);
        assert_eq!(json["GPSLatitude"][0]["denominator"], 1);
    }
}
