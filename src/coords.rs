//! GPS tag to decimal degree conversion

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::tags::{Rational, TagMap, GPS_LATITUDE, GPS_LATITUDE_REF, GPS_LONGITUDE, GPS_LONGITUDE_REF};

/// Signed decimal coordinates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

/// Convert a degrees/minutes/seconds triple to signed decimal degrees.
///
/// `"S"` and `"W"` references negate the result; anything else is positive.
/// A zero denominator yields a non-finite value.
pub fn to_decimal(dms: &[Rational; 3], reference: &str) -> f64 {
    let [deg, min, sec] = dms;
    let decimal = deg.to_f64() + min.to_f64() / 60.0 + sec.to_f64() / 3600.0;

    match reference.trim() {
        "S" | "W" | "s" | "w" => -decimal,
        _ => decimal,
    }
}

fn dms_from_tags(tags: &TagMap, key: &str) -> Option<[Rational; 3]> {
    match tags.get(key)?.as_rationals()? {
        [deg, min, sec, ..] => Some([*deg, *min, *sec]),
        _ => None,
    }
}

/// Pull coordinates out of an extracted tag map.
///
/// Returns `None` unless both latitude and longitude are present and
/// convert to finite numbers.
pub fn coordinates_from_tags(tags: &TagMap) -> Option<Coordinates> {
    let lat_dms = dms_from_tags(tags, GPS_LATITUDE)?;
    let lng_dms = dms_from_tags(tags, GPS_LONGITUDE)?;

    let lat_ref = tags.get(GPS_LATITUDE_REF).and_then(|v| v.as_text()).unwrap_or("N");
    let lng_ref = tags.get(GPS_LONGITUDE_REF).and_then(|v| v.as_text()).unwrap_or("E");

    let lat = to_decimal(&lat_dms, lat_ref);
    let lng = to_decimal(&lng_dms, lng_ref);

    if !lat.is_finite() || !lng.is_finite() {
        debug!("Discarding non-finite GPS coordinates ({}, {})", lat, lng);
        return None;
    }

    Some(Coordinates { lat, lng })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tags::TagValue;

    fn dms(d: i64, m: i64, s: i64) -> [Rational; 3] {
        [Rational::new(d, 1), Rational::new(m, 1), Rational::new(s, 1)]
    }

    fn gps_tags(lat: [Rational; 3], lat_ref: &str, lng: [Rational; 3], lng_ref: &str) -> TagMap {
        let mut tags = TagMap::new();
        tags.insert(GPS_LATITUDE.to_string(), TagValue::Rationals(lat.to_vec()));
        tags.insert(GPS_LATITUDE_REF.to_string(), TagValue::Text(lat_ref.to_string()));
        tags.insert(GPS_LONGITUDE.to_string(), TagValue::Rationals(lng.to_vec()));
        tags.insert(GPS_LONGITUDE_REF.to_string(), TagValue::Text(lng_ref.to_string()));
        tags
    }

    #[test]
    fn test_to_decimal_hemispheres() {
        assert_eq!(to_decimal(&dms(40, 30, 0), "N"), 40.5);
        assert_eq!(to_decimal(&dms(40, 30, 0), "S"), -40.5);
        assert_eq!(to_decimal(&dms(40, 30, 0), "E"), 40.5);
        assert_eq!(to_decimal(&dms(40, 30, 0), "W"), -40.5);
    }

    #[test]
    fn test_to_decimal_fractional_seconds() {
        let value = to_decimal(&[Rational::new(73, 1), Rational::new(59, 1), Rational::new(2450, 100)], "W");
        assert!((value + 73.990_139).abs() < 1e-6, "got {}", value);
    }

    #[test]
    fn test_to_decimal_zero_denominator() {
        let value = to_decimal(&[Rational::new(40, 0), Rational::new(0, 1), Rational::new(0, 1)], "N");
        assert!(!value.is_finite());
    }

    #[test]
    fn test_coordinates_from_tags() {
        let tags = gps_tags(dms(51, 30, 0), "N", dms(0, 7, 30), "W");
        let coords = coordinates_from_tags(&tags).unwrap();
        assert_eq!(coords.lat, 51.5);
        assert!((coords.lng + 0.125).abs() < 1e-12, "got {}", coords.lng);
    }

    #[test]
    fn test_coordinates_require_both_axes() {
        let mut tags = gps_tags(dms(51, 30, 0), "N", dms(0, 7, 30), "W");
        tags.remove(GPS_LONGITUDE);
        assert!(coordinates_from_tags(&tags).is_none());
        assert!(coordinates_from_tags(&TagMap::new()).is_none());
    }

    #[test]
    fn test_coordinates_reject_short_or_non_finite() {
        let mut tags = gps_tags(dms(51, 30, 0), "N", dms(0, 7, 30), "W");
        tags.insert(GPS_LATITUDE.to_string(), TagValue::Rationals(vec![Rational::new(51, 1)]));
        assert!(coordinates_from_tags(&tags).is_none());

        let broken = [Rational::new(1, 0), Rational::new(0, 1), Rational::new(0, 1)];
        let tags = gps_tags(broken, "N", dms(0, 7, 30), "W");
        assert!(coordinates_from_tags(&tags).is_none());
    }
}
