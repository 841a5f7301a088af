//! EXIF metadata extraction for Roadwatch photo reports.
//!
//! Recovers the capture timestamp (`DateTimeOriginal`) and the GPS fix from
//! a photo's embedded metadata. GPS positions are stored as sexagesimal
//! triples of rational numbers; they are converted to decimal degrees here,
//! with the hemisphere sign applied from the reference tags.
//!
//! Extraction never fails hard: a photo without EXIF, without a GPS block,
//! or with malformed rationals simply yields `None` for the missing fields.
//! The orchestrator decides what a missing coordinate means for the report.

use exif::{In, Reader, Tag, Value};
use roadwatch_geo::GeoCoordinate;
use std::io::Cursor;
use tracing::debug;

/// Metadata recovered from a single photo.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PhotoMetadata {
    /// Verbatim `DateTimeOriginal` string, e.g. `2024:09:24 17:05:00`.
    pub taken_at: Option<String>,
    /// Decimal-degree GPS fix, if the photo carried one.
    pub coordinate: Option<GeoCoordinate>,
}

/// Extract capture time and GPS coordinates from raw image bytes.
pub fn extract(image: &[u8]) -> PhotoMetadata {
    let exif = match Reader::new().read_from_container(&mut Cursor::new(image)) {
        Ok(exif) => exif,
        Err(e) => {
            debug!(error = %e, "No readable EXIF block in image");
            return PhotoMetadata::default();
        }
    };

    let taken_at = exif
        .get_field(Tag::DateTimeOriginal, In::PRIMARY)
        .and_then(|field| ascii_value(&field.value));

    let latitude = signed_coordinate(&exif, Tag::GPSLatitude, Tag::GPSLatitudeRef, "S");
    let longitude = signed_coordinate(&exif, Tag::GPSLongitude, Tag::GPSLongitudeRef, "W");

    let coordinate = match (latitude, longitude) {
        (Some(lat), Some(lng)) => match GeoCoordinate::new(lat, lng) {
            Ok(c) => Some(c),
            Err(e) => {
                debug!(error = %e, "EXIF GPS fix out of range");
                None
            }
        },
        _ => None,
    };

    PhotoMetadata {
        taken_at,
        coordinate,
    }
}

/// Read a GPS angle tag and apply the hemisphere sign from its ref tag.
///
/// Returns `None` when the tag is absent or the triple is malformed.
fn signed_coordinate(
    exif: &exif::Exif,
    angle_tag: Tag,
    ref_tag: Tag,
    negative_ref: &str,
) -> Option<f64> {
    let field = exif.get_field(angle_tag, In::PRIMARY)?;
    let decimal = match &field.value {
        Value::Rational(triple) => sexagesimal_to_decimal(triple)?,
        _ => return None,
    };

    let reference = exif
        .get_field(ref_tag, In::PRIMARY)
        .and_then(|field| ascii_value(&field.value));

    Some(apply_hemisphere(
        decimal,
        reference.as_deref(),
        negative_ref,
    ))
}

/// Negate a decimal angle when its hemisphere reference is southern/western.
///
/// A missing reference tag leaves the value positive, matching cameras
/// that omit the ref tags for northern/eastern fixes.
fn apply_hemisphere(decimal: f64, reference: Option<&str>, negative_ref: &str) -> f64 {
    match reference {
        Some(r) if r.eq_ignore_ascii_case(negative_ref) => -decimal,
        _ => decimal,
    }
}

/// Convert a degrees/minutes/seconds rational triple to decimal degrees.
///
/// A short triple or a zero denominator is treated as malformed rather
/// than a division fault.
fn sexagesimal_to_decimal(triple: &[exif::Rational]) -> Option<f64> {
    if triple.len() < 3 {
        return None;
    }
    if triple.iter().take(3).any(|r| r.denom == 0) {
        return None;
    }
    let degrees = triple[0].to_f64();
    let minutes = triple[1].to_f64();
    let seconds = triple[2].to_f64();
    Some(degrees + minutes / 60.0 + seconds / 3600.0)
}

fn ascii_value(value: &Value) -> Option<String> {
    match value {
        Value::Ascii(parts) => parts
            .first()
            .map(|bytes| String::from_utf8_lossy(bytes).trim().to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use exif::Rational;

    fn rational(num: u32, denom: u32) -> Rational {
        Rational { num, denom }
    }

    #[test]
    fn test_sexagesimal_unit_denominators() {
        // 25° 1' 58.8" = 25 + 1/60 + 58.8/3600
        let triple = vec![rational(25, 1), rational(1, 1), rational(588, 10)];
        let decimal = sexagesimal_to_decimal(&triple).unwrap();
        let expected = 25.0 + 1.0 / 60.0 + 58.8 / 3600.0;
        assert!((decimal - expected).abs() < 1e-9);
    }

    #[test]
    fn test_sexagesimal_exact_degrees() {
        let triple = vec![rational(121, 1), rational(0, 1), rational(0, 1)];
        assert_eq!(sexagesimal_to_decimal(&triple), Some(121.0));
    }

    #[test]
    fn test_sexagesimal_zero_denominator_is_malformed() {
        let triple = vec![rational(25, 0), rational(1, 1), rational(0, 1)];
        assert_eq!(sexagesimal_to_decimal(&triple), None);

        let triple = vec![rational(25, 1), rational(1, 1), rational(30, 0)];
        assert_eq!(sexagesimal_to_decimal(&triple), None);
    }

    #[test]
    fn test_sexagesimal_short_triple_is_malformed() {
        let triple = vec![rational(25, 1), rational(1, 1)];
        assert_eq!(sexagesimal_to_decimal(&triple), None);
    }

    #[test]
    fn test_apply_hemisphere_south_negates() {
        assert_eq!(apply_hemisphere(25.033, Some("S"), "S"), -25.033);
        assert_eq!(apply_hemisphere(25.033, Some("s"), "S"), -25.033);
    }

    #[test]
    fn test_apply_hemisphere_west_negates() {
        assert_eq!(apply_hemisphere(121.5654, Some("W"), "W"), -121.5654);
    }

    #[test]
    fn test_apply_hemisphere_north_east_unchanged() {
        assert_eq!(apply_hemisphere(25.033, Some("N"), "S"), 25.033);
        assert_eq!(apply_hemisphere(121.5654, Some("E"), "W"), 121.5654);
    }

    #[test]
    fn test_apply_hemisphere_missing_ref_unchanged() {
        assert_eq!(apply_hemisphere(25.033, None, "S"), 25.033);
    }

    #[test]
    fn test_extract_no_exif_fails_softly() {
        let meta = extract(b"definitely not a jpeg");
        assert_eq!(meta.taken_at, None);
        assert_eq!(meta.coordinate, None);
    }

    #[test]
    fn test_extract_empty_bytes_fails_softly() {
        let meta = extract(&[]);
        assert_eq!(meta, PhotoMetadata::default());
    }

    #[test]
    fn test_ascii_value_trims() {
        let value = Value::Ascii(vec![b"2024:09:24 17:05:00".to_vec()]);
        assert_eq!(
            ascii_value(&value),
            Some("2024:09:24 17:05:00".to_string())
        );
    }

    #[test]
    fn test_ascii_value_rejects_other_types() {
        let value = Value::Rational(vec![rational(1, 1)]);
        assert_eq!(ascii_value(&value), None);
    }
}
