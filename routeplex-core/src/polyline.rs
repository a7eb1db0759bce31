//! Encoded polyline decoding
//!
//! Vendors return route geometry in the compact polyline format: each
//! latitude/longitude delta is zig-zag encoded, split into 5-bit groups,
//! offset by 63 and chained with the 0x20 continuation bit.

use crate::protocol::Coordinate;
use thiserror::Error;

/// Precision used by both Google and Mapbox for route geometry
pub const DEFAULT_PRECISION: u32 = 5;

const GROUP_OFFSET: u8 = 63;
const CONTINUATION_BIT: u64 = 0x20;
const GROUP_MASK: u64 = 0x1f;

/// Errors produced by malformed polyline input
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// Input ended inside a continuation group
    #[error("polyline truncated: expected another byte at offset {offset}")]
    Truncated { offset: usize },

    /// Byte outside the polyline alphabet
    #[error("invalid polyline byte 0x{byte:02x} at offset {offset}")]
    InvalidByte { offset: usize, byte: u8 },

    /// Group chain too long for a 64-bit accumulator
    #[error("polyline value overflows at offset {offset}")]
    Overflow { offset: usize },

    /// Precision too large to scale
    #[error("unsupported polyline precision {0}")]
    Precision(u32),
}

/// Decode an optional polyline; `None` and `""` both yield no points
pub fn decode(encoded: Option<&str>, precision: u32) -> Result<Vec<Coordinate>, DecodeError> {
    match encoded {
        Some(encoded) => decode_str(encoded, precision),
        None => Ok(Vec::new()),
    }
}

/// Decode a polyline string at the given precision
pub fn decode_str(encoded: &str, precision: u32) -> Result<Vec<Coordinate>, DecodeError> {
    if encoded.is_empty() {
        return Ok(Vec::new());
    }

    let factor = 10_i64
        .checked_pow(precision)
        .ok_or(DecodeError::Precision(precision))? as f64;

    let bytes = encoded.as_bytes();
    let mut cursor = 0;
    let mut lat: i64 = 0;
    let mut lng: i64 = 0;
    let mut coordinates = Vec::new();

    while cursor < bytes.len() {
        lat = lat
            .checked_add(next_delta(bytes, &mut cursor)?)
            .ok_or(DecodeError::Overflow { offset: cursor })?;
        lng = lng
            .checked_add(next_delta(bytes, &mut cursor)?)
            .ok_or(DecodeError::Overflow { offset: cursor })?;

        coordinates.push(Coordinate::new(lat as f64 / factor, lng as f64 / factor));
    }

    Ok(coordinates)
}

/// Read one zig-zag encoded value starting at `cursor`
fn next_delta(bytes: &[u8], cursor: &mut usize) -> Result<i64, DecodeError> {
    let mut result: u64 = 0;
    let mut shift: u32 = 0;

    loop {
        let offset = *cursor;
        let byte = *bytes.get(offset).ok_or(DecodeError::Truncated { offset })?;
        let group = u64::from(
            byte.checked_sub(GROUP_OFFSET)
                .filter(|group| *group < 64)
                .ok_or(DecodeError::InvalidByte { offset, byte })?,
        );
        let bits = group & GROUP_MASK;
        // Payload bits that would fall off the top of the accumulator
        if shift >= u64::BITS || bits.checked_shr(u64::BITS - shift).unwrap_or(0) != 0 {
            return Err(DecodeError::Overflow { offset });
        }

        result |= bits << shift;
        shift += 5;
        *cursor += 1;

        if group < CONTINUATION_BIT {
            break;
        }
    }

    let magnitude = (result >> 1) as i64;
    Ok(if result & 1 != 0 { !magnitude } else { magnitude })
}

#[cfg(test)]
mod tests {
    use super::*;

    const REFERENCE: &str = "_p~iF~ps|U_ulLnnqC_mqNvxq`@";

    fn assert_close(actual: &[Coordinate], expected: &[(f64, f64)]) {
        assert_eq!(actual.len(), expected.len());
        for (point, (lat, lng)) in actual.iter().zip(expected) {
            assert!((point.lat - lat).abs() < 1e-9, "lat {} != {}", point.lat, lat);
            assert!((point.lng - lng).abs() < 1e-9, "lng {} != {}", point.lng, lng);
        }
    }

    #[test]
    fn test_reference_vector() {
        let points = decode_str(REFERENCE, 5).unwrap();
        assert_close(
            &points,
            &[(38.5, -120.2), (40.7, -120.95), (43.252, -126.453)],
        );
    }

    #[test]
    fn test_empty_and_none() {
        assert!(decode(None, 5).unwrap().is_empty());
        assert!(decode(Some(""), 5).unwrap().is_empty());
        assert!(decode(Some(""), 0).unwrap().is_empty());
    }

    #[test]
    fn test_precision_six() {
        // Same integers, one more decimal place
        let points = decode_str(REFERENCE, 6).unwrap();
        assert_close(
            &points,
            &[(3.85, -12.02), (4.07, -12.095), (4.3252, -12.6453)],
        );
    }

    #[test]
    fn test_truncated_inside_group() {
        // Drop the last byte of the final longitude group
        let truncated = &REFERENCE[..REFERENCE.len() - 1];
        let err = decode_str(truncated, 5).unwrap_err();
        assert_eq!(
            err,
            DecodeError::Truncated {
                offset: truncated.len()
            }
        );
    }

    #[test]
    fn test_missing_longitude() {
        // A complete latitude with no longitude after it
        let err = decode_str("_p~iF", 5).unwrap_err();
        assert_eq!(err, DecodeError::Truncated { offset: 5 });
    }

    #[test]
    fn test_invalid_byte() {
        let err = decode_str("_p~iF ps|U", 5).unwrap_err();
        assert_eq!(
            err,
            DecodeError::InvalidByte {
                offset: 5,
                byte: b' '
            }
        );
    }

    #[test]
    fn test_endless_continuation_overflows() {
        let encoded = "~".repeat(20);
        let err = decode_str(&encoded, 5).unwrap_err();
        assert!(matches!(err, DecodeError::Overflow { .. }));
    }

    #[test]
    fn test_thirteenth_group_keeps_every_bit() {
        // Twelve empty continuation groups put the thirteenth at shift 60
        let prefix = "_".repeat(12);

        // 0x10 needs bit 64
        let err = decode_str(&format!("{}O", prefix), 5).unwrap_err();
        assert_eq!(err, DecodeError::Overflow { offset: 12 });

        // 0x02 lands on bit 61 and still fits
        let points = decode_str(&format!("{}A?", prefix), 0).unwrap();
        assert_eq!(points, vec![Coordinate::new((1u64 << 60) as f64, 0.0)]);
    }

    #[test]
    fn test_precision_out_of_range() {
        assert_eq!(decode_str("??", 40).unwrap_err(), DecodeError::Precision(40));
    }

    #[test]
    fn test_zero_deltas() {
        // '?' encodes 0
        let points = decode_str("????", 5).unwrap();
        assert_eq!(points, vec![Coordinate::new(0.0, 0.0), Coordinate::new(0.0, 0.0)]);
    }
}
