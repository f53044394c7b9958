//! Storage literal codec for embedding vectors.
//!
//! pgvector's input syntax is a bracketed comma-separated list of numbers,
//! e.g. `[0.1,0.2,0.3]`. Rows are written by binding this literal with a
//! `::vector` cast, matching the wire contract of the existing store.

use trove_core::{Error, Result, Vector};

/// Serialize a vector as a pgvector input literal.
///
/// Numbers in order, comma separated, no trailing separator.
pub fn to_storage_literal(vector: &Vector) -> String {
    let mut out = String::with_capacity(vector.as_slice().len() * 10 + 2);
    out.push('[');
    for (i, v) in vector.as_slice().iter().enumerate() {
        if i > 0 {
            out.push(',');
        }
        out.push_str(&v.to_string());
    }
    out.push(']');
    out
}

/// Parse a pgvector literal back into a vector.
///
/// Round-trip guarantee: `parse_storage_literal(&to_storage_literal(v))`
/// equals `v` elementwise within floating-point tolerance.
pub fn parse_storage_literal(literal: &str) -> Result<Vector> {
    let trimmed = literal.trim();
    let inner = trimmed
        .strip_prefix('[')
        .and_then(|s| s.strip_suffix(']'))
        .ok_or_else(|| {
            Error::Serialization(format!("Not a vector literal: {:?}", literal))
        })?;

    if inner.trim().is_empty() {
        return Ok(Vector::from(Vec::<f32>::new()));
    }

    let values = inner
        .split(',')
        .map(|part| {
            part.trim()
                .parse::<f32>()
                .map_err(|e| Error::Serialization(format!("Bad vector element {:?}: {}", part, e)))
        })
        .collect::<Result<Vec<f32>>>()?;

    Ok(Vector::from(values))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_literal_format() {
        let v = Vector::from(vec![0.1f32, 0.2, 0.3]);
        assert_eq!(to_storage_literal(&v), "[0.1,0.2,0.3]");
    }

    #[test]
    fn test_no_trailing_separator() {
        let v = Vector::from(vec![1.0f32]);
        assert_eq!(to_storage_literal(&v), "[1]");
    }

    #[test]
    fn test_round_trip_within_tolerance() {
        let values: Vec<f32> = (0..64).map(|i| (i as f32 * 0.37).sin()).collect();
        let v = Vector::from(values.clone());
        let parsed = parse_storage_literal(&to_storage_literal(&v)).unwrap();
        for (a, b) in values.iter().zip(parsed.as_slice()) {
            assert!((a - b).abs() < 1e-6, "{} vs {}", a, b);
        }
    }

    #[test]
    fn test_parse_empty_vector() {
        let parsed = parse_storage_literal("[]").unwrap();
        assert!(parsed.as_slice().is_empty());
    }

    #[test]
    fn test_parse_tolerates_spaces() {
        let parsed = parse_storage_literal(" [0.5, 1.5] ").unwrap();
        assert_eq!(parsed.as_slice(), &[0.5, 1.5]);
    }

    #[test]
    fn test_parse_rejects_missing_brackets() {
        assert!(matches!(
            parse_storage_literal("0.1,0.2").unwrap_err(),
            Error::Serialization(_)
        ));
    }

    #[test]
    fn test_parse_rejects_bad_element() {
        assert!(matches!(
            parse_storage_literal("[0.1,abc]").unwrap_err(),
            Error::Serialization(_)
        ));
    }
}
