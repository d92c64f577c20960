use serde::{Serialize, de::DeserializeOwned};

use crate::error::{Error, Result};

/// Serialization format for telemetry data.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Format {
    /// JSON format (human-readable, good for debugging).
    #[default]
    Json,

    /// CBOR format (compact binary).
    Cbor,
}

/// Encode a value to bytes using the specified format.
pub fn encode<T: Serialize>(value: &T, format: Format) -> Result<Vec<u8>> {
    match format {
        Format::Json => serde_json::to_vec(value).map_err(Error::from),
        Format::Cbor => {
            let mut buf = Vec::new();
            ciborium::into_writer(value, &mut buf)?;
            Ok(buf)
        }
    }
}

/// Decode bytes to a value using the specified format.
pub fn decode<T: DeserializeOwned>(data: &[u8], format: Format) -> Result<T> {
    match format {
        Format::Json => serde_json::from_slice(data).map_err(Error::from),
        Format::Cbor => ciborium::from_reader(data).map_err(|e| Error::Cbor(e.to_string())),
    }
}

/// Try to auto-detect the format from the data.
///
/// Returns `Json` if the data starts with `{` or `[`, otherwise `Cbor`.
pub fn detect_format(data: &[u8]) -> Format {
    match data.first() {
        Some(b'{') | Some(b'[') => Format::Json,
        _ => Format::Cbor,
    }
}

/// Decode bytes, auto-detecting the format.
pub fn decode_auto<T: DeserializeOwned>(data: &[u8]) -> Result<T> {
    let format = detect_format(data);
    decode(data, format)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::telemetry::{Dimension, DimensionSet, MetricBatch, MetricRecord, Unit};

    fn sample_batch() -> MetricBatch {
        let mut dims = DimensionSet::new();
        dims.insert(Dimension::new("InstanceId", "i-0abc").unwrap());

        MetricBatch {
            namespace: "System/Linux".to_string(),
            source: "host01".to_string(),
            records: vec![
                MetricRecord::new("MemoryUtilization", 1_700_000_000_000, Unit::Percent, 25.0)
                    .with_dimensions(dims.clone()),
                MetricRecord::new("MemoryUsed", 1_700_000_000_000, Unit::Bytes, 250.0)
                    .with_dimensions(dims),
            ],
        }
    }

    #[test]
    fn test_json_roundtrip() {
        let batch = sample_batch();

        let encoded = encode(&batch, Format::Json).unwrap();
        let decoded: MetricBatch = decode(&encoded, Format::Json).unwrap();

        assert_eq!(batch, decoded);
    }

    #[test]
    fn test_cbor_roundtrip() {
        let batch = sample_batch();

        let encoded = encode(&batch, Format::Cbor).unwrap();
        let decoded: MetricBatch = decode(&encoded, Format::Cbor).unwrap();

        assert_eq!(batch, decoded);
    }

    #[test]
    fn test_cbor_is_smaller() {
        let batch = sample_batch();

        let json = encode(&batch, Format::Json).unwrap();
        let cbor = encode(&batch, Format::Cbor).unwrap();

        assert!(cbor.len() < json.len(), "CBOR should be smaller than JSON");
    }

    #[test]
    fn test_format_detection() {
        assert_eq!(detect_format(b"{\"key\": \"value\"}"), Format::Json);
        assert_eq!(detect_format(b"[1, 2, 3]"), Format::Json);
        assert_eq!(detect_format(b"\xa1\x63key\x65value"), Format::Cbor);
    }

    #[test]
    fn test_auto_decode() {
        let batch = sample_batch();

        let cbor = encode(&batch, Format::Cbor).unwrap();
        let decoded: MetricBatch = decode_auto(&cbor).unwrap();
        assert_eq!(decoded.namespace, "System/Linux");
        assert_eq!(decoded.records.len(), 2);
    }
}
