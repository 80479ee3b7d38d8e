//! Reading and writing bare DICOM-JSON datasets.
//!
//! Documents are written with four-space indentation so that they diff and
//! edit well by hand.

use std::io::{Read, Write};

use serde::Serialize;
use serde_json::Value as JsonValue;
use serde_json::ser::{PrettyFormatter, Serializer};

use crate::codec;
use crate::error::Error;
use crate::model::Dataset;

const INDENT: &[u8] = b"    ";

/// Renders JSON with four-space indentation and a trailing newline.
pub fn to_pretty_vec(value: &JsonValue) -> Result<Vec<u8>, Error> {
    let mut out = Vec::new();
    let mut serializer = Serializer::with_formatter(&mut out, PrettyFormatter::with_indent(INDENT));
    value.serialize(&mut serializer)?;
    out.push(b'\n');
    Ok(out)
}

/// Writes a dataset as a bare DICOM-JSON document.
pub fn save_dataset(dataset: &Dataset, mut writer: impl Write) -> Result<(), Error> {
    let bytes = to_pretty_vec(&codec::to_json(dataset)?)?;
    writer
        .write_all(&bytes)
        .map_err(|e| Error::io("<writer>", e))
}

/// Reads a dataset from a bare DICOM-JSON document.
pub fn load_dataset(reader: impl Read) -> Result<Dataset, Error> {
    let json: JsonValue = serde_json::from_reader(reader)?;
    Ok(codec::from_json(&json)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::model::DatasetBuilder;

    #[test]
    fn test_save_load_roundtrip() {
        let dataset = DatasetBuilder::new()
            .text("PatientName", "Doe^Jane")
            .text("PatientID", "1234")
            .bytes("PixelData", vec![1u8, 2, 3, 4])
            .build()
            .unwrap();

        let mut buffer = Vec::new();
        save_dataset(&dataset, &mut buffer).unwrap();
        let loaded = load_dataset(buffer.as_slice()).unwrap();
        assert_eq!(loaded, dataset);
    }

    #[test]
    fn test_floats_survive_text_exactly() {
        let floats = vec![-5.009810549492627e-45, 0.1 + 0.2, 5e-324];
        let dataset = DatasetBuilder::new()
            .float("SpiralPitchFactor", -5.009810549492627e-45)
            .value("ReconstructionTargetCenterPatient", floats)
            .build()
            .unwrap();

        let mut buffer = Vec::new();
        save_dataset(&dataset, &mut buffer).unwrap();
        let loaded = load_dataset(buffer.as_slice()).unwrap();
        assert_eq!(loaded, dataset);

        let pitch = loaded.get("SpiralPitchFactor").unwrap().unwrap();
        assert_eq!(pitch.value.as_floats(), Some(&[-5.009810549492627e-45][..]));
    }

    #[test]
    fn test_four_space_indent() {
        let dataset = DatasetBuilder::new().text("PatientID", "1234").build().unwrap();
        let mut buffer = Vec::new();
        save_dataset(&dataset, &mut buffer).unwrap();
        let text = String::from_utf8(buffer).unwrap();
        assert!(text.starts_with("{\n    \"00100020\": {\n        \"vr\": \"LO\""));
        assert!(text.ends_with("}\n"));
    }

    #[test]
    fn test_load_rejects_bad_documents() {
        let err = load_dataset("not json".as_bytes()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Decode);

        let err = load_dataset(r#"{"00100020": {"Value": ["x"]}}"#.as_bytes()).unwrap_err();
        assert!(matches!(err, Error::Decode(_)));
    }
}
