//! DICOM-JSON rendering of datasets.
//!
//! Each element becomes an entry keyed by its 8-digit uppercase hex tag,
//! holding `"vr"` and at most one of `"Value"`, `"InlineBinary"` or
//! `"BulkDataURI"`. Entries are emitted in dataset insertion order.
//!
//! Decoding never consults the dictionary: the explicit `"vr"` of each entry
//! decides how its value is read, so private and unknown tags round-trip.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde_json::{Map, Number, Value as JsonValue};

use crate::codec::bulk::{BulkDataSink, BulkDataSource};
use crate::error::{DecodeError, EncodeError, ValidationError};
use crate::limits::{DEFAULT_BULK_DATA_THRESHOLD, MAX_SEQUENCE_DEPTH};
use crate::model::{Dataset, Element, Tag, Value, Vr, VrKind};

const KEY_VR: &str = "vr";
const KEY_VALUE: &str = "Value";
const KEY_INLINE_BINARY: &str = "InlineBinary";
const KEY_BULK_DATA_URI: &str = "BulkDataURI";

const PN_GROUPS: [&str; 3] = ["Alphabetic", "Ideographic", "Phonetic"];

/// Options for encoding datasets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncodeOptions {
    /// Binary payloads longer than this many bytes go to the bulk data sink,
    /// when one is attached.
    pub bulk_data_threshold: usize,
}

impl Default for EncodeOptions {
    fn default() -> Self {
        Self {
            bulk_data_threshold: DEFAULT_BULK_DATA_THRESHOLD,
        }
    }
}

impl EncodeOptions {
    /// Creates default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the bulk data threshold.
    pub fn with_bulk_data_threshold(mut self, threshold: usize) -> Self {
        self.bulk_data_threshold = threshold;
        self
    }
}

// =============================================================================
// ENCODING
// =============================================================================

/// Renders datasets as DICOM-JSON.
pub struct JsonEncoder<'s> {
    options: EncodeOptions,
    sink: Option<&'s mut dyn BulkDataSink>,
}

impl<'s> JsonEncoder<'s> {
    pub fn new(options: EncodeOptions) -> Self {
        Self {
            options,
            sink: None,
        }
    }

    /// Attaches a sink for payloads above the bulk data threshold.
    pub fn with_bulk_sink(mut self, sink: &'s mut dyn BulkDataSink) -> Self {
        self.sink = Some(sink);
        self
    }

    /// Encodes a dataset to a JSON object.
    pub fn encode(&mut self, dataset: &Dataset) -> Result<JsonValue, EncodeError> {
        self.encode_map(dataset).map(JsonValue::Object)
    }

    /// Encodes a dataset to the map of its entries.
    pub fn encode_map(&mut self, dataset: &Dataset) -> Result<Map<String, JsonValue>, EncodeError> {
        self.encode_dataset_at(dataset, 0)
    }

    /// Encodes one element to its entry object.
    pub fn encode_element(&mut self, element: &Element) -> Result<Map<String, JsonValue>, EncodeError> {
        self.encode_element_at(element, 0)
    }

    fn encode_dataset_at(
        &mut self,
        dataset: &Dataset,
        depth: usize,
    ) -> Result<Map<String, JsonValue>, EncodeError> {
        if depth > MAX_SEQUENCE_DEPTH {
            return Err(EncodeError::SequenceTooDeep {
                max: MAX_SEQUENCE_DEPTH,
            });
        }
        let mut map = Map::with_capacity(dataset.len());
        for element in dataset {
            let entry = self.encode_element_at(element, depth)?;
            map.insert(element.tag.to_hex(), JsonValue::Object(entry));
        }
        Ok(map)
    }

    fn encode_element_at(
        &mut self,
        element: &Element,
        depth: usize,
    ) -> Result<Map<String, JsonValue>, EncodeError> {
        let Element { tag, vr, value } = element;
        let (tag, vr) = (*tag, *vr);
        if !value.fits(vr) {
            return Err(ValidationError::ValueMismatch {
                tag,
                vr,
                value: value.variant_name(),
            }
            .into());
        }

        let mut entry = Map::new();
        entry.insert(KEY_VR.to_string(), JsonValue::from(vr.code()));

        match value {
            Value::Empty => {}
            Value::Strings(strings) => {
                let values = match vr.kind() {
                    VrKind::PersonName => strings.iter().map(|s| encode_person_name(s)).collect(),
                    VrKind::NumberText => strings.iter().map(|s| encode_number_text(s)).collect(),
                    _ => strings.iter().map(|s| JsonValue::from(s.as_str())).collect(),
                };
                entry.insert(KEY_VALUE.to_string(), JsonValue::Array(values));
            }
            Value::Ints(ints) => {
                let values = ints.iter().map(|&i| JsonValue::from(i)).collect();
                entry.insert(KEY_VALUE.to_string(), JsonValue::Array(values));
            }
            Value::Floats(floats) => {
                let values = floats
                    .iter()
                    .map(|&f| {
                        Number::from_f64(f)
                            .map(JsonValue::Number)
                            .ok_or(EncodeError::NonFiniteFloat { tag, value: f })
                    })
                    .collect::<Result<Vec<_>, _>>()?;
                entry.insert(KEY_VALUE.to_string(), JsonValue::Array(values));
            }
            Value::Tags(tags) => {
                let values = tags.iter().map(|t| JsonValue::from(t.to_hex())).collect();
                entry.insert(KEY_VALUE.to_string(), JsonValue::Array(values));
            }
            Value::Bytes(bytes) => {
                let threshold = self.options.bulk_data_threshold;
                match self.sink.as_deref_mut() {
                    Some(sink) if bytes.len() > threshold => {
                        let uri = sink.store(tag, bytes).map_err(|e| EncodeError::BulkDataSink {
                            tag,
                            message: e.to_string(),
                        })?;
                        entry.insert(KEY_BULK_DATA_URI.to_string(), JsonValue::from(uri));
                    }
                    _ => {
                        entry.insert(
                            KEY_INLINE_BINARY.to_string(),
                            JsonValue::from(STANDARD.encode(bytes)),
                        );
                    }
                }
            }
            Value::Sequence(items) => {
                let mut values = Vec::with_capacity(items.len());
                for item in items {
                    values.push(JsonValue::Object(self.encode_dataset_at(item, depth + 1)?));
                }
                entry.insert(KEY_VALUE.to_string(), JsonValue::Array(values));
            }
        }
        Ok(entry)
    }
}

/// `A=I=P` becomes `{"Alphabetic": "A", "Ideographic": "I", "Phonetic": "P"}`,
/// with only the groups that are present.
fn encode_person_name(name: &str) -> JsonValue {
    let mut obj = Map::new();
    for (key, group) in PN_GROUPS.iter().zip(name.splitn(3, '=')) {
        obj.insert(key.to_string(), JsonValue::from(group));
    }
    JsonValue::Object(obj)
}

/// DS and IS text is emitted as a JSON number only when the number renders
/// back to exactly the same text.
fn encode_number_text(text: &str) -> JsonValue {
    match text.parse::<Number>() {
        Ok(n) if n.to_string() == text => JsonValue::Number(n),
        _ => JsonValue::from(text),
    }
}

// =============================================================================
// DECODING
// =============================================================================

/// Rebuilds datasets from DICOM-JSON.
#[derive(Default)]
pub struct JsonDecoder<'s> {
    source: Option<&'s dyn BulkDataSource>,
}

impl<'s> JsonDecoder<'s> {
    pub fn new() -> Self {
        Self { source: None }
    }

    /// Attaches a source for resolving `BulkDataURI` values.
    pub fn with_bulk_source(mut self, source: &'s dyn BulkDataSource) -> Self {
        self.source = Some(source);
        self
    }

    /// Decodes a JSON object to a dataset.
    pub fn decode(&self, json: &JsonValue) -> Result<Dataset, DecodeError> {
        match json {
            JsonValue::Object(map) => self.decode_map(map),
            _ => Err(DecodeError::MalformedDocument {
                tag: None,
                reason: "dataset is not a JSON object",
            }),
        }
    }

    /// Decodes the map of entries to a dataset.
    pub fn decode_map(&self, map: &Map<String, JsonValue>) -> Result<Dataset, DecodeError> {
        self.decode_map_at(map, 0)
    }

    /// Decodes one entry, given its tag.
    pub fn decode_element(&self, tag: Tag, entry: &JsonValue) -> Result<Element, DecodeError> {
        self.decode_element_at(tag, entry, 0)
    }

    fn decode_map_at(&self, map: &Map<String, JsonValue>, depth: usize) -> Result<Dataset, DecodeError> {
        if depth > MAX_SEQUENCE_DEPTH {
            return Err(DecodeError::SequenceTooDeep {
                max: MAX_SEQUENCE_DEPTH,
            });
        }
        let mut dataset = Dataset::new();
        for (key, entry) in map {
            let tag = Tag::from_hex(key).ok_or_else(|| DecodeError::InvalidTagKey { key: key.clone() })?;
            dataset.insert(self.decode_element_at(tag, entry, depth)?);
        }
        Ok(dataset)
    }

    fn decode_element_at(&self, tag: Tag, entry: &JsonValue, depth: usize) -> Result<Element, DecodeError> {
        let JsonValue::Object(obj) = entry else {
            return Err(DecodeError::MalformedDocument {
                tag: Some(tag),
                reason: "element is not a JSON object",
            });
        };

        let mut vr = None;
        let mut payload = None;
        for (key, field) in obj {
            match key.as_str() {
                KEY_VR => {
                    let code = field.as_str().ok_or(DecodeError::MalformedDocument {
                        tag: Some(tag),
                        reason: "\"vr\" is not a string",
                    })?;
                    vr = Some(Vr::from_code(code)?);
                }
                KEY_VALUE | KEY_INLINE_BINARY | KEY_BULK_DATA_URI => {
                    if payload.is_some() {
                        return Err(DecodeError::MalformedDocument {
                            tag: Some(tag),
                            reason: "element has more than one value key",
                        });
                    }
                    payload = Some((key.as_str(), field));
                }
                _ => {
                    return Err(DecodeError::UnexpectedKey {
                        tag,
                        key: key.clone(),
                    });
                }
            }
        }
        let vr = vr.ok_or(DecodeError::MalformedDocument {
            tag: Some(tag),
            reason: "element has no \"vr\"",
        })?;

        let value = match payload {
            None => Value::Empty,
            Some((KEY_VALUE, field)) => self.decode_value(tag, vr, field, depth)?,
            Some((KEY_INLINE_BINARY, field)) => {
                expect_binary(tag, vr)?;
                let text = field.as_str().ok_or(DecodeError::UnexpectedJsonType {
                    tag,
                    vr,
                    expected: "base64 string",
                })?;
                Value::Bytes(STANDARD.decode(text).map_err(|_| DecodeError::InvalidBase64 { tag })?)
            }
            Some((_, field)) => {
                expect_binary(tag, vr)?;
                let uri = field.as_str().ok_or(DecodeError::UnexpectedJsonType {
                    tag,
                    vr,
                    expected: "URI string",
                })?;
                Value::Bytes(self.fetch_bulk(tag, uri)?)
            }
        };
        Ok(Element { tag, vr, value })
    }

    fn fetch_bulk(&self, tag: Tag, uri: &str) -> Result<Vec<u8>, DecodeError> {
        let source = self.source.ok_or_else(|| DecodeError::UnresolvedBulkData {
            tag,
            uri: uri.to_string(),
        })?;
        source.fetch(uri).map_err(|e| DecodeError::BulkDataUnavailable {
            tag,
            uri: uri.to_string(),
            message: e.to_string(),
        })
    }

    fn decode_value(&self, tag: Tag, vr: Vr, field: &JsonValue, depth: usize) -> Result<Value, DecodeError> {
        let mismatch = |expected: &'static str| DecodeError::UnexpectedJsonType { tag, vr, expected };
        let items = field.as_array().ok_or_else(|| mismatch("array under \"Value\""))?;

        let value = match vr.kind() {
            VrKind::Text => Value::Strings(
                items
                    .iter()
                    .map(|item| match item {
                        JsonValue::String(s) => Ok(s.clone()),
                        JsonValue::Null => Ok(String::new()),
                        _ => Err(mismatch("string")),
                    })
                    .collect::<Result<_, _>>()?,
            ),
            VrKind::NumberText => Value::Strings(
                items
                    .iter()
                    .map(|item| match item {
                        JsonValue::String(s) => Ok(s.clone()),
                        JsonValue::Number(n) => Ok(n.to_string()),
                        JsonValue::Null => Ok(String::new()),
                        _ => Err(mismatch("number or numeric string")),
                    })
                    .collect::<Result<_, _>>()?,
            ),
            VrKind::PersonName => Value::Strings(
                items
                    .iter()
                    .map(|item| decode_person_name(tag, item))
                    .collect::<Result<_, _>>()?,
            ),
            VrKind::Integer => Value::Ints(
                items
                    .iter()
                    .map(|item| item.as_i64().ok_or_else(|| mismatch("integer in i64 range")))
                    .collect::<Result<_, _>>()?,
            ),
            VrKind::Float => Value::Floats(
                items
                    .iter()
                    .map(|item| item.as_f64().ok_or_else(|| mismatch("number")))
                    .collect::<Result<_, _>>()?,
            ),
            VrKind::AttributeTag => Value::Tags(
                items
                    .iter()
                    .map(|item| {
                        item.as_str()
                            .and_then(Tag::from_hex)
                            .ok_or_else(|| mismatch("8-digit hex tag string"))
                    })
                    .collect::<Result<_, _>>()?,
            ),
            VrKind::Sequence => {
                let mut datasets = Vec::with_capacity(items.len());
                for item in items {
                    let map = item.as_object().ok_or_else(|| mismatch("object as sequence item"))?;
                    datasets.push(self.decode_map_at(map, depth + 1)?);
                }
                Value::Sequence(datasets)
            }
            VrKind::Binary => return Err(mismatch("InlineBinary or BulkDataURI")),
        };
        Ok(value)
    }
}

fn expect_binary(tag: Tag, vr: Vr) -> Result<(), DecodeError> {
    if vr.is_bytes_like() {
        Ok(())
    } else {
        Err(DecodeError::UnexpectedJsonType {
            tag,
            vr,
            expected: "\"Value\" for a non-binary VR",
        })
    }
}

fn decode_person_name(tag: Tag, item: &JsonValue) -> Result<String, DecodeError> {
    let obj = match item {
        JsonValue::Object(obj) => obj,
        JsonValue::String(s) => return Ok(s.clone()),
        JsonValue::Null => return Ok(String::new()),
        _ => {
            return Err(DecodeError::UnexpectedJsonType {
                tag,
                vr: Vr::PN,
                expected: "person name object",
            });
        }
    };

    let mut groups: [Option<&str>; 3] = [None; 3];
    for (key, group) in obj {
        let slot = PN_GROUPS
            .iter()
            .position(|g| *g == key.as_str())
            .ok_or_else(|| DecodeError::UnexpectedKey { tag, key: key.clone() })?;
        groups[slot] = Some(group.as_str().ok_or(DecodeError::UnexpectedJsonType {
            tag,
            vr: Vr::PN,
            expected: "string name component group",
        })?);
    }

    let present = groups.iter().rposition(Option::is_some).map_or(0, |last| last + 1);
    Ok(groups[..present]
        .iter()
        .map(|g| g.unwrap_or(""))
        .collect::<Vec<_>>()
        .join("="))
}

// =============================================================================
// CONVENIENCE
// =============================================================================

/// Encodes a dataset with explicit options and an optional bulk data sink.
pub fn encode_dataset(
    dataset: &Dataset,
    options: &EncodeOptions,
    sink: Option<&mut dyn BulkDataSink>,
) -> Result<JsonValue, EncodeError> {
    let mut encoder = JsonEncoder::new(*options);
    if let Some(sink) = sink {
        encoder = encoder.with_bulk_sink(sink);
    }
    encoder.encode(dataset)
}

/// Decodes a dataset with an optional bulk data source.
pub fn decode_dataset(json: &JsonValue, source: Option<&dyn BulkDataSource>) -> Result<Dataset, DecodeError> {
    let mut decoder = JsonDecoder::new();
    if let Some(source) = source {
        decoder = decoder.with_bulk_source(source);
    }
    decoder.decode(json)
}

/// Encodes a dataset with default options, inlining every payload.
pub fn to_json(dataset: &Dataset) -> Result<JsonValue, EncodeError> {
    JsonEncoder::new(EncodeOptions::default()).encode(dataset)
}

/// Decodes a dataset that carries no bulk data references.
pub fn from_json(json: &JsonValue) -> Result<Dataset, DecodeError> {
    JsonDecoder::new().decode(json)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::bulk::InMemoryBulkStore;
    use crate::model::DatasetBuilder;
    use proptest::prelude::*;
    use serde_json::json;

    fn sample() -> Dataset {
        DatasetBuilder::new()
            .text("PatientName", "Doe^John")
            .text("PatientID", "1234")
            .text("SliceThickness", "+10.4")
            .value("ImagePositionPatient", vec!["-125".to_string(), "12.5".to_string(), "0".to_string()])
            .int("Rows", 2)
            .float("SpiralPitchFactor", 0.8)
            .value("FrameIncrementPointer", Tag::new(0x0018, 0x1063))
            .bytes("PixelData", vec![0x13u8, 0x00])
            .empty("StudyDescription")
            .sequence("ReferencedStudySequence", |s| {
                s.item(|i| i.text("ReferencedSOPInstanceUID", "1.2.3"))
            })
            .value_with_vr("00291010", Vr::UN, vec![1u8, 2, 3])
            .build()
            .unwrap()
    }

    #[test]
    fn test_encode_shape() {
        let json = to_json(&sample()).unwrap();
        assert_eq!(json["00100010"], json!({"vr": "PN", "Value": [{"Alphabetic": "Doe^John"}]}));
        assert_eq!(json["00100020"], json!({"vr": "LO", "Value": ["1234"]}));
        assert_eq!(json["00180050"], json!({"vr": "DS", "Value": ["+10.4"]}));
        assert_eq!(json["00200032"], json!({"vr": "DS", "Value": [-125, 12.5, 0]}));
        assert_eq!(json["00280010"], json!({"vr": "US", "Value": [2]}));
        assert_eq!(json["00280009"], json!({"vr": "AT", "Value": ["00181063"]}));
        assert_eq!(json["7FE00010"], json!({"vr": "OW", "InlineBinary": "EwA="}));
        assert_eq!(json["00081030"], json!({"vr": "LO"}));
        assert_eq!(
            json["00081110"],
            json!({"vr": "SQ", "Value": [{"00081155": {"vr": "UI", "Value": ["1.2.3"]}}]})
        );
        assert_eq!(json["00291010"], json!({"vr": "UN", "InlineBinary": "AQID"}));
    }

    #[test]
    fn test_encode_keeps_insertion_order() {
        let json = to_json(&sample()).unwrap();
        let keys: Vec<&str> = json.as_object().unwrap().keys().map(String::as_str).collect();
        assert_eq!(&keys[..3], &["00100010", "00100020", "00180050"]);
    }

    #[test]
    fn test_roundtrip_sample() {
        let ds = sample();
        let decoded = from_json(&to_json(&ds).unwrap()).unwrap();
        assert_eq!(decoded, ds);
        let order: Vec<Tag> = decoded.tags().collect();
        assert_eq!(order, ds.tags().collect::<Vec<_>>());
    }

    #[test]
    fn test_ob_bytes_exact() {
        let ds = DatasetBuilder::new()
            .value_with_vr("00091001", Vr::OB, vec![0x13u8, 0x00])
            .build()
            .unwrap();
        let decoded = from_json(&to_json(&ds).unwrap()).unwrap();
        assert_eq!(
            decoded.value(Tag::new(0x0009, 0x1001)).and_then(Value::as_bytes),
            Some(&b"\x13\x00"[..])
        );
    }

    #[test]
    fn test_person_name_groups() {
        for name in ["Doe^John", "A=B", "A==C", "=B", "", "A=B=C=D"] {
            let ds = DatasetBuilder::new().text("PatientName", name).build().unwrap();
            let decoded = from_json(&to_json(&ds).unwrap()).unwrap();
            assert_eq!(decoded, ds, "name {name:?}");
        }
        let json = to_json(&DatasetBuilder::new().text("PatientName", "A=B").build().unwrap()).unwrap();
        assert_eq!(json["00100010"]["Value"][0], json!({"Alphabetic": "A", "Ideographic": "B"}));
    }

    #[test]
    fn test_number_text_rendering() {
        assert_eq!(encode_number_text("12"), json!(12));
        assert_eq!(encode_number_text("12.5"), json!(12.5));
        assert_eq!(encode_number_text("+10.4"), json!("+10.4"));
        assert_eq!(encode_number_text("10.40"), json!("10.40"));
        assert_eq!(encode_number_text(" 1"), json!(" 1"));
        assert_eq!(encode_number_text("1e3"), json!("1e3"));
    }

    #[test]
    fn test_value_mismatch() {
        let mut ds = Dataset::new();
        ds.put_with_vr("PatientID", Vr::LO, 5i64).unwrap();
        let err = to_json(&ds).unwrap_err();
        assert_eq!(
            err,
            EncodeError::Validation(ValidationError::ValueMismatch {
                tag: Tag::new(0x0010, 0x0020),
                vr: Vr::LO,
                value: "integer",
            })
        );
    }

    #[test]
    fn test_non_finite_float() {
        let ds = DatasetBuilder::new().float("SpiralPitchFactor", f64::NAN).build().unwrap();
        assert!(matches!(to_json(&ds), Err(EncodeError::NonFiniteFloat { .. })));
    }

    #[test]
    fn test_bulk_threshold() {
        let payload: Vec<u8> = (0..64u8).collect();
        let ds = DatasetBuilder::new()
            .bytes("PixelData", payload.clone())
            .value_with_vr("00091001", Vr::OB, vec![1u8, 2])
            .build()
            .unwrap();

        let mut store = InMemoryBulkStore::new();
        let options = EncodeOptions::new().with_bulk_data_threshold(16);
        let json = encode_dataset(&ds, &options, Some(&mut store)).unwrap();

        assert_eq!(json["7FE00010"]["BulkDataURI"], json!("bulk:0"));
        assert!(json["00091001"].get("InlineBinary").is_some());
        assert_eq!(store.len(), 1);

        let decoded = decode_dataset(&json, Some(&store)).unwrap();
        assert_eq!(decoded, ds);

        let err = from_json(&json).unwrap_err();
        assert!(matches!(err, DecodeError::UnresolvedBulkData { .. }));
    }

    #[test]
    fn test_threshold_without_sink_inlines() {
        let ds = DatasetBuilder::new().bytes("PixelData", vec![7u8; 64]).build().unwrap();
        let options = EncodeOptions::new().with_bulk_data_threshold(16);
        let json = encode_dataset(&ds, &options, None).unwrap();
        assert!(json["7FE00010"].get("InlineBinary").is_some());
    }

    #[test]
    fn test_decode_rejects_bad_documents() {
        let bad_key = json!({"0010002": {"vr": "LO"}});
        assert!(matches!(from_json(&bad_key), Err(DecodeError::InvalidTagKey { .. })));

        let no_vr = json!({"00100020": {"Value": ["x"]}});
        assert!(matches!(
            from_json(&no_vr),
            Err(DecodeError::MalformedDocument { tag: Some(_), .. })
        ));

        let bad_vr = json!({"00100020": {"vr": "XX"}});
        assert!(matches!(from_json(&bad_vr), Err(DecodeError::Lookup(_))));

        let stray = json!({"00100020": {"vr": "LO", "annotation": null}});
        assert_eq!(
            from_json(&stray).unwrap_err(),
            DecodeError::UnexpectedKey {
                tag: Tag::new(0x0010, 0x0020),
                key: "annotation".to_string()
            }
        );

        let bad_b64 = json!({"7FE00010": {"vr": "OW", "InlineBinary": "!!"}});
        assert!(matches!(from_json(&bad_b64), Err(DecodeError::InvalidBase64 { .. })));

        let value_on_binary = json!({"7FE00010": {"vr": "OW", "Value": [1]}});
        assert!(matches!(from_json(&value_on_binary), Err(DecodeError::UnexpectedJsonType { .. })));

        let inline_on_text = json!({"00100020": {"vr": "LO", "InlineBinary": "AA=="}});
        assert!(matches!(from_json(&inline_on_text), Err(DecodeError::UnexpectedJsonType { .. })));

        assert!(matches!(from_json(&json!([])), Err(DecodeError::MalformedDocument { tag: None, .. })));
    }

    #[test]
    fn test_decode_null_string_is_empty() {
        let json = json!({"00080008": {"vr": "CS", "Value": ["ORIGINAL", null, "AXIAL"]}});
        let ds = from_json(&json).unwrap();
        assert_eq!(
            ds.value(Tag::new(0x0008, 0x0008)).and_then(Value::as_strings),
            Some(&["ORIGINAL".to_string(), String::new(), "AXIAL".to_string()][..])
        );
    }

    #[test]
    fn test_unknown_tag_keeps_explicit_vr() {
        let json = json!({"00431028": {"vr": "SS", "Value": [-3]}});
        let ds = from_json(&json).unwrap();
        let el = ds.element(Tag::new(0x0043, 0x1028)).unwrap();
        assert_eq!(el.vr, Vr::SS);
        assert_eq!(el.value, Value::from(-3i64));
        assert_eq!(to_json(&ds).unwrap(), json);
    }

    fn leaf_element() -> impl Strategy<Value = (Vr, Value)> + Clone {
        prop_oneof![
            "[ -~]{0,24}".prop_map(|s| (Vr::LO, Value::text(s))),
            prop::collection::vec("[A-Z0-9_ ]{0,8}", 1..4).prop_map(|v| (Vr::CS, Value::Strings(v))),
            "[A-Za-z^=]{0,20}".prop_map(|s| (Vr::PN, Value::text(s))),
            "[+-]?[0-9]{1,5}(\\.[0-9]{1,4})?".prop_map(|s| (Vr::DS, Value::text(s))),
            any::<i32>().prop_map(|i| (Vr::IS, Value::text(i.to_string()))),
            prop::collection::vec(any::<i64>(), 1..4).prop_map(|v| (Vr::SL, Value::Ints(v))),
            prop::collection::vec(any::<f64>().prop_filter("finite", |f| f.is_finite()), 1..4)
                .prop_map(|v| (Vr::FD, Value::Floats(v))),
            any::<u32>().prop_map(|t| (Vr::AT, Value::from(Tag(t)))),
            prop::collection::vec(any::<u8>(), 0..48).prop_map(|b| (Vr::OB, Value::Bytes(b))),
            prop::collection::vec(any::<u8>(), 0..48).prop_map(|b| (Vr::UN, Value::Bytes(b))),
            Just((Vr::DA, Value::Empty)),
        ]
    }

    fn dataset_strategy() -> impl Strategy<Value = Dataset> + Clone {
        let flat = prop::collection::btree_map(any::<u32>(), leaf_element(), 0..8).prop_map(|m| {
            m.into_iter()
                .map(|(tag, (vr, value))| Element::new(Tag(tag), vr, value))
                .collect::<Dataset>()
        });
        (flat.clone(), prop::collection::vec(flat, 0..3), any::<u32>()).prop_map(|(mut ds, items, tag)| {
            ds.insert(Element::new(Tag(tag), Vr::SQ, Value::Sequence(items)));
            ds
        })
    }

    proptest! {
        #[test]
        fn prop_json_roundtrip(ds in dataset_strategy()) {
            let json = to_json(&ds).unwrap();
            let decoded = from_json(&json).unwrap();
            prop_assert_eq!(&decoded, &ds);

            let text = serde_json::to_string(&json).unwrap();
            let reparsed: JsonValue = serde_json::from_str(&text).unwrap();
            prop_assert_eq!(from_json(&reparsed).unwrap(), ds);
        }
    }
}
