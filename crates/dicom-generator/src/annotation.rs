//! Datasets with a description and per-field annotations.
//!
//! The annotated document wraps the DICOM-JSON dataset:
//!
//! ```json
//! {
//!     "description": "CT with a fake patient",
//!     "dataset": {
//!         "00100020": {
//!             "vr": "LO",
//!             "Value": ["1234"],
//!             "annotation": "a patient annotation",
//!             "tag_name": "PatientID"
//!         }
//!     }
//! }
//! ```
//!
//! Every top-level entry carries `annotation` (`null` when the field has
//! none) and `tag_name` (the dictionary keyword, or `"Unknown"`). Both are
//! removed again before the dataset is decoded, so they never reach the
//! record itself. Sequence items are not annotated.

use std::collections::BTreeMap;
use std::io::{Read, Write};

use serde_json::{Map, Value as JsonValue};

use crate::codec::{BulkDataSink, BulkDataSource, EncodeOptions, JsonDecoder, JsonEncoder};
use crate::dictionary;
use crate::error::{DecodeError, EncodeError, Error, LookupError};
use crate::limits::DEFAULT_DESCRIPTION;
use crate::model::{Dataset, Element, Tag, TagLike};
use crate::persistence;

const KEY_DESCRIPTION: &str = "description";
const KEY_DATASET: &str = "dataset";
const KEY_ANNOTATION: &str = "annotation";
const KEY_TAG_NAME: &str = "tag_name";

/// Written as `tag_name` for tags without a dictionary entry.
pub const UNKNOWN_TAG_NAME: &str = "Unknown";

/// A dataset with a description and annotations keyed by field.
///
/// Annotations are arbitrary JSON values. A `null` annotation is the same as
/// no annotation and is never stored. Rendering fails while an annotation
/// names a field the dataset does not hold.
#[derive(Debug, Clone, PartialEq)]
pub struct AnnotatedDataset {
    dataset: Dataset,
    description: String,
    annotations: BTreeMap<Tag, JsonValue>,
}

impl AnnotatedDataset {
    /// Wraps a dataset with the default description and no annotations.
    pub fn new(dataset: Dataset) -> Self {
        Self {
            dataset,
            description: DEFAULT_DESCRIPTION.to_string(),
            annotations: BTreeMap::new(),
        }
    }

    /// Wraps a dataset with a description and annotations.
    ///
    /// Annotation keys may be any field reference; they are resolved here.
    pub fn wrap<K, V>(
        dataset: Dataset,
        description: impl Into<String>,
        annotations: impl IntoIterator<Item = (K, V)>,
    ) -> Result<Self, LookupError>
    where
        K: TagLike,
        V: Into<JsonValue>,
    {
        let mut wrapped = Self::new(dataset);
        wrapped.description = description.into();
        for (key, value) in annotations {
            wrapped.set_annotation(key, value)?;
        }
        Ok(wrapped)
    }

    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    pub fn dataset_mut(&mut self) -> &mut Dataset {
        &mut self.dataset
    }

    pub fn into_dataset(self) -> Dataset {
        self.dataset
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn set_description(&mut self, description: impl Into<String>) {
        self.description = description.into();
    }

    /// The annotation of a field, if it has one.
    pub fn annotation_for(&self, key: impl TagLike) -> Result<Option<&JsonValue>, LookupError> {
        Ok(self.annotations.get(&key.to_tag()?))
    }

    /// Sets a field's annotation, returning the previous one.
    ///
    /// Setting `null` removes the annotation.
    pub fn set_annotation(
        &mut self,
        key: impl TagLike,
        value: impl Into<JsonValue>,
    ) -> Result<Option<JsonValue>, LookupError> {
        let tag = key.to_tag()?;
        let value = value.into();
        if value.is_null() {
            Ok(self.annotations.remove(&tag))
        } else {
            Ok(self.annotations.insert(tag, value))
        }
    }

    /// Removes a field's annotation, returning it.
    pub fn remove_annotation(&mut self, key: impl TagLike) -> Result<Option<JsonValue>, LookupError> {
        Ok(self.annotations.remove(&key.to_tag()?))
    }

    /// Annotations in tag order.
    pub fn annotations(&self) -> impl Iterator<Item = (Tag, &JsonValue)> + '_ {
        self.annotations.iter().map(|(tag, value)| (*tag, value))
    }

    /// Every element with its annotation, in dataset order.
    pub fn fields(&self) -> impl Iterator<Item = (&Element, Option<&JsonValue>)> + '_ {
        self.dataset
            .iter()
            .map(|element| (element, self.annotations.get(&element.tag)))
    }

    // =========================================================================
    // JSON
    // =========================================================================

    /// Renders the annotated document, inlining every payload.
    pub fn to_json_value(&self) -> Result<JsonValue, EncodeError> {
        self.to_json_value_with(&EncodeOptions::default(), None)
    }

    /// Renders the annotated document with encode options and a bulk sink.
    ///
    /// # Errors
    ///
    /// [`EncodeError::OrphanAnnotation`] for the first annotated field that
    /// is missing from the dataset; otherwise whatever the encoder reports.
    pub fn to_json_value_with(
        &self,
        options: &EncodeOptions,
        sink: Option<&mut dyn BulkDataSink>,
    ) -> Result<JsonValue, EncodeError> {
        if let Some(&tag) = self.annotations.keys().find(|tag| !self.dataset.contains(**tag)) {
            return Err(EncodeError::OrphanAnnotation { tag });
        }

        let mut encoder = JsonEncoder::new(*options);
        if let Some(sink) = sink {
            encoder = encoder.with_bulk_sink(sink);
        }
        let mut entries = encoder.encode_map(&self.dataset)?;

        for element in &self.dataset {
            if let Some(JsonValue::Object(entry)) = entries.get_mut(&element.tag.to_hex()) {
                let annotation = self
                    .annotations
                    .get(&element.tag)
                    .cloned()
                    .unwrap_or(JsonValue::Null);
                let tag_name = dictionary::keyword_of(element.tag).unwrap_or(UNKNOWN_TAG_NAME);
                entry.insert(KEY_ANNOTATION.to_string(), annotation);
                entry.insert(KEY_TAG_NAME.to_string(), JsonValue::from(tag_name));
            }
        }

        let mut document = Map::with_capacity(2);
        document.insert(KEY_DESCRIPTION.to_string(), JsonValue::from(self.description.as_str()));
        document.insert(KEY_DATASET.to_string(), JsonValue::Object(entries));
        Ok(JsonValue::Object(document))
    }

    /// Reads an annotated document that carries no bulk data references.
    pub fn from_json_value(json: &JsonValue) -> Result<Self, DecodeError> {
        Self::from_json_value_with(json, None)
    }

    /// Reads an annotated document, resolving bulk data through `source`.
    ///
    /// # Errors
    ///
    /// [`DecodeError::MalformedDocument`] when `description` or `dataset` is
    /// missing, or a top-level entry has no `annotation`; otherwise whatever
    /// the dataset decoder reports.
    pub fn from_json_value_with(
        json: &JsonValue,
        source: Option<&dyn BulkDataSource>,
    ) -> Result<Self, DecodeError> {
        let JsonValue::Object(document) = json else {
            return Err(DecodeError::MalformedDocument {
                tag: None,
                reason: "document is not a JSON object",
            });
        };
        let description = match document.get(KEY_DESCRIPTION) {
            Some(JsonValue::String(s)) => s.clone(),
            Some(_) => {
                return Err(DecodeError::MalformedDocument {
                    tag: None,
                    reason: "\"description\" is not a string",
                });
            }
            None => {
                return Err(DecodeError::MalformedDocument {
                    tag: None,
                    reason: "missing \"description\"",
                });
            }
        };
        let entries = match document.get(KEY_DATASET) {
            Some(JsonValue::Object(entries)) => entries,
            Some(_) => {
                return Err(DecodeError::MalformedDocument {
                    tag: None,
                    reason: "\"dataset\" is not a JSON object",
                });
            }
            None => {
                return Err(DecodeError::MalformedDocument {
                    tag: None,
                    reason: "missing \"dataset\"",
                });
            }
        };

        let mut stripped = Map::with_capacity(entries.len());
        let mut annotations = BTreeMap::new();
        for (key, entry) in entries {
            let tag = Tag::from_hex(key).ok_or_else(|| DecodeError::InvalidTagKey { key: key.clone() })?;
            let JsonValue::Object(fields) = entry else {
                return Err(DecodeError::MalformedDocument {
                    tag: Some(tag),
                    reason: "element is not a JSON object",
                });
            };
            let mut fields = fields.clone();
            match fields.remove(KEY_ANNOTATION) {
                Some(JsonValue::Null) => {}
                Some(annotation) => {
                    annotations.insert(tag, annotation);
                }
                None => {
                    return Err(DecodeError::MalformedDocument {
                        tag: Some(tag),
                        reason: "missing \"annotation\"",
                    });
                }
            }
            fields.remove(KEY_TAG_NAME);
            stripped.insert(key.clone(), JsonValue::Object(fields));
        }

        let mut decoder = JsonDecoder::new();
        if let Some(source) = source {
            decoder = decoder.with_bulk_source(source);
        }
        Ok(Self {
            dataset: decoder.decode_map(&stripped)?,
            description,
            annotations,
        })
    }

    /// Writes the annotated document as indented JSON.
    pub fn save(&self, mut writer: impl Write) -> Result<(), Error> {
        let bytes = persistence::to_pretty_vec(&self.to_json_value()?)?;
        writer
            .write_all(&bytes)
            .map_err(|e| Error::io("<writer>", e))
    }

    /// Reads an annotated document.
    pub fn load(reader: impl Read) -> Result<Self, Error> {
        let json: JsonValue = serde_json::from_reader(reader)?;
        Ok(Self::from_json_value(&json)?)
    }
}
