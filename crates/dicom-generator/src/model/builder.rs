//! Builder API for ergonomic Dataset construction.
//!
//! # Example
//!
//! ```rust
//! use dicom_generator::model::DatasetBuilder;
//!
//! let dataset = DatasetBuilder::new()
//!     .text("PatientName", "Doe^John")
//!     .text("PatientID", "1234")
//!     .int("Rows", 16)
//!     .sequence("ReferencedStudySequence", |seq| seq
//!         .item(|item| item.text("ReferencedSOPInstanceUID", "1.2.3"))
//!     )
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(dataset.len(), 4);
//! ```

use crate::error::LookupError;
use crate::model::{Dataset, TagLike, Value, Vr};

/// Builder for constructing a Dataset.
///
/// Field references are resolved as they are added; the first failure is
/// kept and returned by [`DatasetBuilder::build`].
#[derive(Debug, Clone, Default)]
pub struct DatasetBuilder {
    dataset: Dataset,
    error: Option<LookupError>,
}

impl DatasetBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts from an existing dataset.
    pub fn from_dataset(dataset: Dataset) -> Self {
        Self {
            dataset,
            error: None,
        }
    }

    /// Sets a field using its dictionary VR.
    pub fn value(mut self, key: impl TagLike, value: impl Into<Value>) -> Self {
        if self.error.is_none() {
            if let Err(e) = self.dataset.put(key, value) {
                self.error = Some(e);
            }
        }
        self
    }

    /// Sets a field with an explicit VR, for private or unknown tags.
    pub fn value_with_vr(mut self, key: impl TagLike, vr: Vr, value: impl Into<Value>) -> Self {
        if self.error.is_none() {
            if let Err(e) = self.dataset.put_with_vr(key, vr, value) {
                self.error = Some(e);
            }
        }
        self
    }

    /// Sets a single string value.
    pub fn text(self, key: impl TagLike, value: impl Into<String>) -> Self {
        self.value(key, Value::text(value))
    }

    /// Sets a single integer value.
    pub fn int(self, key: impl TagLike, value: i64) -> Self {
        self.value(key, value)
    }

    /// Sets a single float value.
    pub fn float(self, key: impl TagLike, value: f64) -> Self {
        self.value(key, value)
    }

    /// Sets a byte payload.
    pub fn bytes(self, key: impl TagLike, value: impl Into<Vec<u8>>) -> Self {
        self.value(key, Value::Bytes(value.into()))
    }

    /// Marks a field as present without a value.
    pub fn empty(self, key: impl TagLike) -> Self {
        self.value(key, Value::Empty)
    }

    /// Sets a sequence using a builder function.
    pub fn sequence<F>(mut self, key: impl TagLike, f: F) -> Self
    where
        F: FnOnce(SequenceBuilder) -> SequenceBuilder,
    {
        let seq = f(SequenceBuilder::default());
        match seq.error {
            Some(e) => {
                if self.error.is_none() {
                    self.error = Some(e);
                }
                self
            }
            None => self.value(key, Value::Sequence(seq.items)),
        }
    }

    /// Builds the dataset.
    ///
    /// # Errors
    ///
    /// The first field reference that failed to resolve.
    pub fn build(self) -> Result<Dataset, LookupError> {
        match self.error {
            Some(e) => Err(e),
            None => Ok(self.dataset),
        }
    }
}

/// Builder for the items of a sequence.
#[derive(Debug, Clone, Default)]
pub struct SequenceBuilder {
    items: Vec<Dataset>,
    error: Option<LookupError>,
}

impl SequenceBuilder {
    /// Adds an item using a builder function.
    pub fn item<F>(mut self, f: F) -> Self
    where
        F: FnOnce(DatasetBuilder) -> DatasetBuilder,
    {
        match f(DatasetBuilder::new()).build() {
            Ok(item) => self.items.push(item),
            Err(e) => {
                if self.error.is_none() {
                    self.error = Some(e);
                }
            }
        }
        self
    }

    /// Adds an already built item.
    pub fn dataset(mut self, item: Dataset) -> Self {
        self.items.push(item);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Tag;

    #[test]
    fn test_builder_basic() {
        let ds = DatasetBuilder::new()
            .text("PatientName", "Doe^John")
            .int("Rows", 16)
            .float("SpiralPitchFactor", 0.8)
            .text("SliceThickness", "1.5")
            .bytes("PixelData", vec![1u8, 2])
            .empty("StudyDescription")
            .build()
            .unwrap();

        assert_eq!(ds.len(), 6);
        assert_eq!(ds.get("SliceThickness").unwrap().unwrap().vr, Vr::DS);
        assert_eq!(ds.get("SpiralPitchFactor").unwrap().unwrap().vr, Vr::FD);
        assert_eq!(ds.get("PixelData").unwrap().unwrap().vr, Vr::OW);
    }

    #[test]
    fn test_builder_sequence() {
        let ds = DatasetBuilder::new()
            .sequence("ReferencedStudySequence", |seq| {
                seq.item(|item| item.text("ReferencedSOPInstanceUID", "1.2.3"))
                    .item(|item| item.text("ReferencedSOPInstanceUID", "1.2.4"))
            })
            .build()
            .unwrap();

        let items = ds
            .value(Tag::new(0x0008, 0x1110))
            .and_then(Value::as_sequence)
            .unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[1].string(Tag::new(0x0008, 0x1155)), Some("1.2.4"));
    }

    #[test]
    fn test_builder_keeps_first_error() {
        let err = DatasetBuilder::new()
            .text("NotAKeyword", "x")
            .text(Tag::new(0x0029, 0x1010), "y")
            .build()
            .unwrap_err();
        assert!(matches!(err, LookupError::InvalidFieldReference { .. }));

        let err = DatasetBuilder::new()
            .sequence("ReferencedStudySequence", |seq| seq.item(|i| i.text("Bogus", "x")))
            .build()
            .unwrap_err();
        assert!(matches!(err, LookupError::InvalidFieldReference { .. }));
    }

    #[test]
    fn test_builder_private_tag() {
        let ds = DatasetBuilder::new()
            .value_with_vr("00291010", Vr::UN, vec![0xDEu8, 0xAD])
            .build()
            .unwrap();
        assert_eq!(ds.element(Tag::new(0x0029, 0x1010)).unwrap().vr, Vr::UN);
    }
}
