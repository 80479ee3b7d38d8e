//! Synthetic DICOM test fixtures with an annotated, round-trippable JSON form.
//!
//! This crate builds realistic but fake DICOM datasets for tests, and converts
//! real files to a human-editable JSON document where every field can carry
//! a free-form annotation.
//!
//! # Overview
//!
//! - **Generation**: mock values for every value representation, fresh UIDs,
//!   and a CT template with internally consistent dates and times
//! - **Annotation**: a dataset plus a description plus per-field notes,
//!   serialized as DICOM-JSON with two extra keys per entry
//! - **Round trips**: DICOM file to JSON and back without losing values
//!
//! # Quick Start
//!
//! ```rust
//! use dicom_generator::{AnnotatedDataset, Dataset, Value, generate};
//! use rand::SeedableRng;
//! use rand::rngs::StdRng;
//!
//! let mut rng = StdRng::seed_from_u64(7);
//! let dataset = generate::ct_dataset(&mut rng, [("PatientID", Value::text("fixture-1"))]).unwrap();
//!
//! let mut annotated = AnnotatedDataset::new(dataset);
//! annotated.set_description("CT slice for the anonymizer tests");
//! annotated.set_annotation("PatientID", "replaced by the anonymizer").unwrap();
//!
//! let mut json = Vec::new();
//! annotated.save(&mut json).unwrap();
//! let loaded = AnnotatedDataset::load(json.as_slice()).unwrap();
//! assert_eq!(loaded, annotated);
//!
//! let bytes = dicom_generator::codec::write_file(loaded.dataset()).unwrap();
//! let read: Dataset = dicom_generator::codec::read_file(&bytes).unwrap();
//! assert_eq!(read.string(dicom_generator::dictionary::tags::PATIENT_ID), Some("fixture-1"));
//! ```
//!
//! # Modules
//!
//! - [`model`]: Tags, value representations, values, elements and datasets
//! - [`dictionary`]: Keyword and VR lookup for standard attributes
//! - [`generate`]: Mock values, UIDs and dataset templates
//! - [`annotation`]: Datasets with a description and per-field notes
//! - [`codec`]: DICOM-JSON and Part-10 encoding, bulk data stores
//! - [`validate`]: Opt-in semantic checks
//! - [`pixel`]: Pixel data substitution
//! - [`tools`]: File-backed conversions
//! - [`error`]: Error types
//! - [`limits`]: Limits and defaults
//!
//! # Security
//!
//! Both decoders accept untrusted input:
//! - Value lengths and sequence depth are bounded
//! - Truncated or malformed input is rejected with descriptive errors

pub mod annotation;
pub mod codec;
pub mod dictionary;
pub mod error;
pub mod generate;
pub mod limits;
pub mod model;
pub mod persistence;
pub mod pixel;
pub mod tools;
pub mod util;
pub mod validate;

// Re-export commonly used types at crate root
pub use annotation::AnnotatedDataset;
pub use codec::{EncodeOptions, from_json, to_json};
pub use error::{
    BulkDataError, DecodeError, EncodeError, Error, ErrorKind, LookupError, Part10Error, ValidationError,
};
pub use generate::{DatasetTemplate, ct_dataset, ct_template, mock_value};
pub use model::{Dataset, DatasetBuilder, Element, Tag, TagLike, Value, Vr, resolve};
pub use tools::{ConvertOptions, annotated_to_dicom, export, to_annotated_dataset};
pub use validate::{ValidationContext, validate_dataset};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
