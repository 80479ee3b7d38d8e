//! Data model types.
//!
//! This module contains the in-memory form of a DICOM record:
//! - Tags and the field reference resolver
//! - Value representations and their classification
//! - Values, elements and datasets
//! - Builders (ergonomic construction)

pub mod builder;
pub mod dataset;
pub mod tag;
pub mod value;
pub mod vr;

pub use builder::{DatasetBuilder, SequenceBuilder};
pub use dataset::{Dataset, Element};
pub use tag::{resolve, Tag, TagLike};
pub use value::Value;
pub use vr::{Vr, VrKind};
