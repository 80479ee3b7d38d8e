//! Synthetic record generation.
//!
//! Every generator takes an explicit RNG so that a seeded RNG reproduces the
//! same records:
//!
//! ```rust
//! use dicom_generator::generate;
//! use rand::SeedableRng;
//! use rand::rngs::StdRng;
//!
//! let mut rng = StdRng::seed_from_u64(42);
//! let element = generate::element("PatientName", &mut rng).unwrap();
//! assert!(element.value.as_str().unwrap().contains("Test^"));
//! ```

pub mod template;
pub mod uid;
pub mod values;

pub use template::{ct_dataset, ct_template, DatasetTemplate};
pub use values::mock_value;

use rand::Rng;

use crate::dictionary;
use crate::error::LookupError;
use crate::model::{Dataset, Element, TagLike, Value, Vr};

/// An element with the dictionary VR of `key` and a mock value.
///
/// Tags absent from the dictionary get VR LO.
pub fn element(key: impl TagLike, rng: &mut impl Rng) -> Result<Element, LookupError> {
    let tag = key.to_tag()?;
    let vr = dictionary::vr_of(tag).unwrap_or(Vr::LO);
    Ok(Element::new(tag, vr, mock_value(vr, rng)))
}

/// An element with an explicit VR and value.
pub fn element_with(key: impl TagLike, vr: Vr, value: impl Into<Value>) -> Result<Element, LookupError> {
    Ok(Element::new(key.to_tag()?, vr, value))
}

/// A dataset built from `(field, value)` pairs, VRs taken from the dictionary.
///
/// # Errors
///
/// [`LookupError::InvalidFieldReference`] for an unknown keyword, or
/// [`LookupError::UnknownField`] for a tag without a dictionary entry.
pub fn quick_dataset<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Result<Dataset, LookupError>
where
    K: TagLike,
    V: Into<Value>,
{
    let mut dataset = Dataset::new();
    for (key, value) in pairs {
        dataset.put(key, value)?;
    }
    Ok(dataset)
}
