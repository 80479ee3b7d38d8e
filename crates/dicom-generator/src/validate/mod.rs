//! Semantic validation for datasets.
//!
//! Structural checks happen in the codecs: a value that does not fit its VR
//! cannot be encoded. The checks here go further and are opt-in:
//! - declared VRs against the dictionary or registered expectations
//! - the character forms of DA, TM, DT, UI, AS, CS, IS and DS values
//!
//! **Note:** VR checks are advisory. Files in the wild often carry UN for
//! attributes read under implicit VR, so UN is always accepted.

use rustc_hash::FxHashMap;

use crate::dictionary;
use crate::error::ValidationError;
use crate::generate::uid;
use crate::model::{Dataset, Element, Tag, Value, Vr};
use crate::util::datetime::{parse_da, parse_tm};

/// Maximum length of a CS value.
const CS_MAX_LEN: usize = 16;

/// Context for dataset validation.
#[derive(Debug, Clone, Default)]
pub struct ValidationContext {
    /// Expected VRs, checked ahead of the dictionary.
    expected: FxHashMap<Tag, Vr>,
    use_dictionary: bool,
    check_text: bool,
}

impl ValidationContext {
    /// A context that only checks values against their declared VRs.
    pub fn new() -> Self {
        Self::default()
    }

    /// A context that also checks dictionary VRs and text formats.
    pub fn strict() -> Self {
        Self {
            expected: FxHashMap::default(),
            use_dictionary: true,
            check_text: true,
        }
    }

    /// Registers the VR an element with `tag` must declare.
    pub fn expect(&mut self, tag: Tag, vr: Vr) {
        self.expected.insert(tag, vr);
    }

    /// The VR an element with `tag` is expected to declare, if any.
    pub fn expected_vr(&self, tag: Tag) -> Option<Vr> {
        self.expected.get(&tag).copied().or_else(|| {
            if self.use_dictionary {
                dictionary::vr_of(tag).ok()
            } else {
                None
            }
        })
    }
}

/// Validates every element of a dataset, descending into sequence items.
pub fn validate_dataset(dataset: &Dataset, context: &ValidationContext) -> Result<(), ValidationError> {
    for element in dataset {
        if let Some(expected) = context.expected_vr(element.tag) {
            if expected != element.vr && element.vr != Vr::UN {
                return Err(ValidationError::VrInconsistent {
                    tag: element.tag,
                    dictionary: expected,
                    declared: element.vr,
                });
            }
        }

        validate_element(element)?;

        if context.check_text {
            if let Value::Strings(values) = &element.value {
                for value in values {
                    if let Some(reason) = validate_text(element.vr, value) {
                        return Err(ValidationError::InvalidText {
                            tag: element.tag,
                            vr: element.vr,
                            value: value.clone(),
                            reason,
                        });
                    }
                }
            }
        }

        if let Value::Sequence(items) = &element.value {
            for item in items {
                validate_dataset(item, context)?;
            }
        }
    }
    Ok(())
}

/// Checks that an element's value can be held by its VR.
pub fn validate_element(element: &Element) -> Result<(), ValidationError> {
    if element.value.fits(element.vr) {
        Ok(())
    } else {
        Err(ValidationError::ValueMismatch {
            tag: element.tag,
            vr: element.vr,
            value: element.value.variant_name(),
        })
    }
}

/// Checks the character form of one string value.
///
/// Returns a description of the problem, or `None` if the value is valid or
/// its VR has no checked format. Empty values are always valid.
pub fn validate_text(vr: Vr, value: &str) -> Option<&'static str> {
    if value.is_empty() {
        return None;
    }
    match vr {
        Vr::DA => parse_da(value).err().map(|_| "is not a YYYYMMDD date"),
        Vr::TM => parse_tm(value).err().map(|_| "is not an HHMMSS.F time"),
        Vr::DT => validate_datetime(value),
        Vr::UI => (!uid::is_valid_uid(value)).then_some("is not a valid UID"),
        Vr::AS => validate_age(value),
        Vr::CS => validate_code_string(value),
        Vr::IS => match value.trim().parse::<i64>() {
            Ok(n) if i32::try_from(n).is_ok() => None,
            Ok(_) => Some("is outside the 32-bit range"),
            Err(_) => Some("is not an integer string"),
        },
        Vr::DS => match value.trim().parse::<f64>() {
            Ok(n) if n.is_finite() => None,
            _ => Some("is not a decimal string"),
        },
        _ => None,
    }
}

fn validate_datetime(value: &str) -> Option<&'static str> {
    const INVALID: Option<&str> = Some("is not a YYYYMMDDHHMMSS.F date time");
    if value.len() < 8 || !value.is_ascii() {
        return INVALID;
    }
    let (date, rest) = value.split_at(8);
    if parse_da(date).is_err() {
        return INVALID;
    }
    // Drop a UTC offset suffix.
    let time = rest.split(['+', '-']).next().unwrap_or("");
    if !time.is_empty() && parse_tm(time).is_err() {
        return INVALID;
    }
    None
}

fn validate_age(value: &str) -> Option<&'static str> {
    let bytes = value.as_bytes();
    let valid = bytes.len() == 4
        && bytes[..3].iter().all(u8::is_ascii_digit)
        && matches!(bytes[3], b'D' | b'W' | b'M' | b'Y');
    (!valid).then_some("is not an nnnD/W/M/Y age")
}

fn validate_code_string(value: &str) -> Option<&'static str> {
    if value.len() > CS_MAX_LEN {
        return Some("is longer than 16 characters");
    }
    let valid = value
        .bytes()
        .all(|b| b.is_ascii_uppercase() || b.is_ascii_digit() || b == b' ' || b == b'_');
    (!valid).then_some("contains characters other than A-Z, 0-9, space and underscore")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dictionary::tags;
    use crate::generate::{ct_dataset, mock_value};
    use crate::model::DatasetBuilder;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn test_validate_value_mismatch() {
        let element = Element::new(tags::PATIENT_ID, Vr::LO, 42i64);
        let result = validate_element(&element);
        assert!(matches!(result, Err(ValidationError::ValueMismatch { value: "integer", .. })));

        let mut ds = Dataset::new();
        ds.insert(element);
        assert!(validate_dataset(&ds, &ValidationContext::new()).is_err());
    }

    #[test]
    fn test_validate_nested_items() {
        let mut item = Dataset::new();
        item.insert(Element::new(tags::ROWS, Vr::US, "not a number"));
        let mut ds = Dataset::new();
        ds.put_with_vr("ReferencedImageSequence", Vr::SQ, vec![item]).unwrap();

        let result = validate_dataset(&ds, &ValidationContext::new());
        assert!(matches!(result, Err(ValidationError::ValueMismatch { tag, .. }) if tag == tags::ROWS));
    }

    #[test]
    fn test_dictionary_check_is_opt_in() {
        let mut ds = Dataset::new();
        ds.put_with_vr("PatientID", Vr::SH, "1234").unwrap();

        assert!(validate_dataset(&ds, &ValidationContext::new()).is_ok());
        assert!(matches!(
            validate_dataset(&ds, &ValidationContext::strict()),
            Err(ValidationError::VrInconsistent { dictionary: Vr::LO, declared: Vr::SH, .. })
        ));

        ds.put_with_vr("PatientID", Vr::UN, b"1234".as_slice()).unwrap();
        assert!(validate_dataset(&ds, &ValidationContext::strict()).is_ok());
    }

    #[test]
    fn test_expected_vr_overrides_dictionary() {
        let private = Tag::new(0x0011, 0x1010);
        let mut context = ValidationContext::new();
        context.expect(private, Vr::SH);
        assert_eq!(context.expected_vr(private), Some(Vr::SH));
        assert_eq!(context.expected_vr(tags::PATIENT_ID), None);

        let mut ds = Dataset::new();
        ds.put_with_vr(private, Vr::LO, "x").unwrap();
        assert!(matches!(
            validate_dataset(&ds, &context),
            Err(ValidationError::VrInconsistent { .. })
        ));
    }

    #[test]
    fn test_validate_text() {
        assert_eq!(validate_text(Vr::DA, "20240315"), None);
        assert!(validate_text(Vr::DA, "2024-03-15").is_some());
        assert_eq!(validate_text(Vr::TM, "143000.123"), None);
        assert!(validate_text(Vr::TM, "25").is_some());
        assert_eq!(validate_text(Vr::DT, "20240315143000.123"), None);
        assert_eq!(validate_text(Vr::DT, "20240315143000+0100"), None);
        assert!(validate_text(Vr::DT, "2024031").is_some());
        assert_eq!(validate_text(Vr::UI, "1.2.840.10008.1.2"), None);
        assert!(validate_text(Vr::UI, "1.02").is_some());
        assert_eq!(validate_text(Vr::AS, "041Y"), None);
        assert!(validate_text(Vr::AS, "41Y").is_some());
        assert_eq!(validate_text(Vr::CS, "MOCK_123_CODE"), None);
        assert!(validate_text(Vr::CS, "lower").is_some());
        assert_eq!(validate_text(Vr::IS, " 42 "), None);
        assert!(validate_text(Vr::IS, "99999999999").is_some());
        assert_eq!(validate_text(Vr::DS, "+10.4"), None);
        assert!(validate_text(Vr::DS, "ten").is_some());
        assert_eq!(validate_text(Vr::LO, "anything"), None);
        assert_eq!(validate_text(Vr::DA, ""), None);
    }

    #[test]
    fn test_strict_reports_invalid_text() {
        let ds = DatasetBuilder::new()
            .text("StudyDate", "yesterday")
            .build()
            .unwrap();
        assert!(validate_dataset(&ds, &ValidationContext::new()).is_ok());
        let err = validate_dataset(&ds, &ValidationContext::strict()).unwrap_err();
        assert!(matches!(err, ValidationError::InvalidText { vr: Vr::DA, .. }));
    }

    #[test]
    fn test_generated_values_are_valid() {
        let mut rng = StdRng::seed_from_u64(17);
        for vr in Vr::ALL {
            if let Value::Strings(values) = mock_value(vr, &mut rng) {
                for value in &values {
                    assert_eq!(validate_text(vr, value), None, "{vr}: {value:?}");
                }
            }
        }

        let ds = ct_dataset(&mut rng, Vec::<(Tag, Value)>::new()).unwrap();
        assert_eq!(validate_dataset(&ds, &ValidationContext::strict()), Ok(()));
    }
}
