//! Binary DICOM files (PS3.10).
//!
//! Parsing and serialization go through `dicom-object`; this module converts
//! between its in-memory objects and [`Dataset`].
//!
//! Reading accepts the two uncompressed little-endian transfer syntaxes that
//! fixture files use: implicit VR and explicit VR. Writing always produces
//! explicit VR little endian, generating the file meta group when the dataset
//! has none.

use dicom_core::value::{DataSetSequence, PrimitiveValue, Value as DicomValue};
use dicom_core::{DataElement, Length};
use dicom_object::mem::{InMemDicomObject, InMemElement};
use dicom_object::{FileMetaTable, FileMetaTableBuilder};

use crate::dictionary::tags;
use crate::error::{Part10Error, ValidationError};
use crate::generate::uid;
use crate::limits::{DICM_MAGIC, DICOM_GENERATOR_ROOT_UID, MAX_ELEMENT_LEN, MAX_SEQUENCE_DEPTH, PREAMBLE_LEN};
use crate::model::{Dataset, Element, Tag, Value, Vr, VrKind};

/// Implicit VR Little Endian, the default transfer syntax.
pub const IMPLICIT_VR_LITTLE_ENDIAN: &str = "1.2.840.10008.1.2";

/// Explicit VR Little Endian.
pub const EXPLICIT_VR_LITTLE_ENDIAN: &str = "1.2.840.10008.1.2.1";

/// CT Image Storage, assumed when a dataset names no SOP class.
pub const CT_IMAGE_STORAGE: &str = "1.2.840.10008.5.1.4.1.1.2";

fn trimmed(text: &str) -> &str {
    text.trim_end_matches(['\0', ' '])
}

// =============================================================================
// DECODING
// =============================================================================

/// Reads a Part-10 file. File meta elements are kept in the returned dataset.
pub fn read_file(input: &[u8]) -> Result<Dataset, Part10Error> {
    if input.len() < PREAMBLE_LEN + DICM_MAGIC.len() {
        return Err(Part10Error::UnexpectedEof { context: "preamble" });
    }
    if &input[PREAMBLE_LEN..PREAMBLE_LEN + DICM_MAGIC.len()] != DICM_MAGIC {
        return Err(Part10Error::MissingMagic);
    }

    let object = dicom_object::from_reader(&input[PREAMBLE_LEN..]).map_err(|e| Part10Error::Read {
        message: e.to_string(),
    })?;

    let syntax = trimmed(object.meta().transfer_syntax());
    if syntax != IMPLICIT_VR_LITTLE_ENDIAN && syntax != EXPLICIT_VR_LITTLE_ENDIAN {
        return Err(Part10Error::UnsupportedTransferSyntax {
            uid: syntax.to_string(),
        });
    }

    let mut dataset = meta_to_dataset(object.meta());
    for element in object_to_dataset(&object, 0)? {
        dataset.insert(element);
    }
    Ok(dataset)
}

fn meta_to_dataset(meta: &FileMetaTable) -> Dataset {
    let mut dataset = Dataset::new();
    dataset.insert(Element::new(
        tags::FILE_META_GROUP_LENGTH,
        Vr::UL,
        i64::from(meta.information_group_length),
    ));
    dataset.insert(Element::new(
        tags::FILE_META_VERSION,
        Vr::OB,
        Value::Bytes(meta.information_version.to_vec()),
    ));

    let uids = [
        (tags::MEDIA_STORAGE_SOP_CLASS_UID, &meta.media_storage_sop_class_uid),
        (tags::MEDIA_STORAGE_SOP_INSTANCE_UID, &meta.media_storage_sop_instance_uid),
        (tags::TRANSFER_SYNTAX_UID, &meta.transfer_syntax),
        (tags::IMPLEMENTATION_CLASS_UID, &meta.implementation_class_uid),
    ];
    for (tag, uid) in uids {
        dataset.insert(Element::new(tag, Vr::UI, trimmed(uid)));
    }
    if let Some(name) = &meta.implementation_version_name {
        dataset.insert(Element::new(tags::IMPLEMENTATION_VERSION_NAME, Vr::SH, trimmed(name)));
    }
    if let Some(title) = &meta.source_application_entity_title {
        dataset.insert(Element::new(tags::SOURCE_APPLICATION_ENTITY_TITLE, Vr::AE, trimmed(title)));
    }
    dataset
}

fn object_to_dataset(object: &InMemDicomObject, depth: usize) -> Result<Dataset, Part10Error> {
    if depth >= MAX_SEQUENCE_DEPTH {
        return Err(Part10Error::SequenceTooDeep {
            max: MAX_SEQUENCE_DEPTH,
        });
    }

    let mut dataset = Dataset::new();
    for element in object.iter() {
        let header = element.header();
        let (tag, vr) = (Tag::from(header.tag), Vr::from(header.vr));
        let value = match element.value() {
            DicomValue::Primitive(primitive) => decode_value(tag, vr, primitive)?,
            DicomValue::Sequence(sequence) => Value::Sequence(
                sequence
                    .items()
                    .iter()
                    .map(|item| object_to_dataset(item, depth + 1))
                    .collect::<Result<_, _>>()?,
            ),
            DicomValue::PixelSequence(_) => {
                return Err(Part10Error::EncapsulatedPixelData { tag });
            }
        };
        dataset.insert(Element { tag, vr, value });
    }
    Ok(dataset)
}

fn decode_value(tag: Tag, vr: Vr, primitive: &PrimitiveValue) -> Result<Value, Part10Error> {
    if let PrimitiveValue::Empty = primitive {
        return Ok(Value::Empty);
    }

    let value = match vr.kind() {
        VrKind::Text | VrKind::PersonName | VrKind::NumberText => {
            let text = primitive.to_multi_str().join("\\");
            match trimmed(&text) {
                "" => Value::Empty,
                text => Value::Strings(split_text(vr, text)),
            }
        }
        VrKind::Integer => Value::Ints(decode_ints(tag, vr, primitive)?),
        VrKind::Float => Value::Floats(match primitive {
            PrimitiveValue::F32(v) => v.iter().map(|&f| f64::from(f)).collect(),
            PrimitiveValue::F64(v) => v.to_vec(),
            _ => return Err(Part10Error::UnexpectedValue { tag, vr }),
        }),
        VrKind::AttributeTag => match primitive {
            PrimitiveValue::Tags(v) => Value::Tags(v.iter().map(|&t| Tag::from(t)).collect()),
            _ => return Err(Part10Error::UnexpectedValue { tag, vr }),
        },
        VrKind::Binary | VrKind::Sequence => {
            let bytes = le_bytes(tag, vr, primitive)?;
            if bytes.len() > MAX_ELEMENT_LEN {
                return Err(Part10Error::LengthExceedsLimit {
                    field: "value",
                    len: bytes.len(),
                    max: MAX_ELEMENT_LEN,
                });
            }
            Value::Bytes(bytes)
        }
    };
    Ok(value)
}

/// Multi-valued text splits on backslash; number strings drop their padding.
fn split_text(vr: Vr, text: &str) -> Vec<String> {
    if vr.is_single_valued_text() {
        return vec![text.to_string()];
    }
    text.split('\\')
        .map(|s| match vr.kind() {
            VrKind::NumberText => s.trim().to_string(),
            _ => s.to_string(),
        })
        .collect()
}

fn decode_ints(tag: Tag, vr: Vr, primitive: &PrimitiveValue) -> Result<Vec<i64>, Part10Error> {
    let ints = match primitive {
        PrimitiveValue::U16(v) => v.iter().map(|&i| i64::from(i)).collect(),
        PrimitiveValue::I16(v) => v.iter().map(|&i| i64::from(i)).collect(),
        PrimitiveValue::U32(v) => v.iter().map(|&i| i64::from(i)).collect(),
        PrimitiveValue::I32(v) => v.iter().map(|&i| i64::from(i)).collect(),
        PrimitiveValue::I64(v) => v.to_vec(),
        PrimitiveValue::U64(v) => v
            .iter()
            .map(|&i| {
                i64::try_from(i).map_err(|_| Part10Error::IntegerOutOfRange {
                    tag,
                    vr,
                    value: i64::MAX,
                })
            })
            .collect::<Result<_, _>>()?,
        _ => return Err(Part10Error::UnexpectedValue { tag, vr }),
    };
    Ok(ints)
}

/// Binary payloads come back typed by VR (OW as 16-bit words and so on);
/// they are flattened to their little-endian bytes.
fn le_bytes(tag: Tag, vr: Vr, primitive: &PrimitiveValue) -> Result<Vec<u8>, Part10Error> {
    let bytes = match primitive {
        PrimitiveValue::U8(v) => v.to_vec(),
        PrimitiveValue::U16(v) => v.iter().flat_map(|x| x.to_le_bytes()).collect(),
        PrimitiveValue::I16(v) => v.iter().flat_map(|x| x.to_le_bytes()).collect(),
        PrimitiveValue::U32(v) => v.iter().flat_map(|x| x.to_le_bytes()).collect(),
        PrimitiveValue::I32(v) => v.iter().flat_map(|x| x.to_le_bytes()).collect(),
        PrimitiveValue::U64(v) => v.iter().flat_map(|x| x.to_le_bytes()).collect(),
        PrimitiveValue::I64(v) => v.iter().flat_map(|x| x.to_le_bytes()).collect(),
        PrimitiveValue::F32(v) => v.iter().flat_map(|x| x.to_le_bytes()).collect(),
        PrimitiveValue::F64(v) => v.iter().flat_map(|x| x.to_le_bytes()).collect(),
        _ => return Err(Part10Error::UnexpectedValue { tag, vr }),
    };
    Ok(bytes)
}

// =============================================================================
// ENCODING
// =============================================================================

/// Writes a dataset as an explicit VR little endian Part-10 file.
///
/// Missing file meta elements are filled in: the SOP class and instance come
/// from the dataset (CT Image Storage and a fresh UID when absent), the
/// transfer syntax is always explicit VR little endian, and the group length
/// is recomputed.
pub fn write_file(dataset: &Dataset) -> Result<Vec<u8>, Part10Error> {
    let object = dataset_to_object(dataset, 0)?;
    let file = object
        .with_meta(file_meta(dataset))
        .map_err(|e| Part10Error::Write { message: e.to_string() })?;

    let mut out = Vec::with_capacity(PREAMBLE_LEN + 256 + dataset.len() * 32);
    file.write_all(&mut out)
        .map_err(|e| Part10Error::Write { message: e.to_string() })?;
    Ok(out)
}

fn file_meta(dataset: &Dataset) -> FileMetaTableBuilder {
    let text = |tag: Tag| dataset.string(tag).map(|s| trimmed(s).to_string());

    let class = text(tags::MEDIA_STORAGE_SOP_CLASS_UID)
        .or_else(|| text(tags::SOP_CLASS_UID))
        .unwrap_or_else(|| CT_IMAGE_STORAGE.to_string());
    let instance = text(tags::MEDIA_STORAGE_SOP_INSTANCE_UID)
        .or_else(|| text(tags::SOP_INSTANCE_UID))
        .unwrap_or_else(uid::uuid_uid);
    let implementation = text(tags::IMPLEMENTATION_CLASS_UID)
        .unwrap_or_else(|| format!("{DICOM_GENERATOR_ROOT_UID}{}", env!("CARGO_PKG_VERSION_MAJOR")));
    let version_name = text(tags::IMPLEMENTATION_VERSION_NAME)
        .unwrap_or_else(|| format!("DICOMGEN {}", crate::VERSION));

    let mut builder = FileMetaTableBuilder::new()
        .transfer_syntax(EXPLICIT_VR_LITTLE_ENDIAN)
        .media_storage_sop_class_uid(class)
        .media_storage_sop_instance_uid(instance)
        .implementation_class_uid(implementation)
        .implementation_version_name(version_name);
    if let Some(Value::Bytes(version)) = dataset.value(tags::FILE_META_VERSION) {
        if let [major, minor] = version[..] {
            builder = builder.information_version([major, minor]);
        }
    }
    if let Some(title) = text(tags::SOURCE_APPLICATION_ENTITY_TITLE) {
        builder = builder.source_application_entity_title(title);
    }
    builder
}

fn dataset_to_object(dataset: &Dataset, depth: usize) -> Result<InMemDicomObject, Part10Error> {
    if depth >= MAX_SEQUENCE_DEPTH {
        return Err(Part10Error::SequenceTooDeep {
            max: MAX_SEQUENCE_DEPTH,
        });
    }

    let mut object = InMemDicomObject::new_empty();
    for element in dataset.iter() {
        if element.tag.is_file_meta() || element.tag.is_group_length() {
            continue;
        }
        object.put(encode_element(element, depth)?);
    }
    Ok(object)
}

fn encode_element(element: &Element, depth: usize) -> Result<InMemElement, Part10Error> {
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

    let value: DicomValue<InMemDicomObject, Vec<u8>> = match value {
        Value::Sequence(items) => {
            let items = items
                .iter()
                .map(|item| dataset_to_object(item, depth + 1))
                .collect::<Result<Vec<_>, _>>()?;
            DicomValue::from(DataSetSequence::new(items, Length::UNDEFINED))
        }
        other => DicomValue::from(encode_value(tag, vr, other)?),
    };
    Ok(DataElement::new(tag.into(), vr.into(), value))
}

fn encode_value(tag: Tag, vr: Vr, value: &Value) -> Result<PrimitiveValue, Part10Error> {
    let out_of_range = |value: i64| Part10Error::IntegerOutOfRange { tag, vr, value };

    let primitive = match value {
        Value::Empty | Value::Sequence(_) => PrimitiveValue::Empty,
        Value::Strings(strings) => PrimitiveValue::Strs(strings.iter().cloned().collect()),
        Value::Ints(ints) => {
            let ints = ints.iter().copied();
            match vr {
                Vr::US => PrimitiveValue::U16(
                    ints.map(|i| u16::try_from(i).map_err(|_| out_of_range(i)))
                        .collect::<Result<_, _>>()?,
                ),
                Vr::SS => PrimitiveValue::I16(
                    ints.map(|i| i16::try_from(i).map_err(|_| out_of_range(i)))
                        .collect::<Result<_, _>>()?,
                ),
                Vr::UL => PrimitiveValue::U32(
                    ints.map(|i| u32::try_from(i).map_err(|_| out_of_range(i)))
                        .collect::<Result<_, _>>()?,
                ),
                Vr::SL => PrimitiveValue::I32(
                    ints.map(|i| i32::try_from(i).map_err(|_| out_of_range(i)))
                        .collect::<Result<_, _>>()?,
                ),
                Vr::UV => PrimitiveValue::U64(
                    ints.map(|i| u64::try_from(i).map_err(|_| out_of_range(i)))
                        .collect::<Result<_, _>>()?,
                ),
                _ => PrimitiveValue::I64(ints.collect()),
            }
        }
        Value::Floats(floats) => match vr {
            Vr::FL => PrimitiveValue::F32(floats.iter().map(|&f| f as f32).collect()),
            _ => PrimitiveValue::F64(floats.iter().copied().collect()),
        },
        Value::Tags(tag_list) => PrimitiveValue::Tags(tag_list.iter().map(|&t| t.into()).collect()),
        Value::Bytes(bytes) => {
            let mut bytes = bytes.clone();
            if bytes.len() % 2 == 1 {
                bytes.push(vr.padding());
            }
            PrimitiveValue::U8(bytes.into_iter().collect())
        }
    };
    Ok(primitive)
}
