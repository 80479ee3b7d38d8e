//! The attribute dictionary: tag to VR and keyword.
//!
//! Backed by the standard data dictionary of `dicom-dictionary-std`, so every
//! attribute of the current standard resolves. Private (odd group) tags never
//! have an entry; they are still representable everywhere, just without a
//! default VR or keyword.

use dicom_core::dictionary::{DataDictionary, DataDictionaryEntryRef, TagRange, VirtualVr};
use dicom_dictionary_std::StandardDataDictionary;

use crate::error::LookupError;
use crate::model::{Tag, Vr};

static DICTIONARY: StandardDataDictionary = StandardDataDictionary;

/// One resolved dictionary row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DictEntry {
    pub tag: Tag,
    pub vr: Vr,
    pub keyword: &'static str,
}

fn standard(tag: Tag) -> Option<&'static DataDictionaryEntryRef<'static>> {
    if tag.is_private() {
        return None;
    }
    DICTIONARY.by_tag(tag.into())
}

/// Collapses the dictionary's ambiguous VRs to the form fixtures use.
fn concrete_vr(vr: &VirtualVr) -> Vr {
    match vr {
        VirtualVr::Exact(vr) => Vr::from(*vr),
        VirtualVr::Xs => Vr::US,
        // OB or OW, decided by the transfer syntax or bit depth
        _ => Vr::OW,
    }
}

/// Looks up the dictionary entry for a tag.
///
/// Repeating-group attributes (overlays, curves) resolve for every tag in
/// their range.
pub fn entry(tag: Tag) -> Option<DictEntry> {
    standard(tag).map(|e| DictEntry {
        tag,
        vr: concrete_vr(&e.vr),
        keyword: e.alias,
    })
}

/// Returns the dictionary VR for a tag.
///
/// Group length tags (`gggg,0000`) are always UL.
///
/// # Errors
///
/// [`LookupError::UnknownField`] when the tag has no entry.
pub fn vr_of(tag: Tag) -> Result<Vr, LookupError> {
    if tag.is_group_length() {
        return Ok(Vr::UL);
    }
    entry(tag).map(|e| e.vr).ok_or(LookupError::UnknownField { tag })
}

/// Returns the keyword for a tag.
pub fn keyword_of(tag: Tag) -> Option<&'static str> {
    standard(tag).map(|e| e.alias)
}

/// Returns the tag for a keyword.
///
/// Only single-tag attributes have a keyword lookup; repeating groups need
/// their explicit tag.
pub fn tag_of(keyword: &str) -> Option<Tag> {
    match DICTIONARY.by_name(keyword)?.tag {
        TagRange::Single(tag) => Some(Tag::from(tag)),
        _ => None,
    }
}

/// Well-known tags used by the codecs and generators.
pub mod tags {
    use crate::model::Tag;

    pub const FILE_META_GROUP_LENGTH: Tag = Tag::new(0x0002, 0x0000);
    pub const FILE_META_VERSION: Tag = Tag::new(0x0002, 0x0001);
    pub const MEDIA_STORAGE_SOP_CLASS_UID: Tag = Tag::new(0x0002, 0x0002);
    pub const MEDIA_STORAGE_SOP_INSTANCE_UID: Tag = Tag::new(0x0002, 0x0003);
    pub const TRANSFER_SYNTAX_UID: Tag = Tag::new(0x0002, 0x0010);
    pub const IMPLEMENTATION_CLASS_UID: Tag = Tag::new(0x0002, 0x0012);
    pub const IMPLEMENTATION_VERSION_NAME: Tag = Tag::new(0x0002, 0x0013);
    pub const SOURCE_APPLICATION_ENTITY_TITLE: Tag = Tag::new(0x0002, 0x0016);

    pub const SOP_CLASS_UID: Tag = Tag::new(0x0008, 0x0016);
    pub const SOP_INSTANCE_UID: Tag = Tag::new(0x0008, 0x0018);
    pub const PATIENT_NAME: Tag = Tag::new(0x0010, 0x0010);
    pub const PATIENT_ID: Tag = Tag::new(0x0010, 0x0020);
    pub const ROWS: Tag = Tag::new(0x0028, 0x0010);
    pub const COLUMNS: Tag = Tag::new(0x0028, 0x0011);
    pub const PIXEL_DATA: Tag = Tag::new(0x7FE0, 0x0010);
}
