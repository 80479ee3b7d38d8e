//! Field identifiers and the field reference resolver.
//!
//! A DICOM field is identified by a (group, element) pair packed into one
//! 32-bit value. Callers may name a field by its dictionary keyword, by the
//! pair, by the packed integer, or by one of the usual hex spellings; every
//! one of those goes through [`resolve`] so the same field always compares
//! equal however it was named.

use std::fmt;

use crate::dictionary;
use crate::error::LookupError;

/// A packed (group, element) field identifier.
///
/// Ordering follows the packed value, which is the order fields appear in a
/// DICOM file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Tag(pub u32);

impl Tag {
    /// Creates a tag from its group and element numbers.
    pub const fn new(group: u16, element: u16) -> Self {
        Tag(((group as u32) << 16) | element as u32)
    }

    /// The group number (high 16 bits).
    pub const fn group(self) -> u16 {
        (self.0 >> 16) as u16
    }

    /// The element number (low 16 bits).
    pub const fn element(self) -> u16 {
        (self.0 & 0xFFFF) as u16
    }

    /// Returns true for private (odd group) tags.
    pub const fn is_private(self) -> bool {
        self.group() % 2 == 1
    }

    /// Returns true for group length tags (`gggg,0000`).
    pub const fn is_group_length(self) -> bool {
        self.element() == 0
    }

    /// Returns true for file meta information tags (group 0002).
    pub const fn is_file_meta(self) -> bool {
        self.group() == 0x0002
    }

    /// Fixed-width uppercase hex rendering used as the key in JSON documents.
    pub fn to_hex(self) -> String {
        format!("{:08X}", self.0)
    }

    /// Parses exactly eight hex digits, the JSON key form.
    pub fn from_hex(s: &str) -> Option<Tag> {
        if s.len() != 8 || !s.bytes().all(|b| b.is_ascii_hexdigit()) {
            return None;
        }
        u32::from_str_radix(s, 16).ok().map(Tag)
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:04X},{:04X})", self.group(), self.element())
    }
}

impl From<u32> for Tag {
    fn from(value: u32) -> Self {
        Tag(value)
    }
}

impl From<(u16, u16)> for Tag {
    fn from((group, element): (u16, u16)) -> Self {
        Tag::new(group, element)
    }
}

impl From<Tag> for u32 {
    fn from(tag: Tag) -> Self {
        tag.0
    }
}

impl From<dicom_core::Tag> for Tag {
    fn from(tag: dicom_core::Tag) -> Self {
        Tag::new(tag.0, tag.1)
    }
}

impl From<Tag> for dicom_core::Tag {
    fn from(tag: Tag) -> Self {
        dicom_core::Tag(tag.group(), tag.element())
    }
}

/// Anything that can name a field.
pub trait TagLike {
    /// Resolves this reference to a canonical tag.
    fn to_tag(&self) -> Result<Tag, LookupError>;
}

impl TagLike for Tag {
    fn to_tag(&self) -> Result<Tag, LookupError> {
        Ok(*self)
    }
}

impl TagLike for u32 {
    fn to_tag(&self) -> Result<Tag, LookupError> {
        Ok(Tag(*self))
    }
}

impl TagLike for (u16, u16) {
    fn to_tag(&self) -> Result<Tag, LookupError> {
        Ok(Tag::new(self.0, self.1))
    }
}

impl TagLike for str {
    fn to_tag(&self) -> Result<Tag, LookupError> {
        parse_reference(self)
    }
}

impl TagLike for String {
    fn to_tag(&self) -> Result<Tag, LookupError> {
        parse_reference(self)
    }
}

impl<T: TagLike + ?Sized> TagLike for &T {
    fn to_tag(&self) -> Result<Tag, LookupError> {
        (**self).to_tag()
    }
}

/// Resolves any field reference to its canonical tag.
///
/// Accepts keywords (`"PatientID"`), packed integers (`0x0010_0020`),
/// `(group, element)` pairs, tags, and hex strings in the forms
/// `"00100020"`, `"0x00100020"`, `"(0010,0020)"` and `"0x0010,0x0020"`.
///
/// # Errors
///
/// [`LookupError::InvalidFieldReference`] when a string is neither a known
/// keyword nor a syntactically valid hex tag.
pub fn resolve(reference: impl TagLike) -> Result<Tag, LookupError> {
    reference.to_tag()
}

fn parse_reference(reference: &str) -> Result<Tag, LookupError> {
    let trimmed = reference.trim();
    if let Some(tag) = dictionary::tag_of(trimmed) {
        return Ok(tag);
    }
    parse_hex_reference(trimmed).ok_or_else(|| LookupError::InvalidFieldReference {
        reference: reference.to_string(),
    })
}

fn parse_hex_reference(s: &str) -> Option<Tag> {
    let s = s
        .strip_prefix('(')
        .and_then(|inner| inner.strip_suffix(')'))
        .unwrap_or(s);

    if let Some((group, element)) = s.split_once(',') {
        let group = parse_hex_u16(group.trim())?;
        let element = parse_hex_u16(element.trim())?;
        return Some(Tag::new(group, element));
    }

    let digits = strip_hex_prefix(s);
    if digits.is_empty() || digits.len() > 8 || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    u32::from_str_radix(digits, 16).ok().map(Tag)
}

fn parse_hex_u16(s: &str) -> Option<u16> {
    let digits = strip_hex_prefix(s);
    if digits.is_empty() || digits.len() > 4 || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    u16::from_str_radix(digits, 16).ok()
}

fn strip_hex_prefix(s: &str) -> &str {
    s.strip_prefix("0x")
        .or_else(|| s.strip_prefix("0X"))
        .unwrap_or(s)
}

#[cfg(test)]
mod tests {
    use super::*;

    const PATIENT_ID: Tag = Tag::new(0x0010, 0x0020);

    #[test]
    fn test_group_and_element() {
        let tag = Tag::new(0x7FE0, 0x0010);
        assert_eq!(tag.group(), 0x7FE0);
        assert_eq!(tag.element(), 0x0010);
        assert_eq!(tag.0, 0x7FE0_0010);
        assert_eq!(tag.to_string(), "(7FE0,0010)");
    }

    #[test]
    fn test_hex_key_form() {
        assert_eq!(PATIENT_ID.to_hex(), "00100020");
        assert_eq!(Tag::from_hex("00100020"), Some(PATIENT_ID));
        assert_eq!(Tag::from_hex("7fe00010"), Some(Tag::new(0x7FE0, 0x0010)));
        assert_eq!(Tag::from_hex("0010002"), None);
        assert_eq!(Tag::from_hex("0010002G"), None);
    }

    #[test]
    fn test_aliases_resolve_to_same_tag() {
        let by_keyword = resolve("PatientID").unwrap();
        let by_packed = resolve(0x0010_0020u32).unwrap();
        let by_pair = resolve((0x0010u16, 0x0020u16)).unwrap();
        let by_tag = resolve(PATIENT_ID).unwrap();
        let by_hex = resolve("00100020").unwrap();
        let by_prefixed = resolve("0x00100020").unwrap();
        let by_paren = resolve("(0010,0020)").unwrap();
        let by_pair_str = resolve("0x0010,0x0020").unwrap();

        for tag in [by_packed, by_pair, by_tag, by_hex, by_prefixed, by_paren, by_pair_str] {
            assert_eq!(tag, by_keyword);
        }
    }

    #[test]
    fn test_resolve_any_standard_keyword() {
        assert_eq!(resolve("PatientAddress").unwrap(), Tag::new(0x0010, 0x1040));
        assert_eq!(resolve("ContrastBolusAgent").unwrap(), Tag::new(0x0018, 0x0010));
        assert_eq!(Tag::from(dicom_core::Tag(0x0010, 0x1040)), Tag::new(0x0010, 0x1040));
        assert_eq!(dicom_core::Tag::from(Tag::new(0x7FE0, 0x0010)), dicom_core::Tag(0x7FE0, 0x0010));
    }

    #[test]
    fn test_resolve_is_idempotent() {
        let once = resolve("PatientName").unwrap();
        let twice = resolve(once).unwrap();
        assert_eq!(once, twice);
        assert_eq!(resolve(once.to_hex()).unwrap(), once);
    }

    #[test]
    fn test_unknown_reference_rejected() {
        let err = resolve("unknown_tag").unwrap_err();
        assert_eq!(
            err,
            LookupError::InvalidFieldReference {
                reference: "unknown_tag".to_string()
            }
        );
        assert!(resolve("").is_err());
        assert!(resolve("0x").is_err());
        assert!(resolve("123456789").is_err());
        assert!(resolve("(00100,0020)").is_err());
    }

    #[test]
    fn test_private_tags_resolve_by_hex() {
        let tag = resolve("00291010").unwrap();
        assert!(tag.is_private());
        assert_eq!(tag, Tag::new(0x0029, 0x1010));
    }
}
