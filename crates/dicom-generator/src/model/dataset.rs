//! The canonical in-memory record.

use rustc_hash::FxHashMap;

use crate::dictionary;
use crate::error::LookupError;
use crate::model::{Tag, TagLike, Value, Vr};

/// One field of a dataset.
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    pub tag: Tag,
    pub vr: Vr,
    pub value: Value,
}

impl Element {
    pub fn new(tag: Tag, vr: Vr, value: impl Into<Value>) -> Self {
        Self {
            tag,
            vr,
            value: value.into(),
        }
    }

    /// Dictionary keyword of this element's tag, if it has one.
    pub fn keyword(&self) -> Option<&'static str> {
        dictionary::keyword_of(self.tag)
    }
}

/// An insertion-ordered collection of elements keyed by tag.
///
/// Re-inserting a tag replaces the element where it stands. Two datasets are
/// equal when they hold the same tags with equal elements, whatever the order.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    elements: Vec<Element>,
    index: FxHashMap<Tag, usize>,
}

impl Dataset {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Inserts an element, returning the one it replaced.
    pub fn insert(&mut self, element: Element) -> Option<Element> {
        match self.index.get(&element.tag) {
            Some(&pos) => Some(std::mem::replace(&mut self.elements[pos], element)),
            None => {
                self.index.insert(element.tag, self.elements.len());
                self.elements.push(element);
                None
            }
        }
    }

    /// Sets a field's value by any field reference.
    ///
    /// An existing element keeps its VR; a new element takes the VR from
    /// the dictionary.
    ///
    /// # Errors
    ///
    /// Fails when the reference does not resolve, or when the field is new and
    /// has no dictionary entry (use [`Dataset::put_with_vr`] for those).
    pub fn put(
        &mut self,
        key: impl TagLike,
        value: impl Into<Value>,
    ) -> Result<Option<Element>, LookupError> {
        let tag = key.to_tag()?;
        let vr = match self.element(tag) {
            Some(existing) => existing.vr,
            None => dictionary::vr_of(tag)?,
        };
        Ok(self.insert(Element::new(tag, vr, value)))
    }

    /// Sets a field with an explicit VR.
    pub fn put_with_vr(
        &mut self,
        key: impl TagLike,
        vr: Vr,
        value: impl Into<Value>,
    ) -> Result<Option<Element>, LookupError> {
        let tag = key.to_tag()?;
        Ok(self.insert(Element::new(tag, vr, value)))
    }

    /// Looks up an element by any field reference.
    pub fn get(&self, key: impl TagLike) -> Result<Option<&Element>, LookupError> {
        Ok(self.element(key.to_tag()?))
    }

    /// Looks up an element by tag.
    pub fn element(&self, tag: Tag) -> Option<&Element> {
        self.index.get(&tag).map(|&pos| &self.elements[pos])
    }

    pub fn element_mut(&mut self, tag: Tag) -> Option<&mut Element> {
        self.index.get(&tag).map(|&pos| &mut self.elements[pos])
    }

    /// Value of the element with this tag.
    pub fn value(&self, tag: Tag) -> Option<&Value> {
        self.element(tag).map(|e| &e.value)
    }

    /// First string value of the element with this tag.
    pub fn string(&self, tag: Tag) -> Option<&str> {
        self.value(tag).and_then(Value::as_str)
    }

    pub fn contains(&self, tag: Tag) -> bool {
        self.index.contains_key(&tag)
    }

    /// Removes an element by any field reference.
    pub fn remove(&mut self, key: impl TagLike) -> Result<Option<Element>, LookupError> {
        let tag = key.to_tag()?;
        let Some(pos) = self.index.remove(&tag) else {
            return Ok(None);
        };
        let removed = self.elements.remove(pos);
        for slot in self.index.values_mut() {
            if *slot > pos {
                *slot -= 1;
            }
        }
        Ok(Some(removed))
    }

    /// Keeps only the elements for which `keep` returns true.
    pub fn retain(&mut self, mut keep: impl FnMut(&Element) -> bool) {
        self.elements.retain(|e| keep(e));
        self.reindex();
    }

    /// Elements in insertion order.
    pub fn iter(&self) -> std::slice::Iter<'_, Element> {
        self.elements.iter()
    }

    /// Tags in insertion order.
    pub fn tags(&self) -> impl Iterator<Item = Tag> + '_ {
        self.elements.iter().map(|e| e.tag)
    }

    /// Reorders elements by ascending tag.
    pub fn sort(&mut self) {
        self.elements.sort_by_key(|e| e.tag);
        self.reindex();
    }

    /// The PixelData payload, if present as bytes.
    pub fn pixel_data(&self) -> Option<&[u8]> {
        self.value(dictionary::tags::PIXEL_DATA)
            .and_then(Value::as_bytes)
    }

    fn reindex(&mut self) {
        self.index.clear();
        for (pos, element) in self.elements.iter().enumerate() {
            self.index.insert(element.tag, pos);
        }
    }
}

impl PartialEq for Dataset {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len()
            && self
                .elements
                .iter()
                .all(|e| other.element(e.tag) == Some(e))
    }
}

impl FromIterator<Element> for Dataset {
    fn from_iter<I: IntoIterator<Item = Element>>(iter: I) -> Self {
        let mut dataset = Dataset::new();
        dataset.extend(iter);
        dataset
    }
}

impl Extend<Element> for Dataset {
    fn extend<I: IntoIterator<Item = Element>>(&mut self, iter: I) {
        for element in iter {
            self.insert(element);
        }
    }
}

impl<'a> IntoIterator for &'a Dataset {
    type Item = &'a Element;
    type IntoIter = std::slice::Iter<'a, Element>;

    fn into_iter(self) -> Self::IntoIter {
        self.elements.iter()
    }
}

impl IntoIterator for Dataset {
    type Item = Element;
    type IntoIter = std::vec::IntoIter<Element>;

    fn into_iter(self) -> Self::IntoIter {
        self.elements.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn patient() -> Dataset {
        let mut ds = Dataset::new();
        ds.put("PatientName", "Doe^John").unwrap();
        ds.put("PatientID", "1234").unwrap();
        ds.put("Rows", 512i64).unwrap();
        ds
    }

    #[test]
    fn test_insertion_order_kept() {
        let ds = patient();
        let keywords: Vec<_> = ds.iter().map(|e| e.keyword().unwrap()).collect();
        assert_eq!(keywords, vec!["PatientName", "PatientID", "Rows"]);
    }

    #[test]
    fn test_reinsert_replaces_in_place() {
        let mut ds = patient();
        let old = ds.put("PatientName", "Roe^Jane").unwrap().unwrap();
        assert_eq!(old.value, Value::text("Doe^John"));
        assert_eq!(ds.len(), 3);
        assert_eq!(ds.iter().next().unwrap().value, Value::text("Roe^Jane"));
    }

    #[test]
    fn test_put_uses_dictionary_vr() {
        let ds = patient();
        assert_eq!(ds.get("Rows").unwrap().unwrap().vr, Vr::US);
        assert_eq!(ds.get("PatientName").unwrap().unwrap().vr, Vr::PN);
    }

    #[test]
    fn test_put_unknown_tag_needs_vr() {
        let mut ds = Dataset::new();
        let err = ds.put(Tag::new(0x0029, 0x1010), "x").unwrap_err();
        assert_eq!(
            err,
            LookupError::UnknownField {
                tag: Tag::new(0x0029, 0x1010)
            }
        );
        ds.put_with_vr(Tag::new(0x0029, 0x1010), Vr::LO, "x").unwrap();
        assert_eq!(ds.string(Tag::new(0x0029, 0x1010)), Some("x"));
    }

    #[test]
    fn test_get_by_aliases() {
        let ds = patient();
        let a = ds.get("PatientID").unwrap();
        let b = ds.get(0x0010_0020u32).unwrap();
        let c = ds.get("(0010,0020)").unwrap();
        assert!(a.is_some());
        assert_eq!(a, b);
        assert_eq!(b, c);
        assert!(ds.get("unknown_tag").is_err());
    }

    #[test]
    fn test_remove_keeps_index_consistent() {
        let mut ds = patient();
        let removed = ds.remove("PatientName").unwrap();
        assert!(removed.is_some());
        assert_eq!(ds.len(), 2);
        assert_eq!(ds.string(Tag::new(0x0010, 0x0020)), Some("1234"));
        assert_eq!(ds.value(Tag::new(0x0028, 0x0010)), Some(&Value::from(512i64)));
        assert!(ds.remove("PatientName").unwrap().is_none());
    }

    #[test]
    fn test_equality_ignores_order() {
        let a = patient();
        let mut b = Dataset::new();
        for element in a.iter().rev() {
            b.insert(element.clone());
        }
        assert_eq!(a, b);

        b.put("PatientID", "other").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_bytes_compare_exactly() {
        let mut a = Dataset::new();
        a.put("PixelData", vec![0x13u8, 0x00]).unwrap();
        let mut b = a.clone();
        assert_eq!(a, b);
        b.put("PixelData", vec![0x13u8]).unwrap();
        assert_ne!(a, b);
        assert_eq!(a.pixel_data(), Some(&[0x13u8, 0x00][..]));
    }

    #[test]
    fn test_sort() {
        let mut ds = patient();
        ds.sort();
        let tags: Vec<_> = ds.tags().collect();
        let mut sorted = tags.clone();
        sorted.sort();
        assert_eq!(tags, sorted);
        assert_eq!(ds.string(Tag::new(0x0010, 0x0010)), Some("Doe^John"));
    }
}
