use serde::ser::{Serialize, SerializeMap, Serializer};
use std::collections::HashMap;

use super::CellValue;

/// Header spelling checked first when resolving the product identifier
pub const IDENTIFIER_KEY: &str = "ASIN";

/// A single header/value pair
#[derive(Debug, Clone, PartialEq)]
pub struct RecordField {
    pub key: String,
    pub value: CellValue,
}

/// One spreadsheet row keyed by header.
///
/// Field order is the order in which headers were first inserted; re-inserting
/// an existing key replaces the value in place.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListingRecord {
    fields: Vec<RecordField>,
    index: HashMap<String, usize>,
}

impl ListingRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_pairs<K, V, I>(pairs: I) -> Self
    where
        K: Into<String>,
        V: Into<CellValue>,
        I: IntoIterator<Item = (K, V)>,
    {
        let mut record = Self::new();
        for (key, value) in pairs {
            record.insert(key, value);
        }
        record
    }

    /// Insert a value; last write wins
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<CellValue>) {
        let key = key.into();
        let value = value.into();
        match self.index.get(&key) {
            Some(&pos) => self.fields[pos].value = value,
            None => {
                self.index.insert(key.clone(), self.fields.len());
                self.fields.push(RecordField { key, value });
            }
        }
    }

    /// Insert only when the key is not already present
    pub fn insert_if_absent(&mut self, key: &str, value: &CellValue) {
        if !self.index.contains_key(key) {
            self.insert(key.to_string(), value.clone());
        }
    }

    pub fn get(&self, key: &str) -> Option<&CellValue> {
        self.index.get(key).map(|&pos| &self.fields[pos].value)
    }

    /// First non-blank value among several interchangeable keys
    pub fn get_any(&self, keys: &[&str]) -> Option<&CellValue> {
        keys.iter()
            .filter_map(|k| self.get(k))
            .find(|v| !v.is_blank())
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.index.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|f| f.key.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &CellValue)> {
        self.fields.iter().map(|f| (f.key.as_str(), &f.value))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// True when every value is blank
    pub fn is_blank(&self) -> bool {
        self.fields.iter().all(|f| f.value.is_blank())
    }

    /// Resolve the product identifier (ASIN).
    ///
    /// `ASIN` is checked first, then any header equal to `asin` ignoring case.
    /// Blank values count as absent.
    pub fn product_identifier(&self) -> Option<String> {
        if let Some(id) = self.get(IDENTIFIER_KEY).and_then(CellValue::as_text) {
            return Some(id);
        }
        self.fields
            .iter()
            .filter(|f| f.key != IDENTIFIER_KEY && f.key.eq_ignore_ascii_case("asin"))
            .find_map(|f| f.value.as_text())
    }
}

impl Serialize for ListingRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for field in &self.fields {
            map.serialize_entry(&field.key, &field.value)?;
        }
        map.end()
    }
}
