//! Ordered component lookup table
//!
//! Keeps entries in the order their keys first appeared. That order is the
//! tie-break order of fuzzy matching, so it is preserved through load and save.
//!
//! Entries that cannot be read as a [`ComponentRecord`] are kept as raw JSON.
//! They never match, but they still occupy their key and are written back
//! verbatim, so rewriting the file never drops them.

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use std::fmt;

use super::record::ComponentRecord;

/// Mapping from part identifier to component record
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LookupTable {
    entries: Vec<(String, ComponentRecord)>,
    unreadable: Vec<(String, Value)>,
}

impl LookupTable {
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
            unreadable: Vec::new(),
        }
    }

    /// Keys of entries kept as raw JSON
    pub fn unreadable_keys(&self) -> impl Iterator<Item = &str> {
        self.unreadable.iter().map(|(k, _)| k.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entry for `key`, with the key borrowed from the table
    pub fn get_key_value(&self, key: &str) -> Option<(&str, &ComponentRecord)> {
        self.position(key).map(|i| {
            let (k, record) = &self.entries[i];
            (k.as_str(), record)
        })
    }

    /// True for readable and unreadable entries alike
    pub fn contains_key(&self, key: &str) -> bool {
        self.position(key).is_some() || self.unreadable_position(key).is_some()
    }

    /// Insert a new entry; returns false and leaves the table untouched if the key exists
    pub fn insert(&mut self, key: impl Into<String>, record: ComponentRecord) -> bool {
        let key = key.into();
        if self.contains_key(&key) {
            return false;
        }
        self.entries.push((key, record));
        true
    }

    /// Remove an entry, readable or not, keeping the order of the rest
    pub fn remove(&mut self, key: &str) -> bool {
        if let Some(i) = self.position(key) {
            self.entries.remove(i);
            true
        } else if let Some(i) = self.unreadable_position(key) {
            self.unreadable.remove(i);
            true
        } else {
            false
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ComponentRecord)> {
        self.entries.iter().map(|(k, r)| (k.as_str(), r))
    }

    /// Duplicate keys in a file keep their first position and their last value
    fn upsert(&mut self, key: String, record: ComponentRecord) {
        if let Some(i) = self.unreadable_position(&key) {
            self.unreadable.remove(i);
        }
        match self.position(&key) {
            Some(i) => self.entries[i].1 = record,
            None => self.entries.push((key, record)),
        }
    }

    fn upsert_unreadable(&mut self, key: String, raw: Value) {
        if let Some(i) = self.position(&key) {
            self.entries.remove(i);
        }
        match self.unreadable_position(&key) {
            Some(i) => self.unreadable[i].1 = raw,
            None => self.unreadable.push((key, raw)),
        }
    }

    fn position(&self, key: &str) -> Option<usize> {
        self.entries.iter().position(|(k, _)| k == key)
    }

    fn unreadable_position(&self, key: &str) -> Option<usize> {
        self.unreadable.iter().position(|(k, _)| k == key)
    }
}

impl FromIterator<(String, ComponentRecord)> for LookupTable {
    fn from_iter<I: IntoIterator<Item = (String, ComponentRecord)>>(iter: I) -> Self {
        let mut table = Self::new();
        for (key, record) in iter {
            table.upsert(key, record);
        }
        table
    }
}

impl Serialize for LookupTable {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let len = self.entries.len() + self.unreadable.len();
        let mut map = serializer.serialize_map(Some(len))?;
        for (key, record) in &self.entries {
            map.serialize_entry(key, record)?;
        }
        for (key, raw) in &self.unreadable {
            map.serialize_entry(key, raw)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for LookupTable {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(TableVisitor)
    }
}

struct TableVisitor;

impl<'de> Visitor<'de> for TableVisitor {
    type Value = LookupTable;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a JSON object keyed by part identifier")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
        let mut table = LookupTable::new();
        while let Some((key, raw)) = access.next_entry::<String, Value>()? {
            match ComponentRecord::deserialize(&raw) {
                Ok(record) => table.upsert(key, record),
                Err(_) => table.upsert_unreadable(key, raw),
            }
        }
        Ok(table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_order_is_kept() {
        let table: LookupTable = serde_json::from_str(
            r#"{
                "R5": {"parameter": "10K", "footprint": "0402", "box_id": 1, "led_id": 5},
                "C1": {"parameter": "100nF", "footprint": "0603", "box_id": 1, "led_id": 9},
                "A2": {"parameter": "SPX3819", "footprint": "", "box_id": 2, "led_id": 0}
            }"#,
        )
        .unwrap();
        let keys: Vec<&str> = table.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, ["R5", "C1", "A2"]);

        let written = serde_json::to_string(&table).unwrap();
        assert!(written.find("\"R5\"").unwrap() < written.find("\"C1\"").unwrap());
        assert!(written.find("\"C1\"").unwrap() < written.find("\"A2\"").unwrap());
    }

    #[test]
    fn test_duplicate_keys_keep_first_position_last_value() {
        let table: LookupTable = serde_json::from_str(
            r#"{
                "X": {"parameter": "old", "box_id": 1, "led_id": 1},
                "Y": {"parameter": "y", "box_id": 1, "led_id": 2},
                "X": {"parameter": "new", "box_id": 1, "led_id": 3}
            }"#,
        )
        .unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.iter().next().map(|(k, _)| k), Some("X"));
        assert_eq!(table.get_key_value("X").unwrap().1.parameter, "new");
    }

    #[test]
    fn test_insert_refuses_existing_key() {
        let mut table = LookupTable::new();
        assert!(table.insert("R1", ComponentRecord::new("10K", "0402", 1, 1)));
        assert!(!table.insert("R1", ComponentRecord::new("1K", "0603", 2, 2)));
        assert_eq!(table.len(), 1);
        assert_eq!(table.get_key_value("R1").unwrap().1.parameter, "10K");
    }

    #[test]
    fn test_remove_keeps_remaining_order() {
        let mut table: LookupTable = [
            ("A".to_string(), ComponentRecord::new("a", "", 1, 1)),
            ("B".to_string(), ComponentRecord::new("b", "", 1, 2)),
            ("C".to_string(), ComponentRecord::new("c", "", 1, 3)),
        ]
        .into_iter()
        .collect();

        assert!(table.remove("B"));
        assert!(!table.remove("B"));
        let keys: Vec<&str> = table.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, ["A", "C"]);
    }

    #[test]
    fn test_unreadable_entries_are_kept_verbatim() {
        let mut table: LookupTable = serde_json::from_str(
            r#"{
                "R1": {"parameter": "10K", "footprint": "0402", "box_id": 1, "led_id": 1},
                "NOTE": "restock before May",
                "C1": {"parameter": ["100N"], "box_id": 1, "led_id": 2}
            }"#,
        )
        .unwrap();
        assert_eq!(table.len(), 1);
        assert_eq!(table.unreadable_keys().collect::<Vec<_>>(), ["NOTE", "C1"]);
        assert!(table.contains_key("NOTE"));
        assert!(!table.insert("C1", ComponentRecord::new("100N", "0402", 1, 2)));

        let written = serde_json::to_value(&table).unwrap();
        assert_eq!(written["NOTE"], "restock before May");
        assert_eq!(written["C1"]["parameter"][0], "100N");

        assert!(table.remove("NOTE"));
        assert_eq!(table.unreadable_keys().count(), 1);
    }

    #[test]
    fn test_rejects_non_object() {
        assert!(serde_json::from_str::<LookupTable>("[1, 2, 3]").is_err());
    }
}
