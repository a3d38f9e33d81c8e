use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

// The portal's own result codes: 200 success, 300 any failure.
pub const STATUS_OK: u16 = 200;
pub const STATUS_ERROR: u16 = 300;

#[derive(Debug, Clone)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

#[derive(Serialize)]
pub struct JsonOut<T: Serialize> {
    pub ok: bool,
    pub data: T,
}

/// Scraped label/value pairs in document order; inserting an existing label
/// overwrites its value in place.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AttributeSet {
    entries: Vec<(String, String)>,
}

impl AttributeSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, label: impl Into<String>, value: impl Into<String>) {
        let label = label.into();
        let value = value.into();
        if let Some(entry) = self.entries.iter_mut().find(|(l, _)| *l == label) {
            entry.1 = value;
        } else {
            self.entries.push((label, value));
        }
    }

    pub fn get(&self, label: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(l, _)| l == label)
            .map(|(_, v)| v.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(l, v)| (l.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Serialize for AttributeSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (label, value) in &self.entries {
            map.serialize_entry(label, value)?;
        }
        map.end()
    }
}

impl FromIterator<(String, String)> for AttributeSet {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        let mut set = AttributeSet::new();
        for (label, value) in iter {
            set.insert(label, value);
        }
        set
    }
}

/// Every lookup terminates in exactly one of these.
#[derive(Debug, Serialize)]
pub struct LookupResult {
    pub status: u16,
    pub description: String,
    pub vin: String,
    pub attributes: AttributeSet,
}

impl LookupResult {
    pub fn success(vin: &str, attributes: AttributeSet) -> Self {
        Self {
            status: STATUS_OK,
            description: String::new(),
            vin: vin.to_string(),
            attributes,
        }
    }

    pub fn failure(vin: &str, description: impl Into<String>) -> Self {
        Self {
            status: STATUS_ERROR,
            description: description.into(),
            vin: vin.to_string(),
            attributes: AttributeSet::new(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == STATUS_OK
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn attribute_set_keeps_document_order() {
        let mut set = AttributeSet::new();
        set.insert("Engine", "V6");
        set.insert("Color", "Red");
        set.insert("Trim", "LX");
        let labels: Vec<&str> = set.iter().map(|(l, _)| l).collect();
        assert_eq!(labels, vec!["Engine", "Color", "Trim"]);
    }

    #[test]
    fn duplicate_label_overwrites_in_place() {
        let mut set = AttributeSet::new();
        set.insert("Engine", "V6");
        set.insert("Color", "Red");
        set.insert("Engine", "V8");
        assert_eq!(set.len(), 2);
        assert_eq!(set.get("Engine"), Some("V8"));
        let labels: Vec<&str> = set.iter().map(|(l, _)| l).collect();
        assert_eq!(labels, vec!["Engine", "Color"]);
    }

    #[test]
    fn serializes_as_ordered_map() {
        let mut set = AttributeSet::new();
        set.insert("Color", "Red");
        set.insert("Engine", "V6");
        let json = serde_json::to_string(&set).expect("serialize");
        assert_eq!(json, r#"{"Color":"Red","Engine":"V6"}"#);
    }
}
