use serde_json::{Number, Value};

/// Field names used to read a record. Name fields are tried in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldNames {
    pub name: Vec<String>,
    pub description: String,
    pub tags: String,
}

impl Default for FieldNames {
    fn default() -> Self {
        Self {
            name: vec!["Nom Japonais".to_string(), "Nom".to_string()],
            description: "Description".to_string(),
            tags: "Tags".to_string(),
        }
    }
}

/// One dictionary record, resolved against [`FieldNames`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Entry {
    /// Trimmed display name; empty when no name field resolved.
    pub name: String,
    pub description: String,
    pub tags: Vec<String>,
    /// Every field of the record as (key, display value), in document order.
    pub fields: Vec<(String, String)>,
}

impl Entry {
    pub fn from_value(value: &Value, names: &FieldNames) -> Self {
        let Some(object) = value.as_object() else {
            return Self::default();
        };

        let name = names
            .name
            .iter()
            .filter_map(|field| object.get(field))
            .find_map(truthy_text)
            .map(|text| text.trim().to_string())
            .unwrap_or_default();

        let description = object
            .get(&names.description)
            .and_then(truthy_text)
            .map(|text| text.trim().to_string())
            .unwrap_or_default();

        let tags = object
            .get(&names.tags)
            .map(extract_tags)
            .unwrap_or_default();

        let fields = object
            .iter()
            .map(|(key, value)| (key.clone(), display_text(value)))
            .collect();

        Self {
            name,
            description,
            tags,
            fields,
        }
    }

    pub fn has_name(&self) -> bool {
        !self.name.is_empty()
    }
}

/// Stringify a value if it would count as set: non-empty strings, non-zero
/// numbers and `true`. Containers and null are skipped.
fn truthy_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) if n.as_f64() != Some(0.0) => Some(number_text(n)),
        Value::Bool(true) => Some("true".to_string()),
        _ => None,
    }
}

/// Tags may come as an array, a comma-separated string, or a lone scalar.
fn extract_tags(raw: &Value) -> Vec<String> {
    match raw {
        Value::Array(items) => items
            .iter()
            .map(|item| display_text(item).trim().to_string())
            .filter(|tag| !tag.is_empty())
            .collect(),
        Value::String(s) => s
            .split(',')
            .map(str::trim)
            .filter(|tag| !tag.is_empty())
            .map(str::to_string)
            .collect(),
        other => truthy_text(other).into_iter().collect(),
    }
}

/// Best-effort display string for any JSON value.
fn display_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Array(items) => items
            .iter()
            .map(display_text)
            .collect::<Vec<_>>()
            .join(","),
        Value::Number(n) => number_text(n),
        other => other.to_string(),
    }
}

/// Whole floats print without a fractional part: `1.0` becomes `"1"`.
fn number_text(n: &Number) -> String {
    match n.as_f64() {
        Some(f) if n.is_f64() && f.fract() == 0.0 && f.abs() < 1e15 => format!("{}", f as i64),
        _ => n.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn entry(value: Value) -> Entry {
        Entry::from_value(&value, &FieldNames::default())
    }

    #[test]
    fn test_name_precedence() {
        let e = entry(json!({"Nom Japonais": "Sakura", "Nom": "Cerisier"}));
        assert_eq!(e.name, "Sakura");

        let e = entry(json!({"Nom Japonais": "", "Nom": "  Cerisier "}));
        assert_eq!(e.name, "Cerisier");

        let e = entry(json!({"Nom Japonais": null, "Nom": 42}));
        assert_eq!(e.name, "42");

        let e = entry(json!({"Description": "no name"}));
        assert!(!e.has_name());
    }

    #[test]
    fn test_whole_float_name_drops_fraction() {
        let e = entry(json!({"Nom": 1.0}));
        assert_eq!(e.name, "1");

        let e = entry(json!({"Nom": 2.5, "Tags": [3.0, "x"]}));
        assert_eq!(e.name, "2.5");
        assert_eq!(e.tags, vec!["3", "x"]);
    }

    #[test]
    fn test_non_object_has_no_name() {
        assert!(!entry(json!("just a string")).has_name());
        assert!(!entry(json!(7)).has_name());
    }

    #[test]
    fn test_tags_from_string_and_array() {
        let e = entry(json!({"Nom": "a", "Tags": "fleur, arbre ,, printemps"}));
        assert_eq!(e.tags, vec!["fleur", "arbre", "printemps"]);

        let e = entry(json!({"Nom": "a", "Tags": [" fleur ", 3, "", null]}));
        assert_eq!(e.tags, vec!["fleur", "3"]);

        let e = entry(json!({"Nom": "a", "Tags": 12}));
        assert_eq!(e.tags, vec!["12"]);

        let e = entry(json!({"Nom": "a", "Tags": false}));
        assert!(e.tags.is_empty());
    }

    #[test]
    fn test_custom_field_names() {
        let names = FieldNames {
            name: vec!["word".into()],
            description: "meaning".into(),
            tags: "labels".into(),
        };
        let e = Entry::from_value(
            &json!({"word": "kaze", "meaning": " wind ", "labels": ["nature"]}),
            &names,
        );
        assert_eq!(e.name, "kaze");
        assert_eq!(e.description, "wind");
        assert_eq!(e.tags, vec!["nature"]);
    }

    #[test]
    fn test_fields_keep_document_order() {
        let e = entry(json!({"Nom": "kaze", "Kanji": "風", "Tags": ["a", "b"]}));
        let keys: Vec<&str> = e.fields.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, vec!["Nom", "Kanji", "Tags"]);
        assert_eq!(e.fields[2].1, "a,b");
    }
}
