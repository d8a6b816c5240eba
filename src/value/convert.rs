//! Conversions between nested values and the loader/emitter formats.
//!
//! YAML and JSON documents enter the model here and leave it here. Values the
//! model cannot carry (tagged YAML nodes) and values the target format cannot
//! carry (non-finite JSON numbers, composite JSON keys) are rejected with
//! [`TransformError::Serialization`] rather than coerced.
//!
//! Binary scalars travel through YAML as base64 text under the `!binary` tag,
//! the one tag accepted on import.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::ser::{Serialize, SerializeMap, SerializeSeq, Serializer};
use serde_yaml::value::{Tag, TaggedValue};
use std::collections::HashSet;

use crate::error::TransformError;

use super::path::{DEFAULT_MAX_DEPTH, TreePath};
use super::types::{Key, Mapping, NestedValue, Number, Scalar};

/// Tag carrying base64-encoded binary scalars.
const BINARY_TAG: &str = "binary";

/// Standard YAML form of [`BINARY_TAG`].
const BINARY_TAG_URI: &str = "tag:yaml.org,2002:binary";

fn is_binary_tag(tag: &Tag) -> bool {
    *tag == BINARY_TAG || *tag == BINARY_TAG_URI
}

fn import_binary(tagged: &TaggedValue, path: &TreePath) -> Result<NestedValue, TransformError> {
    let serde_yaml::Value::String(encoded) = &tagged.value else {
        return Err(TransformError::serialization(
            path.to_string(),
            format!("{} value is not a string", tagged.tag),
        ));
    };
    let cleaned: String = encoded.split_whitespace().collect();
    STANDARD
        .decode(cleaned)
        .map(|bytes| NestedValue::Scalar(Scalar::Bytes(bytes)))
        .map_err(|e| TransformError::serialization(path.to_string(), format!("invalid base64: {e}")))
}

/// Builds a nested value from a borrowed YAML value.
pub(crate) fn import_yaml(
    value: &serde_yaml::Value,
    path: &mut TreePath,
    max_depth: usize,
) -> Result<NestedValue, TransformError> {
    use serde_yaml::Value;

    match value {
        Value::Null => Ok(NestedValue::null()),
        Value::Bool(b) => Ok(NestedValue::Scalar(Scalar::Bool(*b))),
        Value::Number(n) => Ok(NestedValue::Scalar(Scalar::Number(Number::from(n.clone())))),
        Value::String(s) => Ok(NestedValue::Scalar(Scalar::String(s.clone()))),
        Value::Sequence(items) => {
            path.enter_container(max_depth)?;
            let mut out = Vec::with_capacity(items.len());
            for (index, item) in items.iter().enumerate() {
                path.push_index(index);
                let imported = import_yaml(item, path, max_depth);
                path.pop();
                out.push(imported?);
            }
            Ok(NestedValue::Sequence(out))
        }
        Value::Mapping(entries) => {
            path.enter_container(max_depth)?;
            let mut out = Mapping::with_capacity(entries.len());
            for (key, item) in entries {
                let key = import_key(key, path, max_depth)?;
                path.push_key(&key);
                let imported = import_yaml(item, path, max_depth);
                path.pop();
                out.insert(key, imported?);
            }
            Ok(NestedValue::Mapping(out))
        }
        Value::Tagged(tagged) if is_binary_tag(&tagged.tag) => import_binary(tagged, path),
        Value::Tagged(tagged) => Err(TransformError::serialization(
            path.to_string(),
            format!("tagged value {} has no untagged representation", tagged.tag),
        )),
    }
}

fn import_key(
    key: &serde_yaml::Value,
    path: &mut TreePath,
    max_depth: usize,
) -> Result<Key, TransformError> {
    use serde_yaml::Value;

    match key {
        Value::Null => Ok(Key::Null),
        Value::Bool(b) => Ok(Key::Bool(*b)),
        Value::Number(n) => Ok(Key::Number(Number::from(n.clone()))),
        Value::String(s) => Ok(Key::String(s.clone())),
        Value::Sequence(_) | Value::Mapping(_) => {
            path.push_field("<key>");
            let inner = import_yaml(key, path, max_depth);
            path.pop();
            Ok(Key::Composite(Box::new(inner?)))
        }
        Value::Tagged(tagged) => Err(TransformError::serialization(
            path.to_string(),
            format!("tagged key {} has no untagged representation", tagged.tag),
        )),
    }
}

impl TryFrom<serde_yaml::Value> for NestedValue {
    type Error = TransformError;

    fn try_from(value: serde_yaml::Value) -> Result<Self, Self::Error> {
        import_yaml(&value, &mut TreePath::root(), DEFAULT_MAX_DEPTH)
    }
}

fn json_number(n: &serde_json::Number) -> Number {
    if let Some(i) = n.as_i64() {
        Number::from(i)
    } else if let Some(u) = n.as_u64() {
        Number::from(u)
    } else {
        n.as_f64().map_or_else(|| Number::from(f64::NAN), Number::from)
    }
}

impl From<serde_json::Value> for NestedValue {
    fn from(value: serde_json::Value) -> Self {
        use serde_json::Value;

        match value {
            Value::Null => Self::null(),
            Value::Bool(b) => Self::Scalar(Scalar::Bool(b)),
            Value::Number(n) => Self::Scalar(Scalar::Number(json_number(&n))),
            Value::String(s) => Self::Scalar(Scalar::String(s)),
            Value::Array(items) => Self::Sequence(items.into_iter().map(Self::from).collect()),
            Value::Object(entries) => Self::Mapping(
                entries
                    .into_iter()
                    .map(|(key, item)| (Key::String(key), Self::from(item)))
                    .collect(),
            ),
        }
    }
}

impl NestedValue {
    /// Renders the value as a YAML document.
    ///
    /// # Errors
    ///
    /// Returns an error if the YAML emitter rejects the value.
    pub fn to_yaml_string(&self) -> Result<String, TransformError> {
        serde_yaml::to_string(self)
            .map_err(|e| TransformError::serialization("$", format!("YAML emit failed: {e}")))
    }

    /// Converts the value to JSON.
    ///
    /// Keys are rendered through their canonical text, so a mapping whose
    /// keys would merge in JSON (`"1"` and `1`) is rejected.
    ///
    /// # Errors
    ///
    /// Returns an error for non-finite numbers, composite keys and keys that
    /// collide once rendered as JSON strings.
    pub fn to_json(&self) -> Result<serde_json::Value, TransformError> {
        to_json_at(self, &mut TreePath::root())
    }

    /// Renders the value as pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if the value has no JSON representation.
    pub fn to_json_string(&self) -> Result<String, TransformError> {
        let json = self.to_json()?;
        serde_json::to_string_pretty(&json)
            .map_err(|e| TransformError::serialization("$", format!("JSON emit failed: {e}")))
    }
}

fn number_to_json(n: &Number, path: &TreePath) -> Result<serde_json::Value, TransformError> {
    if let Some(i) = n.as_i64() {
        return Ok(serde_json::Value::from(i));
    }
    if let Some(u) = n.as_u64() {
        return Ok(serde_json::Value::from(u));
    }
    n.as_f64()
        .and_then(serde_json::Number::from_f64)
        .map(serde_json::Value::Number)
        .ok_or_else(|| {
            TransformError::serialization(path.to_string(), format!("number {n} is not valid JSON"))
        })
}

fn to_json_at(value: &NestedValue, path: &mut TreePath) -> Result<serde_json::Value, TransformError> {
    use serde_json::Value;

    match value {
        NestedValue::Scalar(scalar) => match scalar {
            Scalar::Null => Ok(Value::Null),
            Scalar::Bool(b) => Ok(Value::Bool(*b)),
            Scalar::Number(n) => number_to_json(n, path),
            Scalar::String(s) => Ok(Value::String(s.clone())),
            Scalar::Bytes(bytes) => Ok(Value::Array(
                bytes.iter().map(|b| Value::from(*b)).collect(),
            )),
        },
        NestedValue::Sequence(items) => {
            let mut out = Vec::with_capacity(items.len());
            for (index, item) in items.iter().enumerate() {
                path.push_index(index);
                let converted = to_json_at(item, path);
                path.pop();
                out.push(converted?);
            }
            Ok(Value::Array(out))
        }
        NestedValue::Mapping(mapping) => {
            let mut out = serde_json::Map::new();
            let mut seen = HashSet::with_capacity(mapping.len());
            for (key, item) in mapping {
                let name = key
                    .to_symbol()
                    .ok_or_else(|| {
                        TransformError::serialization(
                            path.to_string(),
                            format!("{} cannot be a JSON object key", key.describe()),
                        )
                    })?
                    .as_str()
                    .to_string();
                if !seen.insert(name.clone()) {
                    return Err(TransformError::serialization(
                        path.to_string(),
                        format!("key {} duplicates JSON object key {name:?}", key.describe()),
                    ));
                }
                path.push_key(key);
                let converted = to_json_at(item, path);
                path.pop();
                out.insert(name, converted?);
            }
            Ok(Value::Object(out))
        }
    }
}

impl Serialize for Scalar {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Null => serializer.serialize_unit(),
            Self::Bool(b) => serializer.serialize_bool(*b),
            Self::Number(n) => n.as_yaml().serialize(serializer),
            Self::String(s) => serializer.serialize_str(s),
            Self::Bytes(bytes) => TaggedValue {
                tag: Tag::new(BINARY_TAG),
                value: serde_yaml::Value::String(STANDARD.encode(bytes)),
            }
            .serialize(serializer),
        }
    }
}

impl Serialize for Key {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Symbol(symbol) => serializer.serialize_str(symbol.as_str()),
            Self::String(s) => serializer.serialize_str(s),
            Self::Number(n) => n.as_yaml().serialize(serializer),
            Self::Bool(b) => serializer.serialize_bool(*b),
            Self::Null => serializer.serialize_unit(),
            Self::Composite(inner) => inner.serialize(serializer),
        }
    }
}

impl Serialize for Mapping {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.len()))?;
        for (key, value) in self {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

impl Serialize for NestedValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Scalar(scalar) => scalar.serialize(serializer),
            Self::Sequence(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Self::Mapping(mapping) => mapping.serialize(serializer),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn yaml(src: &str) -> NestedValue {
        let value: serde_yaml::Value = serde_yaml::from_str(src).unwrap();
        NestedValue::try_from(value).unwrap()
    }

    #[test]
    fn test_import_yaml_keys() {
        let value = yaml("name: web\n1: one\ntrue: yes\n~: nothing\n");
        let mapping = value.as_mapping().unwrap();

        assert!(mapping.contains_key(&Key::string("name")));
        assert!(mapping.contains_key(&Key::Number(Number::from(1))));
        assert!(mapping.contains_key(&Key::Bool(true)));
        assert!(mapping.contains_key(&Key::Null));
    }

    #[test]
    fn test_import_yaml_composite_key() {
        let value = yaml("? [a, b]\n: pair\n");
        let mapping = value.as_mapping().unwrap();
        let key = mapping.keys().next().unwrap();

        assert!(matches!(key, Key::Composite(inner) if inner.as_sequence().is_some()));
    }

    #[test]
    fn test_import_yaml_rejects_tagged_value() {
        let value: serde_yaml::Value =
            serde_yaml::from_str("taskRoleArn: !GetAtt Role.Arn\n").unwrap();
        let err = NestedValue::try_from(value).unwrap_err();

        assert!(matches!(err, TransformError::Serialization { .. }));
        assert_eq!(err.path(), "$.taskRoleArn");
    }

    #[test]
    fn test_from_json() {
        let json = serde_json::json!({
            "family": "web",
            "cpu": 256,
            "memory": 0.5,
            "containers": [{"essential": true}, null],
        });
        let value = NestedValue::from(json);
        let mapping = value.as_mapping().unwrap();

        assert_eq!(mapping.get_named("family"), Some(&NestedValue::from("web")));
        assert_eq!(mapping.get_named("cpu"), Some(&NestedValue::from(256)));
        let containers = mapping.get_named("containers").unwrap().as_sequence().unwrap();
        assert_eq!(containers.len(), 2);
        assert!(containers[1].is_null());
    }

    #[test]
    fn test_to_json_renders_symbol_and_number_keys() {
        let mut mapping = Mapping::new();
        mapping.insert(Key::symbol("family"), NestedValue::from("web"));
        mapping.insert(Key::Number(Number::from(80)), NestedValue::from(true));
        let value = NestedValue::Mapping(mapping);

        let json = value.to_json().unwrap();
        assert_eq!(json, serde_json::json!({"family": "web", "80": true}));
    }

    #[test]
    fn test_to_json_rejects_merging_keys() {
        let mut mapping = Mapping::new();
        mapping.insert(Key::string("1"), NestedValue::from("text"));
        mapping.insert(Key::Number(Number::from(1)), NestedValue::from("number"));
        let value = NestedValue::Mapping(mapping);

        let err = value.to_json().unwrap_err();
        assert!(matches!(err, TransformError::Serialization { .. }));
    }

    #[test]
    fn test_to_json_rejects_non_finite_number() {
        let value = NestedValue::Sequence(vec![NestedValue::Scalar(Scalar::Number(
            Number::from(f64::INFINITY),
        ))]);

        let err = value.to_json().unwrap_err();
        assert_eq!(err.path(), "$[0]");
    }

    #[test]
    fn test_yaml_binary_scalar() {
        let value = NestedValue::Sequence(vec![NestedValue::Scalar(Scalar::Bytes(vec![1, 2, 3]))]);

        let yaml_text = value.to_yaml_string().unwrap();
        assert!(yaml_text.contains("!binary"), "{yaml_text}");
        assert!(yaml_text.contains("AQID"), "{yaml_text}");
        assert_eq!(yaml(&yaml_text), value);
    }

    #[test]
    fn test_import_yaml_rejects_bad_binary() {
        let value: serde_yaml::Value = serde_yaml::from_str("blob: !binary '*not base64*'\n").unwrap();
        let err = NestedValue::try_from(value).unwrap_err();

        assert!(matches!(err, TransformError::Serialization { .. }));
        assert_eq!(err.path(), "$.blob");
    }

    #[test]
    fn test_to_yaml_string_writes_symbols_as_strings() {
        let mut mapping = Mapping::new();
        mapping.insert(Key::symbol("image"), NestedValue::from("nginx"));
        let value = NestedValue::Mapping(mapping);

        let yaml_text = value.to_yaml_string().unwrap();
        assert_eq!(yaml_text, "image: nginx\n");
    }
}
