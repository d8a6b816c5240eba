//! Deep cloning of nested values.
//!
//! The cloner walks the tree and allocates every sequence and mapping afresh,
//! so the copy shares no container with its source at any depth. Nesting is
//! bounded by a depth limit; exceeding it fails fast instead of exhausting
//! the stack.

use tracing::{debug, trace};

use crate::error::TransformError;
use crate::value::{DEFAULT_MAX_DEPTH, Key, Mapping, NestedValue, TreePath, import_yaml};

/// Produces independent copies of nested values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeepCloner {
    /// Maximum container nesting accepted.
    max_depth: usize,
}

impl Default for DeepCloner {
    fn default() -> Self {
        Self::new()
    }
}

impl DeepCloner {
    /// Creates a cloner with the default depth limit.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    /// Sets the maximum container nesting.
    #[must_use]
    pub const fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Returns the maximum container nesting.
    #[must_use]
    pub const fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Copies a nested value.
    ///
    /// The result is structurally equal to `value` and owns every one of its
    /// containers. `value` is not modified.
    ///
    /// # Errors
    ///
    /// Returns [`TransformError::CyclicStructure`] if containers nest deeper
    /// than the configured limit.
    pub fn clone_value(&self, value: &NestedValue) -> Result<NestedValue, TransformError> {
        let mut path = TreePath::root();
        let copy = self.copy(value, &mut path)?;
        debug!(kind = value.kind(), "Cloned nested value");
        Ok(copy)
    }

    /// Copies a YAML value into the nested value model.
    ///
    /// # Errors
    ///
    /// Returns [`TransformError::Serialization`] for tagged nodes, which the
    /// model cannot represent, and [`TransformError::CyclicStructure`] if
    /// containers nest deeper than the configured limit.
    pub fn clone_yaml(&self, value: &serde_yaml::Value) -> Result<NestedValue, TransformError> {
        let copy = import_yaml(value, &mut TreePath::root(), self.max_depth)?;
        debug!(kind = copy.kind(), "Cloned YAML value");
        Ok(copy)
    }

    fn copy(&self, value: &NestedValue, path: &mut TreePath) -> Result<NestedValue, TransformError> {
        match value {
            NestedValue::Scalar(scalar) => Ok(NestedValue::Scalar(scalar.clone())),
            NestedValue::Sequence(items) => {
                path.enter_container(self.max_depth)?;
                trace!(%path, len = items.len(), "Copying sequence");
                let mut out = Vec::with_capacity(items.len());
                for (index, item) in items.iter().enumerate() {
                    path.push_index(index);
                    let copied = self.copy(item, path);
                    path.pop();
                    out.push(copied?);
                }
                Ok(NestedValue::Sequence(out))
            }
            NestedValue::Mapping(mapping) => {
                path.enter_container(self.max_depth)?;
                trace!(%path, len = mapping.len(), "Copying mapping");
                let mut out = Mapping::with_capacity(mapping.len());
                for (key, item) in mapping {
                    let key = self.copy_key(key, path)?;
                    path.push_key(&key);
                    let copied = self.copy(item, path);
                    path.pop();
                    out.insert(key, copied?);
                }
                Ok(NestedValue::Mapping(out))
            }
        }
    }

    fn copy_key(&self, key: &Key, path: &mut TreePath) -> Result<Key, TransformError> {
        match key {
            Key::Composite(inner) => {
                path.push_key(key);
                let copied = self.copy(inner, path);
                path.pop();
                Ok(Key::Composite(Box::new(copied?)))
            }
            _ => Ok(key.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Scalar;

    fn yaml(src: &str) -> NestedValue {
        let value: serde_yaml::Value = serde_yaml::from_str(src).unwrap();
        NestedValue::try_from(value).unwrap()
    }

    #[test]
    fn test_clone_is_equal() {
        let original = yaml(
            r"
family: web
containerDefinitions:
  - name: app
    portMappings:
      - containerPort: 8080
    environment: []
  - name: sidecar
    essential: false
",
        );
        let cloner = DeepCloner::new();
        let copy = cloner.clone_value(&original).unwrap();

        assert_eq!(copy, original);
        assert_eq!(cloner.clone_value(&copy).unwrap(), original);
    }

    #[test]
    fn test_clone_is_independent() {
        let original = yaml("a: [1, 2, 3]\n");
        let mut copy = DeepCloner::new().clone_value(&original).unwrap();

        copy.as_mapping_mut()
            .and_then(|m| m.get_mut(&Key::string("a")))
            .and_then(NestedValue::as_sequence_mut)
            .unwrap()
            .push(NestedValue::from(4));

        let original_list = original.as_mapping().unwrap().get_named("a").unwrap();
        assert_eq!(original_list, &yaml("[1, 2, 3]"));
        let copied_list = copy.as_mapping().unwrap().get_named("a").unwrap();
        assert_eq!(copied_list.as_sequence().unwrap().len(), 4);
    }

    #[test]
    fn test_mutating_original_leaves_clone() {
        let mut original = yaml("outer:\n  inner:\n    value: 1\n");
        let copy = DeepCloner::new().clone_value(&original).unwrap();

        let inner = original
            .as_mapping_mut()
            .and_then(|m| m.get_mut(&Key::string("outer")))
            .and_then(NestedValue::as_mapping_mut)
            .unwrap();
        inner.insert(Key::string("added"), NestedValue::from(true));

        assert_eq!(copy, yaml("outer:\n  inner:\n    value: 1\n"));
    }

    #[test]
    fn test_clone_scalar_root() {
        let value = NestedValue::Scalar(Scalar::Bytes(vec![0, 159, 146, 150]));
        assert_eq!(DeepCloner::new().clone_value(&value).unwrap(), value);
    }

    #[test]
    fn test_clone_composite_key() {
        let original = yaml("? {region: eu}\n: primary\n");
        let copy = DeepCloner::new().clone_value(&original).unwrap();
        assert_eq!(copy, original);
    }

    #[test]
    fn test_depth_limit() {
        let value = yaml("a:\n  b:\n    c: 1\n");

        assert!(DeepCloner::new().with_max_depth(3).clone_value(&value).is_ok());

        let err = DeepCloner::new()
            .with_max_depth(2)
            .clone_value(&value)
            .unwrap_err();
        assert_eq!(
            err,
            TransformError::CyclicStructure {
                path: String::from("$.a.b"),
                limit: 2,
            }
        );
    }

    #[test]
    fn test_deep_tree_needs_raised_limit() {
        let mut value = NestedValue::from(1);
        for _ in 0..300 {
            value = NestedValue::Sequence(vec![value]);
        }

        let err = DeepCloner::new().clone_value(&value).unwrap_err();
        assert!(matches!(
            err,
            TransformError::CyclicStructure {
                limit: DEFAULT_MAX_DEPTH,
                ..
            }
        ));
        assert!(err.to_string().starts_with("Nesting limit of 256 levels exceeded"));

        let copy = DeepCloner::new().with_max_depth(1000).clone_value(&value).unwrap();
        assert_eq!(copy, value);
    }

    #[test]
    fn test_clone_yaml_rejects_tagged() {
        let value: serde_yaml::Value =
            serde_yaml::from_str("containers:\n  - image: !Sub '${Repo}:latest'\n").unwrap();
        let err = DeepCloner::new().clone_yaml(&value).unwrap_err();

        assert!(matches!(err, TransformError::Serialization { .. }));
        assert_eq!(err.path(), "$.containers[0].image");
    }

    #[test]
    fn test_clone_yaml_plain_document() {
        let value: serde_yaml::Value = serde_yaml::from_str("cpu: 256\nmemory: 512\n").unwrap();
        let copy = DeepCloner::new().clone_yaml(&value).unwrap();

        assert_eq!(copy.as_mapping().unwrap().len(), 2);
        assert_eq!(copy.as_mapping().unwrap().get_named("cpu"), Some(&NestedValue::from(256)));
    }
}
