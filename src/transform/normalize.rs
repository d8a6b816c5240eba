//! Deep key normalization.
//!
//! Every mapping key in the tree, at any depth and through any mix of
//! sequences and mappings, is rewritten to its canonical [`Symbol`].
//! Sequence order and scalar values are preserved. Keys that share a symbol
//! are resolved by a [`CollisionPolicy`] and never merged silently.

use std::collections::HashMap;
use std::fmt;

use tracing::{debug, trace, warn};

use crate::error::TransformError;
use crate::value::{DEFAULT_MAX_DEPTH, Key, Mapping, NestedValue, Symbol, TreePath};

/// What to do when two keys of one mapping share a canonical symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum CollisionPolicy {
    /// Keep the first entry's value.
    #[default]
    FirstWins,
    /// Keep the last entry's value, at the first entry's position.
    LastWins,
    /// Fail with [`TransformError::KeyCollision`].
    Reject,
}

impl fmt::Display for CollisionPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FirstWins => write!(f, "first-wins"),
            Self::LastWins => write!(f, "last-wins"),
            Self::Reject => write!(f, "reject"),
        }
    }
}

/// A collision resolved by a merge policy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyCollision {
    /// Location of the mapping holding the keys.
    pub path: String,
    /// The shared canonical symbol.
    pub symbol: Symbol,
    /// The key whose value was kept.
    pub kept: Key,
    /// The key whose value was dropped.
    pub dropped: Key,
}

/// Result of a normalization pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Normalized {
    /// The normalized tree.
    pub value: NestedValue,
    /// Collisions resolved along the way, in walk order.
    pub collisions: Vec<KeyCollision>,
}

impl Normalized {
    /// Returns true if any value was dropped by the collision policy.
    #[must_use]
    pub fn has_collisions(&self) -> bool {
        !self.collisions.is_empty()
    }
}

/// Rewrites mapping keys into canonical symbols.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyNormalizer {
    /// Collision resolution policy.
    policy: CollisionPolicy,
    /// Maximum container nesting accepted.
    max_depth: usize,
}

impl Default for KeyNormalizer {
    fn default() -> Self {
        Self::new()
    }
}

impl KeyNormalizer {
    /// Creates a normalizer with the first-wins policy and default depth limit.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            policy: CollisionPolicy::FirstWins,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    /// Sets the collision policy.
    #[must_use]
    pub const fn with_policy(mut self, policy: CollisionPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Sets the maximum container nesting.
    #[must_use]
    pub const fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Returns the collision policy.
    #[must_use]
    pub const fn policy(&self) -> CollisionPolicy {
        self.policy
    }

    /// Normalizes every mapping key in `value`.
    ///
    /// # Errors
    ///
    /// See [`KeyNormalizer::normalize_with_report`].
    pub fn normalize(&self, value: &NestedValue) -> Result<NestedValue, TransformError> {
        self.normalize_with_report(value).map(|normalized| normalized.value)
    }

    /// Normalizes every mapping key in `value` and reports the collisions
    /// resolved by the policy.
    ///
    /// # Errors
    ///
    /// Returns [`TransformError::NonSymbolizableKey`] for composite keys,
    /// [`TransformError::KeyCollision`] for collisions under
    /// [`CollisionPolicy::Reject`], and [`TransformError::CyclicStructure`]
    /// if containers nest deeper than the configured limit.
    pub fn normalize_with_report(&self, value: &NestedValue) -> Result<Normalized, TransformError> {
        let mut walk = Walk {
            normalizer: self,
            path: TreePath::root(),
            collisions: Vec::new(),
        };
        let value = walk.visit(value)?;
        debug!(
            policy = %self.policy,
            collisions = walk.collisions.len(),
            "Normalized mapping keys"
        );
        Ok(Normalized {
            value,
            collisions: walk.collisions,
        })
    }
}

/// State of one normalization pass.
struct Walk<'a> {
    normalizer: &'a KeyNormalizer,
    path: TreePath,
    collisions: Vec<KeyCollision>,
}

impl Walk<'_> {
    fn visit(&mut self, value: &NestedValue) -> Result<NestedValue, TransformError> {
        match value {
            NestedValue::Scalar(scalar) => Ok(NestedValue::Scalar(scalar.clone())),
            NestedValue::Sequence(items) => {
                self.path.enter_container(self.normalizer.max_depth)?;
                let mut out = Vec::with_capacity(items.len());
                for (index, item) in items.iter().enumerate() {
                    self.path.push_index(index);
                    let normalized = self.visit(item);
                    self.path.pop();
                    out.push(normalized?);
                }
                Ok(NestedValue::Sequence(out))
            }
            NestedValue::Mapping(mapping) => {
                self.path.enter_container(self.normalizer.max_depth)?;
                self.visit_mapping(mapping).map(NestedValue::Mapping)
            }
        }
    }

    fn visit_mapping(&mut self, mapping: &Mapping) -> Result<Mapping, TransformError> {
        trace!(path = %self.path, len = mapping.len(), "Normalizing mapping");
        let mut out = Mapping::with_capacity(mapping.len());
        let mut origins: HashMap<Symbol, &Key> = HashMap::with_capacity(mapping.len());

        for (key, item) in mapping {
            let symbol = key
                .to_symbol()
                .ok_or_else(|| TransformError::NonSymbolizableKey {
                    path: self.path.to_string(),
                    key: key.describe(),
                })?;

            self.path.push_key(key);
            let normalized = self.visit(item);
            self.path.pop();
            let normalized = normalized?;

            let Some(&first) = origins.get(&symbol) else {
                origins.insert(symbol.clone(), key);
                out.insert(Key::Symbol(symbol), normalized);
                continue;
            };

            let (kept, dropped) = match self.normalizer.policy {
                CollisionPolicy::Reject => {
                    return Err(TransformError::KeyCollision {
                        path: self.path.to_string(),
                        symbol: symbol.as_str().to_string(),
                    });
                }
                CollisionPolicy::FirstWins => (first, key),
                CollisionPolicy::LastWins => {
                    out.insert(Key::Symbol(symbol.clone()), normalized);
                    origins.insert(symbol.clone(), key);
                    (key, first)
                }
            };

            warn!(
                path = %self.path,
                symbol = %symbol,
                kept = %kept.describe(),
                dropped = %dropped.describe(),
                "Mapping keys collide after normalization"
            );
            self.collisions.push(KeyCollision {
                path: self.path.to_string(),
                symbol,
                kept: kept.clone(),
                dropped: dropped.clone(),
            });
        }

        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Number;

    fn yaml(src: &str) -> NestedValue {
        let value: serde_yaml::Value = serde_yaml::from_str(src).unwrap();
        NestedValue::try_from(value).unwrap()
    }

    fn symbols(mapping: &Mapping) -> Vec<&str> {
        mapping
            .keys()
            .map(|key| match key {
                Key::Symbol(symbol) => symbol.as_str(),
                other => panic!("non-symbol key left behind: {other:?}"),
            })
            .collect()
    }

    fn get<'a>(value: &'a NestedValue, name: &str) -> &'a NestedValue {
        value
            .as_mapping()
            .and_then(|m| m.get(&Key::symbol(name)))
            .unwrap()
    }

    #[test]
    fn test_nested_mapping() {
        let normalized = KeyNormalizer::new()
            .normalize(&yaml("a: 1\nb:\n  c: 2\n"))
            .unwrap();

        assert_eq!(symbols(normalized.as_mapping().unwrap()), vec!["a", "b"]);
        assert_eq!(get(&normalized, "a"), &NestedValue::from(1));
        let inner = get(&normalized, "b");
        assert_eq!(symbols(inner.as_mapping().unwrap()), vec!["c"]);
        assert_eq!(get(inner, "c"), &NestedValue::from(2));
    }

    #[test]
    fn test_sequence_of_mappings() {
        let normalized = KeyNormalizer::new()
            .normalize(&yaml("- x: 1\n- y: 2\n"))
            .unwrap();

        let items = normalized.as_sequence().unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(symbols(items[0].as_mapping().unwrap()), vec!["x"]);
        assert_eq!(symbols(items[1].as_mapping().unwrap()), vec!["y"]);
        assert_eq!(get(&items[0], "x"), &NestedValue::from(1));
        assert_eq!(get(&items[1], "y"), &NestedValue::from(2));
    }

    #[test]
    fn test_deep_mixed_nesting() {
        let normalized = KeyNormalizer::new()
            .normalize(&yaml("a:\n  b:\n    c: [1, 2, {d: 3}]\n"))
            .unwrap();

        let c = get(get(get(&normalized, "a"), "b"), "c");
        let items = c.as_sequence().unwrap();
        assert_eq!(items[0], NestedValue::from(1));
        assert_eq!(items[1], NestedValue::from(2));
        assert_eq!(symbols(items[2].as_mapping().unwrap()), vec!["d"]);
        assert_eq!(get(&items[2], "d"), &NestedValue::from(3));
    }

    #[test]
    fn test_scalars_untouched() {
        let input = yaml("command: '{\"a\": 1}'\nargs: ['x: y', 3]\n");
        let normalized = KeyNormalizer::new().normalize(&input).unwrap();

        assert_eq!(get(&normalized, "command"), &NestedValue::from("{\"a\": 1}"));
        assert_eq!(get(&normalized, "args"), &yaml("['x: y', 3]"));
    }

    #[test]
    fn test_nan_key_normalizes() {
        let input = yaml(".nan: missing\n.inf: huge\n");
        let normalized = KeyNormalizer::new().normalize(&input).unwrap();

        assert_eq!(symbols(normalized.as_mapping().unwrap()), vec![".nan", ".inf"]);
        assert_eq!(get(&normalized, ".nan"), &NestedValue::from("missing"));

        let mut mapping = Mapping::new();
        mapping.insert(Key::Number(Number::from(f64::NAN)), NestedValue::from(1));
        let normalized = KeyNormalizer::new()
            .normalize(&NestedValue::Mapping(mapping))
            .unwrap();
        assert_eq!(get(&normalized, ".nan"), &NestedValue::from(1));
    }

    #[test]
    fn test_sequence_without_mappings_unchanged() {
        let input = yaml("[1, [2, 3], [], ~, text]");
        assert_eq!(KeyNormalizer::new().normalize(&input).unwrap(), input);
    }

    #[test]
    fn test_input_not_mutated() {
        let input = yaml("Name: web\nPorts: [{Container: 80}]\n");
        let before = input.clone();
        let _ = KeyNormalizer::new().normalize(&input).unwrap();
        assert_eq!(input, before);
    }

    #[test]
    fn test_idempotent() {
        let normalizer = KeyNormalizer::new();
        let once = normalizer
            .normalize(&yaml("a: {1: x, true: y, ~: z}\nb: [{c: d}]\n"))
            .unwrap();
        let twice = normalizer.normalize(&once).unwrap();
        assert_eq!(once, twice);
    }

    fn colliding() -> NestedValue {
        let mut mapping = Mapping::new();
        mapping.insert(Key::string("1"), NestedValue::from("text"));
        mapping.insert(Key::string("other"), NestedValue::from("kept"));
        mapping.insert(Key::Number(Number::from(1)), NestedValue::from("number"));
        NestedValue::Mapping(mapping)
    }

    #[test]
    fn test_collision_first_wins() {
        let normalized = KeyNormalizer::new()
            .with_policy(CollisionPolicy::FirstWins)
            .normalize_with_report(&colliding())
            .unwrap();

        let mapping = normalized.value.as_mapping().unwrap();
        assert_eq!(symbols(mapping), vec!["1", "other"]);
        assert_eq!(get(&normalized.value, "1"), &NestedValue::from("text"));

        assert!(normalized.has_collisions());
        assert_eq!(
            normalized.collisions,
            vec![KeyCollision {
                path: String::from("$"),
                symbol: Symbol::new("1"),
                kept: Key::string("1"),
                dropped: Key::Number(Number::from(1)),
            }]
        );
    }

    #[test]
    fn test_collision_last_wins_keeps_position() {
        let normalized = KeyNormalizer::new()
            .with_policy(CollisionPolicy::LastWins)
            .normalize_with_report(&colliding())
            .unwrap();

        let mapping = normalized.value.as_mapping().unwrap();
        assert_eq!(symbols(mapping), vec!["1", "other"]);
        assert_eq!(get(&normalized.value, "1"), &NestedValue::from("number"));
        assert_eq!(normalized.collisions[0].kept, Key::Number(Number::from(1)));
        assert_eq!(normalized.collisions[0].dropped, Key::string("1"));
    }

    #[test]
    fn test_collision_reject() {
        let mut outer = Mapping::new();
        outer.insert(Key::string("env"), colliding());
        let err = KeyNormalizer::new()
            .with_policy(CollisionPolicy::Reject)
            .normalize(&NestedValue::Mapping(outer))
            .unwrap_err();

        assert_eq!(
            err,
            TransformError::KeyCollision {
                path: String::from("$.env"),
                symbol: String::from("1"),
            }
        );
    }

    #[test]
    fn test_symbol_and_string_collide() {
        let mut mapping = Mapping::new();
        mapping.insert(Key::symbol("a"), NestedValue::from(1));
        mapping.insert(Key::string("a"), NestedValue::from(2));

        let normalized = KeyNormalizer::new()
            .normalize_with_report(&NestedValue::Mapping(mapping))
            .unwrap();
        assert_eq!(normalized.collisions.len(), 1);
        assert_eq!(get(&normalized.value, "a"), &NestedValue::from(1));
    }

    #[test]
    fn test_composite_key_rejected() {
        let err = KeyNormalizer::new()
            .normalize(&yaml("outer:\n  ? [a, b]\n  : pair\n"))
            .unwrap_err();

        assert_eq!(
            err,
            TransformError::NonSymbolizableKey {
                path: String::from("$.outer"),
                key: String::from("<sequence key>"),
            }
        );
    }

    #[test]
    fn test_depth_limit() {
        let err = KeyNormalizer::new()
            .with_max_depth(1)
            .normalize(&yaml("- [1]\n"))
            .unwrap_err();

        assert!(matches!(err, TransformError::CyclicStructure { limit: 1, .. }));
    }
}
