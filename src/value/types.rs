//! Nested value types.
//!
//! This module defines the recursive Scalar/Sequence/Mapping tree produced by
//! the document loader and consumed by the transforms. Keys are a closed enum
//! so that canonical symbols can be told apart from raw loader keys.

use indexmap::IndexMap;
use std::fmt;
use std::hash::{DefaultHasher, Hash, Hasher};

/// A canonical symbolic mapping key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Symbol(String);

impl Symbol {
    /// Creates a symbol from its text.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Returns the symbol text, without the leading colon.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, ":{}", self.0)
    }
}

impl From<&str> for Symbol {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

/// A YAML number: integer, unsigned or float.
///
/// Equality and hashing follow `serde_yaml::Number`, under which NaN equals
/// itself, so the number can serve as a mapping key.
#[derive(Debug, Clone, PartialEq, Hash)]
pub struct Number(serde_yaml::Number);

impl Eq for Number {}

impl Number {
    /// Returns the value as an `i64`, if it is an integer in range.
    #[must_use]
    pub fn as_i64(&self) -> Option<i64> {
        self.0.as_i64()
    }

    /// Returns the value as a `u64`, if it is a non-negative integer in range.
    #[must_use]
    pub fn as_u64(&self) -> Option<u64> {
        self.0.as_u64()
    }

    /// Returns the value as an `f64`.
    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        self.0.as_f64()
    }

    /// Returns the underlying YAML number.
    #[must_use]
    pub const fn as_yaml(&self) -> &serde_yaml::Number {
        &self.0
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl From<serde_yaml::Number> for Number {
    fn from(n: serde_yaml::Number) -> Self {
        Self(n)
    }
}

macro_rules! number_from {
    ($($ty:ident)*) => {
        $(
            impl From<$ty> for Number {
                fn from(n: $ty) -> Self {
                    Self(serde_yaml::Number::from(n))
                }
            }
        )*
    };
}

number_from!(i8 i16 i32 i64 u8 u16 u32 u64 f64);

/// A non-container value. Opaque to every transform.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Scalar {
    /// Absence of a value.
    Null,
    /// A boolean.
    Bool(bool),
    /// An integer or floating point number.
    Number(Number),
    /// A string.
    String(String),
    /// A binary blob.
    Bytes(Vec<u8>),
}

/// A mapping key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Key {
    /// An already canonical symbol.
    Symbol(Symbol),
    /// A raw string key.
    String(String),
    /// A numeric key.
    Number(Number),
    /// A boolean key.
    Bool(bool),
    /// A null key.
    Null,
    /// A sequence or mapping used as a key.
    Composite(Box<NestedValue>),
}

impl Key {
    /// Creates a symbol key.
    #[must_use]
    pub fn symbol(name: impl Into<String>) -> Self {
        Self::Symbol(Symbol::new(name))
    }

    /// Creates a raw string key.
    #[must_use]
    pub fn string(name: impl Into<String>) -> Self {
        Self::String(name.into())
    }

    /// Returns true if the key is already in canonical form.
    #[must_use]
    pub const fn is_symbol(&self) -> bool {
        matches!(self, Self::Symbol(_))
    }

    /// Converts the key to its canonical symbol.
    ///
    /// The symbol is the literal textual form of the key: strings verbatim,
    /// numbers in their YAML rendering, `true`/`false` and `null`. Returns
    /// `None` for composite keys, which have no textual form.
    #[must_use]
    pub fn to_symbol(&self) -> Option<Symbol> {
        match self {
            Self::Symbol(symbol) => Some(symbol.clone()),
            Self::String(s) => Some(Symbol::new(s.as_str())),
            Self::Number(n) => Some(Symbol::new(n.to_string())),
            Self::Bool(b) => Some(Symbol::new(b.to_string())),
            Self::Null => Some(Symbol::new("null")),
            Self::Composite(_) => None,
        }
    }

    /// Short human-readable description, used in paths and error messages.
    #[must_use]
    pub fn describe(&self) -> String {
        match self {
            Self::Symbol(symbol) => symbol.to_string(),
            Self::String(s) => format!("{s:?}"),
            Self::Number(n) => n.to_string(),
            Self::Bool(b) => b.to_string(),
            Self::Null => String::from("null"),
            Self::Composite(inner) => format!("<{} key>", inner.kind()),
        }
    }
}

impl From<Symbol> for Key {
    fn from(symbol: Symbol) -> Self {
        Self::Symbol(symbol)
    }
}

/// An insertion-ordered mapping from keys to nested values.
///
/// Equality ignores entry order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Mapping {
    entries: IndexMap<Key, NestedValue>,
}

impl Mapping {
    /// Creates an empty mapping.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty mapping with room for `capacity` entries.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: IndexMap::with_capacity(capacity),
        }
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the mapping has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Inserts an entry.
    ///
    /// An existing equal key keeps its position and gets the new value; the
    /// previous value is returned.
    pub fn insert(&mut self, key: Key, value: NestedValue) -> Option<NestedValue> {
        self.entries.insert(key, value)
    }

    /// Returns the value stored under `key`.
    #[must_use]
    pub fn get(&self, key: &Key) -> Option<&NestedValue> {
        self.entries.get(key)
    }

    /// Returns a mutable reference to the value stored under `key`.
    pub fn get_mut(&mut self, key: &Key) -> Option<&mut NestedValue> {
        self.entries.get_mut(key)
    }

    /// Returns the value under `key`, inserting the result of `default` first
    /// if the key is absent.
    pub fn get_or_insert_with(
        &mut self,
        key: Key,
        default: impl FnOnce() -> NestedValue,
    ) -> &mut NestedValue {
        self.entries.entry(key).or_insert_with(default)
    }

    /// Returns true if `key` is present.
    #[must_use]
    pub fn contains_key(&self, key: &Key) -> bool {
        self.entries.contains_key(key)
    }

    /// Finds the string or symbol key whose text is `name`.
    ///
    /// Symbols are preferred when both forms are present.
    #[must_use]
    pub fn key_named(&self, name: &str) -> Option<&Key> {
        let mut found = None;
        for key in self.entries.keys() {
            match key {
                Key::Symbol(symbol) if symbol.as_str() == name => return Some(key),
                Key::String(s) if s == name => found = Some(key),
                _ => {}
            }
        }
        found
    }

    /// Returns the value under the string or symbol key named `name`.
    #[must_use]
    pub fn get_named(&self, name: &str) -> Option<&NestedValue> {
        self.key_named(name).and_then(|key| self.entries.get(key))
    }

    /// Iterates over entries in insertion order.
    pub fn iter(&self) -> indexmap::map::Iter<'_, Key, NestedValue> {
        self.entries.iter()
    }

    /// Iterates over keys in insertion order.
    pub fn keys(&self) -> indexmap::map::Keys<'_, Key, NestedValue> {
        self.entries.keys()
    }

    /// Iterates over values in insertion order.
    pub fn values(&self) -> indexmap::map::Values<'_, Key, NestedValue> {
        self.entries.values()
    }

    /// Iterates mutably over values in insertion order.
    pub fn values_mut(&mut self) -> indexmap::map::ValuesMut<'_, Key, NestedValue> {
        self.entries.values_mut()
    }
}

impl Hash for Mapping {
    // Order-insensitive, to agree with `PartialEq`.
    fn hash<H: Hasher>(&self, state: &mut H) {
        let combined = self.entries.iter().fold(0u64, |acc, (key, value)| {
            let mut entry = DefaultHasher::new();
            key.hash(&mut entry);
            value.hash(&mut entry);
            acc.wrapping_add(entry.finish())
        });
        state.write_usize(self.entries.len());
        state.write_u64(combined);
    }
}

impl FromIterator<(Key, NestedValue)> for Mapping {
    fn from_iter<I: IntoIterator<Item = (Key, NestedValue)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for Mapping {
    type Item = (Key, NestedValue);
    type IntoIter = indexmap::map::IntoIter<Key, NestedValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl<'a> IntoIterator for &'a Mapping {
    type Item = (&'a Key, &'a NestedValue);
    type IntoIter = indexmap::map::Iter<'a, Key, NestedValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

/// A recursive tree of mappings, sequences and scalars.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum NestedValue {
    /// A leaf value.
    Scalar(Scalar),
    /// An ordered list of values.
    Sequence(Vec<NestedValue>),
    /// A keyed collection of values.
    Mapping(Mapping),
}

impl NestedValue {
    /// The null scalar.
    #[must_use]
    pub const fn null() -> Self {
        Self::Scalar(Scalar::Null)
    }

    /// Name of the variant, for diagnostics.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Scalar(_) => "scalar",
            Self::Sequence(_) => "sequence",
            Self::Mapping(_) => "mapping",
        }
    }

    /// Returns true for sequences and mappings.
    #[must_use]
    pub const fn is_container(&self) -> bool {
        !matches!(self, Self::Scalar(_))
    }

    /// Returns true for the null scalar.
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Scalar(Scalar::Null))
    }

    /// Returns the mapping, if this is one.
    #[must_use]
    pub const fn as_mapping(&self) -> Option<&Mapping> {
        match self {
            Self::Mapping(mapping) => Some(mapping),
            _ => None,
        }
    }

    /// Returns the mapping mutably, if this is one.
    pub const fn as_mapping_mut(&mut self) -> Option<&mut Mapping> {
        match self {
            Self::Mapping(mapping) => Some(mapping),
            _ => None,
        }
    }

    /// Returns the sequence, if this is one.
    #[must_use]
    pub const fn as_sequence(&self) -> Option<&Vec<Self>> {
        match self {
            Self::Sequence(items) => Some(items),
            _ => None,
        }
    }

    /// Returns the sequence mutably, if this is one.
    pub const fn as_sequence_mut(&mut self) -> Option<&mut Vec<Self>> {
        match self {
            Self::Sequence(items) => Some(items),
            _ => None,
        }
    }

    /// Returns the string content of a string scalar.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Scalar(Scalar::String(s)) => Some(s),
            _ => None,
        }
    }
}

impl From<Scalar> for NestedValue {
    fn from(scalar: Scalar) -> Self {
        Self::Scalar(scalar)
    }
}

impl From<Mapping> for NestedValue {
    fn from(mapping: Mapping) -> Self {
        Self::Mapping(mapping)
    }
}

impl From<Vec<Self>> for NestedValue {
    fn from(items: Vec<Self>) -> Self {
        Self::Sequence(items)
    }
}

impl From<&str> for NestedValue {
    fn from(s: &str) -> Self {
        Self::Scalar(Scalar::String(s.to_string()))
    }
}

impl From<String> for NestedValue {
    fn from(s: String) -> Self {
        Self::Scalar(Scalar::String(s))
    }
}

impl From<i64> for NestedValue {
    fn from(n: i64) -> Self {
        Self::Scalar(Scalar::Number(Number::from(n)))
    }
}

impl From<bool> for NestedValue {
    fn from(b: bool) -> Self {
        Self::Scalar(Scalar::Bool(b))
    }
}
