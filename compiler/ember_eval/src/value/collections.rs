//! Insertion-ordered `Map` and `Set` keyed by content.
//!
//! Keys are reduced to a [`HashKey`]: structurally equal keys collide, so
//! `[1, 2]` and a second `[1, 2]` address the same entry. Reference types
//! without structure (functions, instances, promises, ...) key by identity.
//!
//! Hashing a key reads every aggregate inside it. A key may contain the
//! collection it is stored in, so shared collections are hashed with the
//! `*_keyed` methods: key first, lock second.

use std::sync::Arc;

use rustc_hash::FxHashMap;

use super::Value;

/// Content hash of a value.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum HashKey {
    Null,
    Bool(bool),
    /// Bit pattern with `-0` folded into `0` and every NaN into one NaN.
    Number(u64),
    Str(Arc<str>),
    Seq(Vec<HashKey>),
    Entries(Vec<(String, HashKey)>),
    Identity(usize),
}

impl HashKey {
    pub fn of(value: &Value) -> HashKey {
        Self::build(value, &mut Vec::new())
    }

    fn number(n: f64) -> HashKey {
        let n = if n == 0.0 {
            0.0
        } else if n.is_nan() {
            f64::NAN
        } else {
            n
        };
        HashKey::Number(n.to_bits())
    }

    /// `path` holds the aggregates being keyed; a cycle keys by identity.
    fn build(value: &Value, path: &mut Vec<usize>) -> HashKey {
        let Some(addr) = value.aggregate_addr() else {
            return match value {
                Value::Null => HashKey::Null,
                Value::Bool(b) => HashKey::Bool(*b),
                Value::Number(n) => Self::number(*n),
                Value::Str(s) => HashKey::Str(Arc::clone(s)),
                other => HashKey::Identity(other.identity()),
            };
        };
        if path.contains(&addr) {
            return HashKey::Identity(addr);
        }
        path.push(addr);
        let key = match value {
            Value::Array(items) => {
                let items = items.snapshot();
                HashKey::Seq(items.iter().map(|v| Self::build(v, path)).collect())
            }
            Value::Map(fields) => {
                let mut entries: Vec<(String, Value)> = fields.snapshot().into_iter().collect();
                entries.sort_by(|a, b| a.0.cmp(&b.0));
                HashKey::Entries(
                    entries
                        .iter()
                        .map(|(k, v)| (k.clone(), Self::build(v, path)))
                        .collect(),
                )
            }
            Value::OrderedMap(map) => {
                let entries = map.read().entries().to_vec();
                HashKey::Seq(
                    entries
                        .iter()
                        .flat_map(|(k, v)| [Self::build(k, path), Self::build(v, path)])
                        .collect(),
                )
            }
            Value::Set(set) => {
                let values = set.read().values().to_vec();
                HashKey::Seq(values.iter().map(|v| Self::build(v, path)).collect())
            }
            other => HashKey::Identity(other.identity()),
        };
        path.pop();
        key
    }
}

/// Insertion-ordered map from any value to any value.
#[derive(Clone, Debug, Default)]
pub struct OrderedMap {
    entries: Vec<(Value, Value)>,
    index: FxHashMap<HashKey, usize>,
}

impl OrderedMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, key: &Value) -> Option<&Value> {
        self.get_keyed(&HashKey::of(key))
    }

    pub fn get_keyed(&self, key: &HashKey) -> Option<&Value> {
        self.index.get(key).map(|&i| &self.entries[i].1)
    }

    pub fn contains(&self, key: &Value) -> bool {
        self.contains_keyed(&HashKey::of(key))
    }

    pub fn contains_keyed(&self, key: &HashKey) -> bool {
        self.index.contains_key(key)
    }

    /// Insert or overwrite; an existing key keeps its position.
    pub fn insert(&mut self, key: Value, value: Value) {
        let hash = HashKey::of(&key);
        self.insert_keyed(hash, key, value);
    }

    /// [`insert`](Self::insert) with `hash` computed by the caller.
    pub fn insert_keyed(&mut self, hash: HashKey, key: Value, value: Value) {
        match self.index.get(&hash) {
            Some(&i) => self.entries[i].1 = value,
            None => {
                self.index.insert(hash, self.entries.len());
                self.entries.push((key, value));
            }
        }
    }

    pub fn remove(&mut self, key: &Value) -> bool {
        self.remove_keyed(&HashKey::of(key))
    }

    pub fn remove_keyed(&mut self, key: &HashKey) -> bool {
        let Some(i) = self.index.remove(key) else {
            return false;
        };
        self.entries.remove(i);
        for slot in self.index.values_mut() {
            if *slot > i {
                *slot -= 1;
            }
        }
        true
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.index.clear();
    }

    pub fn entries(&self) -> &[(Value, Value)] {
        &self.entries
    }
}

/// Insertion-ordered set of values.
#[derive(Clone, Debug, Default)]
pub struct OrderedSet {
    values: Vec<Value>,
    index: FxHashMap<HashKey, usize>,
}

impl OrderedSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn contains(&self, value: &Value) -> bool {
        self.contains_keyed(&HashKey::of(value))
    }

    pub fn contains_keyed(&self, key: &HashKey) -> bool {
        self.index.contains_key(key)
    }

    /// Returns `false` if an equal value was already present.
    pub fn insert(&mut self, value: Value) -> bool {
        let hash = HashKey::of(&value);
        self.insert_keyed(hash, value)
    }

    pub fn insert_keyed(&mut self, hash: HashKey, value: Value) -> bool {
        if self.index.contains_key(&hash) {
            return false;
        }
        self.index.insert(hash, self.values.len());
        self.values.push(value);
        true
    }

    pub fn remove(&mut self, value: &Value) -> bool {
        self.remove_keyed(&HashKey::of(value))
    }

    pub fn remove_keyed(&mut self, key: &HashKey) -> bool {
        let Some(i) = self.index.remove(key) else {
            return false;
        };
        self.values.remove(i);
        for slot in self.index.values_mut() {
            if *slot > i {
                *slot -= 1;
            }
        }
        true
    }

    pub fn clear(&mut self) {
        self.values.clear();
        self.index.clear();
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }
}
