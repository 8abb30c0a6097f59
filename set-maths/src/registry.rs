//! Named set registry.
//!
//! Maps set names to ordered `BigInt` sequences and owns the counter used to
//! mint fresh `set<N>` names. Entries are never removed or mutated once
//! inserted, and iteration follows insertion order.

use std::collections::HashMap;

use num_bigint::BigInt;

use crate::error::SetError;

/// Prefix of every minted set name.
pub const SET_NAME_PREFIX: &str = "set";

#[derive(Debug, Clone, Default)]
pub struct Registry {
    /// Insertion order, used for iteration and export column order.
    names: Vec<String>,
    sets: HashMap<String, Vec<BigInt>>,
    next_set_index: u64,
}

impl Registry {
    /// Empty registry whose first minted name will be `set<next_set_index>`.
    pub fn new(next_set_index: u64) -> Self {
        Self {
            names: Vec::new(),
            sets: HashMap::new(),
            next_set_index,
        }
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Index the next `register` call will use.
    pub fn next_set_index(&self) -> u64 {
        self.next_set_index
    }

    pub fn contains(&self, name: &str) -> bool {
        self.sets.contains_key(name)
    }

    /// Insert a literal set during seeding.
    ///
    /// If `name` has the form `set<N>`, the counter is raised to at least
    /// `N + 1` so no later minted name can collide with it.
    pub fn seed(&mut self, name: impl Into<String>, values: Vec<BigInt>) -> Result<(), SetError> {
        let name = name.into();
        if self.sets.contains_key(&name) {
            return Err(SetError::DuplicateSetName(name));
        }

        if let Some(index) = minted_index(&name) {
            let after = index
                .checked_add(1)
                .ok_or_else(|| SetError::SetIndexExhausted(name.clone()))?;
            self.next_set_index = self.next_set_index.max(after);
        }

        self.insert(name, values);
        Ok(())
    }

    /// Store `values` under a freshly minted name and advance the counter.
    ///
    /// Fails without touching the registry if the counter cannot advance or
    /// the minted name is somehow taken.
    pub fn register(&mut self, values: Vec<BigInt>) -> Result<String, SetError> {
        let name = format!("{}{}", SET_NAME_PREFIX, self.next_set_index);
        let next = self
            .next_set_index
            .checked_add(1)
            .ok_or_else(|| SetError::SetIndexExhausted(name.clone()))?;
        if self.sets.contains_key(&name) {
            return Err(SetError::DuplicateSetName(name));
        }

        self.next_set_index = next;
        self.insert(name.clone(), values);
        Ok(name)
    }

    /// Like [`register`](Self::register), but an empty sequence creates no
    /// entry and leaves the counter untouched.
    pub fn register_nonempty(&mut self, values: Vec<BigInt>) -> Result<Option<String>, SetError> {
        if values.is_empty() {
            return Ok(None);
        }
        self.register(values).map(Some)
    }

    pub fn lookup(&self, name: &str) -> Result<&[BigInt], SetError> {
        self.sets
            .get(name)
            .map(Vec::as_slice)
            .ok_or_else(|| SetError::UnknownSetName(name.to_string()))
    }

    /// Set names in insertion order.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// `(name, values)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[BigInt])> + '_ {
        self.names
            .iter()
            .filter_map(move |name| self.sets.get(name).map(|values| (name.as_str(), values.as_slice())))
    }

    /// Length of the longest set, i.e. the export row count.
    pub fn max_len(&self) -> usize {
        self.sets.values().map(Vec::len).max().unwrap_or(0)
    }

    fn insert(&mut self, name: String, values: Vec<BigInt>) {
        self.names.push(name.clone());
        self.sets.insert(name, values);
    }
}

/// `Some(N)` for names of the form `set<N>`.
fn minted_index(name: &str) -> Option<u64> {
    let digits = name.strip_prefix(SET_NAME_PREFIX)?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}
