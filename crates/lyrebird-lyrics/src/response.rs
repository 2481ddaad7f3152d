// SPDX-License-Identifier: GPL-3.0-or-later

//! Normalizes whatever the lookup service sent back into a uniform list of
//! candidate records.
//!
//! The search endpoint answers with an array, but a single object or a bare
//! `null` are accepted too. A top-level `{}` means no candidate. Array
//! elements keep their position; a non-object element becomes an empty
//! record, which the mapping step later discards as contentless.

use serde_json::{Map, Value};

/// One raw record from the lookup service, keyed by whatever field names it used.
pub type RawCandidate = Map<String, Value>;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CandidateSet {
    candidates: Vec<RawCandidate>,
}

impl CandidateSet {
    pub fn from_value(value: Value) -> Self {
        let candidates = match value {
            Value::Array(items) => items
                .into_iter()
                .map(|item| match item {
                    Value::Object(map) => map,
                    _ => RawCandidate::new(),
                })
                .collect(),
            Value::Object(map) if !map.is_empty() => vec![map],
            _ => Vec::new(),
        };
        Self { candidates }
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    pub fn first(&self) -> Option<&RawCandidate> {
        self.candidates.first()
    }

    pub fn iter(&self) -> impl Iterator<Item = &RawCandidate> {
        self.candidates.iter()
    }
}

impl From<Value> for CandidateSet {
    fn from(value: Value) -> Self {
        Self::from_value(value)
    }
}
