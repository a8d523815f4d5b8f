//! Ordered key/value parameters for query strings and form bodies
//!
//! Etsy endpoints take flat `key=value` pairs. Optional fields are left out
//! when unset, some list parameters are comma-joined (`includes=Images,Shop`)
//! and others repeat the key (`tags=a&tags=b`). `Params` keeps insertion order
//! and serializes as a sequence of pairs, so `serde_urlencoded` encodes it
//! directly.

use std::fmt::Display;

use serde::{Serialize, Serializer};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Params {
    pairs: Vec<(String, String)>,
}

impl Params {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(mut self, key: &str, value: impl Display) -> Self {
        self.pairs.push((key.to_string(), value.to_string()));
        self
    }

    /// Push only when `value` is set.
    pub fn push_opt<T: Display>(self, key: &str, value: Option<T>) -> Self {
        match value {
            Some(value) => self.push(key, value),
            None => self,
        }
    }

    /// One comma-joined value; omitted when `values` is empty.
    pub fn push_comma<T: Display>(self, key: &str, values: &[T]) -> Self {
        if values.is_empty() {
            return self;
        }
        let joined = values
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(",");
        self.push(key, joined)
    }

    /// The key repeated once per value.
    pub fn push_each<T: Display>(self, key: &str, values: &[T]) -> Self {
        values.iter().fold(self, |params, value| params.push(key, value))
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.pairs.len()
    }

    /// First value for `key`.
    #[cfg(test)]
    fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Every value for `key`, in order.
    #[cfg(test)]
    fn get_all(&self, key: &str) -> Vec<&str> {
        self.pairs
            .iter()
            .filter(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
            .collect()
    }
}

impl Serialize for Params {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.pairs.serialize(serializer)
    }
}

/// Request types that encode themselves as `Params`.
pub trait ToParams {
    fn to_params(&self) -> Params;
}

impl ToParams for Params {
    fn to_params(&self) -> Params {
        self.clone()
    }
}
