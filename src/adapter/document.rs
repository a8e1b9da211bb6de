// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Typed reads from untyped JSON status documents.
//!
//! Every accessor treats a missing key or `null` as absent. A value of the
//! wrong type is also treated as absent but records a
//! [`DataQualityWarning::Malformed`].

use serde_json::{Map, Value};

use super::DataQualityWarning;
use super::units::TemperatureField;

/// A JSON object being read, with its path for warning messages.
#[derive(Debug, Clone, Default)]
pub(crate) struct Fields<'a> {
    object: Option<&'a Map<String, Value>>,
    path: String,
}

impl<'a> Fields<'a> {
    /// A view that contains nothing.
    pub(crate) fn empty() -> Self {
        Self::default()
    }

    /// Splits a status document into its root and its status object.
    ///
    /// The status object is the value of a top-level `"status"` key when
    /// present, otherwise the root itself.
    pub(crate) fn split(document: &'a Value, warnings: &mut Vec<DataQualityWarning>) -> (Self, Self) {
        let Some(root) = document.as_object() else {
            warnings.push(DataQualityWarning::malformed("document", "an object"));
            return (Self::empty(), Self::empty());
        };
        let root = Self {
            object: Some(root),
            path: String::new(),
        };
        let status = root.object("status", warnings).unwrap_or_else(|| root.clone());
        (root, status)
    }

    fn field_name(&self, key: &str) -> String {
        if self.path.is_empty() {
            key.to_string()
        } else {
            format!("{}.{key}", self.path)
        }
    }

    fn lookup(&self, keys: &[&'static str]) -> Option<(&'static str, &'a Value)> {
        let object = self.object?;
        keys.iter()
            .find_map(|key| object.get(*key).filter(|v| !v.is_null()).map(|v| (*key, v)))
    }

    pub(crate) fn malformed(
        &self,
        key: &str,
        expected: &'static str,
        warnings: &mut Vec<DataQualityWarning>,
    ) {
        warnings.push(DataQualityWarning::malformed(self.field_name(key), expected));
    }

    /// Reads a flag. Accepts JSON booleans and the integers 0 and 1.
    pub(crate) fn flag(
        &self,
        keys: &[&'static str],
        warnings: &mut Vec<DataQualityWarning>,
    ) -> Option<bool> {
        let (key, value) = self.lookup(keys)?;
        let parsed = match value {
            Value::Bool(b) => Some(*b),
            Value::Number(n) => match n.as_i64() {
                Some(0) => Some(false),
                Some(1) => Some(true),
                _ => None,
            },
            _ => None,
        };
        if parsed.is_none() {
            self.malformed(key, "a boolean or 0/1", warnings);
        }
        parsed
    }

    /// Reads a finite number.
    pub(crate) fn number(
        &self,
        keys: &[&'static str],
        warnings: &mut Vec<DataQualityWarning>,
    ) -> Option<f64> {
        let (key, value) = self.lookup(keys)?;
        let parsed = value.as_f64().filter(|n| n.is_finite());
        if parsed.is_none() {
            self.malformed(key, "a number", warnings);
        }
        parsed
    }

    /// Reads a signed integer.
    pub(crate) fn integer(
        &self,
        keys: &[&'static str],
        warnings: &mut Vec<DataQualityWarning>,
    ) -> Option<i64> {
        let (key, value) = self.lookup(keys)?;
        let parsed = value.as_i64();
        if parsed.is_none() {
            self.malformed(key, "an integer", warnings);
        }
        parsed
    }

    /// Reads a non-negative integer that fits in `T`.
    pub(crate) fn unsigned<T: TryFrom<u64>>(
        &self,
        keys: &[&'static str],
        warnings: &mut Vec<DataQualityWarning>,
    ) -> Option<T> {
        let (key, value) = self.lookup(keys)?;
        let parsed = value.as_u64().and_then(|n| T::try_from(n).ok());
        if parsed.is_none() {
            self.malformed(key, "a non-negative integer in range", warnings);
        }
        parsed
    }

    /// Reads a non-blank string.
    pub(crate) fn text(
        &self,
        keys: &[&'static str],
        warnings: &mut Vec<DataQualityWarning>,
    ) -> Option<&'a str> {
        let (key, value) = self.lookup(keys)?;
        match value.as_str() {
            Some(s) if s.trim().is_empty() => None,
            Some(s) => Some(s),
            None => {
                self.malformed(key, "a string", warnings);
                None
            }
        }
    }

    /// Reads a temperature and converts it to degrees Celsius.
    ///
    /// `current` is the converted measured temperature, used by relative
    /// fields.
    pub(crate) fn temperature(
        &self,
        field: TemperatureField,
        current: f64,
        warnings: &mut Vec<DataQualityWarning>,
    ) -> Option<f64> {
        self.number(field.keys, warnings)
            .map(|raw| field.conversion.apply(raw, current))
    }

    /// Reads a nested object.
    pub(crate) fn object(
        &self,
        key: &'static str,
        warnings: &mut Vec<DataQualityWarning>,
    ) -> Option<Self> {
        let (key, value) = self.lookup(&[key])?;
        match value.as_object() {
            Some(object) => Some(Self {
                object: Some(object),
                path: self.field_name(key),
            }),
            None => {
                self.malformed(key, "an object", warnings);
                None
            }
        }
    }

    /// Reads an array of objects. Entries that are not objects are skipped
    /// with a warning.
    pub(crate) fn objects(
        &self,
        key: &'static str,
        warnings: &mut Vec<DataQualityWarning>,
    ) -> Vec<Self> {
        let Some((key, value)) = self.lookup(&[key]) else {
            return Vec::new();
        };
        let Some(items) = value.as_array() else {
            self.malformed(key, "an array", warnings);
            return Vec::new();
        };
        let mut out = Vec::with_capacity(items.len());
        for (index, item) in items.iter().enumerate() {
            let path = format!("{}[{index}]", self.field_name(key));
            match item.as_object() {
                Some(object) => out.push(Self {
                    object: Some(object),
                    path,
                }),
                None => warnings.push(DataQualityWarning::malformed(path, "an object")),
            }
        }
        out
    }
}
