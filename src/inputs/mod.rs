//! Raw action inputs: a flat, case-insensitive key/value map.
//!
//! Values arrive as strings from the CI environment (`INPUT_<NAME>`) or the
//! optional config file. All typed access goes through [`Input`] catalog
//! entries so deprecated names resolve in one place.

pub mod keys;

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use serde::Serialize;

use crate::error::{BridgeError, Result};
use crate::tools::Tool;
use crate::validate;

/// Environment prefix GitHub Actions uses for `with:` inputs.
pub const ENV_PREFIX: &str = "INPUT_";

/// A recognised input: canonical key plus deprecated names tried in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Input {
    pub key: &'static str,
    pub deprecated: &'static [&'static str],
    /// Tool the input belongs to, `None` for shared inputs.
    pub scope: Option<Tool>,
    pub description: &'static str,
}

impl Input {
    /// Canonical key followed by its deprecated names.
    pub fn names(&self) -> impl Iterator<Item = &'static str> {
        std::iter::once(self.key).chain(self.deprecated.iter().copied())
    }
}

/// Immutable input map handed to the builders.
#[derive(Default)]
pub struct RawInputs {
    values: HashMap<String, String>,
    warned: Mutex<HashSet<&'static str>>,
}

impl RawInputs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut inputs = Self::new();
        for (key, value) in pairs {
            inputs.insert(key.as_ref(), value);
        }
        inputs
    }

    /// Collect every `INPUT_<NAME>` variable from the environment.
    pub fn from_env(env: &HashMap<String, String>) -> Self {
        Self::from_pairs(env.iter().filter_map(|(name, value)| {
            name.strip_prefix(ENV_PREFIX)
                .map(|key| (key.replace(' ', "_"), value.clone()))
        }))
    }

    pub fn insert(&mut self, key: &str, value: impl Into<String>) {
        self.values.insert(key.to_lowercase(), value.into());
    }

    /// Overlay `other` on top of `self`; `other` wins on conflicts unless
    /// its value is blank.
    pub fn extend(&mut self, other: RawInputs) {
        for (key, value) in other.values {
            if value.trim().is_empty() && self.values.contains_key(&key) {
                continue;
            }
            self.values.insert(key, value);
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Resolve an input, trimmed, canonical key first.
    ///
    /// Falling back to a deprecated name logs a warning once per name.
    pub fn get(&self, input: &Input) -> Option<&str> {
        if let Some(value) = self.lookup(input.key) {
            return Some(value);
        }
        for &alias in input.deprecated {
            if let Some(value) = self.lookup(alias) {
                self.warn_deprecated(alias, input.key);
                return Some(value);
            }
        }
        None
    }

    pub fn text(&self, input: &Input) -> Option<String> {
        self.get(input).map(str::to_string)
    }

    /// Lenient boolean: only `true` (any case) is true, missing is false.
    pub fn flag(&self, input: &Input) -> bool {
        self.optional_flag(input).unwrap_or(false)
    }

    /// Like [`RawInputs::flag`] but keeps "not given" distinct from `false`.
    pub fn optional_flag(&self, input: &Input) -> Option<bool> {
        let value = self.get(input)?;
        if value.eq_ignore_ascii_case("true") {
            Some(true)
        } else {
            if !value.eq_ignore_ascii_case("false") {
                tracing::warn!(input = input.key, value, "expected true or false, treating as false");
            }
            Some(false)
        }
    }

    /// Non-negative integer input.
    pub fn number(&self, input: &Input) -> Result<Option<u32>> {
        let Some(value) = self.get(input) else {
            return Ok(None);
        };
        validate::fatal(validate::numeric(Some(value), input.key), BridgeError::InvalidValue)?;
        value
            .parse()
            .map(Some)
            .map_err(|_| BridgeError::InvalidValue(format!("Invalid value for `{}`", input.key)))
    }

    /// Comma-separated list, each entry trimmed, empty entries dropped.
    pub fn list(&self, input: &Input) -> Option<Vec<String>> {
        let items: Vec<String> = self
            .get(input)?
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect();
        (!items.is_empty()).then_some(items)
    }

    /// Comma-separated enum tokens, upper-cased and checked against `allowed`.
    pub fn tokens(&self, input: &Input, allowed: &[&str]) -> Result<Option<Vec<String>>> {
        match self.get(input) {
            Some(raw) => validate::parse_token_list(raw, allowed, input.key).map(Some),
            None => Ok(None),
        }
    }

    fn lookup(&self, key: &str) -> Option<&str> {
        self.values
            .get(&key.to_lowercase())
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
    }

    fn warn_deprecated(&self, alias: &'static str, replacement: &'static str) {
        let mut warned = match self.warned.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        if warned.insert(alias) {
            tracing::warn!(
                deprecated = alias,
                replacement,
                "input is deprecated and will be removed, use the replacement instead"
            );
        }
    }

    #[cfg(test)]
    fn warned_aliases(&self) -> HashSet<&'static str> {
        self.warned.lock().map(|w| w.clone()).unwrap_or_default()
    }
}

impl std::fmt::Debug for RawInputs {
    // Values may hold tokens and passphrases; only keys are printed.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut keys: Vec<&String> = self.values.keys().collect();
        keys.sort();
        f.debug_struct("RawInputs").field("keys", &keys).finish()
    }
}
