//! Textual filter specifications, e.g. `blur(strength=5)`
//!
//! This is the string-keyed boundary used by configuration files and the CLI.
//! The processing crate resolves a spec into a concrete filter.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ImagingError;

/// Parameter key used for a single positional value such as `blur(5)`
pub const POSITIONAL_PARAM: &str = "value";

/// Filter name plus named numeric parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterSpec {
    pub name: String,
    #[serde(default)]
    pub params: BTreeMap<String, f64>,
}

impl FilterSpec {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            params: BTreeMap::new(),
        }
    }

    pub fn with_param(mut self, key: impl Into<String>, value: f64) -> Self {
        self.params.insert(key.into(), value);
        self
    }

    /// Parse `name`, `name(value)` or `name(key=value, key=value)`
    pub fn parse(s: &str) -> Result<Self, ImagingError> {
        let invalid = |reason: &str| ImagingError::InvalidFilterSpec {
            spec: s.to_string(),
            reason: reason.to_string(),
        };

        let trimmed = s.trim();
        let (name, args) = match trimmed.find('(') {
            Some(open) => {
                let rest = &trimmed[open + 1..];
                let args = rest
                    .strip_suffix(')')
                    .ok_or_else(|| invalid("missing closing parenthesis"))?;
                (trimmed[..open].trim(), Some(args))
            }
            None => (trimmed, None),
        };

        if name.is_empty() {
            return Err(invalid("empty filter name"));
        }
        if !name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
        {
            return Err(invalid("filter name must be alphanumeric"));
        }

        let mut spec = FilterSpec::new(name.to_lowercase());
        let Some(args) = args else {
            return Ok(spec);
        };

        let parts: Vec<&str> = args
            .split(',')
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .collect();

        for part in &parts {
            let (key, value) = match part.split_once('=') {
                Some((k, v)) => (k.trim().to_lowercase(), v.trim()),
                None if parts.len() == 1 => (POSITIONAL_PARAM.to_string(), *part),
                None => return Err(invalid("expected key=value")),
            };
            if key.is_empty() {
                return Err(invalid("empty parameter name"));
            }
            let value = value
                .trim_end_matches('%')
                .parse::<f64>()
                .map_err(|_| invalid(&format!("'{}' is not a number", value)))?;
            if !value.is_finite() {
                return Err(invalid("parameter values must be finite"));
            }
            spec.params.insert(key, value);
        }

        Ok(spec)
    }

    /// Look up the first parameter present among `keys`
    pub fn param(&self, keys: &[&str]) -> Option<f64> {
        keys.iter().find_map(|k| self.params.get(*k).copied())
    }
}

impl FromStr for FilterSpec {
    type Err = ImagingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FilterSpec::parse(s)
    }
}

/// Canonical textual form; parameters are listed in key order.
impl fmt::Display for FilterSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)?;
        if self.params.is_empty() {
            return Ok(());
        }
        let args: Vec<String> = self
            .params
            .iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect();
        write!(f, "({})", args.join(","))
    }
}
