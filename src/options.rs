//! Injector configuration.
//!
//! Options can be built in code, read from environment variables, or (with
//! the `config` feature) deserialized from JSON.

use std::env;

#[cfg(feature = "config")]
use serde::{Deserialize, Serialize};

use crate::error::{DiError, DiResult};
use crate::internal::path::MAX_DEPTH;

/// Default environment variable prefix used by [`InjectorOptions::from_env`].
pub const ENV_PREFIX: &str = "FERROUS_INJECT";

/// Tunables for an [`Injector`](crate::Injector).
///
/// # Examples
///
/// ```
/// use ferrous_inject::{Injector, InjectorOptions};
///
/// let options = InjectorOptions::default()
///     .with_max_depth(64)
///     .with_require_marked_root(false);
/// let injector = Injector::with_options(options);
/// assert_eq!(injector.options().max_depth, 64);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "config", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "config", serde(default))]
pub struct InjectorOptions {
    /// Maximum number of nested constructions in one resolution.
    pub max_depth: usize,
    /// Whether `get_provider` rejects a bound type whose selected constructor
    /// takes parameters without carrying the injection marker.
    pub require_marked_root: bool,
}

impl Default for InjectorOptions {
    fn default() -> Self {
        Self {
            max_depth: MAX_DEPTH,
            require_marked_root: true,
        }
    }
}

impl InjectorOptions {
    /// Sets the nesting limit; deeper graphs fail with
    /// [`DiError::DepthExceeded`].
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Sets whether provider roots need a parameterless or marked constructor.
    pub fn with_require_marked_root(mut self, require: bool) -> Self {
        self.require_marked_root = require;
        self
    }

    /// Reads options from `FERROUS_INJECT_MAX_DEPTH` and
    /// `FERROUS_INJECT_REQUIRE_MARKED_ROOT`, falling back to defaults for
    /// unset variables.
    pub fn from_env() -> DiResult<Self> {
        Self::from_env_with_prefix(ENV_PREFIX)
    }

    /// Like [`from_env`](Self::from_env) with a custom variable prefix.
    pub fn from_env_with_prefix(prefix: &str) -> DiResult<Self> {
        let mut options = Self::default();
        let prefix = prefix.to_uppercase();

        if let Some(value) = read_var(&prefix, "MAX_DEPTH") {
            options.max_depth = value
                .trim()
                .parse::<usize>()
                .map_err(|_| DiError::TypeMismatch("max_depth must be a non-negative integer"))?;
        }

        if let Some(value) = read_var(&prefix, "REQUIRE_MARKED_ROOT") {
            options.require_marked_root = parse_bool(&value)
                .ok_or(DiError::TypeMismatch("require_marked_root must be a boolean"))?;
        }

        Ok(options)
    }

    /// Parses options from a JSON document. Missing fields keep their
    /// defaults.
    #[cfg(feature = "config")]
    pub fn from_json(json: &str) -> DiResult<Self> {
        serde_json::from_str(json).map_err(|_| DiError::TypeMismatch("Invalid JSON configuration"))
    }
}

fn read_var(prefix: &str, name: &str) -> Option<String> {
    env::var(format!("{}_{}", prefix, name)).ok()
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
