//! Context configuration.
//!
//! [`ModalOptions`] can be built in code, deserialized from a host config
//! file (every field is optional), or read from the environment.
//!
//! # Environment
//!
//! | Variable | Field | Default |
//! |----------|-------|---------|
//! | `PARLEY_BASE_Z_INDEX` | [`base_z_index`](ModalOptions::base_z_index) | `1000` |
//! | `PARLEY_ALLOW_MULTIPLE` | [`allow_multiple`](ModalOptions::allow_multiple) | `true` |
//! | `PARLEY_DEBUG` | [`debug`](ModalOptions::debug) | `false` |

use core::str::FromStr;

use serde::Deserialize;

/// Environment variable overriding [`ModalOptions::base_z_index`].
pub const ENV_BASE_Z_INDEX: &str = "PARLEY_BASE_Z_INDEX";
/// Environment variable overriding [`ModalOptions::allow_multiple`].
pub const ENV_ALLOW_MULTIPLE: &str = "PARLEY_ALLOW_MULTIPLE";
/// Environment variable overriding [`ModalOptions::debug`].
pub const ENV_DEBUG: &str = "PARLEY_DEBUG";

/// Options fixed when a [`ModalContext`](crate::ModalContext) is created.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ModalOptions {
    /// Stacking base; a modal's z-index is this plus its queue position.
    pub base_z_index: u32,
    /// When `false`, opening a modal through its handle first tries to close
    /// the most recently opened other modal.
    pub allow_multiple: bool,
    /// Logs open/close/guard lifecycle at `debug` level.
    pub debug: bool,
}

impl Default for ModalOptions {
    fn default() -> Self {
        Self {
            base_z_index: 1000,
            allow_multiple: true,
            debug: false,
        }
    }
}

impl ModalOptions {
    /// Creates options with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the stacking base.
    #[must_use]
    pub fn with_base_z_index(mut self, base_z_index: u32) -> Self {
        self.base_z_index = base_z_index;
        self
    }

    /// Allows or forbids several modals being open at once.
    #[must_use]
    pub fn with_allow_multiple(mut self, allow_multiple: bool) -> Self {
        self.allow_multiple = allow_multiple;
        self
    }

    /// Enables lifecycle logging.
    #[must_use]
    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    /// Reads options from the process environment over the defaults.
    ///
    /// Unset variables keep their default. Unparsable values are logged at
    /// `warn` and also keep their default.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads options through an arbitrary key lookup.
    ///
    /// [`from_env`](Self::from_env) is this with [`std::env::var`].
    #[must_use]
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        Self {
            base_z_index: parse_or(&lookup, ENV_BASE_Z_INDEX, defaults.base_z_index, |raw| {
                raw.parse().ok()
            }),
            allow_multiple: parse_or(&lookup, ENV_ALLOW_MULTIPLE, defaults.allow_multiple, parse_flag),
            debug: parse_or(&lookup, ENV_DEBUG, defaults.debug, parse_flag),
        }
    }
}

fn parse_or<T: Copy + core::fmt::Debug>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: T,
    parse: impl Fn(&str) -> Option<T>,
) -> T {
    let Some(raw) = lookup(key) else {
        return default;
    };
    parse(raw.trim()).unwrap_or_else(|| {
        tracing::warn!(key, value = %raw, ?default, "ignoring invalid modal option");
        default
    })
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.to_ascii_lowercase().as_str() {
        "1" | "yes" | "on" => Some(true),
        "0" | "no" | "off" => Some(false),
        other => bool::from_str(other).ok(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(key, value)| ((*key).to_owned(), (*value).to_owned()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn defaults() {
        let options = ModalOptions::default();
        assert_eq!(options.base_z_index, 1000);
        assert!(options.allow_multiple);
        assert!(!options.debug);
    }

    #[test]
    fn builders_override_fields() {
        let options = ModalOptions::new()
            .with_base_z_index(50)
            .with_allow_multiple(false)
            .with_debug(true);

        assert_eq!(options.base_z_index, 50);
        assert!(!options.allow_multiple);
        assert!(options.debug);
    }

    #[test]
    fn deserialize_fills_missing_fields_with_defaults() {
        let options: ModalOptions =
            serde_json::from_str(r#"{ "allow_multiple": false }"#).unwrap();

        assert_eq!(
            options,
            ModalOptions::default().with_allow_multiple(false)
        );
    }

    #[test]
    fn lookup_reads_every_variable() {
        let options = ModalOptions::from_lookup(lookup(&[
            (ENV_BASE_Z_INDEX, "2000"),
            (ENV_ALLOW_MULTIPLE, "false"),
            (ENV_DEBUG, "1"),
        ]));

        assert_eq!(options.base_z_index, 2000);
        assert!(!options.allow_multiple);
        assert!(options.debug);
    }

    #[test]
    fn invalid_values_fall_back_to_defaults() {
        let options = ModalOptions::from_lookup(lookup(&[
            (ENV_BASE_Z_INDEX, "-3"),
            (ENV_ALLOW_MULTIPLE, "sometimes"),
        ]));

        assert_eq!(options, ModalOptions::default());
    }

    #[test]
    fn flags_accept_common_spellings() {
        for raw in ["true", "TRUE", "yes", "on", "1"] {
            assert_eq!(parse_flag(raw), Some(true), "{raw}");
        }
        for raw in ["false", "No", "off", "0"] {
            assert_eq!(parse_flag(raw), Some(false), "{raw}");
        }
        assert_eq!(parse_flag(""), None);
    }
}
