//! Solver configuration.
//!
//! Options are collected into an immutable [`SolverOptions`], either directly
//! through its builder methods or from a TOML table such as
//! ```toml
//! step_size = 1e-3
//! ```
//! Unrecognized keys are accepted and ignored, with a warning.

use tracing::warn;
use crate::error::{ MEError, MEResult };

/// Default fixed step size.
pub const DEF_STEP_SIZE: f64 = 1e-3;

/// Keys recognized by [`SolverOptions::from_table`].
pub const KNOWN_KEYS: &[&str] = &["step_size"];

/// Options passed to the solvers in [`solver`][crate::solver].
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct SolverOptions {
    step_size: f64,
}

impl Default for SolverOptions {
    fn default() -> Self { Self { step_size: DEF_STEP_SIZE } }
}

impl SolverOptions {
    /// Create a new `SolverOptions` with all default values.
    pub fn new() -> Self { Self::default() }

    /// Set the fixed step size.
    pub fn with_step_size(self, step_size: f64) -> Self {
        Self { step_size, ..self }
    }

    /// Fixed step size.
    pub fn step_size(&self) -> f64 { self.step_size }

    /// Check that all option values are usable.
    pub fn validate(&self) -> MEResult<()> {
        MEError::check_step_size(self.step_size)
    }

    /// Merge a TOML table over the defaults.
    ///
    /// Fails if a recognized key holds a value of the wrong type.
    pub fn from_table(table: &toml::Table) -> MEResult<Self> {
        let mut step_size = DEF_STEP_SIZE;
        for (key, value) in table.iter() {
            match key.as_str() {
                "step_size" => {
                    step_size = match value {
                        toml::Value::Float(x) => *x,
                        toml::Value::Integer(i) => *i as f64,
                        other => {
                            return Err(MEError::BadOption {
                                key: key.clone(),
                                reason: format!(
                                    "expected a number; got {}", other.type_str()),
                            });
                        },
                    };
                },
                _ => {
                    warn!(
                        key = key.as_str(),
                        known = ?KNOWN_KEYS,
                        "option was supplied but is not used"
                    );
                },
            }
        }
        Ok(Self { step_size })
    }

    /// Parse a TOML document and merge it over the defaults.
    ///
    /// See also [`Self::from_table`].
    pub fn from_toml_str(s: &str) -> MEResult<Self> {
        let table: toml::Table = s.parse()?;
        Self::from_table(&table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let opts = SolverOptions::default();
        assert_eq!(opts.step_size(), 0.001);
        assert_eq!(SolverOptions::new(), opts);
        assert!(opts.validate().is_ok());
        assert_eq!(SolverOptions::from_toml_str("").unwrap(), opts);
    }

    #[test]
    fn builder_returns_new_value() {
        let base = SolverOptions::new();
        let fine = base.with_step_size(1e-4);
        assert_eq!(base.step_size(), DEF_STEP_SIZE);
        assert_eq!(fine.step_size(), 1e-4);
        assert!(base.with_step_size(0.0).validate().is_err());
    }

    #[test]
    fn parses_step_size() {
        let opts = SolverOptions::from_toml_str("step_size = 0.01").unwrap();
        assert_eq!(opts.step_size(), 0.01);
        let opts = SolverOptions::from_toml_str("step_size = 2").unwrap();
        assert_eq!(opts.step_size(), 2.0);
    }

    #[test]
    fn ignores_unknown_keys() {
        let opts = SolverOptions::from_toml_str(
            "step_size = 0.5\natol = 1e-8\nmethod = \"dopri5\"").unwrap();
        assert_eq!(opts.step_size(), 0.5);
    }

    #[test]
    fn rejects_malformed_values() {
        assert!(matches!(
            SolverOptions::from_toml_str("step_size = \"small\""),
            Err(MEError::BadOption { key, .. }) if key == "step_size"
        ));
        assert!(matches!(
            SolverOptions::from_toml_str("step_size = "),
            Err(MEError::Toml(_))
        ));
        // parsed, but rejected on use
        let opts = SolverOptions::from_toml_str("step_size = -1.0").unwrap();
        assert!(matches!(opts.validate(), Err(MEError::InvalidStepSize(_))));
    }
}
