//! Harness configuration and category weights.
//!
//! ## Coefficients
//!
//! Category weights are supplied from outside the engine as a [`CoefficientMap`]. They are sourced
//! once, before the measured run, through a [`CoefficientSource`]:
//! - [`EnvCoefficients`] reads `{PREFIX}_{SUITE}_{CATEGORY_ENV_NAME}` (uppercased) and falls back
//!   to `0.0` when the variable is unset or unparsable.
//! - [`FixedCoefficients`] returns a prepared map.

use std::collections::BTreeMap;
use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

/// Default prefix for coefficient environment variables.
pub const DEFAULT_ENV_PREFIX: &str = "SKKV_CPP";

#[derive(Debug, Error, Diagnostic, PartialEq)]
pub enum ConfigError {
    #[error("timeout factor must be a positive finite number, got {0}")]
    #[diagnostic(code(gauntlet::config::timeout_factor), help("use a value such as 1.0 or 2.5"))]
    InvalidTimeoutFactor(f64),
}

/// Settings for one harness invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct HarnessConfig {
    /// Multiplier applied to every step's timeout
    pub timeout_factor: f64,
    /// Where to write the JSON report, if anywhere
    pub report_output_path: Option<PathBuf>,
    /// Whether to run the result-discarding warm-up pass first
    pub warm_up: bool,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            timeout_factor: 1.0,
            report_output_path: None,
            warm_up: true,
        }
    }
}

impl HarnessConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the timeout factor.
    ///
    /// ## Errors
    ///
    /// Returns [`ConfigError::InvalidTimeoutFactor`] for zero, negative, or non-finite values.
    pub fn with_timeout_factor(mut self, factor: f64) -> Result<Self, ConfigError> {
        self.timeout_factor = validate_timeout_factor(factor)?;
        Ok(self)
    }

    pub fn with_report_output_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.report_output_path = Some(path.into());
        self
    }

    pub fn with_warm_up(mut self, warm_up: bool) -> Self {
        self.warm_up = warm_up;
        self
    }
}

pub fn validate_timeout_factor(factor: f64) -> Result<f64, ConfigError> {
    if factor.is_finite() && factor > 0.0 {
        Ok(factor)
    } else {
        Err(ConfigError::InvalidTimeoutFactor(factor))
    }
}

/// Category label → non-negative weight.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CoefficientMap {
    weights: BTreeMap<String, f64>,
}

impl CoefficientMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a weight. Negative or non-finite weights are stored as `0.0`.
    pub fn insert(&mut self, category: impl Into<String>, weight: f64) {
        let weight = if weight.is_finite() && weight > 0.0 { weight } else { 0.0 };
        self.weights.insert(category.into(), weight);
    }

    pub fn get(&self, category: &str) -> Option<f64> {
        self.weights.get(category).copied()
    }

    pub fn categories(&self) -> impl Iterator<Item = &str> {
        self.weights.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.weights.iter().map(|(c, w)| (c.as_str(), *w))
    }

    pub fn len(&self) -> usize {
        self.weights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }
}

impl FromIterator<(String, f64)> for CoefficientMap {
    fn from_iter<T: IntoIterator<Item = (String, f64)>>(iter: T) -> Self {
        let mut map = Self::new();
        for (category, weight) in iter {
            map.insert(category, weight);
        }
        map
    }
}

/// Produces the weights for a suite's categories.
pub trait CoefficientSource {
    /// `categories` pairs each category label with its environment-style name.
    fn coefficients(&self, suite: &str, categories: &[(&str, &str)]) -> CoefficientMap;
}

/// Reads weights from environment variables.
pub struct EnvCoefficients {
    prefix: String,
    lookup: Box<dyn Fn(&str) -> Option<String>>,
}

impl EnvCoefficients {
    /// Read from the process environment.
    pub fn new(prefix: impl Into<String>) -> Self {
        Self::with_lookup(prefix, |key| std::env::var(key).ok())
    }

    /// Read through a custom lookup instead of the process environment.
    pub fn with_lookup(prefix: impl Into<String>, lookup: impl Fn(&str) -> Option<String> + 'static) -> Self {
        Self {
            prefix: prefix.into(),
            lookup: Box::new(lookup),
        }
    }

    /// The variable name consulted for one category.
    pub fn key(&self, suite: &str, category_env_name: &str) -> String {
        format!("{}_{}_{}", self.prefix, suite, category_env_name).to_uppercase()
    }
}

impl Default for EnvCoefficients {
    fn default() -> Self {
        Self::new(DEFAULT_ENV_PREFIX)
    }
}

impl CoefficientSource for EnvCoefficients {
    fn coefficients(&self, suite: &str, categories: &[(&str, &str)]) -> CoefficientMap {
        let mut map = CoefficientMap::new();
        for &(category, env_name) in categories {
            let key = self.key(suite, env_name);
            let weight = match (self.lookup)(&key) {
                Some(raw) => raw.trim().parse::<f64>().unwrap_or_else(|_| {
                    tracing::warn!(%key, value = %raw, "unparsable coefficient, using 0.0");
                    0.0
                }),
                None => 0.0,
            };
            tracing::debug!(%key, category, weight, "coefficient sourced");
            map.insert(category, weight);
        }
        map
    }
}

/// Returns a fixed map regardless of suite; categories missing from it get `0.0`.
#[derive(Debug, Clone, Default)]
pub struct FixedCoefficients(pub CoefficientMap);

impl CoefficientSource for FixedCoefficients {
    fn coefficients(&self, _suite: &str, categories: &[(&str, &str)]) -> CoefficientMap {
        categories
            .iter()
            .map(|&(category, _)| (category.to_string(), self.0.get(category).unwrap_or(0.0)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn env(pairs: &[(&str, &str)]) -> EnvCoefficients {
        let vars: HashMap<String, String> = pairs.iter().map(|&(k, v)| (k.to_string(), v.to_string())).collect();
        EnvCoefficients::with_lookup(DEFAULT_ENV_PREFIX, move |key| vars.get(key).cloned())
    }

    #[test]
    fn test_default_config() {
        let config = HarnessConfig::default();
        assert_eq!(config.timeout_factor, 1.0);
        assert_eq!(config.report_output_path, None);
        assert!(config.warm_up);
    }

    #[test]
    fn test_timeout_factor_validation() {
        assert_eq!(HarnessConfig::new().with_timeout_factor(2.5).map(|c| c.timeout_factor), Ok(2.5));
        for bad in [0.0, -1.0, f64::INFINITY] {
            assert_eq!(validate_timeout_factor(bad), Err(ConfigError::InvalidTimeoutFactor(bad)));
        }
        assert!(validate_timeout_factor(f64::NAN).is_err());
    }

    #[test]
    fn test_builder_setters() {
        let config = HarnessConfig::new().with_report_output_path("out.json").with_warm_up(false);
        assert_eq!(config.report_output_path, Some(PathBuf::from("out.json")));
        assert!(!config.warm_up);
    }

    #[test]
    fn test_env_key_is_uppercased() {
        let source = EnvCoefficients::new("skkv_cpp");
        assert_eq!(source.key("intro", "A_PLUS_B"), "SKKV_CPP_INTRO_A_PLUS_B");
    }

    #[test]
    fn test_env_coefficients_parse_and_fallback() {
        let source = env(&[("SKKV_CPP_INTRO_A_PLUS_B", "0.75"), ("SKKV_CPP_INTRO_BROKEN", "lots")]);
        let map = source.coefficients("intro", &[("a + b", "A_PLUS_B"), ("broken", "BROKEN"), ("unset", "UNSET")]);
        assert_eq!(map.get("a + b"), Some(0.75));
        assert_eq!(map.get("broken"), Some(0.0));
        assert_eq!(map.get("unset"), Some(0.0));
        assert_eq!(map.len(), 3);
    }

    #[test]
    fn test_negative_weights_are_clamped() {
        let mut map = CoefficientMap::new();
        map.insert("x", -3.0);
        map.insert("y", f64::NAN);
        assert_eq!(map.get("x"), Some(0.0));
        assert_eq!(map.get("y"), Some(0.0));
    }

    #[test]
    fn test_fixed_coefficients_fill_missing_with_zero() {
        let fixed = FixedCoefficients([("X".to_string(), 1.0)].into_iter().collect());
        let map = fixed.coefficients("any", &[("X", "X"), ("Y", "Y")]);
        assert_eq!(map.get("X"), Some(1.0));
        assert_eq!(map.get("Y"), Some(0.0));
    }
}
