//! Suite registry.
//!
//! A suite knows its name, its scoring categories (with the environment-style names used to look
//! up their weights) and how to build the [`SuiteEngine`] holding its scenarios.

pub mod intro;

use crate::config::{CoefficientMap, CoefficientSource};
use crate::runner::SuiteEngine;

pub trait Testsuite {
    fn name(&self) -> &'static str;

    /// `(category label, ENV_NAME)` pairs, in reporting order.
    fn category_env_names(&self) -> &'static [(&'static str, &'static str)];

    fn build_engine(&self) -> SuiteEngine;

    fn coefficients(&self, source: &dyn CoefficientSource) -> CoefficientMap {
        source.coefficients(self.name(), self.category_env_names())
    }
}

/// All built-in suites, in registration order.
pub fn registry() -> Vec<Box<dyn Testsuite>> {
    vec![Box::new(intro::Intro)]
}

pub fn names() -> Vec<&'static str> {
    registry().iter().map(|s| s.name()).collect()
}

pub fn find(name: &str) -> Option<Box<dyn Testsuite>> {
    registry().into_iter().find(|s| s.name() == name)
}
