//! Provider ruleset
//!
//! A ruleset lists the providers that can describe media, the discovery
//! endpoint of each, and the URL patterns each one claims. Rules are loaded
//! once, compiled, and never change afterwards.

mod matcher;

pub use matcher::{compile_scheme, matches_media_url};

use crate::ConfigError;
use regex::Regex;
use serde::Deserialize;
use std::path::Path;

/// Built-in ruleset, compiled into the crate
const BUILTIN_RULESET: &str = include_str!("providers.json");

/// One provider entry of a ruleset
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct ProviderRule {
    /// Name used to look up the provider's resolver (e.g. "YouTube")
    pub provider_name: String,

    /// Discovery endpoint; queried with `?format=json&url=<media URL>`
    pub url: String,

    /// Domain matched literally when the rule has no schemes
    pub domain: String,

    /// Glob-style URL patterns (`*` is a wildcard), case-insensitive
    #[serde(default)]
    pub schemes: Vec<String>,
}

#[derive(Debug, Clone)]
struct CompiledRule {
    rule: ProviderRule,
    patterns: Vec<Regex>,
}

/// An ordered, compiled set of provider rules
#[derive(Debug, Clone)]
pub struct Ruleset {
    rules: Vec<CompiledRule>,
}

impl Ruleset {
    /// Compiles rules, keeping their order
    ///
    /// # Returns
    ///
    /// * `Ok(Ruleset)` - every scheme pattern compiled
    /// * `Err(ConfigError::InvalidPattern)` - a pattern could not be compiled
    pub fn new(rules: Vec<ProviderRule>) -> Result<Self, ConfigError> {
        let rules = rules
            .into_iter()
            .map(|rule| -> Result<CompiledRule, ConfigError> {
                let patterns = rule
                    .schemes
                    .iter()
                    .map(|scheme| {
                        compile_scheme(scheme).map_err(|e| {
                            ConfigError::InvalidPattern(format!(
                                "{} ({}): {}",
                                scheme, rule.provider_name, e
                            ))
                        })
                    })
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(CompiledRule { rule, patterns })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { rules })
    }

    /// The ruleset shipped with the crate
    pub fn builtin() -> Result<Self, ConfigError> {
        Self::from_json(BUILTIN_RULESET)
    }

    /// Parses a JSON array of rules
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let rules: Vec<ProviderRule> = serde_json::from_str(json)?;
        Self::new(rules)
    }

    /// Loads a JSON ruleset file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Rules claiming `media_url`, in ruleset order
    pub fn candidates(&self, media_url: &str) -> Vec<&ProviderRule> {
        self.rules
            .iter()
            .filter(|compiled| {
                matches_media_url(&compiled.rule.domain, &compiled.patterns, media_url)
            })
            .map(|compiled| &compiled.rule)
            .collect()
    }

    /// All rules, in order
    pub fn rules(&self) -> impl Iterator<Item = &ProviderRule> {
        self.rules.iter().map(|compiled| &compiled.rule)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}
