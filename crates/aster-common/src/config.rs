//! Effect-prefix configuration and capability manifests.
//!
//! Both are loaded once by the driver (from `ASTER_EFFECT_CONFIG` and
//! `ASTER_CAPS`) and handed to the typechecker as plain data; the core
//! never reads the environment. Malformed configuration is a programmer
//! error, not a user diagnostic.

use std::sync::{Arc, OnceLock, RwLock};

use rustc_hash::FxHashMap;
use serde::Deserialize;
use thiserror::Error;

use crate::effect::Effect;

/// Errors while loading configuration files. These abort the pass.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read configuration file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse configuration JSON: {0}")]
    Json(#[from] serde_json::Error),
}

// ── Effect-prefix configuration ────────────────────────────────────────

/// Maps qualified call names to effects by prefix.
///
/// The wire shape is `{"patterns": {"io": {"http": [...], ...}, "cpu":
/// [...], "ai": [...]}}`. Missing keys fall back to the built-in defaults
/// at field granularity.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct EffectConfig {
    #[serde(default)]
    pub patterns: EffectPatterns,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EffectPatterns {
    pub io: IoPatterns,
    pub cpu: Vec<String>,
    pub ai: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct IoPatterns {
    pub http: Vec<String>,
    pub sql: Vec<String>,
    pub time: Vec<String>,
    pub files: Vec<String>,
    pub secrets: Vec<String>,
    /// Prefixes mapping to the generic `Io` effect.
    pub general: Vec<String>,
}

fn prefixes(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

impl Default for IoPatterns {
    fn default() -> Self {
        Self {
            http: prefixes(&["Http."]),
            sql: prefixes(&["Sql.", "Db."]),
            time: prefixes(&["Time.", "Clock."]),
            files: prefixes(&["Files.", "File."]),
            secrets: prefixes(&["Secrets."]),
            general: prefixes(&["Io."]),
        }
    }
}

impl Default for EffectPatterns {
    fn default() -> Self {
        Self {
            io: IoPatterns::default(),
            cpu: prefixes(&["Math."]),
            ai: prefixes(&["AiModel.", "Ai."]),
        }
    }
}

impl EffectConfig {
    /// Parse a configuration file's contents, merging over defaults.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Classify a fully qualified call name into an effect, if any prefix
    /// table matches.
    pub fn classify(&self, qualified_name: &str) -> Option<Effect> {
        let p = &self.patterns;
        let groups: [(&[String], Effect); 8] = [
            (&p.io.http, Effect::Http),
            (&p.io.sql, Effect::Sql),
            (&p.io.time, Effect::Time),
            (&p.io.files, Effect::Files),
            (&p.io.secrets, Effect::Secrets),
            (&p.io.general, Effect::Io),
            (&p.cpu, Effect::Cpu),
            (&p.ai, Effect::AiModel),
        ];
        for (patterns, effect) in groups {
            if patterns.iter().any(|prefix| qualified_name.starts_with(prefix.as_str())) {
                return Some(effect);
            }
        }
        None
    }
}

// ── Capability manifests ───────────────────────────────────────────────

/// Allow/deny patterns per capability.
///
/// Pattern grammar: `*`, `module.*`, `module.func`, `module.func*`.
/// Legacy coarse keys expand on load: `io` covers the fine-grained I/O
/// capabilities, `cpu` covers only itself.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct CapabilityManifest {
    pub allow: FxHashMap<String, Vec<String>>,
    pub deny: FxHashMap<String, Vec<String>>,
}

const LEGACY_IO: &[&str] = &["http", "sql", "files", "secrets", "time"];

impl CapabilityManifest {
    /// Parse a manifest and expand legacy `io`/`cpu` keys.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let mut manifest: CapabilityManifest = serde_json::from_str(json)?;
        expand_legacy(&mut manifest.allow);
        expand_legacy(&mut manifest.deny);
        Ok(manifest)
    }

    /// Whether `qualified_name` may exercise `capability`: no deny pattern
    /// matches and at least one allow pattern matches.
    pub fn permits(&self, capability: &str, qualified_name: &str) -> CapVerdict {
        if let Some(patterns) = self.deny.get(capability) {
            if patterns.iter().any(|p| pattern_matches(p, qualified_name)) {
                return CapVerdict::Denied;
            }
        }
        match self.allow.get(capability) {
            Some(patterns) if patterns.iter().any(|p| pattern_matches(p, qualified_name)) => {
                CapVerdict::Allowed
            }
            _ => CapVerdict::NotAllowed,
        }
    }
}

/// Outcome of a capability check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CapVerdict {
    Allowed,
    /// A deny pattern matched.
    Denied,
    /// No allow pattern matched.
    NotAllowed,
}

fn expand_legacy(table: &mut FxHashMap<String, Vec<String>>) {
    if let Some(patterns) = table.get("io").cloned() {
        for cap in LEGACY_IO {
            table
                .entry(cap.to_string())
                .or_default()
                .extend(patterns.iter().cloned());
        }
    }
    // Legacy `cpu` already names the only capability it covers.
}

/// Match a manifest pattern against a fully qualified name.
pub fn pattern_matches(pattern: &str, name: &str) -> bool {
    if pattern == "*" {
        return true;
    }
    if let Some(prefix) = pattern.strip_suffix(".*") {
        return name
            .strip_prefix(prefix)
            .is_some_and(|rest| rest.starts_with('.'));
    }
    if let Some(prefix) = pattern.strip_suffix('*') {
        return name.starts_with(prefix);
    }
    pattern == name
}

// ── Process-wide caches ────────────────────────────────────────────────

static ACTIVE_EFFECT_CONFIG: OnceLock<RwLock<Option<Arc<EffectConfig>>>> = OnceLock::new();

fn effect_config_cell() -> &'static RwLock<Option<Arc<EffectConfig>>> {
    ACTIVE_EFFECT_CONFIG.get_or_init(|| RwLock::new(None))
}

/// Install the process-wide effect configuration. Called once at driver
/// startup, before any module is checked.
pub fn set_effect_config(config: EffectConfig) {
    *effect_config_cell().write().unwrap() = Some(Arc::new(config));
}

/// The active effect configuration, falling back to the defaults.
pub fn effect_config() -> Arc<EffectConfig> {
    effect_config_cell()
        .read()
        .unwrap()
        .clone()
        .unwrap_or_else(|| Arc::new(EffectConfig::default()))
}

/// Reset the cached configuration. Test hook only.
pub fn reset_effect_config_for_testing() {
    *effect_config_cell().write().unwrap() = None;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_classifies_builtin_prefixes() {
        let config = EffectConfig::default();
        assert_eq!(config.classify("Http.get"), Some(Effect::Http));
        assert_eq!(config.classify("Db.query"), Some(Effect::Sql));
        assert_eq!(config.classify("Io.print"), Some(Effect::Io));
        assert_eq!(config.classify("AiModel.complete"), Some(Effect::AiModel));
        assert_eq!(config.classify("demo.greet"), None);
    }

    #[test]
    fn partial_config_merges_over_defaults() {
        let config =
            EffectConfig::from_json_str(r#"{"patterns": {"io": {"http": ["Web."]}}}"#).unwrap();
        // Overridden key.
        assert_eq!(config.classify("Web.fetch"), Some(Effect::Http));
        assert_eq!(config.classify("Http.get"), None);
        // Untouched keys keep defaults.
        assert_eq!(config.classify("Sql.query"), Some(Effect::Sql));
        assert_eq!(config.classify("Math.pow"), Some(Effect::Cpu));
    }

    #[test]
    fn invalid_config_json_is_an_error() {
        assert!(EffectConfig::from_json_str("{patterns").is_err());
    }

    #[test]
    fn pattern_grammar() {
        assert!(pattern_matches("*", "anything.at.all"));
        assert!(pattern_matches("net.*", "net.fetch"));
        assert!(!pattern_matches("net.*", "network.fetch"));
        assert!(pattern_matches("net.fetch", "net.fetch"));
        assert!(!pattern_matches("net.fetch", "net.fetchAll"));
        assert!(pattern_matches("net.fetch*", "net.fetchAll"));
    }

    #[test]
    fn manifest_deny_beats_allow() {
        let manifest = CapabilityManifest::from_json_str(
            r#"{"allow": {"http": ["*"]}, "deny": {"http": ["net.internal*"]}}"#,
        )
        .unwrap();
        assert_eq!(manifest.permits("http", "net.fetch"), CapVerdict::Allowed);
        assert_eq!(
            manifest.permits("http", "net.internalFetch"),
            CapVerdict::Denied
        );
    }

    #[test]
    fn manifest_missing_allow_is_not_allowed() {
        let manifest =
            CapabilityManifest::from_json_str(r#"{"allow": {"http": ["net.*"]}}"#).unwrap();
        assert_eq!(
            manifest.permits("sql", "db.query"),
            CapVerdict::NotAllowed
        );
    }

    #[test]
    fn legacy_io_key_expands_to_fine_grained_capabilities() {
        let manifest =
            CapabilityManifest::from_json_str(r#"{"allow": {"io": ["app.*"]}}"#).unwrap();
        for cap in ["io", "http", "sql", "files", "secrets", "time"] {
            assert_eq!(
                manifest.permits(cap, "app.main"),
                CapVerdict::Allowed,
                "capability {cap}"
            );
        }
        assert_eq!(manifest.permits("cpu", "app.main"), CapVerdict::NotAllowed);
    }

    #[test]
    fn effect_config_cache_resets() {
        reset_effect_config_for_testing();
        let custom =
            EffectConfig::from_json_str(r#"{"patterns": {"cpu": ["Crunch."]}}"#).unwrap();
        set_effect_config(custom);
        assert_eq!(effect_config().classify("Crunch.run"), Some(Effect::Cpu));
        reset_effect_config_for_testing();
        assert_eq!(effect_config().classify("Crunch.run"), None);
    }
}
