//! Effect labels.
//!
//! An effect marks an observable side channel of a rule. Concrete effects
//! form a closed set; effect variables are single-capital-letter names
//! declared in a rule's `using` list and stand for an arbitrary effect row.

use std::fmt;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// An effect label: a concrete effect or an effect variable.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Effect {
    Io,
    Cpu,
    Http,
    Sql,
    Time,
    Files,
    Secrets,
    AiModel,
    /// An effect variable declared in a rule's `using` list.
    Var(String),
}

impl Effect {
    /// The concrete effects, in canonical order.
    pub const CONCRETE: [Effect; 8] = [
        Effect::Io,
        Effect::Cpu,
        Effect::Http,
        Effect::Sql,
        Effect::Time,
        Effect::Files,
        Effect::Secrets,
        Effect::AiModel,
    ];

    /// Parse a concrete effect name. Returns `None` for anything else.
    pub fn from_name(name: &str) -> Option<Effect> {
        match name {
            "Io" => Some(Effect::Io),
            "Cpu" => Some(Effect::Cpu),
            "Http" => Some(Effect::Http),
            "Sql" => Some(Effect::Sql),
            "Time" => Some(Effect::Time),
            "Files" => Some(Effect::Files),
            "Secrets" => Some(Effect::Secrets),
            "AiModel" => Some(Effect::AiModel),
            _ => None,
        }
    }

    /// The display name (also the wire spelling).
    pub fn name(&self) -> &str {
        match self {
            Effect::Io => "Io",
            Effect::Cpu => "Cpu",
            Effect::Http => "Http",
            Effect::Sql => "Sql",
            Effect::Time => "Time",
            Effect::Files => "Files",
            Effect::Secrets => "Secrets",
            Effect::AiModel => "AiModel",
            Effect::Var(name) => name,
        }
    }

    /// The capability name guarding this effect (lowercase).
    pub fn capability(&self) -> String {
        self.name().to_ascii_lowercase()
    }

    pub fn is_var(&self) -> bool {
        matches!(self, Effect::Var(_))
    }

    /// Whether this effect can carry data out of the process. PII values
    /// must be revealed before flowing into a call that performs one.
    pub fn is_io_like(&self) -> bool {
        matches!(
            self,
            Effect::Io | Effect::Http | Effect::Sql | Effect::Files | Effect::Secrets
        )
    }
}

impl fmt::Display for Effect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl Serialize for Effect {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

impl<'de> Deserialize<'de> for Effect {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        if let Some(effect) = Effect::from_name(&name) {
            return Ok(effect);
        }
        // Effect variables are single capital letters.
        let mut chars = name.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) if c.is_ascii_uppercase() => Ok(Effect::Var(name)),
            _ => Err(D::Error::custom(format!("invalid effect name `{name}`"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_name_round_trips_concrete_effects() {
        for effect in Effect::CONCRETE {
            assert_eq!(Effect::from_name(effect.name()), Some(effect.clone()));
        }
        assert_eq!(Effect::from_name("Network"), None);
    }

    #[test]
    fn capability_is_lowercase_name() {
        assert_eq!(Effect::AiModel.capability(), "aimodel");
        assert_eq!(Effect::Http.capability(), "http");
    }

    #[test]
    fn io_like_excludes_cpu_time_ai() {
        assert!(Effect::Io.is_io_like());
        assert!(Effect::Sql.is_io_like());
        assert!(!Effect::Cpu.is_io_like());
        assert!(!Effect::Time.is_io_like());
        assert!(!Effect::AiModel.is_io_like());
    }

    #[test]
    fn serde_round_trip() {
        let effects = vec![Effect::Http, Effect::Var("E".to_string())];
        let json = serde_json::to_string(&effects).unwrap();
        assert_eq!(json, r#"["Http","E"]"#);
        let back: Vec<Effect> = serde_json::from_str(&json).unwrap();
        assert_eq!(back, effects);
    }

    #[test]
    fn deserialize_rejects_unknown_names() {
        assert!(serde_json::from_str::<Effect>(r#""Network""#).is_err());
        assert!(serde_json::from_str::<Effect>(r#""ee""#).is_err());
    }
}
