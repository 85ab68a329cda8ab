//! Flux configuration.

use serde::{Deserialize, Serialize};

/// What a flux does with a failure when no exception handler is attached.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnhandledFailure {
    /// Drop the failure silently.
    #[default]
    Absorb,
    /// Drop the failure after logging it at `warn` level.
    Log,
}

/// Configuration for a [`Flux`](super::Flux).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FluxConfig {
    /// Name used in log events.
    pub name: String,
    /// Policy for failures with no exception handler.
    pub unhandled: UnhandledFailure,
}

impl Default for FluxConfig {
    fn default() -> Self {
        Self {
            name: "flux".to_string(),
            unhandled: UnhandledFailure::default(),
        }
    }
}

impl FluxConfig {
    /// Creates a configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Sets the unhandled-failure policy.
    #[must_use]
    pub fn with_unhandled(mut self, unhandled: UnhandledFailure) -> Self {
        self.unhandled = unhandled;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_defaults() {
        let config = FluxConfig::new();
        assert_eq!(config.name, "flux");
        assert_eq!(config.unhandled, UnhandledFailure::Absorb);
    }

    #[test]
    fn test_builders() {
        let config = FluxConfig::new()
            .with_name("sensors")
            .with_unhandled(UnhandledFailure::Log);
        assert_eq!(config.name, "sensors");
        assert_eq!(config.unhandled, UnhandledFailure::Log);
    }

    #[test]
    fn test_serde_roundtrip_and_defaults() {
        let config = FluxConfig::new().with_unhandled(UnhandledFailure::Log);
        let json = serde_json::to_value(&config).unwrap();
        assert_eq!(json, serde_json::json!({"name": "flux", "unhandled": "log"}));

        let partial: FluxConfig = serde_json::from_str(r#"{"name": "ticks"}"#).unwrap();
        assert_eq!(partial.name, "ticks");
        assert_eq!(partial.unhandled, UnhandledFailure::Absorb);
    }
}
