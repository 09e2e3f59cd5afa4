//! Runtime settings

use anyhow::{Context as _, Result};
use keel_gfx::ContextConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Runtime settings, read from a JSON file. Missing sections use defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub logging: LoggingSettings,
    pub context: ContextConfig,
    pub report: ReportSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// `tracing` filter directive, overridden by `RUST_LOG`
    pub filter: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            filter: "info".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportSettings {
    /// Frames kept for the rolling averages
    pub window: usize,
    /// Log a line for every replayed frame
    pub per_frame: bool,
}

impl Default for ReportSettings {
    fn default() -> Self {
        Self {
            window: 60,
            per_frame: true,
        }
    }
}

impl Settings {
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading settings {}", path.display()))?;
        Self::parse(&text).with_context(|| format!("parsing settings {}", path.display()))
    }

    pub fn parse(text: &str) -> Result<Self> {
        let settings: Settings = serde_json::from_str(text)?;
        anyhow::ensure!(settings.report.window > 0, "report window must be at least one frame");
        Ok(settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use keel_gfx::VertexPath;

    #[test]
    fn sections_are_optional() {
        let settings = Settings::parse("{}").unwrap();
        assert_eq!(settings.logging.filter, "info");
        assert_eq!(settings.context, ContextConfig::default());
        assert_eq!(settings.report.window, 60);
    }

    #[test]
    fn context_section_reaches_the_config() {
        let settings = Settings::parse(
            r#"{
                "logging": { "filter": "keel_gfx=trace" },
                "context": { "vertex_path": "bindless", "verify_states": true }
            }"#,
        )
        .unwrap();
        assert_eq!(settings.logging.filter, "keel_gfx=trace");
        assert_eq!(settings.context.vertex_path, VertexPath::Bindless);
        assert!(settings.context.verify_states);
    }

    #[test]
    fn zero_window_is_rejected() {
        assert!(Settings::parse(r#"{ "report": { "window": 0 } }"#).is_err());
    }
}
