//! Context configuration

use keel_core::FrameBounds;
use serde::{Deserialize, Serialize};

/// Vertex binding model used by a context.
///
/// A context sticks to one path for its whole lifetime.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VertexPath {
    /// Buffer object + offset per stream
    #[default]
    Standard,
    /// Resident GPU addresses per stream
    Bindless,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContextConfig {
    /// Use at most this many texture units (must not exceed what the device reports)
    pub max_texture_units: Option<u32>,
    pub vertex_path: VertexPath,
    /// Initial window extent
    pub window: FrameBounds,
    /// Compare the mirror with the driver after every frame (tooling only)
    pub verify_states: bool,
}

impl Default for ContextConfig {
    fn default() -> Self {
        Self {
            max_texture_units: None,
            vertex_path: VertexPath::Standard,
            window: FrameBounds::new(1280, 720),
            verify_states: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_json_yields_defaults() {
        let config: ContextConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, ContextConfig::default());
    }

    #[test]
    fn vertex_path_is_snake_case() {
        let config: ContextConfig =
            serde_json::from_str(r#"{ "vertex_path": "bindless", "max_texture_units": 8 }"#).unwrap();
        assert_eq!(config.vertex_path, VertexPath::Bindless);
        assert_eq!(config.max_texture_units, Some(8));
    }
}
