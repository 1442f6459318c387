//! World configuration bundle supplied by the hosting layer.

use glam::IVec3;
use serde::{Deserialize, Serialize};

use super::error::{Error, Result};

/// Which terrain synthesis path a world uses.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GenerationMode {
    /// Volumetric 3D noise threshold: negative sample is solid stone.
    Volumetric,
    /// Biome-blended 2D heightmap with hydrology and vegetation passes.
    Heightmap,
}

/// Per-world-instance configuration consumed from the hosting layer.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    /// Chunk dimensions in blocks.
    pub chunk_size: IVec3,
    /// Radius, in chunk coordinates, of chunks kept loaded around the
    /// tracked reference point.
    pub draw_distance: i32,
    /// World seed for every noise field and placement stream.
    pub seed: i32,
    /// Base noise frequency for the primary terrain field.
    pub frequency: f32,
    /// World units per block edge.
    pub block_scale: f32,
    /// Ordered render-material identifiers. Quad buffers are emitted per
    /// entry; a quad whose material slot falls outside this table is dropped.
    pub materials: Vec<String>,
    /// Terrain synthesis mode.
    pub generation: GenerationMode,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            chunk_size: IVec3::new(16, 16, 256),
            draw_distance: 15,
            seed: 1337,
            frequency: 0.03,
            block_scale: 1.0,
            materials: vec!["opaque".to_string(), "translucent".to_string()],
            generation: GenerationMode::Heightmap,
        }
    }
}

impl WorldConfig {
    /// Parse a configuration bundle from JSON. Missing fields fall back to
    /// the defaults above; unknown generation modes are rejected.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: WorldConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject configurations the terrain pipeline cannot run on.
    pub fn validate(&self) -> Result<()> {
        if self.chunk_size.cmple(IVec3::ZERO).any() {
            return Err(Error::Config(format!(
                "chunk_size must be positive on every axis, got {}",
                self.chunk_size
            )));
        }
        if self.draw_distance < 0 {
            return Err(Error::Config(format!(
                "draw_distance must be non-negative, got {}",
                self.draw_distance
            )));
        }
        if self.block_scale <= 0.0 {
            return Err(Error::Config(format!(
                "block_scale must be positive, got {}",
                self.block_scale
            )));
        }
        if self.materials.is_empty() {
            return Err(Error::Config(
                "at least one render material must be configured".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(WorldConfig::default().validate().is_ok());
    }

    #[test]
    fn test_rejects_degenerate_chunk_size() {
        let config = WorldConfig {
            chunk_size: IVec3::new(16, 0, 256),
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(Error::Config(_))));
    }

    #[test]
    fn test_rejects_empty_material_table() {
        let config = WorldConfig {
            materials: Vec::new(),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_from_json_with_partial_fields() {
        let config = WorldConfig::from_json(
            r#"{"seed": 42, "generation": "volumetric", "draw_distance": 2}"#,
        )
        .unwrap();
        assert_eq!(config.seed, 42);
        assert_eq!(config.generation, GenerationMode::Volumetric);
        assert_eq!(config.chunk_size, IVec3::new(16, 16, 256));
    }

    #[test]
    fn test_from_json_rejects_unknown_mode() {
        assert!(WorldConfig::from_json(r#"{"generation": "fractal"}"#).is_err());
    }
}
