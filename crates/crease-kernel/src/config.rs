//! Engine configuration.
//!
//! Every tunable the engine uses lives here and is handed to the
//! [`Sketch`](crate::Sketch) explicitly. Configurations load from TOML;
//! missing keys fall back to their defaults.

use std::path::Path;

use anyhow::Context;
use crease_kernel_feature::FeatureParams;
use crease_kernel_geom::DEFAULT_BEZIER_INCREMENTS;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::style::Palette;
use crate::Result;

/// Engine settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Parameter step when flattening Bezier segments.
    pub bezier_increments: f64,
    /// Default step length for resampling curves.
    pub sample_step: f64,
    /// Douglas-Peucker tolerance.
    pub simplify_epsilon: f64,
    /// Edge hit radius.
    pub hit_test_radius: f64,
    /// Shortest meaningful stroke.
    pub min_line_length: f64,
    /// Multiplier on the hit radius for feature edge hits.
    pub feature_hit_scale: f64,
    /// Freehand samples closer than this to the previous one are ignored.
    pub min_point_spacing: f64,
    /// A freehand stroke closes only once it has more samples than this.
    pub close_min_points: usize,
    /// Catmull-Rom knot parameterization.
    pub catmull_rom_alpha: f64,
    /// Preview extrusion depth of each plane.
    pub extrusion_depth: f64,
    /// Stroke colors.
    pub palette: Palette,
}

impl Default for EngineConfig {
    fn default() -> Self {
        let hit_test_radius = 10.0;
        Self {
            bezier_increments: DEFAULT_BEZIER_INCREMENTS,
            sample_step: 4.0,
            simplify_epsilon: 1.5,
            hit_test_radius,
            min_line_length: hit_test_radius * 2.0,
            feature_hit_scale: 3.5,
            min_point_spacing: 5.0,
            close_min_points: 7,
            catmull_rom_alpha: 1.0,
            extrusion_depth: 1.0,
            palette: Palette::default(),
        }
    }
}

impl EngineConfig {
    /// Parse a TOML document.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Load from a TOML file.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        let config = Self::from_toml_str(&text)
            .with_context(|| format!("parsing config {}", path.display()))?;
        info!(path = %path.display(), "loaded engine config");
        Ok(config)
    }

    /// Write as TOML.
    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        let text = toml::to_string_pretty(self).context("serializing config")?;
        std::fs::write(path, text).with_context(|| format!("writing config {}", path.display()))?;
        Ok(())
    }

    /// The subset feature generation needs.
    pub fn feature_params(&self) -> FeatureParams {
        FeatureParams {
            bezier_increments: self.bezier_increments,
            simplify_epsilon: self.simplify_epsilon,
            hit_test_radius: self.hit_test_radius,
            feature_hit_scale: self.feature_hit_scale,
            min_point_spacing: self.min_point_spacing,
            close_min_points: self.close_min_points,
            min_line_length: self.min_line_length,
            catmull_rom_alpha: self.catmull_rom_alpha,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SketchError;

    #[test]
    fn test_defaults_match_feature_params() {
        let config = EngineConfig::default();
        assert_eq!(config.min_line_length, 20.0);
        assert_eq!(config.feature_params(), FeatureParams::default());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = EngineConfig::from_toml_str(
            r#"
            hit_test_radius = 12.0
            extrusion_depth = 2.5

            [palette]
            screen_dash = [6.0, 3.0]
            "#,
        )
        .unwrap();
        assert_eq!(config.hit_test_radius, 12.0);
        assert_eq!(config.extrusion_depth, 2.5);
        assert_eq!(config.palette.screen_dash, [6.0, 3.0]);
        assert_eq!(config.palette.laser_dash, [1.0, 10.0]);
        assert_eq!(config.simplify_epsilon, 1.5);
    }

    #[test]
    fn test_bad_toml_is_config_error() {
        let err = EngineConfig::from_toml_str("hit_test_radius = \"wide\"").unwrap_err();
        assert!(matches!(err, SketchError::Config(_)));
    }

    #[test]
    fn test_save_and_load() {
        let path = std::env::temp_dir().join(format!("crease-config-{}.toml", std::process::id()));
        let mut config = EngineConfig::default();
        config.sample_step = 2.0;
        config.save(&path).unwrap();
        let loaded = EngineConfig::load(&path).unwrap();
        std::fs::remove_file(&path).ok();
        assert_eq!(loaded, config);

        let missing = EngineConfig::load(Path::new("/definitely/not/here.toml"));
        assert!(missing.is_err());
    }
}
