//! Configuration for pyramid sources and the CLI.
//!
//! [`SourceOptions`] is the construction-time configuration of a pyramid
//! source. It deserializes from the camelCase JSON shape viewer
//! configurations use, applies the documented defaults, and validates with
//! typed errors; an invalid configuration refuses to build a source.
//!
//! # Example
//!
//! ```
//! use pyramid_source::config::SourceOptions;
//!
//! let options: SourceOptions = serde_json::from_str(
//!     r#"{
//!         "url": "https://origin.test/scan-42",
//!         "size": [46920, 33600],
//!         "tierSizeCalculation": "truncated"
//!     }"#,
//! ).unwrap();
//! assert!(options.validate().is_ok());
//! ```
//!
//! The CLI types at the bottom drive the `pyramid-source` binary; every
//! option can also be supplied through `PYRAMID_`-prefixed environment
//! variables.

use clap::{Args, Parser, Subcommand};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::ConfigError;
use crate::pyramid::TieringPolicy;

// =============================================================================
// Default Values
// =============================================================================

/// Default canonical tile edge length in pixels.
pub const DEFAULT_TILE_EDGE: u32 = 512;

/// Default origin compression quality.
pub const DEFAULT_QUALITY: u8 = 80;

fn default_tile_edge() -> u32 {
    DEFAULT_TILE_EDGE
}

fn default_quality() -> u8 {
    DEFAULT_QUALITY
}

// =============================================================================
// SourceOptions
// =============================================================================

/// Construction-time configuration of a pyramid source.
///
/// `url` and `size` are required; everything else has a documented default.
/// The display metadata fields (`attributions`, `cross_origin`, `logo`) are
/// passed through to the rendering framework untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceOptions {
    /// Base URL of the origin image
    pub url: String,

    /// Full image extent as `[width, height]` in pixels
    pub size: [u32; 2],

    /// Tier size calculation policy, `"default"` when absent
    #[serde(default)]
    pub tier_size_calculation: TieringPolicy,

    /// Canonical tile edge length in pixels
    #[serde(default = "default_tile_edge")]
    pub tile_edge: u32,

    /// Origin compression quality, fixed per pyramid
    #[serde(default = "default_quality")]
    pub quality: u8,

    /// Attribution text forwarded to the rendering framework
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attributions: Option<String>,

    /// Cross-origin policy forwarded to the rendering framework
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cross_origin: Option<String>,

    /// Logo URL forwarded to the rendering framework
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logo: Option<String>,
}

impl SourceOptions {
    /// Create options with the required fields and all defaults.
    pub fn new(url: impl Into<String>, size: [u32; 2]) -> Self {
        Self {
            url: url.into(),
            size,
            tier_size_calculation: TieringPolicy::default(),
            tile_edge: DEFAULT_TILE_EDGE,
            quality: DEFAULT_QUALITY,
            attributions: None,
            cross_origin: None,
            logo: None,
        }
    }

    /// Select the tiering policy.
    pub fn with_tier_size_calculation(mut self, policy: TieringPolicy) -> Self {
        self.tier_size_calculation = policy;
        self
    }

    /// Override the canonical tile edge length.
    pub fn with_tile_edge(mut self, tile_edge: u32) -> Self {
        self.tile_edge = tile_edge;
        self
    }

    /// Override the origin compression quality.
    pub fn with_quality(mut self, quality: u8) -> Self {
        self.quality = quality;
        self
    }

    /// Validate the options.
    ///
    /// # Errors
    ///
    /// Returns the first failing check: zero extent, zero tile edge, quality
    /// outside `1..=100`, or a base URL that does not parse.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let [width, height] = self.size;
        if width == 0 || height == 0 {
            return Err(ConfigError::InvalidExtent { width, height });
        }
        if self.tile_edge == 0 {
            return Err(ConfigError::InvalidTileEdge(self.tile_edge));
        }
        if self.quality == 0 || self.quality > 100 {
            return Err(ConfigError::InvalidQuality(self.quality));
        }
        Url::parse(&self.url).map_err(|source| ConfigError::InvalidBaseUrl {
            url: self.url.clone(),
            source,
        })?;
        Ok(())
    }
}

// =============================================================================
// CLI Arguments
// =============================================================================

/// Pyramid Source - tile addressing for deep-zoom image pyramids.
///
/// Inspect the tier layout an origin will be asked to serve, or resolve a
/// single tile coordinate into its linear index, tile group, and request URL.
#[derive(Parser, Debug, Clone)]
#[command(name = "pyramid-source")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    command: Command,
}

impl Cli {
    /// The selected subcommand.
    pub fn into_command(self) -> Command {
        self.command
    }
}

/// CLI subcommands.
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Print the tier layout for an image extent
    Plan(PlanConfig),

    /// Resolve one tile coordinate into its index, group, and origin URL
    Url(UrlConfig),
}

/// Arguments for the `plan` subcommand.
#[derive(Args, Debug, Clone)]
pub struct PlanConfig {
    /// Full image width in pixels.
    #[arg(long, env = "PYRAMID_WIDTH")]
    pub width: u32,

    /// Full image height in pixels.
    #[arg(long, env = "PYRAMID_HEIGHT")]
    pub height: u32,

    /// Tier size calculation policy ("default" or "truncated").
    #[arg(long, default_value = "default", env = "PYRAMID_TIER_SIZE_CALCULATION")]
    pub tier_size_calculation: String,

    /// Canonical tile edge length in pixels.
    #[arg(long, default_value_t = DEFAULT_TILE_EDGE, env = "PYRAMID_TILE_EDGE")]
    pub tile_edge: u32,

    /// Emit the plan as JSON instead of a table.
    #[arg(long, default_value_t = false)]
    pub json: bool,

    /// Enable verbose logging (debug level).
    #[arg(short, long, default_value_t = false)]
    pub verbose: bool,
}

impl PlanConfig {
    /// Parse the policy name, failing on unrecognized values.
    pub fn policy(&self) -> Result<TieringPolicy, ConfigError> {
        self.tier_size_calculation.parse()
    }
}

/// Arguments for the `url` subcommand.
#[derive(Args, Debug, Clone)]
pub struct UrlConfig {
    /// Base URL of the origin image.
    #[arg(long, env = "PYRAMID_URL")]
    pub url: String,

    /// Full image width in pixels.
    #[arg(long, env = "PYRAMID_WIDTH")]
    pub width: u32,

    /// Full image height in pixels.
    #[arg(long, env = "PYRAMID_HEIGHT")]
    pub height: u32,

    /// Tier size calculation policy ("default" or "truncated").
    #[arg(long, default_value = "default", env = "PYRAMID_TIER_SIZE_CALCULATION")]
    pub tier_size_calculation: String,

    /// Canonical tile edge length in pixels.
    #[arg(long, default_value_t = DEFAULT_TILE_EDGE, env = "PYRAMID_TILE_EDGE")]
    pub tile_edge: u32,

    /// Origin compression quality (1-100).
    #[arg(long, default_value_t = DEFAULT_QUALITY, env = "PYRAMID_QUALITY")]
    pub quality: u8,

    /// Resolution tier of the tile (0 = coarsest).
    #[arg(long)]
    pub tier: u32,

    /// Tile column, 0-indexed from the left.
    #[arg(long)]
    pub x: u32,

    /// Tile row, 0-indexed from the top.
    #[arg(long)]
    pub y: u32,

    /// Emit the resolution as JSON instead of text.
    #[arg(long, default_value_t = false)]
    pub json: bool,

    /// Enable verbose logging (debug level).
    #[arg(short, long, default_value_t = false)]
    pub verbose: bool,
}

impl UrlConfig {
    /// Build validated source options from the CLI arguments.
    pub fn source_options(&self) -> Result<SourceOptions, ConfigError> {
        let policy: TieringPolicy = self.tier_size_calculation.parse()?;
        let options = SourceOptions::new(self.url.clone(), [self.width, self.height])
            .with_tier_size_calculation(policy)
            .with_tile_edge(self.tile_edge)
            .with_quality(self.quality);
        options.validate()?;
        Ok(options)
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn test_options() -> SourceOptions {
        SourceOptions::new("https://origin.test/scan-42", [46920, 33600])
    }

    #[test]
    fn test_valid_options() {
        assert!(test_options().validate().is_ok());
    }

    #[test]
    fn test_deserialize_camel_case() {
        let options: SourceOptions = serde_json::from_str(
            r#"{
                "url": "https://origin.test/scan-42",
                "size": [1000, 700],
                "tierSizeCalculation": "truncated",
                "tileEdge": 256,
                "crossOrigin": "anonymous",
                "attributions": "Imaging Core Facility"
            }"#,
        )
        .unwrap();

        assert_eq!(options.size, [1000, 700]);
        assert_eq!(options.tier_size_calculation, TieringPolicy::Truncated);
        assert_eq!(options.tile_edge, 256);
        assert_eq!(options.quality, DEFAULT_QUALITY);
        assert_eq!(options.cross_origin.as_deref(), Some("anonymous"));
        assert_eq!(options.attributions.as_deref(), Some("Imaging Core Facility"));
        assert!(options.validate().is_ok());
    }

    #[test]
    fn test_policy_defaults_when_absent() {
        let options: SourceOptions =
            serde_json::from_str(r#"{"url": "https://origin.test/i", "size": [800, 600]}"#).unwrap();
        assert_eq!(options.tier_size_calculation, TieringPolicy::Default);
        assert_eq!(options.tile_edge, DEFAULT_TILE_EDGE);
    }

    #[test]
    fn test_unknown_policy_fails_deserialization() {
        let result: Result<SourceOptions, _> = serde_json::from_str(
            r#"{"url": "https://origin.test/i", "size": [800, 600], "tierSizeCalculation": "nearest"}"#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_missing_size_fails_deserialization() {
        let result: Result<SourceOptions, _> =
            serde_json::from_str(r#"{"url": "https://origin.test/i"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_zero_extent_rejected() {
        let mut options = test_options();
        options.size = [0, 600];
        assert!(matches!(
            options.validate().unwrap_err(),
            ConfigError::InvalidExtent { width: 0, height: 600 }
        ));
    }

    #[test]
    fn test_zero_tile_edge_rejected() {
        let options = test_options().with_tile_edge(0);
        assert!(matches!(
            options.validate().unwrap_err(),
            ConfigError::InvalidTileEdge(0)
        ));
    }

    #[test]
    fn test_quality_bounds() {
        for quality in [0u8, 101, 255] {
            let options = test_options().with_quality(quality);
            assert!(
                matches!(options.validate().unwrap_err(), ConfigError::InvalidQuality(q) if q == quality)
            );
        }
        assert!(test_options().with_quality(1).validate().is_ok());
        assert!(test_options().with_quality(100).validate().is_ok());
    }

    #[test]
    fn test_invalid_base_url_rejected() {
        let options = SourceOptions::new("not a url", [800, 600]);
        assert!(matches!(
            options.validate().unwrap_err(),
            ConfigError::InvalidBaseUrl { .. }
        ));
    }

    #[test]
    fn test_plan_config_policy_parse() {
        let config = PlanConfig {
            width: 100,
            height: 100,
            tier_size_calculation: "truncated".to_string(),
            tile_edge: 512,
            json: false,
            verbose: false,
        };
        assert_eq!(config.policy().unwrap(), TieringPolicy::Truncated);

        let config = PlanConfig {
            tier_size_calculation: "quadratic".to_string(),
            ..config
        };
        assert!(config.policy().is_err());
    }
}
