use crate::patterns::PatternThresholds;
use serde::Deserialize;
use std::path::Path;
use thiserror::Error;
use tracing::warn;

const DEFAULT_LCOM_THRESHOLD: f64 = 0.8;
const DEFAULT_LOC_THRESHOLD: usize = 500;
const DEFAULT_MAX_DEPENDENCIES: usize = 10;

const CONFIG_FILE_NAME: &str = ".sharplens.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Validated analysis configuration. Out-of-range values are corrected to
/// defaults rather than rejected.
#[derive(Debug, Clone)]
pub struct Config {
    pub metrics: MetricsThresholds,
    pub dependencies: DependencyLimits,
    pub layers: LayerConfig,
    pub analysis: AnalysisToggles,
    pub pattern_thresholds: PatternThresholds,
}

#[derive(Debug, Clone)]
pub struct MetricsThresholds {
    /// LCOM above this marks a cohesion problem, in [0.0, 1.0].
    pub lcom_threshold: f64,
    pub loc_threshold: usize,
}

#[derive(Debug, Clone)]
pub struct DependencyLimits {
    pub max_per_class: usize,
}

#[derive(Debug, Clone)]
pub struct LayerConfig {
    /// Permitted dependency direction: later layers may depend on earlier
    /// ones, never the reverse.
    pub hierarchy: Vec<String>,
    /// Layer names that must stay free of raw data-access references.
    pub data_free: Vec<String>,
}

#[derive(Debug, Clone, Copy)]
pub struct AnalysisToggles {
    pub merge_partial_types: bool,
    pub extract_di_registrations: bool,
    pub detect_async_patterns: bool,
    pub detect_design_patterns: bool,
}

#[derive(Debug, Deserialize)]
struct RawConfig {
    metrics: Option<RawMetrics>,
    dependencies: Option<RawDependencies>,
    layers: Option<RawLayers>,
    analysis: Option<RawToggles>,
    patterns: Option<RawPatternThresholds>,
}

#[derive(Debug, Deserialize)]
struct RawMetrics {
    lcom_threshold: Option<f64>,
    loc_threshold: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct RawDependencies {
    max_per_class: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct RawLayers {
    hierarchy: Option<Vec<String>>,
    data_free: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
struct RawToggles {
    merge_partial_types: Option<bool>,
    extract_di_registrations: Option<bool>,
    detect_async_patterns: Option<bool>,
    detect_design_patterns: Option<bool>,
}

#[derive(Debug, Deserialize)]
struct RawPatternThresholds {
    confidence_high: Option<f64>,
    confidence_medium: Option<f64>,
    confidence_low: Option<f64>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            metrics: MetricsThresholds::default(),
            dependencies: DependencyLimits::default(),
            layers: LayerConfig::default(),
            analysis: AnalysisToggles::default(),
            pattern_thresholds: PatternThresholds::default(),
        }
    }
}

impl Default for MetricsThresholds {
    fn default() -> Self {
        Self {
            lcom_threshold: DEFAULT_LCOM_THRESHOLD,
            loc_threshold: DEFAULT_LOC_THRESHOLD,
        }
    }
}

impl Default for DependencyLimits {
    fn default() -> Self {
        Self {
            max_per_class: DEFAULT_MAX_DEPENDENCIES,
        }
    }
}

impl Default for LayerConfig {
    fn default() -> Self {
        Self {
            hierarchy: vec![
                "Domain".to_string(),
                "Application".to_string(),
                "Infrastructure".to_string(),
                "Web".to_string(),
            ],
            data_free: vec![
                "Application".to_string(),
                "Web".to_string(),
                "API".to_string(),
                "Controllers".to_string(),
            ],
        }
    }
}

impl Default for AnalysisToggles {
    fn default() -> Self {
        Self {
            merge_partial_types: true,
            extract_di_registrations: true,
            detect_async_patterns: true,
            detect_design_patterns: true,
        }
    }
}

impl Config {
    /// Load `.sharplens.toml` from the project directory. A missing file
    /// yields defaults; unreadable or malformed files are errors.
    pub fn load(project_path: &Path) -> Result<Self, ConfigError> {
        let config_path = project_path.join(CONFIG_FILE_NAME);

        if !config_path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(&config_path)?;
        Self::from_toml_str(&content)
    }

    /// Like [`Config::load`], but never fails: any error is logged and
    /// replaced with defaults.
    pub fn load_or_default(project_path: &Path) -> Self {
        match Self::load(project_path) {
            Ok(config) => config,
            Err(error) => {
                warn!(%error, "config rejected, using defaults");
                Self::default()
            }
        }
    }

    /// Parse and validate configuration from TOML text. Individual values
    /// outside their valid range are corrected to defaults.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let raw: RawConfig = toml::from_str(content)?;

        let metrics = {
            let raw = raw.metrics.unwrap_or(RawMetrics {
                lcom_threshold: None,
                loc_threshold: None,
            });
            MetricsThresholds {
                lcom_threshold: validated_fraction(
                    raw.lcom_threshold,
                    DEFAULT_LCOM_THRESHOLD,
                    "lcom_threshold",
                ),
                loc_threshold: validated_count(
                    raw.loc_threshold,
                    DEFAULT_LOC_THRESHOLD,
                    "loc_threshold",
                ),
            }
        };

        let dependencies = DependencyLimits {
            max_per_class: validated_count(
                raw.dependencies.and_then(|d| d.max_per_class),
                DEFAULT_MAX_DEPENDENCIES,
                "max_per_class",
            ),
        };

        let layer_defaults = LayerConfig::default();
        let layers = match raw.layers {
            Some(raw_layers) => LayerConfig {
                hierarchy: non_empty_list(raw_layers.hierarchy, layer_defaults.hierarchy, "hierarchy"),
                data_free: non_empty_list(raw_layers.data_free, layer_defaults.data_free, "data_free"),
            },
            None => layer_defaults,
        };

        let toggle_defaults = AnalysisToggles::default();
        let analysis = match raw.analysis {
            Some(raw_toggles) => AnalysisToggles {
                merge_partial_types: raw_toggles
                    .merge_partial_types
                    .unwrap_or(toggle_defaults.merge_partial_types),
                extract_di_registrations: raw_toggles
                    .extract_di_registrations
                    .unwrap_or(toggle_defaults.extract_di_registrations),
                detect_async_patterns: raw_toggles
                    .detect_async_patterns
                    .unwrap_or(toggle_defaults.detect_async_patterns),
                detect_design_patterns: raw_toggles
                    .detect_design_patterns
                    .unwrap_or(toggle_defaults.detect_design_patterns),
            },
            None => toggle_defaults,
        };

        let threshold_defaults = PatternThresholds::default();
        let pattern_thresholds = match raw.patterns {
            Some(raw_patterns) => PatternThresholds {
                high: validated_fraction(
                    raw_patterns.confidence_high,
                    threshold_defaults.high,
                    "confidence_high",
                ),
                medium: validated_fraction(
                    raw_patterns.confidence_medium,
                    threshold_defaults.medium,
                    "confidence_medium",
                ),
                low: validated_fraction(
                    raw_patterns.confidence_low,
                    threshold_defaults.low,
                    "confidence_low",
                ),
            },
            None => threshold_defaults,
        };

        Ok(Self {
            metrics,
            dependencies,
            layers,
            analysis,
            pattern_thresholds,
        })
    }
}

fn validated_fraction(value: Option<f64>, default: f64, field: &str) -> f64 {
    match value {
        Some(v) if (0.0..=1.0).contains(&v) => v,
        Some(v) => {
            warn!(field, value = v, "value outside [0.0, 1.0], using default");
            default
        }
        None => default,
    }
}

fn validated_count(value: Option<i64>, default: usize, field: &str) -> usize {
    match value {
        Some(v) if v > 0 => v as usize,
        Some(v) => {
            warn!(field, value = v, "non-positive threshold, using default");
            default
        }
        None => default,
    }
}

fn non_empty_list(value: Option<Vec<String>>, default: Vec<String>, field: &str) -> Vec<String> {
    match value {
        Some(list) if !list.is_empty() => list,
        Some(_) => {
            warn!(field, "empty layer list, using default");
            default
        }
        None => default,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.metrics.lcom_threshold, 0.8);
        assert_eq!(config.metrics.loc_threshold, 500);
        assert_eq!(config.dependencies.max_per_class, 10);
        assert_eq!(config.layers.hierarchy[0], "Domain");
        assert!(config.analysis.detect_design_patterns);
    }

    #[test]
    fn test_overrides_applied() {
        let config = Config::from_toml_str(
            r#"
[metrics]
lcom_threshold = 0.6
loc_threshold = 300

[dependencies]
max_per_class = 5

[layers]
hierarchy = ["Core", "Shell"]

[analysis]
detect_design_patterns = false

[patterns]
confidence_high = 0.7
"#,
        )
        .unwrap();

        assert_eq!(config.metrics.lcom_threshold, 0.6);
        assert_eq!(config.metrics.loc_threshold, 300);
        assert_eq!(config.dependencies.max_per_class, 5);
        assert_eq!(config.layers.hierarchy, vec!["Core", "Shell"]);
        assert_eq!(config.layers.data_free, LayerConfig::default().data_free);
        assert!(!config.analysis.detect_design_patterns);
        assert!(config.analysis.detect_async_patterns);
        assert_eq!(config.pattern_thresholds.high, 0.7);
        assert_eq!(config.pattern_thresholds.medium, 0.5);
    }

    #[test]
    fn test_out_of_range_values_fall_back() {
        let config = Config::from_toml_str(
            r#"
[metrics]
lcom_threshold = 1.5
loc_threshold = -20

[dependencies]
max_per_class = 0
"#,
        )
        .unwrap();

        assert_eq!(config.metrics.lcom_threshold, 0.8);
        assert_eq!(config.metrics.loc_threshold, 500);
        assert_eq!(config.dependencies.max_per_class, 10);
    }

    #[test]
    fn test_empty_layer_list_falls_back() {
        let config = Config::from_toml_str("[layers]\nhierarchy = []\n").unwrap();
        assert_eq!(config.layers.hierarchy, LayerConfig::default().hierarchy);
    }

    #[test]
    fn test_malformed_toml_is_an_error() {
        assert!(Config::from_toml_str("not toml [").is_err());
    }

    #[test]
    fn test_load_or_default_never_fails() {
        let config = Config::load_or_default(Path::new("/nonexistent/project"));
        assert_eq!(config.metrics.loc_threshold, 500);
    }
}
