//! Serializable exploration configuration.
//!
//! Every field has a default, so an empty TOML document is a valid config.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

use crate::explorer::ParameterSet;
use stratlab_core::DEFAULT_INITIAL_CASH;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("{section}: grid is empty")]
    EmptyGrid { section: &'static str },

    #[error("{section}: window must be >= 1, got {window}")]
    InvalidWindow { section: &'static str, window: usize },

    #[error("{section}: threshold must be finite and >= 0, got {threshold}")]
    InvalidThreshold { section: &'static str, threshold: f64 },

    #[error("initial cash must be finite and > 0, got {0}")]
    InvalidInitialCash(f64),

    #[error("risk-free rate must be finite, got {0}")]
    InvalidRiskFreeRate(f64),
}

/// Top-level configuration for a parameter exploration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExplorerConfig {
    /// Fan grid points out across the rayon pool.
    pub parallel: bool,
    pub momentum: MomentumGrid,
    pub mean_reversion: MeanReversionGrid,
    pub simulation: SimulationConfig,
    pub comparison: ComparisonConfig,
}

impl Default for ExplorerConfig {
    fn default() -> Self {
        Self {
            parallel: true,
            momentum: MomentumGrid::default(),
            mean_reversion: MeanReversionGrid::default(),
            simulation: SimulationConfig::default(),
            comparison: ComparisonConfig::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MomentumGrid {
    pub windows: Vec<usize>,
}

impl Default for MomentumGrid {
    fn default() -> Self {
        Self {
            windows: vec![10, 20, 30, 50],
        }
    }
}

impl MomentumGrid {
    pub fn parameter_sets(&self) -> Vec<ParameterSet> {
        self.windows
            .iter()
            .map(|&window| ParameterSet::Momentum { window })
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MeanReversionGrid {
    pub windows: Vec<usize>,
    pub thresholds: Vec<f64>,
}

impl Default for MeanReversionGrid {
    fn default() -> Self {
        Self {
            windows: vec![10, 20, 30, 50],
            thresholds: vec![0.01, 0.02, 0.03, 0.05],
        }
    }
}

impl MeanReversionGrid {
    /// Window-major cross product.
    pub fn parameter_sets(&self) -> Vec<ParameterSet> {
        let mut sets = Vec::with_capacity(self.size());
        for &window in &self.windows {
            for &threshold in &self.thresholds {
                sets.push(ParameterSet::MeanReversion { window, threshold });
            }
        }
        sets
    }

    pub fn size(&self) -> usize {
        self.windows.len() * self.thresholds.len()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    pub initial_cash: f64,
    /// Annual rate as a fraction. Unset means "resolve it" (see `risk_free`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub risk_free_rate: Option<f64>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            initial_cash: DEFAULT_INITIAL_CASH,
            risk_free_rate: None,
        }
    }
}

/// Single-configuration head-to-head settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ComparisonConfig {
    pub momentum_window: usize,
    pub mean_reversion_window: usize,
    pub threshold: f64,
}

impl Default for ComparisonConfig {
    fn default() -> Self {
        Self {
            momentum_window: 20,
            mean_reversion_window: 20,
            threshold: 0.02,
        }
    }
}

impl ExplorerConfig {
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Parses and validates.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        check_windows("momentum", &self.momentum.windows)?;
        check_windows("mean_reversion", &self.mean_reversion.windows)?;
        check_thresholds("mean_reversion", &self.mean_reversion.thresholds)?;
        check_windows("comparison", &[self.comparison.momentum_window])?;
        check_windows("comparison", &[self.comparison.mean_reversion_window])?;
        check_thresholds("comparison", &[self.comparison.threshold])?;

        let cash = self.simulation.initial_cash;
        if !cash.is_finite() || cash <= 0.0 {
            return Err(ConfigError::InvalidInitialCash(cash));
        }
        if let Some(rate) = self.simulation.risk_free_rate {
            if !rate.is_finite() {
                return Err(ConfigError::InvalidRiskFreeRate(rate));
            }
        }
        Ok(())
    }
}

fn check_windows(section: &'static str, windows: &[usize]) -> Result<(), ConfigError> {
    if windows.is_empty() {
        return Err(ConfigError::EmptyGrid { section });
    }
    match windows.iter().find(|&&w| w == 0) {
        Some(&window) => Err(ConfigError::InvalidWindow { section, window }),
        None => Ok(()),
    }
}

fn check_thresholds(section: &'static str, thresholds: &[f64]) -> Result<(), ConfigError> {
    if thresholds.is_empty() {
        return Err(ConfigError::EmptyGrid { section });
    }
    match thresholds.iter().find(|t| !t.is_finite() || **t < 0.0) {
        Some(&threshold) => Err(ConfigError::InvalidThreshold { section, threshold }),
        None => Ok(()),
    }
}
