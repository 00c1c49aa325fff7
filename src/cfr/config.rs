//! Configuration options for the CFR solver.
//!
//! This module provides the configuration struct that selects the update
//! rule and drives the iteration/evaluation loop, plus the statistics the
//! solver reports back.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::cfr::variant::{Algorithm, UpdateRule};
use crate::error::Result;

/// Configuration for the CFR solver.
///
/// # Example
/// ```
/// use regret_solver::cfr::{Algorithm, SolverConfig};
///
/// let config = SolverConfig::new(Algorithm::Dcfr).with_iterations(500);
/// assert_eq!(config.rule.gamma, 2.0);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SolverConfig {
    /// Update rule (algorithm and its α, β, γ).
    pub rule: UpdateRule,

    /// Number of iterations `learn` runs before stopping.
    pub iterations: u64,

    /// Evaluate exploitability every this many iterations.
    pub eval_interval: u64,

    /// Order in which players are traversed and updated within an iteration.
    ///
    /// `None` means `0, 1, ..., n-1`. Updates are alternating: a player's new
    /// policy is already visible to the traversals of the players after it.
    #[serde(default)]
    pub player_order: Option<Vec<usize>>,

    /// Abort enumeration when the tree grows past this many nodes.
    pub max_tree_nodes: usize,

    /// Exploitability values below this are reported as this.
    pub exploitability_floor: f64,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            rule: UpdateRule::default(),
            iterations: 1000,
            eval_interval: 1,
            player_order: None,
            max_tree_nodes: 20_000_000,
            exploitability_floor: 1e-12,
        }
    }
}

impl SolverConfig {
    /// Default configuration for `algorithm` with its default parameters.
    pub fn new(algorithm: Algorithm) -> Self {
        Self {
            rule: UpdateRule::new(algorithm),
            ..Default::default()
        }
    }

    /// Vanilla CFR.
    pub fn vanilla() -> Self {
        Self::new(Algorithm::Cfr)
    }

    /// CFR+.
    pub fn cfr_plus() -> Self {
        Self::new(Algorithm::CfrPlus)
    }

    /// Linear CFR.
    pub fn linear() -> Self {
        Self::new(Algorithm::LinearCfr)
    }

    /// Discounted CFR with explicit exponents.
    ///
    /// # Arguments
    /// * `alpha` - Positive regret discount exponent (default 1.5)
    /// * `beta` - Negative regret discount exponent (default 0)
    /// * `gamma` - Average strategy discount exponent (default 2)
    pub fn discounted(alpha: f64, beta: f64, gamma: f64) -> Self {
        Self::new(Algorithm::Dcfr)
            .with_alpha(alpha)
            .with_beta(beta)
            .with_gamma(gamma)
    }

    /// Builder method: replace the update rule.
    pub fn with_rule(mut self, rule: UpdateRule) -> Self {
        self.rule = rule;
        self
    }

    /// Builder method: set α.
    pub fn with_alpha(mut self, alpha: f64) -> Self {
        self.rule = self.rule.with_alpha(alpha);
        self
    }

    /// Builder method: set β.
    pub fn with_beta(mut self, beta: f64) -> Self {
        self.rule = self.rule.with_beta(beta);
        self
    }

    /// Builder method: set γ.
    pub fn with_gamma(mut self, gamma: f64) -> Self {
        self.rule = self.rule.with_gamma(gamma);
        self
    }

    /// Builder method: set the iteration bound.
    pub fn with_iterations(mut self, iterations: u64) -> Self {
        self.iterations = iterations;
        self
    }

    /// Builder method: set the evaluation cadence.
    pub fn with_eval_interval(mut self, interval: u64) -> Self {
        self.eval_interval = interval;
        self
    }

    /// Builder method: set the player order.
    pub fn with_player_order(mut self, order: Vec<usize>) -> Self {
        self.player_order = Some(order);
        self
    }

    /// Builder method: set the enumeration node limit.
    pub fn with_max_tree_nodes(mut self, limit: usize) -> Self {
        self.max_tree_nodes = limit;
        self
    }

    /// Validate the configuration and return any errors.
    pub fn validate(&self) -> std::result::Result<(), ConfigError> {
        self.rule.validate()?;
        if self.iterations == 0 {
            return Err(ConfigError::ZeroIterations);
        }
        if self.eval_interval == 0 {
            return Err(ConfigError::ZeroEvalInterval);
        }
        if self.max_tree_nodes == 0 {
            return Err(ConfigError::ZeroNodeLimit);
        }
        if !(self.exploitability_floor > 0.0) {
            return Err(ConfigError::InvalidFloor(self.exploitability_floor));
        }
        Ok(())
    }

    /// Check `player_order` against a game with `num_players` players and
    /// return the order to use.
    pub fn resolve_player_order(
        &self,
        num_players: usize,
    ) -> std::result::Result<Vec<usize>, ConfigError> {
        match &self.player_order {
            None => Ok((0..num_players).collect()),
            Some(order) => {
                let mut sorted = order.clone();
                sorted.sort_unstable();
                if sorted != (0..num_players).collect::<Vec<_>>() {
                    return Err(ConfigError::InvalidPlayerOrder(order.clone(), num_players));
                }
                Ok(order.clone())
            }
        }
    }

    /// Load a configuration from a JSON file.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }

    /// Save the configuration as pretty JSON.
    pub fn save_json<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }
}

/// Errors that can occur when validating CFR configuration.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    /// α, β or γ is negative or not finite.
    #[error("{0} must be a finite, non-negative number (got {1})")]
    InvalidExponent(&'static str, f64),
    /// `iterations` is zero.
    #[error("iterations must be positive")]
    ZeroIterations,
    /// `eval_interval` is zero.
    #[error("evaluation interval must be positive")]
    ZeroEvalInterval,
    /// `max_tree_nodes` is zero.
    #[error("node limit must be positive")]
    ZeroNodeLimit,
    /// `exploitability_floor` is not positive.
    #[error("exploitability floor must be positive (got {0})")]
    InvalidFloor(f64),
    /// `player_order` is not a permutation of the game's players.
    #[error("player order {0:?} is not a permutation of 0..{1}")]
    InvalidPlayerOrder(Vec<usize>, usize),
    /// Unrecognized algorithm name.
    #[error("unknown algorithm `{0}`")]
    UnknownAlgorithm(String),
    /// Unrecognized game name.
    #[error("unknown game `{0}`")]
    UnknownGame(String),
}

/// Statistics tracked during CFR training.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CFRStats {
    /// Total number of iterations completed.
    pub iterations: u64,

    /// Number of information sets.
    pub info_sets: usize,

    /// Total time spent training (in seconds).
    pub elapsed_seconds: f64,

    /// Iterations per second.
    pub iterations_per_second: f64,

    /// Most recent exploitability.
    pub exploitability: Option<f64>,

    /// History of exploitability measurements.
    pub exploitability_history: Vec<ExploitabilityPoint>,
}

/// A single exploitability measurement at a specific iteration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExploitabilityPoint {
    /// Iteration number when this measurement was taken.
    pub iteration: u64,
    /// Exploitability value (in the game's payoff units).
    pub exploitability: f64,
}

impl CFRStats {
    /// Create new empty stats.
    pub fn new() -> Self {
        Self::default()
    }

    /// Update iterations per second based on elapsed time.
    pub fn update_rate(&mut self) {
        if self.elapsed_seconds > 0.0 {
            self.iterations_per_second = self.iterations as f64 / self.elapsed_seconds;
        }
    }

    /// Record an exploitability measurement.
    pub fn record_exploitability(&mut self, iteration: u64, exploitability: f64) {
        self.exploitability = Some(exploitability);
        self.exploitability_history.push(ExploitabilityPoint {
            iteration,
            exploitability,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = SolverConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.rule.algorithm, Algorithm::Cfr);
    }

    #[test]
    fn test_validation_errors() {
        assert_eq!(
            SolverConfig::default().with_iterations(0).validate(),
            Err(ConfigError::ZeroIterations)
        );
        assert_eq!(
            SolverConfig::default().with_eval_interval(0).validate(),
            Err(ConfigError::ZeroEvalInterval)
        );
        assert!(matches!(
            SolverConfig::discounted(-1.0, 0.0, 2.0).validate(),
            Err(ConfigError::InvalidExponent("alpha", _))
        ));
    }

    #[test]
    fn test_player_order_resolution() {
        let config = SolverConfig::default();
        assert_eq!(config.resolve_player_order(2).unwrap(), vec![0, 1]);
        let swapped = config.clone().with_player_order(vec![1, 0]);
        assert_eq!(swapped.resolve_player_order(2).unwrap(), vec![1, 0]);
        let bad = config.with_player_order(vec![0, 0]);
        assert!(bad.resolve_player_order(2).is_err());
    }

    #[test]
    fn test_json_file_round_trip() {
        let path = std::env::temp_dir().join("regret_solver_config_test.json");
        let config = SolverConfig::new(Algorithm::PdcfrPlus)
            .with_iterations(42)
            .with_player_order(vec![1, 0]);
        config.save_json(&path).unwrap();
        let loaded = SolverConfig::from_json_file(&path).unwrap();
        assert_eq!(loaded, config);
        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn test_stats_record_exploitability() {
        let mut stats = CFRStats::new();
        stats.record_exploitability(0, 0.5);
        stats.record_exploitability(10, 0.1);
        assert_eq!(stats.exploitability, Some(0.1));
        assert_eq!(stats.exploitability_history.len(), 2);
        assert_eq!(stats.exploitability_history[1].iteration, 10);
    }
}
