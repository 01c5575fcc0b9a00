//! Search configuration.

use serde::{Deserialize, Serialize};

use crate::MctsError;

/// Configuration parameters for one MCTS decision.
///
/// There is no `Default`: the exploration coefficient must be supplied by
/// the caller. 100 rollouts with a coefficient of 5.0 is a common setting
/// for small Othello boards.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MctsConfig{
    /// Number of select/expand/simulate/backpropagate passes per decision.
    pub rollouts: usize,
    /// The exploration coefficient (alpha) of the UCT formula.
    ///
    /// A higher value encourages more exploration of less-visited nodes, while a lower value
    /// prioritizes exploitation of known good paths.
    pub exploration_coef: f64
}

impl MctsConfig{
    /// Creates a validated configuration.
    ///
    /// # Returns
    /// `Err(MctsError::InvalidConfig(_))` if `rollouts` is zero or if
    /// `exploration_coef` is negative, infinite or NaN.
    ///
    /// # Examples
    /// ```rust
    /// use othello_mcts::MctsConfig;
    /// let config = MctsConfig::new(100, 5.0).unwrap();
    /// assert_eq!(config.rollouts, 100);
    /// assert!(MctsConfig::new(0, 5.0).is_err());
    /// ```
    pub fn new(rollouts: usize, exploration_coef: f64) -> Result<Self, MctsError>{
        let config = MctsConfig { rollouts, exploration_coef };
        config.validate()?;
        Ok(config)
    }

    /// Parses and validates a configuration from a TOML document such as
    ///
    /// ```toml
    /// rollouts = 100
    /// exploration_coef = 5.0
    /// ```
    pub fn from_toml_str(content: &str) -> Result<Self, MctsError>{
        let config: MctsConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks that the configuration can drive a search.
    pub fn validate(&self) -> Result<(), MctsError>{
        if self.rollouts == 0 {
            return Err(MctsError::InvalidConfig("rollouts must be at least 1".into()));
        }
        if !self.exploration_coef.is_finite() || self.exploration_coef < 0.0 {
            return Err(MctsError::InvalidConfig(
                format!("exploration_coef must be finite and non-negative, got {}", self.exploration_coef)
            ));
        }
        Ok(())
    }
}
