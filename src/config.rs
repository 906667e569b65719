//! Progression configuration.
//!
//! All tunables live here so hosts and tests can override them. Every field
//! has a default, so a partial JSON document is a valid config.

use crate::error::StatError;
use serde::{Deserialize, Serialize};

/// Experience required to advance from a given level.
///
/// # Examples
///
/// ```rust
/// use zzlevel::config::ExperienceCurve;
///
/// let curve = ExperienceCurve::default();
/// assert_eq!(curve.threshold(1), 10);
/// assert_eq!(curve.threshold(3), 90);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ExperienceCurve {
    /// `level² × factor`.
    Quadratic { factor: i64 },
    /// `base + level × per_level`.
    Linear { base: i64, per_level: i64 },
}

impl ExperienceCurve {
    /// Experience needed to leave `level`.
    ///
    /// Saturates at `i64::MIN` / `i64::MAX` instead of overflowing.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use zzlevel::config::ExperienceCurve;
    ///
    /// let curve = ExperienceCurve::Linear { base: 100, per_level: 25 };
    /// assert_eq!(curve.threshold(4), 200);
    ///
    /// let steep = ExperienceCurve::Quadratic { factor: i64::MAX / 2 };
    /// assert_eq!(steep.threshold(3), i64::MAX);
    /// ```
    pub fn threshold(&self, level: u32) -> i64 {
        let level = i64::from(level);
        match *self {
            ExperienceCurve::Quadratic { factor } => {
                level.saturating_mul(level).saturating_mul(factor)
            }
            ExperienceCurve::Linear { base, per_level } => {
                base.saturating_add(level.saturating_mul(per_level))
            }
        }
    }
}

impl Default for ExperienceCurve {
    fn default() -> Self {
        ExperienceCurve::Quadratic { factor: 10 }
    }
}

/// Tunables for leveling and equipment.
///
/// # Examples
///
/// ```rust
/// use zzlevel::ProgressionConfig;
///
/// let config = ProgressionConfig::from_json(r#"{ "max_level": 10 }"#).unwrap();
/// assert_eq!(config.max_level, 10);
/// assert_eq!(config.max_equipment, ProgressionConfig::DEFAULT_MAX_EQUIPMENT);
///
/// // Zero thresholds would level straight to the cap.
/// let flat = r#"{ "experience_curve": { "type": "linear", "base": 0, "per_level": 0 } }"#;
/// assert!(ProgressionConfig::from_json(flat).is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProgressionConfig {
    /// Highest reachable level. Grants at this level never level up.
    pub max_level: u32,
    /// Number of equipment slots.
    pub max_equipment: usize,
    /// Threshold formula.
    pub experience_curve: ExperienceCurve,
}

impl ProgressionConfig {
    /// Level cap used by [`ProgressionConfig::new`].
    pub const DEFAULT_MAX_LEVEL: u32 = 50;
    /// Equipment slots used by [`ProgressionConfig::new`].
    pub const DEFAULT_MAX_EQUIPMENT: usize = 3;

    /// Default tunables: level cap 50, three slots, `level² × 10` thresholds.
    pub fn new() -> Self {
        Self {
            max_level: Self::DEFAULT_MAX_LEVEL,
            max_equipment: Self::DEFAULT_MAX_EQUIPMENT,
            experience_curve: ExperienceCurve::default(),
        }
    }

    /// Set the level cap.
    pub fn with_max_level(mut self, max_level: u32) -> Self {
        self.max_level = max_level;
        self
    }

    /// Set the number of equipment slots.
    pub fn with_max_equipment(mut self, max_equipment: usize) -> Self {
        self.max_equipment = max_equipment;
        self
    }

    /// Set the threshold formula.
    pub fn with_experience_curve(mut self, curve: ExperienceCurve) -> Self {
        self.experience_curve = curve;
        self
    }

    /// Check the tunables describe a playable progression.
    ///
    /// The level cap and slot count must be at least 1, and every level below
    /// the cap must need at least 1 experience to leave.
    ///
    /// # Errors
    ///
    /// Returns [`StatError::Config`] naming the first offending value.
    pub fn validate(&self) -> Result<(), StatError> {
        if self.max_level == 0 {
            return Err(StatError::Config("max_level must be at least 1".to_string()));
        }
        if self.max_equipment == 0 {
            return Err(StatError::Config("max_equipment must be at least 1".to_string()));
        }
        // Both curves are monotonic in level, so the ends of the range bound it.
        let last = self.max_level - 1;
        for level in [1, last] {
            if level == 0 {
                continue;
            }
            let threshold = self.experience_curve.threshold(level);
            if threshold < 1 {
                return Err(StatError::Config(format!(
                    "threshold for level {level} is {threshold}, must be at least 1"
                )));
            }
        }
        Ok(())
    }

    /// Parse and validate a config from JSON. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, StatError> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| StatError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }
}

impl Default for ProgressionConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quadratic_thresholds() {
        let curve = ExperienceCurve::default();
        let thresholds: Vec<i64> = (1..=4).map(|l| curve.threshold(l)).collect();
        assert_eq!(thresholds, vec![10, 40, 90, 160]);
    }

    #[test]
    fn test_linear_threshold() {
        let curve = ExperienceCurve::Linear {
            base: 100,
            per_level: 25,
        };
        assert_eq!(curve.threshold(2), 150);
    }

    #[test]
    fn test_config_from_json_curve() {
        let config = ProgressionConfig::from_json(
            r#"{ "experience_curve": { "type": "linear", "base": 5, "per_level": 5 } }"#,
        )
        .unwrap();
        assert_eq!(config.max_level, 50);
        assert_eq!(config.experience_curve.threshold(1), 10);
    }

    #[test]
    fn test_threshold_saturates_instead_of_overflowing() {
        let curve = ExperienceCurve::Quadratic {
            factor: 3_000_000_000_000_000_000,
        };
        assert_eq!(curve.threshold(2), i64::MAX);

        let curve = ExperienceCurve::Linear {
            base: i64::MAX - 1,
            per_level: i64::MAX,
        };
        assert_eq!(curve.threshold(u32::MAX), i64::MAX);
    }

    #[test]
    fn test_validate_rejects_zero_thresholds() {
        let flat = ProgressionConfig::default().with_experience_curve(ExperienceCurve::Linear {
            base: 0,
            per_level: 0,
        });
        assert!(matches!(flat.validate(), Err(StatError::Config(_))));

        let zero = ProgressionConfig::default()
            .with_experience_curve(ExperienceCurve::Quadratic { factor: 0 });
        assert!(zero.validate().is_err());

        let negative = ProgressionConfig::default()
            .with_experience_curve(ExperienceCurve::Quadratic { factor: -5 });
        assert!(negative.validate().is_err());
    }

    #[test]
    fn test_validate_checks_last_level_of_decreasing_linear_curve() {
        // 100 - 10 × level stays positive until level 10.
        let curve = ExperienceCurve::Linear {
            base: 100,
            per_level: -10,
        };
        let config = ProgressionConfig::default().with_experience_curve(curve);
        assert!(config.clone().with_max_level(10).validate().is_ok());
        assert!(config.with_max_level(11).validate().is_err());
    }

    #[test]
    fn test_validate_rejects_empty_limits() {
        assert!(ProgressionConfig::default().with_max_level(0).validate().is_err());
        assert!(ProgressionConfig::default().with_max_equipment(0).validate().is_err());
        // A single level needs no threshold at all.
        let single = ProgressionConfig::default()
            .with_max_level(1)
            .with_experience_curve(ExperienceCurve::Quadratic { factor: 0 });
        assert!(single.validate().is_ok());
    }

    #[test]
    fn test_from_json_validates() {
        let err = ProgressionConfig::from_json(
            r#"{ "experience_curve": { "type": "quadratic", "factor": 0 } }"#,
        )
        .unwrap_err();
        assert!(matches!(err, StatError::Config(_)));

        let steep = ProgressionConfig::from_json(
            r#"{ "experience_curve": { "type": "quadratic", "factor": 3000000000000000000 } }"#,
        )
        .unwrap();
        assert_eq!(steep.experience_curve.threshold(2), i64::MAX);
    }

    #[test]
    fn test_config_from_bad_json() {
        let err = ProgressionConfig::from_json("{ max_level: }").unwrap_err();
        assert!(matches!(err, StatError::Config(_)));
    }
}
