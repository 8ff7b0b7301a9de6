//! Core configuration for duoplay-core.

use serde::{Deserialize, Serialize};

use crate::error::DuoplayError;

/// Default distance (seconds) the two clocks may drift apart before the secondary is re-seated.
pub const DEFAULT_DRIFT_TOLERANCE: f64 = 0.5;

/// Engine tuning and feature flags.
///
/// Every field has a default, so hosts may pass a partial JSON object.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Logical volume before the first `set_volume` call.
    pub initial_volume: f64,
    /// Silence the primary transport whenever a secondary audio source is bound.
    pub mute_primary_with_secondary: bool,
    /// Copy the primary's playback rate onto the secondary on every `ratechange`.
    pub mirror_playback_rate: bool,
    /// Maximum tolerated distance (seconds) between the two clocks during playback.
    /// `None` disables drift correction.
    pub drift_tolerance: Option<f64>,
    /// Upper bound on events a host pump should deliver before declaring a feedback loop.
    pub max_pump_iterations: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            initial_volume: 1.0,
            mute_primary_with_secondary: true,
            mirror_playback_rate: true,
            drift_tolerance: Some(DEFAULT_DRIFT_TOLERANCE),
            max_pump_iterations: 256,
        }
    }
}

impl Config {
    /// Parse a (possibly partial) JSON configuration.
    pub fn from_json(json: &str) -> Result<Self, DuoplayError> {
        let cfg: Config = serde_json::from_str(json)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Reject values the engine cannot honor.
    pub fn validate(&self) -> Result<(), DuoplayError> {
        if !(0.0..=1.0).contains(&self.initial_volume) {
            return Err(DuoplayError::InvalidConfig {
                reason: format!("initial_volume must be in [0, 1], got {}", self.initial_volume),
            });
        }
        if let Some(tol) = self.drift_tolerance {
            if !tol.is_finite() || tol <= 0.0 {
                return Err(DuoplayError::InvalidConfig {
                    reason: format!("drift_tolerance must be positive, got {tol}"),
                });
            }
        }
        if self.max_pump_iterations == 0 {
            return Err(DuoplayError::InvalidConfig {
                reason: "max_pump_iterations must be non-zero".into(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_defaults() {
        let cfg = Config::from_json(r#"{ "mirror_playback_rate": false }"#).unwrap();
        assert!(!cfg.mirror_playback_rate);
        assert_eq!(cfg.initial_volume, 1.0);
        assert_eq!(cfg.drift_tolerance, Some(0.5));
    }

    #[test]
    fn null_drift_tolerance_disables_correction() {
        let cfg = Config::from_json(r#"{ "drift_tolerance": null }"#).unwrap();
        assert_eq!(cfg.drift_tolerance, None);
    }

    #[test]
    fn out_of_range_volume_is_rejected() {
        let err = Config::from_json(r#"{ "initial_volume": 1.5 }"#).unwrap_err();
        assert_eq!(err.category(), "config");
    }
}
