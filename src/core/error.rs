//! Error taxonomy shared by the catalog, sequencer, and hardware layers.
//!
//! Validation errors (`Config`, `CatalogLoad`, `RecipeNotFound`,
//! `InvalidOrder`, `InvalidVolume`, `PumpMap`) are raised before any
//! actuator is touched. `Actuator` surfaces a hardware fault after the
//! bank has been driven back to its de-energized state.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// Deployment config is missing, malformed, or internally inconsistent.
    #[error("config error in {path}: {reason}")]
    Config { path: String, reason: String },

    /// Recipe source is missing, malformed, or failed eager validation.
    #[error("cannot load recipes from {path}: {reason}")]
    CatalogLoad { path: String, reason: String },

    /// Unknown recipe name.
    #[error("unknown recipe '{0}'")]
    RecipeNotFound(String),

    /// Order count outside the configured bound.
    #[error("order count {count} out of range 1..={max}")]
    InvalidOrder { count: u32, max: u32 },

    /// Requested volume outside the allowed range.
    #[error("volume {volume_ml} ml out of range (0, {max_ml}]")]
    InvalidVolume { volume_ml: f64, max_ml: f64 },

    /// An ingredient references a motor with no configured pump.
    #[error("ingredient '{ingredient}' references motor {motor} with no configured pump")]
    PumpMap { ingredient: String, motor: u32 },

    /// The hardware layer reported a failure. Never retried automatically:
    /// a pump moving liquid must not be pulsed twice for one pour.
    #[error("actuator fault on pump {pump}: {reason}")]
    Actuator { pump: String, reason: String },
}

impl Error {
    /// Shorthand for catalog-load failures.
    pub(crate) fn catalog(path: &std::path::Path, reason: impl Into<String>) -> Self {
        Self::CatalogLoad {
            path: path.display().to_string(),
            reason: reason.into(),
        }
    }

    /// Shorthand for config failures.
    pub(crate) fn config(path: &std::path::Path, reason: impl Into<String>) -> Self {
        Self::Config {
            path: path.display().to_string(),
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recipe_not_found_format() {
        let err = Error::RecipeNotFound("Negroni".into());
        assert_eq!(err.to_string(), "unknown recipe 'Negroni'");
    }

    #[test]
    fn test_invalid_order_format() {
        let err = Error::InvalidOrder { count: 11, max: 10 };
        assert_eq!(err.to_string(), "order count 11 out of range 1..=10");
    }

    #[test]
    fn test_pump_map_format() {
        let err = Error::PumpMap {
            ingredient: "rum".into(),
            motor: 99,
        };
        assert_eq!(
            err.to_string(),
            "ingredient 'rum' references motor 99 with no configured pump"
        );
    }

    #[test]
    fn test_actuator_format() {
        let err = Error::Actuator {
            pump: "pin 38".into(),
            reason: "pin stuck".into(),
        };
        assert_eq!(err.to_string(), "actuator fault on pump pin 38: pin stuck");
    }
}
