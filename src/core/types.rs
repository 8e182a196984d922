//! Deployment config and recipe schema types.
//!
//! `BarConfig` is the YAML deployment description — which relay pins drive
//! pumps, how fast they flow, and how recipe motor numbers map onto them.
//! Recipe types mirror the JSON recipe book consumed by the catalog. All
//! serde types roundtrip; config and catalog are loaded once and never
//! mutated afterwards.

use crate::core::error::Error;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::time::Duration;

// ============================================================================
// Deployment config (bar.yaml)
// ============================================================================

/// Deployment description — the fixed pump bank and flow model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BarConfig {
    /// Human-readable installation name
    pub name: String,

    /// Physical actuator identifiers (relay header pins), slot order
    pub pumps: Vec<u8>,

    /// Shared flow rate in ml/second
    pub flow_rate: f64,

    /// Optional indirection: authored motor number -> pump slot.
    /// Empty means recipe motor fields are 0-based slots directly.
    #[serde(default)]
    pub motor_map: IndexMap<u32, usize>,

    /// Upper bound for one order's count
    #[serde(default = "default_max_count")]
    pub max_count: u32,

    /// Whether the order count scales every ingredient's volume.
    /// Installations without a count selector pour a single round.
    #[serde(default = "default_true")]
    pub scale_by_count: bool,
}

fn default_max_count() -> u32 {
    10
}

fn default_true() -> bool {
    true
}

impl BarConfig {
    /// Load and validate a deployment config from a YAML file.
    pub fn load(path: &Path) -> Result<Self, Error> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::config(path, format!("cannot read file: {}", e)))?;
        let config: BarConfig = serde_yaml_ng::from_str(&content)
            .map_err(|e| Error::config(path, format!("YAML parse error: {}", e)))?;
        config
            .validate()
            .map_err(|reason| Error::config(path, reason))?;
        Ok(config)
    }

    /// Structural validation. Returns the first problem found.
    pub fn validate(&self) -> Result<(), String> {
        if self.pumps.is_empty() {
            return Err("pump list is empty".to_string());
        }
        if !self.flow_rate.is_finite() || self.flow_rate <= 0.0 {
            return Err(format!("flow_rate must be positive, got {}", self.flow_rate));
        }
        if self.max_count == 0 {
            return Err("max_count must be at least 1".to_string());
        }
        for (motor, slot) in &self.motor_map {
            if *slot >= self.pumps.len() {
                return Err(format!(
                    "motor_map entry {} -> slot {} exceeds pump bank of {}",
                    motor,
                    slot,
                    self.pumps.len()
                ));
            }
        }
        Ok(())
    }

    /// Resolve an authored motor number to a pump slot.
    ///
    /// With an indirection table every referenced motor must have an entry;
    /// without one the motor number is taken as a 0-based slot. Either way
    /// the result is bounds-checked against the pump list.
    pub fn resolve_slot(&self, ingredient: &str, motor: u32) -> Result<usize, Error> {
        let slot = if self.motor_map.is_empty() {
            motor as usize
        } else {
            *self.motor_map.get(&motor).ok_or_else(|| Error::PumpMap {
                ingredient: ingredient.to_string(),
                motor,
            })?
        };
        if slot >= self.pumps.len() {
            return Err(Error::PumpMap {
                ingredient: ingredient.to_string(),
                motor,
            });
        }
        Ok(slot)
    }

    /// The count multiplier actually applied to volumes for an order.
    pub fn effective_count(&self, count: u32) -> u32 {
        if self.scale_by_count {
            count
        } else {
            1
        }
    }
}

// ============================================================================
// Recipe book (recipes.json)
// ============================================================================

/// One pour step as authored: ingredient name, volume, target motor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ingredient {
    /// Ingredient name shown on the menu detail view
    pub name: String,

    /// Volume in ml
    pub quantity: f64,

    /// Motor number as authored (slot or motor_map key)
    pub motor: u32,
}

/// A named recipe — the ingredient order is the dispense order.
///
/// On disk the name is the book's map key; the catalog copies it in here
/// so a recipe handed to the sequencer knows what it is.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recipe {
    /// Recipe name (the book key)
    #[serde(skip)]
    pub name: String,

    /// Ordered pour steps
    pub ingredients: Vec<Ingredient>,

    /// Local image path, presentation layer only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub imgpath: Option<String>,

    /// Remote image URL, presentation layer only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

/// The raw recipe book as it appears on disk: name -> recipe, menu order.
pub type RecipeBook = IndexMap<String, Recipe>;

// ============================================================================
// Dispense plan and result
// ============================================================================

/// One resolved actuator pulse within a pour.
#[derive(Debug, Clone, PartialEq)]
pub struct PourStep {
    /// Ingredient name
    pub ingredient: String,

    /// Motor number as authored
    pub motor: u32,

    /// Slot index into the pump bank
    pub slot: usize,

    /// Physical actuator identifier at that slot
    pub pump: u8,

    /// How long the pump runs
    pub duration: Duration,
}

/// Outcome of one dispense call.
///
/// Reports which steps completed and the measured wall time. There is no
/// flow sensor, so delivered volume is never reported.
#[derive(Debug, Clone)]
pub struct DispenseResult {
    /// Recipe name
    pub recipe: String,

    /// Requested count
    pub count: u32,

    /// Steps that ran to their de-energize, in execution order
    pub completed: Vec<PourStep>,

    /// True when the pour was cancelled before finishing
    pub aborted: bool,

    /// Wall time of the whole pour
    pub total_elapsed: Duration,
}

/// Discrete status signals for an indicator strip or UI badge.
/// Observational only; consumers must never feed these back into control.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispenseStatus {
    Idle,
    InProgress,
    Complete,
}

impl fmt::Display for DispenseStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::InProgress => write!(f, "in-progress"),
            Self::Complete => write!(f, "complete"),
        }
    }
}
