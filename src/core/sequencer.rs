//! Dispense sequencer — turns a recipe into timed actuator pulses.
//!
//! Planning is pure: `plan_pour` resolves motors to pump slots and computes
//! run durations from the shared flow rate. Execution is blocking and
//! strictly sequential — one pump at a time, each held for its computed
//! duration, the next one starting only after the previous de-energized.
//! The hardware has no feedback channel, so time is the only control.

use crate::core::error::Error;
use crate::core::types::{BarConfig, DispenseResult, DispenseStatus, PourStep, Recipe};
use crate::hardware::{NullStatus, PumpBank, StatusSink};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Upper bound for one manual prime run.
const MAX_PRIME_ML: f64 = 100.0;

/// Cooperative cancellation handle for an in-flight pour.
///
/// Checked between ingredient steps: the current ingredient finishes its
/// de-energize, then the pour stops. Cleared when a new pour begins.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    fn clear(&self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// Resolve a recipe and count into the ordered pulse sequence.
///
/// Validates the count bound and every motor reference before anything is
/// returned; a plan that comes back `Ok` is safe to execute. The count
/// multiplier is applied uniformly to every ingredient of the order.
pub fn plan_pour(config: &BarConfig, recipe: &Recipe, count: u32) -> Result<Vec<PourStep>, Error> {
    if count < 1 || count > config.max_count {
        return Err(Error::InvalidOrder {
            count,
            max: config.max_count,
        });
    }
    if !config.flow_rate.is_finite() || config.flow_rate <= 0.0 {
        return Err(Error::Config {
            path: "<config>".to_string(),
            reason: format!("flow_rate must be positive, got {}", config.flow_rate),
        });
    }

    let multiplier = f64::from(config.effective_count(count));
    let mut steps = Vec::with_capacity(recipe.ingredients.len());

    for ingredient in &recipe.ingredients {
        if !ingredient.quantity.is_finite() || ingredient.quantity <= 0.0 {
            return Err(Error::InvalidVolume {
                volume_ml: ingredient.quantity,
                max_ml: f64::INFINITY,
            });
        }
        let slot = config.resolve_slot(&ingredient.name, ingredient.motor)?;
        let secs = ingredient.quantity * multiplier / config.flow_rate;
        steps.push(PourStep {
            ingredient: ingredient.name.clone(),
            motor: ingredient.motor,
            slot,
            pump: config.pumps[slot],
            duration: Duration::from_secs_f64(secs),
        });
    }

    Ok(steps)
}

/// Owns the pump bank for the process lifetime and serializes all pours.
///
/// `dispense` and `prime` take `&mut self`; exclusive ownership of the bank
/// is the serialization mechanism — a second order cannot start while one
/// is in progress.
#[derive(Debug)]
pub struct Dispenser<B: PumpBank, S: StatusSink = NullStatus> {
    config: BarConfig,
    bank: B,
    status: S,
    cancel: CancelToken,
}

impl<B: PumpBank> Dispenser<B, NullStatus> {
    /// Construct with no status indicator.
    pub fn new(config: BarConfig, bank: B) -> Result<Self, Error> {
        Self::with_status(config, bank, NullStatus)
    }
}

impl<B: PumpBank, S: StatusSink> Dispenser<B, S> {
    /// Construct, forcing every actuator to its de-energized state
    /// regardless of what the hardware was doing before.
    pub fn with_status(config: BarConfig, bank: B, status: S) -> Result<Self, Error> {
        if bank.pump_count() != config.pumps.len() {
            return Err(Error::Config {
                path: "<pump bank>".to_string(),
                reason: format!(
                    "config lists {} pumps but the bank has {}",
                    config.pumps.len(),
                    bank.pump_count()
                ),
            });
        }

        let mut dispenser = Self {
            config,
            bank,
            status,
            cancel: CancelToken::default(),
        };
        for slot in 0..dispenser.bank.pump_count() {
            dispenser.bank.setup(slot)?;
        }
        dispenser.status.status_changed(DispenseStatus::Idle);
        Ok(dispenser)
    }

    /// Handle for cancelling the pour currently in flight.
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    pub fn config(&self) -> &BarConfig {
        &self.config
    }

    pub fn bank(&self) -> &B {
        &self.bank
    }

    /// Pour `count` rounds of a recipe, one ingredient at a time.
    ///
    /// Blocks the calling thread for the whole pour. A cancellation
    /// mid-pour yields `Ok` with `aborted = true` and the completed prefix;
    /// a hardware fault de-energizes the whole bank and propagates.
    pub fn dispense(&mut self, recipe: &Recipe, count: u32) -> Result<DispenseResult, Error> {
        let steps = plan_pour(&self.config, recipe, count)?;

        self.cancel.clear();
        let start = Instant::now();
        self.status.status_changed(DispenseStatus::InProgress);
        log::info!(
            "pouring {} x{} ({} steps)",
            recipe.name,
            count,
            steps.len()
        );

        let mut completed = Vec::with_capacity(steps.len());
        let mut aborted = false;

        for step in steps {
            if self.cancel.is_cancelled() {
                log::warn!("pour of {} cancelled after {} steps", recipe.name, completed.len());
                aborted = true;
                break;
            }
            if let Err(e) = self.run_step(&step) {
                self.all_off();
                self.status.status_changed(DispenseStatus::Idle);
                return Err(e);
            }
            completed.push(step);
        }

        // Idle safety: nothing may stay energized outside a hold window.
        self.all_off();
        self.status.status_changed(if aborted {
            DispenseStatus::Idle
        } else {
            DispenseStatus::Complete
        });

        let total_elapsed = start.elapsed();
        log::info!(
            "{}: {}/{} steps in {:.2}s",
            recipe.name,
            completed.len(),
            recipe.ingredients.len(),
            total_elapsed.as_secs_f64()
        );

        Ok(DispenseResult {
            recipe: recipe.name.clone(),
            count,
            completed,
            aborted,
            total_elapsed,
        })
    }

    /// Run a single pump manually — priming lines or cleaning.
    ///
    /// The volume is bounded to (0, 100] ml and the count multiplier never
    /// applies. Returns the step that ran.
    pub fn prime(&mut self, motor: u32, volume_ml: f64) -> Result<PourStep, Error> {
        if !volume_ml.is_finite() || volume_ml <= 0.0 || volume_ml > MAX_PRIME_ML {
            return Err(Error::InvalidVolume {
                volume_ml,
                max_ml: MAX_PRIME_ML,
            });
        }
        let slot = self.config.resolve_slot("prime", motor)?;
        let step = PourStep {
            ingredient: "prime".to_string(),
            motor,
            slot,
            pump: self.config.pumps[slot],
            duration: Duration::from_secs_f64(volume_ml / self.config.flow_rate),
        };

        self.status.status_changed(DispenseStatus::InProgress);
        if let Err(e) = self.run_step(&step) {
            self.all_off();
            self.status.status_changed(DispenseStatus::Idle);
            return Err(e);
        }
        self.all_off();
        self.status.status_changed(DispenseStatus::Complete);
        Ok(step)
    }

    /// Energize, hold, de-energize. The defensive slot re-check fails
    /// closed rather than energize an actuator the bank does not have.
    fn run_step(&mut self, step: &PourStep) -> Result<(), Error> {
        if step.slot >= self.bank.pump_count() {
            return Err(Error::PumpMap {
                ingredient: step.ingredient.clone(),
                motor: step.motor,
            });
        }

        log::debug!(
            "{}: pump {} (pin {}) for {:.2}s",
            step.ingredient,
            step.slot,
            step.pump,
            step.duration.as_secs_f64()
        );

        self.bank.energize(step.slot)?;
        std::thread::sleep(step.duration);
        self.bank.deenergize(step.slot)
    }

    /// Best-effort bank-wide de-energize.
    fn all_off(&mut self) {
        for slot in 0..self.bank.pump_count() {
            if let Err(e) = self.bank.deenergize(slot) {
                log::warn!("cleanup: cannot de-energize slot {}: {}", slot, e);
            }
        }
    }
}
