//! Simulated pump bank for tests, benches, and the CLI harness.
//!
//! Records every switch event so tests can assert activation order, pulse
//! counts, and the idle-safety invariant. A scripted fault lets the
//! sequencer's cleanup path be exercised without real hardware.

use super::PumpBank;
use crate::core::error::Error;

/// What happened to a slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PulseAction {
    Setup,
    On,
    Off,
}

/// One recorded switch event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PulseEvent {
    pub slot: usize,
    pub action: PulseAction,
}

/// In-memory pump bank.
#[derive(Debug)]
pub struct SimBank {
    energized: Vec<bool>,
    events: Vec<PulseEvent>,
    fail_energize_on: Option<usize>,
    verbose: bool,
}

impl SimBank {
    pub fn new(pumps: usize) -> Self {
        Self {
            energized: vec![false; pumps],
            events: Vec::new(),
            fail_energize_on: None,
            verbose: false,
        }
    }

    /// Bank that prints each pulse to stdout (CLI harness).
    pub fn verbose(pumps: usize) -> Self {
        Self {
            verbose: true,
            ..Self::new(pumps)
        }
    }

    /// Script an energize failure on one slot.
    pub fn fail_energize_on(mut self, slot: usize) -> Self {
        self.fail_energize_on = Some(slot);
        self
    }

    /// Every switch event since construction, in order.
    pub fn events(&self) -> &[PulseEvent] {
        &self.events
    }

    /// Only the on/off pulses, without setup noise.
    pub fn pulses(&self) -> Vec<PulseEvent> {
        self.events
            .iter()
            .copied()
            .filter(|e| e.action != PulseAction::Setup)
            .collect()
    }

    /// True when no pump is energized.
    pub fn all_off(&self) -> bool {
        self.energized.iter().all(|on| !on)
    }

    /// True when the given slot is energized.
    pub fn is_energized(&self, slot: usize) -> bool {
        self.energized.get(slot).copied().unwrap_or(false)
    }

    fn check(&self, slot: usize) -> Result<(), Error> {
        if slot >= self.energized.len() {
            return Err(Error::Actuator {
                pump: format!("slot {}", slot),
                reason: format!("bank has {} pumps", self.energized.len()),
            });
        }
        Ok(())
    }

    fn record(&mut self, slot: usize, action: PulseAction) {
        if self.verbose {
            let word = match action {
                PulseAction::Setup => "setup",
                PulseAction::On => "ON",
                PulseAction::Off => "off",
            };
            println!("  pump {}: {}", slot, word);
        }
        self.events.push(PulseEvent { slot, action });
    }
}

impl PumpBank for SimBank {
    fn pump_count(&self) -> usize {
        self.energized.len()
    }

    fn setup(&mut self, slot: usize) -> Result<(), Error> {
        self.check(slot)?;
        self.energized[slot] = false;
        self.record(slot, PulseAction::Setup);
        Ok(())
    }

    fn energize(&mut self, slot: usize) -> Result<(), Error> {
        self.check(slot)?;
        if self.fail_energize_on == Some(slot) {
            return Err(Error::Actuator {
                pump: format!("slot {}", slot),
                reason: "simulated fault".to_string(),
            });
        }
        self.energized[slot] = true;
        self.record(slot, PulseAction::On);
        Ok(())
    }

    fn deenergize(&mut self, slot: usize) -> Result<(), Error> {
        self.check(slot)?;
        // idempotent: only record a transition
        if self.energized[slot] {
            self.energized[slot] = false;
            self.record(slot, PulseAction::Off);
        }
        Ok(())
    }
}
