//! Relay-board pump bank over `embedded-hal` output pins.
//!
//! The reference boards switch on logic low (the relay coil sits between
//! the pin and VCC), so `active_low` is the common constructor. Pin errors
//! surface as actuator faults; the sequencer reacts by de-energizing the
//! whole bank and propagating.

use super::{PumpBank, StatusSink};
use crate::core::error::Error;
use crate::core::types::DispenseStatus;
use embedded_hal::digital::v2::OutputPin;

/// A bank of pumps, one relay output pin per slot.
pub struct RelayBank<P> {
    pins: Vec<P>,
    active_low: bool,
}

impl<P> RelayBank<P>
where
    P: OutputPin,
    P::Error: core::fmt::Debug,
{
    /// Bank for boards that energize on logic low.
    pub fn active_low(pins: Vec<P>) -> Self {
        Self {
            pins,
            active_low: true,
        }
    }

    /// Bank for boards that energize on logic high.
    pub fn active_high(pins: Vec<P>) -> Self {
        Self {
            pins,
            active_low: false,
        }
    }

    fn pin(&mut self, slot: usize) -> Result<&mut P, Error> {
        let count = self.pins.len();
        self.pins.get_mut(slot).ok_or_else(|| Error::Actuator {
            pump: format!("slot {}", slot),
            reason: format!("bank has {} pumps", count),
        })
    }

    fn drive(&mut self, slot: usize, energized: bool) -> Result<(), Error> {
        let low = energized == self.active_low;
        let pin = self.pin(slot)?;
        let result = if low { pin.set_low() } else { pin.set_high() };
        result.map_err(|e| Error::Actuator {
            pump: format!("slot {}", slot),
            reason: format!("{:?}", e),
        })
    }
}

impl<P> PumpBank for RelayBank<P>
where
    P: OutputPin,
    P::Error: core::fmt::Debug,
{
    fn pump_count(&self) -> usize {
        self.pins.len()
    }

    fn setup(&mut self, slot: usize) -> Result<(), Error> {
        self.drive(slot, false)
    }

    fn energize(&mut self, slot: usize) -> Result<(), Error> {
        self.drive(slot, true)
    }

    fn deenergize(&mut self, slot: usize) -> Result<(), Error> {
        self.drive(slot, false)
    }
}

/// Three-lamp indicator strip: white while idle, red during a pour, green
/// when the drink is ready. Lamp errors are ignored — the channel is
/// observational only.
pub struct LedStatus<P> {
    white: P,
    red: P,
    green: P,
}

impl<P: OutputPin> LedStatus<P> {
    pub fn new(white: P, red: P, green: P) -> Self {
        Self { white, red, green }
    }

    fn show(&mut self, white: bool, red: bool, green: bool) {
        let _ = if white {
            self.white.set_high()
        } else {
            self.white.set_low()
        };
        let _ = if red {
            self.red.set_high()
        } else {
            self.red.set_low()
        };
        let _ = if green {
            self.green.set_high()
        } else {
            self.green.set_low()
        };
    }
}

impl<P: OutputPin> StatusSink for LedStatus<P> {
    fn status_changed(&mut self, status: DispenseStatus) {
        match status {
            DispenseStatus::Idle => self.show(true, false, false),
            DispenseStatus::InProgress => self.show(false, true, false),
            DispenseStatus::Complete => self.show(false, false, true),
        }
    }
}
