//! Hardware boundary — pump bank and status indicator abstractions.
//!
//! The sequencer drives actuators exclusively through [`PumpBank`]; the
//! relay-board implementation lives in [`relay`], the test/bench stand-in
//! in [`sim`]. All three capabilities are idempotent: de-energizing an
//! already-off pump is a no-op, and `setup` always leaves the actuator
//! de-energized.

pub mod relay;
pub mod sim;

use crate::core::error::Error;
use crate::core::types::DispenseStatus;

/// The actuator capability set the sequencer requires.
///
/// Slots are 0-based indices into the deployment's ordered pump list.
/// Implementations fail closed: an out-of-range slot is an actuator fault,
/// never a silent no-op on some other pump.
pub trait PumpBank {
    /// Number of addressable pumps.
    fn pump_count(&self) -> usize;

    /// Prepare a slot for use and force it de-energized.
    fn setup(&mut self, slot: usize) -> Result<(), Error>;

    /// Open the relay — liquid flows while energized.
    fn energize(&mut self, slot: usize) -> Result<(), Error>;

    /// Close the relay. No-op when already de-energized.
    fn deenergize(&mut self, slot: usize) -> Result<(), Error>;
}

/// Observational status consumer (indicator strip, UI badge).
///
/// Signals never affect control flow, so the method is infallible;
/// implementations swallow their own I/O errors.
pub trait StatusSink {
    fn status_changed(&mut self, status: DispenseStatus);
}

/// Default sink that ignores every signal.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullStatus;

impl StatusSink for NullStatus {
    fn status_changed(&mut self, _status: DispenseStatus) {}
}
