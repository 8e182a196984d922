//! barbot — motorized-pump drink dispenser.
//!
//! A recipe catalog plus a blocking dispense sequencer: each ingredient's
//! pump is energized for `volume / flow_rate` seconds, one at a time, in
//! recipe order. Actuators are reached through the [`hardware::PumpBank`]
//! trait — a relay board over `embedded-hal` pins in deployment, a
//! simulated bank everywhere else.

pub mod cli;
pub mod core;
pub mod hardware;

pub use crate::core::catalog::Catalog;
pub use crate::core::error::Error;
pub use crate::core::sequencer::{plan_pour, CancelToken, Dispenser};
pub use crate::core::types::{BarConfig, DispenseResult, DispenseStatus, Recipe};
